//! 收据 API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post}};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/receipts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/breakdown", post(handler::breakdown))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/download", get(handler::download))
        .layer(middleware::from_fn(require_staff))
}
