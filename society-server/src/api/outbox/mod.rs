//! 邮件 outbox API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post}};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/outbox", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}/retry", post(handler::retry))
        .layer(middleware::from_fn(require_staff))
}
