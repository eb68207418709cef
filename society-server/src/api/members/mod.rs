//! 会员 API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{seniority_no}",
            get(handler::get_by_seniority).put(handler::update),
        )
        .layer(middleware::from_fn(require_staff))
}
