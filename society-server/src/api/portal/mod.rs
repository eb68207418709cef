//! 会员自助 API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_member;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/portal", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .layer(middleware::from_fn(require_member))
}
