//! 登录 API 模块

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login_admin))
        .route("/superadmin/login", post(handler::login_superadmin))
        .route("/member/login", post(handler::login_member))
        .route("/me", get(handler::me))
}
