//! 管理员账号 API 模块（superadmin 专用）

mod handler;

use axum::{Router, middleware, routing::{get, put}};

use crate::auth::require_superadmin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admins", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{admin_id}", put(handler::update))
        .layer(middleware::from_fn(require_superadmin))
}
