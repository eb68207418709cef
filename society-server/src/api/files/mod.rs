//! 上传文件回读 API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 认证由全局 require_auth 中间件覆盖（会员可读自己的材料链接）
    Router::new().route("/api/files/{category}/{filename}", get(handler::serve))
}
