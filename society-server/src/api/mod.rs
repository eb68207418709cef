//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 三类登录（admin / superadmin / member）与令牌校验
//! - [`admins`] - 管理员账号管理（superadmin）
//! - [`members`] - 会员登记接口
//! - [`site_bookings`] - 订地接口（含付款汇总与取消）
//! - [`receipts`] - 收据接口（编号生成、会费摊销明细、PDF 下载）
//! - [`outbox`] - 邮件投递记录查询与重试
//! - [`portal`] - 会员自助查询
//! - [`files`] - 上传文件回读

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub mod admins;
pub mod auth;
pub mod files;
pub mod health;
pub mod members;
pub mod outbox;
pub mod portal;
pub mod receipts;
pub mod site_bookings;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(auth::router())
        .merge(admins::router())
        .merge(members::router())
        .merge(site_bookings::router())
        .merge(receipts::router())
        .merge(outbox::router())
        .merge(portal::router())
        .merge(files::router())
        .merge(health::router())
}

/// Request body ceiling: base64 PDF payloads run ~4/3 of the stored file size
const MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

/// Build a fully configured application with all middleware and state
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // Body limit - rendered receipt PDFs arrive inline
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Get user context (JWT authentication) - executes before routes, injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
}
