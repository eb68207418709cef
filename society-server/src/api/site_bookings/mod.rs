//! 订地 API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/site-bookings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/payment-summary/{seniority_no}", get(handler::payment_summary))
        .route("/{id}", put(handler::update))
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_staff))
}
