//! Outbox API Handlers
//!
//! 投递记录可查询；失败记录可重试（回到 pending 并重新入队）。

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::outbox;
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};
use shared::models::{OUTBOX_SENT, OutboxEmail};

/// GET /api/outbox - 邮件投递记录（新建在前）
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<OutboxEmail>>> {
    let rows = outbox::find_all(&state.pool).await?;
    Ok(Json(rows))
}

/// POST /api/outbox/{id}/retry - 重试投递
pub async fn retry(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<OutboxEmail>>> {
    let row = outbox::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbox email {id}")))?;

    if row.status == OUTBOX_SENT {
        return Err(AppError::validation("Email was already sent".to_string()));
    }

    outbox::mark_pending(&state.pool, id).await?;
    state.mailer.enqueue(id);

    tracing::info!(outbox_id = id, retried_by = %current_user.username, "Email retry queued");

    let refreshed = outbox::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Outbox email {id}")))?;
    Ok(ok_with_message(refreshed, "Email queued for retry"))
}
