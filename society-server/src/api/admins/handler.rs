//! Admin Account Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::admin;
use crate::utils::validation::{MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{AdminCreate, AdminResponse, AdminUpdate};

/// GET /api/admins - 列出全部管理员（不含口令散列）
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<AdminResponse>>> {
    let admins = admin::find_all(&state.pool).await?;
    Ok(Json(admins.into_iter().map(AdminResponse::from).collect()))
}

/// POST /api/admins - 创建管理员
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<AdminCreate>,
) -> AppResult<Json<AppResponse<AdminResponse>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.admin_id, "admin_id", MAX_NAME_LEN)?;
    validate_required_text(&payload.password, "password", MAX_PASSWORD_LEN)?;

    if admin::find_by_admin_id(&state.pool, &payload.admin_id)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(format!(
            "Admin ID '{}' already exists",
            payload.admin_id
        )));
    }

    let hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let created = admin::create(
        &state.pool,
        &payload.name,
        &payload.admin_id,
        &hash,
        payload.mobile.as_deref(),
        payload.mail.as_deref(),
        false,
    )
    .await?;

    tracing::info!(
        admin_id = %created.admin_id,
        created_by = %current_user.username,
        "Admin account created"
    );

    Ok(ok_with_message(
        AdminResponse::from(created),
        "Admin added successfully",
    ))
}

/// PUT /api/admins/{admin_id} - 更新管理员（口令提供时重新散列）
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(admin_id): Path<String>,
    Json(payload): Json<AdminUpdate>,
) -> AppResult<Json<AppResponse<AdminResponse>>> {
    let hash = match payload.password.as_deref() {
        Some(p) => {
            validate_required_text(p, "password", MAX_PASSWORD_LEN)?;
            Some(
                password::hash_password(p)
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?,
            )
        }
        None => None,
    };

    let updated = admin::update(
        &state.pool,
        &admin_id,
        payload.admin_id.as_deref(),
        hash.as_deref(),
        payload.mobile.as_deref(),
        payload.mail.as_deref(),
    )
    .await?;

    tracing::info!(
        admin_id = %updated.admin_id,
        updated_by = %current_user.username,
        "Admin account updated"
    );

    Ok(ok(AdminResponse::from(updated)))
}
