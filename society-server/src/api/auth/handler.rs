//! Authentication Handlers
//!
//! 三类登录：
//! - admin / superadmin：admin 表 + argon2 口令
//! - member：用户名 = seniority number，口令 = 登记的手机号
//!
//! 登录失败统一返回 "Invalid username or password"，防止账号枚举。

use std::time::Duration;

use axum::{Json, extract::{Extension, State}};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::{admin, member};
use crate::security_log;
use crate::utils::{AppError, AppResult};
use shared::models::{Admin, LoginRequest, LoginResponse, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn admin_role(a: &Admin) -> &'static str {
    if a.is_super { "superadmin" } else { "admin" }
}

async fn authenticate_admin(
    state: &ServerState,
    req: &LoginRequest,
    superadmin_only: bool,
) -> AppResult<LoginResponse> {
    let row = admin::find_by_admin_id(&state.pool, &req.username).await?;

    // Fixed delay before checking result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(row) = row else {
        security_log!(WARN, "login_failed", username = %req.username);
        return Err(AppError::invalid_credentials());
    };

    if superadmin_only && !row.is_super {
        security_log!(WARN, "login_failed", username = %req.username);
        return Err(AppError::invalid_credentials());
    }

    let password_valid = password::verify_password(&req.password, &row.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        security_log!(WARN, "login_failed", username = %req.username);
        return Err(AppError::invalid_credentials());
    }

    let role = admin_role(&row);
    let token = state
        .get_jwt_service()
        .generate_token(&row.id.to_string(), &row.admin_id, &row.name, role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(username = %row.admin_id, role = %role, "Login successful");

    Ok(LoginResponse {
        token,
        user: UserInfo {
            id: row.id,
            username: row.admin_id,
            name: row.name,
            role: role.to_string(),
        },
    })
}

/// POST /api/auth/login - 管理员登录
pub async fn login_admin(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(authenticate_admin(&state, &req, false).await?))
}

/// POST /api/auth/superadmin/login - 超级管理员登录
pub async fn login_superadmin(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(authenticate_admin(&state, &req, true).await?))
}

/// POST /api/auth/member/login - 会员登录
///
/// 口令即登记手机号（字符串等值比较），与登记流程保持一致。
pub async fn login_member(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let row = member::find_by_seniority(&state.pool, req.username.trim()).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(row) = row else {
        security_log!(WARN, "member_login_failed", username = %req.username);
        return Err(AppError::invalid_credentials());
    };

    if row.mobile != req.password.trim() {
        security_log!(WARN, "member_login_failed", username = %req.username);
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .get_jwt_service()
        .generate_token(&row.id.to_string(), &row.seniority_no, &row.name, "member")
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(seniority_no = %row.seniority_no, "Member login successful");

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: row.id,
            username: row.seniority_no,
            name: row.name,
            role: "member".to_string(),
        },
    }))
}

/// GET /api/auth/me - 校验令牌并返回当前用户
pub async fn me(Extension(user): Extension<CurrentUser>) -> AppResult<Json<UserInfo>> {
    let id = user
        .id
        .parse::<i64>()
        .map_err(|_| AppError::invalid_token("Malformed subject claim"))?;
    Ok(Json(UserInfo {
        id,
        username: user.username,
        name: user.name,
        role: user.role,
    }))
}
