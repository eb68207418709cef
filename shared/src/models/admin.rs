//! Admin Model
//!
//! 管理员账号（superadmin 为 is_super = true 的同表记录）。

use serde::{Deserialize, Serialize};

/// Admin entity (DB row, includes password hash — never serialize to API)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub admin_id: String,
    pub password_hash: String,
    pub mobile: Option<String>,
    pub mail: Option<String>,
    pub is_super: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Admin response (without password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub id: i64,
    pub name: String,
    pub admin_id: String,
    pub mobile: Option<String>,
    pub mail: Option<String>,
    pub is_super: bool,
}

impl From<Admin> for AdminResponse {
    fn from(a: Admin) -> Self {
        Self {
            id: a.id,
            name: a.name,
            admin_id: a.admin_id,
            mobile: a.mobile,
            mail: a.mail,
            is_super: a.is_super,
        }
    }
}

/// Create admin payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminCreate {
    pub name: String,
    pub admin_id: String,
    pub password: String,
    pub mobile: Option<String>,
    pub mail: Option<String>,
}

/// Update admin payload (password re-hashed when present)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminUpdate {
    pub admin_id: Option<String>,
    pub password: Option<String>,
    pub mobile: Option<String>,
    pub mail: Option<String>,
}

/// Login request (admin / superadmin / member all use the same shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Authenticated user info returned with tokens and by /api/auth/me
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub name: String,
    /// "admin" | "superadmin" | "member"
    pub role: String,
}
