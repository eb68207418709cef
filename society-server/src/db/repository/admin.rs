//! Admin Repository
//!
//! 管理员与超级管理员同表存储（is_super 区分）。

use super::{RepoError, RepoResult};
use shared::models::Admin;
use sqlx::SqlitePool;

const ADMIN_SELECT: &str =
    "SELECT id, name, admin_id, password_hash, mobile, mail, is_super, created_at, updated_at FROM admin";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Admin>> {
    let sql = format!("{ADMIN_SELECT} ORDER BY created_at ASC");
    let rows = sqlx::query_as::<_, Admin>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_admin_id(pool: &SqlitePool, admin_id: &str) -> RepoResult<Option<Admin>> {
    let sql = format!("{ADMIN_SELECT} WHERE admin_id = ?");
    let row = sqlx::query_as::<_, Admin>(&sql)
        .bind(admin_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn count_superadmins(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin WHERE is_super = 1")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    admin_id: &str,
    password_hash: &str,
    mobile: Option<&str>,
    mail: Option<&str>,
    is_super: bool,
) -> RepoResult<Admin> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO admin (id, name, admin_id, password_hash, mobile, mail, is_super, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(name)
    .bind(admin_id)
    .bind(password_hash)
    .bind(mobile)
    .bind(mail)
    .bind(is_super)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_admin_id(pool, admin_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin".into()))
}

/// 更新管理员（password_hash 为 None 时保持原值）
pub async fn update(
    pool: &SqlitePool,
    admin_id: &str,
    new_admin_id: Option<&str>,
    password_hash: Option<&str>,
    mobile: Option<&str>,
    mail: Option<&str>,
) -> RepoResult<Admin> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE admin SET admin_id = COALESCE(?1, admin_id), password_hash = COALESCE(?2, password_hash), \
         mobile = COALESCE(?3, mobile), mail = COALESCE(?4, mail), updated_at = ?5 WHERE admin_id = ?6",
    )
    .bind(new_admin_id)
    .bind(password_hash)
    .bind(mobile)
    .bind(mail)
    .bind(now)
    .bind(admin_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Admin {admin_id} not found")));
    }

    let effective = new_admin_id.unwrap_or(admin_id);
    find_by_admin_id(pool, effective)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Admin {effective} not found")))
}
