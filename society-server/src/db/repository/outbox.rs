//! Email Outbox Repository
//!
//! 邮件先落库（pending）再由后台 worker 投递，结果写回 status。

use super::{RepoError, RepoResult};
use shared::models::{OUTBOX_FAILED, OUTBOX_PENDING, OUTBOX_SENT, OutboxEmail};
use sqlx::SqlitePool;

const OUTBOX_SELECT: &str = "SELECT id, recipient, subject, body, attachment, status, error, \
    attempts, sent_at, created_at FROM email_outbox";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<OutboxEmail>> {
    let sql = format!("{OUTBOX_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, OutboxEmail>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OutboxEmail>> {
    let sql = format!("{OUTBOX_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, OutboxEmail>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// 启动时回捞尚未投递的邮件
pub async fn find_pending_ids(pool: &SqlitePool) -> RepoResult<Vec<i64>> {
    let ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM email_outbox WHERE status = ? ORDER BY created_at ASC")
            .bind(OUTBOX_PENDING)
            .fetch_all(pool)
            .await?;
    Ok(ids)
}

pub async fn enqueue(
    pool: &SqlitePool,
    recipient: &str,
    subject: &str,
    body: &str,
    attachment: Option<&str>,
) -> RepoResult<OutboxEmail> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO email_outbox (id, recipient, subject, body, attachment, status, attempts, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
    )
    .bind(id)
    .bind(recipient)
    .bind(subject)
    .bind(body)
    .bind(attachment)
    .bind(OUTBOX_PENDING)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to enqueue email".into()))
}

pub async fn mark_sent(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE email_outbox SET status = ?1, error = NULL, attempts = attempts + 1, sent_at = ?2 \
         WHERE id = ?3",
    )
    .bind(OUTBOX_SENT)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_failed(pool: &SqlitePool, id: i64, error: &str) -> RepoResult<()> {
    sqlx::query("UPDATE email_outbox SET status = ?1, error = ?2, attempts = attempts + 1 WHERE id = ?3")
        .bind(OUTBOX_FAILED)
        .bind(error)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// 重试：失败记录回到 pending，由 worker 重新投递
pub async fn mark_pending(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE email_outbox SET status = ?1, error = NULL WHERE id = ?2")
        .bind(OUTBOX_PENDING)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
