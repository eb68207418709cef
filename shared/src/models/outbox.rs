//! Outbox Email Model
//!
//! 收据邮件先落库再投递：状态可查询，失败可重试。

use serde::{Deserialize, Serialize};

/// Delivery states of an outbox row
pub const OUTBOX_PENDING: &str = "pending";
pub const OUTBOX_SENT: &str = "sent";
pub const OUTBOX_FAILED: &str = "failed";

/// Outbox email entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OutboxEmail {
    pub id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Stored attachment reference (receipt PDF), null when none
    pub attachment: Option<String>,
    /// "pending" | "sent" | "failed"
    pub status: String,
    pub error: Option<String>,
    pub attempts: i64,
    pub sent_at: Option<i64>,
    pub created_at: i64,
}
