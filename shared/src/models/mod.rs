//! Data models
//!
//! Shared between society-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod admin;
pub mod member;
pub mod outbox;
pub mod receipt;
pub mod site_booking;

// Re-exports
pub use admin::*;
pub use member::*;
pub use outbox::*;
pub use receipt::*;
pub use site_booking::*;
