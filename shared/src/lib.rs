//! Shared types for the society administration system
//!
//! 会员/订地/收据三类记录的领域模型，由 society-server 和前端（经 API）共用。

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
