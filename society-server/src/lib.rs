//! Society Server - 住房合作社会务管理后端
//!
//! # 架构概述
//!
//! 本模块是会务服务器的主入口，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2，admin / superadmin / member 三角色
//! - **数据库** (`db`): SQLite (WAL) 连接池 + 按表 repository
//! - **账务核心** (`billing`): 收据编号、会费摊销、付款汇总
//! - **邮件** (`mailer`): outbox 落库 + 后台 SMTP 投递
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! society-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色中间件、口令散列
//! ├── api/           # HTTP 路由和处理器
//! ├── billing/       # 收据编号 / 会费摊销 / 付款汇总
//! ├── mailer/        # outbox 邮件投递
//! ├── db/            # 数据库层
//! ├── uploads.rs     # 上传文件存储
//! └── utils/         # 错误、日志、校验、时间
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod mailer;
pub mod uploads;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Security logging macro - 支持 tracing 格式说明符 (? / %)
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            level = "WARN",
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            level = "ERROR",
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            level = "INFO",
            $($arg)*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("RUST_LOG").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____            _      __
  / ___/____  _____(_)__  / /___  __
  \__ \/ __ \/ ___/ / _ \/ __/ / / /
 ___/ / /_/ / /__/ /  __/ /_/ /_/ /
/____/\____/\___/_/\___/\__/\__, /
                           /____/
    "#
    );
}
