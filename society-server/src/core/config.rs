use std::path::PathBuf;

use crate::auth::JwtConfig;

/// SMTP 邮件配置
///
/// enabled=false 时邮件只落库不投递（开发/测试环境默认）。
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub sender_name: String,
    pub sender_email: String,
    /// Company copy recipient for generated receipts (optional)
    pub company_email: Option<String>,
}

impl SmtpConfig {
    fn from_env() -> Self {
        Self {
            enabled: std::env::var("SMTP_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.example.com".into()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            user: std::env::var("SMTP_USER").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            sender_name: std::env::var("SMTP_SENDER_NAME")
                .unwrap_or_else(|_| "Navanagara Society".into()),
            sender_email: std::env::var("SMTP_SENDER_EMAIL").unwrap_or_default(),
            company_email: std::env::var("COMPANY_EMAIL").ok().filter(|v| !v.is_empty()),
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/society | 工作目录 |
/// | HTTP_PORT | 3001 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SMTP_ENABLED | false | 是否投递邮件 |
/// | SUPERADMIN_ID / SUPERADMIN_PASSWORD | - | 启动时补种超级管理员 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/society HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件、日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// SMTP 邮件配置
    pub smtp: SmtpConfig,
    /// 启动时补种的超级管理员登录名（无记录时创建）
    pub superadmin_id: Option<String>,
    pub superadmin_password: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/society".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            smtp: SmtpConfig::from_env(),
            superadmin_id: std::env::var("SUPERADMIN_ID").ok().filter(|v| !v.is_empty()),
            superadmin_password: std::env::var("SUPERADMIN_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    // ── 工作目录结构 ────────────────────────────────────────────────

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保 work_dir 目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.uploads_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
