use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{admin, outbox};
use crate::mailer::MailerService;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是整个服务的核心数据结构，使用 Arc 实现浅拷贝。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | mailer | MailerService | 邮件 outbox 服务 |
/// | shutdown | CancellationToken | 后台任务停机信号 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 邮件 outbox 服务
    pub mailer: MailerService,
    /// 停机信号
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (database / uploads / logs)
    /// 2. 数据库 (work_dir/database/society.db) + 迁移
    /// 3. JWT 服务、邮件服务
    /// 4. 补种超级管理员
    ///
    /// # Panics
    ///
    /// 数据库或邮件服务初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("society.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let mailer = MailerService::new(&config.smtp).expect("Failed to initialize mailer");

        let state = Self {
            config: config.clone(),
            pool: db_service.pool,
            jwt_service,
            mailer,
            shutdown: CancellationToken::new(),
        };

        state.ensure_superadmin().await;

        state
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - Outbox 邮件投递 worker（并回捞启动前残留的 pending 邮件）
    pub async fn start_background_tasks(&self) {
        match outbox::find_pending_ids(&self.pool).await {
            Ok(ids) => {
                if !ids.is_empty() {
                    tracing::info!(count = ids.len(), "Re-enqueueing pending outbox emails");
                }
                for id in ids {
                    self.mailer.enqueue(id);
                }
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to load pending outbox emails");
            }
        }

        self.mailer
            .start_background_tasks(self.clone(), self.shutdown.clone());
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 无超级管理员时按配置补种一个
    ///
    /// 未配置 SUPERADMIN_ID / SUPERADMIN_PASSWORD 时只告警，不阻塞启动。
    async fn ensure_superadmin(&self) {
        let count = match admin::count_superadmins(&self.pool).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = ?e, "Failed to count superadmins");
                return;
            }
        };
        if count > 0 {
            return;
        }

        let (Some(admin_id), Some(password)) = (
            self.config.superadmin_id.as_deref(),
            self.config.superadmin_password.as_deref(),
        ) else {
            tracing::warn!(
                "No superadmin account exists and SUPERADMIN_ID / SUPERADMIN_PASSWORD are not set"
            );
            return;
        };

        let hash = match crate::auth::password::hash_password(password) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(error = %e, "Failed to hash bootstrap superadmin password");
                return;
            }
        };

        match admin::create(&self.pool, "Super Admin", admin_id, &hash, None, None, true).await {
            Ok(created) => {
                tracing::info!(admin_id = %created.admin_id, "Bootstrap superadmin created");
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to create bootstrap superadmin");
            }
        }
    }
}
