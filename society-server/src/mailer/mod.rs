//! 邮件模块
//!
//! 收据邮件不在请求线程内直发：先写 email_outbox，再经通道交给
//! 后台 worker 投递，成败都落库，可经 API 查询与重试。

pub mod smtp;
pub mod worker;

pub use smtp::{MailError, Mailer, OutgoingEmail, SmtpMailer};
pub use worker::OutboxWorker;

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::{ServerState, SmtpConfig};

/// 通道容量：收据创建最多同时挂起这么多封待投递邮件
const OUTBOX_CHANNEL_CAPACITY: usize = 256;

/// 邮件服务 - 持有 outbox 通道两端与 SMTP 投递器
///
/// Receiver 在 [`MailerService::start_background_tasks`] 被 worker 取走，
/// 之后 enqueue 只通过 Sender 工作。
#[derive(Clone)]
pub struct MailerService {
    tx: mpsc::Sender<i64>,
    rx: Arc<Mutex<Option<mpsc::Receiver<i64>>>>,
    mailer: Arc<dyn Mailer>,
}

impl MailerService {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let (tx, rx) = mpsc::channel(OUTBOX_CHANNEL_CAPACITY);
        let mailer = SmtpMailer::new(config.clone())?;
        Ok(Self {
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
            mailer: Arc::new(mailer),
        })
    }

    /// 把已落库的 outbox 行交给 worker 投递
    ///
    /// 通道已满/已关闭只告警：行仍是 pending，可经重试接口补投。
    pub fn enqueue(&self, outbox_id: i64) {
        if let Err(e) = self.tx.try_send(outbox_id) {
            tracing::warn!(outbox_id, error = %e, "Failed to enqueue outbox email");
        }
    }

    /// 启动投递 worker
    ///
    /// 必须在 `Server::run()` 之前调用；重复调用是空操作。
    pub fn start_background_tasks(&self, state: ServerState, shutdown: CancellationToken) {
        let rx = self.rx.lock().expect("outbox receiver lock").take();
        let Some(rx) = rx else {
            tracing::warn!("Outbox worker already started");
            return;
        };

        let worker = OutboxWorker::new(state, self.mailer.clone());
        tokio::spawn(async move {
            worker.run(rx, shutdown).await;
        });
    }
}
