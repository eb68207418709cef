//! Outbox Worker
//!
//! 监听 outbox 通道，逐封投递并把结果写回 email_outbox。
//! 投递失败只记录（failed + error），不回滚已提交的收据。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::outbox;
use crate::mailer::{Mailer, OutgoingEmail};

/// 邮件投递工作者
pub struct OutboxWorker {
    state: ServerState,
    mailer: Arc<dyn Mailer>,
}

impl OutboxWorker {
    pub fn new(state: ServerState, mailer: Arc<dyn Mailer>) -> Self {
        Self { state, mailer }
    }

    /// 运行工作者（阻塞直到通道关闭或收到停机信号）
    pub async fn run(self, mut rx: mpsc::Receiver<i64>, shutdown: CancellationToken) {
        tracing::info!(enabled = self.mailer.is_enabled(), "Outbox worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Outbox worker received shutdown signal");
                    break;
                }
                id = rx.recv() => {
                    let Some(id) = id else {
                        tracing::info!("Outbox channel closed, worker stopping");
                        break;
                    };
                    self.deliver(id).await;
                }
            }
        }
    }

    /// 投递单封邮件
    async fn deliver(&self, id: i64) {
        let row = match outbox::find_by_id(&self.state.pool, id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::warn!(outbox_id = id, "Outbox row not found");
                return;
            }
            Err(e) => {
                tracing::error!(outbox_id = id, error = ?e, "Failed to load outbox row");
                return;
            }
        };

        // 重复入队（如重试接口连点）时跳过已投递记录
        if row.status == shared::models::OUTBOX_SENT {
            tracing::debug!(outbox_id = id, "Outbox row already sent, skipping");
            return;
        }

        let attachment = row.attachment.as_deref().and_then(|rel| {
            let path = self.state.config.uploads_dir().join(rel);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "attachment.pdf".to_string());
                    Some((filename, bytes))
                }
                Err(e) => {
                    // 附件丢失时仍然发送正文
                    tracing::warn!(outbox_id = id, path = %path.display(), error = %e,
                        "Failed to read attachment, sending without it");
                    None
                }
            }
        });

        let email = OutgoingEmail {
            to: row.recipient.clone(),
            subject: row.subject.clone(),
            body: row.body.clone(),
            attachment,
        };

        match self.mailer.send(email).await {
            Ok(()) => {
                if let Err(e) = outbox::mark_sent(&self.state.pool, id).await {
                    tracing::error!(outbox_id = id, error = ?e, "Failed to mark email sent");
                }
            }
            Err(e) => {
                tracing::warn!(outbox_id = id, recipient = %row.recipient, error = %e,
                    "Email delivery failed");
                if let Err(db_err) = outbox::mark_failed(&self.state.pool, id, &e.to_string()).await
                {
                    tracing::error!(outbox_id = id, error = ?db_err, "Failed to mark email failed");
                }
            }
        }
    }
}
