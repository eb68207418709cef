//! SMTP 邮件投递
//!
//! lettre STARTTLS relay。未启用（开发/测试）时 send 返回 NotEnabled，
//! 由 worker 记录为 failed，不阻塞收据流程。

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::core::SmtpConfig;

/// 邮件投递错误
#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP mailer is not enabled")]
    NotEnabled,

    #[error("Mailer configuration error: {0}")]
    Configuration(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// 待投递邮件（正文纯文本，可带一个 PDF 附件）
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// (filename, bytes)
    pub attachment: Option<(String, Vec<u8>)>,
}

/// 邮件投递接口
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;

    fn is_enabled(&self) -> bool;
}

/// lettre SMTP 投递实现
pub struct SmtpMailer {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Configuration(format!("Failed to create SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if !self.config.enabled {
            return Err(MailError::NotEnabled);
        }

        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| MailError::Configuration("SMTP transport not initialized".into()))?;

        let from_mailbox: Mailbox =
            format!("{} <{}>", self.config.sender_name, self.config.sender_email)
                .parse()
                .map_err(|e| MailError::Configuration(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email
            .to
            .parse()
            .map_err(|e| MailError::InvalidRecipient(format!("Invalid recipient: {}", e)))?;

        let builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email.subject);

        let message = match email.attachment {
            Some((filename, bytes)) => {
                let pdf_part = Attachment::new(filename).body(
                    bytes,
                    ContentType::parse("application/pdf")
                        .map_err(|e| MailError::Configuration(format!("Invalid content type: {}", e)))?,
                );
                builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(
                                SinglePart::builder()
                                    .header(ContentType::TEXT_PLAIN)
                                    .body(email.body),
                            )
                            .singlepart(pdf_part),
                    )
                    .map_err(|e| MailError::SendFailed(format!("Failed to build message: {}", e)))?
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body)
                .map_err(|e| MailError::SendFailed(format!("Failed to build message: {}", e)))?,
        };

        transport
            .send(message)
            .await
            .map_err(|e| MailError::SendFailed(format!("Failed to send email: {}", e)))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}
