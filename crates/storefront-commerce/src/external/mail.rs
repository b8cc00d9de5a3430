//! Outbound mail collaborator.
//!
//! Delivery transport lives outside this core. Services treat sending
//! as fire-and-forget: a failed send is logged and never rolls back
//! the transaction that triggered it.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::info;

/// A file attached to an outbound message.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// An outbound message.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<MailAttachment>,
}

/// Delivery failure reported by the transport.
#[derive(Error, Debug)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Mail transport seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Transport that only logs. The default wiring for environments
/// without a mail relay.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "mail (log only)");
        Ok(())
    }
}

/// Transport that records every message, for assertions in tests. Can
/// be switched to reject sends to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<MailMessage>>,
    rejecting: bool,
}

impl MemoryMailer {
    /// A mailer that accepts and records everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer that rejects every send.
    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            rejecting: true,
        }
    }

    /// Messages recorded so far.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        if self.rejecting {
            return Err(MailError("transport rejected the message".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}
