//! Outgoing mail: transports and a fire-and-forget dispatch queue.
//!
//! Request handlers hand messages to `MailQueue::submit`, which returns at
//! once. A single background worker drains the queue through a `Mailer`.
//! Delivery failures are logged and dropped; there is no retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Mail errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail queue is closed")]
    QueueClosed,
}

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), MailError>;

    /// Transport identifier for logging.
    fn name(&self) -> &str;
}

/// Transport that writes messages to the log instead of delivering them.
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        info!(from = %self.sender, to = %mail.to, subject = %mail.subject, "mail sent");
        debug!(body = %mail.body, "mail body");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Transport that keeps every message in memory.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Mail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Mail> {
        self.sent.lock().await.clone()
    }

    /// Wait until at least `count` messages have been sent, or `timeout`
    /// passes. Returns whatever has been sent by then.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Mail> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent().await;
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Handle for submitting mail to the background worker. Cheap to clone.
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::UnboundedSender<Mail>,
}

impl MailQueue {
    /// Start the delivery worker on the current tokio runtime.
    ///
    /// The worker stops once every `MailQueue` clone has been dropped and
    /// the queue is drained.
    pub fn spawn(mailer: Arc<dyn Mailer>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(rx, mailer));
        (Self { tx }, handle)
    }

    /// Queue a message and return immediately.
    pub fn submit(&self, mail: Mail) {
        if let Err(e) = self.try_submit(mail) {
            warn!("mail dropped: {e}");
        }
    }

    pub fn try_submit(&self, mail: Mail) -> Result<(), MailError> {
        self.tx.send(mail).map_err(|_| MailError::QueueClosed)
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<Mail>, mailer: Arc<dyn Mailer>) {
    debug!(transport = mailer.name(), "mail worker started");
    while let Some(mail) = rx.recv().await {
        match mailer.send(&mail).await {
            Ok(()) => debug!(to = %mail.to, "mail delivered"),
            Err(e) => error!(
                transport = mailer.name(),
                to = %mail.to,
                subject = %mail.subject,
                "mail delivery failed: {e}"
            ),
        }
    }
    debug!("mail worker stopped");
}
