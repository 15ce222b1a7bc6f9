//! Mock email transport.
//!
//! Stands in for a real provider during simulation: every send gets a random
//! message id, waits a short artificial latency, and succeeds.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Length of generated message ids.
const MESSAGE_ID_LEN: usize = 11;

/// Outbox entries kept for inspection; further sends are not recorded.
const MAX_OUTBOX: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub id: String,
    pub ok: bool,
}

/// A message the mock transport accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentEmail {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Mock email provider. Cannot fail.
pub struct MockMailer {
    delay: Duration,
    outbox: DashMap<String, SentEmail>,
}

impl std::fmt::Debug for MockMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMailer")
            .field("delay", &self.delay)
            .field("outbox", &self.outbox.len())
            .finish()
    }
}

impl MockMailer {
    pub fn new(delay: Duration) -> Self {
        info!(delay_ms = delay.as_millis() as u64, "Mock mailer initialized");
        Self {
            delay,
            outbox: DashMap::new(),
        }
    }

    /// Mailer without artificial latency, for tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// "Send" an email: log it, wait the configured latency, return a receipt.
    pub async fn send(&self, email: &OutboundEmail) -> SendReceipt {
        let id = message_id();
        info!(
            id = %id,
            to = %email.to,
            subject = %email.subject,
            "Mock email send"
        );
        debug!(id = %id, body = %email.body, "Mock email body");

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.outbox.len() < MAX_OUTBOX {
            self.outbox.insert(
                id.clone(),
                SentEmail {
                    id: id.clone(),
                    to: email.to.clone(),
                    subject: email.subject.clone(),
                    body: email.body.clone(),
                    sent_at: Utc::now(),
                },
            );
        }
        metrics::counter!("mailer.sent").increment(1);

        SendReceipt { id, ok: true }
    }

    pub fn get(&self, id: &str) -> Option<SentEmail> {
        self.outbox.get(id).map(|e| e.value().clone())
    }

    /// Recorded sends, oldest first.
    pub fn sent(&self) -> Vec<SentEmail> {
        let mut sent: Vec<SentEmail> = self.outbox.iter().map(|e| e.value().clone()).collect();
        sent.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        sent
    }

    pub fn count(&self) -> usize {
        self.outbox.len()
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::instant()
    }
}

fn message_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(MESSAGE_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
