//! Source alert bag
//!
//! Content sources raise warning/error conditions (unreachable folder, empty
//! pool, bad metadata) into an `AlertBag`. Observers watch the bag through a
//! `tokio::sync::watch` channel and always see the latest full set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AlertSeverity {
    Warning,
    Error,
}

/// A single condition raised by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Stable key; raising the same key again replaces the previous alert
    pub key: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Change-observable set of alerts keyed by `Alert::key`
#[derive(Debug)]
pub struct AlertBag {
    tx: watch::Sender<Vec<Alert>>,
}

impl AlertBag {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Raise (or replace) the alert stored under `key`
    pub fn raise(&self, key: &str, severity: AlertSeverity, message: impl Into<String>) {
        let alert = Alert {
            key: key.to_string(),
            severity,
            message: message.into(),
            raised_at: crate::time::now(),
        };
        self.tx.send_modify(|alerts| {
            alerts.retain(|a| a.key != alert.key);
            alerts.push(alert);
        });
    }

    /// Clear the alert stored under `key`; returns whether one was present
    pub fn clear(&self, key: &str) -> bool {
        let mut removed = false;
        self.tx.send_if_modified(|alerts| {
            let before = alerts.len();
            alerts.retain(|a| a.key != key);
            removed = alerts.len() != before;
            removed
        });
        removed
    }

    /// Remove every alert
    pub fn clear_all(&self) {
        self.tx.send_if_modified(|alerts| {
            if alerts.is_empty() {
                false
            } else {
                alerts.clear();
                true
            }
        });
    }

    pub fn snapshot(&self) -> Vec<Alert> {
        self.tx.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Watch for changes; the receiver always holds the latest set
    pub fn subscribe(&self) -> watch::Receiver<Vec<Alert>> {
        self.tx.subscribe()
    }
}

impl Default for AlertBag {
    fn default() -> Self {
        Self::new()
    }
}
