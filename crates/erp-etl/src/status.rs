//! # ETL Status Board
//!
//! The latest run snapshot, published through a `tokio::sync::watch`
//! channel. The worker is the only writer; HTTP handlers read a clone of
//! the current value at any time and never block a run.
//!
//! ## Phases of One Run
//! ```text
//!   Waiting ──► Extracting ──┬──► Transforming ──► Loading ──► Succeeded
//!                            │                         │
//!                            └──► Terminated (empty)   └──► Failed: <msg>
//! ```
//!
//! `last_run` and `rows_loaded` only move on success. An empty or failed run
//! leaves them describing the last warehouse image that was actually loaded.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

// =============================================================================
// Phase
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EtlPhase {
    /// No run has happened yet.
    Waiting,
    Extracting,
    Transforming,
    Loading,
    Succeeded,
    /// Nothing validated to load; the warehouse was left as it was.
    Empty,
    Failed(String),
}

impl fmt::Display for EtlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtlPhase::Waiting => write!(f, "Waiting"),
            EtlPhase::Extracting => write!(f, "Extracting"),
            EtlPhase::Transforming => write!(f, "Transforming"),
            EtlPhase::Loading => write!(f, "Loading"),
            EtlPhase::Succeeded => write!(f, "Succeeded"),
            EtlPhase::Empty => write!(f, "Terminated (empty)"),
            EtlPhase::Failed(message) => write!(f, "Failed: {}", message),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// What `GET /etl/status` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlStatus {
    /// Completion time of the last successful run.
    pub last_run: Option<DateTime<Utc>>,
    pub status: String,
    /// Fact rows written by the last successful run.
    pub rows_loaded: u64,
}

impl Default for EtlStatus {
    fn default() -> Self {
        EtlStatus {
            last_run: None,
            status: EtlPhase::Waiting.to_string(),
            rows_loaded: 0,
        }
    }
}

// =============================================================================
// Board
// =============================================================================

/// Single-writer status cell. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<EtlStatus>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(EtlStatus::default());
        StatusBoard { tx: Arc::new(tx) }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> EtlStatus {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<EtlStatus> {
        self.tx.subscribe()
    }

    /// Publishes an intermediate or failure phase.
    pub fn set_phase(&self, phase: EtlPhase) {
        self.tx.send_modify(|status| status.status = phase.to_string());
    }

    /// Publishes a successful run in one update.
    pub fn succeeded(&self, rows_loaded: u64, at: DateTime<Utc>) {
        self.tx.send_modify(|status| {
            status.last_run = Some(at);
            status.rows_loaded = rows_loaded;
            status.status = EtlPhase::Succeeded.to_string();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_labels() {
        assert_eq!(EtlPhase::Empty.to_string(), "Terminated (empty)");
        assert_eq!(
            EtlPhase::Failed("disk full".into()).to_string(),
            "Failed: disk full"
        );
    }

    #[test]
    fn test_initial_snapshot() {
        let board = StatusBoard::new();
        let status = board.snapshot();
        assert_eq!(status.status, "Waiting");
        assert_eq!(status.last_run, None);
        assert_eq!(status.rows_loaded, 0);
    }

    #[test]
    fn test_failure_keeps_last_success() {
        let board = StatusBoard::new();
        let at = Utc::now();
        board.succeeded(12, at);
        board.set_phase(EtlPhase::Failed("locked".into()));

        let status = board.snapshot();
        assert_eq!(status.status, "Failed: locked");
        assert_eq!(status.rows_loaded, 12);
        assert_eq!(status.last_run, Some(at));
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let board = StatusBoard::new();
        let mut rx = board.subscribe();

        board.set_phase(EtlPhase::Extracting);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().status, "Extracting");
    }
}
