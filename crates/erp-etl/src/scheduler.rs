//! # ETL Scheduler
//!
//! A single worker task owns the [`Pipeline`] and drains a bounded queue of
//! run requests, so two runs never overlap.
//!
//! ## Worker Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           EtlWorker::run()                              │
//! │                                                                         │
//! │   interval tick ──try_send(Scheduled)──┐                               │
//! │                                        ▼                               │
//! │   EtlHandle::trigger ──try_send(Manual)──► [ bounded mpsc ] ──► run()  │
//! │          │                                                             │
//! │          └── queue full → Coalesced (a run is already pending)        │
//! │                                                                         │
//! │   EtlHandle::shutdown ───────────────────────────────────► stop        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed run is recorded on the status board and the loop keeps going.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::EtlConfig;
use crate::error::{EtlError, EtlResult};
use crate::pipeline::Pipeline;
use crate::status::{EtlStatus, StatusBoard};

/// Why a run was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTrigger {
    Scheduled,
    Manual,
}

/// Answer to a manual trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerAck {
    /// A new run was queued.
    Accepted,
    /// A run was already pending; this request folds into it.
    Coalesced,
}

// =============================================================================
// Worker
// =============================================================================

pub struct EtlWorker {
    pipeline: Pipeline,
    requests_rx: mpsc::Receiver<RunTrigger>,
    /// Used by the interval timer to enqueue scheduled runs.
    requests_tx: mpsc::Sender<RunTrigger>,
    shutdown_rx: mpsc::Receiver<()>,
    /// None when the timer is disabled.
    interval: Option<Duration>,
}

/// Cloneable control surface for a running worker.
#[derive(Debug, Clone)]
pub struct EtlHandle {
    requests_tx: mpsc::Sender<RunTrigger>,
    shutdown_tx: mpsc::Sender<()>,
    board: StatusBoard,
}

impl EtlHandle {
    /// Queues a manual run and returns immediately.
    pub fn trigger(&self) -> EtlResult<TriggerAck> {
        match self.requests_tx.try_send(RunTrigger::Manual) {
            Ok(()) => {
                info!("Manual ETL run queued");
                Ok(TriggerAck::Accepted)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("ETL run already pending, trigger coalesced");
                Ok(TriggerAck::Coalesced)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(EtlError::ShuttingDown),
        }
    }

    pub fn status(&self) -> EtlStatus {
        self.board.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<EtlStatus> {
        self.board.subscribe()
    }

    /// Asks the worker to stop after its current run.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl EtlWorker {
    /// Creates a worker and its handle. Nothing runs until [`EtlWorker::run`].
    pub fn new(pipeline: Pipeline, config: &EtlConfig) -> (Self, EtlHandle) {
        let (requests_tx, requests_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let handle = EtlHandle {
            requests_tx: requests_tx.clone(),
            shutdown_tx,
            board: pipeline.board().clone(),
        };

        let worker = EtlWorker {
            pipeline,
            requests_rx,
            requests_tx,
            shutdown_rx,
            interval: config.enabled.then(|| config.interval()),
        };

        (worker, handle)
    }

    /// Spawns [`EtlWorker::run`] on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs the worker loop until shutdown.
    pub async fn run(mut self) {
        info!(interval = ?self.interval, "ETL worker starting");

        // First scheduled run is one full period after startup.
        let period = self.interval.unwrap_or(Duration::from_secs(3600));
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let timer_enabled = self.interval.is_some();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("ETL worker shutting down");
                    break;
                }

                Some(trigger) = self.requests_rx.recv() => {
                    debug!(?trigger, "Starting ETL run");
                    // Failure is already on the board
                    let _ = self.pipeline.run().await;
                }

                _ = ticker.tick(), if timer_enabled => {
                    if self.requests_tx.try_send(RunTrigger::Scheduled).is_err() {
                        warn!("Scheduled ETL run skipped, a run is already pending");
                    }
                }
            }
        }

        info!("ETL worker stopped");
    }
}
