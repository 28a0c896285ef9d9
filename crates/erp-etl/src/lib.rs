//! # erp-etl: Star-Schema ETL for the Distribution ERP
//!
//! Rebuilds the analytical warehouse from validated orders, on a timer and
//! on demand, and publishes the state of each run.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ETL Architecture                                 │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  EtlWorker (single consumer)                      │  │
//! │  │                                                                  │  │
//! │  │  Spawned as a Tokio task by erp-server                          │  │
//! │  │  Drains the run queue, one run at a time                         │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │   Pipeline     │  │  StatusBoard   │  │     EtlConfig          │    │
//! │  │                │  │                │  │                        │    │
//! │  │ extract from   │  │ watch channel  │  │ interval, queue size,  │    │
//! │  │ erp.db, load   │  │ last_run,      │  │ store dimension,       │    │
//! │  │ warehouse.db   │  │ rows_loaded    │  │ enabled                │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Interval, queue capacity and store dimension settings
//! - [`error`] - ETL error types
//! - [`pipeline`] - Extract, transform, load
//! - [`scheduler`] - `EtlWorker` loop and `EtlHandle`
//! - [`status`] - Run snapshot published through a watch channel
//!
//! ## Usage
//! ```rust,ignore
//! let board = StatusBoard::new();
//! let pipeline = Pipeline::new(erp, warehouse, config.store(), board);
//! let (worker, handle) = EtlWorker::new(pipeline, &config);
//! worker.spawn();
//!
//! handle.trigger()?;          // Accepted or Coalesced
//! let status = handle.status();
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod status;

pub use config::EtlConfig;
pub use error::{EtlError, EtlResult};
pub use pipeline::{Pipeline, RunOutcome};
pub use scheduler::{EtlHandle, EtlWorker, RunTrigger, TriggerAck};
pub use status::{EtlPhase, EtlStatus, StatusBoard};
