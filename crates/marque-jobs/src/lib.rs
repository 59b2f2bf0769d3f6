//! # marque-jobs
//!
//! The enrichment pipeline: per-bookmark task handlers and the background
//! job worker that executes them.
//!
//! This crate provides:
//! - The [`JobHandler`] trait, execution context and result types
//! - A polling [`JobWorker`] with concurrent execution, per-job timeouts,
//!   and broadcast progress events
//! - The five pipeline handlers: sync sweep, autotag, readability,
//!   summarize, and search
//! - Adapters for the external collaborators (readability-cli subprocess,
//!   Brave web search)
//! - The dispatch graph as data ([`first_wave`], [`SearchFollowUps`])
//!
//! Cross-task ordering is expressed entirely through event-log guards and
//! explicit re-submission; handlers never call each other.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use marque_jobs::{SyncSweepHandler, WorkerBuilder, WorkerConfig};
//!
//! let worker = WorkerBuilder::new(jobs.clone())
//!     .with_config(WorkerConfig::from_env())
//!     .with_handler(SyncSweepHandler::new(client, events, jobs))
//!     .build()
//!     .await;
//! let handle = worker.start();
//! // ...
//! handle.shutdown().await?;
//! ```

pub mod adapters;
pub mod autotag;
pub mod dispatch;
pub mod handler;
pub mod readability;
pub mod search;
pub mod summarize;
pub mod sync;
pub mod worker;

// Re-export core types
pub use marque_core::*;

pub use adapters::{BraveSearch, ReadabilityCli};
pub use autotag::AutotagHandler;
pub use dispatch::{first_wave, submit_for_bookmark, SearchFollowUps};
pub use handler::{JobContext, JobHandler, JobResult, NoOpHandler};
pub use readability::ReadabilityHandler;
pub use search::SearchHandler;
pub use summarize::SummarizeHandler;
pub use sync::SyncSweepHandler;
pub use worker::{JobWorker, WorkerBuilder, WorkerConfig, WorkerEvent, WorkerHandle};
