//! Mapscout Session - job lifecycle and orchestration.
//!
//! This crate owns the per-job state machine (Pending, Running, Completed,
//! Failed), the in-memory session store callers poll for status, and the
//! [`JobManager`] that wires the credit ledger to the extraction pipeline:
//! debit before the session exists, refund exactly once on terminal failure,
//! usage recorded on success.
//!
//! # Modules
//!
//! - [`error`] - Session-layer error types
//! - [`session`] - The session record, its status machine, and snapshots
//! - [`store`] - Concurrent in-memory session store with retention sweeping
//! - [`runner`] - The contract between the manager and the pipeline
//! - [`manager`] - Credit-gated job submission and status queries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod manager;
pub mod runner;
pub mod session;
pub mod store;

pub use error::{Result, SessionError};
pub use manager::{JobManager, SubmitReceipt};
pub use runner::{JobFailure, JobRunner, PipelineRunner};
pub use session::{ScrapeSession, SessionSnapshot, SessionStatus};
pub use store::{SessionHandle, SessionStore};
