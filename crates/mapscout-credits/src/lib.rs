//! Mapscout Credits - prepaid-credit ledger contract.
//!
//! Every extraction job is wrapped in a debit-then-refund-on-failure
//! transaction. The durable ledger is an external collaborator; this crate
//! defines the contract the job manager consumes plus an in-memory
//! implementation used in development and tests.

pub mod error;
pub mod ledger;
pub mod memory;

pub use error::{LedgerError, Result};
pub use ledger::{CreditLedger, UsageRecord};
pub use memory::MemoryLedger;
