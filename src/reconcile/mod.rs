//! Statement Reconciliation Module
//!
//! This module provides the core logic for reconciling the bank statement feed against the
//! locally persisted snapshot and forwarding newly seen credits to the sinks. It is composed of
//! several submodules, each responsible for one step of a reconciliation cycle:
//!
//! - `scheduler`: The main loop. Runs one fetch/diff/process cycle per tick and enforces the commit protocol.
//! - `delta`: Computes the transactions that are new relative to the last snapshot, in chronological order.
//! - `filter`: Decides which new transactions are forwarded (credits on whitelisted accounts).
//! - `snapshot`: Loads, bootstraps and atomically commits the snapshot file.
//! - `types`: Error types and per-cycle statistics.
//!
//! The scheduler only advances the committed snapshot past a transaction once its ledger write has
//! succeeded, so a failed write is retried on the next tick rather than lost.

/// Set difference between snapshots
pub mod delta;
/// Forwarding eligibility
pub mod filter;
/// Fixed-interval reconciliation loop
pub mod scheduler;
/// Snapshot persistence
pub mod snapshot;
/// Errors and cycle statistics
pub mod types;

pub use filter::TransactionFilter;
pub use scheduler::ReconcileScheduler;
pub use snapshot::{FileSnapshotRepository, SnapshotStore};
pub use types::*;
