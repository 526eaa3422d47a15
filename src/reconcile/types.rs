use crate::feed::FeedError;

/// Errors raised while reading or writing the snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Snapshot JSON error: {0}")]
	JsonError(#[from] serde_json::Error),
}

/// Errors that stop a reconciliation step
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
	#[error("Feed error: {0}")]
	FeedError(#[from] FeedError),

	#[error("Snapshot error: {0}")]
	SnapshotError(#[from] SnapshotError),
}

/// Counters for one processed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
	/// Transactions in the delta.
	pub new: usize,
	/// Transactions written to the ledger.
	pub forwarded: usize,
	/// Transactions committed without forwarding.
	pub filtered: usize,
}

impl BatchStats {
	/// Transactions folded into the snapshot so far.
	pub fn committed(&self) -> usize {
		self.forwarded + self.filtered
	}

	/// Get a human-readable summary of the batch
	pub fn summary(&self) -> String {
		format!(
			"{} new transactions: {} forwarded, {} filtered{}",
			self.new,
			self.forwarded,
			self.filtered,
			if self.committed() < self.new {
				format!(", {} deferred", self.new - self.committed())
			} else {
				String::new()
			}
		)
	}
}

/// How a single reconciliation tick ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
	/// No snapshot could be loaded or bootstrapped; nothing else ran.
	SnapshotUnavailable,
	/// The feed could not be read; the snapshot is untouched.
	FetchFailed,
	/// The feed holds nothing the snapshot does not.
	NoNewTransactions,
	/// Every new transaction was handled and committed.
	Completed(BatchStats),
	/// The batch stopped early; the remainder is retried next tick.
	Aborted(BatchStats),
}
