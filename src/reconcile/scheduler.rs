//! Reconciliation scheduler and integration point for all services.
//!
//! This module defines the `ReconcileScheduler`, which runs the fetch/diff/process cycle on a
//! fixed interval. Cycles never overlap: the next one starts only after the previous one has
//! returned and the interval has elapsed.
//!
//! The scheduler is responsible for:
//! - Loading (or bootstrapping) the snapshot before the first cycle
//! - Fetching the feed and computing the delta against the committed snapshot
//! - Forwarding eligible transactions to the ledger, in chronological order
//! - Committing the snapshot after every handled transaction, and never past a failed ledger write
//! - Sending best-effort notifications once a transaction is committed
//!
//! Every failure is logged and turned into "try again next tick"; nothing here ends the process.

use crate::feed::{Snapshot, Transaction, TransactionSource};
use crate::reconcile::{
	delta::diff,
	filter::TransactionFilter,
	snapshot::SnapshotStore,
	types::{BatchStats, CycleOutcome},
};
use crate::sinks::{LedgerSink, Notifier};

use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs reconciliation cycles and enforces the commit protocol.
pub struct ReconcileScheduler {
	// Services
	source: Box<dyn TransactionSource>,
	store: SnapshotStore,
	filter: TransactionFilter,
	ledger: Box<dyn LedgerSink>,
	notifier: Box<dyn Notifier>,

	// Configuration
	interval: Duration,

	/// Last successfully committed snapshot; `None` until it has been loaded.
	committed: Option<Snapshot>,
}

impl ReconcileScheduler {
	pub fn new(
		source: Box<dyn TransactionSource>,
		store: SnapshotStore,
		filter: TransactionFilter,
		ledger: Box<dyn LedgerSink>,
		notifier: Box<dyn Notifier>,
		interval: Duration,
	) -> Self {
		Self {
			source,
			store,
			filter,
			ledger,
			notifier,
			interval,
			committed: None,
		}
	}

	/// Run cycles forever, sleeping for the configured interval between them.
	pub async fn run(mut self) {
		info!(
			"Starting reconciliation loop, polling every {}s",
			self.interval.as_secs()
		);

		loop {
			self.tick().await;
			tokio::time::sleep(self.interval).await;
		}
	}

	/// Run a single fetch/diff/process cycle.
	pub async fn tick(&mut self) -> CycleOutcome {
		if self.committed.is_none() {
			match self.store.load(self.source.as_ref()).await {
				Ok(snapshot) => self.committed = Some(snapshot),
				Err(e) => {
					error!("Failed to load snapshot: {}", e);
					return CycleOutcome::SnapshotUnavailable;
				}
			}
		}

		let curr = match self.source.fetch_all().await {
			Ok(curr) => curr,
			Err(e) => {
				error!("Failed to fetch transactions: {}", e);
				return CycleOutcome::FetchFailed;
			}
		};

		let delta = diff(self.committed.as_deref().unwrap_or_default(), &curr);
		if delta.is_empty() {
			info!("No new transactions");
			return CycleOutcome::NoNewTransactions;
		}

		info!("Found {} new transactions", delta.len());
		self.process(&curr, delta).await
	}

	/// Handle the delta in order, committing after each transaction.
	///
	/// The snapshot committed after a transaction is `curr` without the delta entries that are
	/// still pending, so a later tick re-derives exactly the unprocessed remainder.
	async fn process(&mut self, curr: &[Transaction], delta: Vec<Transaction>) -> CycleOutcome {
		let keyed: Vec<(String, &Transaction)> =
			curr.iter().map(|tx| (tx.canonical_key(), tx)).collect();
		let mut pending: HashSet<String> = delta.iter().map(Transaction::canonical_key).collect();
		let mut stats = BatchStats {
			new: delta.len(),
			..Default::default()
		};

		for tx in &delta {
			let eligible = self.filter.is_eligible(tx);

			if eligible {
				info!(
					"Forwarding credit of {} on {} at {}",
					tx.amount(),
					tx.account_id(),
					tx.timestamp()
				);
				if let Err(e) = self.ledger.append(tx).await {
					error!(
						"Ledger write failed, deferring {} remaining transactions: {}",
						stats.new - stats.committed(),
						e
					);
					return CycleOutcome::Aborted(stats);
				}
			}

			pending.remove(&tx.canonical_key());
			let next: Snapshot = keyed
				.iter()
				.filter(|(key, _)| !pending.contains(key))
				.map(|(_, tx)| (*tx).clone())
				.collect();

			if let Err(e) = self.store.commit(&next).await {
				error!(
					"Snapshot commit failed, deferring {} remaining transactions: {}",
					stats.new - stats.committed(),
					e
				);
				return CycleOutcome::Aborted(stats);
			}
			self.committed = Some(next);

			if eligible {
				stats.forwarded += 1;
				if let Err(e) = self.notifier.notify(tx).await {
					warn!("Notification failed: {}", e);
				}
			} else {
				stats.filtered += 1;
			}
		}

		info!("Cycle complete: {}", stats.summary());
		CycleOutcome::Completed(stats)
	}
}
