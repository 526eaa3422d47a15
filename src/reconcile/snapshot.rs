//! Snapshot persistence for reconciliation.
//!
//! This module provides the `SnapshotStore`, which owns the single durable artifact of the
//! service: the transaction set as of the last reconciliation point. Storage is abstracted behind
//! `SnapshotRepository`; the file-based implementation replaces the snapshot atomically so that a
//! crash mid-write leaves either the old or the new snapshot, never a truncated one.
//!
//! On first start there is no snapshot. The store then bootstraps one from the feed and treats
//! it as already seen, so a cold start never forwards historical transactions.

use crate::feed::{Snapshot, Transaction, TransactionSource};
use crate::reconcile::types::{ReconcileError, SnapshotError};

use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Repository for snapshot persistence
#[async_trait::async_trait]
pub trait SnapshotRepository: Send + Sync {
	/// Load the persisted snapshot, or `None` if none has been written yet.
	async fn load(&self) -> Result<Option<Snapshot>, SnapshotError>;
	/// Replace the persisted snapshot.
	async fn commit(&self, snapshot: &[Transaction]) -> Result<(), SnapshotError>;
}

/// File-based implementation of SnapshotRepository
pub struct FileSnapshotRepository {
	data_dir: PathBuf,
}

impl FileSnapshotRepository {
	pub const FILE_NAME: &'static str = "transactions.json";

	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	pub fn path(&self) -> PathBuf {
		self.data_dir.join(Self::FILE_NAME)
	}

	fn temp_path(&self) -> PathBuf {
		self.data_dir.join(format!("{}.tmp", Self::FILE_NAME))
	}

	/// Write `content` to the temp file, flush it to disk and move it over the snapshot.
	async fn replace(&self, content: &[u8]) -> std::io::Result<()> {
		let mut file = tokio::fs::File::create(self.temp_path()).await?;
		file.write_all(content).await?;
		file.sync_all().await?;
		drop(file);
		tokio::fs::rename(self.temp_path(), self.path()).await
	}

	/// Persist the rename itself by syncing the directory entry.
	async fn sync_dir(&self) -> std::io::Result<()> {
		tokio::fs::File::open(&self.data_dir).await?.sync_all().await
	}
}

#[async_trait::async_trait]
impl SnapshotRepository for FileSnapshotRepository {
	async fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
		let path = self.path();
		let bytes = match tokio::fs::read(&path).await {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e.into()),
		};

		let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
		info!(
			"Loaded snapshot of {} transactions from {:?}",
			snapshot.len(),
			path
		);
		Ok(Some(snapshot))
	}

	async fn commit(&self, snapshot: &[Transaction]) -> Result<(), SnapshotError> {
		let content = serde_json::to_vec(snapshot)?;
		tokio::fs::create_dir_all(&self.data_dir).await?;

		// The rename is the commit point; until then the previous file is untouched
		if let Err(e) = self.replace(&content).await {
			if let Err(cleanup) = tokio::fs::remove_file(self.temp_path()).await {
				if cleanup.kind() != ErrorKind::NotFound {
					warn!("Failed to remove partial snapshot file: {}", cleanup);
				}
			}
			return Err(e.into());
		}
		if let Err(e) = self.sync_dir().await {
			warn!("Snapshot replaced but {:?} could not be synced: {}", self.data_dir, e);
		}

		info!("Committed snapshot of {} transactions", snapshot.len());
		Ok(())
	}
}

/// Front for the snapshot repository that adds cold-start bootstrapping.
pub struct SnapshotStore {
	repo: Box<dyn SnapshotRepository>,
}

impl SnapshotStore {
	pub fn new(repo: Box<dyn SnapshotRepository>) -> Self {
		Self { repo }
	}

	/// Return the persisted snapshot, bootstrapping it from `source` if none exists.
	///
	/// A bootstrapped snapshot is persisted before it is returned, so diffing the first fetch
	/// against it yields no deltas.
	pub async fn load(&self, source: &dyn TransactionSource) -> Result<Snapshot, ReconcileError> {
		if let Some(snapshot) = self.repo.load().await? {
			return Ok(snapshot);
		}

		info!("No snapshot found, bootstrapping baseline from the feed");
		let baseline = source.fetch_all().await?;
		self.repo.commit(&baseline).await?;
		info!(
			"Baseline snapshot holds {} transactions; none will be forwarded",
			baseline.len()
		);
		Ok(baseline)
	}

	/// Atomically replace the persisted snapshot.
	pub async fn commit(&self, snapshot: &[Transaction]) -> Result<(), SnapshotError> {
		self.repo.commit(snapshot).await
	}
}
