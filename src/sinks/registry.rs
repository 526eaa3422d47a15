use crate::sinks::types::NotifyError;

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only lookup of recipients by role
#[async_trait::async_trait]
pub trait RoleRegistry: Send + Sync {
	/// Chat ids of every recipient holding `role`.
	async fn recipients_with_role(&self, role: &str) -> Result<Vec<i64>, NotifyError>;
}

/// Role registry kept by the chat bot in a SQLite `user_roles(user_id, role_name)` table.
///
/// The database belongs to the bot; it is opened read-only and may not exist at all, in which
/// case nobody holds any role.
pub struct SqliteRoleRegistry {
	path: PathBuf,
}

impl SqliteRoleRegistry {
	pub const FILE_NAME: &'static str = "checkbox451_bot.db";

	pub fn new(path: PathBuf) -> Self {
		Self { path }
	}

	/// Registry at its usual location inside the data directory.
	pub fn in_dir(data_dir: &Path) -> Self {
		Self::new(data_dir.join(Self::FILE_NAME))
	}
}

fn query_role(path: &Path, role: &str) -> Result<Vec<i64>, NotifyError> {
	if !path.exists() {
		debug!("Role registry {:?} does not exist", path);
		return Ok(Vec::new());
	}

	let conn = Connection::open_with_flags(
		path,
		OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
	)?;
	let mut stmt =
		conn.prepare("SELECT user_id FROM user_roles WHERE role_name = ?1 ORDER BY user_id")?;
	let ids = stmt
		.query_map([role], |row| row.get::<_, i64>(0))?
		.collect::<Result<Vec<_>, _>>()?;
	Ok(ids)
}

#[async_trait::async_trait]
impl RoleRegistry for SqliteRoleRegistry {
	async fn recipients_with_role(&self, role: &str) -> Result<Vec<i64>, NotifyError> {
		let path = self.path.clone();
		let role = role.to_string();

		tokio::task::spawn_blocking(move || query_role(&path, &role))
			.await
			.map_err(|e| NotifyError::TaskError(e.to_string()))?
	}
}
