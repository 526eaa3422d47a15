//! Environment-sourced configuration.
//!
//! Everything is read once at startup into an immutable `Config` that is passed to the
//! components that need it.

use crate::feed::DEFAULT_STATEMENTS_URL;

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_SUPERVISOR_ROLE: &str = "SUPERVISOR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Missing required setting {0}")]
	Missing(&'static str),

	#[error("Invalid value {value:?} for {key}: {reason}")]
	Invalid {
		key: &'static str,
		value: String,
		reason: String,
	},
}

/// Credentials and endpoint for the statement feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
	pub url: String,
	pub api_id: String,
	pub api_token: String,
}

/// Target spreadsheet for the ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
	pub credentials: PathBuf,
	pub spreadsheet_key: String,
	pub worksheet_title: String,
}

/// Chat bot used for notifications.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
	pub bot_token: String,
	/// Role a registry entry needs to receive notifications.
	pub supervisor_role: String,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub feed: FeedConfig,
	/// Accounts whose credits are forwarded; empty forwards all.
	pub accounts: Vec<String>,
	/// Holds the snapshot file and the bot's role registry.
	pub data_dir: PathBuf,
	/// `None` disables the ledger.
	pub ledger: Option<LedgerConfig>,
	/// `None` disables notifications.
	pub notifier: Option<NotifierConfig>,
	pub poll_interval: Duration,
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Build the configuration from an arbitrary key lookup. Empty values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

		let feed = FeedConfig {
			url: get("PRIVAT_API_URL").unwrap_or_else(|| DEFAULT_STATEMENTS_URL.to_string()),
			api_id: require("PRIVAT_API_ID")?,
			api_token: require("PRIVAT_API_TOKEN")?,
		};

		let accounts = get("ACCOUNTS")
			.map(|raw| {
				raw.split(',')
					.map(str::trim)
					.filter(|account| !account.is_empty())
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default();

		let data_dir = get("DB_DIR")
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from("."));

		let ledger = match get("GOOGLE_APPLICATION_CREDENTIALS") {
			Some(credentials) => Some(LedgerConfig {
				credentials: PathBuf::from(credentials),
				spreadsheet_key: require("GOOGLE_SPREADSHEET_KEY")?,
				worksheet_title: require("GOOGLE_WORKSHEET_TITLE")?,
			}),
			None => None,
		};

		let notifier = get("TELEGRAM_BOT_TOKEN").map(|bot_token| NotifierConfig {
			bot_token,
			supervisor_role: get("SUPERVISOR_ROLE")
				.unwrap_or_else(|| DEFAULT_SUPERVISOR_ROLE.to_string()),
		});

		let poll_interval = match get("POLL_INTERVAL_SECS") {
			Some(raw) => {
				let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
					ConfigError::Invalid {
						key: "POLL_INTERVAL_SECS",
						value: raw.clone(),
						reason: e.to_string(),
					}
				})?;
				if secs == 0 {
					return Err(ConfigError::Invalid {
						key: "POLL_INTERVAL_SECS",
						value: raw,
						reason: "must be at least 1".to_string(),
					});
				}
				Duration::from_secs(secs)
			}
			None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
		};

		Ok(Self {
			feed,
			accounts,
			data_dir,
			ledger,
			notifier,
			poll_interval,
		})
	}
}
