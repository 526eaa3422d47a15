mod config;
mod feed;
mod reconcile;
mod sinks;
mod utils;

use tracing::{info, warn};

use crate::config::Config;
use crate::feed::PrivatStatementClient;
use crate::reconcile::{
	FileSnapshotRepository, ReconcileScheduler, SnapshotStore, TransactionFilter,
};
use crate::sinks::{
	DisabledLedger, DisabledNotifier, LedgerSink, Notifier, SheetsLedger, SqliteRoleRegistry,
	SupervisorNotifier, TelegramBot,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	dotenv::dotenv().ok();

	// RUST_LOG overrides the default info level
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting statement ledger sync");
	let config = Config::from_env()?;

	let source = PrivatStatementClient::new(
		config.feed.url.clone(),
		config.feed.api_id.clone(),
		config.feed.api_token.clone(),
	)?;
	info!("Created statement client for {}", config.feed.url);

	let store = SnapshotStore::new(Box::new(FileSnapshotRepository::new(
		config.data_dir.clone(),
	)));

	if config.accounts.is_empty() {
		info!("No account whitelist configured, forwarding credits on every account");
	} else {
		info!("Forwarding credits on {} accounts", config.accounts.len());
	}
	let filter = TransactionFilter::new(config.accounts.iter().cloned());

	let ledger: Box<dyn LedgerSink> = match &config.ledger {
		Some(ledger) => {
			info!("Appending to worksheet {:?}", ledger.worksheet_title);
			Box::new(SheetsLedger::new(
				ledger.credentials.clone(),
				ledger.spreadsheet_key.clone(),
				ledger.worksheet_title.clone(),
			)?)
		}
		None => {
			warn!("Google Sheets not configured, ledger disabled");
			Box::new(DisabledLedger)
		}
	};

	let notifier: Box<dyn Notifier> = match &config.notifier {
		Some(notifier) => Box::new(SupervisorNotifier::new(
			Box::new(TelegramBot::new(notifier.bot_token.clone())?),
			Box::new(SqliteRoleRegistry::in_dir(&config.data_dir)),
			notifier.supervisor_role.clone(),
		)),
		None => {
			warn!("Telegram bot not configured, notifications disabled");
			Box::new(DisabledNotifier)
		}
	};

	let scheduler = ReconcileScheduler::new(
		Box::new(source),
		store,
		filter,
		ledger,
		notifier,
		config.poll_interval,
	);

	scheduler.run().await;
	Ok(())
}
