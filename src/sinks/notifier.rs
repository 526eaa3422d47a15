//! Supervisor notifications.
//!
//! Notifications are best-effort. By the time one is sent the transaction is already committed
//! to the snapshot, so a failure is reported to the caller for logging and never retried.

use crate::feed::Transaction;
use crate::sinks::registry::RoleRegistry;
use crate::sinks::types::NotifyError;
use crate::utils::extract_sender;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Best-effort announcement of a forwarded transaction
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
	async fn notify(&self, tx: &Transaction) -> Result<(), NotifyError>;
}

/// Delivery of a single text message to a single chat
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
	async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
}

/// Message announcing a non-cash credit.
pub fn notification_text(tx: &Transaction) -> String {
	let sender = extract_sender(&tx.payer_description());
	let mut text = format!("Безготівкове зарахування: {} грн", tx.amount());
	if !sender.is_empty() {
		text.push_str(" від ");
		text.push_str(&sender);
	}
	text
}

/// Notifier used when no bot is configured.
pub struct DisabledNotifier;

#[async_trait::async_trait]
impl Notifier for DisabledNotifier {
	async fn notify(&self, _tx: &Transaction) -> Result<(), NotifyError> {
		debug!("Notifications disabled");
		Ok(())
	}
}

/// Sends one message per transaction to every recipient holding the supervisor role.
pub struct SupervisorNotifier {
	transport: Box<dyn ChatTransport>,
	registry: Box<dyn RoleRegistry>,
	role: String,
}

impl SupervisorNotifier {
	pub fn new(
		transport: Box<dyn ChatTransport>,
		registry: Box<dyn RoleRegistry>,
		role: String,
	) -> Self {
		Self {
			transport,
			registry,
			role,
		}
	}
}

#[async_trait::async_trait]
impl Notifier for SupervisorNotifier {
	async fn notify(&self, tx: &Transaction) -> Result<(), NotifyError> {
		let recipients = self.registry.recipients_with_role(&self.role).await?;
		if recipients.is_empty() {
			debug!("No {} recipients registered, skipping notification", self.role);
			return Ok(());
		}

		let text = notification_text(tx);
		let mut failed = 0;
		for chat_id in &recipients {
			if let Err(e) = self.transport.send_message(*chat_id, &text).await {
				warn!("Failed to notify {}: {}", chat_id, e);
				failed += 1;
			}
		}

		if failed > 0 {
			return Err(NotifyError::DeliveryError {
				failed,
				total: recipients.len(),
			});
		}

		info!("Notified {} recipients", recipients.len());
		Ok(())
	}
}

#[derive(Deserialize)]
struct BotApiResponse {
	ok: bool,
	#[serde(default)]
	description: Option<String>,
}

/// Telegram Bot API transport
pub struct TelegramBot {
	http_client: Client,
	api_base: String,
	token: String,
}

impl TelegramBot {
	pub fn new(token: String) -> Result<Self, NotifyError> {
		let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

		Ok(Self {
			http_client,
			api_base: DEFAULT_TELEGRAM_API.to_string(),
			token,
		})
	}
}

#[async_trait::async_trait]
impl ChatTransport for TelegramBot {
	async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
		let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);

		// The bot token is part of the URL, so it is stripped from any error we surface
		let response = self
			.http_client
			.post(url)
			.json(&json!({ "chat_id": chat_id, "text": text }))
			.send()
			.await
			.map_err(|e| NotifyError::HttpError(e.without_url()))?;

		let status = response.status();
		let body: BotApiResponse = response
			.json()
			.await
			.map_err(|e| NotifyError::HttpError(e.without_url()))?;

		if !status.is_success() || !body.ok {
			return Err(NotifyError::RejectedError {
				chat_id,
				description: body.description.unwrap_or_else(|| status.to_string()),
			});
		}

		debug!("Sent message to {}", chat_id);
		Ok(())
	}
}
