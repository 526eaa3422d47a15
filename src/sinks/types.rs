/// Errors raised while writing to the ledger
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
	#[error("Invalid transaction date: {0:?}")]
	InvalidDate(String),

	#[error("Invalid transaction amount {0:?}: {1}")]
	InvalidAmount(String, rust_decimal::Error),

	#[error("Service account credentials error: {0}")]
	CredentialsError(String),

	#[error("Token signing error: {0}")]
	SigningError(#[from] jsonwebtoken::errors::Error),

	#[error("Token exchange rejected: {0}")]
	AuthError(String),

	#[error("Invalid ledger endpoint: {0}")]
	EndpointError(String),

	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Ledger returned status {status}: {body}")]
	StatusError {
		status: reqwest::StatusCode,
		body: String,
	},
}

/// Errors raised while notifying recipients
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
	#[error("Registry error: {0}")]
	RegistryError(#[from] rusqlite::Error),

	#[error("Registry task failed: {0}")]
	TaskError(String),

	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Message to {chat_id} rejected: {description}")]
	RejectedError { chat_id: i64, description: String },

	#[error("{failed} of {total} notifications failed")]
	DeliveryError { failed: usize, total: usize },
}
