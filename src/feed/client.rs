//!
//! HTTP client for the PrivatBank interim statement API.
//!
//! The feed is read in pages addressed by an opaque `followId` cursor. This module exposes the
//! single-page request as `StatementPageSource` and the full, paginated read as
//! `TransactionSource`. Pagination lives in `fetch_all_pages` so it can be driven by any page
//! source.

use super::types::*;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

/// Default interim statements endpoint.
pub const DEFAULT_STATEMENTS_URL: &str =
	"https://acp.privatbank.ua/api/statements/transactions/interim";

const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A source of individual statement pages.
#[async_trait::async_trait]
pub trait StatementPageSource: Send + Sync {
	/// Fetch the page addressed by `cursor`; the first page uses an empty cursor.
	async fn fetch_page(&self, cursor: &str) -> Result<StatementPage, FeedError>;
}

/// A source of the complete current transaction set.
#[async_trait::async_trait]
pub trait TransactionSource: Send + Sync {
	/// Fetch every transaction the feed currently reports.
	///
	/// Either the full set is returned or an error; a partial read is never exposed.
	async fn fetch_all(&self) -> Result<Vec<Transaction>, FeedError>;
}

/// Follow the feed's pagination from the first page to the last and concatenate the results.
pub async fn fetch_all_pages(
	source: &dyn StatementPageSource,
) -> Result<Vec<Transaction>, FeedError> {
	let mut transactions = Vec::new();
	let mut cursor = String::new();
	let mut pages = 0usize;

	loop {
		let page = source.fetch_page(&cursor).await?;
		pages += 1;
		transactions.extend(page.transactions);

		if !page.exist_next_page {
			break;
		}

		let next = page
			.next_page_id
			.filter(|id| !id.is_empty())
			.ok_or(FeedError::MissingCursor)?;
		if next == cursor {
			return Err(FeedError::CursorLoop(next));
		}
		cursor = next;
	}

	debug!(
		"Fetched {} transactions across {} pages",
		transactions.len(),
		pages
	);
	Ok(transactions)
}

/// PrivatBank statement API client
#[derive(Clone)]
pub struct PrivatStatementClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// The statements endpoint.
	url: String,
	/// Value of the `id` auth header.
	api_id: String,
	/// Value of the `token` auth header.
	api_token: String,
}

impl PrivatStatementClient {
	/// Create a new statement client.
	///
	/// # Arguments
	/// * `url` - The interim statements endpoint.
	/// * `api_id` - The client id issued for the account.
	/// * `api_token` - The API token issued for the account.
	pub fn new(url: String, api_id: String, api_token: String) -> Result<Self, FeedError> {
		let http_client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()?;

		Ok(Self {
			http_client,
			url,
			api_id,
			api_token,
		})
	}

	/// The request for the page addressed by `cursor`.
	fn page_request(&self, cursor: &str) -> RequestBuilder {
		self.http_client
			.get(&self.url)
			.header("id", &self.api_id)
			.header("token", &self.api_token)
			.header(USER_AGENT, CLIENT_USER_AGENT)
			.header(CONTENT_TYPE, "application/json; charset=utf8")
			.query(&[("followId", cursor)])
	}
}

#[async_trait::async_trait]
impl StatementPageSource for PrivatStatementClient {
	async fn fetch_page(&self, cursor: &str) -> Result<StatementPage, FeedError> {
		debug!("Requesting statement page with cursor {:?}", cursor);

		let response = self.page_request(cursor).send().await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(FeedError::StatusError { status, body });
		}

		let body = response.bytes().await?;
		let page: StatementPage = serde_json::from_slice(&body)?;
		Ok(page)
	}
}

#[async_trait::async_trait]
impl TransactionSource for PrivatStatementClient {
	async fn fetch_all(&self) -> Result<Vec<Transaction>, FeedError> {
		fetch_all_pages(self).await
	}
}
