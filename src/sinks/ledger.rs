//! Ledger sink: one spreadsheet row per forwarded credit.
//!
//! The ledger is the durable side of delivery. `append` either lands the row or reports an
//! error, and the scheduler will not move the snapshot past a transaction whose row failed.

use crate::feed::Transaction;
use crate::sinks::google_auth::{SPREADSHEETS_SCOPE, ServiceAccountAuth};
use crate::sinks::types::LedgerError;
use crate::utils::{extract_sender, parse_day_first_date};

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Url};
use rust_decimal::Decimal;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Default Google Sheets API base URL.
pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com";

/// Append-only ledger of forwarded transactions
#[async_trait::async_trait]
pub trait LedgerSink: Send + Sync {
	/// Append one row for `tx`.
	async fn append(&self, tx: &Transaction) -> Result<(), LedgerError>;
}

/// The `[date, amount, sender]` row written for a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
	pub date: NaiveDate,
	pub amount: Decimal,
	/// Normalized payer name, empty when the description does not name one.
	pub sender: String,
}

impl LedgerRow {
	pub fn from_transaction(tx: &Transaction) -> Result<Self, LedgerError> {
		let date = parse_day_first_date(&tx.date())
			.ok_or_else(|| LedgerError::InvalidDate(tx.date().to_string()))?;
		let amount = tx
			.amount()
			.trim()
			.parse::<Decimal>()
			.map_err(|e| LedgerError::InvalidAmount(tx.amount().to_string(), e))?;

		Ok(Self {
			date,
			amount,
			sender: extract_sender(&tx.payer_description()),
		})
	}

	/// Cell values in sheet order.
	pub fn values(&self) -> serde_json::Value {
		json!([self.date.format("%Y-%m-%d").to_string(), self.amount, self.sender])
	}
}

/// Ledger used when no spreadsheet is configured; accepts everything.
pub struct DisabledLedger;

#[async_trait::async_trait]
impl LedgerSink for DisabledLedger {
	async fn append(&self, tx: &Transaction) -> Result<(), LedgerError> {
		debug!("Ledger disabled, not recording {} UAH", tx.amount());
		Ok(())
	}
}

/// Google Sheets worksheet used as the ledger
pub struct SheetsLedger {
	http_client: Client,
	auth: ServiceAccountAuth,
	api_base: String,
	spreadsheet_key: String,
	worksheet_title: String,
}

impl SheetsLedger {
	/// Create a new Sheets ledger.
	///
	/// # Arguments
	/// * `credentials` - Path to the service-account key file.
	/// * `spreadsheet_key` - The spreadsheet id from its URL.
	/// * `worksheet_title` - The tab rows are appended to.
	pub fn new(
		credentials: PathBuf,
		spreadsheet_key: String,
		worksheet_title: String,
	) -> Result<Self, LedgerError> {
		let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;
		let auth = ServiceAccountAuth::new(http_client.clone(), credentials, SPREADSHEETS_SCOPE);

		Ok(Self {
			http_client,
			auth,
			api_base: DEFAULT_SHEETS_API.to_string(),
			spreadsheet_key,
			worksheet_title,
		})
	}

	/// The worksheet as an A1 range; the title is always quoted so spaces and punctuation survive.
	fn range(&self) -> String {
		format!("'{}'", self.worksheet_title.replace('\'', "''"))
	}

	fn append_url(&self) -> Result<Url, LedgerError> {
		let mut url = Url::parse(&self.api_base)
			.map_err(|e| LedgerError::EndpointError(format!("{}: {}", self.api_base, e)))?;
		let target = format!("{}:append", self.range());
		url.path_segments_mut()
			.map_err(|_| LedgerError::EndpointError(self.api_base.clone()))?
			.pop_if_empty()
			.extend([
				"v4",
				"spreadsheets",
				self.spreadsheet_key.as_str(),
				"values",
				target.as_str(),
			]);
		Ok(url)
	}

	/// The append request writing `row` below the worksheet's existing data.
	fn append_request(
		&self,
		row: &LedgerRow,
		token: &str,
	) -> Result<RequestBuilder, LedgerError> {
		Ok(self
			.http_client
			.post(self.append_url()?)
			.bearer_auth(token)
			.query(&[
				("valueInputOption", "USER_ENTERED"),
				("insertDataOption", "INSERT_ROWS"),
			])
			.json(&json!({ "values": [row.values()] })))
	}
}

#[async_trait::async_trait]
impl LedgerSink for SheetsLedger {
	async fn append(&self, tx: &Transaction) -> Result<(), LedgerError> {
		let row = LedgerRow::from_transaction(tx)?;
		let token = self.auth.access_token().await?;

		let response = self.append_request(&row, &token)?.send().await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(LedgerError::StatusError { status, body });
		}

		info!(
			"Appended ledger row: {} {} {:?}",
			row.date, row.amount, row.sender
		);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn tx(date: &str, amount: &str, description: &str) -> Transaction {
		serde_json::from_value(json!({
			"DAT_OD": date,
			"SUM_E": amount,
			"OSND": description,
			"TRANTYPE": "C",
		}))
		.unwrap()
	}

	fn ledger(title: &str) -> SheetsLedger {
		SheetsLedger::new(
			PathBuf::from("/nonexistent/key.json"),
			"sheet-key".to_string(),
			title.to_string(),
		)
		.unwrap()
	}

	#[test]
	fn test_row_from_transaction() {
		let row = LedgerRow::from_transaction(&tx(
			"05.03.2024",
			"1500.50",
			"ФОП Іванов, ПЕТРО петрович іванов",
		))
		.unwrap();

		assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
		assert_eq!(row.amount, Decimal::from_str("1500.50").unwrap());
		assert_eq!(row.sender, "Петро Петрович Іванов");
		assert_eq!(
			row.values(),
			json!(["2024-03-05", 1500.5, "Петро Петрович Іванов"])
		);
	}

	#[test]
	fn test_row_without_sender() {
		let row = LedgerRow::from_transaction(&tx("05.03.2024", "10", "Повернення коштів")).unwrap();
		assert_eq!(row.sender, "");
	}

	#[test]
	fn test_row_rejects_bad_date_and_amount() {
		assert!(matches!(
			LedgerRow::from_transaction(&tx("", "10.00", "")),
			Err(LedgerError::InvalidDate(_))
		));
		assert!(matches!(
			LedgerRow::from_transaction(&tx("05.03.2024", "10,00 грн", "")),
			Err(LedgerError::InvalidAmount(..))
		));
	}

	#[test]
	fn test_append_url_quotes_worksheet() {
		let url = ledger("Надходження").append_url().unwrap();
		assert!(url.as_str().starts_with(
			"https://sheets.googleapis.com/v4/spreadsheets/sheet-key/values/"
		));
		assert!(url.as_str().ends_with(":append"));

		let url = ledger("Sheet1").append_url().unwrap();
		assert_eq!(
			url.as_str(),
			"https://sheets.googleapis.com/v4/spreadsheets/sheet-key/values/'Sheet1':append"
		);
	}

	#[test]
	fn test_append_request_shape() {
		let row = LedgerRow::from_transaction(&tx(
			"05.03.2024",
			"1500.50",
			"Оплата, Петро Петрович Іванов",
		))
		.unwrap();
		let request = ledger("Sheet1")
			.append_request(&row, "access-token")
			.unwrap()
			.build()
			.unwrap();

		assert_eq!(request.method(), reqwest::Method::POST);
		assert_eq!(
			request.url().path(),
			"/v4/spreadsheets/sheet-key/values/'Sheet1':append"
		);
		let query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
		assert_eq!(
			query,
			vec![
				("valueInputOption".to_string(), "USER_ENTERED".to_string()),
				("insertDataOption".to_string(), "INSERT_ROWS".to_string()),
			]
		);
		assert_eq!(
			request.headers()[reqwest::header::AUTHORIZATION],
			"Bearer access-token"
		);

		let body: serde_json::Value =
			serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
		assert_eq!(
			body,
			json!({ "values": [["2024-03-05", 1500.5, "Петро Петрович Іванов"]] })
		);
	}

	#[test]
	fn test_row_from_numeric_amount() {
		let tx: Transaction = serde_json::from_value(json!({
			"DAT_OD": "05.03.2024",
			"SUM_E": 100.5,
			"TRANTYPE": "C",
		}))
		.unwrap();
		let row = LedgerRow::from_transaction(&tx).unwrap();
		assert_eq!(row.amount, Decimal::from_str("100.5").unwrap());
		assert_eq!(row.sender, "");
	}

	#[test]
	fn test_range_escapes_quotes() {
		assert_eq!(ledger("Bob's").range(), "'Bob''s'");
	}

	#[tokio::test]
	async fn test_invalid_row_fails_before_any_request() {
		let err = ledger("Sheet1")
			.append(&tx("not a date", "10.00", ""))
			.await
			.unwrap_err();
		assert!(matches!(err, LedgerError::InvalidDate(_)));
	}

	#[tokio::test]
	async fn test_disabled_ledger_accepts_anything() {
		assert!(DisabledLedger.append(&tx("", "", "")).await.is_ok());
	}
}
