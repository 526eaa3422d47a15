//! Types for the statement feed and the transaction records it returns

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Transaction type code marking incoming funds.
pub const CREDIT_TYPE_CODE: &str = "C";

/// A single statement transaction as reported by the feed.
///
/// Records are kept as the raw JSON object the feed sent, so persisting and reloading one
/// reproduces it exactly, whatever types its fields carry. The fields the service reads are
/// exposed through accessors that render strings and numbers as text and anything else as `""`.
/// Equality is structural: two records are equal iff all of their fields match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction {
	fields: BTreeMap<String, Value>,
}

impl Transaction {
	/// Operation date, day-first.
	pub const DATE: &'static str = "DAT_OD";
	/// Amount as a decimal.
	pub const AMOUNT: &'static str = "SUM_E";
	/// Free-text payment purpose, usually ending in the payer's name.
	pub const PAYER_DESCRIPTION: &'static str = "OSND";
	/// Own account the transaction belongs to.
	pub const ACCOUNT_ID: &'static str = "AUT_MY_ACC";
	/// `C` for credit, `D` for debit.
	pub const TYPE_CODE: &'static str = "TRANTYPE";
	/// Full day-first date-time.
	pub const TIMESTAMP: &'static str = "DATE_TIME_DAT_OD_TIM_P";

	fn text(&self, name: &str) -> Cow<'_, str> {
		match self.fields.get(name) {
			Some(Value::String(value)) => Cow::Borrowed(value),
			Some(Value::Number(value)) => Cow::Owned(value.to_string()),
			_ => Cow::Borrowed(""),
		}
	}

	pub fn date(&self) -> Cow<'_, str> {
		self.text(Self::DATE)
	}

	pub fn amount(&self) -> Cow<'_, str> {
		self.text(Self::AMOUNT)
	}

	pub fn payer_description(&self) -> Cow<'_, str> {
		self.text(Self::PAYER_DESCRIPTION)
	}

	pub fn account_id(&self) -> Cow<'_, str> {
		self.text(Self::ACCOUNT_ID)
	}

	pub fn type_code(&self) -> Cow<'_, str> {
		self.text(Self::TYPE_CODE)
	}

	pub fn timestamp(&self) -> Cow<'_, str> {
		self.text(Self::TIMESTAMP)
	}

	pub fn is_credit(&self) -> bool {
		self.type_code() == CREDIT_TYPE_CODE
	}

	/// Canonical encoding used as the record's identity.
	///
	/// All fields are rendered as one JSON object with keys in ascending order, so the same
	/// record always encodes to the same string no matter which order the feed or the snapshot
	/// file listed its fields in.
	pub fn canonical_key(&self) -> String {
		Value::Object(
			self.fields
				.iter()
				.map(|(name, value)| (name.clone(), value.clone()))
				.collect(),
		)
		.to_string()
	}
}

/// The last fully reconciled transaction set.
pub type Snapshot = Vec<Transaction>;

/// One page of the statement feed.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementPage {
	pub transactions: Vec<Transaction>,
	/// Whether another page follows this one. Required: a page that omits it is malformed.
	pub exist_next_page: bool,
	/// Cursor for the next page; only meaningful when `exist_next_page` is set.
	#[serde(default)]
	pub next_page_id: Option<String>,
}

/// Error types for statement feed operations
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("Feed returned status {status}: {body}")]
	StatusError {
		status: reqwest::StatusCode,
		body: String,
	},

	#[error("Feed reported a next page without a cursor")]
	MissingCursor,

	#[error("Feed returned cursor {0:?} twice in a row")]
	CursorLoop(String),
}

#[cfg(test)]
impl Transaction {
	/// Build a record with the known fields set and one passthrough field.
	pub(crate) fn fixture(
		timestamp: &str,
		amount: &str,
		type_code: &str,
		account_id: &str,
		payer_description: &str,
	) -> Self {
		let date = timestamp.split_whitespace().next().unwrap_or_default();
		serde_json::from_value(serde_json::json!({
			"DAT_OD": date,
			"SUM_E": amount,
			"OSND": payer_description,
			"AUT_MY_ACC": account_id,
			"TRANTYPE": type_code,
			"DATE_TIME_DAT_OD_TIM_P": timestamp,
			"CCY": "UAH",
		}))
		.unwrap()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_known_and_passthrough_fields_round_trip() {
		let raw = json!({
			"DAT_OD": "05.03.2024",
			"SUM_E": "1500.00",
			"OSND": "Оплата, Петро Петрович Іванов",
			"AUT_MY_ACC": "UA001",
			"TRANTYPE": "C",
			"DATE_TIME_DAT_OD_TIM_P": "05.03.2024 10:15:00",
			"ID": "98765",
			"AUT_CNTR_NAM": "ФОП Іванов",
			"NESTED": { "b": 1, "a": [true, null] }
		});

		let tx: Transaction = serde_json::from_value(raw.clone()).unwrap();
		assert_eq!(tx.date(), "05.03.2024");
		assert_eq!(tx.amount(), "1500.00");
		assert_eq!(tx.account_id(), "UA001");
		assert!(tx.is_credit());
		assert_eq!(tx.fields.len(), 9);

		assert_eq!(serde_json::to_value(&tx).unwrap(), raw);
	}

	#[test]
	fn test_missing_known_field_stays_missing() {
		let tx: Transaction = serde_json::from_value(json!({ "TRANTYPE": "D" })).unwrap();
		assert_eq!(tx.amount(), "");
		assert!(!tx.is_credit());
		assert_eq!(serde_json::to_value(&tx).unwrap(), json!({ "TRANTYPE": "D" }));
	}

	#[test]
	fn test_canonical_key_ignores_field_order() {
		let a: Transaction =
			serde_json::from_str(r#"{"SUM_E":"1.00","ZZ":"x","AA":2,"TRANTYPE":"C"}"#).unwrap();
		let b: Transaction =
			serde_json::from_str(r#"{"AA":2,"TRANTYPE":"C","ZZ":"x","SUM_E":"1.00"}"#).unwrap();

		assert_eq!(a, b);
		assert_eq!(a.canonical_key(), b.canonical_key());
		assert_eq!(
			a.canonical_key(),
			r#"{"AA":2,"SUM_E":"1.00","TRANTYPE":"C","ZZ":"x"}"#
		);
	}

	#[test]
	fn test_canonical_key_sees_passthrough_differences() {
		let a: Transaction = serde_json::from_value(json!({ "SUM_E": "1.00", "ID": "1" })).unwrap();
		let b: Transaction = serde_json::from_value(json!({ "SUM_E": "1.00", "ID": "2" })).unwrap();
		assert_ne!(a, b);
		assert_ne!(a.canonical_key(), b.canonical_key());
	}

	#[test]
	fn test_numeric_known_field_is_read_as_text() {
		let raw = json!({ "SUM_E": 100.5, "TRANTYPE": "C", "AUT_MY_ACC": 26001 });
		let tx: Transaction = serde_json::from_value(raw.clone()).unwrap();

		assert_eq!(tx.amount(), "100.5");
		assert_eq!(tx.account_id(), "26001");
		assert!(tx.is_credit());
		assert_eq!(serde_json::to_value(&tx).unwrap(), raw);
	}

	#[test]
	fn test_null_known_field_is_preserved() {
		let raw = json!({ "ID": "1", "SUM_E": null, "TRANTYPE": "C" });
		let tx: Transaction = serde_json::from_value(raw.clone()).unwrap();

		assert_eq!(tx.amount(), "");
		assert_eq!(serde_json::to_value(&tx).unwrap(), raw);

		let absent: Transaction =
			serde_json::from_value(json!({ "ID": "1", "TRANTYPE": "C" })).unwrap();
		assert_ne!(tx.canonical_key(), absent.canonical_key());
	}

	#[test]
	fn test_page_with_mixed_field_types_parses() {
		let page: StatementPage = serde_json::from_value(json!({
			"status": "SUCCESS",
			"exist_next_page": false,
			"transactions": [
				{ "SUM_E": "10.00", "TRANTYPE": "C" },
				{ "SUM_E": 20, "TRANTYPE": "D", "OSND": null },
			],
		}))
		.unwrap();
		assert_eq!(page.transactions.len(), 2);
		assert_eq!(page.transactions[1].amount(), "20");
		assert!(page.next_page_id.is_none());
	}

	#[test]
	fn test_page_without_next_page_flag_is_rejected() {
		let err: FeedError = serde_json::from_value::<StatementPage>(json!({
			"transactions": [],
			"next_page_id": "p2",
		}))
		.unwrap_err()
		.into();
		assert!(matches!(err, FeedError::JsonError(_)));
	}
}
