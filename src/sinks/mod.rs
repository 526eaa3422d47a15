//! Delivery sinks for forwarded transactions.
//!
//! - `ledger`: the durable ledger. Every eligible credit becomes one spreadsheet row; a failed
//!   append holds back the snapshot so the row is retried.
//! - `notifier`: best-effort chat messages to supervisors. Failures are only logged.
//! - `registry`: read-only lookup of which chat ids hold the supervisor role.
//! - `google_auth`: service-account token exchange used by the spreadsheet ledger.
//!
//! Each sink has a disabled variant that succeeds without doing anything, used when the
//! corresponding credentials are not configured.

/// Service-account OAuth for Google APIs
pub mod google_auth;
/// Spreadsheet ledger
pub mod ledger;
/// Supervisor notifications
pub mod notifier;
/// Recipient role lookup
pub mod registry;
/// Sink error types
pub mod types;

pub use ledger::{DisabledLedger, LedgerSink, SheetsLedger};
pub use notifier::{DisabledNotifier, Notifier, SupervisorNotifier, TelegramBot};
pub use registry::SqliteRoleRegistry;
pub use types::*;
