use crate::feed::Transaction;
use std::collections::HashSet;

/// Selects the new transactions that are forwarded to the sinks.
///
/// Only credits qualify. When an account whitelist is configured, the credit must also belong to
/// one of the listed accounts; an empty whitelist accepts every account.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
	accounts: HashSet<String>,
}

impl TransactionFilter {
	pub fn new<I, S>(accounts: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			accounts: accounts.into_iter().map(Into::into).collect(),
		}
	}

	pub fn is_eligible(&self, tx: &Transaction) -> bool {
		tx.is_credit() && (self.accounts.is_empty() || self.accounts.contains(&*tx.account_id()))
	}
}
