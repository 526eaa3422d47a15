//! Delta computation between the committed snapshot and the current feed.
//!
//! Both inputs are treated as sets under structural equality, so a transaction is new only when
//! no identical record exists anywhere in the previous snapshot. Page order, interleaving and
//! re-sorting by the feed therefore never produce spurious deltas.

use crate::feed::Transaction;
use crate::utils::parse_day_first_datetime;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::warn;

/// Transactions present in `curr` but absent from `prev`, oldest first.
///
/// Ordering is by parsed timestamp; equal timestamps keep their relative order from `curr`.
/// Records whose timestamp cannot be parsed go last. Identical records repeated within `curr`
/// are reported once.
pub fn diff(prev: &[Transaction], curr: &[Transaction]) -> Vec<Transaction> {
	let seen: HashSet<String> = prev.iter().map(Transaction::canonical_key).collect();

	let mut new: Vec<_> = curr
		.iter()
		.map(|tx| (tx.canonical_key(), tx))
		.filter(|(key, _)| !seen.contains(key))
		.unique_by(|(key, _)| key.clone())
		.map(|(_, tx)| {
			let at = parse_day_first_datetime(&tx.timestamp());
			if at.is_none() {
				warn!(
					"Unparseable transaction timestamp {:?}, ordering it last",
					tx.timestamp()
				);
			}
			(at, tx)
		})
		.collect();

	new.sort_by_key(|(at, _)| (at.is_none(), *at));
	new.into_iter().map(|(_, tx)| tx.clone()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tx(timestamp: &str, amount: &str) -> Transaction {
		Transaction::fixture(timestamp, amount, "C", "UA1", "Оплата, Петро Петрович Іванов")
	}

	fn amounts(txs: &[Transaction]) -> Vec<String> {
		txs.iter().map(|tx| tx.amount().into_owned()).collect()
	}

	#[test]
	fn test_empty_when_nothing_new() {
		let prev = vec![tx("01.01.2024 10:00:00", "1"), tx("01.01.2024 11:00:00", "2")];
		assert!(diff(&prev, &prev).is_empty());
		assert!(diff(&prev, &[]).is_empty());
	}

	#[test]
	fn test_everything_is_new_against_empty_prev() {
		let curr = vec![tx("02.01.2024 10:00:00", "2"), tx("01.01.2024 10:00:00", "1")];
		assert_eq!(amounts(&diff(&[], &curr)), vec!["1", "2"]);
	}

	#[test]
	fn test_independent_of_ordering() {
		let a = tx("01.01.2024 10:00:00", "1");
		let b = tx("01.01.2024 12:00:00", "2");
		let c = tx("02.01.2024 08:00:00", "3");
		let d = tx("31.12.2023 23:59:59", "4");

		let prev = vec![a.clone(), b.clone()];
		let curr = vec![a.clone(), b.clone(), c.clone(), d.clone()];
		let expected = vec![d.clone(), c.clone()];

		let mut prev_rev = prev.clone();
		prev_rev.reverse();
		let curr_shuffled = vec![c.clone(), a.clone(), d.clone(), b.clone()];

		assert_eq!(diff(&prev, &curr), expected);
		assert_eq!(diff(&prev_rev, &curr), expected);
		assert_eq!(diff(&prev, &curr_shuffled), expected);
		assert_eq!(diff(&prev_rev, &curr_shuffled), expected);
	}

	#[test]
	fn test_is_idempotent() {
		let prev = vec![tx("01.01.2024 10:00:00", "1")];
		let curr = vec![
			tx("03.01.2024 10:00:00", "3"),
			tx("01.01.2024 10:00:00", "1"),
			tx("02.01.2024 10:00:00", "2"),
		];
		assert_eq!(diff(&prev, &curr), diff(&prev, &curr));
	}

	#[test]
	fn test_output_is_chronological_with_day_first_dates() {
		// 02.01 is the 2nd of January, not the 1st of February
		let curr = vec![
			tx("01.02.2024 09:00:00", "feb"),
			tx("02.01.2024 09:00:00", "jan"),
			tx("15.01.2024 09:00:00", "mid-jan"),
		];

		let out = diff(&[], &curr);
		assert_eq!(amounts(&out), vec!["jan", "mid-jan", "feb"]);

		let times: Vec<_> = out
			.iter()
			.map(|t| parse_day_first_datetime(&t.timestamp()).unwrap())
			.collect();
		assert!(times.windows(2).all(|w| w[0] <= w[1]));
	}

	#[test]
	fn test_ties_keep_feed_order() {
		let curr = vec![
			tx("01.01.2024 10:00:00", "first"),
			tx("01.01.2024 09:00:00", "earlier"),
			tx("01.01.2024 10:00:00", "second"),
			tx("01.01.2024 10:00:00", "third"),
		];
		assert_eq!(
			amounts(&diff(&[], &curr)),
			vec!["earlier", "first", "second", "third"]
		);
	}

	#[test]
	fn test_structural_difference_counts_as_new() {
		let old = tx("01.01.2024 10:00:00", "100.00");
		let edited = tx("01.01.2024 10:00:00", "100.01");
		assert_eq!(diff(&[old], &[edited.clone()]), vec![edited]);
	}

	#[test]
	fn test_duplicates_in_curr_reported_once() {
		let t = tx("01.01.2024 10:00:00", "1");
		assert_eq!(diff(&[], &[t.clone(), t.clone()]), vec![t]);
	}

	#[test]
	fn test_unparseable_timestamps_go_last() {
		let curr = vec![
			tx("not a date", "bad"),
			tx("02.01.2024 10:00:00", "2"),
			tx("01.01.2024 10:00:00", "1"),
		];
		assert_eq!(amounts(&diff(&[], &curr)), vec!["1", "2", "bad"]);
	}
}
