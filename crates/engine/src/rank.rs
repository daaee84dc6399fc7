//! Query ranking over a catalog snapshot.
//!
//! Scoring is a case-insensitive fuzzy subsequence match of the query against
//! `host + " " + note`. Matching rewards contiguous runs, so `prod` on
//! `prod.example` outranks the same letters scattered across a longer name.
//! Non-matches are excluded outright rather than scored low.

use std::cmp::Ordering;

use crate::catalog::{CatalogSnapshot, HostRecord};

/// A scored candidate, ephemeral to one ranking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MatchResult {
	source_index: usize,
	score: i64,
}

/// Order snapshot indices by relevance to `query`.
///
/// An empty (or all-whitespace) query preserves snapshot order as given: the
/// store already hands records over most-relevant-first. Otherwise the result
/// contains exactly the matching records, ordered by score, then recency of
/// use, then host name. The chain is a total order over distinct records, so
/// repeated calls on an unchanged snapshot return identical output.
pub fn rank(snapshot: &CatalogSnapshot, query: &str) -> Vec<usize> {
	let query = query.trim();
	if query.is_empty() {
		return (0..snapshot.len()).collect();
	}

	let needle = query.to_lowercase();
	let mut matches: Vec<MatchResult> = snapshot
		.records()
		.iter()
		.enumerate()
		.filter_map(|(source_index, record)| {
			let haystack = format!("{} {}", record.host, record.note).to_lowercase();
			subsequence_score(&haystack, &needle).map(|score| MatchResult {
				source_index,
				score,
			})
		})
		.collect();

	matches.sort_unstable_by(|a, b| {
		b.score.cmp(&a.score).then_with(|| {
			break_tie(
				snapshot.record(a.source_index),
				snapshot.record(b.source_index),
			)
		})
	});

	matches.into_iter().map(|entry| entry.source_index).collect()
}

/// Deterministic ordering for score ties: records with a last-used timestamp
/// come first, more recent use wins among them, and the unique host name
/// settles everything else.
fn break_tie(a: &HostRecord, b: &HostRecord) -> Ordering {
	match (a.last_used_at, b.last_used_at) {
		(Some(at_a), Some(at_b)) => at_b.cmp(&at_a),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
	.then_with(|| a.host.cmp(&b.host))
}

/// Score `needle` as an in-order subsequence of `haystack`.
///
/// Greedy left-to-right match; each hit is worth one point plus the length of
/// the contiguous run it extends, so contiguous matches strictly outscore
/// scattered ones. Returns `None` when the needle is not a subsequence.
fn subsequence_score(haystack: &str, needle: &str) -> Option<i64> {
	let mut score = 0i64;
	let mut run = 0i64;
	let mut pending = needle.chars().peekable();

	for ch in haystack.chars() {
		let Some(&want) = pending.peek() else {
			break;
		};
		if ch == want {
			score += 1 + run;
			run += 1;
			pending.next();
		} else {
			run = 0;
		}
	}

	pending.peek().is_none().then_some(score)
}
