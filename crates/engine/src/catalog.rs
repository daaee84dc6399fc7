//! Immutable catalog views consumed by the ranking engine.

use chrono::{DateTime, Utc};

/// One remembered host as stored in the catalog.
///
/// Records are owned by the store; the engine only ever sees them through an
/// immutable [`CatalogSnapshot`]. `host` is unique within a catalog, which is
/// what makes the ranking tie-break chain a total order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
	/// Store-assigned identifier, opaque to the engine.
	pub id: i64,
	/// Validated host string (see [`crate::normalize`]).
	pub host: String,
	/// Free-text note shown and searched alongside the host.
	pub note: String,
	/// When the host was last connected to, if ever.
	pub last_used_at: Option<DateTime<Utc>>,
	/// How many times the host has been connected to.
	pub use_count: u32,
}

/// An ordered sequence of [`HostRecord`] captured at one instant.
///
/// The store hands records over already sorted most-relevant-first, so the
/// empty-query ranking is a pass-through of this order. A snapshot stays
/// valid for the duration of a ranking call and is rebuilt by the caller
/// whenever the store reports a mutation.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
	records: Vec<HostRecord>,
}

impl CatalogSnapshot {
	/// Wrap records in snapshot form, preserving the given order.
	pub fn new(records: Vec<HostRecord>) -> Self {
		Self { records }
	}

	/// All records in snapshot order.
	pub fn records(&self) -> &[HostRecord] {
		&self.records
	}

	/// Record at `index`, panicking on out-of-range like slice indexing.
	pub fn record(&self, index: usize) -> &HostRecord {
		&self.records[index]
	}

	/// Record at `index`, or `None` when out of range.
	pub fn get(&self, index: usize) -> Option<&HostRecord> {
		self.records.get(index)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
