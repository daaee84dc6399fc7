//! Host ranking and shell-history ingestion engine for `hop`.
//!
//! This crate is the pure core of the application: it turns a free-text query
//! into a deterministic ordering over a catalog snapshot, and it extracts
//! remote-connection targets from shell history text. It performs no I/O of
//! its own; callers hand it already-opened line sources and in-memory
//! snapshots and receive orderings, extracted hosts, and aggregated errors
//! back as plain values.

pub mod catalog;
pub mod history;
pub mod normalize;
pub mod rank;

pub use catalog::{CatalogSnapshot, HostRecord};
pub use history::{
	HISTORY_NOTE, ImportOutcome, ImportSink, ScanError, ScanReport, ScanSource, SourceState,
	classify_line, scan,
};
pub use normalize::{InvalidHost, normalize};
pub use rank::rank;
