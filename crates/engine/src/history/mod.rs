//! Best-effort scanning of shell history for previously-used hosts.
//!
//! The scanner walks already-opened line sources in order, runs each line
//! through the classifier, and hands newly seen hosts to an import sink. One
//! unreadable file never aborts the run: per-source failures are collected
//! into the report and scanning moves on.

mod classify;

use std::collections::HashSet;
use std::io;

use thiserror::Error;

pub use classify::classify_line;

/// Note attached to every host imported from shell history.
pub const HISTORY_NOTE: &str = "imported from history";

/// Outcome of handing one host to the import sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
	/// The host was new to the catalog.
	Inserted,
	/// The catalog already held this host; success, nothing to count.
	AlreadyCatalogued,
}

/// Store-insertion collaborator fed by the scanner.
///
/// Implementations receive hosts that already passed normalization.
pub trait ImportSink {
	fn import(&mut self, host: &str, note: &str) -> anyhow::Result<ImportOutcome>;
}

/// What the caller found when opening one history source.
///
/// Opening happens outside the engine; the scanner itself never touches the
/// filesystem.
pub enum SourceState<L> {
	/// The file does not exist. History files are optional by nature, so
	/// this contributes zero hosts and no error.
	Missing,
	/// The file exists but could not be opened.
	Unreadable(io::Error),
	/// An open iterator over the file's lines.
	Open(L),
}

/// One history source: a label for error reports plus its opened state.
pub struct ScanSource<L> {
	pub label: String,
	pub state: SourceState<L>,
}

impl<L> ScanSource<L> {
	pub fn missing(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			state: SourceState::Missing,
		}
	}

	pub fn unreadable(label: impl Into<String>, error: io::Error) -> Self {
		Self {
			label: label.into(),
			state: SourceState::Unreadable(error),
		}
	}

	pub fn open(label: impl Into<String>, lines: L) -> Self {
		Self {
			label: label.into(),
			state: SourceState::Open(lines),
		}
	}
}

/// A failure confined to a single history source.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("history {source_label}: {message}")]
pub struct ScanError {
	pub source_label: String,
	pub message: String,
}

impl ScanError {
	fn new(source_label: &str, message: impl ToString) -> Self {
		Self {
			source_label: source_label.to_string(),
			message: message.to_string(),
		}
	}
}

/// Aggregated result of one scan run. Always produced, even under partial
/// failure.
#[derive(Debug, Default)]
pub struct ScanReport {
	/// Hosts newly added to the catalog during this run.
	pub imported: usize,
	/// Per-source failures, in source order.
	pub errors: Vec<ScanError>,
}

/// Run-scoped set of hosts already handed to the sink.
///
/// Created empty at scan start and discarded at scan end; guarantees a host
/// reaches the sink at most once per run even when it appears in several
/// files.
#[derive(Debug, Default)]
struct DedupSet(HashSet<String>);

impl DedupSet {
	/// Record `host`, returning `false` when it was already present.
	fn insert(&mut self, host: &str) -> bool {
		self.0.insert(host.to_string())
	}
}

/// Scan history sources in order, feeding newly found hosts to `sink`.
///
/// `imported` counts only hosts the sink reports as actually inserted;
/// duplicates within the run and hosts already in the catalog are silent
/// no-ops.
pub fn scan<L, I>(sources: I, sink: &mut dyn ImportSink) -> ScanReport
where
	L: Iterator<Item = io::Result<String>>,
	I: IntoIterator<Item = ScanSource<L>>,
{
	let mut seen = DedupSet::default();
	let mut report = ScanReport::default();

	for source in sources {
		let lines = match source.state {
			SourceState::Missing => continue,
			SourceState::Unreadable(error) => {
				report.errors.push(ScanError::new(&source.label, error));
				continue;
			}
			SourceState::Open(lines) => lines,
		};

		for line in lines {
			let line = match line {
				Ok(line) => line,
				Err(error) => {
					// Abandon this source, keep going with the rest.
					report.errors.push(ScanError::new(&source.label, error));
					break;
				}
			};

			let Some(host) = classify_line(&line) else {
				continue;
			};
			if !seen.insert(&host) {
				continue;
			}
			match sink.import(&host, HISTORY_NOTE) {
				Ok(ImportOutcome::Inserted) => report.imported += 1,
				Ok(ImportOutcome::AlreadyCatalogued) => {}
				Err(error) => report.errors.push(ScanError::new(&source.label, error)),
			}
		}
	}

	report
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Default)]
	struct RecordingSink {
		imported: Vec<(String, String)>,
		catalogued: Vec<String>,
	}

	impl ImportSink for RecordingSink {
		fn import(&mut self, host: &str, note: &str) -> anyhow::Result<ImportOutcome> {
			if self.catalogued.iter().any(|existing| existing == host) {
				return Ok(ImportOutcome::AlreadyCatalogued);
			}
			self.imported.push((host.to_string(), note.to_string()));
			Ok(ImportOutcome::Inserted)
		}
	}

	struct FailingSink;

	impl ImportSink for FailingSink {
		fn import(&mut self, _host: &str, _note: &str) -> anyhow::Result<ImportOutcome> {
			anyhow::bail!("disk full")
		}
	}

	fn source(label: &str, lines: &[&str]) -> ScanSource<std::vec::IntoIter<io::Result<String>>> {
		let lines: Vec<io::Result<String>> =
			lines.iter().map(|line| Ok(line.to_string())).collect();
		ScanSource::open(label, lines.into_iter())
	}

	#[test]
	fn scan_error_is_a_leaf_error_labelled_by_file() {
		let error = ScanError::new("bash", "permission denied");
		assert_eq!(error.to_string(), "history bash: permission denied");
		assert!(std::error::Error::source(&error).is_none());
	}

	#[test]
	fn imports_hosts_with_fixed_note() {
		let mut sink = RecordingSink::default();
		let report = scan(
			vec![source("bash", &["ssh example.com", "ls -la"])],
			&mut sink,
		);

		assert_eq!(report.imported, 1);
		assert!(report.errors.is_empty());
		assert_eq!(
			sink.imported,
			vec![("example.com".to_string(), HISTORY_NOTE.to_string())]
		);
	}

	#[test]
	fn deduplicates_across_sources_within_one_run() {
		let mut sink = RecordingSink::default();
		let report = scan(
			vec![
				source("bash", &["ssh shared.example", "ssh only-bash.example"]),
				source("zsh", &["ssh shared.example"]),
			],
			&mut sink,
		);

		assert_eq!(report.imported, 2);
		assert_eq!(sink.imported.len(), 2);
	}

	#[test]
	fn repeated_lines_in_one_file_count_once() {
		let mut sink = RecordingSink::default();
		let report = scan(
			vec![source("bash", &["ssh dup.example", "ssh dup.example"])],
			&mut sink,
		);

		assert_eq!(report.imported, 1);
	}

	#[test]
	fn missing_source_contributes_nothing_and_no_error() {
		let mut sink = RecordingSink::default();
		let sources: Vec<ScanSource<std::vec::IntoIter<io::Result<String>>>> =
			vec![ScanSource::missing("bash"), source("zsh", &["ssh a.example"])];
		let report = scan(sources, &mut sink);

		assert_eq!(report.imported, 1);
		assert!(report.errors.is_empty());
	}

	#[test]
	fn unreadable_source_is_reported_and_scanning_continues() {
		let mut sink = RecordingSink::default();
		let sources = vec![
			ScanSource::unreadable(
				"bash",
				io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
			),
			source("zsh", &["ssh b.example"]),
		];
		let report = scan(sources, &mut sink);

		assert_eq!(report.imported, 1);
		assert_eq!(report.errors.len(), 1);
		assert_eq!(report.errors[0].source_label, "bash");
	}

	#[test]
	fn read_error_abandons_source_but_not_the_run() {
		let mut sink = RecordingSink::default();
		let broken: Vec<io::Result<String>> = vec![
			Ok("ssh before.example".to_string()),
			Err(io::Error::new(io::ErrorKind::InvalidData, "bad byte")),
			Ok("ssh after-error.example".to_string()),
		];
		let report = scan(
			vec![
				ScanSource::open("bash", broken.into_iter()),
				source("zsh", &["ssh next.example"]),
			],
			&mut sink,
		);

		// Lines before the error land, lines after it are skipped.
		assert_eq!(report.imported, 2);
		assert_eq!(report.errors.len(), 1);
		assert!(sink.imported.iter().any(|(h, _)| h == "before.example"));
		assert!(!sink.imported.iter().any(|(h, _)| h == "after-error.example"));
	}

	#[test]
	fn already_catalogued_hosts_do_not_count() {
		let mut sink = RecordingSink {
			catalogued: vec!["known.example".to_string()],
			..RecordingSink::default()
		};
		let report = scan(
			vec![source("bash", &["ssh known.example", "ssh new.example"])],
			&mut sink,
		);

		assert_eq!(report.imported, 1);
		assert!(report.errors.is_empty());
	}

	#[test]
	fn sink_failure_is_recorded_per_source() {
		let mut sink = FailingSink;
		let report = scan(vec![source("bash", &["ssh a.example"])], &mut sink);

		assert_eq!(report.imported, 0);
		assert_eq!(report.errors.len(), 1);
		assert!(report.errors[0].message.contains("disk full"));
	}
}
