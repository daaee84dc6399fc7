//! Discovery and opening of shell history files.
//!
//! This is the only place that touches the filesystem for history import;
//! the engine's scanner receives the opened sources and never does I/O of
//! its own.

use std::collections::HashSet;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use hop_engine::ScanSource;

use crate::settings::Settings;

/// History files to try, in priority order and with duplicates removed:
/// the `HISTFILE` override first, then the usual per-shell locations. A
/// `history_files` settings entry replaces the whole list.
pub fn candidate_paths(settings: &Settings) -> Vec<PathBuf> {
	if let Some(files) = &settings.history_files {
		return files.clone();
	}

	let mut seen = HashSet::new();
	let mut paths = Vec::new();
	let mut push = |path: PathBuf| {
		if seen.insert(path.clone()) {
			paths.push(path);
		}
	};

	if let Some(histfile) = env::var_os("HISTFILE").filter(|value| !value.is_empty()) {
		push(PathBuf::from(histfile));
	}

	if let Some(user_dirs) = directories::UserDirs::new() {
		let home = user_dirs.home_dir();
		push(home.join(".bash_history"));
		push(home.join(".zsh_history"));
		push(home.join(".local/share/fish/fish_history"));
	}

	paths
}

/// Line iterator over one opened history file.
pub type FileLines = io::Lines<BufReader<File>>;

/// Open every candidate as a scan source. Absent files become `Missing`
/// (silent); anything else unreadable is reported by the scanner.
pub fn open_sources(paths: &[PathBuf]) -> Vec<ScanSource<FileLines>> {
	paths.iter().map(|path| open_source(path)).collect()
}

fn open_source(path: &Path) -> ScanSource<FileLines> {
	let label = path.display().to_string();
	match File::open(path) {
		Ok(file) => ScanSource::open(label, BufReader::new(file).lines()),
		Err(error) if error.kind() == io::ErrorKind::NotFound => ScanSource::missing(label),
		Err(error) => ScanSource::unreadable(label, error),
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use hop_engine::SourceState;

	use super::*;

	#[test]
	fn settings_list_replaces_builtin_candidates() {
		let settings = Settings {
			history_files: Some(vec![PathBuf::from("/tmp/only-this")]),
			auto_import: None,
		};
		assert_eq!(candidate_paths(&settings), vec![PathBuf::from("/tmp/only-this")]);
	}

	#[test]
	fn missing_file_becomes_missing_source() {
		let dir = tempfile::tempdir().unwrap();
		let sources = open_sources(&[dir.path().join("no_such_history")]);
		assert_eq!(sources.len(), 1);
		assert!(matches!(sources[0].state, SourceState::Missing));
	}

	#[test]
	fn existing_file_opens_and_yields_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bash_history");
		fs::write(&path, "ssh example.com\nls\n").unwrap();

		let mut sources = open_sources(&[path]);
		let SourceState::Open(lines) = &mut sources[0].state else {
			panic!("expected open source");
		};
		let collected: Vec<String> = lines.map(|line| line.unwrap()).collect();
		assert_eq!(collected, vec!["ssh example.com", "ls"]);
	}
}
