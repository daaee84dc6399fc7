//! Command-line entry point for the `hop` host picker.

mod app_dirs;
mod cli;
mod exec;
mod history_files;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use hop_engine::ScanReport;
use hop_store::{HostStore, IMPORT_DONE_KEY};
use hop_tui::Outcome;

use cli::{CliArgs, RunMode};
use settings::Settings;

const DB_FILE_NAME: &str = "hosts.db";

fn main() -> Result<()> {
	let cli = CliArgs::parse();
	let settings = settings::load(&cli)?;

	let db_path = match &cli.db {
		Some(path) => path.clone(),
		None => app_dirs::data_dir()?.join(DB_FILE_NAME),
	};
	let mut store = HostStore::open(&db_path)
		.with_context(|| format!("failed to open catalog at {}", db_path.display()))?;

	if settings.auto_import() && !cli.no_import {
		run_first_import(&settings, &mut store)?;
	}

	let outcome = hop_tui::run(
		&mut store,
		Box::new(|store| import_history(&settings, store)),
	)?;

	let Outcome::Selected(host) = outcome else {
		return Ok(());
	};

	match cli.run_mode() {
		RunMode::PrintHost => {
			println!("{host}");
			Ok(())
		}
		RunMode::PrintCommand => {
			println!("ssh {host}");
			Ok(())
		}
		RunMode::Connect => exec::connect(&host),
	}
}

/// One-shot history import, marked done in the store so later launches skip
/// the scan entirely.
fn run_first_import(settings: &Settings, store: &mut HostStore) -> Result<()> {
	if store.get_setting(IMPORT_DONE_KEY)?.is_some() {
		return Ok(());
	}

	let report = import_history(settings, store);
	if report.imported > 0 {
		eprintln!("Imported {} hosts from shell history", report.imported);
	}
	for error in &report.errors {
		eprintln!("warning: {error}");
	}
	store.set_setting(IMPORT_DONE_KEY, "1")?;
	Ok(())
}

/// Discover, open, and scan the history sources against the store.
fn import_history(settings: &Settings, store: &mut HostStore) -> ScanReport {
	let paths = history_files::candidate_paths(settings);
	let sources = history_files::open_sources(&paths);
	hop_engine::scan(sources, store)
}
