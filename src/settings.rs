//! Settings file loading and merging.
//!
//! Settings come from `config.toml` in the config directory, any files named
//! on the command line, and `HOP_`-prefixed environment variables, merged in
//! that order.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

use crate::app_dirs;
use crate::cli::CliArgs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Explicit history files to scan, replacing the built-in candidates.
	pub history_files: Option<Vec<PathBuf>>,
	/// Whether the first run imports shell history automatically.
	pub auto_import: Option<bool>,
}

impl Settings {
	pub fn auto_import(&self) -> bool {
		self.auto_import.unwrap_or(true)
	}
}

pub fn load(cli: &CliArgs) -> Result<Settings> {
	let mut builder = Config::builder();

	if let Ok(dir) = app_dirs::config_dir() {
		builder = builder.add_source(File::from(dir.join("config.toml")).required(false));
	}

	for path in &cli.config {
		builder = builder.add_source(File::from(path.clone()).required(true));
	}

	builder = builder.add_source(
		config::Environment::with_prefix("hop")
			.separator("__")
			.try_parsing(true)
			.list_separator(","),
	);

	builder
		.build()?
		.try_deserialize()
		.map_err(|err| anyhow!("failed to deserialize configuration: {err}"))
}
