use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments accepted by the `hop` binary.
#[derive(Parser, Debug)]
#[command(
	name = "hop",
	version,
	about = "Interactive fuzzy picker for remembered SSH hosts"
)]
pub struct CliArgs {
	/// Print the selected host instead of connecting to it.
	#[arg(long, conflicts_with = "cmd")]
	pub print: bool,

	/// Print the full `ssh <host>` command instead of connecting.
	#[arg(long)]
	pub cmd: bool,

	/// Additional configuration file to merge over the defaults.
	#[arg(short, long = "config", value_name = "FILE", env = "HOP_CONFIG")]
	pub config: Vec<PathBuf>,

	/// Override the catalog database path.
	#[arg(long, value_name = "FILE", env = "HOP_DB")]
	pub db: Option<PathBuf>,

	/// Skip the automatic first-run history import.
	#[arg(long)]
	pub no_import: bool,
}

/// What to do with the selection once the picker exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
	/// Replace this process with an ssh connection.
	Connect,
	/// Print the bare host and exit.
	PrintHost,
	/// Print `ssh <host>` and exit.
	PrintCommand,
}

impl CliArgs {
	pub fn run_mode(&self) -> RunMode {
		if self.print {
			RunMode::PrintHost
		} else if self.cmd {
			RunMode::PrintCommand
		} else {
			RunMode::Connect
		}
	}
}
