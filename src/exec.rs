//! Launching the ssh connection for the selected host.
//!
//! On Unix the process is replaced by the user's shell running
//! `exec ssh '<host>'` as a login shell, so aliases and agent setup from the
//! user's profile apply. The host is re-validated against the allow-list
//! immediately before the command string is built; this is the last gate in
//! front of the shell.

use std::env;
use std::process::Command;

use anyhow::{Context, Result};

/// Hand the terminal over to ssh for `host`. Only returns on failure.
pub fn connect(host: &str) -> Result<()> {
	let host = hop_engine::normalize(host).context("refusing to exec with an unsafe host")?;

	#[cfg(unix)]
	{
		use std::os::unix::process::CommandExt;
		use std::path::Path;

		let shell = env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
		let base = Path::new(&shell)
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();
		let command = format!("exec ssh {}", shell_quote(&host));

		let mut invocation = Command::new(&shell);
		match base.as_str() {
			"bash" | "zsh" | "fish" => invocation.args(["-l", "-i", "-c", &command]),
			_ => invocation.args(["-i", "-c", &command]),
		};
		// exec only returns on error.
		let error = invocation.exec();
		Err(error).with_context(|| format!("failed to exec {shell}"))
	}

	#[cfg(not(unix))]
	{
		let status = Command::new("ssh")
			.arg(&host)
			.status()
			.context("ssh command failed to start")?;
		std::process::exit(status.code().unwrap_or(1));
	}
}

/// Single-quote `value` for POSIX shells; embedded single quotes are closed,
/// escaped, and reopened.
fn shell_quote(value: &str) -> String {
	if value.is_empty() {
		return "''".to_string();
	}
	format!("'{}'", value.replace('\'', r#"'"'"'"#))
}
