//! Per-line heuristic that isolates an `ssh` connection target.
//!
//! History lines are adversarial, free-form text. The classifier favours
//! precision over recall: it demands an explicit `ssh` token and runs every
//! candidate through the strict host allow-list, accepting that wrapper
//! scripts and shell aliases will be missed rather than risking garbage
//! entries in the catalog.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::normalize;

// CSI colour codes leak into history files written by some shells.
static ANSI_ESCAPE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

// zsh extended history: `: <timestamp>:<elapsed>;<command>`.
static ZSH_EXTENDED_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^: \d+:\d+;").unwrap());

/// Single-letter ssh options whose value arrives as the following field.
///
/// An unknown multi-letter flag that also takes a separate value would have
/// its value misread as the target. That misclassification is long-standing,
/// bounded behaviour; widening this list is the only supported fix.
const OPTIONS_WITH_VALUE: &[&str] = &[
	"-b", "-c", "-D", "-E", "-F", "-I", "-i", "-J", "-L", "-l", "-m", "-o", "-p", "-Q", "-R",
	"-S", "-W", "-w",
];

/// Extract the connection target from one history line, if it has one.
///
/// Returns `None` for anything that is not a recognisable `ssh` invocation
/// with a valid target; a miss is an expected outcome, never an error.
pub fn classify_line(line: &str) -> Option<String> {
	let line = ANSI_ESCAPE.replace_all(line, "");
	let line = line.trim();
	if line.is_empty() {
		return None;
	}

	let line = match ZSH_EXTENDED_PREFIX.find(line) {
		Some(prefix) => &line[prefix.end()..],
		None => line,
	};

	let fields: Vec<&str> = line.split_whitespace().collect();
	let ssh_index = fields.iter().position(|field| is_ssh_command(field))?;

	let mut expect_value = false;
	for &token in &fields[ssh_index + 1..] {
		if expect_value {
			// Value of the preceding option, never a target or a flag.
			expect_value = false;
			continue;
		}

		if token == "--" {
			continue;
		}

		if token.starts_with('-') {
			if token.contains('=') {
				// `-oSetting=value` style, value attached.
				continue;
			}
			if token.len() > 2 {
				// Combined short form like `-p2222`.
				continue;
			}
			if OPTIONS_WITH_VALUE.contains(&token) {
				expect_value = true;
			}
			continue;
		}

		// First bare token is the target; the remote command after it is
		// deliberately ignored.
		let target = match token.rsplit_once('@') {
			Some((_, host)) => host,
			None => token,
		};
		let target = target.trim_matches(['[', ']']);
		return normalize(target).ok();
	}

	None
}

/// A field counts as the ssh command when it is `ssh` itself or a path to it.
fn is_ssh_command(field: &str) -> bool {
	field.eq_ignore_ascii_case("ssh") || field.to_ascii_lowercase().ends_with("/ssh")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn classified(line: &str) -> String {
		classify_line(line).unwrap_or_else(|| panic!("no host in {line:?}"))
	}

	#[test]
	fn simple_invocation() {
		assert_eq!(classified("ssh example.com"), "example.com");
	}

	#[test]
	fn strips_user_prefix_after_option_value() {
		assert_eq!(classified("ssh -p 2222 user@example.com"), "example.com");
	}

	#[test]
	fn ignores_trailing_remote_command() {
		assert_eq!(classified("ssh host.local uptime"), "host.local");
	}

	#[test]
	fn handles_zsh_extended_history_prefix() {
		assert_eq!(
			classified(": 1700000000:0;ssh -i ~/.ssh/id_ed25519 git@github.com"),
			"github.com"
		);
	}

	#[test]
	fn accepts_config_alias() {
		assert_eq!(classified("ssh my-alias"), "my-alias");
	}

	#[test]
	fn skips_option_with_separate_value() {
		assert_eq!(classified("ssh -F ~/.ssh/config work-host"), "work-host");
	}

	#[test]
	fn skips_combined_short_option() {
		assert_eq!(classified("ssh -p2222 example.com"), "example.com");
	}

	#[test]
	fn skips_key_value_option() {
		assert_eq!(
			classified("ssh -oStrictHostKeyChecking=no example.com"),
			"example.com"
		);
	}

	#[test]
	fn double_dash_is_transparent() {
		assert_eq!(classified("ssh -p 22 -- example.com"), "example.com");
	}

	#[test]
	fn accepts_path_to_binary_and_mixed_case() {
		assert_eq!(classified("/usr/bin/ssh example.com"), "example.com");
		assert_eq!(classified("SSH example.com"), "example.com");
	}

	#[test]
	fn option_value_is_consumed_even_when_flag_like() {
		// `-l` consumes the next field unconditionally.
		assert_eq!(classified("ssh -l -v example.com"), "example.com");
	}

	#[test]
	fn rejects_non_ssh_commands() {
		assert_eq!(classify_line("git push origin main"), None);
		assert_eq!(classify_line("echo ssh-keygen"), None);
	}

	#[test]
	fn rejects_flag_only_invocation() {
		assert_eq!(classify_line("ssh --help"), None);
		assert_eq!(classify_line("ssh -Q cipher"), None);
	}

	#[test]
	fn rejects_empty_and_ansi_noise() {
		assert_eq!(classify_line(""), None);
		assert_eq!(classify_line("\x1b[1;32m\x1b[0m"), None);
	}

	#[test]
	fn strips_ansi_sequences_before_parsing() {
		assert_eq!(
			classified("\x1b[1;32mssh\x1b[0m example.com"),
			"example.com"
		);
	}

	#[test]
	fn rejects_target_failing_the_allow_list() {
		assert_eq!(classify_line("ssh 'example.com'"), None);
		assert_eq!(classify_line("ssh host;id"), None);
	}
}
