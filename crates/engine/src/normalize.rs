//! Host string validation and canonicalization.
//!
//! The allow-list here is the security boundary between untrusted input
//! (history text, form fields) and the shell invocation the launcher later
//! builds by string concatenation. Nothing else in the system may relax it.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A candidate host string was rejected by the allow-list.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid host {0:?}")]
pub struct InvalidHost(pub String);

// Hostname-ish token or a bracketed IPv6 literal. Rejects whitespace, shell
// metacharacters, and quoting unconditionally.
static SAFE_HOST: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(?:[A-Za-z0-9._-]+|\[[0-9A-Fa-f:]+\])$").unwrap());

/// Trim and validate a raw host string.
///
/// Returns the trimmed value when it matches the allow-list; already
/// normalized input passes through unchanged, so the function is idempotent.
pub fn normalize(raw: &str) -> Result<String, InvalidHost> {
	let trimmed = raw.trim();
	if trimmed.is_empty() || !SAFE_HOST.is_match(trimmed) {
		return Err(InvalidHost(raw.to_string()));
	}
	Ok(trimmed.to_string())
}
