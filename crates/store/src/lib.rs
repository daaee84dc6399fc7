//! SQLite-backed host catalog for `hop`.
//!
//! The store owns persistence of [`HostRecord`]s and the small settings table
//! used for one-shot markers. The ranking engine never talks to it directly;
//! it consumes immutable snapshots produced by [`HostStore::snapshot`].

use std::fs;
use std::path::Path;

use chrono::Utc;
use hop_engine::{CatalogSnapshot, HostRecord, ImportOutcome, ImportSink, InvalidHost, normalize};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Settings key flipped after the first-run history import.
pub const IMPORT_DONE_KEY: &str = "import_done";

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("database error: {0}")]
	Database(#[from] rusqlite::Error),

	#[error("failed to create data directory: {0}")]
	DataDir(#[from] std::io::Error),

	#[error(transparent)]
	InvalidHost(#[from] InvalidHost),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to the catalog database.
///
/// Single-connection, single-threaded, matching the synchronous event loop
/// that drives it.
pub struct HostStore {
	conn: Connection,
}

impl HostStore {
	/// Open (and create if needed) the catalog database at `path`.
	pub fn open(path: &Path) -> Result<Self> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let conn = Connection::open(path)?;
		Self::from_connection(conn)
	}

	/// In-memory catalog, used by tests and throwaway sessions.
	pub fn open_in_memory() -> Result<Self> {
		Self::from_connection(Connection::open_in_memory()?)
	}

	fn from_connection(conn: Connection) -> Result<Self> {
		conn.execute_batch(
			r#"
			PRAGMA journal_mode=WAL;

			CREATE TABLE IF NOT EXISTS hosts (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				host TEXT NOT NULL UNIQUE,
				note TEXT NOT NULL DEFAULT '',
				last_used_at TEXT NULL,
				use_count INTEGER NOT NULL DEFAULT 0
			);

			CREATE TABLE IF NOT EXISTS settings (
				key TEXT PRIMARY KEY,
				value TEXT NOT NULL
			);
			"#,
		)?;
		Ok(Self { conn })
	}

	/// All records, most-recently-used first, never-used hosts last in
	/// ascending host order. This is the "most relevant first" order the
	/// ranking engine's empty-query pass-through relies on.
	pub fn list_all(&self) -> Result<Vec<HostRecord>> {
		let mut stmt = self.conn.prepare(
			"SELECT id, host, note, last_used_at, use_count FROM hosts
			 ORDER BY CASE WHEN last_used_at IS NULL THEN 1 ELSE 0 END,
			          last_used_at DESC, host ASC",
		)?;
		let records = stmt
			.query_map([], |row| {
				Ok(HostRecord {
					id: row.get(0)?,
					host: row.get(1)?,
					note: row.get(2)?,
					last_used_at: row.get(3)?,
					use_count: row.get(4)?,
				})
			})?
			.collect::<std::result::Result<Vec<_>, _>>()?;
		Ok(records)
	}

	/// Capture the catalog as an immutable snapshot for ranking.
	pub fn snapshot(&self) -> Result<CatalogSnapshot> {
		Ok(CatalogSnapshot::new(self.list_all()?))
	}

	/// Insert a host, treating a conflict with an existing entry as a
	/// success-no-op rather than an error.
	pub fn insert(&self, host: &str, note: &str) -> Result<ImportOutcome> {
		let host = normalize(host)?;
		let changed = self.conn.execute(
			"INSERT INTO hosts (host, note) VALUES (?1, ?2)
			 ON CONFLICT(host) DO NOTHING",
			params![host, note.trim()],
		)?;
		if changed == 0 {
			Ok(ImportOutcome::AlreadyCatalogued)
		} else {
			Ok(ImportOutcome::Inserted)
		}
	}

	/// Replace host and note of an existing record.
	pub fn update(&self, id: i64, host: &str, note: &str) -> Result<()> {
		let host = normalize(host)?;
		self.conn.execute(
			"UPDATE hosts SET host = ?1, note = ?2 WHERE id = ?3",
			params![host, note.trim(), id],
		)?;
		Ok(())
	}

	pub fn delete(&self, id: i64) -> Result<()> {
		self.conn
			.execute("DELETE FROM hosts WHERE id = ?1", params![id])?;
		Ok(())
	}

	/// Bump the use counter and stamp the last-used time.
	pub fn mark_used(&self, id: i64) -> Result<()> {
		self.conn.execute(
			"UPDATE hosts SET use_count = use_count + 1, last_used_at = ?1 WHERE id = ?2",
			params![Utc::now(), id],
		)?;
		Ok(())
	}

	pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
		let value = self
			.conn
			.query_row(
				"SELECT value FROM settings WHERE key = ?1",
				params![key],
				|row| row.get(0),
			)
			.optional()?;
		Ok(value)
	}

	pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
		self.conn.execute(
			"INSERT INTO settings (key, value) VALUES (?1, ?2)
			 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
			params![key, value],
		)?;
		Ok(())
	}
}

impl ImportSink for HostStore {
	fn import(&mut self, host: &str, note: &str) -> anyhow::Result<ImportOutcome> {
		Ok(HostStore::insert(self, host, note)?)
	}
}
