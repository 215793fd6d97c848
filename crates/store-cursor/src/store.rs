// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::trace;

use crate::{Error, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cursor (\
	key TEXT PRIMARY KEY, \
	value TEXT NOT NULL\
) WITHOUT ROWID";

/// A durable string→string map for per-topic cursor state.
///
/// There is no long-lived handle: every operation opens its own connection,
/// runs exactly one transaction and closes. Committed writes are durable;
/// readers see the last committed value. One store is owned by one
/// orchestrator per topic — concurrent topics use disjoint keys.
pub struct CursorStore {
	path: PathBuf,
}

impl CursorStore {
	pub fn open_at(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Strict read: an absent key is an error.
	pub fn get(&self, key: &str) -> Result<String> {
		let connection = self.connect()?;
		let value = connection
			.query_row("SELECT value FROM cursor WHERE key = ?1", params![key], |row| row.get::<_, String>(0))
			.optional()
			.map_err(txn)?;
		value.ok_or_else(|| Error::NotFound(key.to_string()))
	}

	/// Defaulting read: an absent key reads as the empty string.
	pub fn get_or_default(&self, key: &str) -> Result<String> {
		match self.get(key) {
			Ok(value) => Ok(value),
			Err(Error::NotFound(_)) => Ok(String::new()),
			Err(error) => Err(error),
		}
	}

	pub fn set(&self, key: &str, value: &str) -> Result<()> {
		let mut connection = self.connect()?;
		let txn_handle =
			connection.transaction_with_behavior(TransactionBehavior::Immediate).map_err(txn)?;
		txn_handle
			.execute(
				"INSERT INTO cursor (key, value) VALUES (?1, ?2) \
				ON CONFLICT (key) DO UPDATE SET value = excluded.value",
				params![key, value],
			)
			.map_err(txn)?;
		txn_handle.commit().map_err(txn)?;
		trace!(key, value, "cursor committed");
		Ok(())
	}

	pub fn remove(&self, key: &str) -> Result<()> {
		let mut connection = self.connect()?;
		let txn_handle =
			connection.transaction_with_behavior(TransactionBehavior::Immediate).map_err(txn)?;
		txn_handle.execute("DELETE FROM cursor WHERE key = ?1", params![key]).map_err(txn)?;
		txn_handle.commit().map_err(txn)?;
		Ok(())
	}

	/// Visits every key/value pair in key order.
	pub fn iterate(&self, mut visit: impl FnMut(&str, &str)) -> Result<()> {
		let connection = self.connect()?;
		let mut statement =
			connection.prepare("SELECT key, value FROM cursor ORDER BY key").map_err(txn)?;
		let mut rows = statement.query([]).map_err(txn)?;
		while let Some(row) = rows.next().map_err(txn)? {
			let key: String = row.get(0).map_err(txn)?;
			let value: String = row.get(1).map_err(txn)?;
			visit(&key, &value);
		}
		Ok(())
	}

	fn connect(&self) -> Result<Connection> {
		let open = |path: &Path| -> rusqlite::Result<Connection> {
			let connection = Connection::open(path)?;
			connection.busy_timeout(BUSY_TIMEOUT)?;
			connection.execute_batch(SCHEMA)?;
			Ok(connection)
		};
		open(&self.path)
			.map_err(|error| Error::Open { path: self.path.clone(), reason: error.to_string() })
	}
}

fn txn(error: rusqlite::Error) -> Error {
	Error::Txn(error.to_string())
}
