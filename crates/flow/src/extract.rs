// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Per-source time and id extraction, applied to raw records before
//! enrichment. The orchestrators only ever see these as closures.

use tributary_core::{RecordId, Result};
use tributary_type::{Millis, Value, ValueError, ValueKind, clock};

/// Directory entries stamp modification time here.
pub const WHEN_CHANGED: &str = "whenChanged";
/// Creation time, used when an entry has never been modified.
pub const WHEN_CREATED: &str = "whenCreated";

/// Reads a UTC time string (`YYYY-MM-DD HH:MM:SS`) from the attribute.
pub fn tabular_time(attribute: impl Into<String>) -> impl Fn(&Value) -> Result<Millis> + Send + Sync {
	let attribute = attribute.into();
	move |record| Ok(clock::parse_utc(record.get(&attribute)?.as_text()?)?)
}

/// Reads the directory modification time, falling back to the creation
/// time for entries that were never modified.
pub fn directory_time() -> impl Fn(&Value) -> Result<Millis> + Send + Sync {
	move |record| {
		let entries = record.as_map()?;
		let value = entries
			.get(WHEN_CHANGED)
			.or_else(|| entries.get(WHEN_CREATED))
			.ok_or_else(|| ValueError::MissingKey { key: WHEN_CHANGED.to_string() })?;
		Ok(clock::parse_directory_time(value.as_text()?)?)
	}
}

/// Reads a millisecond timestamp value from the attribute.
pub fn timestamp_time(attribute: impl Into<String>) -> impl Fn(&Value) -> Result<Millis> + Send + Sync {
	let attribute = attribute.into();
	move |record| Ok(record.get(&attribute)?.as_timestamp()?)
}

/// Reads a record id from the attribute: the data of an opaque scalar
/// (e.g. a document object id) or a plain text id.
pub fn opaque_id(attribute: impl Into<String>) -> impl Fn(&Value) -> Result<RecordId> + Send + Sync {
	let attribute = attribute.into();
	move |record| match record.get(&attribute)? {
		Value::Opaque(opaque) => Ok(RecordId::new(opaque.data.clone())),
		Value::Text(text) => Ok(RecordId::new(text.clone())),
		other => {
			Err(ValueError::KindMismatch { expected: ValueKind::Opaque, found: other.kind() }.into())
		}
	}
}
