// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tracing::debug;

use tributary_core::{Result, Saver};
use tributary_type::Value;

use crate::hub::Collection;

/// A destination collection with document-style upsert semantics.
///
/// Saving the same envelope identity twice replaces the stored record, so
/// replays after a crash converge instead of duplicating.
pub struct MemorySink {
	collection: Collection,
	id_attribute: String,
	name: String,
}

impl MemorySink {
	pub fn new(collection: Collection, id_attribute: impl Into<String>, name: impl Into<String>) -> Self {
		Self { collection, id_attribute: id_attribute.into(), name: name.into() }
	}
}

impl Saver for MemorySink {
	fn save(&self, batch: &[Value]) -> Result<()> {
		if batch.is_empty() {
			return Ok(());
		}
		self.collection.upsert(&self.id_attribute, batch);
		debug!(sink = self.name.as_str(), records = batch.len(), "batch saved");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use tributary_type::ValueMap;

	use super::*;

	fn record(id: &str, payload: &str) -> Value {
		let mut entries = ValueMap::new();
		entries.insert("_id".to_string(), Value::from(id));
		entries.insert("payload".to_string(), Value::from(payload));
		Value::Map(entries)
	}

	#[test]
	fn test_save_is_idempotent_on_identity() {
		let collection = Collection::default();
		let sink = MemorySink::new(collection.clone(), "_id", "canonical");
		sink.save(&[record("a", "one"), record("b", "two")]).unwrap();
		sink.save(&[record("a", "one again")]).unwrap();
		assert_eq!(collection.len(), 2);
	}

	#[test]
	fn test_empty_batch_is_a_no_op() {
		let collection = Collection::default();
		let sink = MemorySink::new(collection.clone(), "_id", "canonical");
		sink.save(&[]).unwrap();
		assert!(collection.is_empty());
	}
}
