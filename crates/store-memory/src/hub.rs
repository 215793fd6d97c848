// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use tributary_type::Value;

/// A process-wide set of named record collections.
///
/// The hub plays the role an external document database or search index
/// plays in production: dev runs and integration tests point every adapter
/// at the same hub and observe the full pipeline end to end.
#[derive(Clone, Default)]
pub struct MemoryHub {
	collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryHub {
	pub fn new() -> Self {
		Self::default()
	}

	/// The named collection, created empty on first use.
	pub fn collection(&self, name: &str) -> Collection {
		if let Some(collection) = self.collections.read().get(name) {
			return collection.clone();
		}
		self.collections.write().entry(name.to_string()).or_default().clone()
	}

	pub fn collection_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
		names.sort();
		names
	}
}

/// One ordered record collection behind a lock.
#[derive(Clone, Default)]
pub struct Collection {
	records: Arc<RwLock<Vec<Value>>>,
}

impl Collection {
	pub fn len(&self) -> usize {
		self.records.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.read().is_empty()
	}

	/// Appends a record without identity matching.
	pub fn insert(&self, record: Value) {
		self.records.write().push(record);
	}

	/// Inserts or replaces by the text value under `id_attribute`.
	///
	/// Records without that attribute are appended; this mirrors how a
	/// document upsert treats a missing identity as a new document.
	pub fn upsert(&self, id_attribute: &str, batch: &[Value]) {
		let mut records = self.records.write();
		'batch: for record in batch {
			let id = attribute_text(record, id_attribute);
			if let Some(id) = &id {
				for stored in records.iter_mut() {
					if attribute_text(stored, id_attribute).as_deref() == Some(id) {
						*stored = record.deep_copy();
						continue 'batch;
					}
				}
			}
			records.push(record.deep_copy());
		}
	}

	/// A snapshot of the collection in insertion order.
	pub fn snapshot(&self) -> Vec<Value> {
		self.records.read().iter().map(Value::deep_copy).collect()
	}

	/// Drops the oldest records until at most `cap` remain.
	pub fn evict_to(&self, cap: usize) {
		let mut records = self.records.write();
		let len = records.len();
		if len > cap {
			records.drain(..len - cap);
		}
	}

	pub fn clear(&self) {
		self.records.write().clear();
	}
}

fn attribute_text(record: &Value, attribute: &str) -> Option<String> {
	let value = record.as_map().ok()?.get(attribute)?;
	match value.as_text() {
		Ok(text) => Some(text.to_string()),
		Err(_) => value.as_opaque().ok().map(|opaque| opaque.data.clone()),
	}
}
