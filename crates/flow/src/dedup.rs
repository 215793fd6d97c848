// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashSet;

use tracing::debug;

use tributary_core::{FingerprintQuery, Result};
use tributary_type::Value;

use crate::pipeline::Transform;

/// Removes records the destination already holds.
///
/// Every record gets its content fingerprint injected under the descriptor
/// attribute (the field is persisted, so later rounds can query by it).
/// A record is dropped only when the destination holds a record with the
/// same fingerprint AND the same canonical source string — the double check
/// keeps fingerprint collisions from suppressing genuinely new content.
pub struct Dedup<Q> {
	descriptor_attribute: String,
	source_attribute: String,
	query: Q,
}

impl<Q: FingerprintQuery> Dedup<Q> {
	pub fn new(descriptor_attribute: impl Into<String>, source_attribute: impl Into<String>, query: Q) -> Self {
		Self {
			descriptor_attribute: descriptor_attribute.into(),
			source_attribute: source_attribute.into(),
			query,
		}
	}
}

impl<Q: FingerprintQuery> Transform for Dedup<Q> {
	fn apply(&self, batch: &mut Vec<Value>) -> Result<()> {
		if batch.is_empty() {
			return Ok(());
		}

		let mut descriptors = Vec::with_capacity(batch.len());
		for record in batch.iter_mut() {
			let descriptor = record.get(&self.source_attribute)?.fingerprint();
			record.as_map_mut()?.insert(self.descriptor_attribute.clone(), Value::from(descriptor));
			descriptors.push(descriptor);
		}

		let mut stored_descriptors: HashSet<i32> = HashSet::new();
		let mut stored_sources: HashSet<String> = HashSet::new();
		self.query.find(&self.descriptor_attribute, &descriptors, &mut |stored| {
			stored_sources.insert(stored.get(&self.source_attribute)?.canonical());
			stored_descriptors.insert(stored.get(&self.descriptor_attribute)?.as_int4()?);
			Ok(())
		})?;

		if stored_descriptors.is_empty() {
			return Ok(());
		}

		let before = batch.len();
		let mut kept = Vec::with_capacity(batch.len());
		for record in batch.drain(..) {
			let descriptor = record.get(&self.descriptor_attribute)?.as_int4()?;
			let canonical = record.get(&self.source_attribute)?.canonical();
			if !stored_descriptors.contains(&descriptor) || !stored_sources.contains(&canonical) {
				kept.push(record);
			}
		}
		*batch = kept;

		if batch.len() < before {
			debug!(dropped = before - batch.len(), kept = batch.len(), "duplicates removed");
		}
		Ok(())
	}
}
