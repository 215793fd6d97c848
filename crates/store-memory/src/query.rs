// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tributary_core::{FingerprintQuery, OnRecord, Result};

use crate::hub::Collection;

/// A fingerprint lookup over a destination collection.
///
/// Yields every stored record whose integer value under the queried
/// attribute matches any of the requested fingerprints; records without the
/// attribute are skipped, matching how a destination index treats documents
/// that were stored before the descriptor existed.
pub struct MemoryFingerprints {
	collection: Collection,
}

impl MemoryFingerprints {
	pub fn new(collection: Collection) -> Self {
		Self { collection }
	}
}

impl FingerprintQuery for MemoryFingerprints {
	fn find(&self, attribute: &str, fingerprints: &[i32], on_record: OnRecord) -> Result<()> {
		for record in self.collection.snapshot() {
			let stored = match record.as_map() {
				Ok(entries) => entries.get(attribute).and_then(|value| value.as_int4().ok()),
				Err(_) => None,
			};
			if let Some(stored) = stored {
				if fingerprints.contains(&stored) {
					on_record(record)?;
				}
			}
		}
		Ok(())
	}
}
