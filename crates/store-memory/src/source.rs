// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tributary_core::{CappedSourceLoader, OnRecord, RecordId, Result, SourceLoader};
use tributary_type::{Millis, Value};

use crate::hub::Collection;

type TimeOf = Box<dyn Fn(&Value) -> Result<Millis> + Send + Sync>;
type IdOf = Box<dyn Fn(&Value) -> Result<RecordId> + Send + Sync>;

/// A time-filtered scan over a collection, in insertion order.
///
/// Yields every record whose extracted time is at or after the requested
/// start; re-reading from a persisted cursor therefore replays the boundary
/// record, which deduplication absorbs downstream.
pub struct MemorySource {
	collection: Collection,
	time_of: TimeOf,
}

impl MemorySource {
	pub fn new(collection: Collection, time_of: impl Fn(&Value) -> Result<Millis> + Send + Sync + 'static) -> Self {
		Self { collection, time_of: Box::new(time_of) }
	}
}

impl SourceLoader for MemorySource {
	fn load(&self, start: Millis, on_record: OnRecord) -> Result<()> {
		for record in self.collection.snapshot() {
			if (self.time_of)(&record)? >= start {
				on_record(record)?;
			}
		}
		Ok(())
	}
}

/// The tail of a ring-buffer collection.
///
/// When the remembered id is still visible the tail starts at that record
/// (inclusive), which is how the capped orchestrator recognizes overlap;
/// when the ring has rotated past it, the tail starts at the ring's current
/// beginning. An empty remembered id also reads from the beginning.
pub struct MemoryCappedSource {
	collection: Collection,
	id_of: IdOf,
}

impl MemoryCappedSource {
	pub fn new(collection: Collection, id_of: impl Fn(&Value) -> Result<RecordId> + Send + Sync + 'static) -> Self {
		Self { collection, id_of: Box::new(id_of) }
	}
}

impl CappedSourceLoader for MemoryCappedSource {
	fn load(&self, start: &RecordId, on_record: OnRecord) -> Result<()> {
		let records = self.collection.snapshot();

		let mut from = 0;
		if !start.is_empty() {
			for (index, record) in records.iter().enumerate() {
				if (self.id_of)(record)? == *start {
					from = index;
					break;
				}
			}
		}

		for record in records.into_iter().skip(from) {
			on_record(record)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use tributary_type::ValueMap;

	use super::*;

	fn record(id: &str, time: i64) -> Value {
		let mut entries = ValueMap::new();
		entries.insert("_id".to_string(), Value::from(id));
		entries.insert("when".to_string(), Value::from(Millis::new(time)));
		Value::Map(entries)
	}

	fn time_of(record: &Value) -> Result<Millis> {
		Ok(record.get("when")?.as_timestamp()?)
	}

	fn id_of(record: &Value) -> Result<RecordId> {
		Ok(RecordId::new(record.get("_id")?.as_text()?))
	}

	fn seeded() -> Collection {
		let collection = Collection::default();
		collection.insert(record("a", 1000));
		collection.insert(record("b", 2000));
		collection.insert(record("c", 3000));
		collection
	}

	#[test]
	fn test_source_filters_by_time_inclusive() {
		let source = MemorySource::new(seeded(), time_of);
		let mut seen = Vec::new();
		source
			.load(Millis::new(2000), &mut |record| {
				seen.push(record.get("_id").unwrap().as_text().unwrap().to_string());
				Ok(())
			})
			.unwrap();
		assert_eq!(seen, ["b", "c"]);
	}

	#[test]
	fn test_source_from_zero_yields_everything() {
		let source = MemorySource::new(seeded(), time_of);
		let mut count = 0;
		source
			.load(Millis::ZERO, &mut |_| {
				count += 1;
				Ok(())
			})
			.unwrap();
		assert_eq!(count, 3);
	}

	#[test]
	fn test_capped_tail_starts_at_the_remembered_id() {
		let source = MemoryCappedSource::new(seeded(), id_of);
		let mut seen = Vec::new();
		source
			.load(&RecordId::new("b"), &mut |record| {
				seen.push(record.get("_id").unwrap().as_text().unwrap().to_string());
				Ok(())
			})
			.unwrap();
		assert_eq!(seen, ["b", "c"]);
	}

	#[test]
	fn test_capped_tail_after_rotation_starts_at_the_ring_head() {
		let collection = seeded();
		collection.evict_to(2);
		let source = MemoryCappedSource::new(collection, id_of);
		let mut seen = Vec::new();
		source
			.load(&RecordId::new("a"), &mut |record| {
				seen.push(record.get("_id").unwrap().as_text().unwrap().to_string());
				Ok(())
			})
			.unwrap();
		assert_eq!(seen, ["b", "c"]);
	}
}
