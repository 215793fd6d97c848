// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use tributary_core::{Error, OnRecord, RecordId, Result, SourceLoader, StreamCursor, TimeCursor};
use tributary_flow::{copy_capped, extract};
use tributary_store_memory::{Collection, MemoryCappedSource, MemoryCursor};
use tributary_type::{Millis, Value, ValueMap};

fn record(id: &str, time: i64) -> Value {
	let mut entries = ValueMap::new();
	entries.insert("_id".to_string(), Value::from(id));
	entries.insert("when".to_string(), Value::from(Millis::new(time)));
	Value::Map(entries)
}

/// Counts how many times the backfill loader was actually invoked.
struct CountingSource {
	records: Vec<Value>,
	loads: AtomicUsize,
}

impl CountingSource {
	fn of(records: Vec<Value>) -> Self {
		Self { records, loads: AtomicUsize::new(0) }
	}
}

impl SourceLoader for CountingSource {
	fn load(&self, start: Millis, on_record: OnRecord) -> Result<()> {
		self.loads.fetch_add(1, Ordering::SeqCst);
		for record in &self.records {
			if record.get("when")?.as_timestamp()? >= start {
				on_record(record.deep_copy())?;
			}
		}
		Ok(())
	}
}

/// Counts saves per record id so double-saves are visible.
#[derive(Default)]
struct SaveCounter {
	counts: Mutex<HashMap<String, usize>>,
}

impl SaveCounter {
	fn save(&self, batch: &[Value]) -> Result<()> {
		let mut counts = self.counts.lock();
		for saved in batch {
			*counts.entry(saved.get("_id")?.as_text()?.to_string()).or_insert(0) += 1;
		}
		Ok(())
	}

	fn ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.counts.lock().keys().cloned().collect();
		ids.sort();
		ids
	}

	fn all_saved_once(&self) -> bool {
		self.counts.lock().values().all(|count| *count == 1)
	}
}

fn ring(records: &[Value]) -> Collection {
	let collection = Collection::default();
	for item in records {
		collection.insert(item.deep_copy());
	}
	collection
}

#[test]
fn test_overlap_skips_the_backfill() {
	let tail =
		MemoryCappedSource::new(ring(&[record("b", 2000), record("c", 3000), record("d", 4000)]), extract::opaque_id("_id"));
	let store = CountingSource::of(vec![record("a", 1000), record("b", 2000)]);
	let cursor = MemoryCursor::starting_at(Millis::new(2000), RecordId::new("b"));
	let saves = SaveCounter::default();

	copy_capped(
		&tail,
		&store,
		|batch: &mut Vec<Value>| saves.save(batch),
		&cursor,
		extract::timestamp_time("when"),
		extract::opaque_id("_id"),
	)
	.unwrap();

	// the remembered id was still in the ring: the store was never consulted
	assert_eq!(store.loads.load(Ordering::SeqCst), 0);
	assert_eq!(saves.ids(), ["b", "c", "d"]);
	assert!(saves.all_saved_once());
	assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("d"));
	assert_eq!(cursor.load_start_time().unwrap(), Millis::new(4000));
}

#[test]
fn test_rotated_ring_backfills_the_gap_exactly_once() {
	// the ring rotated past the cursor: b and c fell out, only d and e remain
	let tail = MemoryCappedSource::new(ring(&[record("d", 4000), record("e", 5000)]), extract::opaque_id("_id"));
	let store = CountingSource::of(vec![record("b", 2000), record("c", 3000)]);
	let cursor = MemoryCursor::starting_at(Millis::new(2000), RecordId::new("b"));
	let saves = SaveCounter::default();

	copy_capped(
		&tail,
		&store,
		|batch: &mut Vec<Value>| saves.save(batch),
		&cursor,
		extract::timestamp_time("when"),
		extract::opaque_id("_id"),
	)
	.unwrap();

	// backfill ran exactly once and the union covers the whole delta
	assert_eq!(store.loads.load(Ordering::SeqCst), 1);
	assert_eq!(saves.ids(), ["b", "c", "d", "e"]);
	assert!(saves.all_saved_once());
	// the tail cursor wins in the end and both components moved forward
	assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("e"));
	assert_eq!(cursor.load_start_time().unwrap(), Millis::new(5000));
}

#[test]
fn test_empty_tail_forces_the_backfill() {
	let tail = MemoryCappedSource::new(ring(&[]), extract::opaque_id("_id"));
	let store = CountingSource::of(vec![record("b", 2000), record("c", 3000)]);
	let cursor = MemoryCursor::starting_at(Millis::new(2000), RecordId::new("b"));
	let saves = SaveCounter::default();

	copy_capped(
		&tail,
		&store,
		|batch: &mut Vec<Value>| saves.save(batch),
		&cursor,
		extract::timestamp_time("when"),
		extract::opaque_id("_id"),
	)
	.unwrap();

	assert_eq!(store.loads.load(Ordering::SeqCst), 1);
	assert_eq!(saves.ids(), ["b", "c"]);
	// the backfill saver checkpointed its own lane
	assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("c"));
	assert_eq!(cursor.load_start_time().unwrap(), Millis::new(3000));
}

#[test]
fn test_fresh_cursor_reads_the_whole_ring() {
	let tail = MemoryCappedSource::new(ring(&[record("a", 1000), record("b", 2000)]), extract::opaque_id("_id"));
	let store = CountingSource::of(Vec::new());
	let cursor = MemoryCursor::new();
	let saves = SaveCounter::default();

	copy_capped(
		&tail,
		&store,
		|batch: &mut Vec<Value>| saves.save(batch),
		&cursor,
		extract::timestamp_time("when"),
		extract::opaque_id("_id"),
	)
	.unwrap();

	assert_eq!(saves.ids(), ["a", "b"]);
	assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("b"));
}

#[test]
fn test_save_failure_surfaces_one_error_and_skips_the_checkpoint() {
	let tail =
		MemoryCappedSource::new(ring(&[record("b", 2000), record("c", 3000)]), extract::opaque_id("_id"));
	let store = CountingSource::of(Vec::new());
	let cursor = MemoryCursor::starting_at(Millis::new(2000), RecordId::new("b"));

	let result = copy_capped(
		&tail,
		&store,
		|_batch: &mut Vec<Value>| Err(Error::Sink("boom".to_string())),
		&cursor,
		extract::timestamp_time("when"),
		extract::opaque_id("_id"),
	);

	match result {
		Err(Error::Sink(message)) => assert_eq!(message, "boom"),
		other => panic!("expected the sink's error, got {other:?}"),
	}
	assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("b"));
	assert_eq!(cursor.load_start_time().unwrap(), Millis::new(2000));
}

#[test]
fn test_retry_completes_after_a_transient_mid_run_failure() {
	let tail = MemoryCappedSource::new(
		ring(&[record("b", 2000), record("c", 3000), record("d", 4000), record("e", 5000)]),
		extract::opaque_id("_id"),
	);
	let store = CountingSource::of(vec![record("b", 2000)]);
	let cursor = MemoryCursor::starting_at(Millis::new(2000), RecordId::new("b"));

	let saved = Mutex::new(HashMap::<String, Value>::new());
	let tripped = AtomicBool::new(false);

	let save = |batch: &mut Vec<Value>| -> Result<()> {
		let fail = batch.iter().any(|item| item.get("_id").map(|id| id.as_text() == Ok("d")).unwrap_or(false));
		if fail && !tripped.swap(true, Ordering::SeqCst) {
			return Err(Error::Sink("transient".to_string()));
		}
		let mut saved = saved.lock();
		for item in batch.iter() {
			saved.insert(item.get("_id")?.as_text()?.to_string(), item.deep_copy());
		}
		Ok(())
	};

	let retry = tributary_core::Retry::new(tributary_core::RetryPolicy::Attempts(5), std::time::Duration::from_millis(1));
	retry
		.run("capped", || {
			copy_capped(
				&tail,
				&store,
				&save,
				&cursor,
				extract::timestamp_time("when"),
				extract::opaque_id("_id"),
			)
		})
		.unwrap();

	let saved = saved.lock();
	for id in ["b", "c", "d", "e"] {
		assert!(saved.contains_key(id), "record {id} missing from the destination");
	}
	assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("e"));
	assert_eq!(cursor.load_start_time().unwrap(), Millis::new(5000));
}
