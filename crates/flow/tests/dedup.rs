// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tributary_core::TimeCursor;
use tributary_flow::{Dedup, Pipeline, TabularEnricher, Transform, copy_bulk, extract};
use tributary_store_memory::{MemoryCursor, MemoryFingerprints, MemoryHub, MemorySink, MemorySource};
use tributary_type::{Millis, Value, ValueMap};

fn row(payload: &str, start_time: &str) -> Value {
	let mut entries = ValueMap::new();
	entries.insert("k".to_string(), Value::from(payload));
	entries.insert("start_time".to_string(), Value::from(start_time));
	Value::Map(entries)
}

fn pipeline(hub: &MemoryHub) -> Pipeline {
	Pipeline::new()
		.transform(TabularEnricher::new("crm", "Thing", "thing", "things", Vec::new()))
		.transform(Dedup::new("descriptor", "source", MemoryFingerprints::new(hub.collection("things"))))
		.sink(MemorySink::new(hub.collection("things"), "_id", "canonical"))
}

#[test]
fn test_rerun_commits_only_new_content() {
	let hub = MemoryHub::new();
	let cursor = MemoryCursor::new();

	// first pass: one record
	let source_records = hub.collection("things.rows");
	source_records.insert(row("v", "1970-01-01 00:00:01"));
	let source = MemorySource::new(source_records.clone(), extract::tabular_time("start_time"));
	let first = pipeline(&hub);
	copy_bulk(&source, |batch| first.run(batch), &cursor, extract::tabular_time("start_time")).unwrap();
	assert_eq!(hub.collection("things").len(), 1);

	// second pass: the same content again plus one genuinely new record
	source_records.insert(row("w", "1970-01-01 00:00:02"));
	let second = pipeline(&hub);
	copy_bulk(&source, |batch| second.run(batch), &cursor, extract::tabular_time("start_time")).unwrap();

	let stored = hub.collection("things").snapshot();
	assert_eq!(stored.len(), 2);
	let mut payloads: Vec<String> = stored
		.iter()
		.map(|envelope| envelope.get("source").unwrap().get("k").unwrap().as_text().unwrap().to_string())
		.collect();
	payloads.sort();
	assert_eq!(payloads, ["v", "w"]);
	assert_eq!(cursor.load_start_time().unwrap(), Millis::new(2000));
}

#[test]
fn test_same_fingerprint_different_content_is_kept() {
	// forge a stored record whose descriptor collides with new content but
	// whose canonical source string differs: the double check keeps it
	let hub = MemoryHub::new();
	let stored_collection = hub.collection("things");

	let mut new_batch = vec![row("fresh", "1970-01-01 00:00:01")];
	let enricher = TabularEnricher::new("crm", "Thing", "thing", "things", Vec::new());
	enricher.apply(&mut new_batch).unwrap();
	let fingerprint = new_batch[0].get("source").unwrap().fingerprint();

	let mut forged = ValueMap::new();
	forged.insert("_id".to_string(), Value::from("stored-1"));
	forged.insert("descriptor".to_string(), Value::from(fingerprint));
	let mut other_source = ValueMap::new();
	other_source.insert("k".to_string(), Value::from("different"));
	forged.insert("source".to_string(), Value::Map(other_source));
	stored_collection.insert(Value::Map(forged));

	let dedup = Dedup::new("descriptor", "source", MemoryFingerprints::new(stored_collection.clone()));
	dedup.apply(&mut new_batch).unwrap();

	// identical fingerprint, different canonical string: an update, not a duplicate
	assert_eq!(new_batch.len(), 1);
}
