// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{Display, Formatter};

use tributary_type::{Millis, Value};

use crate::Result;

/// The callback a loader pushes records into.
///
/// Returning an error from the callback aborts the load; loaders must
/// propagate it unchanged so cooperative cancellation reaches the adapter.
pub type OnRecord<'a> = &'a mut dyn FnMut(Value) -> Result<()>;

/// An opaque per-record identity assigned by a streaming source.
///
/// The engine never interprets the content; it only compares ids for
/// equality and persists them as cursor state. The default id is empty and
/// means "no position remembered yet".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
	pub fn new(id: impl Into<String>) -> Self {
		RecordId(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<String> for RecordId {
	fn from(id: String) -> Self {
		RecordId(id)
	}
}

impl From<&str> for RecordId {
	fn from(id: &str) -> Self {
		RecordId(id.to_string())
	}
}

impl Display for RecordId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// A source that yields every record at or after a point in time, in the
/// source's own order.
pub trait SourceLoader: Send + Sync {
	fn load(&self, start: Millis, on_record: OnRecord) -> Result<()>;
}

/// A capped-stream source: yields the tail of a ring-buffer view starting
/// at the remembered id when that id is still visible, or from wherever the
/// ring now begins when it has rotated past it.
pub trait CappedSourceLoader: Send + Sync {
	fn load(&self, start: &RecordId, on_record: OnRecord) -> Result<()>;
}

/// A destination that persists a batch of record envelopes.
///
/// Saves must be idempotent on the envelope identity so that at-least-once
/// delivery converges.
pub trait Saver: Send + Sync {
	fn save(&self, batch: &[Value]) -> Result<()>;
}

/// A destination lookup by content fingerprint: yields every stored record
/// whose `attribute` matches any of the given fingerprints.
pub trait FingerprintQuery: Send + Sync {
	fn find(&self, attribute: &str, fingerprints: &[i32], on_record: OnRecord) -> Result<()>;
}

/// Durable last-time cursor state for one topic.
pub trait TimeCursor: Send + Sync {
	fn load_start_time(&self) -> Result<Millis>;
	fn save_start_time(&self, time: Millis) -> Result<()>;
}

/// Durable cursor state for a streaming topic: last-time plus last-id.
pub trait StreamCursor: TimeCursor {
	fn load_start_id(&self) -> Result<RecordId>;
	fn save_start_id(&self, id: &RecordId) -> Result<()>;
}

/// Shifts the start time handed to a source backwards by a fixed skew.
///
/// Some upstream queries interpolate the cursor with an off-by-one-second
/// compensation of their own; the skew keeps that adjustment a deployment
/// knob instead of baking it into any query text.
pub struct SkewedLoader<L> {
	inner: L,
	skew_millis: i64,
}

impl<L: SourceLoader> SkewedLoader<L> {
	pub fn new(inner: L, skew_millis: i64) -> Self {
		Self { inner, skew_millis }
	}
}

impl<L: SourceLoader> SourceLoader for SkewedLoader<L> {
	fn load(&self, start: Millis, on_record: OnRecord) -> Result<()> {
		self.inner.load(start.rewind(self.skew_millis), on_record)
	}
}

impl<L: SourceLoader + ?Sized> SourceLoader for Box<L> {
	fn load(&self, start: Millis, on_record: OnRecord) -> Result<()> {
		(**self).load(start, on_record)
	}
}

impl<L: CappedSourceLoader + ?Sized> CappedSourceLoader for Box<L> {
	fn load(&self, start: &RecordId, on_record: OnRecord) -> Result<()> {
		(**self).load(start, on_record)
	}
}

impl<S: Saver + ?Sized> Saver for Box<S> {
	fn save(&self, batch: &[Value]) -> Result<()> {
		(**self).save(batch)
	}
}

impl<Q: FingerprintQuery + ?Sized> FingerprintQuery for Box<Q> {
	fn find(&self, attribute: &str, fingerprints: &[i32], on_record: OnRecord) -> Result<()> {
		(**self).find(attribute, fingerprints, on_record)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Probe;

	impl SourceLoader for Probe {
		fn load(&self, start: Millis, on_record: OnRecord) -> Result<()> {
			on_record(Value::from(start.get()))
		}
	}

	#[test]
	fn test_skewed_loader_rewinds_the_start() {
		let loader = SkewedLoader::new(Probe, 1000);
		let mut seen = Vec::new();
		loader
			.load(Millis::new(5000), &mut |record| {
				seen.push(record.as_int8().unwrap());
				Ok(())
			})
			.unwrap();
		assert_eq!(seen, [4000]);
	}

	#[test]
	fn test_skew_clamps_at_epoch() {
		let loader = SkewedLoader::new(Probe, 1000);
		let mut seen = Vec::new();
		loader
			.load(Millis::new(200), &mut |record| {
				seen.push(record.as_int8().unwrap());
				Ok(())
			})
			.unwrap();
		assert_eq!(seen, [0]);
	}

	#[test]
	fn test_record_id_default_is_empty() {
		assert!(RecordId::default().is_empty());
		assert!(!RecordId::new("58f6c").is_empty());
	}
}
