// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tributary_core::{RecordId, StreamCursor, TimeCursor};
use tributary_type::Millis;

use crate::CursorStore;

/// The deployment key convention for one topic's cursor:
/// `<name>` holds the last time as ASCII decimal milliseconds and
/// `<name>.id` holds the last id as an opaque string. Absent keys read as
/// time zero and the empty id, so a fresh topic starts from the beginning.
pub struct TopicCursor {
	store: CursorStore,
	time_key: String,
	id_key: String,
}

impl TopicCursor {
	pub fn new(store: CursorStore, topic: impl Into<String>) -> Self {
		let topic = topic.into();
		let id_key = format!("{topic}.id");
		Self { store, time_key: topic, id_key }
	}
}

impl TimeCursor for TopicCursor {
	fn load_start_time(&self) -> tributary_core::Result<Millis> {
		let value = self.store.get_or_default(&self.time_key)?;
		// a leading zero makes the empty string parse as time zero
		let millis = format!("0{value}")
			.parse::<i64>()
			.map_err(|_| tributary_core::Error::CursorStore(format!(
				"cursor key {:?} holds a non-numeric time {value:?}",
				self.time_key
			)))?;
		Ok(Millis::new(millis))
	}

	fn save_start_time(&self, time: Millis) -> tributary_core::Result<()> {
		self.store.set(&self.time_key, &time.get().to_string())?;
		Ok(())
	}
}

impl StreamCursor for TopicCursor {
	fn load_start_id(&self) -> tributary_core::Result<RecordId> {
		let value = self.store.get_or_default(&self.id_key)?;
		Ok(RecordId::new(value))
	}

	fn save_start_id(&self, id: &RecordId) -> tributary_core::Result<()> {
		self.store.set(&self.id_key, id.as_str())?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	fn cursor(dir: &TempDir, topic: &str) -> TopicCursor {
		TopicCursor::new(CursorStore::open_at(dir.path().join("cursors.sqlite")), topic)
	}

	#[test]
	fn test_fresh_topic_starts_from_zero() {
		let dir = TempDir::new().unwrap();
		let cursor = cursor(&dir, "accounts");
		assert_eq!(cursor.load_start_time().unwrap(), Millis::ZERO);
		assert!(cursor.load_start_id().unwrap().is_empty());
	}

	#[test]
	fn test_time_round_trip() {
		let dir = TempDir::new().unwrap();
		let cursor = cursor(&dir, "accounts");
		cursor.save_start_time(Millis::new(987_654_321)).unwrap();
		assert_eq!(cursor.load_start_time().unwrap(), Millis::new(987_654_321));
	}

	#[test]
	fn test_id_round_trip() {
		let dir = TempDir::new().unwrap();
		let cursor = cursor(&dir, "events");
		cursor.save_start_id(&RecordId::new("58f6c0ab12")).unwrap();
		assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("58f6c0ab12"));
	}

	#[test]
	fn test_topics_are_disjoint() {
		let dir = TempDir::new().unwrap();
		let left = cursor(&dir, "left");
		let right = cursor(&dir, "right");
		left.save_start_time(Millis::new(1000)).unwrap();
		right.save_start_time(Millis::new(2000)).unwrap();
		assert_eq!(left.load_start_time().unwrap(), Millis::new(1000));
		assert_eq!(right.load_start_time().unwrap(), Millis::new(2000));
	}

	#[test]
	fn test_non_numeric_time_is_an_error() {
		let dir = TempDir::new().unwrap();
		let store = CursorStore::open_at(dir.path().join("cursors.sqlite"));
		store.set("broken", "not-a-number").unwrap();
		let cursor = TopicCursor::new(store, "broken");
		assert!(cursor.load_start_time().is_err());
	}
}
