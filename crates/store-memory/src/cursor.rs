// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use parking_lot::Mutex;

use tributary_core::{RecordId, Result, StreamCursor, TimeCursor};
use tributary_type::Millis;

/// Cursor state held in memory, for orchestrator tests and throwaway runs.
#[derive(Default)]
pub struct MemoryCursor {
	state: Mutex<(Millis, RecordId)>,
}

impl MemoryCursor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn starting_at(time: Millis, id: RecordId) -> Self {
		Self { state: Mutex::new((time, id)) }
	}
}

impl TimeCursor for MemoryCursor {
	fn load_start_time(&self) -> Result<Millis> {
		Ok(self.state.lock().0)
	}

	fn save_start_time(&self, time: Millis) -> Result<()> {
		self.state.lock().0 = time;
		Ok(())
	}
}

impl StreamCursor for MemoryCursor {
	fn load_start_id(&self) -> Result<RecordId> {
		Ok(self.state.lock().1.clone())
	}

	fn save_start_id(&self, id: &RecordId) -> Result<()> {
		self.state.lock().1 = id.clone();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_round_trip() {
		let cursor = MemoryCursor::new();
		assert_eq!(cursor.load_start_time().unwrap(), Millis::ZERO);
		cursor.save_start_time(Millis::new(5000)).unwrap();
		cursor.save_start_id(&RecordId::new("x")).unwrap();
		assert_eq!(cursor.load_start_time().unwrap(), Millis::new(5000));
		assert_eq!(cursor.load_start_id().unwrap(), RecordId::new("x"));
	}
}
