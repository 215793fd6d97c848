// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tracing::debug;

use tributary_core::{Result, SourceLoader, TimeCursor};
use tributary_type::{Millis, Value};

/// Loads the whole delta into memory, saves it as one batch, then
/// checkpoints once.
///
/// The loader need not yield records in time order: the cursor advances to
/// the maximum observed time. An empty delta saves nothing and leaves the
/// cursor untouched; a failure anywhere aborts before the checkpoint, so a
/// partial pass is never recorded.
pub fn copy_bulk<L, S, C, T>(loader: &L, mut save: S, cursor: &C, get_time: T) -> Result<()>
where
	L: SourceLoader + ?Sized,
	S: FnMut(&mut Vec<Value>) -> Result<()>,
	C: TimeCursor + ?Sized,
	T: Fn(&Value) -> Result<Millis>,
{
	let initial = cursor.load_start_time()?;
	let mut start = initial;
	let mut batch = Vec::new();

	loader.load(initial, &mut |record| {
		let time = get_time(&record)?;
		if start < time {
			start = time;
		}
		batch.push(record);
		Ok(())
	})?;

	if batch.is_empty() {
		return Ok(());
	}

	let records = batch.len();
	save(&mut batch)?;
	cursor.save_start_time(start)?;
	debug!(records, cursor = %start, "bulk pass complete");
	Ok(())
}
