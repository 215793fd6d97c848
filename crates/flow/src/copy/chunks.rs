// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::debug;

use tributary_core::util::{FirstError, SyncBuffer};
use tributary_core::{Error, Result, SourceLoader, TimeCursor};
use tributary_type::{Millis, Value};

use super::{POLL_PAUSE, QUEUE_SOFT_CAP};

/// Streams the delta through a bounded queue: a loader worker pushes
/// records while a saver worker drains, saves and checkpoints batch by
/// batch.
///
/// The loader must yield records in non-decreasing time order — the saver
/// enforces it and fails the run on a violation, because a checkpoint taken
/// out of order would silently skip records on the next resume. The cursor
/// is persisted after every saved batch, so a crash reprocesses at most the
/// unsaved tail (at-least-once delivery; sinks upsert idempotently).
pub fn copy_chunks<L, S, C, T>(loader: &L, save: S, cursor: &C, get_time: T) -> Result<()>
where
	L: SourceLoader + ?Sized,
	S: Fn(&mut Vec<Value>) -> Result<()> + Sync,
	C: TimeCursor + ?Sized,
	T: Fn(&Value) -> Result<Millis> + Sync,
{
	let initial = cursor.load_start_time()?;
	let queue: SyncBuffer<Value> = SyncBuffer::new();
	let failure = FirstError::new();
	let loader_done = AtomicBool::new(false);

	thread::scope(|scope| {
		let queue = &queue;
		let failure = &failure;
		let loader_done = &loader_done;
		let save = &save;
		let get_time = &get_time;

		scope.spawn(move || {
			let result = save_loop(initial, queue, failure, loader_done, save, cursor, get_time);
			if let Err(error) = result {
				failure.set(error);
			}
		});

		let result = loader.load(initial, &mut |record| {
			while queue.len() > QUEUE_SOFT_CAP {
				failure.check()?;
				thread::sleep(POLL_PAUSE);
			}
			failure.check()?;
			queue.push(record);
			Ok(())
		});
		if let Err(error) = result {
			failure.set(error);
		}
		loader_done.store(true, Ordering::Release);
	});

	match failure.take() {
		Some(error) => Err(error),
		None => Ok(()),
	}
}

fn save_loop<S, C, T>(
	initial: Millis,
	queue: &SyncBuffer<Value>,
	failure: &FirstError,
	loader_done: &AtomicBool,
	save: &S,
	cursor: &C,
	get_time: &T,
) -> Result<()>
where
	S: Fn(&mut Vec<Value>) -> Result<()> + Sync,
	C: TimeCursor + ?Sized,
	T: Fn(&Value) -> Result<Millis> + Sync,
{
	let mut start = initial;

	loop {
		if queue.is_empty() {
			if loader_done.load(Ordering::Acquire) {
				break;
			}
			failure.check()?;
			thread::sleep(POLL_PAUSE);
			continue;
		}

		let mut batch = queue.drain_all();
		let records = batch.len();
		for record in &batch {
			let time = get_time(record)?;
			if time < start {
				return Err(Error::OrderViolation { cursor: start, record: time });
			}
			start = time;
		}

		save(&mut batch)?;
		cursor.save_start_time(start)?;
		debug!(records, cursor = %start, "chunk saved");
	}

	Ok(())
}
