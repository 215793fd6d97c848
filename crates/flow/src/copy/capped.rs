// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::debug;

use tributary_core::util::{FirstError, SyncBuffer};
use tributary_core::{CappedSourceLoader, Error, RecordId, Result, SourceLoader, StreamCursor};
use tributary_type::{Millis, Value};

use super::{POLL_PAUSE, QUEUE_SOFT_CAP};

/// Streams a capped (ring-buffer) source, backfilling from the queryable
/// store only when the ring has rotated past the remembered cursor.
///
/// Four workers run concurrently: the tail loader and tail saver form the
/// fast path; the backfill loader and backfill saver form the recovery
/// path. The tail saver decides between them by looking at the first id the
/// tail yields: the remembered id means the ring still overlaps the cursor
/// and backfill is unnecessary; any other id (or an empty tail) means the
/// gap must be read back from the store. The `fallback_requested` /
/// `fallback_disabled` handshake makes that decision exactly once, so every
/// id range is driven by exactly one source and the gap is never saved
/// twice.
///
/// Checkpointing: the backfill lane persists its id and time after each of
/// its batches; the tail lane holds its checkpoint back until the backfill
/// saver has finished, because the tail position is always ahead of the
/// backfill and persisting it early would let a crash skip the gap.
pub fn copy_capped<CL, L, S, C, T, I>(
	capped_loader: &CL,
	loader: &L,
	save: S,
	cursor: &C,
	get_time: T,
	get_id: I,
) -> Result<()>
where
	CL: CappedSourceLoader + ?Sized,
	L: SourceLoader + ?Sized,
	S: Fn(&mut Vec<Value>) -> Result<()> + Sync,
	C: StreamCursor + Sync + ?Sized,
	T: Fn(&Value) -> Result<Millis> + Sync,
	I: Fn(&Value) -> Result<RecordId> + Sync,
{
	let capped_start_id = cursor.load_start_id()?;
	let capped_start_time = cursor.load_start_time()?;
	let store_start_id = capped_start_id.clone();
	let store_start_time = capped_start_time;

	let capped_queue: SyncBuffer<Value> = SyncBuffer::new();
	let store_queue: SyncBuffer<Value> = SyncBuffer::new();
	let failure = FirstError::new();
	let flags = Flags::new();

	thread::scope(|scope| {
		let capped_queue = &capped_queue;
		let store_queue = &store_queue;
		let failure = &failure;
		let flags = &flags;
		let save = &save;
		let get_time = &get_time;
		let get_id = &get_id;

		// backfill saver
		scope.spawn(move || {
			let result =
				save_store(store_start_id, store_start_time, store_queue, failure, flags, save, cursor, get_time, get_id);
			if let Err(error) = result {
				failure.set(error);
			}
			flags.save_store_done.store(true, Ordering::Release);
		});

		// tail saver
		let tail_start_id = capped_start_id.clone();
		scope.spawn(move || {
			let result = save_capped(
				tail_start_id,
				capped_start_time,
				capped_queue,
				failure,
				flags,
				save,
				cursor,
				get_time,
				get_id,
			);
			if let Err(error) = result {
				failure.set(error);
			}
			flags.save_capped_done.store(true, Ordering::Release);
		});

		// backfill loader
		scope.spawn(move || {
			let result = load_store(store_start_time, store_queue, failure, flags, loader);
			if let Err(error) = result {
				failure.set(error);
			}
			flags.load_store_done.store(true, Ordering::Release);
		});

		// tail loader, on the calling thread
		let result = capped_loader.load(&capped_start_id, &mut |record| {
			failure.check()?;
			capped_queue.push(record);
			Ok(())
		});
		if let Err(error) = result {
			failure.set(error);
		}
		flags.load_capped_done.store(true, Ordering::Release);
	});

	match failure.take() {
		Some(error) => Err(error),
		None => Ok(()),
	}
}

struct Flags {
	fallback_requested: AtomicBool,
	fallback_disabled: AtomicBool,
	load_capped_done: AtomicBool,
	load_store_done: AtomicBool,
	save_capped_done: AtomicBool,
	save_store_done: AtomicBool,
}

impl Flags {
	fn new() -> Self {
		Self {
			fallback_requested: AtomicBool::new(false),
			fallback_disabled: AtomicBool::new(false),
			load_capped_done: AtomicBool::new(false),
			load_store_done: AtomicBool::new(false),
			save_capped_done: AtomicBool::new(false),
			save_store_done: AtomicBool::new(false),
		}
	}
}

/// Idles until the tail saver requests a backfill (or the tail saver
/// finishes without one), then reads the store from the remembered time
/// into the backfill queue, with backpressure against the backfill saver.
fn load_store<L>(
	start_time: Millis,
	queue: &SyncBuffer<Value>,
	failure: &FirstError,
	flags: &Flags,
	loader: &L,
) -> Result<()>
where
	L: SourceLoader + ?Sized,
{
	while !flags.fallback_disabled.load(Ordering::Acquire) && !flags.save_capped_done.load(Ordering::Acquire) {
		if !flags.fallback_requested.load(Ordering::Acquire) {
			failure.check()?;
			thread::sleep(POLL_PAUSE);
			continue;
		}

		failure.check()?;
		flags.fallback_disabled.store(true, Ordering::Release);
		debug!(from = %start_time, "backfill claimed, loading from the store");

		loader.load(start_time, &mut |record| {
			while queue.len() > QUEUE_SOFT_CAP {
				if flags.save_store_done.load(Ordering::Acquire) {
					return Err(Error::Aborted);
				}
				failure.check()?;
				thread::sleep(POLL_PAUSE);
			}
			if flags.save_store_done.load(Ordering::Acquire) {
				return Err(Error::Aborted);
			}
			failure.check()?;
			queue.push(record);
			Ok(())
		})?;
		break;
	}

	Ok(())
}

/// Drains the tail queue. For the first records it arbitrates the overlap
/// decision, then tracks the tail cursor; the checkpoint is withheld until
/// the backfill saver has finished.
fn save_capped<S, C, T, I>(
	mut id: RecordId,
	mut time: Millis,
	queue: &SyncBuffer<Value>,
	failure: &FirstError,
	flags: &Flags,
	save: &S,
	cursor: &C,
	get_time: &T,
	get_id: &I,
) -> Result<()>
where
	S: Fn(&mut Vec<Value>) -> Result<()> + Sync,
	C: StreamCursor + Sync + ?Sized,
	T: Fn(&Value) -> Result<Millis> + Sync,
	I: Fn(&Value) -> Result<RecordId> + Sync,
{
	let mut saved_cursor = false;

	loop {
		if queue.is_empty() {
			if flags.load_capped_done.load(Ordering::Acquire) {
				break;
			}
			failure.check()?;
			thread::sleep(POLL_PAUSE);
			continue;
		}

		let mut batch = queue.drain_all();
		for record in &batch {
			let record_id = get_id(record)?;

			if !flags.fallback_disabled.load(Ordering::Acquire) {
				if record_id == id {
					// the remembered cursor is still inside the ring
					flags.fallback_disabled.store(true, Ordering::Release);
					debug!(id = %record_id, "tail overlaps the cursor, backfill skipped");
				} else {
					flags.fallback_requested.store(true, Ordering::Release);
					while !flags.fallback_disabled.load(Ordering::Acquire)
						&& !flags.load_store_done.load(Ordering::Acquire)
					{
						failure.check()?;
						thread::sleep(POLL_PAUSE);
					}
				}
			}

			id = record_id;

			let record_time = get_time(record)?;
			if record_time < time {
				return Err(Error::OrderViolation { cursor: time, record: record_time });
			}
			time = record_time;
		}

		save(&mut batch)?;

		if flags.save_store_done.load(Ordering::Acquire) && !failure.is_set() {
			cursor.save_start_id(&id)?;
			cursor.save_start_time(time)?;
			saved_cursor = true;
		}
	}

	if !flags.fallback_disabled.load(Ordering::Acquire) {
		// the tail yielded nothing: there is no tail position to record,
		// and the store must be consulted for anything the ring dropped
		saved_cursor = true;
		flags.fallback_requested.store(true, Ordering::Release);
	}

	if flags.fallback_requested.load(Ordering::Acquire) {
		while !flags.save_store_done.load(Ordering::Acquire) {
			failure.check()?;
			thread::sleep(POLL_PAUSE);
		}
	}

	if !saved_cursor && !failure.is_set() {
		cursor.save_start_id(&id)?;
		cursor.save_start_time(time)?;
	}

	Ok(())
}

/// Drains the backfill queue, saving and checkpointing batch by batch.
fn save_store<S, C, T, I>(
	mut id: RecordId,
	mut time: Millis,
	queue: &SyncBuffer<Value>,
	failure: &FirstError,
	flags: &Flags,
	save: &S,
	cursor: &C,
	get_time: &T,
	get_id: &I,
) -> Result<()>
where
	S: Fn(&mut Vec<Value>) -> Result<()> + Sync,
	C: StreamCursor + Sync + ?Sized,
	T: Fn(&Value) -> Result<Millis> + Sync,
	I: Fn(&Value) -> Result<RecordId> + Sync,
{
	loop {
		if queue.is_empty() {
			if flags.load_store_done.load(Ordering::Acquire) {
				break;
			}
			failure.check()?;
			thread::sleep(POLL_PAUSE);
			continue;
		}

		let mut batch = queue.drain_all();
		for record in &batch {
			id = get_id(record)?;

			let record_time = get_time(record)?;
			if record_time < time {
				return Err(Error::OrderViolation { cursor: time, record: record_time });
			}
			time = record_time;
		}

		save(&mut batch)?;
		cursor.save_start_id(&id)?;
		cursor.save_start_time(time)?;
		debug!(cursor = %time, "backfill chunk saved");
	}

	Ok(())
}
