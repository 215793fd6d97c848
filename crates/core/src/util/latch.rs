// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::{Error, Result};

/// The first-error-wins latch shared by cooperating workers.
///
/// The first worker to fail stores its error and trips the flag; every
/// other worker observes the flag at its next poll point, unwinds with
/// [`Error::Aborted`], and the stored error is re-raised after the join.
pub struct FirstError {
	failed: AtomicBool,
	slot: Mutex<Option<Error>>,
}

impl FirstError {
	pub fn new() -> Self {
		Self { failed: AtomicBool::new(false), slot: Mutex::new(None) }
	}

	/// Stores `error` if the latch is untripped; later errors are dropped.
	pub fn set(&self, error: Error) {
		let mut slot = self.slot.lock();
		if slot.is_none() {
			*slot = Some(error);
			self.failed.store(true, Ordering::Release);
		}
	}

	pub fn is_set(&self) -> bool {
		self.failed.load(Ordering::Acquire)
	}

	/// The cancellation poll: trips the caller with [`Error::Aborted`] once
	/// any worker has failed.
	pub fn check(&self) -> Result<()> {
		if self.is_set() { Err(Error::Aborted) } else { Ok(()) }
	}

	/// Takes the stored error after all workers have joined.
	pub fn take(&self) -> Option<Error> {
		self.slot.lock().take()
	}
}

impl Default for FirstError {
	fn default() -> Self {
		Self::new()
	}
}
