// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use thiserror::Error;

use tributary_type::{Millis, TimeError, ValueError};

/// The pipeline-facing error.
///
/// Adapters surface their failures as `Source`/`Sink`/`CursorStore` so the
/// orchestrators stay independent of any concrete client. `Aborted` is the
/// synthetic error a worker raises when it observes the first-error latch;
/// it never survives a join — the latched error is re-raised instead.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Value(#[from] ValueError),
	#[error(transparent)]
	Time(#[from] TimeError),
	#[error("invariant violation: record time {record} is behind the cursor at {cursor}")]
	OrderViolation { cursor: Millis, record: Millis },
	#[error("abort requested by a cooperating worker")]
	Aborted,
	#[error("cursor store: {0}")]
	CursorStore(String),
	#[error("source: {0}")]
	Source(String),
	#[error("sink: {0}")]
	Sink(String),
}
