// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The copy orchestrators.
//!
//! All three share the same contract: records flow source → queue → save →
//! checkpoint, the persisted cursor is only ever advanced after the batch
//! containing those records has been saved, and a failure anywhere
//! surfaces exactly one error after every worker has unwound. What differs
//! is the worker topology: one thread for a bulk pass, two for a chunked
//! stream, four for a capped stream with backfill.

pub use bulk::copy_bulk;
pub use capped::copy_capped;
pub use chunks::copy_chunks;

mod bulk;
mod capped;
mod chunks;

use std::time::Duration;

/// The advisory queue capacity: a producer backs off while the in-flight
/// backlog is above this.
pub const QUEUE_SOFT_CAP: usize = 10_000;

/// How long workers sleep between polls; every sleep is a cancellation point.
pub const POLL_PAUSE: Duration = Duration::from_millis(1);
