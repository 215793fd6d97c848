// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised by checked access to a [`Value`](crate::Value).
///
/// A kind mismatch or a missing key means the caller misjudged the shape of
/// the records it handles; nothing in the engine retries these.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValueError {
	#[error("kind mismatch: expected {expected}, found {found}")]
	KindMismatch { expected: ValueKind, found: ValueKind },
	#[error("index {index} is out of range for a sequence of length {len}")]
	OutOfRange { index: usize, len: usize },
	#[error("missing key {key:?}")]
	MissingKey { key: String },
}

/// A time string that matches none of the accepted formats.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid time string {input:?}")]
pub struct TimeError {
	pub input: String,
}
