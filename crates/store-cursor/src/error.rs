// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::PathBuf;

use thiserror::Error;

/// Cursor store failures.
///
/// `NotFound` is only raised by the strict `get`; the defaulting reads used
/// on the hot path never fail on an absent key.
#[derive(Debug, Error)]
pub enum Error {
	#[error("failed to open cursor store at {path}: {reason}")]
	Open { path: PathBuf, reason: String },
	#[error("cursor store transaction failed: {0}")]
	Txn(String),
	#[error("cursor key {0:?} not found")]
	NotFound(String),
}

impl From<Error> for tributary_core::Error {
	fn from(error: Error) -> Self {
		tributary_core::Error::CursorStore(error.to_string())
	}
}
