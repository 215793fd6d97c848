// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub use error::Error;
pub use interface::{
	CappedSourceLoader, FingerprintQuery, OnRecord, RecordId, Saver, SkewedLoader, SourceLoader, StreamCursor,
	TimeCursor,
};
pub use retry::{Retry, RetryPolicy};

mod error;
mod interface;
mod retry;
pub mod util;

pub type Result<T> = std::result::Result<T, Error>;
