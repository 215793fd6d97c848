// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::TimeError;

const UTC_SPACE: &str = "%Y-%m-%d %H:%M:%S";
const UTC_T: &str = "%Y-%m-%dT%H:%M:%S";
const DIRECTORY: &str = "%Y%m%d%H%M%S";

/// Milliseconds since the Unix epoch.
///
/// Every cursor and every record timestamp in the engine is a `Millis`;
/// cursors only ever move forward, so the ordering of this type is what the
/// copy orchestrators enforce between consecutive records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(i64);

impl Millis {
	pub const ZERO: Millis = Millis(0);

	pub const fn new(millis: i64) -> Self {
		Millis(millis)
	}

	pub const fn get(&self) -> i64 {
		self.0
	}

	/// Moves the time backwards by `millis`, clamping at the epoch.
	pub fn rewind(&self, millis: i64) -> Self {
		Millis(self.0.saturating_sub(millis).max(0))
	}
}

impl From<i64> for Millis {
	fn from(millis: i64) -> Self {
		Millis(millis)
	}
}

impl Display for Millis {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// Current wall-clock time.
pub fn now() -> Millis {
	Millis(Utc::now().timestamp_millis())
}

/// Parses `YYYY-MM-DD HH:MM:SS` as UTC; a `T` separator is accepted as well.
pub fn parse_utc(input: &str) -> Result<Millis, TimeError> {
	let format = if input.as_bytes().get(10) == Some(&b'T') { UTC_T } else { UTC_SPACE };
	NaiveDateTime::parse_from_str(input, format)
		.map(|time| Millis(time.and_utc().timestamp_millis()))
		.map_err(|_| TimeError { input: input.to_string() })
}

/// Renders a time as UTC with second precision, no zone suffix.
///
/// Times outside the range chrono can represent fall back to the raw
/// millisecond count so that rendering stays total and deterministic.
pub fn format_utc(time: Millis, t_separator: bool) -> String {
	let format = if t_separator { UTC_T } else { UTC_SPACE };
	match DateTime::<Utc>::from_timestamp_millis(time.get()) {
		Some(time) => time.format(format).to_string(),
		None => time.get().to_string(),
	}
}

/// Parses the directory service generalized time form `YYYYMMDDHHMMSS.0Z`.
pub fn parse_directory_time(input: &str) -> Result<Millis, TimeError> {
	let digits = input.split('.').next().unwrap_or("");
	NaiveDateTime::parse_from_str(digits, DIRECTORY)
		.map(|time| Millis(time.and_utc().timestamp_millis()))
		.map_err(|_| TimeError { input: input.to_string() })
}

/// Renders a time in the directory service generalized time form.
pub fn format_directory_time(time: Millis) -> String {
	match DateTime::<Utc>::from_timestamp_millis(time.get()) {
		Some(time) => format!("{}.0Z", time.format(DIRECTORY)),
		None => time.get().to_string(),
	}
}
