// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::SetupError;

/// Console plus plain-text file logging. The filter honors `TRIBUTARY_LOG`
/// and defaults to `info`.
pub fn init(path: impl AsRef<Path>) -> Result<(), SetupError> {
	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path.as_ref())
		.map_err(|error| SetupError::Logging { reason: error.to_string() })?;
	let writer = FileWriter(Arc::new(Mutex::new(file)));

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_env("TRIBUTARY_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
		.with(fmt::layer().with_target(false))
		.with(fmt::layer().with_target(false).with_ansi(false).with_writer(move || writer.clone()))
		.try_init()
		.map_err(|error| SetupError::Logging { reason: error.to_string() })?;

	Ok(())
}

#[derive(Clone)]
struct FileWriter(Arc<Mutex<File>>);

impl Write for FileWriter {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		match self.0.lock() {
			Ok(mut file) => file.write(buf),
			Err(_) => Err(io::Error::other("log file lock poisoned")),
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self.0.lock() {
			Ok(mut file) => file.flush(),
			Err(_) => Err(io::Error::other("log file lock poisoned")),
		}
	}
}
