// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use thiserror::Error;

/// Everything that can stop the process before the pipeline starts.
///
/// These are the fatal, exit-code-1 conditions; once the runner is sweeping,
/// pipeline failures are logged and retried instead of surfaced here.
#[derive(Debug, Error)]
pub enum SetupError {
	#[error("failed to create directory {path:?}: {reason}")]
	Directory { path: String, reason: String },
	#[error("failed to set up logging: {reason}")]
	Logging { reason: String },
	#[error("failed to read configuration at {path:?}: {reason}")]
	ReadConfig { path: String, reason: String },
	#[error("failed to parse configuration: {reason}")]
	ParseConfig { reason: String },
	#[error("connection {channel:?} has no settings for environment {env:?}")]
	MissingConnection { channel: String, env: String },
	#[error("unsupported host {host:?} for {what}: only \"memory\" connections are built into this binary")]
	UnsupportedHost { host: String, what: String },
	#[error("failed to read the confirmation prompt: {reason}")]
	Prompt { reason: String },
}
