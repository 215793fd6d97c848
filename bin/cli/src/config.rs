// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SetupError;

/// The full `configs/config.json` schema.
///
/// Sections are keyed by the upstream protocol; within a section,
/// connections are keyed by channel and then by environment, and channels
/// map to the list of topics replicated over them.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub tds: TabularSection,
	#[serde(default)]
	pub ldap: DirectorySection,
	#[serde(default)]
	pub mongo: DocumentSection,
	#[serde(default)]
	pub elastic: SearchSection,
}

impl Config {
	pub fn from_path(path: impl AsRef<Path>) -> Result<Config, SetupError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path).map_err(|error| SetupError::ReadConfig {
			path: path.display().to_string(),
			reason: error.to_string(),
		})?;
		serde_json::from_str(&raw).map_err(|error| SetupError::ParseConfig { reason: error.to_string() })
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct TabularSection {
	#[serde(default)]
	pub connections: HashMap<String, HashMap<String, TabularConnection>>,
	#[serde(default)]
	pub channels: HashMap<String, Vec<TabularTopic>>,
	#[serde(default)]
	pub settings: Settings,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TabularConnection {
	pub host: String,
	pub user: String,
	pub pass: String,
	pub database: String,
	#[serde(default)]
	pub port: Option<u16>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TabularTopic {
	pub name: String,
	/// The extraction query, stored as lines and concatenated before use.
	#[serde(default)]
	pub script: Vec<String>,
	#[serde(rename = "modelName")]
	pub model_name: String,
	pub model: String,
	#[serde(default, rename = "targetStores")]
	pub target_stores: Vec<String>,
	/// Compensation subtracted from the cursor before it reaches the query.
	#[serde(default, rename = "cursorSkewMs")]
	pub cursor_skew_ms: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
	#[serde(default)]
	pub program: Program,
}

#[derive(Debug, Deserialize)]
pub struct Program {
	#[serde(default = "default_sleep_ms", rename = "sleep ms")]
	pub sleep_ms: u64,
}

impl Default for Program {
	fn default() -> Self {
		Self { sleep_ms: default_sleep_ms() }
	}
}

fn default_sleep_ms() -> u64 {
	60_000
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectorySection {
	#[serde(default)]
	pub connections: HashMap<String, HashMap<String, DirectoryConnection>>,
	#[serde(default)]
	pub channels: HashMap<String, Vec<DirectoryTopic>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DirectoryConnection {
	pub host: String,
	pub port: u16,
	pub user: String,
	pub pass: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DirectoryTopic {
	pub name: String,
	pub node: String,
	pub filter: String,
	#[serde(rename = "idAttribute")]
	pub id_attribute: String,
	#[serde(rename = "timeAttribute")]
	pub time_attribute: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentSection {
	#[serde(default)]
	pub connections: HashMap<String, HashMap<String, DocumentConnection>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentConnection {
	pub host: String,
	pub port: u16,
	pub database: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchSection {
	#[serde(default)]
	pub connections: HashMap<String, HashMap<String, SearchConnection>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchConnection {
	pub host: String,
	pub port: u16,
	pub index: String,
}
