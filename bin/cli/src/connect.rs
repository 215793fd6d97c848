// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tributary_flow::extract;
use tributary_store_memory::{MemoryFingerprints, MemoryHub, MemorySink, MemorySource};

use crate::config::{
	DirectoryConnection, DirectoryTopic, DocumentConnection, SearchConnection, TabularConnection,
	TabularTopic,
};
use crate::error::SetupError;

const MEMORY_HOST: &str = "memory";

/// Resolves configured connections to concrete adapters.
///
/// This binary ships the in-process `memory` adapters only; the wire
/// protocol clients for the tabular, directory, document and search systems
/// live outside the engine and plug in through the same core traits. A
/// connection naming any other host is rejected before the pipeline starts.
pub struct Connectors {
	hub: MemoryHub,
}

impl Connectors {
	pub fn new() -> Self {
		Self { hub: MemoryHub::new() }
	}

	pub fn tabular_source(
		&self,
		connection: &TabularConnection,
		channel: &str,
		topic: &TabularTopic,
	) -> Result<MemorySource, SetupError> {
		ensure_memory(&connection.host, format!("tds connection of channel {channel:?}"))?;
		let rows = self.hub.collection(&format!("{channel}.{}.rows", topic.name));
		Ok(MemorySource::new(rows, extract::tabular_time("start_time")))
	}

	pub fn directory_source(
		&self,
		connection: &DirectoryConnection,
		channel: &str,
		topic: &DirectoryTopic,
	) -> Result<MemorySource, SetupError> {
		ensure_memory(&connection.host, format!("ldap connection of channel {channel:?}"))?;
		let entries = self.hub.collection(&format!("{channel}.{}.entries", topic.name));
		Ok(MemorySource::new(entries, extract::directory_time()))
	}

	pub fn document_sink(
		&self,
		connection: &DocumentConnection,
		collection: &str,
	) -> Result<MemorySink, SetupError> {
		ensure_memory(&connection.host, format!("mongo connection for collection {collection:?}"))?;
		Ok(MemorySink::new(self.hub.collection(collection), "_id", "canonical"))
	}

	pub fn document_fingerprints(
		&self,
		connection: &DocumentConnection,
		collection: &str,
	) -> Result<MemoryFingerprints, SetupError> {
		ensure_memory(&connection.host, format!("mongo connection for collection {collection:?}"))?;
		Ok(MemoryFingerprints::new(self.hub.collection(collection)))
	}

	pub fn search_sink(
		&self,
		connection: &SearchConnection,
		type_name: &str,
	) -> Result<MemorySink, SetupError> {
		ensure_memory(&connection.host, format!("elastic connection for type {type_name:?}"))?;
		let index = self.hub.collection(&format!("{}.{type_name}", connection.index));
		Ok(MemorySink::new(index, "_id", "search"))
	}
}

fn ensure_memory(host: &str, what: String) -> Result<(), SetupError> {
	if host == MEMORY_HOST {
		Ok(())
	} else {
		Err(SetupError::UnsupportedHost { host: host.to_string(), what })
	}
}
