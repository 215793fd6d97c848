// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::thread;
use std::time::Duration;

use tracing::{error, info};

use tributary_core::{Retry, SkewedLoader};
use tributary_flow::{
	Dedup, DirectoryEnricher, DirectorySearchEnricher, Pipeline, TabularEnricher, copy_bulk, copy_chunks,
	extract,
};
use tributary_store_cursor::{CursorStore, TopicCursor};
use tributary_type::Value;

use crate::config::Config;
use crate::connect::Connectors;
use crate::error::SetupError;
use crate::{Env, METADATA_DIRECTORY};

const DESCRIPTOR_ATTRIBUTE: &str = "descriptor";
const SOURCE_ATTRIBUTE: &str = "source";
const DIRECTORY_SWEEP_PAUSE: Duration = Duration::from_secs(1);

/// One configured topic, ready to copy on demand.
pub struct TopicAction {
	pub name: String,
	run: Box<dyn Fn() -> tributary_core::Result<()> + Send + Sync>,
}

/// Builds every configured topic action and sweeps them until the process
/// is stopped: the directory lane on its own thread, the tabular lane on
/// the calling thread with the configured pause between sweeps. Pipeline
/// failures are retried and then logged — they never end the process.
pub fn run(config: &Config, env: Env) -> Result<(), SetupError> {
	let connectors = Connectors::new();
	let tabular = tabular_actions(config, env, &connectors)?;
	let directory = directory_actions(config, env, &connectors)?;

	info!(
		environment = env.as_str(),
		tabular_topics = tabular.len(),
		directory_topics = directory.len(),
		"replication starting"
	);

	if tabular.is_empty() && directory.is_empty() {
		info!("no topics configured, nothing to do");
		return Ok(());
	}

	let pause = Duration::from_millis(config.tds.settings.program.sleep_ms);

	thread::scope(|scope| {
		if !directory.is_empty() {
			scope.spawn(|| sweep_forever("ldap", &directory, DIRECTORY_SWEEP_PAUSE));
		}
		if !tabular.is_empty() {
			sweep_forever("tds", &tabular, pause);
		}
	});

	Ok(())
}

fn sweep_forever(lane: &str, actions: &[TopicAction], pause: Duration) {
	let retry = Retry::default();

	loop {
		for (index, action) in actions.iter().enumerate() {
			info!(lane, action = index + 1, name = action.name.as_str(), "action starting");
			if let Err(error) = retry.run(&action.name, || (action.run)()) {
				error!(lane, name = action.name.as_str(), %error, "action failed after retries");
			}
		}

		info!(lane, pause_millis = pause.as_millis() as u64, "sleeping between sweeps");
		thread::sleep(pause);
	}
}

/// Tabular topics copy in bulk: the upstream queries do not all guarantee
/// time-sorted output, and the bulk pass records the maximum observed time
/// instead of requiring order.
pub fn tabular_actions(
	config: &Config,
	env: Env,
	connectors: &Connectors,
) -> Result<Vec<TopicAction>, SetupError> {
	let mut actions = Vec::new();

	for (channel, topics) in &config.tds.channels {
		let connection = lookup(&config.tds.connections, channel, env)?;

		for topic in topics {
			let document = lookup(&config.mongo.connections, "one", env)?;
			let source =
				SkewedLoader::new(connectors.tabular_source(connection, channel, topic)?, topic.cursor_skew_ms);

			let mut pipeline = Pipeline::new()
				.transform(TabularEnricher::new(
					channel.clone(),
					topic.model_name.clone(),
					topic.model.clone(),
					topic.name.clone(),
					topic.target_stores.clone(),
				))
				.transform(Dedup::new(
					DESCRIPTOR_ATTRIBUTE,
					SOURCE_ATTRIBUTE,
					connectors.document_fingerprints(document, &topic.name)?,
				))
				.sink(connectors.document_sink(document, &topic.name)?);

			if let Some(search) = optional_lookup(&config.elastic.connections, "one", env) {
				pipeline = pipeline.sink(connectors.search_sink(search, &topic.name)?);
			}

			let cursor = topic_cursor(&topic.name);
			let get_time = extract::tabular_time("start_time");

			actions.push(TopicAction {
				name: topic.name.clone(),
				run: Box::new(move || {
					copy_bulk(&source, |batch: &mut Vec<Value>| pipeline.run(batch), &cursor, &get_time)
				}),
			});
		}
	}

	Ok(actions)
}

/// Directory topics stream in chunks: directory modification times are
/// monotone over the search window, so the chunked orchestrator checkpoints
/// batch by batch.
pub fn directory_actions(
	config: &Config,
	env: Env,
	connectors: &Connectors,
) -> Result<Vec<TopicAction>, SetupError> {
	let mut actions = Vec::new();

	for (channel, topics) in &config.ldap.channels {
		let connection = lookup(&config.ldap.connections, channel, env)?;

		for topic in topics {
			let document = lookup(&config.mongo.connections, "one", env)?;
			let source = connectors.directory_source(connection, channel, topic)?;

			let mut pipeline = Pipeline::new()
				.transform(DirectoryEnricher::new(
					topic.id_attribute.clone(),
					channel.clone(),
					"ldap",
					topic.name.clone(),
				))
				.sink(connectors.document_sink(document, &topic.name)?);

			if let Some(search) = optional_lookup(&config.elastic.connections, "one", env) {
				pipeline = pipeline.transform(DirectorySearchEnricher);
				pipeline = pipeline.sink(connectors.search_sink(search, &topic.name)?);
			}

			let cursor = topic_cursor(&topic.name);
			let get_time = extract::directory_time();

			actions.push(TopicAction {
				name: topic.name.clone(),
				run: Box::new(move || {
					copy_chunks(&source, |batch: &mut Vec<Value>| pipeline.run(batch), &cursor, &get_time)
				}),
			});
		}
	}

	Ok(actions)
}

fn topic_cursor(topic: &str) -> TopicCursor {
	let store = CursorStore::open_at(format!("{METADATA_DIRECTORY}/cursors.sqlite"));
	TopicCursor::new(store, topic)
}

fn lookup<'a, C>(
	connections: &'a std::collections::HashMap<String, std::collections::HashMap<String, C>>,
	channel: &str,
	env: Env,
) -> Result<&'a C, SetupError> {
	optional_lookup(connections, channel, env).ok_or_else(|| SetupError::MissingConnection {
		channel: channel.to_string(),
		env: env.as_str().to_string(),
	})
}

fn optional_lookup<'a, C>(
	connections: &'a std::collections::HashMap<String, std::collections::HashMap<String, C>>,
	channel: &str,
	env: Env,
) -> Option<&'a C> {
	connections.get(channel).and_then(|environments| environments.get(env.as_str()))
}
