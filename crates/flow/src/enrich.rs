// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use uuid::Uuid;

use tributary_core::Result;
use tributary_type::{Value, ValueMap, clock};

use crate::envelope;
use crate::pipeline::Transform;

/// Directory attributes whose values are binary blobs; the search index
/// rejects them, so the search-lane enricher blanks them out.
const BINARY_ATTRIBUTES: [&str; 20] = [
	"msExchMailboxGuid",
	"msExchMailboxSecurityDescriptor",
	"objectGUID",
	"objectSid",
	"userParameters",
	"userCertificate",
	"msExchArchiveGUID",
	"msExchBlockedSendersHash",
	"msExchSafeSendersHash",
	"securityProtocol",
	"terminalServer",
	"mSMQDigests",
	"mSMQSignCertificates",
	"msExchSafeRecipientsHash",
	"msExchDisabledArchiveGUID",
	"sIDHistory",
	"replicationSignature",
	"msExchMasterAccountSid",
	"logonHours",
	"thumbnailPhoto",
];

/// Directory attributes with deployment-defined content; their values are
/// pinned to a string interpretation before indexing.
const VARIANT_ATTRIBUTES: [&str; 15] = [
	"extensionAttribute1",
	"extensionAttribute2",
	"extensionAttribute3",
	"extensionAttribute4",
	"extensionAttribute5",
	"extensionAttribute6",
	"extensionAttribute7",
	"extensionAttribute8",
	"extensionAttribute9",
	"extensionAttribute10",
	"extensionAttribute11",
	"extensionAttribute12",
	"extensionAttribute13",
	"extensionAttribute14",
	"extensionAttribute15",
];

const VARIANT_PREFIX: &str = "[string] ";

/// Wraps tabular source rows into the canonical envelope.
///
/// `_id` is a fresh UUID per copy; idempotence across replays comes from
/// deduplication on the source content, not from the envelope identity.
pub struct TabularEnricher {
	channel: String,
	model_name: String,
	model: String,
	action: String,
	target_stores: Vec<String>,
}

impl TabularEnricher {
	pub fn new(
		channel: impl Into<String>,
		model_name: impl Into<String>,
		model: impl Into<String>,
		action: impl Into<String>,
		target_stores: Vec<String>,
	) -> Self {
		Self {
			channel: channel.into(),
			model_name: model_name.into(),
			model: model.into(),
			action: action.into(),
			target_stores,
		}
	}
}

impl Transform for TabularEnricher {
	fn apply(&self, batch: &mut Vec<Value>) -> Result<()> {
		for record in batch.iter_mut() {
			let source = std::mem::replace(record, Value::Null);

			let uid = optional_text(&source, envelope::UID)?;
			let start_time = clock::parse_utc(source.get(envelope::START_TIME)?.as_text()?)?;
			let for_type = match source.as_map()?.get(envelope::FOR_TYPE) {
				Some(value) => Some(value.as_text()?.to_string()),
				None => None,
			};

			let mut entries = ValueMap::new();
			entries.insert(envelope::ID.to_string(), Value::from(Uuid::new_v4().to_string()));
			entries.insert(envelope::UID.to_string(), Value::from(uid));
			entries.insert(envelope::ACTION.to_string(), Value::from(self.action.as_str()));
			entries.insert(envelope::CHANNEL.to_string(), Value::from(self.channel.as_str()));
			match &for_type {
				Some(for_type) => {
					entries.insert(envelope::MODEL_NAME.to_string(), Value::from(for_type.as_str()));
					entries.insert(envelope::MODEL.to_string(), Value::from(strip_separators(for_type)));
				}
				None => {
					entries.insert(envelope::MODEL_NAME.to_string(), Value::from(self.model_name.as_str()));
					entries.insert(envelope::MODEL.to_string(), Value::from(self.model.as_str()));
				}
			}
			entries.insert(envelope::PROCESSED.to_string(), Value::from(0i32));
			entries.insert(envelope::START_TIME.to_string(), Value::from(start_time));
			entries.insert(envelope::SOURCE.to_string(), source);
			if !self.target_stores.is_empty() {
				let stores = self.target_stores.iter().map(|store| Value::from(store.as_str())).collect();
				entries.insert(envelope::TARGET_STORES.to_string(), Value::List(stores));
			}

			*record = Value::Map(entries);
		}
		Ok(())
	}
}

/// Wraps directory entries into the canonical envelope.
///
/// Directory records carry their own stable identity, so `_id` and `_uid`
/// are both the configured id attribute and replays overwrite in place.
pub struct DirectoryEnricher {
	id_attribute: String,
	channel: String,
	model_name: String,
	action: String,
}

impl DirectoryEnricher {
	pub fn new(
		id_attribute: impl Into<String>,
		channel: impl Into<String>,
		model_name: impl Into<String>,
		action: impl Into<String>,
	) -> Self {
		Self {
			id_attribute: id_attribute.into(),
			channel: channel.into(),
			model_name: model_name.into(),
			action: action.into(),
		}
	}
}

impl Transform for DirectoryEnricher {
	fn apply(&self, batch: &mut Vec<Value>) -> Result<()> {
		for record in batch.iter_mut() {
			let source = std::mem::replace(record, Value::Null);
			let id = source.get(&self.id_attribute)?.as_text()?.to_string();

			let mut entries = ValueMap::new();
			entries.insert(envelope::ID.to_string(), Value::from(id.as_str()));
			entries.insert(envelope::UID.to_string(), Value::from(id));
			entries.insert(envelope::ACTION.to_string(), Value::from(self.action.as_str()));
			entries.insert(envelope::CHANNEL.to_string(), Value::from(self.channel.as_str()));
			entries.insert(envelope::MODEL_NAME.to_string(), Value::from(self.model_name.as_str()));
			entries.insert(envelope::PROCESSED.to_string(), Value::from(0i32));
			entries.insert(envelope::START_TIME.to_string(), Value::from(clock::now()));
			entries.insert(envelope::SOURCE.to_string(), source);

			*record = Value::Map(entries);
		}
		Ok(())
	}
}

/// Prepares directory envelopes for the search index: blanks the known
/// binary attributes and pins the variant attributes to strings. Runs after
/// the canonical-store save, immediately before the search-lane save.
pub struct DirectorySearchEnricher;

impl Transform for DirectorySearchEnricher {
	fn apply(&self, batch: &mut Vec<Value>) -> Result<()> {
		for record in batch.iter_mut() {
			let source = record.get_mut(envelope::SOURCE)?.as_map_mut()?;

			for attribute in BINARY_ATTRIBUTES {
				if let Some(value) = source.get_mut(attribute) {
					blank(value);
				}
			}

			for attribute in VARIANT_ATTRIBUTES {
				if let Some(value) = source.get_mut(attribute) {
					prefix(value)?;
				}
			}
		}
		Ok(())
	}
}

/// Wraps document-store records into the canonical envelope, preserving the
/// source `start_time` string untouched.
pub struct DocumentEnricher {
	channel: String,
	model_name: String,
	action: String,
}

impl DocumentEnricher {
	pub fn new(channel: impl Into<String>, model_name: impl Into<String>, action: impl Into<String>) -> Self {
		Self { channel: channel.into(), model_name: model_name.into(), action: action.into() }
	}
}

impl Transform for DocumentEnricher {
	fn apply(&self, batch: &mut Vec<Value>) -> Result<()> {
		for record in batch.iter_mut() {
			let source = std::mem::replace(record, Value::Null);

			let uid = optional_text(&source, envelope::UID)?;
			let start_time = source.get(envelope::START_TIME)?.as_text()?.to_string();

			let mut entries = ValueMap::new();
			entries.insert(envelope::ID.to_string(), Value::from(Uuid::new_v4().to_string()));
			entries.insert(envelope::UID.to_string(), Value::from(uid));
			entries.insert(envelope::ACTION.to_string(), Value::from(self.action.as_str()));
			entries.insert(envelope::CHANNEL.to_string(), Value::from(self.channel.as_str()));
			entries.insert(envelope::MODEL_NAME.to_string(), Value::from(self.model_name.as_str()));
			entries.insert(envelope::PROCESSED.to_string(), Value::from(0i32));
			entries.insert(envelope::START_TIME.to_string(), Value::from(start_time));
			entries.insert(envelope::SOURCE.to_string(), source);

			*record = Value::Map(entries);
		}
		Ok(())
	}
}

fn optional_text(source: &Value, key: &str) -> Result<String> {
	match source.as_map()?.get(key) {
		Some(value) => Ok(value.as_text()?.to_string()),
		None => Ok(String::new()),
	}
}

fn strip_separators(text: &str) -> String {
	text.chars().filter(|ch| !ch.is_ascii_punctuation() && !ch.is_whitespace()).collect()
}

fn blank(value: &mut Value) {
	match value {
		Value::List(items) => {
			for item in items.iter_mut() {
				*item = Value::from("");
			}
		}
		other => *other = Value::from(""),
	}
}

fn prefix(value: &mut Value) -> Result<()> {
	match value {
		Value::List(items) => {
			for item in items.iter_mut() {
				let text = item.as_text()?.to_string();
				*item = Value::from(format!("{VARIANT_PREFIX}{text}"));
			}
		}
		other => {
			let text = other.as_text()?.to_string();
			*other = Value::from(format!("{VARIANT_PREFIX}{text}"));
		}
	}
	Ok(())
}
