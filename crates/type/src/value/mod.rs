// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub use json::{from_json, to_json};

mod canonical;
mod fingerprint;
mod json;

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::clock::Millis;
use crate::error::ValueError;

/// The insertion-ordered map underlying [`Value::Map`].
///
/// Insertion order is load-bearing: the canonical string form renders map
/// entries in the order they were inserted, and everything downstream
/// (equality, hashing, fingerprints) derives from that rendering.
pub type ValueMap = IndexMap<String, Value>;

/// A tagged foreign scalar the engine carries through without interpreting,
/// e.g. a document database object id. The tag identifies the foreign type,
/// the data is its printable form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Opaque {
	pub tag: Uuid,
	pub data: String,
}

impl Opaque {
	pub fn new(tag: Uuid, data: impl Into<String>) -> Self {
		Self { tag, data: data.into() }
	}
}

/// All possible record value kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// The absent value.
	Null,
	/// A boolean: true or false.
	Bool,
	/// A 4-byte signed integer.
	Int4,
	/// An 8-byte signed integer.
	Int8,
	/// An 8-byte floating point.
	Float8,
	/// A UTF-8 encoded text.
	Text,
	/// Milliseconds since the Unix epoch.
	Timestamp,
	/// A tagged foreign scalar.
	Opaque,
	/// An ordered sequence of values.
	List,
	/// An insertion-ordered string keyed map.
	Map,
}

impl Display for ValueKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ValueKind::Null => f.write_str("null"),
			ValueKind::Bool => f.write_str("bool"),
			ValueKind::Int4 => f.write_str("int4"),
			ValueKind::Int8 => f.write_str("int8"),
			ValueKind::Float8 => f.write_str("float8"),
			ValueKind::Text => f.write_str("text"),
			ValueKind::Timestamp => f.write_str("timestamp"),
			ValueKind::Opaque => f.write_str("opaque"),
			ValueKind::List => f.write_str("list"),
			ValueKind::Map => f.write_str("map"),
		}
	}
}

/// A self-describing record value.
///
/// Records cross the engine as trees of `Value`: sources produce them,
/// enrichers reshape them, sinks persist them. Equality, hashing and the
/// content fingerprint are all defined on the canonical string form, so two
/// structurally equal trees compare equal no matter how they were produced.
#[derive(Debug)]
pub enum Value {
	/// The absent value.
	Null,
	/// A boolean: true or false.
	Bool(bool),
	/// A 4-byte signed integer.
	Int4(i32),
	/// An 8-byte signed integer.
	Int8(i64),
	/// An 8-byte floating point.
	Float8(f64),
	/// A UTF-8 encoded text.
	Text(String),
	/// Milliseconds since the Unix epoch.
	Timestamp(Millis),
	/// A tagged foreign scalar.
	Opaque(Opaque),
	/// An ordered sequence of values.
	List(Vec<Value>),
	/// An insertion-ordered string keyed map.
	Map(ValueMap),
}

impl Value {
	pub fn kind(&self) -> ValueKind {
		match self {
			Value::Null => ValueKind::Null,
			Value::Bool(_) => ValueKind::Bool,
			Value::Int4(_) => ValueKind::Int4,
			Value::Int8(_) => ValueKind::Int8,
			Value::Float8(_) => ValueKind::Float8,
			Value::Text(_) => ValueKind::Text,
			Value::Timestamp(_) => ValueKind::Timestamp,
			Value::Opaque(_) => ValueKind::Opaque,
			Value::List(_) => ValueKind::List,
			Value::Map(_) => ValueKind::Map,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	fn mismatch(&self, expected: ValueKind) -> ValueError {
		ValueError::KindMismatch { expected, found: self.kind() }
	}

	pub fn as_bool(&self) -> Result<bool, ValueError> {
		match self {
			Value::Bool(value) => Ok(*value),
			other => Err(other.mismatch(ValueKind::Bool)),
		}
	}

	pub fn as_int4(&self) -> Result<i32, ValueError> {
		match self {
			Value::Int4(value) => Ok(*value),
			other => Err(other.mismatch(ValueKind::Int4)),
		}
	}

	pub fn as_int8(&self) -> Result<i64, ValueError> {
		match self {
			Value::Int8(value) => Ok(*value),
			other => Err(other.mismatch(ValueKind::Int8)),
		}
	}

	pub fn as_float8(&self) -> Result<f64, ValueError> {
		match self {
			Value::Float8(value) => Ok(*value),
			other => Err(other.mismatch(ValueKind::Float8)),
		}
	}

	pub fn as_text(&self) -> Result<&str, ValueError> {
		match self {
			Value::Text(value) => Ok(value),
			other => Err(other.mismatch(ValueKind::Text)),
		}
	}

	pub fn as_timestamp(&self) -> Result<Millis, ValueError> {
		match self {
			Value::Timestamp(value) => Ok(*value),
			other => Err(other.mismatch(ValueKind::Timestamp)),
		}
	}

	pub fn as_opaque(&self) -> Result<&Opaque, ValueError> {
		match self {
			Value::Opaque(value) => Ok(value),
			other => Err(other.mismatch(ValueKind::Opaque)),
		}
	}

	pub fn as_list(&self) -> Result<&[Value], ValueError> {
		match self {
			Value::List(items) => Ok(items),
			other => Err(other.mismatch(ValueKind::List)),
		}
	}

	pub fn as_list_mut(&mut self) -> Result<&mut Vec<Value>, ValueError> {
		match self {
			Value::List(items) => Ok(items),
			other => Err(other.mismatch(ValueKind::List)),
		}
	}

	pub fn as_map(&self) -> Result<&ValueMap, ValueError> {
		match self {
			Value::Map(entries) => Ok(entries),
			other => Err(other.mismatch(ValueKind::Map)),
		}
	}

	pub fn as_map_mut(&mut self) -> Result<&mut ValueMap, ValueError> {
		match self {
			Value::Map(entries) => Ok(entries),
			other => Err(other.mismatch(ValueKind::Map)),
		}
	}

	pub fn into_text(self) -> Result<String, ValueError> {
		match self {
			Value::Text(value) => Ok(value),
			other => Err(other.mismatch(ValueKind::Text)),
		}
	}

	pub fn into_list(self) -> Result<Vec<Value>, ValueError> {
		match self {
			Value::List(items) => Ok(items),
			other => Err(other.mismatch(ValueKind::List)),
		}
	}

	pub fn into_map(self) -> Result<ValueMap, ValueError> {
		match self {
			Value::Map(entries) => Ok(entries),
			other => Err(other.mismatch(ValueKind::Map)),
		}
	}

	pub fn index(&self, index: usize) -> Result<&Value, ValueError> {
		let items = self.as_list()?;
		items.get(index).ok_or(ValueError::OutOfRange { index, len: items.len() })
	}

	pub fn get(&self, key: &str) -> Result<&Value, ValueError> {
		self.as_map()?.get(key).ok_or_else(|| ValueError::MissingKey { key: key.to_string() })
	}

	pub fn get_mut(&mut self, key: &str) -> Result<&mut Value, ValueError> {
		match self.as_map_mut()?.get_mut(key) {
			Some(value) => Ok(value),
			None => Err(ValueError::MissingKey { key: key.to_string() }),
		}
	}

	/// An explicit alias for [`Clone::clone`]; records are handed between
	/// workers, so copies must be independent subtrees.
	pub fn deep_copy(&self) -> Value {
		self.clone()
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Int4(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int8(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float8(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Text(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Text(value)
	}
}

impl From<Millis> for Value {
	fn from(value: Millis) -> Self {
		Value::Timestamp(value)
	}
}

impl From<Opaque> for Value {
	fn from(value: Opaque) -> Self {
		Value::Opaque(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Value::List(items)
	}
}

impl From<ValueMap> for Value {
	fn from(entries: ValueMap) -> Self {
		Value::Map(entries)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		canonical::write_canonical(self, f)
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		self.canonical() == other.canonical()
	}
}

impl Eq for Value {}

impl Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.canonical().hash(state)
	}
}
