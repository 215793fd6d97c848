// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use serde_json::{Value as Json, json};

use super::{Opaque, Value};
use crate::clock::format_utc;

/// Converts parsed JSON into a record value.
///
/// Integral numbers become `Int4` when they fit and `Int8` otherwise,
/// other numbers become `Float8`. Object key order is preserved.
pub fn from_json(json: &Json) -> Value {
	match json {
		Json::Null => Value::Null,
		Json::Bool(value) => Value::Bool(*value),
		Json::Number(number) => match number.as_i64() {
			Some(value) => match i32::try_from(value) {
				Ok(value) => Value::Int4(value),
				Err(_) => Value::Int8(value),
			},
			None => Value::Float8(number.as_f64().unwrap_or(f64::NAN)),
		},
		Json::String(value) => Value::Text(value.clone()),
		Json::Array(items) => Value::List(items.iter().map(from_json).collect()),
		Json::Object(entries) => {
			Value::Map(entries.iter().map(|(key, value)| (key.clone(), from_json(value))).collect())
		}
	}
}

/// Renders a record value as JSON.
///
/// Timestamps render as their canonical UTC string, opaque scalars as a
/// two-field object; non-finite floats have no JSON form and become null.
pub fn to_json(value: &Value) -> Json {
	match value {
		Value::Null => Json::Null,
		Value::Bool(value) => Json::Bool(*value),
		Value::Int4(value) => Json::from(*value),
		Value::Int8(value) => Json::from(*value),
		Value::Float8(value) => serde_json::Number::from_f64(*value).map(Json::Number).unwrap_or(Json::Null),
		Value::Text(value) => Json::String(value.clone()),
		Value::Timestamp(value) => Json::String(format_utc(*value, true)),
		Value::Opaque(Opaque { tag, data }) => json!({ "tag": tag.to_string(), "data": data }),
		Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
		Value::Map(entries) => {
			Json::Object(entries.iter().map(|(key, value)| (key.clone(), to_json(value))).collect())
		}
	}
}
