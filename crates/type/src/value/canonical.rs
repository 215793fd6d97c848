// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{self, Write};

use super::{Opaque, Value, ValueMap};
use crate::clock::format_utc;

// Rendering and copying both run on an explicit frame stack: record trees
// come in from foreign systems at arbitrary depth and must not be able to
// overflow the host stack.

impl Value {
	/// The canonical string form.
	///
	/// Scalars render as `(<kind>:"<lexical>")`, maps as `{"k":<value>,…}`
	/// in insertion order, lists as `[<value>,…]`. This rendering is the
	/// single source of truth for equality, hashing and fingerprints.
	pub fn canonical(&self) -> String {
		let mut out = String::new();
		// writing into a String cannot fail
		let _ = write_canonical(self, &mut out);
		out
	}
}

enum Frame<'a> {
	Value(&'a Value),
	Key(&'a str),
	Literal(&'static str),
}

pub(super) fn write_canonical(value: &Value, out: &mut impl Write) -> fmt::Result {
	let mut stack = vec![Frame::Value(value)];

	while let Some(frame) = stack.pop() {
		match frame {
			Frame::Literal(text) => out.write_str(text)?,
			Frame::Key(key) => {
				out.write_char('"')?;
				write_escaped(key, out)?;
				out.write_str("\":")?;
			}
			Frame::Value(value) => match value {
				Value::Null => out.write_str("(null:\"\")")?,
				Value::Bool(true) => out.write_str("(bool:\"true\")")?,
				Value::Bool(false) => out.write_str("(bool:\"false\")")?,
				Value::Int4(value) => write!(out, "(int4:\"{value}\")")?,
				Value::Int8(value) => write!(out, "(int8:\"{value}\")")?,
				Value::Float8(value) => write!(out, "(float8:\"{value}\")")?,
				Value::Text(value) => {
					out.write_str("(text:\"")?;
					write_escaped(value, out)?;
					out.write_str("\")")?;
				}
				Value::Timestamp(value) => {
					write!(out, "(timestamp:\"{}\")", format_utc(*value, true))?
				}
				Value::Opaque(Opaque { tag, data }) => {
					write!(out, "(opaque:\"{tag}:")?;
					write_escaped(data, out)?;
					out.write_str("\")")?;
				}
				Value::List(items) => {
					out.write_char('[')?;
					stack.push(Frame::Literal("]"));
					for item in items.iter().rev() {
						stack.push(Frame::Literal(","));
						stack.push(Frame::Value(item));
					}
				}
				Value::Map(entries) => {
					out.write_char('{')?;
					stack.push(Frame::Literal("}"));
					for (key, item) in entries.iter().rev() {
						stack.push(Frame::Literal(","));
						stack.push(Frame::Value(item));
						stack.push(Frame::Key(key));
					}
				}
			},
		}
	}

	Ok(())
}

fn write_escaped(text: &str, out: &mut impl Write) -> fmt::Result {
	for ch in text.chars() {
		match ch {
			'"' => out.write_str("\\\"")?,
			'\\' => out.write_str("\\\\")?,
			other => out.write_char(other)?,
		}
	}
	Ok(())
}

enum Build<'a> {
	List { rest: std::slice::Iter<'a, Value>, out: Vec<Value> },
	Map { rest: indexmap::map::Iter<'a, String, Value>, key: Option<&'a str>, out: ValueMap },
}

fn deliver(frame: &mut Build<'_>, value: Value) {
	match frame {
		Build::List { out, .. } => out.push(value),
		Build::Map { key, out, .. } => {
			if let Some(key) = key.take() {
				out.insert(key.to_string(), value);
			}
		}
	}
}

fn copy_scalar(value: &Value) -> Option<Value> {
	Some(match value {
		Value::Null => Value::Null,
		Value::Bool(value) => Value::Bool(*value),
		Value::Int4(value) => Value::Int4(*value),
		Value::Int8(value) => Value::Int8(*value),
		Value::Float8(value) => Value::Float8(*value),
		Value::Text(value) => Value::Text(value.clone()),
		Value::Timestamp(value) => Value::Timestamp(*value),
		Value::Opaque(value) => Value::Opaque(value.clone()),
		Value::List(_) | Value::Map(_) => return None,
	})
}

fn open(value: &Value) -> Build<'_> {
	match value {
		Value::List(items) => Build::List { rest: items.iter(), out: Vec::with_capacity(items.len()) },
		Value::Map(entries) => {
			Build::Map { rest: entries.iter(), key: None, out: ValueMap::with_capacity(entries.len()) }
		}
		_ => unreachable!("open() is only called on containers"),
	}
}

impl Clone for Value {
	fn clone(&self) -> Self {
		match copy_scalar(self) {
			Some(value) => return value,
			None => {}
		}

		let mut stack = vec![open(self)];

		while let Some(frame) = stack.last_mut() {
			let child = match frame {
				Build::List { rest, .. } => rest.next(),
				Build::Map { rest, key, .. } => match rest.next() {
					Some((next_key, child)) => {
						*key = Some(next_key.as_str());
						Some(child)
					}
					None => None,
				},
			};

			match child {
				Some(child) => match copy_scalar(child) {
					Some(value) => {
						if let Some(frame) = stack.last_mut() {
							deliver(frame, value);
						}
					}
					None => stack.push(open(child)),
				},
				None => {
					let finished = match stack.pop() {
						Some(Build::List { out, .. }) => Value::List(out),
						Some(Build::Map { out, .. }) => Value::Map(out),
						None => unreachable!("loop guard guarantees a frame"),
					};
					match stack.last_mut() {
						Some(parent) => deliver(parent, finished),
						None => return finished,
					}
				}
			}
		}

		unreachable!("the root frame always returns")
	}
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::super::ValueMap;
	use crate::{Millis, Opaque, Value};

	fn record() -> Value {
		let mut inner = ValueMap::new();
		inner.insert("flag".to_string(), Value::from(true));
		inner.insert("none".to_string(), Value::Null);

		let mut entries = ValueMap::new();
		entries.insert("name".to_string(), Value::from("a\"b\\c"));
		entries.insert("count".to_string(), Value::from(42i32));
		entries.insert("big".to_string(), Value::from(1i64 << 40));
		entries.insert("ratio".to_string(), Value::from(1.5));
		entries.insert("when".to_string(), Value::from(Millis::new(1000)));
		entries.insert("inner".to_string(), Value::Map(inner));
		entries.insert("items".to_string(), Value::List(vec![Value::from(1i32), Value::from("x")]));
		Value::Map(entries)
	}

	#[test]
	fn test_scalar_rendering() {
		assert_eq!(Value::Null.canonical(), "(null:\"\")");
		assert_eq!(Value::from(false).canonical(), "(bool:\"false\")");
		assert_eq!(Value::from(7i32).canonical(), "(int4:\"7\")");
		assert_eq!(Value::from(7i64).canonical(), "(int8:\"7\")");
		assert_eq!(Value::from(2.25).canonical(), "(float8:\"2.25\")");
		assert_eq!(Value::from("hi").canonical(), "(text:\"hi\")");
		assert_eq!(Value::from(Millis::new(1000)).canonical(), "(timestamp:\"1970-01-01T00:00:01\")");
	}

	#[test]
	fn test_opaque_rendering() {
		let tag = Uuid::nil();
		let value = Value::from(Opaque::new(tag, "abc123"));
		assert_eq!(value.canonical(), format!("(opaque:\"{tag}:abc123\")"));
	}

	#[test]
	fn test_container_rendering_preserves_insertion_order() {
		let mut entries = ValueMap::new();
		entries.insert("b".to_string(), Value::from(1i32));
		entries.insert("a".to_string(), Value::from(2i32));
		let value = Value::Map(entries);
		assert_eq!(value.canonical(), "{\"b\":(int4:\"1\"),\"a\":(int4:\"2\"),}");

		let list = Value::List(vec![Value::from(1i32), Value::from(2i32)]);
		assert_eq!(list.canonical(), "[(int4:\"1\"),(int4:\"2\"),]");
	}

	#[test]
	fn test_text_escaping() {
		assert_eq!(Value::from("a\"b\\c").canonical(), "(text:\"a\\\"b\\\\c\")");
	}

	#[test]
	fn test_deep_copy_round_trip() {
		let value = record();
		let copy = value.deep_copy();
		assert_eq!(copy.canonical(), value.canonical());
		assert_eq!(copy, value);
	}

	#[test]
	fn test_deep_copy_is_independent() {
		let value = record();
		let mut copy = value.deep_copy();
		*copy.get_mut("count").unwrap() = Value::from(0i32);
		assert_eq!(value.get("count").unwrap().as_int4(), Ok(42));
		assert_eq!(copy.get("count").unwrap().as_int4(), Ok(0));
	}

	#[test]
	fn test_deeply_nested_values_do_not_overflow() {
		let mut value = Value::from("leaf");
		for _ in 0..100_000 {
			value = Value::List(vec![value]);
		}
		let copy = value.clone();
		let rendered = copy.canonical();
		assert!(rendered.starts_with("[[[["));
		assert!(rendered.ends_with(",],],]"));
		// dropping a deep tree must not recurse either
		drop_flat(value);
		drop_flat(copy);
	}

	// Unwinds a deep list iteratively so the test itself cannot overflow on drop.
	fn drop_flat(value: Value) {
		let mut pending = vec![value];
		while let Some(value) = pending.pop() {
			match value {
				Value::List(items) => pending.extend(items),
				Value::Map(entries) => pending.extend(entries.into_iter().map(|(_, value)| value)),
				_ => {}
			}
		}
	}
}
