// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tributary_core::{Result, Saver};
use tributary_type::Value;

/// A batch rewrite stage: enrichment, deduplication, any step that reshapes
/// or filters records in place.
pub trait Transform: Send + Sync {
	fn apply(&self, batch: &mut Vec<Value>) -> Result<()>;
}

pub enum Step {
	Transform(Box<dyn Transform>),
	Sink(Box<dyn Saver>),
}

/// The per-topic save composite: an ordered list of transforms and sinks
/// executed over each batch.
///
/// Orderings differ per topic — a tabular topic dedups before both sinks,
/// a directory topic re-enriches between its canonical and search saves —
/// so the composition is data, not code.
pub struct Pipeline {
	steps: Vec<Step>,
}

impl Pipeline {
	pub fn new() -> Self {
		Self { steps: Vec::new() }
	}

	pub fn transform(mut self, transform: impl Transform + 'static) -> Self {
		self.steps.push(Step::Transform(Box::new(transform)));
		self
	}

	pub fn sink(mut self, sink: impl Saver + 'static) -> Self {
		self.steps.push(Step::Sink(Box::new(sink)));
		self
	}

	pub fn run(&self, batch: &mut Vec<Value>) -> Result<()> {
		for step in &self.steps {
			match step {
				Step::Transform(transform) => transform.apply(batch)?,
				Step::Sink(sink) => sink.save(batch)?,
			}
		}
		Ok(())
	}
}

impl Default for Pipeline {
	fn default() -> Self {
		Self::new()
	}
}
