// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The canonical envelope shape every enricher produces.
//!
//! Sinks, deduplication and later pipeline runs all address records through
//! these field names; they are part of the persisted format.

pub const ID: &str = "_id";
pub const UID: &str = "_uid";
pub const ACTION: &str = "action";
pub const CHANNEL: &str = "channel";
pub const MODEL_NAME: &str = "modelName";
pub const MODEL: &str = "model";
pub const PROCESSED: &str = "processed";
pub const START_TIME: &str = "start_time";
pub const SOURCE: &str = "source";
pub const TARGET_STORES: &str = "targetStores";
pub const DESCRIPTOR: &str = "descriptor";

/// A source field that, when present, overrides the envelope's model name.
pub const FOR_TYPE: &str = "forType";
