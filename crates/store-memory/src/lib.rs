// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub use cursor::MemoryCursor;
pub use hub::{Collection, MemoryHub};
pub use query::MemoryFingerprints;
pub use sink::MemorySink;
pub use source::{MemoryCappedSource, MemorySource};

mod cursor;
mod hub;
mod query;
mod sink;
mod source;
