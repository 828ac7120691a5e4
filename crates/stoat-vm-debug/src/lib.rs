//! # Stoat VM Debug Info
//!
//! This crate stores the mapping from bytecode addresses to source positions
//! for the Stoat JavaScript/TypeScript runtime, together with the lexical
//! variable tables used by the debugger.
//!
//! ## Design Principles
//!
//! - **Compact**: locations are delta-encoded as signed LEB128 streams, a few
//!   bytes per location in the common case
//! - **Sequential**: each function's stream decodes front to back; there is
//!   no random access inside a function
//! - **Immutable**: a [`DebugInfoGenerator`] is consumed by
//!   [`DebugInfoGenerator::serialize`] and the resulting [`DebugInfo`] never
//!   changes, so queries can run from any number of threads
//!
//! ## Layout
//!
//! The serialized artifact is a single blob: the source-location streams of
//! every function, followed by the lexical-scope records. The split point and
//! an address-ordered file-region table are carried alongside the blob.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cursor;
mod disasm;
pub mod encoding;
pub mod error;
pub mod filenames;
pub mod generator;
pub mod info;
pub mod location;
pub mod source_map;

pub use cursor::LocationCursor;
pub use error::{DebugInfoError, Result};
pub use filenames::FilenameTable;
pub use generator::{DebugInfoGenerator, EMPTY_LEXICAL_DATA_OFFSET};
pub use info::DebugInfo;
pub use location::{DebugSearchResult, FileRegion, SourceLocation};
pub use source_map::{Segment, SourceMapSink};
