//! Source-map segment interface
//!
//! The source-map emitter lives outside this crate; debug info only needs to
//! resolve filenames to source indices and append finished mapping lines.

use serde::{Deserialize, Serialize};

/// One generated-to-source mapping within a source-map line.
///
/// Bytecode modules are mapped as a single generated line, with bytecode
/// addresses as column offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Column in the generated output
    pub generated_column: u32,
    /// Index of the source file in the emitter's sources list
    pub source_index: u32,
    /// 1-based line in the original source
    pub represented_line: u32,
    /// 1-based column in the original source
    pub represented_column: u32,
}

/// Sink for source-map segments produced from debug info.
pub trait SourceMapSink {
    /// Resolve a filename to its index in the emitter's sources list.
    fn source_index(&mut self, filename: &[u8]) -> u32;

    /// Append all segments of one bytecode module as a single mappings line.
    ///
    /// Segments arrive in decode order, which is not necessarily sorted by
    /// generated column; the emitter delta-encodes as it consumes them.
    fn add_mappings_line(&mut self, segments: Vec<Segment>, cjs_module_offset: u32);
}
