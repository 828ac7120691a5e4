//! Source-location data model

use serde::{Deserialize, Serialize};

/// A source position recorded for one bytecode address.
///
/// This is the in-memory form; on the wire, locations are delta-encoded
/// against their predecessor within a function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Byte offset within the owning function's bytecode (0 at entry)
    pub address: u32,
    /// 1-based source line
    pub line: u32,
    /// 1-based source column
    pub column: u32,
    /// Monotonically-assigned statement number; 0 at function entry
    pub statement: u32,
    /// Index into the filename table
    pub filename_id: u32,
    /// Index of the sourceMappingURL active for the owning function
    pub source_mapping_url_id: u32,
}

/// Marks which filename applies from a given byte offset in the sources blob.
///
/// `from_address` is an offset into the debug data, not a bytecode address.
/// The table these live in is append-only and non-decreasing in
/// `from_address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRegion {
    /// Byte offset into the sources blob where this region begins
    pub from_address: u32,
    /// Index into the filename table
    pub filename_id: u32,
    /// Index of the sourceMappingURL for the region's starting function
    pub source_mapping_url_id: u32,
}

/// Result of a reverse lookup from a source position to bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSearchResult {
    /// Index of the function containing the match
    pub function_index: u32,
    /// Bytecode address of the match within that function
    pub address: u32,
    /// Matched 1-based source line
    pub line: u32,
    /// Matched 1-based source column
    pub column: u32,
}
