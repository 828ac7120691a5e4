//! Debug-info errors

use thiserror::Error;

/// Errors that can occur while reading the debug-info wire format.
///
/// These only arise at the wire-primitive layer. The query APIs report
/// absence through `Option`; a blob that fails to decode was corrupted in
/// memory, since the same process encoded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DebugInfoError {
    /// The blob ended in the middle of a LEB128 integer or a string frame
    #[error("unexpected end of debug info at offset {0}")]
    UnexpectedEnd(u32),

    /// A string frame carried a negative or out-of-range length
    #[error("invalid string length {0}")]
    InvalidStringLength(i64),
}

/// Result type for debug-info operations
pub type Result<T> = std::result::Result<T, DebugInfoError>;
