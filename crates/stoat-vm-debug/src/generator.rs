//! Write side of the debug-info codec
//!
//! The compiler feeds a [`DebugInfoGenerator`] one function at a time:
//! locations in address order for the sources stream, scope records for the
//! lexical stream. Serializing consumes the generator and produces the
//! immutable [`DebugInfo`].

use tracing::debug;

use crate::encoding;
use crate::filenames::FilenameTable;
use crate::info::DebugInfo;
use crate::location::{FileRegion, SourceLocation};

/// Offset of the shared empty lexical record.
///
/// Every scope with no parent and no variable names points here instead of
/// writing its own record.
pub const EMPTY_LEXICAL_DATA_OFFSET: u32 = 0;

/// Mutable builder for a module's debug information.
///
/// Functions may arrive in any order, but each function's locations must be
/// absolute and sorted by address; the generator computes the deltas.
#[derive(Debug)]
pub struct DebugInfoGenerator {
    sources_data: Vec<u8>,
    lexical_data: Vec<u8>,
    files: Vec<FileRegion>,
    filenames: FilenameTable,
}

impl DebugInfoGenerator {
    /// Create a generator over the given filename table.
    pub fn new(filenames: FilenameTable) -> Self {
        let mut lexical_data = Vec::new();
        debug_assert_eq!(lexical_data.len() as u32, EMPTY_LEXICAL_DATA_OFFSET);
        encoding::append_signed(&mut lexical_data, -1); // parent function
        encoding::append_signed(&mut lexical_data, 0); // name count
        Self {
            sources_data: Vec::new(),
            lexical_data,
            files: Vec::new(),
            filenames,
        }
    }

    /// Append one function's source locations.
    ///
    /// `start` is the location of the function entry and must carry
    /// `statement == 0`; `offsets` are the subsequent locations in address
    /// order. Returns the byte offset of the function's stream in the
    /// sources blob. An empty `offsets` emits nothing and returns the
    /// current size.
    pub fn append_source_locations(
        &mut self,
        start: &SourceLocation,
        function_index: u32,
        offsets: &[SourceLocation],
    ) -> u32 {
        // The function entry is not part of a statement.
        debug_assert_eq!(start.statement, 0, "function must start at statement 0");

        let start_offset = self.sources_data.len() as u32;
        if offsets.is_empty() {
            return start_offset;
        }

        let needs_region = match self.files.last() {
            Some(region) => region.filename_id != start.filename_id,
            None => true,
        };
        if needs_region {
            self.files.push(FileRegion {
                from_address: start_offset,
                filename_id: start.filename_id,
                source_mapping_url_id: start.source_mapping_url_id,
            });
        }

        encoding::append_signed(&mut self.sources_data, i64::from(function_index));
        encoding::append_signed(&mut self.sources_data, i64::from(start.line));
        encoding::append_signed(&mut self.sources_data, i64::from(start.column));

        let mut previous = start;
        for next in offsets {
            if next.filename_id != previous.filename_id {
                // Mid-function filename change. The sourceMappingURL is a
                // per-function property, so the region reuses the id from
                // the function start.
                self.files.push(FileRegion {
                    from_address: self.sources_data.len() as u32,
                    filename_id: next.filename_id,
                    source_mapping_url_id: start.source_mapping_url_id,
                });
            }

            let address_delta = delta32(next.address, previous.address);
            // The line delta carries an extra bit, so it stays at 64 bits.
            let line_delta = i64::from(next.line) - i64::from(previous.line);
            let column_delta = delta32(next.column, previous.column);
            let statement_delta = delta32(next.statement, previous.statement);

            // The statement delta is usually absent; its presence is
            // recorded in the low bit of the line delta rather than in a
            // byte of its own.
            let line_delta = (line_delta << 1) | i64::from(statement_delta != 0);

            encoding::append_signed(&mut self.sources_data, i64::from(address_delta));
            encoding::append_signed(&mut self.sources_data, line_delta);
            encoding::append_signed(&mut self.sources_data, i64::from(column_delta));
            if statement_delta != 0 {
                encoding::append_signed(&mut self.sources_data, i64::from(statement_delta));
            }
            previous = next;
        }
        encoding::append_signed(&mut self.sources_data, -1);

        start_offset
    }

    /// Append one lexical scope: the enclosing function id (if any) and the
    /// variable names visible in the scope.
    ///
    /// Returns the byte offset of the record in the lexical blob. A scope
    /// with no parent and no names shares the canonical record at
    /// [`EMPTY_LEXICAL_DATA_OFFSET`].
    pub fn append_lexical_data<S: AsRef<[u8]>>(
        &mut self,
        parent_function: Option<u32>,
        names: &[S],
    ) -> u32 {
        if parent_function.is_none() && names.is_empty() {
            return EMPTY_LEXICAL_DATA_OFFSET;
        }
        let start_offset = self.lexical_data.len() as u32;
        encoding::append_signed(&mut self.lexical_data, parent_function.map_or(-1, i64::from));
        encoding::append_signed(&mut self.lexical_data, names.len() as i64);
        for name in names {
            encoding::append_string(&mut self.lexical_data, name.as_ref());
        }
        start_offset
    }

    /// Intern a filename for use in subsequent locations.
    #[inline]
    pub fn intern_filename(&mut self, name: &[u8]) -> u32 {
        self.filenames.intern(name)
    }

    /// Finalize the generator into an immutable [`DebugInfo`].
    ///
    /// The lexical blob is appended after the sources blob and the split
    /// offset recorded. Taking `self` by value makes any later append a
    /// compile error.
    pub fn serialize(mut self) -> DebugInfo {
        let lexical_data_offset = self.sources_data.len() as u32;
        debug!(
            sources_len = lexical_data_offset,
            lexical_len = self.lexical_data.len(),
            file_regions = self.files.len(),
            "serializing debug info"
        );
        let mut data = self.sources_data;
        data.append(&mut self.lexical_data);
        DebugInfo::new(data, self.files, self.filenames, lexical_data_offset)
    }
}

/// Difference of two u32 fields, which must fit in 32 signed bits.
#[inline]
fn delta32(next: u32, previous: u32) -> i32 {
    let delta = i64::from(next) - i64::from(previous);
    debug_assert!(
        i32::try_from(delta).is_ok(),
        "delta {delta} does not fit in 32 bits"
    );
    delta as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(address: u32, line: u32, column: u32, statement: u32) -> SourceLocation {
        SourceLocation {
            address,
            line,
            column,
            statement,
            filename_id: 0,
            source_mapping_url_id: 0,
        }
    }

    #[test]
    fn test_empty_offsets_emit_nothing() {
        let mut generator = DebugInfoGenerator::new(FilenameTable::new());
        let offset = generator.append_source_locations(&loc(0, 1, 1, 0), 0, &[]);

        assert_eq!(offset, 0);
        let info = generator.serialize();
        assert!(info.source_locations_data().is_empty());
        assert!(info.file_regions().is_empty());
    }

    #[test]
    fn test_region_added_only_on_filename_change() {
        let mut generator = DebugInfoGenerator::new(FilenameTable::new());
        let first = generator.append_source_locations(&loc(0, 1, 1, 0), 0, &[loc(2, 1, 5, 0)]);
        let second = generator.append_source_locations(&loc(0, 1, 1, 0), 1, &[loc(2, 1, 5, 0)]);

        let info = generator.serialize();
        // Same filename for both functions: one region at the first header.
        assert_eq!(info.file_regions().len(), 1);
        assert_eq!(info.file_regions()[0].from_address, first);
        assert!(second > first);
    }

    #[test]
    fn test_consecutive_returns_are_adjacent() {
        let mut generator = DebugInfoGenerator::new(FilenameTable::new());
        let first = generator.append_source_locations(&loc(0, 1, 1, 0), 0, &[loc(2, 1, 5, 0)]);
        let second = generator.append_source_locations(&loc(0, 9, 1, 0), 1, &[loc(4, 9, 3, 0)]);

        let info = generator.serialize();
        let mut cursor = crate::cursor::LocationCursor::new(info.source_locations_data(), first);
        while cursor.next().is_some() {}
        // After the terminator, the cursor rests on the next header.
        assert_eq!(cursor.offset(), second);
    }

    #[test]
    fn test_empty_scope_is_shared() {
        let mut generator = DebugInfoGenerator::new(FilenameTable::new());
        let names: [&str; 0] = [];
        let a = generator.append_lexical_data(None, &names);
        let b = generator.append_lexical_data(None, &names);

        assert_eq!(a, EMPTY_LEXICAL_DATA_OFFSET);
        assert_eq!(b, EMPTY_LEXICAL_DATA_OFFSET);
    }

    #[test]
    fn test_lexical_record_layout() {
        let mut generator = DebugInfoGenerator::new(FilenameTable::new());
        let offset = generator.append_lexical_data(Some(3), &["x", "y"]);

        // The canonical empty record occupies the first two bytes.
        assert_eq!(offset, 2);
        let info = generator.serialize();
        assert_eq!(
            info.lexical_data(),
            &[0x7f, 0x00, 0x03, 0x02, 0x01, b'x', 0x01, b'y'][..]
        );
    }
}
