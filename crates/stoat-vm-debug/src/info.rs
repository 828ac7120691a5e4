//! Read side of the debug-info codec

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cursor::LocationCursor;
use crate::encoding;
use crate::filenames::FilenameTable;
use crate::location::{DebugSearchResult, FileRegion, SourceLocation};
use crate::source_map::{Segment, SourceMapSink};

/// Immutable debug information for a bytecode module.
///
/// Holds one combined blob: every function's source-location stream,
/// followed by the lexical-scope records. All queries borrow from the blob
/// and allocate only their results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugInfo {
    data: Vec<u8>,
    files: Vec<FileRegion>,
    filenames: FilenameTable,
    lexical_data_offset: u32,
}

impl DebugInfo {
    pub(crate) fn new(
        data: Vec<u8>,
        files: Vec<FileRegion>,
        filenames: FilenameTable,
        lexical_data_offset: u32,
    ) -> Self {
        Self {
            data,
            files,
            filenames,
            lexical_data_offset,
        }
    }

    /// The address-ordered file-region table
    #[inline]
    pub fn file_regions(&self) -> &[FileRegion] {
        &self.files
    }

    /// The filename table
    #[inline]
    pub fn filename_table(&self) -> &FilenameTable {
        &self.filenames
    }

    /// Filename bytes for an id
    #[inline]
    pub fn filename(&self, id: u32) -> Option<&[u8]> {
        self.filenames.get(id)
    }

    /// Offset of the split between the sources and lexical views
    #[inline]
    pub fn lexical_data_offset(&self) -> u32 {
        self.lexical_data_offset
    }

    /// The source-location streams of every function
    #[inline]
    pub fn source_locations_data(&self) -> &[u8] {
        &self.data[..self.lexical_data_offset as usize]
    }

    /// The lexical-scope records
    #[inline]
    pub fn lexical_data(&self) -> &[u8] {
        &self.data[self.lexical_data_offset as usize..]
    }

    /// Filename id in effect at a byte offset of the sources blob.
    ///
    /// Returns the last region at or before `debug_offset`, or `None` if no
    /// region precedes it.
    pub fn filename_for_address(&self, debug_offset: u32) -> Option<u32> {
        // Sorted by from_address, so binary search would work; in practice
        // the table holds zero or one entry, so a scan is cheaper.
        let mut found = None;
        for region in &self.files {
            if region.from_address <= debug_offset {
                found = Some(region.filename_id);
            } else {
                break;
            }
        }
        found
    }

    /// The most recent source location at or before `offset_in_function`.
    ///
    /// `debug_offset` is the function's header offset in the sources blob.
    /// The returned location carries `offset_in_function` as its address and
    /// the filename in effect at the matching record, which can differ from
    /// the function's starting filename.
    pub fn location_for_address(
        &self,
        debug_offset: u32,
        offset_in_function: u32,
    ) -> Option<SourceLocation> {
        debug_assert!(
            (debug_offset as usize) < self.data.len(),
            "debug offset out of range"
        );
        let mut cursor = LocationCursor::new(self.source_locations_data(), debug_offset);
        let mut last_location = cursor.current();
        let mut last_location_offset = debug_offset;
        let mut next_location_offset = cursor.offset();
        while let Some(location) = cursor.next() {
            if location.address > offset_in_function {
                break;
            }
            last_location = location;
            last_location_offset = next_location_offset;
            next_location_offset = cursor.offset();
        }
        let filename_id = self.filename_for_address(last_location_offset)?;
        last_location.address = offset_in_function;
        last_location.filename_id = filename_id;
        Some(last_location)
    }

    /// First function/address whose recorded location matches exactly.
    ///
    /// Scans the functions recorded for `filename_id` and returns the first
    /// delta record matching `target_line` (and `target_column` when given).
    /// Function headers are not match candidates.
    pub fn address_for_location(
        &self,
        filename_id: u32,
        target_line: u32,
        target_column: Option<u32>,
    ) -> Option<DebugSearchResult> {
        // Bound the scan to the debug offsets covered by the file.
        let mut start = 0;
        let mut end = 0;
        let mut found_file = false;
        for region in &self.files {
            if found_file {
                end = region.from_address;
                break;
            }
            if region.filename_id == filename_id {
                found_file = true;
                start = region.from_address;
                end = self.lexical_data_offset;
            }
        }
        if !found_file {
            return None;
        }

        let data = self.source_locations_data();
        let mut offset = start;
        while offset < end {
            let mut cursor = LocationCursor::new(data, offset);
            while let Some(location) = cursor.next() {
                if location.line == target_line
                    && target_column.is_none_or(|column| column == location.column)
                {
                    return Some(DebugSearchResult {
                        function_index: cursor.function_index(),
                        address: location.address,
                        line: location.line,
                        column: location.column,
                    });
                }
            }
            offset = cursor.offset();
        }
        None
    }

    /// Variable names of the lexical scope at `offset`.
    ///
    /// `offset` is relative to the lexical view. The returned slices borrow
    /// from the blob.
    pub fn variable_names(&self, offset: u32) -> Vec<&[u8]> {
        let data = self.lexical_data();
        let mut offset = offset;
        let _parent_id = decode_int(data, &mut offset);
        let count = decode_int(data, &mut offset);
        debug_assert!(count >= 0, "invalid variable name count");

        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name =
                encoding::read_string(data, &mut offset).expect("lexical data is truncated");
            names.push(name);
        }
        names
    }

    /// Parent function of the lexical scope at `offset`, if any.
    pub fn parent_function_id(&self, offset: u32) -> Option<u32> {
        let data = self.lexical_data();
        let mut offset = offset;
        let parent_id = decode_int(data, &mut offset);
        if parent_id < 0 {
            return None;
        }
        debug_assert!(parent_id <= i64::from(u32::MAX), "parent id out of bounds");
        Some(parent_id as u32)
    }

    /// Emit one source-map segment per recorded location of the module.
    ///
    /// `function_offsets[i]` is function `i`'s byte offset in the emitted
    /// bytecode; the module is represented as a single generated line keyed
    /// by `cjs_module_offset`, with bytecode addresses as column offsets.
    /// The sink delta-encodes as it consumes, so segments carry absolute
    /// addresses and need not be sorted.
    pub fn populate_source_map<S: SourceMapSink>(
        &self,
        sink: &mut S,
        function_offsets: &[u32],
        cjs_module_offset: u32,
    ) {
        let data = self.source_locations_data();
        let mut segments = Vec::new();
        let mut offset = 0u32;
        while (offset as usize) < data.len() {
            let mut cursor = LocationCursor::new(data, offset);
            let offset_in_file = function_offsets[cursor.function_index() as usize];
            // Every location in the function resolves its filename from the
            // function's header offset, so locations recorded after a
            // mid-function filename change are attributed to the starting
            // file.
            let filename_id = self
                .filename_for_address(offset)
                .expect("function header has no file region");
            let filename = self
                .filename(filename_id)
                .expect("file region names an unknown filename");
            let source_index = sink.source_index(filename);

            let segment_for = |location: SourceLocation| Segment {
                generated_column: location.address + offset_in_file,
                source_index,
                represented_line: location.line,
                represented_column: location.column,
            };

            segments.push(segment_for(cursor.current()));
            while let Some(location) = cursor.next() {
                segments.push(segment_for(location));
            }
            offset = cursor.offset();
        }
        trace!(
            segments = segments.len(),
            cjs_module_offset,
            "populated source-map line"
        );
        sink.add_mappings_line(segments, cjs_module_offset);
    }
}

/// LEB-decode the next int, panicking on truncation: the blob was encoded by
/// this process, so a bad read is a bug, not an input error.
fn decode_int(data: &[u8], offset: &mut u32) -> i64 {
    let (value, consumed) =
        encoding::read_signed(data, *offset).expect("lexical data is truncated");
    *offset += consumed;
    value
}
