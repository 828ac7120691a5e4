//! Single-pass decoder for one function's location stream

use crate::encoding;
use crate::location::SourceLocation;

/// Cursor over one function's delta-encoded location stream.
///
/// Construction decodes the function header; each [`next`](Iterator::next)
/// decodes one record and yields the absolute location. After the terminator
/// the cursor rests on the byte past it, which is the next function's
/// header.
///
/// ```
/// # use stoat_vm_debug::{DebugInfoGenerator, FilenameTable, LocationCursor, SourceLocation};
/// # let mut generator = DebugInfoGenerator::new(FilenameTable::new());
/// # let start = SourceLocation { line: 1, column: 1, ..Default::default() };
/// # let next = SourceLocation { address: 2, line: 1, column: 5, ..Default::default() };
/// # let offset = generator.append_source_locations(&start, 0, &[next]);
/// # let info = generator.serialize();
/// let mut cursor = LocationCursor::new(info.source_locations_data(), offset);
/// while let Some(location) = cursor.next() {
///     println!("{} -> {}:{}", location.address, location.line, location.column);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LocationCursor<'a> {
    data: &'a [u8],
    offset: u32,
    function_index: u32,
    current: SourceLocation,
}

impl<'a> LocationCursor<'a> {
    /// Begin decoding at `offset`, which must point at a function header.
    pub fn new(data: &'a [u8], offset: u32) -> Self {
        let mut cursor = Self {
            data,
            offset,
            function_index: 0,
            current: SourceLocation::default(),
        };
        cursor.function_index = cursor.decode_int() as u32;
        cursor.current.line = cursor.decode_int() as u32;
        cursor.current.column = cursor.decode_int() as u32;
        cursor
    }

    /// Index of the function being decoded
    #[inline]
    pub fn function_index(&self) -> u32 {
        self.function_index
    }

    /// The most recently decoded location
    #[inline]
    pub fn current(&self) -> SourceLocation {
        self.current
    }

    /// Byte position after the most recent decode.
    ///
    /// Between records this is the start of the next record; after the
    /// terminator it is the start of the next function.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    fn decode_int(&mut self) -> i64 {
        let (value, consumed) = encoding::read_signed(self.data, self.offset)
            .expect("debug info stream is truncated");
        self.offset += consumed;
        value
    }
}

impl Iterator for LocationCursor<'_> {
    type Item = SourceLocation;

    fn next(&mut self) -> Option<SourceLocation> {
        let address_delta = self.decode_int();
        if address_delta == -1 {
            return None;
        }
        // The low bit of the line delta records whether a statement delta
        // follows.
        let line_delta = self.decode_int();
        let column_delta = self.decode_int();
        let statement_delta = if line_delta & 1 != 0 {
            self.decode_int()
        } else {
            0
        };
        let line_delta = line_delta >> 1;

        self.current.address = add_delta(self.current.address, address_delta);
        self.current.line = add_delta(self.current.line, line_delta);
        self.current.column = add_delta(self.current.column, column_delta);
        self.current.statement = add_delta(self.current.statement, statement_delta);
        Some(self.current)
    }
}

#[inline]
fn add_delta(base: u32, delta: i64) -> u32 {
    (i64::from(base) + delta) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::append_signed;

    fn header(function_index: i64, line: i64, column: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        append_signed(&mut buf, function_index);
        append_signed(&mut buf, line);
        append_signed(&mut buf, column);
        buf
    }

    #[test]
    fn test_header_decode() {
        let mut buf = header(7, 100, 12);
        append_signed(&mut buf, -1);

        let mut cursor = LocationCursor::new(&buf, 0);
        assert_eq!(cursor.function_index(), 7);
        assert_eq!(cursor.current().address, 0);
        assert_eq!(cursor.current().line, 100);
        assert_eq!(cursor.current().column, 12);
        assert_eq!(cursor.current().statement, 0);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.offset() as usize, buf.len());
    }

    #[test]
    fn test_negative_line_delta_keeps_sign() {
        // line 10 -> 8: the tagged delta is (-2 << 1) = -4 and the
        // arithmetic shift on decode must bring back -2.
        let mut buf = header(0, 10, 1);
        append_signed(&mut buf, 5); // address delta
        append_signed(&mut buf, -4); // tagged line delta, no statement
        append_signed(&mut buf, 0); // column delta
        append_signed(&mut buf, -1);

        let mut cursor = LocationCursor::new(&buf, 0);
        let location = cursor.next().unwrap();
        assert_eq!(location.line, 8);
        assert_eq!(location.statement, 0);
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_statement_presence_bit() {
        let mut buf = header(0, 1, 1);
        // Tagged line delta 1 = (0 << 1) | 1: statement delta follows.
        append_signed(&mut buf, 2);
        append_signed(&mut buf, 1);
        append_signed(&mut buf, 3);
        append_signed(&mut buf, 4); // statement delta
        append_signed(&mut buf, -1);

        let mut cursor = LocationCursor::new(&buf, 0);
        let location = cursor.next().unwrap();
        assert_eq!(location.address, 2);
        assert_eq!(location.line, 1);
        assert_eq!(location.column, 4);
        assert_eq!(location.statement, 4);
    }

    #[test]
    fn test_multibyte_terminator() {
        let mut buf = header(0, 1, 1);
        buf.extend_from_slice(&[0xff, 0x7f]); // -1 encoded in two bytes

        let mut cursor = LocationCursor::new(&buf, 0);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.offset() as usize, buf.len());
    }
}
