//! Textual dumps of the debug tables, for the disassembler and for tests

use std::fmt::{self, Write};

use crate::cursor::LocationCursor;
use crate::encoding;
use crate::info::DebugInfo;

impl DebugInfo {
    /// Write the filename table as text.
    pub fn disassemble_filenames(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "Debug filename table:")?;
        for (id, name) in self.filename_table().iter().enumerate() {
            writeln!(out, "  {}: {}", id, String::from_utf8_lossy(name))?;
        }
        writeln!(out)
    }

    /// Write the file-region and per-function location tables as text.
    pub fn disassemble_files_and_offsets(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "Debug file table:")?;
        for region in self.file_regions() {
            writeln!(
                out,
                "  Debug offset {}: string id {}",
                region.from_address, region.filename_id
            )?;
        }
        if self.file_regions().is_empty() {
            writeln!(out, "(none)")?;
        }
        writeln!(out)?;

        writeln!(out, "Debug data table:")?;
        let data = self.source_locations_data();
        let mut offset = 0u32;
        while (offset as usize) < data.len() {
            let mut cursor = LocationCursor::new(data, offset);
            write!(out, "  DebugOffset {offset:#x}")?;
            write!(out, " for function at {}", cursor.function_index())?;
            write!(
                out,
                " starts at line={}, col={}",
                cursor.current().line,
                cursor.current().column
            )?;
            write!(out, " and emits locations for ")?;
            let mut count = 0u32;
            while let Some(location) = cursor.next() {
                write!(out, "{} ", location.address)?;
                count += 1;
            }
            writeln!(out, " ({count} in total).")?;
            offset = cursor.offset();
        }
        writeln!(out, "  Debug table ends at debugOffset {offset:#x}")
    }

    /// Write the lexical-scope table as text.
    pub fn disassemble_lexical_data(&self, out: &mut impl Write) -> fmt::Result {
        let data = self.lexical_data();
        let mut offset = 0u32;

        writeln!(out, "Debug variables table:")?;
        while (offset as usize) < data.len() {
            write!(out, "  Offset: {offset:#x}")?;
            let parent_id = decode_int(data, &mut offset);
            let count = decode_int(data, &mut offset);
            write!(out, ", vars count: {count}, lexical parent: ")?;
            if parent_id < 0 {
                write!(out, "none")?;
            } else {
                write!(out, "{parent_id}")?;
            }
            writeln!(out)?;
            for _ in 0..count {
                let start_offset = offset;
                let name =
                    encoding::read_string(data, &mut offset).expect("lexical data is truncated");
                writeln!(out, "    {start_offset:#06x}: \"{}\"", escape(name))?;
            }
        }
        Ok(())
    }
}

fn decode_int(data: &[u8], offset: &mut u32) -> i64 {
    let (value, consumed) =
        encoding::read_signed(data, *offset).expect("lexical data is truncated");
    *offset += consumed;
    value
}

/// Escape a byte string for quoted output: backslash escapes for the quote,
/// the backslash itself and control characters, octal for everything else
/// outside printable ASCII.
fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            0x20..=0x7e => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(b"plain"), "plain");
        assert_eq!(escape(b"a\"b\\c"), "a\\\"b\\\\c");
        assert_eq!(escape(b"tab\there"), "tab\\there");
        assert_eq!(escape(&[0x01]), "\\001");
    }
}
