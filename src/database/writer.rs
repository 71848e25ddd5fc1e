//! Append-only binary writer with pooled strings.
//!
//! The writer never seeks. When a section is begun its full byte size is
//! added to a running offset *before* anything is written, so a pooled
//! string referenced from inside the section already knows where it will
//! land: right after the section, in the `STR` block written by
//! [`BinaryWriter::end_section`].

use std::collections::HashMap;
use std::io::{self, Write};

use super::format::{SectionTag, STRING_TABLE_HEADER_SIZE};

pub struct BinaryWriter<W: Write> {
    out: W,
    /// Predicted offset of the next pooled string.
    offset: u32,
    /// Bytes actually written.
    written: u32,
    reserved_strings: bool,
    strings: Vec<Vec<u8>>,
    string_table: HashMap<Vec<u8>, u32>,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            offset: 0,
            written: 0,
            reserved_strings: false,
            strings: Vec::new(),
            string_table: HashMap::new(),
        }
    }

    /// Start a section of `size` bytes (tag included). `size` must be exact.
    pub fn begin_section(&mut self, magic: &[u8], size: u32, has_strings: bool) -> io::Result<()> {
        self.offset = self.advance(self.offset, size)?;
        if has_strings {
            self.offset = self.advance(self.offset, STRING_TABLE_HEADER_SIZE)?;
        }
        self.reserved_strings = has_strings;
        self.bytes(magic)
    }

    /// Flush the strings pooled since the matching `begin_section`.
    pub fn end_section(&mut self) -> io::Result<()> {
        if self.reserved_strings {
            self.bytes(SectionTag::Strings.bytes())?;
            self.u32(self.offset)?;
            let strings = std::mem::take(&mut self.strings);
            for s in &strings {
                self.str(s)?;
            }
            self.string_table.clear();
            self.reserved_strings = false;
        }
        if self.written != self.offset {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "section size mismatch: wrote {} bytes, expected {}",
                    self.written, self.offset
                ),
            ));
        }
        Ok(())
    }

    pub fn u8(&mut self, value: u8) -> io::Result<()> {
        self.bytes(&[value])
    }

    pub fn u16(&mut self, value: u16) -> io::Result<()> {
        self.bytes(&value.to_ne_bytes())
    }

    pub fn u32(&mut self, value: u32) -> io::Result<()> {
        self.bytes(&value.to_ne_bytes())
    }

    pub fn u64(&mut self, value: u64) -> io::Result<()> {
        self.bytes(&value.to_ne_bytes())
    }

    pub fn f32(&mut self, value: f32) -> io::Result<()> {
        self.u32(value.to_bits())
    }

    /// 8.8 fixed point: signed integer part, then 1/256ths.
    pub fn f8_8(&mut self, value: f32) -> io::Result<()> {
        let whole = value.trunc();
        self.u8(whole as i8 as u8)?;
        self.u8((value.fract().abs() * 256.0) as u8)
    }

    /// A NUL-terminated string, inline.
    pub fn str(&mut self, data: &[u8]) -> io::Result<()> {
        self.bytes(data)?;
        self.u8(0)
    }

    /// A reference to a pooled string. Equal strings within one section
    /// share a single copy. Returns the offset that was written.
    pub fn pstr(&mut self, data: &[u8]) -> io::Result<u32> {
        if let Some(&offset) = self.string_table.get(data) {
            self.u32(offset)?;
            return Ok(offset);
        }
        if !self.reserved_strings {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "pooled string written in a section without a string table",
            ));
        }
        let offset = self.offset;
        self.offset = self.advance(self.offset, data.len() as u32 + 1)?;
        self.string_table.insert(data.to_vec(), offset);
        self.strings.push(data.to_vec());
        self.u32(offset)?;
        Ok(offset)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.out.write_all(data)?;
        self.written = self.advance(self.written, data.len() as u32)?;
        Ok(())
    }

    fn advance(&self, offset: u32, by: u32) -> io::Result<u32> {
        offset
            .checked_add(by)
            .ok_or_else(|| io::Error::other("database exceeds the 4 GiB offset range"))
    }
}
