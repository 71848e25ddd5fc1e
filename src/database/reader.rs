//! Cursor over a loaded database buffer.

use super::error::LoadError;
use super::format::SectionTag;

pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn seek(&mut self, offset: usize) {
        self.pos = offset;
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], LoadError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(LoadError::UnexpectedEof(self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, LoadError> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, LoadError> {
        let b = self.bytes(2)?;
        Ok(u16::from_ne_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32, LoadError> {
        let b = self.bytes(4)?;
        Ok(u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u64(&mut self) -> Result<u64, LoadError> {
        let b = self.bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_ne_bytes(raw))
    }

    pub fn f32(&mut self) -> Result<f32, LoadError> {
        Ok(f32::from_bits(self.u32()?))
    }

    pub fn f8_8(&mut self) -> Result<f32, LoadError> {
        let whole = self.u8()? as i8 as f32;
        let frac = self.u8()? as f32 / 256.0;
        Ok(if whole < 0.0 { whole - frac } else { whole + frac })
    }

    /// Read a string reference at the cursor and dereference it.
    pub fn pstr(&mut self) -> Result<&'a [u8], LoadError> {
        let offset = self.u32()?;
        self.pstr_at(offset)
    }

    /// Dereference a pooled string without moving the cursor.
    pub fn pstr_at(&self, offset: u32) -> Result<&'a [u8], LoadError> {
        string_at(self.data, offset)
    }

    /// Read the next section tag, leaving the cursor at its entry count.
    pub fn magic(&mut self) -> Result<SectionTag, LoadError> {
        let b = self.bytes(3)?;
        let tag = [b[0], b[1], b[2]];
        SectionTag::from_bytes(tag).ok_or(LoadError::UnknownSection(tag))
    }

    /// Check a file header: ASCII magic followed by the endianness witness.
    pub fn expect_header(&mut self, magic: &[u8], name: &'static str) -> Result<(), LoadError> {
        match self.bytes(magic.len()) {
            Ok(found) if found == magic => {}
            _ => return Err(LoadError::BadMagic { expected: name }),
        }
        let witness = self.u16()?;
        if witness != super::format::ENDIANNESS_WITNESS {
            return Err(LoadError::ForeignEndianness(witness));
        }
        Ok(())
    }
}

/// The NUL-terminated string starting at `offset`, without its terminator.
pub fn string_at(data: &[u8], offset: u32) -> Result<&[u8], LoadError> {
    let start = offset as usize;
    let tail = data.get(start..).ok_or(LoadError::BadStringOffset(offset))?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(LoadError::BadStringOffset(offset))?;
    Ok(&tail[..len])
}

pub fn utf8(bytes: &[u8]) -> Result<String, LoadError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| LoadError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_advance() {
        let mut data = Vec::new();
        data.push(7u8);
        data.extend_from_slice(&0x1234u16.to_ne_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_ne_bytes());
        data.extend_from_slice(&42u64.to_ne_bytes());
        let mut c = Cursor::new(&data);
        assert_eq!(c.u8().unwrap(), 7);
        assert_eq!(c.u16().unwrap(), 0x1234);
        assert_eq!(c.u32().unwrap(), 0xDEADBEEF);
        assert_eq!(c.u64().unwrap(), 42);
        assert!(c.eof());
        assert!(matches!(c.u8(), Err(LoadError::UnexpectedEof(15))));
    }

    #[test]
    fn pstr_dereferences_without_moving() {
        let mut data = 8u32.to_ne_bytes().to_vec();
        data.extend_from_slice(b"xxxxabc\0");
        let mut c = Cursor::new(&data);
        assert_eq!(c.pstr().unwrap(), b"abc");
        assert_eq!(c.offset(), 4);
        assert_eq!(c.pstr_at(4).unwrap(), b"xxxxabc");
    }

    #[test]
    fn string_offsets_are_checked() {
        let data = b"abc".to_vec();
        assert!(matches!(string_at(&data, 10), Err(LoadError::BadStringOffset(10))));
        // no terminator
        assert!(matches!(string_at(&data, 0), Err(LoadError::BadStringOffset(0))));
    }

    #[test]
    fn unknown_magic_is_fatal() {
        let data = b"XYZ\0\0".to_vec();
        let mut c = Cursor::new(&data);
        assert!(matches!(c.magic(), Err(LoadError::UnknownSection(t)) if &t == b"XYZ"));
    }

    #[test]
    fn header_checks_witness() {
        let mut data = b"LANGDB".to_vec();
        data.extend_from_slice(&0x3130u16.to_ne_bytes());
        let mut c = Cursor::new(&data);
        assert!(matches!(
            c.expect_header(b"LANGDB", "language database"),
            Err(LoadError::ForeignEndianness(0x3130))
        ));

        let mut c = Cursor::new(b"VOICEDB01");
        assert!(matches!(
            c.expect_header(b"LANGDB", "language database"),
            Err(LoadError::BadMagic { .. })
        ));
    }
}
