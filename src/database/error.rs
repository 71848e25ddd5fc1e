//! Errors raised while loading a compiled database.

use std::io;

use thiserror::Error;

/// A database could not be loaded. Callers treat every variant as
/// "format unsupported"; nothing here is retried.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("not a {expected} file")]
    BadMagic { expected: &'static str },

    #[error("incompatible byte order (witness 0x{0:04x})")]
    ForeignEndianness(u16),

    #[error("unknown section '{}'", String::from_utf8_lossy(.0))]
    UnknownSection([u8; 3]),

    #[error("section '{section}' is not supported in a {database} file")]
    UnsupportedSection {
        section: &'static str,
        database: &'static str,
    },

    #[error("malformed {section} entry at offset {offset}")]
    MalformedEntry {
        section: &'static str,
        offset: usize,
    },

    #[error("unexpected end of data at offset {0}")]
    UnexpectedEof(usize),

    #[error("string offset {0} is outside the database")]
    BadStringOffset(u32),

    #[error("invalid UTF-8 in header field")]
    InvalidUtf8,

    #[error("unknown phoneme set '{0}'")]
    UnknownPhonemeSet(String),
}
