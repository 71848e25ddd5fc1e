//! Readers for the entry formats accepted by `dictionary FORMAT ... end`.

use super::ast::DictionaryEntry;
use super::error::CompileError;
use super::parser::Parser;
use super::token::TokenKind;

/// Reads dictionary entries out of a language source until `end`.
pub trait DictionaryReader {
    fn format(&self) -> &'static str;

    /// The next entry, or `None` once the closing `end` is consumed.
    fn read(&mut self, parser: &mut Parser) -> Result<Option<DictionaryEntry>, CompileError>;
}

/// Select a reader by format name.
pub fn dictionary_reader(format: &[u8]) -> Option<Box<dyn DictionaryReader>> {
    match format {
        b"cainteoir" => Some(Box::new(CainteoirDictionary)),
        _ => None,
    }
}

/// `word<TAB>/phonemes/` lines. A `word<TAB>"other words"` line is a
/// say-as entry, which a compiled database cannot express; it is skipped.
pub struct CainteoirDictionary;

impl DictionaryReader for CainteoirDictionary {
    fn format(&self) -> &'static str {
        "cainteoir"
    }

    fn read(&mut self, parser: &mut Parser) -> Result<Option<DictionaryEntry>, CompileError> {
        loop {
            let word = parser.advance().clone();
            match word.kind {
                TokenKind::Text if word.text == b"end" => return Ok(None),
                TokenKind::Text => {}
                TokenKind::Eof => {
                    return Err(CompileError::syntax(
                        "missing 'end' after dictionary",
                        word.line,
                        word.col,
                    ))
                }
                _ => return Err(parser.unexpected(&word)),
            }

            let entry = parser.advance().clone();
            match entry.kind {
                TokenKind::Phonemes => {
                    return Ok(Some(DictionaryEntry {
                        word: word.text,
                        phonemes: entry.text,
                    }))
                }
                TokenKind::Str => {
                    tracing::warn!(
                        word = %word.as_str(),
                        line = word.line,
                        "skipping say-as dictionary entry"
                    );
                }
                _ => return Err(parser.unexpected(&entry)),
            }
        }
    }
}
