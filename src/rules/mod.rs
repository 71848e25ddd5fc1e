//! Rule compiler: source text → tokens → definitions → binary database.

pub mod ast;
pub mod compile;
pub mod dictionary;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pattern;
pub mod token;
pub mod voice;

use std::path::Path;

pub use ast::*;
pub use error::{CompileError, Diagnostic, ErrorKind};

use compile::write_language;
use lexer::Lexer;
use parser::Parser;
use voice::write_voice;

/// The rule and voice compiler.
///
/// Compiles into memory; the file variants only write once the whole
/// database has been produced, so a failed compile leaves no output.
pub struct Compiler;

impl Compiler {
    /// Tokenize `source`, logging and returning the lexer's diagnostics.
    pub fn tokenize(source: &[u8]) -> (Vec<token::Token>, Vec<Diagnostic>) {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        (tokens, lexer.diagnostics().to_vec())
    }

    pub fn parse_language(source: &[u8]) -> Result<LanguageDef, CompileError> {
        let (tokens, _) = Self::tokenize(source);
        Parser::new(tokens).parse_language()
    }

    pub fn parse_voice(source: &[u8]) -> Result<VoiceDef, CompileError> {
        let (tokens, _) = Self::tokenize(source);
        Parser::new(tokens).parse_voice()
    }

    pub fn compile_language(source: &[u8]) -> Result<Vec<u8>, CompileError> {
        let def = Self::parse_language(source)?;
        write_language(&def, Vec::new())
    }

    pub fn compile_voice(source: &[u8]) -> Result<Vec<u8>, CompileError> {
        let def = Self::parse_voice(source)?;
        write_voice(&def, Vec::new())
    }

    pub fn compile_language_file(source: &Path, output: &Path) -> Result<(), CompileError> {
        let data = Self::compile_language(&std::fs::read(source)?)?;
        std::fs::write(output, data)?;
        Ok(())
    }

    pub fn compile_voice_file(source: &Path, output: &Path) -> Result<(), CompileError> {
        let data = Self::compile_voice(&std::fs::read(source)?)?;
        std::fs::write(output, data)?;
        Ok(())
    }
}
