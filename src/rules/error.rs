//! Error types for the rule compilers.

use thiserror::Error;

/// An error that aborted a compile. Output written so far is unusable.
#[derive(Debug, Clone, Error)]
#[error("[{line}:{col}] {kind:?}: {message}")]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    SyntaxError,
    SemanticError,
    OutputError,
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::SyntaxError,
        }
    }

    pub fn semantic(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::SemanticError,
        }
    }

    pub fn output(err: std::io::Error) -> Self {
        Self {
            message: err.to_string(),
            line: 0,
            col: 0,
            kind: ErrorKind::OutputError,
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::output(err)
    }
}

/// A recoverable problem reported by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub col: usize,
}
