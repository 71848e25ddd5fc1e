//! Token types for the rule-file lexer.

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw bytes of the token, delimiters stripped.
    pub text: Vec<u8>,
    pub line: usize,
    pub col: usize,
}

impl Token {
    /// The token bytes, lossily decoded for messages and header fields.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `.name`, including the leading dot.
    Directive,
    /// The value following a directive.
    DirectiveBody,
    /// A bare run of non-blank bytes.
    Text,
    /// The contents of `/.../`.
    Phonemes,
    /// The contents of `"..."`.
    Str,
    Eof,
}
