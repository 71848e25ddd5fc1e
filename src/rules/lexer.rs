//! Lexer for rule and voice source files.
//!
//! The notation is line shaped: a directive line (`.locale<TAB>en-GB`), or
//! a run of blank-separated words, phoneme blocks and quoted strings. A
//! token followed by a tab continues the line, and a `.` in that position
//! is ordinary text rather than a directive.
//!
//! Lexing never fails. Problems are recorded as [`Diagnostic`]s, logged,
//! and the lexer resumes on the next line.

use super::error::Diagnostic;
use super::token::{Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    /// After a tab-terminated token: `.` starts text, `#` ends the line.
    continuation: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            col: 1,
            continuation: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            let ch = self.peek();

            if self.continuation {
                match ch {
                    b' ' | b'\t' => {
                        self.advance();
                    }
                    b'\r' | b'\n' | b'#' => self.continuation = false,
                    b'/' => self.lex_phonemes(&mut tokens),
                    b'"' => self.lex_string(TokenKind::Str, &mut tokens),
                    _ => self.lex_text(&mut tokens),
                }
                continue;
            }

            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'#' => self.skip_line(),
                b'.' => self.lex_directive(&mut tokens),
                b'/' => self.lex_phonemes(&mut tokens),
                b'"' => self.lex_string(TokenKind::Str, &mut tokens),
                _ => self.lex_text(&mut tokens),
            }
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            text: Vec::new(),
            line: self.line,
            col: self.col,
        });
        tokens
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn peek(&self) -> u8 {
        self.src[self.pos]
    }

    fn advance(&mut self) -> u8 {
        let ch = self.src[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn at_line_end(&self) -> bool {
        self.is_at_end() || matches!(self.peek(), b'\r' | b'\n')
    }

    fn skip_line(&mut self) {
        while !self.at_line_end() {
            self.advance();
        }
        self.continuation = false;
    }

    fn report(&mut self, message: &str, line: usize, col: usize) {
        tracing::warn!(line, col, "{message}");
        self.diagnostics.push(Diagnostic {
            message: message.to_string(),
            line,
            col,
        });
        self.skip_line();
    }

    fn token(kind: TokenKind, text: &[u8], line: usize, col: usize) -> Token {
        Token {
            kind,
            text: text.to_vec(),
            line,
            col,
        }
    }

    fn lex_directive(&mut self, tokens: &mut Vec<Token>) {
        let line = self.line;
        let col = self.col;
        let start = self.pos;
        while !self.is_at_end() && !matches!(self.peek(), b' ' | b'\t' | b'\r' | b'\n' | b'#') {
            self.advance();
        }
        let name = &self.src[start..self.pos];

        while !self.is_at_end() && matches!(self.peek(), b' ' | b'\t') {
            self.advance();
        }
        if self.at_line_end() || self.peek() == b'#' {
            self.report("missing directive body", line, col);
            return;
        }
        tokens.push(Self::token(TokenKind::Directive, name, line, col));

        if self.peek() == b'"' {
            self.lex_string(TokenKind::DirectiveBody, tokens);
            self.continuation = false;
            return;
        }

        let body_line = self.line;
        let body_col = self.col;
        let start = self.pos;
        while !self.at_line_end() && self.peek() != b'#' {
            self.advance();
        }
        let mut end = self.pos;
        while end > start && matches!(self.src[end - 1], b' ' | b'\t') {
            end -= 1;
        }
        tokens.push(Self::token(
            TokenKind::DirectiveBody,
            &self.src[start..end],
            body_line,
            body_col,
        ));
    }

    fn lex_phonemes(&mut self, tokens: &mut Vec<Token>) {
        let line = self.line;
        let col = self.col;
        self.advance(); // consume opening '/'
        let start = self.pos;
        while !self.is_at_end() && !matches!(self.peek(), b'/' | b'\r' | b'\n' | b'\t' | b'#') {
            self.advance();
        }
        if self.is_at_end() || self.peek() != b'/' {
            self.report(
                "missing end of phoneme block (missing closing '/')",
                line,
                col,
            );
            return;
        }
        tokens.push(Self::token(
            TokenKind::Phonemes,
            &self.src[start..self.pos],
            line,
            col,
        ));
        self.advance(); // consume closing '/'
        self.continuation = true;
    }

    fn lex_string(&mut self, kind: TokenKind, tokens: &mut Vec<Token>) {
        let line = self.line;
        let col = self.col;
        self.advance(); // consume opening '"'
        let start = self.pos;
        while !self.is_at_end() && !matches!(self.peek(), b'"' | b'\r' | b'\n' | b'\t') {
            self.advance();
        }
        if self.is_at_end() || self.peek() != b'"' {
            self.report("missing end of string (missing closing '\"')", line, col);
            return;
        }
        tokens.push(Self::token(kind, &self.src[start..self.pos], line, col));
        self.advance(); // consume closing '"'
        self.continuation = true;
    }

    fn lex_text(&mut self, tokens: &mut Vec<Token>) {
        let line = self.line;
        let col = self.col;
        let start = self.pos;
        while !self.is_at_end() && !matches!(self.peek(), b' ' | b'\t' | b'\r' | b'\n' | b'#') {
            self.advance();
        }
        tokens.push(Self::token(
            TokenKind::Text,
            &self.src[start..self.pos],
            line,
            col,
        ));
        self.continuation = !self.is_at_end() && self.peek() == b'\t';
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut lexer = Lexer::new(src.as_bytes());
        let tokens = lexer.tokenize();
        (tokens, lexer.diagnostics().to_vec())
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_empty_input() {
        let (tokens, diagnostics) = lex("");
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn lex_directive_with_body() {
        let (tokens, _) = lex(".locale\ten-GB  \n");
        assert_eq!(tokens[0].kind, TokenKind::Directive);
        assert_eq!(tokens[0].text, b".locale");
        assert_eq!(tokens[1].kind, TokenKind::DirectiveBody);
        assert_eq!(tokens[1].text, b"en-GB");
        assert_eq!(tokens[2].kind, TokenKind::Eof);
    }

    #[test]
    fn lex_quoted_directive_body() {
        let (tokens, _) = lex(".name\t\"Example Voice\"\n");
        assert_eq!(tokens[1].kind, TokenKind::DirectiveBody);
        assert_eq!(tokens[1].text, b"Example Voice");
    }

    #[test]
    fn lex_directive_body_keeps_inner_spaces() {
        let (tokens, _) = lex(".name Example Voice # comment\n");
        assert_eq!(tokens[1].text, b"Example Voice");
    }

    #[test]
    fn lex_missing_directive_body_is_a_diagnostic() {
        let (tokens, diagnostics) = lex(".locale\nrules\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 1);
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].text, b"rules");
    }

    #[test]
    fn lex_word_and_transcription() {
        let (tokens, _) = lex("the\t/D@/\n");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Text, TokenKind::Phonemes, TokenKind::Eof]
        );
        assert_eq!(tokens[1].text, b"D@");
    }

    #[test]
    fn lex_continuation_dot_is_text() {
        let (tokens, _) = lex("a\t.b\n.c d\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[1].kind, TokenKind::Text);
        assert_eq!(tokens[1].text, b".b");
        assert_eq!(tokens[2].kind, TokenKind::Directive);
        assert_eq!(tokens[3].kind, TokenKind::DirectiveBody);
    }

    #[test]
    fn lex_comments_are_skipped() {
        let (tokens, _) = lex("# heading\nx(y)\t\"z\"\t# trailing\n");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Text, TokenKind::Str, TokenKind::Eof]
        );
        assert_eq!(tokens[0].text, b"x(y)");
        assert_eq!(tokens[1].text, b"z");
    }

    #[test]
    fn lex_unterminated_phonemes_resume_next_line() {
        let (tokens, diagnostics) = lex("t\t/t_h\nend\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 1);
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Text, TokenKind::Text, TokenKind::Eof]
        );
        assert_eq!(tokens[1].text, b"end");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn lex_unterminated_string() {
        let (tokens, diagnostics) = lex("\"abc\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
    }

    #[test]
    fn lex_text_cut_by_end_of_input() {
        let (tokens, _) = lex("end");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].text, b"end");
    }

    #[test]
    fn lex_line_tracking() {
        let (tokens, _) = lex("classdef V a\n  end\n");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[2].col, 12);
        assert_eq!(tokens[3].line, 2);
        assert_eq!(tokens[3].col, 3);
    }
}
