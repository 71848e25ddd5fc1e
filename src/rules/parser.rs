//! Parser for language and voice source files.
//!
//! Turns the lexer's token stream into a [`LanguageDef`] or [`VoiceDef`].
//! Rule patterns are compiled to their stored form here, so every
//! malformed construct is reported against its source position.

use std::collections::HashMap;
use std::str::FromStr;

use super::ast::*;
use super::dictionary::dictionary_reader;
use super::error::CompileError;
use super::pattern::{compile_pattern, is_class_id};
use super::token::{Token, TokenKind};
use crate::database::{Gender, Polarity};
use crate::phoneme::features::parse_spec;
use crate::phoneme::{phonemeset, PhonemeSet};

/// Conditional ids run from 1; this one is never allocated.
const CONDITIONAL_LIMIT: usize = 255;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    phonemes: Option<Box<dyn PhonemeSet>>,
    conditionals: HashMap<Vec<u8>, u8>,
}

#[derive(Clone, Copy, PartialEq)]
enum Block {
    Rewrite,
    Rules,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            phonemes: None,
            conditionals: HashMap::new(),
        }
    }

    pub fn parse_language(&mut self) -> Result<LanguageDef, CompileError> {
        let mut def = LanguageDef::default();

        while !self.is_at_end() {
            let t = self.advance().clone();
            match t.kind {
                TokenKind::Directive => {
                    let body = self.expect(TokenKind::DirectiveBody)?;
                    match t.text.as_slice() {
                        b".locale" => def.locale = body.text,
                        b".phonemeset" => {
                            self.select_phonemeset(&body)?;
                            def.phonemeset = body.text;
                        }
                        _ => return Err(self.unknown_directive(&t)),
                    }
                }
                TokenKind::Text => match t.text.as_slice() {
                    b"classdef" => {
                        let class = self.parse_classdef(&def)?;
                        def.classdefs.push(class);
                    }
                    b"set" => {
                        let conditional = self.parse_set(&t)?;
                        def.conditionals.push(conditional);
                    }
                    b"rewrite" => {
                        let rules = self.parse_rules(Block::Rewrite)?;
                        def.rewrite.extend(rules);
                    }
                    b"rules" => {
                        let rules = self.parse_rules(Block::Rules)?;
                        def.letter_to_phoneme.extend(rules);
                    }
                    b"dictionary" => {
                        let entries = self.parse_dictionary()?;
                        def.dictionary.extend(entries);
                    }
                    _ => return Err(self.unexpected(&t)),
                },
                _ => return Err(self.unexpected(&t)),
            }
        }

        Ok(def)
    }

    pub fn parse_voice(&mut self) -> Result<VoiceDef, CompileError> {
        let mut def = VoiceDef::default();

        while !self.is_at_end() {
            let t = self.advance().clone();
            match t.kind {
                TokenKind::Directive => {
                    let body = self.expect(TokenKind::DirectiveBody)?;
                    match t.text.as_slice() {
                        b".id" => def.id = body.text,
                        b".name" => def.name = body.text,
                        b".synthesizer" => def.synthesizer = body.text,
                        b".voice-author" => def.author = body.text,
                        b".phonemeset" => {
                            self.select_phonemeset(&body)?;
                            def.phonemeset = body.text;
                        }
                        b".gender" => {
                            def.gender = match body.text.as_slice() {
                                b"male" => Gender::Male,
                                b"female" => Gender::Female,
                                _ => {
                                    return Err(CompileError::semantic(
                                        format!("unsupported gender value '{}'", body.as_str()),
                                        body.line,
                                        body.col,
                                    ))
                                }
                            }
                        }
                        b".volume-scale" => def.volume_scale = number(&body, "volume scale")?,
                        b".frequency" => def.frequency = number(&body, "frequency")?,
                        b".channels" => def.channels = number(&body, "channel count")?,
                        b".sample-format" => def.sample_format = body.text,
                        _ => return Err(self.unknown_directive(&t)),
                    }
                }
                TokenKind::Text if t.text == b"pitch" => {
                    def.pitch = Some(PitchDef {
                        base: self.expect_hz()?,
                        step: self.expect_hz()?,
                        sdev: self.expect_hz()?,
                    });
                }
                TokenKind::Text if t.text == b"phoneme" => {
                    if self.phonemes.is_none() {
                        self.phonemes = phonemeset("features");
                        def.phonemeset = b"features".to_vec();
                    }
                    def.phonemes.push(self.parse_phoneme()?);
                }
                _ => return Err(self.unexpected(&t)),
            }
        }

        Ok(def)
    }

    fn select_phonemeset(&mut self, body: &Token) -> Result<(), CompileError> {
        let set = phonemeset(&body.as_str()).ok_or_else(|| {
            CompileError::semantic(
                format!("unknown phoneme set '{}'", body.as_str()),
                body.line,
                body.col,
            )
        })?;
        self.phonemes = Some(set);
        Ok(())
    }

    fn parse_classdef(&mut self, def: &LanguageDef) -> Result<ClassDef, CompileError> {
        let name = self.expect(TokenKind::Text)?;
        let id = match name.text.as_slice() {
            [id] if is_class_id(*id) => *id,
            _ => {
                return Err(CompileError::semantic(
                    format!("classdef id must be one of A-Z, got '{}'", name.as_str()),
                    name.line,
                    name.col,
                ))
            }
        };
        if def.classdefs.iter().any(|c| c.id == id) {
            return Err(CompileError::semantic(
                format!("classdef '{}' is already defined", char::from(id)),
                name.line,
                name.col,
            ));
        }

        let mut members = Vec::new();
        loop {
            let t = self.advance().clone();
            match t.kind {
                TokenKind::Text if t.text == b"end" => break,
                TokenKind::Text | TokenKind::Str if !t.text.is_empty() => members.push(t.text),
                TokenKind::Eof => return Err(self.missing_end("classdef", &t)),
                _ => return Err(self.unexpected(&t)),
            }
        }
        Ok(ClassDef { id, members })
    }

    /// `set @name if locale=VALUE`
    fn parse_set(&mut self, keyword: &Token) -> Result<ConditionalDef, CompileError> {
        let malformed = |t: &Token| {
            CompileError::semantic(
                "malformed conditional: expected 'set @name if locale=VALUE'",
                t.line,
                t.col,
            )
        };

        let flag = self.expect(TokenKind::Text)?;
        let (polarity, name) = match flag.text.split_first() {
            Some((&p, name)) if !name.is_empty() => match Polarity::from_byte(p) {
                Some(polarity) => (polarity, name.to_vec()),
                None => return Err(malformed(&flag)),
            },
            _ => return Err(malformed(&flag)),
        };

        let cond = self.expect(TokenKind::Text)?;
        if cond.text != b"if" {
            return Err(malformed(&cond));
        }
        let predicate = self.expect(TokenKind::Text)?;
        let locale = match predicate.text.strip_prefix(b"locale=") {
            Some(value) if !value.is_empty() => value.to_vec(),
            _ => return Err(malformed(&predicate)),
        };

        let next = self.conditionals.len() + 1;
        let id = match self.conditionals.get(&name) {
            Some(&id) => id,
            None if next < CONDITIONAL_LIMIT => {
                self.conditionals.insert(name.clone(), next as u8);
                next as u8
            }
            None => {
                return Err(CompileError::semantic(
                    "too many conditionals",
                    keyword.line,
                    keyword.col,
                ))
            }
        };

        Ok(ConditionalDef {
            name,
            id,
            polarity,
            locale,
        })
    }

    fn parse_rules(&mut self, block: Block) -> Result<Vec<RuleDef>, CompileError> {
        let (name, replacement_kind) = match block {
            Block::Rewrite => ("rewrite", TokenKind::Str),
            Block::Rules => ("rules", TokenKind::Phonemes),
        };
        let mut rules = Vec::new();

        loop {
            let pattern = self.advance().clone();
            match pattern.kind {
                TokenKind::Text if pattern.text == b"end" => break,
                TokenKind::Text => {}
                TokenKind::Eof => return Err(self.missing_end(name, &pattern)),
                _ => return Err(self.unexpected(&pattern)),
            }

            let mut guard = self.parse_guard()?;
            let replacement = self.expect(replacement_kind)?;
            if guard.is_none() {
                guard = self.parse_guard()?;
            }

            let compiled = compile_pattern(&pattern.text, guard, block == Block::Rules)
                .map_err(|e| CompileError::syntax(e.to_string(), pattern.line, pattern.col))?;
            if block == Block::Rules {
                self.check_phonemes(&replacement)?;
            }

            rules.push(RuleDef {
                group: compiled.group,
                pattern: compiled.bytes,
                replacement: replacement.text,
            });
        }

        Ok(rules)
    }

    /// An optional `@name` / `!name` guard.
    fn parse_guard(&mut self) -> Result<Option<(Polarity, u8)>, CompileError> {
        let t = self.peek();
        if t.kind != TokenKind::Text {
            return Ok(None);
        }
        let Some((polarity, name)) = t
            .text
            .split_first()
            .and_then(|(&p, name)| Some((Polarity::from_byte(p)?, name)))
        else {
            return Ok(None);
        };
        let id = self.conditionals.get(name).copied().ok_or_else(|| {
            CompileError::semantic(
                format!("unknown conditional '{}'", String::from_utf8_lossy(name)),
                t.line,
                t.col,
            )
        })?;
        self.advance();
        Ok(Some((polarity, id)))
    }

    fn parse_dictionary(&mut self) -> Result<Vec<DictionaryEntry>, CompileError> {
        let format = self.expect(TokenKind::Text)?;
        let mut reader = dictionary_reader(&format.text).ok_or_else(|| {
            CompileError::semantic(
                format!("unsupported dictionary format '{}'", format.as_str()),
                format.line,
                format.col,
            )
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.read(self)? {
            if let Some(set) = &self.phonemes {
                set.parse(&entry.phonemes).map_err(|e| {
                    CompileError::semantic(
                        format!("invalid transcription for '{}': {e}", String::from_utf8_lossy(&entry.word)),
                        format.line,
                        format.col,
                    )
                })?;
            }
            entries.push(entry);
        }
        Ok(entries)
    }

    fn parse_phoneme(&mut self) -> Result<PhonemeDef, CompileError> {
        let t = self.expect(TokenKind::Phonemes)?;
        let phonemes = self.check_phonemes(&t)?;
        let (first, second) = match phonemes.as_slice() {
            [first] => (*first, crate::phoneme::Phoneme::UNSPECIFIED),
            [first, second] => (*first, *second),
            _ => {
                return Err(CompileError::semantic(
                    format!("a phoneme entry needs 1 or 2 phonemes, got {}", phonemes.len()),
                    t.line,
                    t.col,
                ))
            }
        };

        let mut durations = Vec::new();
        let mut units = Vec::new();
        loop {
            let t = self.advance().clone();
            match t.kind {
                TokenKind::Text if t.text == b"end" => break,
                TokenKind::Text if t.text == b"duration" => {
                    let mean = self.expect_millis()?;
                    let sdev = self.expect_millis()?;
                    let mut condition = (0, 0);
                    let next = self.peek();
                    if next.kind == TokenKind::Text && next.text.first() == Some(&b'{') {
                        let spec = self.advance().clone();
                        let inner = spec
                            .text
                            .strip_prefix(b"{")
                            .and_then(|s| s.strip_suffix(b"}"))
                            .ok_or_else(|| {
                                CompileError::syntax("unterminated feature condition", spec.line, spec.col)
                            })?;
                        condition = parse_spec(inner).map_err(|e| {
                            CompileError::semantic(e.to_string(), spec.line, spec.col)
                        })?;
                    }
                    durations.push(DurationDef {
                        mean,
                        sdev,
                        condition,
                    });
                }
                TokenKind::Text if t.text == b"unit" => {
                    let name = self.expect(TokenKind::Str)?;
                    let mut start = 0;
                    let next = self.peek();
                    if next.kind == TokenKind::Text
                        && !next.text.is_empty()
                        && next.text.iter().all(u8::is_ascii_digit)
                    {
                        let offset = self.advance().clone();
                        start = number::<u8>(&offset, "unit start offset")?;
                        if start > 100 {
                            return Err(CompileError::semantic(
                                "unit start offset must be a percentage (0-100)",
                                offset.line,
                                offset.col,
                            ));
                        }
                    }
                    units.push(UnitDef {
                        name: name.text,
                        start,
                    });
                }
                TokenKind::Eof => return Err(self.missing_end("phoneme", &t)),
                _ => return Err(self.unexpected(&t)),
            }
        }

        Ok(PhonemeDef {
            first,
            second,
            durations,
            units,
        })
    }

    fn check_phonemes(&self, t: &Token) -> Result<Vec<crate::phoneme::Phoneme>, CompileError> {
        let set = self.phonemes.as_ref().ok_or_else(|| {
            CompileError::semantic("phonemes used before '.phonemeset'", t.line, t.col)
        })?;
        set.parse(&t.text).map_err(|e| {
            CompileError::semantic(
                format!("invalid phonemes /{}/: {e}", t.as_str()),
                t.line,
                t.col,
            )
        })
    }

    fn expect_millis(&mut self) -> Result<u16, CompileError> {
        let t = self.expect(TokenKind::Text)?;
        parse_millis(&t.text).ok_or_else(|| {
            CompileError::semantic(
                format!("invalid duration '{}'", t.as_str()),
                t.line,
                t.col,
            )
        })
    }

    fn expect_hz(&mut self) -> Result<f32, CompileError> {
        let t = self.expect(TokenKind::Text)?;
        let text = t.text.strip_suffix(b"Hz").unwrap_or(&t.text[..]);
        std::str::from_utf8(text)
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .filter(|hz| hz.is_finite())
            .ok_or_else(|| {
                CompileError::semantic(
                    format!("invalid frequency '{}'", t.as_str()),
                    t.line,
                    t.col,
                )
            })
    }

    // --- Utility methods ---

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        let t = self.peek();
        if t.kind == kind {
            Ok(self.advance().clone())
        } else {
            let what = if t.kind == TokenKind::Eof {
                "end of file".to_string()
            } else {
                format!("{:?} '{}'", t.kind, t.as_str())
            };
            Err(CompileError::syntax(
                format!("expected {kind:?}, got {what}"),
                t.line,
                t.col,
            ))
        }
    }

    pub(crate) fn unexpected(&self, t: &Token) -> CompileError {
        CompileError::syntax(
            format!("unexpected {:?} '{}'", t.kind, t.as_str()),
            t.line,
            t.col,
        )
    }

    fn unknown_directive(&self, t: &Token) -> CompileError {
        CompileError::semantic(
            format!("unknown directive '{}'", t.as_str()),
            t.line,
            t.col,
        )
    }

    fn missing_end(&self, block: &str, t: &Token) -> CompileError {
        CompileError::syntax(format!("missing 'end' after {block}"), t.line, t.col)
    }
}

fn number<T: FromStr>(t: &Token, what: &str) -> Result<T, CompileError> {
    std::str::from_utf8(&t.text)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| {
            CompileError::semantic(
                format!("invalid {what} '{}'", t.as_str()),
                t.line,
                t.col,
            )
        })
}

/// `80ms`, `0.08s` or a bare millisecond count.
fn parse_millis(text: &[u8]) -> Option<u16> {
    let (value, scale) = if let Some(ms) = text.strip_suffix(b"ms") {
        (ms, 1.0)
    } else if let Some(s) = text.strip_suffix(b"s") {
        (s, 1000.0)
    } else {
        (text, 1.0)
    };
    let ms = std::str::from_utf8(value).ok()?.parse::<f32>().ok()? * scale;
    (ms.is_finite() && (0.0..=u16::MAX as f32).contains(&ms)).then(|| ms.round() as u16)
}
