//! Language database loader.
//!
//! Loading walks the section list once, records where each table starts,
//! and checks every pooled-string reference. After that the matchers read
//! rule strings straight out of the shared buffer.

use std::path::Path;
use std::sync::Arc;

use super::error::LoadError;
use super::format::*;
use super::reader::{string_at, utf8, Cursor};

const DATABASE: &str = "language database";

/// Whether a conditional is set when its predicate holds (`@`) or when it
/// does not (`!`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Set,
    Unset,
}

impl Polarity {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'@' => Some(Polarity::Set),
            b'!' => Some(Polarity::Unset),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Polarity::Set => b'@',
            Polarity::Unset => b'!',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub id: u8,
    pub polarity: Polarity,
    /// Locale the predicate compares against.
    pub locale: String,
}

/// One rule group: the entries sharing a first anchor byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleGroup {
    pub id: u8,
    /// Entry count, including the terminating sentinel.
    pub entries: u16,
    offset: u32,
}

#[derive(Debug, Clone, Copy)]
struct Table {
    entries: u16,
    offset: u32,
}

#[derive(Debug)]
pub struct LanguageDatabase {
    data: Arc<[u8]>,
    locale: String,
    phonemeset: String,
    conditionals: Vec<Conditional>,
    /// Classdef table offsets indexed by id; 0 = no such class.
    classdefs: Vec<u32>,
    class_ids: Vec<u8>,
    letter_to_phoneme: Vec<RuleGroup>,
    rewrite: Vec<RuleGroup>,
    dictionary: Vec<Table>,
}

impl LanguageDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Result<Self, LoadError> {
        let data: Arc<[u8]> = data.into();
        let mut c = Cursor::new(&data);
        c.expect_header(LANGDB_MAGIC, DATABASE)?;
        let locale = utf8(c.pstr()?)?;
        let phonemeset = utf8(c.pstr()?)?;

        let mut conditionals = Vec::new();
        let mut classdefs: Vec<u32> = Vec::new();
        let mut class_ids = Vec::new();
        let mut letter_to_phoneme = Vec::new();
        let mut rewrite = Vec::new();
        let mut dictionary = Vec::new();

        while !c.eof() {
            let tag = c.magic()?;
            match tag {
                SectionTag::Strings => {
                    let end = c.u32()? as usize;
                    if end < c.offset() || end > data.len() {
                        return Err(LoadError::UnexpectedEof(c.offset()));
                    }
                    c.seek(end);
                }
                SectionTag::Conditionals => {
                    let entries = c.u16()?;
                    for _ in 0..entries {
                        let at = c.offset();
                        let malformed = LoadError::MalformedEntry {
                            section: tag.as_str(),
                            offset: at,
                        };
                        let id = c.u8()?;
                        let polarity = Polarity::from_byte(c.u8()?);
                        let predicate = c.u8()?;
                        let value = c.pstr()?;
                        let (Some(polarity), LOCALE_PREDICATE) = (polarity, predicate) else {
                            return Err(malformed);
                        };
                        if id == 0 || id == u8::MAX {
                            return Err(malformed);
                        }
                        conditionals.push(Conditional {
                            id,
                            polarity,
                            locale: utf8(value)?,
                        });
                    }
                }
                SectionTag::ClassDef => {
                    let entries = c.u16()?;
                    let id = c.u8()?;
                    let offset = c.offset() as u32;
                    for _ in 0..entries {
                        let member = c.u32()?;
                        if member != 0 {
                            string_at(&data, member)?;
                        }
                    }
                    if classdefs.len() <= id as usize {
                        classdefs.resize(id as usize + 1, 0);
                    }
                    classdefs[id as usize] = offset;
                    class_ids.push(id);
                }
                SectionTag::LetterToPhoneme | SectionTag::LexicalRewrite => {
                    let entries = c.u16()?;
                    let id = c.u8()?;
                    let offset = c.offset() as u32;
                    for _ in 0..entries {
                        c.pstr()?;
                        c.pstr()?;
                    }
                    let group = RuleGroup {
                        id,
                        entries,
                        offset,
                    };
                    if tag == SectionTag::LetterToPhoneme {
                        letter_to_phoneme.push(group);
                    } else {
                        rewrite.push(group);
                    }
                }
                SectionTag::Dictionary => {
                    let entries = c.u16()?;
                    let offset = c.offset() as u32;
                    for _ in 0..entries {
                        c.pstr()?;
                        c.pstr()?;
                    }
                    dictionary.push(Table { entries, offset });
                }
                other => {
                    return Err(LoadError::UnsupportedSection {
                        section: other.as_str(),
                        database: DATABASE,
                    })
                }
            }
            tracing::debug!(section = tag.as_str(), offset = c.offset(), "loaded section");
        }

        Ok(Self {
            data,
            locale,
            phonemeset,
            conditionals,
            classdefs,
            class_ids,
            letter_to_phoneme,
            rewrite,
            dictionary,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn phonemeset(&self) -> &str {
        &self.phonemeset
    }

    pub fn conditionals(&self) -> &[Conditional] {
        &self.conditionals
    }

    pub fn letter_to_phoneme_groups(&self) -> &[RuleGroup] {
        &self.letter_to_phoneme
    }

    pub fn rewrite_groups(&self) -> &[RuleGroup] {
        &self.rewrite
    }

    /// Class ids in the order their tables appear in the file.
    pub fn class_ids(&self) -> &[u8] {
        &self.class_ids
    }

    /// Offset of a classdef table; 0 when the class is not defined.
    pub(crate) fn classdef_offset(&self, id: u8) -> u32 {
        self.classdefs.get(id as usize).copied().unwrap_or(0)
    }

    /// Members of a classdef in declaration order.
    pub fn classdef(&self, id: u8) -> ClassMembers<'_> {
        ClassMembers {
            db: self,
            next: self.classdef_offset(id),
        }
    }

    /// The `(pattern, replacement)` pairs of a group, sentinel excluded.
    pub fn rules(&self, group: &RuleGroup) -> Rules<'_> {
        Rules {
            db: self,
            group: *group,
            index: 0,
        }
    }

    /// Dictionary entries as `(word, phoneme text)` pairs.
    pub fn dictionary(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.dictionary.iter().flat_map(move |table| {
            (0..table.entries as u32).map(move |i| {
                let at = table.offset + i * DICTIONARY_ENTRY_SIZE;
                (self.string(self.u32_at(at)), self.string(self.u32_at(at + 4)))
            })
        })
    }

    pub fn lookup(&self, word: &[u8]) -> Option<&[u8]> {
        self.dictionary()
            .find(|(w, _)| *w == word)
            .map(|(_, phonemes)| phonemes)
    }

    pub(crate) fn rule(&self, group: &RuleGroup, index: u16) -> (&[u8], &[u8]) {
        let at = group.offset + index as u32 * RULE_ENTRY_SIZE;
        (self.string(self.u32_at(at)), self.string(self.u32_at(at + 4)))
    }

    pub(crate) fn u32_at(&self, at: u32) -> u32 {
        let at = at as usize;
        match self.data.get(at..at + 4) {
            Some(b) => u32::from_ne_bytes([b[0], b[1], b[2], b[3]]),
            None => 0,
        }
    }

    /// A pooled string. Offsets were validated at load time.
    pub(crate) fn string(&self, offset: u32) -> &[u8] {
        string_at(&self.data, offset).unwrap_or(&[])
    }
}

pub struct ClassMembers<'a> {
    db: &'a LanguageDatabase,
    next: u32,
}

impl<'a> Iterator for ClassMembers<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.next == 0 {
            return None;
        }
        let member = self.db.u32_at(self.next);
        if member == 0 {
            self.next = 0;
            return None;
        }
        self.next += CLASSDEF_ENTRY_SIZE;
        Some(self.db.string(member))
    }
}

pub struct Rules<'a> {
    db: &'a LanguageDatabase,
    group: RuleGroup,
    index: u16,
}

impl<'a> Iterator for Rules<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.group.entries {
            return None;
        }
        let (pattern, replacement) = self.db.rule(&self.group, self.index);
        if pattern.is_empty() {
            self.index = self.group.entries;
            return None;
        }
        self.index += 1;
        Some((pattern, replacement))
    }
}
