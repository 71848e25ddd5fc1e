//! Language database emission.
//!
//! Writes a parsed [`LanguageDef`] as a `LANGDB` file: header, `CND`, one
//! `CLS` per classdef, one `LRR` per rewrite group, one `L2P` per
//! letter-to-phoneme group, then `DIC`.

use std::collections::BTreeMap;
use std::io::Write;

use super::ast::*;
use super::error::CompileError;
use crate::database::format::*;
use crate::database::BinaryWriter;

/// Rules grouped by first anchor byte, in ascending byte order. Rules keep
/// their declared order inside a group.
pub fn group_rules(rules: &[RuleDef]) -> BTreeMap<u8, Vec<&RuleDef>> {
    let mut groups: BTreeMap<u8, Vec<&RuleDef>> = BTreeMap::new();
    for rule in rules {
        groups.entry(rule.group).or_default().push(rule);
    }
    groups
}

/// Write a language database. On error the output is incomplete and must
/// be discarded.
pub fn write_language<W: Write>(def: &LanguageDef, out: W) -> Result<W, CompileError> {
    let mut out = BinaryWriter::new(out);

    out.begin_section(LANGDB_MAGIC, LANGDB_HEADER_SIZE, true)?;
    out.u16(ENDIANNESS_WITNESS)?;
    out.pstr(&def.locale)?;
    out.pstr(&def.phonemeset)?;
    out.end_section()?;

    if !def.conditionals.is_empty() {
        let entries = def.conditionals.len();
        let size = section_size(SECTION_HEADER_SIZE, entries, CONDRULE_ENTRY_SIZE);
        out.begin_section(SectionTag::Conditionals.bytes(), size, true)?;
        out.u16(entry_count(entries, "CND")?)?;
        for cond in &def.conditionals {
            out.u8(cond.id)?;
            out.u8(cond.polarity.byte())?;
            out.u8(LOCALE_PREDICATE)?;
            out.pstr(&cond.locale)?;
        }
        out.end_section()?;
        tracing::debug!(section = "CND", entries, "wrote section");
    }

    for class in &def.classdefs {
        // zero offset terminator
        let entries = class.members.len() + 1;
        let size = section_size(GROUP_SECTION_HEADER_SIZE, entries, CLASSDEF_ENTRY_SIZE);
        out.begin_section(SectionTag::ClassDef.bytes(), size, true)?;
        out.u16(entry_count(entries, "CLS")?)?;
        out.u8(class.id)?;
        for member in &class.members {
            out.pstr(member)?;
        }
        out.u32(0)?;
        out.end_section()?;
        tracing::debug!(section = "CLS", id = %char::from(class.id), entries, "wrote section");
    }

    write_rule_groups(&mut out, SectionTag::LexicalRewrite, &def.rewrite)?;
    write_rule_groups(&mut out, SectionTag::LetterToPhoneme, &def.letter_to_phoneme)?;

    if !def.dictionary.is_empty() {
        let entries = def.dictionary.len();
        let size = section_size(SECTION_HEADER_SIZE, entries, DICTIONARY_ENTRY_SIZE);
        out.begin_section(SectionTag::Dictionary.bytes(), size, true)?;
        out.u16(entry_count(entries, "DIC")?)?;
        for entry in &def.dictionary {
            out.pstr(&entry.word)?;
            out.pstr(&entry.phonemes)?;
        }
        out.end_section()?;
        tracing::debug!(section = "DIC", entries, "wrote section");
    }

    tracing::info!(
        locale = %String::from_utf8_lossy(&def.locale),
        classdefs = def.classdefs.len(),
        conditionals = def.conditionals.len(),
        rewrite_rules = def.rewrite.len(),
        rules = def.letter_to_phoneme.len(),
        dictionary = def.dictionary.len(),
        "compiled language database"
    );
    Ok(out.into_inner())
}

fn write_rule_groups<W: Write>(
    out: &mut BinaryWriter<W>,
    tag: SectionTag,
    rules: &[RuleDef],
) -> Result<(), CompileError> {
    for (group, rules) in group_rules(rules) {
        // empty pattern/replacement sentinel
        let entries = rules.len() + 1;
        let size = section_size(GROUP_SECTION_HEADER_SIZE, entries, RULE_ENTRY_SIZE);
        out.begin_section(tag.bytes(), size, true)?;
        out.u16(entry_count(entries, tag.as_str())?)?;
        out.u8(group)?;
        for rule in rules {
            out.pstr(&rule.pattern)?;
            out.pstr(&rule.replacement)?;
        }
        out.pstr(b"")?;
        out.pstr(b"")?;
        out.end_section()?;
        tracing::debug!(section = tag.as_str(), group, entries, "wrote section");
    }
    Ok(())
}

pub(crate) fn entry_count(entries: usize, section: &str) -> Result<u16, CompileError> {
    u16::try_from(entries).map_err(|_| {
        CompileError::semantic(format!("too many entries in a {section} section"), 0, 0)
    })
}
