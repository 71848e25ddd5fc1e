//! Binary layout of the rule and voice databases.
//!
//! All multi-byte values are host-endian. A database starts with an ASCII
//! magic and the `0x3031` witness; a reader on a host of the other
//! endianness sees `0x3130` and refuses the file.

pub const LANGDB_MAGIC: &[u8; 6] = b"LANGDB";
pub const VOICEDB_MAGIC: &[u8; 7] = b"VOICEDB";
pub const ENDIANNESS_WITNESS: u16 = 0x3031;

pub const TAG_SIZE: u32 = 3;
pub const PSTR_SIZE: u32 = 4;

/// `STR` tag + `u32` offset of the first byte after the pooled strings.
pub const STRING_TABLE_HEADER_SIZE: u32 = TAG_SIZE + 4;

/// magic + witness + locale + phonemeset
pub const LANGDB_HEADER_SIZE: u32 = 6 + 2 + PSTR_SIZE * 2;

/// magic + witness + id, name, synthesizer, author, phonemeset + gender
/// + volume (8.8 fixed) + frequency + channels + sample format
pub const VOICEDB_HEADER_SIZE: u32 = 7 + 2 + PSTR_SIZE * 5 + 1 + 2 + 2 + 1 + PSTR_SIZE;

/// tag + entry count
pub const SECTION_HEADER_SIZE: u32 = TAG_SIZE + 2;
/// tag + entry count + group id
pub const GROUP_SECTION_HEADER_SIZE: u32 = SECTION_HEADER_SIZE + 1;

/// id, polarity, predicate, value
pub const CONDRULE_ENTRY_SIZE: u32 = 3 + PSTR_SIZE;
pub const CLASSDEF_ENTRY_SIZE: u32 = PSTR_SIZE;
/// pattern, replacement
pub const RULE_ENTRY_SIZE: u32 = PSTR_SIZE * 2;
/// word, phonemes
pub const DICTIONARY_ENTRY_SIZE: u32 = PSTR_SIZE * 2;

/// baseline, step, standard deviation (f32 each)
pub const PITCH_ENTRY_SIZE: u32 = 12;
/// phoneme1, phoneme2, condition value, condition mask, mean, sdev
pub const DURATION_ENTRY_SIZE: u32 = 8 * 4 + 2 + 2;
/// name, start offset
pub const UNIT_ENTRY_SIZE: u32 = PSTR_SIZE + 1;
/// phoneme1, phoneme2, first unit, unit count
pub const PHONEME_UNITS_ENTRY_SIZE: u32 = 8 + 8 + 2 + 1;

pub const LOCALE_PREDICATE: u8 = 1;

/// Section tags. Decoding is closed: an unknown tag is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionTag {
    Strings,
    Conditionals,
    ClassDef,
    LetterToPhoneme,
    LexicalRewrite,
    Dictionary,
    Durations,
    Units,
    PhonemeUnits,
    Pitch,
}

impl SectionTag {
    pub const fn bytes(self) -> &'static [u8; 3] {
        match self {
            SectionTag::Strings => b"STR",
            SectionTag::Conditionals => b"CND",
            SectionTag::ClassDef => b"CLS",
            SectionTag::LetterToPhoneme => b"L2P",
            SectionTag::LexicalRewrite => b"LRR",
            SectionTag::Dictionary => b"DIC",
            SectionTag::Durations => b"DUR",
            SectionTag::Units => b"PUT",
            SectionTag::PhonemeUnits => b"PHO",
            SectionTag::Pitch => b"PTC",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionTag::Strings => "STR",
            SectionTag::Conditionals => "CND",
            SectionTag::ClassDef => "CLS",
            SectionTag::LetterToPhoneme => "L2P",
            SectionTag::LexicalRewrite => "LRR",
            SectionTag::Dictionary => "DIC",
            SectionTag::Durations => "DUR",
            SectionTag::Units => "PUT",
            SectionTag::PhonemeUnits => "PHO",
            SectionTag::Pitch => "PTC",
        }
    }

    pub fn from_bytes(tag: [u8; 3]) -> Option<Self> {
        Some(match &tag {
            b"STR" => SectionTag::Strings,
            b"CND" => SectionTag::Conditionals,
            b"CLS" => SectionTag::ClassDef,
            b"L2P" => SectionTag::LetterToPhoneme,
            b"LRR" => SectionTag::LexicalRewrite,
            b"DIC" => SectionTag::Dictionary,
            b"DUR" => SectionTag::Durations,
            b"PUT" => SectionTag::Units,
            b"PHO" => SectionTag::PhonemeUnits,
            b"PTC" => SectionTag::Pitch,
            _ => return None,
        })
    }
}

/// Byte size of a section with `entries` fixed-size entries.
pub fn section_size(header: u32, entries: usize, entry_size: u32) -> u32 {
    header + entries as u32 * entry_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        let all = [
            SectionTag::Strings,
            SectionTag::Conditionals,
            SectionTag::ClassDef,
            SectionTag::LetterToPhoneme,
            SectionTag::LexicalRewrite,
            SectionTag::Dictionary,
            SectionTag::Durations,
            SectionTag::Units,
            SectionTag::PhonemeUnits,
            SectionTag::Pitch,
        ];
        for tag in all {
            assert_eq!(SectionTag::from_bytes(*tag.bytes()), Some(tag));
            assert_eq!(tag.as_str().as_bytes(), tag.bytes());
        }
        assert_eq!(SectionTag::from_bytes(*b"XYZ"), None);
    }

    #[test]
    fn header_sizes() {
        assert_eq!(LANGDB_HEADER_SIZE, 16);
        assert_eq!(VOICEDB_HEADER_SIZE, 39);
    }
}
