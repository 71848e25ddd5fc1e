//! Parsed forms of language and voice source files.

use crate::database::{Gender, Polarity};
use crate::phoneme::Phoneme;

/// A language source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageDef {
    pub locale: Vec<u8>,
    pub phonemeset: Vec<u8>,
    pub conditionals: Vec<ConditionalDef>,
    /// In declaration order.
    pub classdefs: Vec<ClassDef>,
    pub rewrite: Vec<RuleDef>,
    pub letter_to_phoneme: Vec<RuleDef>,
    pub dictionary: Vec<DictionaryEntry>,
}

/// `set @name if locale=VALUE`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalDef {
    pub name: Vec<u8>,
    pub id: u8,
    pub polarity: Polarity,
    pub locale: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub id: u8,
    pub members: Vec<Vec<u8>>,
}

/// One rule in stored form.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDef {
    pub group: u8,
    pub pattern: Vec<u8>,
    pub replacement: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntry {
    pub word: Vec<u8>,
    pub phonemes: Vec<u8>,
}

/// A voice source file.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDef {
    pub id: Vec<u8>,
    pub name: Vec<u8>,
    pub synthesizer: Vec<u8>,
    pub author: Vec<u8>,
    pub phonemeset: Vec<u8>,
    pub gender: Gender,
    pub volume_scale: f32,
    pub frequency: u16,
    pub channels: u8,
    pub sample_format: Vec<u8>,
    pub pitch: Option<PitchDef>,
    pub phonemes: Vec<PhonemeDef>,
}

impl Default for VoiceDef {
    fn default() -> Self {
        Self {
            id: Vec::new(),
            name: Vec::new(),
            synthesizer: Vec::new(),
            author: Vec::new(),
            phonemeset: Vec::new(),
            gender: Gender::Unspecified,
            volume_scale: 1.0,
            frequency: 0,
            channels: 0,
            sample_format: Vec::new(),
            pitch: None,
            phonemes: Vec::new(),
        }
    }
}

/// `pitch BASE STEP SDEV`, in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchDef {
    pub base: f32,
    pub step: f32,
    pub sdev: f32,
}

/// A `phoneme /../ ... end` block.
#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeDef {
    pub first: Phoneme,
    /// `UNSPECIFIED` for a single phoneme.
    pub second: Phoneme,
    pub durations: Vec<DurationDef>,
    pub units: Vec<UnitDef>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationDef {
    /// Milliseconds.
    pub mean: u16,
    pub sdev: u16,
    /// `(value, mask)` a phoneme must match for this duration to apply.
    pub condition: (u64, u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    pub name: Vec<u8>,
    /// Percentage into the unit where playback starts.
    pub start: u8,
}
