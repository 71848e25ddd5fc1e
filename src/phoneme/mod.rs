//! Phoneme values: opaque feature bundles with masked access.
//!
//! A [`Phoneme`] packs its articulatory features into a single `u64`.
//! Each feature family occupies a disjoint bit field; a family's mask is
//! used to read, write and compare that family in isolation. Phoneme text
//! is converted to and from these values by a [`PhonemeSet`], selected by
//! name through [`phonemeset`].

pub mod features;
pub mod xsampa;

use thiserror::Error;

pub use features::ExplicitFeatures;
pub use xsampa::XSampa;

// Feature families.
pub const PHONEME_TYPE: u64 = 0x0000_000F;
pub const VOICING: u64 = 0x0000_0030;
pub const PLACE: u64 = 0x0000_0F00;
pub const MANNER: u64 = 0x0000_F000;
pub const HEIGHT: u64 = 0x0007_0000;
pub const BACKNESS: u64 = 0x0030_0000;
pub const ROUNDING: u64 = 0x00C0_0000;
pub const ASPIRATION: u64 = 0x0100_0000;
pub const LENGTH: u64 = 0x0600_0000;
pub const STRESS: u64 = 0x1800_0000;

pub const CONSONANT: u64 = 0x1;
pub const VOWEL: u64 = 0x2;
pub const SYLLABLE_BREAK: u64 = 0x3;

pub const VOICELESS: u64 = 0x10;
pub const VOICED: u64 = 0x20;

pub const BILABIAL: u64 = 0x100;
pub const LABIODENTAL: u64 = 0x200;
pub const DENTAL: u64 = 0x300;
pub const ALVEOLAR: u64 = 0x400;
pub const PALATO_ALVEOLAR: u64 = 0x500;
pub const RETROFLEX: u64 = 0x600;
pub const PALATAL: u64 = 0x700;
pub const VELAR: u64 = 0x800;
pub const UVULAR: u64 = 0x900;
pub const PHARYNGEAL: u64 = 0xA00;
pub const GLOTTAL: u64 = 0xB00;
pub const LABIO_VELAR: u64 = 0xC00;

pub const PLOSIVE: u64 = 0x1000;
pub const NASAL: u64 = 0x2000;
pub const TRILL: u64 = 0x3000;
pub const FLAP: u64 = 0x4000;
pub const FRICATIVE: u64 = 0x5000;
pub const APPROXIMANT: u64 = 0x6000;
pub const LATERAL_APPROXIMANT: u64 = 0x7000;
pub const AFFRICATE: u64 = 0x8000;

pub const HIGH: u64 = 0x1_0000;
pub const SEMI_HIGH: u64 = 0x2_0000;
pub const UPPER_MID: u64 = 0x3_0000;
pub const MID: u64 = 0x4_0000;
pub const LOWER_MID: u64 = 0x5_0000;
pub const SEMI_LOW: u64 = 0x6_0000;
pub const LOW: u64 = 0x7_0000;

pub const FRONT: u64 = 0x10_0000;
pub const CENTRAL: u64 = 0x20_0000;
pub const BACK: u64 = 0x30_0000;

pub const UNROUNDED: u64 = 0x40_0000;
pub const ROUNDED: u64 = 0x80_0000;

pub const ASPIRATED: u64 = 0x100_0000;

pub const HALF_LONG: u64 = 0x200_0000;
pub const LONG: u64 = 0x400_0000;

pub const PRIMARY_STRESS: u64 = 0x0800_0000;
pub const SECONDARY_STRESS: u64 = 0x1000_0000;

/// Feature name → (value, family mask). Ordered by family; the order is
/// also the order features are written in.
pub(crate) const FEATURES: &[(&str, u64, u64)] = &[
    ("con", CONSONANT, PHONEME_TYPE),
    ("vwl", VOWEL, PHONEME_TYPE),
    ("sbr", SYLLABLE_BREAK, PHONEME_TYPE),
    ("vls", VOICELESS, VOICING),
    ("vcd", VOICED, VOICING),
    ("blb", BILABIAL, PLACE),
    ("lbd", LABIODENTAL, PLACE),
    ("dnt", DENTAL, PLACE),
    ("alv", ALVEOLAR, PLACE),
    ("pla", PALATO_ALVEOLAR, PLACE),
    ("rfx", RETROFLEX, PLACE),
    ("pal", PALATAL, PLACE),
    ("vel", VELAR, PLACE),
    ("uvl", UVULAR, PLACE),
    ("phr", PHARYNGEAL, PLACE),
    ("glt", GLOTTAL, PLACE),
    ("lbv", LABIO_VELAR, PLACE),
    ("stp", PLOSIVE, MANNER),
    ("nas", NASAL, MANNER),
    ("trl", TRILL, MANNER),
    ("flp", FLAP, MANNER),
    ("frc", FRICATIVE, MANNER),
    ("apr", APPROXIMANT, MANNER),
    ("lat", LATERAL_APPROXIMANT, MANNER),
    ("afr", AFFRICATE, MANNER),
    ("hgh", HIGH, HEIGHT),
    ("smh", SEMI_HIGH, HEIGHT),
    ("umd", UPPER_MID, HEIGHT),
    ("mid", MID, HEIGHT),
    ("lmd", LOWER_MID, HEIGHT),
    ("sml", SEMI_LOW, HEIGHT),
    ("low", LOW, HEIGHT),
    ("fnt", FRONT, BACKNESS),
    ("cnt", CENTRAL, BACKNESS),
    ("bck", BACK, BACKNESS),
    ("unr", UNROUNDED, ROUNDING),
    ("rnd", ROUNDED, ROUNDING),
    ("asp", ASPIRATED, ASPIRATION),
    ("hlg", HALF_LONG, LENGTH),
    ("lng", LONG, LENGTH),
    ("st1", PRIMARY_STRESS, STRESS),
    ("st2", SECONDARY_STRESS, STRESS),
];

/// Look up a feature by its three-letter name, returning `(value, mask)`.
pub fn feature(name: &str) -> Option<(u64, u64)> {
    FEATURES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, value, mask)| (value, mask))
}

/// Errors produced while reading phoneme text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhonemeError {
    #[error("unknown phoneme symbol at byte {0}")]
    UnknownSymbol(usize),
    #[error("unknown phoneme feature '{0}'")]
    UnknownFeature(String),
    #[error("conflicting phoneme features in '{0}'")]
    ConflictingFeatures(String),
    #[error("unterminated feature group")]
    UnterminatedGroup,
}

/// An opaque phoneme value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phoneme(u64);

impl Phoneme {
    /// The unspecified phoneme (no features set).
    pub const UNSPECIFIED: Phoneme = Phoneme(0);

    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The features selected by `mask`.
    pub const fn get(self, mask: u64) -> u64 {
        self.0 & mask
    }

    /// Replace the features selected by `mask` with `value`.
    pub fn set(&mut self, value: u64, mask: u64) {
        self.0 = (self.0 & !mask) | (value & mask);
    }

    /// Masked equality against another phoneme.
    pub const fn matches(self, other: Phoneme, mask: u64) -> bool {
        self.get(mask) == other.get(mask)
    }

    pub const fn is_unspecified(self) -> bool {
        self.0 == 0
    }
}

/// A transcription scheme that converts phoneme text to values and back.
pub trait PhonemeSet {
    fn name(&self) -> &'static str;

    fn parse(&self, text: &[u8]) -> Result<Vec<Phoneme>, PhonemeError>;

    fn write(&self, phonemes: &[Phoneme]) -> String;
}

/// Select a phoneme set by name.
pub fn phonemeset(name: &str) -> Option<Box<dyn PhonemeSet>> {
    match name {
        "features" => Some(Box::new(ExplicitFeatures)),
        "xsampa" | "x-sampa" => Some(Box::new(XSampa)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_lookup() {
        assert_eq!(feature("vcd"), Some((VOICED, VOICING)));
        assert_eq!(feature("st1"), Some((PRIMARY_STRESS, STRESS)));
        assert_eq!(feature("xyz"), None);
    }

    #[test]
    fn masked_get_and_set() {
        let mut p = Phoneme::new(CONSONANT | VOICELESS | ALVEOLAR | PLOSIVE);
        assert_eq!(p.get(VOICING), VOICELESS);
        p.set(VOICED, VOICING);
        assert_eq!(p.get(VOICING), VOICED);
        assert_eq!(p.get(PLACE), ALVEOLAR);
    }

    #[test]
    fn masked_compare_ignores_other_families() {
        let t = Phoneme::new(CONSONANT | VOICELESS | ALVEOLAR | PLOSIVE);
        let d = Phoneme::new(CONSONANT | VOICED | ALVEOLAR | PLOSIVE);
        assert!(t.matches(d, PLACE | MANNER));
        assert!(!t.matches(d, VOICING));
    }

    #[test]
    fn feature_families_are_disjoint() {
        let masks = [
            PHONEME_TYPE,
            VOICING,
            PLACE,
            MANNER,
            HEIGHT,
            BACKNESS,
            ROUNDING,
            ASPIRATION,
            LENGTH,
            STRESS,
        ];
        for (i, a) in masks.iter().enumerate() {
            for b in &masks[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
        for &(name, value, mask) in FEATURES {
            assert_eq!(value & !mask, 0, "{name} escapes its family");
        }
    }

    #[test]
    fn registry_selects_by_name() {
        assert_eq!(phonemeset("features").map(|s| s.name()), Some("features"));
        assert_eq!(phonemeset("xsampa").map(|s| s.name()), Some("xsampa"));
        assert!(phonemeset("klingon").is_none());
    }
}
