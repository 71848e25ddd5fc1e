//! Voice database loader: header metadata, pitch, durations and units.

use std::path::Path;
use std::sync::Arc;

use super::error::LoadError;
use super::format::*;
use super::reader::{utf8, Cursor};
use crate::phoneme::{Phoneme, STRESS};

const DATABASE: &str = "voice database";

/// Stress does not select a different duration or unit entry.
const LOOKUP_MASK: u64 = !STRESS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

impl Gender {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'M' => Some(Gender::Male),
            b'F' => Some(Gender::Female),
            0 => Some(Gender::Unspecified),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Gender::Male => b'M',
            Gender::Female => b'F',
            Gender::Unspecified => 0,
        }
    }
}

/// A pitch target in Hz with its standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    pub hz: f32,
    pub sdev: f32,
}

/// Five-level tone model derived from the voice's baseline and step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchModel {
    pub top: Pitch,
    pub high: Pitch,
    pub mid: Pitch,
    pub low: Pitch,
    pub bottom: Pitch,
}

impl PitchModel {
    pub fn new(base: f32, step: f32, sdev: f32) -> Self {
        let level = |n: f32| Pitch {
            hz: base + n * step,
            sdev,
        };
        Self {
            top: level(4.0),
            high: level(3.0),
            mid: level(2.0),
            low: level(1.0),
            bottom: level(0.0),
        }
    }
}

/// Mean and standard deviation of a phoneme's duration, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub mean: u16,
    pub sdev: u16,
}

#[derive(Debug, Clone, Copy)]
struct DurationEntry {
    first: Phoneme,
    second: Phoneme,
    condition: u64,
    condition_mask: u64,
    duration: Duration,
}

/// A named recording unit and the percentage into it where playback starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub name: String,
    pub start: u8,
}

#[derive(Debug, Clone, Copy)]
struct PhonemeUnits {
    first: Phoneme,
    second: Phoneme,
    unit: u16,
    count: u8,
}

#[derive(Debug)]
pub struct VoiceDatabase {
    id: String,
    name: String,
    synthesizer: String,
    author: String,
    phonemeset: String,
    gender: Gender,
    volume_scale: f32,
    frequency: u16,
    channels: u8,
    sample_format: String,
    pitch: Option<PitchModel>,
    durations: Vec<DurationEntry>,
    units: Vec<Unit>,
    phonemes: Vec<PhonemeUnits>,
}

impl VoiceDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Result<Self, LoadError> {
        let data: Arc<[u8]> = data.into();
        let mut c = Cursor::new(&data);
        c.expect_header(VOICEDB_MAGIC, DATABASE)?;

        let id = utf8(c.pstr()?)?;
        let name = utf8(c.pstr()?)?;
        let synthesizer = utf8(c.pstr()?)?;
        let author = utf8(c.pstr()?)?;
        let phonemeset = utf8(c.pstr()?)?;
        let at = c.offset();
        let gender = Gender::from_byte(c.u8()?).ok_or(LoadError::MalformedEntry {
            section: "VOICEDB",
            offset: at,
        })?;
        let volume_scale = c.f8_8()?;
        let frequency = c.u16()?;
        let channels = c.u8()?;
        let sample_format = utf8(c.pstr()?)?;

        let mut voice = Self {
            id,
            name,
            synthesizer,
            author,
            phonemeset,
            gender,
            volume_scale,
            frequency,
            channels,
            sample_format,
            pitch: None,
            durations: Vec::new(),
            units: Vec::new(),
            phonemes: Vec::new(),
        };

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
                SectionTag::Pitch => {
                    let entries = c.u16()?;
                    for _ in 0..entries {
                        let base = c.f32()?;
                        let step = c.f32()?;
                        let sdev = c.f32()?;
                        voice.pitch = Some(PitchModel::new(base, step, sdev));
                    }
                }
                SectionTag::Durations => {
                    let entries = c.u16()?;
                    for _ in 0..entries {
                        voice.durations.push(DurationEntry {
                            first: Phoneme::new(c.u64()?),
                            second: Phoneme::new(c.u64()?),
                            condition: c.u64()?,
                            condition_mask: c.u64()?,
                            duration: Duration {
                                mean: c.u16()?,
                                sdev: c.u16()?,
                            },
                        });
                    }
                }
                SectionTag::Units => {
                    let entries = c.u16()?;
                    for _ in 0..entries {
                        let name = utf8(c.pstr()?)?;
                        let start = c.u8()?;
                        voice.units.push(Unit { name, start });
                    }
                }
                SectionTag::PhonemeUnits => {
                    let entries = c.u16()?;
                    for _ in 0..entries {
                        voice.phonemes.push(PhonemeUnits {
                            first: Phoneme::new(c.u64()?),
                            second: Phoneme::new(c.u64()?),
                            unit: c.u16()?,
                            count: c.u8()?,
                        });
                    }
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

        // The unit index may precede the units it points into.
        for (i, entry) in voice.phonemes.iter().enumerate() {
            let end = entry.unit as usize + entry.count as usize;
            if end > voice.units.len() {
                return Err(LoadError::MalformedEntry {
                    section: SectionTag::PhonemeUnits.as_str(),
                    offset: i,
                });
            }
        }

        Ok(voice)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn synthesizer(&self) -> &str {
        &self.synthesizer
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn phonemeset(&self) -> &str {
        &self.phonemeset
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn volume_scale(&self) -> f32 {
        self.volume_scale
    }

    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn sample_format(&self) -> &str {
        &self.sample_format
    }

    pub fn pitch(&self) -> Option<PitchModel> {
        self.pitch
    }

    /// Duration of `first` (followed by `second` for a diphone entry).
    ///
    /// The first entry whose phonemes match, ignoring stress, and whose
    /// condition holds on `first` wins.
    pub fn duration(&self, first: Phoneme, second: Phoneme) -> Option<Duration> {
        self.durations
            .iter()
            .find(|d| {
                d.first.matches(first, LOOKUP_MASK)
                    && d.second.matches(second, LOOKUP_MASK)
                    && first.get(d.condition_mask) == d.condition
            })
            .map(|d| d.duration)
    }

    /// The units recorded for a phoneme or phoneme pair.
    pub fn units(&self, first: Phoneme, second: Phoneme) -> &[Unit] {
        self.phonemes
            .iter()
            .find(|p| p.first.matches(first, LOOKUP_MASK) && p.second.matches(second, LOOKUP_MASK))
            .map(|p| {
                let start = p.unit as usize;
                &self.units[start..start + p.count as usize]
            })
            .unwrap_or(&[])
    }
}
