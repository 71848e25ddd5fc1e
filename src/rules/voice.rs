//! Voice database emission.

use std::io::Write;

use super::ast::VoiceDef;
use super::compile::entry_count;
use super::error::CompileError;
use crate::database::format::*;
use crate::database::BinaryWriter;

/// Write a voice database: header, then `PTC`, `DUR` and `PUT` when the
/// voice defines them, then the `PHO` index into `PUT`.
pub fn write_voice<W: Write>(def: &VoiceDef, out: W) -> Result<W, CompileError> {
    let mut out = BinaryWriter::new(out);

    out.begin_section(VOICEDB_MAGIC, VOICEDB_HEADER_SIZE, true)?;
    out.u16(ENDIANNESS_WITNESS)?;
    out.pstr(&def.id)?;
    out.pstr(&def.name)?;
    out.pstr(&def.synthesizer)?;
    out.pstr(&def.author)?;
    out.pstr(&def.phonemeset)?;
    out.u8(def.gender.byte())?;
    out.f8_8(def.volume_scale)?;
    out.u16(def.frequency)?;
    out.u8(def.channels)?;
    out.pstr(&def.sample_format)?;
    out.end_section()?;

    if let Some(pitch) = def.pitch {
        let size = section_size(SECTION_HEADER_SIZE, 1, PITCH_ENTRY_SIZE);
        out.begin_section(SectionTag::Pitch.bytes(), size, false)?;
        out.u16(1)?;
        out.f32(pitch.base)?;
        out.f32(pitch.step)?;
        out.f32(pitch.sdev)?;
        out.end_section()?;
    }

    let durations = def.phonemes.iter().map(|p| p.durations.len()).sum::<usize>();
    if durations > 0 {
        let size = section_size(SECTION_HEADER_SIZE, durations, DURATION_ENTRY_SIZE);
        out.begin_section(SectionTag::Durations.bytes(), size, false)?;
        out.u16(entry_count(durations, "DUR")?)?;
        for phoneme in &def.phonemes {
            for duration in &phoneme.durations {
                out.u64(phoneme.first.bits())?;
                out.u64(phoneme.second.bits())?;
                out.u64(duration.condition.0)?;
                out.u64(duration.condition.1)?;
                out.u16(duration.mean)?;
                out.u16(duration.sdev)?;
            }
        }
        out.end_section()?;
        tracing::debug!(section = "DUR", entries = durations, "wrote section");
    }

    let units = def.phonemes.iter().map(|p| p.units.len()).sum::<usize>();
    if units > 0 {
        let size = section_size(SECTION_HEADER_SIZE, units, UNIT_ENTRY_SIZE);
        out.begin_section(SectionTag::Units.bytes(), size, true)?;
        out.u16(entry_count(units, "PUT")?)?;
        for unit in def.phonemes.iter().flat_map(|p| &p.units) {
            out.pstr(&unit.name)?;
            out.u8(unit.start)?;
        }
        out.end_section()?;
        tracing::debug!(section = "PUT", entries = units, "wrote section");

        let indexed: Vec<_> = def.phonemes.iter().filter(|p| !p.units.is_empty()).collect();
        let size = section_size(SECTION_HEADER_SIZE, indexed.len(), PHONEME_UNITS_ENTRY_SIZE);
        out.begin_section(SectionTag::PhonemeUnits.bytes(), size, false)?;
        out.u16(entry_count(indexed.len(), "PHO")?)?;
        let mut first_unit = 0usize;
        for phoneme in indexed {
            let count = u8::try_from(phoneme.units.len()).map_err(|_| {
                CompileError::semantic("too many units for one phoneme", 0, 0)
            })?;
            out.u64(phoneme.first.bits())?;
            out.u64(phoneme.second.bits())?;
            out.u16(entry_count(first_unit, "PUT")?)?;
            out.u8(count)?;
            first_unit += phoneme.units.len();
        }
        out.end_section()?;
    }

    tracing::info!(
        voice = %String::from_utf8_lossy(&def.id),
        phonemes = def.phonemes.len(),
        durations,
        units,
        "compiled voice database"
    );
    Ok(out.into_inner())
}
