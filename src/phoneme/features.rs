//! Explicit feature notation: `{vcd,alv,stp}{vwl,low,cnt}`.

use super::{
    Phoneme, PhonemeError, PhonemeSet, BACKNESS, CONSONANT, FEATURES, HEIGHT, MANNER,
    PHONEME_TYPE, PLACE, VOWEL,
};

/// The `features` phoneme set.
pub struct ExplicitFeatures;

/// Parse a comma separated feature list (the text between `{` and `}`)
/// into a `(value, mask)` pair suitable for masked comparison.
pub fn parse_spec(spec: &[u8]) -> Result<(u64, u64), PhonemeError> {
    let text = String::from_utf8_lossy(spec);
    let mut value = 0u64;
    let mut mask = 0u64;
    for name in text.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let (v, m) =
            super::feature(name).ok_or_else(|| PhonemeError::UnknownFeature(name.to_string()))?;
        if mask & m != 0 && value & m != v {
            return Err(PhonemeError::ConflictingFeatures(text.into_owned()));
        }
        value |= v;
        mask |= m;
    }
    Ok((value, mask))
}

impl PhonemeSet for ExplicitFeatures {
    fn name(&self) -> &'static str {
        "features"
    }

    fn parse(&self, text: &[u8]) -> Result<Vec<Phoneme>, PhonemeError> {
        let mut phonemes = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            match text[pos] {
                b' ' | b'\t' => pos += 1,
                b'{' => {
                    let close = text[pos..]
                        .iter()
                        .position(|&c| c == b'}')
                        .ok_or(PhonemeError::UnterminatedGroup)?;
                    let (value, _) = parse_spec(&text[pos + 1..pos + close])?;
                    let mut phoneme = Phoneme::new(value);
                    if phoneme.get(PHONEME_TYPE) == 0 {
                        if phoneme.get(PLACE | MANNER) != 0 {
                            phoneme.set(CONSONANT, PHONEME_TYPE);
                        } else if phoneme.get(HEIGHT | BACKNESS) != 0 {
                            phoneme.set(VOWEL, PHONEME_TYPE);
                        }
                    }
                    phonemes.push(phoneme);
                    pos += close + 1;
                }
                _ => return Err(PhonemeError::UnknownSymbol(pos)),
            }
        }
        Ok(phonemes)
    }

    fn write(&self, phonemes: &[Phoneme]) -> String {
        let mut out = String::new();
        for phoneme in phonemes {
            let names: Vec<&str> = FEATURES
                .iter()
                .filter(|&&(_, value, mask)| phoneme.get(mask) == value)
                .map(|&(name, _, _)| name)
                .collect();
            out.push('{');
            out.push_str(&names.join(","));
            out.push('}');
        }
        out
    }
}
