//! A table-driven subset of X-SAMPA.

use super::*;

const C: u64 = CONSONANT;
const V: u64 = VOWEL;

/// Base symbols, longest first where one symbol prefixes another.
const SYMBOLS: &[(&str, u64)] = &[
    ("tS", C | VOICELESS | PALATO_ALVEOLAR | AFFRICATE),
    ("dZ", C | VOICED | PALATO_ALVEOLAR | AFFRICATE),
    ("r\\", C | VOICED | ALVEOLAR | APPROXIMANT),
    ("p", C | VOICELESS | BILABIAL | PLOSIVE),
    ("b", C | VOICED | BILABIAL | PLOSIVE),
    ("t", C | VOICELESS | ALVEOLAR | PLOSIVE),
    ("d", C | VOICED | ALVEOLAR | PLOSIVE),
    ("k", C | VOICELESS | VELAR | PLOSIVE),
    ("g", C | VOICED | VELAR | PLOSIVE),
    ("?", C | VOICELESS | GLOTTAL | PLOSIVE),
    ("m", C | VOICED | BILABIAL | NASAL),
    ("n", C | VOICED | ALVEOLAR | NASAL),
    ("N", C | VOICED | VELAR | NASAL),
    ("r", C | VOICED | ALVEOLAR | TRILL),
    ("4", C | VOICED | ALVEOLAR | FLAP),
    ("f", C | VOICELESS | LABIODENTAL | FRICATIVE),
    ("v", C | VOICED | LABIODENTAL | FRICATIVE),
    ("T", C | VOICELESS | DENTAL | FRICATIVE),
    ("D", C | VOICED | DENTAL | FRICATIVE),
    ("s", C | VOICELESS | ALVEOLAR | FRICATIVE),
    ("z", C | VOICED | ALVEOLAR | FRICATIVE),
    ("S", C | VOICELESS | PALATO_ALVEOLAR | FRICATIVE),
    ("Z", C | VOICED | PALATO_ALVEOLAR | FRICATIVE),
    ("x", C | VOICELESS | VELAR | FRICATIVE),
    ("h", C | VOICELESS | GLOTTAL | FRICATIVE),
    ("j", C | VOICED | PALATAL | APPROXIMANT),
    ("w", C | VOICED | LABIO_VELAR | APPROXIMANT),
    ("l", C | VOICED | ALVEOLAR | LATERAL_APPROXIMANT),
    ("i", V | HIGH | FRONT | UNROUNDED),
    ("I", V | SEMI_HIGH | FRONT | UNROUNDED),
    ("e", V | UPPER_MID | FRONT | UNROUNDED),
    ("E", V | LOWER_MID | FRONT | UNROUNDED),
    ("{", V | SEMI_LOW | FRONT | UNROUNDED),
    ("a", V | LOW | FRONT | UNROUNDED),
    ("A", V | LOW | BACK | UNROUNDED),
    ("Q", V | LOW | BACK | ROUNDED),
    ("O", V | LOWER_MID | BACK | ROUNDED),
    ("o", V | UPPER_MID | BACK | ROUNDED),
    ("U", V | SEMI_HIGH | BACK | ROUNDED),
    ("u", V | HIGH | BACK | ROUNDED),
    ("V", V | LOWER_MID | BACK | UNROUNDED),
    ("@", V | MID | CENTRAL | UNROUNDED),
    ("3", V | LOWER_MID | CENTRAL | UNROUNDED),
    (".", SYLLABLE_BREAK),
];

const MODIFIERS: u64 = ASPIRATION | LENGTH | STRESS;

/// The `xsampa` phoneme set.
pub struct XSampa;

impl PhonemeSet for XSampa {
    fn name(&self) -> &'static str {
        "xsampa"
    }

    fn parse(&self, text: &[u8]) -> Result<Vec<Phoneme>, PhonemeError> {
        let mut phonemes = Vec::new();
        let mut stress = 0;
        let mut pos = 0;
        while pos < text.len() {
            match text[pos] {
                b' ' | b'\t' => {
                    pos += 1;
                    continue;
                }
                b'"' => {
                    stress = PRIMARY_STRESS;
                    pos += 1;
                    continue;
                }
                b'%' => {
                    stress = SECONDARY_STRESS;
                    pos += 1;
                    continue;
                }
                _ => {}
            }

            let (symbol, bits) = SYMBOLS
                .iter()
                .find(|(symbol, _)| text[pos..].starts_with(symbol.as_bytes()))
                .ok_or(PhonemeError::UnknownSymbol(pos))?;
            pos += symbol.len();

            let mut phoneme = Phoneme::new(*bits);
            phoneme.set(stress, STRESS);
            stress = 0;

            loop {
                let rest = &text[pos..];
                if rest.starts_with(b"_h") {
                    phoneme.set(ASPIRATED, ASPIRATION);
                    pos += 2;
                } else if rest.starts_with(b":\\") {
                    phoneme.set(HALF_LONG, LENGTH);
                    pos += 2;
                } else if rest.starts_with(b":") {
                    phoneme.set(LONG, LENGTH);
                    pos += 1;
                } else {
                    break;
                }
            }
            phonemes.push(phoneme);
        }
        Ok(phonemes)
    }

    fn write(&self, phonemes: &[Phoneme]) -> String {
        let mut out = String::new();
        for &phoneme in phonemes {
            match phoneme.get(STRESS) {
                PRIMARY_STRESS => out.push('"'),
                SECONDARY_STRESS => out.push('%'),
                _ => {}
            }
            let base = phoneme.get(!MODIFIERS);
            match SYMBOLS.iter().find(|(_, bits)| *bits == base) {
                Some((symbol, _)) => out.push_str(symbol),
                None => out.push_str(&ExplicitFeatures.write(&[Phoneme::new(base)])),
            }
            if phoneme.get(ASPIRATION) == ASPIRATED {
                out.push_str("_h");
            }
            match phoneme.get(LENGTH) {
                LONG => out.push(':'),
                HALF_LONG => out.push_str(":\\"),
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspiration_is_a_modifier() {
        let t = XSampa.parse(b"t").unwrap();
        let th = XSampa.parse(b"t_h").unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(th.len(), 1);
        assert!(t[0].matches(th[0], !ASPIRATION));
        assert_ne!(t[0], th[0]);
    }

    #[test]
    fn multi_byte_symbols_win() {
        let p = XSampa.parse(b"tSIp").unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p[0].get(MANNER), AFFRICATE);
    }

    #[test]
    fn stress_and_length() {
        let p = XSampa.parse(b"\"A:").unwrap();
        assert_eq!(p[0].get(STRESS), PRIMARY_STRESS);
        assert_eq!(p[0].get(LENGTH), LONG);
        assert_eq!(XSampa.write(&p), "\"A:");
    }

    #[test]
    fn write_round_trips_symbols() {
        let p = XSampa.parse(b"D@ k{t_h").unwrap();
        assert_eq!(XSampa.write(&p), "D@k{t_h");
    }

    #[test]
    fn unknown_symbol_reports_offset() {
        assert_eq!(XSampa.parse(b"ta!"), Err(PhonemeError::UnknownSymbol(2)));
    }
}
