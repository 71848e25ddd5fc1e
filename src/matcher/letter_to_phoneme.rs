//! Letter-to-phoneme conversion.

use std::sync::Arc;

use super::conditions;
use super::engine::{group_table, has_right_context, match_group, MatchHooks, Window};
use super::MatchError;
use crate::database::{LanguageDatabase, LoadError, RuleGroup};
use crate::phoneme::features::parse_spec;
use crate::phoneme::{phonemeset, Phoneme, PhonemeSet};

/// Converts text to phonemes with the `L2P` rules of a language database.
///
/// Every byte of the text must be covered by some rule; there is no
/// fallback.
pub struct LetterToPhoneme {
    db: Arc<LanguageDatabase>,
    phonemes: Box<dyn PhonemeSet>,
    conditions: Vec<bool>,
    groups: Vec<Option<RuleGroup>>,
}

/// One matching pass. Lookahead passes run with `elide` off.
struct Pass<'m> {
    matcher: &'m LetterToPhoneme,
    elide: bool,
}

impl MatchHooks for Pass<'_> {
    type Error = MatchError;

    fn skip_rule(&self, pattern: &[u8], replacement: &[u8]) -> bool {
        !self.elide && (replacement.is_empty() || has_right_context(pattern))
    }

    fn lookahead(
        &self,
        window: Window<'_>,
        pos: usize,
        spec: &[u8],
    ) -> Option<Result<bool, MatchError>> {
        let result = parse_spec(spec).map_err(MatchError::from).and_then(|(value, mask)| {
            let first = self.matcher.first_phoneme(window.text, pos, window.end)?;
            Ok(first.is_some_and(|p| p.get(mask) == value))
        });
        Some(result)
    }
}

impl LetterToPhoneme {
    /// Build a matcher for `locale`. Conditionals are evaluated here, once.
    pub fn new(db: Arc<LanguageDatabase>, locale: &str) -> Result<Self, LoadError> {
        let phonemes = phonemeset(db.phonemeset())
            .ok_or_else(|| LoadError::UnknownPhonemeSet(db.phonemeset().to_string()))?;
        let conditions = conditions::evaluate(db.conditionals(), locale);
        let groups = group_table(db.letter_to_phoneme_groups());
        tracing::debug!(
            locale,
            phonemeset = phonemes.name(),
            groups = db.letter_to_phoneme_groups().len(),
            "letter-to-phoneme matcher ready"
        );
        Ok(Self {
            db,
            phonemes,
            conditions,
            groups,
        })
    }

    pub fn phonemeset(&self) -> &dyn PhonemeSet {
        self.phonemes.as_ref()
    }

    /// Pronounce the whole of `text`.
    pub fn pronounce(&self, text: &[u8]) -> Result<Vec<Phoneme>, MatchError> {
        let mut out = Vec::new();
        let mut pos = 0;
        while let Some((next, phonemes)) = self.next_match(text, pos)? {
            out.extend(phonemes);
            pos = next;
        }
        Ok(out)
    }

    /// Match one rule at `pos`, returning where to continue and the
    /// phonemes produced. `Ok(None)` at the end of the text.
    pub fn next_match(
        &self,
        text: &[u8],
        pos: usize,
    ) -> Result<Option<(usize, Vec<Phoneme>)>, MatchError> {
        self.match_at(Window::new(text), pos, true)
    }

    fn match_at(
        &self,
        window: Window<'_>,
        pos: usize,
        elide: bool,
    ) -> Result<Option<(usize, Vec<Phoneme>)>, MatchError> {
        if pos >= window.end {
            return Ok(None);
        }
        let unable = MatchError::UnableToPronounce { position: pos };
        let group = self
            .groups
            .get(window.text[pos] as usize)
            .copied()
            .flatten()
            .ok_or(unable.clone())?;

        let pass = Pass {
            matcher: self,
            elide,
        };
        match match_group(&self.db, &group, &self.conditions, window, pos, &pass)? {
            Some(m) => Ok(Some((m.end, self.phonemes.parse(m.replacement)?))),
            None => Err(unable),
        }
    }

    /// The first phoneme the text in `[pos, end)` would produce, if any.
    ///
    /// Text no rule covers ends the scan; an invalid replacement is an error.
    fn first_phoneme(
        &self,
        text: &[u8],
        pos: usize,
        end: usize,
    ) -> Result<Option<Phoneme>, MatchError> {
        let window = Window {
            text,
            start: pos,
            end,
        };
        let mut at = pos;
        loop {
            match self.match_at(window, at, false) {
                Ok(Some((next, phonemes))) => {
                    if let Some(&first) = phonemes.first() {
                        return Ok(Some(first));
                    }
                    at = next;
                }
                Ok(None) | Err(MatchError::UnableToPronounce { .. }) => return Ok(None),
                Err(err) => return Err(err),
            }
        }
    }
}
