//! Runtime matchers over a loaded language database.

pub mod conditions;
mod engine;
pub mod letter_to_phoneme;
pub mod rewrite;

use thiserror::Error;

use crate::phoneme::PhonemeError;

pub use letter_to_phoneme::LetterToPhoneme;
pub use rewrite::LexicalRewriter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("unable to pronounce the text at byte {position}")]
    UnableToPronounce { position: usize },

    #[error("invalid phonemes in rule replacement: {0}")]
    InvalidPhonemes(#[from] PhonemeError),
}
