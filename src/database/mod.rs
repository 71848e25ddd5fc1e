//! Compiled rule and voice databases.
//!
//! Both kinds share one container layout (see [`format`]): a header,
//! then tagged sections, each followed by the `STR` block holding the
//! strings it references.

pub mod error;
pub mod format;
pub mod language;
pub mod reader;
pub mod voice;
pub mod writer;

pub use error::LoadError;
pub use language::{Conditional, LanguageDatabase, Polarity, RuleGroup};
pub use voice::{Duration, Gender, Pitch, PitchModel, Unit, VoiceDatabase};
pub use writer::BinaryWriter;
