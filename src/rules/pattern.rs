//! Context patterns: source notation to stored bytes.
//!
//! A source pattern reads `[LEFT ")"] ANCHOR ["(" RIGHT [")"]]`, with the
//! left context in reading order. The stored form puts the anchor first
//! so the matcher can scan it forwards from the current position:
//!
//! ```text
//! [guard] ANCHOR ["(" RIGHT ")"] [")" reverse(LEFT)]
//! ```
//!
//! When both contexts are present the single `)` closes the right context
//! and opens the left one, so `x(y)` is stored exactly as written.

use thiserror::Error;

use crate::database::Polarity;
use crate::phoneme::features::parse_spec;

pub const LEFT_CONTEXT: u8 = b')';
pub const RIGHT_CONTEXT: u8 = b'(';
pub const BOUNDARY: u8 = b'_';
pub const LOOKAHEAD_OPEN: u8 = b'{';
pub const LOOKAHEAD_CLOSE: u8 = b'}';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty pattern anchor")]
    EmptyAnchor,
    #[error("pattern anchor must start with a literal byte, found '{}'", printable(.0))]
    AnchorStart(u8),
    #[error("'{}' is not allowed in a pattern anchor", printable(.0))]
    AnchorOperator(u8),
    #[error("unbalanced context delimiters")]
    Unbalanced,
    #[error("phoneme lookahead is only allowed in the right context of a rules block")]
    MisplacedLookahead,
    #[error("unterminated phoneme lookahead")]
    UnterminatedLookahead,
    #[error("invalid phoneme lookahead: {0}")]
    InvalidLookahead(String),
    #[error("only one phoneme lookahead is allowed per context")]
    RepeatedLookahead,
}

fn printable(b: &u8) -> char {
    char::from(*b)
}

/// A pattern ready to be written to a rule group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Rule group id: the first anchor byte.
    pub group: u8,
    pub bytes: Vec<u8>,
}

pub fn is_class_id(b: u8) -> bool {
    b.is_ascii_uppercase()
}

/// Compile a source pattern. `lookahead` enables `{features}` in the
/// right context.
pub fn compile_pattern(
    source: &[u8],
    guard: Option<(Polarity, u8)>,
    lookahead: bool,
) -> Result<Pattern, PatternError> {
    let (left, rest) = match source.iter().position(|&b| b == LEFT_CONTEXT) {
        Some(close) if !source[..close].contains(&RIGHT_CONTEXT) => {
            (Some(&source[..close]), &source[close + 1..])
        }
        _ => (None, source),
    };

    let (anchor, right) = match rest.iter().position(|&b| b == RIGHT_CONTEXT) {
        Some(open) => {
            let right = &rest[open + 1..];
            let right = right.strip_suffix(&[LEFT_CONTEXT]).unwrap_or(right);
            (&rest[..open], Some(right))
        }
        None => (rest, None),
    };

    let group = check_anchor(anchor)?;
    if let Some(left) = left {
        check_context(left, false)?;
    }
    if let Some(right) = right {
        check_context(right, lookahead)?;
    }

    let mut bytes = Vec::with_capacity(source.len() + 2);
    if let Some((polarity, id)) = guard {
        bytes.push(polarity.byte());
        bytes.push(id);
    }
    bytes.extend_from_slice(anchor);
    if let Some(right) = right {
        bytes.push(RIGHT_CONTEXT);
        bytes.extend_from_slice(right);
        bytes.push(LEFT_CONTEXT);
        if let Some(left) = left {
            bytes.extend(left.iter().rev());
        }
    } else if let Some(left) = left {
        bytes.push(LEFT_CONTEXT);
        bytes.extend(left.iter().rev());
    }

    Ok(Pattern { group, bytes })
}

fn check_anchor(anchor: &[u8]) -> Result<u8, PatternError> {
    let (&first, rest) = anchor.split_first().ok_or(PatternError::EmptyAnchor)?;
    if is_class_id(first)
        || matches!(
            first,
            b'@' | b'!' | BOUNDARY | LEFT_CONTEXT | RIGHT_CONTEXT | LOOKAHEAD_OPEN
        )
    {
        return Err(PatternError::AnchorStart(first));
    }
    if let Some(&op) = rest
        .iter()
        .find(|&&b| matches!(b, BOUNDARY | LEFT_CONTEXT | RIGHT_CONTEXT | LOOKAHEAD_OPEN))
    {
        return Err(PatternError::AnchorOperator(op));
    }
    Ok(first)
}

fn check_context(context: &[u8], lookahead: bool) -> Result<(), PatternError> {
    let mut seen_lookahead = false;
    let mut i = 0;
    while i < context.len() {
        match context[i] {
            LEFT_CONTEXT | RIGHT_CONTEXT => return Err(PatternError::Unbalanced),
            // A lookahead consumes nothing, so a second one would test the
            // same phoneme again.
            LOOKAHEAD_OPEN if lookahead && seen_lookahead => {
                return Err(PatternError::RepeatedLookahead)
            }
            LOOKAHEAD_OPEN if lookahead => {
                seen_lookahead = true;
                let close = context[i..]
                    .iter()
                    .position(|&b| b == LOOKAHEAD_CLOSE)
                    .ok_or(PatternError::UnterminatedLookahead)?;
                parse_spec(&context[i + 1..i + close])
                    .map_err(|e| PatternError::InvalidLookahead(e.to_string()))?;
                i += close + 1;
            }
            LOOKAHEAD_OPEN => return Err(PatternError::MisplacedLookahead),
            _ => i += 1,
        }
    }
    Ok(())
}
