//! The context state machine shared by both matchers.
//!
//! A rule group holds every rule whose anchor starts with one byte. Rules
//! are tried in declared order; the first whose whole pattern holds wins.
//! Pattern bytes are read left to right and move the machine between
//! three states:
//!
//! - `ContextMatch`: the anchor, scanned forwards from the start position.
//! - `RightMatch`: entered on `(`, scanned forwards from the anchor's end.
//! - `LeftMatch`: entered on `)`, scanned backwards from the anchor's start.
//!
//! The left cursor points one past the byte it compares next, so `_`
//! holds there when the cursor is back at the window start.

use crate::database::{LanguageDatabase, Polarity, RuleGroup};
use crate::rules::pattern::{
    is_class_id, BOUNDARY, LEFT_CONTEXT, LOOKAHEAD_CLOSE, LOOKAHEAD_OPEN, RIGHT_CONTEXT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ContextMatch,
    RightMatch,
    LeftMatch,
}

/// The readable part of the text: `text[start..end]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window<'t> {
    pub text: &'t [u8],
    pub start: usize,
    pub end: usize,
}

impl<'t> Window<'t> {
    pub fn new(text: &'t [u8]) -> Self {
        Self {
            text,
            start: 0,
            end: text.len(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Match<'d> {
    /// Where matching resumes: the end of the anchor.
    pub end: usize,
    pub replacement: &'d [u8],
}

/// What a matcher adds to the shared state machine.
pub(crate) trait MatchHooks {
    type Error;

    /// Leave a rule out of consideration entirely.
    fn skip_rule(&self, _pattern: &[u8], _replacement: &[u8]) -> bool {
        false
    }

    /// Test `{spec}` against the text at `pos`. `None` means the matcher
    /// has no lookahead and `{` is an ordinary byte.
    fn lookahead(
        &self,
        _window: Window<'_>,
        _pos: usize,
        _spec: &[u8],
    ) -> Option<Result<bool, Self::Error>> {
        None
    }
}

/// Rule groups indexed by their first byte.
pub(crate) fn group_table(groups: &[RuleGroup]) -> Vec<Option<RuleGroup>> {
    let size = groups.iter().map(|g| g.id as usize + 1).max().unwrap_or(0);
    let mut table = vec![None; size];
    for group in groups {
        table[group.id as usize].get_or_insert(*group);
    }
    table
}

/// Whether a stored pattern carries a right context.
pub(crate) fn has_right_context(pattern: &[u8]) -> bool {
    let body = match pattern.first().and_then(|&b| Polarity::from_byte(b)) {
        Some(_) => pattern.get(2..).unwrap_or(&[]),
        None => pattern,
    };
    body.contains(&RIGHT_CONTEXT)
}

/// Try each rule of `group` at `pos`, returning the first that matches.
pub(crate) fn match_group<'d, H: MatchHooks>(
    db: &'d LanguageDatabase,
    group: &RuleGroup,
    conditions: &[bool],
    window: Window<'_>,
    pos: usize,
    hooks: &H,
) -> Result<Option<Match<'d>>, H::Error> {
    for (pattern, replacement) in db.rules(group) {
        if hooks.skip_rule(pattern, replacement) {
            continue;
        }
        if let Some(end) = match_rule(db, pattern, conditions, window, pos, hooks)? {
            tracing::trace!(
                pattern = %String::from_utf8_lossy(pattern),
                pos,
                end,
                "rule matched"
            );
            return Ok(Some(Match { end, replacement }));
        }
    }
    Ok(None)
}

fn match_rule<H: MatchHooks>(
    db: &LanguageDatabase,
    pattern: &[u8],
    conditions: &[bool],
    window: Window<'_>,
    pos: usize,
    hooks: &H,
) -> Result<Option<usize>, H::Error> {
    let text = window.text;
    let mut i = 0;

    if let Some(polarity) = pattern.first().and_then(|&b| Polarity::from_byte(b)) {
        let Some(&id) = pattern.get(1) else {
            return Ok(None);
        };
        let set = conditions.get(id as usize).copied().unwrap_or(false);
        if set != (polarity == Polarity::Set) {
            tracing::trace!(id, set, "guard rejected rule");
            return Ok(None);
        }
        i = 2;
    }

    let mut state = State::ContextMatch;
    let mut context = pos;
    let mut right = pos;
    let mut left = pos;

    while i < pattern.len() {
        let b = pattern[i];
        let holds = match b {
            RIGHT_CONTEXT => {
                right = context;
                state = State::RightMatch;
                true
            }
            LEFT_CONTEXT => {
                left = pos;
                state = State::LeftMatch;
                true
            }
            BOUNDARY => match state {
                State::LeftMatch => left == window.start,
                State::RightMatch => right == window.end,
                State::ContextMatch => false,
            },
            _ if is_class_id(b) => match state {
                State::ContextMatch => match_class(db, b, text, &mut context, window.end),
                State::RightMatch => match_class(db, b, text, &mut right, window.end),
                State::LeftMatch => match_class_back(db, b, text, &mut left, window.start),
            },
            LOOKAHEAD_OPEN if state == State::RightMatch => {
                let spec = pattern[i + 1..]
                    .iter()
                    .position(|&c| c == LOOKAHEAD_CLOSE)
                    .map(|len| &pattern[i + 1..i + 1 + len]);
                match spec.and_then(|spec| Some((spec, hooks.lookahead(window, right, spec)?))) {
                    Some((spec, result)) => {
                        if !result? {
                            return Ok(None);
                        }
                        i += spec.len() + 2;
                        continue;
                    }
                    None => literal(text, b, &mut right, window.end),
                }
            }
            _ => match state {
                State::ContextMatch => literal(text, b, &mut context, window.end),
                State::RightMatch => literal(text, b, &mut right, window.end),
                State::LeftMatch => {
                    if left > window.start && text[left - 1] == b {
                        left -= 1;
                        true
                    } else {
                        false
                    }
                }
            },
        };
        if !holds {
            return Ok(None);
        }
        i += 1;
    }

    Ok(Some(context))
}

fn literal(text: &[u8], b: u8, cursor: &mut usize, end: usize) -> bool {
    if *cursor < end && text[*cursor] == b {
        *cursor += 1;
        true
    } else {
        false
    }
}

/// First member of class `id` found at `cursor`, in declaration order.
fn match_class(db: &LanguageDatabase, id: u8, text: &[u8], cursor: &mut usize, end: usize) -> bool {
    let available = &text[*cursor..end];
    match db.classdef(id).find(|member| available.starts_with(member)) {
        Some(member) => {
            *cursor += member.len();
            true
        }
        None => false,
    }
}

/// First member of class `id` ending just before `cursor`.
fn match_class_back(
    db: &LanguageDatabase,
    id: u8,
    text: &[u8],
    cursor: &mut usize,
    start: usize,
) -> bool {
    let available = &text[start..*cursor];
    match db.classdef(id).find(|member| available.ends_with(member)) {
        Some(member) => {
            *cursor -= member.len();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_context_detection_skips_the_guard() {
        assert!(has_right_context(b"x(y)"));
        assert!(!has_right_context(b"c)ba"));
        // guard id 40 is '('
        assert!(!has_right_context(&[b'@', b'(', b'r']));
        assert!(has_right_context(&[b'!', 1, b'r', b'(', b'_', b')']));
    }

    #[test]
    fn group_table_is_dense() {
        assert!(group_table(&[]).is_empty());
    }
}
