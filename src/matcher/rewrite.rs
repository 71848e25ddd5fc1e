//! Lexical rewriting with the `LRR` rules of a language database.

use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::Arc;

use super::conditions;
use super::engine::{group_table, match_group, MatchHooks, Window};
use crate::database::{LanguageDatabase, RuleGroup};

/// Rewrites text literally. Bytes no rule covers are copied through.
pub struct LexicalRewriter {
    db: Arc<LanguageDatabase>,
    conditions: Vec<bool>,
    groups: Vec<Option<RuleGroup>>,
}

struct Literal;

impl MatchHooks for Literal {
    type Error = Infallible;
}

impl LexicalRewriter {
    pub fn new(db: Arc<LanguageDatabase>, locale: &str) -> Self {
        let conditions = conditions::evaluate(db.conditionals(), locale);
        let groups = group_table(db.rewrite_groups());
        Self {
            db,
            conditions,
            groups,
        }
    }

    pub fn has_rules(&self) -> bool {
        !self.db.rewrite_groups().is_empty()
    }

    /// Rewrite `text`. Without any rewrite rules the input is returned
    /// as is.
    pub fn rewrite<'a>(&self, text: &'a [u8]) -> Cow<'a, [u8]> {
        if !self.has_rules() {
            return Cow::Borrowed(text);
        }
        let mut out = Vec::with_capacity(text.len());
        let mut pos = 0;
        while let Some(next) = self.next_match(text, pos, &mut out) {
            pos = next;
        }
        Cow::Owned(out)
    }

    /// Rewrite at `pos`, appending to `out`. Returns where to continue, or
    /// `None` at the end of the text.
    pub fn next_match(&self, text: &[u8], pos: usize, out: &mut Vec<u8>) -> Option<usize> {
        if pos >= text.len() {
            return None;
        }
        let group = self.groups.get(text[pos] as usize).copied().flatten();
        let matched = group.and_then(|group| {
            match match_group(
                &self.db,
                &group,
                &self.conditions,
                Window::new(text),
                pos,
                &Literal,
            ) {
                Ok(m) => m,
                Err(never) => match never {},
            }
        });
        match matched {
            Some(m) => {
                out.extend_from_slice(m.replacement);
                Some(m.end)
            }
            None => {
                out.push(text[pos]);
                Some(pos + 1)
            }
        }
    }
}
