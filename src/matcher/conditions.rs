//! Locale-gated conditionals, evaluated once per matcher.

use crate::database::{Conditional, Polarity};

/// Whether `locale` falls under the predicate value `pattern`.
///
/// Comparison is case-insensitive and `pattern` may name a parent tag:
/// `en` holds for `en-GB`, but `en-GB` does not hold for `en`.
pub fn locale_matches(pattern: &str, locale: &str) -> bool {
    let (pattern, locale) = (pattern.as_bytes(), locale.as_bytes());
    if locale.len() < pattern.len() || !locale[..pattern.len()].eq_ignore_ascii_case(pattern) {
        return false;
    }
    matches!(locale.get(pattern.len()), None | Some(b'-') | Some(b'_'))
}

/// Evaluate every conditional for `locale` into a table indexed by id.
///
/// Entries sharing an id are OR-ed. Index 0 is never set.
pub fn evaluate(conditionals: &[Conditional], locale: &str) -> Vec<bool> {
    let size = conditionals.iter().map(|c| c.id as usize + 1).max().unwrap_or(0);
    let mut flags = vec![false; size];
    for cond in conditionals {
        let holds = locale_matches(&cond.locale, locale);
        let set = match cond.polarity {
            Polarity::Set => holds,
            Polarity::Unset => !holds,
        };
        if set {
            flags[cond.id as usize] = true;
        }
        tracing::trace!(id = cond.id, locale = %cond.locale, set, "conditional");
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(id: u8, polarity: Polarity, locale: &str) -> Conditional {
        Conditional {
            id,
            polarity,
            locale: locale.to_string(),
        }
    }

    #[test]
    fn locale_prefix_and_case() {
        assert!(locale_matches("en-GB", "en-GB"));
        assert!(locale_matches("en-gb", "en-GB"));
        assert!(locale_matches("en", "en-GB"));
        assert!(!locale_matches("en-GB", "en"));
        assert!(!locale_matches("en-GB", "en-US"));
        assert!(!locale_matches("e", "en"));
    }

    #[test]
    fn shared_ids_are_ored() {
        let conds = [
            cond(1, Polarity::Set, "en-GB"),
            cond(1, Polarity::Set, "en-IE"),
            cond(2, Polarity::Set, "en-US"),
        ];
        assert_eq!(evaluate(&conds, "en-IE"), vec![false, true, false]);
        assert_eq!(evaluate(&conds, "en-US"), vec![false, false, true]);
    }

    #[test]
    fn unset_polarity_negates() {
        let conds = [cond(3, Polarity::Unset, "en-US")];
        assert!(evaluate(&conds, "en-GB")[3]);
        assert!(!evaluate(&conds, "en-US")[3]);
    }

    #[test]
    fn no_conditionals() {
        assert!(evaluate(&[], "en").is_empty());
    }
}
