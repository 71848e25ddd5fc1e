//! Letter-to-phoneme and rewrite behaviour on compiled rule sets.

use std::borrow::Cow;
use std::sync::Arc;

use phonorules::database::LanguageDatabase;
use phonorules::matcher::{LetterToPhoneme, LexicalRewriter, MatchError};
use phonorules::phoneme::{phonemeset, Phoneme, PhonemeError};
use phonorules::rules::compile::write_language;
use phonorules::rules::{Compiler, ErrorKind, LanguageDef, RuleDef};

fn database(source: &str) -> Arc<LanguageDatabase> {
    let data = Compiler::compile_language(source.as_bytes()).unwrap();
    Arc::new(LanguageDatabase::from_bytes(data).unwrap())
}

fn xsampa(text: &str) -> Vec<Phoneme> {
    phonemeset("xsampa").unwrap().parse(text.as_bytes()).unwrap()
}

fn pronounce(db: &Arc<LanguageDatabase>, locale: &str, text: &str) -> Result<Vec<Phoneme>, MatchError> {
    LetterToPhoneme::new(db.clone(), locale)
        .unwrap()
        .pronounce(text.as_bytes())
}

#[test]
fn class_in_right_context_selects_the_rule() {
    let db = database(
        ".phonemeset\txsampa\nclassdef C a e end\nrules\nt(C)\t/t/\nt\t/t_h/\na\t/a/\nz\t/z/\nend\n",
    );
    assert_eq!(pronounce(&db, "en", "ta").unwrap(), xsampa("ta"));
    assert_eq!(pronounce(&db, "en", "tz").unwrap(), xsampa("t_hz"));
    assert_eq!(pronounce(&db, "en", "t").unwrap(), xsampa("t_h"));
}

#[test]
fn locale_guard() {
    let db = database(
        ".phonemeset\txsampa\nset @brit if locale=en-GB\nrules\nr\t@brit\t/r/\nend\n",
    );
    assert_eq!(pronounce(&db, "en-GB", "r").unwrap(), xsampa("r"));
    assert_eq!(pronounce(&db, "EN-gb", "r").unwrap(), xsampa("r"));
    assert_eq!(
        pronounce(&db, "en-US", "r"),
        Err(MatchError::UnableToPronounce { position: 0 })
    );
}

#[test]
fn negated_guard_falls_through() {
    let db = database(
        ".phonemeset\txsampa\nset @brit if locale=en-GB\nrules\nr\t/r\\/\t!brit\nr\t/r/\nend\n",
    );
    assert_eq!(pronounce(&db, "en-GB", "r").unwrap(), xsampa("r"));
    assert_eq!(pronounce(&db, "en-US", "r").unwrap(), xsampa("r\\"));
}

#[test]
fn subtag_prefix_matches_any_region() {
    let db = database(
        ".phonemeset\txsampa\nset @english if locale=en\nrules\nr\t@english\t/r/\nend\n",
    );
    assert!(pronounce(&db, "en-GB", "r").is_ok());
    assert!(pronounce(&db, "en", "r").is_ok());
    assert!(pronounce(&db, "eng", "r").is_err());
}

#[test]
fn first_declared_class_member_wins() {
    let db = database(".phonemeset\txsampa\nclassdef C ab a end\nrules\nxC\t/k/\nb\t/b/\nend\n");
    let matcher = LetterToPhoneme::new(db, "en").unwrap();
    let (end, phonemes) = matcher.next_match(b"xab", 0).unwrap().unwrap();
    assert_eq!(end, 3);
    assert_eq!(phonemes, xsampa("k"));

    let db = database(".phonemeset\txsampa\nclassdef C a ab end\nrules\nxC\t/k/\nb\t/b/\nend\n");
    let matcher = LetterToPhoneme::new(db, "en").unwrap();
    let (end, _) = matcher.next_match(b"xab", 0).unwrap().unwrap();
    assert_eq!(end, 2);
    assert_eq!(matcher.pronounce(b"xab").unwrap(), xsampa("kb"));
}

#[test]
fn word_boundaries() {
    let db = database(
        ".phonemeset\txsampa\nrules\nx(a_)\t/k/\n_)x\t/g/\nx\t/z/\na\t/a/\nb\t/b/\nend\n",
    );
    assert_eq!(pronounce(&db, "en", "xa").unwrap(), xsampa("ka"));
    assert_eq!(pronounce(&db, "en", "bxa").unwrap(), xsampa("bka"));
    assert_eq!(pronounce(&db, "en", "xb").unwrap(), xsampa("gb"));
    assert_eq!(pronounce(&db, "en", "bxab").unwrap(), xsampa("bzab"));
}

#[test]
fn left_context_reads_backwards() {
    let db = database(".phonemeset\txsampa\nrules\nab)c\t/k/\nc\t/s/\na\t/a/\nb\t/b/\nend\n");
    assert_eq!(pronounce(&db, "en", "abc").unwrap(), xsampa("abk"));
    assert_eq!(pronounce(&db, "en", "bac").unwrap(), xsampa("bas"));
}

#[test]
fn class_in_left_context_scans_backwards() {
    let db = database(
        ".phonemeset\txsampa\nclassdef C ab x end\nrules\nC)c\t/k/\nc\t/s/\na\t/a/\nb\t/b/\nx\t/x/\nend\n",
    );
    assert_eq!(pronounce(&db, "en", "abc").unwrap(), xsampa("abk"));
    assert_eq!(pronounce(&db, "en", "xc").unwrap(), xsampa("xk"));
    assert_eq!(pronounce(&db, "en", "bc").unwrap(), xsampa("bs"));
}

#[test]
fn left_and_right_context_together() {
    let db = database(
        ".phonemeset\txsampa\nrules\nab)c(d)\t/g/\nab)c\t/k/\nc\t/s/\na\t/a/\nb\t/b/\nd\t/d/\nend\n",
    );
    assert_eq!(pronounce(&db, "en", "abcd").unwrap(), xsampa("abgd"));
    assert_eq!(pronounce(&db, "en", "abc").unwrap(), xsampa("abk"));
    assert_eq!(pronounce(&db, "en", "cd").unwrap(), xsampa("sd"));
}

#[test]
fn undefined_class_never_matches() {
    let db = database(".phonemeset\txsampa\nrules\nt(Q)\t/t/\nt\t/d/\na\t/a/\nend\n");
    assert_eq!(pronounce(&db, "en", "ta").unwrap(), xsampa("da"));
}

#[test]
fn empty_input_and_uncovered_bytes() {
    let db = database(".phonemeset\txsampa\nrules\na\t/a/\nend\n");
    assert_eq!(pronounce(&db, "en", "").unwrap(), Vec::new());
    assert_eq!(
        pronounce(&db, "en", "aqa"),
        Err(MatchError::UnableToPronounce { position: 1 })
    );
}

#[test]
fn empty_replacement_elides_text() {
    let db = database(".phonemeset\txsampa\nrules\ne(_)\t//\ne\t/e/\nm\t/m/\nend\n");
    assert_eq!(pronounce(&db, "en", "me").unwrap(), xsampa("m"));
    assert_eq!(pronounce(&db, "en", "em").unwrap(), xsampa("em"));
}

#[test]
fn feature_lookahead_checks_the_next_phoneme() {
    let db = database(
        ".phonemeset\txsampa\nrules\ns({vcd})\t/z/\ns\t/s/\nb\t/b/\nt\t/t/\nend\n",
    );
    assert_eq!(pronounce(&db, "en", "sb").unwrap(), xsampa("zb"));
    assert_eq!(pronounce(&db, "en", "st").unwrap(), xsampa("st"));
    assert_eq!(pronounce(&db, "en", "s").unwrap(), xsampa("s"));
}

#[test]
fn lookahead_ignores_elision_rules() {
    // `b(_)` would produce nothing; the lookahead sees /b/ instead.
    let db = database(
        ".phonemeset\txsampa\nrules\ns({vcd})\t/z/\ns\t/s/\nb(_)\t//\nb\t/b/\nend\n",
    );
    assert_eq!(pronounce(&db, "en", "sb").unwrap(), xsampa("z"));
}

#[test]
fn repeated_lookahead_is_rejected() {
    let err = Compiler::compile_language(
        b".phonemeset\txsampa\nrules\ns({con}{vwl})\t/z/\ns\t/s/\nend\n",
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::SyntaxError);
    assert_eq!(err.line, 3);
}

#[test]
fn lookahead_reports_invalid_replacements() {
    // Only the lookahead pass sees the `b` rule; the main pass elides `b`.
    let rule = |pattern: &[u8], replacement: &[u8]| RuleDef {
        group: pattern[0],
        pattern: pattern.to_vec(),
        replacement: replacement.to_vec(),
    };
    let def = LanguageDef {
        phonemeset: b"xsampa".to_vec(),
        letter_to_phoneme: vec![
            rule(b"s({vcd})", b"z"),
            rule(b"s", b"s"),
            rule(b"b(_)", b""),
            rule(b"b", b"!"),
        ],
        ..Default::default()
    };
    let data = write_language(&def, Vec::new()).unwrap();
    let db = Arc::new(LanguageDatabase::from_bytes(data).unwrap());
    assert_eq!(
        pronounce(&db, "en", "sb"),
        Err(MatchError::InvalidPhonemes(PhonemeError::UnknownSymbol(0)))
    );
}

#[test]
fn rewrite_replaces_with_right_context() {
    let db = database("rewrite\nx(y)\t\"z\"\nend\n");
    let rewriter = LexicalRewriter::new(db, "en");
    assert!(rewriter.has_rules());
    assert_eq!(rewriter.rewrite(b"xyb").as_ref(), b"zyb");
    assert_eq!(rewriter.rewrite(b"xxb").as_ref(), b"xxb");
    assert_eq!(rewriter.rewrite(b"").as_ref(), b"");
}

#[test]
fn rewrite_expands_and_drops() {
    let db = database("rewrite\n&\t\" and \"\n-\t\"\"\nend\n");
    let rewriter = LexicalRewriter::new(db, "en");
    assert_eq!(rewriter.rewrite(b"a&b-c").as_ref(), b"a and bc");
}

#[test]
fn rewrite_honours_guards() {
    let db = database("set @us if locale=en-US\nrewrite\nou\t@us\t\"o\"\nend\n");
    assert_eq!(
        LexicalRewriter::new(db.clone(), "en-US").rewrite(b"colour").as_ref(),
        b"color"
    );
    assert_eq!(
        LexicalRewriter::new(db, "en-GB").rewrite(b"colour").as_ref(),
        b"colour"
    );
}

#[test]
fn rewrite_without_rules_borrows_the_input() {
    let db = database(".phonemeset\txsampa\nrules\na\t/a/\nend\n");
    let rewriter = LexicalRewriter::new(db, "en");
    assert!(!rewriter.has_rules());
    assert!(matches!(rewriter.rewrite(b"abc"), Cow::Borrowed(s) if s == b"abc"));
}

#[test]
fn rewrite_then_pronounce() {
    let db = database(
        ".phonemeset\txsampa\nrewrite\nph\t\"f\"\nend\nrules\nf\t/f/\na\t/a/\nend\n",
    );
    let rewriter = LexicalRewriter::new(db.clone(), "en");
    let matcher = LetterToPhoneme::new(db, "en").unwrap();
    let text = rewriter.rewrite(b"pha");
    assert_eq!(matcher.pronounce(&text).unwrap(), xsampa("fa"));
}
