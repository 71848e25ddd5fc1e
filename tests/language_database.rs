//! Compile rule sources and load the result back as a language database.

use phonorules::database::{LanguageDatabase, LoadError, Polarity};
use phonorules::rules::{Compiler, ErrorKind};

const SOURCE: &str = "\
.locale\ten-GB
.phonemeset\txsampa

set @brit if locale=en-GB
set @brit if locale=en-IE
set !rhotic if locale=en-US

classdef V a e i o u end
classdef C b d t end

rewrite
x(y)\t\"z\"
end

rules
t(V)\t/t/
t\t/t_h/
a\t/a/
r\t@brit\t/r/
r\t/r\\/
end

dictionary cainteoir
the\t/D@/
end
";

fn compiled() -> Vec<u8> {
    Compiler::compile_language(SOURCE.as_bytes()).unwrap()
}

#[test]
fn header_and_sections_reload() {
    let db = LanguageDatabase::from_bytes(compiled()).unwrap();
    assert_eq!(db.locale(), "en-GB");
    assert_eq!(db.phonemeset(), "xsampa");

    let conds = db.conditionals();
    assert_eq!(conds.len(), 3);
    assert_eq!((conds[0].id, conds[1].id, conds[2].id), (1, 1, 2));
    assert_eq!(conds[1].locale, "en-IE");
    assert_eq!(conds[2].polarity, Polarity::Unset);

    assert_eq!(db.class_ids(), &[b'V', b'C']);
    assert_eq!(db.classdef(b'C').count(), 3);
    assert_eq!(db.classdef(b'Z').count(), 0);

    let ids: Vec<u8> = db.letter_to_phoneme_groups().iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![b'a', b'r', b't']);
    let rewrite: Vec<u8> = db.rewrite_groups().iter().map(|g| g.id).collect();
    assert_eq!(rewrite, vec![b'x']);

    assert_eq!(db.lookup(b"the"), Some(&b"D@"[..]));
    assert_eq!(db.lookup(b"a"), None);
}

#[test]
fn rules_keep_declared_order_within_a_group() {
    let db = LanguageDatabase::from_bytes(compiled()).unwrap();
    let t = db
        .letter_to_phoneme_groups()
        .iter()
        .find(|g| g.id == b't')
        .copied()
        .unwrap();
    let rules: Vec<(&[u8], &[u8])> = db.rules(&t).collect();
    assert_eq!(rules, vec![(&b"t(V)"[..], &b"t"[..]), (&b"t"[..], &b"t_h"[..])]);
}

#[test]
fn open_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("en.rules");
    let out = dir.path().join("en.ldb");
    std::fs::write(&src, SOURCE).unwrap();
    Compiler::compile_language_file(&src, &out).unwrap();
    let db = LanguageDatabase::open(&out).unwrap();
    assert_eq!(db.locale(), "en-GB");
}

#[test]
fn failed_compile_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("bad.rules");
    let out = dir.path().join("bad.ldb");
    std::fs::write(&src, ".phonemeset\txsampa\nrules\nt\t@nope\t/t/\nend\n").unwrap();
    let err = Compiler::compile_language_file(&src, &out).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SemanticError);
    assert!(!out.exists());
}

#[test]
fn bad_magic_is_rejected() {
    let mut data = compiled();
    data[0] = b'X';
    assert!(matches!(
        LanguageDatabase::from_bytes(data),
        Err(LoadError::BadMagic { .. })
    ));
}

#[test]
fn foreign_byte_order_is_rejected() {
    let mut data = compiled();
    data.swap(6, 7);
    assert!(matches!(
        LanguageDatabase::from_bytes(data),
        Err(LoadError::ForeignEndianness(_))
    ));
}

#[test]
fn unknown_and_voice_sections_are_rejected() {
    let mut data = compiled();
    data.extend_from_slice(b"XYZ");
    assert!(matches!(
        LanguageDatabase::from_bytes(data),
        Err(LoadError::UnknownSection(tag)) if &tag == b"XYZ"
    ));

    let mut data = compiled();
    data.extend_from_slice(b"PTC\x01\x00");
    assert!(matches!(
        LanguageDatabase::from_bytes(data),
        Err(LoadError::UnsupportedSection { .. })
    ));
}

#[test]
fn truncated_data_is_rejected() {
    let data = compiled();
    let truncated = data[..data.len() - 3].to_vec();
    assert!(LanguageDatabase::from_bytes(truncated).is_err());
}

#[test]
fn voice_file_is_not_a_language() {
    let voice = Compiler::compile_voice(b".id\tv\n").unwrap();
    assert!(matches!(
        LanguageDatabase::from_bytes(voice),
        Err(LoadError::BadMagic { .. })
    ));
}
