use jmodel_classpath::{ClasspathEntry, ClasspathError, SourceEncoding, SourceRoot};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn reads_java_files_in_path_order() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("b")).unwrap();
    std::fs::write(tmp.path().join("b/B.java"), "package b; class B {}").unwrap();
    std::fs::write(tmp.path().join("A.java"), "class A {}").unwrap();
    std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

    let root = SourceRoot::read(&ClasspathEntry::source(tmp.path())).unwrap();
    let names: Vec<_> = root
        .files()
        .iter()
        .map(|f| f.path.strip_prefix(tmp.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["A.java", "b/B.java"]);
    assert_eq!(root.files()[0].text, "class A {}");
}

#[test]
fn decodes_with_entry_encoding() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("C.java"), b"class C { String s = \"caf\xE9\"; }").unwrap();

    let utf8 = SourceRoot::read(&ClasspathEntry::source(tmp.path()));
    assert!(matches!(utf8, Err(ClasspathError::Decode { .. })));

    let latin = SourceRoot::read(
        &ClasspathEntry::source(tmp.path()).with_encoding(SourceEncoding::Latin1),
    )
    .unwrap();
    assert!(latin.files()[0].text.contains("café"));
}

#[test]
fn fingerprint_changes_when_sources_change() {
    let tmp = TempDir::new().unwrap();
    let entry = ClasspathEntry::source(tmp.path());
    std::fs::write(tmp.path().join("A.java"), "class A {}").unwrap();
    let before = entry.fingerprint().unwrap();
    std::fs::write(tmp.path().join("B.java"), "class B {}").unwrap();
    let after = entry.fingerprint().unwrap();
    assert_ne!(before, after);
}
