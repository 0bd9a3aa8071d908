use std::io::Write;
use std::path::Path;

use jmodel_classfile::access::*;
use jmodel_classfile::{ClassFile, ClassMember};
use jmodel_classpath::{BinaryRoot, ClasspathEntry, ClasspathError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn class_bytes(internal_name: &str, method: &str) -> Vec<u8> {
    ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: internal_name.to_string(),
        super_class: Some("java/lang/Object".to_string()),
        methods: vec![ClassMember {
            access_flags: ACC_PUBLIC,
            name: method.to_string(),
            descriptor: "()V".to_string(),
            ..ClassMember::default()
        }],
        ..ClassFile::default()
    }
    .to_bytes()
}

fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut jar = zip::ZipWriter::new(file);
    for (name, bytes) in entries {
        jar.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        jar.write_all(bytes).unwrap();
    }
    jar.finish().unwrap();
}

#[test]
fn indexes_class_directory() {
    let tmp = TempDir::new().unwrap();
    let pkg = tmp.path().join("com/example");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("Foo.class"), class_bytes("com/example/Foo", "run")).unwrap();
    std::fs::write(
        pkg.join("Foo$Inner.class"),
        class_bytes("com/example/Foo$Inner", "go"),
    )
    .unwrap();
    std::fs::write(
        pkg.join("package-info.class"),
        class_bytes("com/example/package-info", "x"),
    )
    .unwrap();

    let root = BinaryRoot::index(&ClasspathEntry::binary(tmp.path())).unwrap();
    assert_eq!(
        root.binary_names(),
        vec!["com.example.Foo", "com.example.Foo$Inner"]
    );
    assert_eq!(root.get("com.example.Foo").unwrap().methods[0].name, "run");
    assert!(root.is_up_to_date());
}

#[test]
fn multi_release_jar_prefers_base_then_highest_version() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("mr.jar");
    write_jar(
        &jar,
        &[
            (
                "META-INF/MANIFEST.MF",
                b"Manifest-Version: 1.0\nMulti-Release: true\n".to_vec(),
            ),
            ("com/example/Base.class", class_bytes("com/example/Base", "base")),
            (
                "META-INF/versions/11/com/example/Base.class",
                class_bytes("com/example/Base", "v11"),
            ),
            (
                "META-INF/versions/11/com/example/Only.class",
                class_bytes("com/example/Only", "v11"),
            ),
            (
                "META-INF/versions/17/com/example/Only.class",
                class_bytes("com/example/Only", "v17"),
            ),
        ],
    );

    let root = BinaryRoot::index(&ClasspathEntry::binary(&jar)).unwrap();
    assert_eq!(root.get("com.example.Base").unwrap().methods[0].name, "base");
    assert_eq!(root.get("com.example.Only").unwrap().methods[0].name, "v17");
}

#[test]
fn versions_directory_ignored_without_manifest_flag() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("plain.jar");
    write_jar(
        &jar,
        &[(
            "META-INF/versions/11/com/example/Only.class",
            class_bytes("com/example/Only", "v11"),
        )],
    );

    let root = BinaryRoot::index(&ClasspathEntry::binary(&jar)).unwrap();
    assert!(root.is_empty());
}

#[test]
fn missing_entry_and_corrupt_class_are_errors() {
    let tmp = TempDir::new().unwrap();
    let missing = BinaryRoot::index(&ClasspathEntry::binary(tmp.path().join("nope.jar")));
    assert!(matches!(missing, Err(ClasspathError::MissingEntry(_))));

    std::fs::write(tmp.path().join("Broken.class"), b"not a class").unwrap();
    let broken = BinaryRoot::index(&ClasspathEntry::binary(tmp.path()));
    assert!(matches!(broken, Err(ClasspathError::ClassFile { .. })));
}

#[test]
fn in_memory_root_is_never_stale() {
    let bytes = class_bytes("p/Mem", "m");
    let root = BinaryRoot::from_class_files(
        ClasspathEntry::binary("<memory>"),
        [bytes.as_slice()],
    )
    .unwrap();
    assert!(root.contains("p.Mem"));
    assert_eq!(root.fingerprint(), None);
    assert!(root.is_up_to_date());
}
