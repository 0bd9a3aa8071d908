use jmodel_classpath::{ClasspathEntry, EntryMode, SourceEncoding};
use jmodel_config::{ConfigError, ModelConfig};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn classpath_entries_resolve_against_config_dir() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jmodel.toml");
    std::fs::write(
        &path,
        r#"
builtin_jdk = false

[[classpath]]
path = "src"
mode = "source"
encoding = "ISO-8859-1"

[[classpath]]
path = "/opt/libs/dep.jar"
mode = "binary"

[logging]
level = "debug"
json = true
"#,
    )
    .unwrap();

    let config = ModelConfig::load_from_path(&path).unwrap();
    assert!(!config.builtin_jdk);
    assert_eq!(
        config.classpath,
        vec![
            ClasspathEntry::source(dir.path().join("src")).with_encoding(SourceEncoding::Latin1),
            ClasspathEntry::binary("/opt/libs/dep.jar"),
        ]
    );
    assert_eq!(config.classpath[1].mode, EntryMode::Binary);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn unknown_keys_are_reported() {
    let (config, unknown) =
        ModelConfig::load_from_str_with_warnings("colour = \"blue\"\nbuiltin_jdk = false\n")
            .unwrap();
    assert!(!config.builtin_jdk);
    assert_eq!(unknown.len(), 1);
    assert!(unknown[0].ends_with("colour"), "{unknown:?}");
}

#[test]
fn invalid_values_are_toml_errors() {
    let err = ModelConfig::load_from_str_with_warnings(
        "[[classpath]]\npath = \"x\"\nmode = \"source\"\nencoding = \"UTF-16\"\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Toml(message) if message.contains("UTF-16")));

    let err = ModelConfig::load_from_path("/definitely/not/here/jmodel.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
