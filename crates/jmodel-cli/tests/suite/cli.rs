use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use jmodel_classfile::access::*;
use jmodel_classfile::{ClassFile, ClassMember, ConstValue};
use predicates::prelude::*;

const GREETER: &str = r#"package p;

public class Greeter {
    public static final int TIMES = 2 * 3;

    public String greet(String name) { return "hi " + name; }
}
"#;

const OUTER: &str = r#"package p;

interface Outer {
    enum Inner { A, B }
}
"#;

fn jmodel(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jmodel"));
    cmd.current_dir(dir.path())
        .env_remove("JMODEL_CONFIG_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("src").create_dir_all().unwrap();
    for (path, text) in files {
        temp.child("src").child(path).write_str(text).unwrap();
    }
    temp
}

fn tool_class() -> Vec<u8> {
    ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/Tool".into(),
        super_class: Some("java/lang/Object".into()),
        fields: vec![ClassMember {
            access_flags: ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            name: "LIMIT".into(),
            descriptor: "J".into(),
            constant_value: Some(ConstValue::Long(7)),
            ..ClassMember::default()
        }],
        methods: vec![ClassMember {
            access_flags: ACC_PUBLIC,
            name: "size".into(),
            descriptor: "()I".into(),
            ..ClassMember::default()
        }],
        ..ClassFile::default()
    }
    .to_bytes()
}

#[test]
fn help_mentions_core_commands() {
    let temp = TempDir::new().unwrap();
    jmodel(&temp).arg("--help").assert().success().stdout(
        predicate::str::contains("show")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("eval"))
            .and(predicate::str::contains("--classpath")),
    );
}

#[test]
fn show_prints_the_outline() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    jmodel(&temp)
        .args(["--source", "src", "show", "p.Greeter"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("public class p.Greeter {\n")
                .and(predicate::str::contains("    public static final int TIMES = 6;\n"))
                .and(predicate::str::contains(
                    "    public java.lang.String greet(java.lang.String name);\n",
                )),
        );
}

#[test]
fn show_headers_only_skips_members() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    jmodel(&temp)
        .args(["show", "p.Greeter", "--headers-only", "--source", "src"])
        .assert()
        .success()
        .stdout("public class p.Greeter\n");
}

#[test]
fn show_json_reports_members() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    let output = jmodel(&temp)
        .args(["--source", "src", "--json", "show", "p.Greeter"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["name"], "p.Greeter");
    assert_eq!(v["kind"], "class");
    assert_eq!(v["origin"], "source");
    assert_eq!(v["modifiers"], serde_json::json!(["public"]));
    assert_eq!(v["super"], "java.lang.Object");
    assert_eq!(
        v["fields"],
        serde_json::json!(["public static final int TIMES = 6"])
    );
    assert_eq!(
        v["methods"],
        serde_json::json!([
            "public java.lang.String greet(java.lang.String name)",
            "public Greeter()",
        ])
    );
}

#[test]
fn show_unknown_type_fails() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    jmodel(&temp)
        .args(["--source", "src", "show", "p.Nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("type `p.Nope` not found"));
}

#[test]
fn list_includes_nested_types() {
    let temp = project(&[("p/Greeter.java", GREETER), ("p/Outer.java", OUTER)]);
    jmodel(&temp)
        .args(["--source", "src", "list"])
        .assert()
        .success()
        .stdout("p.Greeter\np.Outer\np.Outer.Inner\n");
}

#[test]
fn list_json_reports_kinds() {
    let temp = project(&[("p/Outer.java", OUTER)]);
    let output = jmodel(&temp)
        .args(["--source", "src", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        v,
        serde_json::json!([
            { "name": "p.Outer", "kind": "interface" },
            { "name": "p.Outer.Inner", "kind": "enum" },
        ])
    );
}

#[test]
fn check_passes_on_clean_sources() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    jmodel(&temp)
        .args(["--source", "src", "check"])
        .assert()
        .success()
        .stdout("summary: 0 errors in 1 files\n");
}

#[test]
fn check_reports_unresolved_types_with_positions() {
    let temp = project(&[(
        "p/Bad.java",
        "package p;\n\nclass Bad {\n    Missing thing;\n}\n",
    )]);
    jmodel(&temp)
        .args(["--source", "src", "check"])
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("Bad.java:4:")
                .and(predicate::str::contains("error: cannot resolve type `Missing`"))
                .and(predicate::str::contains("summary: 1 errors in 1 files")),
        );
}

#[test]
fn check_json_includes_syntax_errors() {
    let temp = project(&[
        ("p/Greeter.java", GREETER),
        ("Broken.java", "class Broken { int x = ; }"),
    ]);
    let output = jmodel(&temp)
        .args(["--source", "src", "--json", "check"])
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(1),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["summary"]["files"], 2);
    assert!(v["summary"]["errors"].as_u64().unwrap() > 0, "{v:#}");
    assert!(
        v["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .all(|d| d["file"].as_str().unwrap().ends_with("Broken.java") && d["line"] == 1),
        "{v:#}"
    );
}

#[test]
fn eval_folds_constant_expressions() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    jmodel(&temp)
        .args(["eval", "1 + 2"])
        .assert()
        .success()
        .stdout("3\n");
    jmodel(&temp)
        .args(["--source", "src", "eval", "TIMES * 7", "--context", "p.Greeter"])
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn eval_of_non_constant_exits_nonzero() {
    let temp = TempDir::new().unwrap();
    let output = jmodel(&temp)
        .args(["--json", "eval", "someCall()"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["expression"], "someCall()");
    assert!(v["value"].is_null());
}

#[test]
fn binary_classpath_entries_are_shown() {
    let temp = TempDir::new().unwrap();
    temp.child("classes/q/Tool.class")
        .write_binary(&tool_class())
        .unwrap();

    let output = jmodel(&temp)
        .args(["--classpath", "classes", "--json", "show", "q.Tool"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["origin"], "binary");
    assert_eq!(
        v["fields"],
        serde_json::json!(["public static final long LIMIT = 7L"])
    );
    assert_eq!(v["methods"], serde_json::json!(["public int size()"]));
}

#[test]
fn discovered_config_supplies_the_classpath() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    temp.child("jmodel.toml")
        .write_str("[[classpath]]\npath = \"src\"\nmode = \"source\"\n")
        .unwrap();

    jmodel(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout("p.Greeter\n");
}

#[test]
fn explicit_config_resolves_paths_against_its_directory() {
    let temp = project(&[("p/Greeter.java", GREETER)]);
    temp.child("conf/model.toml")
        .write_str("[[classpath]]\npath = \"../src\"\nmode = \"source\"\n\n[logging]\nlevel = \"warn\"\n")
        .unwrap();

    jmodel(&temp)
        .args(["--config", "conf/model.toml", "list"])
        .assert()
        .success()
        .stdout("p.Greeter\n");
}

#[test]
fn missing_source_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    jmodel(&temp)
        .args(["--source", "nowhere", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}
