use std::path::PathBuf;

use jmodel_model::{LookupEnvironment, Printer};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const A: &str = "package r;\n\npublic class A {\n    public int a;\n}\n";
const A_WITH_B: &str = "package r;\n\npublic class A {\n    public int a;\n    public int b;\n}\n";

struct Project {
    _tmp: TempDir,
    pkg: PathBuf,
    env: LookupEnvironment,
}

fn project() -> Project {
    let tmp = TempDir::new().unwrap();
    let pkg = tmp.path().join("r");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("A.java"), A).unwrap();
    std::fs::write(pkg.join("B.java"), "package r;\n\npublic class B {}\n").unwrap();
    let env = LookupEnvironment::builder()
        .source_root(tmp.path())
        .build()
        .unwrap();
    Project { _tmp: tmp, pkg, env }
}

fn field_names(env: &LookupEnvironment, name: &str) -> Vec<String> {
    env.find_type(name)
        .unwrap()
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect()
}

#[test]
fn replacement_text_applies_at_reload() {
    let Project { _tmp, pkg, env } = project();
    let before = env.find_type("r.A").unwrap();
    let printed = Printer::new().print_type(&before);

    env.set_source_text(pkg.join("A.java"), A_WITH_B);
    assert_eq!(field_names(&env, "r.A"), vec!["a"]);
    assert!(!before.is_stale());

    env.reload().unwrap();
    assert_eq!(env.generation(), 1);
    assert_eq!(field_names(&env, "r.A"), vec!["a", "b"]);

    let after = env.find_type("r.A").unwrap();
    assert_eq!(before, after);
    assert!(before.is_stale());
    assert!(!after.is_stale());

    // The old node keeps answering from the generation it was built in.
    assert_eq!(before.fields().len(), 1);
    assert_eq!(Printer::new().print_type(&before), printed);
    assert!(before.fields()[0].is_stale());
}

#[test]
fn removed_files_disappear_until_reverted() {
    let Project { _tmp, pkg, env } = project();
    assert!(env.exists("r.B"));

    let path = pkg.join("B.java");
    env.remove_source_text(&path);
    env.reload().unwrap();
    assert!(env.find_type("r.B").is_none());
    assert!(env.compilation_unit(&path).is_none());

    env.revert_source_text(&path);
    env.reload().unwrap();
    assert!(env.find_type("r.B").is_some());
}

#[test]
fn disk_changes_are_picked_up() {
    let Project { _tmp, pkg, env } = project();
    std::fs::write(pkg.join("A.java"), A_WITH_B).unwrap();
    std::fs::write(
        pkg.join("C.java"),
        "package r;\n\npublic interface C {}\n",
    )
    .unwrap();

    assert!(!env.exists("r.C"));
    env.reload().unwrap();
    assert_eq!(field_names(&env, "r.A"), vec!["a", "b"]);
    assert!(env.find_type("r.C").unwrap().is_interface());
    assert_eq!(env.type_names(), vec!["r.A", "r.B", "r.C"]);
}

#[test]
fn reload_without_changes_keeps_output() {
    let Project { _tmp, env, .. } = project();
    let unit_text = |env: &LookupEnvironment| {
        env.compilation_units()
            .iter()
            .map(|unit| Printer::new().print_unit(unit))
            .collect::<Vec<_>>()
    };
    let first = unit_text(&env);
    env.reload().unwrap();
    env.reload().unwrap();
    assert_eq!(env.generation(), 2);
    assert_eq!(unit_text(&env), first);
}

#[test]
fn in_memory_sources_can_be_added_later() {
    let env = LookupEnvironment::builder().build().unwrap();
    assert!(!env.exists("m.Late"));
    env.set_source_text("/mem/m/Late.java", "package m;\npublic record Late(int when) {}\n");
    env.reload().unwrap();

    let late = env.find_type("m.Late").unwrap();
    assert_eq!(late.field("when").unwrap().field_type().unwrap().name(), "int");
    let accessors = late.methods_named("when");
    assert_eq!(accessors.len(), 1);
    assert_eq!(late.constructors()[0].parameters()[0].name(), "when");
}

#[test]
fn missing_source_root_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = LookupEnvironment::builder()
        .source_root(tmp.path().join("nope"))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err}");
}
