use jmodel_model::{ModelError, Value};
use pretty_assertions::assert_eq;

use super::source_env;

const NAMES: &str = r#"package e;

public @interface Names {
    String[] value();
}
"#;

const BROKEN: &str = r#"package e;

@Names(null)
public class Broken {
    public static final int OK = 40 + 2;

    @Names({"a", Missing.B})
    public String name() { return null; }

    public Unknown thing;

    @Names()
    public void bare() {}
}
"#;

fn env() -> jmodel_model::LookupEnvironment {
    source_env(&[("e/Names.java", NAMES), ("e/Broken.java", BROKEN)])
}

#[test]
fn null_array_value_reads_as_empty() {
    let env = env();
    let broken = env.find_type("e.Broken").unwrap();
    let names = broken.annotation("Names").unwrap();
    assert_eq!(names.value("value").unwrap().value(), &Value::Array(Vec::new()));
}

#[test]
fn unknown_elements_stay_in_place() {
    let env = env();
    let broken = env.find_type("e.Broken").unwrap();
    let name = broken.methods_named("name").remove(0);
    let value = name.annotation("Names").unwrap().value("value").unwrap().value().clone();
    assert_eq!(value, Value::Array(vec![Value::String("a".into()), Value::Unknown]));
    assert!(value.as_array()[1].is_unknown());
}

#[test]
fn errors_are_reported_per_type() {
    let env = env();
    let broken = env.find_type("e.Broken").unwrap();
    let messages: Vec<String> = env
        .compile_errors(&broken)
        .into_iter()
        .map(|error| error.message)
        .collect();

    assert!(
        messages.iter().any(|m| m == "value for `value` is not a constant expression"),
        "{messages:?}"
    );
    assert!(
        messages.iter().any(|m| m == "cannot resolve type `Unknown`"),
        "{messages:?}"
    );
    assert!(
        messages.iter().any(|m| m == "`@Names` is missing a value for `value`"),
        "{messages:?}"
    );

    let names = env.find_type("e.Names").unwrap();
    assert!(env.compile_errors(&names).is_empty());
}

#[test]
fn unrelated_members_stay_queryable() {
    let env = env();
    let broken = env.find_type("e.Broken").unwrap();

    let ok = broken.field("OK").unwrap();
    assert_eq!(ok.constant_value(), Some(Value::Int(42)));

    let name = broken.methods_named("name").remove(0);
    assert_eq!(
        name.return_type().unwrap().unwrap().qualified_name(),
        "java.lang.String"
    );

    let thing = broken.field("thing").unwrap();
    match thing.field_type() {
        Err(ModelError::UnresolvedType { name }) => assert_eq!(name, "Unknown"),
        other => panic!("expected an unresolved type, got {other:?}"),
    }
    assert_eq!(thing.to_string(), "public <unresolved Unknown> thing");
}

#[test]
fn missing_annotation_types_are_reported() {
    let env = source_env(&[(
        "e/Lost.java",
        "package e;\n@Gone(1)\npublic class Lost {}\n",
    )]);
    let lost = env.find_type("e.Lost").unwrap();
    let annotation = lost.annotation("Gone").unwrap();
    assert!(annotation.qualified_name().is_none());
    assert!(annotation.annotation_type().is_none());
    assert_eq!(annotation.to_string(), "@<unresolved Gone>(1)");

    let errors = env.compile_errors(&lost);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "cannot resolve annotation type `Gone`");
}
