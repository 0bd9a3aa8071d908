use jmodel_model::{LookupEnvironment, TypeKind, Value};
use pretty_assertions::assert_eq;

use super::source_env;

const INFO: &str = r#"package a;

import java.lang.annotation.*;

@Retention(RetentionPolicy.RUNTIME)
@Target({ElementType.TYPE, ElementType.METHOD})
public @interface Info {
    String name();
    int priority() default 5;
    String[] tags() default {};
    Class<?> type() default Object.class;
    byte level() default 1;
    long mask() default 1L << 40;
    char mark() default 'x';
}
"#;

const TAGS: &str = r#"package a;

public @interface Tags {
    String[] value();
}
"#;

const OUTER: &str = r#"package a;

public @interface Outer {
    Info inner();
}
"#;

const SUBJECT: &str = r#"package a;

@Info(name = "x")
@Tags("solo")
public class Subject {
    @Info(name = "m", priority = 1 + 2, tags = {"a", "b"})
    public void run() {}

    @Outer(inner = @Info(name = "n"))
    public int count;
}
"#;

fn env() -> LookupEnvironment {
    source_env(&[
        ("a/Info.java", INFO),
        ("a/Tags.java", TAGS),
        ("a/Outer.java", OUTER),
        ("a/Subject.java", SUBJECT),
    ])
}

#[test]
fn explicit_values_come_before_defaults() {
    let env = env();
    let subject = env.find_type("a.Subject").unwrap();
    let info = subject.annotation("Info").unwrap();

    let names: Vec<&str> = info.values().iter().map(|v| v.name()).collect();
    assert_eq!(
        names,
        vec!["name", "priority", "tags", "type", "level", "mask", "mark"]
    );
    let defaults: Vec<bool> = info.values().iter().map(|v| v.is_default()).collect();
    assert_eq!(defaults, vec![false, true, true, true, true, true, true]);

    assert_eq!(info.value("name").unwrap().value(), &Value::String("x".into()));
    assert_eq!(info.value("priority").unwrap().value(), &Value::Int(5));
    assert!(info.value("tags").unwrap().value().as_array().is_empty());
    assert_eq!(
        info.value("type").unwrap().value().as_type().unwrap().qualified_name(),
        "java.lang.Object"
    );
    assert!(info.value("missing").is_none());
}

#[test]
fn defaults_are_converted_to_the_element_type() {
    let env = env();
    let info = env.find_type("a.Info").unwrap();
    assert_eq!(info.kind(), TypeKind::Annotation);

    let level = info.methods_named("level").remove(0);
    assert_eq!(level.default_value(), Some(&Value::Byte(1)));
    let mask = info.methods_named("mask").remove(0);
    assert_eq!(mask.default_value(), Some(&Value::Long(1 << 40)));
    let mark = info.methods_named("mark").remove(0);
    assert_eq!(mark.default_value(), Some(&Value::Char('x')));
    assert_eq!(info.methods_named("name").remove(0).default_value(), None);
}

#[test]
fn defaults_match_the_element_declarations() {
    let env = env();
    let subject = env.find_type("a.Subject").unwrap();
    let usage = subject.annotation("a.Info").unwrap();
    let declaration = usage.annotation_type().unwrap();
    assert_eq!(declaration, env.find_type("a.Info").unwrap());
    assert_eq!(usage.qualified_name().as_deref(), Some("a.Info"));

    for value in usage.values().iter().filter(|v| v.is_default()) {
        let element = declaration.methods_named(value.name()).remove(0);
        assert_eq!(element.default_value(), Some(value.value()), "{}", value.name());
    }
}

#[test]
fn element_values_are_evaluated() {
    let env = env();
    let run = env
        .find_type("a.Subject")
        .unwrap()
        .methods_named("run")
        .remove(0);
    let info = run.annotation("Info").unwrap();
    assert_eq!(info.value("priority").unwrap().value(), &Value::Int(3));
    assert!(!info.value("priority").unwrap().is_default());

    let tags: Vec<&str> = info
        .value("tags")
        .unwrap()
        .value()
        .as_array()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(tags, vec!["a", "b"]);
}

#[test]
fn single_value_is_coerced_to_an_array() {
    let env = env();
    let subject = env.find_type("a.Subject").unwrap();
    let tags = subject.annotation("Tags").unwrap();
    assert_eq!(
        tags.value("value").unwrap().value(),
        &Value::Array(vec![Value::String("solo".into())])
    );
    assert_eq!(tags.to_string(), "@a.Tags({\"solo\"})");
}

#[test]
fn enum_values_resolve_to_their_constants() {
    let env = env();
    let info = env.find_type("a.Info").unwrap();

    let retention = info.annotation("Retention").unwrap();
    assert_eq!(
        retention.qualified_name().as_deref(),
        Some("java.lang.annotation.Retention")
    );
    let policy = retention.value("value").unwrap().value().as_enum().unwrap();
    assert_eq!(policy.name(), "RUNTIME");
    assert_eq!(policy.type_name(), "java.lang.annotation.RetentionPolicy");
    assert_eq!(policy.enum_type().unwrap().kind(), TypeKind::Enum);
    let field = policy.field().unwrap();
    assert!(field.is_enum_constant());
    assert_eq!(field.field_type().unwrap(), policy.enum_type().unwrap());

    let target = info.annotation("Target").unwrap();
    let kinds: Vec<&str> = target
        .value("value")
        .unwrap()
        .value()
        .as_array()
        .iter()
        .filter_map(Value::as_enum)
        .map(|constant| constant.name())
        .collect();
    assert_eq!(kinds, vec!["TYPE", "METHOD"]);
}

#[test]
fn nested_annotations_carry_their_own_defaults() {
    let env = env();
    let count = env.find_type("a.Subject").unwrap().field("count").unwrap();
    let outer = count.annotation("Outer").unwrap();
    let inner = outer
        .value("inner")
        .unwrap()
        .value()
        .as_annotation()
        .unwrap()
        .clone();
    assert_eq!(inner.name(), "Info");
    assert_eq!(inner.value("name").unwrap().value().as_str(), Some("n"));
    assert_eq!(inner.value("priority").unwrap().value(), &Value::Int(5));
    assert!(inner.value("priority").unwrap().is_default());
}

#[test]
fn annotation_display_lists_written_values() {
    let env = env();
    let subject = env.find_type("a.Subject").unwrap();
    assert_eq!(
        subject.annotation("Info").unwrap().to_string(),
        "@a.Info(name = \"x\")"
    );
    let run = subject.methods_named("run").remove(0);
    assert_eq!(
        run.annotation("Info").unwrap().to_string(),
        "@a.Info(name = \"m\", priority = 3, tags = {\"a\", \"b\"})"
    );
}
