use jmodel_syntax::{line_col, parse, Expr};

#[test]
fn missing_annotation_value_is_reported() {
    let text = "@Retention() @SuppressWarnings(value = ) class A { @Deprecated(since = ) int x; }";
    let parse = parse(text);
    let messages: Vec<_> = parse.errors().iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["expected annotation value", "expected annotation value"]);

    let decl = &parse.compilation_unit().types[0];
    assert_eq!(decl.name, "A");
    let suppress = &decl.modifiers.annotations[1];
    assert!(matches!(suppress.elements[0].value, Expr::Missing(_)));
    assert_eq!(decl.fields().count(), 1);
}

#[test]
fn broken_members_do_not_hide_later_declarations() {
    let text = "class A {\n  int = 3;\n  void ok() {}\n  String s = ;\n}\nclass B {}\n";
    let parse = parse(text);
    assert!(!parse.errors().is_empty());

    let unit = parse.compilation_unit();
    let names: Vec<_> = unit.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    let a = &unit.types[0];
    assert_eq!(a.methods().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["ok"]);
    let s = a.fields().next().expect("field s");
    assert!(matches!(s.declarators[0].initializer, Some(Expr::Missing(_))));

    let first = &parse.errors()[0];
    assert_eq!(line_col(text, first.range.start), (1, 6));
}

#[test]
fn unterminated_input_still_yields_declarations() {
    let parse = parse("package p; class A { void f() { ");
    let unit = parse.compilation_unit();
    assert_eq!(unit.package.as_ref().map(|p| p.name.as_str()), Some("p"));
    assert_eq!(unit.types[0].name, "A");
    assert!(!parse.errors().is_empty());
}

#[test]
fn stray_tokens_at_top_level() {
    let parse = parse("int x; class A {}");
    assert_eq!(parse.compilation_unit().types.len(), 1);
    assert_eq!(
        parse.errors()[0].message,
        "expected class, interface, enum, or record"
    );
}
