use jmodel_syntax::{parse, MemberDecl, Modifier, TypeDeclKind, TypeRefKind};
use pretty_assertions::assert_eq;

const SOURCE: &str = r#"
@Deprecated
package com.example;

import java.util.List;
import java.util.*;
import static java.lang.Math.max;

/** Docs. */
public abstract class Shape<T extends Comparable<T> & Cloneable> extends Base implements Runnable, java.io.Serializable {
    public static final int SIDES = 4, CORNERS = SIDES * 2;
    private List<Map<String, List<T>>> nested;
    int legacy[];

    static { System.out.println("init"); }

    protected Shape(int x, String... rest) throws java.io.IOException {
        super();
    }

    public abstract <R> R accept(Visitor<? super T, R> visitor);

    @Override
    public void run() {
        if (a > b) { return; }
    }

    static class Inner {}
    sealed interface Node permits Leaf {}
    non-sealed class Leaf implements Node {}
}
"#;

#[test]
fn parses_package_imports_and_header() {
    let parse = parse(SOURCE);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let unit = parse.compilation_unit();

    let package = unit.package.as_ref().expect("package");
    assert_eq!(package.name, "com.example");
    assert_eq!(package.annotations[0].name, "Deprecated");

    let imports: Vec<_> = unit
        .imports
        .iter()
        .map(|import| (import.path.as_str(), import.is_static, import.is_star))
        .collect();
    assert_eq!(
        imports,
        vec![
            ("java.util.List", false, false),
            ("java.util", false, true),
            ("java.lang.Math.max", true, false),
        ]
    );

    let shape = &unit.types[0];
    assert_eq!(shape.kind, TypeDeclKind::Class);
    assert_eq!(shape.name, "Shape");
    assert!(shape.modifiers.has(Modifier::Public));
    assert!(shape.modifiers.has(Modifier::Abstract));
    assert_eq!(shape.type_params.len(), 1);
    assert_eq!(shape.type_params[0].bounds.len(), 2);
    assert_eq!(shape.extends[0].erased_text(), "Base");
    assert_eq!(shape.implements[1].erased_text(), "java.io.Serializable");
}

#[test]
fn parses_members() {
    let parse = parse(SOURCE);
    let shape = &parse.compilation_unit().types[0];

    let fields: Vec<_> = shape
        .fields()
        .flat_map(|field| field.declarators.iter().map(|d| d.name.as_str()))
        .collect();
    assert_eq!(fields, vec!["SIDES", "CORNERS", "nested", "legacy"]);

    let legacy = shape.fields().nth(2).unwrap();
    assert_eq!(legacy.declarators[0].dims, 1);

    let nested = shape.fields().nth(1).unwrap();
    let TypeRefKind::Named(segments) = &nested.ty.kind else {
        panic!("expected named type");
    };
    assert_eq!(segments[0].name, "List");
    assert_eq!(segments[0].args[0].erased_text(), "Map");

    let methods: Vec<_> = shape.methods().map(|m| (m.name.as_str(), m.is_constructor)).collect();
    assert_eq!(
        methods,
        vec![("Shape", true), ("accept", false), ("run", false)]
    );

    let ctor = shape.methods().next().unwrap();
    assert_eq!(ctor.params.len(), 2);
    assert!(ctor.params[1].is_varargs);
    assert_eq!(ctor.throws[0].erased_text(), "java.io.IOException");

    let accept = shape.methods().nth(1).unwrap();
    assert_eq!(accept.type_params[0].name, "R");
    assert!(accept.body_range.is_none());

    let run = shape.methods().nth(2).unwrap();
    assert!(run.return_ty.is_none());
    assert_eq!(run.modifiers.annotations[0].name, "Override");
    assert!(run.body_range.is_some());

    assert!(shape
        .members
        .iter()
        .any(|m| matches!(m, MemberDecl::Initializer(init) if init.is_static)));

    let nested_types: Vec<_> = shape
        .member_types()
        .map(|t| (t.name.as_str(), t.kind))
        .collect();
    assert_eq!(
        nested_types,
        vec![
            ("Inner", TypeDeclKind::Class),
            ("Node", TypeDeclKind::Interface),
            ("Leaf", TypeDeclKind::Class),
        ]
    );
    let node = shape.member_types().nth(1).unwrap();
    assert!(node.modifiers.has(Modifier::Sealed));
    assert_eq!(node.permits[0].erased_text(), "Leaf");
    let leaf = shape.member_types().nth(2).unwrap();
    assert!(leaf.modifiers.has(Modifier::NonSealed));
}

#[test]
fn parses_enum_annotation_and_record() {
    let text = r#"
enum Color implements Named {
    RED("r"), GREEN("g") { @Override public String code() { return "x"; } }, BLUE;
    private final String code;
    Color() { this(null); }
    Color(String code) { this.code = code; }
}

@interface Range {
    int min() default 0;
    int max() default Integer.MAX_VALUE;
    String[] tags() default {};
}

record Point<T>(int x, T y) implements Comparable<Point<T>> {
    Point {
        if (x < 0) throw new IllegalArgumentException();
    }
    static Point<String> origin() { return null; }
}
"#;
    let parse = parse(text);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let unit = parse.compilation_unit();

    let color = &unit.types[0];
    assert_eq!(color.kind, TypeDeclKind::Enum);
    let constants: Vec<_> = color
        .enum_constants
        .iter()
        .map(|c| (c.name.as_str(), c.args.len(), c.has_body))
        .collect();
    assert_eq!(
        constants,
        vec![("RED", 1, false), ("GREEN", 1, true), ("BLUE", 0, false)]
    );
    assert_eq!(color.methods().filter(|m| m.is_constructor).count(), 2);

    let range = &unit.types[1];
    assert_eq!(range.kind, TypeDeclKind::Annotation);
    let defaults: Vec<_> = range
        .methods()
        .map(|m| m.default_value.is_some())
        .collect();
    assert_eq!(defaults, vec![true, true, true]);

    let point = &unit.types[2];
    assert_eq!(point.kind, TypeDeclKind::Record);
    let components: Vec<_> = point
        .record_components
        .iter()
        .map(|c| (c.name.as_str(), c.ty.erased_text()))
        .collect();
    assert_eq!(
        components,
        vec![("x", "int".to_string()), ("y", "T".to_string())]
    );
    let methods: Vec<_> = point.methods().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["origin"]);
}

#[test]
fn annotation_element_forms() {
    let text = r#"
@Target({ElementType.TYPE, ElementType.METHOD})
@Retention(RetentionPolicy.RUNTIME)
@SuppressWarnings(value = "unchecked", other = @Nested(1))
@Marker
class A {}
"#;
    let parse = parse(text);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let annotations = &parse.compilation_unit().types[0].modifiers.annotations;
    let names: Vec<_> = annotations.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Target", "Retention", "SuppressWarnings", "Marker"]);

    let target = &annotations[0].elements[0];
    assert_eq!(target.name, "value");
    assert!(matches!(&target.value, jmodel_syntax::Expr::ArrayInit(array) if array.elements.len() == 2));

    let suppress = &annotations[2].elements;
    assert_eq!(suppress[0].name, "value");
    assert_eq!(suppress[1].name, "other");
    assert!(matches!(suppress[1].value, jmodel_syntax::Expr::Annotation(_)));

    assert!(annotations[3].elements.is_empty());
}
