use jmodel_classfile::access::*;
use jmodel_classfile::{Annotation as ClassAnnotation, ClassFile, ClassMember, ConstValue, ElementValue, InnerClassInfo};
use jmodel_model::{LookupEnvironment, MemberKey, Origin, Printer, Type, TypeKind, Value};
use pretty_assertions::assert_eq;

use super::{source_env, type_names};

const POINT: &str = r#"package q;

public class Point {
    public static final int ORIGIN = 0;
    public static final String LABEL = "pt";
    private final int x;

    public Point(int x) { this.x = x; }

    @Deprecated
    public int getX() { return x; }

    public static class Inner {
    }
}
"#;

fn member(access_flags: u16, name: &str, descriptor: &str) -> ClassMember {
    ClassMember {
        access_flags,
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        ..ClassMember::default()
    }
}

fn inner_info() -> InnerClassInfo {
    InnerClassInfo {
        inner_class: "q/Point$Inner".into(),
        outer_class: Some("q/Point".into()),
        inner_name: Some("Inner".into()),
        access_flags: ACC_PUBLIC | ACC_STATIC,
    }
}

fn point_class() -> Vec<u8> {
    ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/Point".into(),
        super_class: Some("java/lang/Object".into()),
        fields: vec![
            ClassMember {
                constant_value: Some(ConstValue::Int(0)),
                ..member(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "ORIGIN", "I")
            },
            ClassMember {
                constant_value: Some(ConstValue::String("pt".into())),
                ..member(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "LABEL", "Ljava/lang/String;")
            },
            member(ACC_PRIVATE | ACC_FINAL, "x", "I"),
        ],
        methods: vec![
            ClassMember {
                parameter_names: Some(vec![Some("x".into())]),
                ..member(ACC_PUBLIC, "<init>", "(I)V")
            },
            ClassMember {
                annotations: vec![ClassAnnotation {
                    type_descriptor: "Ljava/lang/Deprecated;".into(),
                    elements: Vec::new(),
                    visible: true,
                }],
                ..member(ACC_PUBLIC, "getX", "()I")
            },
            member(ACC_PRIVATE | ACC_STATIC | ACC_SYNTHETIC, "lambda$new$0", "()V"),
            member(ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC, "getX", "()Ljava/lang/Object;"),
            member(ACC_STATIC, "<clinit>", "()V"),
        ],
        inner_classes: vec![inner_info()],
        ..ClassFile::default()
    }
    .to_bytes()
}

fn inner_class() -> Vec<u8> {
    ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/Point$Inner".into(),
        super_class: Some("java/lang/Object".into()),
        methods: vec![member(ACC_PUBLIC, "<init>", "()V")],
        inner_classes: vec![inner_info()],
        ..ClassFile::default()
    }
    .to_bytes()
}

fn binary_env() -> LookupEnvironment {
    LookupEnvironment::builder()
        .class_file(point_class())
        .class_file(inner_class())
        .build()
        .unwrap()
}

#[test]
fn binary_and_source_read_alike() {
    let binary = binary_env().find_type("q.Point").unwrap();
    let source = source_env(&[("q/Point.java", POINT)])
        .find_type("q.Point")
        .unwrap();

    assert_eq!(binary.origin(), Some(Origin::Binary));
    assert_eq!(source.origin(), Some(Origin::Source));
    assert!(!binary.is_declaration_driven());
    assert!(source.is_declaration_driven());
    assert_eq!(binary.key(), source.key());

    let printer = Printer::new();
    assert_eq!(printer.print_type(&binary), printer.print_type(&source));
}

#[test]
fn binary_outline() {
    let binary = binary_env().find_type("q.Point").unwrap();
    assert_eq!(
        Printer::new().print_type(&binary),
        r#"public class q.Point {
    public static final int ORIGIN = 0;
    public static final java.lang.String LABEL = "pt";
    private final int x;
    public Point(int x);
    @java.lang.Deprecated
    public int getX();
    public static class q.Point.Inner {
        public Inner();
    }
}
"#
    );
}

#[test]
fn compiler_generated_methods_are_hidden() {
    let binary = binary_env().find_type("q.Point").unwrap();
    let names: Vec<&str> = binary.methods().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["Point", "getX"]);
    assert_eq!(binary.constructors().len(), 1);
    assert_eq!(binary.methods_named("getX").len(), 1);
}

#[test]
fn member_keys_agree_across_origins() {
    let binary = binary_env().find_type("q.Point").unwrap();
    let source = source_env(&[("q/Point.java", POINT)])
        .find_type("q.Point")
        .unwrap();

    let binary_keys: Vec<_> = binary.methods().iter().map(|m| m.key()).collect();
    let source_keys: Vec<_> = source.methods().iter().map(|m| m.key()).collect();
    assert_eq!(binary_keys, source_keys);

    let binary_fields: Vec<_> = binary.fields().iter().map(|f| f.key()).collect();
    let source_fields: Vec<_> = source.fields().iter().map(|f| f.key()).collect();
    assert_eq!(binary_fields, source_fields);

    let ctor = &binary.constructors()[0];
    assert!(ctor.is_constructor());
    assert_eq!(ctor.return_type().unwrap(), None);
    assert_eq!(ctor.parameters()[0].name(), "x");
    assert_eq!(ctor.signature(), "(int)");
}

#[test]
fn nested_binary_types_link_both_ways() {
    let env = binary_env();
    let point = env.find_type("q.Point").unwrap();
    let inner = point.member_type("Inner").unwrap();
    assert_eq!(inner.binary_name(), "q.Point$Inner");
    assert_eq!(inner.qualified_name(), "q.Point.Inner");
    assert_eq!(inner.declaring_type().unwrap(), point);
    assert!(inner.modifiers().is_static());
    assert_eq!(env.find_type("q.Point.Inner").unwrap(), inner);
}

#[test]
fn unnamed_binary_parameters_are_positional() {
    let class = ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/Mover".into(),
        super_class: Some("java/lang/Object".into()),
        methods: vec![member(ACC_PUBLIC, "move", "(IJ)V")],
        ..ClassFile::default()
    };
    let env = LookupEnvironment::builder()
        .class_file(class.to_bytes())
        .build()
        .unwrap();
    let mover = env.find_type("q.Mover").unwrap();
    // Binary default constructors are real members; this class has none.
    assert!(mover.constructors().is_empty());

    let moves = mover.methods_named("move").remove(0);
    let names: Vec<&str> = moves.parameters().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["arg0", "arg1"]);
    assert_eq!(moves.to_string(), "public void move(int arg0, long arg1)");
    assert!(moves.return_type().unwrap().unwrap().is_void());
}

#[test]
fn binary_enums_and_annotation_defaults() {
    let mode = ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_FINAL | ACC_SUPER | ACC_ENUM,
        this_class: "q/Mode".into(),
        super_class: Some("java/lang/Enum".into()),
        signature: Some("Ljava/lang/Enum<Lq/Mode;>;".into()),
        fields: vec![
            member(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM, "FAST", "Lq/Mode;"),
            member(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM, "SLOW", "Lq/Mode;"),
        ],
        methods: vec![
            member(ACC_PUBLIC | ACC_STATIC, "values", "()[Lq/Mode;"),
            member(ACC_PUBLIC | ACC_STATIC, "valueOf", "(Ljava/lang/String;)Lq/Mode;"),
        ],
        ..ClassFile::default()
    };
    let level = ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION,
        this_class: "q/Level".into(),
        super_class: Some("java/lang/Object".into()),
        interfaces: vec!["java/lang/annotation/Annotation".into()],
        methods: vec![
            ClassMember {
                annotation_default: Some(ElementValue::Const(ConstValue::Int(3))),
                ..member(ACC_PUBLIC | ACC_ABSTRACT, "value", "()I")
            },
            ClassMember {
                annotation_default: Some(ElementValue::Enum {
                    type_descriptor: "Lq/Mode;".into(),
                    const_name: "SLOW".into(),
                }),
                ..member(ACC_PUBLIC | ACC_ABSTRACT, "mode", "()Lq/Mode;")
            },
        ],
        ..ClassFile::default()
    };
    let env = LookupEnvironment::builder()
        .class_file(mode.to_bytes())
        .class_file(level.to_bytes())
        .build()
        .unwrap();

    let mode = env.find_type("q.Mode").unwrap();
    assert_eq!(mode.kind(), TypeKind::Enum);
    assert!(mode.methods().is_empty());
    assert!(mode.fields().iter().all(|f| f.is_enum_constant()));
    assert_eq!(
        mode.super_class().unwrap().unwrap().to_string(),
        "java.lang.Enum<q.Mode>"
    );

    let level = env.find_type("q.Level").unwrap();
    assert_eq!(level.kind(), TypeKind::Annotation);
    let value = level.methods_named("value").remove(0);
    assert_eq!(value.default_value(), Some(&Value::Int(3)));
    let default_mode = level.methods_named("mode").remove(0);
    let constant = default_mode.default_value().unwrap().as_enum().unwrap();
    assert_eq!(constant.name(), "SLOW");
    assert_eq!(constant.field().unwrap().declaring_type(), mode);
}

const OUTER: &str = r#"package q;

public class O {
    public class In2 {
        public In2(int x) {}
    }
}
"#;

fn o_class() -> Vec<u8> {
    ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/O".into(),
        super_class: Some("java/lang/Object".into()),
        methods: vec![member(ACC_PUBLIC, "<init>", "()V")],
        inner_classes: vec![in2_info()],
        ..ClassFile::default()
    }
    .to_bytes()
}

fn in2_info() -> InnerClassInfo {
    InnerClassInfo {
        inner_class: "q/O$In2".into(),
        outer_class: Some("q/O".into()),
        inner_name: Some("In2".into()),
        access_flags: ACC_PUBLIC,
    }
}

fn in2_class(constructor: ClassMember) -> Vec<u8> {
    ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/O$In2".into(),
        super_class: Some("java/lang/Object".into()),
        fields: vec![member(ACC_FINAL | ACC_SYNTHETIC, "this$0", "Lq/O;")],
        methods: vec![constructor],
        inner_classes: vec![in2_info()],
        ..ClassFile::default()
    }
    .to_bytes()
}

#[test]
fn inner_class_constructors_hide_the_enclosing_instance() {
    let source = source_env(&[("q/O.java", OUTER)])
        .find_type("q.O.In2")
        .unwrap();
    let declared = source.constructors().remove(0);
    assert_eq!(declared.signature(), "(int)");

    // Without and with `MethodParameters`, where javac marks the outer instance mandated.
    let unnamed = member(ACC_PUBLIC, "<init>", "(Lq/O;I)V");
    let named = ClassMember {
        parameter_names: Some(vec![Some("this$0".into()), Some("x".into())]),
        parameter_flags: vec![ACC_FINAL | ACC_MANDATED, 0],
        ..member(ACC_PUBLIC, "<init>", "(Lq/O;I)V")
    };
    for (constructor, expected) in [(unnamed, "arg0"), (named, "x")] {
        let env = LookupEnvironment::builder()
            .class_file(o_class())
            .class_file(in2_class(constructor))
            .build()
            .unwrap();
        let binary = env.find_type("q.O.In2").unwrap();
        assert!(binary.fields().is_empty());

        let ctor = binary.constructors().remove(0);
        let names: Vec<&str> = ctor.parameters().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec![expected]);
        assert_eq!(ctor.signature(), "(int)");
        assert_eq!(ctor.key(), declared.key());
    }
}

#[test]
fn leading_parameters_need_the_synthetic_flag_when_named() {
    // A static nested class has no outer instance even if its first parameter is the outer type.
    let nested = ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/O$In2".into(),
        super_class: Some("java/lang/Object".into()),
        methods: vec![member(ACC_PUBLIC, "<init>", "(Lq/O;I)V")],
        inner_classes: vec![InnerClassInfo {
            access_flags: ACC_PUBLIC | ACC_STATIC,
            ..in2_info()
        }],
        ..ClassFile::default()
    };
    let explicit = ClassMember {
        parameter_names: Some(vec![Some("owner".into()), Some("x".into())]),
        parameter_flags: vec![0, 0],
        ..member(ACC_PUBLIC, "<init>", "(Lq/O;I)V")
    };
    for class in [nested.to_bytes(), in2_class(explicit)] {
        let env = LookupEnvironment::builder()
            .class_file(o_class())
            .class_file(class)
            .build()
            .unwrap();
        let ctor = env.find_type("q.O.In2").unwrap().constructors().remove(0);
        assert_eq!(ctor.signature(), "(q.O,int)");
    }
}

const SHAPES: &str = r#"package q;

public class Shapes {
    public class Plain {
    }

    enum Dir { UP, DOWN }

    public record Pair(int left, String right) {
    }
}
"#;

fn shapes_info(name: &str, access_flags: u16) -> InnerClassInfo {
    InnerClassInfo {
        inner_class: format!("q/Shapes${name}"),
        outer_class: Some("q/Shapes".into()),
        inner_name: Some(name.to_string()),
        access_flags,
    }
}

fn nested_shape(name: &str, access_flags: u16, build: ClassFile) -> Vec<u8> {
    ClassFile {
        major_version: 61,
        this_class: format!("q/Shapes${name}"),
        inner_classes: vec![shapes_info(name, access_flags)],
        ..build
    }
    .to_bytes()
}

/// The class files javac writes for `SHAPES`, implicit members included.
fn shapes_env() -> LookupEnvironment {
    let shapes = ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "q/Shapes".into(),
        super_class: Some("java/lang/Object".into()),
        methods: vec![member(ACC_PUBLIC, "<init>", "()V")],
        // Last-declared first, as javac lists them.
        inner_classes: vec![
            shapes_info("Pair", ACC_PUBLIC | ACC_STATIC | ACC_FINAL),
            shapes_info("Dir", ACC_STATIC | ACC_FINAL | ACC_ENUM),
            shapes_info("Plain", ACC_PUBLIC),
        ],
        ..ClassFile::default()
    };
    let plain = nested_shape(
        "Plain",
        ACC_PUBLIC,
        ClassFile {
            access_flags: ACC_PUBLIC | ACC_SUPER,
            super_class: Some("java/lang/Object".into()),
            fields: vec![member(ACC_FINAL | ACC_SYNTHETIC, "this$0", "Lq/Shapes;")],
            methods: vec![member(ACC_PUBLIC, "<init>", "(Lq/Shapes;)V")],
            ..ClassFile::default()
        },
    );
    let dir = nested_shape(
        "Dir",
        ACC_STATIC | ACC_FINAL | ACC_ENUM,
        ClassFile {
            access_flags: ACC_FINAL | ACC_SUPER | ACC_ENUM,
            super_class: Some("java/lang/Enum".into()),
            signature: Some("Ljava/lang/Enum<Lq/Shapes$Dir;>;".into()),
            fields: vec![
                member(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM, "UP", "Lq/Shapes$Dir;"),
                member(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM, "DOWN", "Lq/Shapes$Dir;"),
                member(ACC_PRIVATE | ACC_STATIC | ACC_FINAL | ACC_SYNTHETIC, "$VALUES", "[Lq/Shapes$Dir;"),
            ],
            methods: vec![
                member(ACC_PUBLIC | ACC_STATIC, "values", "()[Lq/Shapes$Dir;"),
                member(ACC_PUBLIC | ACC_STATIC, "valueOf", "(Ljava/lang/String;)Lq/Shapes$Dir;"),
                member(ACC_PRIVATE, "<init>", "(Ljava/lang/String;I)V"),
                member(ACC_PRIVATE | ACC_STATIC | ACC_SYNTHETIC, "$values", "()[Lq/Shapes$Dir;"),
                member(ACC_STATIC, "<clinit>", "()V"),
            ],
            ..ClassFile::default()
        },
    );
    let pair = nested_shape(
        "Pair",
        ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
        ClassFile {
            access_flags: ACC_PUBLIC | ACC_FINAL | ACC_SUPER,
            super_class: Some("java/lang/Record".into()),
            fields: vec![
                member(ACC_PRIVATE | ACC_FINAL, "left", "I"),
                member(ACC_PRIVATE | ACC_FINAL, "right", "Ljava/lang/String;"),
            ],
            methods: vec![
                ClassMember {
                    parameter_names: Some(vec![Some("left".into()), Some("right".into())]),
                    parameter_flags: vec![ACC_MANDATED, ACC_MANDATED],
                    ..member(ACC_PUBLIC, "<init>", "(ILjava/lang/String;)V")
                },
                member(ACC_PUBLIC | ACC_FINAL, "toString", "()Ljava/lang/String;"),
                member(ACC_PUBLIC | ACC_FINAL, "hashCode", "()I"),
                member(ACC_PUBLIC | ACC_FINAL, "equals", "(Ljava/lang/Object;)Z"),
                member(ACC_PUBLIC, "left", "()I"),
                member(ACC_PUBLIC, "right", "()Ljava/lang/String;"),
            ],
            ..ClassFile::default()
        },
    );
    LookupEnvironment::builder()
        .class_file(shapes.to_bytes())
        .class_file(plain)
        .class_file(dir)
        .class_file(pair)
        .build()
        .unwrap()
}

/// Method keys with their modifiers, sorted so class-file order does not matter.
fn method_summary(ty: &Type) -> Vec<(MemberKey, Vec<&'static str>)> {
    let mut methods: Vec<_> = ty
        .methods()
        .iter()
        .map(|method| (method.key(), method.modifiers().keywords()))
        .collect();
    methods.sort();
    methods
}

#[test]
fn implicit_members_match_across_origins() {
    let binary_env = shapes_env();
    let source_env = source_env(&[("q/Shapes.java", SHAPES)]);

    for name in ["q.Shapes", "q.Shapes.Plain", "q.Shapes.Dir", "q.Shapes.Pair"] {
        let binary = binary_env.find_type(name).unwrap();
        let source = source_env.find_type(name).unwrap();
        assert_eq!(method_summary(&binary), method_summary(&source), "{name}");
    }

    let source = source_env.find_type("q.Shapes.Pair").unwrap();
    let names: Vec<&str> = source.methods().iter().map(|m| m.name()).collect();
    assert_eq!(
        names,
        vec!["Pair", "left", "right", "toString", "hashCode", "equals"]
    );
    let equals = source.methods_named("equals").remove(0);
    assert_eq!(equals.to_string(), "public final boolean equals(java.lang.Object o)");

    let dir = source_env.find_type("q.Shapes.Dir").unwrap();
    assert_eq!(dir.constructors()[0].to_string(), "private Dir()");
    assert!(dir.methods_named("values").is_empty());
}

#[test]
fn record_constructors_keep_mandated_parameters() {
    let pair = shapes_env().find_type("q.Shapes.Pair").unwrap();
    let ctor = pair.constructors().remove(0);
    let names: Vec<&str> = ctor.parameters().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["left", "right"]);
    assert_eq!(ctor.signature(), "(int,java.lang.String)");
}

#[test]
fn binary_member_types_follow_declaration_order() {
    let binary = shapes_env().find_type("q.Shapes").unwrap();
    let source = source_env(&[("q/Shapes.java", SHAPES)])
        .find_type("q.Shapes")
        .unwrap();
    assert_eq!(type_names(binary.member_types()), vec!["Plain", "Dir", "Pair"]);
    assert_eq!(type_names(binary.member_types()), type_names(source.member_types()));
}
