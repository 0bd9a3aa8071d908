use jmodel_classfile::access::*;
use jmodel_classfile::{
    Annotation, ClassFile, ClassMember, ConstValue, ElementValue, Error, FieldType,
    InnerClassInfo, TypeArgument, TypeSignature,
};
use pretty_assertions::assert_eq;

fn annotation(descriptor: &str, elements: Vec<(&str, ElementValue)>) -> Annotation {
    Annotation {
        type_descriptor: descriptor.to_string(),
        elements: elements
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        visible: true,
    }
}

fn sample_class() -> ClassFile {
    ClassFile {
        major_version: 61,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class: "com/example/Widget".into(),
        super_class: Some("java/lang/Object".into()),
        interfaces: vec!["java/lang/Comparable".into()],
        signature: Some("<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Comparable<Lcom/example/Widget<TT;>;>;".into()),
        annotations: vec![
            annotation(
                "Lcom/example/Tag;",
                vec![
                    ("value", ElementValue::Const(ConstValue::String("w".into()))),
                    (
                        "sizes",
                        ElementValue::Array(vec![
                            ElementValue::Const(ConstValue::Int(1)),
                            ElementValue::Const(ConstValue::Int(2)),
                        ]),
                    ),
                ],
            ),
            Annotation {
                visible: false,
                ..annotation("Lcom/example/Hidden;", Vec::new())
            },
        ],
        inner_classes: vec![InnerClassInfo {
            inner_class: "com/example/Widget$Part".into(),
            outer_class: Some("com/example/Widget".into()),
            inner_name: Some("Part".into()),
            access_flags: ACC_PUBLIC | ACC_STATIC,
        }],
        fields: vec![ClassMember {
            access_flags: ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            name: "LIMIT".into(),
            descriptor: "J".into(),
            constant_value: Some(ConstValue::Long(1 << 40)),
            ..ClassMember::default()
        }],
        methods: vec![
            ClassMember {
                access_flags: ACC_PUBLIC,
                name: "resize".into(),
                descriptor: "(ILjava/util/List;)V".into(),
                signature: Some("(ILjava/util/List<+TT;>;)V".into()),
                exceptions: vec!["java/io/IOException".into()],
                parameter_names: Some(vec![Some("width".into()), None]),
                parameter_flags: vec![ACC_FINAL, 0],
                parameter_annotations: vec![
                    Vec::new(),
                    vec![annotation("Lcom/example/NonNull;", Vec::new())],
                ],
                ..ClassMember::default()
            },
            ClassMember {
                access_flags: ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC,
                name: "compareTo".into(),
                descriptor: "(Ljava/lang/Object;)I".into(),
                ..ClassMember::default()
            },
        ],
        ..ClassFile::default()
    }
}

#[test]
fn written_class_parses_into_stub() {
    let bytes = sample_class().to_bytes();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/Widget");
    assert_eq!(class.major_version, 61);

    let stub = class.stub().unwrap();
    assert_eq!(stub.binary_name(), "com.example.Widget");
    assert_eq!(stub.signature.as_ref().unwrap().type_parameters[0].name, "T");
    assert_eq!(stub.member_classes.len(), 1);
    assert!(stub.nesting.is_none());

    let names: Vec<_> = stub.annotations.iter().map(|a| a.type_internal_name()).collect();
    assert_eq!(names, vec![Some("com/example/Tag"), Some("com/example/Hidden")]);
    assert!(!stub.annotations[1].visible);

    let limit = &stub.fields[0];
    assert_eq!(limit.descriptor, FieldType::Base(jmodel_classfile::BaseType::Long));
    assert_eq!(limit.constant_value, Some(ConstValue::Long(1 << 40)));

    let resize = &stub.methods[0];
    assert_eq!(resize.exceptions, vec!["java/io/IOException".to_string()]);
    assert_eq!(
        resize.parameter_names,
        Some(vec![Some("width".to_string()), None])
    );
    assert_eq!(resize.parameter_flags, vec![ACC_FINAL, 0]);
    assert_eq!(resize.parameter_annotations[1].len(), 1);
    let sig = resize.signature.as_ref().unwrap();
    match &sig.parameters[1] {
        TypeSignature::Class(list) => assert_eq!(
            list.type_arguments(),
            &[TypeArgument::Extends(TypeSignature::TypeVariable("T".into()))]
        ),
        other => panic!("unexpected parameter signature {other:?}"),
    }
    assert_eq!(stub.methods[1].access_flags & ACC_BRIDGE, ACC_BRIDGE);
}

#[test]
fn annotation_default_round_trips_through_method_table() {
    let class = ClassFile {
        access_flags: ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION,
        this_class: "com/example/Tag".into(),
        super_class: Some("java/lang/Object".into()),
        interfaces: vec!["java/lang/annotation/Annotation".into()],
        methods: vec![ClassMember {
            access_flags: ACC_PUBLIC | ACC_ABSTRACT,
            name: "level".into(),
            descriptor: "()Ljava/lang/annotation/RetentionPolicy;".into(),
            annotation_default: Some(ElementValue::Enum {
                type_descriptor: "Ljava/lang/annotation/RetentionPolicy;".into(),
                const_name: "CLASS".into(),
            }),
            ..ClassMember::default()
        }],
        ..ClassFile::default()
    };

    let parsed = ClassFile::parse(&class.to_bytes()).unwrap();
    assert_eq!(
        parsed.methods[0].annotation_default,
        class.methods[0].annotation_default
    );
}

#[test]
fn rejects_bad_magic_and_truncation() {
    assert_eq!(
        ClassFile::parse(&[0, 0, 0, 0]).unwrap_err(),
        Error::InvalidMagic(0)
    );
    let bytes = sample_class().to_bytes();
    assert_eq!(
        ClassFile::parse(&bytes[..bytes.len() - 1]).unwrap_err(),
        Error::UnexpectedEof
    );
}
