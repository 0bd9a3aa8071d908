use jmodel_model::{TypeKind, WildcardKind};
use pretty_assertions::assert_eq;

use super::{source_env, type_names};

const BASE: &str = r#"package p;

import java.util.List;

public class Base<T, Z extends Number> {
    protected T value;

    public <R> R map(List<? super T> in, Z extra) { return null; }

    public static class Node<N> {
        public N item;
    }
}
"#;

const CHILD: &str = r#"package p;

public class Child<X> extends Base<X, Long> implements Comparable<Child<X>> {
    public int compareTo(Child<X> other) { return 0; }
}
"#;

const PAIRING: &str = r#"package p;

public class Pairing<K, V> {
    public class Entry<L> {
        public K key;
        public L label;
    }
}
"#;

const HOLDER: &str = r#"package p;

public class Holder {
    public Pairing<String, Integer>.Entry<Long> entry;
}
"#;

fn env() -> jmodel_model::LookupEnvironment {
    source_env(&[("p/Base.java", BASE), ("p/Child.java", CHILD)])
}

#[test]
fn super_class_carries_type_arguments() {
    let env = env();
    let child = env.find_type("p.Child").unwrap();
    let base = env.find_type("p.Base").unwrap();

    let sup = child.super_class().unwrap().unwrap();
    assert_eq!(sup, base);
    assert!(!sup.is_declaration_driven());
    assert!(base.is_declaration_driven());

    let args = sup.type_arguments().unwrap();
    assert_eq!(type_names(args), vec!["X", "Long"]);
    assert!(args[0].is_type_variable());
    assert_eq!(args[1].qualified_name(), "java.lang.Long");

    let params: Vec<&str> = sup.type_parameters().iter().map(|p| p.name()).collect();
    assert_eq!(params, vec!["T", "Z"]);
    assert_eq!(sup.to_string(), "p.Base<X, java.lang.Long>");
}

#[test]
fn declarations_have_no_type_arguments() {
    let env = env();
    let base = env.find_type("p.Base").unwrap();
    assert!(base.type_arguments().unwrap().is_empty());
    assert_eq!(base.type_parameters().len(), 2);

    let z = &base.type_parameters()[1];
    assert_eq!(z.index(), 1);
    assert_eq!(z.declaring_type(), base);
    assert!(z.declaring_method().is_none());
    assert_eq!(type_names(z.bounds().unwrap()), vec!["Number"]);
    assert_eq!(z.to_string(), "Z extends java.lang.Number");
    assert!(base.type_parameters()[0].bounds().unwrap().is_empty());
}

#[test]
fn members_of_a_parameterized_usage_are_substituted() {
    let env = env();
    let child = env.find_type("p.Child").unwrap();
    let sup = child.super_class().unwrap().unwrap();

    let value = sup.field("value").unwrap();
    let value_type = value.field_type().unwrap();
    assert!(value_type.is_type_variable());
    assert_eq!(value_type.name(), "X");

    let map = sup.methods_named("map").remove(0);
    let params = map.parameters();
    assert_eq!(
        params[0].parameter_type().unwrap().to_string(),
        "java.util.List<? super X>"
    );
    assert_eq!(params[1].parameter_type().unwrap().qualified_name(), "java.lang.Long");
}

#[test]
fn method_type_parameters_belong_to_their_method() {
    let env = env();
    let base = env.find_type("p.Base").unwrap();
    let map = base.methods_named("map").remove(0);

    let r = &map.type_parameters()[0];
    assert_eq!(r.name(), "R");
    assert_eq!(r.declaring_method().unwrap(), map);
    assert_eq!(r.declaring_type(), base);

    let ret = map.return_type().unwrap().unwrap();
    assert!(ret.is_type_variable());
    assert_eq!(ret.name(), "R");
    assert_eq!(ret, r.to_type());

    let list = map.parameters()[0].parameter_type().unwrap();
    let arg = &list.type_arguments().unwrap()[0];
    assert!(arg.is_wildcard());
    assert_eq!(arg.wildcard_kind(), Some(WildcardKind::Super));
    assert_eq!(arg.name(), "T");
    assert_eq!(map.to_string(), "public <R> R map(java.util.List<? super T> in, Z extra)");
}

#[test]
fn interfaces_and_nested_arguments() {
    let env = env();
    let child = env.find_type("p.Child").unwrap();
    let interfaces = child.interfaces().unwrap();
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].kind(), TypeKind::Interface);
    assert_eq!(interfaces[0].to_string(), "java.lang.Comparable<p.Child<X>>");

    let inner = &interfaces[0].type_arguments().unwrap()[0];
    assert_eq!(inner, &child);
    assert_eq!(type_names(inner.type_arguments().unwrap()), vec!["X"]);
}

#[test]
fn member_types_know_their_declaring_type() {
    let env = env();
    let base = env.find_type("p.Base").unwrap();
    assert_eq!(type_names(base.member_types()), vec!["Node"]);

    let node = base.member_type("Node").unwrap();
    assert_eq!(node.qualified_name(), "p.Base.Node");
    assert_eq!(node.binary_name(), "p.Base$Node");
    assert_eq!(node.declaring_type().unwrap(), base);
    assert!(node.modifiers().is_static());
    assert_eq!(env.find_type("p.Base$Node").unwrap(), node);
    assert_eq!(env.find_type("p.Base.Node").unwrap(), node);

    let item = node.field("item").unwrap().field_type().unwrap();
    assert_eq!(item.name(), "N");
    assert!(base.declaring_type().is_none());
}

#[test]
fn binding_driven_view_of_a_source_type_matches() {
    let env = env();
    let declared = env.find_type("p.Base").unwrap();
    let bound = env.find_binding_type("p.Base").unwrap();
    assert_eq!(declared, bound);
    assert!(!bound.is_declaration_driven());

    let declared_fields: Vec<String> = declared.fields().iter().map(ToString::to_string).collect();
    let bound_fields: Vec<String> = bound.fields().iter().map(ToString::to_string).collect();
    assert_eq!(declared_fields, bound_fields);

    let declared_methods: Vec<String> = declared.methods().iter().map(ToString::to_string).collect();
    let bound_methods: Vec<String> = bound.methods().iter().map(ToString::to_string).collect();
    assert_eq!(declared_methods, bound_methods);
}

#[test]
fn enclosing_type_arguments_reach_inner_members() {
    let env = source_env(&[("p/Pairing.java", PAIRING), ("p/Holder.java", HOLDER)]);
    let holder = env.find_type("p.Holder").unwrap();
    let entry = holder.field("entry").unwrap().field_type().unwrap();
    assert_eq!(
        entry.to_string(),
        "p.Pairing<java.lang.String, java.lang.Integer>.Entry<java.lang.Long>"
    );
    assert_eq!(entry.qualified_name(), "p.Pairing.Entry");
    assert_eq!(type_names(entry.type_arguments().unwrap()), vec!["Long"]);

    let outer = entry.declaring_type().unwrap();
    assert_eq!(outer, env.find_type("p.Pairing").unwrap());
    assert_eq!(outer.to_string(), "p.Pairing<java.lang.String, java.lang.Integer>");

    let key = entry.field("key").unwrap().field_type().unwrap();
    assert_eq!(key.qualified_name(), "java.lang.String");
    let label = entry.field("label").unwrap().field_type().unwrap();
    assert_eq!(label.qualified_name(), "java.lang.Long");

    // The declaration itself stays unsubstituted.
    let declared = env.find_type("p.Pairing.Entry").unwrap();
    let declared_key = declared.field("key").unwrap().field_type().unwrap();
    assert!(declared_key.is_type_variable());
    assert_eq!(declared_key.name(), "K");
}
