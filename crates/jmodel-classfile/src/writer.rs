//! Serializes [`ClassFile`] values back to bytes. Only used to produce binary fixtures.

use std::collections::HashMap;

use crate::annotation::{Annotation, ConstValue, ElementValue};
use crate::classfile::{ClassFile, ClassMember, MAGIC};
use crate::constant_pool::encode_modified_utf8;

#[derive(Clone, PartialEq, Eq, Hash)]
enum PoolKey {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(String),
    String(String),
}

#[derive(Default)]
struct PoolWriter {
    bytes: Vec<u8>,
    next: u16,
    indices: HashMap<PoolKey, u16>,
}

impl PoolWriter {
    fn new() -> Self {
        PoolWriter {
            next: 1,
            ..PoolWriter::default()
        }
    }

    fn intern(&mut self, key: PoolKey) -> u16 {
        if let Some(index) = self.indices.get(&key) {
            return *index;
        }
        let mut entry = Vec::new();
        let slots = match &key {
            PoolKey::Utf8(text) => {
                let encoded = encode_modified_utf8(text);
                entry.push(1);
                put_u2(&mut entry, encoded.len() as u16);
                entry.extend(encoded);
                1
            }
            PoolKey::Integer(v) => {
                entry.push(3);
                entry.extend(v.to_be_bytes());
                1
            }
            PoolKey::Float(bits) => {
                entry.push(4);
                entry.extend(bits.to_be_bytes());
                1
            }
            PoolKey::Long(v) => {
                entry.push(5);
                entry.extend(v.to_be_bytes());
                2
            }
            PoolKey::Double(bits) => {
                entry.push(6);
                entry.extend(bits.to_be_bytes());
                2
            }
            PoolKey::Class(name) => {
                let name_index = self.utf8(name);
                entry.push(7);
                put_u2(&mut entry, name_index);
                1
            }
            PoolKey::String(value) => {
                let string_index = self.utf8(value);
                entry.push(8);
                put_u2(&mut entry, string_index);
                1
            }
        };
        let index = self.next;
        self.next += slots;
        self.bytes.extend(entry);
        self.indices.insert(key, index);
        index
    }

    fn utf8(&mut self, text: &str) -> u16 {
        self.intern(PoolKey::Utf8(text.to_string()))
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        self.intern(PoolKey::Class(internal_name.to_string()))
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend(value.to_be_bytes());
}

fn put_u4(out: &mut Vec<u8>, value: u32) {
    out.extend(value.to_be_bytes());
}

struct Attributes {
    count: u16,
    bytes: Vec<u8>,
}

impl Attributes {
    fn new() -> Self {
        Attributes {
            count: 0,
            bytes: Vec::new(),
        }
    }

    fn push(&mut self, pool: &mut PoolWriter, name: &str, body: Vec<u8>) {
        let name_index = pool.utf8(name);
        put_u2(&mut self.bytes, name_index);
        put_u4(&mut self.bytes, body.len() as u32);
        self.bytes.extend(body);
        self.count += 1;
    }

    fn write_to(self, out: &mut Vec<u8>) {
        put_u2(out, self.count);
        out.extend(self.bytes);
    }
}

impl ClassFile {
    /// Encodes this class. Attributes are emitted only for populated fields.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut pool = PoolWriter::new();
        let mut body = Vec::new();

        put_u2(&mut body, self.access_flags);
        let this_index = pool.class(&self.this_class);
        put_u2(&mut body, this_index);
        let super_index = match &self.super_class {
            Some(name) => pool.class(name),
            None => 0,
        };
        put_u2(&mut body, super_index);
        put_u2(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let index = pool.class(interface);
            put_u2(&mut body, index);
        }

        for members in [&self.fields, &self.methods] {
            put_u2(&mut body, members.len() as u16);
            for member in members {
                write_member(&mut pool, member, &mut body);
            }
        }

        let mut attrs = Attributes::new();
        write_common_attributes(&mut pool, &mut attrs, self.signature.as_deref(), &self.annotations);
        if let Some(source) = &self.source_file {
            let mut b = Vec::new();
            put_u2(&mut b, pool.utf8(source));
            attrs.push(&mut pool, "SourceFile", b);
        }
        if !self.inner_classes.is_empty() {
            let mut b = Vec::new();
            put_u2(&mut b, self.inner_classes.len() as u16);
            for info in &self.inner_classes {
                put_u2(&mut b, pool.class(&info.inner_class));
                let outer = info.outer_class.as_deref().map(|o| pool.class(o)).unwrap_or(0);
                put_u2(&mut b, outer);
                let name = info.inner_name.as_deref().map(|n| pool.utf8(n)).unwrap_or(0);
                put_u2(&mut b, name);
                put_u2(&mut b, info.access_flags);
            }
            attrs.push(&mut pool, "InnerClasses", b);
        }
        attrs.write_to(&mut body);

        let mut out = Vec::with_capacity(pool.bytes.len() + body.len() + 10);
        put_u4(&mut out, MAGIC);
        put_u2(&mut out, self.minor_version);
        put_u2(&mut out, self.major_version);
        put_u2(&mut out, pool.next);
        out.extend(pool.bytes);
        out.extend(body);
        out
    }
}

fn write_member(pool: &mut PoolWriter, member: &ClassMember, out: &mut Vec<u8>) {
    put_u2(out, member.access_flags);
    put_u2(out, pool.utf8(&member.name));
    put_u2(out, pool.utf8(&member.descriptor));

    let mut attrs = Attributes::new();
    write_common_attributes(pool, &mut attrs, member.signature.as_deref(), &member.annotations);

    if let Some(value) = &member.constant_value {
        let mut b = Vec::new();
        put_u2(&mut b, const_index(pool, value));
        attrs.push(pool, "ConstantValue", b);
    }
    if !member.exceptions.is_empty() {
        let mut b = Vec::new();
        put_u2(&mut b, member.exceptions.len() as u16);
        for exception in &member.exceptions {
            put_u2(&mut b, pool.class(exception));
        }
        attrs.push(pool, "Exceptions", b);
    }
    if let Some(names) = &member.parameter_names {
        let mut b = vec![names.len() as u8];
        for (idx, name) in names.iter().enumerate() {
            put_u2(&mut b, name.as_deref().map(|n| pool.utf8(n)).unwrap_or(0));
            put_u2(&mut b, member.parameter_flags.get(idx).copied().unwrap_or(0));
        }
        attrs.push(pool, "MethodParameters", b);
    }
    for (attr_name, visible) in [
        ("RuntimeVisibleParameterAnnotations", true),
        ("RuntimeInvisibleParameterAnnotations", false),
    ] {
        let any = member
            .parameter_annotations
            .iter()
            .flatten()
            .any(|ann| ann.visible == visible);
        if !any {
            continue;
        }
        let mut b = vec![member.parameter_annotations.len() as u8];
        for table in &member.parameter_annotations {
            write_annotation_table(pool, table.iter().filter(|a| a.visible == visible), &mut b);
        }
        attrs.push(pool, attr_name, b);
    }
    if let Some(default) = &member.annotation_default {
        let mut b = Vec::new();
        write_element_value(pool, default, &mut b);
        attrs.push(pool, "AnnotationDefault", b);
    }

    attrs.write_to(out);
}

fn write_common_attributes(
    pool: &mut PoolWriter,
    attrs: &mut Attributes,
    signature: Option<&str>,
    annotations: &[Annotation],
) {
    if let Some(signature) = signature {
        let mut b = Vec::new();
        put_u2(&mut b, pool.utf8(signature));
        attrs.push(pool, "Signature", b);
    }
    for (name, visible) in [
        ("RuntimeVisibleAnnotations", true),
        ("RuntimeInvisibleAnnotations", false),
    ] {
        if !annotations.iter().any(|a| a.visible == visible) {
            continue;
        }
        let mut b = Vec::new();
        write_annotation_table(pool, annotations.iter().filter(|a| a.visible == visible), &mut b);
        attrs.push(pool, name, b);
    }
}

fn write_annotation_table<'a>(
    pool: &mut PoolWriter,
    annotations: impl Iterator<Item = &'a Annotation>,
    out: &mut Vec<u8>,
) {
    let annotations: Vec<&Annotation> = annotations.collect();
    put_u2(out, annotations.len() as u16);
    for annotation in annotations {
        write_annotation(pool, annotation, out);
    }
}

fn write_annotation(pool: &mut PoolWriter, annotation: &Annotation, out: &mut Vec<u8>) {
    put_u2(out, pool.utf8(&annotation.type_descriptor));
    put_u2(out, annotation.elements.len() as u16);
    for (name, value) in &annotation.elements {
        put_u2(out, pool.utf8(name));
        write_element_value(pool, value, out);
    }
}

fn write_element_value(pool: &mut PoolWriter, value: &ElementValue, out: &mut Vec<u8>) {
    match value {
        ElementValue::Const(ConstValue::String(text)) => {
            out.push(b's');
            put_u2(out, pool.utf8(text));
        }
        ElementValue::Const(constant) => {
            let tag = match constant {
                ConstValue::Boolean(_) => b'Z',
                ConstValue::Byte(_) => b'B',
                ConstValue::Char(_) => b'C',
                ConstValue::Short(_) => b'S',
                ConstValue::Int(_) => b'I',
                ConstValue::Long(_) => b'J',
                ConstValue::Float(_) => b'F',
                ConstValue::Double(_) => b'D',
                ConstValue::String(_) => b's',
            };
            out.push(tag);
            put_u2(out, const_index(pool, constant));
        }
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => {
            out.push(b'e');
            put_u2(out, pool.utf8(type_descriptor));
            put_u2(out, pool.utf8(const_name));
        }
        ElementValue::Class(descriptor) => {
            out.push(b'c');
            put_u2(out, pool.utf8(descriptor));
        }
        ElementValue::Annotation(annotation) => {
            out.push(b'@');
            write_annotation(pool, annotation, out);
        }
        ElementValue::Array(values) => {
            out.push(b'[');
            put_u2(out, values.len() as u16);
            for value in values {
                write_element_value(pool, value, out);
            }
        }
    }
}

fn const_index(pool: &mut PoolWriter, value: &ConstValue) -> u16 {
    let key = match value {
        ConstValue::Boolean(v) => PoolKey::Integer(*v as i32),
        ConstValue::Byte(v) => PoolKey::Integer(*v as i32),
        ConstValue::Char(v) => PoolKey::Integer(*v as i32),
        ConstValue::Short(v) => PoolKey::Integer(*v as i32),
        ConstValue::Int(v) => PoolKey::Integer(*v),
        ConstValue::Long(v) => PoolKey::Long(*v),
        ConstValue::Float(v) => PoolKey::Float(v.to_bits()),
        ConstValue::Double(v) => PoolKey::Double(v.to_bits()),
        ConstValue::String(v) => PoolKey::String(v.clone()),
    };
    pool.intern(key)
}
