use crate::annotation::{Annotation, ConstValue, ElementValue};
use crate::constant_pool::{ConstantPool, CpInfo};
use crate::error::{Error, Result};
use crate::reader::Reader;

pub const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, Default)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name (`com/example/Outer$Inner`).
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    /// Visible annotations first, then invisible ones, each in class-file order.
    pub annotations: Vec<Annotation>,
    pub inner_classes: Vec<InnerClassInfo>,
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
    /// Fields only.
    pub constant_value: Option<ConstValue>,
    /// Methods only: internal names from the `Exceptions` attribute.
    pub exceptions: Vec<String>,
    /// Methods only: `MethodParameters` entries (`None` for unnamed parameters).
    pub parameter_names: Option<Vec<Option<String>>>,
    /// Methods only: `MethodParameters` access flags, parallel to `parameter_names`.
    pub parameter_flags: Vec<u16>,
    /// Methods only: merged visible/invisible parameter annotations, indexed by parameter.
    pub parameter_annotations: Vec<Vec<Annotation>>,
    /// Annotation interface elements only.
    pub annotation_default: Option<ElementValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class = match reader.read_u2()? {
            0 => None,
            index => Some(cp.get_class_name(index)?),
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields = parse_members(&mut reader, &cp)?;
        let methods = parse_members(&mut reader, &cp)?;
        let attrs = parse_attributes(&mut reader, &cp, None)?;
        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: attrs.signature,
            annotations: attrs.annotations,
            inner_classes: attrs.inner_classes,
            source_file: attrs.source_file,
        })
    }

    /// Simple name recorded for this class in its own `InnerClasses` table, if it is nested.
    pub fn inner_info(&self) -> Option<&InnerClassInfo> {
        self.inner_classes
            .iter()
            .find(|info| info.inner_class == self.this_class)
    }
}

fn parse_members(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Vec<ClassMember>> {
    let count = reader.read_u2()? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let access_flags = reader.read_u2()?;
        let name = cp.get_utf8(reader.read_u2()?)?.to_string();
        let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();
        let attrs = parse_attributes(reader, cp, Some(&descriptor))?;
        out.push(ClassMember {
            access_flags,
            name,
            descriptor,
            signature: attrs.signature,
            annotations: attrs.annotations,
            constant_value: attrs.constant_value,
            exceptions: attrs.exceptions,
            parameter_names: attrs.parameter_names,
            parameter_flags: attrs.parameter_flags,
            parameter_annotations: attrs.parameter_annotations,
            annotation_default: attrs.annotation_default,
        });
    }
    Ok(out)
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    annotations: Vec<Annotation>,
    invisible_annotations: Vec<Annotation>,
    inner_classes: Vec<InnerClassInfo>,
    source_file: Option<String>,
    constant_value: Option<ConstValue>,
    exceptions: Vec<String>,
    parameter_names: Option<Vec<Option<String>>>,
    parameter_flags: Vec<u16>,
    parameter_annotations: Vec<Vec<Annotation>>,
    annotation_default: Option<ElementValue>,
}

/// `member_descriptor` is `None` for class-level attributes.
fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    member_descriptor: Option<&str>,
) -> Result<ParsedAttributes> {
    let count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..count {
        let name = cp.get_utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        let mut sub = Reader::new(reader.read_bytes(length)?);

        match (name, member_descriptor) {
            ("Signature", _) => {
                parsed.signature = Some(cp.get_utf8(sub.read_u2()?)?.to_string());
            }
            ("RuntimeVisibleAnnotations", _) => {
                parsed.annotations = Annotation::parse_table(&mut sub, cp, true)?;
            }
            ("RuntimeInvisibleAnnotations", _) => {
                parsed.invisible_annotations = Annotation::parse_table(&mut sub, cp, false)?;
            }
            ("InnerClasses", None) => {
                let entries = sub.read_u2()? as usize;
                for _ in 0..entries {
                    let inner_class = cp.get_class_name(sub.read_u2()?)?;
                    let outer_class = match sub.read_u2()? {
                        0 => None,
                        index => Some(cp.get_class_name(index)?),
                    };
                    let inner_name = match sub.read_u2()? {
                        0 => None,
                        index => Some(cp.get_utf8(index)?.to_string()),
                    };
                    let access_flags = sub.read_u2()?;
                    parsed.inner_classes.push(InnerClassInfo {
                        inner_class,
                        outer_class,
                        inner_name,
                        access_flags,
                    });
                }
            }
            ("SourceFile", None) => {
                parsed.source_file = Some(cp.get_utf8(sub.read_u2()?)?.to_string());
            }
            ("ConstantValue", Some(descriptor)) => {
                parsed.constant_value = Some(constant_value(cp, sub.read_u2()?, descriptor)?);
            }
            ("Exceptions", Some(_)) => {
                let entries = sub.read_u2()? as usize;
                for _ in 0..entries {
                    parsed.exceptions.push(cp.get_class_name(sub.read_u2()?)?);
                }
            }
            ("MethodParameters", Some(_)) => {
                let entries = sub.read_u1()? as usize;
                let mut names = Vec::with_capacity(entries);
                let mut flags = Vec::with_capacity(entries);
                for _ in 0..entries {
                    let name = match sub.read_u2()? {
                        0 => None,
                        index => Some(cp.get_utf8(index)?.to_string()),
                    };
                    names.push(name);
                    flags.push(sub.read_u2()?);
                }
                parsed.parameter_names = Some(names);
                parsed.parameter_flags = flags;
            }
            ("RuntimeVisibleParameterAnnotations", Some(_))
            | ("RuntimeInvisibleParameterAnnotations", Some(_)) => {
                let visible = name == "RuntimeVisibleParameterAnnotations";
                let tables = Annotation::parse_parameter_tables(&mut sub, cp, visible)?;
                merge_parameter_annotations(&mut parsed.parameter_annotations, tables);
            }
            ("AnnotationDefault", Some(_)) => {
                parsed.annotation_default = Some(ElementValue::parse(&mut sub, cp, true)?);
            }
            _ => continue,
        }
        sub.ensure_empty()?;
    }

    let invisible = std::mem::take(&mut parsed.invisible_annotations);
    parsed.annotations.extend(invisible);
    Ok(parsed)
}

fn merge_parameter_annotations(target: &mut Vec<Vec<Annotation>>, tables: Vec<Vec<Annotation>>) {
    if target.len() < tables.len() {
        target.resize_with(tables.len(), Vec::new);
    }
    for (slot, table) in target.iter_mut().zip(tables) {
        slot.extend(table);
    }
}

fn constant_value(cp: &ConstantPool, index: u16, descriptor: &str) -> Result<ConstValue> {
    let value = match (cp.get(index)?, descriptor) {
        (CpInfo::Integer(v), "Z") => ConstValue::Boolean(*v != 0),
        (CpInfo::Integer(v), "B") => ConstValue::Byte(*v as i8),
        (CpInfo::Integer(v), "C") => ConstValue::Char(*v as u16),
        (CpInfo::Integer(v), "S") => ConstValue::Short(*v as i16),
        (CpInfo::Integer(v), _) => ConstValue::Int(*v),
        (CpInfo::Long(v), _) => ConstValue::Long(*v),
        (CpInfo::Float(v), _) => ConstValue::Float(*v),
        (CpInfo::Double(v), _) => ConstValue::Double(*v),
        (CpInfo::String { .. }, _) => ConstValue::String(cp.get_string_constant(index)?),
        _ => return Err(Error::MalformedAttribute("ConstantValue")),
    };
    Ok(value)
}
