use crate::constant_pool::{ConstantPool, CpInfo};
use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface, e.g. `Ljava/lang/Deprecated;`.
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
    pub visible: bool,
}

impl Annotation {
    /// Internal name of the annotation interface when the descriptor is an object type.
    pub fn type_internal_name(&self) -> Option<&str> {
        descriptor_to_internal_name(&self.type_descriptor)
    }

    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool, visible: bool) -> Result<Self> {
        let type_descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();
        let pairs = reader.read_u2()? as usize;
        let mut elements = Vec::with_capacity(pairs);
        for _ in 0..pairs {
            let name = cp.get_utf8(reader.read_u2()?)?.to_string();
            let value = ElementValue::parse(reader, cp, visible)?;
            elements.push((name, value));
        }
        Ok(Self {
            type_descriptor,
            elements,
            visible,
        })
    }

    /// `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations` body.
    pub(crate) fn parse_table(
        reader: &mut Reader<'_>,
        cp: &ConstantPool,
        visible: bool,
    ) -> Result<Vec<Self>> {
        let count = reader.read_u2()? as usize;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(Annotation::parse(reader, cp, visible)?);
        }
        Ok(out)
    }

    /// `Runtime{Visible,Invisible}ParameterAnnotations` body: one table per parameter.
    pub(crate) fn parse_parameter_tables(
        reader: &mut Reader<'_>,
        cp: &ConstantPool,
        visible: bool,
    ) -> Result<Vec<Vec<Self>>> {
        let params = reader.read_u1()? as usize;
        let mut out = Vec::with_capacity(params);
        for _ in 0..params {
            out.push(Annotation::parse_table(reader, cp, visible)?);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// Return descriptor of the class literal (`Ljava/lang/String;`, `I`, `V`).
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool, visible: bool) -> Result<Self> {
        let tag = reader.read_u1()?;
        let value = match tag {
            b'B' | b'C' | b'I' | b'S' | b'Z' => {
                let index = reader.read_u2()?;
                let value = match cp.get(index)? {
                    CpInfo::Integer(v) => *v,
                    other => return Err(mismatch(index, "Integer", other)),
                };
                ElementValue::Const(match tag {
                    b'B' => ConstValue::Byte(value as i8),
                    b'C' => ConstValue::Char(value as u16),
                    b'S' => ConstValue::Short(value as i16),
                    b'Z' => ConstValue::Boolean(value != 0),
                    _ => ConstValue::Int(value),
                })
            }
            b'J' => {
                let index = reader.read_u2()?;
                match cp.get(index)? {
                    CpInfo::Long(v) => ElementValue::Const(ConstValue::Long(*v)),
                    other => return Err(mismatch(index, "Long", other)),
                }
            }
            b'F' => {
                let index = reader.read_u2()?;
                match cp.get(index)? {
                    CpInfo::Float(v) => ElementValue::Const(ConstValue::Float(*v)),
                    other => return Err(mismatch(index, "Float", other)),
                }
            }
            b'D' => {
                let index = reader.read_u2()?;
                match cp.get(index)? {
                    CpInfo::Double(v) => ElementValue::Const(ConstValue::Double(*v)),
                    other => return Err(mismatch(index, "Double", other)),
                }
            }
            b's' => {
                let index = reader.read_u2()?;
                ElementValue::Const(ConstValue::String(cp.get_string_constant(index)?))
            }
            b'e' => ElementValue::Enum {
                type_descriptor: cp.get_utf8(reader.read_u2()?)?.to_string(),
                const_name: cp.get_utf8(reader.read_u2()?)?.to_string(),
            },
            b'c' => ElementValue::Class(cp.get_utf8(reader.read_u2()?)?.to_string()),
            b'@' => ElementValue::Annotation(Box::new(Annotation::parse(reader, cp, visible)?)),
            b'[' => {
                let count = reader.read_u2()? as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(ElementValue::parse(reader, cp, visible)?);
                }
                ElementValue::Array(values)
            }
            _ => return Err(Error::MalformedAttribute("element_value")),
        };
        Ok(value)
    }
}

/// Loadable constants as they appear in `ConstantValue` attributes and annotation elements.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Boolean(bool),
    Byte(i8),
    /// UTF-16 code unit.
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

pub fn descriptor_to_internal_name(desc: &str) -> Option<&str> {
    desc.strip_prefix('L').and_then(|rest| rest.strip_suffix(';'))
}

fn mismatch(index: u16, expected: &'static str, found: &CpInfo) -> Error {
    Error::ConstantPoolTypeMismatch {
        index,
        expected,
        found: found.kind(),
    }
}
