use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl BaseType {
    pub fn from_descriptor_char(c: u8) -> Option<Self> {
        Some(match c {
            b'Z' => BaseType::Boolean,
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'S' => BaseType::Short,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'F' => BaseType::Float,
            b'D' => BaseType::Double,
            _ => return None,
        })
    }

    pub fn descriptor_char(self) -> char {
        match self {
            BaseType::Boolean => 'Z',
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Short => 'S',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Float => 'F',
            BaseType::Double => 'D',
        }
    }

    /// Java source keyword (`int`, `boolean`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Boolean => "boolean",
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Short => "short",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Float => "float",
            BaseType::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => BaseType::Boolean,
            "byte" => BaseType::Byte,
            "char" => BaseType::Char,
            "short" => BaseType::Short,
            "int" => BaseType::Int,
            "long" => BaseType::Long,
            "float" => BaseType::Float,
            "double" => BaseType::Double,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn to_descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            FieldType::Base(base) => out.push(base.descriptor_char()),
            FieldType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            FieldType::Array(component) => {
                out.push('[');
                component.write_descriptor(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    pub fn to_descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        match &self.return_type {
            ReturnType::Void => out.push('V'),
            ReturnType::Type(ty) => ty.write_descriptor(&mut out),
        }
        out
    }
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let mut cursor = Cursor { desc, pos: 0 };
    let ty = cursor.field_type()?;
    cursor.finish()?;
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let mut cursor = Cursor { desc, pos: 0 };
    cursor.expect(b'(')?;
    let mut params = Vec::new();
    while cursor.peek() != Some(b')') {
        params.push(cursor.field_type()?);
    }
    cursor.expect(b')')?;
    let return_type = if cursor.peek() == Some(b'V') {
        cursor.pos += 1;
        ReturnType::Void
    } else {
        ReturnType::Type(cursor.field_type()?)
    };
    cursor.finish()?;
    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

struct Cursor<'a> {
    desc: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn error(&self) -> Error {
        Error::InvalidDescriptor(self.desc.to_string())
    }

    fn peek(&self) -> Option<u8> {
        self.desc.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.pos == self.desc.len() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn field_type(&mut self) -> Result<FieldType> {
        let c = self.peek().ok_or_else(|| self.error())?;
        self.pos += 1;
        if let Some(base) = BaseType::from_descriptor_char(c) {
            return Ok(FieldType::Base(base));
        }
        match c {
            b'L' => {
                let rest = &self.desc[self.pos..];
                let end = rest.find(';').ok_or_else(|| self.error())?;
                if end == 0 {
                    return Err(self.error());
                }
                self.pos += end + 1;
                Ok(FieldType::Object(rest[..end].to_string()))
            }
            b'[' => Ok(FieldType::Array(Box::new(self.field_type()?))),
            _ => Err(self.error()),
        }
    }
}
