//! Generic signatures (JVMS 4.7.9.1).

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

impl TypeParameter {
    /// Class bound followed by interface bounds.
    pub fn bounds(&self) -> impl Iterator<Item = &TypeSignature> {
        self.class_bound.iter().chain(self.interface_bounds.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Array(Box<TypeSignature>),
    Class(ClassTypeSignature),
    TypeVariable(String),
}

/// Field signatures are plain reference type signatures.
pub type FieldTypeSignature = TypeSignature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Internal package prefix (`java/util`), empty for the default package.
    pub package: String,
    /// Outermost class first; nested classes follow `.` in the signature.
    pub segments: Vec<SimpleClassTypeSignature>,
}

impl ClassTypeSignature {
    /// Internal name of the innermost class (`java/util/Map$Entry`).
    pub fn internal_name(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package);
            out.push('/');
        }
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('$');
            }
            out.push_str(&segment.name);
        }
        out
    }

    /// Type arguments of the innermost segment.
    pub fn type_arguments(&self) -> &[TypeArgument] {
        self.segments
            .last()
            .map(|segment| segment.type_arguments.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    Exact(TypeSignature),
    Extends(TypeSignature),
    Super(TypeSignature),
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut parser = SigParser::new(sig);
    let type_parameters = parser.type_parameters()?;
    let super_class = parser.class_type()?;
    let mut interfaces = Vec::new();
    while !parser.at_end() {
        interfaces.push(parser.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<FieldTypeSignature> {
    let mut parser = SigParser::new(sig);
    let ty = parser.reference_type()?;
    parser.finish()?;
    Ok(ty)
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut parser = SigParser::new(sig);
    let type_parameters = parser.type_parameters()?;
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while parser.peek() != Some(b')') {
        parameters.push(parser.java_type()?);
    }
    parser.expect(b')')?;
    let return_type = if parser.eat(b'V') {
        None
    } else {
        Some(parser.java_type()?)
    };
    let mut throws = Vec::new();
    while parser.eat(b'^') {
        throws.push(parser.reference_type()?);
    }
    parser.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

struct SigParser<'a> {
    sig: &'a str,
    pos: usize,
}

impl<'a> SigParser<'a> {
    fn new(sig: &'a str) -> Self {
        SigParser { sig, pos: 0 }
    }

    fn error(&self) -> Error {
        Error::InvalidSignature(self.sig.to_string())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.sig.len()
    }

    fn peek(&self) -> Option<u8> {
        self.sig.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Reads up to (not including) one of the signature delimiters.
    fn identifier(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'.' | b';' | b'[' | b'/' | b'<' | b'>' | b':') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(&self.sig[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut out = Vec::new();
        if !self.eat(b'<') {
            return Ok(out);
        }
        while !self.eat(b'>') {
            let name = self.identifier()?.to_string();
            self.expect(b':')?;
            let class_bound = match self.peek() {
                Some(b'L' | b'T' | b'[') => Some(self.reference_type()?),
                _ => None,
            };
            let mut interface_bounds = Vec::new();
            while self.eat(b':') {
                interface_bounds.push(self.reference_type()?);
            }
            out.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
            if self.at_end() {
                return Err(self.error());
            }
        }
        if out.is_empty() {
            return Err(self.error());
        }
        Ok(out)
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        match self.peek().and_then(BaseType::from_descriptor_char) {
            Some(base) => {
                self.pos += 1;
                Ok(TypeSignature::Base(base))
            }
            None => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some(b'L') => Ok(TypeSignature::Class(self.class_type()?)),
            Some(b'T') => {
                self.pos += 1;
                let name = self.identifier()?.to_string();
                self.expect(b';')?;
                Ok(TypeSignature::TypeVariable(name))
            }
            Some(b'[') => {
                self.pos += 1;
                Ok(TypeSignature::Array(Box::new(self.java_type()?)))
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect(b'L')?;
        let mut package_parts: Vec<&str> = Vec::new();
        let mut first = self.identifier()?;
        while self.eat(b'/') {
            package_parts.push(first);
            first = self.identifier()?;
        }

        let mut segments = vec![SimpleClassTypeSignature {
            name: first.to_string(),
            type_arguments: self.type_arguments()?,
        }];
        while self.eat(b'.') {
            let name = self.identifier()?.to_string();
            segments.push(SimpleClassTypeSignature {
                name,
                type_arguments: self.type_arguments()?,
            });
        }
        self.expect(b';')?;

        Ok(ClassTypeSignature {
            package: package_parts.join("/"),
            segments,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut out = Vec::new();
        if !self.eat(b'<') {
            return Ok(out);
        }
        while !self.eat(b'>') {
            let arg = match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    TypeArgument::Any
                }
                Some(b'+') => {
                    self.pos += 1;
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some(b'-') => {
                    self.pos += 1;
                    TypeArgument::Super(self.reference_type()?)
                }
                Some(_) => TypeArgument::Exact(self.reference_type()?),
                None => return Err(self.error()),
            };
            out.push(arg);
        }
        if out.is_empty() {
            return Err(self.error());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn class(package: &str, name: &str, args: Vec<TypeArgument>) -> ClassTypeSignature {
        ClassTypeSignature {
            package: package.to_string(),
            segments: vec![SimpleClassTypeSignature {
                name: name.to_string(),
                type_arguments: args,
            }],
        }
    }

    #[test]
    fn class_signature_with_bounded_parameters() {
        let sig = parse_class_signature(
            "<T:Ljava/lang/Object;Z::Ljava/lang/Comparable<TZ;>;>Lp/Base<TT;Ljava/lang/Long;>;Ljava/lang/Runnable;",
        )
        .unwrap();

        assert_eq!(sig.type_parameters.len(), 2);
        assert_eq!(sig.type_parameters[0].name, "T");
        assert!(sig.type_parameters[1].class_bound.is_none());
        assert_eq!(
            sig.type_parameters[1].interface_bounds,
            vec![TypeSignature::Class(class(
                "java/lang",
                "Comparable",
                vec![TypeArgument::Exact(TypeSignature::TypeVariable("Z".into()))]
            ))]
        );
        assert_eq!(sig.super_class.internal_name(), "p/Base");
        assert_eq!(sig.super_class.type_arguments().len(), 2);
        assert_eq!(sig.interfaces[0].internal_name(), "java/lang/Runnable");
    }

    #[test]
    fn method_signature_with_wildcards_and_throws() {
        let sig = parse_method_signature(
            "<E:Ljava/lang/Exception;>(Ljava/util/List<+Ljava/lang/Number;>;[I)V^TE;^Ljava/io/IOException;",
        )
        .unwrap();
        assert_eq!(sig.return_type, None);
        assert_eq!(sig.parameters.len(), 2);
        match &sig.parameters[0] {
            TypeSignature::Class(list) => assert!(matches!(
                list.type_arguments()[0],
                TypeArgument::Extends(TypeSignature::Class(_))
            )),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sig.throws[0], TypeSignature::TypeVariable("E".into()));
    }

    #[test]
    fn inner_class_segments_join_with_dollar() {
        let ty = parse_field_signature("Ljava/util/Map<TK;TV;>.Entry<TK;TV;>;").unwrap();
        let TypeSignature::Class(class) = ty else {
            panic!("expected class type");
        };
        assert_eq!(class.internal_name(), "java/util/Map$Entry");
        assert_eq!(class.segments[0].type_arguments.len(), 2);
    }

    #[test]
    fn rejects_truncated_signatures() {
        assert!(parse_field_signature("Ljava/util/List<").is_err());
        assert!(parse_method_signature("(I").is_err());
        assert!(parse_class_signature("<>Ljava/lang/Object;").is_err());
    }
}
