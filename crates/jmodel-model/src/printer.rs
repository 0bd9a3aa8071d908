//! Diagnostic text rendering of model nodes.
//!
//! `Display` renders a single node on one line. [`Printer`] renders declaration outlines. An
//! accessor that fails while printing shows up as `<unresolved NAME>` rather than aborting.

use std::fmt::{self, Write as _};

use crate::annotation::{Annotation, Value};
use crate::binding::{ConstValue, WildcardKind};
use crate::error::{ModelError, Result};
use crate::members::{Field, Method, Parameter, TypeParameter};
use crate::types::{Type, TypeKind};
use crate::unit::CompilationUnit;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wildcard_kind() {
            Some(WildcardKind::Extends) => f.write_str("? extends ")?,
            Some(WildcardKind::Super) => f.write_str("? super ")?,
            None if self.is_wildcard() => return f.write_str("?"),
            None => {}
        }
        if self.is_type_variable() || self.is_primitive() || self.is_void() {
            f.write_str(self.name())?;
        } else {
            match self.parameterized_outer() {
                Some(outer) => write!(f, "{outer}.{}", self.name())?,
                None => f.write_str(self.qualified_name())?,
            }
            match self.type_arguments() {
                Ok([]) => {}
                Ok(args) => {
                    f.write_str("<")?;
                    write_list(f, args, ", ")?;
                    f.write_str(">")?;
                }
                Err(err) => write!(f, "<{}>", unresolved(&err))?,
            }
        }
        for _ in 0..self.array_dimension() {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", ConstValue::Boolean(*v)),
            Value::Byte(v) => write!(f, "{}", ConstValue::Byte(*v)),
            Value::Char(v) => write!(f, "{}", ConstValue::Char(*v)),
            Value::Short(v) => write!(f, "{}", ConstValue::Short(*v)),
            Value::Int(v) => write!(f, "{}", ConstValue::Int(*v)),
            Value::Long(v) => write!(f, "{}", ConstValue::Long(*v)),
            Value::Float(v) => write!(f, "{}", ConstValue::Float(*v)),
            Value::Double(v) => write!(f, "{}", ConstValue::Double(*v)),
            Value::String(v) => write!(f, "{}", ConstValue::String(v.clone())),
            Value::Type(ty) => write!(f, "{ty}.class"),
            Value::Enum(constant) => write!(
                f,
                "{}.{}",
                crate::binding::qualified_from_binary(constant.type_name()),
                constant.name()
            ),
            Value::Annotation(annotation) => write!(f, "{annotation}"),
            Value::Array(items) => {
                f.write_str("{")?;
                write_list(f, items, ", ")?;
                f.write_str("}")
            }
            Value::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Explicitly written elements only.
impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualified_name() {
            Some(name) => write!(f, "@{name}")?,
            None => write!(f, "@<unresolved {}>", self.written_name())?,
        }
        let explicit: Vec<_> = self.values().iter().filter(|v| !v.is_default()).collect();
        match explicit.as_slice() {
            [] => Ok(()),
            [only] if only.name() == "value" => write!(f, "({})", only.value()),
            values => {
                f.write_str("(")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", value.name(), value.value())?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match self.bounds() {
            Ok([]) => Ok(()),
            Ok(bounds) => {
                f.write_str(" extends ")?;
                write_list(f, bounds, " & ")
            }
            Err(err) => write!(f, " extends {}", unresolved(&err)),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for annotation in self.annotations() {
            write!(f, "{annotation} ")?;
        }
        if self.modifiers().is_final() {
            f.write_str("final ")?;
        }
        match self.parameter_type() {
            Ok(ty) if self.is_varargs() && ty.is_array() => {
                write!(f, "{}...", ty.array_type(ty.array_dimension() - 1))?
            }
            Ok(ty) => write!(f, "{ty}")?,
            Err(err) => f.write_str(&unresolved(&err))?,
        }
        write!(f, " {}", self.name())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_modifiers(f, self.modifiers().keywords())?;
        match self.field_type() {
            Ok(ty) => write!(f, "{ty} ")?,
            Err(err) => write!(f, "{} ", unresolved(&err))?,
        }
        f.write_str(self.name())?;
        if let Some(value) = self.constant_value() {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_modifiers(f, self.modifiers().keywords())?;
        if !self.type_parameters().is_empty() {
            f.write_str("<")?;
            write_list(f, self.type_parameters(), ", ")?;
            f.write_str("> ")?;
        }
        match self.return_type() {
            Ok(Some(ty)) => write!(f, "{ty} ")?,
            Ok(None) => {}
            Err(err) => write!(f, "{} ", unresolved(&err))?,
        }
        f.write_str(self.name())?;
        f.write_str("(")?;
        write_list(f, self.parameters(), ", ")?;
        f.write_str(")")?;
        match self.exception_types() {
            Ok([]) => {}
            Ok(thrown) => {
                f.write_str(" throws ")?;
                write_list(f, thrown, ", ")?;
            }
            Err(err) => write!(f, " throws {}", unresolved(&err))?,
        }
        if let Some(value) = self.default_value() {
            write!(f, " default {value}")?;
        }
        Ok(())
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_modifiers(f: &mut fmt::Formatter<'_>, keywords: Vec<&str>) -> fmt::Result {
    for keyword in keywords {
        write!(f, "{keyword} ")?;
    }
    Ok(())
}

fn unresolved(err: &ModelError) -> String {
    match err {
        ModelError::UnresolvedType { name } => format!("<unresolved {name}>"),
        other => format!("<{other}>"),
    }
}

fn joined<T: fmt::Display>(items: Result<&[T]>, sep: &str) -> String {
    match items {
        Ok(items) => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(sep),
        Err(err) => unresolved(&err),
    }
}

/// Renders declaration outlines: annotations, header, members and nested types.
#[derive(Debug, Clone)]
pub struct Printer {
    indent: usize,
    members: bool,
    nested: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Printer {
            indent: 4,
            members: true,
            nested: true,
        }
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(mut self, width: usize) -> Self {
        self.indent = width;
        self
    }

    /// Headers only when `false`.
    pub fn members(mut self, enabled: bool) -> Self {
        self.members = enabled;
        self
    }

    pub fn nested_types(mut self, enabled: bool) -> Self {
        self.nested = enabled;
        self
    }

    pub fn print_unit(&self, unit: &CompilationUnit) -> String {
        let mut out = String::new();
        if !unit.package_name().is_empty() {
            let _ = writeln!(out, "package {};", unit.package_name());
        }
        for import in unit.imports() {
            let _ = writeln!(out, "{import}");
        }
        for ty in unit.types() {
            if !out.is_empty() {
                out.push('\n');
            }
            self.write_type(&mut out, ty, 0);
        }
        out
    }

    pub fn print_type(&self, ty: &Type) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, 0);
        out
    }

    /// One-line declaration header, e.g. `public class p.Child<X> extends p.Base<X, java.lang.Long>`.
    pub fn header(&self, ty: &Type) -> String {
        let mut out = String::new();
        for keyword in ty.modifiers().keywords() {
            if ty.is_interface() && keyword == "abstract" {
                continue;
            }
            let _ = write!(out, "{keyword} ");
        }
        let keyword = match ty.kind() {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
            TypeKind::Record => "record",
            TypeKind::Primitive | TypeKind::Void | TypeKind::Wildcard | TypeKind::TypeVariable => {
                return ty.to_string();
            }
        };
        let _ = write!(out, "{keyword} {}", ty.qualified_name());
        if !ty.type_parameters().is_empty() {
            let _ = write!(out, "<{}>", joined(Ok(ty.type_parameters()), ", "));
        }
        let implicit_super = matches!(
            ty.kind(),
            TypeKind::Enum | TypeKind::Record | TypeKind::Interface | TypeKind::Annotation
        );
        match ty.super_class() {
            Ok(Some(sup)) if !implicit_super && sup.qualified_name() != "java.lang.Object" => {
                let _ = write!(out, " extends {sup}");
            }
            Ok(_) => {}
            Err(err) => {
                let _ = write!(out, " extends {}", unresolved(&err));
            }
        }
        let interfaces = match ty.interfaces() {
            Ok(list) if ty.kind() == TypeKind::Annotation => Ok(&list[..0]),
            other => other,
        };
        if !matches!(interfaces, Ok([])) {
            let clause = if ty.is_interface() { "extends" } else { "implements" };
            let _ = write!(out, " {clause} {}", joined(interfaces, ", "));
        }
        out
    }

    fn write_type(&self, out: &mut String, ty: &Type, depth: usize) {
        let pad = " ".repeat(depth * self.indent);
        for annotation in ty.annotations() {
            let _ = writeln!(out, "{pad}{annotation}");
        }
        let _ = write!(out, "{pad}{}", self.header(ty));
        if !self.members {
            out.push('\n');
            return;
        }
        out.push_str(" {\n");
        let inner = " ".repeat((depth + 1) * self.indent);
        for field in ty.fields() {
            for annotation in field.annotations() {
                let _ = writeln!(out, "{inner}{annotation}");
            }
            if field.is_enum_constant() {
                let _ = writeln!(out, "{inner}{},", field.name());
            } else {
                let _ = writeln!(out, "{inner}{field};");
            }
        }
        for method in ty.methods() {
            for annotation in method.annotations() {
                let _ = writeln!(out, "{inner}{annotation}");
            }
            let _ = writeln!(out, "{inner}{method};");
        }
        if self.nested {
            for member in ty.member_types() {
                self.write_type(out, member, depth + 1);
            }
        }
        let _ = writeln!(out, "{pad}}}");
    }
}
