//! Annotations and the values their elements carry.

use std::fmt;
use std::sync::{Arc, OnceLock};

use jmodel_syntax::ast;

use crate::binding::{AnnotationBinding, ConstValue, ValueBinding};
use crate::convert::convert;
use crate::env::binder::Scope;
use crate::env::Ctx;
use crate::members::Field;
use crate::types::Type;

#[derive(Clone)]
pub struct Annotation(Arc<AnnotationData>);

struct AnnotationData {
    ctx: Ctx,
    repr: AnnotationRepr,
    bound: OnceLock<AnnotationBinding>,
    values: OnceLock<Vec<AnnotationValue>>,
}

enum AnnotationRepr {
    /// Bound on first access.
    Source { scope: Scope, decl: ast::Annotation },
    Bound(AnnotationBinding),
}

impl Annotation {
    pub(crate) fn source(ctx: &Ctx, scope: Scope, decl: ast::Annotation) -> Annotation {
        Annotation::new(ctx, AnnotationRepr::Source { scope, decl })
    }

    pub(crate) fn bound(ctx: &Ctx, binding: AnnotationBinding) -> Annotation {
        Annotation::new(ctx, AnnotationRepr::Bound(binding))
    }

    fn new(ctx: &Ctx, repr: AnnotationRepr) -> Annotation {
        Annotation(Arc::new(AnnotationData {
            ctx: ctx.clone(),
            repr,
            bound: OnceLock::new(),
            values: OnceLock::new(),
        }))
    }

    fn binding(&self) -> &AnnotationBinding {
        match &self.0.repr {
            AnnotationRepr::Bound(binding) => binding,
            AnnotationRepr::Source { scope, decl } => self
                .0
                .bound
                .get_or_init(|| self.0.ctx.state.bind_annotation(scope, decl)),
        }
    }

    /// Simple name as written (`Retention` for `@java.lang.annotation.Retention`).
    pub fn name(&self) -> &str {
        let written = self.written_name();
        written
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(written)
    }

    /// Name as written in source; the binary name for class-file annotations.
    pub fn written_name(&self) -> &str {
        match &self.0.repr {
            AnnotationRepr::Source { decl, .. } => &decl.name,
            AnnotationRepr::Bound(binding) => &binding.written_name,
        }
    }

    /// Qualified name of the annotation interface, `None` when it did not resolve.
    pub fn qualified_name(&self) -> Option<String> {
        self.binding()
            .type_name
            .as_deref()
            .map(crate::binding::qualified_from_binary)
    }

    /// The annotation interface, `None` when it did not resolve.
    pub fn annotation_type(&self) -> Option<Type> {
        let type_name = self.binding().type_name.as_deref()?;
        Type::find(&self.0.ctx, type_name)
    }

    pub fn is_declaration_driven(&self) -> bool {
        matches!(self.0.repr, AnnotationRepr::Source { .. })
    }

    /// Explicit values in written order, then defaults of the remaining elements in declaration
    /// order.
    pub fn values(&self) -> &[AnnotationValue] {
        self.0.values.get_or_init(|| {
            let binding = self.binding();
            let mut values: Vec<AnnotationValue> = binding
                .elements
                .iter()
                .map(|(name, value)| AnnotationValue {
                    name: name.clone(),
                    value: Value::from_binding(&self.0.ctx, value),
                    is_default: false,
                })
                .collect();
            let declaration = binding
                .type_name
                .as_deref()
                .and_then(|name| self.0.ctx.state.binding(name));
            if let Some(declaration) = declaration {
                for element in &declaration.methods {
                    let Some(default) = &element.default_value else {
                        continue;
                    };
                    if binding.elements.iter().any(|(name, _)| *name == element.name) {
                        continue;
                    }
                    values.push(AnnotationValue {
                        name: element.name.clone(),
                        value: Value::from_binding(&self.0.ctx, default),
                        is_default: true,
                    });
                }
            }
            values
        })
    }

    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values().iter().find(|value| value.name == name)
    }
}

/// First annotation whose qualified, written or simple name is `name`.
pub(crate) fn find(annotations: &[Annotation], name: &str) -> Option<Annotation> {
    annotations
        .iter()
        .find(|annotation| {
            annotation.written_name() == name
                || annotation.name() == name
                || annotation.qualified_name().as_deref() == Some(name)
        })
        .cloned()
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name() == other.qualified_name()
            && self.written_name() == other.written_name()
            && self.values() == other.values()
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotation")
            .field("name", &self.written_name())
            .field("values", &self.values())
            .finish()
    }
}

/// One element of an annotation with its value.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationValue {
    name: String,
    value: Value,
    is_default: bool,
}

impl AnnotationValue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Taken from the element declaration rather than written.
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// An evaluated constant or annotation element value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A class literal.
    Type(Type),
    Enum(EnumConstant),
    Annotation(Annotation),
    Array(Vec<Value>),
    /// Not a constant. Accessors return `None` or empty.
    Unknown,
}

impl Value {
    pub(crate) fn from_binding(ctx: &Ctx, value: &ValueBinding) -> Value {
        match value {
            ValueBinding::Const(constant) => Value::from(constant.clone()),
            ValueBinding::Enum {
                type_name,
                constant,
            } => Value::Enum(EnumConstant {
                ctx: ctx.clone(),
                type_name: type_name.clone(),
                name: constant.clone(),
            }),
            ValueBinding::Class(ty) => match convert(ctx, ty, None, 0, None) {
                Ok(ty) => Value::Type(ty),
                Err(err) => {
                    tracing::debug!(target: "jmodel.eval", error = %err, "class literal did not resolve");
                    Value::Unknown
                }
            },
            ValueBinding::Annotation(annotation) => {
                Value::Annotation(Annotation::bound(ctx, annotation.as_ref().clone()))
            }
            ValueBinding::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Value::from_binding(ctx, item))
                    .collect(),
            ),
            ValueBinding::Unknown => Value::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            Value::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Value::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumConstant> {
        match self {
            Value::Enum(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            Value::Annotation(annotation) => Some(annotation),
            _ => None,
        }
    }

    /// Elements of an array value; empty for every other value.
    pub fn as_array(&self) -> &[Value] {
        match self {
            Value::Array(items) => items,
            _ => &[],
        }
    }
}

impl From<ConstValue> for Value {
    fn from(value: ConstValue) -> Self {
        match value {
            ConstValue::Boolean(v) => Value::Boolean(v),
            ConstValue::Byte(v) => Value::Byte(v),
            ConstValue::Char(v) => Value::Char(v),
            ConstValue::Short(v) => Value::Short(v),
            ConstValue::Int(v) => Value::Int(v),
            ConstValue::Long(v) => Value::Long(v),
            ConstValue::Float(v) => Value::Float(v),
            ConstValue::Double(v) => Value::Double(v),
            ConstValue::String(v) => Value::String(v),
        }
    }
}

/// A reference to an enum constant.
#[derive(Clone)]
pub struct EnumConstant {
    ctx: Ctx,
    type_name: String,
    name: String,
}

impl EnumConstant {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binary name of the enum.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn enum_type(&self) -> Option<Type> {
        Type::find(&self.ctx, &self.type_name)
    }

    /// The field that declares the constant.
    pub fn field(&self) -> Option<Field> {
        self.enum_type()?
            .field(&self.name)
            .filter(Field::is_enum_constant)
    }
}

impl PartialEq for EnumConstant {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.name == other.name
    }
}

impl fmt::Debug for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumConstant({}.{})", self.type_name, self.name)
    }
}
