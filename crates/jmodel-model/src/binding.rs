//! Resolved bindings: the compiler-side view of declarations that both type representations
//! are built from.
//!
//! Bindings refer to other classes by dotted binary name (`java.util.Map$Entry`) and never hold
//! on to each other, so a binding graph has no ownership cycles.

use std::fmt;
use std::path::PathBuf;

use jmodel_classfile::{
    descriptor_to_internal_name, BaseType, ClassTypeSignature, ElementValue, FieldType,
    TypeArgument, TypeSignature,
};
use jmodel_classfile::{Annotation as ClassAnnotation, ConstValue as ClassConstValue};
use serde::Serialize;

use crate::flags::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Source,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

impl ClassKind {
    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::Annotation)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Annotation => "@interface",
            ClassKind::Record => "record",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WildcardKind {
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeBinding {
    Void,
    Primitive(BaseType),
    Class(ClassRef),
    Array(Box<TypeBinding>),
    Wildcard {
        bound: Option<Box<TypeBinding>>,
        kind: WildcardKind,
    },
    TypeVar(TypeVarRef),
    /// A name that did not resolve, as written.
    Problem(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    pub binary_name: String,
    pub args: Vec<TypeBinding>,
    /// Usage of the enclosing class, as in `Outer<String>.Inner`. Only kept when that usage or
    /// one further out has type arguments.
    pub outer: Option<Box<ClassRef>>,
}

impl ClassRef {
    pub fn new(binary_name: impl Into<String>, args: Vec<TypeBinding>) -> Self {
        ClassRef {
            binary_name: binary_name.into(),
            args,
            outer: None,
        }
    }

    /// Attaches `outer` when it carries type arguments anywhere along its chain.
    pub(crate) fn within(mut self, outer: ClassRef) -> Self {
        if outer.is_parameterized() {
            self.outer = Some(Box::new(outer));
        }
        self
    }

    pub fn is_parameterized(&self) -> bool {
        !self.args.is_empty() || self.outer.as_deref().is_some_and(ClassRef::is_parameterized)
    }

    fn is_problem(&self) -> bool {
        self.args.iter().any(TypeBinding::is_problem)
            || self.outer.as_deref().is_some_and(ClassRef::is_problem)
    }

    fn substitute(&self, owner: &TypeVarOwner, params: &[String], args: &[TypeBinding]) -> Self {
        ClassRef {
            binary_name: self.binary_name.clone(),
            args: self
                .args
                .iter()
                .map(|arg| arg.substitute(owner, params, args))
                .collect(),
            outer: self
                .outer
                .as_ref()
                .map(|outer| Box::new(outer.substitute(owner, params, args))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVarRef {
    pub name: String,
    pub owner: TypeVarOwner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeVarOwner {
    Class(String),
    /// Method type variables are keyed by declaring class, method name and arity.
    Method {
        class: String,
        method: String,
        arity: usize,
    },
}

impl TypeVarOwner {
    pub fn class_name(&self) -> &str {
        match self {
            TypeVarOwner::Class(class) | TypeVarOwner::Method { class, .. } => class,
        }
    }
}

impl TypeBinding {
    pub fn class(binary_name: impl Into<String>) -> Self {
        TypeBinding::Class(ClassRef::new(binary_name, Vec::new()))
    }

    pub fn object() -> Self {
        TypeBinding::class("java.lang.Object")
    }

    pub fn is_problem(&self) -> bool {
        match self {
            TypeBinding::Problem(_) => true,
            TypeBinding::Array(component) => component.is_problem(),
            TypeBinding::Class(class) => class.is_problem(),
            TypeBinding::Wildcard { bound, .. } => bound.as_deref().is_some_and(Self::is_problem),
            _ => false,
        }
    }

    /// Innermost non-array component and the number of array levels around it.
    pub fn leaf(&self) -> (&TypeBinding, usize) {
        let mut current = self;
        let mut dims = 0;
        while let TypeBinding::Array(component) = current {
            current = component;
            dims += 1;
        }
        (current, dims)
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeBinding::Class(class) => Some(&class.binary_name),
            _ => None,
        }
    }

    /// Replaces type variables owned by `owner` with the matching entry of `args`.
    pub fn substitute(&self, owner: &TypeVarOwner, params: &[String], args: &[TypeBinding]) -> Self {
        if args.is_empty() {
            return self.clone();
        }
        match self {
            TypeBinding::TypeVar(var) if &var.owner == owner => params
                .iter()
                .position(|name| *name == var.name)
                .and_then(|idx| args.get(idx))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeBinding::Class(class) => TypeBinding::Class(class.substitute(owner, params, args)),
            TypeBinding::Array(component) => {
                TypeBinding::Array(Box::new(component.substitute(owner, params, args)))
            }
            TypeBinding::Wildcard { bound, kind } => TypeBinding::Wildcard {
                bound: bound
                    .as_ref()
                    .map(|bound| Box::new(bound.substitute(owner, params, args))),
                kind: *kind,
            },
            _ => self.clone(),
        }
    }

    /// Erased text used in member keys, e.g. `java.util.List[]` or `T`.
    pub fn erased_name(&self) -> String {
        match self {
            TypeBinding::Void => "void".to_string(),
            TypeBinding::Primitive(base) => base.keyword().to_string(),
            TypeBinding::Class(class) => class.binary_name.clone(),
            TypeBinding::Array(component) => format!("{}[]", component.erased_name()),
            TypeBinding::Wildcard { .. } => "?".to_string(),
            TypeBinding::TypeVar(var) => var.name.clone(),
            TypeBinding::Problem(name) => name.clone(),
        }
    }

    pub(crate) fn from_field_type(ty: &FieldType) -> Self {
        match ty {
            FieldType::Base(base) => TypeBinding::Primitive(*base),
            FieldType::Object(internal) => TypeBinding::class(internal.replace('/', ".")),
            FieldType::Array(component) => {
                TypeBinding::Array(Box::new(TypeBinding::from_field_type(component)))
            }
        }
    }

    /// Class-literal descriptors additionally allow `V`.
    pub(crate) fn from_return_descriptor(desc: &str) -> Option<Self> {
        if desc == "V" {
            return Some(TypeBinding::Void);
        }
        jmodel_classfile::parse_field_descriptor(desc)
            .ok()
            .map(|ty| TypeBinding::from_field_type(&ty))
    }

    /// `var_owner` maps a type-variable name to the declaration that introduces it.
    pub(crate) fn from_signature(
        sig: &TypeSignature,
        var_owner: &dyn Fn(&str) -> TypeVarOwner,
    ) -> Self {
        match sig {
            TypeSignature::Base(base) => TypeBinding::Primitive(*base),
            TypeSignature::Array(component) => {
                TypeBinding::Array(Box::new(TypeBinding::from_signature(component, var_owner)))
            }
            TypeSignature::Class(class) => TypeBinding::from_class_signature(class, var_owner),
            TypeSignature::TypeVariable(name) => TypeBinding::TypeVar(TypeVarRef {
                name: name.clone(),
                owner: var_owner(name),
            }),
        }
    }

    pub(crate) fn from_class_signature(
        sig: &ClassTypeSignature,
        var_owner: &dyn Fn(&str) -> TypeVarOwner,
    ) -> Self {
        let mut internal = sig.package.clone();
        let mut current: Option<ClassRef> = None;
        for segment in &sig.segments {
            match &current {
                None if !internal.is_empty() => internal.push('/'),
                None => {}
                Some(_) => internal.push('$'),
            }
            internal.push_str(&segment.name);
            let args = segment
                .type_arguments
                .iter()
                .map(|arg| type_argument(arg, var_owner))
                .collect();
            let class = ClassRef::new(internal.replace('/', "."), args);
            current = Some(match current {
                Some(outer) => class.within(outer),
                None => class,
            });
        }
        match current {
            Some(class) => TypeBinding::Class(class),
            None => TypeBinding::Problem(sig.internal_name()),
        }
    }
}

fn type_argument(arg: &TypeArgument, var_owner: &dyn Fn(&str) -> TypeVarOwner) -> TypeBinding {
    match arg {
        TypeArgument::Any => TypeBinding::Wildcard {
            bound: None,
            kind: WildcardKind::Extends,
        },
        TypeArgument::Exact(ty) => TypeBinding::from_signature(ty, var_owner),
        TypeArgument::Extends(ty) => TypeBinding::Wildcard {
            bound: Some(Box::new(TypeBinding::from_signature(ty, var_owner))),
            kind: WildcardKind::Extends,
        },
        TypeArgument::Super(ty) => TypeBinding::Wildcard {
            bound: Some(Box::new(TypeBinding::from_signature(ty, var_owner))),
            kind: WildcardKind::Super,
        },
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nested = self.outer.as_deref().and_then(|outer| {
            let simple = self.binary_name.strip_prefix(outer.binary_name.as_str())?;
            Some((outer, simple.strip_prefix('$')?))
        });
        match nested {
            Some((outer, simple)) => write!(f, "{outer}.{simple}")?,
            None => f.write_str(&self.binary_name.replace('$', "."))?,
        }
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (idx, arg) in self.args.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeBinding::Void => f.write_str("void"),
            TypeBinding::Primitive(base) => f.write_str(base.keyword()),
            TypeBinding::Class(class) => write!(f, "{class}"),
            TypeBinding::Array(component) => write!(f, "{component}[]"),
            TypeBinding::Wildcard { bound: None, .. } => f.write_str("?"),
            TypeBinding::Wildcard {
                bound: Some(bound),
                kind: WildcardKind::Extends,
            } => write!(f, "? extends {bound}"),
            TypeBinding::Wildcard {
                bound: Some(bound),
                kind: WildcardKind::Super,
            } => write!(f, "? super {bound}"),
            TypeBinding::TypeVar(var) => f.write_str(&var.name),
            TypeBinding::Problem(name) => f.write_str(name),
        }
    }
}

/// A folded compile-time constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl ConstValue {
    pub fn base_type(&self) -> Option<BaseType> {
        Some(match self {
            ConstValue::Boolean(_) => BaseType::Boolean,
            ConstValue::Byte(_) => BaseType::Byte,
            ConstValue::Char(_) => BaseType::Char,
            ConstValue::Short(_) => BaseType::Short,
            ConstValue::Int(_) => BaseType::Int,
            ConstValue::Long(_) => BaseType::Long,
            ConstValue::Float(_) => BaseType::Float,
            ConstValue::Double(_) => BaseType::Double,
            ConstValue::String(_) => return None,
        })
    }

    pub(crate) fn as_i64(&self) -> Option<i64> {
        Some(match self {
            ConstValue::Byte(v) => i64::from(*v),
            ConstValue::Char(v) => i64::from(u32::from(*v)),
            ConstValue::Short(v) => i64::from(*v),
            ConstValue::Int(v) => i64::from(*v),
            ConstValue::Long(v) => *v,
            _ => return None,
        })
    }

    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Float(v) => Some(f64::from(*v)),
            ConstValue::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Casting conversion to `target`; `None` when Java forbids the cast.
    pub fn cast_to(&self, target: BaseType) -> Option<ConstValue> {
        if let ConstValue::Boolean(v) = self {
            return (target == BaseType::Boolean).then_some(ConstValue::Boolean(*v));
        }
        if target == BaseType::Boolean {
            return None;
        }
        let value = match self {
            ConstValue::Float(_) | ConstValue::Double(_) => {
                let v = self.as_f64()?;
                match target {
                    BaseType::Float => return Some(ConstValue::Float(v as f32)),
                    BaseType::Double => return Some(ConstValue::Double(v)),
                    // float -> long goes straight through; narrower targets pass through int.
                    BaseType::Long => v as i64,
                    _ => i64::from(v as i32),
                }
            }
            other => other.as_i64()?,
        };
        Some(match target {
            BaseType::Byte => ConstValue::Byte(value as i8),
            BaseType::Short => ConstValue::Short(value as i16),
            BaseType::Char => ConstValue::Char(char_from_u16(value as u16)),
            BaseType::Int => ConstValue::Int(value as i32),
            BaseType::Long => ConstValue::Long(value),
            BaseType::Float => ConstValue::Float(value as f32),
            BaseType::Double => ConstValue::Double(value as f64),
            BaseType::Boolean => return None,
        })
    }

    /// Java string conversion, as used by `+` with a `String` operand.
    pub fn to_java_string(&self) -> String {
        match self {
            ConstValue::Boolean(v) => v.to_string(),
            ConstValue::Byte(v) => v.to_string(),
            ConstValue::Char(v) => v.to_string(),
            ConstValue::Short(v) => v.to_string(),
            ConstValue::Int(v) => v.to_string(),
            ConstValue::Long(v) => v.to_string(),
            ConstValue::Float(v) => java_float_string(f64::from(*v), v.to_string(), format!("{v:e}")),
            ConstValue::Double(v) => java_float_string(*v, v.to_string(), format!("{v:e}")),
            ConstValue::String(v) => v.clone(),
        }
    }

    pub(crate) fn from_class_value(value: &ClassConstValue) -> Self {
        match value {
            ClassConstValue::Boolean(v) => ConstValue::Boolean(*v),
            ClassConstValue::Byte(v) => ConstValue::Byte(*v),
            ClassConstValue::Char(v) => ConstValue::Char(char_from_u16(*v)),
            ClassConstValue::Short(v) => ConstValue::Short(*v),
            ClassConstValue::Int(v) => ConstValue::Int(*v),
            ClassConstValue::Long(v) => ConstValue::Long(*v),
            ClassConstValue::Float(v) => ConstValue::Float(*v),
            ClassConstValue::Double(v) => ConstValue::Double(*v),
            ClassConstValue::String(v) => ConstValue::String(v.clone()),
        }
    }
}

/// Lone surrogates have no `char`; they map to U+FFFD.
pub(crate) fn char_from_u16(unit: u16) -> char {
    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// `plain` and `sci` are Rust's shortest plain and exponent renderings of the same value.
fn java_float_string(value: f64, plain: String, sci: String) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        // `1e10` -> `1.0E10`
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::String(v) => write!(f, "{v:?}"),
            ConstValue::Char(v) => write!(f, "{v:?}"),
            ConstValue::Long(v) => write!(f, "{v}L"),
            ConstValue::Float(_) => write!(f, "{}f", self.to_java_string()),
            other => f.write_str(&other.to_java_string()),
        }
    }
}

/// Value of an annotation element as the binder sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueBinding {
    Const(ConstValue),
    Enum { type_name: String, constant: String },
    Class(TypeBinding),
    Annotation(Box<AnnotationBinding>),
    Array(Vec<ValueBinding>),
    /// Not a constant: `null`, a missing expression, or something the binder cannot evaluate.
    Unknown,
}

impl ValueBinding {
    pub(crate) fn from_element_value(value: &ElementValue) -> Self {
        match value {
            ElementValue::Const(value) => ValueBinding::Const(ConstValue::from_class_value(value)),
            ElementValue::Enum {
                type_descriptor,
                const_name,
            } => match descriptor_to_internal_name(type_descriptor) {
                Some(internal) => ValueBinding::Enum {
                    type_name: internal.replace('/', "."),
                    constant: const_name.clone(),
                },
                None => ValueBinding::Unknown,
            },
            ElementValue::Class(desc) => TypeBinding::from_return_descriptor(desc)
                .map(ValueBinding::Class)
                .unwrap_or(ValueBinding::Unknown),
            ElementValue::Annotation(annotation) => ValueBinding::Annotation(Box::new(
                AnnotationBinding::from_class_annotation(annotation),
            )),
            ElementValue::Array(values) => {
                ValueBinding::Array(values.iter().map(ValueBinding::from_element_value).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationBinding {
    /// Binary name of the annotation interface, `None` when it did not resolve.
    pub type_name: Option<String>,
    /// Name as written in source, or the binary name for class-file annotations.
    pub written_name: String,
    /// Explicitly given elements, in declaration order.
    pub elements: Vec<(String, ValueBinding)>,
}

impl AnnotationBinding {
    pub(crate) fn from_class_annotation(annotation: &ClassAnnotation) -> Self {
        let type_name = annotation
            .type_internal_name()
            .map(|internal| internal.replace('/', "."));
        AnnotationBinding {
            written_name: type_name
                .clone()
                .unwrap_or_else(|| annotation.type_descriptor.clone()),
            type_name,
            elements: annotation
                .elements
                .iter()
                .map(|(name, value)| (name.clone(), ValueBinding::from_element_value(value)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamBinding {
    pub name: String,
    pub bounds: Vec<TypeBinding>,
    pub annotations: Vec<AnnotationBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: TypeBinding,
    pub constant: Option<ConstValue>,
    pub is_enum_constant: bool,
    pub annotations: Vec<AnnotationBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    /// `None` when a class file carries no parameter names.
    pub name: Option<String>,
    pub modifiers: Modifiers,
    pub ty: TypeBinding,
    pub annotations: Vec<AnnotationBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    /// Simple class name for constructors.
    pub name: String,
    pub modifiers: Modifiers,
    pub is_constructor: bool,
    pub is_varargs: bool,
    pub type_params: Vec<TypeParamBinding>,
    pub params: Vec<ParamBinding>,
    /// `None` for constructors.
    pub return_type: Option<TypeBinding>,
    pub throws: Vec<TypeBinding>,
    pub default_value: Option<ValueBinding>,
    pub annotations: Vec<AnnotationBinding>,
}

impl MethodBinding {
    pub fn var_owner(&self, class: &str) -> TypeVarOwner {
        TypeVarOwner::Method {
            class: class.to_string(),
            method: self.name.clone(),
            arity: self.params.len(),
        }
    }
}

/// A fully bound class, interface, enum, annotation interface or record.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBinding {
    /// `a.b.Outer$Inner`
    pub binary_name: String,
    /// `a.b.Outer.Inner`
    pub qualified_name: String,
    pub package: String,
    pub simple_name: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub origin: Origin,
    /// Binary name of the enclosing class for member types.
    pub enclosing: Option<String>,
    pub member_types: Vec<String>,
    pub type_params: Vec<TypeParamBinding>,
    pub super_class: Option<TypeBinding>,
    pub interfaces: Vec<TypeBinding>,
    pub fields: Vec<FieldBinding>,
    pub methods: Vec<MethodBinding>,
    pub annotations: Vec<AnnotationBinding>,
    /// Declaring file for source-backed classes.
    pub source_path: Option<PathBuf>,
}

impl ClassBinding {
    pub fn var_owner(&self) -> TypeVarOwner {
        TypeVarOwner::Class(self.binary_name.clone())
    }

    pub fn type_param_names(&self) -> Vec<String> {
        self.type_params.iter().map(|param| param.name.clone()).collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Element declarations of an annotation interface.
    pub fn element(&self, name: &str) -> Option<&MethodBinding> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.params.is_empty() && !method.is_constructor)
    }
}

/// `a.b.Outer$Inner` -> `a.b.Outer.Inner`
pub fn qualified_from_binary(binary_name: &str) -> String {
    binary_name.replace('$', ".")
}

/// Package and simple name of a binary name.
pub fn split_binary_name(binary_name: &str) -> (&str, &str) {
    let (package, class_part) = binary_name.rsplit_once('.').unwrap_or(("", binary_name));
    let simple = class_part.rsplit_once('$').map_or(class_part, |(_, simple)| simple);
    (package, simple)
}
