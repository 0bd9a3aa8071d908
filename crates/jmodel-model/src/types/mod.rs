//! The [`Type`] abstraction.
//!
//! A `Type` is permanently one of: declaration-driven (reads the parsed declaration of a
//! source type), binding-driven (reads a resolved [`ClassBinding`], possibly parameterized),
//! or a leaf (primitive, `void`, the unconstrained wildcard, a type variable). Every derived
//! collection is computed on first access and cached on the node.

mod bound;
mod source;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, Weak};

use jmodel_classfile::BaseType;
use serde::Serialize;

use crate::annotation::Annotation;
use crate::binding::{ClassBinding, ClassKind, Origin, TypeVarOwner, WildcardKind};
use crate::convert::convert;
use crate::env::state::{SourceTypeLoc, TypeLoc};
use crate::env::{Ctx, LookupEnvironment};
use crate::error::Result;
use crate::flags::Modifiers;
use crate::key::TypeKey;
use crate::members::{Field, Method, TypeParameter};
use crate::unit::CompilationUnit;

pub(crate) use self::bound::BoundType;
pub(crate) use self::source::SourceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    Primitive,
    Void,
    Wildcard,
    TypeVariable,
}

impl From<ClassKind> for TypeKind {
    fn from(kind: ClassKind) -> Self {
        match kind {
            ClassKind::Class => TypeKind::Class,
            ClassKind::Interface => TypeKind::Interface,
            ClassKind::Enum => TypeKind::Enum,
            ClassKind::Annotation => TypeKind::Annotation,
            ClassKind::Record => TypeKind::Record,
        }
    }
}

#[derive(Clone)]
pub struct Type(Arc<TypeData>);

pub(crate) struct TypeData {
    repr: Repr,
    dims: usize,
    wildcard: Option<WildcardKind>,
    names: Names,
    cache: TypeCache,
}

struct Names {
    simple: String,
    qualified: String,
    binary: String,
    package: String,
}

#[derive(Default)]
struct TypeCache {
    super_class: OnceLock<Result<Option<Type>>>,
    interfaces: OnceLock<Result<Vec<Type>>>,
    type_arguments: OnceLock<Result<Vec<Type>>>,
    type_parameters: OnceLock<Vec<TypeParameter>>,
    type_variable_bounds: OnceLock<Result<Vec<Type>>>,
    member_types: OnceLock<Vec<Type>>,
    fields: OnceLock<Vec<Field>>,
    methods: OnceLock<Vec<Method>>,
    annotations: OnceLock<Vec<Annotation>>,
}

#[derive(Clone)]
pub(crate) enum Repr {
    Source(SourceType),
    Bound(BoundType),
    Primitive(BaseType),
    Void,
    Wildcard,
    TypeVar(TypeVar),
}

#[derive(Clone)]
pub(crate) struct TypeVar {
    pub(crate) ctx: Ctx,
    pub(crate) name: String,
    pub(crate) owner: TypeVarOwner,
}

impl Names {
    fn of(repr: &Repr) -> Names {
        let leaf = |name: &str| Names {
            simple: name.to_string(),
            qualified: name.to_string(),
            binary: name.to_string(),
            package: String::new(),
        };
        match repr {
            Repr::Source(source) => {
                let binary = source.loc.binary_name().to_string();
                Names {
                    simple: source.loc.decl.name.clone(),
                    qualified: crate::binding::qualified_from_binary(&binary),
                    package: source.loc.unit.package.clone(),
                    binary,
                }
            }
            Repr::Bound(bound) => Names {
                simple: bound.binding.simple_name.clone(),
                qualified: bound.binding.qualified_name.clone(),
                binary: bound.binding.binary_name.clone(),
                package: bound.binding.package.clone(),
            },
            Repr::Primitive(base) => leaf(base.keyword()),
            Repr::Void => leaf("void"),
            Repr::Wildcard => leaf(""),
            Repr::TypeVar(var) => leaf(&var.name),
        }
    }
}

impl Type {
    pub(crate) fn new(repr: Repr, dims: usize, wildcard: Option<WildcardKind>) -> Type {
        let names = Names::of(&repr);
        Type(Arc::new(TypeData {
            repr,
            dims,
            wildcard,
            names,
            cache: TypeCache::default(),
        }))
    }

    pub(crate) fn source(ctx: Ctx, loc: SourceTypeLoc) -> Type {
        Type::new(Repr::Source(SourceType { ctx, loc }), 0, None)
    }

    pub(crate) fn bound(ctx: Ctx, binding: Arc<ClassBinding>, declaring: Option<&Type>) -> Type {
        let bound = BoundType::new(ctx, binding, Vec::new(), None, declaring.map(Type::downgrade));
        Type::new(Repr::Bound(bound), 0, None)
    }

    /// The shared `void` pseudo-type.
    pub fn void() -> Type {
        static VOID: OnceLock<Type> = OnceLock::new();
        VOID.get_or_init(|| Type::new(Repr::Void, 0, None)).clone()
    }

    /// The shared unconstrained wildcard `?`.
    pub fn wildcard() -> Type {
        static WILDCARD: OnceLock<Type> = OnceLock::new();
        WILDCARD
            .get_or_init(|| Type::new(Repr::Wildcard, 0, None))
            .clone()
    }

    pub fn primitive(base: BaseType) -> Type {
        Type::new(Repr::Primitive(base), 0, None)
    }

    pub(crate) fn find(ctx: &Ctx, name: &str) -> Option<Type> {
        let binary_name = ctx.state.resolve_name(name)?;
        match ctx.state.type_loc(&binary_name)? {
            TypeLoc::Source(loc) if loc.origin() == Origin::Source => {
                Some(Type::source(ctx.clone(), loc.clone()))
            }
            _ => Type::find_bound(ctx, &binary_name),
        }
    }

    pub(crate) fn find_bound(ctx: &Ctx, name: &str) -> Option<Type> {
        let binary_name = ctx.state.resolve_name(name)?;
        let binding = ctx.state.binding(&binary_name)?;
        Some(Type::bound(ctx.clone(), binding, None))
    }

    pub(crate) fn downgrade(&self) -> Weak<TypeData> {
        Arc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(weak: &Weak<TypeData>) -> Option<Type> {
        weak.upgrade().map(Type)
    }

    pub(crate) fn ctx(&self) -> Option<&Ctx> {
        match &self.0.repr {
            Repr::Source(source) => Some(&source.ctx),
            Repr::Bound(bound) => Some(&bound.ctx),
            Repr::TypeVar(var) => Some(&var.ctx),
            Repr::Primitive(_) | Repr::Void | Repr::Wildcard => None,
        }
    }

    pub(crate) fn source_parts(&self) -> Option<(&Ctx, &SourceTypeLoc)> {
        match &self.0.repr {
            Repr::Source(source) => Some((&source.ctx, &source.loc)),
            _ => None,
        }
    }

    /// Same declaration with a different shape.
    fn reshape(&self, dims: usize, wildcard: Option<WildcardKind>) -> Type {
        if dims == self.0.dims && wildcard == self.0.wildcard {
            return self.clone();
        }
        Type::new(self.0.repr.clone(), dims, wildcard)
    }

    /// Simple name; empty for the unconstrained wildcard. Describes the leaf of an array.
    pub fn name(&self) -> &str {
        &self.0.names.simple
    }

    /// `a.b.Outer.Inner`
    pub fn qualified_name(&self) -> &str {
        &self.0.names.qualified
    }

    /// `a.b.Outer$Inner`
    pub fn binary_name(&self) -> &str {
        &self.0.names.binary
    }

    pub fn package_name(&self) -> &str {
        &self.0.names.package
    }

    pub fn kind(&self) -> TypeKind {
        match &self.0.repr {
            Repr::Source(source) => source.kind().into(),
            Repr::Bound(bound) => bound.binding.kind.into(),
            Repr::Primitive(_) => TypeKind::Primitive,
            Repr::Void => TypeKind::Void,
            Repr::Wildcard => TypeKind::Wildcard,
            Repr::TypeVar(_) => TypeKind::TypeVariable,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match &self.0.repr {
            Repr::Source(source) => source.modifiers(),
            Repr::Bound(bound) => bound.binding.modifiers,
            _ => Modifiers::NONE,
        }
    }

    pub fn array_dimension(&self) -> usize {
        self.0.dims
    }

    pub fn is_array(&self) -> bool {
        self.0.dims > 0
    }

    pub fn leaf_component_type(&self) -> Type {
        self.reshape(0, None)
    }

    /// This declaration with `dims` array levels.
    pub fn array_type(&self, dims: usize) -> Type {
        self.reshape(dims, None)
    }

    /// `true` for `?` and for the bound of `? extends X` / `? super X`.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.0.repr, Repr::Wildcard) || self.0.wildcard.is_some()
    }

    /// How a bounded wildcard relates to this bound type.
    pub fn wildcard_kind(&self) -> Option<WildcardKind> {
        self.0.wildcard
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.0.repr, Repr::Primitive(_))
    }

    pub fn primitive_type(&self) -> Option<BaseType> {
        match self.0.repr {
            Repr::Primitive(base) => Some(base),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.0.repr, Repr::Void)
    }

    pub fn is_type_variable(&self) -> bool {
        matches!(self.0.repr, Repr::TypeVar(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind(), TypeKind::Interface | TypeKind::Annotation)
    }

    /// Reads a parsed declaration rather than a binding.
    pub fn is_declaration_driven(&self) -> bool {
        matches!(self.0.repr, Repr::Source(_))
    }

    /// Source or binary for class types, `None` for leaf types.
    pub fn origin(&self) -> Option<Origin> {
        match &self.0.repr {
            Repr::Source(source) => Some(source.loc.origin()),
            Repr::Bound(bound) => Some(bound.binding.origin),
            _ => None,
        }
    }

    pub fn environment(&self) -> Option<LookupEnvironment> {
        self.ctx().map(|ctx| ctx.env.clone())
    }

    /// Built in an environment generation that a reload has since replaced.
    pub fn is_stale(&self) -> bool {
        self.ctx().is_some_and(Ctx::is_stale)
    }

    pub fn key(&self) -> TypeKey {
        match &self.0.repr {
            Repr::TypeVar(var) => TypeKey::type_var(&var.owner, &var.name, self.0.dims),
            Repr::Wildcard => TypeKey::new("?", self.0.dims),
            _ => TypeKey::new(self.binary_name(), self.0.dims),
        }
    }

    /// Enclosing type of a member type.
    pub fn declaring_type(&self) -> Option<Type> {
        match &self.0.repr {
            Repr::Source(source) => source.declaring_type(),
            Repr::Bound(bound) => bound.declaring_type(),
            _ => None,
        }
    }

    /// Declaring type of a member type reached through a parameterized enclosing usage, as
    /// `p.Outer<java.lang.String>` for `p.Outer<java.lang.String>.Inner`.
    pub(crate) fn parameterized_outer(&self) -> Option<Type> {
        match &self.0.repr {
            Repr::Bound(bound) if bound.outer.is_some() => bound.declaring_type(),
            _ => None,
        }
    }

    pub fn super_class(&self) -> Result<Option<Type>> {
        self.0
            .cache
            .super_class
            .get_or_init(|| match &self.0.repr {
                Repr::Source(source) => source.super_class(),
                Repr::Bound(bound) => bound.super_class(),
                _ => Ok(None),
            })
            .clone()
    }

    pub fn interfaces(&self) -> Result<&[Type]> {
        self.0
            .cache
            .interfaces
            .get_or_init(|| match &self.0.repr {
                Repr::Source(source) => source.interfaces(),
                Repr::Bound(bound) => bound.interfaces(),
                _ => Ok(Vec::new()),
            })
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Declared type parameters of a generic declaration, also on parameterized usages.
    pub fn type_parameters(&self) -> &[TypeParameter] {
        self.0.cache.type_parameters.get_or_init(|| match &self.0.repr {
            Repr::Source(source) => source.type_parameters(),
            Repr::Bound(bound) => bound.type_parameters(),
            _ => Vec::new(),
        })
    }

    /// Type arguments of a parameterized usage; empty for declarations and raw usages.
    pub fn type_arguments(&self) -> Result<&[Type]> {
        self.0
            .cache
            .type_arguments
            .get_or_init(|| match &self.0.repr {
                Repr::Bound(bound) => bound.type_arguments(),
                _ => Ok(Vec::new()),
            })
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Declared bounds of a type variable; empty for every other type.
    pub fn type_variable_bounds(&self) -> Result<&[Type]> {
        self.0
            .cache
            .type_variable_bounds
            .get_or_init(|| match &self.0.repr {
                Repr::TypeVar(var) => var.bounds(),
                _ => Ok(Vec::new()),
            })
            .as_deref()
            .map_err(Clone::clone)
    }

    /// The class or method that declares a type variable.
    pub fn type_variable_owner(&self) -> Option<&TypeVarOwner> {
        match &self.0.repr {
            Repr::TypeVar(var) => Some(&var.owner),
            _ => None,
        }
    }

    pub fn member_types(&self) -> &[Type] {
        self.0.cache.member_types.get_or_init(|| match &self.0.repr {
            Repr::Source(source) => source.member_types(),
            Repr::Bound(bound) => bound.member_types(self),
            _ => Vec::new(),
        })
    }

    pub fn member_type(&self, name: &str) -> Option<Type> {
        self.member_types()
            .iter()
            .find(|ty| ty.name() == name)
            .cloned()
    }

    /// Declared fields, enum constants first, compiler-generated ones left out.
    pub fn fields(&self) -> &[Field] {
        self.0.cache.fields.get_or_init(|| match &self.0.repr {
            Repr::Source(source) => source.fields(),
            Repr::Bound(bound) => bound.fields(),
            _ => Vec::new(),
        })
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        self.fields()
            .iter()
            .find(|field| field.name() == name)
            .cloned()
    }

    /// Declared methods and constructors, compiler-generated ones left out.
    pub fn methods(&self) -> &[Method] {
        self.0.cache.methods.get_or_init(|| match &self.0.repr {
            Repr::Source(source) => source.methods(),
            Repr::Bound(bound) => bound.methods(),
            _ => Vec::new(),
        })
    }

    pub fn methods_named(&self, name: &str) -> Vec<Method> {
        self.methods()
            .iter()
            .filter(|method| !method.is_constructor() && method.name() == name)
            .cloned()
            .collect()
    }

    pub fn constructors(&self) -> Vec<Method> {
        self.methods()
            .iter()
            .filter(|method| method.is_constructor())
            .cloned()
            .collect()
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.0.cache.annotations.get_or_init(|| match &self.0.repr {
            Repr::Source(source) => source.annotations(),
            Repr::Bound(bound) => bound.annotations(),
            _ => Vec::new(),
        })
    }

    /// First annotation whose qualified or written name is `name`.
    pub fn annotation(&self, name: &str) -> Option<Annotation> {
        crate::annotation::find(self.annotations(), name)
    }

    /// The unit a source declaration was parsed from; `None` for binary and leaf types.
    pub fn compilation_unit(&self) -> Option<CompilationUnit> {
        match &self.0.repr {
            Repr::Source(source) if source.loc.origin() == Origin::Source => Some(
                CompilationUnit::new(source.ctx.clone(), source.loc.unit.clone()),
            ),
            _ => None,
        }
    }
}

impl TypeVar {
    fn bounds(&self) -> Result<Vec<Type>> {
        let Some(binding) = self.ctx.state.binding(self.owner.class_name()) else {
            return Ok(Vec::new());
        };
        let params = match &self.owner {
            TypeVarOwner::Class(_) => &binding.type_params,
            TypeVarOwner::Method { method, arity, .. } => {
                match binding
                    .methods
                    .iter()
                    .find(|m| m.name == *method && m.params.len() == *arity)
                {
                    Some(method) => &method.type_params,
                    None => return Ok(Vec::new()),
                }
            }
        };
        params
            .iter()
            .find(|param| param.name == self.name)
            .map(|param| {
                param
                    .bounds
                    .iter()
                    .map(|bound| convert(&self.ctx, bound, None, 0, None))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.key() == other.key()
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self.0.repr {
            Repr::Source(_) => "source",
            Repr::Bound(_) => "bound",
            _ => "leaf",
        };
        write!(f, "Type({} {})", variant, self.key())
    }
}
