use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use jmodel_syntax::TypeParamDecl;

use crate::annotation::Annotation;
use crate::binding::{TypeParamBinding, TypeVarOwner};
use crate::convert::convert;
use crate::env::binder::{method_var_owner, Scope};
use crate::error::Result;
use crate::key::{MemberKey, MemberKind};
use crate::types::{Repr, Type, TypeVar};

use super::{MemberOwner, Method, MethodHeader, MethodRepr};

/// A declared type parameter of a generic type or method.
#[derive(Clone)]
pub struct TypeParameter(Arc<TypeParamData>);

struct TypeParamData {
    owner: TypeParamOwner,
    index: usize,
    name: String,
    bounds: OnceLock<Result<Vec<Type>>>,
    annotations: OnceLock<Vec<Annotation>>,
}

enum TypeParamOwner {
    Type(MemberOwner),
    Method(Arc<MethodHeader>),
}

/// The declaration behind a type parameter, in whichever form its owner has.
enum Declared<'a> {
    Source(&'a TypeParamDecl, Scope),
    Bound(&'a TypeParamBinding),
}

impl TypeParamOwner {
    fn member_owner(&self) -> MemberOwner {
        match self {
            TypeParamOwner::Type(owner) => owner.clone(),
            TypeParamOwner::Method(method) => method.repr.owner(),
        }
    }

    fn declared(&self, index: usize) -> Option<Declared<'_>> {
        match self {
            TypeParamOwner::Type(MemberOwner::Source(source)) => Some(Declared::Source(
                source.loc.decl.type_params.get(index)?,
                Scope::header(&source.loc),
            )),
            TypeParamOwner::Type(MemberOwner::Bound(bound)) => {
                bound.binding.type_params.get(index).map(Declared::Bound)
            }
            TypeParamOwner::Method(method) => match &method.repr {
                MethodRepr::Source { .. } => {
                    let view = method.repr.view()?;
                    let scope = method.repr.scope()?;
                    Some(Declared::Source(view.type_params.get(index)?, scope))
                }
                MethodRepr::Bound { .. } => method
                    .repr
                    .binding()?
                    .type_params
                    .get(index)
                    .map(Declared::Bound),
            },
        }
    }

    fn var_owner(&self) -> TypeVarOwner {
        match self {
            TypeParamOwner::Type(owner) => TypeVarOwner::Class(owner.binary_name().to_string()),
            TypeParamOwner::Method(method) => method_var_owner(
                method.repr.owner().binary_name(),
                &method.name,
                method.arity,
            ),
        }
    }
}

impl TypeParameter {
    pub(crate) fn of_type(owner: &MemberOwner, index: usize) -> Option<TypeParameter> {
        TypeParameter::new(TypeParamOwner::Type(owner.clone()), index)
    }

    pub(crate) fn of_method(method: &Arc<MethodHeader>, index: usize) -> Option<TypeParameter> {
        TypeParameter::new(TypeParamOwner::Method(method.clone()), index)
    }

    fn new(owner: TypeParamOwner, index: usize) -> Option<TypeParameter> {
        let name = match owner.declared(index)? {
            Declared::Source(decl, _) => decl.name.clone(),
            Declared::Bound(binding) => binding.name.clone(),
        };
        Some(TypeParameter(Arc::new(TypeParamData {
            owner,
            index,
            name,
            bounds: OnceLock::new(),
            annotations: OnceLock::new(),
        })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn declaring_type(&self) -> Type {
        self.0.owner.member_owner().to_type()
    }

    /// `None` for type parameters of a class.
    pub fn declaring_method(&self) -> Option<Method> {
        match &self.0.owner {
            TypeParamOwner::Method(method) => Some(Method::from_header(method.clone())),
            TypeParamOwner::Type(_) => None,
        }
    }

    /// Declared bounds in order; empty when the parameter has none.
    pub fn bounds(&self) -> Result<&[Type]> {
        self.0
            .bounds
            .get_or_init(|| {
                let owner = self.0.owner.member_owner();
                match self.0.owner.declared(self.0.index) {
                    Some(Declared::Source(decl, scope)) => decl
                        .bounds
                        .iter()
                        .map(|bound| owner.convert_written(&scope, bound))
                        .collect(),
                    Some(Declared::Bound(binding)) => binding
                        .bounds
                        .iter()
                        .map(|bound| convert(owner.ctx(), bound, None, 0, None))
                        .collect(),
                    None => Ok(Vec::new()),
                }
            })
            .as_deref()
            .map_err(Clone::clone)
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.0.annotations.get_or_init(|| {
            let owner = self.0.owner.member_owner();
            match self.0.owner.declared(self.0.index) {
                Some(Declared::Source(decl, scope)) => decl
                    .annotations
                    .iter()
                    .map(|annotation| Annotation::source(owner.ctx(), scope.clone(), annotation.clone()))
                    .collect(),
                Some(Declared::Bound(binding)) => binding
                    .annotations
                    .iter()
                    .map(|annotation| Annotation::bound(owner.ctx(), annotation.clone()))
                    .collect(),
                None => Vec::new(),
            }
        })
    }

    /// The type variable this parameter introduces.
    pub fn to_type(&self) -> Type {
        let owner = self.0.owner.member_owner();
        Type::new(
            Repr::TypeVar(TypeVar {
                ctx: owner.ctx().clone(),
                name: self.0.name.clone(),
                owner: self.0.owner.var_owner(),
            }),
            0,
            None,
        )
    }

    pub fn key(&self) -> MemberKey {
        let signature = match &self.0.owner {
            TypeParamOwner::Method(method) => format!("{}{}", method.name, method.signature()),
            TypeParamOwner::Type(_) => String::new(),
        };
        MemberKey {
            owner: self.0.owner.member_owner().type_key(),
            kind: MemberKind::TypeParameter,
            name: self.0.name.clone(),
            signature,
        }
    }
}

impl PartialEq for TypeParameter {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TypeParameter {}

impl Hash for TypeParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeParameter({})", self.key())
    }
}
