use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::annotation::{Annotation, Value};
use crate::binding::MethodBinding;
use crate::env::binder::{method_view, param_type, MethodSlot, MethodView, Scope};
use crate::error::Result;
use crate::flags::Modifiers;
use crate::key::{MemberKey, MemberKind};
use crate::types::{BoundType, SourceType, Type};

use super::{MemberOwner, Parameter, TypeParameter};

#[derive(Clone)]
pub struct Method(Arc<MethodData>);

struct MethodData {
    header: Arc<MethodHeader>,
    parameters: OnceLock<Vec<Parameter>>,
    return_type: OnceLock<Result<Option<Type>>>,
    throws: OnceLock<Result<Vec<Type>>>,
    type_parameters: OnceLock<Vec<TypeParameter>>,
    annotations: OnceLock<Vec<Annotation>>,
    default_value: OnceLock<Option<Value>>,
}

/// What parameters and type parameters need to find their method again.
pub(crate) struct MethodHeader {
    pub(crate) repr: MethodRepr,
    pub(crate) name: String,
    pub(crate) modifiers: Modifiers,
    pub(crate) is_constructor: bool,
    pub(crate) is_varargs: bool,
    pub(crate) arity: usize,
    signature: OnceLock<String>,
}

#[derive(Clone)]
pub(crate) enum MethodRepr {
    Source { owner: SourceType, slot: MethodSlot },
    /// `index` points into the owner binding's methods.
    Bound { owner: BoundType, index: usize },
}

impl MethodRepr {
    pub(crate) fn owner(&self) -> MemberOwner {
        match self {
            MethodRepr::Source { owner, .. } => MemberOwner::Source(owner.clone()),
            MethodRepr::Bound { owner, .. } => MemberOwner::Bound(owner.clone()),
        }
    }

    pub(crate) fn view(&self) -> Option<MethodView<'_>> {
        match self {
            MethodRepr::Source { owner, slot } => method_view(&owner.loc.decl, *slot),
            MethodRepr::Bound { .. } => None,
        }
    }

    pub(crate) fn binding(&self) -> Option<&MethodBinding> {
        match self {
            MethodRepr::Bound { owner, index } => owner.binding.methods.get(*index),
            MethodRepr::Source { .. } => None,
        }
    }

    /// Scope that names inside a source method resolve in.
    pub(crate) fn scope(&self) -> Option<Scope> {
        match self {
            MethodRepr::Source { owner, .. } => {
                let view = self.view()?;
                Some(owner.ctx.state.method_scope(&owner.loc, &view))
            }
            MethodRepr::Bound { .. } => None,
        }
    }
}

impl MethodHeader {
    /// Erased parameter list, e.g. `(int,java.lang.String[])`.
    pub(crate) fn signature(&self) -> &str {
        self.signature.get_or_init(|| {
            let erased: Vec<String> = match &self.repr {
                MethodRepr::Source { owner, .. } => match (self.repr.view(), self.repr.scope()) {
                    (Some(view), Some(scope)) => view
                        .params
                        .iter()
                        .map(|param| {
                            owner
                                .ctx
                                .state
                                .resolve_type_ref(&scope, &param_type(param))
                                .erased_name()
                        })
                        .collect(),
                    _ => Vec::new(),
                },
                MethodRepr::Bound { .. } => self
                    .repr
                    .binding()
                    .map(|method| method.params.iter().map(|p| p.ty.erased_name()).collect())
                    .unwrap_or_default(),
            };
            format!("({})", erased.join(","))
        })
    }

    pub(crate) fn key(&self) -> MemberKey {
        MemberKey {
            owner: self.repr.owner().type_key(),
            kind: MemberKind::Method,
            name: self.name.clone(),
            signature: self.signature().to_string(),
        }
    }
}

impl Method {
    pub(crate) fn source(owner: &MemberOwner, slot: MethodSlot) -> Option<Method> {
        let MemberOwner::Source(source) = owner else {
            return None;
        };
        let view = method_view(&source.loc.decl, slot)?;
        let header = MethodHeader {
            name: view.name.to_string(),
            modifiers: view.modifiers,
            is_constructor: view.is_constructor,
            is_varargs: view.is_varargs(),
            arity: view.params.len(),
            repr: MethodRepr::Source {
                owner: source.clone(),
                slot,
            },
            signature: OnceLock::new(),
        };
        Some(Method::from_header(Arc::new(header)))
    }

    pub(crate) fn bound(owner: &MemberOwner, index: usize) -> Option<Method> {
        let MemberOwner::Bound(bound) = owner else {
            return None;
        };
        let method = bound.binding.methods.get(index)?;
        let header = MethodHeader {
            name: method.name.clone(),
            modifiers: method.modifiers,
            is_constructor: method.is_constructor,
            is_varargs: method.is_varargs,
            arity: method.params.len(),
            repr: MethodRepr::Bound {
                owner: bound.clone(),
                index,
            },
            signature: OnceLock::new(),
        };
        Some(Method::from_header(Arc::new(header)))
    }

    pub(crate) fn from_header(header: Arc<MethodHeader>) -> Method {
        Method(Arc::new(MethodData {
            header,
            parameters: OnceLock::new(),
            return_type: OnceLock::new(),
            throws: OnceLock::new(),
            type_parameters: OnceLock::new(),
            annotations: OnceLock::new(),
            default_value: OnceLock::new(),
        }))
    }

    fn header(&self) -> &MethodHeader {
        &self.0.header
    }

    /// The simple class name for constructors.
    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.header().modifiers
    }

    pub fn is_constructor(&self) -> bool {
        self.header().is_constructor
    }

    pub fn is_varargs(&self) -> bool {
        self.header().is_varargs
    }

    pub fn declaring_type(&self) -> Type {
        self.header().repr.owner().to_type()
    }

    pub fn is_declaration_driven(&self) -> bool {
        matches!(self.header().repr, MethodRepr::Source { .. })
    }

    pub fn is_stale(&self) -> bool {
        self.header().repr.owner().ctx().is_stale()
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.0.parameters.get_or_init(|| {
            (0..self.header().arity)
                .filter_map(|index| Parameter::new(&self.0.header, index))
                .collect()
        })
    }

    /// `None` for constructors; `void` methods return the void type.
    pub fn return_type(&self) -> Result<Option<Type>> {
        self.0
            .return_type
            .get_or_init(|| {
                if self.is_constructor() {
                    return Ok(None);
                }
                let repr = &self.header().repr;
                let owner = repr.owner();
                match repr {
                    MethodRepr::Source { .. } => match (repr.view(), repr.scope()) {
                        (Some(view), Some(scope)) => match view.return_ty {
                            Some(tref) => owner.convert_written(&scope, tref).map(Some),
                            None => Ok(Some(Type::void())),
                        },
                        _ => Ok(None),
                    },
                    MethodRepr::Bound { .. } => repr
                        .binding()
                        .and_then(|method| method.return_type.as_ref())
                        .map(|ty| owner.convert_bound(ty))
                        .transpose(),
                }
            })
            .clone()
    }

    /// Declared exception types in declaration order.
    pub fn exception_types(&self) -> Result<&[Type]> {
        self.0
            .throws
            .get_or_init(|| {
                let repr = &self.header().repr;
                let owner = repr.owner();
                match repr {
                    MethodRepr::Source { .. } => match (repr.view(), repr.scope()) {
                        (Some(view), Some(scope)) => view
                            .throws
                            .iter()
                            .map(|tref| owner.convert_written(&scope, tref))
                            .collect(),
                        _ => Ok(Vec::new()),
                    },
                    MethodRepr::Bound { .. } => repr
                        .binding()
                        .map(|method| {
                            method
                                .throws
                                .iter()
                                .map(|ty| owner.convert_bound(ty))
                                .collect()
                        })
                        .unwrap_or_else(|| Ok(Vec::new())),
                }
            })
            .as_deref()
            .map_err(Clone::clone)
    }

    pub fn type_parameters(&self) -> &[TypeParameter] {
        self.0.type_parameters.get_or_init(|| {
            let repr = &self.header().repr;
            let count = match repr {
                MethodRepr::Source { .. } => repr.view().map_or(0, |view| view.type_params.len()),
                MethodRepr::Bound { .. } => repr.binding().map_or(0, |m| m.type_params.len()),
            };
            (0..count)
                .filter_map(|index| TypeParameter::of_method(&self.0.header, index))
                .collect()
        })
    }

    /// Default of an annotation interface element, coerced to the element type.
    pub fn default_value(&self) -> Option<&Value> {
        self.0
            .default_value
            .get_or_init(|| {
                let repr = &self.header().repr;
                let ctx = repr.owner().ctx().clone();
                match repr {
                    MethodRepr::Source { owner, .. } => {
                        let view = repr.view()?;
                        let expr = view.default_value?;
                        let scope = repr.scope()?;
                        let expected = view
                            .return_ty
                            .map(|tref| owner.ctx.state.resolve_type_ref(&scope, tref));
                        let value = owner.ctx.state.evaluate(&scope, expr, expected.as_ref());
                        Some(Value::from_binding(&ctx, &value))
                    }
                    MethodRepr::Bound { .. } => repr
                        .binding()
                        .and_then(|method| method.default_value.as_ref())
                        .map(|value| Value::from_binding(&ctx, value)),
                }
            })
            .as_ref()
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.0.annotations.get_or_init(|| {
            let repr = &self.header().repr;
            match repr {
                MethodRepr::Source { owner, .. } => match (repr.view(), repr.scope()) {
                    (Some(view), Some(scope)) => view
                        .annotations
                        .iter()
                        .map(|annotation| {
                            Annotation::source(&owner.ctx, scope.clone(), annotation.clone())
                        })
                        .collect(),
                    _ => Vec::new(),
                },
                MethodRepr::Bound { owner, .. } => repr
                    .binding()
                    .map(|method| {
                        method
                            .annotations
                            .iter()
                            .map(|annotation| Annotation::bound(&owner.ctx, annotation.clone()))
                            .collect()
                    })
                    .unwrap_or_default(),
            }
        })
    }

    pub fn annotation(&self, name: &str) -> Option<Annotation> {
        crate::annotation::find(self.annotations(), name)
    }

    /// Erased parameter list, e.g. `(int,java.lang.String[])`.
    pub fn signature(&self) -> &str {
        self.header().signature()
    }

    pub fn key(&self) -> MemberKey {
        self.header().key()
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method({})", self.key())
    }
}
