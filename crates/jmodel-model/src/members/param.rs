use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::annotation::Annotation;
use crate::env::binder::{keyword_modifiers, param_type};
use crate::error::{ModelError, Result};
use crate::flags::Modifiers;
use crate::key::{MemberKey, MemberKind};
use crate::types::Type;

use super::method::{MethodHeader, MethodRepr};
use super::Method;

#[derive(Clone)]
pub struct Parameter(Arc<ParamData>);

struct ParamData {
    method: Arc<MethodHeader>,
    index: usize,
    name: String,
    modifiers: Modifiers,
    ty: OnceLock<Result<Type>>,
    annotations: OnceLock<Vec<Annotation>>,
}

impl Parameter {
    pub(crate) fn new(method: &Arc<MethodHeader>, index: usize) -> Option<Parameter> {
        let (name, modifiers) = match &method.repr {
            MethodRepr::Source { .. } => {
                let view = method.repr.view()?;
                let param = view.params.get(index)?;
                (param.name.clone(), keyword_modifiers(&param.modifiers))
            }
            MethodRepr::Bound { .. } => {
                let param = method.repr.binding()?.params.get(index)?;
                let name = param
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("arg{index}"));
                (name, param.modifiers)
            }
        };
        Some(Parameter(Arc::new(ParamData {
            method: method.clone(),
            index,
            name,
            modifiers,
            ty: OnceLock::new(),
            annotations: OnceLock::new(),
        })))
    }

    /// Declared name, or `argN` when a class file does not record names.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn modifiers(&self) -> Modifiers {
        self.0.modifiers
    }

    /// The trailing parameter of a varargs method.
    pub fn is_varargs(&self) -> bool {
        self.0.method.is_varargs && self.0.index + 1 == self.0.method.arity
    }

    pub fn declaring_method(&self) -> Method {
        Method::from_header(self.0.method.clone())
    }

    pub fn is_declaration_driven(&self) -> bool {
        matches!(self.0.method.repr, MethodRepr::Source { .. })
    }

    /// Varargs parameters are arrays of the written element type.
    pub fn parameter_type(&self) -> Result<Type> {
        self.0
            .ty
            .get_or_init(|| {
                let repr = &self.0.method.repr;
                let owner = repr.owner();
                match repr {
                    MethodRepr::Source { .. } => {
                        match (repr.view(), repr.scope()) {
                            (Some(view), Some(scope)) => match view.params.get(self.0.index) {
                                Some(param) => owner.convert_written(&scope, &param_type(param)),
                                None => Err(ModelError::unresolved(self.0.name.clone())),
                            },
                            _ => Err(ModelError::unresolved(self.0.name.clone())),
                        }
                    }
                    MethodRepr::Bound { .. } => {
                        match repr.binding().and_then(|m| m.params.get(self.0.index)) {
                            Some(param) => owner.convert_bound(&param.ty),
                            None => Err(ModelError::unresolved(self.0.name.clone())),
                        }
                    }
                }
            })
            .clone()
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.0.annotations.get_or_init(|| {
            let repr = &self.0.method.repr;
            match repr {
                MethodRepr::Source { owner, .. } => match (repr.view(), repr.scope()) {
                    (Some(view), Some(scope)) => view
                        .params
                        .get(self.0.index)
                        .map(|param| {
                            param
                                .modifiers
                                .annotations
                                .iter()
                                .map(|annotation| {
                                    Annotation::source(&owner.ctx, scope.clone(), annotation.clone())
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                    _ => Vec::new(),
                },
                MethodRepr::Bound { owner, .. } => repr
                    .binding()
                    .and_then(|m| m.params.get(self.0.index))
                    .map(|param| {
                        param
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

    /// Positional: binary and source parameters of one method share keys even when the
    /// class file carries no names.
    pub fn key(&self) -> MemberKey {
        let method = &self.0.method;
        MemberKey {
            owner: method.repr.owner().type_key(),
            kind: MemberKind::Parameter,
            name: self.0.index.to_string(),
            signature: format!("{}{}", method.name, method.signature()),
        }
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({} {})", self.key(), self.0.name)
    }
}
