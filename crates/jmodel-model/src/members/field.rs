use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::annotation::{Annotation, Value};
use crate::binding::{ConstValue, FieldBinding};
use crate::env::binder::{field_view, FieldSite, FieldSlot, Scope};
use crate::error::Result;
use crate::flags::Modifiers;
use crate::key::{MemberKey, MemberKind};
use crate::types::{BoundType, SourceType, Type};

use super::MemberOwner;

#[derive(Clone)]
pub struct Field(Arc<FieldData>);

struct FieldData {
    repr: FieldRepr,
    name: String,
    modifiers: Modifiers,
    is_enum_constant: bool,
    ty: OnceLock<Result<Type>>,
    constant: OnceLock<Option<ConstValue>>,
    annotations: OnceLock<Vec<Annotation>>,
}

enum FieldRepr {
    Source { owner: SourceType, slot: FieldSlot },
    /// `index` points into the owner binding's fields.
    Bound { owner: BoundType, index: usize },
}

impl FieldRepr {
    fn owner(&self) -> MemberOwner {
        match self {
            FieldRepr::Source { owner, .. } => MemberOwner::Source(owner.clone()),
            FieldRepr::Bound { owner, .. } => MemberOwner::Bound(owner.clone()),
        }
    }

    fn binding(&self) -> Option<&FieldBinding> {
        match self {
            FieldRepr::Bound { owner, index } => owner.binding.fields.get(*index),
            FieldRepr::Source { .. } => None,
        }
    }
}

impl Field {
    pub(crate) fn source(owner: &MemberOwner, slot: FieldSlot) -> Option<Field> {
        let MemberOwner::Source(source) = owner else {
            return None;
        };
        let view = field_view(&source.loc.decl, slot)?;
        Some(Field::new(
            FieldRepr::Source {
                owner: source.clone(),
                slot,
            },
            view.name.to_string(),
            view.modifiers,
            view.is_enum_constant,
        ))
    }

    pub(crate) fn bound(owner: &MemberOwner, index: usize) -> Option<Field> {
        let MemberOwner::Bound(bound) = owner else {
            return None;
        };
        let field = bound.binding.fields.get(index)?;
        Some(Field::new(
            FieldRepr::Bound {
                owner: bound.clone(),
                index,
            },
            field.name.clone(),
            field.modifiers,
            field.is_enum_constant,
        ))
    }

    fn new(repr: FieldRepr, name: String, modifiers: Modifiers, is_enum_constant: bool) -> Field {
        Field(Arc::new(FieldData {
            repr,
            name,
            modifiers,
            is_enum_constant,
            ty: OnceLock::new(),
            constant: OnceLock::new(),
            annotations: OnceLock::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.0.modifiers
    }

    pub fn is_enum_constant(&self) -> bool {
        self.0.is_enum_constant
    }

    pub fn declaring_type(&self) -> Type {
        self.0.repr.owner().to_type()
    }

    pub fn is_declaration_driven(&self) -> bool {
        matches!(self.0.repr, FieldRepr::Source { .. })
    }

    pub fn is_stale(&self) -> bool {
        self.0.repr.owner().ctx().is_stale()
    }

    /// Declared type; the enum itself for enum constants.
    pub fn field_type(&self) -> Result<Type> {
        self.0
            .ty
            .get_or_init(|| {
                let owner = self.0.repr.owner();
                match &self.0.repr {
                    FieldRepr::Source { owner: source, slot } => {
                        match field_view(&source.loc.decl, *slot).and_then(|view| view.ty) {
                            Some(tref) => owner.convert_written(&Scope::for_type(&source.loc), &tref),
                            None => Ok(owner.to_type()),
                        }
                    }
                    FieldRepr::Bound { .. } => match self.0.repr.binding() {
                        Some(field) => owner.convert_bound(&field.ty),
                        None => Ok(owner.to_type()),
                    },
                }
            })
            .clone()
    }

    /// Compile-time constant value, if the field has one.
    pub fn constant(&self) -> Option<&ConstValue> {
        self.0
            .constant
            .get_or_init(|| match &self.0.repr {
                FieldRepr::Source { owner, slot } => owner.ctx.state.field_constant(
                    owner.loc.binary_name(),
                    &FieldSite::Source {
                        loc: owner.loc.clone(),
                        slot: *slot,
                    },
                ),
                FieldRepr::Bound { .. } => {
                    self.0.repr.binding().and_then(|field| field.constant.clone())
                }
            })
            .as_ref()
    }

    /// [`constant`](Self::constant) as a model value.
    pub fn constant_value(&self) -> Option<Value> {
        self.constant().cloned().map(Value::from)
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.0.annotations.get_or_init(|| match &self.0.repr {
            FieldRepr::Source { owner, slot } => {
                let scope = Scope::for_type(&owner.loc);
                field_view(&owner.loc.decl, *slot)
                    .map(|view| {
                        view.annotations
                            .iter()
                            .map(|annotation| {
                                Annotation::source(&owner.ctx, scope.clone(), annotation.clone())
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            }
            FieldRepr::Bound { owner, .. } => self
                .0
                .repr
                .binding()
                .map(|field| {
                    field
                        .annotations
                        .iter()
                        .map(|annotation| Annotation::bound(&owner.ctx, annotation.clone()))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn annotation(&self, name: &str) -> Option<Annotation> {
        crate::annotation::find(self.annotations(), name)
    }

    pub fn key(&self) -> MemberKey {
        MemberKey {
            owner: self.0.repr.owner().type_key(),
            kind: MemberKind::Field,
            name: self.0.name.clone(),
            signature: String::new(),
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.key())
    }
}
