use crate::annotation::Annotation;
use crate::binding::ClassKind;
use crate::convert::convert;
use crate::env::binder::{class_kind, class_modifiers, field_slots, method_slots, Scope};
use crate::env::state::SourceTypeLoc;
use crate::env::Ctx;
use crate::error::Result;
use crate::flags::Modifiers;
use crate::members::{Field, MemberOwner, Method, TypeParameter};

use super::Type;

/// A type read from its parsed declaration. Relatives are found through the unit by path.
#[derive(Clone)]
pub(crate) struct SourceType {
    pub(crate) ctx: Ctx,
    pub(crate) loc: SourceTypeLoc,
}

impl SourceType {
    pub(crate) fn kind(&self) -> ClassKind {
        class_kind(self.loc.decl.kind)
    }

    pub(crate) fn modifiers(&self) -> Modifiers {
        class_modifiers(&self.loc)
    }

    pub(crate) fn declaring_type(&self) -> Option<Type> {
        self.loc
            .enclosing()
            .map(|loc| Type::source(self.ctx.clone(), loc))
    }

    pub(crate) fn super_class(&self) -> Result<Option<Type>> {
        self.ctx
            .state
            .super_class_binding(&self.loc)
            .map(|ty| convert(&self.ctx, &ty, None, 0, None))
            .transpose()
    }

    pub(crate) fn interfaces(&self) -> Result<Vec<Type>> {
        self.ctx
            .state
            .interface_bindings(&self.loc)
            .iter()
            .map(|ty| convert(&self.ctx, ty, None, 0, None))
            .collect()
    }

    pub(crate) fn type_parameters(&self) -> Vec<TypeParameter> {
        let owner = MemberOwner::Source(self.clone());
        (0..self.loc.decl.type_params.len())
            .filter_map(|index| TypeParameter::of_type(&owner, index))
            .collect()
    }

    pub(crate) fn member_types(&self) -> Vec<Type> {
        self.loc
            .member_types()
            .map(|loc| Type::source(self.ctx.clone(), loc))
            .collect()
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        let owner = MemberOwner::Source(self.clone());
        field_slots(&self.loc.decl)
            .into_iter()
            .filter_map(|slot| Field::source(&owner, slot))
            .collect()
    }

    pub(crate) fn methods(&self) -> Vec<Method> {
        let owner = MemberOwner::Source(self.clone());
        method_slots(&self.loc.decl)
            .into_iter()
            .filter(|slot| !slot.is_generated())
            .filter_map(|slot| Method::source(&owner, slot))
            .collect()
    }

    pub(crate) fn annotations(&self) -> Vec<Annotation> {
        let scope = Scope::header(&self.loc);
        self.loc
            .decl
            .modifiers
            .annotations
            .iter()
            .map(|annotation| Annotation::source(&self.ctx, scope.clone(), annotation.clone()))
            .collect()
    }
}
