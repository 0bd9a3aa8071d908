//! Fields, methods, parameters and type parameters.
//!
//! Every member is declaration-driven or binding-driven, the same as the type that owns it.
//! Members never hold their owner [`Type`] node; they keep the owner's data and rebuild the
//! node on request, so owner and member caches do not keep each other alive.

mod field;
mod method;
mod param;
mod type_param;

use crate::binding::TypeBinding;
use crate::convert::convert;
use crate::env::binder::Scope;
use crate::env::Ctx;
use crate::error::Result;
use crate::key::TypeKey;
use crate::types::{BoundType, Repr, SourceType, Type};

pub use self::field::Field;
pub use self::method::Method;
pub use self::param::Parameter;
pub use self::type_param::TypeParameter;

pub(crate) use self::method::{MethodHeader, MethodRepr};

#[derive(Clone)]
pub(crate) enum MemberOwner {
    Source(SourceType),
    Bound(BoundType),
}

impl MemberOwner {
    pub(crate) fn ctx(&self) -> &Ctx {
        match self {
            MemberOwner::Source(source) => &source.ctx,
            MemberOwner::Bound(bound) => &bound.ctx,
        }
    }

    pub(crate) fn binary_name(&self) -> &str {
        match self {
            MemberOwner::Source(source) => source.loc.binary_name(),
            MemberOwner::Bound(bound) => &bound.binding.binary_name,
        }
    }

    pub(crate) fn to_type(&self) -> Type {
        match self {
            MemberOwner::Source(source) => Type::new(Repr::Source(source.clone()), 0, None),
            MemberOwner::Bound(bound) => Type::new(Repr::Bound(bound.clone()), 0, None),
        }
    }

    pub(crate) fn type_key(&self) -> TypeKey {
        TypeKey::new(self.binary_name(), 0)
    }

    /// Converts a member signature type of a binding-driven owner, with type arguments applied.
    pub(crate) fn convert_bound(&self, ty: &TypeBinding) -> Result<Type> {
        let ty = match self {
            MemberOwner::Bound(bound) => bound.substitute(ty),
            MemberOwner::Source(_) => ty.clone(),
        };
        convert(self.ctx(), &ty, None, 0, None)
    }

    /// Resolves a written type reference of a declaration-driven owner.
    pub(crate) fn convert_written(&self, scope: &Scope, tref: &jmodel_syntax::TypeRef) -> Result<Type> {
        let ctx = self.ctx();
        convert(ctx, &ctx.state.resolve_type_ref(scope, tref), None, 0, None)
    }
}
