//! Binding-to-model conversion. Every [`Type`] built from a [`TypeBinding`] goes through here.

use crate::binding::{TypeBinding, WildcardKind};
use crate::env::Ctx;
use crate::error::{ModelError, Result};
use crate::types::{BoundType, Repr, Type, TypeVar};

/// Maps `binding` to a model type.
///
/// `hint` is the type the reference was found in; a member type of `hint` keeps it as its
/// declaring type instead of looking it up again. `dims` counts array levels already unwrapped
/// and `wildcard` tags the bound of a bounded wildcard.
pub(crate) fn convert(
    ctx: &Ctx,
    binding: &TypeBinding,
    hint: Option<&Type>,
    dims: usize,
    wildcard: Option<WildcardKind>,
) -> Result<Type> {
    match binding {
        TypeBinding::Void => Ok(Type::void()),
        TypeBinding::Wildcard { bound, kind } => match bound.as_deref() {
            Some(bound) if !is_trivial_bound(bound, *kind) => {
                convert(ctx, bound, hint, dims, Some(*kind))
            }
            _ => Ok(Type::wildcard()),
        },
        TypeBinding::Primitive(base) => Ok(Type::new(Repr::Primitive(*base), dims, wildcard)),
        TypeBinding::Array(component) => convert(ctx, component, hint, dims + 1, wildcard),
        TypeBinding::TypeVar(var) => Ok(Type::new(
            Repr::TypeVar(TypeVar {
                ctx: ctx.clone(),
                name: var.name.clone(),
                owner: var.owner.clone(),
            }),
            dims,
            wildcard,
        )),
        TypeBinding::Class(class) => {
            let binding = ctx
                .state
                .binding(&class.binary_name)
                .ok_or_else(|| ModelError::unresolved(class.binary_name.clone()))?;
            let declaring = hint
                .filter(|hint| binding.enclosing.as_deref() == Some(hint.binary_name()))
                .map(Type::downgrade);
            let bound = BoundType::new(
                ctx.clone(),
                binding,
                class.args.clone(),
                class.outer.as_deref().cloned(),
                declaring,
            );
            Ok(Type::new(Repr::Bound(bound), dims, wildcard))
        }
        TypeBinding::Problem(name) => {
            tracing::debug!(target: "jmodel.convert", name = %name, "unresolved type reference");
            Err(ModelError::unresolved(name.clone()))
        }
    }
}

/// `? extends Object` says no more than `?`.
fn is_trivial_bound(bound: &TypeBinding, kind: WildcardKind) -> bool {
    kind == WildcardKind::Extends && bound.class_name() == Some("java.lang.Object")
}
