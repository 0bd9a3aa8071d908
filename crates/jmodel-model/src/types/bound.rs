use std::sync::{Arc, Weak};

use crate::annotation::Annotation;
use crate::binding::{ClassBinding, ClassRef, TypeBinding};
use crate::convert::convert;
use crate::env::Ctx;
use crate::error::Result;
use crate::members::{Field, MemberOwner, Method, TypeParameter};

use super::{Type, TypeData};

/// A type read from a [`ClassBinding`], optionally parameterized.
#[derive(Clone)]
pub(crate) struct BoundType {
    pub(crate) ctx: Ctx,
    pub(crate) binding: Arc<ClassBinding>,
    /// Empty for declarations and raw usages.
    pub(crate) args: Arc<[TypeBinding]>,
    /// Parameterized usage of the enclosing class, as in `Outer<String>.Inner`.
    pub(crate) outer: Option<Arc<ClassRef>>,
    pub(crate) declaring: Option<Weak<TypeData>>,
}

impl BoundType {
    pub(crate) fn new(
        ctx: Ctx,
        binding: Arc<ClassBinding>,
        args: Vec<TypeBinding>,
        outer: Option<ClassRef>,
        declaring: Option<Weak<TypeData>>,
    ) -> Self {
        BoundType {
            ctx,
            binding,
            args: Arc::from(args),
            outer: outer.map(Arc::new),
            declaring,
        }
    }

    /// Applies this usage's type arguments, then those of each enclosing usage, to a signature
    /// of the class.
    pub(crate) fn substitute(&self, ty: &TypeBinding) -> TypeBinding {
        let mut ty = if self.args.is_empty() {
            ty.clone()
        } else {
            ty.substitute(
                &self.binding.var_owner(),
                &self.binding.type_param_names(),
                &self.args,
            )
        };
        let mut outer = self.outer.as_deref();
        while let Some(usage) = outer {
            if let Some(binding) = self.ctx.state.binding(&usage.binary_name) {
                ty = ty.substitute(&binding.var_owner(), &binding.type_param_names(), &usage.args);
            }
            outer = usage.outer.as_deref();
        }
        ty
    }

    fn convert(&self, ty: &TypeBinding) -> Result<Type> {
        convert(&self.ctx, &self.substitute(ty), None, 0, None)
    }

    pub(crate) fn declaring_type(&self) -> Option<Type> {
        if let Some(outer) = &self.outer {
            let usage = TypeBinding::Class(outer.as_ref().clone());
            if let Ok(declaring) = convert(&self.ctx, &usage, None, 0, None) {
                return Some(declaring);
            }
        }
        if let Some(declaring) = self.declaring.as_ref().and_then(Type::upgrade) {
            return Some(declaring);
        }
        let outer = self.binding.enclosing.as_deref()?;
        let binding = self.ctx.state.binding(outer)?;
        Some(Type::bound(self.ctx.clone(), binding, None))
    }

    pub(crate) fn super_class(&self) -> Result<Option<Type>> {
        self.binding
            .super_class
            .as_ref()
            .map(|ty| self.convert(ty))
            .transpose()
    }

    pub(crate) fn interfaces(&self) -> Result<Vec<Type>> {
        self.binding
            .interfaces
            .iter()
            .map(|ty| self.convert(ty))
            .collect()
    }

    pub(crate) fn type_arguments(&self) -> Result<Vec<Type>> {
        self.args
            .iter()
            .map(|arg| convert(&self.ctx, arg, None, 0, None))
            .collect()
    }

    pub(crate) fn type_parameters(&self) -> Vec<TypeParameter> {
        let owner = MemberOwner::Bound(self.clone());
        (0..self.binding.type_params.len())
            .filter_map(|index| TypeParameter::of_type(&owner, index))
            .collect()
    }

    pub(crate) fn member_types(&self, this: &Type) -> Vec<Type> {
        self.binding
            .member_types
            .iter()
            .filter_map(|name| self.ctx.state.binding(name))
            .filter(|binding| !binding.modifiers.is_generated())
            .map(|binding| Type::bound(self.ctx.clone(), binding, Some(this)))
            .collect()
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        let owner = MemberOwner::Bound(self.clone());
        self.binding
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.modifiers.is_generated())
            .filter_map(|(index, _)| Field::bound(&owner, index))
            .collect()
    }

    pub(crate) fn methods(&self) -> Vec<Method> {
        let owner = MemberOwner::Bound(self.clone());
        self.binding
            .methods
            .iter()
            .enumerate()
            .filter(|(_, method)| !method.modifiers.is_generated())
            .filter_map(|(index, _)| Method::bound(&owner, index))
            .collect()
    }

    pub(crate) fn annotations(&self) -> Vec<Annotation> {
        self.binding
            .annotations
            .iter()
            .map(|annotation| Annotation::bound(&self.ctx, annotation.clone()))
            .collect()
    }
}
