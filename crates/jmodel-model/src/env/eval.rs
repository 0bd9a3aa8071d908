//! Annotation element and initializer values.

use jmodel_syntax::ast::Expr;

use crate::binding::{TypeBinding, ValueBinding};

use super::binder::{absent_value, constant_conversion, Scope};
use super::state::EnvState;

impl EnvState {
    /// Evaluates `expr` against the element type it is assigned to. Total: anything that is
    /// not a value becomes [`ValueBinding::Unknown`] (or an empty array for array elements).
    pub(crate) fn evaluate(
        &self,
        scope: &Scope,
        expr: &Expr,
        expected: Option<&TypeBinding>,
    ) -> ValueBinding {
        if let Some(TypeBinding::Array(component)) = expected {
            return match expr {
                Expr::ArrayInit(init) => ValueBinding::Array(
                    init.elements
                        .iter()
                        .map(|element| self.evaluate(scope, element, Some(component.as_ref())))
                        .collect(),
                ),
                _ => match self.evaluate(scope, expr, Some(component.as_ref())) {
                    ValueBinding::Unknown => absent_value(expected),
                    single => ValueBinding::Array(vec![single]),
                },
            };
        }

        match expr {
            // An array where a scalar is expected is an error; keep the elements anyway.
            Expr::ArrayInit(init) => ValueBinding::Array(
                init.elements
                    .iter()
                    .map(|element| self.evaluate(scope, element, None))
                    .collect(),
            ),
            Expr::Annotation(annotation) => {
                ValueBinding::Annotation(Box::new(self.bind_annotation(scope, annotation)))
            }
            Expr::ClassLiteral(literal) => {
                ValueBinding::Class(self.resolve_type_ref(scope, &literal.ty))
            }
            Expr::Paren(paren) => self.evaluate(scope, &paren.expr, expected),
            Expr::Name(_) | Expr::FieldAccess(_) => {
                if let Some(value) = self.enum_constant(scope, expr) {
                    return value;
                }
                self.constant(scope, expr, expected)
            }
            _ => self.constant(scope, expr, expected),
        }
    }

    fn constant(&self, scope: &Scope, expr: &Expr, expected: Option<&TypeBinding>) -> ValueBinding {
        let Some(value) = self.fold(scope, expr) else {
            return ValueBinding::Unknown;
        };
        let value = match expected {
            Some(ty @ (TypeBinding::Primitive(_) | TypeBinding::Class(_))) => {
                match constant_conversion(value.clone(), ty) {
                    Some(converted) => converted,
                    None if matches!(ty, TypeBinding::Class(_)) && !is_string(ty) => value,
                    None => return ValueBinding::Unknown,
                }
            }
            _ => value,
        };
        ValueBinding::Const(value)
    }

    fn enum_constant(&self, scope: &Scope, expr: &Expr) -> Option<ValueBinding> {
        let (class, site) = self.resolve_field_ref(scope, expr)?;
        if !site.is_enum_constant() {
            return None;
        }
        let constant = match expr {
            Expr::Name(name) => name.name.clone(),
            Expr::FieldAccess(access) => access.name.clone(),
            _ => return None,
        };
        Some(ValueBinding::Enum {
            type_name: class,
            constant,
        })
    }
}

fn is_string(ty: &TypeBinding) -> bool {
    ty.class_name() == Some("java.lang.String")
}
