//! Compile-time constant folding with Java semantics.
//!
//! Integral arithmetic wraps, integer division by zero is not a constant, and `float` results
//! are computed in `double` and then rounded, which is exact for the operators folded here.

use jmodel_classfile::BaseType;
use jmodel_syntax::ast::{BinaryOp, Expr, LiteralExpr, LiteralKind, UnaryOp};
use jmodel_syntax::LiteralValue;

use crate::binding::ConstValue;

use super::binder::{constant_conversion, Scope};
use super::state::EnvState;

impl EnvState {
    /// Value of `expr` if it is a constant expression.
    pub(crate) fn fold(&self, scope: &Scope, expr: &Expr) -> Option<ConstValue> {
        match expr {
            Expr::Literal(literal) => literal_value(literal),
            Expr::Paren(paren) => self.fold(scope, &paren.expr),
            Expr::Name(_) | Expr::FieldAccess(_) => {
                let (class, site) = self.resolve_field_ref(scope, expr)?;
                self.field_constant(&class, &site)
            }
            Expr::Unary(unary) => fold_unary(unary.op, self.fold(scope, &unary.operand)?),
            Expr::Binary(binary) => {
                let lhs = self.fold(scope, &binary.lhs)?;
                let rhs = self.fold(scope, &binary.rhs)?;
                fold_binary(binary.op, lhs, rhs)
            }
            Expr::Conditional(conditional) => {
                let ConstValue::Boolean(condition) = self.fold(scope, &conditional.condition)?
                else {
                    return None;
                };
                let then_value = self.fold(scope, &conditional.then_expr)?;
                let else_value = self.fold(scope, &conditional.else_expr)?;
                fold_conditional(condition, then_value, else_value)
            }
            Expr::Cast(cast) => {
                let value = self.fold(scope, &cast.expr)?;
                constant_conversion(value, &self.resolve_type_ref(scope, &cast.ty))
            }
            _ => None,
        }
    }
}

pub(crate) fn literal_value(literal: &LiteralExpr) -> Option<ConstValue> {
    match literal.kind {
        LiteralKind::True => return Some(ConstValue::Boolean(true)),
        LiteralKind::False => return Some(ConstValue::Boolean(false)),
        LiteralKind::Null => return None,
        _ => {}
    }
    let value = match jmodel_syntax::parse_literal(literal.kind, &literal.text) {
        Ok(value) => value,
        Err(err) => {
            tracing::trace!(target: "jmodel.env", text = %literal.text, error = %err, "bad literal");
            return None;
        }
    };
    Some(match value {
        LiteralValue::Int(v) => ConstValue::Int(v),
        LiteralValue::Long(v) => ConstValue::Long(v),
        LiteralValue::Float(v) => ConstValue::Float(v),
        LiteralValue::Double(v) => ConstValue::Double(v),
        LiteralValue::Char(v) => ConstValue::Char(v),
        LiteralValue::String(v) => ConstValue::String(v),
    })
}

/// Unary numeric promotion: `byte`, `short` and `char` widen to `int`.
fn unary_promoted(value: &ConstValue) -> Option<BaseType> {
    match value.base_type()? {
        BaseType::Boolean => None,
        BaseType::Byte | BaseType::Short | BaseType::Char | BaseType::Int => Some(BaseType::Int),
        other => Some(other),
    }
}

/// Binary numeric promotion.
fn binary_promoted(lhs: &ConstValue, rhs: &ConstValue) -> Option<BaseType> {
    let lhs = unary_promoted(lhs)?;
    let rhs = unary_promoted(rhs)?;
    Some(if lhs == BaseType::Double || rhs == BaseType::Double {
        BaseType::Double
    } else if lhs == BaseType::Float || rhs == BaseType::Float {
        BaseType::Float
    } else if lhs == BaseType::Long || rhs == BaseType::Long {
        BaseType::Long
    } else {
        BaseType::Int
    })
}

/// Narrows an `i64` or `f64` result back to the promoted type.
fn narrow(ty: BaseType, integral: Option<i64>, floating: Option<f64>) -> Option<ConstValue> {
    match ty {
        BaseType::Int => integral.map(|v| ConstValue::Int(v as i32)),
        BaseType::Long => integral.map(ConstValue::Long),
        BaseType::Float => floating.map(|v| ConstValue::Float(v as f32)),
        BaseType::Double => floating.map(ConstValue::Double),
        _ => None,
    }
}

fn is_integral(ty: BaseType) -> bool {
    matches!(ty, BaseType::Int | BaseType::Long)
}

pub(crate) fn fold_unary(op: UnaryOp, value: ConstValue) -> Option<ConstValue> {
    if let ConstValue::Boolean(v) = value {
        return (op == UnaryOp::Not).then_some(ConstValue::Boolean(!v));
    }
    let ty = unary_promoted(&value)?;
    let value = value.cast_to(ty)?;
    match op {
        UnaryOp::Plus => Some(value),
        UnaryOp::Minus => match value {
            ConstValue::Int(v) => Some(ConstValue::Int(v.wrapping_neg())),
            ConstValue::Long(v) => Some(ConstValue::Long(v.wrapping_neg())),
            ConstValue::Float(v) => Some(ConstValue::Float(-v)),
            ConstValue::Double(v) => Some(ConstValue::Double(-v)),
            _ => None,
        },
        UnaryOp::BitNot => match value {
            ConstValue::Int(v) => Some(ConstValue::Int(!v)),
            ConstValue::Long(v) => Some(ConstValue::Long(!v)),
            _ => None,
        },
        UnaryOp::Not => None,
    }
}

pub(crate) fn fold_binary(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
    if op == BinaryOp::Add
        && (matches!(lhs, ConstValue::String(_)) || matches!(rhs, ConstValue::String(_)))
    {
        return Some(ConstValue::String(format!(
            "{}{}",
            lhs.to_java_string(),
            rhs.to_java_string()
        )));
    }
    if let (ConstValue::Boolean(a), ConstValue::Boolean(b)) = (&lhs, &rhs) {
        let (a, b) = (*a, *b);
        return Some(ConstValue::Boolean(match op {
            BinaryOp::BitAnd | BinaryOp::And => a & b,
            BinaryOp::BitOr | BinaryOp::Or => a | b,
            BinaryOp::BitXor | BinaryOp::Ne => a ^ b,
            BinaryOp::Eq => a == b,
            _ => return None,
        }));
    }

    match op {
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => fold_shift(op, lhs, rhs),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne => {
            fold_comparison(op, &lhs, &rhs)
        }
        BinaryOp::And | BinaryOp::Or => None,
        _ => fold_arithmetic(op, &lhs, &rhs),
    }
}

fn fold_arithmetic(op: BinaryOp, lhs: &ConstValue, rhs: &ConstValue) -> Option<ConstValue> {
    let ty = binary_promoted(lhs, rhs)?;
    if is_integral(ty) {
        let a = lhs.cast_to(ty)?.as_i64()?;
        let b = rhs.cast_to(ty)?.as_i64()?;
        let result = match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b == 0 => return None,
            BinaryOp::Div => a.wrapping_div(b),
            BinaryOp::Rem if b == 0 => return None,
            BinaryOp::Rem => a.wrapping_rem(b),
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            _ => return None,
        };
        // Int operands were sign-extended, so truncation gives the wrapped 32-bit result.
        narrow(ty, Some(result), None)
    } else {
        let a = lhs.cast_to(ty)?.as_f64()?;
        let b = rhs.cast_to(ty)?.as_f64()?;
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            _ => return None,
        };
        narrow(ty, None, Some(result))
    }
}

fn fold_shift(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
    let ty = unary_promoted(&lhs)?;
    let distance = match unary_promoted(&rhs)? {
        BaseType::Int | BaseType::Long => rhs.as_i64()?,
        _ => return None,
    };
    match lhs.cast_to(ty)? {
        ConstValue::Int(v) => {
            let distance = (distance & 0x1f) as u32;
            Some(ConstValue::Int(match op {
                BinaryOp::Shl => v.wrapping_shl(distance),
                BinaryOp::Shr => v.wrapping_shr(distance),
                _ => ((v as u32) >> distance) as i32,
            }))
        }
        ConstValue::Long(v) => {
            let distance = (distance & 0x3f) as u32;
            Some(ConstValue::Long(match op {
                BinaryOp::Shl => v.wrapping_shl(distance),
                BinaryOp::Shr => v.wrapping_shr(distance),
                _ => ((v as u64) >> distance) as i64,
            }))
        }
        _ => None,
    }
}

fn fold_comparison(op: BinaryOp, lhs: &ConstValue, rhs: &ConstValue) -> Option<ConstValue> {
    let ty = binary_promoted(lhs, rhs)?;
    let ordering = if is_integral(ty) {
        let a = lhs.cast_to(ty)?.as_i64()?;
        let b = rhs.cast_to(ty)?.as_i64()?;
        a.partial_cmp(&b)
    } else {
        let a = lhs.cast_to(ty)?.as_f64()?;
        let b = rhs.cast_to(ty)?.as_f64()?;
        a.partial_cmp(&b)
    };
    use std::cmp::Ordering::*;
    // NaN compares unordered: every relation is false except `!=`.
    let result = match (op, ordering) {
        (BinaryOp::Ne, None) => true,
        (_, None) => false,
        (BinaryOp::Lt, Some(o)) => o == Less,
        (BinaryOp::Gt, Some(o)) => o == Greater,
        (BinaryOp::Le, Some(o)) => o != Greater,
        (BinaryOp::Ge, Some(o)) => o != Less,
        (BinaryOp::Eq, Some(o)) => o == Equal,
        (BinaryOp::Ne, Some(o)) => o != Equal,
        _ => return None,
    };
    Some(ConstValue::Boolean(result))
}

fn fold_conditional(condition: bool, then_value: ConstValue, else_value: ConstValue) -> Option<ConstValue> {
    let chosen = if condition { then_value.clone() } else { else_value.clone() };
    let (then_ty, else_ty) = match (then_value.base_type(), else_value.base_type()) {
        (Some(then_ty), Some(else_ty)) => (then_ty, else_ty),
        // Both strings: a constant. A string and a primitive: not one.
        (None, None) => return Some(chosen),
        _ => return None,
    };
    if then_ty == else_ty {
        return Some(chosen);
    }
    if then_ty == BaseType::Boolean || else_ty == BaseType::Boolean {
        return None;
    }
    // An int constant representable in the other operand's narrower type takes that type.
    let narrower = |value: &ConstValue, other: BaseType| {
        matches!(value, ConstValue::Int(_))
            && matches!(other, BaseType::Byte | BaseType::Short | BaseType::Char)
            && value
                .cast_to(other)
                .and_then(|narrowed| narrowed.as_i64())
                .zip(value.as_i64())
                .is_some_and(|(narrowed, original)| narrowed == original)
    };
    let ty = if narrower(&then_value, else_ty) {
        else_ty
    } else if narrower(&else_value, then_ty) {
        then_ty
    } else if matches!((then_ty, else_ty), (BaseType::Byte, BaseType::Short) | (BaseType::Short, BaseType::Byte)) {
        BaseType::Short
    } else {
        binary_promoted(&then_value, &else_value)?
    };
    chosen.cast_to(ty)
}
