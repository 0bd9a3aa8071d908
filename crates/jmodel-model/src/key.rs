//! Structural keys. Model nodes compare and hash by these, never by address.

use std::fmt;

use serde::Serialize;

use crate::binding::TypeVarOwner;

/// Identity of a type: the declaration it denotes plus its array dimension.
///
/// `name` is the binary name for classes, the keyword for primitives and `void`, `?` for the
/// unconstrained wildcard and `owner:name` for type variables. Type arguments and wildcard
/// bounds do not take part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeKey {
    pub name: String,
    pub dims: usize,
}

impl TypeKey {
    pub fn new(name: impl Into<String>, dims: usize) -> Self {
        TypeKey {
            name: name.into(),
            dims,
        }
    }

    pub(crate) fn type_var(owner: &TypeVarOwner, name: &str, dims: usize) -> Self {
        let owner = match owner {
            TypeVarOwner::Class(class) => class.clone(),
            TypeVarOwner::Method {
                class,
                method,
                arity,
            } => format!("{class}#{method}/{arity}"),
        };
        TypeKey::new(format!("{owner}:{name}"), dims)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for _ in 0..self.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Method,
    Parameter,
    TypeParameter,
}

/// Identity of a member: its owner plus a signature that is unique within the owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberKey {
    pub owner: TypeKey,
    pub kind: MemberKind,
    pub name: String,
    /// Erased parameter list for methods (`(int,java.lang.String[])`), the enclosing method for
    /// parameters and method type parameters, empty otherwise.
    pub signature: String,
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Field => write!(f, "{}#{}", self.owner, self.name),
            MemberKind::Method => write!(f, "{}#{}{}", self.owner, self.name, self.signature),
            MemberKind::Parameter | MemberKind::TypeParameter if !self.signature.is_empty() => {
                write!(f, "{}#{}:{}", self.owner, self.signature, self.name)
            }
            MemberKind::Parameter | MemberKind::TypeParameter => {
                write!(f, "{}:{}", self.owner, self.name)
            }
        }
    }
}

/// Identity of a compilation unit: package plus the simple name of its main type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitKey {
    pub package: String,
    pub main_type: String,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.main_type)
        } else {
            write!(f, "{}/{}", self.package.replace('.', "/"), self.main_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_type_variables_include_the_arity() {
        let owner = TypeVarOwner::Method {
            class: "a.B".into(),
            method: "map".into(),
            arity: 2,
        };
        let key = TypeKey::type_var(&owner, "R", 1);
        assert_eq!(key.to_string(), "a.B#map/2:R[]");
        assert_ne!(key, TypeKey::type_var(&TypeVarOwner::Class("a.B".into()), "R", 1));
    }
}
