//! Compilation units: one parsed source file with its package, imports and top-level types.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use jmodel_syntax::Span;
use serde::Serialize;

use crate::env::state::{SourceTypeLoc, SourceUnit};
use crate::env::{CompileError, Ctx, LookupEnvironment};
use crate::key::UnitKey;
use crate::types::Type;

#[derive(Clone)]
pub struct CompilationUnit(Arc<UnitData>);

struct UnitData {
    ctx: Ctx,
    unit: Arc<SourceUnit>,
    key: UnitKey,
    imports: OnceLock<Vec<Import>>,
    types: OnceLock<Vec<Type>>,
}

/// An import declaration, in written form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Import {
    /// Dotted path without the trailing `.*`.
    pub path: String,
    pub is_static: bool,
    pub is_on_demand: bool,
    pub range: Span,
}

impl Import {
    /// Last path segment; `None` for on-demand imports.
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_on_demand {
            return None;
        }
        Some(self.path.rsplit('.').next().unwrap_or(&self.path))
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("import ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        f.write_str(&self.path)?;
        if self.is_on_demand {
            f.write_str(".*")?;
        }
        f.write_str(";")
    }
}

impl CompilationUnit {
    pub(crate) fn new(ctx: Ctx, unit: Arc<SourceUnit>) -> CompilationUnit {
        let key = UnitKey {
            package: unit.package.clone(),
            main_type: unit.main_type_name(),
        };
        CompilationUnit(Arc::new(UnitData {
            ctx,
            unit,
            key,
            imports: OnceLock::new(),
            types: OnceLock::new(),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.0.unit.path
    }

    pub fn text(&self) -> &str {
        &self.0.unit.text
    }

    /// Empty for the default package.
    pub fn package_name(&self) -> &str {
        &self.0.unit.package
    }

    pub fn environment(&self) -> LookupEnvironment {
        self.0.ctx.env.clone()
    }

    pub fn is_stale(&self) -> bool {
        self.0.ctx.is_stale()
    }

    pub fn key(&self) -> &UnitKey {
        &self.0.key
    }

    /// Imports in declaration order.
    pub fn imports(&self) -> &[Import] {
        self.0.imports.get_or_init(|| {
            self.0
                .unit
                .ast
                .imports
                .iter()
                .map(|import| Import {
                    path: import.path.clone(),
                    is_static: import.is_static,
                    is_on_demand: import.is_star,
                    range: import.range,
                })
                .collect()
        })
    }

    pub fn import(&self, index: usize) -> Option<&Import> {
        self.imports().get(index)
    }

    /// The single-type or single-static import that brings `simple_name` into scope.
    pub fn import_named(&self, simple_name: &str) -> Option<&Import> {
        self.imports()
            .iter()
            .find(|import| import.simple_name() == Some(simple_name))
    }

    /// Top-level types in declaration order.
    pub fn types(&self) -> &[Type] {
        self.0.types.get_or_init(|| {
            (0..self.0.unit.ast.types.len())
                .filter_map(|index| SourceTypeLoc::top_level(&self.0.unit, index))
                .map(|loc| Type::source(self.0.ctx.clone(), loc))
                .collect()
        })
    }

    /// The public top-level type, else the first one.
    pub fn main_type(&self) -> Option<Type> {
        self.types()
            .iter()
            .find(|ty| ty.name() == self.0.key.main_type)
            .cloned()
    }

    /// A top-level type by simple name, else the first member type with that name, searching
    /// nested types depth-first in declaration order.
    pub fn find_type(&self, simple_name: &str) -> Option<Type> {
        fn search(types: &[Type], simple_name: &str) -> Option<Type> {
            types.iter().find_map(|ty| {
                ty.member_types()
                    .iter()
                    .find(|member| member.name() == simple_name)
                    .cloned()
                    .or_else(|| search(ty.member_types(), simple_name))
            })
        }

        let types = self.types();
        types
            .iter()
            .find(|ty| ty.name() == simple_name)
            .cloned()
            .or_else(|| search(types, simple_name))
    }

    /// Syntax errors of the whole file.
    pub fn parse_errors(&self) -> Vec<CompileError> {
        self.0
            .unit
            .errors
            .iter()
            .map(|error| CompileError {
                message: error.message.clone(),
                range: error.range,
            })
            .collect()
    }
}

impl PartialEq for CompilationUnit {
    fn eq(&self, other: &Self) -> bool {
        self.0.key == other.0.key
    }
}

impl Eq for CompilationUnit {}

impl Hash for CompilationUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.key.hash(state);
    }
}

impl fmt::Debug for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationUnit")
            .field("key", &self.0.key)
            .field("path", &self.0.unit.path)
            .finish()
    }
}
