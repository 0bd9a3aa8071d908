//! The lookup environment: the classpath context that turns names into bindings.
//!
//! The environment owns one immutable [`EnvState`] per generation. Model nodes keep the
//! snapshot they were built from, so a [`LookupEnvironment::reload`] never changes what an
//! existing node returns; it only makes the node report [`Type::is_stale`].

mod binary;
pub(crate) mod binder;
mod check;
mod eval;
mod fold;
mod jdk;
pub(crate) mod state;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use jmodel_classpath::ClasspathEntry;
use jmodel_config::ModelConfig;
use parking_lot::{Mutex, RwLock};

use crate::annotation::Value;
use crate::binding::{ClassBinding, Origin};
use crate::error::Result;
use crate::types::Type;
use crate::unit::CompilationUnit;

use self::binder::Scope;
use self::state::{EnvState, Inputs, SourceUnit};

pub use self::check::CompileError;

/// Shared handle to a classpath context. Cloning is cheap; clones see the same reloads.
#[derive(Clone)]
pub struct LookupEnvironment {
    inner: Arc<EnvInner>,
}

struct EnvInner {
    inputs: Mutex<Inputs>,
    state: RwLock<Arc<EnvState>>,
}

/// The environment together with the generation a node was built in.
#[derive(Clone)]
pub(crate) struct Ctx {
    pub(crate) env: LookupEnvironment,
    pub(crate) state: Arc<EnvState>,
}

impl Ctx {
    pub(crate) fn is_stale(&self) -> bool {
        self.env.generation() != self.state.generation
    }
}

impl LookupEnvironment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::new()
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        config
            .classpath
            .iter()
            .fold(
                EnvironmentBuilder::new().builtin_jdk(config.builtin_jdk),
                |builder, entry| builder.entry(entry.clone()),
            )
            .build()
    }

    fn new(inputs: Inputs) -> Result<Self> {
        let state = EnvState::build(0, &inputs, None)?;
        Ok(LookupEnvironment {
            inner: Arc::new(EnvInner {
                inputs: Mutex::new(inputs),
                state: RwLock::new(Arc::new(state)),
            }),
        })
    }

    pub(crate) fn ctx(&self) -> Ctx {
        Ctx {
            env: self.clone(),
            state: self.inner.state.read().clone(),
        }
    }

    /// Bumped by every successful [`reload`](Self::reload).
    pub fn generation(&self) -> u64 {
        self.inner.state.read().generation
    }

    /// Binding for a dotted (`a.b.Outer.Inner`) or binary (`a.b.Outer$Inner`) name.
    pub fn resolve(&self, name: &str) -> Option<Arc<ClassBinding>> {
        let state = self.ctx().state;
        let binary_name = state.resolve_name(name)?;
        state.binding(&binary_name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.ctx().state.resolve_name(name).is_some()
    }

    /// Declaration-driven for source declarations, binding-driven for everything else.
    pub fn find_type(&self, name: &str) -> Option<Type> {
        Type::find(&self.ctx(), name)
    }

    /// Always binding-driven, also for source declarations.
    pub fn find_binding_type(&self, name: &str) -> Option<Type> {
        Type::find_bound(&self.ctx(), name)
    }

    pub fn compilation_unit(&self, path: &Path) -> Option<CompilationUnit> {
        let ctx = self.ctx();
        let unit = ctx.state.unit(path)?.clone();
        Some(CompilationUnit::new(ctx, unit))
    }

    /// Source compilation units in lookup order.
    pub fn compilation_units(&self) -> Vec<CompilationUnit> {
        let ctx = self.ctx();
        ctx.state
            .units
            .iter()
            .map(|unit| CompilationUnit::new(ctx.clone(), unit.clone()))
            .collect()
    }

    /// Qualified names of all source types, nested ones included, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let state = self.ctx().state;
        let mut names: Vec<String> = state
            .source_types()
            .map(|loc| crate::binding::qualified_from_binary(loc.binary_name()))
            .collect();
        names.sort();
        names
    }

    pub fn source_folders_and_binary_roots(&self) -> Vec<ClasspathEntry> {
        self.inner.inputs.lock().entries.clone()
    }

    /// Replaces the text of `path` at the next reload. Paths outside every source root are
    /// added as in-memory sources.
    pub fn set_source_text(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let path = path.into();
        tracing::debug!(target: "jmodel.env", path = %path.display(), "source text replaced");
        self.inner
            .inputs
            .lock()
            .overlays
            .insert(path, Some(text.into()));
    }

    /// Hides `path` from the next reload on, whether it lives on disk or in memory.
    pub fn remove_source_text(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!(target: "jmodel.env", path = %path.display(), "source text removed");
        self.inner.inputs.lock().overlays.insert(path, None);
    }

    /// Drops a replacement registered for `path`, so the next reload reads it from disk again.
    pub fn revert_source_text(&self, path: &Path) {
        self.inner.inputs.lock().overlays.remove(path);
    }

    /// Re-reads changed roots, applies replacement texts and starts a new generation.
    pub fn reload(&self) -> Result<()> {
        let inputs = self.inner.inputs.lock().clone();
        let mut state = self.inner.state.write();
        let next = EnvState::build(state.generation + 1, &inputs, Some(&state))?;
        tracing::info!(
            target: "jmodel.env",
            generation = next.generation,
            units = next.units.len(),
            "reloaded lookup environment"
        );
        *state = Arc::new(next);
        Ok(())
    }

    /// Compile errors of a declaration-driven type, against the generation it was built in.
    pub fn compile_errors(&self, ty: &Type) -> Vec<CompileError> {
        match ty.source_parts() {
            Some((ctx, loc)) => ctx.state.compile_errors(loc),
            None => Vec::new(),
        }
    }

    /// Evaluates a standalone expression, resolving names as if written inside `context`.
    pub fn evaluate(&self, expression: &str, context: Option<&Type>) -> Value {
        let (expr, errors) = jmodel_syntax::parse_expression(expression);
        if !errors.is_empty() {
            tracing::debug!(target: "jmodel.env", errors = errors.len(), "unparsable expression");
            return Value::Unknown;
        }
        let ctx = context
            .and_then(Type::ctx)
            .cloned()
            .unwrap_or_else(|| self.ctx());
        let scope = match context.and_then(Type::source_parts) {
            Some((_, loc)) => Scope::for_type(loc),
            None => Scope::detached(
                detached_unit(),
                context
                    .filter(|ty| ty.origin().is_some())
                    .map(|ty| ty.binary_name().to_string()),
            ),
        };
        let value = ctx.state.evaluate(&scope, &expr, None);
        Value::from_binding(&ctx, &value)
    }
}

fn detached_unit() -> &'static Arc<SourceUnit> {
    static UNIT: OnceLock<Arc<SourceUnit>> = OnceLock::new();
    UNIT.get_or_init(|| {
        Arc::new(SourceUnit::parse(
            PathBuf::from("<expression>"),
            "",
            Origin::Source,
        ))
    })
}

impl PartialEq for LookupEnvironment {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for LookupEnvironment {}

impl fmt::Debug for LookupEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("LookupEnvironment")
            .field("generation", &state.generation)
            .field("roots", &state.roots.len())
            .field("units", &state.units.len())
            .finish()
    }
}

/// Collects classpath entries and in-memory inputs for a [`LookupEnvironment`].
#[derive(Debug, Clone)]
pub struct EnvironmentBuilder {
    inputs: Inputs,
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        EnvironmentBuilder {
            inputs: Inputs {
                builtin_jdk: true,
                ..Inputs::default()
            },
        }
    }

    pub fn source_root(self, path: impl Into<PathBuf>) -> Self {
        self.entry(ClasspathEntry::source(path))
    }

    pub fn binary_root(self, path: impl Into<PathBuf>) -> Self {
        self.entry(ClasspathEntry::binary(path))
    }

    pub fn entry(mut self, entry: ClasspathEntry) -> Self {
        self.inputs.entries.push(entry);
        self
    }

    /// An in-memory source file; it shadows every configured entry.
    pub fn source_text(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.inputs.memory_sources.insert(path.into(), text.into());
        self
    }

    /// An in-memory class file, looked up after the configured entries.
    pub fn class_file(mut self, bytes: Vec<u8>) -> Self {
        self.inputs.memory_classes.push(bytes);
        self
    }

    pub fn builtin_jdk(mut self, enabled: bool) -> Self {
        self.inputs.builtin_jdk = enabled;
        self
    }

    pub fn build(self) -> Result<LookupEnvironment> {
        LookupEnvironment::new(self.inputs)
    }
}
