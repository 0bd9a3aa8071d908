//! One immutable generation of the environment: parsed units, indexed roots and the type table.
//!
//! Lookups are first-wins in root order. Caches live next to the data they are derived from so
//! a reload simply drops them together with the old snapshot.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jmodel_classfile::ClassStub;
use jmodel_classpath::{BinaryRoot, ClasspathEntry, ClasspathFingerprint, SourceRoot};
use jmodel_syntax::{ast, ParseError, TypeDecl};
use parking_lot::Mutex;

use crate::binding::{ClassBinding, ConstValue, Origin};
use crate::error::{ModelError, Result};

pub(crate) struct SourceUnit {
    pub(crate) path: PathBuf,
    pub(crate) text: Arc<str>,
    pub(crate) ast: ast::CompilationUnit,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) package: String,
    pub(crate) origin: Origin,
}

impl SourceUnit {
    pub(crate) fn parse(path: PathBuf, text: &str, origin: Origin) -> Self {
        let (ast, errors) = jmodel_syntax::parse(text).into_parts();
        let package = ast
            .package
            .as_ref()
            .map(|package| package.name.clone())
            .unwrap_or_default();
        SourceUnit {
            path,
            text: Arc::from(text),
            ast,
            errors,
            package,
            origin,
        }
    }

    pub(crate) fn top_level_binary_name(&self, simple_name: &str) -> String {
        qualify(&self.package, simple_name)
    }

    /// The public top-level type, else the first one, else the file stem.
    pub(crate) fn main_type_name(&self) -> String {
        self.ast
            .types
            .iter()
            .find(|decl| decl.modifiers.has(ast::Modifier::Public))
            .or_else(|| self.ast.types.first())
            .map(|decl| decl.name.clone())
            .unwrap_or_else(|| {
                self.path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }
}

impl std::fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceUnit")
            .field("path", &self.path)
            .field("package", &self.package)
            .field("origin", &self.origin)
            .field("errors", &self.errors.len())
            .finish()
    }
}

pub(crate) fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// A type declaration inside a parsed unit, addressed by indices.
#[derive(Clone, Debug)]
pub(crate) struct SourceTypeLoc {
    pub(crate) unit: Arc<SourceUnit>,
    /// Index of the top-level declaration followed by member-type indices.
    pub(crate) path: Arc<[usize]>,
    pub(crate) decl: Arc<TypeDecl>,
    /// Binary names from the outermost declaration down to this one.
    pub(crate) chain: Arc<[String]>,
}

impl SourceTypeLoc {
    pub(crate) fn top_level(unit: &Arc<SourceUnit>, index: usize) -> Option<Self> {
        let decl = unit.ast.types.get(index)?.clone();
        let binary_name = unit.top_level_binary_name(&decl.name);
        Some(SourceTypeLoc {
            unit: unit.clone(),
            path: Arc::from(vec![index]),
            decl,
            chain: Arc::from(vec![binary_name]),
        })
    }

    pub(crate) fn binary_name(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or_default()
    }

    pub(crate) fn origin(&self) -> Origin {
        self.unit.origin
    }

    pub(crate) fn member_type(&self, index: usize) -> Option<Self> {
        let decl = self.decl.member_types().nth(index)?.clone();
        let mut path = self.path.to_vec();
        path.push(index);
        let mut chain = self.chain.to_vec();
        chain.push(format!("{}${}", self.binary_name(), decl.name));
        Some(SourceTypeLoc {
            unit: self.unit.clone(),
            path: Arc::from(path),
            decl,
            chain: Arc::from(chain),
        })
    }

    pub(crate) fn member_types(&self) -> impl Iterator<Item = SourceTypeLoc> + '_ {
        (0..self.decl.member_types().count()).filter_map(|index| self.member_type(index))
    }

    pub(crate) fn enclosing(&self) -> Option<Self> {
        if self.path.len() < 2 {
            return None;
        }
        let mut loc = SourceTypeLoc::top_level(&self.unit, self.path[0])?;
        for index in &self.path[1..self.path.len() - 1] {
            loc = loc.member_type(*index)?;
        }
        Some(loc)
    }
}

#[derive(Clone, Debug)]
pub(crate) enum TypeLoc {
    Source(SourceTypeLoc),
    Binary(Arc<ClassStub>),
}

pub(crate) enum RootState {
    Source {
        entry: ClasspathEntry,
        fingerprint: ClasspathFingerprint,
        /// Units as read from disk, before overlays.
        disk_units: Vec<Arc<SourceUnit>>,
    },
    Binary(Arc<BinaryRoot>),
}

impl RootState {
    pub(crate) fn entry(&self) -> &ClasspathEntry {
        match self {
            RootState::Source { entry, .. } => entry,
            RootState::Binary(root) => root.entry(),
        }
    }
}

/// Everything a generation is built from.
#[derive(Clone, Debug, Default)]
pub(crate) struct Inputs {
    pub(crate) entries: Vec<ClasspathEntry>,
    pub(crate) memory_sources: BTreeMap<PathBuf, String>,
    pub(crate) memory_classes: Vec<Vec<u8>>,
    /// Unsaved editor text; `None` hides the file.
    pub(crate) overlays: BTreeMap<PathBuf, Option<String>>,
    pub(crate) builtin_jdk: bool,
}

#[derive(Default)]
pub(crate) struct Caches {
    pub(crate) bindings: Mutex<HashMap<String, Option<Arc<ClassBinding>>>>,
    pub(crate) resolved: Mutex<HashMap<String, Option<String>>>,
    pub(crate) supertypes: Mutex<HashMap<String, Arc<[String]>>>,
    pub(crate) constants: Mutex<HashMap<(String, String), Option<ConstValue>>>,
}

pub(crate) struct EnvState {
    pub(crate) generation: u64,
    pub(crate) roots: Vec<RootState>,
    /// Units with source origin in lookup order, overlays applied.
    pub(crate) units: Vec<Arc<SourceUnit>>,
    unit_index: HashMap<PathBuf, usize>,
    types: HashMap<String, TypeLoc>,
    pub(crate) caches: Caches,
}

impl EnvState {
    /// Builds a generation. Roots whose fingerprint did not change since `previous` are reused
    /// instead of being read again.
    pub(crate) fn build(
        generation: u64,
        inputs: &Inputs,
        previous: Option<&EnvState>,
    ) -> Result<EnvState> {
        let mut roots = Vec::with_capacity(inputs.entries.len());
        for entry in &inputs.entries {
            roots.push(load_root(entry, previous)?);
        }

        let mut overlays = inputs.overlays.clone();
        let mut units = Vec::new();

        let mut memory: BTreeMap<PathBuf, String> = inputs.memory_sources.clone();
        // Overlays that do not belong to any source root join the in-memory sources.
        let owned: Vec<PathBuf> = overlays
            .keys()
            .filter(|path| !roots.iter().any(|root| root_owns(root, path)))
            .cloned()
            .collect();
        for path in owned {
            match overlays.remove(&path).flatten() {
                Some(text) => {
                    memory.insert(path, text);
                }
                None => {
                    memory.remove(&path);
                }
            }
        }
        for (path, text) in memory {
            units.push(Arc::new(SourceUnit::parse(path, &text, Origin::Source)));
        }

        let mut types = HashMap::new();
        for unit in &units {
            index_unit(&mut types, unit);
        }

        // Roots are indexed in configured order so that a binary entry listed before a source
        // entry shadows it.
        for root in &roots {
            match root {
                RootState::Source {
                    entry, disk_units, ..
                } => {
                    let first = units.len();
                    for unit in disk_units {
                        match overlays.get(&unit.path) {
                            Some(Some(text)) => units.push(Arc::new(SourceUnit::parse(
                                unit.path.clone(),
                                text,
                                Origin::Source,
                            ))),
                            Some(None) => {}
                            None => units.push(unit.clone()),
                        }
                    }
                    for (path, text) in &overlays {
                        let on_disk = disk_units.iter().any(|unit| &unit.path == path);
                        if let (Some(text), false) = (text, on_disk) {
                            if path.starts_with(&entry.path) {
                                units.push(Arc::new(SourceUnit::parse(
                                    path.clone(),
                                    text,
                                    Origin::Source,
                                )));
                            }
                        }
                    }
                    for unit in &units[first..] {
                        index_unit(&mut types, unit);
                    }
                }
                RootState::Binary(binary) => {
                    for name in binary.binary_names() {
                        if let Some(stub) = binary.get(name) {
                            types
                                .entry(name.to_string())
                                .or_insert_with(|| TypeLoc::Binary(stub.clone()));
                        }
                    }
                }
            }
        }
        if !inputs.memory_classes.is_empty() {
            let root = BinaryRoot::from_class_files(
                ClasspathEntry::binary("<memory>"),
                inputs.memory_classes.iter().map(Vec::as_slice),
            )?;
            for name in root.binary_names() {
                if let Some(stub) = root.get(name) {
                    types
                        .entry(name.to_string())
                        .or_insert_with(|| TypeLoc::Binary(stub.clone()));
                }
            }
        }
        if inputs.builtin_jdk {
            for unit in super::jdk::units() {
                index_unit(&mut types, unit);
            }
        }

        let unit_index = units
            .iter()
            .enumerate()
            .map(|(idx, unit)| (unit.path.clone(), idx))
            .collect();

        tracing::debug!(
            target: "jmodel.env",
            generation,
            roots = roots.len(),
            units = units.len(),
            types = types.len(),
            "built lookup environment"
        );

        Ok(EnvState {
            generation,
            roots,
            units,
            unit_index,
            types,
            caches: Caches::default(),
        })
    }

    pub(crate) fn type_loc(&self, binary_name: &str) -> Option<&TypeLoc> {
        self.types.get(binary_name)
    }

    pub(crate) fn exists(&self, binary_name: &str) -> bool {
        self.types.contains_key(binary_name)
    }

    pub(crate) fn unit(&self, path: &Path) -> Option<&Arc<SourceUnit>> {
        self.unit_index.get(path).map(|idx| &self.units[*idx])
    }

    /// Source-origin declarations that won the lookup for their binary name.
    pub(crate) fn source_types(&self) -> impl Iterator<Item = &SourceTypeLoc> {
        self.types.values().filter_map(|loc| match loc {
            TypeLoc::Source(loc) if loc.origin() == Origin::Source => Some(loc),
            _ => None,
        })
    }
}

fn index_unit(types: &mut HashMap<String, TypeLoc>, unit: &Arc<SourceUnit>) {
    fn visit(types: &mut HashMap<String, TypeLoc>, loc: SourceTypeLoc) {
        let children: Vec<_> = loc.member_types().collect();
        types
            .entry(loc.binary_name().to_string())
            .or_insert_with(|| TypeLoc::Source(loc));
        for child in children {
            visit(types, child);
        }
    }

    for index in 0..unit.ast.types.len() {
        if let Some(loc) = SourceTypeLoc::top_level(unit, index) {
            visit(types, loc);
        }
    }
}

fn root_owns(root: &RootState, path: &Path) -> bool {
    match root {
        RootState::Source { entry, .. } => path.starts_with(&entry.path),
        RootState::Binary(_) => false,
    }
}

fn load_root(entry: &ClasspathEntry, previous: Option<&EnvState>) -> Result<RootState> {
    if !entry.path.exists() {
        return Err(ModelError::MissingClasspathEntry(entry.path.clone()));
    }
    let reusable = previous.and_then(|state| {
        state
            .roots
            .iter()
            .find(|root| root.entry() == entry)
    });

    if entry.is_source() {
        let fingerprint = entry
            .fingerprint()
            .map_err(jmodel_classpath::ClasspathError::from)?;
        if let Some(RootState::Source {
            fingerprint: old,
            disk_units,
            ..
        }) = reusable
        {
            if *old == fingerprint {
                return Ok(RootState::Source {
                    entry: entry.clone(),
                    fingerprint,
                    disk_units: disk_units.clone(),
                });
            }
        }
        let root = SourceRoot::read(entry)?;
        let disk_units = root
            .into_files()
            .into_iter()
            .map(|file| Arc::new(SourceUnit::parse(file.path, &file.text, Origin::Source)))
            .collect();
        Ok(RootState::Source {
            entry: entry.clone(),
            fingerprint,
            disk_units,
        })
    } else {
        if let Some(RootState::Binary(root)) = reusable {
            if root.is_up_to_date() {
                return Ok(RootState::Binary(root.clone()));
            }
            tracing::debug!(target: "jmodel.env", entry = %entry, "binary root changed");
        }
        Ok(RootState::Binary(Arc::new(BinaryRoot::index(entry)?)))
    }
}
