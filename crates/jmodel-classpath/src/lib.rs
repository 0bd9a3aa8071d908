//! Classpath entries and the on-disk roots behind them.
//!
//! An entry is a path plus a mode: source roots hold `.java` files decoded with the entry's
//! encoding, binary roots are class directories, jars or single class files. Each root can
//! produce a [`ClasspathFingerprint`] so callers re-read only what changed.

mod binary;
mod source;

use std::collections::hash_map::DefaultHasher;
use std::ffi::OsStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use binary::BinaryRoot;
pub use source::{SourceFile, SourceRoot};

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("classpath entry does not exist: {}", .0.display())]
    MissingEntry(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid class file {path}: {source}")]
    ClassFile {
        path: String,
        #[source]
        source: jmodel_classfile::Error,
    },
    #[error("{} is not valid {encoding}", .path.display())]
    Decode { path: PathBuf, encoding: SourceEncoding },
    #[error("unsupported source encoding `{0}`")]
    UnsupportedEncoding(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClasspathFingerprint(u64);

impl ClasspathFingerprint {
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    Source,
    Binary,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceEncoding {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl SourceEncoding {
    pub fn name(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Latin1 => "ISO-8859-1",
            SourceEncoding::Ascii => "US-ASCII",
        }
    }

    /// Decodes `bytes`; `None` when they are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        let bytes = match self {
            SourceEncoding::Utf8 => bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes),
            _ => bytes,
        };
        match self {
            SourceEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            SourceEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            SourceEncoding::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceEncoding {
    type Err = ClasspathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(SourceEncoding::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(SourceEncoding::Latin1),
            "us-ascii" | "ascii" => Ok(SourceEncoding::Ascii),
            _ => Err(ClasspathError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl TryFrom<String> for SourceEncoding {
    type Error = ClasspathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceEncoding> for String {
    fn from(value: SourceEncoding) -> Self {
        value.name().to_string()
    }
}

/// One classpath entry: `(path, mode, encoding)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClasspathEntry {
    pub path: PathBuf,
    pub mode: EntryMode,
    #[serde(default)]
    pub encoding: SourceEncoding,
}

impl ClasspathEntry {
    pub fn source(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: EntryMode::Source,
            encoding: SourceEncoding::Utf8,
        }
    }

    pub fn binary(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: EntryMode::Binary,
            encoding: SourceEncoding::Utf8,
        }
    }

    pub fn with_encoding(mut self, encoding: SourceEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn is_source(&self) -> bool {
        self.mode == EntryMode::Source
    }

    pub fn normalize(&self) -> std::io::Result<Self> {
        Ok(Self {
            path: canonicalize_if_possible(&self.path)?,
            ..self.clone()
        })
    }

    /// Fails with [`ClasspathError::MissingEntry`] when the path does not exist.
    pub fn check_exists(&self) -> Result<(), ClasspathError> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(ClasspathError::MissingEntry(self.path.clone()))
        }
    }

    pub fn fingerprint(&self) -> std::io::Result<ClasspathFingerprint> {
        if self.path.is_dir() {
            let extension = match self.mode {
                EntryMode::Source => "java",
                EntryMode::Binary => "class",
            };
            fingerprint_dir(&self.path, extension)
        } else {
            fingerprint_file(&self.path)
        }
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            EntryMode::Source => "source",
            EntryMode::Binary => "binary",
        };
        write!(f, "{} ({mode})", self.path.display())
    }
}

fn canonicalize_if_possible(path: &Path) -> std::io::Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}

fn fingerprint_file(path: &Path) -> std::io::Result<ClasspathFingerprint> {
    let meta = std::fs::metadata(path)?;
    let mut hasher = DefaultHasher::new();
    path.to_string_lossy().hash(&mut hasher);
    meta.len().hash(&mut hasher);
    hash_mtime(&mut hasher, &meta.modified()?);
    Ok(ClasspathFingerprint(hasher.finish()))
}

fn fingerprint_dir(dir: &Path, extension: &str) -> std::io::Result<ClasspathFingerprint> {
    let files = walk_files(dir, extension);

    let mut hasher = DefaultHasher::new();
    dir.to_string_lossy().hash(&mut hasher);
    for file in files {
        let rel = file.strip_prefix(dir).unwrap_or(&file);
        let meta = std::fs::metadata(&file)?;
        rel.to_string_lossy().hash(&mut hasher);
        meta.len().hash(&mut hasher);
        hash_mtime(&mut hasher, &meta.modified()?);
    }
    Ok(ClasspathFingerprint(hasher.finish()))
}

fn hash_mtime(hasher: &mut DefaultHasher, time: &SystemTime) {
    let duration = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0));
    duration.as_secs().hash(hasher);
    duration.subsec_nanos().hash(hasher);
}

/// Files under `dir` with the given extension, sorted.
pub(crate) fn walk_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new(extension)))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}
