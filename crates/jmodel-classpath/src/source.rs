use std::path::{Path, PathBuf};

use crate::{walk_files, ClasspathEntry, ClasspathError, ClasspathFingerprint};

/// A decoded `.java` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// The `.java` files of one source entry, in path order.
#[derive(Clone, Debug)]
pub struct SourceRoot {
    entry: ClasspathEntry,
    fingerprint: ClasspathFingerprint,
    files: Vec<SourceFile>,
}

impl SourceRoot {
    pub fn read(entry: &ClasspathEntry) -> Result<Self, ClasspathError> {
        entry.check_exists()?;
        let fingerprint = entry.fingerprint()?;

        let paths = if entry.path.is_dir() {
            walk_files(&entry.path, "java")
        } else {
            vec![entry.path.clone()]
        };

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let text = read_source(&path, entry)?;
            files.push(SourceFile { path, text });
        }

        tracing::debug!(
            target: "jmodel.classpath",
            entry = %entry,
            files = files.len(),
            "read source root"
        );

        Ok(Self {
            entry: entry.clone(),
            fingerprint,
            files,
        })
    }

    pub fn entry(&self) -> &ClasspathEntry {
        &self.entry
    }

    pub fn fingerprint(&self) -> ClasspathFingerprint {
        self.fingerprint
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<SourceFile> {
        self.files
    }
}

fn read_source(path: &Path, entry: &ClasspathEntry) -> Result<String, ClasspathError> {
    let bytes = std::fs::read(path)?;
    entry
        .encoding
        .decode(&bytes)
        .ok_or_else(|| ClasspathError::Decode {
            path: path.to_path_buf(),
            encoding: entry.encoding,
        })
}
