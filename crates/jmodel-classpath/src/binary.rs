use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use jmodel_classfile::{ClassFile, ClassStub};

use crate::{walk_files, ClasspathEntry, ClasspathError, ClasspathFingerprint};

/// Class stubs of one binary entry, keyed by dotted binary name (`a.b.Outer$Inner`).
#[derive(Clone, Debug)]
pub struct BinaryRoot {
    entry: ClasspathEntry,
    fingerprint: Option<ClasspathFingerprint>,
    classes: HashMap<String, Arc<ClassStub>>,
}

impl BinaryRoot {
    pub fn index(entry: &ClasspathEntry) -> Result<Self, ClasspathError> {
        entry.check_exists()?;
        let fingerprint = entry.fingerprint()?;
        let path = entry.path.as_path();

        let stubs = if path.is_dir() {
            index_class_dir(path)?
        } else if path.extension() == Some(OsStr::new("class")) {
            let bytes = std::fs::read(path)?;
            parse_stub(&bytes, path.to_string_lossy().as_ref())?
                .into_iter()
                .collect()
        } else {
            index_jar(path)?
        };

        tracing::debug!(
            target: "jmodel.classpath",
            entry = %entry,
            classes = stubs.len(),
            fingerprint = %fingerprint.to_hex(),
            "indexed binary root"
        );

        Ok(Self {
            entry: entry.clone(),
            fingerprint: Some(fingerprint),
            classes: into_map(stubs),
        })
    }

    /// In-memory root built from class-file bytes; never considered stale.
    pub fn from_class_files<'a>(
        entry: ClasspathEntry,
        files: impl IntoIterator<Item = &'a [u8]>,
    ) -> Result<Self, ClasspathError> {
        let mut stubs = Vec::new();
        for (idx, bytes) in files.into_iter().enumerate() {
            if let Some(stub) = parse_stub(bytes, &format!("<memory #{idx}>"))? {
                stubs.push(stub);
            }
        }
        Ok(Self {
            entry,
            fingerprint: None,
            classes: into_map(stubs),
        })
    }

    pub fn entry(&self) -> &ClasspathEntry {
        &self.entry
    }

    pub fn fingerprint(&self) -> Option<ClasspathFingerprint> {
        self.fingerprint
    }

    /// Whether the entry on disk still matches the indexed fingerprint.
    pub fn is_up_to_date(&self) -> bool {
        match self.fingerprint {
            Some(fingerprint) => self.entry.fingerprint().ok() == Some(fingerprint),
            None => true,
        }
    }

    pub fn get(&self, binary_name: &str) -> Option<&Arc<ClassStub>> {
        self.classes.get(binary_name)
    }

    pub fn contains(&self, binary_name: &str) -> bool {
        self.classes.contains_key(binary_name)
    }

    /// Binary names in this root, sorted.
    pub fn binary_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn into_map(stubs: Vec<ClassStub>) -> HashMap<String, Arc<ClassStub>> {
    stubs
        .into_iter()
        .map(|stub| (stub.binary_name(), Arc::new(stub)))
        .collect()
}

fn is_ignored_class(internal_name: &str) -> bool {
    internal_name == "module-info"
        || internal_name == "package-info"
        || internal_name.ends_with("/package-info")
}

fn parse_stub(bytes: &[u8], origin: &str) -> Result<Option<ClassStub>, ClasspathError> {
    let class_error = |source| ClasspathError::ClassFile {
        path: origin.to_string(),
        source,
    };
    let class = ClassFile::parse(bytes).map_err(class_error)?;
    if is_ignored_class(&class.this_class) {
        return Ok(None);
    }
    class.stub().map(Some).map_err(class_error)
}

fn index_class_dir(dir: &Path) -> Result<Vec<ClassStub>, ClasspathError> {
    let mut out = Vec::new();
    for file in walk_files(dir, "class") {
        let bytes = std::fs::read(&file)?;
        if let Some(stub) = parse_stub(&bytes, file.to_string_lossy().as_ref())? {
            out.push(stub);
        }
    }
    Ok(out)
}

fn index_jar(path: &Path) -> Result<Vec<ClassStub>, ClasspathError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let is_multi_release = jar_is_multi_release(&mut archive);

    // Versioned entries of a multi-release jar only fill in classes the base tree lacks,
    // highest version first.
    let mut best: HashMap<String, (u32, ClassStub)> = HashMap::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if !file.is_file() {
            continue;
        }
        let name = file.name().to_owned();
        if !name.ends_with(".class") {
            continue;
        }

        let version = match name.strip_prefix("META-INF/versions/") {
            Some(rest) if is_multi_release => {
                let Some((version, _)) = rest.split_once('/') else {
                    continue;
                };
                match version.parse::<u32>() {
                    Ok(v) => v,
                    Err(_) => continue,
                }
            }
            _ if name.starts_with("META-INF/") => continue,
            _ => 0,
        };

        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        let origin = format!("{}!/{name}", path.display());
        let Some(stub) = parse_stub(&bytes, &origin)? else {
            continue;
        };

        let key = stub.binary_name();
        match best.get(&key) {
            Some((0, _)) => {}
            Some((existing, _)) if version != 0 && version <= *existing => {}
            _ => {
                best.insert(key, (version, stub));
            }
        }
    }

    let mut out: Vec<ClassStub> = best.into_values().map(|(_, stub)| stub).collect();
    out.sort_by(|a, b| a.internal_name.cmp(&b.internal_name));
    Ok(out)
}

fn jar_is_multi_release<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> bool {
    let Ok(mut file) = archive.by_name("META-INF/MANIFEST.MF") else {
        return false;
    };
    let mut manifest = String::new();
    if file.read_to_string(&mut manifest).is_err() {
        return false;
    }
    manifest_is_multi_release(&manifest)
}

fn manifest_is_multi_release(manifest: &str) -> bool {
    manifest
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("Multi-Release"))
        .is_some_and(|(_, value)| value.trim().eq_ignore_ascii_case("true"))
}
