use std::path::PathBuf;
use std::sync::Arc;

use jmodel_classpath::ClasspathError;
use thiserror::Error;

pub type Result<T, E = ModelError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// A structural reference names a type the environment cannot find.
    #[error("unresolved type `{name}`")]
    UnresolvedType { name: String },
    #[error("classpath entry does not exist: {}", .0.display())]
    MissingClasspathEntry(PathBuf),
    #[error(transparent)]
    Classpath(Arc<ClasspathError>),
}

impl ModelError {
    pub(crate) fn unresolved(name: impl Into<String>) -> Self {
        ModelError::UnresolvedType { name: name.into() }
    }
}

impl From<ClasspathError> for ModelError {
    fn from(err: ClasspathError) -> Self {
        match err {
            ClasspathError::MissingEntry(path) => ModelError::MissingClasspathEntry(path),
            other => ModelError::Classpath(Arc::new(other)),
        }
    }
}
