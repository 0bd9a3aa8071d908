//! A uniform structural model of Java declarations.
//!
//! Types, members, annotations and compilation units read the same whether they come from
//! parsed source or from class files. Everything is computed on first access from a
//! [`LookupEnvironment`] and cached on the node that asked for it.
//!
//! ```no_run
//! use jmodel_model::LookupEnvironment;
//!
//! let env = LookupEnvironment::builder()
//!     .source_root("src/main/java")
//!     .binary_root("lib/dependency.jar")
//!     .build()?;
//! if let Some(ty) = env.find_type("com.example.Service") {
//!     for method in ty.methods() {
//!         println!("{method}");
//!     }
//! }
//! # Ok::<(), jmodel_model::ModelError>(())
//! ```

pub mod annotation;
pub mod binding;
mod convert;
pub mod env;
mod error;
pub mod flags;
pub mod key;
pub mod members;
pub mod printer;
pub mod types;
pub mod unit;

pub use annotation::{Annotation, AnnotationValue, EnumConstant, Value};
pub use binding::{ClassBinding, ClassKind, ConstValue, Origin, WildcardKind};
pub use env::{CompileError, EnvironmentBuilder, LookupEnvironment};
pub use error::{ModelError, Result};
pub use flags::Modifiers;
pub use key::{MemberKey, MemberKind, TypeKey, UnitKey};
pub use members::{Field, Method, Parameter, TypeParameter};
pub use printer::Printer;
pub use types::{Type, TypeKind};
pub use unit::{CompilationUnit, Import};

pub use jmodel_classfile::BaseType;
