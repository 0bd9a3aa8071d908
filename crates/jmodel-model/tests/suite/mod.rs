use jmodel_model::{LookupEnvironment, Type};

mod annotations;
mod arrays;
mod binary_parity;
mod constants;
mod errors;
mod generics;
mod reload;
mod units;

/// An environment over in-memory sources; paths are relative to a virtual `/mem` root.
pub(crate) fn source_env(files: &[(&str, &str)]) -> LookupEnvironment {
    files
        .iter()
        .fold(LookupEnvironment::builder(), |builder, (path, text)| {
            builder.source_text(format!("/mem/{path}"), *text)
        })
        .build()
        .expect("environment builds")
}

pub(crate) fn type_names(types: &[Type]) -> Vec<&str> {
    types.iter().map(Type::name).collect()
}
