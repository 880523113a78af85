use std::io;
use std::path::PathBuf;

use ai_bt::AttributeError;
use ai_core::AssetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown behavior type `{tag}` at {path}")]
    UnknownBehaviorType { tag: String, path: String },

    #[error("malformed script: {0}")]
    MalformedDocument(String),

    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid attribute at {path}: {source}")]
    InvalidAttribute {
        path: String,
        #[source]
        source: AttributeError,
    },

    #[error("unknown attribute `{name}` at {path}")]
    UnknownAttribute { path: String, name: String },

    #[error("{tag} at {path} needs {expected} but has {found}")]
    InvalidChildCount {
        tag: String,
        path: String,
        expected: &'static str,
        found: usize,
    },

    #[error("failed to write tree asset: {0}")]
    Asset(#[from] AssetError),
}
