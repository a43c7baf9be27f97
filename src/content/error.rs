//! Errors raised while turning post sources into `Post` records

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{source_name}: expected a `---` delimited front-matter block")]
    MissingFrontMatter { source_name: String },

    #[error("{source_name}: invalid YAML front-matter")]
    InvalidMetadata {
        source_name: String,
        #[source]
        error: serde_yaml::Error,
    },

    #[error("{source_name}: metadata must be a key-value mapping")]
    NotAMapping { source_name: String },

    #[error("{source_name}: missing required field `{field}`")]
    MissingField {
        source_name: String,
        field: &'static str,
    },

    #[error("{source_name}: `{value}` is not an ISO 8601 date")]
    InvalidDate { source_name: String, value: String },

    #[error("{path}: malformed aggregate post file")]
    InvalidAggregate {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }
}
