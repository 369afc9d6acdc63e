//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid feature name: {0:?}. Names must be non-empty and contain no path separators.")]
    InvalidFeatureName(String),

    #[error("Feature not found: {name}. Available features: {available}")]
    UnknownFeature { name: String, available: String },

    #[error("Unknown dependency: {dependency} (required by {feature})")]
    UnknownDependency { feature: String, dependency: String },

    #[error("Circular dependency detected at feature: {0}. Use 'featbuild order' to inspect the graph.")]
    CircularDependency(String),

    #[error("Hash error for {path}: {message}")]
    Hash { path: PathBuf, message: String },

    #[error("Cache error for {feature}: {message}")]
    Cache { feature: String, message: String },

    #[error("Build failed for {feature}: {message}")]
    BuildExecution { feature: String, message: String },
}

impl Error {
    pub(crate) fn hash(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Hash {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn cache(feature: &str, message: impl ToString) -> Self {
        Error::Cache {
            feature: feature.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn build(feature: &str, message: impl ToString) -> Self {
        Error::BuildExecution {
            feature: feature.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
