use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Everything that can abort a portfolio run. Image fetch failures never show
/// up here: they are recovered where the image would have been drawn.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration from {location}: {source}")]
    ConfigFetch {
        location: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to load configuration: invalid JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Failed to load configuration: validation failed:\n{}", .0.join("\n"))]
    ConfigInvalid(Vec<String>),

    #[error("Failed to load font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::ConfigFetch { .. } | Error::ConfigParse(_) | Error::ConfigInvalid(_)
        )
    }
}
