use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("invalid frontmatter in {file}: {reason}")]
    Frontmatter { file: String, reason: String },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("policy load failed: {0}")]
    PolicyLoad(String),

    #[error("invalid policy: {0}")]
    PolicyValidation(String),
}

impl ForgeError {
    /// Whether the batch can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Frontmatter { .. } | Self::Read { .. } | Self::Write { .. }
        )
    }
}
