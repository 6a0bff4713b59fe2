use crate::git::GitError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),
    /// The documentation resource embedded in every prompt could not be read.
    #[error("Failed to read documentation from {}: {source}", .path.display())]
    Documentation {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Language model error: {0}")]
    LanguageModel(#[from] assistant_llm::LanguageModelError),
    /// A structured call asked to commit something that cannot be written.
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
    #[error("Failed to write artifact to {}: {source}", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Version control error: {0}")]
    VersionControl(#[from] GitError),
}

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;
