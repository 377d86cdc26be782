//! Typed error hierarchy for launchpad.
//!
//! Two enums cover the two layers:
//! - `ComposeError` — reading, parsing and rewriting compose documents
//! - `DeployError` — deploy, status, list and stop failures

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the compose rewriter.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Failed to read compose file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write compose file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid compose YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Compose document root is not a mapping")]
    NotAMapping,
}

/// Errors from the deploy flow and the container queries.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Caller supplied missing or unusable parameters.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("No compose file or Dockerfile found in {}", .path.display())]
    NothingToDeploy { path: PathBuf },

    #[error("Command `{command}` failed with {status}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse output of `{command}`: {source}")]
    OutputParse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to prepare {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

impl DeployError {
    /// Raw detail string reported next to the error message.
    ///
    /// Command failures report their stderr when the command wrote any.
    pub fn details(&self) -> String {
        match self {
            DeployError::CommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, DeployError::InvalidRequest(_))
    }
}
