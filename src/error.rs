//! Error types for the paper router.

use thiserror::Error;

/// Router command failures. A failed command leaves history untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Malformed generator or a command targeting an extracted list.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Navigation target absent from the context searched.
    #[error("Navigation error: {0}")]
    Navigation(String),
}

impl RouterError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        RouterError::Configuration(msg.into())
    }

    pub(crate) fn navigation(msg: impl Into<String>) -> Self {
        RouterError::Navigation(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, RouterError::Configuration(_))
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, RouterError::Navigation(_))
    }
}

/// Entity and list store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Malformed {class} entity: {source}")]
    MalformedEntity {
        class: String,
        source: serde_json::Error,
    },

    #[error("Unknown entity discriminant: {0}")]
    UnknownDiscriminant(String),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error for command dispatch and tooling.
#[derive(Debug, Error)]
pub enum PaperError {
    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid command payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scripted command failed; `index` is its position in the script.
    #[error("Command {index} ({command}) rejected: {source}")]
    Rejected {
        index: usize,
        command: &'static str,
        #[source]
        source: Box<PaperError>,
    },
}
