use sidedock_core::PanelId;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Persistence failures. The collapse controller never surfaces these; they
/// degrade to "preference absent" or an in-memory-only session.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference record could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StorageError {
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Caller errors from [`PanelManager`](crate::PanelManager) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("unknown panel: {id}")]
    UnknownPanel { id: PanelId },

    #[error("duplicate panel id: {id}")]
    DuplicatePanel { id: PanelId },

    #[error("panel manager has been dropped")]
    Disposed,
}

/// Failures loading or validating a [`ManagerConfig`](crate::ManagerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "toml-config")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("panel registration failed: {0}")]
    Panel(#[from] PanelError),
}

/// Failures installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("global subscriber already installed: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}
