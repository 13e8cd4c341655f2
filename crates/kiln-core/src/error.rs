//! Error types for Kiln

use thiserror::Error;

/// The main error type for Kiln operations
#[derive(Debug, Error)]
pub enum KilnError {
    #[error("Window error: {0}")]
    Window(String),

    #[error("Renderer error: {0}")]
    Renderer(String),

    #[error("Subsystem '{name}' failed: {message}")]
    Subsystem { name: String, message: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KilnError {
    /// Shorthand for a failed subsystem initialization
    pub fn subsystem(name: impl Into<String>, message: impl Into<String>) -> Self {
        KilnError::Subsystem {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for Kiln operations
pub type Result<T> = std::result::Result<T, KilnError>;
