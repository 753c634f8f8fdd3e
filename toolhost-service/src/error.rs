//! Error types for the tool registry and dispatch plane.

use thiserror::Error;

/// Every error kind a tool-hosting server can raise, from config loading
/// through dispatch.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("configuration missing: {path}")]
    ConfigMissing { path: String },

    #[error("failed to import tool {name}: {message}")]
    ToolImportError { name: String, message: String },

    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("invalid argument for {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("tool {name} failed: {message}")]
    AdapterFailure { name: String, message: String },

    #[error("transport error: {message}")]
    TransportError { message: String },

    #[error("fatal startup error: {message}")]
    FatalStartup { message: String },
}

impl RegistryError {
    /// Render the error the way every call-time failure is surfaced to a
    /// client: a single line beginning `Error executing tool <name>: `.
    pub fn as_call_message(&self, name: &str) -> String {
        match self {
            RegistryError::ToolNotFound { .. } => {
                format!("Error executing tool {name}: not found")
            }
            RegistryError::InvalidArgument { message, .. }
            | RegistryError::AdapterFailure { message, .. } => {
                format!("Error executing tool {name}: {message}")
            }
            other => format!("Error executing tool {name}: {other}"),
        }
    }
}

/// Result type alias used throughout the registry and loader.
pub type RegistryResult<T> = Result<T, RegistryError>;
