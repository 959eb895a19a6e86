//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    // ─────────────────────────────────────────────────────────────
    // Engine Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Engine executable not found: {program}")]
    EngineNotFound { program: String },

    #[error("Failed to spawn engine process: {reason}")]
    EngineSpawn { reason: String },

    #[error("Engine error: {message}")]
    Engine { message: String },

    #[error("Engine is no longer accepting input")]
    EngineDetached,

    // ─────────────────────────────────────────────────────────────
    // Device Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Input device enumeration failed: {message}")]
    DeviceEnumeration { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid session state: {message}")]
    SessionState { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    pub fn device_enumeration(message: impl Into<String>) -> Self {
        Self::DeviceEnumeration {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn session_state(message: impl Into<String>) -> Self {
        Self::SessionState {
            message: message.into(),
        }
    }

    /// Check if this error should stop the host before a session is started
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::EngineNotFound { .. } | Error::EngineSpawn { .. } | Error::SessionState { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::engine("stdin closed");
        assert_eq!(err.to_string(), "Engine error: stdin closed");

        let err = Error::EngineNotFound {
            program: "game-engine".to_string(),
        };
        assert!(err.to_string().contains("game-engine"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("not valid {{{{").unwrap_err();
        let err: Error = toml_err.into();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::EngineSpawn {
            reason: "permission denied".to_string()
        }
        .is_fatal());
        assert!(Error::session_state("already set up").is_fatal());
        assert!(!Error::config("bad value").is_fatal());
        assert!(!Error::EngineDetached.is_fatal());
    }

    #[test]
    fn test_result_ext_context_preserves_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.context("writing log").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
