// src/error.rs

//! Error types for recipe-private
//!
//! Two families of failures exist. Configuration errors (an unknown service
//! kind, an empty service group) are programming mistakes in the wiring and
//! are always fatal. Persistence errors come back from the storage
//! collaborator and are propagated to the caller rather than swallowed, so
//! a failed options write during activation is visible instead of leaving
//! the deployment half-installed silently.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the add-on core
#[derive(Error, Debug)]
pub enum Error {
    /// No factory is registered for the requested service kind
    #[error("No service is registered for the '{kind}' kind")]
    UnknownServiceKind { kind: String },

    /// A service group was declared with no required services
    #[error("Service group '{group}' declares no required services")]
    EmptyServiceGroup { group: String },

    /// A service factory failed while constructing its instance
    #[error("Failed to construct service '{kind}': {reason}")]
    ServiceConstruction { kind: String, reason: String },

    /// SQLite storage error
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A non-SQLite storage collaborator reported a failure
    #[error("Storage collaborator failure: {reason}")]
    Store { reason: String },

    /// Options record could not be serialized or deserialized
    #[error("Options record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a wiring mistake rather than a runtime condition
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownServiceKind { .. } | Error::EmptyServiceGroup { .. }
        )
    }
}
