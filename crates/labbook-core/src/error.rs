//! Error types for the lifecycle engine
//!
//! Every rejected action maps onto one of four kinds:
//! - Illegal transitions from the record's current status
//! - Missing capabilities for the actor's role
//! - Attempts to rewrite immutable fields
//! - Malformed input (negative quantities, missing fields, foreign statuses)

use crate::capability::{Capability, Role};
use crate::status::{EntityKind, RecordStatus};
use std::path::PathBuf;

/// Engine errors. No patch is ever produced alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Requested action is not legal from the record's current status
    #[error("invalid transition: {kind} in status '{from}' cannot {action}")]
    InvalidTransition {
        /// Kind of the record
        kind: EntityKind,
        /// Status the record was in
        from: RecordStatus,
        /// Requested action, phrased to follow "cannot"
        action: String,
    },

    /// Actor's role lacks the required capability
    #[error("permission denied: role '{role}' lacks the '{required}' capability")]
    PermissionDenied {
        /// Capability that was required
        required: Capability,
        /// Role the actor actually holds
        role: Role,
    },

    /// Patch attempts to change an immutable field
    #[error("immutable field violation: '{field}' cannot be changed after creation")]
    ImmutableFieldViolation {
        /// Offending field name
        field: String,
    },

    /// Malformed input; the message is meant to be shown verbatim
    #[error("{0}")]
    ValidationError(String),
}

impl EngineError {
    /// Create an invalid transition error
    #[inline]
    pub fn invalid_transition(
        kind: EntityKind,
        from: RecordStatus,
        action: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            kind,
            from,
            action: action.into(),
        }
    }

    /// Create an immutable field violation
    #[inline]
    pub fn immutable(field: impl Into<String>) -> Self {
        Self::ImmutableFieldViolation {
            field: field.into(),
        }
    }

    /// Create a validation error
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Whether the error stems from the actor rather than the record
    #[inline]
    #[must_use]
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

/// Errors while loading [`EngineConfig`](crate::config::EngineConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
