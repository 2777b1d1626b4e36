//! Store error types

use labbook_core::{EngineError, EntityKind, RecordId};

/// Errors at the record store seam
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record with this id in the kind's table
    #[error("{kind} {id} not found")]
    NotFound {
        /// Table searched
        kind: EntityKind,
        /// Missing key
        id: RecordId,
    },

    /// Business id already taken within the kind's table
    #[error("{kind} with business id '{business_id}' already exists")]
    DuplicateBusinessId {
        /// Table
        kind: EntityKind,
        /// Conflicting code
        business_id: String,
    },

    /// Engine refused the action
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl StoreError {
    /// Create a not-found error
    #[inline]
    pub fn not_found(kind: EntityKind, id: RecordId) -> Self {
        Self::NotFound { kind, id }
    }

    /// Engine error, if this is one
    #[must_use]
    pub fn as_engine(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}
