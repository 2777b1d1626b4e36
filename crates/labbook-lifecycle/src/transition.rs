//! Outputs of accepted actions

use labbook_core::{AuditEvent, Patch, Record, RecordStatus};
use serde::{Deserialize, Serialize};

/// Accepted change to an existing record
///
/// The caller applies `patch` through the store and decides whether to
/// persist `audit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Field changes to apply
    pub patch: Patch,
    /// Trail entry describing the change
    pub audit: AuditEvent,
}

impl Transition {
    /// Status the record will hold after the patch, if it changes
    #[inline]
    #[must_use]
    pub fn target_status(&self) -> Option<RecordStatus> {
        self.patch.status
    }
}

/// Accepted creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creation {
    /// Fully formed record to insert
    pub record: Record,
    /// Trail entry for the insert
    pub audit: AuditEvent,
}

/// Reviewer's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Accept the record
    Approve,
    /// Turn the record down
    Reject,
}

impl Decision {
    /// Verb used in logs
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    /// Action phrase used in transition errors
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Decision::Approve => "be approved",
            Decision::Reject => "be rejected",
        }
    }
}
