//! Audit trail events
//!
//! The engine returns events as data; persisting them is the caller's call.

use crate::ids::ActorId;
use crate::status::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Record inserted
    Created,
    /// Plain edit
    Updated,
    /// Protocol sent for review
    Submitted,
    /// Review passed
    Approved,
    /// Review failed
    Rejected,
    /// Order arrived
    Received,
    /// Stock consumed or restocked
    QuantityAdjusted,
    /// Record removed
    Deleted,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Submitted => "submitted",
            AuditAction::Approved => "approved",
            AuditAction::Rejected => "rejected",
            AuditAction::Received => "received",
            AuditAction::QuantityAdjusted => "quantity_adjusted",
            AuditAction::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One audit trail row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Trail key, `AUDIT-<unix millis>`
    pub record_id: String,
    /// Table of the affected record
    pub entity: EntityKind,
    /// Primary key of the affected record
    pub entity_id: String,
    /// What happened
    pub action: AuditAction,
    /// Who did it
    pub performed_by: ActorId,
    /// Action-specific details
    pub details: Value,
    /// When it happened
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Create event stamped at `at`
    #[must_use]
    pub fn new(
        entity: EntityKind,
        entity_id: impl Into<String>,
        action: AuditAction,
        performed_by: ActorId,
        details: Value,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id: format!("AUDIT-{}", at.timestamp_millis()),
            entity,
            entity_id: entity_id.into(),
            action,
            performed_by,
            details,
            recorded_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn record_id_uses_millis() {
        let at = Utc.timestamp_millis_opt(1_735_689_600_123).unwrap();
        let event = AuditEvent::new(
            EntityKind::Project,
            "p-1",
            AuditAction::Updated,
            ActorId::new(),
            json!({ "title": "CRISPR screen" }),
            at,
        );
        assert_eq!(event.record_id, "AUDIT-1735689600123");
        assert_eq!(event.action.to_string(), "updated");
    }

    #[test]
    fn serializes_table_style_action() {
        let json = serde_json::to_value(AuditAction::QuantityAdjusted).unwrap();
        assert_eq!(json, json!("quantity_adjusted"));
    }
}
