//! Order tracking for chemical and plasmid orders
//!
//! Chemical: `Requested` → `Ordered` → `Shipped` → `Received` | `Cancelled`.
//! Plasmid: `Ordered` → `In Transit` → `Received` | `Cancelled`.
//!
//! Only receipt has a dedicated operation; other status changes are plain
//! edits.

use crate::transition::Transition;
use chrono::{DateTime, Utc};
use labbook_core::{
    Actor, AuditAction, AuditEvent, Capability, EngineError, Patch, Record, RecordStatus,
};
use serde_json::json;

/// Mark an open order as received today
///
/// # Errors
/// - `InvalidTransition` if the record is not an order, or is already
///   `Received` or `Cancelled`
/// - `PermissionDenied` if the actor cannot edit
pub fn mark_received(
    record: &Record,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Transition, EngineError> {
    if !record.kind.is_order()
        || matches!(record.status, RecordStatus::Received | RecordStatus::Cancelled)
    {
        return Err(EngineError::invalid_transition(
            record.kind,
            record.status,
            "be marked received",
        ));
    }
    actor.require(Capability::Edit)?;

    let today = now.date_naive();
    let patch = Patch::new()
        .status(RecordStatus::Received)
        .received_date(Some(today));
    let audit = AuditEvent::new(
        record.kind,
        record.id.to_string(),
        AuditAction::Received,
        actor.id,
        json!({
            "business_id": record.business_id,
            "from": record.status,
            "received_date": today,
        }),
        now,
    );
    Ok(Transition { patch, audit })
}
