//! Stock adjustments
//!
//! Consumption and restocking change quantity and, for chemicals, re-derive
//! status in the same patch. Stock is shared: any role that can edit may
//! adjust it, whoever created the row. Other field edits stay with the
//! creator or an admin.

use crate::derivation::derive_inventory_status;
use crate::transition::Transition;
use chrono::{DateTime, Utc};
use labbook_core::{
    Actor, AuditAction, AuditEvent, Capability, EngineConfig, EngineError, EntityKind, Patch,
    Record,
};
use rust_decimal::Decimal;
use serde_json::json;

/// Add `delta` (negative to consume) to a stock record's quantity
///
/// # Errors
/// - `InvalidTransition` if the record does not hold stock
/// - `PermissionDenied` if the actor cannot edit
/// - `ValidationError` if the result would be negative or overflow
pub fn adjust_quantity(
    record: &Record,
    delta: Decimal,
    actor: &Actor,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<Transition, EngineError> {
    if !matches!(record.kind, EntityKind::ChemicalInventory | EntityKind::Product) {
        return Err(EngineError::invalid_transition(
            record.kind,
            record.status,
            "have its quantity adjusted",
        ));
    }
    actor.require(Capability::Edit)?;

    let before = record.quantity_or_zero();
    let after = before.checked_add(delta).ok_or_else(|| {
        EngineError::validation(format!(
            "cannot adjust {} by {delta}: quantity out of range",
            record.business_id
        ))
    })?;
    if after < Decimal::ZERO {
        return Err(EngineError::validation(format!(
            "cannot adjust {} by {delta}: only {before} {} on hand",
            record.business_id,
            record.unit.as_deref().unwrap_or("units"),
        )));
    }

    let mut patch = Patch::new().quantity(after);
    if record.kind.has_derived_status() {
        patch = patch.status(derive_inventory_status(
            after,
            record.expiry_date,
            now,
            config.low_stock_threshold,
        ));
    }
    let audit = AuditEvent::new(
        record.kind,
        record.id.to_string(),
        AuditAction::QuantityAdjusted,
        actor.id,
        json!({
            "business_id": record.business_id,
            "from": before,
            "to": after,
            "delta": delta,
        }),
        now,
    );
    Ok(Transition { patch, audit })
}
