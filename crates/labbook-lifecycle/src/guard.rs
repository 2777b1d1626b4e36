//! Creation, plain edits and deletion
//!
//! Plain edits are open to the creator or an admin whatever the status, but
//! never touch immutable columns, never write the review pair, and never move
//! a record into a review outcome. Immutability is checked before anything
//! else so a `business_id` rewrite fails the same way for every role.

use crate::derivation::derive_inventory_status;
use crate::state_machine::{is_review_outcome, validate_transition};
use crate::transition::{Creation, Transition};
use chrono::{DateTime, Utc};
use labbook_core::{
    Actor, AuditAction, AuditEvent, Capability, EngineConfig, EngineError, Patch, Record,
    RecordDraft, RecordId, IMMUTABLE_FIELDS, TYPED_FIELDS,
};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

/// Reject any patch that would rewrite an immutable column
///
/// Restating the current value is allowed.
///
/// # Errors
/// Returns `ImmutableFieldViolation` naming the first offending field
pub fn check_immutable(record: &Record, patch: &Patch) -> Result<(), EngineError> {
    if patch
        .business_id
        .as_deref()
        .is_some_and(|id| id != record.business_id)
    {
        return Err(EngineError::immutable("business_id"));
    }
    if patch.created_by.is_some_and(|by| by != record.created_by) {
        return Err(EngineError::immutable("created_by"));
    }
    if let Some(field) = IMMUTABLE_FIELDS
        .iter()
        .find(|name| patch.fields.contains_key(**name))
    {
        return Err(EngineError::immutable(*field));
    }
    Ok(())
}

/// Validate a plain edit and compute the patch to store
///
/// For chemicals the patch's status is replaced with the derived one.
///
/// # Errors
/// - `ImmutableFieldViolation` for immutable columns
/// - `PermissionDenied` unless the actor may edit this record
/// - `ValidationError` for review columns, shadowed columns, foreign
///   statuses or negative quantities
/// - `InvalidTransition` for review outcomes, or off-graph moves in strict mode
pub fn edit(
    record: &Record,
    patch: &Patch,
    actor: &Actor,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<Transition, EngineError> {
    check_immutable(record, patch)?;
    actor.require_owner_or(record.created_by)?;

    if patch.approved_by.is_some() || patch.approval_date.is_some() {
        return Err(EngineError::validation(
            "approved_by and approval_date are set only by approve/reject",
        ));
    }
    check_free_form(&patch.fields)?;
    check_quantity(patch.quantity)?;

    let mut patch = patch.clone();
    // Restated immutable values are dropped rather than written back.
    patch.business_id = None;
    patch.created_by = None;

    if record.kind.has_derived_status() {
        let quantity = patch.quantity.unwrap_or_else(|| record.quantity_or_zero());
        let expiry = patch.expiry_date.unwrap_or(record.expiry_date);
        let derived = derive_inventory_status(quantity, expiry, now, config.low_stock_threshold);
        patch.status = Some(derived);
    } else if let Some(to) = patch.status {
        record.kind.check_status(to)?;
        if to != record.status {
            if is_review_outcome(record.kind, to) {
                return Err(EngineError::invalid_transition(
                    record.kind,
                    record.status,
                    format!("be set to '{to}' without review"),
                ));
            }
            if config.strict_transitions {
                validate_transition(record.kind, record.status, to)?;
            }
        }
    }

    let mut details = json!({
        "business_id": record.business_id,
        "changed": patch.touched(),
    });
    if let Some(title) = patch.fields.get(record.kind.required_field()) {
        details[record.kind.required_field()] = title.clone();
    }
    let audit = AuditEvent::new(
        record.kind,
        record.id.to_string(),
        AuditAction::Updated,
        actor.id,
        details,
        now,
    );
    Ok(Transition { patch, audit })
}

/// Validate a draft and build the record to insert
///
/// # Errors
/// - `PermissionDenied` if the actor cannot edit
/// - `ValidationError` for a blank business id or required field, shadowed
///   columns, foreign statuses or negative quantities
/// - `InvalidTransition` if the requested status is not an initial one
pub fn create(
    draft: &RecordDraft,
    actor: &Actor,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<Creation, EngineError> {
    actor.require(Capability::Edit)?;

    let business_id = draft.business_id.trim();
    if business_id.is_empty() {
        return Err(EngineError::validation("business_id is required"));
    }
    let required = draft.kind.required_field();
    if draft.field_str(required).map_or(true, |v| v.trim().is_empty()) {
        return Err(EngineError::validation(format!(
            "{required} is required for a new {}",
            draft.kind
        )));
    }
    if let Some(field) = IMMUTABLE_FIELDS
        .iter()
        .find(|name| draft.fields.contains_key(**name))
    {
        return Err(EngineError::validation(format!(
            "'{field}' must be given as a column, not a free-form field"
        )));
    }
    check_free_form(&draft.fields)?;
    check_quantity(draft.quantity)?;

    let status = if draft.kind.has_derived_status() {
        derive_inventory_status(
            draft.quantity.unwrap_or(Decimal::ZERO),
            draft.expiry_date,
            now,
            config.low_stock_threshold,
        )
    } else {
        let requested = draft.status.unwrap_or_else(|| draft.kind.default_status());
        draft.kind.check_status(requested)?;
        if !draft.kind.initial_statuses().contains(&requested) {
            return Err(EngineError::invalid_transition(
                draft.kind,
                draft.kind.default_status(),
                format!("be created as '{requested}'"),
            ));
        }
        requested
    };

    let record = Record {
        id: RecordId::new(),
        kind: draft.kind,
        business_id: business_id.to_string(),
        status,
        created_by: actor.id,
        approved_by: None,
        approval_date: None,
        quantity: draft.quantity,
        unit: draft.unit.clone(),
        expiry_date: draft.expiry_date,
        received_date: draft.received_date,
        fields: draft.fields.clone(),
        created_at: now,
        updated_at: now,
    };
    let mut details = json!({
        "business_id": record.business_id,
        "status": record.status,
    });
    details[required] = json!(record.field_str(required));
    let audit = AuditEvent::new(
        record.kind,
        record.id.to_string(),
        AuditAction::Created,
        actor.id,
        details,
        now,
    );
    Ok(Creation { record, audit })
}

/// Authorize a hard delete
///
/// # Errors
/// Returns `PermissionDenied` unless the actor is the creator or an admin
pub fn authorize_delete(
    record: &Record,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<AuditEvent, EngineError> {
    actor.require_owner_or(record.created_by)?;
    Ok(AuditEvent::new(
        record.kind,
        record.id.to_string(),
        AuditAction::Deleted,
        actor.id,
        json!({ "business_id": record.business_id, "status": record.status }),
        now,
    ))
}

fn check_free_form(fields: &Map<String, Value>) -> Result<(), EngineError> {
    match TYPED_FIELDS.iter().find(|name| fields.contains_key(**name)) {
        Some(field) => Err(EngineError::validation(format!(
            "'{field}' must be set through its column, not a free-form field"
        ))),
        None => Ok(()),
    }
}

fn check_quantity(quantity: Option<Decimal>) -> Result<(), EngineError> {
    match quantity {
        Some(q) if q < Decimal::ZERO => Err(EngineError::validation(format!(
            "quantity cannot be negative, got {q}"
        ))),
        _ => Ok(()),
    }
}
