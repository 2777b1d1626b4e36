//! Approval workflow for projects and protocols
//!
//! `Draft` (protocols only) → `Pending Approval` → `Approved` | `Rejected`.
//!
//! Preconditions are checked in a fixed order so callers get the most
//! specific error: wrong kind, bad target, wrong source status, then role.

use crate::transition::{Decision, Transition};
use chrono::{DateTime, Utc};
use labbook_core::{
    Actor, AuditAction, AuditEvent, Capability, EngineError, EntityKind, Patch, Record,
    RecordStatus,
};
use serde_json::json;

/// Review a pending project or protocol
///
/// `target` must be `Approved` or `Rejected`. On success the patch sets the
/// status together with `approved_by` and `approval_date`.
///
/// # Errors
/// - `InvalidTransition` if the record is not a project/protocol or is not
///   `Pending Approval`
/// - `ValidationError` if `target` is not a review outcome
/// - `PermissionDenied` if the actor cannot approve
pub fn approve(
    record: &Record,
    target: RecordStatus,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Transition, EngineError> {
    let verb = if target == RecordStatus::Rejected {
        Decision::Reject.action()
    } else {
        Decision::Approve.action()
    };
    if !matches!(record.kind, EntityKind::Project | EntityKind::Protocol) {
        return Err(EngineError::invalid_transition(record.kind, record.status, verb));
    }
    let action = match target {
        RecordStatus::Approved => AuditAction::Approved,
        RecordStatus::Rejected => AuditAction::Rejected,
        other => {
            return Err(EngineError::validation(format!(
                "review outcome must be 'Approved' or 'Rejected', got '{other}'"
            )))
        }
    };
    if record.status != RecordStatus::PendingApproval {
        return Err(EngineError::invalid_transition(record.kind, record.status, verb));
    }
    actor.require(Capability::Approve)?;

    Ok(reviewed(record, target, action, actor, now))
}

/// Reject a pending project or protocol
///
/// # Errors
/// Same as [`approve`]
pub fn reject(record: &Record, actor: &Actor, now: DateTime<Utc>) -> Result<Transition, EngineError> {
    approve(record, RecordStatus::Rejected, actor, now)
}

/// Send a draft protocol for review
///
/// # Errors
/// - `InvalidTransition` unless the record is a protocol in `Draft`
/// - `PermissionDenied` unless the actor is its creator or an admin
pub fn submit_for_approval(
    record: &Record,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Transition, EngineError> {
    if record.kind != EntityKind::Protocol || record.status != RecordStatus::Draft {
        return Err(EngineError::invalid_transition(
            record.kind,
            record.status,
            "be submitted for approval",
        ));
    }
    actor.require_owner_or(record.created_by)?;

    let patch = Patch::new().status(RecordStatus::PendingApproval);
    let audit = AuditEvent::new(
        record.kind,
        record.id.to_string(),
        AuditAction::Submitted,
        actor.id,
        json!({ "business_id": record.business_id, "from": record.status }),
        now,
    );
    Ok(Transition { patch, audit })
}

/// Patch and audit for a review outcome; shared with experiments
pub(crate) fn reviewed(
    record: &Record,
    target: RecordStatus,
    action: AuditAction,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Transition {
    let patch = Patch::new().status(target).reviewed(actor.id, now);
    let audit = AuditEvent::new(
        record.kind,
        record.id.to_string(),
        action,
        actor.id,
        json!({
            "business_id": record.business_id,
            "from": record.status,
            "to": target,
        }),
        now,
    );
    Transition { patch, audit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labbook_test_utils::{associate, guest, pi, project, protocol, test_now};

    #[test]
    fn pi_approves_pending_project() {
        let owner = associate();
        let reviewer = pi();
        let record = project(RecordStatus::PendingApproval, &owner);

        let t = approve(&record, RecordStatus::Approved, &reviewer, test_now()).unwrap();
        assert_eq!(t.patch.status, Some(RecordStatus::Approved));
        assert_eq!(t.patch.approved_by, Some(reviewer.id));
        assert_eq!(t.patch.approval_date, Some(test_now()));
        assert_eq!(t.audit.action, AuditAction::Approved);
        assert_eq!(t.audit.performed_by, reviewer.id);
        assert_eq!(t.audit.details["to"], "Approved");
    }

    #[test]
    fn reject_records_reviewer() {
        let record = protocol(RecordStatus::PendingApproval, &associate());
        let reviewer = pi();
        let t = reject(&record, &reviewer, test_now()).unwrap();
        assert_eq!(t.patch.status, Some(RecordStatus::Rejected));
        assert_eq!(t.patch.approved_by, Some(reviewer.id));
        assert_eq!(t.audit.action, AuditAction::Rejected);
    }

    #[test]
    fn status_is_checked_before_role() {
        let record = project(RecordStatus::Approved, &associate());
        let err = approve(&record, RecordStatus::Approved, &associate(), test_now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn guest_cannot_approve() {
        let record = project(RecordStatus::PendingApproval, &associate());
        let err = approve(&record, RecordStatus::Approved, &guest(), test_now()).unwrap_err();
        assert_eq!(
            err,
            EngineError::PermissionDenied {
                required: Capability::Approve,
                role: labbook_core::Role::Guest,
            }
        );
    }

    #[test]
    fn associate_cannot_approve() {
        let record = project(RecordStatus::PendingApproval, &associate());
        let err = approve(&record, RecordStatus::Approved, &associate(), test_now()).unwrap_err();
        assert!(err.is_permission());
    }

    #[test]
    fn target_must_be_review_outcome() {
        let record = project(RecordStatus::PendingApproval, &associate());
        let err = approve(&record, RecordStatus::Completed, &pi(), test_now()).unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
    }

    #[test]
    fn only_projects_and_protocols_use_approve() {
        let record = labbook_test_utils::experiment(RecordStatus::Planned, &associate());
        let err = approve(&record, RecordStatus::Approved, &pi(), test_now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn creator_submits_draft_protocol() {
        let owner = associate();
        let record = protocol(RecordStatus::Draft, &owner);
        let t = submit_for_approval(&record, &owner, test_now()).unwrap();
        assert_eq!(t.patch.status, Some(RecordStatus::PendingApproval));
        assert_eq!(t.patch.approved_by, None);
        assert_eq!(t.audit.action, AuditAction::Submitted);
    }

    #[test]
    fn others_cannot_submit() {
        let record = protocol(RecordStatus::Draft, &associate());
        assert!(submit_for_approval(&record, &associate(), test_now())
            .unwrap_err()
            .is_permission());
        assert!(submit_for_approval(&record, &labbook_test_utils::admin(), test_now()).is_ok());
    }

    #[test]
    fn submit_requires_draft() {
        let owner = associate();
        let record = protocol(RecordStatus::PendingApproval, &owner);
        let err = submit_for_approval(&record, &owner, test_now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid transition: protocol in status 'Pending Approval' cannot be submitted for approval"
        );
    }
}
