//! Experiment lifecycle
//!
//! `Planned` → `In Progress` → `Completed` | `On Hold` | `Cancelled`.
//! Review works like projects/protocols, but from `Planned`, with approve
//! starting the experiment and reject cancelling it.

use crate::approval::reviewed;
use crate::transition::{Decision, Transition};
use chrono::{DateTime, Utc};
use labbook_core::{
    Actor, AuditAction, Capability, EngineError, EntityKind, Record, RecordStatus,
};

/// Approve or reject a planned experiment
///
/// # Errors
/// - `InvalidTransition` unless the record is an experiment in `Planned`
/// - `PermissionDenied` if the actor cannot approve
pub fn review_experiment(
    record: &Record,
    decision: Decision,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Transition, EngineError> {
    if record.kind != EntityKind::Experiment || record.status != RecordStatus::Planned {
        return Err(EngineError::invalid_transition(
            record.kind,
            record.status,
            decision.action(),
        ));
    }
    actor.require(Capability::Approve)?;

    let (target, action) = match decision {
        Decision::Approve => (RecordStatus::InProgress, AuditAction::Approved),
        Decision::Reject => (RecordStatus::Cancelled, AuditAction::Rejected),
    };
    Ok(reviewed(record, target, action, actor, now))
}

/// Check the project and protocol an experiment links to
///
/// Experiments may only reference approved work.
///
/// # Errors
/// Returns `ValidationError` naming the first offending link
pub fn check_experiment_links(
    project: Option<&Record>,
    protocol: Option<&Record>,
) -> Result<(), EngineError> {
    for (expected, linked) in [
        (EntityKind::Project, project),
        (EntityKind::Protocol, protocol),
    ] {
        let Some(linked) = linked else { continue };
        if linked.kind != expected {
            return Err(EngineError::validation(format!(
                "experiment link '{}' is a {}, expected a {expected}",
                linked.business_id, linked.kind
            )));
        }
        if linked.status != RecordStatus::Approved {
            return Err(EngineError::validation(format!(
                "{expected} '{}' is '{}'; experiments may only link approved work",
                linked.business_id, linked.status
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labbook_test_utils::{admin, associate, experiment, guest, pi, project, protocol, test_now};

    #[test]
    fn approve_starts_planned_experiment() {
        let reviewer = pi();
        let record = experiment(RecordStatus::Planned, &associate());
        let t = review_experiment(&record, Decision::Approve, &reviewer, test_now()).unwrap();
        assert_eq!(t.patch.status, Some(RecordStatus::InProgress));
        assert_eq!(t.patch.approved_by, Some(reviewer.id));
        assert_eq!(t.audit.action, AuditAction::Approved);
    }

    #[test]
    fn reject_cancels_planned_experiment() {
        let record = experiment(RecordStatus::Planned, &associate());
        let t = review_experiment(&record, Decision::Reject, &admin(), test_now()).unwrap();
        assert_eq!(t.patch.status, Some(RecordStatus::Cancelled));
        assert_eq!(t.audit.action, AuditAction::Rejected);
    }

    #[test]
    fn review_requires_planned() {
        let record = experiment(RecordStatus::InProgress, &associate());
        let err = review_experiment(&record, Decision::Approve, &pi(), test_now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn guest_cannot_review() {
        let record = experiment(RecordStatus::Planned, &associate());
        let err = review_experiment(&record, Decision::Reject, &guest(), test_now()).unwrap_err();
        assert!(err.is_permission());
    }

    #[test]
    fn links_must_be_approved() {
        let owner = associate();
        let approved = project(RecordStatus::Approved, &owner);
        let pending = protocol(RecordStatus::PendingApproval, &owner);

        assert!(check_experiment_links(Some(&approved), None).is_ok());
        assert!(check_experiment_links(None, None).is_ok());
        let err = check_experiment_links(Some(&approved), Some(&pending)).unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
    }

    #[test]
    fn links_must_have_matching_kind() {
        let owner = associate();
        let approved_protocol = protocol(RecordStatus::Approved, &owner);
        let err = check_experiment_links(Some(&approved_protocol), None).unwrap_err();
        assert!(err.to_string().contains("expected a project"));
    }
}
