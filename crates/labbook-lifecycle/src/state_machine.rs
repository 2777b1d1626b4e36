//! Per-kind status transition graphs
//!
//! Plain edits consult these only in strict mode; review outcomes are
//! reachable through approve/reject alone.

use labbook_core::{EngineError, EntityKind, RecordStatus};

/// Validates a status change for a kind against its transition graph.
///
/// Only consulted for plain edits when strict transitions are configured;
/// the dedicated operations (approve, receive, ...) carry their own
/// preconditions.
///
/// # Errors
/// - `ValidationError` if `to` is not a status of `kind`
/// - `InvalidTransition` if the graph has no `from` → `to` edge
pub fn validate_transition(
    kind: EntityKind,
    from: RecordStatus,
    to: RecordStatus,
) -> Result<(), EngineError> {
    kind.check_status(to)?;
    if from == to || allowed(kind, from, to) {
        Ok(())
    } else {
        Err(EngineError::invalid_transition(
            kind,
            from,
            format!("move to '{to}'"),
        ))
    }
}

/// Statuses reachable from `from` in one step; empty for terminal states
#[must_use]
pub fn allowed_transitions(kind: EntityKind, from: RecordStatus) -> Vec<RecordStatus> {
    use RecordStatus::*;
    match (kind, from) {
        (EntityKind::Project, PendingApproval) => vec![Approved, Rejected],
        (EntityKind::Project, Approved) => vec![InProgress],
        (EntityKind::Project, InProgress) => vec![Completed],
        (EntityKind::Project, Rejected) => vec![PendingApproval],

        (EntityKind::Protocol, Draft) => vec![PendingApproval],
        (EntityKind::Protocol, PendingApproval) => vec![Approved, Rejected, Draft],
        (EntityKind::Protocol, Approved) => vec![Archived],
        (EntityKind::Protocol, Rejected) => vec![Draft],

        (EntityKind::Experiment, Planned) => vec![InProgress, Cancelled],
        (EntityKind::Experiment, InProgress) => vec![Completed, OnHold, Cancelled],
        (EntityKind::Experiment, OnHold) => vec![InProgress, Cancelled],

        (EntityKind::ChemicalOrder, Requested) => vec![Ordered, Cancelled],
        (EntityKind::ChemicalOrder, Ordered) => vec![Shipped, Received, Cancelled],
        (EntityKind::ChemicalOrder, Shipped) => vec![Received, Cancelled],

        (EntityKind::PlasmidOrder, Ordered) => vec![InTransit, Received, Cancelled],
        (EntityKind::PlasmidOrder, InTransit) => vec![Received, Cancelled],

        // Derived: any stock state may follow any other.
        (EntityKind::ChemicalInventory, s) if kind.allows(s) => kind
            .statuses()
            .iter()
            .copied()
            .filter(|t| *t != s)
            .collect(),

        (EntityKind::Product, QcPending) => vec![QcPass, QcFail, QcNotApplicable],
        (EntityKind::Product, QcFail) => vec![QcPending],

        _ => vec![],
    }
}

fn allowed(kind: EntityKind, from: RecordStatus, to: RecordStatus) -> bool {
    allowed_transitions(kind, from).into_iter().any(|s| s == to)
}

/// Statuses reachable only through approve/reject
#[must_use]
pub fn is_review_outcome(kind: EntityKind, status: RecordStatus) -> bool {
    matches!(
        (kind, status),
        (
            EntityKind::Project | EntityKind::Protocol,
            RecordStatus::Approved | RecordStatus::Rejected
        )
    )
}

/// Terminal statuses have no outgoing edges
#[must_use]
pub fn is_terminal(kind: EntityKind, status: RecordStatus) -> bool {
    allowed_transitions(kind, status).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_and_cancelled_orders_are_terminal() {
        for kind in [EntityKind::ChemicalOrder, EntityKind::PlasmidOrder] {
            assert!(is_terminal(kind, RecordStatus::Received));
            assert!(is_terminal(kind, RecordStatus::Cancelled));
        }
    }

    #[test]
    fn self_transition_is_noop() {
        assert!(validate_transition(
            EntityKind::Project,
            RecordStatus::Completed,
            RecordStatus::Completed
        )
        .is_ok());
    }

    #[test]
    fn foreign_status_is_validation_error() {
        let err = validate_transition(
            EntityKind::PlasmidOrder,
            RecordStatus::Ordered,
            RecordStatus::Shipped,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
    }

    #[test]
    fn allowed_transitions_follow_graph() {
        assert_eq!(
            allowed_transitions(EntityKind::Protocol, RecordStatus::Draft),
            vec![RecordStatus::PendingApproval]
        );
        assert!(allowed_transitions(EntityKind::Product, RecordStatus::QcPass).is_empty());
        assert_eq!(
            allowed_transitions(EntityKind::ChemicalInventory, RecordStatus::Expired).len(),
            3
        );
    }

    #[test]
    fn review_outcomes() {
        assert!(is_review_outcome(EntityKind::Protocol, RecordStatus::Approved));
        assert!(!is_review_outcome(EntityKind::Experiment, RecordStatus::InProgress));
        assert!(!is_review_outcome(EntityKind::Project, RecordStatus::Completed));
    }
}
