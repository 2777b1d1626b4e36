//! End-to-end workflows through the engine facade
//!
//! Patches are applied to in-memory records between steps, the way a caller
//! would write them back to the store.

use chrono::Duration;
use labbook_core::{
    Decimal, EngineConfig, EngineError, EntityKind, FixedClock, Patch, RecordDraft, RecordStatus,
};
use labbook_lifecycle::{Decision, LifecycleEngine};
use labbook_test_utils::{accounts, admin, associate, days_from_today, guest, pi, test_clock};
use pretty_assertions::assert_eq;

fn engine() -> LifecycleEngine<FixedClock> {
    LifecycleEngine::new(test_clock(), EngineConfig::default())
}

#[test]
fn test_project_approval_end_to_end() {
    let engine = engine();
    let owner = associate();
    let reviewer = pi();

    let draft = RecordDraft::new(EntityKind::Project, "PROJ-2025-001")
        .with_field("title", "CRISPR knockout screen");
    let mut project = engine.create(&draft, &owner).unwrap().record;
    assert_eq!(project.status, RecordStatus::PendingApproval);
    assert!(!project.is_reviewed());

    engine.clock().advance(Duration::hours(2));
    let approved = engine.review(&project, Decision::Approve, &reviewer).unwrap();
    project.apply(&approved.patch, engine.now());

    assert_eq!(project.status, RecordStatus::Approved);
    assert_eq!(project.approved_by, Some(reviewer.id));
    assert_eq!(project.approval_date, Some(engine.now()));
    assert_eq!(approved.audit.recorded_at, engine.now());

    // A second approval is a transition error, not a permission error.
    let err = engine.review(&project, Decision::Approve, &reviewer).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}

#[test]
fn test_protocol_draft_submit_approve() {
    let engine = engine();
    let owner = associate();

    let draft = RecordDraft::new(EntityKind::Protocol, "PROT-007")
        .with_field("title", "Plasmid miniprep")
        .with_status(RecordStatus::Draft);
    let mut protocol = engine.create(&draft, &owner).unwrap().record;

    let early = engine.review(&protocol, Decision::Approve, &pi()).unwrap_err();
    assert!(matches!(early, EngineError::InvalidTransition { .. }));

    let submitted = engine.submit(&protocol, &owner).unwrap();
    protocol.apply(&submitted.patch, engine.now());
    assert_eq!(protocol.status, RecordStatus::PendingApproval);

    let rejected = engine.review(&protocol, Decision::Reject, &admin()).unwrap();
    protocol.apply(&rejected.patch, engine.now());
    assert_eq!(protocol.status, RecordStatus::Rejected);
    assert!(protocol.is_reviewed());
}

#[test]
fn test_inventory_consumption_end_to_end() {
    let engine = engine();
    let owner = associate();

    let draft = RecordDraft::new(EntityKind::ChemicalInventory, "CHEM-042")
        .with_field("name", "Tris base")
        .with_quantity(Decimal::from(15), "g");
    let mut chemical = engine.create(&draft, &owner).unwrap().record;
    assert_eq!(chemical.status, RecordStatus::Available);

    let step = engine.adjust_quantity(&chemical, Decimal::from(-7), &owner).unwrap();
    chemical.apply(&step.patch, engine.now());
    assert_eq!(chemical.quantity, Some(Decimal::from(8)));
    assert_eq!(chemical.status, RecordStatus::LowStock);

    let step = engine.adjust_quantity(&chemical, Decimal::from(-8), &owner).unwrap();
    chemical.apply(&step.patch, engine.now());
    assert_eq!(chemical.quantity, Some(Decimal::ZERO));
    assert_eq!(chemical.status, RecordStatus::OutOfStock);

    let overdraw = engine.adjust_quantity(&chemical, Decimal::from(-1), &owner);
    assert!(matches!(overdraw, Err(EngineError::ValidationError(_))));
}

#[test]
fn test_inventory_expires_as_clock_advances() {
    let engine = engine();
    let owner = associate();
    let mut chemical = labbook_test_utils::chemical(40, Some(days_from_today(2)), &owner);

    assert!(!engine.refresh(&mut chemical));
    assert_eq!(chemical.status, RecordStatus::Available);
    assert!(engine.is_expiring_soon(&chemical));

    engine.clock().advance(Duration::days(3));
    assert_eq!(engine.display_status(&chemical), RecordStatus::Expired);
    assert!(engine.refresh(&mut chemical));
    assert_eq!(chemical.status, RecordStatus::Expired);
    assert!(!engine.is_expiring_soon(&chemical));
}

#[test]
fn test_order_receipt() {
    let engine = engine();
    let requester = associate();

    let draft = RecordDraft::new(EntityKind::ChemicalOrder, "ORD-1001")
        .with_field("name", "Agarose")
        .with_quantity(Decimal::from(500), "g");
    let mut order = engine.create(&draft, &requester).unwrap().record;
    assert_eq!(order.status, RecordStatus::Requested);

    let shipped = engine
        .edit(&order, &Patch::new().status(RecordStatus::Shipped), &requester)
        .unwrap();
    order.apply(&shipped.patch, engine.now());

    let received = engine.mark_received(&order, &accounts()).unwrap();
    order.apply(&received.patch, engine.now());
    assert_eq!(order.status, RecordStatus::Received);
    assert_eq!(order.received_date, Some(engine.now().date_naive()));

    let again = engine.mark_received(&order, &accounts()).unwrap_err();
    assert!(matches!(again, EngineError::InvalidTransition { .. }));
}

#[test]
fn test_cancelled_order_cannot_be_received() {
    let engine = engine();
    let order = labbook_test_utils::plasmid_order(RecordStatus::Cancelled, &associate());
    assert!(matches!(
        engine.mark_received(&order, &admin()),
        Err(EngineError::InvalidTransition { .. })
    ));
}

#[test]
fn test_experiment_review_dispatch() {
    let engine = engine();
    let owner = associate();
    let experiment = labbook_test_utils::experiment(RecordStatus::Planned, &owner);

    let started = engine.review(&experiment, Decision::Approve, &pi()).unwrap();
    assert_eq!(started.target_status(), Some(RecordStatus::InProgress));

    let denied = engine.review(&experiment, Decision::Approve, &guest()).unwrap_err();
    assert!(denied.is_permission());
}

#[test]
fn test_review_of_unreviewable_kind() {
    let engine = engine();
    let chemical = labbook_test_utils::chemical(10, None, &associate());
    assert!(matches!(
        engine.review(&chemical, Decision::Approve, &admin()),
        Err(EngineError::InvalidTransition { .. })
    ));
}

#[test]
fn test_dashboard_through_engine() {
    let engine = engine();
    let owner = associate();
    let records = vec![
        labbook_test_utils::project(RecordStatus::PendingApproval, &owner),
        labbook_test_utils::chemical(3, Some(days_from_today(5)), &owner),
    ];
    let summary = engine.dashboard(&records);
    assert_eq!(summary.stock.low_stock, 1);
    assert_eq!(summary.expiring_soon.len(), 1);
    assert_eq!(summary.pending_reviews.len(), 1);
}
