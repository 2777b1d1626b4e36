//! Labbook Lifecycle - rules engine for lab notebook records
//!
//! Pure functions over records, actors and an injected "now":
//! - Approval workflow for projects, protocols and experiments
//! - Order receipt and stock adjustments
//! - Derived inventory status and expiry alerts
//! - Guards for creation, plain edits and deletion
//! - Dashboard summaries
//!
//! Nothing here performs I/O. Accepted actions come back as a patch plus an
//! audit event for the caller to persist.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use labbook_core::{Actor, ActorId, EngineConfig, EntityKind, FixedClock, RecordDraft, RecordStatus, Role};
//! use labbook_lifecycle::{Decision, LifecycleEngine};
//!
//! let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap());
//! let engine = LifecycleEngine::new(clock, EngineConfig::new());
//!
//! let associate = Actor::new(ActorId::new(), Role::ResearchAssociate);
//! let pi = Actor::new(ActorId::new(), Role::PrincipalInvestigator);
//!
//! let draft = RecordDraft::new(EntityKind::Project, "PRJ-001").with_field("title", "Kinase screen");
//! let project = engine.create(&draft, &associate).unwrap().record;
//! assert_eq!(project.status, RecordStatus::PendingApproval);
//!
//! let approved = engine.review(&project, Decision::Approve, &pi).unwrap();
//! assert_eq!(approved.target_status(), Some(RecordStatus::Approved));
//! ```

#![warn(unreachable_pub)]

pub mod approval;
pub mod dashboard;
pub mod derivation;
pub mod engine;
pub mod experiment;
pub mod guard;
pub mod inventory;
pub mod orders;
pub mod state_machine;
pub mod transition;

pub use approval::{approve, reject, submit_for_approval};
pub use dashboard::{awaits_review, DashboardSummary, ExpiryAlert, PendingReview, StockCounts};
pub use derivation::{
    days_until, derive_inventory_status, derive_record_status, is_expiring_soon,
    refresh_derived_status,
};
pub use engine::LifecycleEngine;
pub use experiment::{check_experiment_links, review_experiment};
pub use guard::{authorize_delete, check_immutable, create, edit};
pub use inventory::adjust_quantity;
pub use orders::mark_received;
pub use state_machine::{allowed_transitions, is_review_outcome, is_terminal, validate_transition};
pub use transition::{Creation, Decision, Transition};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the engine
    pub use crate::{Creation, DashboardSummary, Decision, LifecycleEngine, Transition};
    pub use labbook_core::{
        Actor, ActorId, AuditEvent, Clock, EngineConfig, EngineError, EntityKind, FixedClock,
        Patch, Record, RecordDraft, RecordStatus, Role, SystemClock,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
