//! Entity kinds and their status vocabularies
//!
//! Each kind owns a fixed set of statuses. A record whose status is outside
//! its kind's set is malformed; [`EntityKind::check_status`] is the gate.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Table a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Research project, approval-gated
    Project,
    /// Lab protocol, approval-gated with a draft stage
    Protocol,
    /// Experiment run under a project/protocol
    Experiment,
    /// Chemical stock item with derived status
    ChemicalInventory,
    /// Purchase order for chemicals
    ChemicalOrder,
    /// Purchase order for plasmids
    PlasmidOrder,
    /// Manufactured product batch, status is its QC state
    Product,
}

impl EntityKind {
    /// All kinds
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Project,
        EntityKind::Protocol,
        EntityKind::Experiment,
        EntityKind::ChemicalInventory,
        EntityKind::ChemicalOrder,
        EntityKind::PlasmidOrder,
        EntityKind::Product,
    ];

    /// Backing table name
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Protocol => "protocols",
            EntityKind::Experiment => "experiments",
            EntityKind::ChemicalInventory => "chemical_inventory",
            EntityKind::ChemicalOrder => "chemical_orders",
            EntityKind::PlasmidOrder => "plasmid_orders",
            EntityKind::Product => "products",
        }
    }

    /// Statuses a record of this kind may hold
    #[must_use]
    pub fn statuses(&self) -> &'static [RecordStatus] {
        use RecordStatus::*;
        match self {
            EntityKind::Project => &[PendingApproval, Approved, InProgress, Completed, Rejected],
            EntityKind::Protocol => &[Draft, PendingApproval, Approved, Rejected, Archived],
            EntityKind::Experiment => &[Planned, InProgress, Completed, OnHold, Cancelled],
            EntityKind::ChemicalInventory => &[Available, LowStock, OutOfStock, Expired],
            EntityKind::ChemicalOrder => &[Requested, Ordered, Shipped, Received, Cancelled],
            EntityKind::PlasmidOrder => &[Ordered, InTransit, Received, Cancelled],
            EntityKind::Product => &[QcPending, QcPass, QcFail, QcNotApplicable],
        }
    }

    /// Status given to new records when none is requested
    #[must_use]
    pub fn default_status(&self) -> RecordStatus {
        self.statuses()[0]
    }

    /// Statuses a record may be created in
    ///
    /// Approval outcomes and terminal order states are excluded; records
    /// reach them only through the engine's transitions.
    #[must_use]
    pub fn initial_statuses(&self) -> &'static [RecordStatus] {
        use RecordStatus::*;
        match self {
            EntityKind::Project => &[PendingApproval],
            EntityKind::Protocol => &[Draft, PendingApproval],
            EntityKind::Experiment => &[Planned],
            EntityKind::ChemicalInventory => &[Available, LowStock, OutOfStock, Expired],
            EntityKind::ChemicalOrder => &[Requested, Ordered],
            EntityKind::PlasmidOrder => &[Ordered],
            EntityKind::Product => &[QcPending, QcPass, QcFail, QcNotApplicable],
        }
    }

    /// Whether `status` belongs to this kind
    #[inline]
    #[must_use]
    pub fn allows(&self, status: RecordStatus) -> bool {
        self.statuses().contains(&status)
    }

    /// Fail unless `status` belongs to this kind
    ///
    /// # Errors
    /// Returns [`EngineError::ValidationError`] for foreign statuses
    pub fn check_status(&self, status: RecordStatus) -> Result<(), EngineError> {
        if self.allows(status) {
            Ok(())
        } else {
            Err(EngineError::validation(format!(
                "status '{status}' is not valid for {self}"
            )))
        }
    }

    /// Whether records of this kind go through approve/reject
    #[inline]
    #[must_use]
    pub fn is_approval_gated(&self) -> bool {
        matches!(
            self,
            EntityKind::Project | EntityKind::Protocol | EntityKind::Experiment
        )
    }

    /// Whether records of this kind are purchase orders
    #[inline]
    #[must_use]
    pub fn is_order(&self) -> bool {
        matches!(self, EntityKind::ChemicalOrder | EntityKind::PlasmidOrder)
    }

    /// Whether status is derived from quantity and expiry
    #[inline]
    #[must_use]
    pub fn has_derived_status(&self) -> bool {
        matches!(self, EntityKind::ChemicalInventory)
    }

    /// Free-form field that must be present and non-empty on creation
    #[must_use]
    pub fn required_field(&self) -> &'static str {
        match self {
            EntityKind::Project | EntityKind::Protocol | EntityKind::Experiment => "title",
            EntityKind::ChemicalInventory | EntityKind::ChemicalOrder | EntityKind::Product => {
                "name"
            }
            EntityKind::PlasmidOrder => "plasmid_name",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Project => "project",
            EntityKind::Protocol => "protocol",
            EntityKind::Experiment => "experiment",
            EntityKind::ChemicalInventory => "chemical",
            EntityKind::ChemicalOrder => "chemical order",
            EntityKind::PlasmidOrder => "plasmid order",
            EntityKind::Product => "product",
        };
        f.write_str(label)
    }
}

impl FromStr for EntityKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.table() == s)
            .ok_or_else(|| EngineError::validation(format!("unknown table: '{s}'")))
    }
}

/// Every status value across all kinds
///
/// Serialized with the display strings the store holds ("Pending Approval").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Protocol being written
    #[serde(rename = "Draft")]
    Draft,
    /// Awaiting review
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    /// Review passed
    #[serde(rename = "Approved")]
    Approved,
    /// Review failed
    #[serde(rename = "Rejected")]
    Rejected,
    /// Retired protocol
    #[serde(rename = "Archived")]
    Archived,
    /// Experiment awaiting start
    #[serde(rename = "Planned")]
    Planned,
    /// Work under way
    #[serde(rename = "In Progress")]
    InProgress,
    /// Work finished
    #[serde(rename = "Completed")]
    Completed,
    /// Work paused
    #[serde(rename = "On Hold")]
    OnHold,
    /// Abandoned experiment or order
    #[serde(rename = "Cancelled")]
    Cancelled,
    /// Stock above the low threshold
    #[serde(rename = "Available")]
    Available,
    /// Stock at or below the low threshold
    #[serde(rename = "Low Stock")]
    LowStock,
    /// Stock exhausted
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    /// Past expiry date
    #[serde(rename = "Expired")]
    Expired,
    /// Order raised, not yet placed
    #[serde(rename = "Requested")]
    Requested,
    /// Order placed with supplier
    #[serde(rename = "Ordered")]
    Ordered,
    /// Chemical order dispatched
    #[serde(rename = "Shipped")]
    Shipped,
    /// Plasmid order dispatched
    #[serde(rename = "In Transit")]
    InTransit,
    /// Order arrived
    #[serde(rename = "Received")]
    Received,
    /// QC not yet run
    #[serde(rename = "Pending")]
    QcPending,
    /// QC passed
    #[serde(rename = "Pass")]
    QcPass,
    /// QC failed
    #[serde(rename = "Fail")]
    QcFail,
    /// QC not applicable
    #[serde(rename = "N/A")]
    QcNotApplicable,
}

impl RecordStatus {
    /// All statuses
    pub const ALL: [RecordStatus; 23] = [
        RecordStatus::Draft,
        RecordStatus::PendingApproval,
        RecordStatus::Approved,
        RecordStatus::Rejected,
        RecordStatus::Archived,
        RecordStatus::Planned,
        RecordStatus::InProgress,
        RecordStatus::Completed,
        RecordStatus::OnHold,
        RecordStatus::Cancelled,
        RecordStatus::Available,
        RecordStatus::LowStock,
        RecordStatus::OutOfStock,
        RecordStatus::Expired,
        RecordStatus::Requested,
        RecordStatus::Ordered,
        RecordStatus::Shipped,
        RecordStatus::InTransit,
        RecordStatus::Received,
        RecordStatus::QcPending,
        RecordStatus::QcPass,
        RecordStatus::QcFail,
        RecordStatus::QcNotApplicable,
    ];

    /// Display string as stored
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Draft => "Draft",
            RecordStatus::PendingApproval => "Pending Approval",
            RecordStatus::Approved => "Approved",
            RecordStatus::Rejected => "Rejected",
            RecordStatus::Archived => "Archived",
            RecordStatus::Planned => "Planned",
            RecordStatus::InProgress => "In Progress",
            RecordStatus::Completed => "Completed",
            RecordStatus::OnHold => "On Hold",
            RecordStatus::Cancelled => "Cancelled",
            RecordStatus::Available => "Available",
            RecordStatus::LowStock => "Low Stock",
            RecordStatus::OutOfStock => "Out of Stock",
            RecordStatus::Expired => "Expired",
            RecordStatus::Requested => "Requested",
            RecordStatus::Ordered => "Ordered",
            RecordStatus::Shipped => "Shipped",
            RecordStatus::InTransit => "In Transit",
            RecordStatus::Received => "Received",
            RecordStatus::QcPending => "Pending",
            RecordStatus::QcPass => "Pass",
            RecordStatus::QcFail => "Fail",
            RecordStatus::QcNotApplicable => "N/A",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| EngineError::validation(format!("unknown status: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_creation_forms() {
        assert_eq!(EntityKind::Project.default_status(), RecordStatus::PendingApproval);
        assert_eq!(EntityKind::Protocol.default_status(), RecordStatus::Draft);
        assert_eq!(EntityKind::Experiment.default_status(), RecordStatus::Planned);
        assert_eq!(EntityKind::ChemicalOrder.default_status(), RecordStatus::Requested);
        assert_eq!(EntityKind::PlasmidOrder.default_status(), RecordStatus::Ordered);
        assert_eq!(EntityKind::Product.default_status(), RecordStatus::QcPending);
    }

    #[test]
    fn initial_statuses_are_subsets() {
        for kind in EntityKind::ALL {
            for status in kind.initial_statuses() {
                assert!(kind.allows(*status), "{kind} cannot start in {status}");
            }
            assert!(kind.initial_statuses().contains(&kind.default_status()));
        }
    }

    #[test]
    fn project_has_no_draft() {
        assert!(EntityKind::Project.check_status(RecordStatus::Draft).is_err());
        assert!(EntityKind::Protocol.check_status(RecordStatus::Draft).is_ok());
    }

    #[test]
    fn status_serializes_as_display_string() {
        let json = serde_json::to_string(&RecordStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
        let back: RecordStatus = serde_json::from_str("\"N/A\"").unwrap();
        assert_eq!(back, RecordStatus::QcNotApplicable);
    }

    #[test]
    fn status_from_str_matches_display() {
        for status in RecordStatus::ALL {
            assert_eq!(status.to_string().parse::<RecordStatus>(), Ok(status));
        }
    }

    #[test]
    fn kind_parses_table_names() {
        assert_eq!("plasmid_orders".parse::<EntityKind>(), Ok(EntityKind::PlasmidOrder));
        assert!("audit_trail".parse::<EntityKind>().is_err());
    }
}
