//! Generic record shape shared by every entity kind
//!
//! - [`Record`]: a row as read from the store
//! - [`RecordDraft`]: field set for a record that does not exist yet
//! - [`Patch`]: partial field changes produced by the engine
//!
//! Typed columns carry the fields the engine reasons about. Everything else
//! (title, description, CAS number, location, ...) lives in the free-form
//! `fields` map.

use crate::ids::{ActorId, RecordId};
use crate::status::{EntityKind, RecordStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Columns that can never change once a record exists
pub const IMMUTABLE_FIELDS: [&str; 4] = ["id", "business_id", "created_by", "created_at"];

/// Typed columns; free-form `fields` may not shadow them
pub const TYPED_FIELDS: [&str; 8] = [
    "status",
    "approved_by",
    "approval_date",
    "quantity",
    "unit",
    "expiry_date",
    "received_date",
    "updated_at",
];

/// A stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key
    pub id: RecordId,
    /// Table the record lives in
    pub kind: EntityKind,
    /// Human-facing code, e.g. `PROJ-2025-001`
    pub business_id: String,
    /// Lifecycle status; a cache of the derivation for inventory items
    pub status: RecordStatus,
    /// Creator
    pub created_by: ActorId,
    /// Reviewer, set with `approval_date`
    #[serde(default)]
    pub approved_by: Option<ActorId>,
    /// Review time, set with `approved_by`
    #[serde(default)]
    pub approval_date: Option<DateTime<Utc>>,
    /// Stock or order quantity
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// Unit for `quantity`, free text
    #[serde(default)]
    pub unit: Option<String>,
    /// Expiry date of a chemical
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Arrival date of an order
    #[serde(default)]
    pub received_date: Option<NaiveDate>,
    /// Free-form attributes
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Free-form string attribute
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Title or name used for display and search
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.field_str(self.kind.required_field())
            .unwrap_or(&self.business_id)
    }

    /// Quantity, treating a missing value as zero
    #[inline]
    #[must_use]
    pub fn quantity_or_zero(&self) -> Decimal {
        self.quantity.unwrap_or(Decimal::ZERO)
    }

    /// Whether the approval pair is complete
    #[inline]
    #[must_use]
    pub fn is_reviewed(&self) -> bool {
        self.approved_by.is_some() && self.approval_date.is_some()
    }

    /// Apply a patch and bump `updated_at`
    ///
    /// The patch is assumed to have been produced or checked by the engine;
    /// immutable columns in it are ignored here.
    pub fn apply(&mut self, patch: &Patch, now: DateTime<Utc>) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(approved_by) = patch.approved_by {
            self.approved_by = Some(approved_by);
        }
        if let Some(approval_date) = patch.approval_date {
            self.approval_date = Some(approval_date);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = Some(quantity);
        }
        if let Some(unit) = &patch.unit {
            self.unit = Some(unit.clone());
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = expiry_date;
        }
        if let Some(received_date) = patch.received_date {
            self.received_date = received_date;
        }
        for (key, value) in &patch.fields {
            if value.is_null() {
                self.fields.remove(key);
            } else {
                self.fields.insert(key.clone(), value.clone());
            }
        }
        self.updated_at = now;
    }

    /// Copy of the record with the patch applied
    #[must_use]
    pub fn patched(&self, patch: &Patch, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.apply(patch, now);
        next
    }
}

/// Field set for a record about to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    /// Target table
    pub kind: EntityKind,
    /// Human-facing code
    pub business_id: String,
    /// Requested initial status; the kind's default when absent
    #[serde(default)]
    pub status: Option<RecordStatus>,
    /// Initial quantity
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// Unit for `quantity`
    #[serde(default)]
    pub unit: Option<String>,
    /// Expiry date
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Arrival date
    #[serde(default)]
    pub received_date: Option<NaiveDate>,
    /// Free-form attributes
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RecordDraft {
    /// Create draft
    #[inline]
    #[must_use]
    pub fn new(kind: EntityKind, business_id: impl Into<String>) -> Self {
        Self {
            kind,
            business_id: business_id.into(),
            status: None,
            quantity: None,
            unit: None,
            expiry_date: None,
            received_date: None,
            fields: Map::new(),
        }
    }

    /// With requested status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// With quantity and unit
    #[inline]
    #[must_use]
    pub fn with_quantity(mut self, quantity: Decimal, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity);
        self.unit = Some(unit.into());
        self
    }

    /// With expiry date
    #[inline]
    #[must_use]
    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// With free-form attribute
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Free-form string attribute
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Partial set of field changes
///
/// `expiry_date` and `received_date` use a nested option: `Some(None)`
/// clears the column, `None` leaves it alone. A `null` in `fields` removes
/// the attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    /// Business id; only an unchanged value is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    /// Creator; only an unchanged value is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ActorId>,
    /// Reviewer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<ActorId>,
    /// Review time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    /// New quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// New unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// New or cleared expiry date
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<Option<NaiveDate>>,
    /// New or cleared received date
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub received_date: Option<Option<NaiveDate>>,
    /// Free-form attribute changes
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

/// Reads an explicit `null` as `Some(None)`; an absent key stays `None`
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

impl Patch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set status
    #[inline]
    #[must_use]
    pub fn status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set business id
    #[inline]
    #[must_use]
    pub fn business_id(mut self, business_id: impl Into<String>) -> Self {
        self.business_id = Some(business_id.into());
        self
    }

    /// Set quantity
    #[inline]
    #[must_use]
    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set or clear expiry date
    #[inline]
    #[must_use]
    pub fn expiry_date(mut self, expiry_date: Option<NaiveDate>) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Set or clear received date
    #[inline]
    #[must_use]
    pub fn received_date(mut self, received_date: Option<NaiveDate>) -> Self {
        self.received_date = Some(received_date);
        self
    }

    /// Set the review pair
    #[inline]
    #[must_use]
    pub fn reviewed(mut self, by: ActorId, at: DateTime<Utc>) -> Self {
        self.approved_by = Some(by);
        self.approval_date = Some(at);
        self
    }

    /// Set free-form attribute
    #[inline]
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the columns this patch writes, for audit details
    #[must_use]
    pub fn touched(&self) -> Vec<String> {
        let mut names = Vec::new();
        let typed = [
            ("status", self.status.is_some()),
            ("business_id", self.business_id.is_some()),
            ("created_by", self.created_by.is_some()),
            ("approved_by", self.approved_by.is_some()),
            ("approval_date", self.approval_date.is_some()),
            ("quantity", self.quantity.is_some()),
            ("unit", self.unit.is_some()),
            ("expiry_date", self.expiry_date.is_some()),
            ("received_date", self.received_date.is_some()),
        ];
        names.extend(
            typed
                .into_iter()
                .filter(|(_, set)| *set)
                .map(|(name, _)| name.to_string()),
        );
        names.extend(self.fields.keys().cloned());
        names
    }
}
