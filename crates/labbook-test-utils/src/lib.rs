//! Testing utilities for the labbook workspace
//!
//! Shared fixtures: a frozen clock, one actor per role and stored records
//! of every kind.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use labbook_core::{
    Actor, ActorId, Decimal, EntityKind, FixedClock, Record, RecordId, RecordStatus, Role,
};
use serde_json::{Map, Value};

/// Fixed "now" used across tests: 2025-06-15 12:00 UTC
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

pub fn test_today() -> NaiveDate {
    test_now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    test_today() + Duration::days(days)
}

pub fn test_clock() -> FixedClock {
    FixedClock::new(test_now())
}

pub fn actor(role: Role) -> Actor {
    Actor::new(ActorId::new(), role)
}

pub fn admin() -> Actor {
    actor(Role::Admin)
}

pub fn pi() -> Actor {
    actor(Role::PrincipalInvestigator)
}

pub fn associate() -> Actor {
    actor(Role::ResearchAssociate)
}

pub fn accounts() -> Actor {
    actor(Role::Accounts)
}

pub fn guest() -> Actor {
    actor(Role::Guest)
}

/// Bare stored record of `kind` in `status`, created by `owner` a week ago
pub fn record(kind: EntityKind, status: RecordStatus, owner: &Actor) -> Record {
    let created = test_now() - Duration::days(7);
    let mut fields = Map::new();
    fields.insert(
        kind.required_field().to_string(),
        Value::from(format!("Test {kind}")),
    );
    Record {
        id: RecordId::new(),
        kind,
        business_id: format!("{}-001", kind.table().to_uppercase()),
        status,
        created_by: owner.id,
        approved_by: None,
        approval_date: None,
        quantity: None,
        unit: None,
        expiry_date: None,
        received_date: None,
        fields,
        created_at: created,
        updated_at: created,
    }
}

pub fn project(status: RecordStatus, owner: &Actor) -> Record {
    record(EntityKind::Project, status, owner)
}

pub fn protocol(status: RecordStatus, owner: &Actor) -> Record {
    record(EntityKind::Protocol, status, owner)
}

pub fn experiment(status: RecordStatus, owner: &Actor) -> Record {
    record(EntityKind::Experiment, status, owner)
}

pub fn chemical_order(status: RecordStatus, owner: &Actor) -> Record {
    record(EntityKind::ChemicalOrder, status, owner)
}

pub fn plasmid_order(status: RecordStatus, owner: &Actor) -> Record {
    record(EntityKind::PlasmidOrder, status, owner)
}

/// Stored chemical with the given stock; the cached status is `Available`
/// whatever the numbers say, to exercise re-derivation.
pub fn chemical(quantity: i64, expiry_date: Option<NaiveDate>, owner: &Actor) -> Record {
    let mut record = record(EntityKind::ChemicalInventory, RecordStatus::Available, owner);
    record.quantity = Some(Decimal::from(quantity));
    record.unit = Some("mL".to_string());
    record.expiry_date = expiry_date;
    record
}

pub fn product(quantity: i64, owner: &Actor) -> Record {
    let mut record = record(EntityKind::Product, RecordStatus::QcPending, owner);
    record.quantity = Some(Decimal::from(quantity));
    record.unit = Some("vials".to_string());
    record
}
