//! Record store seam
//!
//! The engine never talks to storage. Callers load records through a
//! [`RecordStore`], hand them to the engine, and write back the patch and
//! audit event it returns.

use crate::error::StoreError;
use crate::query::{Filter, Order};
use chrono::{DateTime, Utc};
use labbook_core::{AuditEvent, EntityKind, Patch, Record, RecordId};

/// Table-oriented persistence backend
///
/// Implementations enforce business id uniqueness per kind. Writes are
/// last-write-wins; there is no version check.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record
    async fn get(&self, kind: EntityKind, id: RecordId) -> Result<Record, StoreError>;

    /// List a kind's records matching `filter`, sorted by `order`
    async fn list(
        &self,
        kind: EntityKind,
        filter: &Filter,
        order: Order,
    ) -> Result<Vec<Record>, StoreError>;

    /// Insert a record built by the engine
    async fn insert(&self, record: Record) -> Result<Record, StoreError>;

    /// Apply a patch, stamping `updated_at` with `at`; returns the new row
    async fn update(
        &self,
        kind: EntityKind,
        id: RecordId,
        patch: &Patch,
        at: DateTime<Utc>,
    ) -> Result<Record, StoreError>;

    /// Hard delete
    async fn delete(&self, kind: EntityKind, id: RecordId) -> Result<(), StoreError>;

    /// Persist an audit event
    async fn append_audit(&self, event: AuditEvent) -> Result<(), StoreError>;
}
