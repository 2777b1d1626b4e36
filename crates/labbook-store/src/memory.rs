//! In-memory record store
//!
//! Backs tests and the CLI. Each kind's table is a `DashMap`; business ids
//! are indexed per kind so uniqueness holds under concurrent inserts.

use crate::error::StoreError;
use crate::query::{Filter, Order};
use crate::store::RecordStore;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use labbook_core::{AuditEvent, EntityKind, Patch, Record, RecordId};
use parking_lot::Mutex;

/// Store holding every table in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<(EntityKind, RecordId), Record>,
    business_ids: DashMap<(EntityKind, String), RecordId>,
    audit: Mutex<Vec<AuditEvent>>,
}

impl InMemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`
    ///
    /// # Errors
    /// Returns `DuplicateBusinessId` on the first clash
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            store.insert_now(record)?;
        }
        Ok(store)
    }

    /// Number of rows in a kind's table
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.records.iter().filter(|e| e.key().0 == kind).count()
    }

    /// Every audit event appended so far, oldest first
    #[must_use]
    pub fn audit_log(&self) -> Vec<AuditEvent> {
        self.audit.lock().clone()
    }

    /// Audit events for one record
    #[must_use]
    pub fn audit_for(&self, id: RecordId) -> Vec<AuditEvent> {
        let id = id.to_string();
        self.audit
            .lock()
            .iter()
            .filter(|e| e.entity_id == id)
            .cloned()
            .collect()
    }

    fn insert_now(&self, record: Record) -> Result<Record, StoreError> {
        let key = (record.kind, record.business_id.clone());
        match self.business_ids.entry(key) {
            Entry::Occupied(_) => Err(StoreError::DuplicateBusinessId {
                kind: record.kind,
                business_id: record.business_id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(record.id);
                self.records
                    .insert((record.kind, record.id), record.clone());
                Ok(record)
            }
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryStore {
    async fn get(&self, kind: EntityKind, id: RecordId) -> Result<Record, StoreError> {
        self.records
            .get(&(kind, id))
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::not_found(kind, id))
    }

    async fn list(
        &self,
        kind: EntityKind,
        filter: &Filter,
        order: Order,
    ) -> Result<Vec<Record>, StoreError> {
        let mut rows: Vec<Record> = self
            .records
            .iter()
            .filter(|e| e.key().0 == kind && filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        order.sort(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, record: Record) -> Result<Record, StoreError> {
        let record = self.insert_now(record)?;
        tracing::debug!(kind = %record.kind, business_id = %record.business_id, "Inserted record");
        Ok(record)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: RecordId,
        patch: &Patch,
        at: DateTime<Utc>,
    ) -> Result<Record, StoreError> {
        let mut row = self
            .records
            .get_mut(&(kind, id))
            .ok_or_else(|| StoreError::not_found(kind, id))?;
        row.apply(patch, at);
        Ok(row.clone())
    }

    async fn delete(&self, kind: EntityKind, id: RecordId) -> Result<(), StoreError> {
        let (_, record) = self
            .records
            .remove(&(kind, id))
            .ok_or_else(|| StoreError::not_found(kind, id))?;
        self.business_ids.remove(&(kind, record.business_id));
        Ok(())
    }

    async fn append_audit(&self, event: AuditEvent) -> Result<(), StoreError> {
        self.audit.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labbook_core::RecordStatus;
    use labbook_test_utils::{associate, project, protocol, test_now};

    #[tokio::test]
    async fn duplicate_business_id_is_per_kind() {
        let owner = associate();
        let store = InMemoryStore::new();
        let first = project(RecordStatus::PendingApproval, &owner);
        let mut clash = project(RecordStatus::PendingApproval, &owner);
        clash.business_id = first.business_id.clone();
        let mut other_kind = protocol(RecordStatus::Draft, &owner);
        other_kind.business_id = first.business_id.clone();

        store.insert(first).await.unwrap();
        assert!(matches!(
            store.insert(clash).await,
            Err(StoreError::DuplicateBusinessId { .. })
        ));
        store.insert(other_kind).await.unwrap();
        assert_eq!(store.count(EntityKind::Project), 1);
        assert_eq!(store.count(EntityKind::Protocol), 1);
    }

    #[tokio::test]
    async fn delete_frees_business_id() {
        let owner = associate();
        let store = InMemoryStore::new();
        let record = store
            .insert(project(RecordStatus::Rejected, &owner))
            .await
            .unwrap();
        store.delete(EntityKind::Project, record.id).await.unwrap();

        let mut again = project(RecordStatus::PendingApproval, &owner);
        again.business_id = record.business_id.clone();
        assert!(store.insert(again).await.is_ok());
        assert!(matches!(
            store.get(EntityKind::Project, record.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let owner = associate();
        let store = InMemoryStore::new();
        let record = store
            .insert(project(RecordStatus::Approved, &owner))
            .await
            .unwrap();
        let patch = Patch::new().status(RecordStatus::InProgress);
        let updated = store
            .update(EntityKind::Project, record.id, &patch, test_now())
            .await
            .unwrap();
        assert_eq!(updated.status, RecordStatus::InProgress);
        assert_eq!(updated.updated_at, test_now());

        let missing = store
            .update(EntityKind::Protocol, record.id, &patch, test_now())
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }
}
