//! Store-backed workflows
//!
//! [`WorkflowService`] is the load → decide → persist loop around the
//! engine. Every action re-reads the record, computes the transition
//! against it, writes the patch, then appends the audit event.

use crate::error::StoreError;
use crate::query::{Filter, Order};
use crate::store::RecordStore;
use labbook_core::{
    Actor, Capability, Clock, Decimal, EngineError, EntityKind, Patch, Record, RecordDraft, RecordId,
    SystemClock,
};
use labbook_lifecycle::{check_experiment_links, DashboardSummary, Decision, LifecycleEngine, Transition};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Free-form attributes holding an experiment's links
const PROJECT_LINK: &str = "project_id";
const PROTOCOL_LINK: &str = "protocol_id";

/// Engine plus store
pub struct WorkflowService<S: RecordStore, C: Clock = SystemClock> {
    store: Arc<S>,
    engine: LifecycleEngine<C>,
}

impl<S: RecordStore, C: Clock> WorkflowService<S, C> {
    /// Create service
    #[inline]
    #[must_use]
    pub fn new(store: Arc<S>, engine: LifecycleEngine<C>) -> Self {
        Self { store, engine }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Underlying engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &LifecycleEngine<C> {
        &self.engine
    }

    /// Fetch a record with its derived status current
    ///
    /// # Errors
    /// `NotFound` if absent
    pub async fn get(&self, kind: EntityKind, id: RecordId) -> Result<Record, StoreError> {
        let mut record = self.store.get(kind, id).await?;
        self.engine.refresh(&mut record);
        Ok(record)
    }

    /// List records with derived statuses current
    ///
    /// For chemicals the status clause is evaluated against the derived
    /// status, not the stored cache.
    ///
    /// # Errors
    /// Propagates store errors
    pub async fn list(
        &self,
        kind: EntityKind,
        filter: &Filter,
        order: Order,
    ) -> Result<Vec<Record>, StoreError> {
        if !kind.has_derived_status() {
            return self.store.list(kind, filter, order).await;
        }
        let mut rows = self.store.list(kind, &filter.without_status(), order).await?;
        for row in &mut rows {
            self.engine.refresh(row);
        }
        rows.retain(|r| filter.matches(r));
        Ok(rows)
    }

    /// Create a record
    ///
    /// Experiments that name a `project_id` or `protocol_id` must link to
    /// approved work. Links are resolved only for actors allowed to write.
    ///
    /// # Errors
    /// Engine errors, `DuplicateBusinessId`
    pub async fn create(&self, draft: &RecordDraft, actor: &Actor) -> Result<Record, StoreError> {
        if draft.kind == EntityKind::Experiment {
            actor.require(Capability::Edit)?;
            self.check_links(&draft.fields).await?;
        }
        let creation = self.engine.create(draft, actor)?;
        let record = self.store.insert(creation.record).await?;
        self.store.append_audit(creation.audit).await?;
        tracing::info!(kind = %record.kind, business_id = %record.business_id, "Record created");
        Ok(record)
    }

    /// Apply a plain edit
    ///
    /// # Errors
    /// Engine errors, `NotFound`
    pub async fn edit(
        &self,
        kind: EntityKind,
        id: RecordId,
        patch: &Patch,
        actor: &Actor,
    ) -> Result<Record, StoreError> {
        if kind == EntityKind::Experiment {
            let current = self.store.get(kind, id).await?;
            actor.require_owner_or(current.created_by)?;
            self.check_links(&patch.fields).await?;
        }
        self.apply(kind, id, |engine, record| engine.edit(record, patch, actor))
            .await
    }

    /// Approve or reject a project, protocol or experiment
    ///
    /// # Errors
    /// Engine errors, `NotFound`
    pub async fn review(
        &self,
        kind: EntityKind,
        id: RecordId,
        decision: Decision,
        actor: &Actor,
    ) -> Result<Record, StoreError> {
        self.apply(kind, id, |engine, record| engine.review(record, decision, actor))
            .await
    }

    /// Submit a draft protocol
    ///
    /// # Errors
    /// Engine errors, `NotFound`
    pub async fn submit(&self, id: RecordId, actor: &Actor) -> Result<Record, StoreError> {
        self.apply(EntityKind::Protocol, id, |engine, record| engine.submit(record, actor))
            .await
    }

    /// Mark an order received
    ///
    /// # Errors
    /// Engine errors, `NotFound`
    pub async fn mark_received(
        &self,
        kind: EntityKind,
        id: RecordId,
        actor: &Actor,
    ) -> Result<Record, StoreError> {
        self.apply(kind, id, |engine, record| engine.mark_received(record, actor))
            .await
    }

    /// Consume or restock
    ///
    /// # Errors
    /// Engine errors, `NotFound`
    pub async fn adjust_quantity(
        &self,
        kind: EntityKind,
        id: RecordId,
        delta: Decimal,
        actor: &Actor,
    ) -> Result<Record, StoreError> {
        self.apply(kind, id, |engine, record| {
            engine.adjust_quantity(record, delta, actor)
        })
        .await
    }

    /// Hard delete
    ///
    /// # Errors
    /// Engine errors, `NotFound`
    pub async fn delete(&self, kind: EntityKind, id: RecordId, actor: &Actor) -> Result<(), StoreError> {
        let record = self.store.get(kind, id).await?;
        let audit = self.engine.authorize_delete(&record, actor)?;
        self.store.delete(kind, id).await?;
        self.store.append_audit(audit).await?;
        tracing::info!(%kind, business_id = %record.business_id, "Record deleted");
        Ok(())
    }

    /// Write back every stale inventory status; returns how many changed
    ///
    /// Status refreshes are bookkeeping and leave no audit trail.
    ///
    /// # Errors
    /// Propagates store errors
    pub async fn refresh_inventory(&self) -> Result<usize, StoreError> {
        let now = self.engine.now();
        let mut changed = 0;
        for kind in EntityKind::ALL.into_iter().filter(EntityKind::has_derived_status) {
            for mut record in self.store.list(kind, &Filter::all(), Order::default()).await? {
                if self.engine.refresh(&mut record) {
                    let patch = Patch::new().status(record.status);
                    self.store.update(kind, record.id, &patch, now).await?;
                    changed += 1;
                }
            }
        }
        tracing::info!(changed, "Inventory statuses refreshed");
        Ok(changed)
    }

    /// Dashboard over the whole store
    ///
    /// # Errors
    /// Propagates store errors
    pub async fn dashboard(&self) -> Result<DashboardSummary, StoreError> {
        let mut records = Vec::new();
        for kind in EntityKind::ALL {
            records.extend(self.store.list(kind, &Filter::all(), Order::default()).await?);
        }
        Ok(self.engine.dashboard(&records))
    }

    async fn apply<F>(&self, kind: EntityKind, id: RecordId, decide: F) -> Result<Record, StoreError>
    where
        F: FnOnce(&LifecycleEngine<C>, &Record) -> Result<Transition, EngineError> + Send,
    {
        let mut record = self.store.get(kind, id).await?;
        self.engine.refresh(&mut record);
        let transition = decide(&self.engine, &record)?;
        let updated = self
            .store
            .update(kind, id, &transition.patch, self.engine.now())
            .await?;
        tracing::debug!(
            %kind,
            business_id = %updated.business_id,
            action = %transition.audit.action,
            "Patch persisted"
        );
        self.store.append_audit(transition.audit).await?;
        Ok(updated)
    }

    async fn check_links(&self, fields: &Map<String, Value>) -> Result<(), StoreError> {
        let project = self.linked(EntityKind::Project, fields.get(PROJECT_LINK)).await?;
        let protocol = self.linked(EntityKind::Protocol, fields.get(PROTOCOL_LINK)).await?;
        check_experiment_links(project.as_ref(), protocol.as_ref())?;
        Ok(())
    }

    async fn linked(&self, kind: EntityKind, value: Option<&Value>) -> Result<Option<Record>, StoreError> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        let id = value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RecordId)
            .ok_or_else(|| EngineError::validation(format!("{kind} link must be a record id, got {value}")))?;
        match self.store.get(kind, id).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound { .. }) => Err(EngineError::validation(format!(
                "linked {kind} {id} does not exist"
            ))
            .into()),
            Err(err) => Err(err),
        }
    }
}
