//! Lifecycle engine facade
//!
//! Binds a [`Clock`] and an [`EngineConfig`] to the pure rule functions so
//! callers do not thread "now" and thresholds through every call. Every
//! accepted or refused action is traced.

use crate::approval;
use crate::dashboard::DashboardSummary;
use crate::derivation;
use crate::experiment;
use crate::guard;
use crate::inventory;
use crate::orders;
use crate::transition::{Creation, Decision, Transition};
use chrono::{DateTime, NaiveDate, Utc};
use labbook_core::{
    Actor, AuditEvent, Clock, EngineConfig, EngineError, EntityKind, Patch, Record, RecordDraft,
    RecordStatus, SystemClock,
};
use rust_decimal::Decimal;

/// Rules engine bound to a clock and configuration
#[derive(Debug, Clone)]
pub struct LifecycleEngine<C: Clock = SystemClock> {
    clock: C,
    config: EngineConfig,
}

impl LifecycleEngine<SystemClock> {
    /// Engine on wall-clock time
    #[inline]
    #[must_use]
    pub fn system(config: EngineConfig) -> Self {
        Self::new(SystemClock, config)
    }
}

impl<C: Clock> LifecycleEngine<C> {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(clock: C, config: EngineConfig) -> Self {
        Self { clock, config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Injected clock
    #[inline]
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current instant per the injected clock
    #[inline]
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Inventory status for a quantity and expiry
    #[must_use]
    pub fn derive_status(&self, quantity: Decimal, expiry_date: Option<NaiveDate>) -> RecordStatus {
        derivation::derive_inventory_status(
            quantity,
            expiry_date,
            self.clock.now(),
            self.config.low_stock_threshold,
        )
    }

    /// Display status of a record: derived for chemicals, stored otherwise
    #[must_use]
    pub fn display_status(&self, record: &Record) -> RecordStatus {
        if record.kind.has_derived_status() {
            derivation::derive_record_status(record, self.clock.now(), &self.config)
        } else {
            record.status
        }
    }

    /// Overwrite a stale derived status; returns whether it changed
    pub fn refresh(&self, record: &mut Record) -> bool {
        let changed = derivation::refresh_derived_status(record, self.clock.now(), &self.config);
        if changed {
            tracing::debug!(
                business_id = %record.business_id,
                status = %record.status,
                "Refreshed derived status"
            );
        }
        changed
    }

    /// Whether a chemical is inside the expiring-soon window
    #[must_use]
    pub fn is_expiring_soon(&self, record: &Record) -> bool {
        record.kind.has_derived_status()
            && derivation::is_expiring_soon(
                record.expiry_date,
                self.clock.today(),
                self.config.expiring_soon_days,
            )
    }

    /// Validate a draft into a record to insert
    ///
    /// # Errors
    /// See [`guard::create`]
    pub fn create(&self, draft: &RecordDraft, actor: &Actor) -> Result<Creation, EngineError> {
        let result = guard::create(draft, actor, self.clock.now(), &self.config);
        observe("create", draft.kind, &draft.business_id, actor, result.as_ref().map(|c| Some(c.record.status)));
        result
    }

    /// Validate a plain edit
    ///
    /// # Errors
    /// See [`guard::edit`]
    pub fn edit(&self, record: &Record, patch: &Patch, actor: &Actor) -> Result<Transition, EngineError> {
        let result = guard::edit(record, patch, actor, self.clock.now(), &self.config);
        observe_transition("edit", record, actor, &result);
        result
    }

    /// Approve or reject a record, dispatching on its kind
    ///
    /// Projects and protocols move to `Approved`/`Rejected`; experiments to
    /// `In Progress`/`Cancelled`.
    ///
    /// # Errors
    /// See [`approval::approve`] and [`experiment::review_experiment`]
    pub fn review(&self, record: &Record, decision: Decision, actor: &Actor) -> Result<Transition, EngineError> {
        let now = self.clock.now();
        let result = match record.kind {
            EntityKind::Experiment => experiment::review_experiment(record, decision, actor, now),
            EntityKind::Project | EntityKind::Protocol => {
                let target = match decision {
                    Decision::Approve => RecordStatus::Approved,
                    Decision::Reject => RecordStatus::Rejected,
                };
                approval::approve(record, target, actor, now)
            }
            _ => Err(EngineError::invalid_transition(
                record.kind,
                record.status,
                decision.action(),
            )),
        };
        observe_transition(decision.verb(), record, actor, &result);
        result
    }

    /// Review a project or protocol into an explicit outcome
    ///
    /// # Errors
    /// See [`approval::approve`]
    pub fn approve(&self, record: &Record, target: RecordStatus, actor: &Actor) -> Result<Transition, EngineError> {
        let result = approval::approve(record, target, actor, self.clock.now());
        observe_transition("approve", record, actor, &result);
        result
    }

    /// Send a draft protocol for review
    ///
    /// # Errors
    /// See [`approval::submit_for_approval`]
    pub fn submit(&self, record: &Record, actor: &Actor) -> Result<Transition, EngineError> {
        let result = approval::submit_for_approval(record, actor, self.clock.now());
        observe_transition("submit", record, actor, &result);
        result
    }

    /// Mark an order received today
    ///
    /// # Errors
    /// See [`orders::mark_received`]
    pub fn mark_received(&self, record: &Record, actor: &Actor) -> Result<Transition, EngineError> {
        let result = orders::mark_received(record, actor, self.clock.now());
        observe_transition("mark_received", record, actor, &result);
        result
    }

    /// Consume (negative) or restock (positive) a stock record
    ///
    /// # Errors
    /// See [`inventory::adjust_quantity`]
    pub fn adjust_quantity(&self, record: &Record, delta: Decimal, actor: &Actor) -> Result<Transition, EngineError> {
        let result = inventory::adjust_quantity(record, delta, actor, self.clock.now(), &self.config);
        observe_transition("adjust_quantity", record, actor, &result);
        result
    }

    /// Authorize a hard delete
    ///
    /// # Errors
    /// See [`guard::authorize_delete`]
    pub fn authorize_delete(&self, record: &Record, actor: &Actor) -> Result<AuditEvent, EngineError> {
        let result = guard::authorize_delete(record, actor, self.clock.now());
        observe("delete", record.kind, &record.business_id, actor, result.as_ref().map(|_| None));
        result
    }

    /// Dashboard over the given records
    #[must_use]
    pub fn dashboard(&self, records: &[Record]) -> DashboardSummary {
        DashboardSummary::compute(records, self.clock.now(), &self.config)
    }
}

fn observe_transition(
    action: &str,
    record: &Record,
    actor: &Actor,
    result: &Result<Transition, EngineError>,
) {
    observe(
        action,
        record.kind,
        &record.business_id,
        actor,
        result.as_ref().map(Transition::target_status),
    );
}

fn observe(
    action: &str,
    kind: EntityKind,
    business_id: &str,
    actor: &Actor,
    outcome: Result<Option<RecordStatus>, &EngineError>,
) {
    match outcome {
        Ok(Some(status)) => tracing::info!(
            action,
            %kind,
            business_id,
            actor = %actor.id,
            %status,
            "Transition accepted"
        ),
        Ok(None) => tracing::info!(action, %kind, business_id, actor = %actor.id, "Action accepted"),
        Err(error) if error.is_permission() => tracing::warn!(
            action,
            %kind,
            business_id,
            role = %actor.role,
            %error,
            "Action denied"
        ),
        Err(error) => tracing::debug!(action, %kind, business_id, %error, "Action refused"),
    }
}
