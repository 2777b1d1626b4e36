//! Dashboard summaries
//!
//! Computed from whatever slice of records the caller loaded. Inventory
//! counts use derived status, never the stored cache.

use crate::derivation::{days_until, derive_record_status, is_expiring_soon};
use chrono::{DateTime, NaiveDate, Utc};
use labbook_core::{EngineConfig, EntityKind, Record, RecordId, RecordStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chemical whose expiry falls inside the alert window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    /// Record key
    pub id: RecordId,
    /// Human-facing code
    pub business_id: String,
    /// Chemical name
    pub name: String,
    /// Expiry date
    pub expiry_date: NaiveDate,
    /// Days left, 0 on the expiry date itself
    pub days_until: i64,
}

/// Record awaiting a reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    /// Record key
    pub id: RecordId,
    /// Table
    pub kind: EntityKind,
    /// Human-facing code
    pub business_id: String,
    /// Title
    pub title: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Stock status breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCounts {
    /// Above threshold
    pub available: usize,
    /// At or below threshold
    pub low_stock: usize,
    /// Exhausted
    pub out_of_stock: usize,
    /// Past expiry
    pub expired: usize,
}

/// Lab overview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Records per kind
    pub counts: BTreeMap<EntityKind, usize>,
    /// Chemical stock breakdown
    pub stock: StockCounts,
    /// Chemicals expiring soon, soonest first
    pub expiring_soon: Vec<ExpiryAlert>,
    /// Review queue, newest first
    pub pending_reviews: Vec<PendingReview>,
}

impl DashboardSummary {
    /// Summarize `records` as of `now`
    #[must_use]
    pub fn compute(records: &[Record], now: DateTime<Utc>, config: &EngineConfig) -> Self {
        let today = now.date_naive();
        let mut summary = Self::default();

        for record in records {
            *summary.counts.entry(record.kind).or_default() += 1;

            if record.kind.has_derived_status() {
                match derive_record_status(record, now, config) {
                    RecordStatus::Available => summary.stock.available += 1,
                    RecordStatus::LowStock => summary.stock.low_stock += 1,
                    RecordStatus::OutOfStock => summary.stock.out_of_stock += 1,
                    _ => summary.stock.expired += 1,
                }
                if let Some(expiry) = record.expiry_date {
                    if is_expiring_soon(Some(expiry), today, config.expiring_soon_days) {
                        summary.expiring_soon.push(ExpiryAlert {
                            id: record.id,
                            business_id: record.business_id.clone(),
                            name: record.display_name().to_string(),
                            expiry_date: expiry,
                            days_until: days_until(expiry, today),
                        });
                    }
                }
            }

            if awaits_review(record) {
                summary.pending_reviews.push(PendingReview {
                    id: record.id,
                    kind: record.kind,
                    business_id: record.business_id.clone(),
                    title: record.display_name().to_string(),
                    created_at: record.created_at,
                });
            }
        }

        summary
            .expiring_soon
            .sort_by(|a, b| a.days_until.cmp(&b.days_until).then_with(|| a.name.cmp(&b.name)));
        summary
            .pending_reviews
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summary
    }

    /// Count for a kind
    #[inline]
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Pending reviews of one kind
    pub fn pending_for(&self, kind: EntityKind) -> impl Iterator<Item = &PendingReview> {
        self.pending_reviews.iter().filter(move |p| p.kind == kind)
    }
}

/// Whether a record sits in a reviewer's queue
///
/// Projects and protocols wait in `Pending Approval`, experiments in
/// `Planned`.
#[must_use]
pub fn awaits_review(record: &Record) -> bool {
    matches!(
        (record.kind, record.status),
        (
            EntityKind::Project | EntityKind::Protocol,
            RecordStatus::PendingApproval
        ) | (EntityKind::Experiment, RecordStatus::Planned)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use labbook_test_utils::{associate, chemical, days_from_today, experiment, project, protocol, test_now};

    #[test]
    fn summary_counts_and_queues() {
        let owner = associate();
        let mut newer = project(RecordStatus::PendingApproval, &owner);
        newer.created_at = test_now() - Duration::days(1);
        let older = protocol(RecordStatus::PendingApproval, &owner);
        let records = vec![
            older,
            newer.clone(),
            project(RecordStatus::Approved, &owner),
            experiment(RecordStatus::Planned, &owner),
            chemical(50, Some(days_from_today(10)), &owner),
            chemical(5, Some(days_from_today(3)), &owner),
            chemical(0, None, &owner),
            chemical(80, Some(days_from_today(-1)), &owner),
        ];

        let summary = DashboardSummary::compute(&records, test_now(), &EngineConfig::default());
        assert_eq!(summary.count(EntityKind::Project), 2);
        assert_eq!(summary.count(EntityKind::ChemicalInventory), 4);
        assert_eq!(summary.count(EntityKind::Product), 0);
        assert_eq!(
            summary.stock,
            StockCounts {
                available: 1,
                low_stock: 1,
                out_of_stock: 1,
                expired: 1,
            }
        );

        let days: Vec<i64> = summary.expiring_soon.iter().map(|a| a.days_until).collect();
        assert_eq!(days, vec![3, 10]);

        assert_eq!(summary.pending_reviews.len(), 3);
        assert_eq!(summary.pending_reviews[0].id, newer.id);
        assert_eq!(summary.pending_for(EntityKind::Protocol).count(), 1);
    }

    #[test]
    fn stale_cache_does_not_leak_into_counts() {
        let owner = associate();
        // Cached as Available, actually out of stock.
        let records = vec![chemical(0, None, &owner)];
        let summary = DashboardSummary::compute(&records, test_now(), &EngineConfig::default());
        assert_eq!(summary.stock.available, 0);
        assert_eq!(summary.stock.out_of_stock, 1);
    }
}
