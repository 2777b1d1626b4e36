//! Derived status for chemical inventory
//!
//! Stored inventory status is a cache. The truth is always recomputed from
//! quantity, expiry date and the injected "now":
//!
//! 1. expiry date (midnight UTC) before now: `Expired`
//! 2. quantity `<= 0`: `Out of Stock`
//! 3. quantity `<=` low-stock threshold: `Low Stock`
//! 4. otherwise `Available`
//!
//! The threshold is compared to quantity in whatever unit the item is
//! stored in (mL, g, units alike).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use labbook_core::{EngineConfig, Record, RecordStatus};
use rust_decimal::Decimal;

/// Derive inventory status from quantity and expiry
#[must_use]
pub fn derive_inventory_status(
    quantity: Decimal,
    expiry_date: Option<NaiveDate>,
    now: DateTime<Utc>,
    low_stock_threshold: Decimal,
) -> RecordStatus {
    if expiry_date.is_some_and(|expiry| is_past(expiry, now)) {
        RecordStatus::Expired
    } else if quantity <= Decimal::ZERO {
        RecordStatus::OutOfStock
    } else if quantity <= low_stock_threshold {
        RecordStatus::LowStock
    } else {
        RecordStatus::Available
    }
}

/// Derive status for a stored inventory record
///
/// A missing quantity counts as zero.
#[must_use]
pub fn derive_record_status(
    record: &Record,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> RecordStatus {
    derive_inventory_status(
        record.quantity_or_zero(),
        record.expiry_date,
        now,
        config.low_stock_threshold,
    )
}

/// Overwrite a stale cached status in place; returns whether it changed
///
/// Records of kinds without derived status are left alone.
pub fn refresh_derived_status(
    record: &mut Record,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> bool {
    if !record.kind.has_derived_status() {
        return false;
    }
    let derived = derive_record_status(record, now, config);
    let changed = derived != record.status;
    record.status = derived;
    changed
}

/// Whole days from `today` until `expiry_date`; negative once past
#[inline]
#[must_use]
pub fn days_until(expiry_date: NaiveDate, today: NaiveDate) -> i64 {
    (expiry_date - today).num_days()
}

/// Expiry falls within the alert window (`0 ..= window_days` days away)
///
/// Independent of the four-state status: an item can be both `Available`
/// and expiring soon.
#[must_use]
pub fn is_expiring_soon(expiry_date: Option<NaiveDate>, today: NaiveDate, window_days: i64) -> bool {
    expiry_date.is_some_and(|expiry| (0..=window_days).contains(&days_until(expiry, today)))
}

fn is_past(expiry: NaiveDate, now: DateTime<Utc>) -> bool {
    expiry.and_time(NaiveTime::MIN).and_utc() < now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn status(q: Decimal, e: Option<NaiveDate>) -> RecordStatus {
        derive_inventory_status(q, e, noon(), Decimal::TEN)
    }

    #[test]
    fn thresholds() {
        assert_eq!(status(Decimal::ZERO, None), RecordStatus::OutOfStock);
        assert_eq!(status(Decimal::from(-3), None), RecordStatus::OutOfStock);
        assert_eq!(status(Decimal::TEN, None), RecordStatus::LowStock);
        assert_eq!(status(Decimal::new(1001, 2), None), RecordStatus::Available);
    }

    #[test]
    fn expiry_beats_stock_level() {
        let yesterday = noon().date_naive() - Duration::days(1);
        assert_eq!(status(Decimal::from(5), Some(yesterday)), RecordStatus::Expired);
        assert_eq!(status(Decimal::from(500), Some(yesterday)), RecordStatus::Expired);
    }

    #[test]
    fn expiry_date_counts_from_midnight() {
        let today = noon().date_naive();
        let tomorrow = today + Duration::days(1);
        assert_eq!(status(Decimal::from(50), Some(today)), RecordStatus::Expired);
        assert_eq!(status(Decimal::from(50), Some(tomorrow)), RecordStatus::Available);
    }

    #[test]
    fn expiring_soon_window() {
        let today = noon().date_naive();
        assert!(is_expiring_soon(Some(today), today, 30));
        assert!(is_expiring_soon(Some(today + Duration::days(30)), today, 30));
        assert!(!is_expiring_soon(Some(today + Duration::days(31)), today, 30));
        assert!(!is_expiring_soon(Some(today - Duration::days(1)), today, 30));
        assert!(!is_expiring_soon(None, today, 30));
    }

    #[test]
    fn days_until_is_signed() {
        let today = noon().date_naive();
        assert_eq!(days_until(today + Duration::days(7), today), 7);
        assert_eq!(days_until(today - Duration::days(2), today), -2);
    }
}
