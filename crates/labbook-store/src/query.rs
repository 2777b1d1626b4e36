//! List filters and ordering

use labbook_core::{Record, RecordStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Attributes searched besides the business id
const SEARCH_FIELDS: [&str; 3] = ["title", "name", "plasmid_name"];

/// Row filter for [`RecordStore::list`](crate::RecordStore::list)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Exact status match
    #[serde(default)]
    pub status: Option<RecordStatus>,
    /// Case-insensitive substring over business id and name/title
    #[serde(default)]
    pub search: Option<String>,
}

impl Filter {
    /// Match everything
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// With search text
    #[inline]
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Same filter without the status clause
    #[must_use]
    pub fn without_status(&self) -> Self {
        Self {
            status: None,
            search: self.search.clone(),
        }
    }

    /// Whether a record passes
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        let Some(needle) = self.search.as_deref().map(str::trim) else {
            return true;
        };
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        std::iter::once(record.business_id.as_str())
            .chain(SEARCH_FIELDS.iter().filter_map(|f| record.field_str(f)))
            .any(|hay| hay.to_lowercase().contains(&needle))
    }
}

/// Sort column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Creation time
    #[default]
    CreatedAt,
    /// Business id
    BusinessId,
    /// Name or title, case-insensitive
    Name,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

/// Ordering for listed rows; newest first by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Column
    pub key: SortKey,
    /// Direction
    pub direction: Direction,
}

impl Order {
    /// Create ordering
    #[inline]
    #[must_use]
    pub fn new(key: SortKey, direction: Direction) -> Self {
        Self { key, direction }
    }

    /// Ascending by `key`
    #[inline]
    #[must_use]
    pub fn asc(key: SortKey) -> Self {
        Self::new(key, Direction::Asc)
    }

    /// Descending by `key`
    #[inline]
    #[must_use]
    pub fn desc(key: SortKey) -> Self {
        Self::new(key, Direction::Desc)
    }

    /// Compare two records under this ordering
    #[must_use]
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = match self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::BusinessId => a.business_id.cmp(&b.business_id),
            SortKey::Name => a
                .display_name()
                .to_lowercase()
                .cmp(&b.display_name().to_lowercase()),
        };
        // Stable tie-break so listings are deterministic.
        let ord = ord.then_with(|| a.id.cmp(&b.id));
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }

    /// Sort records in place
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}
