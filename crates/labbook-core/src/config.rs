//! Engine configuration
//!
//! Loaded from TOML, every key optional:
//!
//! ```toml
//! low_stock_threshold = "10"
//! expiring_soon_days = 30
//! strict_transitions = false
//! ```

use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stock level at or below which an item is "Low Stock"
pub const LOW_STOCK_THRESHOLD: Decimal = Decimal::TEN;

/// Days ahead of expiry an item is flagged "expiring soon"
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Tunables for the lifecycle engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Low-stock threshold, compared to quantity in whatever unit it is stored
    pub low_stock_threshold: Decimal,
    /// Expiring-soon window in days
    pub expiring_soon_days: i64,
    /// Require edits that change status to follow the transition graph
    pub strict_transitions: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With low-stock threshold
    #[inline]
    #[must_use]
    pub fn with_low_stock_threshold(mut self, threshold: Decimal) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// With expiring-soon window
    #[inline]
    #[must_use]
    pub fn with_expiring_soon_days(mut self, days: i64) -> Self {
        self.expiring_soon_days = days;
        self
    }

    /// With strict status transitions
    #[inline]
    #[must_use]
    pub fn with_strict_transitions(mut self, strict: bool) -> Self {
        self.strict_transitions = strict;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for negative thresholds or windows
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_stock_threshold.is_sign_negative() {
            return Err(ConfigError::Invalid(format!(
                "low_stock_threshold must not be negative, got {}",
                self.low_stock_threshold
            )));
        }
        if self.expiring_soon_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "expiring_soon_days must not be negative, got {}",
                self.expiring_soon_days
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            expiring_soon_days: EXPIRING_SOON_DAYS,
            strict_transitions: false,
        }
    }
}
