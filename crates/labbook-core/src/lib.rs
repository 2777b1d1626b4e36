//! Labbook Core - domain vocabulary for the lab notebook engine
//!
//! Shared by the engine, the store seam and their callers:
//! - Record, draft and patch shapes
//! - Entity kinds and their status sets
//! - Roles and capability resolution
//! - Injected clock and engine configuration
//! - Error taxonomy and audit events
//!
//! # Example
//!
//! ```rust
//! use labbook_core::{Actor, ActorId, Capability, Role};
//!
//! let guest = Actor::new(ActorId::new(), Role::Guest);
//! assert!(guest.require(Capability::Edit).is_err());
//! ```

#![warn(unreachable_pub)]

pub mod audit;
pub mod capability;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod record;
pub mod status;

pub use audit::{AuditAction, AuditEvent};
pub use capability::{Actor, Capabilities, Capability, Role};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, EXPIRING_SOON_DAYS, LOW_STOCK_THRESHOLD};
pub use error::{ConfigError, EngineError};
pub use ids::{ActorId, RecordId};
pub use record::{Patch, Record, RecordDraft, IMMUTABLE_FIELDS, TYPED_FIELDS};
pub use status::{EntityKind, RecordStatus};

/// Re-exported so callers do not need their own `rust_decimal` pin
pub use rust_decimal::Decimal;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
