//! Labbook Store - persistence seam for the lifecycle engine
//!
//! - [`RecordStore`]: async table-oriented backend trait
//! - [`InMemoryStore`]: `DashMap`-backed implementation
//! - [`WorkflowService`]: load, decide, persist and audit in one call
//!
//! # Example
//!
//! ```rust,ignore
//! use labbook_store::{InMemoryStore, WorkflowService};
//! use labbook_lifecycle::{Decision, LifecycleEngine};
//!
//! # async fn example(associate: Actor, pi: Actor) -> Result<(), StoreError> {
//! let service = WorkflowService::new(Arc::new(InMemoryStore::new()), LifecycleEngine::system(EngineConfig::new()));
//! let draft = RecordDraft::new(EntityKind::Project, "PRJ-001").with_field("title", "Kinase screen");
//! let project = service.create(&draft, &associate).await?;
//! let project = service.review(EntityKind::Project, project.id, Decision::Approve, &pi).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod query;
pub mod service;
pub mod store;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use query::{Direction, Filter, Order, SortKey};
pub use service::WorkflowService;
pub use store::RecordStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
