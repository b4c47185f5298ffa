//! Warden Core - Gateway Data Types
//!
//! Pure data structures shared by the storage backends and the API layer.
//! This crate contains no I/O: tenant and document identity, the document
//! model, the lookup outcome type, health summaries, and the error taxonomy.

pub mod document;
pub mod error;
pub mod health;
pub mod identity;
pub mod lookup;

pub use document::{Document, NewDocument};
pub use error::{StoreError, ValidationError, WardenError, WardenResult};
pub use health::{ComponentStatus, DependencyHealth, GatewayStatus};
pub use identity::{DocumentId, TenantId, Timestamp};
pub use lookup::Lookup;
