//! Service Layer
//!
//! The gateway's business logic: quota admission, tenant-safe document
//! access, and cache-aside search. Services hold explicit store handles and
//! know nothing about HTTP.

mod document_guard;
mod rate_limiter;
mod search_cache;

pub use document_guard::*;
pub use rate_limiter::*;
pub use search_cache::*;
