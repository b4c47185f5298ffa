//! In-process store backends.
//!
//! These implement the same contracts as the production backends, including
//! TTL expiry on the tokio clock, so a paused test runtime can step through
//! rate-limit windows and cache lifetimes. Each store also carries switches
//! for injecting the failures the gateway must tolerate.

mod counter;
mod document;

pub use counter::InMemoryCounterStore;
pub use document::InMemoryDocumentStore;
