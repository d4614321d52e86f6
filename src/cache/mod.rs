//! Cache Module
//!
//! In-memory read-through cache in front of the durable store.

mod stats;
mod store;


// Re-export public types
pub use stats::CacheStats;
pub use store::CacheStore;
