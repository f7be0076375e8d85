//! Cache keys, backends and the read/write facade.
//!
//! Keys are deterministic and namespaced by a short type code so that
//! invalidation can be targeted per subsystem. The backend is a trait with
//! an optional pattern-delete capability; the manager treats the cache as
//! acceleration, never as a correctness dependency.

pub mod backend;
pub mod key;
pub mod manager;

pub use backend::{CacheBackend, InMemoryBackend, PatternDeletable};
pub use key::CacheKeyBuilder;
pub use manager::{CacheManager, CacheStatsSnapshot};
