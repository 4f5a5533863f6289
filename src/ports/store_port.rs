//! Storage ports for the two shared on-disk resources.
//!
//! Both are read-then-write with no locking; concurrent invocations against
//! the same files can interleave (documented limitation).

use crate::domain::cache::TickerCache;
use crate::domain::error::EngineError;

pub trait TickerStorePort {
    /// Load the persisted cache. An absent or empty store loads as an empty
    /// cache, not an error.
    fn load(&self) -> Result<TickerCache, EngineError>;

    /// Persist the whole cache document.
    fn save(&self, cache: &TickerCache) -> Result<(), EngineError>;
}

pub trait RotationStatePort {
    /// Ordinal of the last concrete strategy used under mixed mode.
    /// Absent or unreadable state reads as `None`.
    fn load(&self) -> Option<usize>;

    fn store(&self, ordinal: usize) -> Result<(), EngineError>;
}
