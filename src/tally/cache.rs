//! Read-side cache invalidation seam
//!
//! The read endpoints may sit behind a response cache owned by the
//! embedding service. Instead of an ambient TTL singleton, the cache is
//! an explicit interface injected into the materializer, which issues an
//! invalidation after every successful recompute of a scope key.

use crate::types::{PositionId, ScopeKey};

/// Downstream read cache for derived results
///
/// Implementations must be cheap and infallible: invalidation happens on
/// the vote write path after the ledger append, and a slow or failing
/// cache must not delay or fail a cast.
pub trait ResultCache: Send + Sync {
    /// Drop any cached results for one (position, scope key) pair
    fn invalidate_scope(&self, position_id: PositionId, scope_key: &ScopeKey);

    /// Drop everything; issued by `reconcile_all()`
    fn invalidate_all(&self);
}

/// Default cache that caches nothing
pub struct NoopCache;

impl ResultCache for NoopCache {
    fn invalidate_scope(&self, _position_id: PositionId, _scope_key: &ScopeKey) {}

    fn invalidate_all(&self) {}
}
