//! Vote tallying subsystem
//!
//! The components form a single write path and a derived read path:
//! 1. [`VoteAdmissionGuard`] validates and admits one vote per
//!    (voter, position)
//! 2. [`BallotLedger`] is the append-only source of truth
//! 3. [`void`] detects duplicate and spoiled ballots and excludes them
//! 4. [`aggregate`] counts non-void ballots within each scope key
//! 5. [`winner`] resolves max-count winner(s), preserving ties
//! 6. [`ResultMaterializer`] replaces the derived rows per scope key and
//!    invalidates the read cache
//!
//! [`ElectionService`] wires all of these together behind the public
//! contract.

pub mod admission;
pub mod aggregate;
pub mod cache;
pub mod ledger;
pub mod materialize;
pub mod roster;
pub mod service;
pub mod void;
pub mod winner;

// Re-export the service surface
pub use admission::VoteAdmissionGuard;
pub use cache::{NoopCache, ResultCache};
pub use ledger::{AppendResult, BallotLedger};
pub use materialize::{ReconcileStats, ResultMaterializer};
pub use roster::ElectionRoster;
pub use service::ElectionService;
pub use void::{VoidSummary, WardVoidReport};
