//! Result materialization
//!
//! Owns the derived projections (tally and winner rows) and keeps them
//! consistent with the ballot ledger:
//! 1. `recompute_scope` rebuilds exactly one (position, scope key) pair,
//!    full-replace rather than merge
//! 2. Recomputes for the same key are serialized on a per-key lock, so a
//!    slower recompute cannot overwrite a fresher one with stale counts;
//!    different keys run in parallel
//! 3. The ledger snapshot is taken while holding the per-key lock, so it
//!    is at least as recent as the ballot that triggered the recompute
//! 4. Every successful recompute invalidates the injected read cache
//! 5. `reconcile_all` rebuilds everything from the ledger from scratch —
//!    initial setup and drift repair after a failed per-vote recompute

use crate::internal_error;
use crate::tally::cache::ResultCache;
use crate::tally::ledger::BallotLedger;
use crate::tally::roster::ElectionRoster;
use crate::tally::{aggregate, winner};
use crate::types::{CandidateTally, PositionId, ScopeKey, Winner};
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Outcome of a full rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileStats {
    pub positions: usize,
    pub scope_keys: usize,
    pub tally_rows: usize,
    pub winners: usize,
}

/// Persists and replaces the derived tally/winner projections
pub struct ResultMaterializer {
    roster: Arc<ElectionRoster>,
    ledger: Arc<BallotLedger>,
    cache: Arc<dyn ResultCache>,
    tallies: RwLock<HashMap<(PositionId, ScopeKey), Vec<CandidateTally>>>,
    winners: RwLock<HashMap<(PositionId, ScopeKey), Winner>>,
    // Per-scope-key recompute serialization.
    scope_locks: Mutex<HashMap<(PositionId, ScopeKey), Arc<Mutex<()>>>>,
}

impl ResultMaterializer {
    /// Create a materializer over the given ledger and roster
    pub fn new(
        roster: Arc<ElectionRoster>,
        ledger: Arc<BallotLedger>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        Self {
            roster,
            ledger,
            cache,
            tallies: RwLock::new(HashMap::new()),
            winners: RwLock::new(HashMap::new()),
            scope_locks: Mutex::new(HashMap::new()),
        }
    }

    fn scope_lock(&self, key: (PositionId, ScopeKey)) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .scope_locks
            .lock()
            .map_err(|_| internal_error!("Scope lock registry error"))?;
        Ok(locks.entry(key).or_default().clone())
    }

    /// Rebuild the derived rows for one (position, scope key) pair
    ///
    /// Full replace: the pair's previous rows are discarded wholesale and
    /// the read cache for the pair is invalidated afterwards.
    pub fn recompute_scope(&self, position_id: PositionId, scope_key: ScopeKey) -> Result<()> {
        let lock = self.scope_lock((position_id, scope_key))?;
        let _guard = lock
            .lock()
            .map_err(|_| internal_error!("Scope lock error"))?;

        let position = self.roster.position(position_id)?;
        let candidates = self.roster.candidates_for(position_id)?;
        // Snapshot after taking the per-key lock: at least as recent as
        // the ballot that triggered us.
        let ballots = self.ledger.ballots_for_position(position_id)?;

        let rows = aggregate::tally_scope(&position, &candidates, &ballots, &scope_key);
        let resolved = winner::resolve_scope(&rows, &scope_key);

        {
            let mut tallies = self
                .tallies
                .write()
                .map_err(|_| internal_error!("Tally projection write error"))?;
            tallies.insert((position_id, scope_key), rows);
        }
        {
            let mut winners = self
                .winners
                .write()
                .map_err(|_| internal_error!("Winner projection write error"))?;
            match resolved {
                Some(resolved) => {
                    winners.insert((position_id, scope_key), resolved);
                }
                None => {
                    winners.remove(&(position_id, scope_key));
                }
            }
        }

        self.cache.invalidate_scope(position_id, &scope_key);
        tracing::debug!("♻️  Recomputed scope {scope_key} for position {position_id}");
        Ok(())
    }

    /// Rebuild every position's tallies and winners from the ledger
    ///
    /// Clears all derived state first, so scope keys that no longer have
    /// registered candidates leave no stale rows behind. Idempotent and
    /// safe to run at any time.
    pub fn reconcile_all(&self) -> Result<ReconcileStats> {
        {
            let mut tallies = self
                .tallies
                .write()
                .map_err(|_| internal_error!("Tally projection write error"))?;
            tallies.clear();
        }
        {
            let mut winners = self
                .winners
                .write()
                .map_err(|_| internal_error!("Winner projection write error"))?;
            winners.clear();
        }

        let positions = self.roster.positions()?;
        let mut scope_keys = 0;
        for position in &positions {
            for scope_key in self.roster.scope_keys_for(position)? {
                self.recompute_scope(position.id, scope_key)?;
                scope_keys += 1;
            }
        }

        self.cache.invalidate_all();

        let tally_rows = self
            .tallies
            .read()
            .map_err(|_| internal_error!("Tally projection read error"))?
            .values()
            .map(|rows| rows.len())
            .sum();
        let winners = self
            .winners
            .read()
            .map_err(|_| internal_error!("Winner projection read error"))?
            .len();

        let stats = ReconcileStats {
            positions: positions.len(),
            scope_keys,
            tally_rows,
            winners,
        };
        tracing::info!(
            "🔄 Reconciled derived state: {} positions, {} scope keys, {} tally rows",
            stats.positions,
            stats.scope_keys,
            stats.tally_rows
        );
        Ok(stats)
    }

    /// Current tally rows for a position, grouped by scope key
    pub fn live_tally(&self, position_id: PositionId) -> Result<Vec<CandidateTally>> {
        let tallies = self
            .tallies
            .read()
            .map_err(|_| internal_error!("Tally projection read error"))?;
        let mut rows: Vec<CandidateTally> = tallies
            .iter()
            .filter(|((id, _), _)| *id == position_id)
            .flat_map(|(_, rows)| rows.iter().cloned())
            .collect();
        rows.sort_by(|a, b| {
            a.scope_key
                .to_string()
                .cmp(&b.scope_key.to_string())
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });
        Ok(rows)
    }

    /// Current winners, optionally restricted to one position
    pub fn winners(&self, position_id: Option<PositionId>) -> Result<Vec<Winner>> {
        let winners = self
            .winners
            .read()
            .map_err(|_| internal_error!("Winner projection read error"))?;
        let mut rows: Vec<Winner> = winners
            .values()
            .filter(|winner| position_id.is_none_or(|id| winner.position_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.position_id
                .cmp(&b.position_id)
                .then_with(|| a.scope_key.to_string().cmp(&b.scope_key.to_string()))
        });
        Ok(rows)
    }
}
