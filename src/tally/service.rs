//! Election service facade
//!
//! Wires the roster, ledger, materializer and admission guard together
//! behind the public contract consumed by the HTTP layer:
//! `cast_vote`, `live_tally`, `winners`, `null_void_report` and
//! `reconcile_all`.

use crate::config::Config;
use crate::tally::admission::VoteAdmissionGuard;
use crate::tally::cache::{NoopCache, ResultCache};
use crate::tally::ledger::BallotLedger;
use crate::tally::materialize::{ReconcileStats, ResultMaterializer};
use crate::tally::roster::ElectionRoster;
use crate::tally::void::{self, VoidSummary};
use crate::types::{Ballot, CandidateTally, PositionId, VoterId, WardId, Winner};
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Unified entry point for the tallying subsystem
pub struct ElectionService {
    config: Config,
    roster: Arc<ElectionRoster>,
    ledger: Arc<BallotLedger>,
    materializer: Arc<ResultMaterializer>,
    guard: VoteAdmissionGuard,
}

impl ElectionService {
    /// Create a service with no read cache
    pub fn new(config: Config) -> Self {
        Self::with_cache(config, Arc::new(NoopCache))
    }

    /// Create a service with an injected read cache
    ///
    /// The materializer invalidates this cache explicitly after every
    /// successful recompute; there is no ambient expiry.
    pub fn with_cache(config: Config, cache: Arc<dyn ResultCache>) -> Self {
        let roster = Arc::new(ElectionRoster::new());
        let ledger = Arc::new(BallotLedger::new());
        let materializer = Arc::new(ResultMaterializer::new(
            roster.clone(),
            ledger.clone(),
            cache,
        ));
        let guard = VoteAdmissionGuard::new(
            roster.clone(),
            ledger.clone(),
            materializer.clone(),
            config.admission.clone(),
        );

        Self {
            config,
            roster,
            ledger,
            materializer,
            guard,
        }
    }

    /// Create a service for testing
    pub fn for_testing() -> Self {
        Self::new(Config::for_testing())
    }

    /// Cast an authenticated voter's ballot
    ///
    /// Returns the admitted ballot; admission failures surface as
    /// `Error::Admission` with the rejection reason.
    pub fn cast_vote(
        &self,
        voter_id: VoterId,
        position_id: PositionId,
        candidate_id: &str,
    ) -> Result<Ballot> {
        self.guard.cast_vote(voter_id, position_id, candidate_id)
    }

    /// Per-candidate counts for a position, grouped by scope key
    pub fn live_tally(&self, position_id: PositionId) -> Result<Vec<CandidateTally>> {
        self.materializer.live_tally(position_id)
    }

    /// Winner(s) per scope key, optionally restricted to one position
    pub fn winners(&self, position_id: Option<PositionId>) -> Result<Vec<Winner>> {
        self.materializer.winners(position_id)
    }

    /// Void-ballot counts and percentages per ward
    ///
    /// Computed directly from the ledger so the report reflects imported
    /// ballots even before any recompute has run.
    pub fn null_void_report(
        &self,
        ward_filter: Option<WardId>,
        date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<VoidSummary> {
        let ballots = self.ledger.snapshot()?;
        let mut summary = void::null_void_report(&ballots, ward_filter, date_range);

        let limit = self.config.admission.max_report_wards;
        if summary.wards.len() > limit {
            tracing::warn!(
                "Null/void report truncated from {} to {} wards",
                summary.wards.len(),
                limit
            );
            summary.wards.truncate(limit);
        }
        Ok(summary)
    }

    /// Rebuild all derived state from the ledger; idempotent
    pub fn reconcile_all(&self) -> Result<ReconcileStats> {
        self.materializer.reconcile_all()
    }

    /// Registry surface for positions, candidates and voter scopes
    pub fn roster(&self) -> &ElectionRoster {
        &self.roster
    }

    /// The append-only ballot ledger (admission bypass is import-only)
    pub fn ledger(&self) -> &BallotLedger {
        &self.ledger
    }
}
