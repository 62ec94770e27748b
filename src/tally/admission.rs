//! Vote admission guard
//!
//! The single write path for votes. Checks run in a fixed order:
//! 1. Position exists
//! 2. Candidate exists and belongs to the position
//!    (`InvalidCandidateForPosition`)
//! 3. For scoped positions, candidate scope equals the voter's registered
//!    scope for that kind (`ScopeMismatch`)
//! 4. No ballot exists yet for (voter, position) (`AlreadyVoted`); the
//!    check and insert are atomic in the ledger
//!
//! The ledger append is the durability boundary. The scope-limited
//! recompute that follows is fire-and-continue: its failure is logged as
//! a consistency error and repaired by `reconcile_all()`, never rolled
//! back onto the voter.

use crate::config::AdmissionConfig;
use crate::tally::ledger::{AppendResult, BallotLedger};
use crate::tally::materialize::ResultMaterializer;
use crate::tally::roster::ElectionRoster;
use crate::types::{Ballot, PositionId, VoterId};
use crate::{AdmissionError, Result};
use std::sync::Arc;

/// Validates and admits one vote per (voter, position)
pub struct VoteAdmissionGuard {
    roster: Arc<ElectionRoster>,
    ledger: Arc<BallotLedger>,
    materializer: Arc<ResultMaterializer>,
    config: AdmissionConfig,
}

impl VoteAdmissionGuard {
    /// Create a guard over the given roster, ledger and materializer
    pub fn new(
        roster: Arc<ElectionRoster>,
        ledger: Arc<BallotLedger>,
        materializer: Arc<ResultMaterializer>,
        config: AdmissionConfig,
    ) -> Self {
        Self {
            roster,
            ledger,
            materializer,
            config,
        }
    }

    /// Cast a vote, returning the admitted ballot as the receipt
    ///
    /// `voter_id` must be the authenticated id from the session
    /// collaborator; the voter's scope is read server-side from the
    /// roster, never from the request.
    pub fn cast_vote(
        &self,
        voter_id: VoterId,
        position_id: PositionId,
        candidate_id: &str,
    ) -> Result<Ballot> {
        let position = self.roster.position(position_id)?;
        let voter_scope = self.roster.voter_scope(voter_id)?;

        // Candidate exists and belongs to this position.
        let candidate = self
            .roster
            .candidate(position_id, candidate_id)?
            .ok_or_else(|| AdmissionError::InvalidCandidateForPosition {
                candidate_id: candidate_id.to_string(),
                position_id,
            })?;

        // Scoped positions: candidate scope must equal the voter's scope
        // for this position kind.
        let scope_key = match candidate.scope_key(position.kind) {
            Some(key) => key,
            None => {
                // Roster registration prevents this; treat defensively.
                return Err(AdmissionError::InvalidCandidateForPosition {
                    candidate_id: candidate_id.to_string(),
                    position_id,
                }
                .into());
            }
        };
        if scope_key != position.scope_key_for(&voter_scope) {
            return Err(AdmissionError::ScopeMismatch {
                candidate_id: candidate_id.to_string(),
                scope_kind: position.kind.scope_name(),
            }
            .into());
        }

        // One ballot per (voter, position); atomic check-and-insert.
        let ballot = Ballot::new(voter_id, position_id, candidate_id, voter_scope);
        let ballot = match self.ledger.append_unique(ballot)? {
            AppendResult::Appended(ballot) => ballot,
            AppendResult::Duplicate { .. } => {
                return Err(AdmissionError::AlreadyVoted {
                    voter_id,
                    position_id,
                }
                .into());
            }
        };

        tracing::info!(
            "✅ Vote admitted: voter={}, position={}, candidate={}",
            voter_id,
            position_id,
            candidate_id
        );

        // The vote is durable; recompute is limited to the affected scope
        // key and must not fail the cast.
        if self.config.recompute_on_cast {
            if let Err(err) = self.materializer.recompute_scope(position_id, scope_key) {
                tracing::error!(
                    "Consistency: recompute failed for position={}, scope={}: {}. \
                     Derived state is stale until the next recompute or reconcile_all()",
                    position_id,
                    scope_key,
                    err
                );
            }
        }

        Ok(ballot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::cache::NoopCache;
    use crate::types::{Candidate, Position, PositionKind, VoterScope};
    use crate::Error;
    use chrono::Utc;
    use uuid::Uuid;

    struct Fixture {
        roster: Arc<ElectionRoster>,
        guard: VoteAdmissionGuard,
    }

    fn fixture() -> Fixture {
        let roster = Arc::new(ElectionRoster::new());
        let ledger = Arc::new(BallotLedger::new());
        let materializer = Arc::new(ResultMaterializer::new(
            roster.clone(),
            ledger.clone(),
            Arc::new(NoopCache),
        ));
        let guard = VoteAdmissionGuard::new(
            roster.clone(),
            ledger,
            materializer,
            AdmissionConfig::for_testing(),
        );
        Fixture { roster, guard }
    }

    fn register_voter(roster: &ElectionRoster, constituency_id: Uuid) -> VoterId {
        let voter_id = Uuid::new_v4();
        roster
            .register_voter(
                voter_id,
                VoterScope {
                    station_id: Uuid::new_v4(),
                    ward_id: Uuid::new_v4(),
                    constituency_id,
                    district_id: Uuid::new_v4(),
                },
            )
            .unwrap();
        voter_id
    }

    fn register_mp_race(roster: &ElectionRoster, constituency_id: Uuid) -> PositionId {
        let position = Position {
            id: Uuid::new_v4(),
            title: "Member of Parliament".to_string(),
            kind: PositionKind::Constituency,
            created_at: Utc::now(),
        };
        roster.register_position(position.clone()).unwrap();
        roster
            .register_candidate(Candidate {
                id: "alice_mp".to_string(),
                position_id: position.id,
                name: "Alice".to_string(),
                party: "Unity".to_string(),
                scope: Some(constituency_id),
            })
            .unwrap();
        position.id
    }

    #[test]
    fn test_unknown_candidate_rejected() {
        let fixture = fixture();
        let constituency_id = Uuid::new_v4();
        let position_id = register_mp_race(&fixture.roster, constituency_id);
        let voter_id = register_voter(&fixture.roster, constituency_id);

        let err = fixture
            .guard
            .cast_vote(voter_id, position_id, "nobody")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Admission(AdmissionError::InvalidCandidateForPosition { .. })
        ));
    }

    #[test]
    fn test_scope_mismatch_rejected() {
        let fixture = fixture();
        let constituency_id = Uuid::new_v4();
        let position_id = register_mp_race(&fixture.roster, constituency_id);
        // Voter registered in a different constituency.
        let voter_id = register_voter(&fixture.roster, Uuid::new_v4());

        let err = fixture
            .guard
            .cast_vote(voter_id, position_id, "alice_mp")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Admission(AdmissionError::ScopeMismatch { .. })
        ));
    }

    #[test]
    fn test_double_vote_rejected() {
        let fixture = fixture();
        let constituency_id = Uuid::new_v4();
        let position_id = register_mp_race(&fixture.roster, constituency_id);
        let voter_id = register_voter(&fixture.roster, constituency_id);

        fixture
            .guard
            .cast_vote(voter_id, position_id, "alice_mp")
            .unwrap();
        let err = fixture
            .guard
            .cast_vote(voter_id, position_id, "alice_mp")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Admission(AdmissionError::AlreadyVoted { .. })
        ));
    }

    #[test]
    fn test_unknown_position_is_not_found() {
        let fixture = fixture();
        let voter_id = register_voter(&fixture.roster, Uuid::new_v4());

        let err = fixture
            .guard
            .cast_vote(voter_id, Uuid::new_v4(), "alice_mp")
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
