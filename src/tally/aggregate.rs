//! Scoped tally aggregation
//!
//! Pure functions from a ledger snapshot to `CandidateTally` rows. The
//! counting scope follows the position kind:
//! - national: every valid ballot for the position counts
//! - constituency/ward: a ballot counts only when the voter's snapshotted
//!   scope maps to the candidate's registered scope
//!
//! The scope rule is re-applied here even though admission already
//! enforced it, so ballots that entered through the import path are
//! scope-checked too. Void ballots are excluded before counting.

use crate::tally::void;
use crate::types::{Ballot, Candidate, CandidateTally, Position, ScopeKey};
use std::collections::HashMap;

/// Tally every candidate of a position across all its scope keys
///
/// Emits a row for every registered candidate, zero counts included, so
/// each contested scope key is fully represented. Rows are sorted by
/// candidate id; the output is a pure function of the inputs.
pub fn tally_position(
    position: &Position,
    candidates: &[Candidate],
    ballots: &[Ballot],
) -> Vec<CandidateTally> {
    let valid = void::valid_ballots(ballots);

    let mut counts: HashMap<&str, u64> = HashMap::new();
    let by_id: HashMap<&str, &Candidate> = candidates
        .iter()
        .map(|candidate| (candidate.id.as_str(), candidate))
        .collect();

    for ballot in valid {
        debug_assert_eq!(ballot.position_id, position.id);
        let Some(candidate) = by_id.get(ballot.candidate_id.as_str()) else {
            // Imported ballot referencing an unregistered candidate;
            // counts for nobody.
            continue;
        };
        let Some(candidate_key) = candidate.scope_key(position.kind) else {
            continue;
        };
        if position.scope_key_for(&ballot.voter_scope) == candidate_key {
            *counts.entry(candidate.id.as_str()).or_default() += 1;
        }
    }

    let mut tallies: Vec<CandidateTally> = candidates
        .iter()
        .filter_map(|candidate| {
            let scope_key = candidate.scope_key(position.kind)?;
            Some(CandidateTally {
                position_id: position.id,
                candidate_id: candidate.id.clone(),
                scope_key,
                count: counts.get(candidate.id.as_str()).copied().unwrap_or(0),
            })
        })
        .collect();
    tallies.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
    tallies
}

/// Scope-limited tally: only the candidates competing in `key`
///
/// A vote in one constituency's race recomputes that constituency alone;
/// this is the per-vote recompute entry point.
pub fn tally_scope(
    position: &Position,
    candidates: &[Candidate],
    ballots: &[Ballot],
    key: &ScopeKey,
) -> Vec<CandidateTally> {
    let in_key: Vec<Candidate> = candidates
        .iter()
        .filter(|candidate| candidate.scope_key(position.kind).as_ref() == Some(key))
        .cloned()
        .collect();
    tally_position(position, &in_key, ballots)
}
