//! Election roster: positions, candidates and voter scopes
//!
//! In-memory registry surface consumed by the admission guard and the
//! materializer. It stands in for two upstream collaborators:
//! 1. The candidate/position registry (position kinds, candidate scopes)
//! 2. The auth/session collaborator's server-side voter scope record
//!
//! Scope checks must always use the scope registered here, never a
//! client-supplied value.

use crate::types::{
    Candidate, CandidateId, Position, PositionId, PositionKind, ScopeKey, VoterId, VoterScope,
    SPOILED_CANDIDATE,
};
use crate::{internal_error, Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// In-memory registry of positions, candidates and voter scopes
pub struct ElectionRoster {
    positions: RwLock<HashMap<PositionId, Position>>,
    // Candidate ids are unique per position, not globally.
    candidates: RwLock<HashMap<PositionId, HashMap<CandidateId, Candidate>>>,
    voters: RwLock<HashMap<VoterId, VoterScope>>,
}

impl ElectionRoster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
            candidates: RwLock::new(HashMap::new()),
            voters: RwLock::new(HashMap::new()),
        }
    }

    /// Register a position
    pub fn register_position(&self, position: Position) -> Result<()> {
        let mut positions = self
            .positions
            .write()
            .map_err(|_| internal_error!("Roster position write error"))?;

        if positions.contains_key(&position.id) {
            return Err(Error::validation(format!(
                "position {} already registered",
                position.id
            )));
        }

        tracing::info!(
            "📋 Position registered: {} ({}, {})",
            position.title,
            position.id,
            position.kind.scope_name()
        );
        positions.insert(position.id, position);
        Ok(())
    }

    /// Register a candidate for an existing position
    ///
    /// Rejects a scoped-position candidate with no registered scope, a
    /// national candidate carrying one, and any candidate reusing the
    /// spoiled-ballot marker as an id.
    pub fn register_candidate(&self, candidate: Candidate) -> Result<()> {
        if candidate.id == SPOILED_CANDIDATE {
            return Err(Error::validation(format!(
                "candidate id '{SPOILED_CANDIDATE}' is reserved for spoiled ballots"
            )));
        }

        let position = self.position(candidate.position_id)?;
        match (position.kind.is_scoped(), candidate.scope.is_some()) {
            (true, false) => {
                return Err(Error::validation(format!(
                    "candidate '{}' needs a {} scope",
                    candidate.id,
                    position.kind.scope_name()
                )));
            }
            (false, true) => {
                return Err(Error::validation(format!(
                    "national candidate '{}' must not carry a scope",
                    candidate.id
                )));
            }
            _ => {}
        }

        let mut candidates = self
            .candidates
            .write()
            .map_err(|_| internal_error!("Roster candidate write error"))?;
        let for_position = candidates.entry(candidate.position_id).or_default();

        if for_position.contains_key(&candidate.id) {
            return Err(Error::validation(format!(
                "candidate '{}' already registered for position {}",
                candidate.id, candidate.position_id
            )));
        }

        for_position.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    /// Register a voter's server-side scope
    pub fn register_voter(&self, voter_id: VoterId, scope: VoterScope) -> Result<()> {
        let mut voters = self
            .voters
            .write()
            .map_err(|_| internal_error!("Roster voter write error"))?;

        // Immutable after registration for this subsystem.
        if voters.contains_key(&voter_id) {
            return Err(Error::validation(format!(
                "voter {voter_id} already registered"
            )));
        }

        voters.insert(voter_id, scope);
        Ok(())
    }

    /// Look up a position
    pub fn position(&self, position_id: PositionId) -> Result<Position> {
        self.positions
            .read()
            .map_err(|_| internal_error!("Roster position read error"))?
            .get(&position_id)
            .cloned()
            .ok_or_else(|| Error::not_found("position", position_id.to_string()))
    }

    /// Look up a candidate within a position
    pub fn candidate(
        &self,
        position_id: PositionId,
        candidate_id: &str,
    ) -> Result<Option<Candidate>> {
        Ok(self
            .candidates
            .read()
            .map_err(|_| internal_error!("Roster candidate read error"))?
            .get(&position_id)
            .and_then(|for_position| for_position.get(candidate_id))
            .cloned())
    }

    /// Look up a voter's registered scope
    pub fn voter_scope(&self, voter_id: VoterId) -> Result<VoterScope> {
        self.voters
            .read()
            .map_err(|_| internal_error!("Roster voter read error"))?
            .get(&voter_id)
            .copied()
            .ok_or_else(|| Error::not_found("voter", voter_id.to_string()))
    }

    /// All candidates standing for a position
    pub fn candidates_for(&self, position_id: PositionId) -> Result<Vec<Candidate>> {
        Ok(self
            .candidates
            .read()
            .map_err(|_| internal_error!("Roster candidate read error"))?
            .get(&position_id)
            .map(|for_position| for_position.values().cloned().collect())
            .unwrap_or_default())
    }

    /// All registered positions
    pub fn positions(&self) -> Result<Vec<Position>> {
        Ok(self
            .positions
            .read()
            .map_err(|_| internal_error!("Roster position read error"))?
            .values()
            .cloned()
            .collect())
    }

    /// Every scope key a position's registered candidates compete in
    ///
    /// Drives the full rebuild: `reconcile_all()` recomputes exactly this
    /// key set per position.
    pub fn scope_keys_for(&self, position: &Position) -> Result<HashSet<ScopeKey>> {
        if position.kind == PositionKind::National {
            let mut keys = HashSet::new();
            keys.insert(ScopeKey::National);
            return Ok(keys);
        }

        Ok(self
            .candidates_for(position.id)?
            .iter()
            .filter_map(|candidate| candidate.scope_key(position.kind))
            .collect())
    }
}

impl Default for ElectionRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn position(kind: PositionKind) -> Position {
        Position {
            id: Uuid::new_v4(),
            title: "Test Position".to_string(),
            kind,
            created_at: Utc::now(),
        }
    }

    fn candidate(position_id: PositionId, id: &str, scope: Option<Uuid>) -> Candidate {
        Candidate {
            id: id.to_string(),
            position_id,
            name: "Test Candidate".to_string(),
            party: "Test Party".to_string(),
            scope,
        }
    }

    #[test]
    fn test_candidate_scope_validation() {
        let roster = ElectionRoster::new();
        let mp = position(PositionKind::Constituency);
        let president = position(PositionKind::National);
        roster.register_position(mp.clone()).unwrap();
        roster.register_position(president.clone()).unwrap();

        // Scoped position requires a scope.
        let err = roster
            .register_candidate(candidate(mp.id, "alice_mp", None))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        // National position forbids one.
        let err = roster
            .register_candidate(candidate(president.id, "alice", Some(Uuid::new_v4())))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        roster
            .register_candidate(candidate(mp.id, "alice_mp", Some(Uuid::new_v4())))
            .unwrap();
        roster
            .register_candidate(candidate(president.id, "alice", None))
            .unwrap();
    }

    #[test]
    fn test_spoiled_marker_reserved() {
        let roster = ElectionRoster::new();
        let president = position(PositionKind::National);
        roster.register_position(president.clone()).unwrap();

        let err = roster
            .register_candidate(candidate(president.id, SPOILED_CANDIDATE, None))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let roster = ElectionRoster::new();
        let president = position(PositionKind::National);
        roster.register_position(president.clone()).unwrap();
        assert!(roster.register_position(president.clone()).is_err());

        let voter_id = Uuid::new_v4();
        let scope = VoterScope {
            station_id: Uuid::new_v4(),
            ward_id: Uuid::new_v4(),
            constituency_id: Uuid::new_v4(),
            district_id: Uuid::new_v4(),
        };
        roster.register_voter(voter_id, scope).unwrap();
        assert!(roster.register_voter(voter_id, scope).is_err());
    }

    #[test]
    fn test_scope_keys_for_position() {
        let roster = ElectionRoster::new();
        let mp = position(PositionKind::Constituency);
        roster.register_position(mp.clone()).unwrap();

        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        roster
            .register_candidate(candidate(mp.id, "alice_mp", Some(c1)))
            .unwrap();
        roster
            .register_candidate(candidate(mp.id, "bob_mp", Some(c1)))
            .unwrap();
        roster
            .register_candidate(candidate(mp.id, "carol_mp", Some(c2)))
            .unwrap();

        let keys = roster.scope_keys_for(&mp).unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&ScopeKey::Constituency(c1)));
        assert!(keys.contains(&ScopeKey::Constituency(c2)));
    }
}
