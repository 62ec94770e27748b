//! Append-only ballot ledger
//!
//! Sole source of truth for cast votes:
//! 1. Ballots are appended once and never mutated or deleted
//! 2. `append_unique` serializes the read-check-then-insert per
//!    (voter, position) so two concurrent casts cannot both succeed
//! 3. The ledger append is the durability boundary: once a ballot is in,
//!    no downstream failure removes it
//! 4. `import_unchecked` is the legacy/bulk path that bypasses the
//!    uniqueness check; the null/void detector exists to audit it

use crate::internal_error;
use crate::types::{Ballot, PositionId, VoterId};
use crate::Result;
use std::collections::HashMap;
use std::sync::RwLock;

/// Outcome of an admission-path append
#[derive(Debug, Clone, PartialEq)]
pub enum AppendResult {
    /// Ballot appended; it is now durable
    Appended(Ballot),

    /// A ballot for this (voter, position) already exists; nothing was
    /// inserted
    Duplicate { existing: Ballot },
}

struct LedgerInner {
    ballots: Vec<Ballot>,
    // Ballot indices per (voter, position), in insertion order.
    by_voter_position: HashMap<(VoterId, PositionId), Vec<usize>>,
}

/// Append-only store of cast ballots
pub struct BallotLedger {
    inner: RwLock<LedgerInner>,
}

impl BallotLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerInner {
                ballots: Vec::new(),
                by_voter_position: HashMap::new(),
            }),
        }
    }

    /// Atomically check-and-append a ballot for the admission path
    ///
    /// The check and the insert happen under one write guard, so two
    /// concurrent casts for the same (voter, position) cannot both
    /// succeed. Any recorded ballot for the pair blocks admission,
    /// including ballots a previous import already voided: re-voting a
    /// voided pair would only enlarge the void group.
    pub fn append_unique(&self, ballot: Ballot) -> Result<AppendResult> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| internal_error!("Ledger write error"))?;

        let key = (ballot.voter_id, ballot.position_id);
        if let Some(indices) = inner.by_voter_position.get(&key) {
            if let Some(&first) = indices.first() {
                let existing = inner.ballots[first].clone();
                return Ok(AppendResult::Duplicate { existing });
            }
        }

        let index = inner.ballots.len();
        inner.ballots.push(ballot.clone());
        inner.by_voter_position.entry(key).or_default().push(index);

        tracing::debug!(
            "🗳️  Ballot appended: voter={}, position={}, candidate={}",
            ballot.voter_id,
            ballot.position_id,
            ballot.candidate_id
        );
        Ok(AppendResult::Appended(ballot))
    }

    /// Append a ballot without the uniqueness check
    ///
    /// Migration/bulk-import path only. Duplicates inserted here are not
    /// rejected; they are later detected and voided by the null/void
    /// detector.
    pub fn import_unchecked(&self, ballot: Ballot) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| internal_error!("Ledger write error"))?;

        let key = (ballot.voter_id, ballot.position_id);
        if inner.by_voter_position.contains_key(&key) {
            tracing::warn!(
                "Imported duplicate ballot: voter={}, position={}",
                ballot.voter_id,
                ballot.position_id
            );
        }

        let index = inner.ballots.len();
        inner.ballots.push(ballot);
        inner.by_voter_position.entry(key).or_default().push(index);
        Ok(())
    }

    /// Whether any ballot exists for this (voter, position)
    pub fn has_ballot(&self, voter_id: VoterId, position_id: PositionId) -> Result<bool> {
        let inner = self
            .inner
            .read()
            .map_err(|_| internal_error!("Ledger read error"))?;
        Ok(inner
            .by_voter_position
            .contains_key(&(voter_id, position_id)))
    }

    /// Snapshot of every ballot for one position
    pub fn ballots_for_position(&self, position_id: PositionId) -> Result<Vec<Ballot>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| internal_error!("Ledger read error"))?;
        Ok(inner
            .ballots
            .iter()
            .filter(|ballot| ballot.position_id == position_id)
            .cloned()
            .collect())
    }

    /// Snapshot of the whole ledger
    pub fn snapshot(&self) -> Result<Vec<Ballot>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| internal_error!("Ledger read error"))?;
        Ok(inner.ballots.clone())
    }

    /// Number of recorded ballots (valid and void alike)
    pub fn len(&self) -> Result<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| internal_error!("Ledger read error"))?;
        Ok(inner.ballots.len())
    }

    /// Whether the ledger holds no ballots
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for BallotLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoterScope;
    use uuid::Uuid;

    fn scope() -> VoterScope {
        VoterScope {
            station_id: Uuid::new_v4(),
            ward_id: Uuid::new_v4(),
            constituency_id: Uuid::new_v4(),
            district_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_append_unique_rejects_second_ballot() {
        let ledger = BallotLedger::new();
        let voter_id = Uuid::new_v4();
        let position_id = Uuid::new_v4();

        let first = Ballot::new(voter_id, position_id, "alice", scope());
        let result = ledger.append_unique(first.clone()).unwrap();
        assert!(matches!(result, AppendResult::Appended(_)));

        let second = Ballot::new(voter_id, position_id, "bob", scope());
        let result = ledger.append_unique(second).unwrap();
        match result {
            AppendResult::Duplicate { existing } => {
                assert_eq!(existing.ballot_id, first.ballot_id);
                assert_eq!(existing.candidate_id, "alice");
            }
            other => panic!("expected duplicate, got {other:?}"),
        }

        // The rejected ballot was never inserted.
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_same_voter_different_positions() {
        let ledger = BallotLedger::new();
        let voter_id = Uuid::new_v4();

        let first = Ballot::new(voter_id, Uuid::new_v4(), "alice", scope());
        let second = Ballot::new(voter_id, Uuid::new_v4(), "bob", scope());
        assert!(matches!(
            ledger.append_unique(first).unwrap(),
            AppendResult::Appended(_)
        ));
        assert!(matches!(
            ledger.append_unique(second).unwrap(),
            AppendResult::Appended(_)
        ));
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[test]
    fn test_import_unchecked_allows_duplicates() {
        let ledger = BallotLedger::new();
        let voter_id = Uuid::new_v4();
        let position_id = Uuid::new_v4();

        ledger
            .import_unchecked(Ballot::new(voter_id, position_id, "alice", scope()))
            .unwrap();
        ledger
            .import_unchecked(Ballot::new(voter_id, position_id, "bob", scope()))
            .unwrap();

        assert_eq!(ledger.len().unwrap(), 2);
        assert!(ledger.has_ballot(voter_id, position_id).unwrap());
    }

    #[test]
    fn test_position_snapshot_filters() {
        let ledger = BallotLedger::new();
        let position_a = Uuid::new_v4();
        let position_b = Uuid::new_v4();

        ledger
            .append_unique(Ballot::new(Uuid::new_v4(), position_a, "alice", scope()))
            .unwrap();
        ledger
            .append_unique(Ballot::new(Uuid::new_v4(), position_b, "bob", scope()))
            .unwrap();

        let for_a = ledger.ballots_for_position(position_a).unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].candidate_id, "alice");
    }
}
