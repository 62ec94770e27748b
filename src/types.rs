//! # Core Types for the Election Tallying Backend
//!
//! This module defines the fundamental data structures used throughout the
//! tallying subsystem. All types serialize with serde and are designed so
//! that the derived projections (tallies, winners) can always be rebuilt
//! from the ballot ledger alone.
//!
//! ## Type Categories
//!
//! ### Identity & Geography
//! - [`VoterScope`]: a voter's registered location (station → ward →
//!   constituency → district), snapshotted onto every ballot
//! - [`ScopeKey`]: the aggregation boundary for counting (nation, one
//!   constituency, or one ward)
//!
//! ### Core Entities
//! - [`Position`]: an elected office and its aggregation scope rule
//! - [`Candidate`]: a person standing for one position, optionally scoped
//! - [`Ballot`]: one voter's recorded choice, append-only
//!
//! ### Derived Projections
//! - [`CandidateTally`]: per-candidate vote count within a scope key
//! - [`Winner`]: max-count candidate(s) for a scope key, ties preserved
//!
//! ## Usage Examples
//!
//! ```rust
//! use tally::types::*;
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! // A national position counts every valid ballot in one bucket.
//! let position = Position {
//!     id: Uuid::new_v4(),
//!     title: "President".to_string(),
//!     kind: PositionKind::National,
//!     created_at: Utc::now(),
//! };
//!
//! let scope = VoterScope {
//!     station_id: Uuid::new_v4(),
//!     ward_id: Uuid::new_v4(),
//!     constituency_id: Uuid::new_v4(),
//!     district_id: Uuid::new_v4(),
//! };
//!
//! assert_eq!(position.scope_key_for(&scope), ScopeKey::National);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique voter identifier (issued by the auth/session collaborator)
pub type VoterId = Uuid;

/// Unique position identifier
pub type PositionId = Uuid;

/// Polling station identifier
pub type StationId = Uuid;

/// Ward identifier
pub type WardId = Uuid;

/// Constituency identifier
pub type ConstituencyId = Uuid;

/// District identifier
pub type DistrictId = Uuid;

/// Candidate identifier, unique within a position
///
/// String-based so registries can use human-readable slugs
/// (e.g. `"alice_mp_2026"`) as well as generated ids.
pub type CandidateId = String;

/// Candidate id marking a deliberately spoiled ("none of the above")
/// ballot. Never registered in any roster, so it can never pass the
/// admission guard; spoiled ballots reach the ledger only through the
/// bulk-import path and are voided unconditionally.
pub const SPOILED_CANDIDATE: &str = "none";

/// A voter's registered location in the electoral geography
///
/// Captured server-side at registration time and snapshotted onto every
/// ballot at admission. Scope checks always use this value, never a
/// client-supplied one, and the snapshot means later registry edits can
/// never rewrite how a historical ballot was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterScope {
    pub station_id: StationId,
    pub ward_id: WardId,
    pub constituency_id: ConstituencyId,
    pub district_id: DistrictId,
}

/// Aggregation scope rule for a position
///
/// Determines which ballots compete against each other:
/// - `National`: one nationwide count per candidate
/// - `Constituency`: candidates compete only within their constituency
/// - `Ward`: candidates compete only within their ward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    National,
    Constituency,
    Ward,
}

impl PositionKind {
    /// Human-readable name of the scope this kind aggregates over
    pub fn scope_name(&self) -> &'static str {
        match self {
            PositionKind::National => "national",
            PositionKind::Constituency => "constituency",
            PositionKind::Ward => "ward",
        }
    }

    /// Whether candidates for this kind must register a scope
    pub fn is_scoped(&self) -> bool {
        !matches!(self, PositionKind::National)
    }
}

/// The aggregation boundary a tally or winner belongs to
///
/// Every derived row (tally, winner) is keyed by `(PositionId, ScopeKey)`.
/// Recomputation is limited to one key at a time: a vote in one
/// constituency's race never touches another constituency's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKey {
    /// The whole nation (national positions)
    National,
    /// One constituency (constituency-scoped positions)
    Constituency(ConstituencyId),
    /// One ward (ward-scoped positions)
    Ward(WardId),
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeKey::National => write!(f, "national"),
            ScopeKey::Constituency(id) => write!(f, "constituency:{id}"),
            ScopeKey::Ward(id) => write!(f, "ward:{id}"),
        }
    }
}

/// An elected office voters cast ballots for
///
/// The `kind` defines the aggregation scope rule for every candidate and
/// ballot referencing this position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique position identifier
    pub id: PositionId,

    /// Human-readable office title (e.g. "Member of Parliament")
    pub title: String,

    /// Aggregation scope rule
    pub kind: PositionKind,

    /// When this position was registered
    pub created_at: DateTime<Utc>,
}

impl Position {
    /// The scope key a given voter's ballot for this position falls into
    pub fn scope_key_for(&self, scope: &VoterScope) -> ScopeKey {
        match self.kind {
            PositionKind::National => ScopeKey::National,
            PositionKind::Constituency => ScopeKey::Constituency(scope.constituency_id),
            PositionKind::Ward => ScopeKey::Ward(scope.ward_id),
        }
    }
}

/// A person standing for one position
///
/// For scoped positions (`Constituency`/`Ward` kinds) the candidate must
/// carry the id of the constituency or ward they are standing in; for
/// national positions `scope` must be `None`. The roster enforces this at
/// registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique candidate identifier within the position
    pub id: CandidateId,

    /// Position this candidate is standing for
    pub position_id: PositionId,

    /// Candidate's display name
    pub name: String,

    /// Party affiliation
    pub party: String,

    /// Registered scope: constituency id or ward id, required iff the
    /// position kind is scoped
    pub scope: Option<Uuid>,
}

impl Candidate {
    /// The scope key this candidate's tally is counted under
    ///
    /// Returns `None` when a scoped position's candidate is missing its
    /// registered scope (rejected at registration, but the aggregator
    /// re-checks so imported data cannot corrupt a tally).
    pub fn scope_key(&self, kind: PositionKind) -> Option<ScopeKey> {
        match kind {
            PositionKind::National => Some(ScopeKey::National),
            PositionKind::Constituency => self.scope.map(ScopeKey::Constituency),
            PositionKind::Ward => self.scope.map(ScopeKey::Ward),
        }
    }
}

/// One voter's recorded choice of candidate for one position
///
/// Ballots are append-only: created once at admission (or import), never
/// mutated or deleted, and retained for audit even when voided. The
/// ledger of ballots is the sole source of truth; every derived row can
/// be rebuilt from it at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    /// Unique ballot identifier
    pub ballot_id: Uuid,

    /// Voter who cast this ballot
    pub voter_id: VoterId,

    /// Position the ballot is for
    pub position_id: PositionId,

    /// Chosen candidate, or [`SPOILED_CANDIDATE`] for a spoiled ballot
    pub candidate_id: CandidateId,

    /// The voter's registered scope, snapshotted at admission time
    pub voter_scope: VoterScope,

    /// When the ballot was cast
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    /// Create a new ballot stamped with the current time
    pub fn new(
        voter_id: VoterId,
        position_id: PositionId,
        candidate_id: impl Into<CandidateId>,
        voter_scope: VoterScope,
    ) -> Self {
        Self {
            ballot_id: Uuid::new_v4(),
            voter_id,
            position_id,
            candidate_id: candidate_id.into(),
            voter_scope,
            cast_at: Utc::now(),
        }
    }

    /// Whether this ballot is a deliberate spoil ("none of the above")
    pub fn is_spoiled(&self) -> bool {
        self.candidate_id == SPOILED_CANDIDATE
    }
}

/// Per-candidate vote count within one scope key (derived)
///
/// Recomputed from the ledger, never incrementally merged. The count
/// covers only non-void ballots that satisfy the scope rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub position_id: PositionId,
    pub candidate_id: CandidateId,
    pub scope_key: ScopeKey,
    pub count: u64,
}

/// The winning candidate(s) for one scope key (derived)
///
/// Holds every candidate whose tally equals the maximum count within the
/// key. A tie therefore yields multiple `candidate_ids`; that is a
/// documented output of winner resolution, not an error. Candidate ids
/// are kept sorted so resolution is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub position_id: PositionId,
    pub scope_key: ScopeKey,
    pub candidate_ids: Vec<CandidateId>,
    pub votes: u64,
}

impl Winner {
    /// Whether this scope key ended in a tie
    pub fn is_tie(&self) -> bool {
        self.candidate_ids.len() > 1
    }
}
