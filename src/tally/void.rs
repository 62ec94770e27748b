//! Null/void ballot detection
//!
//! Pure functions over a ledger snapshot. Two ways a ballot becomes void:
//! 1. Its (voter, position) pair has more than one recorded ballot; the
//!    whole group is void, however and whenever the duplicates were
//!    created
//! 2. Its candidate id is the spoiled marker ("none of the above")
//!
//! Void ballots are excluded from every official tally but retained in
//! the ledger for audit and for the per-ward percentage report. The
//! admission guard never inserts duplicates, so in practice everything
//! this module finds arrived through the bulk-import path.

use crate::types::{Ballot, PositionId, VoterId, WardId};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Void-ballot statistics for one ward
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WardVoidReport {
    pub ward_id: WardId,

    /// Distinct void events: one per duplicate (voter, position) group
    /// plus one per spoiled ballot
    pub void_events: u64,

    /// Ballots excluded from official tallies
    pub ballots_excluded: u64,

    /// All ballots recorded in this ward (valid and void alike)
    pub total_ballots: u64,

    /// `ballots_excluded / total_ballots`, as a percentage
    pub percentage: f64,
}

/// Aggregated null/void report across wards
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VoidSummary {
    /// Per-ward reports, sorted by ward id for deterministic output
    pub wards: Vec<WardVoidReport>,
    pub total_void_events: u64,
    pub total_ballots_excluded: u64,
}

/// Ids of every void ballot in the snapshot
///
/// Grouping query over the whole slice: any (voter, position) group with
/// more than one ballot is void in its entirety, and every spoiled ballot
/// is void unconditionally.
pub fn void_ballot_ids(ballots: &[Ballot]) -> HashSet<Uuid> {
    let mut groups: HashMap<(VoterId, PositionId), Vec<&Ballot>> = HashMap::new();
    for ballot in ballots {
        groups
            .entry((ballot.voter_id, ballot.position_id))
            .or_default()
            .push(ballot);
    }

    let mut void = HashSet::new();
    for group in groups.values() {
        if group.len() > 1 {
            for ballot in group {
                void.insert(ballot.ballot_id);
            }
        }
    }
    for ballot in ballots {
        if ballot.is_spoiled() {
            void.insert(ballot.ballot_id);
        }
    }
    void
}

/// Non-void ballots from the snapshot, in ledger order
pub fn valid_ballots(ballots: &[Ballot]) -> Vec<&Ballot> {
    let void = void_ballot_ids(ballots);
    ballots
        .iter()
        .filter(|ballot| !void.contains(&ballot.ballot_id))
        .collect()
}

/// Build the per-ward null/void report
///
/// Duplicate detection always runs over the full snapshot so a duplicate
/// pair straddling the date boundary is still caught; the ward and date
/// filters restrict only which ballots are reported. A duplicate group
/// counts as one void event in a ward if any of its ballots fall inside
/// the filter there.
pub fn null_void_report(
    ballots: &[Ballot],
    ward_filter: Option<WardId>,
    date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> VoidSummary {
    let void = void_ballot_ids(ballots);

    // Size of each (voter, position) group, to tell duplicate-void from
    // spoiled-void when counting events.
    let mut group_sizes: HashMap<(VoterId, PositionId), usize> = HashMap::new();
    for ballot in ballots {
        *group_sizes
            .entry((ballot.voter_id, ballot.position_id))
            .or_default() += 1;
    }

    let in_filter = |ballot: &Ballot| {
        if let Some(ward_id) = ward_filter {
            if ballot.voter_scope.ward_id != ward_id {
                return false;
            }
        }
        if let Some((from, to)) = date_range {
            if ballot.cast_at < from || ballot.cast_at > to {
                return false;
            }
        }
        true
    };

    struct WardAcc {
        total: u64,
        excluded: u64,
        spoiled_events: u64,
        duplicate_groups: HashSet<(VoterId, PositionId)>,
    }

    let mut per_ward: HashMap<WardId, WardAcc> = HashMap::new();
    for ballot in ballots.iter().filter(|ballot| in_filter(ballot)) {
        let acc = per_ward
            .entry(ballot.voter_scope.ward_id)
            .or_insert_with(|| WardAcc {
                total: 0,
                excluded: 0,
                spoiled_events: 0,
                duplicate_groups: HashSet::new(),
            });
        acc.total += 1;

        if !void.contains(&ballot.ballot_id) {
            continue;
        }
        acc.excluded += 1;

        let key = (ballot.voter_id, ballot.position_id);
        if group_sizes.get(&key).copied().unwrap_or(0) > 1 {
            // Whole group is one event, however many ballots it holds.
            acc.duplicate_groups.insert(key);
        } else {
            acc.spoiled_events += 1;
        }
    }

    let mut wards: Vec<WardVoidReport> = per_ward
        .into_iter()
        .map(|(ward_id, acc)| {
            let void_events = acc.duplicate_groups.len() as u64 + acc.spoiled_events;
            let percentage = if acc.total > 0 {
                acc.excluded as f64 / acc.total as f64 * 100.0
            } else {
                0.0
            };
            WardVoidReport {
                ward_id,
                void_events,
                ballots_excluded: acc.excluded,
                total_ballots: acc.total,
                percentage,
            }
        })
        .collect();
    wards.sort_by_key(|report| report.ward_id);

    let total_void_events = wards.iter().map(|report| report.void_events).sum();
    let total_ballots_excluded = wards.iter().map(|report| report.ballots_excluded).sum();

    VoidSummary {
        wards,
        total_void_events,
        total_ballots_excluded,
    }
}
