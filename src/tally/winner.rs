//! Winner resolution
//!
//! A pure function of the tally snapshot: group rows by
//! (position, scope key), take the maximum count, keep every candidate
//! holding it. Ties are a defined output (multiple candidate ids), never
//! an error. Re-running over an unchanged snapshot always yields the same
//! winners; both the per-vote recompute and the full rebuild call this
//! same function, so there is exactly one winner policy.

use crate::types::{CandidateTally, PositionId, ScopeKey, Winner};
use std::collections::HashMap;

/// Resolve the winner(s) of every scope key present in the snapshot
///
/// Output is sorted by position id then scope key rendering, with each
/// winner's candidate ids sorted, so resolution is deterministic.
pub fn resolve_winners(tallies: &[CandidateTally]) -> Vec<Winner> {
    let mut by_key: HashMap<(PositionId, ScopeKey), Vec<&CandidateTally>> = HashMap::new();
    for tally in tallies {
        by_key
            .entry((tally.position_id, tally.scope_key))
            .or_default()
            .push(tally);
    }

    let mut winners: Vec<Winner> = by_key
        .into_iter()
        .filter_map(|((position_id, scope_key), rows)| {
            let max = rows.iter().map(|tally| tally.count).max()?;
            let mut candidate_ids: Vec<String> = rows
                .iter()
                .filter(|tally| tally.count == max)
                .map(|tally| tally.candidate_id.clone())
                .collect();
            candidate_ids.sort();
            Some(Winner {
                position_id,
                scope_key,
                candidate_ids,
                votes: max,
            })
        })
        .collect();

    winners.sort_by(|a, b| {
        a.position_id
            .cmp(&b.position_id)
            .then_with(|| a.scope_key.to_string().cmp(&b.scope_key.to_string()))
    });
    winners
}

/// Resolve a single scope key's winner, if any candidates compete there
pub fn resolve_scope(tallies: &[CandidateTally], key: &ScopeKey) -> Option<Winner> {
    let in_key: Vec<CandidateTally> = tallies
        .iter()
        .filter(|tally| tally.scope_key == *key)
        .cloned()
        .collect();
    resolve_winners(&in_key).into_iter().next()
}
