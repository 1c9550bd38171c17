//! Positional majority-vote team inference.
//!
//! Squadmates share one placement number on the scoreboard, so once any
//! entry at a position resolves to a team, the rest of that position group
//! can be back-filled. The vote trusts the extractor's grouping; if players
//! from two squads were mis-grouped under one placement upstream, the
//! majority silently wins. That limitation is accepted, not corrected here.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::types::{ResolutionSource, ResolvedEntry, TeamId};

/// Back-fill missing team assignments per position group.
///
/// For every group with at least one resolved team, the most frequent team
/// id is assigned to each teamless entry. Equal counts keep whichever team
/// was seen first in entry order. Groups with no resolved team at all are
/// left untouched.
pub fn infer_teams(mut entries: Vec<ResolvedEntry>) -> Vec<ResolvedEntry> {
    let mut groups: FxHashMap<i32, Vec<usize>> = FxHashMap::default();
    for (idx, entry) in entries.iter().enumerate() {
        groups.entry(entry.position).or_default().push(idx);
    }

    for (position, indices) in groups {
        // first-seen-stable counting: ties resolve to the earliest team
        let mut counts: Vec<(TeamId, usize)> = Vec::new();
        for &idx in &indices {
            if let Some(team_id) = entries[idx].team_id {
                match counts.iter_mut().find(|(t, _)| *t == team_id) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((team_id, 1)),
                }
            }
        }

        let mut winner: Option<(TeamId, usize)> = None;
        for &(team_id, count) in &counts {
            match winner {
                Some((_, best)) if count <= best => {}
                _ => winner = Some((team_id, count)),
            }
        }

        if let Some((team_id, votes)) = winner {
            for &idx in &indices {
                if entries[idx].team_id.is_none() {
                    entries[idx].team_id = Some(team_id);
                    entries[idx].source = ResolutionSource::PositionMajority;
                    debug!(
                        "'{}': position {} majority ({} votes) -> team {}",
                        entries[idx].ign, position, votes, team_id
                    );
                }
            }
        }
    }

    entries
}
