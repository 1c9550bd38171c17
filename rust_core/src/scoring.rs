//! Placement and kill scoring over a lobby's recorded matches.
//!
//! This module provides:
//! - `aggregate_standings`: ranked standings across every match in a lobby
//! - `finalize_lobby`: standings plus the irreversible lobby close
//!
//! A team's placement in a match is the minimum position among its result
//! rows, so a straggler row with a worse position never drags the squad
//! down. Placement points come from `ScoringConfig::placement_points`.

use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::error::{CoreError, CoreResult};
use crate::roster::RosterProvider;
use crate::store::ResultStore;
use crate::types::{LobbyId, MatchResult, TeamStanding};

/// Build ranked standings for a lobby.
///
/// Every registered team appears, in slot order, even with zero matches
/// played. Teams are then sorted by total points descending; the sort is
/// stable, so ties keep slot order.
pub async fn aggregate_standings<S>(
    store: &S,
    lobby_id: LobbyId,
    cfg: &ScoringConfig,
) -> CoreResult<Vec<TeamStanding>>
where
    S: ResultStore + RosterProvider,
{
    store
        .get_lobby(lobby_id)
        .await?
        .ok_or(CoreError::LobbyNotFound(lobby_id))?;

    let teams = store.teams_in_lobby(lobby_id).await?;
    let matches = store.matches_in_lobby(lobby_id).await?;

    let mut result_sets: Vec<Vec<MatchResult>> = Vec::with_capacity(matches.len());
    for m in &matches {
        result_sets.push(store.read_results(m.id).await?);
    }

    let mut standings: Vec<TeamStanding> = Vec::with_capacity(teams.len());
    for team in &teams {
        let mut standing = TeamStanding {
            team_name: team.name.clone(),
            matches_played: 0,
            booyahs: 0,
            total_kills: 0,
            placement_points: 0,
            total_points: 0,
        };

        for rows in &result_sets {
            let mut best_position: Option<i32> = None;
            for row in rows.iter().filter(|r| r.team_id == team.id) {
                standing.total_kills += i64::from(row.kills);
                best_position = Some(match best_position {
                    Some(best) => best.min(row.position),
                    None => row.position,
                });
            }
            if let Some(position) = best_position {
                standing.matches_played += 1;
                standing.placement_points += cfg.placement_points(position);
                if position == 1 {
                    standing.booyahs += 1;
                }
            }
        }

        standing.total_points =
            standing.total_kills * cfg.kill_point_value + standing.placement_points;
        debug!(
            "'{}': {} matches, {} kills, {} placement -> {} points",
            standing.team_name,
            standing.matches_played,
            standing.total_kills,
            standing.placement_points,
            standing.total_points
        );
        standings.push(standing);
    }

    standings.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    Ok(standings)
}

/// Compute final standings and close the lobby.
///
/// Closing is irreversible. Result writes stay possible afterwards for
/// late corrections, but the lobby no longer reads as `ACTIVE`.
pub async fn finalize_lobby<S>(
    store: &S,
    lobby_id: LobbyId,
    cfg: &ScoringConfig,
) -> CoreResult<Vec<TeamStanding>>
where
    S: ResultStore + RosterProvider,
{
    let standings = aggregate_standings(store, lobby_id, cfg).await?;
    store.close_lobby(lobby_id).await?;
    info!(
        "lobby {} finalized with {} teams on the board",
        lobby_id,
        standings.len()
    );
    Ok(standings)
}
