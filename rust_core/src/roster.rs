//! Roster snapshots for identity resolution.
//!
//! A snapshot is fetched once per submission and held fixed for the whole
//! entry list. Re-fetching mid-resolution would make matching decisions
//! order-dependent, so every lookup the resolver needs is prebuilt here.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{LobbyId, PlayerId, Team, TeamId};

/// One confirmed player-to-team registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub ign: String,
}

/// A player known anywhere in the system, not just this lobby.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPlayer {
    pub player_id: PlayerId,
    pub ign: String,
}

/// Read side of the roster collaborator.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Teams registered into the lobby, ordered by slot number.
    async fn teams_in_lobby(&self, lobby_id: LobbyId) -> CoreResult<Vec<Team>>;

    /// Confirmed registrations for the lobby, in registration order.
    async fn lobby_roster(&self, lobby_id: LobbyId) -> CoreResult<Vec<RosterRow>>;

    /// Every known player across all lobbies, in registration order.
    async fn all_players(&self) -> CoreResult<Vec<DirectoryPlayer>>;
}

/// Point-in-time view of a lobby's teams and player aliases.
#[derive(Clone, Debug)]
pub struct RosterSnapshot {
    lobby_id: LobbyId,
    teams: Vec<Team>,
    rows: Vec<RosterRow>,
    directory: Vec<DirectoryPlayer>,
    team_by_lower_name: FxHashMap<String, TeamId>,
    membership: FxHashMap<PlayerId, TeamId>,
    player_by_team_ign: FxHashMap<(TeamId, String), PlayerId>,
}

impl RosterSnapshot {
    /// Fetch all roster data for one lobby. Any provider failure is fatal
    /// and surfaces before entry processing starts.
    pub async fn fetch<P>(provider: &P, lobby_id: LobbyId) -> CoreResult<Self>
    where
        P: RosterProvider + ?Sized,
    {
        let teams = provider
            .teams_in_lobby(lobby_id)
            .await
            .map_err(|e| unavailable(lobby_id, e))?;
        let rows = provider
            .lobby_roster(lobby_id)
            .await
            .map_err(|e| unavailable(lobby_id, e))?;
        let directory = provider
            .all_players()
            .await
            .map_err(|e| unavailable(lobby_id, e))?;
        Ok(Self::from_parts(lobby_id, teams, rows, directory))
    }

    /// Assemble a snapshot from already-fetched parts.
    pub fn from_parts(
        lobby_id: LobbyId,
        teams: Vec<Team>,
        rows: Vec<RosterRow>,
        directory: Vec<DirectoryPlayer>,
    ) -> Self {
        let mut team_by_lower_name = FxHashMap::default();
        for team in &teams {
            // first slot wins if two teams share a name
            team_by_lower_name
                .entry(team.name.to_lowercase())
                .or_insert(team.id);
        }

        let mut membership = FxHashMap::default();
        let mut player_by_team_ign = FxHashMap::default();
        for row in &rows {
            // later registrations overwrite: most recent membership wins
            membership.insert(row.player_id, row.team_id);
            player_by_team_ign.insert((row.team_id, row.ign.to_lowercase()), row.player_id);
        }

        Self {
            lobby_id,
            teams,
            rows,
            directory,
            team_by_lower_name,
            membership,
            player_by_team_ign,
        }
    }

    pub fn lobby_id(&self) -> LobbyId {
        self.lobby_id
    }

    /// Teams in slot order. This ordering is also the standings tie-break.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Lobby aliases in registration order.
    pub fn roster_rows(&self) -> &[RosterRow] {
        &self.rows
    }

    /// Cross-lobby player directory in registration order.
    pub fn directory(&self) -> &[DirectoryPlayer] {
        &self.directory
    }

    /// Exact team lookup, case-insensitive.
    pub fn team_by_name(&self, raw: &str) -> Option<TeamId> {
        self.team_by_lower_name.get(&raw.to_lowercase()).copied()
    }

    /// Exact directory lookup, case-insensitive. Registration order breaks
    /// ties between players sharing an alias.
    pub fn player_by_ign(&self, ign: &str) -> Option<PlayerId> {
        let lower = ign.to_lowercase();
        self.directory
            .iter()
            .find(|p| p.ign.to_lowercase() == lower)
            .map(|p| p.player_id)
    }

    /// The team a directory player is registered under in this lobby.
    pub fn lobby_team_of(&self, player_id: PlayerId) -> Option<TeamId> {
        self.membership.get(&player_id).copied()
    }

    /// Exact alias lookup scoped to one team, case-insensitive but never
    /// normalized. Used to recover a player identity after the team
    /// resolved through another tier.
    pub fn player_by_team_ign(&self, team_id: TeamId, ign: &str) -> Option<PlayerId> {
        self.player_by_team_ign
            .get(&(team_id, ign.to_lowercase()))
            .copied()
    }
}

fn unavailable(lobby_id: LobbyId, source: CoreError) -> CoreError {
    CoreError::RosterUnavailable {
        lobby_id,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: i64, name: &str, slot: u32) -> Team {
        Team {
            id: TeamId(id),
            lobby_id: LobbyId(1),
            name: name.to_string(),
            slot_no: slot,
        }
    }

    fn row(team_id: i64, player_id: i64, ign: &str) -> RosterRow {
        RosterRow {
            team_id: TeamId(team_id),
            player_id: PlayerId(player_id),
            ign: ign.to_string(),
        }
    }

    fn snapshot() -> RosterSnapshot {
        RosterSnapshot::from_parts(
            LobbyId(1),
            vec![team(10, "GodLike", 1), team(11, "TSM Entity", 2)],
            vec![row(10, 100, "GodLike_Omega"), row(11, 101, "TSM_Ninja")],
            vec![
                DirectoryPlayer {
                    player_id: PlayerId(100),
                    ign: "GodLike_Omega".to_string(),
                },
                DirectoryPlayer {
                    player_id: PlayerId(102),
                    ign: "LoneWolf".to_string(),
                },
            ],
        )
    }

    #[test]
    fn test_team_lookup_case_insensitive() {
        let snap = snapshot();
        assert_eq!(snap.team_by_name("godlike"), Some(TeamId(10)));
        assert_eq!(snap.team_by_name("TSM ENTITY"), Some(TeamId(11)));
        assert_eq!(snap.team_by_name("Unknown"), None);
    }

    #[test]
    fn test_duplicate_team_name_keeps_first_slot() {
        let snap = RosterSnapshot::from_parts(
            LobbyId(1),
            vec![team(10, "Phoenix", 1), team(11, "phoenix", 2)],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(snap.team_by_name("PHOENIX"), Some(TeamId(10)));
    }

    #[test]
    fn test_membership_keeps_latest_registration() {
        let snap = RosterSnapshot::from_parts(
            LobbyId(1),
            vec![team(10, "GodLike", 1), team(11, "TSM Entity", 2)],
            vec![row(10, 100, "Omega"), row(11, 100, "Omega")],
            Vec::new(),
        );
        assert_eq!(snap.lobby_team_of(PlayerId(100)), Some(TeamId(11)));
    }

    #[test]
    fn test_directory_lookup_case_insensitive() {
        let snap = snapshot();
        assert_eq!(snap.player_by_ign("lonewolf"), Some(PlayerId(102)));
        assert_eq!(snap.player_by_ign("LONEWOLF"), Some(PlayerId(102)));
        assert_eq!(snap.player_by_ign("Lone_Wolf"), None);
    }

    #[test]
    fn test_team_scoped_alias_is_exact() {
        let snap = snapshot();
        assert_eq!(
            snap.player_by_team_ign(TeamId(10), "GodLike_Omega"),
            Some(PlayerId(100))
        );
        // case folds, but nothing else does: a dropped underscore misses
        assert_eq!(
            snap.player_by_team_ign(TeamId(10), "godlike_omega"),
            Some(PlayerId(100))
        );
        assert_eq!(snap.player_by_team_ign(TeamId(10), "GodLikeOmega"), None);
        // wrong team scope
        assert_eq!(snap.player_by_team_ign(TeamId(11), "GodLike_Omega"), None);
    }
}
