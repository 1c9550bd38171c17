//! In-process store backed by a single `RwLock`.
//!
//! Serves as both `ResultStore` and `RosterProvider`, which makes it the
//! default backend for tests and for single-process deployments where the
//! roster and the results live in the same place.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{CoreError, CoreResult};
use crate::roster::{DirectoryPlayer, RosterProvider, RosterRow};
use crate::types::{
    GuildId, Lobby, LobbyId, LobbyState, Match, MatchId, MatchResult, PlayerId, Team, TeamId,
};

#[derive(Default)]
struct State {
    next_id: i64,
    lobbies: FxHashMap<LobbyId, Lobby>,
    teams: FxHashMap<TeamId, Team>,
    matches: FxHashMap<MatchId, Match>,
    results: FxHashMap<MatchId, Vec<MatchResult>>,
    roster: Vec<RosterRow>,
    players: Vec<DirectoryPlayer>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Reference store. All operations complete synchronously under one lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::ResultStore for MemoryStore {
    async fn create_lobby(
        &self,
        guild_id: GuildId,
        name: &str,
        max_teams: u32,
    ) -> CoreResult<Lobby> {
        let mut state = self.inner.write();
        let lobby = Lobby {
            id: LobbyId(state.next_id()),
            guild_id,
            name: name.to_string(),
            max_teams,
            state: LobbyState::Active,
        };
        state.lobbies.insert(lobby.id, lobby.clone());
        Ok(lobby)
    }

    async fn get_lobby(&self, lobby_id: LobbyId) -> CoreResult<Option<Lobby>> {
        Ok(self.inner.read().lobbies.get(&lobby_id).cloned())
    }

    async fn close_lobby(&self, lobby_id: LobbyId) -> CoreResult<()> {
        let mut state = self.inner.write();
        match state.lobbies.get_mut(&lobby_id) {
            Some(lobby) => {
                lobby.state = LobbyState::Completed;
                Ok(())
            }
            None => Err(CoreError::LobbyNotFound(lobby_id)),
        }
    }

    async fn create_team(&self, lobby_id: LobbyId, name: &str, slot_no: u32) -> CoreResult<TeamId> {
        let mut state = self.inner.write();
        if !state.lobbies.contains_key(&lobby_id) {
            return Err(CoreError::LobbyNotFound(lobby_id));
        }
        let team = Team {
            id: TeamId(state.next_id()),
            lobby_id,
            name: name.to_string(),
            slot_no,
        };
        let id = team.id;
        state.teams.insert(id, team);
        Ok(id)
    }

    async fn add_team_player(
        &self,
        team_id: TeamId,
        player_id: PlayerId,
        ign: &str,
    ) -> CoreResult<()> {
        let mut state = self.inner.write();
        if !state.teams.contains_key(&team_id) {
            return Err(CoreError::TeamNotFound(team_id));
        }
        state.roster.push(RosterRow {
            team_id,
            player_id,
            ign: ign.to_string(),
        });
        // directory upsert: the latest ign wins
        match state.players.iter_mut().find(|p| p.player_id == player_id) {
            Some(existing) => existing.ign = ign.to_string(),
            None => state.players.push(DirectoryPlayer {
                player_id,
                ign: ign.to_string(),
            }),
        }
        Ok(())
    }

    async fn create_match(
        &self,
        guild_id: GuildId,
        lobby_id: LobbyId,
        match_no: u32,
    ) -> CoreResult<MatchId> {
        let mut state = self.inner.write();
        match state.lobbies.get(&lobby_id) {
            None => return Err(CoreError::LobbyNotFound(lobby_id)),
            Some(lobby) if lobby.state == LobbyState::Completed => {
                log::warn!(
                    "recording match {} into completed lobby {}",
                    match_no,
                    lobby_id
                );
            }
            Some(_) => {}
        }
        let m = Match {
            id: MatchId(state.next_id()),
            guild_id,
            lobby_id,
            match_no,
            created_at: Utc::now(),
        };
        let id = m.id;
        state.matches.insert(id, m);
        Ok(id)
    }

    async fn get_match(&self, match_id: MatchId) -> CoreResult<Option<Match>> {
        Ok(self.inner.read().matches.get(&match_id).cloned())
    }

    async fn matches_in_lobby(&self, lobby_id: LobbyId) -> CoreResult<Vec<Match>> {
        let state = self.inner.read();
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.lobby_id == lobby_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.match_no);
        Ok(matches)
    }

    async fn insert_results(&self, match_id: MatchId, results: &[MatchResult]) -> CoreResult<()> {
        let mut state = self.inner.write();
        if !state.matches.contains_key(&match_id) {
            return Err(CoreError::MatchNotFound(match_id));
        }
        state
            .results
            .entry(match_id)
            .or_default()
            .extend_from_slice(results);
        Ok(())
    }

    async fn delete_results(&self, match_id: MatchId) -> CoreResult<()> {
        self.inner.write().results.remove(&match_id);
        Ok(())
    }

    async fn read_results(&self, match_id: MatchId) -> CoreResult<Vec<MatchResult>> {
        Ok(self
            .inner
            .read()
            .results
            .get(&match_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl RosterProvider for MemoryStore {
    async fn teams_in_lobby(&self, lobby_id: LobbyId) -> CoreResult<Vec<Team>> {
        let state = self.inner.read();
        let mut teams: Vec<Team> = state
            .teams
            .values()
            .filter(|t| t.lobby_id == lobby_id)
            .cloned()
            .collect();
        teams.sort_by_key(|t| t.slot_no);
        Ok(teams)
    }

    async fn lobby_roster(&self, lobby_id: LobbyId) -> CoreResult<Vec<RosterRow>> {
        let state = self.inner.read();
        Ok(state
            .roster
            .iter()
            .filter(|row| {
                state
                    .teams
                    .get(&row.team_id)
                    .map(|t| t.lobby_id == lobby_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn all_players(&self) -> CoreResult<Vec<DirectoryPlayer>> {
        Ok(self.inner.read().players.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResultStore;

    fn result(match_id: MatchId, team: i64, ign: &str, kills: i32, position: i32) -> MatchResult {
        MatchResult {
            match_id,
            team_id: TeamId(team),
            ign: ign.to_string(),
            player_id: None,
            kills,
            position,
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let store = MemoryStore::new();
        let lobby = store.create_lobby(GuildId(1), "weekly", 12).await.unwrap();
        let t1 = store.create_team(lobby.id, "Alpha", 1).await.unwrap();
        let t2 = store.create_team(lobby.id, "Bravo", 2).await.unwrap();
        assert!(t1.0 > lobby.id.0);
        assert!(t2.0 > t1.0);
    }

    #[tokio::test]
    async fn test_replace_results_keeps_only_last_set() {
        let store = MemoryStore::new();
        let lobby = store.create_lobby(GuildId(1), "weekly", 12).await.unwrap();
        let match_id = store.create_match(GuildId(1), lobby.id, 1).await.unwrap();

        store
            .insert_results(
                match_id,
                &[
                    result(match_id, 10, "a", 5, 1),
                    result(match_id, 11, "b", 2, 2),
                ],
            )
            .await
            .unwrap();
        store
            .replace_results(match_id, &[result(match_id, 10, "a", 6, 1)])
            .await
            .unwrap();

        let rows = store.read_results(match_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kills, 6);
        assert_eq!(rows[0].match_id, match_id);
    }

    #[tokio::test]
    async fn test_create_match_never_deduplicates() {
        let store = MemoryStore::new();
        let lobby = store.create_lobby(GuildId(1), "weekly", 12).await.unwrap();
        let m1 = store.create_match(GuildId(1), lobby.id, 3).await.unwrap();
        let m2 = store.create_match(GuildId(1), lobby.id, 3).await.unwrap();
        assert_ne!(m1, m2);
        assert_eq!(store.matches_in_lobby(lobby.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_matches_ordered_by_match_no() {
        let store = MemoryStore::new();
        let lobby = store.create_lobby(GuildId(1), "weekly", 12).await.unwrap();
        store.create_match(GuildId(1), lobby.id, 2).await.unwrap();
        store.create_match(GuildId(1), lobby.id, 1).await.unwrap();
        store.create_match(GuildId(1), lobby.id, 3).await.unwrap();
        let order: Vec<u32> = store
            .matches_in_lobby(lobby.id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.match_no)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_close_lobby_is_idempotent_and_keeps_writes_open() {
        let store = MemoryStore::new();
        let lobby = store.create_lobby(GuildId(1), "weekly", 12).await.unwrap();
        store.close_lobby(lobby.id).await.unwrap();
        store.close_lobby(lobby.id).await.unwrap();
        let stored = store.get_lobby(lobby.id).await.unwrap().unwrap();
        assert_eq!(stored.state, LobbyState::Completed);
        // late corrections still record matches after completion
        assert!(store.create_match(GuildId(1), lobby.id, 9).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_parents_are_errors() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.create_team(LobbyId(99), "ghost", 1).await,
            Err(CoreError::LobbyNotFound(_))
        ));
        assert!(matches!(
            store.add_team_player(TeamId(99), PlayerId(1), "x").await,
            Err(CoreError::TeamNotFound(_))
        ));
        assert!(matches!(
            store.insert_results(MatchId(99), &[]).await,
            Err(CoreError::MatchNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_roster_upserts_directory() {
        let store = MemoryStore::new();
        let lobby = store.create_lobby(GuildId(1), "weekly", 12).await.unwrap();
        let team = store.create_team(lobby.id, "Alpha", 1).await.unwrap();
        store
            .add_team_player(team, PlayerId(7), "OldName")
            .await
            .unwrap();
        store
            .add_team_player(team, PlayerId(7), "NewName")
            .await
            .unwrap();

        let players = store.all_players().await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].ign, "NewName");
        // roster keeps both registrations, directory keeps one entry
        assert_eq!(store.lobby_roster(lobby.id).await.unwrap().len(), 2);
    }
}
