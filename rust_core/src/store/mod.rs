//! Persistence seam for lobbies, teams, matches, and match results.
//!
//! This module provides:
//! - `ResultStore`: the async storage trait the pipeline writes through
//! - `MemoryStore`: the in-process reference implementation
//!
//! Match results follow replace-on-edit semantics: a match's result set is
//! only ever swapped wholesale, never patched row by row.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{GuildId, Lobby, LobbyId, Match, MatchId, MatchResult, PlayerId, TeamId};

pub mod memory;

pub use memory::MemoryStore;

/// Storage operations used by reconciliation and scoring.
///
/// Implementations must hand out ids that are unique within the store and
/// must keep `matches_in_lobby` ordered by match number.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Create a lobby in the `ACTIVE` state.
    async fn create_lobby(
        &self,
        guild_id: GuildId,
        name: &str,
        max_teams: u32,
    ) -> CoreResult<Lobby>;

    async fn get_lobby(&self, lobby_id: LobbyId) -> CoreResult<Option<Lobby>>;

    /// Transition a lobby to `COMPLETED`. Idempotent.
    async fn close_lobby(&self, lobby_id: LobbyId) -> CoreResult<()>;

    /// Register a team in a lobby slot.
    async fn create_team(&self, lobby_id: LobbyId, name: &str, slot_no: u32) -> CoreResult<TeamId>;

    /// Attach a player to a team roster under the given in-game name.
    /// Re-adding an existing player updates their directory entry.
    async fn add_team_player(
        &self,
        team_id: TeamId,
        player_id: PlayerId,
        ign: &str,
    ) -> CoreResult<()>;

    /// Record a new match. Never deduplicates: calling twice with the same
    /// match number creates two distinct matches.
    async fn create_match(
        &self,
        guild_id: GuildId,
        lobby_id: LobbyId,
        match_no: u32,
    ) -> CoreResult<MatchId>;

    async fn get_match(&self, match_id: MatchId) -> CoreResult<Option<Match>>;

    /// All matches recorded for a lobby, ordered by match number.
    async fn matches_in_lobby(&self, lobby_id: LobbyId) -> CoreResult<Vec<Match>>;

    async fn insert_results(&self, match_id: MatchId, results: &[MatchResult]) -> CoreResult<()>;

    /// Remove every result row attached to a match. Removing from a match
    /// with no rows is a no-op.
    async fn delete_results(&self, match_id: MatchId) -> CoreResult<()>;

    async fn read_results(&self, match_id: MatchId) -> CoreResult<Vec<MatchResult>>;

    /// Swap a match's result set: delete everything, then insert the new
    /// rows. Runs as two sequential operations with no rollback; a failure
    /// after the delete leaves the match empty and surfaces the error.
    /// Concurrent rewrites of one match are not arbitrated: the last
    /// replacement wins.
    async fn replace_results(&self, match_id: MatchId, results: &[MatchResult]) -> CoreResult<()> {
        self.delete_results(match_id).await?;
        self.insert_results(match_id, results).await
    }
}
