//! Tiered identity resolution against a roster snapshot.
//!
//! Resolution proceeds in strict priority order and the first successful
//! tier wins:
//!
//! 1. team-name hint, exact (case-insensitive)
//! 2. team-name hint, fuzzy
//! 3. IGN vs lobby aliases, exact (case-insensitive)
//! 4. IGN vs lobby aliases, loose-normalized
//! 5. IGN vs lobby aliases, strict-normalized
//! 6. IGN vs lobby aliases, fuzzy
//! 7. IGN vs the cross-lobby directory (exact through fuzzy), then that
//!    player's membership in this lobby, if any
//! 8. exact alias recovery scoped to the resolved team, to attach a player
//!    identity without re-running the cascade
//!
//! Resolution never fails. Entries that clear no tier keep `None`
//! identities, which team inference and the write step handle explicitly.

use tracing::debug;

use crate::config::MatcherConfig;
use crate::matching::best_fuzzy_match;
use crate::normalize::{normalize_loose, normalize_strict};
use crate::roster::RosterSnapshot;
use crate::types::{PlayerId, RawEntry, ResolutionSource, ResolvedEntry, TeamId};

pub struct Resolver<'a> {
    roster: &'a RosterSnapshot,
    cfg: &'a MatcherConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(roster: &'a RosterSnapshot, cfg: &'a MatcherConfig) -> Self {
        Self { roster, cfg }
    }

    /// Resolve every entry independently against the fixed snapshot.
    pub fn resolve_all(&self, entries: &[RawEntry]) -> Vec<ResolvedEntry> {
        entries.iter().map(|entry| self.resolve(entry)).collect()
    }

    /// Resolve one entry.
    pub fn resolve(&self, entry: &RawEntry) -> ResolvedEntry {
        let mut resolved = ResolvedEntry::unresolved(entry);

        // Tiers 1-2: the team-name string printed on the scoreboard.
        if let Some(hint) = entry.team_name.as_deref() {
            if let Some(team_id) = self.roster.team_by_name(hint) {
                resolved.team_id = Some(team_id);
                resolved.source = ResolutionSource::TeamExact;
                debug!("'{}': team hint '{}' is exact -> team {}", entry.ign, hint, team_id);
            } else {
                let candidates = self.roster.teams().iter().map(|t| (t.name.as_str(), t.id));
                if let Some((team_id, score)) =
                    best_fuzzy_match(hint, candidates, self.cfg.team_cutoff, self.cfg)
                {
                    resolved.team_id = Some(team_id);
                    resolved.source = ResolutionSource::TeamFuzzy;
                    debug!(
                        "'{}': team hint '{}' fuzzy-matched team {} (score {:.2})",
                        entry.ign, hint, team_id, score
                    );
                }
            }
        }

        // Tiers 3-6: the IGN against this lobby's aliases.
        if resolved.team_id.is_none() {
            if let Some((team_id, source)) = self.match_lobby_alias(&entry.ign) {
                resolved.team_id = Some(team_id);
                resolved.source = source;
                debug!("'{}': alias tier {:?} -> team {}", entry.ign, source, team_id);
            }
        }

        // Tier 7: the cross-lobby directory. A hit binds the player even if
        // they have no team in this lobby.
        if resolved.team_id.is_none() {
            if let Some(player_id) = self.match_directory(&entry.ign) {
                resolved.player_id = Some(player_id);
                resolved.source = ResolutionSource::GlobalDirectory;
                resolved.team_id = self.roster.lobby_team_of(player_id);
                debug!(
                    "'{}': directory player {} (lobby team: {:?})",
                    entry.ign, player_id, resolved.team_id
                );
            }
        }

        // Tier 8: the team is known but the player is not. One exact
        // team-scoped lookup recovers the linked identity.
        if let (Some(team_id), None) = (resolved.team_id, resolved.player_id) {
            if let Some(player_id) = self.roster.player_by_team_ign(team_id, &entry.ign) {
                resolved.player_id = Some(player_id);
                debug!("'{}': recovered player {} within team {}", entry.ign, player_id, team_id);
            }
        }

        if resolved.team_id.is_none() && resolved.player_id.is_none() {
            debug!("'{}': unresolved", entry.ign);
        }

        resolved
    }

    /// Tiers 3-6 over the lobby roster, in registration order.
    fn match_lobby_alias(&self, ign: &str) -> Option<(TeamId, ResolutionSource)> {
        let lower = ign.to_lowercase();
        for row in self.roster.roster_rows() {
            if row.ign.to_lowercase() == lower {
                return Some((row.team_id, ResolutionSource::IgnExact));
            }
        }

        let loose = normalize_loose(ign);
        if !loose.is_empty() {
            for row in self.roster.roster_rows() {
                if normalize_loose(&row.ign) == loose {
                    return Some((row.team_id, ResolutionSource::IgnLoose));
                }
            }
        }

        let strict = normalize_strict(ign);
        if !strict.is_empty() {
            for row in self.roster.roster_rows() {
                if normalize_strict(&row.ign) == strict {
                    return Some((row.team_id, ResolutionSource::IgnStrict));
                }
            }
        }

        let candidates = self
            .roster
            .roster_rows()
            .iter()
            .map(|row| (row.ign.as_str(), row.team_id));
        best_fuzzy_match(ign, candidates, self.cfg.player_cutoff, self.cfg)
            .map(|(team_id, _)| (team_id, ResolutionSource::IgnFuzzy))
    }

    /// Tier 7's inner ladder: exact, loose, strict, then fuzzy over the
    /// whole directory.
    fn match_directory(&self, ign: &str) -> Option<PlayerId> {
        if let Some(player_id) = self.roster.player_by_ign(ign) {
            return Some(player_id);
        }

        let loose = normalize_loose(ign);
        if !loose.is_empty() {
            for player in self.roster.directory() {
                if normalize_loose(&player.ign) == loose {
                    return Some(player.player_id);
                }
            }
        }

        let strict = normalize_strict(ign);
        if !strict.is_empty() {
            for player in self.roster.directory() {
                if normalize_strict(&player.ign) == strict {
                    return Some(player.player_id);
                }
            }
        }

        let candidates = self
            .roster
            .directory()
            .iter()
            .map(|player| (player.ign.as_str(), player.player_id));
        best_fuzzy_match(ign, candidates, self.cfg.player_cutoff, self.cfg)
            .map(|(player_id, _)| player_id)
    }
}
