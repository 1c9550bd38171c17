//! Core domain types for scoreboard reconciliation.
//!
//! Raw extraction rows arrive as loosely-typed JSON from the upstream
//! extractor. All coercion happens once, at deserialization, so everything
//! downstream of the sanitizer works with strict types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DEFAULT_POSITION;

// ============================================================================
// Identifiers
// ============================================================================

/// Discord guild (server) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(pub i64);

/// Lobby identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(pub i64);

/// Registered team identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

/// Player (Discord account) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

/// Match identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub i64);

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Lobby & teams
// ============================================================================

/// Lobby lifecycle. `Completed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LobbyState {
    Active,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lobby {
    pub id: LobbyId,
    pub guild_id: GuildId,
    pub name: String,
    pub max_teams: u32,
    pub state: LobbyState,
}

/// A team registered into a lobby slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub lobby_id: LobbyId,
    pub name: String,
    pub slot_no: u32,
}

// ============================================================================
// Extraction rows
// ============================================================================

/// One scoreboard row as extracted from a screenshot. Untrusted input:
/// numeric fields may arrive as strings, floats, or garbage, and the name
/// may be a mis-captured column header. Duplicate rows are expected and
/// preserved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default, deserialize_with = "lenient::ign")]
    pub ign: String,
    #[serde(default, deserialize_with = "lenient::kills")]
    pub kills: i32,
    #[serde(default = "default_position", deserialize_with = "lenient::position")]
    pub position: i32,
    /// Team-name string as it appeared on the scoreboard, if any.
    #[serde(default, deserialize_with = "lenient::team_name")]
    pub team_name: Option<String>,
}

fn default_position() -> i32 {
    DEFAULT_POSITION
}

impl RawEntry {
    pub fn new(ign: impl Into<String>, kills: i32, position: i32) -> Self {
        Self {
            ign: ign.into(),
            kills,
            position,
            team_name: None,
        }
    }

    pub fn with_team(
        ign: impl Into<String>,
        kills: i32,
        position: i32,
        team: impl Into<String>,
    ) -> Self {
        Self {
            ign: ign.into(),
            kills,
            position,
            team_name: Some(team.into()),
        }
    }
}

/// Which tier of the resolution cascade produced a team binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Team-name hint matched a team name exactly.
    TeamExact,
    /// Team-name hint matched a team name fuzzily.
    TeamFuzzy,
    /// IGN matched a roster alias case-insensitively.
    IgnExact,
    /// IGN matched a roster alias after loose normalization.
    IgnLoose,
    /// IGN matched a roster alias after strict normalization.
    IgnStrict,
    /// IGN matched a roster alias fuzzily.
    IgnFuzzy,
    /// IGN matched the cross-lobby player directory.
    GlobalDirectory,
    /// Team back-filled by positional majority vote.
    PositionMajority,
    /// Row loaded back from the store for editing.
    Stored,
    /// No tier matched.
    Unresolved,
}

/// A raw entry after identity resolution. `None` identities are a valid
/// terminal state, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub ign: String,
    pub kills: i32,
    pub position: i32,
    /// Raw team-name hint, carried through for audit.
    pub team_name: Option<String>,
    pub team_id: Option<TeamId>,
    pub player_id: Option<PlayerId>,
    pub source: ResolutionSource,
}

impl ResolvedEntry {
    /// Wrap a sanitized entry with no identity bound yet.
    pub fn unresolved(entry: &RawEntry) -> Self {
        Self {
            ign: entry.ign.clone(),
            kills: entry.kills,
            position: entry.position,
            team_name: entry.team_name.clone(),
            team_id: None,
            player_id: None,
            source: ResolutionSource::Unresolved,
        }
    }

    /// Rebuild an entry from a persisted result row (edit workflow).
    pub fn from_stored(result: &MatchResult) -> Self {
        Self {
            ign: result.ign.clone(),
            kills: result.kills,
            position: result.position,
            team_name: None,
            team_id: Some(result.team_id),
            player_id: result.player_id,
            source: ResolutionSource::Stored,
        }
    }
}

// ============================================================================
// Persisted records
// ============================================================================

/// One recorded match within a lobby. Identity is immutable once created;
/// its result rows can be wholly replaced but the match itself survives edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub guild_id: GuildId,
    pub lobby_id: LobbyId,
    pub match_no: u32,
    pub created_at: DateTime<Utc>,
}

/// One canonical player row within a match. Only entries with a resolved
/// team are ever persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub team_id: TeamId,
    pub ign: String,
    pub player_id: Option<PlayerId>,
    pub kills: i32,
    pub position: i32,
}

/// Derived standings row, recomputed on every aggregation call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_name: String,
    pub matches_played: u32,
    pub booyahs: u32,
    pub total_kills: i64,
    pub placement_points: i64,
    pub total_points: i64,
}

// ============================================================================
// Lenient deserialization
// ============================================================================

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::config::{DEFAULT_KILLS, DEFAULT_POSITION};

    /// Integer coercion matching the extractor contract: accept numbers
    /// (floats truncate) and numeric strings, refuse everything else.
    fn coerce_int(value: &Value) -> Option<i32> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(|i| i32::try_from(i).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        }
    }

    pub fn kills<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(coerce_int(&value).unwrap_or(DEFAULT_KILLS))
    }

    pub fn position<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(coerce_int(&value).unwrap_or(DEFAULT_POSITION))
    }

    pub fn ign<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn team_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_strings_coerce() {
        let entry: RawEntry =
            serde_json::from_str(r#"{"ign": "Ninja", "kills": "7", "position": "2"}"#).unwrap();
        assert_eq!(entry.kills, 7);
        assert_eq!(entry.position, 2);
    }

    #[test]
    fn test_garbage_numerics_take_defaults() {
        let entry: RawEntry =
            serde_json::from_str(r#"{"ign": "Ninja", "kills": "N/A", "position": null}"#).unwrap();
        assert_eq!(entry.kills, 0);
        assert_eq!(entry.position, 99);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let entry: RawEntry = serde_json::from_str(r#"{"ign": "Ninja"}"#).unwrap();
        assert_eq!(entry.kills, 0);
        assert_eq!(entry.position, 99);
        assert_eq!(entry.team_name, None);
    }

    #[test]
    fn test_float_truncates() {
        let entry: RawEntry =
            serde_json::from_str(r#"{"ign": "Ninja", "kills": 6.9, "position": 2.1}"#).unwrap();
        assert_eq!(entry.kills, 6);
        assert_eq!(entry.position, 2);
    }

    #[test]
    fn test_numeric_ign_becomes_string() {
        let entry: RawEntry = serde_json::from_str(r#"{"ign": 404, "kills": 1}"#).unwrap();
        assert_eq!(entry.ign, "404");
    }

    #[test]
    fn test_missing_ign_is_empty() {
        let entry: RawEntry = serde_json::from_str(r#"{"kills": 3, "position": 1}"#).unwrap();
        assert_eq!(entry.ign, "");
    }

    #[test]
    fn test_empty_team_hint_is_none() {
        let entry: RawEntry =
            serde_json::from_str(r#"{"ign": "Ninja", "team_name": ""}"#).unwrap();
        assert_eq!(entry.team_name, None);

        let entry: RawEntry =
            serde_json::from_str(r#"{"ign": "Ninja", "team_name": "TSM"}"#).unwrap();
        assert_eq!(entry.team_name.as_deref(), Some("TSM"));
    }

    #[test]
    fn test_full_row_roundtrip() {
        let entry = RawEntry::with_team("GodLike_Omega", 9, 1, "GodLike");
        let json = serde_json::to_string(&entry).unwrap();
        let back: RawEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
