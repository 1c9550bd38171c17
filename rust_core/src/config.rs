//! Reconciliation and scoring configuration.
//!
//! This module provides:
//! - Named constants for the sanitizer's plausibility bounds and defaults
//! - Fuzzy-matcher thresholds with environment overrides
//! - The placement points table and kill point multiplier

use std::env;

/// Kill counts below this are implausible and zeroed by the sanitizer.
pub const KILLS_MIN: i32 = 0;
/// Kill counts above this are implausible for one match and zeroed.
pub const KILLS_MAX: i32 = 60;
/// Names shorter than this are dropped as extraction noise.
pub const MIN_IGN_LEN: usize = 2;
/// Fallback when an extracted kill count cannot be coerced to an integer.
pub const DEFAULT_KILLS: i32 = 0;
/// Fallback when an extracted placement cannot be coerced to an integer.
pub const DEFAULT_POSITION: i32 = 99;

/// Thresholds for the tiered identity matcher.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum similarity for a team-name fuzzy match.
    pub team_cutoff: f64,
    /// Minimum similarity for a player-IGN fuzzy match.
    pub player_cutoff: f64,
    /// Score floor applied when one normalized string contains the other.
    pub containment_floor: f64,
    /// Queries whose strict-normalized form is shorter than this are refused.
    pub min_query_len: usize,
    /// Candidates whose strict-normalized form is shorter than this are skipped.
    pub min_candidate_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            team_cutoff: 0.70,
            player_cutoff: 0.80,
            containment_floor: 0.90,
            min_query_len: 3,
            min_candidate_len: 4,
        }
    }
}

impl MatcherConfig {
    /// Create config from environment variables with fallback to provided defaults.
    pub fn from_env_with_defaults(defaults: Self) -> Self {
        Self {
            team_cutoff: env::var("TEAM_MATCH_CUTOFF")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.team_cutoff),
            player_cutoff: env::var("PLAYER_MATCH_CUTOFF")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.player_cutoff),
            containment_floor: env::var("SUBSTRING_BOOST_FLOOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.containment_floor),
            min_query_len: env::var("FUZZY_MIN_QUERY_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_query_len),
            min_candidate_len: env::var("FUZZY_MIN_CANDIDATE_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_candidate_len),
        }
    }
}

/// Points policy for standings aggregation.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Points awarded per placement, indexed by `position - 1`.
    /// Positions past the end of the table score zero.
    pub placement_table: Vec<i64>,
    /// Points awarded per kill.
    pub kill_point_value: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            placement_table: vec![12, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0],
            kill_point_value: 1,
        }
    }
}

impl ScoringConfig {
    /// Create config from environment variables with fallback to provided defaults.
    pub fn from_env_with_defaults(defaults: Self) -> Self {
        Self {
            kill_point_value: env::var("KILL_POINT_VALUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.kill_point_value),
            placement_table: defaults.placement_table,
        }
    }

    /// Points for a canonical team placement. Positions outside the table,
    /// including the sanitizer's `99` fallback, score zero.
    pub fn placement_points(&self, position: i32) -> i64 {
        if position < 1 {
            return 0;
        }
        self.placement_table
            .get(position as usize - 1)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let cfg = MatcherConfig::default();
        assert_eq!(cfg.team_cutoff, 0.70);
        assert_eq!(cfg.player_cutoff, 0.80);
        assert_eq!(cfg.containment_floor, 0.90);
        assert_eq!(cfg.min_query_len, 3);
        assert_eq!(cfg.min_candidate_len, 4);
    }

    #[test]
    fn test_placement_table() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.placement_points(1), 12);
        assert_eq!(cfg.placement_points(2), 9);
        assert_eq!(cfg.placement_points(10), 1);
        assert_eq!(cfg.placement_points(11), 0);
        assert_eq!(cfg.placement_points(12), 0);
    }

    #[test]
    fn test_placement_outside_table_scores_zero() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.placement_points(13), 0);
        assert_eq!(cfg.placement_points(99), 0);
        assert_eq!(cfg.placement_points(0), 0);
        assert_eq!(cfg.placement_points(-4), 0);
    }
}
