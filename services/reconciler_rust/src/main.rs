//! Reconciler Service (Rust)
//!
//! Batch runner over exported scoreboards:
//! - Builds a lobby and its teams from a pasted slot list
//! - Optionally seeds team rosters from a JSON file
//! - Reconciles one scoreboard file per match and persists it
//! - Prints standings, optionally finalizing the lobby

use std::collections::HashMap;
use std::env;
use std::fs;

use anyhow::{Context, Result};
use booyah_rust_core::config::{MatcherConfig, ScoringConfig};
use booyah_rust_core::roster::RosterSnapshot;
use booyah_rust_core::scoring::{aggregate_standings, finalize_lobby};
use booyah_rust_core::slots::{max_slot, parse_slot_list};
use booyah_rust_core::store::{MemoryStore, ResultStore};
use booyah_rust_core::submission::Submission;
use booyah_rust_core::{GuildId, PlayerId, RawEntry, TeamId};
use dotenv::dotenv;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================
// Configuration
// ============================================================

struct Config {
    guild_id: i64,
    lobby_name: String,
    slots_file: String,
    results_files: Vec<String>,
    roster_file: Option<String>,
    finalize: bool,
}

impl Config {
    fn from_env() -> Self {
        let results_files = env::var("RESULTS_FILES")
            .unwrap_or_else(|_| "results.json".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            guild_id: env::var("GUILD_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            lobby_name: env::var("LOBBY_NAME").unwrap_or_else(|_| "weekly customs".to_string()),
            slots_file: env::var("SLOTS_FILE").unwrap_or_else(|_| "slots.txt".to_string()),
            results_files,
            roster_file: env::var("ROSTER_FILE").ok(),
            finalize: env::var("FINALIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

/// One roster seed row: the slot the player belongs to and their alias.
#[derive(Debug, Deserialize)]
struct RosterSeed {
    slot: u32,
    player_id: i64,
    ign: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Reconciler Service...");

    let config = Config::from_env();
    let guild_id = GuildId(config.guild_id);
    let matcher_cfg = MatcherConfig::from_env_with_defaults(MatcherConfig::default());
    let scoring_cfg = ScoringConfig::from_env_with_defaults(ScoringConfig::default());

    let store = MemoryStore::new();

    // ============================================================
    // Lobby setup
    // ============================================================

    let slots_text = fs::read_to_string(&config.slots_file)
        .with_context(|| format!("failed to read slot list {}", config.slots_file))?;
    let slots = parse_slot_list(&slots_text);
    if slots.is_empty() {
        anyhow::bail!("slot list {} contains no teams", config.slots_file);
    }

    let lobby = store
        .create_lobby(guild_id, &config.lobby_name, max_slot(&slots))
        .await?;
    let mut team_by_slot: HashMap<u32, TeamId> = HashMap::new();
    for slot in &slots {
        let team_id = store
            .create_team(lobby.id, &slot.team_name, slot.slot_no)
            .await?;
        team_by_slot.insert(slot.slot_no, team_id);
    }
    info!("lobby {} created with {} teams", lobby.id, slots.len());

    if let Some(path) = &config.roster_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read roster file {}", path))?;
        let seeds: Vec<RosterSeed> = serde_json::from_str(&text)
            .with_context(|| format!("invalid roster JSON in {}", path))?;
        for seed in seeds {
            match team_by_slot.get(&seed.slot) {
                Some(&team_id) => {
                    store
                        .add_team_player(team_id, PlayerId(seed.player_id), &seed.ign)
                        .await?
                }
                None => warn!("roster row '{}' names unknown slot {}", seed.ign, seed.slot),
            }
        }
    }

    // ============================================================
    // Reconcile one scoreboard per match
    // ============================================================

    for (index, path) in config.results_files.iter().enumerate() {
        let match_no = index as u32 + 1;
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scoreboard {}", path))?;
        let raw: Vec<RawEntry> = serde_json::from_str(&text)
            .with_context(|| format!("invalid scoreboard JSON in {}", path))?;

        let roster = RosterSnapshot::fetch(&store, lobby.id).await?;
        let submission = Submission::prepare(guild_id, match_no, raw, &roster, &matcher_cfg)?;
        for entry in submission.entries() {
            info!(
                "match {} pos {:>2} {:<20} kills {:>2} [{:?}]",
                match_no, entry.position, entry.ign, entry.kills, entry.source
            );
        }
        let outcome = submission.confirm(&store).await?;
        info!(
            "match {} persisted as {} ({} rows, {} skipped)",
            match_no, outcome.match_id, outcome.persisted, outcome.skipped
        );
    }

    // ============================================================
    // Standings
    // ============================================================

    let standings = if config.finalize {
        finalize_lobby(&store, lobby.id, &scoring_cfg).await?
    } else {
        aggregate_standings(&store, lobby.id, &scoring_cfg).await?
    };
    for (rank, row) in standings.iter().enumerate() {
        info!(
            "#{:<2} {:<20} {:>3} pts ({} booyahs, {} kills, {} matches)",
            rank + 1,
            row.team_name,
            row.total_points,
            row.booyahs,
            row.total_kills,
            row.matches_played
        );
    }

    Ok(())
}
