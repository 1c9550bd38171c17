//! Validation and correction of raw extraction rows.
//!
//! The extractor is trusted to find the scoreboard but not to read it
//! cleanly: it mis-captures column headers as player rows, truncates names,
//! and hallucinates kill counts. Everything recoverable is corrected in
//! place; only rows with no usable name are dropped.

use crate::config::{KILLS_MAX, KILLS_MIN, MIN_IGN_LEN};
use crate::types::RawEntry;

/// Column-header fragments the extractor sometimes emits as a player row.
const HEADER_ARTIFACTS: [&str; 2] = ["Eliminations", "Kills"];

/// Filter and correct raw rows. Pure and idempotent.
///
/// - Rows whose name is missing or shorter than 2 characters are dropped.
/// - Rows whose name contains a column-header fragment are dropped.
/// - Kill counts outside the plausible `[0, 60]` range are zeroed, not
///   rejected.
/// - Output is stably sorted by `(position ascending, kills descending)`,
///   the canonical presentation order for everything downstream.
pub fn sanitize(mut entries: Vec<RawEntry>) -> Vec<RawEntry> {
    entries.retain(|e| {
        e.ign.chars().count() >= MIN_IGN_LEN
            && !HEADER_ARTIFACTS.iter().any(|h| e.ign.contains(h))
    });

    for entry in &mut entries {
        if entry.kills < KILLS_MIN || entry.kills > KILLS_MAX {
            entry.kills = 0;
        }
    }

    entries.sort_by(|a, b| a.position.cmp(&b.position).then(b.kills.cmp(&a.kills)));
    entries
}
