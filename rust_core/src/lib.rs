//! Booyah Rust Core - Scoreboard Reconciliation and Scoring
//!
//! This module provides:
//! - Sanitization of noisy AI-extracted scoreboard rows
//! - Tiered identity resolution against a lobby roster snapshot
//! - Positional majority-vote team inference for unresolved rows
//! - Replace-on-edit result storage with placement and kill scoring
//!
//! The pipeline is deliberately split: `reconcile` is pure and side-effect
//! free, `submission` owns the decision latch and the store writes, and
//! `scoring` reads whatever the store holds. Nothing here talks to Discord
//! or to an extractor; callers hand in `RawEntry` rows however they got
//! them.

pub mod config;
pub mod error;
pub mod inference;
pub mod matching;
pub mod normalize;
pub mod resolver;
pub mod roster;
pub mod sanitize;
pub mod scoring;
pub mod slots;
pub mod store;
pub mod submission;

mod types;

pub use error::{CoreError, CoreResult};
pub use types::*;

use config::MatcherConfig;
use resolver::Resolver;
use roster::RosterSnapshot;

/// Run the pure reconciliation pipeline: sanitize, resolve, infer.
///
/// No ids are allocated and no store is touched, so this is also the call
/// for previewing what a submission would persist.
pub fn reconcile(
    raw: Vec<RawEntry>,
    roster: &RosterSnapshot,
    cfg: &MatcherConfig,
) -> Vec<ResolvedEntry> {
    let cleaned = sanitize::sanitize(raw);
    let resolved = Resolver::new(roster, cfg).resolve_all(&cleaned);
    inference::infer_teams(resolved)
}
