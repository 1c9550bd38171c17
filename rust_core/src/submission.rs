//! Submission lifecycle: prepare in memory, decide once, persist.
//!
//! This module provides:
//! - `Submission`: a reconciled scoreboard awaiting a reviewer decision
//! - `PersistOutcome`: what a confirmation or replacement actually wrote
//! - free functions for editing a match that was already persisted
//!
//! Preparation runs the full reconciliation pipeline up front, so by the
//! time a reviewer sees the entries there is nothing left to compute;
//! confirmation only converts rows and writes them. The decision itself is
//! a single-fire latch: exactly one confirm or reject wins, every later
//! attempt reports the state that beat it.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MatcherConfig;
use crate::error::{CoreError, CoreResult};
use crate::roster::RosterSnapshot;
use crate::store::ResultStore;
use crate::types::{GuildId, LobbyId, MatchId, MatchResult, RawEntry, ResolvedEntry};

const STATE_PENDING: u8 = 0;
const STATE_CONFIRMED: u8 = 1;
const STATE_REJECTED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubmissionState {
    Pending,
    Confirmed,
    Rejected,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Pending => write!(f, "pending"),
            SubmissionState::Confirmed => write!(f, "confirmed"),
            SubmissionState::Rejected => write!(f, "rejected"),
        }
    }
}

fn state_from(raw: u8) -> SubmissionState {
    match raw {
        STATE_CONFIRMED => SubmissionState::Confirmed,
        STATE_REJECTED => SubmissionState::Rejected,
        _ => SubmissionState::Pending,
    }
}

/// What a write to the store produced.
///
/// `skipped` counts rows that still had no team after inference; those are
/// never persisted, only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub match_id: MatchId,
    pub persisted: usize,
    pub skipped: usize,
}

/// A reconciled scoreboard waiting for its one decision.
#[derive(Debug)]
pub struct Submission {
    id: Uuid,
    guild_id: GuildId,
    lobby_id: LobbyId,
    match_no: u32,
    entries: Mutex<Vec<ResolvedEntry>>,
    state: AtomicU8,
    edits: AtomicU32,
}

impl Submission {
    /// Sanitize, resolve, and infer in memory. Fails fast with
    /// `EmptySubmission` when sanitization leaves no rows, before any id
    /// is allocated or any store call is made.
    pub fn prepare(
        guild_id: GuildId,
        match_no: u32,
        raw: Vec<RawEntry>,
        roster: &RosterSnapshot,
        cfg: &MatcherConfig,
    ) -> CoreResult<Self> {
        let entries = crate::reconcile(raw, roster, cfg);
        if entries.is_empty() {
            return Err(CoreError::EmptySubmission);
        }
        let submission = Self {
            id: Uuid::new_v4(),
            guild_id,
            lobby_id: roster.lobby_id(),
            match_no,
            entries: Mutex::new(entries),
            state: AtomicU8::new(STATE_PENDING),
            edits: AtomicU32::new(0),
        };
        debug!(
            "submission {} prepared for lobby {} match {}",
            submission.id, submission.lobby_id, submission.match_no
        );
        Ok(submission)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lobby_id(&self) -> LobbyId {
        self.lobby_id
    }

    pub fn match_no(&self) -> u32 {
        self.match_no
    }

    pub fn state(&self) -> SubmissionState {
        state_from(self.state.load(Ordering::SeqCst))
    }

    pub fn edit_count(&self) -> u32 {
        self.edits.load(Ordering::SeqCst)
    }

    /// Snapshot of the current entries, for review rendering.
    pub fn entries(&self) -> Vec<ResolvedEntry> {
        self.entries.lock().clone()
    }

    fn try_decide(&self, to: u8) -> CoreResult<()> {
        self.state
            .compare_exchange(STATE_PENDING, to, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|held| CoreError::AlreadyDecided(state_from(held)))
    }

    /// Consume the latch and persist: record the match, then insert every
    /// entry that carries a team. The latch is consumed even when the
    /// store fails, so a broken write cannot be retried into a duplicate
    /// match; callers recover by preparing a fresh submission.
    pub async fn confirm<S: ResultStore + ?Sized>(&self, store: &S) -> CoreResult<PersistOutcome> {
        self.try_decide(STATE_CONFIRMED)?;
        let entries = self.entries.lock().clone();
        let match_id = store
            .create_match(self.guild_id, self.lobby_id, self.match_no)
            .await?;
        let (rows, skipped) = to_match_results(match_id, &entries);
        store.insert_results(match_id, &rows).await?;
        info!(
            "submission {} confirmed as match {}: {} rows persisted, {} skipped",
            self.id,
            match_id,
            rows.len(),
            skipped
        );
        Ok(PersistOutcome {
            match_id,
            persisted: rows.len(),
            skipped,
        })
    }

    /// Consume the latch without writing anything.
    pub fn reject(&self) -> CoreResult<()> {
        self.try_decide(STATE_REJECTED)?;
        info!("submission {} rejected", self.id);
        Ok(())
    }

    /// Replace one position group while still pending. Returns the new
    /// revision number. Replacement rows are forced onto the edited
    /// position regardless of what they claim.
    ///
    /// The state check runs outside the entries lock; an edit racing a
    /// confirm either lands before the snapshot or is dropped.
    pub fn edit_position_group(
        &self,
        position: i32,
        replacement: Vec<ResolvedEntry>,
    ) -> CoreResult<u32> {
        let state = self.state();
        if state != SubmissionState::Pending {
            return Err(CoreError::AlreadyDecided(state));
        }
        let mut entries = self.entries.lock();
        let current = std::mem::take(&mut *entries);
        *entries = override_position_group(current, position, replacement);
        let revision = self.edits.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "submission {} revision {}: position {} group replaced",
            self.id, revision, position
        );
        Ok(revision)
    }
}

/// Swap out every entry at `position` for the replacement rows, which are
/// stamped with that position.
pub fn override_position_group(
    mut entries: Vec<ResolvedEntry>,
    position: i32,
    replacement: Vec<ResolvedEntry>,
) -> Vec<ResolvedEntry> {
    entries.retain(|e| e.position != position);
    for mut entry in replacement {
        entry.position = position;
        entries.push(entry);
    }
    entries
}

/// Load a persisted match back into editable entries.
pub async fn load_for_edit<S: ResultStore + ?Sized>(
    store: &S,
    match_id: MatchId,
) -> CoreResult<Vec<ResolvedEntry>> {
    store
        .get_match(match_id)
        .await?
        .ok_or(CoreError::MatchNotFound(match_id))?;
    let rows = store.read_results(match_id).await?;
    Ok(rows.iter().map(ResolvedEntry::from_stored).collect())
}

/// Persist an edited result set over an existing match. The match id is
/// preserved; only the rows are swapped.
pub async fn replace_match_results<S: ResultStore + ?Sized>(
    store: &S,
    match_id: MatchId,
    entries: &[ResolvedEntry],
) -> CoreResult<PersistOutcome> {
    store
        .get_match(match_id)
        .await?
        .ok_or(CoreError::MatchNotFound(match_id))?;
    let (rows, skipped) = to_match_results(match_id, entries);
    store.replace_results(match_id, &rows).await?;
    info!(
        "match {} rewritten: {} rows persisted, {} skipped",
        match_id,
        rows.len(),
        skipped
    );
    Ok(PersistOutcome {
        match_id,
        persisted: rows.len(),
        skipped,
    })
}

fn to_match_results(match_id: MatchId, entries: &[ResolvedEntry]) -> (Vec<MatchResult>, usize) {
    let mut rows = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for entry in entries {
        match entry.team_id {
            Some(team_id) => rows.push(MatchResult {
                match_id,
                team_id,
                ign: entry.ign.clone(),
                player_id: entry.player_id,
                kills: entry.kills,
                position: entry.position,
            }),
            None => {
                skipped += 1;
                warn!("'{}' has no team after inference; row not persisted", entry.ign);
            }
        }
    }
    (rows, skipped)
}
