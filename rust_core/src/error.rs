//! Error taxonomy for the reconciliation core.
//!
//! Malformed input fields never surface here; they are coerced to defaults
//! at the deserialization boundary. Unresolved identities are not errors
//! either. What remains is the fatal set: missing collaborators, store
//! failures, and latch violations.

use thiserror::Error;

use crate::submission::SubmissionState;
use crate::types::{LobbyId, MatchId, TeamId};

#[derive(Debug, Error)]
pub enum CoreError {
    /// The roster snapshot could not be built; resolution cannot start.
    #[error("roster unavailable for lobby {lobby_id}")]
    RosterUnavailable {
        lobby_id: LobbyId,
        #[source]
        source: Box<CoreError>,
    },

    /// A persistence call failed. `op` names the store call so the
    /// presentation layer can say which step broke.
    #[error("store call `{op}` failed: {message}")]
    Store { op: &'static str, message: String },

    #[error("lobby {0} not found")]
    LobbyNotFound(LobbyId),

    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    #[error("team {0} not found")]
    TeamNotFound(TeamId),

    /// Sanitization left nothing to reconcile.
    #[error("no usable scoreboard rows after sanitization")]
    EmptySubmission,

    /// The single-fire confirmation latch was already consumed.
    #[error("submission already {0}")]
    AlreadyDecided(SubmissionState),
}

pub type CoreResult<T> = Result<T, CoreError>;
