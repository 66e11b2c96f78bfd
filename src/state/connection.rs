//! Connect attempt state as seen by the UI.

use std::time::Instant;

use crate::core::cancel::CancelFlag;
use crate::core::orchestrator::ConnectPhase;
use crate::state::SessionHandle;

/// Whether a connect attempt is running.
///
/// Established sessions are not tracked here: the backend's session list is
/// the source of truth and is re-read on every refresh.
#[derive(Clone, Debug, Default)]
pub enum ConnectionState {
    /// No connect attempt in flight.
    #[default]
    Idle,
    /// Orchestrator task running.
    Connecting {
        /// When the attempt started.
        started: Instant,
        /// Name of the profile being connected.
        profile: String,
        /// Last phase reported by the orchestrator.
        phase: ConnectPhase,
        /// Session object, once the backend created one.
        session: Option<SessionHandle>,
        /// Set by the user to abort the attempt.
        cancel: CancelFlag,
    },
}

impl ConnectionState {
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting { .. })
    }

    /// Profile name of the running attempt, if any.
    #[must_use]
    pub fn connecting_profile(&self) -> Option<&str> {
        match self {
            Self::Connecting { profile, .. } => Some(profile),
            Self::Idle => None,
        }
    }
}
