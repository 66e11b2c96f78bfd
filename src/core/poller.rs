//! Waits for a session to reach a terminal connection state.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use super::cancel::CancelFlag;
use crate::backend::Backend;
use crate::constants;
use crate::state::{SessionHandle, StatusSnapshot};

/// Cadence and deadline of a status wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Give up after this long without a terminal state.
    pub deadline: Duration,
    /// Wake-up interval; the cancel flag is checked on every tick.
    pub tick: Duration,
    /// At most one status query per interval.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            deadline: constants::DEFAULT_STATUS_DEADLINE,
            tick: constants::DEFAULT_POLL_TICK,
            interval: constants::DEFAULT_STATUS_INTERVAL,
        }
    }
}

/// How a status wait ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Connected,
    /// Backend reported CONN_FAILED, or the status query itself faulted.
    Failed(String),
    AuthFailed(String),
    /// Deadline passed; carries the last status seen, if any.
    TimedOut(Option<StatusSnapshot>),
    Cancelled,
}

/// Polls `session` until it connects, fails, the deadline passes, or
/// `cancel` is set.
///
/// Only queries the backend; never changes session state.
pub async fn poll<B: Backend + ?Sized>(
    backend: &B,
    session: &SessionHandle,
    settings: &PollSettings,
    cancel: &CancelFlag,
) -> PollOutcome {
    let started = Instant::now();
    let mut last_query: Option<Instant> = None;
    let mut last_seen: Option<StatusSnapshot> = None;

    loop {
        if cancel.is_cancelled() {
            tracing::info!(session = %session, "status wait cancelled");
            return PollOutcome::Cancelled;
        }
        if started.elapsed() >= settings.deadline {
            tracing::warn!(
                session = %session,
                last = ?last_seen,
                "no terminal status before deadline"
            );
            return PollOutcome::TimedOut(last_seen);
        }

        if last_query.is_none_or(|at| at.elapsed() >= settings.interval) {
            last_query = Some(Instant::now());
            match backend.status(session).await {
                Ok(snapshot) if snapshot.is_connected() => return PollOutcome::Connected,
                Ok(snapshot) if snapshot.is_failed() => {
                    return PollOutcome::Failed(snapshot.message)
                }
                Ok(snapshot) if snapshot.is_auth_failed() => {
                    return PollOutcome::AuthFailed(snapshot.message)
                }
                Ok(snapshot) => {
                    tracing::debug!(session = %session, status = %snapshot, "waiting");
                    last_seen = Some(snapshot);
                }
                Err(fault) => return PollOutcome::Failed(fault.message),
            }
        }

        sleep(settings.tick).await;
    }
}
