//! Drives one connect attempt from session creation to a terminal outcome.
//!
//! ```text
//! Creating -> AwaitingReady -> Connecting -> AwaitingStatus -> Succeeded
//!                  ^    |            |              |
//!                  |    +------------+--> Negotiating
//!                  +---------------------------+
//! ```
//!
//! Any failure or cancellation after the session exists goes through
//! cleanup, which disconnects the session.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};

use super::cancel::CancelFlag;
use super::log_capture::LogCapture;
use super::negotiator::{negotiate, NegotiationError};
use super::poller::{poll, PollOutcome, PollSettings};
use crate::backend::{Backend, FaultKind};
use crate::constants;
use crate::state::{CredentialField, OfferedCredentials, ProfileRef, SessionHandle, StatusSnapshot};

/// Step of the connect handshake currently running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectPhase {
    #[default]
    Creating,
    AwaitingReady,
    Connecting,
    Negotiating,
    AwaitingStatus,
    CleaningUp,
}

impl fmt::Display for ConnectPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Creating => "Creating session",
            Self::AwaitingReady => "Waiting for backend",
            Self::Connecting => "Starting connection",
            Self::Negotiating => "Sending credentials",
            Self::AwaitingStatus => "Waiting for server",
            Self::CleaningUp => "Cleaning up",
        })
    }
}

/// Something the UI should know about while the attempt runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    Phase(ConnectPhase),
    SessionCreated(SessionHandle),
    Note(String),
}

/// Receives progress reports.
pub trait ProgressSink {
    fn report(&self, progress: Progress);
}

impl<F: Fn(Progress)> ProgressSink for F {
    fn report(&self, progress: Progress) {
        self(progress);
    }
}

/// Timing of the handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectSettings {
    /// Status queries made while a new session settles.
    pub settle_attempts: u32,
    pub settle_interval: Duration,
    /// Delay before retrying after a "not ready" fault.
    pub ready_retry: Duration,
    /// Wait before disconnecting a failed session.
    pub log_flush: Duration,
    pub poll: PollSettings,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            settle_attempts: constants::DEFAULT_SETTLE_ATTEMPTS,
            settle_interval: constants::DEFAULT_SETTLE_INTERVAL,
            ready_retry: constants::DEFAULT_READY_RETRY,
            log_flush: constants::DEFAULT_LOG_FLUSH,
            poll: PollSettings::default(),
        }
    }
}

/// Why an attempt failed.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ConnectFailure {
    CredentialInvalidOrAbsent(CredentialField),
    AuthenticationFailed { message: String },
    ConnectionFailed { message: String },
    Timeout {
        deadline: Duration,
        last: Option<StatusSnapshot>,
    },
}

impl ConnectFailure {
    /// Short heading for toasts and dialogs.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::CredentialInvalidOrAbsent(_) => "Missing credentials",
            Self::AuthenticationFailed { .. } => "Authentication failed",
            Self::ConnectionFailed { .. } => "Connection failed",
            Self::Timeout { .. } => "Connection timed out",
        }
    }
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialInvalidOrAbsent(field) => {
                write!(f, "{field} is required, but it was not provided.")
            }
            Self::AuthenticationFailed { message } | Self::ConnectionFailed { message } => {
                f.write_str(message)
            }
            Self::Timeout { deadline, last } => {
                write!(f, "No connection after {}s", deadline.as_secs())?;
                match last {
                    Some(status) => write!(f, " (last status {status})"),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Terminal result of an attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    Succeeded,
    Failed(ConnectFailure),
    Cancelled,
}

impl ConnectOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Human-readable one-liner.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Succeeded => "Connected".to_string(),
            Self::Failed(failure) => format!("{}: {failure}", failure.title()),
            Self::Cancelled => "Connection cancelled".to_string(),
        }
    }
}

/// A failed session could not be torn down. The process should stop:
/// the backend may be holding a half-open tunnel.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("could not disconnect session {session}: {message}")]
pub struct FatalBackendFault {
    pub session: SessionHandle,
    pub message: String,
}

pub struct Orchestrator<'a, B: Backend + ?Sized> {
    backend: &'a B,
    settings: ConnectSettings,
    cancel: CancelFlag,
    log_capture: Option<LogCapture>,
}

impl<'a, B: Backend + ?Sized> Orchestrator<'a, B> {
    pub fn new(backend: &'a B, settings: ConnectSettings, cancel: CancelFlag) -> Self {
        Self {
            backend,
            settings,
            cancel,
            log_capture: None,
        }
    }

    #[must_use]
    pub fn with_log_capture(mut self, capture: Option<LogCapture>) -> Self {
        self.log_capture = capture;
        self
    }

    /// Runs one attempt for `profile`.
    ///
    /// Only a failed cleanup is returned as `Err`; every other problem is a
    /// [`ConnectOutcome::Failed`].
    pub async fn connect(
        &self,
        profile: &ProfileRef,
        offered: &OfferedCredentials,
        sink: &impl ProgressSink,
    ) -> Result<ConnectOutcome, FatalBackendFault> {
        if self.cancel.is_cancelled() {
            return Ok(ConnectOutcome::Cancelled);
        }

        sink.report(Progress::Phase(ConnectPhase::Creating));
        let session = match self.backend.new_tunnel(&profile.handle).await {
            Ok(session) => session,
            Err(fault) => {
                tracing::warn!(profile = %profile.name, error = %fault, "session creation failed");
                return Ok(ConnectOutcome::Failed(ConnectFailure::ConnectionFailed {
                    message: fault.message,
                }));
            }
        };
        tracing::info!(profile = %profile.name, session = %session, "session created");
        sink.report(Progress::SessionCreated(session.clone()));

        self.settle(&session).await;
        if !self.cancel.is_cancelled() {
            self.start_log_capture(&session, sink);
        }

        let outcome = self.establish(&session, offered, sink).await;
        tracing::info!(profile = %profile.name, outcome = ?outcome, "connect attempt finished");
        if !outcome.is_success() {
            self.clean_up(&session, sink).await?;
        }
        Ok(outcome)
    }

    /// Gives a fresh session object a moment to answer status queries.
    async fn settle(&self, session: &SessionHandle) {
        for attempt in 1..=self.settings.settle_attempts {
            if self.cancel.is_cancelled() {
                return;
            }
            match self.backend.status(session).await {
                Ok(status) => {
                    tracing::debug!(attempt, status = %status, "session settled");
                    return;
                }
                Err(fault) => tracing::debug!(attempt, error = %fault, "session not settled"),
            }
            sleep(self.settings.settle_interval).await;
        }
        tracing::debug!(session = %session, "settle attempts exhausted, continuing");
    }

    fn start_log_capture(&self, session: &SessionHandle, sink: &impl ProgressSink) {
        let Some(capture) = &self.log_capture else {
            return;
        };
        match capture.spawn(session) {
            Ok(_child) => sink.report(Progress::Note(format!(
                "Session log: {}",
                capture.file().display()
            ))),
            Err(e) => tracing::warn!(error = %e, "could not start log capture"),
        }
    }

    async fn establish(
        &self,
        session: &SessionHandle,
        offered: &OfferedCredentials,
        sink: &impl ProgressSink,
    ) -> ConnectOutcome {
        let mut waited_for_backend = false;
        loop {
            if self.cancel.is_cancelled() {
                return ConnectOutcome::Cancelled;
            }

            sink.report(Progress::Phase(ConnectPhase::AwaitingReady));
            let attempt = match self.backend.ready(session).await {
                Ok(()) => {
                    sink.report(Progress::Phase(ConnectPhase::Connecting));
                    self.backend.connect(session).await
                }
                Err(fault) => Err(fault),
            };
            let Err(fault) = attempt else {
                break;
            };

            match fault.kind() {
                FaultKind::NotReady => {
                    if !waited_for_backend {
                        sink.report(Progress::Note("Backend is starting up".to_string()));
                        waited_for_backend = true;
                    }
                    tracing::debug!(error = %fault, "backend not ready, retrying");
                    sleep(self.settings.ready_retry).await;
                }
                FaultKind::CredentialsMissing => {
                    sink.report(Progress::Phase(ConnectPhase::Negotiating));
                    match negotiate(self.backend, session, offered).await {
                        Ok(()) => sink.report(Progress::Note("Credentials sent".to_string())),
                        Err(NegotiationError::Missing(field)) => {
                            return ConnectOutcome::Failed(
                                ConnectFailure::CredentialInvalidOrAbsent(field),
                            )
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "credential negotiation failed");
                            return ConnectOutcome::Failed(ConnectFailure::ConnectionFailed {
                                message: err.to_string(),
                            });
                        }
                    }
                }
                FaultKind::Other => {
                    return ConnectOutcome::Failed(ConnectFailure::ConnectionFailed {
                        message: fault.message,
                    })
                }
            }
        }

        sink.report(Progress::Phase(ConnectPhase::AwaitingStatus));
        match poll(self.backend, session, &self.settings.poll, &self.cancel).await {
            PollOutcome::Connected => ConnectOutcome::Succeeded,
            PollOutcome::Failed(message) => {
                ConnectOutcome::Failed(ConnectFailure::ConnectionFailed { message })
            }
            PollOutcome::AuthFailed(message) => {
                ConnectOutcome::Failed(ConnectFailure::AuthenticationFailed { message })
            }
            PollOutcome::TimedOut(last) => ConnectOutcome::Failed(ConnectFailure::Timeout {
                deadline: self.settings.poll.deadline,
                last,
            }),
            PollOutcome::Cancelled => ConnectOutcome::Cancelled,
        }
    }

    async fn clean_up(
        &self,
        session: &SessionHandle,
        sink: &impl ProgressSink,
    ) -> Result<(), FatalBackendFault> {
        sink.report(Progress::Phase(ConnectPhase::CleaningUp));
        // Let the log capture pick up the final lines first
        self.flush_wait().await;

        self.backend.disconnect(session).await.map_err(|fault| {
            tracing::error!(session = %session, error = %fault, "cleanup disconnect failed");
            FatalBackendFault {
                session: session.clone(),
                message: fault.message,
            }
        })?;
        tracing::info!(session = %session, "session disconnected after failed attempt");
        Ok(())
    }

    /// Sleeps `log_flush` in poll ticks. A cancel raised during the wait
    /// cuts it short; one that was already set does not.
    async fn flush_wait(&self) {
        let interruptible = !self.cancel.is_cancelled();
        let deadline = Instant::now() + self.settings.log_flush;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            if interruptible && self.cancel.is_cancelled() {
                tracing::debug!("log flush wait cut short");
                return;
            }
            sleep(self.settings.poll.tick.min(deadline - now)).await;
        }
    }
}
