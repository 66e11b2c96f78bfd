//! Session backend interface.
//!
//! [`Backend`] is the whole surface this program needs from the VPN service.
//! [`dbus::DbusBackend`] implements it against openvpn3-linux; tests use
//! the scripted `mock::MockBackend`.

pub mod dbus;
#[cfg(test)]
pub mod mock;

use thiserror::Error;

use crate::constants;
use crate::state::{InputSlot, ProfileHandle, ProfileRef, SessionHandle, SessionRef, StatusSnapshot};

/// A fault raised by the backend in reply to a call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendFault {
    /// Error name, when the transport supplies one.
    pub name: Option<String>,
    pub message: String,
}

impl BackendFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }

    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FaultKind {
        classify_fault(self)
    }
}

/// How the connect loop reacts to a fault from Ready/Connect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// Backend process still starting; retry later.
    NotReady,
    /// User input is pending; negotiate credentials.
    CredentialsMissing,
    /// Anything else is terminal.
    Other,
}

/// Classifies a fault by its text.
///
/// openvpn3 reports both conditions through the same error name, so the
/// message is the only discriminator. Keep every string match here.
#[must_use]
pub fn classify_fault(fault: &BackendFault) -> FaultKind {
    if fault.message.contains(constants::FAULT_MISSING_CREDENTIALS) {
        FaultKind::CredentialsMissing
    } else if fault
        .message
        .to_lowercase()
        .contains(constants::FAULT_NOT_READY)
    {
        FaultKind::NotReady
    } else {
        FaultKind::Other
    }
}

/// Operations exposed by the VPN session service.
///
/// Calls against one session are expected to be issued sequentially.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn list_profiles(&self) -> Result<Vec<ProfileRef>, BackendFault>;

    async fn list_sessions(&self) -> Result<Vec<SessionRef>, BackendFault>;

    async fn status(&self, session: &SessionHandle) -> Result<StatusSnapshot, BackendFault>;

    /// Display name of a session (usually the remote host).
    async fn session_name(&self, session: &SessionHandle) -> Result<String, BackendFault>;

    /// Creates a new session for `profile`. The session is not connected yet.
    async fn new_tunnel(&self, profile: &ProfileHandle) -> Result<SessionHandle, BackendFault>;

    /// Fails with a fault while the backend cannot connect yet.
    async fn ready(&self, session: &SessionHandle) -> Result<(), BackendFault>;

    async fn connect(&self, session: &SessionHandle) -> Result<(), BackendFault>;

    /// Pending input slots across all attention groups.
    async fn input_slots(&self, session: &SessionHandle) -> Result<Vec<InputSlot>, BackendFault>;

    async fn provide_input(
        &self,
        session: &SessionHandle,
        slot: &InputSlot,
        value: &str,
    ) -> Result<(), BackendFault>;

    async fn disconnect(&self, session: &SessionHandle) -> Result<(), BackendFault>;

    /// Imports raw profile text under `name` as a persistent configuration.
    async fn import_profile(&self, name: &str, contents: &str)
        -> Result<ProfileHandle, BackendFault>;

    async fn remove_profile(&self, profile: &ProfileHandle) -> Result<(), BackendFault>;
}
