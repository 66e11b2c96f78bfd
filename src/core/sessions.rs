//! Session housekeeping shared by the TUI and the CLI.

use crate::backend::{Backend, BackendFault};
use crate::constants;
use crate::state::{describe_status, join_records, ConnectionRecord, SessionHandle};

/// Reads profiles and sessions and joins them into display records.
pub async fn load_records<B: Backend + ?Sized>(
    backend: &B,
) -> Result<Vec<ConnectionRecord>, BackendFault> {
    let profiles = backend.list_profiles().await?;
    let sessions = backend.list_sessions().await?;
    Ok(join_records(&profiles, &sessions))
}

/// Disconnects sessions left half-open by an earlier run: anything in the
/// connection group that is not connected.
///
/// Sessions whose status cannot be read or that refuse to disconnect are
/// skipped. Returns the sessions that were disconnected.
pub async fn kill_lingering<B: Backend + ?Sized>(
    backend: &B,
) -> Result<Vec<SessionHandle>, BackendFault> {
    let mut killed = Vec::new();
    for session in backend.list_sessions().await? {
        let status = match backend.status(&session.handle).await {
            Ok(status) => status,
            Err(fault) => {
                tracing::debug!(session = %session.handle, error = %fault, "status unavailable");
                continue;
            }
        };
        if !status.is_lingering() {
            continue;
        }
        tracing::info!(session = %session.handle, status = %status, "killing lingering session");
        match backend.disconnect(&session.handle).await {
            Ok(()) => killed.push(session.handle),
            Err(fault) => {
                tracing::warn!(session = %session.handle, error = %fault, "could not kill session");
            }
        }
    }
    Ok(killed)
}

/// Disconnects every session the backend knows about.
pub async fn disconnect_all<B: Backend + ?Sized>(
    backend: &B,
) -> Result<Vec<SessionHandle>, BackendFault> {
    let mut disconnected = Vec::new();
    for session in backend.list_sessions().await? {
        backend.disconnect(&session.handle).await?;
        tracing::info!(session = %session.handle, "session disconnected");
        disconnected.push(session.handle);
    }
    Ok(disconnected)
}

/// Disconnects `session` if there is one. Returns whether a call was made.
pub async fn disconnect_session<B: Backend + ?Sized>(
    backend: &B,
    session: Option<&SessionHandle>,
) -> Result<bool, BackendFault> {
    let Some(session) = session else {
        return Ok(false);
    };
    backend.disconnect(session).await?;
    tracing::info!(session = %session, "session disconnected");
    Ok(true)
}

/// One-line summary for the status bar, taken from the first record that
/// has a session.
pub async fn status_line<B: Backend + ?Sized>(
    backend: &B,
    records: &[ConnectionRecord],
) -> Result<String, BackendFault> {
    let Some(session) = records.iter().find_map(|r| r.session.as_ref()) else {
        return Ok(constants::MSG_DISCONNECTED.to_string());
    };
    let status = backend.status(session).await?;
    let name = if status.is_connected() {
        backend.session_name(session).await?
    } else {
        String::new()
    };
    Ok(describe_status(&status, &name))
}
