//! Non-interactive subcommands.

use std::io::Write;

use color_eyre::eyre::{eyre, Result};

use super::args::Commands;
use crate::backend::Backend;
use crate::constants;
use crate::core::{importer, sessions};
use crate::state::ConnectionRecord;

/// Runs `command` against `backend`, printing results to `out`.
pub async fn run<B: Backend + ?Sized>(
    backend: &B,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::List => list(backend, out).await,
        Commands::Import { file, name } => import(backend, &file, name.as_deref(), out).await,
        Commands::Remove { name } => remove(backend, &name, out).await,
        Commands::Disconnect { name } => disconnect(backend, name.as_deref(), out).await,
    }
}

async fn list<B: Backend + ?Sized>(backend: &B, out: &mut impl Write) -> Result<()> {
    let records = sessions::load_records(backend).await?;
    if records.is_empty() {
        writeln!(out, "{}", constants::CLI_MSG_NO_PROFILES)?;
        return Ok(());
    }

    let width = records.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for record in &records {
        let state = match (&record.session, record.is_synthetic()) {
            (Some(session), true) => format!("{session} (stale)"),
            (Some(session), false) => session.to_string(),
            (None, _) => "-".to_string(),
        };
        writeln!(out, "{:<width$}  {state}", record.name)?;
    }
    Ok(())
}

async fn import<B: Backend + ?Sized>(
    backend: &B,
    file: &str,
    name: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let source = importer::read_profile(file, name).map_err(|e| eyre!(e))?;
    let handle = backend
        .import_profile(&source.name, &source.contents)
        .await?;
    tracing::info!(name = %source.name, handle = %handle, "profile imported");

    writeln!(out, "{}{}", constants::CLI_MSG_IMPORT_SUCCESS, source.name)?;
    writeln!(out, "{}{handle}", constants::CLI_MSG_IMPORT_DETAILS_PATH)?;
    Ok(())
}

fn find<'a>(records: &'a [ConnectionRecord], name: &str) -> Result<&'a ConnectionRecord> {
    records
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| eyre!("{}{name}", constants::CLI_MSG_UNKNOWN_PROFILE))
}

async fn remove<B: Backend + ?Sized>(backend: &B, name: &str, out: &mut impl Write) -> Result<()> {
    let records = sessions::load_records(backend).await?;
    let record = records
        .iter()
        .find(|r| r.name == name && !r.is_synthetic())
        .ok_or_else(|| eyre!("{}{name}", constants::CLI_MSG_UNKNOWN_PROFILE))?;

    if sessions::disconnect_session(backend, record.session.as_ref()).await? {
        if let Some(session) = &record.session {
            writeln!(out, "{}{session}", constants::CLI_MSG_DISCONNECTED)?;
        }
    }
    if let Some(profile) = &record.profile {
        backend.remove_profile(&profile.handle).await?;
    }
    writeln!(out, "{}{name}", constants::CLI_MSG_REMOVED)?;
    Ok(())
}

async fn disconnect<B: Backend + ?Sized>(
    backend: &B,
    name: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let disconnected = match name {
        Some(name) => {
            let records = sessions::load_records(backend).await?;
            let record = find(&records, name)?;
            match &record.session {
                Some(session) => {
                    sessions::disconnect_session(backend, Some(session)).await?;
                    vec![session.clone()]
                }
                None => Vec::new(),
            }
        }
        None => sessions::disconnect_all(backend).await?,
    };

    if disconnected.is_empty() {
        writeln!(out, "{}", constants::CLI_MSG_NO_SESSIONS)?;
    }
    for session in disconnected {
        writeln!(out, "{}{session}", constants::CLI_MSG_DISCONNECTED)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{profile, Call, MockBackend};
    use crate::state::{SessionHandle, SessionRef};

    fn with_session(backend: &MockBackend, name: &str, path: &str) {
        backend.sessions.borrow_mut().push(SessionRef {
            handle: SessionHandle::new(path),
            profile_handle: profile(name).handle,
            profile_name: name.to_string(),
        });
    }

    async fn output(backend: &MockBackend, command: Commands) -> Result<String> {
        let mut out = Vec::new();
        run(backend, command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_list() {
        let backend = MockBackend::new();
        backend.profiles.borrow_mut().extend([profile("Office-VPN"), profile("Lab")]);
        with_session(&backend, "Lab", "/net/openvpn/v3/sessions/s1");
        with_session(&backend, "Gone", "/net/openvpn/v3/sessions/s2");

        let text = output(&backend, Commands::List).await.unwrap();
        assert_eq!(
            text,
            "Office-VPN  -\n\
             Lab         /net/openvpn/v3/sessions/s1\n\
             Gone        /net/openvpn/v3/sessions/s2 (stale)\n"
        );
    }

    #[tokio::test]
    async fn test_list_empty() {
        let text = output(&MockBackend::new(), Commands::List).await.unwrap();
        assert_eq!(text.trim(), constants::CLI_MSG_NO_PROFILES);
    }

    #[tokio::test]
    async fn test_import() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("client.ovpn");
        std::fs::write(&path, "remote vpn.example.com 1194\n").unwrap();
        let backend = MockBackend::new();

        let text = output(
            &backend,
            Commands::Import {
                file: path.to_str().unwrap().to_string(),
                name: Some("Office-VPN".to_string()),
            },
        )
        .await
        .unwrap();
        assert!(text.starts_with("Imported profile: Office-VPN\n"));
        assert_eq!(backend.count(&Call::Import("Office-VPN".to_string())), 1);
    }

    #[tokio::test]
    async fn test_remove_disconnects_first() {
        let backend = MockBackend::new();
        backend.profiles.borrow_mut().push(profile("Lab"));
        with_session(&backend, "Lab", "/net/openvpn/v3/sessions/s1");

        output(&backend, Commands::Remove { name: "Lab".to_string() })
            .await
            .unwrap();
        let calls = backend.calls();
        let disconnect = calls
            .iter()
            .position(|c| matches!(c, Call::Disconnect(_)))
            .unwrap();
        let remove = calls.iter().position(|c| matches!(c, Call::Remove(_))).unwrap();
        assert!(disconnect < remove);
        assert!(backend.profiles.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_profile() {
        let err = output(&MockBackend::new(), Commands::Remove { name: "Nope".to_string() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No profile named Nope");
    }

    #[tokio::test]
    async fn test_disconnect_all_and_none_left() {
        let backend = MockBackend::new();
        with_session(&backend, "Lab", "/net/openvpn/v3/sessions/s1");

        let text = output(&backend, Commands::Disconnect { name: None }).await.unwrap();
        assert_eq!(text, "Disconnected session: /net/openvpn/v3/sessions/s1\n");

        let text = output(&backend, Commands::Disconnect { name: None }).await.unwrap();
        assert_eq!(text.trim(), constants::CLI_MSG_NO_SESSIONS);
    }

    #[tokio::test]
    async fn test_disconnect_named_profile() {
        let backend = MockBackend::new();
        backend.profiles.borrow_mut().extend([profile("Office-VPN"), profile("Lab")]);
        with_session(&backend, "Office-VPN", "/net/openvpn/v3/sessions/s1");
        with_session(&backend, "Lab", "/net/openvpn/v3/sessions/s2");

        output(&backend, Commands::Disconnect { name: Some("Lab".to_string()) })
            .await
            .unwrap();
        let remaining = backend.sessions.borrow();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].profile_name, "Office-VPN");
    }
}
