//! Profile, session and record types.

use std::fmt;

/// Backend object path of an imported configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileHandle(String);

/// Backend object path of a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(String);

macro_rules! impl_handle {
    ($name:ident) => {
        impl $name {
            pub fn new(path: impl Into<String>) -> Self {
                Self(path.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

impl_handle!(ProfileHandle);
impl_handle!(SessionHandle);

/// An importable VPN configuration known to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileRef {
    /// Display name, unique per backend.
    pub name: String,
    pub handle: ProfileHandle,
}

/// A live or pending session.
///
/// The profile it was started from may have been removed since, in which
/// case `profile_handle` no longer matches any [`ProfileRef`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRef {
    pub handle: SessionHandle,
    pub profile_handle: ProfileHandle,
    /// Profile name as recorded by the session at creation time.
    pub profile_name: String,
}

/// One row of the UI: a profile joined with at most one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub name: String,
    /// `None` for a synthetic record wrapping a stale or surplus session.
    pub profile: Option<ProfileRef>,
    pub session: Option<SessionHandle>,
}

impl ConnectionRecord {
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.profile.is_none()
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}

/// Joins profiles and sessions into display records.
///
/// Profiles keep backend order. The first session pointing at a profile is
/// attached to it; every other session becomes a synthetic record appended
/// after the profiles.
#[must_use]
pub fn join_records(profiles: &[ProfileRef], sessions: &[SessionRef]) -> Vec<ConnectionRecord> {
    let mut records: Vec<ConnectionRecord> = profiles
        .iter()
        .map(|profile| ConnectionRecord {
            name: profile.name.clone(),
            profile: Some(profile.clone()),
            session: None,
        })
        .collect();
    let profile_count = records.len();

    for session in sessions {
        let slot = records[..profile_count].iter_mut().find(|record| {
            record
                .profile
                .as_ref()
                .is_some_and(|p| p.handle == session.profile_handle)
        });

        match slot {
            Some(record) if record.session.is_none() => {
                record.session = Some(session.handle.clone());
            }
            _ => {
                tracing::debug!(
                    session = %session.handle,
                    profile = %session.profile_name,
                    "attaching stale session"
                );
                records.push(ConnectionRecord {
                    name: session.profile_name.clone(),
                    profile: None,
                    session: Some(session.handle.clone()),
                });
            }
        }
    }

    records
}
