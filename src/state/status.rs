//! Session status codes as reported by the openvpn3 session manager.

use std::fmt;

/// Major status group.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum StatusMajor {
    #[default]
    Unset,
    ConfigError,
    Connection,
    Session,
    Pkcs11,
    Process,
    Other(u32),
}

impl From<u32> for StatusMajor {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unset,
            1 => Self::ConfigError,
            2 => Self::Connection,
            3 => Self::Session,
            4 => Self::Pkcs11,
            5 => Self::Process,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for StatusMajor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "UNSET"),
            Self::ConfigError => write!(f, "CFG_ERROR"),
            Self::Connection => write!(f, "CONNECTION"),
            Self::Session => write!(f, "SESSION"),
            Self::Pkcs11 => write!(f, "PKCS11"),
            Self::Process => write!(f, "PROCESS"),
            Self::Other(code) => write!(f, "MAJOR({code})"),
        }
    }
}

/// Minor status code within a major group.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum StatusMinor {
    #[default]
    Unset,
    CfgError,
    CfgOk,
    CfgInlineMissing,
    CfgRequireUser,
    ConnInit,
    ConnConnecting,
    ConnConnected,
    ConnDisconnecting,
    ConnDisconnected,
    ConnFailed,
    ConnAuthFailed,
    ConnReconnecting,
    ConnPausing,
    ConnPaused,
    ConnResuming,
    ConnDone,
    SessNew,
    SessBackendCompleted,
    SessRemoved,
    SessAuthUserPass,
    SessAuthChallenge,
    SessAuthUrl,
    Other(u32),
}

impl From<u32> for StatusMinor {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unset,
            1 => Self::CfgError,
            2 => Self::CfgOk,
            3 => Self::CfgInlineMissing,
            4 => Self::CfgRequireUser,
            5 => Self::ConnInit,
            6 => Self::ConnConnecting,
            7 => Self::ConnConnected,
            8 => Self::ConnDisconnecting,
            9 => Self::ConnDisconnected,
            10 => Self::ConnFailed,
            11 => Self::ConnAuthFailed,
            12 => Self::ConnReconnecting,
            13 => Self::ConnPausing,
            14 => Self::ConnPaused,
            15 => Self::ConnResuming,
            16 => Self::ConnDone,
            17 => Self::SessNew,
            18 => Self::SessBackendCompleted,
            19 => Self::SessRemoved,
            20 => Self::SessAuthUserPass,
            21 => Self::SessAuthChallenge,
            22 => Self::SessAuthUrl,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for StatusMinor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unset => "UNSET",
            Self::CfgError => "CFG_ERROR",
            Self::CfgOk => "CFG_OK",
            Self::CfgInlineMissing => "CFG_INLINE_MISSING",
            Self::CfgRequireUser => "CFG_REQUIRE_USER",
            Self::ConnInit => "CONN_INIT",
            Self::ConnConnecting => "CONN_CONNECTING",
            Self::ConnConnected => "CONN_CONNECTED",
            Self::ConnDisconnecting => "CONN_DISCONNECTING",
            Self::ConnDisconnected => "CONN_DISCONNECTED",
            Self::ConnFailed => "CONN_FAILED",
            Self::ConnAuthFailed => "CONN_AUTH_FAILED",
            Self::ConnReconnecting => "CONN_RECONNECTING",
            Self::ConnPausing => "CONN_PAUSING",
            Self::ConnPaused => "CONN_PAUSED",
            Self::ConnResuming => "CONN_RESUMING",
            Self::ConnDone => "CONN_DONE",
            Self::SessNew => "SESS_NEW",
            Self::SessBackendCompleted => "SESS_BACKEND_COMPLETED",
            Self::SessRemoved => "SESS_REMOVED",
            Self::SessAuthUserPass => "SESS_AUTH_USERPASS",
            Self::SessAuthChallenge => "SESS_AUTH_CHALLENGE",
            Self::SessAuthUrl => "SESS_AUTH_URL",
            Self::Other(code) => return write!(f, "MINOR({code})"),
        };
        f.write_str(label)
    }
}

/// Status of a session at one point in time. Never cached; read fresh on
/// every poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub major: StatusMajor,
    pub minor: StatusMinor,
    /// Human-readable text supplied by the backend.
    pub message: String,
}

impl StatusSnapshot {
    /// Builds a snapshot from the raw numeric codes on the bus.
    #[must_use]
    pub fn new(major: u32, minor: u32, message: &str) -> Self {
        Self {
            major: StatusMajor::from(major),
            minor: StatusMinor::from(minor),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.major == StatusMajor::Connection && self.minor == StatusMinor::ConnConnected
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.major == StatusMajor::Connection && self.minor == StatusMinor::ConnFailed
    }

    #[must_use]
    pub fn is_auth_failed(&self) -> bool {
        self.major == StatusMajor::Connection && self.minor == StatusMinor::ConnAuthFailed
    }

    /// A session stuck somewhere in the connection group without being up,
    /// typically left over from a previous run.
    #[must_use]
    pub fn is_lingering(&self) -> bool {
        self.major == StatusMajor::Connection && self.minor != StatusMinor::ConnConnected
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}/{}", self.major, self.minor)
        } else {
            write!(f, "{}/{}: {}", self.major, self.minor, self.message)
        }
    }
}

/// Status line text for a record that has a session.
#[must_use]
pub fn describe_status(snapshot: &StatusSnapshot, session_name: &str) -> String {
    if snapshot.is_connected() {
        format!("Connected to {session_name}")
    } else {
        snapshot.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_map_to_known_variants() {
        assert_eq!(StatusMajor::from(2), StatusMajor::Connection);
        assert_eq!(StatusMinor::from(7), StatusMinor::ConnConnected);
        assert_eq!(StatusMinor::from(10), StatusMinor::ConnFailed);
        assert_eq!(StatusMinor::from(11), StatusMinor::ConnAuthFailed);
        assert_eq!(StatusMajor::from(42), StatusMajor::Other(42));
        assert_eq!(StatusMinor::from(99), StatusMinor::Other(99));
    }

    #[test]
    fn test_classification_requires_connection_group() {
        let connected = StatusSnapshot::new(2, 7, "up");
        assert!(connected.is_connected());
        assert!(!connected.is_lingering());

        // Same minor code under a different major group is not "connected"
        let other_group = StatusSnapshot::new(3, 7, "");
        assert!(!other_group.is_connected());
        assert!(!other_group.is_lingering());

        assert!(StatusSnapshot::new(2, 10, "").is_failed());
        assert!(StatusSnapshot::new(2, 11, "").is_auth_failed());
        assert!(StatusSnapshot::new(2, 6, "").is_lingering());
    }

    #[test]
    fn test_display_includes_codes_and_message() {
        let snapshot = StatusSnapshot::new(2, 6, "Connecting");
        assert_eq!(snapshot.to_string(), "CONNECTION/CONN_CONNECTING: Connecting");
        assert_eq!(StatusSnapshot::new(0, 0, "").to_string(), "UNSET/UNSET");
    }

    #[test]
    fn test_describe_status() {
        let up = StatusSnapshot::new(2, 7, "Connected");
        assert_eq!(describe_status(&up, "vpn.example.com"), "Connected to vpn.example.com");

        let pending = StatusSnapshot::new(2, 6, "Client connecting");
        assert_eq!(describe_status(&pending, "ignored"), "Client connecting");
    }
}
