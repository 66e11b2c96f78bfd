//! Credential requests raised by the backend during connect.

use std::fmt;

/// Attention type of a pending input slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttentionType {
    Credentials,
    Other(u32),
}

impl From<u32> for AttentionType {
    fn from(code: u32) -> Self {
        match code {
            1 => Self::Credentials,
            other => Self::Other(other),
        }
    }
}

impl AttentionType {
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Credentials => 1,
            Self::Other(code) => code,
        }
    }
}

/// One value the backend is waiting for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSlot {
    pub attention_type: AttentionType,
    pub group: u32,
    pub id: u32,
    pub variable_name: String,
    pub description: String,
    /// Whether the value should be masked when typed.
    pub hidden: bool,
}

/// Credential fields this client knows how to answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CredentialField {
    Username,
    Password,
    OneTimeCode,
}

impl CredentialField {
    /// Maps a slot variable name to a field.
    #[must_use]
    pub fn from_variable(name: &str) -> Option<Self> {
        match name {
            "username" => Some(Self::Username),
            "password" => Some(Self::Password),
            "static_challenge" => Some(Self::OneTimeCode),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Password => "Password",
            Self::OneTimeCode => "One-time code",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values the user typed into the credentials dialog.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OfferedCredentials {
    pub username: String,
    pub password: String,
    pub otp: String,
}

impl OfferedCredentials {
    #[must_use]
    pub fn value_for(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::Username => &self.username,
            CredentialField::Password => &self.password,
            CredentialField::OneTimeCode => &self.otp,
        }
    }
}

// Keep secrets out of logs and panic messages.
impl fmt::Debug for OfferedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfferedCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("otp", &"<redacted>")
            .finish()
    }
}
