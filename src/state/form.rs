//! Credentials dialog state.

use std::fmt;

use super::{CredentialField, OfferedCredentials, ProfileRef};

const FIELDS: [CredentialField; 3] = [
    CredentialField::Username,
    CredentialField::Password,
    CredentialField::OneTimeCode,
];

/// Values typed into the credentials dialog for one profile.
#[derive(Clone)]
pub struct CredentialsForm {
    pub profile: ProfileRef,
    pub username: String,
    pub password: String,
    pub otp: String,
    pub focus: CredentialField,
    saved_username: Option<String>,
}

impl CredentialsForm {
    /// Opens the dialog, pre-filling the username saved for this profile.
    /// Focus starts on the password when a username is known.
    pub fn new(profile: ProfileRef, saved_username: Option<&str>) -> Self {
        let saved_username = saved_username
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);
        let focus = if saved_username.is_some() {
            CredentialField::Password
        } else {
            CredentialField::Username
        };
        Self {
            profile,
            username: saved_username.clone().unwrap_or_default(),
            password: String::new(),
            otp: String::new(),
            focus,
            saved_username,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = FIELDS[(self.focus_index() + 1) % FIELDS.len()];
    }

    pub fn focus_previous(&mut self) {
        self.focus = FIELDS[(self.focus_index() + FIELDS.len() - 1) % FIELDS.len()];
    }

    fn focus_index(&self) -> usize {
        FIELDS.iter().position(|f| *f == self.focus).unwrap_or(0)
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            CredentialField::Username => &mut self.username,
            CredentialField::Password => &mut self.password,
            CredentialField::OneTimeCode => &mut self.otp,
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    /// Field value as it should be drawn; the password is masked.
    pub fn display_value(&self, field: CredentialField) -> String {
        match field {
            CredentialField::Username => self.username.clone(),
            CredentialField::Password => "*".repeat(self.password.chars().count()),
            CredentialField::OneTimeCode => self.otp.clone(),
        }
    }

    pub fn fields() -> &'static [CredentialField] {
        &FIELDS
    }

    /// Username to persist, if it differs from the saved one.
    pub fn changed_username(&self) -> Option<&str> {
        let username = self.username.trim();
        (!username.is_empty() && self.saved_username.as_deref() != Some(username))
            .then_some(username)
    }

    pub fn offered(&self) -> OfferedCredentials {
        OfferedCredentials {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            otp: self.otp.trim().to_string(),
        }
    }
}

impl fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("profile", &self.profile.name)
            .field("username", &self.username)
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}
