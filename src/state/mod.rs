//! Application data model.

mod connection;
mod credentials;
mod form;
mod profile;
mod status;
mod usernames;

use std::time::Instant;

pub use connection::ConnectionState;
pub use credentials::{AttentionType, CredentialField, InputSlot, OfferedCredentials};
pub use form::CredentialsForm;
pub use profile::{
    join_records, ConnectionRecord, ProfileHandle, ProfileRef, SessionHandle, SessionRef,
};
pub use status::{describe_status, StatusMajor, StatusMinor, StatusSnapshot};
pub use usernames::{SavedUsernames, StoreError};

/// Severity of a toast notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastType {
    Info,
    Success,
    Warning,
    Error,
}

/// Temporary notification shown over the dashboard.
#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    /// When the toast should disappear.
    pub expires: Instant,
}
