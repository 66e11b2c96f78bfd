//! Answers the backend's credential requests.

use thiserror::Error;

use crate::backend::Backend;
use crate::state::{AttentionType, CredentialField, InputSlot, OfferedCredentials, SessionHandle};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// The backend asked for a field the user left empty.
    #[error("{0} is required, but it was not provided.")]
    Missing(CredentialField),
    /// Every credentials slot asks for something the form cannot supply.
    #[error("The server asked for '{0}', which cannot be entered here.")]
    Unsupported(String),
    /// Credentials were requested but no slot is pending.
    #[error("The server asked for credentials but posted no input slots.")]
    NothingRequested,
    /// Fault text from the backend, verbatim.
    #[error("{0}")]
    Backend(String),
}

/// Submits the offered credentials to every pending credentials slot.
///
/// All requested fields are checked before the first submission, so a
/// missing value never causes a partial answer. Returns `Ok` only when at
/// least one value was submitted.
pub async fn negotiate<B: Backend + ?Sized>(
    backend: &B,
    session: &SessionHandle,
    offered: &OfferedCredentials,
) -> Result<(), NegotiationError> {
    let slots = backend
        .input_slots(session)
        .await
        .map_err(|fault| NegotiationError::Backend(fault.message))?;

    let mut answers: Vec<(&InputSlot, &str)> = Vec::new();
    let mut skipped: Option<&str> = None;
    for slot in slots
        .iter()
        .filter(|slot| slot.attention_type == AttentionType::Credentials)
    {
        let Some(field) = CredentialField::from_variable(&slot.variable_name) else {
            tracing::debug!(variable = %slot.variable_name, "skipping unknown credential slot");
            skipped = skipped.or(Some(slot.variable_name.as_str()));
            continue;
        };
        let value = offered.value_for(field);
        if value.is_empty() {
            return Err(NegotiationError::Missing(field));
        }
        answers.push((slot, value));
    }

    if answers.is_empty() {
        return Err(match skipped {
            Some(variable) => NegotiationError::Unsupported(variable.to_string()),
            None => NegotiationError::NothingRequested,
        });
    }

    for (slot, value) in answers {
        tracing::debug!(variable = %slot.variable_name, "providing credential");
        backend
            .provide_input(session, slot, value)
            .await
            .map_err(|fault| NegotiationError::Backend(fault.message))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{credential_slot, Call, MockBackend, SESSION_PATH};
    use crate::backend::BackendFault;

    fn offered(username: &str, password: &str, otp: &str) -> OfferedCredentials {
        OfferedCredentials {
            username: username.to_string(),
            password: password.to_string(),
            otp: otp.to_string(),
        }
    }

    fn session() -> SessionHandle {
        SessionHandle::new(SESSION_PATH)
    }

    #[tokio::test]
    async fn test_submits_matching_values() {
        let backend = MockBackend::new().with_slots([
            credential_slot("username", 0),
            credential_slot("password", 1),
        ]);
        negotiate(&backend, &session(), &offered("alice", "secret", ""))
            .await
            .unwrap();
        assert_eq!(
            backend.provided(),
            vec![
                ("username".to_string(), "alice".to_string()),
                ("password".to_string(), "secret".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_static_challenge_takes_otp() {
        let backend = MockBackend::new().with_slots([credential_slot("static_challenge", 2)]);
        negotiate(&backend, &session(), &offered("", "", "424242"))
            .await
            .unwrap();
        assert_eq!(
            backend.provided(),
            vec![("static_challenge".to_string(), "424242".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_username_fails_without_submitting() {
        let backend = MockBackend::new().with_slots([
            credential_slot("username", 0),
            credential_slot("password", 1),
        ]);
        let err = negotiate(&backend, &session(), &offered("", "secret", ""))
            .await
            .unwrap_err();

        assert_eq!(err, NegotiationError::Missing(CredentialField::Username));
        assert_eq!(
            err.to_string(),
            "Username is required, but it was not provided."
        );
        assert!(backend.provided().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_checked_before_any_submission() {
        // Password slot comes first and would be answerable
        let backend = MockBackend::new().with_slots([
            credential_slot("password", 1),
            credential_slot("static_challenge", 2),
        ]);
        let err = negotiate(&backend, &session(), &offered("alice", "secret", ""))
            .await
            .unwrap_err();
        assert_eq!(err, NegotiationError::Missing(CredentialField::OneTimeCode));
        assert!(backend.provided().is_empty());
    }

    #[tokio::test]
    async fn test_non_credential_slots_are_ignored() {
        let mut pkcs11 = credential_slot("username", 0);
        pkcs11.attention_type = AttentionType::Other(2);
        let backend = MockBackend::new().with_slots([
            pkcs11,
            credential_slot("pk_passphrase", 3),
            credential_slot("password", 1),
        ]);

        negotiate(&backend, &session(), &offered("", "secret", ""))
            .await
            .unwrap();
        assert_eq!(backend.count(&Call::InputSlots), 1);
        assert_eq!(
            backend.provided(),
            vec![("password".to_string(), "secret".to_string())]
        );
    }

    #[tokio::test]
    async fn test_only_unknown_slots_is_an_error() {
        let backend = MockBackend::new().with_slots([credential_slot("pk_passphrase", 3)]);
        let err = negotiate(&backend, &session(), &offered("alice", "secret", "1234"))
            .await
            .unwrap_err();

        assert_eq!(err, NegotiationError::Unsupported("pk_passphrase".to_string()));
        assert_eq!(
            err.to_string(),
            "The server asked for 'pk_passphrase', which cannot be entered here."
        );
        assert!(backend.provided().is_empty());
    }

    #[tokio::test]
    async fn test_empty_queue_is_an_error() {
        let backend = MockBackend::new();
        let err = negotiate(&backend, &session(), &offered("alice", "secret", ""))
            .await
            .unwrap_err();
        assert_eq!(err, NegotiationError::NothingRequested);
    }

    #[tokio::test]
    async fn test_backend_fault_is_verbatim() {
        let backend = MockBackend::new().with_slots([credential_slot("username", 0)]);
        *backend.provide_fault.borrow_mut() = Some(BackendFault::new("Input slot already answered"));

        let err = negotiate(&backend, &session(), &offered("alice", "", ""))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            NegotiationError::Backend("Input slot already answered".to_string())
        );
    }
}
