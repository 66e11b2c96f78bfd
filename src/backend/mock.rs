//! Scripted in-memory backend for tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::{Backend, BackendFault};
use crate::state::{
    AttentionType, InputSlot, ProfileHandle, ProfileRef, SessionHandle, SessionRef, StatusSnapshot,
};

/// A recorded backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ListProfiles,
    ListSessions,
    Status,
    SessionName,
    NewTunnel(ProfileHandle),
    Ready,
    Connect,
    InputSlots,
    Provide { variable: String, value: String },
    Disconnect(SessionHandle),
    Import(String),
    Remove(ProfileHandle),
}

/// Backend whose replies are queued up front.
///
/// Queues for `status`, `ready` and `connect` repeat their last entry once
/// drained; an empty queue answers with a default success.
#[derive(Default)]
pub struct MockBackend {
    pub profiles: RefCell<Vec<ProfileRef>>,
    pub sessions: RefCell<Vec<SessionRef>>,
    pub slots: RefCell<Vec<InputSlot>>,
    statuses: RefCell<VecDeque<Result<StatusSnapshot, BackendFault>>>,
    ready: RefCell<VecDeque<Result<(), BackendFault>>>,
    connect: RefCell<VecDeque<Result<(), BackendFault>>>,
    pub new_tunnel_fault: RefCell<Option<BackendFault>>,
    pub disconnect_fault: RefCell<Option<BackendFault>>,
    pub provide_fault: RefCell<Option<BackendFault>>,
    calls: RefCell<Vec<Call>>,
}

pub const SESSION_PATH: &str = "/net/openvpn/v3/sessions/test0";

pub fn connecting() -> StatusSnapshot {
    StatusSnapshot::new(2, 6, "Client connecting")
}

pub fn connected() -> StatusSnapshot {
    StatusSnapshot::new(2, 7, "Connected")
}

pub fn credential_slot(variable: &str, id: u32) -> InputSlot {
    InputSlot {
        attention_type: AttentionType::Credentials,
        group: 1,
        id,
        variable_name: variable.to_string(),
        description: variable.to_string(),
        hidden: variable != "username",
    }
}

pub fn profile(name: &str) -> ProfileRef {
    ProfileRef {
        name: name.to_string(),
        handle: ProfileHandle::new(format!("/net/openvpn/v3/configuration/{name}")),
    }
}

fn next<T: Clone>(queue: &RefCell<VecDeque<T>>, fallback: T) -> T {
    let mut queue = queue.borrow_mut();
    if queue.len() > 1 {
        queue.pop_front().unwrap_or(fallback)
    } else {
        queue.front().cloned().unwrap_or(fallback)
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = StatusSnapshot>) -> Self {
        *self.statuses.borrow_mut() = statuses.into_iter().map(Ok).collect();
        self
    }

    pub fn with_status_results(
        self,
        results: impl IntoIterator<Item = Result<StatusSnapshot, BackendFault>>,
    ) -> Self {
        *self.statuses.borrow_mut() = results.into_iter().collect();
        self
    }

    pub fn with_ready(self, results: impl IntoIterator<Item = Result<(), BackendFault>>) -> Self {
        *self.ready.borrow_mut() = results.into_iter().collect();
        self
    }

    pub fn with_connect(self, results: impl IntoIterator<Item = Result<(), BackendFault>>) -> Self {
        *self.connect.borrow_mut() = results.into_iter().collect();
        self
    }

    pub fn with_slots(self, slots: impl IntoIterator<Item = InputSlot>) -> Self {
        *self.slots.borrow_mut() = slots.into_iter().collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn provided(&self) -> Vec<(String, String)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Provide { variable, value } => Some((variable.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Backend for MockBackend {
    async fn list_profiles(&self) -> Result<Vec<ProfileRef>, BackendFault> {
        self.record(Call::ListProfiles);
        Ok(self.profiles.borrow().clone())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRef>, BackendFault> {
        self.record(Call::ListSessions);
        Ok(self.sessions.borrow().clone())
    }

    async fn status(&self, _session: &SessionHandle) -> Result<StatusSnapshot, BackendFault> {
        self.record(Call::Status);
        next(&self.statuses, Ok(connecting()))
    }

    async fn session_name(&self, _session: &SessionHandle) -> Result<String, BackendFault> {
        self.record(Call::SessionName);
        Ok("vpn.example.com".to_string())
    }

    async fn new_tunnel(&self, profile: &ProfileHandle) -> Result<SessionHandle, BackendFault> {
        self.record(Call::NewTunnel(profile.clone()));
        match self.new_tunnel_fault.borrow().clone() {
            Some(fault) => Err(fault),
            None => Ok(SessionHandle::new(SESSION_PATH)),
        }
    }

    async fn ready(&self, _session: &SessionHandle) -> Result<(), BackendFault> {
        self.record(Call::Ready);
        next(&self.ready, Ok(()))
    }

    async fn connect(&self, _session: &SessionHandle) -> Result<(), BackendFault> {
        self.record(Call::Connect);
        next(&self.connect, Ok(()))
    }

    async fn input_slots(&self, _session: &SessionHandle) -> Result<Vec<InputSlot>, BackendFault> {
        self.record(Call::InputSlots);
        Ok(self.slots.borrow().clone())
    }

    async fn provide_input(
        &self,
        _session: &SessionHandle,
        slot: &InputSlot,
        value: &str,
    ) -> Result<(), BackendFault> {
        self.record(Call::Provide {
            variable: slot.variable_name.clone(),
            value: value.to_string(),
        });
        match self.provide_fault.borrow().clone() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    async fn disconnect(&self, session: &SessionHandle) -> Result<(), BackendFault> {
        self.record(Call::Disconnect(session.clone()));
        if let Some(fault) = self.disconnect_fault.borrow().clone() {
            return Err(fault);
        }
        self.sessions.borrow_mut().retain(|s| &s.handle != session);
        Ok(())
    }

    async fn import_profile(
        &self,
        name: &str,
        _contents: &str,
    ) -> Result<ProfileHandle, BackendFault> {
        self.record(Call::Import(name.to_string()));
        let imported = profile(name);
        let handle = imported.handle.clone();
        self.profiles.borrow_mut().push(imported);
        Ok(handle)
    }

    async fn remove_profile(&self, handle: &ProfileHandle) -> Result<(), BackendFault> {
        self.record(Call::Remove(handle.clone()));
        self.profiles.borrow_mut().retain(|p| &p.handle != handle);
        Ok(())
    }
}
