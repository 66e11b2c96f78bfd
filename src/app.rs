//! Application state and key handling for the TUI.

use std::rc::Rc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::TableState;

use crate::backend::Backend;
use crate::config::{AppConfig, Paths};
use crate::constants;
use crate::core::cancel::CancelFlag;
use crate::core::importer;
use crate::core::orchestrator::{
    ConnectOutcome, ConnectPhase, FatalBackendFault, Orchestrator, Progress,
};
use crate::core::sessions;
use crate::event::{ConnectUpdate, Event, EventHandler, EventSender};
use crate::state::{
    ConnectionRecord, ConnectionState, CredentialsForm, ProfileRef, SavedUsernames, Toast,
    ToastType,
};
use crate::ui;

/// Activity entries kept in memory.
const MAX_LOG_ENTRIES: usize = 500;
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Which dialog, if any, has the keyboard.
#[derive(Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Help,
    Import {
        path: String,
    },
    ConfirmDelete {
        index: usize,
        name: String,
    },
    /// Pre-flight before connecting while other sessions exist.
    ConfirmDisconnectOthers {
        index: usize,
    },
    Credentials(CredentialsForm),
}

pub struct App<B: Backend> {
    backend: Rc<B>,
    pub config: AppConfig,
    pub paths: Paths,
    pub usernames: SavedUsernames,
    events: EventSender,

    pub records: Vec<ConnectionRecord>,
    pub table_state: TableState,
    pub status_line: String,
    pub connection: ConnectionState,
    pub input_mode: InputMode,
    pub toast: Option<Toast>,
    pub logs: Vec<String>,
    pub logs_scroll: u16,
    pub logs_auto_scroll: bool,
    /// Advances every tick; drives the spinner.
    pub frame_count: u64,

    pub should_quit: bool,
    /// Quit once the running attempt has been cleaned up.
    quit_requested: bool,
    /// Set when a failed session could not be torn down.
    pub fatal: Option<FatalBackendFault>,
    last_refresh: Instant,
    last_input: Instant,
}

impl<B: Backend + 'static> App<B> {
    pub fn new(
        backend: Rc<B>,
        config: AppConfig,
        paths: Paths,
        usernames: SavedUsernames,
        events: EventSender,
    ) -> Self {
        Self {
            backend,
            config,
            paths,
            usernames,
            events,
            records: Vec::new(),
            table_state: TableState::default(),
            status_line: constants::MSG_DISCONNECTED.to_string(),
            connection: ConnectionState::Idle,
            input_mode: InputMode::Normal,
            toast: None,
            logs: Vec::new(),
            logs_scroll: 0,
            logs_auto_scroll: true,
            frame_count: 0,
            should_quit: false,
            quit_requested: false,
            fatal: None,
            last_refresh: Instant::now(),
            last_input: Instant::now(),
        }
    }

    /// Clears sessions left over from an earlier run, then loads the list.
    pub async fn startup(&mut self) {
        match sessions::kill_lingering(&*self.backend).await {
            Ok(killed) => {
                for session in killed {
                    self.log(&format!("Disconnected lingering session {session}"));
                }
            }
            Err(fault) => self.log(&format!("Could not check for lingering sessions: {fault}")),
        }
        self.refresh().await;
    }

    /// Re-reads profiles and sessions from the backend.
    pub async fn refresh(&mut self) {
        self.last_refresh = Instant::now();
        let loaded = match sessions::load_records(&*self.backend).await {
            Ok(records) => records,
            Err(fault) => {
                self.log(&format!("Refresh failed: {fault}"));
                self.show_toast(format!("Refresh failed: {fault}"), ToastType::Error);
                return;
            }
        };
        self.records = loaded;
        self.status_line = match sessions::status_line(&*self.backend, &self.records).await {
            Ok(line) => line,
            Err(fault) => {
                tracing::debug!(error = %fault, "status line unavailable");
                constants::MSG_DISCONNECTED.to_string()
            }
        };

        match self.table_state.selected() {
            _ if self.records.is_empty() => self.table_state.select(None),
            Some(i) if i >= self.records.len() => {
                self.table_state.select(Some(self.records.len() - 1));
            }
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key).await,
            Event::Key(_) | Event::Resize(..) => {}
            Event::Tick => self.on_tick().await,
            Event::Connect(update) => self.on_connect_update(update).await,
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        self.last_input = Instant::now();

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.request_quit();
            return;
        }
        if self.connection.is_connecting() {
            self.handle_connecting_key(key);
            return;
        }

        match std::mem::take(&mut self.input_mode) {
            InputMode::Normal => self.handle_normal_key(key).await,
            InputMode::Help => {}
            InputMode::Import { path } => self.handle_import_key(key, path).await,
            InputMode::ConfirmDelete { index, name } => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => self.delete_record(index).await,
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {}
                _ => self.input_mode = InputMode::ConfirmDelete { index, name },
            },
            InputMode::ConfirmDisconnectOthers { index } => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                    self.disconnect_others_then_prompt(index).await;
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.log("Connect aborted"),
                _ => self.input_mode = InputMode::ConfirmDisconnectOthers { index },
            },
            InputMode::Credentials(form) => self.handle_credentials_key(key, form),
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.request_quit(),
            KeyCode::Char('?') => self.input_mode = InputMode::Help,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Enter | KeyCode::Char('c') => match self.table_state.selected() {
                Some(index) => self.toggle(index).await,
                None => self.show_toast(constants::MSG_SELECT_FIRST.to_string(), ToastType::Warning),
            },
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(record) = self.selected_record() {
                    self.input_mode = InputMode::ConfirmDelete {
                        index: self.table_state.selected().unwrap_or_default(),
                        name: record.name.clone(),
                    };
                }
            }
            KeyCode::Char('i') => {
                self.input_mode = InputMode::Import {
                    path: String::new(),
                }
            }
            KeyCode::Char('r') => {
                self.refresh().await;
                self.log("Refreshed");
            }
            KeyCode::PageUp => {
                self.logs_auto_scroll = false;
                self.logs_scroll = self.logs_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => self.logs_scroll = self.logs_scroll.saturating_add(5),
            KeyCode::End => self.logs_auto_scroll = true,
            _ => {}
        }
    }

    fn handle_connecting_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.cancel_connect(),
            KeyCode::Char('q') => self.request_quit(),
            _ => {}
        }
    }

    async fn handle_import_key(&mut self, key: KeyEvent, mut path: String) {
        match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => self.import_profile(&path).await,
            KeyCode::Backspace => {
                path.pop();
                self.input_mode = InputMode::Import { path };
            }
            KeyCode::Char(c) => {
                path.push(c);
                self.input_mode = InputMode::Import { path };
            }
            _ => self.input_mode = InputMode::Import { path },
        }
    }

    fn handle_credentials_key(&mut self, key: KeyEvent, mut form: CredentialsForm) {
        match key.code {
            KeyCode::Esc => {
                self.log(&format!("{}: connect cancelled", form.profile.name));
                return;
            }
            KeyCode::Enter => {
                self.submit_credentials(&form);
                return;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push(c),
            _ => {}
        }
        self.input_mode = InputMode::Credentials(form);
    }

    fn request_quit(&mut self) {
        if self.connection.is_connecting() {
            // Leave once cleanup has disconnected the half-open session
            self.quit_requested = true;
            self.cancel_connect();
        } else {
            self.should_quit = true;
        }
    }

    pub fn selected_record(&self) -> Option<&ConnectionRecord> {
        self.table_state.selected().and_then(|i| self.records.get(i))
    }

    fn select_next(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.records.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => self.records.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    /// Disconnects the record's session, or starts connecting it.
    async fn toggle(&mut self, index: usize) {
        let Some(record) = self.records.get(index).cloned() else {
            return;
        };
        if record.has_session() {
            self.disconnect_record(&record).await;
            return;
        }

        match self.backend.list_sessions().await {
            Ok(active) if !active.is_empty() => {
                self.input_mode = InputMode::ConfirmDisconnectOthers { index };
            }
            Ok(_) => self.open_credentials(index),
            Err(fault) => {
                self.log(&format!("Could not list sessions: {fault}"));
                self.show_toast(fault.message, ToastType::Error);
            }
        }
    }

    async fn disconnect_record(&mut self, record: &ConnectionRecord) {
        match sessions::disconnect_session(&*self.backend, record.session.as_ref()).await {
            Ok(_) => {
                self.log(&format!("{}: disconnected", record.name));
                self.show_toast(format!("Disconnected from {}", record.name), ToastType::Info);
            }
            Err(fault) => {
                self.log(&format!("{}: disconnect failed: {fault}", record.name));
                self.show_toast(format!("Disconnect failed: {fault}"), ToastType::Error);
            }
        }
        self.refresh().await;
    }

    async fn disconnect_others_then_prompt(&mut self, index: usize) {
        let name = self.records.get(index).map(|r| r.name.clone());
        match sessions::disconnect_all(&*self.backend).await {
            Ok(disconnected) => {
                for session in disconnected {
                    self.log(&format!("Disconnected session {session}"));
                }
                self.refresh().await;
                // The list was re-read; look the profile up again
                match name.and_then(|n| self.records.iter().position(|r| r.name == n)) {
                    Some(index) => self.open_credentials(index),
                    None => self.log("Profile disappeared; connect aborted"),
                }
            }
            Err(fault) => {
                self.log(&format!("Could not disconnect other sessions: {fault}"));
                self.show_toast(fault.message, ToastType::Error);
            }
        }
    }

    fn open_credentials(&mut self, index: usize) {
        let Some(profile) = self.records.get(index).and_then(|r| r.profile.clone()) else {
            self.show_toast(constants::MSG_STALE_SESSION.to_string(), ToastType::Warning);
            return;
        };
        let saved = self.usernames.get(&profile.name);
        self.input_mode = InputMode::Credentials(CredentialsForm::new(profile, saved));
    }

    fn submit_credentials(&mut self, form: &CredentialsForm) {
        if let Some(username) = form.changed_username() {
            if let Err(e) = self.usernames.remember(&form.profile.name, username) {
                self.log(&format!("Could not save username: {e}"));
                self.show_toast(e.to_string(), ToastType::Warning);
            }
        }
        self.start_connect(form.profile.clone(), form);
    }

    /// Runs the orchestrator on the local task set. Progress and the final
    /// outcome come back as [`Event::Connect`].
    fn start_connect(&mut self, profile: ProfileRef, form: &CredentialsForm) {
        if self.connection.is_connecting() {
            self.show_toast(constants::MSG_CONNECT_IN_PROGRESS.to_string(), ToastType::Warning);
            return;
        }

        let cancel = CancelFlag::new();
        self.connection = ConnectionState::Connecting {
            started: Instant::now(),
            profile: profile.name.clone(),
            phase: ConnectPhase::default(),
            session: None,
            cancel: cancel.clone(),
        };
        self.log(&format!("{}: connecting", profile.name));

        let backend = Rc::clone(&self.backend);
        let settings = self.config.connect_settings();
        let capture = self.config.log_capture(&self.paths);
        let offered = form.offered();
        let events = self.events.clone();
        tokio::task::spawn_local(async move {
            let name = profile.name.clone();
            let orchestrator =
                Orchestrator::new(&*backend, settings, cancel).with_log_capture(capture);
            let sink = |progress: Progress| {
                let update = ConnectUpdate::Progress {
                    profile: name.clone(),
                    progress,
                };
                if events.send(Event::Connect(update)).is_err() {
                    tracing::debug!("event channel closed");
                }
            };
            let result = orchestrator.connect(&profile, &offered, &sink).await;
            let finished = ConnectUpdate::Finished {
                profile: name,
                result,
            };
            if events.send(Event::Connect(finished)).is_err() {
                tracing::debug!("event channel closed");
            }
        });
    }

    fn cancel_connect(&mut self) {
        if let ConnectionState::Connecting {
            cancel, profile, ..
        } = &self.connection
        {
            if !cancel.is_cancelled() {
                cancel.cancel();
                let message = format!("{profile}: cancelling");
                self.log(&message);
            }
        }
    }

    pub async fn on_connect_update(&mut self, update: ConnectUpdate) {
        match update {
            ConnectUpdate::Progress { profile, progress } => {
                if let ConnectionState::Connecting { phase, session, .. } = &mut self.connection {
                    match &progress {
                        Progress::Phase(p) => *phase = *p,
                        Progress::SessionCreated(handle) => *session = Some(handle.clone()),
                        Progress::Note(_) => {}
                    }
                }
                let line = match progress {
                    Progress::Phase(p) => format!("{profile}: {p}"),
                    Progress::SessionCreated(handle) => format!("{profile}: session {handle}"),
                    Progress::Note(note) => format!("{profile}: {note}"),
                };
                self.log(&line);
            }
            ConnectUpdate::Finished { profile, result } => {
                self.connection = ConnectionState::Idle;
                match result {
                    Ok(ConnectOutcome::Succeeded) => {
                        self.log(&format!("{profile}: connected"));
                        self.show_toast(format!("Connected to {profile}"), ToastType::Success);
                    }
                    Ok(ConnectOutcome::Failed(failure)) => {
                        self.log(&format!("{profile}: {}: {failure}", failure.title()));
                        self.show_toast(
                            format!("{}\n{failure}", failure.title()),
                            ToastType::Error,
                        );
                    }
                    Ok(ConnectOutcome::Cancelled) => {
                        self.log(&format!("{profile}: connection cancelled"));
                        self.show_toast("Connection cancelled".to_string(), ToastType::Info);
                    }
                    Err(fatal) => {
                        tracing::error!(error = %fatal, "giving up");
                        self.log(&format!("{profile}: {fatal}"));
                        self.fatal = Some(fatal);
                        self.should_quit = true;
                        return;
                    }
                }
                if self.quit_requested {
                    self.should_quit = true;
                    return;
                }
                self.refresh().await;
            }
        }
    }

    async fn delete_record(&mut self, index: usize) {
        let Some(record) = self.records.get(index).cloned() else {
            return;
        };
        if let Err(fault) =
            sessions::disconnect_session(&*self.backend, record.session.as_ref()).await
        {
            self.log(&format!("{}: disconnect failed: {fault}", record.name));
            self.show_toast(format!("Disconnect failed: {fault}"), ToastType::Error);
            self.refresh().await;
            return;
        }

        if let Some(profile) = &record.profile {
            match self.backend.remove_profile(&profile.handle).await {
                Ok(()) => {
                    self.log(&format!("{}: profile deleted", record.name));
                    self.show_toast(format!("Deleted {}", record.name), ToastType::Success);
                }
                Err(fault) => {
                    self.log(&format!("{}: delete failed: {fault}", record.name));
                    self.show_toast(format!("Delete failed: {fault}"), ToastType::Error);
                }
            }
        } else {
            self.log(&format!("{}: stale session disconnected", record.name));
        }
        self.refresh().await;
    }

    async fn import_profile(&mut self, input: &str) {
        let source = match importer::read_profile(input, None) {
            Ok(source) => source,
            Err(e) => {
                self.log(&format!("Import failed: {e}"));
                self.show_toast(e, ToastType::Error);
                return;
            }
        };
        match self
            .backend
            .import_profile(&source.name, &source.contents)
            .await
        {
            Ok(handle) => {
                tracing::info!(name = %source.name, handle = %handle, "profile imported");
                self.log(&format!("Imported {} from {}", source.name, source.path.display()));
                self.show_toast(format!("Imported {}", source.name), ToastType::Success);
            }
            Err(fault) => {
                self.log(&format!("Import failed: {fault}"));
                self.show_toast(format!("Import failed: {fault}"), ToastType::Error);
            }
        }
        self.refresh().await;
    }

    async fn on_tick(&mut self) {
        self.frame_count = self.frame_count.wrapping_add(1);

        if self.toast.as_ref().is_some_and(|t| Instant::now() >= t.expires) {
            self.toast = None;
        }
        if self.connection.is_connecting() {
            return;
        }

        if let Some(idle) = self.config.idle_exit() {
            if self.last_input.elapsed() >= idle {
                tracing::info!("idle timeout reached");
                self.should_quit = true;
                return;
            }
        }
        if matches!(self.input_mode, InputMode::Normal)
            && self.last_refresh.elapsed() >= self.config.refresh_interval()
        {
            self.refresh().await;
        }
    }

    /// Appends a timestamped line to the activity log.
    pub fn log(&mut self, message: &str) {
        tracing::info!(target: "activity", "{message}");
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push(format!("{timestamp} {message}"));
        if self.logs.len() > MAX_LOG_ENTRIES {
            let excess = self.logs.len() - MAX_LOG_ENTRIES;
            self.logs.drain(..excess);
        }
        if self.logs_auto_scroll {
            self.logs_scroll = u16::try_from(self.logs.len()).unwrap_or(u16::MAX);
        }
    }

    pub fn show_toast(&mut self, message: String, toast_type: ToastType) {
        self.toast = Some(Toast {
            message,
            toast_type,
            expires: Instant::now() + TOAST_DURATION,
        });
    }
}

/// Runs the TUI until the user quits.
///
/// Returns an error if a failed session could not be disconnected.
pub async fn run<B: Backend + 'static>(
    backend: B,
    config: AppConfig,
    paths: Paths,
    usernames: SavedUsernames,
) -> Result<()> {
    let mut events = EventHandler::new(config.tick_rate_ms);
    let mut app = App::new(Rc::new(backend), config, paths, usernames, events.sender());

    let mut terminal = ratatui::init();
    app.startup().await;
    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(frame, &mut app))?;
            let event = events.next().await?;
            app.handle_event(event).await;
        }
        Ok::<(), color_eyre::Report>(())
    }
    .await;
    ratatui::restore();

    result?;
    if let Some(fatal) = app.fatal.take() {
        return Err(fatal.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{
        connected, connecting, credential_slot, profile, Call, MockBackend, SESSION_PATH,
    };
    use crate::backend::BackendFault;
    use crate::state::{CredentialField, SessionHandle, SessionRef};
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use tokio::task::LocalSet;

    struct Harness {
        app: App<MockBackend>,
        backend: Rc<MockBackend>,
        rx: mpsc::UnboundedReceiver<Event>,
        _dir: TempDir,
    }

    fn harness(backend: MockBackend) -> Harness {
        let dir = TempDir::new().unwrap();
        let paths = Paths::resolve(Some(dir.path().to_path_buf())).unwrap();
        let usernames = SavedUsernames::load(&paths.usernames_file()).unwrap();
        let mut config = AppConfig::default();
        config.log_capture.enabled = false;
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Rc::new(backend);
        let app = App::new(Rc::clone(&backend), config, paths, usernames, tx);
        Harness {
            app,
            backend,
            rx,
            _dir: dir,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App<MockBackend>, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await;
        }
    }

    fn office_backend() -> MockBackend {
        let backend = MockBackend::new();
        backend.profiles.borrow_mut().push(profile("Office-VPN"));
        backend
    }

    fn live_session(name: &str, path: &str) -> SessionRef {
        SessionRef {
            handle: SessionHandle::new(path),
            profile_handle: profile(name).handle,
            profile_name: name.to_string(),
        }
    }

    /// Feeds connect events back into the app until the attempt finishes.
    async fn drive_connect(h: &mut Harness) {
        while h.app.connection.is_connecting() {
            let event = h.rx.recv().await.unwrap();
            h.app.handle_event(event).await;
        }
    }

    async fn drive_until_phase(h: &mut Harness, wanted: ConnectPhase) {
        loop {
            if let ConnectionState::Connecting { phase, .. } = &h.app.connection {
                if *phase == wanted {
                    return;
                }
            }
            let event = h.rx.recv().await.unwrap();
            h.app.handle_event(event).await;
        }
    }

    #[tokio::test]
    async fn test_startup_kills_lingering_sessions() {
        let backend = office_backend().with_statuses([connecting()]);
        backend
            .sessions
            .borrow_mut()
            .push(live_session("Office-VPN", "/net/openvpn/v3/sessions/old"));
        let mut h = harness(backend);

        h.app.startup().await;
        assert!(h
            .backend
            .calls()
            .contains(&Call::Disconnect(SessionHandle::new("/net/openvpn/v3/sessions/old"))));
        assert_eq!(h.app.records.len(), 1);
        assert!(!h.app.records[0].has_session());
        assert_eq!(h.app.table_state.selected(), Some(0));
        assert_eq!(h.app.status_line, "Disconnected");
    }

    #[tokio::test]
    async fn test_status_line_for_connected_record() {
        let backend = office_backend().with_statuses([connected()]);
        backend
            .sessions
            .borrow_mut()
            .push(live_session("Office-VPN", SESSION_PATH));
        let mut h = harness(backend);

        h.app.refresh().await;
        assert_eq!(h.app.status_line, "Connected to vpn.example.com");
    }

    #[tokio::test]
    async fn test_connect_asks_before_disconnecting_others() {
        let backend = office_backend();
        backend.profiles.borrow_mut().push(profile("Lab"));
        backend
            .sessions
            .borrow_mut()
            .push(live_session("Lab", "/net/openvpn/v3/sessions/lab"));
        let mut h = harness(backend);
        h.app.refresh().await;

        h.app.handle_key(key(KeyCode::Enter)).await;
        assert!(matches!(
            h.app.input_mode,
            InputMode::ConfirmDisconnectOthers { index: 0 }
        ));

        // Declining aborts without touching the other session
        h.app.handle_key(key(KeyCode::Char('n'))).await;
        assert!(matches!(h.app.input_mode, InputMode::Normal));
        assert_eq!(h.backend.sessions.borrow().len(), 1);

        h.app.handle_key(key(KeyCode::Enter)).await;
        h.app.handle_key(key(KeyCode::Char('y'))).await;
        assert!(h.backend.sessions.borrow().is_empty());
        let InputMode::Credentials(form) = &h.app.input_mode else {
            panic!("expected credentials dialog");
        };
        assert_eq!(form.profile.name, "Office-VPN");
    }

    #[tokio::test]
    async fn test_toggle_disconnects_connected_record() {
        let backend = office_backend().with_statuses([connected()]);
        backend
            .sessions
            .borrow_mut()
            .push(live_session("Office-VPN", SESSION_PATH));
        let mut h = harness(backend);
        h.app.refresh().await;

        h.app.handle_key(key(KeyCode::Char('c'))).await;
        assert_eq!(h.backend.count(&Call::Disconnect(SessionHandle::new(SESSION_PATH))), 1);
        assert!(!h.app.records[0].has_session());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_with_saved_username() {
        let backend = office_backend()
            .with_slots([credential_slot("username", 0), credential_slot("password", 1)])
            .with_ready([Err(BackendFault::new("Missing user credentials")), Ok(())])
            .with_statuses([connecting(), connected()]);
        let mut h = harness(backend);
        h.app.usernames.remember("Office-VPN", "alice").unwrap();

        LocalSet::new()
            .run_until(async {
                h.app.refresh().await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                let InputMode::Credentials(form) = &h.app.input_mode else {
                    panic!("expected credentials dialog");
                };
                assert_eq!(form.focus, CredentialField::Password);

                type_text(&mut h.app, "hunter2").await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                assert!(h.app.connection.is_connecting());
                assert_eq!(h.app.connection.connecting_profile(), Some("Office-VPN"));

                drive_connect(&mut h).await;
            })
            .await;

        assert_eq!(
            h.backend.provided(),
            vec![
                ("username".to_string(), "alice".to_string()),
                ("password".to_string(), "hunter2".to_string()),
            ]
        );
        assert!(h.app.fatal.is_none());
        assert_eq!(
            h.app.toast.as_ref().map(|t| t.toast_type),
            Some(ToastType::Success)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_password_keeps_saved_username() {
        let backend = office_backend()
            .with_slots([credential_slot("username", 0), credential_slot("password", 1)])
            .with_ready([Err(BackendFault::new("Missing user credentials"))]);
        let mut h = harness(backend);
        h.app.usernames.remember("Office-VPN", "alice").unwrap();

        LocalSet::new()
            .run_until(async {
                h.app.refresh().await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                drive_connect(&mut h).await;
            })
            .await;

        assert!(h.backend.provided().is_empty());
        assert_eq!(h.backend.count(&Call::Disconnect(SessionHandle::new(SESSION_PATH))), 1);
        assert_eq!(
            SavedUsernames::load(&h.app.paths.usernames_file())
                .unwrap()
                .get("Office-VPN"),
            Some("alice")
        );
        let toast = h.app.toast.as_ref().unwrap();
        assert_eq!(toast.toast_type, ToastType::Error);
        assert!(toast
            .message
            .contains("Password is required, but it was not provided."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_username_is_saved_on_submit() {
        let mut h = harness(office_backend().with_statuses([connecting(), connected()]));

        LocalSet::new()
            .run_until(async {
                h.app.refresh().await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                type_text(&mut h.app, "bob").await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                drive_connect(&mut h).await;
            })
            .await;

        assert_eq!(h.app.usernames.get("Office-VPN"), Some("bob"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_cleanup_stops_the_app() {
        let backend = office_backend()
            .with_statuses([connecting(), crate::state::StatusSnapshot::new(2, 10, "TLS error")]);
        *backend.disconnect_fault.borrow_mut() = Some(BackendFault::new("Session is gone"));
        let mut h = harness(backend);

        LocalSet::new()
            .run_until(async {
                h.app.refresh().await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                drive_connect(&mut h).await;
            })
            .await;

        assert!(h.app.should_quit);
        assert_eq!(h.app.fatal.as_ref().unwrap().message, "Session is gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_while_connecting_cancels_first() {
        let mut h = harness(office_backend().with_statuses([connecting()]));

        LocalSet::new()
            .run_until(async {
                h.app.refresh().await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                assert!(matches!(h.app.input_mode, InputMode::Credentials(_)));
                type_text(&mut h.app, "alice").await;
                h.app.handle_key(key(KeyCode::Enter)).await;
                assert!(h.app.connection.is_connecting());

                drive_until_phase(&mut h, ConnectPhase::AwaitingStatus).await;
                h.app.handle_key(key(KeyCode::Char('q'))).await;
                assert!(!h.app.should_quit);
                drive_connect(&mut h).await;
            })
            .await;

        assert!(h.app.should_quit);
        assert!(h.app.fatal.is_none());
        assert_eq!(h.backend.count(&Call::Disconnect(SessionHandle::new(SESSION_PATH))), 1);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut h = harness(office_backend());
        h.app.refresh().await;

        h.app.handle_key(key(KeyCode::Char('x'))).await;
        assert!(matches!(h.app.input_mode, InputMode::ConfirmDelete { .. }));
        h.app.handle_key(key(KeyCode::Esc)).await;
        assert_eq!(h.app.records.len(), 1);

        h.app.handle_key(key(KeyCode::Char('x'))).await;
        h.app.handle_key(key(KeyCode::Char('y'))).await;
        assert!(h.app.records.is_empty());
        assert_eq!(h.app.table_state.selected(), None);
    }

    #[tokio::test]
    async fn test_import_from_prompt() {
        let mut h = harness(MockBackend::new());
        let file = h.app.paths.config_dir.join("Lab.ovpn");
        std::fs::create_dir_all(&h.app.paths.config_dir).unwrap();
        std::fs::write(&file, "client\nremote lab.example.com 1194\n").unwrap();

        h.app.handle_key(key(KeyCode::Char('i'))).await;
        type_text(&mut h.app, file.to_str().unwrap()).await;
        h.app.handle_key(key(KeyCode::Enter)).await;

        assert_eq!(h.backend.count(&Call::Import("Lab".to_string())), 1);
        assert_eq!(h.app.records.len(), 1);
        assert_eq!(h.app.records[0].name, "Lab");
    }

    #[tokio::test]
    async fn test_import_error_shows_toast() {
        let mut h = harness(MockBackend::new());
        h.app.handle_key(key(KeyCode::Char('i'))).await;
        type_text(&mut h.app, "/nonexistent/x.ovpn").await;
        h.app.handle_key(key(KeyCode::Enter)).await;

        assert!(h.backend.calls().iter().all(|c| !matches!(c, Call::Import(_))));
        assert_eq!(
            h.app.toast.as_ref().map(|t| t.toast_type),
            Some(ToastType::Error)
        );
    }

    #[tokio::test]
    async fn test_selection_wraps() {
        let backend = office_backend();
        backend.profiles.borrow_mut().push(profile("Lab"));
        let mut h = harness(backend);
        h.app.refresh().await;

        h.app.handle_key(key(KeyCode::Up)).await;
        assert_eq!(h.app.table_state.selected(), Some(1));
        h.app.handle_key(key(KeyCode::Char('j'))).await;
        assert_eq!(h.app.table_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_log_is_capped() {
        let mut h = harness(MockBackend::new());
        for i in 0..(MAX_LOG_ENTRIES + 10) {
            h.app.log(&format!("line {i}"));
        }
        assert_eq!(h.app.logs.len(), MAX_LOG_ENTRIES);
        assert!(h.app.logs[0].ends_with("line 10"));
    }
}
