//! Application-wide constants.
//!
//! Timing defaults for the connect handshake, file names inside the config
//! directory, and UI messages.

#![allow(dead_code)]
use std::time::Duration;

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Timing Defaults ===

/// UI tick rate in milliseconds.
pub const DEFAULT_TICK_RATE_MS: u64 = 250;
/// How long the status poller waits for a terminal state.
pub const DEFAULT_STATUS_DEADLINE: Duration = Duration::from_secs(15);
/// Poller wake-up interval; cancellation is observed at this granularity.
pub const DEFAULT_POLL_TICK: Duration = Duration::from_millis(100);
/// Minimum spacing between two status queries.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(1);
/// Delay before retrying Ready/Connect after a "not ready" fault.
pub const DEFAULT_READY_RETRY: Duration = Duration::from_millis(500);
/// Status queries made while a fresh session object settles.
pub const DEFAULT_SETTLE_ATTEMPTS: u32 = 10;
/// Delay between two settle queries.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(100);
/// Grace period for the log capture before a failed session is torn down.
pub const DEFAULT_LOG_FLUSH: Duration = Duration::from_secs(1);
/// Seconds between background refreshes of the record list.
pub const DEFAULT_REFRESH_SECS: u64 = 5;
/// Minutes without key input before the TUI exits on its own.
pub const DEFAULT_IDLE_EXIT_MINUTES: u64 = 15;

// === Path Configuration ===

/// Name of the config directory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "ovpn3-tui";
/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Name of the saved-usernames file.
pub const USERNAMES_FILE_NAME: &str = "usernames.json";
/// Name of the logs subdirectory.
pub const LOGS_DIR_NAME: &str = "logs";
/// File the `openvpn3 log` capture appends to.
pub const SESSION_LOG_FILE_NAME: &str = "session.log";
/// File the tracing subscriber writes to.
pub const DIAGNOSTICS_LOG_FILE_NAME: &str = "ovpn3-tui.log";
/// Session log size that triggers rotation to `.old`.
pub const DEFAULT_LOG_ROTATE_BYTES: u64 = 1024 * 1024;
/// Verbosity passed to `openvpn3 log --log-level`.
pub const DEFAULT_CAPTURE_LOG_LEVEL: u8 = 6;
/// Program used for session log capture.
pub const LOG_CAPTURE_PROGRAM: &str = "openvpn3";

/// Fault text openvpn3 uses when Ready/Connect needs user input.
pub const FAULT_MISSING_CREDENTIALS: &str = "Missing user credentials";
/// Fault text fragment openvpn3 uses while the backend process starts.
pub const FAULT_NOT_READY: &str = "not ready";

// === UI Messages ===

pub const MSG_DISCONNECTED: &str = "Disconnected";
pub const MSG_NO_RECORDS: &str = "No profiles imported. Press [i] to import one.";
pub const MSG_CONNECT_IN_PROGRESS: &str = "Connection in progress...";
pub const MSG_SELECT_FIRST: &str = "Select a profile first";
pub const MSG_STALE_SESSION: &str = "Stale session: profile no longer exists";
pub const PROMPT_DISCONNECT_OTHERS: &str =
    "This will disconnect you from other active sessions. Proceed?";
pub const PROMPT_DELETE_PROFILE: &str = "Do you want to delete this VPN profile?";

// === UI Labels & Titles ===

pub const TITLE_IMPORT_PROFILE: &str = " Import VPN Profile ";
pub const TITLE_IMPORT_FOOTER: &str = " [Enter] Import  [Esc] Cancel ";
pub const PROMPT_IMPORT_PATH: &str = "Enter path to an .ovpn profile:";
pub const TITLE_CREDENTIALS: &str = " Connect ";
pub const TITLE_CREDENTIALS_FOOTER: &str = " [Tab] Next  [Enter] Connect  [Esc] Cancel ";
pub const TITLE_PROGRESS_FOOTER: &str = " [Esc] Cancel ";
pub const LABEL_PROFILE: &str = "OpenVPN Profile";
pub const LABEL_SESSION: &str = "Session";

// === Messages: CLI Output ===

pub const CLI_MSG_IMPORT_SUCCESS: &str = "Imported profile: ";
pub const CLI_MSG_IMPORT_DETAILS_PATH: &str = "   Object: ";
pub const CLI_MSG_REMOVED: &str = "Removed profile: ";
pub const CLI_MSG_DISCONNECTED: &str = "Disconnected session: ";
pub const CLI_MSG_NO_SESSIONS: &str = "No active sessions";
pub const CLI_MSG_NO_PROFILES: &str = "No profiles imported";
pub const CLI_MSG_UNKNOWN_PROFILE: &str = "No profile named ";
