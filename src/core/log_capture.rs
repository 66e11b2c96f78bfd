//! Background capture of a session's backend log.
//!
//! `openvpn3 log` follows one session and prints its log lines; its output
//! is appended to a file in the logs directory so a failed attempt can be
//! inspected after the session is gone.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::constants;
use crate::state::SessionHandle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogCapture {
    program: String,
    log_level: u8,
    file: PathBuf,
    rotate_bytes: u64,
}

impl LogCapture {
    pub fn new(file: impl Into<PathBuf>, log_level: u8, rotate_bytes: u64) -> Self {
        Self {
            program: constants::LOG_CAPTURE_PROGRAM.to_string(),
            log_level,
            file: file.into(),
            rotate_bytes,
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Starts following `session`. The child is not waited on by the caller;
    /// tokio reaps it once it exits.
    pub fn spawn(&self, session: &SessionHandle) -> io::Result<Child> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }
        self.rotate_if_needed()?;

        let stdout = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        let stderr = stdout.try_clone()?;

        let child = Command::new(&self.program)
            .arg("log")
            .arg("--log-level")
            .arg(self.log_level.to_string())
            .arg("--session-path")
            .arg(session.as_str())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()?;

        tracing::info!(
            session = %session,
            file = %self.file.display(),
            pid = ?child.id(),
            "log capture started"
        );
        Ok(child)
    }

    /// Moves the capture file aside once it grows past the threshold,
    /// replacing any earlier backup. Returns whether a rotation happened.
    pub fn rotate_if_needed(&self) -> io::Result<bool> {
        let size = match fs::metadata(&self.file) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if size <= self.rotate_bytes {
            return Ok(false);
        }

        let backup = self.backup_path();
        fs::rename(&self.file, &backup)?;
        tracing::debug!(size, backup = %backup.display(), "rotated session log");
        Ok(true)
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self
            .file
            .file_name()
            .map_or_else(OsString::new, ToOwned::to_owned);
        name.push(".old");
        self.file.with_file_name(name)
    }
}
