//! Last-used username per profile, persisted as JSON.
//!
//! The file is read once at startup and rewritten wholesale after every
//! change. There is no versioning.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Profile name → username map backed by a file.
#[derive(Debug, Clone)]
pub struct SavedUsernames {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl SavedUsernames {
    /// Loads the map, starting empty when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let entries = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    #[must_use]
    pub fn get(&self, profile: &str) -> Option<&str> {
        self.entries.get(profile).map(String::as_str)
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Records `username` for `profile` and persists immediately.
    ///
    /// Returns `false` without touching the file when nothing changed.
    pub fn remember(&mut self, profile: &str, username: &str) -> Result<bool, StoreError> {
        if self.get(profile) == Some(username) {
            return Ok(false);
        }
        self.entries
            .insert(profile.to_string(), username.to_string());
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(io_err)
    }
}
