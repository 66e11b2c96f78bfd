//! Reads an `.ovpn` profile from disk before handing it to the backend.

use std::fs;
use std::path::{Path, PathBuf};

/// Profile text ready to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSource {
    /// Name the profile is imported under.
    pub name: String,
    pub contents: String,
    pub path: PathBuf,
}

/// Helper to expand paths with ~ to standard `PathBuf`
pub fn expand_home(path_str: &str) -> PathBuf {
    if let Some(stripped) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path_str)
}

/// Loads the profile at `input` (a path, `~` allowed).
///
/// The name is `name` when given, else the file stem.
pub fn read_profile(input: &str, name: Option<&str>) -> Result<ProfileSource, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("No path given".to_string());
    }

    let path = expand_home(input);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()));
    }
    if !path.is_file() {
        return Err(format!("Not a file: {}", path.display()));
    }

    let contents = fs::read_to_string(&path).map_err(|e| format!("Failed to read file: {e}"))?;
    if !has_remote(&contents) {
        return Err("No 'remote' directive found in OpenVPN config".to_string());
    }

    let name = match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => profile_name(&path)?,
    };

    Ok(ProfileSource {
        name,
        contents,
        path,
    })
}

fn profile_name(path: &Path) -> Result<String, String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| format!("Cannot derive a profile name from {}", path.display()))
}

/// Whether the config names at least one server, directly or in a
/// `<connection>` block.
fn has_remote(content: &str) -> bool {
    content.lines().any(|line| {
        let mut words = line.split_whitespace();
        words
            .next()
            .is_some_and(|directive| directive.eq_ignore_ascii_case("remote"))
            && words.next().is_some()
    })
}
