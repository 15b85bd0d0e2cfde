//! Configuration loading for SwiftMail applications
//!
//! Provides utilities for reading and writing JSON state files in the
//! shared SwiftMail config directory (~/.config/swiftmail/).
//!
//! Call [`init`] at application startup to bootstrap the config directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Initialize the SwiftMail config directory.
///
/// Creates ~/.config/swiftmail/ if it doesn't exist.
/// Call this once at application startup.
pub fn init() -> Result<PathBuf> {
    ensure_config_dir()
}

/// Get the SwiftMail config directory (~/.config/swiftmail/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("swiftmail"))
}

/// Get the path to a state file within the SwiftMail config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Load and parse a JSON state file from the SwiftMail config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

/// Check if a state file exists in the SwiftMail config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the SwiftMail config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Save a value as JSON to a state file in the SwiftMail config directory
pub fn save_json<T: serde::Serialize>(filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir()?;
    save_json_file(&dir.join(filename), value)
}

/// Save a value as JSON to an arbitrary path.
///
/// Writes to a temporary sibling file and renames it into place, so a
/// crash mid-write never leaves a partially written state file behind.
pub fn save_json_file<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)
        .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace state file: {}", path.display()))?;
    Ok(())
}

/// Remove a state file at an arbitrary path. Missing files are not an error.
pub fn remove_file(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove state file: {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with("swiftmail"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path("identity.json");
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.ends_with("swiftmail/identity.json"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        save_json_file(&path, &serde_json::json!({"enabled": true})).unwrap();
        let value: serde_json::Value = load_json_file(&path).unwrap();
        assert_eq!(value["enabled"], true);

        // No stray temp file left behind
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        remove_file(&dir.path().join("does-not-exist.json")).unwrap();
    }
}
