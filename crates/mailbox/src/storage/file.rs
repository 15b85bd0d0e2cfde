//! JSON-file identity store in the SwiftMail config directory

use anyhow::Context;
use log::warn;
use std::path::{Path, PathBuf};

use super::IdentityStore;
use crate::error::Result;
use crate::models::{Identity, RetentionPolicy};

const IDENTITY_FILE: &str = "identity.json";
const RETENTION_FILE: &str = "retention.json";

/// Stores the identity and retention policy as JSON files.
///
/// Writes go through a temp-file rename (see `config::save_json_file`),
/// so the identity record is always either fully present or absent.
pub struct FileIdentityStore {
    identity_path: PathBuf,
    retention_path: PathBuf,
}

impl FileIdentityStore {
    /// Store backed by the shared SwiftMail config directory
    pub fn new() -> Result<Self> {
        let dir = config::ensure_config_dir()?;
        Ok(Self::at(&dir))
    }

    /// Store backed by an arbitrary directory
    pub fn at(dir: &Path) -> Self {
        Self {
            identity_path: dir.join(IDENTITY_FILE),
            retention_path: dir.join(RETENTION_FILE),
        }
    }

    fn load_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }
        match config::load_json_file(path) {
            Ok(value) => Some(value),
            Err(e) => {
                // Unreadable state is treated as absent rather than fatal
                warn!("ignoring unreadable state file {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<Identity>> {
        Ok(Self::load_optional(&self.identity_path))
    }

    fn save(&self, identity: &Identity) -> Result<()> {
        config::save_json_file(&self.identity_path, identity)
            .context("saving identity")
            .map_err(Into::into)
    }

    fn clear(&self) -> Result<()> {
        config::remove_file(&self.identity_path)
            .context("clearing identity")
            .map_err(Into::into)
    }

    fn load_policy(&self) -> Result<Option<RetentionPolicy>> {
        Ok(Self::load_optional(&self.retention_path))
    }

    fn save_policy(&self, policy: &RetentionPolicy) -> Result<()> {
        config::save_json_file(&self.retention_path, policy)
            .context("saving retention policy")
            .map_err(Into::into)
    }
}
