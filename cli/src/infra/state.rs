//! Infrastructure implementation of the `DeploymentStateStore` port.
//!
//! `StateManager` provides async load/save using `tokio::task::spawn_blocking`
//! with atomic write (temp file + rename) so a crash mid-save never leaves a
//! truncated snapshot behind.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use keel_common::DeploymentState;

use crate::application::ports::DeploymentStateStore;

/// Environment variable overriding the deployment state location.
pub const STATE_ENV: &str = "KEEL_STATE";

/// Deployment state file manager.
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// Create a state manager using `$KEEL_STATE` or `~/.keel/deployment.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        if let Ok(val) = std::env::var(STATE_ENV) {
            return Ok(Self::with_path(PathBuf::from(val)));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".keel").join("deployment.json")))
    }

    /// Create a state manager with an explicit path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_sync(path: &Path) -> Result<DeploymentState> {
        if !path.exists() {
            return Ok(DeploymentState::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading state file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(DeploymentState::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("parsing state file {}", path.display()))
    }

    fn save_sync(path: &Path, state: &DeploymentState) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
        let content = serde_json::to_string_pretty(state).context("serializing state")?;

        // Temp file in the same directory so the rename stays on one filesystem.
        // `tempfile` creates it with mode 600 on unix.
        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("writing temp file {}", temp.path().display()))?;
        temp.as_file()
            .sync_all()
            .with_context(|| format!("syncing temp file {}", temp.path().display()))?;
        temp.persist(path)
            .with_context(|| format!("finalizing state file {}", path.display()))?;
        Ok(())
    }
}

impl DeploymentStateStore for StateManager {
    async fn load(&self) -> Result<DeploymentState> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || StateManager::load_sync(&path))
            .await
            .context("state load task panicked")?
    }

    async fn save(&self, state: &DeploymentState) -> Result<()> {
        let path = self.path.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || StateManager::save_sync(&path, &state))
            .await
            .context("state save task panicked")?
    }
}
