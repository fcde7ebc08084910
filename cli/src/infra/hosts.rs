//! Name resolution sinks.
//!
//! `HostsFileWriter` rewrites a hosts file so the new VM's hostname resolves
//! locally. `NoNameResolution` is used when the hosts file is disabled.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::NameResolutionSink;
use crate::domain::error::ResolutionError;
use crate::domain::vm::{NetworkIdentity, hosts_file_content};

/// Overwrites a hosts file with the loopback entry and the VM entry.
pub struct HostsFileWriter {
    path: PathBuf,
}

impl HostsFileWriter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NameResolutionSink for HostsFileWriter {
    async fn publish(&self, identity: &NetworkIdentity) -> Result<()> {
        let content = hosts_file_content(identity);
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| ResolutionError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), hostname = %identity.hostname, "hosts file updated");
        Ok(())
    }
}

/// Sink for providers whose VMs need no local name resolution.
pub struct NoNameResolution;

impl NameResolutionSink for NoNameResolution {
    fn wants_network_identity(&self) -> bool {
        false
    }

    async fn publish(&self, _: &NetworkIdentity) -> Result<()> {
        Ok(())
    }
}
