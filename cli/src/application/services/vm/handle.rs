//! Handle to a VM created (or previously recorded) by `VmManager`.

use crate::application::ports::DeploymentStateStore;
use crate::application::services::vm_repo::VmRepo;
use crate::domain::error::StateError;

/// A VM bound to its cloud identifier.
///
/// Only `VmManager` constructs handles. The handle borrows the manager's
/// record store; it does not own it.
pub struct Vm<'a, S> {
    cid: String,
    agent_id: Option<String>,
    repo: &'a VmRepo<S>,
}

impl<'a, S: DeploymentStateStore> Vm<'a, S> {
    pub(crate) fn new(cid: String, agent_id: Option<String>, repo: &'a VmRepo<S>) -> Self {
        Self { cid, agent_id, repo }
    }

    #[must_use]
    pub fn cid(&self) -> &str {
        &self.cid
    }

    /// Agent ID the VM was created with, if it was recorded.
    #[must_use]
    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    /// Whether the deployment state still designates this VM as current.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Load` if the snapshot cannot be read.
    pub async fn is_current(&self) -> Result<bool, StateError> {
        Ok(self.repo.find_current().await?.as_deref() == Some(self.cid.as_str()))
    }
}

impl<S> std::fmt::Debug for Vm<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vm")
            .field("cid", &self.cid)
            .field("agent_id", &self.agent_id)
            .finish_non_exhaustive()
    }
}
