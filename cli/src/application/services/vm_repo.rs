//! Current VM record — the (CID, agent ID) pair designated as live.
//!
//! Every operation is a full load→modify→save of the deployment snapshot;
//! the store has no field-level write. There is no locking, so two processes
//! mutating the same state file race and the last save wins.

use keel_common::DeploymentState;

use crate::application::ports::DeploymentStateStore;
use crate::domain::error::StateError;

/// Reads and writes the current VM/agent identifiers of a deployment.
pub struct VmRepo<S> {
    store: S,
}

impl<S: DeploymentStateStore> VmRepo<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// CID of the current VM, or `None` if no VM is recorded.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Load` if the snapshot cannot be read.
    pub async fn find_current(&self) -> Result<Option<String>, StateError> {
        Ok(self.load().await?.current_vm_cid)
    }

    /// Agent ID of the current VM, or `None` if none is recorded.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Load` if the snapshot cannot be read.
    pub async fn find_current_agent_id(&self) -> Result<Option<String>, StateError> {
        Ok(self.load().await?.current_agent_id)
    }

    /// Record `cid` as the current VM, leaving the agent ID untouched.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the snapshot cannot be loaded or saved.
    pub async fn update_current(&self, cid: &str) -> Result<(), StateError> {
        self.mutate(|state| state.current_vm_cid = Some(cid.to_string()))
            .await
    }

    /// Record `agent_id` as the current agent, leaving the CID untouched.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the snapshot cannot be loaded or saved.
    pub async fn update_current_agent_id(&self, agent_id: &str) -> Result<(), StateError> {
        self.mutate(|state| state.current_agent_id = Some(agent_id.to_string()))
            .await
    }

    /// Record `cid` and `agent_id` together in a single save.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the snapshot cannot be loaded or saved.
    pub async fn update_current_with_agent(
        &self,
        cid: &str,
        agent_id: &str,
    ) -> Result<(), StateError> {
        self.mutate(|state| {
            state.current_vm_cid = Some(cid.to_string());
            state.current_agent_id = Some(agent_id.to_string());
        })
        .await
    }

    /// Forget the current VM and agent in a single save.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the snapshot cannot be loaded or saved.
    pub async fn clear_current(&self) -> Result<(), StateError> {
        self.mutate(|state| {
            state.current_vm_cid = None;
            state.current_agent_id = None;
        })
        .await
    }

    async fn load(&self) -> Result<DeploymentState, StateError> {
        self.store
            .load()
            .await
            .map_err(|e| StateError::Load(e.into()))
    }

    async fn mutate(&self, apply: impl FnOnce(&mut DeploymentState)) -> Result<(), StateError> {
        let mut state = self.load().await?;
        apply(&mut state);
        // An empty identifier is never valid; store it as unset.
        state.current_vm_cid = state.current_vm_cid.filter(|s| !s.is_empty());
        state.current_agent_id = state.current_agent_id.filter(|s| !s.is_empty());
        self.store
            .save(&state)
            .await
            .map_err(|e| StateError::Save(e.into()))
    }
}
