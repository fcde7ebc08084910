//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` (and the shared state type) —
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::Output;

use anyhow::Result;
use keel_common::DeploymentState;

use crate::domain::{
    CloudError, KeelConfig, NetworkIdentity, NetworkInterfaces, Properties, VmMetadata,
};

// ── Cloud Port ────────────────────────────────────────────────────────────────

/// Cloud provider operations needed to bring up a VM.
///
/// Every failure carries a `CloudErrorKind` so callers can tolerate specific
/// kinds (e.g. `NotImplemented`) by matching rather than by inspecting text.
#[allow(async_fn_in_trait)]
pub trait Cloud {
    /// Create a VM from `stemcell_cid` and return its cloud identifier.
    async fn create_vm(
        &self,
        agent_id: &str,
        stemcell_cid: &str,
        cloud_properties: &Properties,
        networks: &NetworkInterfaces,
        env: &Properties,
    ) -> Result<String, CloudError>;

    /// Attach metadata tags to an existing VM.
    async fn set_vm_metadata(&self, cid: &str, metadata: &VmMetadata) -> Result<(), CloudError>;

    /// Look up the realized hostname and private IP of an existing VM.
    async fn find_vm(&self, cid: &str) -> Result<NetworkIdentity, CloudError>;
}

// ── Identity Port ─────────────────────────────────────────────────────────────

/// Source of agent identifiers. Implementations must not repeat an ID.
pub trait IdGenerator {
    /// Generate a fresh identifier.
    fn generate(&self) -> Result<String>;
}

// ── Name Resolution Port ──────────────────────────────────────────────────────

/// Optional sink that makes a new VM reachable by name from this host.
///
/// Providers whose VMs are reachable without local name resolution use a sink
/// that returns `false` from `wants_network_identity`, in which case the
/// coordinator never queries the cloud for the VM's network identity.
#[allow(async_fn_in_trait)]
pub trait NameResolutionSink {
    /// Whether the coordinator should resolve and publish the VM's identity.
    fn wants_network_identity(&self) -> bool {
        true
    }

    /// Publish `identity` for subsequent agent communication.
    async fn publish(&self, identity: &NetworkIdentity) -> Result<()>;
}

// ── State and Config Ports ────────────────────────────────────────────────────

/// Whole-snapshot persistence of deployment state.
///
/// There is no field-level write: callers load the full snapshot, modify it,
/// and save it back. Implementations assume a single writer.
#[allow(async_fn_in_trait)]
pub trait DeploymentStateStore {
    /// Load the snapshot, returning an empty one if nothing was saved yet.
    async fn load(&self) -> Result<DeploymentState>;
    /// Replace the persisted snapshot with `state`.
    async fn save(&self, state: &DeploymentState) -> Result<()>;
}

/// Abstracts user configuration persistence.
pub trait ConfigStore {
    /// Load configuration, returning defaults if no file exists.
    fn load(&self) -> Result<KeelConfig>;
    /// Persist configuration.
    fn save(&self, config: &KeelConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with stdin piped from `stdin` and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds the
    /// runner's timeout. On timeout, the child process must be killed.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Borrowed adapters ─────────────────────────────────────────────────────────

impl<T: Cloud + ?Sized> Cloud for &T {
    async fn create_vm(
        &self,
        agent_id: &str,
        stemcell_cid: &str,
        cloud_properties: &Properties,
        networks: &NetworkInterfaces,
        env: &Properties,
    ) -> Result<String, CloudError> {
        (**self)
            .create_vm(agent_id, stemcell_cid, cloud_properties, networks, env)
            .await
    }

    async fn set_vm_metadata(&self, cid: &str, metadata: &VmMetadata) -> Result<(), CloudError> {
        (**self).set_vm_metadata(cid, metadata).await
    }

    async fn find_vm(&self, cid: &str) -> Result<NetworkIdentity, CloudError> {
        (**self).find_vm(cid).await
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for &T {
    fn generate(&self) -> Result<String> {
        (**self).generate()
    }
}

impl<T: NameResolutionSink + ?Sized> NameResolutionSink for &T {
    fn wants_network_identity(&self) -> bool {
        (**self).wants_network_identity()
    }

    async fn publish(&self, identity: &NetworkIdentity) -> Result<()> {
        (**self).publish(identity).await
    }
}

impl<T: DeploymentStateStore + ?Sized> DeploymentStateStore for &T {
    async fn load(&self) -> Result<DeploymentState> {
        (**self).load().await
    }

    async fn save(&self, state: &DeploymentState) -> Result<()> {
        (**self).save(state).await
    }
}
