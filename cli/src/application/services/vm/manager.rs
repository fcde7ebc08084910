//! VM provisioning coordinator.
//!
//! `create` sequences the cloud calls so that a VM never exists in the cloud
//! without its CID having been recorded first. Nothing is retried, rolled
//! back, or deleted here: after a failure the caller gets the error and, if
//! the VM was already recorded, `find_current` still locates it.
//!
//! Imports only from `crate::domain` and `crate::application`.

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::application::ports::{Cloud, DeploymentStateStore, IdGenerator, NameResolutionSink};
use crate::application::services::vm::handle::Vm;
use crate::application::services::vm_repo::VmRepo;
use crate::domain::error::ResolutionError;
use crate::domain::manifest::{Manifest, NetworkInterfaces, ResourcePool};
use crate::domain::vm::{CloudStemcell, VmMetadata};

/// Creates the deployment's VM and tracks which VM is current.
pub struct VmManager<S, C, G, N> {
    repo: VmRepo<S>,
    cloud: C,
    ids: G,
    names: N,
}

impl<S, C, G, N> VmManager<S, C, G, N>
where
    S: DeploymentStateStore,
    C: Cloud,
    G: IdGenerator,
    N: NameResolutionSink,
{
    #[must_use]
    pub fn new(repo: VmRepo<S>, cloud: C, ids: G, names: N) -> Self {
        Self {
            repo,
            cloud,
            ids,
            names,
        }
    }

    /// The record store this manager writes to.
    #[must_use]
    pub fn repo(&self) -> &VmRepo<S> {
        &self.repo
    }

    /// Handle to the currently recorded VM, if any. Makes no cloud call.
    ///
    /// # Errors
    ///
    /// Returns an error if the deployment state cannot be read.
    pub async fn find_current(&self) -> Result<Option<Vm<'_, S>>> {
        let Some(cid) = self
            .repo
            .find_current()
            .await
            .context("finding currently deployed vm")?
        else {
            return Ok(None);
        };
        let agent_id = self
            .repo
            .find_current_agent_id()
            .await
            .context("finding agent of currently deployed vm")?;
        Ok(Some(Vm::new(cid, agent_id, &self.repo)))
    }

    /// Create a VM for the manifest's job from `stemcell`.
    ///
    /// The CID and agent ID are persisted in one save as soon as the cloud
    /// returns the CID, before metadata tagging and name resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. A metadata error of kind
    /// `NotImplemented` is tolerated.
    pub async fn create(&self, stemcell: &CloudStemcell, manifest: &Manifest) -> Result<Vm<'_, S>> {
        let job_name = manifest.job_name().context("getting job name")?;
        let networks = manifest
            .network_interfaces(job_name)
            .context("getting network spec")?;
        debug!(?networks, "creating VM with network interfaces");

        let pool = manifest
            .resource_pool(job_name)
            .with_context(|| format!("getting resource pool for job '{job_name}'"))?;

        let agent_id = self.ids.generate().context("generating agent ID")?;

        let cid = self
            .create_and_record(&agent_id, stemcell, pool, &networks)
            .await?;

        let metadata = VmMetadata::for_job(&manifest.name, job_name);
        match self.cloud.set_vm_metadata(&cid, &metadata).await {
            Ok(()) => {}
            Err(e) if e.is_not_implemented() => {
                debug!(%cid, "cloud does not support VM metadata, skipping");
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("setting VM metadata to {metadata}")));
            }
        }

        if self.names.wants_network_identity() {
            let identity = self
                .cloud
                .find_vm(&cid)
                .await
                .map_err(|source| ResolutionError::Lookup {
                    cid: cid.clone(),
                    source,
                })?;
            debug!(%cid, hostname = %identity.hostname, ip = %identity.private_ip, "resolved vm network identity");
            self.names
                .publish(&identity)
                .await
                .with_context(|| format!("publishing name resolution for vm '{cid}'"))?;
        }

        Ok(Vm::new(cid, Some(agent_id), &self.repo))
    }

    async fn create_and_record(
        &self,
        agent_id: &str,
        stemcell: &CloudStemcell,
        pool: &ResourcePool,
        networks: &NetworkInterfaces,
    ) -> Result<String> {
        let cid = self
            .cloud
            .create_vm(
                agent_id,
                stemcell.cid(),
                &pool.cloud_properties,
                networks,
                &pool.env,
            )
            .await
            .with_context(|| format!("creating vm with stemcell cid '{}'", stemcell.cid()))?;
        info!(%cid, %agent_id, "vm created");

        // Record immediately so the VM is never leaked.
        if let Err(e) = self.repo.update_current_with_agent(&cid, agent_id).await {
            error!(
                %cid,
                %agent_id,
                error = %e,
                "vm exists in the cloud but could not be recorded; reconcile manually"
            );
            return Err(anyhow::Error::new(e).context(format!("updating current vm record for '{cid}'")));
        }

        Ok(cid)
    }
}
