//! `keel create-vm` — create the deployment VM and record it as current.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::NameResolutionSink;
use crate::application::services::config_service;
use crate::application::services::vm::VmManager;
use crate::application::services::vm_repo::VmRepo;
use crate::domain::manifest::Manifest;
use crate::domain::vm::CloudStemcell;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::cpi::CpiCloud;
use crate::infra::hosts::{HostsFileWriter, NoNameResolution};
use crate::infra::id::UuidGenerator;
use crate::output::{json, progress};

/// Arguments for the create-vm command.
#[derive(Args)]
pub struct CreateVmArgs {
    /// Deployment manifest (YAML)
    #[arg(long, value_name = "FILE")]
    pub manifest: PathBuf,

    /// CID of a stemcell already uploaded to the cloud
    #[arg(long, value_name = "CID")]
    pub stemcell_cid: String,
}

/// Run the create-vm command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or any provisioning step
/// fails. A VM whose CID was recorded before the failure stays current.
pub async fn run(app: &AppContext, args: &CreateVmArgs) -> Result<ExitCode> {
    let manifest = load_manifest(&args.manifest).await?;
    let config = config_service::load_config(&app.config_store)?;

    let runner = TokioCommandRunner::new(Duration::from_secs(config.cpi.timeout_secs));
    let cloud = CpiCloud::new(runner, config.cpi.command);
    let stemcell = CloudStemcell::new(args.stemcell_cid.as_str());

    let (cid, agent_id) = if config.hosts.enabled {
        create(app, cloud, HostsFileWriter::new(config.hosts.path), &stemcell, &manifest).await?
    } else {
        create(app, cloud, NoNameResolution, &stemcell, &manifest).await?
    };

    if app.is_json() {
        json::print(&serde_json::json!({
            "vm_cid": cid,
            "agent_id": agent_id,
        }))?;
    } else {
        app.output.success(&format!("Created VM {cid}"));
        app.output.kv("agent id", &agent_id);
    }
    Ok(ExitCode::SUCCESS)
}

async fn create(
    app: &AppContext,
    cloud: CpiCloud<TokioCommandRunner>,
    names: impl NameResolutionSink,
    stemcell: &CloudStemcell,
    manifest: &Manifest,
) -> Result<(String, String)> {
    let manager = VmManager::new(VmRepo::new(&app.state_mgr), cloud, UuidGenerator, names);

    let spinner = (app.output.show_progress() && !app.is_json())
        .then(|| progress::spinner(&format!("Creating VM from stemcell {}", stemcell.cid())));

    let result = manager.create(stemcell, manifest).await;
    let vm = match result {
        Ok(vm) => vm,
        Err(e) => {
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            return Err(e);
        }
    };
    if let Some(pb) = spinner {
        progress::finish_ok(&pb, &format!("VM {} created", vm.cid()));
    }

    let agent_id = vm.agent_id().unwrap_or_default().to_string();
    Ok((vm.cid().to_string(), agent_id))
}

async fn load_manifest(path: &std::path::Path) -> Result<Manifest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading manifest {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("parsing manifest {}", path.display()))
}
