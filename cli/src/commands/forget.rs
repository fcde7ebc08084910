//! `keel forget` — clear the current VM record without touching the cloud.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::vm_repo::VmRepo;
use crate::output::json;

/// Arguments for the forget command.
#[derive(Args)]
pub struct ForgetArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run the forget command.
///
/// # Errors
///
/// Returns an error if the prompt fails or the state cannot be updated.
pub async fn run(app: &AppContext, args: &ForgetArgs) -> Result<ExitCode> {
    let repo = VmRepo::new(&app.state_mgr);
    let Some(cid) = repo.find_current().await? else {
        if app.is_json() {
            json::print(&serde_json::json!({ "forgotten": null }))?;
        } else {
            app.output.info("No current VM");
        }
        return Ok(ExitCode::SUCCESS);
    };

    if !args.yes
        && !app.confirm(
            &format!("Forget VM {cid}? It will keep running in the cloud"),
            false,
        )?
    {
        app.output.info("Aborted");
        return Ok(ExitCode::FAILURE);
    }

    repo.clear_current().await?;

    if app.is_json() {
        json::print(&serde_json::json!({ "forgotten": cid }))?;
    } else {
        app.output.success(&format!("Forgot VM {cid}"));
        app.output
            .warn("The VM was not deleted; remove it with your cloud provider's tools");
    }
    Ok(ExitCode::SUCCESS)
}
