//! `keel current` — show the VM recorded as current.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::vm_repo::VmRepo;
use crate::output::json;

/// Run the current command. Makes no cloud call.
///
/// # Errors
///
/// Returns an error if the deployment state cannot be read.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let repo = VmRepo::new(&app.state_mgr);
    let cid = repo.find_current().await?;
    let agent_id = repo.find_current_agent_id().await?;

    if app.is_json() {
        json::print(&serde_json::json!({
            "vm_cid": cid,
            "agent_id": agent_id,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    match cid {
        Some(cid) => {
            app.output.kv("vm cid", &cid);
            app.output.kv("agent id", agent_id.as_deref().unwrap_or("-"));
        }
        None => app.output.info("No current VM"),
    }
    Ok(ExitCode::SUCCESS)
}
