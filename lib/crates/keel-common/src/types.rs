use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Deployment-level state persisted to `deployment.json`.
///
/// keel owns only `current_vm_cid` and `current_agent_id`. Every other field is
/// carried through load/save untouched, including keys this version does not
/// know about (collected in `extra`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub director_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub installation_id: Option<String>,

    /// Cloud identifier of the VM currently designated as live.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub current_vm_cid: Option<String>,

    /// Agent identifier handed to the current VM at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub current_agent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub current_stemcell_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub current_disk_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub current_manifest_sha1: Option<String>,

    /// Fields written by other tools or newer versions.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Older state files encode "unset" as `""`. An empty identifier is never
/// valid, so both spellings load as `None`.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
