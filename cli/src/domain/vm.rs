//! VM domain types and pure helpers.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use std::fmt;

use serde::Serialize;

/// Director name reported in VM metadata tags.
pub const DIRECTOR_NAME: &str = "keel";

/// Instance index reported in VM metadata. keel deploys exactly one instance.
pub const INSTANCE_INDEX: &str = "0";

/// Default location of the host-resolution file.
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// A stemcell that already exists in the cloud, referenced by its CID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudStemcell {
    cid: String,
}

impl CloudStemcell {
    #[must_use]
    pub fn new(cid: impl Into<String>) -> Self {
        Self { cid: cid.into() }
    }

    #[must_use]
    pub fn cid(&self) -> &str {
        &self.cid
    }
}

/// Tags attached to a freshly created VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmMetadata {
    pub deployment: String,
    pub job: String,
    pub index: String,
    pub director: String,
}

impl VmMetadata {
    /// Metadata for the single instance of `job` in `deployment`.
    #[must_use]
    pub fn for_job(deployment: &str, job: &str) -> Self {
        Self {
            deployment: deployment.to_string(),
            job: job.to_string(),
            index: INSTANCE_INDEX.to_string(),
            director: DIRECTOR_NAME.to_string(),
        }
    }
}

impl fmt::Display for VmMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deployment={} job={} index={} director={}",
            self.deployment, self.job, self.index, self.director
        )
    }
}

/// Realized network identity of a running VM, as reported by the cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
    pub hostname: String,
    pub private_ip: String,
}

/// Render the host-resolution file for `identity`.
///
/// Always exactly two lines: the loopback entry followed by the VM entry.
#[must_use]
pub fn hosts_file_content(identity: &NetworkIdentity) -> String {
    format!(
        "127.0.0.1 localhost\n{} {}\n",
        identity.private_ip, identity.hostname
    )
}
