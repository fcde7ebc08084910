//! `Cloud` port backed by an external CPI executable.
//!
//! Each call runs the executable once, writes a JSON request to its stdin and
//! reads a JSON response from its stdout:
//!
//! ```json
//! {"method": "create_vm", "arguments": [...], "context": {"director_uuid": "keel"}}
//! {"result": "i-0abc", "error": null, "log": ""}
//! ```
//!
//! A non-null `error` carries a provider error type that maps onto
//! `CloudErrorKind`. Anything else going wrong (spawn, exit code, garbage on
//! stdout) is a `Protocol` error.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::application::ports::{Cloud, CommandRunner};
use crate::domain::error::{CloudError, CloudErrorKind};
use crate::domain::manifest::{NetworkInterfaces, Properties};
use crate::domain::vm::{DIRECTOR_NAME, NetworkIdentity, VmMetadata};

#[derive(Debug, Serialize)]
struct CpiRequest<'a> {
    method: &'a str,
    arguments: Vec<Value>,
    context: Value,
}

#[derive(Debug, Deserialize)]
struct CpiResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<CpiResponseError>,
    #[serde(default)]
    log: String,
}

#[derive(Debug, Deserialize)]
struct CpiResponseError {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    ok_to_retry: bool,
}

#[derive(Debug, Deserialize)]
struct FindVmResult {
    hostname: String,
    private_ip: String,
}

/// Cloud provider reached through a CPI executable.
pub struct CpiCloud<R> {
    runner: R,
    command: String,
}

impl<R: CommandRunner> CpiCloud<R> {
    pub fn new(runner: R, command: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
        }
    }

    async fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Value, CloudError> {
        let protocol = |message: String| CloudError::new(CloudErrorKind::Protocol, method, message);

        let request = CpiRequest {
            method,
            arguments,
            context: json!({ "director_uuid": DIRECTOR_NAME }),
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| protocol(format!("encoding request: {e}")))?;

        debug!(command = %self.command, method, "calling cpi");
        let output = self
            .runner
            .run_with_stdin(&self.command, &[], &body)
            .await
            .map_err(|e| protocol(format!("{e:#}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(protocol(format!(
                "cpi exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let response: CpiResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| protocol(format!("decoding response: {e}")))?;
        if !response.log.is_empty() {
            trace!(method, log = %response.log, "cpi log");
        }

        match response.error {
            None => Ok(response.result),
            Some(err) => {
                debug!(method, error_type = %err.error_type, ok_to_retry = err.ok_to_retry, "cpi returned error");
                Err(CloudError::new(
                    CloudErrorKind::from_cpi_type(&err.error_type),
                    method,
                    err.message,
                ))
            }
        }
    }
}

impl<R: CommandRunner> Cloud for CpiCloud<R> {
    async fn create_vm(
        &self,
        agent_id: &str,
        stemcell_cid: &str,
        cloud_properties: &Properties,
        networks: &NetworkInterfaces,
        env: &Properties,
    ) -> Result<String, CloudError> {
        let result = self
            .call(
                "create_vm",
                vec![
                    json!(agent_id),
                    json!(stemcell_cid),
                    json!(cloud_properties),
                    json!(networks),
                    json!([]),
                    json!(env),
                ],
            )
            .await?;
        match result {
            Value::String(cid) if !cid.is_empty() => Ok(cid),
            other => Err(CloudError::new(
                CloudErrorKind::Protocol,
                "create_vm",
                format!("expected a non-empty VM CID, got {other}"),
            )),
        }
    }

    async fn set_vm_metadata(&self, cid: &str, metadata: &VmMetadata) -> Result<(), CloudError> {
        self.call("set_vm_metadata", vec![json!(cid), json!(metadata)])
            .await
            .map(drop)
    }

    async fn find_vm(&self, cid: &str) -> Result<NetworkIdentity, CloudError> {
        let result = self.call("find_vm", vec![json!(cid)]).await?;
        let found: FindVmResult = serde_json::from_value(result).map_err(|e| {
            CloudError::new(
                CloudErrorKind::Protocol,
                "find_vm",
                format!("decoding vm details: {e}"),
            )
        })?;
        Ok(NetworkIdentity {
            hostname: found.hostname,
            private_ip: found.private_ip,
        })
    }
}
