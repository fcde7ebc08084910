//! Deployment manifest types and job-level resolution.
//!
//! Pure functions only — parsing happens in the command layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::ManifestError;

/// Free-form provider properties (`cloud_properties`, `env`, interface specs).
pub type Properties = Map<String, Value>;

/// Network interfaces handed to the cloud, keyed by network name.
pub type NetworkInterfaces = BTreeMap<String, Properties>;

/// A deployment manifest describing a single-job deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub resource_pools: Vec<ResourcePool>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    #[serde(rename = "type", default = "default_network_type")]
    pub kind: String,
    #[serde(default)]
    pub cloud_properties: Properties,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

fn default_network_type() -> String {
    "manual".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subnet {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub dns: Vec<String>,
    #[serde(default)]
    pub cloud_properties: Properties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub name: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub cloud_properties: Properties,
    #[serde(default)]
    pub env: Properties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default = "default_instances")]
    pub instances: u32,
    pub resource_pool: String,
    #[serde(default)]
    pub networks: Vec<JobNetwork>,
}

fn default_instances() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobNetwork {
    pub name: String,
    #[serde(default)]
    pub static_ips: Vec<String>,
    #[serde(default)]
    pub default: Vec<String>,
}

impl Manifest {
    /// Name of the job being deployed. keel deploys the first job only.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::NoJobs` if the manifest declares no jobs.
    pub fn job_name(&self) -> Result<&str, ManifestError> {
        self.jobs
            .first()
            .map(|j| j.name.as_str())
            .ok_or(ManifestError::NoJobs)
    }

    fn job(&self, name: &str) -> Result<&Job, ManifestError> {
        self.jobs
            .iter()
            .find(|j| j.name == name)
            .ok_or_else(|| ManifestError::JobNotFound(name.to_string()))
    }

    /// Interface specs for every network the job is attached to.
    ///
    /// Manual networks take their first static IP and the addressing of their
    /// first subnet; other network types carry only type and cloud properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the job or one of its networks is not declared.
    pub fn network_interfaces(&self, job_name: &str) -> Result<NetworkInterfaces, ManifestError> {
        let job = self.job(job_name)?;
        let mut interfaces = NetworkInterfaces::new();

        for job_net in &job.networks {
            let network = self
                .networks
                .iter()
                .find(|n| n.name == job_net.name)
                .ok_or_else(|| ManifestError::NetworkNotFound {
                    job: job_name.to_string(),
                    network: job_net.name.clone(),
                })?;

            let mut spec = Properties::new();
            spec.insert("type".into(), Value::from(network.kind.as_str()));

            let mut cloud_properties = network.cloud_properties.clone();
            if network.kind == "manual" {
                if let Some(ip) = job_net.static_ips.first() {
                    spec.insert("ip".into(), Value::from(ip.as_str()));
                }
                if let Some(subnet) = network.subnets.first() {
                    if let Some(netmask) = &subnet.netmask {
                        spec.insert("netmask".into(), Value::from(netmask.as_str()));
                    }
                    if let Some(gateway) = &subnet.gateway {
                        spec.insert("gateway".into(), Value::from(gateway.as_str()));
                    }
                    if !subnet.dns.is_empty() {
                        spec.insert("dns".into(), Value::from(subnet.dns.clone()));
                    }
                    cloud_properties.extend(subnet.cloud_properties.clone());
                }
            }
            if !job_net.default.is_empty() {
                spec.insert("default".into(), Value::from(job_net.default.clone()));
            }
            spec.insert("cloud_properties".into(), Value::Object(cloud_properties));

            interfaces.insert(job_net.name.clone(), spec);
        }

        Ok(interfaces)
    }

    /// Resource pool the job's VM is created from.
    ///
    /// # Errors
    ///
    /// Returns an error if the job or its resource pool is not declared.
    pub fn resource_pool(&self, job_name: &str) -> Result<&ResourcePool, ManifestError> {
        let job = self.job(job_name)?;
        self.resource_pools
            .iter()
            .find(|p| p.name == job.resource_pool)
            .ok_or_else(|| ManifestError::ResourcePoolNotFound {
                job: job_name.to_string(),
                pool: job.resource_pool.clone(),
            })
    }
}
