//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod manifest;
pub mod vm;

pub use config::{KeelConfig, validate_config_key, validate_config_value};
pub use error::{CloudError, CloudErrorKind, ConfigError, ManifestError, ResolutionError, StateError};
pub use manifest::{Manifest, NetworkInterfaces, Properties, ResourcePool};
pub use vm::{CloudStemcell, NetworkIdentity, VmMetadata, hosts_file_content};
