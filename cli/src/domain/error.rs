//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed source error carried across the state store boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ── State errors ──────────────────────────────────────────────────────────────

/// Failure to read or write the deployment state snapshot.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("loading existing deployment state")]
    Load(#[source] BoxError),

    #[error("saving new deployment state")]
    Save(#[source] BoxError),
}

// ── Cloud errors ──────────────────────────────────────────────────────────────

/// Closed set of failure kinds a cloud provider can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudErrorKind {
    /// The provider does not support the requested operation.
    NotImplemented,
    /// The referenced VM does not exist.
    VmNotFound,
    /// Any other provider-side failure.
    Cloud,
    /// The provider could not be reached or answered with garbage.
    Protocol,
}

impl CloudErrorKind {
    /// Map a CPI error type string (e.g. `Bosh::Clouds::NotImplemented`) to a kind.
    #[must_use]
    pub fn from_cpi_type(error_type: &str) -> Self {
        match error_type {
            "Bosh::Clouds::NotImplemented" => Self::NotImplemented,
            "Bosh::Clouds::VMNotFound" => Self::VmNotFound,
            _ => Self::Cloud,
        }
    }
}

/// Error returned by every `Cloud` port operation.
#[derive(Debug, Clone, Error)]
#[error("cloud {method} failed ({kind:?}): {message}")]
pub struct CloudError {
    pub kind: CloudErrorKind,
    pub method: String,
    pub message: String,
}

impl CloudError {
    pub fn new(kind: CloudErrorKind, method: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            method: method.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        self.kind == CloudErrorKind::NotImplemented
    }
}

// ── Name resolution errors ────────────────────────────────────────────────────

/// Failure to resolve or publish the realized network identity of a VM.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("fetching details of vm '{cid}'")]
    Lookup {
        cid: String,
        #[source]
        source: CloudError,
    },

    #[error("writing name resolution entries to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Manifest errors ───────────────────────────────────────────────────────────

/// Errors resolving job-level settings from a deployment manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("deployment manifest has no jobs")]
    NoJobs,

    #[error("could not find job '{0}'")]
    JobNotFound(String),

    #[error("could not find network '{network}' for job '{job}'")]
    NetworkNotFound { job: String, network: String },

    #[error("could not find resource pool '{pool}' for job '{job}'")]
    ResourcePoolNotFound { job: String, pool: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },
}
