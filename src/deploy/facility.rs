// src/deploy/facility.rs

//! Seams for the privileged OS collaborators
//!
//! The deployment facility physically installs and removes packages and
//! reports fractional progress plus a status. The host policy exposes the
//! sideloading configuration flags. Both are long-running I/O-bound
//! operations against OS machinery, so the seams are async; production
//! implementations live in `crate::os`, tests use in-memory mocks.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Progress callback handed to facility implementations.
///
/// Receives raw percentages as the OS reports them; ordering and clamping
/// are the orchestrator's job.
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// Terminal status of a deployment call
#[derive(Debug, Clone, Default)]
pub struct DeploymentStatus {
    /// True when the package ended up registered (operation succeeded)
    pub is_registered: bool,
    /// Extended platform status code on failure
    pub extended_error_code: Option<u32>,
    /// Raw error text from the facility, preserved for diagnostics
    pub error_text: Option<String>,
}

impl DeploymentStatus {
    /// A successful, registered outcome.
    pub fn registered() -> Self {
        Self {
            is_registered: true,
            ..Self::default()
        }
    }

    /// A failed outcome with a platform code and raw error text.
    pub fn failed(code: u32, error_text: impl Into<String>) -> Self {
        Self {
            is_registered: false,
            extended_error_code: Some(code),
            error_text: Some(error_text.into()),
        }
    }
}

/// The privileged OS package-deployment facility.
///
/// Operations run to OS completion or failure; there is no cancellation
/// and no timeout. Progress may be reported from a different execution
/// context than the caller's.
#[async_trait]
pub trait DeploymentFacility: Send + Sync {
    /// Install the package file at `path`.
    async fn install_package(
        &self,
        path: &Path,
        on_progress: ProgressFn<'_>,
    ) -> Result<DeploymentStatus>;

    /// Remove the package with the given fully-qualified install identity.
    async fn remove_package(
        &self,
        full_name: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<DeploymentStatus>;
}

/// Host configuration flags governing sideloading
#[async_trait]
pub trait HostPolicy: Send + Sync {
    /// The allow-all-trusted-apps flag.
    async fn allow_all_trusted_apps(&self) -> Result<bool>;

    /// The allow-development-without-license flag.
    async fn allow_development_without_license(&self) -> Result<bool>;
}
