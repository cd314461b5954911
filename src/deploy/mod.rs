// src/deploy/mod.rs

//! Deployment orchestration
//!
//! Wraps the privileged OS deployment facility: runs install/uninstall
//! operations, streams fractional progress, applies the protected-package
//! policy gate, and turns raw failures into classified `OperationResult`s
//! via the error catalog.
//!
//! # Operation lifecycle
//!
//! ```text
//! Idle -> Validating (install-from-file only) -> Deploying -> Succeeded | Failed
//! ```
//!
//! No state persists across operations. There is no cancellation: once a
//! call is issued to the facility it runs to completion, and the only
//! cancellation point is the caller's decision before issuing it. Nothing
//! escapes an operation as a raw error: every outcome is an
//! `OperationResult`.

pub mod errors;
pub mod facility;
mod result;

pub use errors::{extract_status_code, format_status_code, DeploymentErrorCatalog};
pub use facility::{DeploymentFacility, DeploymentStatus, HostPolicy};
pub use result::{OperationResult, OperationType};

use crate::error::Error;
use crate::package::descriptor::PackageScope;
use crate::package::{PackageDescriptor, PackageValidator, SignatureStatus};
use crate::progress::ProgressTracker;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use strum_macros::Display;
use tracing::{debug, info, warn};

/// Fixed refusal message for system-protected packages
pub const SYSTEM_PROTECTED_MESSAGE: &str =
    "This package is protected by the operating system and cannot be removed.";

/// Phases of a deployment operation, for logging and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeploymentPhase {
    Idle,
    Validating,
    Deploying,
    Succeeded,
    Failed,
}

/// Performs install/uninstall against the OS deployment facility.
///
/// All collaborators are injected at construction; the orchestrator holds
/// no global state.
pub struct DeploymentOrchestrator {
    facility: Arc<dyn DeploymentFacility>,
    policy: Arc<dyn HostPolicy>,
    errors: DeploymentErrorCatalog,
}

impl DeploymentOrchestrator {
    pub fn new(
        facility: Arc<dyn DeploymentFacility>,
        policy: Arc<dyn HostPolicy>,
        errors: DeploymentErrorCatalog,
    ) -> Self {
        Self {
            facility,
            policy,
            errors,
        }
    }

    /// The injected error catalog, for callers that render suggestions.
    pub fn errors(&self) -> &DeploymentErrorCatalog {
        &self.errors
    }

    /// Validate a package file, then install it.
    ///
    /// Runs the validation pipeline off the async path, then hands over to
    /// [`install`](Self::install). Validation failures yield a
    /// `Validation`-typed failed result; an architecture mismatch keeps
    /// the extracted descriptor attached.
    pub async fn install_file(
        &self,
        path: &Path,
        progress: Option<&dyn ProgressTracker>,
    ) -> OperationResult {
        debug!(phase = %DeploymentPhase::Validating, package = %path.display(), "validating package file");
        if let Some(tracker) = progress {
            tracker.set_message("Validating package");
        }

        let owned = path.to_path_buf();
        let validated =
            tokio::task::spawn_blocking(move || PackageValidator::validate_and_extract(&owned))
                .await;

        let descriptor = match validated {
            Ok(Ok(descriptor)) => descriptor,
            Ok(Err(Error::ArchitectureIncompatible {
                architecture,
                descriptor,
            })) => {
                let message = format!(
                    "This package targets the '{}' architecture, which cannot run on this host.",
                    architecture
                );
                if let Some(tracker) = progress {
                    tracker.finish_with_error(&message);
                }
                return OperationResult::failed(
                    OperationType::Validation,
                    *descriptor,
                    message,
                    None,
                    None,
                );
            }
            Ok(Err(e)) => {
                let message = self.errors.decode_exception(&e);
                if let Some(tracker) = progress {
                    tracker.finish_with_error(&message);
                }
                return OperationResult::failed(
                    OperationType::Validation,
                    PackageDescriptor::empty(),
                    message,
                    e.status_code(),
                    Some(e.to_string()),
                );
            }
            Err(join_error) => {
                let message = format!("Package validation did not complete: {}", join_error);
                if let Some(tracker) = progress {
                    tracker.finish_with_error(&message);
                }
                return OperationResult::failed(
                    OperationType::Validation,
                    PackageDescriptor::empty(),
                    message,
                    None,
                    None,
                );
            }
        };

        self.install(path, descriptor, progress).await
    }

    /// Install a validated package file.
    ///
    /// An unsigned package only produces an advisory log event; whether
    /// the install is permitted is the OS sideloading configuration's
    /// decision, not this component's.
    pub async fn install(
        &self,
        path: &Path,
        descriptor: PackageDescriptor,
        progress: Option<&dyn ProgressTracker>,
    ) -> OperationResult {
        if descriptor.signature_status == SignatureStatus::Unsigned {
            warn!(
                package = %descriptor.display_name,
                "package carries no signature; deployment is subject to the host sideloading configuration"
            );
        }

        debug!(
            phase = %DeploymentPhase::Deploying,
            package = %descriptor.display_name,
            version = %descriptor.version,
            "installing package"
        );
        if let Some(tracker) = progress {
            tracker.set_message(&format!("Installing {}", descriptor.display_name));
        }

        let last = AtomicU8::new(0);
        let forward = forwarder(progress, &last);

        match self.facility.install_package(path, &forward).await {
            Ok(status) if status.is_registered => {
                let message = format!(
                    "{} {} installed successfully",
                    descriptor.display_name, descriptor.version
                );
                info!(phase = %DeploymentPhase::Succeeded, package = %descriptor.display_name, "{}", message);
                if let Some(tracker) = progress {
                    tracker.set_percent(100);
                    tracker.finish_with_message(&message);
                }
                OperationResult::succeeded(OperationType::Install, descriptor, message)
            }
            Ok(status) => {
                self.deployment_failed(OperationType::Install, descriptor, status, progress)
            }
            Err(e) => self.deployment_error(OperationType::Install, descriptor, e, progress),
        }
    }

    /// Remove an installed package.
    ///
    /// System-protected packages short-circuit to a failed result without
    /// any facility call. Critical-system-app classification is advisory
    /// and deliberately NOT enforced here; the caller's UI layer owns
    /// that confirmation.
    pub async fn uninstall(
        &self,
        descriptor: PackageDescriptor,
        progress: Option<&dyn ProgressTracker>,
    ) -> OperationResult {
        if descriptor.is_system_protected {
            warn!(
                package = %descriptor.display_name,
                "refusing to remove system-protected package"
            );
            if let Some(tracker) = progress {
                tracker.finish_with_error(SYSTEM_PROTECTED_MESSAGE);
            }
            return OperationResult::failed(
                OperationType::Uninstall,
                descriptor,
                SYSTEM_PROTECTED_MESSAGE,
                None,
                None,
            );
        }

        let identity = descriptor
            .package_full_name
            .clone()
            .unwrap_or_else(|| descriptor.package_family_name.clone());

        debug!(
            phase = %DeploymentPhase::Deploying,
            package = %descriptor.display_name,
            identity = %identity,
            "removing package"
        );
        if let Some(tracker) = progress {
            tracker.set_message(&format!("Removing {}", descriptor.display_name));
        }

        let last = AtomicU8::new(0);
        let forward = forwarder(progress, &last);

        match self.facility.remove_package(&identity, &forward).await {
            Ok(status) if status.is_registered => {
                let message = format!("{} was removed", descriptor.display_name);
                info!(phase = %DeploymentPhase::Succeeded, package = %descriptor.display_name, "{}", message);
                if let Some(tracker) = progress {
                    tracker.set_percent(100);
                    tracker.finish_with_message(&message);
                }
                OperationResult::succeeded(OperationType::Uninstall, descriptor, message)
            }
            Ok(status) => {
                self.deployment_failed(OperationType::Uninstall, descriptor, status, progress)
            }
            Err(e) => self.deployment_error(OperationType::Uninstall, descriptor, e, progress),
        }
    }

    /// Whether the host configuration permits sideloading.
    ///
    /// True when either policy flag is set. Any configuration-read failure
    /// yields false: sideloading is assumed unavailable rather than
    /// crashing (fail-closed).
    pub async fn is_sideloading_enabled(&self) -> bool {
        let trusted = self
            .policy
            .allow_all_trusted_apps()
            .await
            .unwrap_or(false);
        let development = self
            .policy
            .allow_development_without_license()
            .await
            .unwrap_or(false);
        trusted || development
    }

    /// True when deploying this package needs elevated privileges.
    pub fn requires_elevation(&self, descriptor: &PackageDescriptor) -> bool {
        descriptor.scope == PackageScope::Machine
    }

    fn deployment_failed(
        &self,
        operation: OperationType,
        descriptor: PackageDescriptor,
        status: DeploymentStatus,
        progress: Option<&dyn ProgressTracker>,
    ) -> OperationResult {
        let (message, code) = match status.extended_error_code {
            Some(code) => (self.errors.decode_error(code), Some(code)),
            None => (
                status
                    .error_text
                    .clone()
                    .unwrap_or_else(|| "The deployment operation did not complete.".to_string()),
                None,
            ),
        };
        warn!(
            phase = %DeploymentPhase::Failed,
            package = %descriptor.display_name,
            code = %code.map(format_status_code).unwrap_or_default(),
            "{}", message
        );
        if let Some(tracker) = progress {
            tracker.finish_with_error(&message);
        }
        OperationResult::failed(operation, descriptor, message, code, status.error_text)
    }

    fn deployment_error(
        &self,
        operation: OperationType,
        descriptor: PackageDescriptor,
        error: Error,
        progress: Option<&dyn ProgressTracker>,
    ) -> OperationResult {
        let message = self.errors.decode_exception(&error);
        warn!(
            phase = %DeploymentPhase::Failed,
            package = %descriptor.display_name,
            "{}", message
        );
        if let Some(tracker) = progress {
            tracker.finish_with_error(&message);
        }
        OperationResult::failed(
            operation,
            descriptor,
            message,
            error.status_code(),
            Some(error.to_string()),
        )
    }
}

/// Monotonic progress forwarder: raw facility percentages are clamped to
/// 0-100 and regressions are dropped, so the tracker sees a non-decreasing
/// stream.
fn forwarder<'a>(
    progress: Option<&'a dyn ProgressTracker>,
    last: &'a AtomicU8,
) -> impl Fn(u8) + Send + Sync + 'a {
    move |raw: u8| {
        let percent = raw.min(100);
        let previous = last.fetch_max(percent, Ordering::SeqCst);
        if percent >= previous {
            if let Some(tracker) = progress {
                tracker.set_percent(percent);
            }
        }
    }
}
