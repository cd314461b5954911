// src/catalog/registry.rs

//! Installed-package registry seam
//!
//! The OS keeps the authoritative record of installed packages. This seam
//! returns raw per-package records; the catalog converts them to
//! descriptors with per-item failure isolation.

use crate::error::Result;
use crate::package::descriptor::PackageScope;
use async_trait::async_trait;

/// Raw installed-package record as reported by the OS registry
#[derive(Debug, Clone, Default)]
pub struct InstalledRecord {
    pub name: String,
    pub display_name: Option<String>,
    /// Raw certificate-subject-like publisher string
    pub publisher: String,
    pub publisher_display_name: Option<String>,
    pub version: String,
    pub architecture: String,
    pub package_full_name: String,
    /// OS-reported family name; the catalog derives one when absent
    pub package_family_name: Option<String>,
    pub install_location: Option<String>,
    /// RFC 3339 timestamp when the OS reports one
    pub install_date: Option<String>,
    pub logo_path: Option<String>,
    pub is_framework: bool,
    /// Signature class: `None`, `Developer`, `Enterprise`, `Store`, `System`
    pub signature_kind: String,
    pub scope: PackageScope,
}

/// Enumerates the OS registry of installed packages
#[async_trait]
pub trait InstalledPackageRegistry: Send + Sync {
    /// The full installed-package set for the registry's scope.
    async fn installed_packages(&self) -> Result<Vec<InstalledRecord>>;
}
