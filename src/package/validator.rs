// src/package/validator.rs

//! Package file validation
//!
//! Orchestrates the manifest reader and the compatibility classifier:
//! given a file path, returns a validated `PackageDescriptor` or a
//! structured validation failure. Checks short-circuit in order: file
//! existence, extension allow-list, manifest extraction, architecture
//! compatibility.

use crate::error::{Error, Result};
use crate::package::compat::{host_is_64bit, is_architecture_compatible};
use crate::package::descriptor::{PackageDescriptor, SignatureStatus};
use crate::package::manifest::ArchiveManifestReader;
use std::fs::File;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Accepted package file suffixes, matched case-insensitively
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["appx", "appxbundle", "msix", "msixbundle"];

/// Validates package files and extracts their descriptors
pub struct PackageValidator;

impl PackageValidator {
    /// True when the path carries one of the accepted package suffixes.
    pub fn is_valid_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                ACCEPTED_EXTENSIONS.contains(&e.as_str())
            })
            .unwrap_or(false)
    }

    /// Validate a package file and extract its descriptor.
    ///
    /// On architecture incompatibility the extracted descriptor is not
    /// discarded: `Error::ArchitectureIncompatible` carries it so callers
    /// can still display what was found.
    pub fn validate_and_extract(path: &Path) -> Result<PackageDescriptor> {
        Self::validate_for_host(path, host_is_64bit())
    }

    /// Same as `validate_and_extract` with the host bitness made explicit.
    pub fn validate_for_host(path: &Path, host_is_64bit: bool) -> Result<PackageDescriptor> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        if !Self::is_valid_extension(path) {
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string();
            return Err(Error::UnsupportedExtension {
                extension,
                accepted: ACCEPTED_EXTENSIONS
                    .iter()
                    .map(|e| format!(".{}", e))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let descriptor = ArchiveManifestReader::extract(path)
            .map_err(|e| Error::MalformedPackage(e.to_string()))?;
        debug!(
            package = %descriptor.display_name,
            version = %descriptor.version,
            architecture = %descriptor.architecture,
            "extracted package descriptor"
        );

        if !is_architecture_compatible(&descriptor.architecture, host_is_64bit) {
            return Err(Error::ArchitectureIncompatible {
                architecture: descriptor.architecture.to_string(),
                descriptor: Box::new(descriptor),
            });
        }

        Ok(descriptor)
    }

    /// Deferred signature check, independently callable.
    ///
    /// Re-opens the archive and checks only for signature-container
    /// presence: `Unsigned` when absent, `Valid` when present, `Invalid`
    /// when the archive cannot be reopened. Presence only; this performs
    /// no trust verification.
    pub fn verify_signature(path: &Path) -> SignatureStatus {
        let Ok(file) = File::open(path) else {
            return SignatureStatus::Invalid;
        };
        let Ok(mut archive) = ZipArchive::new(file) else {
            return SignatureStatus::Invalid;
        };
        if ArchiveManifestReader::has_signature(&mut archive) {
            SignatureStatus::Valid
        } else {
            SignatureStatus::Unsigned
        }
    }
}
