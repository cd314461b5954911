// src/error.rs

//! Error types for the sideload library

use crate::package::PackageDescriptor;
use thiserror::Error;

/// Convenience alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by validation, enumeration, and deployment
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be opened or read as a zip package container
    #[error("Cannot read '{path}' as a package archive: {reason}")]
    ArchiveRead { path: String, reason: String },

    /// Neither the package manifest nor the bundle manifest exists in the archive
    #[error("No package manifest entry found in archive")]
    ManifestMissing,

    /// The manifest entry exists but is not well-formed XML
    #[error("Failed to parse package manifest: {0}")]
    ManifestParse(String),

    /// The input path does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The input file does not carry a supported package suffix
    #[error("Unsupported file extension '.{extension}'. Accepted extensions: {accepted}")]
    UnsupportedExtension { extension: String, accepted: String },

    /// Archive or manifest errors surfaced through the validation pipeline
    #[error("Malformed package: {0}")]
    MalformedPackage(String),

    /// The declared architecture cannot run on this host.
    ///
    /// Carries the extracted descriptor so callers can still display what
    /// was found in the package.
    #[error("Package architecture '{architecture}' is not compatible with this host")]
    ArchitectureIncompatible {
        architecture: String,
        descriptor: Box<PackageDescriptor>,
    },

    /// The OS deployment facility reported a platform status code
    #[error("Deployment failed with status 0x{code:08X}: {message}")]
    Deployment { code: u32, message: String },

    /// Host policy (sideloading configuration) could not be read
    #[error("Host policy query failed: {0}")]
    Policy(String),

    /// The installed-package registry could not be queried
    #[error("Package registry query failed: {0}")]
    Registry(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The embedded platform status code, when this error carries one.
    pub fn status_code(&self) -> Option<u32> {
        match self {
            Self::Deployment { code, .. } => Some(*code),
            _ => None,
        }
    }
}
