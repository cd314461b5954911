// src/lib.rs

//! Sideload Package Manager
//!
//! Manages the lifecycle of MSIX/APPX packages on a host OS: validating
//! package files, extracting manifest-driven descriptors, installing and
//! removing packages through the privileged OS deployment facility, and
//! inventorying what is installed.
//!
//! # Architecture
//!
//! - Descriptor-first: one `PackageDescriptor` model shared by file
//!   validation and installed-package enumeration
//! - Trait seams: the OS deployment facility, package registry, and host
//!   policy are async traits; production implementations shell out to the
//!   host's package tooling
//! - Classified failures: platform status codes map through an immutable
//!   error catalog to actionable text; nothing escapes a deployment call
//!   as a raw error
//! - Policy gates: system-protected packages are hard-blocked before any
//!   OS call; critical-app classification stays advisory
//!
//! Signature handling is a presence check on the archive's signature
//! container only; trust chains are never validated.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod deploy;
mod error;
pub mod export;
pub mod os;
pub mod package;
pub mod progress;

pub use catalog::{
    CriticalAppList, EnumerationFilter, InstalledPackageRegistry, InstalledRecord,
    PackageCatalog, PublisherFilter, SortKey,
};
pub use deploy::{
    DeploymentErrorCatalog, DeploymentFacility, DeploymentOrchestrator, DeploymentStatus,
    HostPolicy, OperationResult, OperationType, SYSTEM_PROTECTED_MESSAGE,
};
pub use error::{Error, Result};
pub use package::{
    Architecture, ArchiveManifestReader, PackageDescriptor, PackageScope, PackageType,
    PackageValidator, SignatureStatus,
};
pub use progress::{CallbackProgress, LogProgress, ProgressEvent, ProgressTracker, SilentProgress};
