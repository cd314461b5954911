// src/os/mod.rs

//! Host OS integrations
//!
//! Production implementations of the deployment facility, installed-package
//! registry, and host policy seams, backed by the host's package tooling.

pub mod powershell;

pub use powershell::{PowerShellDeployment, PowerShellPolicy, PowerShellRegistry};
