// src/commands/mod.rs

//! Command implementations for the sideload CLI
//!
//! Each submodule implements one CLI command on top of the library. The
//! composition point is here: services are constructed explicitly and
//! handed to the components that need them. There are no global
//! singletons.

pub mod export;
pub mod info;
pub mod install;
pub mod list;
pub mod policy;
pub mod remove;
pub mod validate;

use crate::catalog::{CriticalAppList, PackageCatalog};
use crate::deploy::{DeploymentErrorCatalog, DeploymentOrchestrator, OperationResult};
use crate::export::LogEvent;
use crate::os::{PowerShellDeployment, PowerShellPolicy, PowerShellRegistry};
use crate::package::descriptor::PackageScope;
use crate::package::{PackageDescriptor, PackageType};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming a TOML file that replaces the builtin
/// critical-app list.
pub const CRITICAL_LIST_ENV: &str = "SIDELOAD_CRITICAL_LIST";

/// Explicitly constructed service graph for one command invocation
pub(crate) struct Services {
    pub orchestrator: DeploymentOrchestrator,
    pub catalog: PackageCatalog,
    pub policy: Arc<PowerShellPolicy>,
}

pub(crate) fn critical_list() -> CriticalAppList {
    let path = std::env::var_os(CRITICAL_LIST_ENV).map(PathBuf::from);
    CriticalAppList::load_or_builtin(path.as_deref())
}

pub(crate) fn services(scope: PackageScope) -> Services {
    let facility = Arc::new(PowerShellDeployment::new());
    let policy = Arc::new(PowerShellPolicy::new());
    let registry = Arc::new(PowerShellRegistry::new(scope));

    Services {
        orchestrator: DeploymentOrchestrator::new(
            facility,
            policy.clone(),
            DeploymentErrorCatalog::new(),
        ),
        catalog: PackageCatalog::new(registry, critical_list()),
        policy,
    }
}

/// Print an operation outcome, append it to the log file when requested,
/// and surface failures as command errors.
pub(crate) fn report_result(
    result: &OperationResult,
    errors: &DeploymentErrorCatalog,
    log_file: Option<&Path>,
) -> Result<()> {
    if let Some(path) = log_file {
        crate::export::append_log(path, &LogEvent::from(result))?;
    }

    if result.success {
        println!("{}", result.message);
        return Ok(());
    }

    eprintln!("{}", result.message);
    if let Some(code) = &result.error_code {
        eprintln!("  Error Code: {}", code);
        if let Ok(raw) = u32::from_str_radix(code.trim_start_matches("0x"), 16) {
            for suggestion in errors.suggestions(raw) {
                eprintln!("  Hint: {}", suggestion);
            }
        }
    }
    if let Some(details) = &result.technical_details {
        eprintln!("  Details: {}", details);
    }
    Err(anyhow::anyhow!("{} failed", result.operation))
}

/// Detail view shared by `validate` and `info`.
pub(crate) fn print_descriptor(descriptor: &PackageDescriptor) {
    println!("  Name:          {}", descriptor.name);
    println!("  Display name:  {}", descriptor.display_name);
    if descriptor.publisher_display_name.is_empty() {
        println!("  Publisher:     {}", descriptor.publisher);
    } else {
        println!(
            "  Publisher:     {} ({})",
            descriptor.publisher_display_name, descriptor.publisher
        );
    }
    println!("  Publisher id:  {}", descriptor.publisher_id);
    println!("  Family name:   {}", descriptor.package_family_name);
    if let Some(full_name) = &descriptor.package_full_name {
        println!("  Full name:     {}", full_name);
    }
    println!("  Version:       {}", descriptor.version);
    println!("  Architecture:  {}", descriptor.architecture);
    println!("  Type:          {}", type_label(descriptor.package_type()));
    println!("  Signature:     {}", descriptor.signature_status);
    println!("  Scope:         {}", descriptor.scope);
    println!("  Location:      {}", descriptor.install_location);
    if let Some(date) = descriptor.install_date {
        println!("  Installed:     {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if descriptor.is_system_protected {
        println!("  Protected:     yes (system package, removal blocked)");
    }
    if descriptor.is_critical_system_app {
        println!("  Critical:      yes (removal is advised against)");
    }
    if !descriptor.dependencies.is_empty() {
        println!("  Dependencies:");
        for dependency in &descriptor.dependencies {
            println!("    {}", dependency);
        }
    }
    if !descriptor.capabilities.is_empty() {
        println!("  Capabilities:  {}", descriptor.capabilities.join(", "));
    }
}

fn type_label(package_type: PackageType) -> &'static str {
    match package_type {
        PackageType::Framework => "framework",
        PackageType::Microsoft => "Microsoft",
        PackageType::ThirdParty => "third-party",
    }
}
