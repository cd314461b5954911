// src/commands/policy.rs
//! Sideloading policy inspection command

use super::services;
use crate::deploy::HostPolicy;
use crate::package::descriptor::PackageScope;
use anyhow::Result;

/// Show the host sideloading configuration.
///
/// Individual flag read failures are shown as "unavailable"; the effective
/// status is fail-closed, matching the orchestrator.
pub async fn cmd_policy() -> Result<()> {
    let services = services(PackageScope::User);

    let trusted = services.policy.allow_all_trusted_apps().await;
    let development = services.policy.allow_development_without_license().await;

    println!("Sideloading policy:");
    println!("  Allow all trusted apps:       {}", flag_label(&trusted));
    println!("  Allow development w/o license: {}", flag_label(&development));

    let enabled = services.orchestrator.is_sideloading_enabled().await;
    println!(
        "\nSideloading is {}.",
        if enabled { "enabled" } else { "disabled" }
    );
    if !enabled {
        println!("Non-store packages will be rejected by the deployment facility.");
    }
    Ok(())
}

fn flag_label(flag: &crate::error::Result<bool>) -> &'static str {
    match flag {
        Ok(true) => "yes",
        Ok(false) => "no",
        Err(_) => "unavailable",
    }
}
