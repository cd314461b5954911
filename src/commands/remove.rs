// src/commands/remove.rs
//! Package removal command

use super::{report_result, services};
use crate::catalog::EnumerationFilter;
use crate::package::descriptor::PackageScope;
use crate::package::PackageDescriptor;
use crate::progress::{CallbackProgress, ProgressEvent};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Remove an installed package by family name or internal name.
///
/// Critical system apps get an extra confirmation here, in the UI layer;
/// the orchestrator does not enforce that classification. System-protected
/// packages are refused by the orchestrator itself.
pub async fn cmd_remove(package: &str, yes: bool, log_file: Option<&Path>) -> Result<()> {
    info!("Removing package: {}", package);

    let services = services(PackageScope::User);
    let descriptor = resolve_package(&services, package).await?;

    if descriptor.is_critical_system_app && !yes && !confirm_critical(&descriptor)? {
        println!("Aborted.");
        return Ok(());
    }

    let bar = Arc::new(ProgressBar::new(100));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}%  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    let tracker = CallbackProgress::new({
        let bar = bar.clone();
        move |event| match event {
            ProgressEvent::Message(message) => bar.set_message(message),
            ProgressEvent::Percent(percent) => bar.set_position(percent as u64),
            ProgressEvent::Finished(message) => bar.finish_with_message(message),
            ProgressEvent::Error(message) => bar.abandon_with_message(message),
        }
    });

    let result = services
        .orchestrator
        .uninstall(descriptor, Some(&tracker))
        .await;

    report_result(&result, services.orchestrator.errors(), log_file)
}

async fn resolve_package(
    services: &super::Services,
    package: &str,
) -> Result<PackageDescriptor> {
    if let Some(descriptor) = services.catalog.find_by_family_name(package).await? {
        return Ok(descriptor);
    }

    // Fall back to an internal-name match.
    let everything = services
        .catalog
        .enumerate(&EnumerationFilter::include_everything())
        .await?;
    everything
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(package))
        .ok_or_else(|| anyhow::anyhow!("Package '{}' is not installed", package))
}

fn confirm_critical(descriptor: &PackageDescriptor) -> Result<bool> {
    println!(
        "'{}' is classified as a critical system component.",
        descriptor.display_name
    );
    println!("Removing it may leave the OS shell in a broken state.");
    print!("Continue? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
