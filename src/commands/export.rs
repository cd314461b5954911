// src/commands/export.rs
//! Package inventory export command

use super::services;
use crate::catalog::{EnumerationFilter, PublisherFilter, SortKey};
use crate::export::write_csv;
use crate::package::descriptor::PackageScope;
use anyhow::Result;
use std::path::Path;

/// Export the installed-package inventory as CSV.
pub async fn cmd_export(
    path: &Path,
    locations: bool,
    frameworks: bool,
    critical: bool,
) -> Result<()> {
    let services = services(PackageScope::User);
    let filter = EnumerationFilter {
        publisher: PublisherFilter::All,
        include_frameworks: frameworks,
        include_critical_apps: critical,
        sort: SortKey::default(),
    };

    let packages = services.catalog.enumerate(&filter).await?;
    write_csv(path, &packages, locations)?;
    println!("Exported {} package(s) to {}", packages.len(), path.display());
    Ok(())
}
