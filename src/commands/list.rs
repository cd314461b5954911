// src/commands/list.rs
//! Installed-package listing and search commands

use super::services;
use crate::catalog::{EnumerationFilter, PublisherFilter, SortKey};
use crate::package::descriptor::PackageScope;
use crate::package::PackageDescriptor;
use anyhow::Result;
use std::str::FromStr;

/// Build an enumeration filter from CLI arguments.
pub(crate) fn parse_filter(
    frameworks: bool,
    critical: bool,
    publisher: &str,
    sort: &str,
) -> Result<EnumerationFilter> {
    let publisher = PublisherFilter::from_str(publisher).map_err(|_| {
        anyhow::anyhow!(
            "unknown publisher filter '{}' (expected all, microsoft, or third-party)",
            publisher
        )
    })?;
    let sort = SortKey::from_str(sort).map_err(|_| {
        anyhow::anyhow!(
            "unknown sort key '{}' (expected display-name, name-desc, date-newest, \
             date-oldest, publisher, or version-desc)",
            sort
        )
    })?;
    Ok(EnumerationFilter {
        publisher,
        include_frameworks: frameworks,
        include_critical_apps: critical,
        sort,
    })
}

/// List installed packages.
pub async fn cmd_list(
    frameworks: bool,
    critical: bool,
    publisher: &str,
    sort: &str,
    machine: bool,
) -> Result<()> {
    let scope = if machine {
        PackageScope::Machine
    } else {
        PackageScope::User
    };
    let filter = parse_filter(frameworks, critical, publisher, sort)?;
    let services = services(scope);

    let packages = services.catalog.enumerate(&filter).await?;
    print_listing(&packages);
    Ok(())
}

/// Search installed packages by substring.
pub async fn cmd_search(
    term: &str,
    frameworks: bool,
    critical: bool,
    publisher: &str,
    machine: bool,
) -> Result<()> {
    let scope = if machine {
        PackageScope::Machine
    } else {
        PackageScope::User
    };
    let filter = parse_filter(frameworks, critical, publisher, "display-name")?;
    let services = services(scope);

    let packages = services.catalog.search(term, &filter).await?;
    print_listing(&packages);
    Ok(())
}

fn print_listing(packages: &[PackageDescriptor]) {
    if packages.is_empty() {
        println!("No packages found.");
        return;
    }

    println!("Installed packages:");
    for package in packages {
        print!(
            "  {}  {} ({})",
            package.display_name, package.version, package.architecture
        );
        if package.is_framework {
            print!(" [framework]");
        }
        if package.is_system_protected {
            print!(" [protected]");
        }
        if package.is_critical_system_app {
            print!(" [critical]");
        }
        println!();
        println!("      {}", package.package_family_name);
    }
    println!("\nTotal: {} package(s)", packages.len());
}
