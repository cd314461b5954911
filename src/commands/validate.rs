// src/commands/validate.rs
//! Package file validation command

use super::{critical_list, print_descriptor};
use crate::error::Error;
use crate::package::PackageValidator;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Validate a package file and print its descriptor.
pub fn cmd_validate(package: &Path) -> Result<()> {
    info!("Validating package: {}", package.display());

    match PackageValidator::validate_and_extract(package) {
        Ok(descriptor) => {
            // Deferred signature check, backfilled into the descriptor.
            let descriptor =
                descriptor.with_signature_status(PackageValidator::verify_signature(package));
            println!("Package is valid.\n");
            print_descriptor(&descriptor);
            if critical_list().is_critical(&descriptor.name, &descriptor.package_family_name) {
                println!("\nNote: this package matches the critical system app list.");
            }
            Ok(())
        }
        Err(Error::ArchitectureIncompatible {
            architecture,
            descriptor,
        }) => {
            // The descriptor is still available; show what was found.
            println!(
                "Package targets the '{}' architecture, which cannot run on this host.\n",
                architecture
            );
            print_descriptor(&descriptor);
            Err(anyhow::anyhow!(
                "architecture '{}' is not compatible with this host",
                architecture
            ))
        }
        Err(e) => Err(e.into()),
    }
}
