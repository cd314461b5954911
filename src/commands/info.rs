// src/commands/info.rs
//! Single-package detail command

use super::{print_descriptor, services};
use crate::package::descriptor::PackageScope;
use anyhow::Result;

/// Show details for one installed package.
pub async fn cmd_info(family_name: &str) -> Result<()> {
    let services = services(PackageScope::User);

    match services.catalog.find_by_family_name(family_name).await? {
        Some(descriptor) => {
            print_descriptor(&descriptor);
            Ok(())
        }
        None => Err(anyhow::anyhow!(
            "No installed package with family name '{}'",
            family_name
        )),
    }
}
