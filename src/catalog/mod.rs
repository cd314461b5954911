// src/catalog/mod.rs

//! Installed-package catalog
//!
//! Enumerates the OS registry of installed packages, converts each record
//! to a `PackageDescriptor`, applies enumeration filters, and supports
//! substring search and sorting. Conversion failures are isolated per
//! item: a bad record degrades to an identity-only descriptor instead of
//! being dropped or aborting the enumeration.

pub mod critical;
pub mod registry;

pub use critical::CriticalAppList;
pub use registry::{InstalledPackageRegistry, InstalledRecord};

use crate::error::{Error, Result};
use crate::package::descriptor::{
    derive_publisher_id, family_name, normalize_version, version_sort_key, Architecture,
    PackageDescriptor, SignatureStatus, NO_INSTALL_LOCATION,
};
use chrono::DateTime;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tracing::{debug, warn};

/// Publisher-type enumeration gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum PublisherFilter {
    #[default]
    All,
    Microsoft,
    #[strum(serialize = "third-party")]
    ThirdParty,
}

/// Sort order for enumeration results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortKey {
    #[default]
    #[strum(serialize = "display-name")]
    DisplayNameAsc,
    #[strum(serialize = "name-desc")]
    NameDesc,
    #[strum(serialize = "date-newest")]
    InstallDateNewest,
    #[strum(serialize = "date-oldest")]
    InstallDateOldest,
    #[strum(serialize = "publisher")]
    PublisherThenName,
    #[strum(serialize = "version-desc")]
    VersionDesc,
}

/// Enumeration filter. Frameworks and critical apps are hidden unless
/// explicitly requested.
#[derive(Debug, Clone, Default)]
pub struct EnumerationFilter {
    pub publisher: PublisherFilter,
    pub include_frameworks: bool,
    pub include_critical_apps: bool,
    pub sort: SortKey,
}

impl EnumerationFilter {
    /// A filter that hides nothing.
    pub fn include_everything() -> Self {
        Self {
            publisher: PublisherFilter::All,
            include_frameworks: true,
            include_critical_apps: true,
            sort: SortKey::default(),
        }
    }

    fn matches(&self, descriptor: &PackageDescriptor) -> bool {
        let publisher_ok = match self.publisher {
            PublisherFilter::All => true,
            PublisherFilter::Microsoft => descriptor.is_microsoft_publisher(),
            PublisherFilter::ThirdParty => !descriptor.is_microsoft_publisher(),
        };
        publisher_ok
            && (self.include_frameworks || !descriptor.is_framework)
            && (self.include_critical_apps || !descriptor.is_critical_system_app)
    }
}

/// Catalog of installed packages, backed by the OS registry seam
pub struct PackageCatalog {
    registry: Arc<dyn InstalledPackageRegistry>,
    critical: CriticalAppList,
}

impl PackageCatalog {
    pub fn new(registry: Arc<dyn InstalledPackageRegistry>, critical: CriticalAppList) -> Self {
        Self { registry, critical }
    }

    /// Enumerate installed packages, filtered and sorted.
    pub async fn enumerate(&self, filter: &EnumerationFilter) -> Result<Vec<PackageDescriptor>> {
        let records = self.registry.installed_packages().await?;
        debug!(count = records.len(), "enumerated installed packages");

        let mut descriptors: Vec<PackageDescriptor> = records
            .into_iter()
            .map(|record| self.convert(record))
            .filter(|descriptor| filter.matches(descriptor))
            .collect();

        sort_descriptors(&mut descriptors, filter.sort);
        Ok(descriptors)
    }

    /// Case-insensitive substring search over display name, internal name,
    /// family name, and publisher display name. Applied after filtering.
    pub async fn search(
        &self,
        term: &str,
        filter: &EnumerationFilter,
    ) -> Result<Vec<PackageDescriptor>> {
        let needle = term.to_lowercase();
        let mut descriptors = self.enumerate(filter).await?;
        descriptors.retain(|d| {
            d.display_name.to_lowercase().contains(&needle)
                || d.name.to_lowercase().contains(&needle)
                || d.package_family_name.to_lowercase().contains(&needle)
                || d.publisher_display_name.to_lowercase().contains(&needle)
        });
        Ok(descriptors)
    }

    /// Look up a single installed package by family name.
    pub async fn find_by_family_name(&self, family: &str) -> Result<Option<PackageDescriptor>> {
        let everything = self.enumerate(&EnumerationFilter::include_everything()).await?;
        Ok(everything
            .into_iter()
            .find(|d| d.package_family_name.eq_ignore_ascii_case(family)))
    }

    /// Whether a package with this family name is installed.
    pub async fn is_installed(&self, family: &str) -> Result<bool> {
        Ok(self.find_by_family_name(family).await?.is_some())
    }

    /// Convert a registry record, degrading to an identity-only descriptor
    /// on failure so a single bad record never poisons the enumeration.
    fn convert(&self, record: InstalledRecord) -> PackageDescriptor {
        match self.try_convert(&record) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(
                    package = %record.package_full_name,
                    "degrading package record: {}", e
                );
                let family = record
                    .package_family_name
                    .clone()
                    .unwrap_or_else(|| {
                        family_name(&record.name, &derive_publisher_id(&record.publisher))
                    });
                let mut degraded = PackageDescriptor::degraded(
                    &record.name,
                    &record.package_full_name,
                    &family,
                );
                degraded.is_critical_system_app = self.critical.is_critical(&record.name, &family);
                degraded
            }
        }
    }

    fn try_convert(&self, record: &InstalledRecord) -> Result<PackageDescriptor> {
        if record.name.is_empty() {
            return Err(Error::Registry("record has no package name".to_string()));
        }

        let publisher_id = derive_publisher_id(&record.publisher);
        let family = match &record.package_family_name {
            Some(family) if !family.is_empty() => family.clone(),
            _ => family_name(&record.name, &publisher_id),
        };

        let install_date = match &record.install_date {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| {
                        Error::Registry(format!("unparseable install date '{}': {}", raw, e))
                    })?
                    .to_utc(),
            ),
            None => None,
        };

        let (signature_status, is_system_protected) =
            classify_signature_kind(&record.signature_kind);

        let display_name = match &record.display_name {
            Some(display) if !display.trim().is_empty() => display.clone(),
            _ => record.name.clone(),
        };

        Ok(PackageDescriptor {
            name: record.name.clone(),
            display_name,
            publisher: record.publisher.clone(),
            publisher_display_name: record.publisher_display_name.clone().unwrap_or_default(),
            publisher_id,
            version: normalize_version(Some(record.version.as_str())),
            architecture: Architecture::parse(&record.architecture),
            is_critical_system_app: self.critical.is_critical(&record.name, &family),
            package_family_name: family,
            package_full_name: Some(record.package_full_name.clone()),
            install_location: record
                .install_location
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| NO_INSTALL_LOCATION.to_string()),
            install_date,
            logo_path: record.logo_path.clone(),
            is_framework: record.is_framework,
            is_system_protected,
            signature_status,
            scope: record.scope,
            dependencies: Vec::new(),
            capabilities: Vec::new(),
        })
    }
}

/// Map the OS signature class onto the coarse status, flagging the system
/// class as protected. Protection cannot be bypassed downstream.
fn classify_signature_kind(kind: &str) -> (SignatureStatus, bool) {
    match kind.to_ascii_lowercase().as_str() {
        "system" => (SignatureStatus::Valid, true),
        "store" | "enterprise" | "developer" => (SignatureStatus::Valid, false),
        "none" => (SignatureStatus::Unsigned, false),
        _ => (SignatureStatus::Unknown, false),
    }
}

fn sort_descriptors(descriptors: &mut [PackageDescriptor], sort: SortKey) {
    match sort {
        SortKey::DisplayNameAsc => {
            descriptors.sort_by_key(|d| d.display_name.to_lowercase());
        }
        SortKey::NameDesc => {
            descriptors.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()));
        }
        SortKey::InstallDateNewest => {
            descriptors.sort_by(|a, b| b.install_date.cmp(&a.install_date));
        }
        SortKey::InstallDateOldest => {
            descriptors.sort_by(|a, b| a.install_date.cmp(&b.install_date));
        }
        SortKey::PublisherThenName => {
            descriptors.sort_by_key(|d| {
                (
                    d.publisher_display_name.to_lowercase(),
                    d.display_name.to_lowercase(),
                )
            });
        }
        SortKey::VersionDesc => {
            descriptors.sort_by(|a, b| {
                version_sort_key(&b.version).cmp(&version_sort_key(&a.version))
            });
        }
    }
}
