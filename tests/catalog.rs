// tests/catalog.rs

//! Catalog enumeration, filtering, and search tests.

mod common;

use common::{installed_record, FixedRegistry};
use sideload::{
    CriticalAppList, EnumerationFilter, PackageCatalog, PublisherFilter, SortKey,
};
use std::sync::Arc;

fn catalog_with(records: Vec<sideload::InstalledRecord>) -> PackageCatalog {
    PackageCatalog::new(
        Arc::new(FixedRegistry { records }),
        CriticalAppList::builtin(),
    )
}

#[tokio::test]
async fn test_framework_and_critical_gates_are_independent() {
    let mut framework = installed_record("Contoso.Runtime", "CN=Contoso");
    framework.is_framework = true;
    let critical = installed_record("Microsoft.Windows.ShellExperienceHost", "CN=Microsoft Windows");
    let plain = installed_record("Contoso.App", "CN=Contoso");

    let catalog = catalog_with(vec![framework, critical, plain]);

    // Default policy hides both.
    let defaults = catalog.enumerate(&EnumerationFilter::default()).await.unwrap();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].name, "Contoso.App");

    // Each flag flips its own guarantee only.
    let frameworks_only = catalog
        .enumerate(&EnumerationFilter {
            include_frameworks: true,
            ..EnumerationFilter::default()
        })
        .await
        .unwrap();
    assert!(frameworks_only.iter().any(|d| d.is_framework));
    assert!(frameworks_only.iter().all(|d| !d.is_critical_system_app));

    let critical_only = catalog
        .enumerate(&EnumerationFilter {
            include_critical_apps: true,
            ..EnumerationFilter::default()
        })
        .await
        .unwrap();
    assert!(critical_only.iter().any(|d| d.is_critical_system_app));
    assert!(critical_only.iter().all(|d| !d.is_framework));
}

#[tokio::test]
async fn test_search_hits_publisher_field_case_insensitively() {
    let mut package = installed_record("Contoso.App", "CN=Contoso");
    package.display_name = Some("Demo".to_string());
    package.publisher_display_name = Some("Fabrikam Studios".to_string());

    let catalog = catalog_with(vec![package, installed_record("Other.App", "CN=Other")]);

    let hits = catalog
        .search("FABRIKAM", &EnumerationFilter::include_everything())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Contoso.App");

    let misses = catalog
        .search("nonexistent", &EnumerationFilter::include_everything())
        .await
        .unwrap();
    assert!(misses.is_empty());
}

#[tokio::test]
async fn test_search_applies_after_filtering() {
    let mut framework = installed_record("Contoso.Widget.Runtime", "CN=Contoso");
    framework.is_framework = true;

    let catalog = catalog_with(vec![framework]);

    // Hidden by the default filter even though the term matches.
    let hidden = catalog
        .search("widget", &EnumerationFilter::default())
        .await
        .unwrap();
    assert!(hidden.is_empty());

    let shown = catalog
        .search(
            "widget",
            &EnumerationFilter {
                include_frameworks: true,
                ..EnumerationFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shown.len(), 1);
}

#[tokio::test]
async fn test_publisher_type_gate() {
    let store_signed = {
        let mut record = installed_record("Vendor.App", "CN=Some Vendor");
        // Store signing id marks a first-party package even without the name.
        record.package_family_name = Some("Vendor.App_8wekyb3d8bbwe".to_string());
        record.publisher = "CN=8wekyb3d8bbwe".to_string();
        record
    };
    let third = installed_record("Contoso.App", "CN=Contoso");

    let catalog = catalog_with(vec![store_signed, third]);

    let microsoft = catalog
        .enumerate(&EnumerationFilter {
            publisher: PublisherFilter::Microsoft,
            ..EnumerationFilter::include_everything()
        })
        .await
        .unwrap();
    assert_eq!(microsoft.len(), 1);
    assert_eq!(microsoft[0].name, "Vendor.App");

    let third_party = catalog
        .enumerate(&EnumerationFilter {
            publisher: PublisherFilter::ThirdParty,
            ..EnumerationFilter::include_everything()
        })
        .await
        .unwrap();
    assert_eq!(third_party.len(), 1);
    assert_eq!(third_party[0].name, "Contoso.App");
}

#[tokio::test]
async fn test_degraded_records_survive_enumeration() {
    let mut bad = installed_record("Broken.App", "CN=Broken");
    bad.install_date = Some("definitely not a date".to_string());
    let good = installed_record("Contoso.App", "CN=Contoso");

    let catalog = catalog_with(vec![bad, good]);
    let all = catalog
        .enumerate(&EnumerationFilter::include_everything())
        .await
        .unwrap();

    assert_eq!(all.len(), 2, "degraded record must not be dropped");
    let degraded = all.iter().find(|d| d.name == "Broken.App").unwrap();
    assert_eq!(degraded.version, "Unknown");
}

#[tokio::test]
async fn test_install_date_sorting() {
    let mut old = installed_record("Old.App", "CN=A");
    old.install_date = Some("2023-01-01T00:00:00+00:00".to_string());
    let mut new = installed_record("New.App", "CN=B");
    new.install_date = Some("2024-06-01T00:00:00+00:00".to_string());

    let catalog = catalog_with(vec![old, new]);

    let newest = catalog
        .enumerate(&EnumerationFilter {
            sort: SortKey::InstallDateNewest,
            ..EnumerationFilter::include_everything()
        })
        .await
        .unwrap();
    assert_eq!(newest[0].name, "New.App");

    let oldest = catalog
        .enumerate(&EnumerationFilter {
            sort: SortKey::InstallDateOldest,
            ..EnumerationFilter::include_everything()
        })
        .await
        .unwrap();
    assert_eq!(oldest[0].name, "Old.App");
}

#[tokio::test]
async fn test_is_installed_round_trip() {
    let catalog = catalog_with(vec![installed_record("Contoso.App", "CN=Contoso")]);

    let found = catalog
        .find_by_family_name("Contoso.App_Contoso")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.package_full_name.as_deref(), Some("Contoso.App_1.0.0.0_x64__testid"));
    assert!(catalog.is_installed("contoso.app_contoso").await.unwrap());
    assert!(!catalog.is_installed("Gone.App_Nobody").await.unwrap());
}
