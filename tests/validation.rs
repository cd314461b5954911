// tests/validation.rs

//! Validation pipeline tests against real archive fixtures.

mod common;

use common::{build_archive, build_package, manifest_xml, MANIFEST_NS};
use sideload::{
    Architecture, ArchiveManifestReader, Error, PackageType, PackageValidator, SignatureStatus,
};

#[test]
fn test_extract_signed_package() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest_xml("Contoso.App", "CN=Contoso, O=Contoso Inc", "1.4.0.0", "neutral");
    let path = build_package(dir.path(), "contoso.msix", &manifest, true);

    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();

    assert_eq!(descriptor.name, "Contoso.App");
    assert_eq!(descriptor.display_name, "Contoso.App Display");
    assert_eq!(descriptor.publisher_id, "Contoso");
    assert_eq!(descriptor.package_family_name, "Contoso.App_Contoso");
    assert_eq!(descriptor.version, "1.4.0.0");
    assert_eq!(descriptor.architecture, Architecture::Neutral);
    assert_eq!(descriptor.signature_status, SignatureStatus::Valid);
    assert_eq!(descriptor.capabilities, vec!["internetClient"]);
    // File-sourced descriptors have no install identity yet.
    assert!(descriptor.package_full_name.is_none());
    assert!(descriptor.install_date.is_none());
}

#[test]
fn test_unsigned_package_is_flagged_not_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest_xml("Contoso.App", "CN=Contoso", "1.0.0.0", "x86");
    let path = build_package(dir.path(), "contoso.appx", &manifest, false);

    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();
    assert_eq!(descriptor.signature_status, SignatureStatus::Unsigned);
    assert_eq!(PackageValidator::verify_signature(&path), SignatureStatus::Unsigned);
}

#[test]
fn test_deferred_signature_check_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest_xml("Contoso.App", "CN=Contoso", "1.0.0.0", "x86");
    let path = build_package(dir.path(), "contoso.msix", &manifest, true);

    assert_eq!(PackageValidator::verify_signature(&path), SignatureStatus::Valid);

    // Backfill path: extraction already agrees with the deferred check.
    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();
    let backfilled = descriptor.with_signature_status(PackageValidator::verify_signature(&path));
    assert_eq!(backfilled.signature_status, SignatureStatus::Valid);
}

#[test]
fn test_architecture_incompatibility_keeps_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest_xml("Contoso.App", "CN=Contoso", "1.0.0.0", "arm64");
    let path = build_package(dir.path(), "contoso.msix", &manifest, true);

    let err = PackageValidator::validate_and_extract(&path).unwrap_err();
    match err {
        Error::ArchitectureIncompatible {
            architecture,
            descriptor,
        } => {
            assert_eq!(architecture, "arm64");
            assert_eq!(descriptor.name, "Contoso.App");
            assert_eq!(descriptor.version, "1.0.0.0");
        }
        other => panic!("expected ArchitectureIncompatible, got {:?}", other),
    }
}

#[test]
fn test_bundle_manifest_is_second_priority() {
    let dir = tempfile::tempdir().unwrap();
    let bundle_manifest = r#"<Bundle xmlns="http://schemas.microsoft.com/appx/2013/bundle">
  <Identity Name="Contoso.Bundle" Version="2.0.0.0" Publisher="CN=Contoso" />
</Bundle>"#;
    let path = dir.path().join("contoso.msixbundle");
    build_archive(
        &path,
        &[
            ("AppxMetadata/AppxBundleManifest.xml", bundle_manifest),
            ("AppxSignature.p7x", "signature"),
        ],
    );

    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();
    assert_eq!(descriptor.name, "Contoso.Bundle");
    // Bundles declare no processor architecture.
    assert_eq!(descriptor.architecture, Architecture::Neutral);
}

#[test]
fn test_single_package_manifest_wins_over_bundle_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let single = manifest_xml("Contoso.Single", "CN=Contoso", "1.0.0.0", "x86");
    let bundle = r#"<Bundle xmlns="http://schemas.microsoft.com/appx/2013/bundle">
  <Identity Name="Contoso.Bundle" Version="2.0.0.0" Publisher="CN=Contoso" />
</Bundle>"#;
    let path = dir.path().join("contoso.msix");
    build_archive(
        &path,
        &[
            ("AppxMetadata/AppxBundleManifest.xml", bundle),
            ("AppxManifest.xml", single.as_str()),
        ],
    );

    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();
    assert_eq!(descriptor.name, "Contoso.Single");
}

#[test]
fn test_archive_without_manifest_degrades_to_empty_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weird.msix");
    build_archive(&path, &[("payload/app.bin", "bytes")]);

    let descriptor = ArchiveManifestReader::extract(&path).unwrap();
    assert!(descriptor.name.is_empty());
    assert!(descriptor.package_family_name.is_empty());
    assert_eq!(descriptor.signature_status, SignatureStatus::Unsigned);

    // The strict locator still reports the distinction.
    let file = std::fs::File::open(&path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert!(matches!(
        ArchiveManifestReader::locate_manifest(&mut archive),
        Err(Error::ManifestMissing)
    ));
}

#[test]
fn test_package_type_derivation_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    // Framework wins over publisher.
    let framework_manifest = format!(
        r#"<Package xmlns="{ns}">
  <Identity Name="Contoso.Lib" Version="1.0.0.0" Publisher="CN=Microsoft Corporation"
            ProcessorArchitecture="neutral" />
  <Properties><Framework>true</Framework></Properties>
</Package>"#,
        ns = MANIFEST_NS
    );
    let path = build_package(dir.path(), "framework.msix", &framework_manifest, true);
    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();
    assert_eq!(descriptor.package_type(), PackageType::Framework);

    // Microsoft publisher, not a framework.
    let microsoft = manifest_xml("MS.App", "CN=Microsoft Corporation", "1.0.0.0", "neutral");
    let path = build_package(dir.path(), "microsoft.msix", &microsoft, true);
    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();
    assert_eq!(descriptor.package_type(), PackageType::Microsoft);

    // Anything else is third-party. Exactly one classification holds.
    let third = manifest_xml("Contoso.App", "CN=Contoso", "1.0.0.0", "neutral");
    let path = build_package(dir.path(), "third.msix", &third, true);
    let descriptor = PackageValidator::validate_and_extract(&path).unwrap();
    assert_eq!(descriptor.package_type(), PackageType::ThirdParty);
}

#[test]
fn test_publisher_without_cn_hashes_deterministically() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest_xml("Contoso.App", "Contoso Raw Publisher", "1.0.0.0", "neutral");
    let path = build_package(dir.path(), "contoso.msix", &manifest, true);

    let first = PackageValidator::validate_and_extract(&path).unwrap();
    let second = PackageValidator::validate_and_extract(&path).unwrap();
    assert_eq!(first.publisher_id, second.publisher_id);
    assert!(!first.publisher_id.is_empty());
    assert!(first.publisher_id.bytes().all(|b| b.is_ascii_hexdigit()));
}

#[test]
fn test_malformed_manifest_is_wrapped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.msix");
    build_archive(&path, &[("AppxManifest.xml", "<Package><Identity")]);

    let err = PackageValidator::validate_and_extract(&path).unwrap_err();
    assert!(matches!(err, Error::MalformedPackage(_)));
    assert!(err.to_string().contains("manifest"));
}
