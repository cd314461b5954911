// src/package/manifest.rs

//! Archive manifest reader
//!
//! Opens a package archive (zip container), locates its manifest document,
//! and produces a `PackageDescriptor`. Identity and display metadata are
//! resolved against the document's declared default namespace: manifests
//! declare different namespace revisions, so element lookups must never
//! hardcode one. Capability and dependency scans are namespace-agnostic,
//! matching on local element name anywhere in the document, preserving
//! document order.
//!
//! The signature check here is a presence check on the signature container
//! entry only; no trust-chain validation is performed.

use crate::error::{Error, Result};
use crate::package::descriptor::{
    derive_publisher_id, family_name, normalize_version, Architecture, PackageDescriptor,
    SignatureStatus,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Manifest entry for a single package
pub const SINGLE_PACKAGE_MANIFEST: &str = "AppxManifest.xml";

/// Manifest entry for a bundle
pub const BUNDLE_MANIFEST: &str = "AppxMetadata/AppxBundleManifest.xml";

/// Signature container entry
pub const SIGNATURE_ENTRY: &str = "AppxSignature.p7x";

/// Reads package metadata out of an archive file
pub struct ArchiveManifestReader;

impl ArchiveManifestReader {
    /// Extract a descriptor from a package archive on disk.
    ///
    /// Fails with `Error::ArchiveRead` when the file cannot be opened as a
    /// zip container. An archive without any manifest entry degrades to a
    /// descriptor with empty identity fields rather than failing, so
    /// partially-malformed bundles can still be inspected.
    pub fn extract(path: &Path) -> Result<PackageDescriptor> {
        let display_path = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::ArchiveRead {
            path: display_path.clone(),
            reason: e.to_string(),
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| Error::ArchiveRead {
            path: display_path.clone(),
            reason: e.to_string(),
        })?;

        let signature_status = if Self::has_signature(&mut archive) {
            SignatureStatus::Valid
        } else {
            SignatureStatus::Unsigned
        };

        let data = match Self::locate_manifest(&mut archive) {
            Ok(entry_name) => {
                debug!(entry = entry_name, package = %display_path, "reading manifest");
                let mut entry = archive.by_name(entry_name).map_err(|e| Error::ArchiveRead {
                    path: display_path.clone(),
                    reason: e.to_string(),
                })?;
                let mut xml = String::new();
                entry
                    .read_to_string(&mut xml)
                    .map_err(|e| Error::ArchiveRead {
                        path: display_path.clone(),
                        reason: e.to_string(),
                    })?;
                parse_manifest(&xml)?
            }
            Err(Error::ManifestMissing) => {
                debug!(package = %display_path, "archive has no manifest entry");
                ManifestData::default()
            }
            Err(e) => return Err(e),
        };

        Ok(build_descriptor(data, signature_status))
    }

    /// Locate the manifest entry, trying the single-package manifest first
    /// and the bundle manifest second. First match wins.
    pub fn locate_manifest<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<&'static str> {
        for name in [SINGLE_PACKAGE_MANIFEST, BUNDLE_MANIFEST] {
            if archive.by_name(name).is_ok() {
                return Ok(name);
            }
        }
        Err(Error::ManifestMissing)
    }

    /// Presence check for the signature container entry.
    pub fn has_signature<R: Read + Seek>(archive: &mut ZipArchive<R>) -> bool {
        archive.by_name(SIGNATURE_ENTRY).is_ok()
    }
}

/// Fields pulled out of a manifest document
#[derive(Debug, Default)]
struct ManifestData {
    name: String,
    version: Option<String>,
    architecture: Option<String>,
    publisher: String,
    display_name: String,
    publisher_display_name: String,
    is_framework: bool,
    capabilities: Vec<String>,
    dependencies: Vec<String>,
}

/// Property elements captured under `Properties`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyField {
    DisplayName,
    PublisherDisplayName,
    Framework,
}

fn parse_manifest(xml: &str) -> Result<ManifestData> {
    let mut reader = NsReader::from_str(xml);
    let mut data = ManifestData::default();
    let mut doc_ns: Option<Vec<u8>> = None;
    let mut seen_root = false;
    let mut in_properties = false;
    let mut property: Option<PropertyField> = None;

    loop {
        match reader
            .read_resolved_event()
            .map_err(|e| Error::ManifestParse(e.to_string()))?
        {
            (ns, Event::Start(e)) => {
                if !seen_root {
                    seen_root = true;
                    doc_ns = bound_namespace(&ns);
                }
                match e.local_name().as_ref() {
                    b"Identity" if ns_matches(&ns, &doc_ns) => read_identity(&e, &mut data)?,
                    b"Properties" if ns_matches(&ns, &doc_ns) => in_properties = true,
                    b"DisplayName" if in_properties => property = Some(PropertyField::DisplayName),
                    b"PublisherDisplayName" if in_properties => {
                        property = Some(PropertyField::PublisherDisplayName)
                    }
                    b"Framework" if in_properties => property = Some(PropertyField::Framework),
                    b"Capability" => read_capability(&e, &mut data)?,
                    b"PackageDependency" => read_dependency(&e, &mut data)?,
                    _ => {}
                }
            }
            (ns, Event::Empty(e)) => {
                if !seen_root {
                    seen_root = true;
                    doc_ns = bound_namespace(&ns);
                }
                match e.local_name().as_ref() {
                    b"Identity" if ns_matches(&ns, &doc_ns) => read_identity(&e, &mut data)?,
                    b"Capability" => read_capability(&e, &mut data)?,
                    b"PackageDependency" => read_dependency(&e, &mut data)?,
                    _ => {}
                }
            }
            (_, Event::Text(t)) => {
                if let Some(field) = property {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::ManifestParse(e.to_string()))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        match field {
                            PropertyField::DisplayName => data.display_name = text.to_string(),
                            PropertyField::PublisherDisplayName => {
                                data.publisher_display_name = text.to_string()
                            }
                            PropertyField::Framework => {
                                data.is_framework = text.eq_ignore_ascii_case("true")
                            }
                        }
                    }
                }
            }
            (_, Event::End(e)) => match e.local_name().as_ref() {
                b"Properties" => in_properties = false,
                b"DisplayName" | b"PublisherDisplayName" | b"Framework" => property = None,
                _ => {}
            },
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    Ok(data)
}

fn read_identity(element: &BytesStart<'_>, data: &mut ManifestData) -> Result<()> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::ManifestParse(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| Error::ManifestParse(e.to_string()))?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"Name" => data.name = value,
            b"Version" => data.version = Some(value),
            b"Publisher" => data.publisher = value,
            b"ProcessorArchitecture" => data.architecture = Some(value),
            _ => {}
        }
    }
    Ok(())
}

fn read_capability(element: &BytesStart<'_>, data: &mut ManifestData) -> Result<()> {
    if let Some(name) = attribute_value(element, b"Name")? {
        data.capabilities.push(name);
    }
    Ok(())
}

fn read_dependency(element: &BytesStart<'_>, data: &mut ManifestData) -> Result<()> {
    let name = attribute_value(element, b"Name")?;
    let min_version = attribute_value(element, b"MinVersion")?;
    if let Some(name) = name {
        match min_version {
            Some(min) => data.dependencies.push(format!("{} (>= {})", name, min)),
            None => data.dependencies.push(name),
        }
    }
    Ok(())
}

fn attribute_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::ManifestParse(e.to_string()))?;
        if attr.key.local_name().as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::ManifestParse(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn bound_namespace(ns: &ResolveResult<'_>) -> Option<Vec<u8>> {
    match ns {
        ResolveResult::Bound(Namespace(n)) => Some(n.to_vec()),
        _ => None,
    }
}

fn ns_matches(ns: &ResolveResult<'_>, doc_ns: &Option<Vec<u8>>) -> bool {
    match (ns, doc_ns) {
        (ResolveResult::Bound(Namespace(bound)), Some(doc)) => *bound == doc.as_slice(),
        (ResolveResult::Unbound, None) => true,
        _ => false,
    }
}

fn build_descriptor(data: ManifestData, signature_status: SignatureStatus) -> PackageDescriptor {
    let publisher_id = derive_publisher_id(&data.publisher);
    let display_name = if data.display_name.trim().is_empty() {
        data.name.clone()
    } else {
        data.display_name.clone()
    };
    let architecture = match data.architecture.as_deref() {
        // Bundles carry no processor architecture; they apply neutrally.
        None => {
            if data.name.is_empty() {
                Architecture::Unknown
            } else {
                Architecture::Neutral
            }
        }
        Some(value) => Architecture::parse(value),
    };

    PackageDescriptor {
        package_family_name: family_name(&data.name, &publisher_id),
        name: data.name,
        display_name,
        publisher: data.publisher,
        publisher_display_name: data.publisher_display_name,
        publisher_id,
        version: normalize_version(data.version.as_deref()),
        architecture,
        signature_status,
        is_framework: data.is_framework,
        dependencies: data.dependencies,
        capabilities: data.capabilities,
        ..PackageDescriptor::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_NS: &str = "http://schemas.microsoft.com/appx/manifest/foundation/windows10";

    fn sample_manifest() -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="{ns}"
         xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10"
         xmlns:rescap="http://schemas.microsoft.com/appx/manifest/foundation/windows10/restrictedcapabilities">
  <Identity Name="Contoso.App" Version="1.4.0.0" Publisher="CN=Contoso, O=Contoso Inc"
            ProcessorArchitecture="x64" />
  <Properties>
    <DisplayName>Contoso Demo</DisplayName>
    <PublisherDisplayName>Contoso Inc</PublisherDisplayName>
    <Framework>false</Framework>
  </Properties>
  <Dependencies>
    <PackageDependency Name="Microsoft.VCLibs.140.00" MinVersion="14.0.30704.0"
                       Publisher="CN=Microsoft Corporation" />
    <PackageDependency Name="Contoso.Runtime" />
  </Dependencies>
  <Capabilities>
    <Capability Name="internetClient" />
    <rescap:Capability Name="runFullTrust" />
  </Capabilities>
</Package>"#,
            ns = MANIFEST_NS
        )
    }

    #[test]
    fn test_parse_identity_and_properties() {
        let data = parse_manifest(&sample_manifest()).unwrap();
        assert_eq!(data.name, "Contoso.App");
        assert_eq!(data.version.as_deref(), Some("1.4.0.0"));
        assert_eq!(data.publisher, "CN=Contoso, O=Contoso Inc");
        assert_eq!(data.architecture.as_deref(), Some("x64"));
        assert_eq!(data.display_name, "Contoso Demo");
        assert_eq!(data.publisher_display_name, "Contoso Inc");
        assert!(!data.is_framework);
    }

    #[test]
    fn test_capabilities_and_dependencies_preserve_document_order() {
        let data = parse_manifest(&sample_manifest()).unwrap();
        assert_eq!(data.capabilities, vec!["internetClient", "runFullTrust"]);
        assert_eq!(
            data.dependencies,
            vec![
                "Microsoft.VCLibs.140.00 (>= 14.0.30704.0)",
                "Contoso.Runtime"
            ]
        );
    }

    #[test]
    fn test_identity_outside_default_namespace_is_ignored() {
        let xml = format!(
            r#"<Package xmlns="{ns}" xmlns:x="urn:other">
  <x:Identity Name="Decoy" Version="9.9.9.9" Publisher="CN=Decoy" />
  <Identity Name="Real.App" Version="2.0.0.0" Publisher="CN=Real" />
</Package>"#,
            ns = MANIFEST_NS
        );
        let data = parse_manifest(&xml).unwrap();
        assert_eq!(data.name, "Real.App");
        assert_eq!(data.publisher, "CN=Real");
    }

    #[test]
    fn test_framework_flag() {
        let xml = format!(
            r#"<Package xmlns="{ns}">
  <Identity Name="Contoso.Lib" Version="1.0.0.0" Publisher="CN=Contoso" />
  <Properties><Framework>true</Framework></Properties>
</Package>"#,
            ns = MANIFEST_NS
        );
        let data = parse_manifest(&xml).unwrap();
        assert!(data.is_framework);
    }

    #[test]
    fn test_display_name_falls_back_to_internal_name() {
        let xml = format!(
            r#"<Package xmlns="{ns}">
  <Identity Name="Contoso.App" Version="1.0.0.0" Publisher="CN=Contoso" />
</Package>"#,
            ns = MANIFEST_NS
        );
        let descriptor = build_descriptor(parse_manifest(&xml).unwrap(), SignatureStatus::Unsigned);
        assert_eq!(descriptor.display_name, "Contoso.App");
        assert_eq!(descriptor.package_family_name, "Contoso.App_Contoso");
    }

    #[test]
    fn test_bundle_identity_without_architecture_is_neutral() {
        let xml = r#"<Bundle xmlns="http://schemas.microsoft.com/appx/2013/bundle">
  <Identity Name="Contoso.App" Version="1.0.0.0" Publisher="CN=Contoso" />
</Bundle>"#;
        let descriptor = build_descriptor(parse_manifest(xml).unwrap(), SignatureStatus::Valid);
        assert_eq!(descriptor.architecture, Architecture::Neutral);
        assert_eq!(descriptor.signature_status, SignatureStatus::Valid);
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let err = parse_manifest("<Package><Identity").unwrap_err();
        assert!(matches!(err, Error::ManifestParse(_)));
    }

    #[test]
    fn test_empty_manifest_data_builds_empty_identity() {
        let descriptor = build_descriptor(ManifestData::default(), SignatureStatus::Unsigned);
        assert!(descriptor.name.is_empty());
        assert!(descriptor.package_family_name.is_empty());
        assert_eq!(descriptor.architecture, Architecture::Unknown);
    }
}
