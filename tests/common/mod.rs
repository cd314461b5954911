// tests/common/mod.rs

//! Shared fixtures: builds real package archives on disk and provides
//! scripted implementations of the OS seams.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use async_trait::async_trait;
use sideload::deploy::facility::ProgressFn;
use sideload::{
    DeploymentFacility, DeploymentStatus, Error, HostPolicy, InstalledPackageRegistry,
    InstalledRecord, Result,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const MANIFEST_NS: &str = "http://schemas.microsoft.com/appx/manifest/foundation/windows10";

/// Render a minimal single-package manifest.
pub fn manifest_xml(name: &str, publisher: &str, version: &str, architecture: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="{ns}">
  <Identity Name="{name}" Version="{version}" Publisher="{publisher}"
            ProcessorArchitecture="{architecture}" />
  <Properties>
    <DisplayName>{name} Display</DisplayName>
    <PublisherDisplayName>{publisher_display}</PublisherDisplayName>
    <Framework>false</Framework>
  </Properties>
  <Capabilities>
    <Capability Name="internetClient" />
  </Capabilities>
</Package>"#,
        ns = MANIFEST_NS,
        name = name,
        version = version,
        publisher = publisher,
        architecture = architecture,
        publisher_display = "Test Publisher",
    )
}

/// Write a package archive with the given entries.
pub fn build_archive(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// Write a well-formed package file, optionally signed.
pub fn build_package(
    dir: &Path,
    file_name: &str,
    manifest: &str,
    signed: bool,
) -> PathBuf {
    let path = dir.join(file_name);
    let mut entries = vec![
        ("AppxManifest.xml", manifest),
        ("AppxBlockMap.xml", "<BlockMap />"),
        ("payload/app.bin", "payload bytes"),
    ];
    if signed {
        entries.push(("AppxSignature.p7x", "signature container"));
    }
    build_archive(&path, &entries);
    path
}

/// Facility whose outcome and progress reports are scripted, recording
/// every call it receives.
pub struct ScriptedFacility {
    pub outcome: Mutex<Result<DeploymentStatus>>,
    pub progress_script: Vec<u8>,
    pub install_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub removed_identities: Mutex<Vec<String>>,
}

impl ScriptedFacility {
    pub fn succeeding(progress_script: Vec<u8>) -> Self {
        Self::new(Ok(DeploymentStatus::registered()), progress_script)
    }

    pub fn failing(code: u32, error_text: &str) -> Self {
        Self::new(Ok(DeploymentStatus::failed(code, error_text)), Vec::new())
    }

    pub fn erroring(code: u32, message: &str) -> Self {
        Self::new(
            Err(Error::Deployment {
                code,
                message: message.to_string(),
            }),
            Vec::new(),
        )
    }

    fn new(outcome: Result<DeploymentStatus>, progress_script: Vec<u8>) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            progress_script,
            install_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
            removed_identities: Mutex::new(Vec::new()),
        }
    }

    fn take_outcome(&self) -> Result<DeploymentStatus> {
        let mut slot = self.outcome.lock().unwrap();
        std::mem::replace(&mut *slot, Ok(DeploymentStatus::registered()))
    }
}

#[async_trait]
impl DeploymentFacility for ScriptedFacility {
    async fn install_package(
        &self,
        _path: &Path,
        on_progress: ProgressFn<'_>,
    ) -> Result<DeploymentStatus> {
        self.install_calls.fetch_add(1, Ordering::SeqCst);
        for percent in &self.progress_script {
            on_progress(*percent);
        }
        self.take_outcome()
    }

    async fn remove_package(
        &self,
        full_name: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<DeploymentStatus> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.removed_identities
            .lock()
            .unwrap()
            .push(full_name.to_string());
        for percent in &self.progress_script {
            on_progress(*percent);
        }
        self.take_outcome()
    }
}

/// Policy with fixed flags; `None` simulates a read failure.
pub struct ScriptedPolicy {
    pub trusted: Option<bool>,
    pub development: Option<bool>,
}

#[async_trait]
impl HostPolicy for ScriptedPolicy {
    async fn allow_all_trusted_apps(&self) -> Result<bool> {
        self.trusted
            .ok_or_else(|| Error::Policy("scripted read failure".to_string()))
    }

    async fn allow_development_without_license(&self) -> Result<bool> {
        self.development
            .ok_or_else(|| Error::Policy("scripted read failure".to_string()))
    }
}

/// Registry backed by a fixed record set.
pub struct FixedRegistry {
    pub records: Vec<InstalledRecord>,
}

#[async_trait]
impl InstalledPackageRegistry for FixedRegistry {
    async fn installed_packages(&self) -> Result<Vec<InstalledRecord>> {
        Ok(self.records.clone())
    }
}

/// A plain installed-package record for catalog tests.
pub fn installed_record(name: &str, publisher: &str) -> InstalledRecord {
    InstalledRecord {
        name: name.to_string(),
        publisher: publisher.to_string(),
        version: "1.0.0.0".to_string(),
        architecture: "x64".to_string(),
        package_full_name: format!("{}_1.0.0.0_x64__testid", name),
        signature_kind: "Store".to_string(),
        ..InstalledRecord::default()
    }
}
