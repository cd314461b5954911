// src/os/powershell.rs

//! PowerShell-backed OS collaborators
//!
//! Drives the host's package tooling as subprocesses: `Add-AppxPackage` /
//! `Remove-AppxPackage` for deployment, `Get-AppxPackage` (JSON output)
//! for the installed-package registry, and the AppModelUnlock registry
//! values for the sideloading policy flags.
//!
//! The deployment cmdlets expose no machine-readable progress stream, so
//! this facility reports coarse progress: 0 when the call is issued and
//! 100 on success. Platform status codes are recovered from the cmdlet's
//! error output.

use crate::catalog::registry::{InstalledPackageRegistry, InstalledRecord};
use crate::deploy::errors::extract_status_code;
use crate::deploy::facility::{DeploymentFacility, DeploymentStatus, HostPolicy, ProgressFn};
use crate::error::{Error, Result};
use crate::package::descriptor::PackageScope;
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, warn};

const APP_MODEL_UNLOCK_KEY: &str =
    r"HKLM:\SOFTWARE\Microsoft\Windows\CurrentVersion\AppModelUnlock";

async fn run_powershell(script: &str) -> Result<Output> {
    debug!(script, "invoking powershell");
    Command::new("powershell.exe")
        .args(["-NoProfile", "-NonInteractive", "-Command", script])
        .output()
        .await
        .map_err(Error::Io)
}

/// Quote a value as a PowerShell single-quoted literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn failure_status(output: &Output) -> DeploymentStatus {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let text = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };
    DeploymentStatus {
        is_registered: false,
        extended_error_code: extract_status_code(&text),
        error_text: if text.is_empty() { None } else { Some(text) },
    }
}

/// Deployment facility backed by the Appx cmdlets
#[derive(Debug, Default)]
pub struct PowerShellDeployment;

impl PowerShellDeployment {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DeploymentFacility for PowerShellDeployment {
    async fn install_package(
        &self,
        path: &Path,
        on_progress: ProgressFn<'_>,
    ) -> Result<DeploymentStatus> {
        on_progress(0);
        let script = format!(
            "Add-AppxPackage -Path {} -ErrorAction Stop",
            ps_quote(&path.display().to_string())
        );
        let output = run_powershell(&script).await?;
        if output.status.success() {
            on_progress(100);
            Ok(DeploymentStatus::registered())
        } else {
            Ok(failure_status(&output))
        }
    }

    async fn remove_package(
        &self,
        full_name: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<DeploymentStatus> {
        on_progress(0);
        let script = format!(
            "Remove-AppxPackage -Package {} -ErrorAction Stop",
            ps_quote(full_name)
        );
        let output = run_powershell(&script).await?;
        if output.status.success() {
            on_progress(100);
            Ok(DeploymentStatus::registered())
        } else {
            Ok(failure_status(&output))
        }
    }
}

/// Installed-package registry backed by `Get-AppxPackage`
#[derive(Debug, Default)]
pub struct PowerShellRegistry {
    scope: PackageScope,
}

impl PowerShellRegistry {
    pub fn new(scope: PackageScope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl InstalledPackageRegistry for PowerShellRegistry {
    async fn installed_packages(&self) -> Result<Vec<InstalledRecord>> {
        let all_users = match self.scope {
            PackageScope::User => "",
            PackageScope::Machine => " -AllUsers",
        };
        let script = format!(
            "Get-AppxPackage{} | Select-Object Name,Publisher,Version,Architecture,\
             PackageFullName,PackageFamilyName,InstallLocation,IsFramework,SignatureKind,\
             InstallDate | ConvertTo-Json -Depth 3",
            all_users
        );
        let output = run_powershell(&script).await?;
        if !output.status.success() {
            return Err(Error::Registry(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_str(stdout)
            .map_err(|e| Error::Registry(format!("invalid package listing: {}", e)))?;

        Ok(parse_package_listing(&value, self.scope))
    }
}

/// Parse the JSON listing. A single installed package serializes as a bare
/// object rather than a one-element array.
fn parse_package_listing(value: &Value, scope: PackageScope) -> Vec<InstalledRecord> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| parse_package_record(item, scope))
        .collect()
}

fn parse_package_record(value: &Value, scope: PackageScope) -> Option<InstalledRecord> {
    let object = value.as_object()?;
    Some(InstalledRecord {
        name: string_field(object.get("Name")).unwrap_or_default(),
        display_name: None,
        publisher: string_field(object.get("Publisher")).unwrap_or_default(),
        publisher_display_name: None,
        version: version_field(object.get("Version")).unwrap_or_default(),
        architecture: architecture_field(object.get("Architecture")),
        package_full_name: string_field(object.get("PackageFullName")).unwrap_or_default(),
        package_family_name: string_field(object.get("PackageFamilyName")),
        install_location: string_field(object.get("InstallLocation")),
        install_date: date_field(object.get("InstallDate")),
        logo_path: None,
        is_framework: object
            .get("IsFramework")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        signature_kind: signature_kind_field(object.get("SignatureKind")),
        scope,
    })
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Versions arrive either as a dotted string or as a structured
/// `{Major, Minor, Build, Revision}` object, depending on the shell.
fn version_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(parts) => {
            let component = |key: &str| parts.get(key).and_then(Value::as_i64).unwrap_or(0);
            Some(format!(
                "{}.{}.{}.{}",
                component("Major"),
                component("Minor"),
                component("Build"),
                component("Revision")
            ))
        }
        _ => None,
    }
}

/// The processor-architecture enum serializes numerically on older shells.
fn architecture_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => "x86".to_string(),
            Some(5) => "arm".to_string(),
            Some(9) => "x64".to_string(),
            Some(11) => "neutral".to_string(),
            Some(12) => "arm64".to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// The signature-kind enum serializes numerically on older shells:
/// 0 None, 1 Developer, 2 Enterprise, 3 Store, 4 System.
fn signature_kind_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => "None".to_string(),
            Some(1) => "Developer".to_string(),
            Some(2) => "Enterprise".to_string(),
            Some(3) => "Store".to_string(),
            Some(4) => "System".to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Normalize install dates to RFC 3339. Older shells emit the
/// `/Date(milliseconds)/` envelope; newer ones an ISO timestamp.
fn date_field(value: Option<&Value>) -> Option<String> {
    let raw = value?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(millis) = raw
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
        .and_then(|digits| digits.parse::<i64>().ok())
    {
        return DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339());
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.to_rfc3339()),
        Err(e) => {
            warn!("unparseable install date '{}': {}", raw, e);
            None
        }
    }
}

/// Sideloading policy flags from the AppModelUnlock registry values
#[derive(Debug, Default)]
pub struct PowerShellPolicy;

impl PowerShellPolicy {
    pub fn new() -> Self {
        Self
    }

    async fn read_flag(&self, value_name: &str) -> Result<bool> {
        let script = format!(
            "(Get-ItemProperty -Path {} -Name {} -ErrorAction Stop).{}",
            ps_quote(APP_MODEL_UNLOCK_KEY),
            value_name,
            value_name
        );
        let output = run_powershell(&script).await?;
        if !output.status.success() {
            return Err(Error::Policy(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(matches!(stdout.trim(), "1" | "True" | "true"))
    }
}

#[async_trait]
impl HostPolicy for PowerShellPolicy {
    async fn allow_all_trusted_apps(&self) -> Result<bool> {
        self.read_flag("AllowAllTrustedApps").await
    }

    async fn allow_development_without_license(&self) -> Result<bool> {
        self.read_flag("AllowDevelopmentWithoutDevLicense").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ps_quote_escapes_single_quotes() {
        assert_eq!(ps_quote("plain"), "'plain'");
        assert_eq!(ps_quote("it's"), "'it''s'");
    }

    #[test]
    fn test_version_field_accepts_both_shapes() {
        let from_string: Value = serde_json::json!("1.2.3.4");
        assert_eq!(version_field(Some(&from_string)).as_deref(), Some("1.2.3.4"));

        let from_object: Value = serde_json::json!({
            "Major": 10, "Minor": 0, "Build": 22621, "Revision": 1
        });
        assert_eq!(
            version_field(Some(&from_object)).as_deref(),
            Some("10.0.22621.1")
        );
    }

    #[test]
    fn test_numeric_enums_are_mapped() {
        assert_eq!(architecture_field(Some(&serde_json::json!(9))), "x64");
        assert_eq!(architecture_field(Some(&serde_json::json!(12))), "arm64");
        assert_eq!(architecture_field(Some(&serde_json::json!("X64"))), "X64");
        assert_eq!(signature_kind_field(Some(&serde_json::json!(4))), "System");
        assert_eq!(signature_kind_field(Some(&serde_json::json!("Store"))), "Store");
    }

    #[test]
    fn test_date_envelope_is_normalized() {
        let wrapped: Value = serde_json::json!("/Date(1700000000000)/");
        let normalized = date_field(Some(&wrapped)).unwrap();
        assert!(normalized.starts_with("2023-11-14T"));

        let iso: Value = serde_json::json!("2024-01-15T10:30:00+00:00");
        assert!(date_field(Some(&iso)).is_some());

        let junk: Value = serde_json::json!("yesterday");
        assert!(date_field(Some(&junk)).is_none());
    }

    #[test]
    fn test_single_package_listing_parses_as_object() {
        let listing: Value = serde_json::json!({
            "Name": "Contoso.App",
            "Publisher": "CN=Contoso, O=Contoso Inc",
            "Version": "1.0.0.0",
            "Architecture": 9,
            "PackageFullName": "Contoso.App_1.0.0.0_x64__abc",
            "PackageFamilyName": "Contoso.App_abc",
            "InstallLocation": "C:\\Apps\\Contoso",
            "IsFramework": false,
            "SignatureKind": 3
        });
        let records = parse_package_listing(&listing, PackageScope::User);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Contoso.App");
        assert_eq!(record.architecture, "x64");
        assert_eq!(record.signature_kind, "Store");
        assert_eq!(record.package_family_name.as_deref(), Some("Contoso.App_abc"));
    }

    #[test]
    fn test_listing_array_parses_all_entries() {
        let listing: Value = serde_json::json!([
            {"Name": "A", "Publisher": "CN=A", "Version": "1.0.0.0",
             "PackageFullName": "A_1", "SignatureKind": 0},
            {"Name": "B", "Publisher": "CN=B", "Version": "2.0.0.0",
             "PackageFullName": "B_2", "SignatureKind": "System"}
        ]);
        let records = parse_package_listing(&listing, PackageScope::Machine);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].signature_kind, "None");
        assert_eq!(records[1].signature_kind, "System");
        assert_eq!(records[1].scope, PackageScope::Machine);
    }

    #[test]
    fn test_failure_status_extracts_embedded_code() {
        let output = Output {
            status: exit_status(1),
            stdout: Vec::new(),
            stderr: b"Deployment failed with HRESULT: 0x80073CFF. Policy blocks it.".to_vec(),
        };
        let status = failure_status(&output);
        assert!(!status.is_registered);
        assert_eq!(status.extended_error_code, Some(0x8007_3CFF));
        assert!(status.error_text.unwrap().contains("Policy blocks it"));
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }
}
