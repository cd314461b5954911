// src/export.rs

//! Inventory and operation-log export
//!
//! Two line-oriented formats: a CSV package inventory
//! (`Name,DisplayName,Publisher,Version,Architecture,PackageFamilyName`
//! with an optional `InstallLocation` column, every field quoted) and the
//! operation log (`[HH:mm:ss] [Level] Message` with optional indented
//! `Error Code:` and `Details:` lines).

use crate::deploy::OperationResult;
use crate::error::Result;
use crate::package::PackageDescriptor;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use strum_macros::Display;

/// Quote a CSV field, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render the package inventory as CSV.
pub fn export_csv(packages: &[PackageDescriptor], include_location: bool) -> String {
    let mut out = String::from("Name,DisplayName,Publisher,Version,Architecture,PackageFamilyName");
    if include_location {
        out.push_str(",InstallLocation");
    }
    out.push('\n');

    for package in packages {
        let publisher = if package.publisher_display_name.is_empty() {
            &package.publisher
        } else {
            &package.publisher_display_name
        };
        let mut fields = vec![
            csv_field(&package.name),
            csv_field(&package.display_name),
            csv_field(publisher),
            csv_field(&package.version),
            csv_field(&package.architecture.to_string()),
            csv_field(&package.package_family_name),
        ];
        if include_location {
            fields.push(csv_field(&package.install_location));
        }
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Write the CSV inventory to a file.
pub fn write_csv(path: &Path, packages: &[PackageDescriptor], include_location: bool) -> Result<()> {
    std::fs::write(path, export_csv(packages, include_location))?;
    Ok(())
}

/// Log severity for exported operation logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// One exportable operation-log entry
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub error_code: Option<String>,
    pub details: Option<String>,
}

impl From<&OperationResult> for LogEvent {
    fn from(result: &OperationResult) -> Self {
        Self {
            timestamp: result.timestamp,
            level: if result.success {
                LogLevel::Info
            } else {
                LogLevel::Error
            },
            message: format!("{}: {}", result.operation, result.message),
            error_code: result.error_code.clone(),
            details: result.technical_details.clone(),
        }
    }
}

/// Render one log event in the export format.
pub fn format_log_event(event: &LogEvent) -> String {
    let mut out = format!(
        "[{}] [{}] {}\n",
        event.timestamp.format("%H:%M:%S"),
        event.level,
        event.message
    );
    if let Some(code) = &event.error_code {
        out.push_str(&format!("    Error Code: {}\n", code));
    }
    if let Some(details) = &event.details {
        out.push_str(&format!("    Details: {}\n", details));
    }
    out
}

/// Render a batch of log events.
pub fn format_log(events: &[LogEvent]) -> String {
    events.iter().map(format_log_event).collect()
}

/// Append one event to a log file, creating it when absent.
pub fn append_log(path: &Path, event: &LogEvent) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_log_event(event).as_bytes())?;
    Ok(())
}
