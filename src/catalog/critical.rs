// src/catalog/critical.rs

//! Curated list of shell-critical package name patterns
//!
//! Packages whose removal is advised against but not technically blocked.
//! Classification is a case-insensitive substring match of these patterns
//! against a package's name and family name. It is best-effort and
//! advisory only, never a security boundary. The list is data: the builtin
//! set can be replaced wholesale by a TOML file (`patterns = [...]`).

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Builtin shell-critical name patterns.
///
/// Curated against current OS builds; renamed components will under-match
/// and unrelated packages containing a pattern will over-match. That is
/// accepted for an advisory classification.
pub const BUILTIN_CRITICAL_PATTERNS: &[&str] = &[
    "Microsoft.Windows.ShellExperienceHost",
    "Microsoft.Windows.StartMenuExperienceHost",
    "Microsoft.Windows.Search",
    "Microsoft.Windows.CloudExperienceHost",
    "Microsoft.Windows.ContentDeliveryManager",
    "Microsoft.Windows.FileExplorer",
    "Microsoft.Windows.SecHealthUI",
    "Microsoft.Windows.PeopleExperienceHost",
    "Microsoft.Windows.CallingShellApp",
    "Microsoft.Windows.NarratorQuickStart",
    "Microsoft.Windows.ParentalControls",
    "Microsoft.Windows.PrintQueueActionCenter",
    "Microsoft.Windows.CapturePicker",
    "Microsoft.Windows.PinningConfirmationDialog",
    "Microsoft.Windows.AssignedAccessLockApp",
    "Microsoft.Windows.Apprep.ChxApp",
    "Microsoft.Windows.OOBENetworkCaptivePortal",
    "Microsoft.Windows.OOBENetworkConnectionFlow",
    "Microsoft.Windows.XGpuEjectDialog",
    "Microsoft.AAD.BrokerPlugin",
    "Microsoft.AccountsControl",
    "Microsoft.LockApp",
    "Microsoft.Win32WebViewHost",
    "Microsoft.MicrosoftEdge",
    "Microsoft.WindowsStore",
    "Microsoft.StorePurchaseApp",
    "Microsoft.DesktopAppInstaller",
    "Microsoft.UI.Xaml",
    "Microsoft.VCLibs",
    "Microsoft.NET.Native.Framework",
    "Microsoft.NET.Native.Runtime",
    "MicrosoftWindows.Client.CBS",
    "MicrosoftWindows.UndockedDevKit",
    "windows.immersivecontrolpanel",
];

#[derive(Debug, Deserialize)]
struct CriticalListFile {
    patterns: Vec<String>,
}

/// Advisory classifier for shell-critical packages
#[derive(Debug, Clone)]
pub struct CriticalAppList {
    /// Lowercased patterns
    patterns: Vec<String>,
}

impl Default for CriticalAppList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CriticalAppList {
    /// The builtin curated list.
    pub fn builtin() -> Self {
        Self::from_patterns(BUILTIN_CRITICAL_PATTERNS.iter().map(|p| p.to_string()))
    }

    /// Build from an explicit pattern set.
    pub fn from_patterns(patterns: impl IntoIterator<Item = String>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.to_ascii_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Load a replacement list from a TOML file (`patterns = [...]`).
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let file: CriticalListFile = toml::from_str(&text)
            .map_err(|e| Error::Registry(format!("invalid critical-app list: {}", e)))?;
        Ok(Self::from_patterns(file.patterns))
    }

    /// Load from `path` when given and readable, else the builtin list.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::from_file(path) {
                Ok(list) => list,
                Err(e) => {
                    warn!(path = %path.display(), "falling back to builtin critical-app list: {}", e);
                    Self::builtin()
                }
            },
            None => Self::builtin(),
        }
    }

    /// Number of patterns in the list.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Case-insensitive substring match against name and family name.
    pub fn is_critical(&self, name: &str, family_name: &str) -> bool {
        if name.is_empty() && family_name.is_empty() {
            return false;
        }
        let name = name.to_ascii_lowercase();
        let family = family_name.to_ascii_lowercase();
        self.patterns
            .iter()
            .any(|p| name.contains(p.as_str()) || family.contains(p.as_str()))
    }
}
