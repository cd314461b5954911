// src/package/descriptor.rs

//! Package descriptor model
//!
//! A `PackageDescriptor` is an immutable-after-construction snapshot of a
//! package's identity and metadata. Descriptors come from two sources:
//! the archive manifest reader (not-yet-installed files, so no full name
//! and no install date) and the package catalog (installed packages, all
//! fields populated from OS state).

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use strum_macros::Display;

/// The well-known publisher id used by Store-signed first-party packages
pub const MICROSOFT_STORE_PUBLISHER_ID: &str = "8wekyb3d8bbwe";

/// Sentinel used when a package has no install location on disk
pub const NO_INSTALL_LOCATION: &str = "N/A";

/// Sentinel for a version that could not be determined
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Sentinel for a version that was absent from the manifest
pub const ZERO_VERSION: &str = "0.0.0.0";

/// Declared processor architecture of a package.
///
/// Unrecognized values are preserved verbatim rather than coerced, so
/// diagnostics can show exactly what the manifest declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Architecture {
    Neutral,
    X86,
    X64,
    Arm,
    Arm64,
    Unrecognized(String),
    Unknown,
}

impl Architecture {
    /// Parse a declared architecture string, case-insensitively.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "" => Self::Unknown,
            "neutral" | "any" => Self::Neutral,
            "x86" => Self::X86,
            "x64" => Self::X64,
            "arm" => Self::Arm,
            "arm64" => Self::Arm64,
            _ => Self::Unrecognized(value.to_string()),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::X86 => write!(f, "x86"),
            Self::X64 => write!(f, "x64"),
            Self::Arm => write!(f, "arm"),
            Self::Arm64 => write!(f, "arm64"),
            Self::Unrecognized(value) => write!(f, "{}", value),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Coarse signature classification.
///
/// `Valid` only means a signature container entry is present in the
/// archive; no trust-chain or tamper validation is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SignatureStatus {
    #[default]
    Unknown,
    Valid,
    Invalid,
    Unsigned,
    Untrusted,
}

/// Whether a package is registered per-user or machine-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum PackageScope {
    #[default]
    User,
    Machine,
}

/// Derived package classification, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PackageType {
    Framework,
    Microsoft,
    ThirdParty,
}

/// Structured metadata about a package, installed or not
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    /// Internal package identifier
    pub name: String,
    /// Human-facing name; falls back to `name` when the manifest leaves it blank
    pub display_name: String,
    /// Raw publisher subject string (certificate-subject-like)
    pub publisher: String,
    /// Human-facing publisher name
    pub publisher_display_name: String,
    /// Publisher id derived from the subject string
    pub publisher_id: String,
    /// 4-part dotted numeric version, or a sentinel; never partially populated
    pub version: String,
    pub architecture: Architecture,
    /// `{name}_{publisher_id}`; non-empty only when both parts are non-empty
    pub package_family_name: String,
    /// Fully-qualified install identity; only populated for installed packages
    pub package_full_name: Option<String>,
    /// Absolute path, or the `N/A` sentinel
    pub install_location: String,
    /// Absent for not-yet-installed files
    pub install_date: Option<DateTime<Utc>>,
    /// Only populated for installed packages
    pub logo_path: Option<String>,
    pub is_framework: bool,
    /// True when the OS reports a system signature class; cannot be bypassed
    pub is_system_protected: bool,
    /// Advisory classification against the curated shell-critical list
    pub is_critical_system_app: bool,
    pub signature_status: SignatureStatus,
    pub scope: PackageScope,
    /// `"<name> (>= <minVersion>)"` entries, in document order
    pub dependencies: Vec<String>,
    /// Declared capability names, in document order
    pub capabilities: Vec<String>,
}

impl PackageDescriptor {
    /// A descriptor with empty identity fields.
    ///
    /// Used when an archive carries no manifest entry at all.
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            display_name: String::new(),
            publisher: String::new(),
            publisher_display_name: String::new(),
            publisher_id: String::new(),
            version: UNKNOWN_VERSION.to_string(),
            architecture: Architecture::Unknown,
            package_family_name: String::new(),
            package_full_name: None,
            install_location: NO_INSTALL_LOCATION.to_string(),
            install_date: None,
            logo_path: None,
            is_framework: false,
            is_system_protected: false,
            is_critical_system_app: false,
            signature_status: SignatureStatus::Unknown,
            scope: PackageScope::User,
            dependencies: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// A degraded descriptor carrying only identity fields.
    ///
    /// Substituted when converting an installed-package record fails, so
    /// enumeration never drops or aborts on a single bad entry.
    pub fn degraded(name: &str, full_name: &str, family_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            package_full_name: if full_name.is_empty() {
                None
            } else {
                Some(full_name.to_string())
            },
            package_family_name: family_name.to_string(),
            ..Self::empty()
        }
    }

    /// Return a copy with the signature status backfilled.
    ///
    /// The only post-construction update in the descriptor lifecycle: the
    /// validator's deferred signature check writes its result through here.
    pub fn with_signature_status(mut self, status: SignatureStatus) -> Self {
        self.signature_status = status;
        self
    }

    /// True when the publisher subject names Microsoft or the id matches
    /// the well-known Store signing id.
    pub fn is_microsoft_publisher(&self) -> bool {
        self.publisher.to_ascii_lowercase().contains("microsoft")
            || self.publisher_id == MICROSOFT_STORE_PUBLISHER_ID
    }

    /// Derived classification: Framework > Microsoft > ThirdParty.
    pub fn package_type(&self) -> PackageType {
        if self.is_framework {
            PackageType::Framework
        } else if self.is_microsoft_publisher() {
            PackageType::Microsoft
        } else {
            PackageType::ThirdParty
        }
    }
}

/// Derive the publisher id from a certificate-subject-like string.
///
/// Takes the substring after `CN=` up to the next comma, trimmed. When no
/// `CN=` is present, falls back to a deterministic hash of the raw string
/// (same input always yields the same id).
pub fn derive_publisher_id(publisher: &str) -> String {
    let publisher = publisher.trim();
    if publisher.is_empty() {
        return String::new();
    }
    if let Some(start) = publisher.find("CN=") {
        let rest = &publisher[start + 3..];
        let end = rest.find(',').unwrap_or(rest.len());
        return rest[..end].trim().to_string();
    }
    let digest = Sha256::digest(publisher.as_bytes());
    hex::encode(digest)[..13].to_string()
}

/// Compose the package family name. Non-empty only when both parts are.
pub fn family_name(name: &str, publisher_id: &str) -> String {
    if name.is_empty() || publisher_id.is_empty() {
        String::new()
    } else {
        format!("{}_{}", name, publisher_id)
    }
}

/// Normalize a declared version string to the 4-part invariant.
///
/// Absent versions become `0.0.0.0`; anything that is not four dotted
/// numeric components becomes `Unknown`. Never partially populated.
pub fn normalize_version(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => ZERO_VERSION.to_string(),
        Some(value) => {
            let parts: Vec<&str> = value.split('.').collect();
            let numeric = parts.len() == 4
                && parts
                    .iter()
                    .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
            if numeric {
                value.to_string()
            } else {
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}

/// Parse a version into a numeric sort key; sentinels sort lowest.
pub fn version_sort_key(version: &str) -> [u64; 4] {
    let mut key = [0u64; 4];
    for (slot, part) in key.iter_mut().zip(version.split('.')) {
        *slot = part.parse().unwrap_or(0);
    }
    key
}
