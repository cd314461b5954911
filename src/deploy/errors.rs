// src/deploy/errors.rs

//! Deployment error catalog
//!
//! Maps platform status codes to a title, a human description, and
//! remediation suggestions. The table is immutable after construction.
//! Unknown codes degrade to a generic-but-structured message; a raw
//! platform string never takes the title position.

use crate::error::Error;
use std::collections::HashMap;
use std::io::ErrorKind;

/// Render a 32-bit platform status code as user-facing text.
pub fn format_status_code(code: u32) -> String {
    format!("0x{:08X}", code)
}

/// Scan free text for an embedded `0xXXXXXXXX` status code.
///
/// Facility error output usually quotes the platform code somewhere in the
/// message; this picks up the first well-formed one.
pub fn extract_status_code(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 10 <= bytes.len() {
        if bytes[i] == b'0' && (bytes[i + 1] == b'x' || bytes[i + 1] == b'X') {
            let hex = &bytes[i + 2..i + 10];
            if hex.iter().all(|b| b.is_ascii_hexdigit()) {
                if let Ok(hex) = std::str::from_utf8(hex) {
                    return u32::from_str_radix(hex, 16).ok();
                }
            }
        }
        i += 1;
    }
    None
}

/// One catalog entry for a known platform status code
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub suggestions: &'static [&'static str],
}

/// Immutable lookup table from platform status codes to actionable text
#[derive(Debug)]
pub struct DeploymentErrorCatalog {
    entries: HashMap<u32, CatalogEntry>,
}

impl Default for DeploymentErrorCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DeploymentErrorCatalog {
    /// Build the catalog. Constructed once at the composition point and
    /// never mutated afterwards.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for (code, entry) in KNOWN_CODES {
            entries.insert(*code, *entry);
        }
        Self { entries }
    }

    /// Whether the catalog has an entry for this code.
    pub fn is_known(&self, code: u32) -> bool {
        self.entries.contains_key(&code)
    }

    /// Title and description for a code, with the generic fallback for
    /// unknown codes.
    pub fn describe(&self, code: u32) -> (String, String) {
        match self.entries.get(&code) {
            Some(entry) => (entry.title.to_string(), entry.description.to_string()),
            None => (
                format!("An error occurred ({})", format_status_code(code)),
                "The deployment facility reported an unrecognized status code.".to_string(),
            ),
        }
    }

    /// Remediation suggestions for a code; empty for unknown codes.
    pub fn suggestions(&self, code: u32) -> Vec<String> {
        self.entries
            .get(&code)
            .map(|entry| entry.suggestions.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }

    /// Render a code as a single `title: description` message.
    pub fn decode_error(&self, code: u32) -> String {
        let (title, description) = self.describe(code);
        format!("{}: {}", title, description)
    }

    /// Decode an error into the best available human text.
    ///
    /// Tries the embedded platform code first. When that only yields the
    /// generic fallback, matches known local failure categories before
    /// resorting to the raw message.
    pub fn decode_exception(&self, error: &Error) -> String {
        let embedded = error
            .status_code()
            .or_else(|| extract_status_code(&error.to_string()));
        if let Some(code) = embedded {
            if self.is_known(code) {
                return self.decode_error(code);
            }
        }
        match error {
            Error::Io(e) if e.kind() == ErrorKind::PermissionDenied => {
                "Access denied. The operation requires elevated privileges.".to_string()
            }
            Error::Io(e) if e.kind() == ErrorKind::NotFound => {
                "The package file could not be found.".to_string()
            }
            Error::Io(e) => format!("An I/O error occurred: {}", e),
            Error::FileNotFound(path) => format!("The package file could not be found: {}", path),
            other => other.to_string(),
        }
    }
}

/// Known platform status codes.
///
/// Grouped by family: install conflicts, policy, prerequisites,
/// repository, bundles, signature/trust, access and I/O.
const KNOWN_CODES: &[(u32, CatalogEntry)] = &[
    (
        0x8007_3CF0,
        CatalogEntry {
            title: "Package open failed",
            description: "The package file could not be opened. It may be corrupt or incomplete.",
            suggestions: &[
                "Re-download the package file",
                "Verify the file was not truncated during transfer",
            ],
        },
    ),
    (
        0x8007_3CF1,
        CatalogEntry {
            title: "Package not found",
            description: "The deployment facility could not locate the package.",
            suggestions: &["Check that the file path is correct and accessible"],
        },
    ),
    (
        0x8007_3CF2,
        CatalogEntry {
            title: "Invalid package",
            description: "The package contents are invalid or the manifest is malformed.",
            suggestions: &[
                "Rebuild or re-download the package",
                "Confirm the package targets this OS version",
            ],
        },
    ),
    (
        0x8007_3CF3,
        CatalogEntry {
            title: "Dependency resolution failed",
            description:
                "A framework package this package depends on is not installed, or its installed \
                 version is too old.",
            suggestions: &[
                "Install the required framework packages first (see the package's dependency list)",
                "Update the installed framework to the required minimum version",
            ],
        },
    ),
    (
        0x8007_3CF4,
        CatalogEntry {
            title: "Out of disk space",
            description: "There is not enough disk space to stage and install the package.",
            suggestions: &["Free up disk space and retry"],
        },
    ),
    (
        0x8007_3CF5,
        CatalogEntry {
            title: "Download failed",
            description: "A network failure interrupted package acquisition.",
            suggestions: &["Check the network connection and retry"],
        },
    ),
    (
        0x8007_3CF6,
        CatalogEntry {
            title: "Registration failed",
            description: "The package could not be registered for the current user.",
            suggestions: &[
                "Close running instances of the application and retry",
                "Retry after signing out and back in",
            ],
        },
    ),
    (
        0x8007_3CF9,
        CatalogEntry {
            title: "Installation failed",
            description: "The deployment facility reported a generic installation failure.",
            suggestions: &["Check the event log for the detailed deployment trace"],
        },
    ),
    (
        0x8007_3CFA,
        CatalogEntry {
            title: "Removal failed",
            description: "The deployment facility reported a generic removal failure.",
            suggestions: &["Close running instances of the application and retry"],
        },
    ),
    (
        0x8007_3CFB,
        CatalogEntry {
            title: "Higher version already installed",
            description:
                "A package with the same identity and a higher or equal version is already \
                 installed; downgrades are not permitted.",
            suggestions: &[
                "Remove the installed version first",
                "Install a package with a higher version number",
            ],
        },
    ),
    (
        0x8007_3CFF,
        CatalogEntry {
            title: "Blocked by policy",
            description:
                "The package requires sideloading to be enabled, and the host configuration \
                 does not allow it.",
            suggestions: &[
                "Enable developer mode or the sideloading setting in the OS settings",
                "Install a store-signed build of the package instead",
            ],
        },
    ),
    (
        0x8007_3D00,
        CatalogEntry {
            title: "Prerequisite not met",
            description: "The package declares a prerequisite the host does not satisfy.",
            suggestions: &["Check the package's minimum OS version requirement"],
        },
    ),
    (
        0x8007_3D01,
        CatalogEntry {
            title: "Package repository corrupted",
            description: "The OS package repository state is corrupted.",
            suggestions: &["Run the system file integrity repair tooling"],
        },
    ),
    (
        0x8007_3D02,
        CatalogEntry {
            title: "Application in use",
            description:
                "The operation could not complete because package resources are in use by a \
                 running application.",
            suggestions: &["Close the application and retry"],
        },
    ),
    (
        0x8007_3D10,
        CatalogEntry {
            title: "No applicable package in bundle",
            description:
                "The bundle contains no package applicable to this host's architecture or \
                 language configuration.",
            suggestions: &["Use a bundle built for this architecture"],
        },
    ),
    (
        0x800B_0100,
        CatalogEntry {
            title: "Package is not signed",
            description: "No signature is present on the package.",
            suggestions: &[
                "Enable sideloading of unsigned packages, or obtain a signed build",
            ],
        },
    ),
    (
        0x800B_0004,
        CatalogEntry {
            title: "Publisher not trusted",
            description: "The package is signed, but the subject is not trusted by this host.",
            suggestions: &[
                "Install the publisher's certificate into the trusted store",
            ],
        },
    ),
    (
        0x800B_0109,
        CatalogEntry {
            title: "Untrusted certificate chain",
            description:
                "The package signature terminates in a root certificate that is not trusted.",
            suggestions: &[
                "Install the signing certificate into the trusted root store",
                "Obtain a build signed with a trusted certificate",
            ],
        },
    ),
    (
        0x8007_0002,
        CatalogEntry {
            title: "File not found",
            description: "A file required by the operation could not be found.",
            suggestions: &["Check that the file path is correct"],
        },
    ),
    (
        0x8007_0003,
        CatalogEntry {
            title: "Path not found",
            description: "A directory required by the operation could not be found.",
            suggestions: &["Check that the path exists and is accessible"],
        },
    ),
    (
        0x8007_0005,
        CatalogEntry {
            title: "Access denied",
            description: "The operation was denied by the OS access control.",
            suggestions: &[
                "Retry from an elevated prompt",
                "Check permissions on the package file and install location",
            ],
        },
    ),
    (
        0x8007_000D,
        CatalogEntry {
            title: "Invalid data",
            description: "The package data is invalid or corrupt.",
            suggestions: &["Re-download the package file"],
        },
    ),
    (
        0x8007_0057,
        CatalogEntry {
            title: "Invalid parameter",
            description: "The deployment facility rejected a request parameter.",
            suggestions: &["Verify the package identity and retry"],
        },
    ),
    (
        0x8007_0070,
        CatalogEntry {
            title: "Disk full",
            description: "The target volume is full.",
            suggestions: &["Free up disk space and retry"],
        },
    ),
];
