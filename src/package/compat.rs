// src/package/compat.rs

//! Architecture compatibility classification
//!
//! Deterministic policy table for whether a declared package architecture
//! can run on the host. ARM targets are conservatively rejected (no ARM
//! host detection is implemented). Unrecognized values pass through so the
//! deployment facility makes the final call instead of a client-side
//! rejection.

use crate::package::descriptor::Architecture;

/// True when the running host is 64-bit.
pub fn host_is_64bit() -> bool {
    cfg!(target_pointer_width = "64")
}

/// Classify a parsed architecture against the host bitness.
pub fn is_architecture_compatible(architecture: &Architecture, host_is_64bit: bool) -> bool {
    match architecture {
        Architecture::Neutral => true,
        // 32-bit packages run on both 32- and 64-bit hosts
        Architecture::X86 => true,
        Architecture::X64 => host_is_64bit,
        Architecture::Arm | Architecture::Arm64 => false,
        Architecture::Unrecognized(_) | Architecture::Unknown => true,
    }
}

/// Classify a declared architecture string, case-insensitively.
pub fn is_declared_compatible(declared: &str, host_is_64bit: bool) -> bool {
    is_architecture_compatible(&Architecture::parse(declared), host_is_64bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x64_requires_64bit_host() {
        assert!(!is_declared_compatible("x64", false));
        assert!(is_declared_compatible("x64", true));
    }

    #[test]
    fn test_neutral_and_x86_always_compatible() {
        for host in [false, true] {
            assert!(is_declared_compatible("neutral", host));
            assert!(is_declared_compatible("any", host));
            assert!(is_declared_compatible("x86", host));
        }
    }

    #[test]
    fn test_arm_is_rejected() {
        for host in [false, true] {
            assert!(!is_declared_compatible("arm", host));
            assert!(!is_declared_compatible("arm64", host));
            assert!(!is_declared_compatible("ARM64", host));
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_declared_compatible("X86", false));
        assert!(is_declared_compatible("Neutral", false));
        assert!(!is_declared_compatible("X64", false));
    }

    #[test]
    fn test_unrecognized_passes_through() {
        assert!(is_declared_compatible("mips64", false));
        assert!(is_declared_compatible("", false));
    }
}
