//! Architecture descriptor decoding.
//!
//! Simulator build configurations name their target architecture with a
//! free-form string such as `RV64GC_MSU` or `.exe_HW_RV32IMU_sim`. Decoding
//! scans for the first `RV32`/`RV64` marker (case-insensitive), then
//! accumulates every uppercase letter that follows it, expanding the `G`
//! shorthand to `IMAFD` in place. Non-letter characters are skipped, not
//! treated as terminators, so underscores and suffixes do not end the scan.

use std::fmt;
use thiserror::Error;

/// Error produced when a raw architecture string cannot be decoded.
#[derive(Debug, Error)]
pub enum ArchError {
    /// Neither `RV32` nor `RV64` occurs anywhere in the string.
    #[error("cannot find an architecture marker (RV32 or RV64) in {0:?}")]
    MissingMarker(String),
}

/// Base ISA register width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseWidth {
    /// 32-bit base ISA.
    Rv32,
    /// 64-bit base ISA.
    Rv64,
}

impl BaseWidth {
    /// Register width in bits.
    pub fn bits(self) -> u32 {
        match self {
            BaseWidth::Rv32 => 32,
            BaseWidth::Rv64 => 64,
        }
    }
}

impl fmt::Display for BaseWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RV{}", self.bits())
    }
}

/// Decoded architecture descriptor: base width plus the ordered run of
/// extension letters found after the marker.
///
/// Immutable once parsed; the `Display` rendering is the canonical form,
/// e.g. `RV64IMAFD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchSpec {
    base: BaseWidth,
    extensions: String,
}

impl ArchSpec {
    /// Decode a raw configuration string.
    ///
    /// The marker search is case-insensitive and `RV32` wins if both markers
    /// are present. Extension accumulation, however, only picks up uppercase
    /// letters of the original string, matching the conventions of simulator
    /// build names (`RV64GC_MSU`).
    pub fn parse(raw: &str) -> Result<Self, ArchError> {
        let upper = raw.to_ascii_uppercase();

        let (marker_at, base) = if let Some(i) = upper.find("RV32") {
            (i, BaseWidth::Rv32)
        } else if let Some(i) = upper.find("RV64") {
            (i, BaseWidth::Rv64)
        } else {
            return Err(ArchError::MissingMarker(raw.to_string()));
        };

        // to_ascii_uppercase preserves byte offsets, and the marker itself is
        // ASCII, so marker_at + 4 is a char boundary in the original string.
        let mut extensions = String::new();
        for ch in raw[marker_at + 4..].chars() {
            if ch == 'G' {
                // 'G' is shorthand for the general-purpose set.
                extensions.push_str("IMAFD");
            } else if ch.is_ascii_uppercase() {
                extensions.push(ch);
            }
        }

        Ok(ArchSpec { base, extensions })
    }

    /// The decoded base width.
    pub fn base(&self) -> BaseWidth {
        self.base
    }

    /// Extension letters in accumulation order (uppercase).
    pub fn extensions(&self) -> &str {
        &self.extensions
    }

    /// Case-insensitive membership test for a single extension letter.
    pub fn has_extension(&self, letter: char) -> bool {
        self.extensions
            .chars()
            .any(|c| c == letter.to_ascii_uppercase())
    }

    /// Whether supervisor mode (the `S` extension) is present.
    pub fn has_supervisor(&self) -> bool {
        self.has_extension('s')
    }
}

impl fmt::Display for ArchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rv64_marker() {
        let arch = ArchSpec::parse("RV64IMAFD").unwrap();
        assert_eq!(arch.base(), BaseWidth::Rv64);
        assert_eq!(arch.extensions(), "IMAFD");
        assert_eq!(arch.to_string(), "RV64IMAFD");
    }

    #[test]
    fn marker_found_case_insensitively() {
        let arch = ArchSpec::parse("rv32IMU").unwrap();
        assert_eq!(arch.base(), BaseWidth::Rv32);
        assert_eq!(arch.to_string(), "RV32IMU");
    }

    #[test]
    fn g_expands_to_imafd() {
        let arch = ArchSpec::parse("RV64GC").unwrap();
        assert_eq!(arch.extensions(), "IMAFDC");
    }

    #[test]
    fn non_letters_are_skipped_not_terminators() {
        // The _MSU suffix still contributes M, S, U.
        let arch = ArchSpec::parse("RV64GC_MSU").unwrap();
        assert_eq!(arch.extensions(), "IMAFDCMSU");
        assert!(arch.has_supervisor());
    }

    #[test]
    fn marker_embedded_in_longer_name() {
        let arch = ArchSpec::parse(".exe_HW_RV32IMU_sim").unwrap();
        assert_eq!(arch.base(), BaseWidth::Rv32);
        // Letters before the marker and the lowercase "sim" suffix
        // contribute nothing.
        assert_eq!(arch.extensions(), "IMU");
    }

    #[test]
    fn lowercase_extensions_are_ignored() {
        let arch = ArchSpec::parse("RV64imafd").unwrap();
        assert_eq!(arch.extensions(), "");
    }

    #[test]
    fn rv32_preferred_when_both_markers_present() {
        let arch = ArchSpec::parse("RV64_RV32I").unwrap();
        assert_eq!(arch.base(), BaseWidth::Rv32);
    }

    #[test]
    fn missing_marker_is_an_error() {
        let err = ArchSpec::parse("ARMV8").unwrap_err();
        assert!(matches!(err, ArchError::MissingMarker(_)));
    }

    #[test]
    fn extension_membership_is_case_insensitive() {
        let arch = ArchSpec::parse("RV64IMAFD").unwrap();
        assert!(arch.has_extension('m'));
        assert!(arch.has_extension('M'));
        assert!(!arch.has_extension('c'));
    }
}
