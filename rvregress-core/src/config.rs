//! Harness configuration.
//!
//! The validated, immutable record produced at startup and shared read-only
//! with every worker. Path validation and the CLI/file-config layering that
//! builds this live in the CLI crate; nothing here is mutated after
//! construction.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::arch::ArchSpec;

/// Geometry of the memory image the simulator expects, driving the stage-2
/// repacker invocation and the dual-channel link names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryGeometry {
    /// Memory width in bits.
    pub width_bits: u32,
    /// Starting word address (not byte address).
    pub base_word: u64,
    /// Memory size in words (not bytes).
    pub size_words: u64,
    /// Memory-image filename the simulator opens for channel A.
    pub channel_a_image: String,
    /// Memory-image filename the simulator opens for channel B.
    pub channel_b_image: String,
}

impl Default for MemoryGeometry {
    fn default() -> Self {
        MemoryGeometry {
            width_bits: 512,
            base_word: 0,
            size_words: 0x0400_0000,
            channel_a_image: "DDR4_A.memhex512".to_string(),
            channel_b_image: "DDR4_B.memhex512".to_string(),
        }
    }
}

impl MemoryGeometry {
    /// Name of the stage-2 output file, derived from the width.
    pub fn memhex_filename(&self) -> String {
        format!("test.memhex{}", self.width_bits)
    }
}

/// Simulation verbosity request, recorded for the parameter summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// No extra tracing.
    #[default]
    Quiet,
    /// `v1`: print an instruction trace during simulation.
    InstructionTrace,
    /// `v2`: print pipeline stage state during simulation.
    PipelineState,
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Verbosity::InstructionTrace),
            "v2" => Ok(Verbosity::PipelineState),
            other => Err(format!("unknown verbosity {other:?} (expected v1 or v2)")),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verbosity::Quiet => "quiet",
            Verbosity::InstructionTrace => "v1",
            Verbosity::PipelineState => "v2",
        };
        f.write_str(s)
    }
}

/// Immutable harness configuration, created once at startup.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Simulation executable (Bluesim, Verilator sim, ...).
    pub sim_path: PathBuf,
    /// Decoded target architecture.
    pub arch: ArchSpec,
    /// Directory containing the pre-built ISA test ELF files.
    pub tests_dir: PathBuf,
    /// Directory receiving per-test logs and trace artifacts.
    pub logs_dir: PathBuf,
    /// Converter: ELF to generic 32-bit-word memhex.
    pub elf_to_memhex32: PathBuf,
    /// Converter: generic memhex32 to the simulator's memory geometry.
    pub memhex32_to_memhex: PathBuf,
    /// Requested simulation verbosity.
    pub verbosity: Verbosity,
    /// Number of concurrent workers.
    pub n_workers: usize,
    /// Memory-image geometry for the stage-2 repack.
    pub memory: MemoryGeometry,
    /// Directory under which per-worker working directories are created.
    pub work_root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_matches_simulator_expectations() {
        let geometry = MemoryGeometry::default();
        assert_eq!(geometry.width_bits, 512);
        assert_eq!(geometry.size_words, 0x0400_0000);
        assert_eq!(geometry.memhex_filename(), "test.memhex512");
    }

    #[test]
    fn verbosity_parses_v1_and_v2() {
        assert_eq!("v1".parse::<Verbosity>().unwrap(), Verbosity::InstructionTrace);
        assert_eq!("v2".parse::<Verbosity>().unwrap(), Verbosity::PipelineState);
        assert!("v3".parse::<Verbosity>().is_err());
    }
}
