//! Configuration loading from rvregress.toml
//!
//! Harness settings that rarely change per invocation (memory geometry,
//! worker count, test exclusions) can live in an `rvregress.toml` file. The
//! file is discovered by walking up from the current directory; CLI flags
//! override file values, and file values override built-in defaults.

use std::path::Path;

use rvregress_core::MemoryGeometry;
use serde::{Deserialize, Serialize};

/// rvregress file configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Worker-pool configuration.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Memory-image geometry overrides.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Test-selection configuration.
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Worker-pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Number of parallel workers (clamped to the harness maximum).
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Memory-image geometry overrides; unset fields use the simulator defaults
/// (512-bit words, 0x400_0000 words, `DDR4_A`/`DDR4_B` image names).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemoryConfig {
    /// Memory width in bits.
    #[serde(default)]
    pub width_bits: Option<u32>,
    /// Starting word address.
    #[serde(default)]
    pub base_word: Option<u64>,
    /// Memory size in words.
    #[serde(default)]
    pub size_words: Option<u64>,
    /// Channel-A memory-image filename.
    #[serde(default)]
    pub channel_a_image: Option<String>,
    /// Channel-B memory-image filename.
    #[serde(default)]
    pub channel_b_image: Option<String>,
}

/// Test-selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SelectionConfig {
    /// Regex the test basename must match, in addition to the family match.
    #[serde(default)]
    pub filter: Option<String>,
    /// Test basenames to skip (debugging aid for tests known to hang).
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from the
    /// current directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("rvregress.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Memory geometry with file overrides applied over the defaults.
    pub fn resolve_memory(&self) -> MemoryGeometry {
        let defaults = MemoryGeometry::default();
        MemoryGeometry {
            width_bits: self.memory.width_bits.unwrap_or(defaults.width_bits),
            base_word: self.memory.base_word.unwrap_or(defaults.base_word),
            size_words: self.memory.size_words.unwrap_or(defaults.size_words),
            channel_a_image: self
                .memory
                .channel_a_image
                .clone()
                .unwrap_or(defaults.channel_a_image),
            channel_b_image: self
                .memory
                .channel_b_image
                .clone()
                .unwrap_or(defaults.channel_b_image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves_to_simulator_defaults() {
        let config = FileConfig::default();
        let memory = config.resolve_memory();
        assert_eq!(memory.width_bits, 512);
        assert_eq!(memory.size_words, 0x0400_0000);
        assert_eq!(memory.channel_a_image, "DDR4_A.memhex512");
        assert!(config.selection.exclude.is_empty());
    }

    #[test]
    fn parse_toml_with_partial_sections() {
        let toml_str = r#"
            [runner]
            workers = 4

            [memory]
            width_bits = 256
            size_words = 0x100

            [selection]
            exclude = ["rv64ui-p-hangs"]
        "#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.workers, Some(4));
        assert_eq!(config.selection.exclude, vec!["rv64ui-p-hangs"]);

        let memory = config.resolve_memory();
        assert_eq!(memory.width_bits, 256);
        assert_eq!(memory.size_words, 0x100);
        // Unset fields keep their defaults.
        assert_eq!(memory.base_word, 0);
        assert_eq!(memory.channel_b_image, "DDR4_B.memhex512");
    }

    #[test]
    fn empty_file_parses_as_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.runner.workers, None);
        assert!(config.selection.filter.is_none());
    }
}
