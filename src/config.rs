use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

use crate::common::SimError;
use crate::core::arch::memory::DEFAULT_DATA_WORDS;
use crate::isa::program::DEFAULT_CODE_BASE;

const DEFAULT_MAX_CYCLES: u64 = 10_000;
const DEFAULT_BTB_ENTRIES: usize = 4;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub predictor: PredictorConfig,
}

impl Config {
    /// Reads and parses a TOML configuration file.
    ///
    /// Missing sections and keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, SimError> {
        let config: Config = toml::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot constrain.
    ///
    /// [`Config::from_toml`] runs this on every parsed file; the simulator
    /// entry points run it again since every field is public.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.memory.data_words == 0 {
            return Err(SimError::Config("memory.data_words must be positive".into()));
        }
        if self.predictor.btb_entries == 0 {
            return Err(SimError::Config("predictor.btb_entries must be positive".into()));
        }
        if self.general.code_base % 4 != 0 {
            return Err(SimError::Config("general.code_base must be a multiple of 4".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default)]
    pub trace: bool,

    #[serde(default = "default_code_base")]
    pub code_base: u32,

    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            code_base: default_code_base(),
            max_cycles: default_max_cycles(),
        }
    }
}

fn default_code_base() -> u32 {
    DEFAULT_CODE_BASE
}

fn default_max_cycles() -> u64 {
    DEFAULT_MAX_CYCLES
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default = "default_data_words")]
    pub data_words: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_words: default_data_words(),
        }
    }
}

fn default_data_words() -> usize {
    DEFAULT_DATA_WORDS
}

/// Data hazard strategy used by the Decode stage.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HazardStrategy {
    /// Stall until every operand has been written back.
    Scoreboard,
    /// Bypass results from Execute, Memory and Writeback.
    #[default]
    Forwarding,
}

/// Order in which the forwarding unit searches in-flight producers.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ForwardingPriority {
    /// Execute, then Memory, then Writeback.
    #[default]
    Youngest,
    /// Writeback, then Memory, then Execute.
    Oldest,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub hazard_strategy: HazardStrategy,

    #[serde(default)]
    pub forwarding_priority: ForwardingPriority,
}

/// BTB slot chosen when every entry is valid.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReplacementPolicy {
    /// Always overwrite slot 0.
    #[default]
    SlotZero,
    /// Overwrite slots in rotation.
    RoundRobin,
}

/// Initial history given to a newly allocated BTB entry.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// BNZ and BP start strongly taken, other branches strongly not taken.
    #[default]
    MnemonicBias,
    /// Every branch starts strongly not taken.
    NotTaken,
    /// Every branch starts strongly taken.
    Taken,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictorConfig {
    #[serde(default = "default_btb_entries")]
    pub btb_entries: usize,

    #[serde(default)]
    pub replacement: ReplacementPolicy,

    #[serde(default)]
    pub seed: SeedPolicy,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            btb_entries: default_btb_entries(),
            replacement: ReplacementPolicy::default(),
            seed: SeedPolicy::default(),
        }
    }
}

fn default_btb_entries() -> usize {
    DEFAULT_BTB_ENTRIES
}
