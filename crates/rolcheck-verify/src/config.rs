//! Run configuration
//!
//! A [`HarnessConfig`] is what users write (usually in `rolcheck.toml`) or
//! assemble from command-line flags. It is deliberately loose: numbers are
//! signed so that nonsense such as a negative iteration count is reported as
//! a configuration error instead of a parse error. [`HarnessConfig::validate`]
//! turns it into a [`VerifyConfig`], which is what the verifier consumes.

use crate::error::{ConfigError, ConfigResult};
use crate::golden::{shift_width_for, word_mask, MAX_WIDTH};
use crate::stimulus::{StimulusGenerator, StimulusSample};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width used when none is configured
pub const DEFAULT_WIDTH: u32 = 16;

/// Default iteration counts are `2^width`, capped at `2^DEFAULT_ITERATION_CAP_BITS`
pub const DEFAULT_ITERATION_CAP_BITS: u32 = 20;

/// Upper bound on `width + shift_width` for exhaustive enumeration
pub const MAX_EXHAUSTIVE_BITS: u32 = 24;

/// Fixed parameters of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Data word width in bits
    pub width: u32,
    /// Bits needed to hold any shift amount below `width`
    pub shift_width: u32,
    /// Number of samples to run
    pub iterations: u64,
}

impl Parameters {
    /// Build parameters, computing the shift width from the data width
    ///
    /// Without an explicit iteration count the run uses `2^width` samples,
    /// saturating for wide words.
    pub fn new(width: i64, iterations: Option<i64>) -> ConfigResult<Self> {
        let width = checked_width(width)?;
        let iterations = match iterations {
            Some(n) if n < 0 => return Err(ConfigError::NegativeIterations(n)),
            Some(n) => n as u64,
            None => default_iterations(width),
        };

        Ok(Self {
            width,
            shift_width: shift_width_for(width),
            iterations,
        })
    }

    /// Number of distinct shift amounts the stimulus can produce
    pub fn shamt_space(&self) -> u64 {
        1u64 << self.shift_width
    }
}

fn checked_width(width: i64) -> ConfigResult<u32> {
    if width <= 0 || width > i64::from(MAX_WIDTH) {
        return Err(ConfigError::InvalidWidth(width));
    }
    Ok(width as u32)
}

fn default_iterations(width: u32) -> u64 {
    1u64 << width.min(DEFAULT_ITERATION_CAP_BITS)
}

/// How stimulus samples are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusMode {
    /// Uniform random sampling from a seeded generator
    #[default]
    Random,
    /// Every (data, shamt) pair, in order
    Exhaustive,
    /// A fixed list of vectors, in order
    Directed,
}

/// Port names used by signal-level adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalNames {
    pub data: String,
    pub shamt: String,
    pub result_by_shift: String,
    pub result_by_borders: String,
    pub shift_error: String,
    pub borders_error: String,
}

impl Default for SignalNames {
    fn default() -> Self {
        Self {
            data: "data_i".to_string(),
            shamt: "shamt_i".to_string(),
            result_by_shift: "result_by_shift_o".to_string(),
            result_by_borders: "result_by_borders_o".to_string(),
            shift_error: "shift_error_o".to_string(),
            borders_error: "borders_error_o".to_string(),
        }
    }
}

/// User-facing harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Data word width in bits
    pub width: i64,

    /// Number of samples (defaults to `2^width`)
    pub iterations: Option<i64>,

    /// Optional cross-check of the derived shift width
    pub shift_width: Option<i64>,

    /// Seed for the stimulus generator; drawn from entropy when absent
    pub seed: Option<u64>,

    /// Whether the devices report error flags
    pub error_flags: bool,

    /// Stimulus selection
    pub mode: StimulusMode,

    /// Simulated time allowed for outputs to settle after each input change
    pub settle_time_ns: u64,

    /// Port names for signal-level devices
    pub signals: SignalNames,

    /// Vectors applied in directed mode
    pub vectors: Vec<StimulusSample>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            width: i64::from(DEFAULT_WIDTH),
            iterations: None,
            shift_width: None,
            seed: None,
            error_flags: false,
            mode: StimulusMode::Random,
            settle_time_ns: 1,
            signals: SignalNames::default(),
            vectors: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Load a configuration from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(s: &str) -> ConfigResult<Self> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the configuration and derive the run parameters
    pub fn validate(&self) -> ConfigResult<VerifyConfig> {
        let mut params = Parameters::new(self.width, self.iterations)?;

        if let Some(found) = self.shift_width {
            if found != i64::from(params.shift_width) {
                return Err(ConfigError::ShiftWidthMismatch {
                    width: params.width,
                    expected: params.shift_width,
                    found,
                });
            }
        }

        if self.mode == StimulusMode::Directed {
            if self.vectors.is_empty() {
                return Err(ConfigError::NoVectors);
            }
            for (index, v) in self.vectors.iter().enumerate() {
                if v.data & !word_mask(params.width) != 0 || v.shamt >= params.shamt_space() {
                    return Err(ConfigError::VectorOutOfRange {
                        index,
                        data: v.data,
                        shamt: v.shamt,
                        width: params.width,
                    });
                }
            }
            params.iterations = self.vectors.len() as u64;
        }

        if self.mode == StimulusMode::Exhaustive {
            let bits = params.width + params.shift_width;
            if bits > MAX_EXHAUSTIVE_BITS {
                return Err(ConfigError::ExhaustiveTooLarge {
                    bits,
                    limit: MAX_EXHAUSTIVE_BITS,
                });
            }
            let space = 1u64 << bits;
            if self.iterations.is_some() && params.iterations != space {
                tracing::warn!(
                    "Ignoring iteration count {} in exhaustive mode; enumerating {} samples",
                    params.iterations,
                    space
                );
            }
            params.iterations = space;
        }

        let vectors = match self.mode {
            StimulusMode::Directed => self.vectors.clone(),
            _ => Vec::new(),
        };

        Ok(VerifyConfig {
            params,
            mode: self.mode,
            seed: self.seed,
            error_flags: self.error_flags,
            vectors,
        })
    }
}

/// Validated configuration consumed by the verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    pub params: Parameters,
    pub mode: StimulusMode,
    pub seed: Option<u64>,
    /// Expect and check error flags on every observed result
    pub error_flags: bool,
    /// Directed-mode vectors
    pub vectors: Vec<StimulusSample>,
}

impl VerifyConfig {
    /// Random-mode configuration with the given parameters
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            mode: StimulusMode::Random,
            seed: None,
            error_flags: false,
            vectors: Vec::new(),
        }
    }

    /// Directed-mode configuration applying exactly `vectors`
    pub fn directed(width: i64, vectors: Vec<StimulusSample>) -> ConfigResult<Self> {
        HarnessConfig {
            width,
            mode: StimulusMode::Directed,
            vectors,
            ..Default::default()
        }
        .validate()
    }

    /// Generator for this configuration
    pub fn stimulus(&self) -> StimulusGenerator {
        match self.mode {
            StimulusMode::Directed => StimulusGenerator::directed(self.params, self.vectors.clone()),
            mode => StimulusGenerator::new(self.params, mode, self.seed),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_error_flags(mut self, enabled: bool) -> Self {
        self.error_flags = enabled;
        self
    }
}
