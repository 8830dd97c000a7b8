//! Run configuration: species selection, run length and the invader.
//!
//! The configuration screen of a front end boils down to a
//! [`SimulationConfig`]: which roster species start active, how many steps
//! to run, and optionally which species invades, when, how many, and how
//! hungry. The ecosystem accepts any configuration; [`validate_config`]
//! reports what a front end should refuse.
//!
//! ```
//! use foodweb_logic::config::{validate_config, InvaderConfig, SimulationConfig, Voracity};
//! use foodweb_logic::roster::EcosystemPreset;
//!
//! let roster = EcosystemPreset::AustralianNative.roster();
//! let mut config = SimulationConfig::for_preset(EcosystemPreset::AustralianNative);
//! config.invader = Some(InvaderConfig {
//!     voracity: Voracity::Extreme,
//!     ..InvaderConfig::new("cane toads")
//! });
//! assert!(validate_config(&roster, &config).is_empty());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{invader, run};
use crate::roster::{EcosystemPreset, Roster};

/// How aggressively an invader feeds. Maps onto the organism's `volume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voracity {
    Low,
    #[default]
    Medium,
    High,
    Extreme,
}

impl Voracity {
    pub fn all() -> [Voracity; 4] {
        [Self::Low, Self::Medium, Self::High, Self::Extreme]
    }

    /// Consumption coefficient applied to the invader.
    pub fn volume(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 3.0,
            Self::High => 5.0,
            Self::Extreme => 10.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Voracity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown voracity `{0}` (expected low, medium, high or extreme)")]
pub struct ParseVoracityError(String);

impl FromStr for Voracity {
    type Err = ParseVoracityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseVoracityError(s.to_string()))
    }
}

/// An invasive species entering partway through the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvaderConfig {
    /// Roster key of the invading species.
    pub species: String,
    /// Fraction of the run after which the invader enters (0.0–1.0).
    pub entry_fraction: f64,
    /// Population the invader arrives with.
    pub start_population: f64,
    pub voracity: Voracity,
}

impl InvaderConfig {
    /// Invader with the default entry time, population and voracity.
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            ..Self::default()
        }
    }

    /// Step index at which the invader enters.
    pub fn entry_step(&self, steps: u32) -> u32 {
        entry_step(self.entry_fraction, steps)
    }
}

/// `floor(entry_fraction × steps)`.
///
/// Negative or NaN fractions saturate to step 0. The result may be
/// `>= steps`, in which case the invader never enters.
pub fn entry_step(entry_fraction: f64, steps: u32) -> u32 {
    (entry_fraction * f64::from(steps)).floor() as u32
}

impl Default for InvaderConfig {
    fn default() -> Self {
        Self {
            species: String::new(),
            entry_fraction: invader::DEFAULT_ENTRY_FRACTION,
            start_population: invader::DEFAULT_START_POPULATION,
            voracity: Voracity::default(),
        }
    }
}

/// Everything a run needs besides the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Roster keys active from step 0, in member order.
    pub selected: Vec<String>,
    /// Number of steps to run.
    pub steps: u32,
    pub invader: Option<InvaderConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            selected: Vec::new(),
            steps: run::DEFAULT_STEPS,
            invader: None,
        }
    }
}

impl SimulationConfig {
    /// The preset's default selection with the default run length, no invader.
    pub fn for_preset(preset: EcosystemPreset) -> Self {
        Self {
            selected: preset
                .default_selection()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_invader(mut self, invader: InvaderConfig) -> Self {
        self.invader = Some(invader);
        self
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("selected species `{0}` is not in the roster")]
    UnknownSpecies(String),
    #[error("invader `{0}` is not in the roster")]
    UnknownInvader(String),
    #[error("run length {0} is outside 1..={max}", max = run::MAX_STEPS)]
    StepsOutOfRange(u32),
    #[error("invader population {0} is outside 0..={max}", max = invader::MAX_START_POPULATION)]
    InvaderPopulationOutOfRange(f64),
    #[error("invader entry fraction {0} is outside 0.0..=1.0")]
    InvalidEntryFraction(f64),
}

/// Validate a configuration against a roster, returning all errors found.
pub fn validate_config(roster: &Roster, config: &SimulationConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    for key in &config.selected {
        if roster.get(key).is_none() {
            errors.push(ConfigError::UnknownSpecies(key.clone()));
        }
    }

    if !(1..=run::MAX_STEPS).contains(&config.steps) {
        errors.push(ConfigError::StepsOutOfRange(config.steps));
    }

    if let Some(inv) = &config.invader {
        if roster.get(&inv.species).is_none() {
            errors.push(ConfigError::UnknownInvader(inv.species.clone()));
        }
        if !(0.0..=invader::MAX_START_POPULATION).contains(&inv.start_population) {
            errors.push(ConfigError::InvaderPopulationOutOfRange(inv.start_population));
        }
        if !(0.0..=1.0).contains(&inv.entry_fraction) {
            errors.push(ConfigError::InvalidEntryFraction(inv.entry_fraction));
        }
    }

    errors
}
