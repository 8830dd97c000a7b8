//! Species catalog: the species a run may draw from.
//!
//! A [`Roster`] lists every species of one ecosystem with its prey (by
//! roster key), consumption coefficient and starting population. Two preset
//! ecosystems ship with the crate; custom rosters can be deserialized from
//! JSON and checked with [`validate_roster`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::food_web;

/// Catalog entry for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSpec {
    /// Lookup key used by configuration, e.g. `"wedge-tailed eagle"`.
    pub key: String,
    /// Display name, e.g. `"Wedge-tailed Eagles"`.
    pub name: String,
    /// Prey keys in feeding order. `None` marks a primary producer.
    #[serde(default)]
    pub prey: Option<Vec<String>>,
    /// Consumption coefficient. Ignored for producers.
    #[serde(default)]
    pub volume: Option<f64>,
    /// Starting population.
    pub population: f64,
}

impl SpeciesSpec {
    pub fn producer(key: &str, name: &str, population: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            prey: None,
            volume: None,
            population,
        }
    }

    pub fn consumer(key: &str, name: &str, prey: &[&str], volume: f64, population: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            prey: Some(prey.iter().map(|p| p.to_string()).collect()),
            volume: Some(volume),
            population,
        }
    }

    pub fn is_producer(&self) -> bool {
        self.prey.is_none()
    }

    /// Prey keys, empty for producers.
    pub fn prey_keys(&self) -> &[String] {
        self.prey.as_deref().unwrap_or(&[])
    }
}

/// The species catalog of one ecosystem, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub title: String,
    pub species: Vec<SpeciesSpec>,
}

impl Roster {
    pub fn new(title: impl Into<String>, species: Vec<SpeciesSpec>) -> Self {
        Self {
            title: title.into(),
            species,
        }
    }

    /// Look up a species by key.
    pub fn get(&self, key: &str) -> Option<&SpeciesSpec> {
        self.species.iter().find(|s| s.key == key)
    }

    /// Roster position of a species key.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.species.iter().position(|s| s.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.species.iter().map(|s| s.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Copy of this roster with starting populations assigned by trophic
    /// level: producers 80, then 40, 20, 10, and 5 for level 4 and above.
    pub fn with_proportional_populations(&self) -> Roster {
        let levels = food_web::trophic_levels(self);
        let mut roster = self.clone();
        for spec in &mut roster.species {
            let level = levels.get(&spec.key).copied().unwrap_or(0);
            spec.population = match level {
                0 => 80.0,
                1 => 40.0,
                2 => 20.0,
                3 => 10.0,
                _ => 5.0,
            };
        }
        roster
    }
}

/// Problems with a roster definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RosterError {
    #[error("species key `{0}` appears more than once")]
    DuplicateKey(String),
    #[error("consumer `{0}` has no volume")]
    MissingVolume(String),
    #[error("`{species}` preys on `{prey}`, which is not in the roster")]
    UnknownPrey { species: String, prey: String },
    #[error("`{0}` has a negative or non-finite starting population")]
    InvalidPopulation(String),
}

/// Check a roster for definitions the simulation would silently ignore.
pub fn validate_roster(roster: &Roster) -> Vec<RosterError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for spec in &roster.species {
        if !seen.insert(spec.key.as_str()) {
            errors.push(RosterError::DuplicateKey(spec.key.clone()));
        }
        if !spec.is_producer() && spec.volume.is_none() {
            errors.push(RosterError::MissingVolume(spec.key.clone()));
        }
        if !spec.population.is_finite() || spec.population < 0.0 {
            errors.push(RosterError::InvalidPopulation(spec.key.clone()));
        }
        for prey in spec.prey_keys() {
            if roster.get(prey).is_none() {
                errors.push(RosterError::UnknownPrey {
                    species: spec.key.clone(),
                    prey: prey.clone(),
                });
            }
        }
    }

    errors
}

// ============================================================================
// PRESETS
// ============================================================================

/// Built-in ecosystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcosystemPreset {
    Ocean,
    AustralianNative,
}

impl EcosystemPreset {
    pub fn all() -> [EcosystemPreset; 2] {
        [Self::Ocean, Self::AustralianNative]
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Ocean => "Ocean",
            Self::AustralianNative => "Australian Native",
        }
    }

    /// Species active when nothing else is chosen.
    pub fn default_selection(self) -> &'static [&'static str] {
        match self {
            Self::Ocean => &["plankton", "fish", "dolphin"],
            Self::AustralianNative => &["grasses", "kangaroo", "dingo"],
        }
    }

    /// Species offered as the invader by default.
    pub fn default_invader(self) -> &'static str {
        match self {
            Self::Ocean => "octopus",
            Self::AustralianNative => "snake",
        }
    }

    pub fn roster(self) -> Roster {
        match self {
            Self::Ocean => ocean(),
            Self::AustralianNative => australian_native(),
        }
    }
}

impl fmt::Display for EcosystemPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ecosystem `{0}` (expected ocean or native)")]
pub struct ParsePresetError(String);

impl FromStr for EcosystemPreset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ocean" => Ok(Self::Ocean),
            "native" | "australian-native" | "australian native" | "ausnative" => {
                Ok(Self::AustralianNative)
            }
            _ => Err(ParsePresetError(s.to_string())),
        }
    }
}

fn ocean() -> Roster {
    Roster::new(
        "Ocean",
        vec![
            SpeciesSpec::producer("plankton", "Plankton", 100.0),
            SpeciesSpec::producer("seaweed", "Seaweed", 100.0),
            SpeciesSpec::consumer("krill", "Krill", &["plankton"], 3.0, 50.0),
            SpeciesSpec::consumer("shellfish", "Shellfish", &["plankton", "seaweed"], 3.0, 50.0),
            SpeciesSpec::consumer("fish", "Fish", &["jellyfish", "plankton", "krill"], 3.0, 50.0),
            SpeciesSpec::consumer("octopus", "Octopus", &["fish", "shellfish"], 3.0, 50.0),
            SpeciesSpec::consumer("jellyfish", "Jellyfish", &["krill", "plankton"], 3.0, 50.0),
            SpeciesSpec::consumer(
                "turtle",
                "Turtles",
                &["jellyfish", "shellfish", "seaweed"],
                3.0,
                50.0,
            ),
            SpeciesSpec::consumer("dolphin", "Dolphins", &["fish", "octopus"], 3.0, 10.0),
            SpeciesSpec::consumer("shark", "Sharks", &["turtle", "fish"], 3.0, 10.0),
        ],
    )
}

fn australian_native() -> Roster {
    Roster::new(
        "Australian Native",
        vec![
            SpeciesSpec::producer("acacia", "Acacia", 100.0),
            SpeciesSpec::producer("grasses", "Grasses", 100.0),
            SpeciesSpec::consumer("insects", "Insects", &["acacia"], 4.0, 50.0),
            SpeciesSpec::consumer("bilby", "Bilbies", &["grasses", "insects"], 3.0, 50.0),
            SpeciesSpec::consumer("kangaroo", "Kangaroos", &["grasses"], 4.0, 50.0),
            SpeciesSpec::consumer("snake", "Snakes", &["insects", "bilby"], 2.0, 50.0),
            SpeciesSpec::consumer(
                "wedge-tailed eagle",
                "Wedge-tailed Eagles",
                &["snake", "kangaroo"],
                2.0,
                10.0,
            ),
            SpeciesSpec::consumer("dingo", "Dingoes", &["bilby", "kangaroo"], 3.0, 10.0),
            SpeciesSpec::consumer("cane toads", "Cane Toads", &["insects"], 3.0, 10.0),
            SpeciesSpec::consumer("feral cats", "Feral Cats", &["bilby", "snake"], 3.0, 10.0),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_ten_species() {
        for preset in EcosystemPreset::all() {
            assert_eq!(preset.roster().len(), 10, "{preset}");
        }
    }

    #[test]
    fn presets_are_valid() {
        for preset in EcosystemPreset::all() {
            let errors = validate_roster(&preset.roster());
            assert!(errors.is_empty(), "{preset}: {errors:?}");
        }
    }

    #[test]
    fn default_selection_and_invader_exist() {
        for preset in EcosystemPreset::all() {
            let roster = preset.roster();
            for key in preset.default_selection() {
                assert!(roster.get(key).is_some(), "{preset} missing {key}");
            }
            assert!(roster.get(preset.default_invader()).is_some());
        }
    }

    #[test]
    fn producers_have_no_volume() {
        let roster = EcosystemPreset::Ocean.roster();
        let plankton = roster.get("plankton").unwrap();
        assert!(plankton.is_producer());
        assert_eq!(plankton.volume, None);
        assert!(plankton.prey_keys().is_empty());

        let fish = roster.get("fish").unwrap();
        assert!(!fish.is_producer());
        assert_eq!(fish.prey_keys(), ["jellyfish", "plankton", "krill"]);
    }

    #[test]
    fn parse_presets() {
        assert_eq!("Ocean".parse(), Ok(EcosystemPreset::Ocean));
        assert_eq!("native".parse(), Ok(EcosystemPreset::AustralianNative));
        assert_eq!(
            "Australian Native".parse(),
            Ok(EcosystemPreset::AustralianNative)
        );
        assert!("tundra".parse::<EcosystemPreset>().is_err());
    }

    #[test]
    fn index_of_follows_catalog_order() {
        let roster = EcosystemPreset::AustralianNative.roster();
        assert_eq!(roster.index_of("acacia"), Some(0));
        assert_eq!(roster.index_of("feral cats"), Some(9));
        assert_eq!(roster.index_of("emu"), None);
    }

    #[test]
    fn validate_catches_bad_definitions() {
        let roster = Roster::new(
            "Broken",
            vec![
                SpeciesSpec::producer("algae", "Algae", 100.0),
                SpeciesSpec::producer("algae", "Algae Again", 100.0),
                SpeciesSpec {
                    key: "snail".into(),
                    name: "Snails".into(),
                    prey: Some(vec!["algae".into(), "moss".into()]),
                    volume: None,
                    population: -1.0,
                },
            ],
        );
        let errors = validate_roster(&roster);
        assert!(errors.contains(&RosterError::DuplicateKey("algae".into())));
        assert!(errors.contains(&RosterError::MissingVolume("snail".into())));
        assert!(errors.contains(&RosterError::InvalidPopulation("snail".into())));
        assert!(errors.contains(&RosterError::UnknownPrey {
            species: "snail".into(),
            prey: "moss".into(),
        }));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn proportional_populations_by_level() {
        let roster = EcosystemPreset::Ocean.roster().with_proportional_populations();
        assert_eq!(roster.get("plankton").unwrap().population, 80.0);
        assert_eq!(roster.get("krill").unwrap().population, 40.0);
        // jellyfish eat krill (level 1) → level 2
        assert_eq!(roster.get("jellyfish").unwrap().population, 20.0);
        // fish eat jellyfish (level 2) → level 3
        assert_eq!(roster.get("fish").unwrap().population, 10.0);
        // octopus eat fish (level 3) → level 4, dolphins level 5
        assert_eq!(roster.get("octopus").unwrap().population, 5.0);
        assert_eq!(roster.get("dolphin").unwrap().population, 5.0);
    }

    #[test]
    fn roster_json_roundtrip_shape() {
        let json = r#"{
            "title": "Pond",
            "species": [
                {"key": "algae", "name": "Algae", "population": 100},
                {"key": "snail", "name": "Snails", "prey": ["algae"], "volume": 2, "population": 30}
            ]
        }"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.title, "Pond");
        assert!(roster.get("algae").unwrap().is_producer());
        assert_eq!(roster.get("snail").unwrap().volume, Some(2.0));
        assert!(validate_roster(&roster).is_empty());
    }
}
