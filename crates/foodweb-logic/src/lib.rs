//! Pure simulation logic for FoodWeb.
//!
//! This crate contains the population model of a simplified food web and
//! nothing else: no file access, no rendering, no UI state. Functions take
//! plain data and return results, making them unit-testable and usable from
//! the headless harness or any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Model coefficients (growth, appetite, starvation, mortality) |
//! | [`organism`] | Per-organism state and grow / feed / die transitions |
//! | [`ecosystem`] | Ordered active set, invader scheduling, the step loop |
//! | [`roster`] | Species catalog and the two preset ecosystems |
//! | [`config`] | Run configuration, invader voracity, validation |
//! | [`food_web`] | Static prey graph: trophic levels, descriptions, DOT |
//! | [`report`] | Final populations and time series for display |
//!
//! ```
//! use foodweb_logic::config::SimulationConfig;
//! use foodweb_logic::ecosystem::Ecosystem;
//! use foodweb_logic::roster::EcosystemPreset;
//!
//! let roster = EcosystemPreset::Ocean.roster();
//! let config = SimulationConfig::for_preset(EcosystemPreset::Ocean);
//! let mut eco = Ecosystem::new(&roster, &config);
//! eco.simulate(config.steps);
//! assert_eq!(eco.members().len(), 3);
//! ```

pub mod config;
pub mod constants;
pub mod ecosystem;
pub mod food_web;
pub mod organism;
pub mod report;
pub mod roster;
