//! Organism state and per-step transitions.
//!
//! An [`Organism`] is one species' population inside a run. Producers grow
//! toward a soft cap, consumers feed on their prey, and everything dies back
//! a little at the end of each step. The arithmetic lives in pure functions
//! so it can be checked in isolation; [`crate::ecosystem::Ecosystem`] drives
//! them in member order.

use serde::{Deserialize, Serialize};

use crate::constants::{feeding, growth, mortality};

/// Stable index of an organism record inside an ecosystem arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganismId(pub usize);

/// What an organism lives on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diet {
    /// Primary producer. Grows on its own, never feeds.
    Producer,
    /// Feeds on `prey` (in order) with consumption coefficient `volume`.
    Consumer { prey: Vec<OrganismId>, volume: f64 },
}

/// One point of a population time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// 1-based index of the completed step.
    pub step: u32,
    pub population: f64,
}

/// A species taking part in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    /// Roster key, e.g. `"plankton"`.
    pub key: String,
    /// Display name, e.g. `"Plankton"`.
    pub name: String,
    pub diet: Diet,
    pub population: f64,
    history: Vec<Sample>,
}

impl Organism {
    pub fn producer(key: impl Into<String>, name: impl Into<String>, population: f64) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            diet: Diet::Producer,
            population,
            history: Vec::new(),
        }
    }

    pub fn consumer(
        key: impl Into<String>,
        name: impl Into<String>,
        prey: Vec<OrganismId>,
        volume: f64,
        population: f64,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            diet: Diet::Consumer { prey, volume },
            population,
            history: Vec::new(),
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self.diet, Diet::Producer)
    }

    /// Prey in feeding order. Empty for producers.
    pub fn prey(&self) -> &[OrganismId] {
        match &self.diet {
            Diet::Producer => &[],
            Diet::Consumer { prey, .. } => prey,
        }
    }

    /// Consumption coefficient, `None` for producers.
    pub fn volume(&self) -> Option<f64> {
        match self.diet {
            Diet::Producer => None,
            Diet::Consumer { volume, .. } => Some(volume),
        }
    }

    /// Override the consumption coefficient. Producers have none, so this
    /// returns `false` and leaves them unchanged.
    pub fn set_volume(&mut self, new_volume: f64) -> bool {
        match &mut self.diet {
            Diet::Producer => false,
            Diet::Consumer { volume, .. } => {
                *volume = new_volume;
                true
            }
        }
    }

    /// Population samples recorded so far, one per completed active step.
    pub fn history(&self) -> &[Sample] {
        &self.history
    }

    /// Producer growth for this step. Consumers are unaffected.
    pub fn grow(&mut self) {
        if self.is_producer() {
            self.population = grown_population(self.population);
        }
    }

    /// Background mortality, then record the end-of-step sample.
    pub fn die(&mut self, step_index: u32) {
        self.population = survived_population(self.population);
        self.history.push(Sample {
            step: step_index + 1,
            population: self.population,
        });
    }
}

/// Saturating producer growth. No-op at or above the growth threshold.
///
/// `p × (1 + RATE × (CAP − p) / THRESHOLD)`
pub fn grown_population(population: f64) -> f64 {
    if population < growth::THRESHOLD {
        population * (1.0 + growth::RATE * ((growth::CAP - population) / growth::THRESHOLD))
    } else {
        population
    }
}

/// Biomass a predator takes from one prey in a single feeding.
///
/// The prey's share of all available biomass times the predator's appetite,
/// capped at a fifth of that prey. `sum_prey` must be positive.
pub fn transfer_amount(
    prey_population: f64,
    sum_prey: f64,
    volume: f64,
    predator_population: f64,
) -> f64 {
    let share = prey_population / sum_prey;
    let appetite = volume / feeding::APPETITE_DIVISOR * predator_population;
    (share * appetite).min(prey_population / feeding::PREY_LOSS_CAP_DIVISOR)
}

/// Whether the available prey biomass falls short of what the predator needs.
pub fn is_starving(sum_prey: f64, volume: f64, predator_population: f64) -> bool {
    sum_prey < volume * predator_population
}

/// Population left after one step of background mortality, clamped at zero.
pub fn survived_population(population: f64) -> f64 {
    (population * mortality::NATURAL_DEATH_MULTIPLIER).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn producer_grows_below_threshold() {
        let mut p = Organism::producer("plankton", "Plankton", 50.0);
        p.grow();
        // 50 × (1 + 0.5 × 60 / 100) = 65
        assert_relative_eq!(p.population, 65.0, epsilon = 1e-9);
    }

    #[test]
    fn producer_stops_growing_at_threshold() {
        let mut p = Organism::producer("plankton", "Plankton", 100.0);
        p.grow();
        assert_eq!(p.population, 100.0);
        p.population = 105.0;
        p.grow();
        assert_eq!(p.population, 105.0);
    }

    #[test]
    fn consumer_does_not_grow() {
        let mut c = Organism::consumer("krill", "Krill", vec![OrganismId(0)], 3.0, 50.0);
        c.grow();
        assert_eq!(c.population, 50.0);
    }

    #[test]
    fn zero_population_stays_zero() {
        assert_eq!(grown_population(0.0), 0.0);
        assert_eq!(survived_population(0.0), 0.0);
    }

    #[test]
    fn die_decays_and_records() {
        let mut p = Organism::producer("plankton", "Plankton", 100.0);
        p.die(0);
        p.die(1);
        assert_relative_eq!(p.population, 90.25, epsilon = 1e-9);
        assert_eq!(p.history().len(), 2);
        assert_eq!(p.history()[0].step, 1);
        assert_eq!(p.history()[1].step, 2);
        assert_relative_eq!(p.history()[0].population, 95.0, epsilon = 1e-9);
    }

    #[test]
    fn die_clamps_negative_to_zero() {
        let mut p = Organism::producer("plankton", "Plankton", -3.0);
        p.die(4);
        assert_eq!(p.population, 0.0);
        assert_eq!(p.history()[0].step, 5);
    }

    #[test]
    fn transfer_uses_share_of_appetite() {
        // Two prey of 60 and 40, predator 50 with volume 3 → appetite 15.
        let a = transfer_amount(60.0, 100.0, 3.0, 50.0);
        let b = transfer_amount(40.0, 100.0, 3.0, 50.0);
        assert_relative_eq!(a, 9.0, epsilon = 1e-9);
        assert_relative_eq!(b, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn transfer_capped_at_fifth_of_prey() {
        // Appetite 10/10 × 100 = 100, but the prey only gives up 20.
        let t = transfer_amount(100.0, 100.0, 10.0, 100.0);
        assert_relative_eq!(t, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn starvation_threshold() {
        assert!(is_starving(100.0, 3.0, 50.0));
        assert!(!is_starving(150.0, 3.0, 50.0));
        assert!(!is_starving(200.0, 3.0, 50.0));
    }

    #[test]
    fn set_volume_only_on_consumers() {
        let mut p = Organism::producer("seaweed", "Seaweed", 100.0);
        assert!(!p.set_volume(10.0));
        assert_eq!(p.volume(), None);

        let mut c = Organism::consumer("fish", "Fish", vec![], 3.0, 50.0);
        assert!(c.set_volume(10.0));
        assert_eq!(c.volume(), Some(10.0));
    }

    #[test]
    fn prey_accessor() {
        let p = Organism::producer("seaweed", "Seaweed", 100.0);
        assert!(p.prey().is_empty());
        let c = Organism::consumer("fish", "Fish", vec![OrganismId(2), OrganismId(0)], 3.0, 50.0);
        assert_eq!(c.prey(), &[OrganismId(2), OrganismId(0)]);
    }
}
