//! Property tests for the per-organism transitions and the step loop.

use foodweb_logic::config::{InvaderConfig, SimulationConfig, Voracity};
use foodweb_logic::ecosystem::Ecosystem;
use foodweb_logic::organism::{
    grown_population, is_starving, survived_population, Organism, OrganismId,
};
use foodweb_logic::roster::EcosystemPreset;
use proptest::prelude::*;

fn voracity() -> impl Strategy<Value = Voracity> {
    prop::sample::select(Voracity::all().to_vec())
}

/// Producers followed by one consumer feeding on all of them.
fn feeding_setup(prey_pops: &[f64], volume: f64, predator: f64) -> (Ecosystem, Vec<OrganismId>, OrganismId) {
    let mut eco = Ecosystem::default();
    let prey: Vec<OrganismId> = prey_pops
        .iter()
        .enumerate()
        .map(|(i, &pop)| eco.insert(Organism::producer(format!("p{i}"), format!("P{i}"), pop)))
        .collect();
    let c = eco.insert(Organism::consumer("c", "C", prey.clone(), volume, predator));
    for &id in &prey {
        eco.activate(id);
    }
    eco.activate(c);
    (eco, prey, c)
}

proptest! {
    #[test]
    fn growth_increases_below_threshold(pop in 0.001f64..100.0) {
        prop_assert!(grown_population(pop) > pop);
    }

    #[test]
    fn growth_noop_at_or_above_threshold(pop in 100.0f64..10_000.0) {
        prop_assert_eq!(grown_population(pop), pop);
    }

    #[test]
    fn lone_producer_follows_grow_then_die(start in 0.0f64..200.0, steps in 1u32..100) {
        let mut eco = Ecosystem::default();
        let p = eco.insert(Organism::producer("p", "P", start));
        eco.activate(p);
        eco.simulate(steps);

        let history = eco.organism(p).history();
        prop_assert_eq!(history.len() as u32, steps);
        let mut expected = start;
        for (i, sample) in history.iter().enumerate() {
            expected = survived_population(grown_population(expected));
            prop_assert_eq!(sample.step, i as u32 + 1);
            prop_assert_eq!(sample.population, expected);
        }
    }

    #[test]
    fn die_never_negative_and_records_once(pop in -50.0f64..500.0, step in 0u32..1000) {
        let mut o = Organism::producer("x", "X", pop);
        o.die(step);
        prop_assert!(o.population >= 0.0);
        prop_assert_eq!(o.history().len(), 1);
        prop_assert_eq!(o.history()[0].step, step + 1);
        prop_assert_eq!(o.history()[0].population, o.population);
    }

    #[test]
    fn each_prey_loses_at_most_a_fifth(
        prey_pops in prop::collection::vec(0.0f64..500.0, 1..5),
        volume in 0.1f64..20.0,
        predator in 0.0f64..300.0,
    ) {
        let (mut eco, prey, c) = feeding_setup(&prey_pops, volume, predator);
        eco.eat(c);
        for (id, before) in prey.iter().zip(&prey_pops) {
            let lost = before - eco.organism(*id).population;
            prop_assert!(lost >= 0.0);
            prop_assert!(lost <= before / 5.0 + 1e-9);
        }
    }

    #[test]
    fn no_prey_biomass_no_change(count in 1usize..5, volume in 0.1f64..20.0, predator in 0.0f64..300.0) {
        let (mut eco, prey, c) = feeding_setup(&vec![0.0; count], volume, predator);
        eco.eat(c);
        prop_assert_eq!(eco.organism(c).population, predator);
        for id in prey {
            prop_assert_eq!(eco.organism(id).population, 0.0);
        }
    }

    #[test]
    fn predator_gains_what_prey_lose(
        prey_pops in prop::collection::vec(1.0f64..500.0, 1..5),
        volume in 0.1f64..20.0,
        predator in 1.0f64..300.0,
    ) {
        let (mut eco, prey, c) = feeding_setup(&prey_pops, volume, predator);
        let sum: f64 = prey_pops.iter().sum();
        eco.eat(c);
        let remaining: f64 = prey.iter().map(|id| eco.organism(*id).population).sum();
        let fed = predator + (sum - remaining);
        let expected = if is_starving(sum, volume, fed) {
            fed * 0.8
        } else {
            fed
        };
        prop_assert!((eco.organism(c).population - expected).abs() < 1e-6);
    }

    #[test]
    fn invader_enters_exactly_once(
        steps in 1u32..200,
        fraction in 0.0f64..=1.0,
        start in 0.0f64..=100.0,
        v in voracity(),
    ) {
        let preset = EcosystemPreset::Ocean;
        let roster = preset.roster();
        let config = SimulationConfig::for_preset(preset)
            .with_steps(steps)
            .with_invader(InvaderConfig {
                entry_fraction: fraction,
                start_population: start,
                voracity: v,
                ..InvaderConfig::new("shark")
            });
        let mut eco = Ecosystem::new(&roster, &config);
        eco.simulate(steps);

        let shark = eco.find("shark").unwrap();
        let entry = (fraction * f64::from(steps)).floor() as u32;
        let occurrences = eco.members().iter().filter(|&&id| id == shark).count();
        if entry < steps {
            prop_assert_eq!(occurrences, 1);
            prop_assert_eq!(eco.organism(shark).history().len() as u32, steps - entry);
        } else {
            prop_assert_eq!(occurrences, 0);
            prop_assert!(eco.organism(shark).history().is_empty());
        }
        for id in eco.members() {
            prop_assert!(eco.organism(*id).population >= 0.0);
        }
    }

    #[test]
    fn runs_are_deterministic(steps in 1u32..150, v in voracity()) {
        let preset = EcosystemPreset::AustralianNative;
        let roster = preset.roster();
        let config = SimulationConfig {
            selected: roster.keys().map(str::to_string).collect(),
            steps,
            invader: Some(InvaderConfig { voracity: v, ..InvaderConfig::new("cane toads") }),
        };
        let mut a = Ecosystem::new(&roster, &config);
        let mut b = Ecosystem::new(&roster, &config);
        a.simulate(steps);
        b.simulate(steps);
        for (x, y) in a.active().zip(b.active()) {
            prop_assert_eq!(x.history(), y.history());
        }
    }
}
