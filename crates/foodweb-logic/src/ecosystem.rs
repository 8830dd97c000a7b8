//! Ecosystem orchestration: the active member list and the step loop.
//!
//! Organism records live in an arena (`Vec<Organism>`) addressed by
//! [`OrganismId`]. The ecosystem keeps a separate, ordered list of active
//! members; only members are stepped and only members can be eaten.
//!
//! Each step visits members in insertion order and runs `grow → eat → die`
//! on one organism before moving to the next, so a predator later in the
//! list sees prey already depleted (and already decayed) by earlier members
//! within the same step. Member order is therefore part of the model.

use log::{debug, info, trace};

use crate::config::{entry_step, InvaderConfig, SimulationConfig};
use crate::constants::feeding;
use crate::organism::{is_starving, transfer_amount, Diet, Organism, OrganismId};
use crate::roster::Roster;

/// An organism waiting to be injected partway through the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvaderSchedule {
    pub id: OrganismId,
    pub entry_fraction: f64,
    pub start_population: f64,
}

impl InvaderSchedule {
    pub fn entry_step(&self, steps: u32) -> u32 {
        entry_step(self.entry_fraction, steps)
    }
}

/// The organisms of one run and the order they act in.
#[derive(Debug, Clone, Default)]
pub struct Ecosystem {
    title: String,
    organisms: Vec<Organism>,
    members: Vec<OrganismId>,
    invader: Option<InvaderSchedule>,
}

impl Ecosystem {
    /// Build a run from a roster and configuration.
    ///
    /// Every roster species gets an arena slot; the selected species become
    /// members in selection order. The invader is skipped here even if it
    /// was also selected, and its voracity replaces its volume. Unknown keys
    /// and duplicate selections are ignored.
    pub fn new(roster: &Roster, config: &SimulationConfig) -> Self {
        let mut eco = Self {
            title: roster.title.clone(),
            ..Self::default()
        };

        for spec in &roster.species {
            let organism = match &spec.prey {
                None => Organism::producer(&spec.key, &spec.name, spec.population),
                Some(keys) => {
                    let prey = keys
                        .iter()
                        .filter_map(|key| {
                            let idx = roster.index_of(key);
                            if idx.is_none() {
                                debug!("{}: prey `{}` not in roster, ignored", spec.key, key);
                            }
                            idx.map(OrganismId)
                        })
                        .collect();
                    Organism::consumer(
                        &spec.key,
                        &spec.name,
                        prey,
                        spec.volume.unwrap_or(0.0),
                        spec.population,
                    )
                }
            };
            eco.organisms.push(organism);
        }

        if let Some(inv) = &config.invader {
            eco.configure_invader(inv);
        }

        let invader_id = eco.invader.map(|inv| inv.id);
        for key in &config.selected {
            match eco.find(key) {
                Some(id) if Some(id) == invader_id => {
                    debug!("{key}: selected species is the invader, held back");
                }
                Some(id) => {
                    eco.activate(id);
                }
                None => debug!("{key}: selected species not in roster, ignored"),
            }
        }

        eco
    }

    fn configure_invader(&mut self, inv: &InvaderConfig) {
        let Some(id) = self.find(&inv.species) else {
            debug!("invader `{}` not in roster, ignored", inv.species);
            return;
        };
        if !self.organisms[id.0].set_volume(inv.voracity.volume()) {
            debug!("invader `{}` is a producer, voracity ignored", inv.species);
        }
        self.invader = Some(InvaderSchedule {
            id,
            entry_fraction: inv.entry_fraction,
            start_population: inv.start_population,
        });
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Add a record to the arena without activating it.
    pub fn insert(&mut self, organism: Organism) -> OrganismId {
        self.organisms.push(organism);
        OrganismId(self.organisms.len() - 1)
    }

    /// Append an arena record to the member list. Returns `false` if it was
    /// already a member.
    pub fn activate(&mut self, id: OrganismId) -> bool {
        if self.is_member(id) {
            return false;
        }
        self.members.push(id);
        true
    }

    pub fn invader(&self) -> Option<InvaderSchedule> {
        self.invader
    }

    /// Arena id of a roster key.
    pub fn find(&self, key: &str) -> Option<OrganismId> {
        self.organisms
            .iter()
            .position(|o| o.key == key)
            .map(OrganismId)
    }

    /// Record behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` was not issued by this ecosystem. Use [`Ecosystem::get`] for
    /// ids of unknown origin.
    pub fn organism(&self, id: OrganismId) -> &Organism {
        &self.organisms[id.0]
    }

    pub fn get(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(id.0)
    }

    /// Active members in stepping order.
    pub fn members(&self) -> &[OrganismId] {
        &self.members
    }

    pub fn is_member(&self, id: OrganismId) -> bool {
        self.members.contains(&id)
    }

    /// Member organisms in stepping order.
    pub fn active(&self) -> impl Iterator<Item = &Organism> {
        self.members.iter().map(|id| &self.organisms[id.0])
    }

    /// `(name, population)` of each member, in member order.
    pub fn final_populations(&self) -> Vec<(&str, f64)> {
        self.active()
            .map(|o| (o.name.as_str(), o.population))
            .collect()
    }

    /// Run `steps` iterations, injecting the invader at its entry step.
    ///
    /// Meant to be called once per ecosystem; step indices restart at 0 on
    /// every call.
    pub fn simulate(&mut self, steps: u32) {
        info!(
            "{}: simulating {} steps with {} members",
            self.title,
            steps,
            self.members.len()
        );

        let entry = self.invader.map(|inv| (inv, inv.entry_step(steps)));
        for i in 0..steps {
            if let Some((inv, entry_at)) = entry {
                if i == entry_at && self.activate(inv.id) {
                    self.organisms[inv.id.0].population = inv.start_population;
                    debug!(
                        "step {}: invader {} enters with population {}",
                        i, self.organisms[inv.id.0].name, inv.start_population
                    );
                }
            }
            self.step(i);
        }

        info!(
            "{}: finished {} steps, {} members active",
            self.title,
            steps,
            self.members.len()
        );
    }

    /// One iteration over the current members: `grow → eat → die(index)`
    /// per organism, in member order.
    pub fn step(&mut self, index: u32) {
        for k in 0..self.members.len() {
            let id = self.members[k];
            self.organisms[id.0].grow();
            self.eat(id);
            self.organisms[id.0].die(index);
        }
        trace!("step {index} done");
    }

    /// Feed one consumer on its active prey.
    ///
    /// The prey total is taken once, up front. Each prey then gives up its
    /// share of the predator's appetite, capped at a fifth of itself; the
    /// appetite grows as the predator gains from earlier prey. A predator
    /// whose prey total falls short of `volume × population` afterwards
    /// loses a fifth of itself on top of what it gained. With no prey
    /// biomass at all nothing happens.
    pub fn eat(&mut self, id: OrganismId) {
        let (prey, volume) = match &self.organisms[id.0].diet {
            Diet::Consumer { prey, volume } if !prey.is_empty() => (prey.clone(), *volume),
            _ => return,
        };

        let active_prey: Vec<OrganismId> =
            prey.into_iter().filter(|&p| self.is_member(p)).collect();
        let sum_prey: f64 = active_prey
            .iter()
            .map(|p| self.organisms[p.0].population)
            .sum();
        if sum_prey == 0.0 {
            return;
        }

        for p in active_prey {
            let amount = transfer_amount(
                self.organisms[p.0].population,
                sum_prey,
                volume,
                self.organisms[id.0].population,
            );
            self.organisms[id.0].population += amount;
            self.organisms[p.0].population -= amount;
        }

        let predator = &mut self.organisms[id.0];
        if is_starving(sum_prey, volume, predator.population) {
            predator.population *= feeding::STARVATION_PENALTY;
        }
    }
}
