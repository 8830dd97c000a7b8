//! Run outputs for display: final populations and chartable time series.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::ecosystem::Ecosystem;
use crate::organism::Sample;
use crate::roster::Roster;

/// Time series of one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSeries {
    pub key: String,
    pub name: String,
    pub invader: bool,
    pub final_population: f64,
    pub history: Vec<Sample>,
}

/// Everything a front end needs to draw a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub title: String,
    pub steps: u32,
    /// Roster key of the configured invader, if one was scheduled.
    pub invader: Option<String>,
    /// Step index at which the invader was due to enter.
    pub invader_entry_step: Option<u32>,
    /// One entry per member, in member order.
    pub series: Vec<SpeciesSeries>,
}

/// Long-format chart row: one point of one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub step: u32,
    pub population: f64,
    pub name: String,
}

impl SimulationReport {
    /// Snapshot a finished ecosystem that ran for `steps` steps.
    pub fn from_ecosystem(eco: &Ecosystem, steps: u32) -> Self {
        let invader = eco.invader();
        let invader_id = invader.map(|inv| inv.id);
        Self {
            title: eco.title().to_string(),
            steps,
            invader: invader.map(|inv| eco.organism(inv.id).key.clone()),
            invader_entry_step: invader.map(|inv| inv.entry_step(steps)),
            series: eco
                .members()
                .iter()
                .map(|&id| {
                    let o = eco.organism(id);
                    SpeciesSeries {
                        key: o.key.clone(),
                        name: o.name.clone(),
                        invader: Some(id) == invader_id,
                        final_population: o.population,
                        history: o.history().to_vec(),
                    }
                })
                .collect(),
        }
    }

    /// `(name, population)` per member, rounded to one decimal place.
    pub fn final_populations(&self) -> Vec<(String, f64)> {
        self.series
            .iter()
            .map(|s| (s.name.clone(), round1(s.final_population)))
            .collect()
    }

    /// All histories flattened into chart rows, member by member.
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        self.series
            .iter()
            .flat_map(|s| {
                s.history.iter().map(move |sample| ChartRow {
                    step: sample.step,
                    population: sample.population,
                    name: s.name.clone(),
                })
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&SpeciesSeries> {
        self.series.iter().find(|s| s.key == key)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Build, run and report in one call.
pub fn run(roster: &Roster, config: &SimulationConfig) -> SimulationReport {
    let mut eco = Ecosystem::new(roster, config);
    eco.simulate(config.steps);
    SimulationReport::from_ecosystem(&eco, config.steps)
}
