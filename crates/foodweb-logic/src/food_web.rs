//! Static food-web analysis derived from a roster.
//!
//! Nothing here looks at simulation state; the prey graph is fixed by the
//! roster. Prey keys that are not in the roster are ignored throughout.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::roster::Roster;

/// A predator and the display names of what it eats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodWebEdge {
    pub predator: String,
    pub prey: Vec<String>,
}

/// Predator → prey names, in roster order. Producers get an empty list.
pub fn edges(roster: &Roster) -> Vec<FoodWebEdge> {
    roster
        .species
        .iter()
        .map(|spec| FoodWebEdge {
            predator: spec.name.clone(),
            prey: spec
                .prey_keys()
                .iter()
                .filter_map(|key| roster.get(key))
                .map(|prey| prey.name.clone())
                .collect(),
        })
        .collect()
}

/// Trophic level of every species, keyed by roster key.
///
/// Producers (and consumers with an empty prey list) sit at level 0; every
/// other species is one above its highest prey. A prey cycle contributes
/// level 0 at the point where it closes.
pub fn trophic_levels(roster: &Roster) -> HashMap<String, u32> {
    let mut memo = HashMap::new();
    for spec in &roster.species {
        let mut visiting = HashSet::new();
        level_of(roster, &spec.key, &mut memo, &mut visiting);
    }
    memo
}

fn level_of(
    roster: &Roster,
    key: &str,
    memo: &mut HashMap<String, u32>,
    visiting: &mut HashSet<String>,
) -> u32 {
    if let Some(&level) = memo.get(key) {
        return level;
    }
    let Some(spec) = roster.get(key) else {
        return 0;
    };
    if spec.prey_keys().is_empty() {
        memo.insert(key.to_string(), 0);
        return 0;
    }
    if !visiting.insert(key.to_string()) {
        // cycle
        return 0;
    }

    let mut max_prey = 0;
    for prey in spec.prey_keys() {
        if roster.get(prey).is_some() {
            max_prey = max_prey.max(level_of(roster, prey, memo, visiting));
        }
    }
    visiting.remove(key);

    let level = max_prey + 1;
    memo.insert(key.to_string(), level);
    level
}

/// Display names grouped by trophic level, producers first. Within a level,
/// species keep roster order.
pub fn pyramid(roster: &Roster) -> Vec<Vec<String>> {
    let levels = trophic_levels(roster);
    let top = levels.values().copied().max().unwrap_or(0) as usize;
    let mut tiers = vec![Vec::new(); if roster.is_empty() { 0 } else { top + 1 }];
    for spec in &roster.species {
        let level = levels.get(&spec.key).copied().unwrap_or(0) as usize;
        tiers[level].push(spec.name.clone());
    }
    tiers
}

/// One sentence per species describing its place in the web.
pub fn describe(roster: &Roster) -> Vec<String> {
    edges(roster)
        .into_iter()
        .zip(&roster.species)
        .map(|(edge, spec)| {
            if spec.prey_keys().is_empty() {
                format!("{} are at the bottom of the food chain.", edge.predator)
            } else if edge.prey.is_empty() {
                format!("{} have nothing to eat in this ecosystem.", edge.predator)
            } else {
                format!("{} eat {}", edge.predator, join_names(&edge.prey))
            }
        })
        .collect()
}

/// `A`, `A and B`, `A, B, and C`.
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// Graphviz source for the web. Edges point from prey to predator, bottom
/// to top, so energy flows upward.
pub fn to_dot(roster: &Roster) -> String {
    let mut out = String::from("digraph {\n    rankdir=\"BT\"\n");
    for spec in &roster.species {
        let _ = writeln!(out, "    \"{}\"", escape(&spec.name));
    }
    for edge in edges(roster) {
        for prey in &edge.prey {
            let _ = writeln!(
                out,
                "    \"{}\" -> \"{}\"",
                escape(prey),
                escape(&edge.predator)
            );
        }
    }
    out.push_str("}\n");
    out
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}
