//! FoodWeb Headless Simulation Harness
//!
//! Validates the population model and runs configured ecosystems.
//! Runs entirely in-process with no UI.
//!
//! Usage:
//!   cargo run -p foodweb-simtest
//!   cargo run -p foodweb-simtest -- check --verbose
//!   cargo run -p foodweb-simtest -- run --ecosystem native --invader snake --voracity high
//!   cargo run -p foodweb-simtest -- web --roster data/reef_roster.json --dot

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use foodweb_logic::config::{validate_config, InvaderConfig, SimulationConfig, Voracity};
use foodweb_logic::constants::{invader, run as run_limits};
use foodweb_logic::ecosystem::Ecosystem;
use foodweb_logic::food_web;
use foodweb_logic::organism::{grown_population, Organism};
use foodweb_logic::report::{self, SimulationReport};
use foodweb_logic::roster::{validate_roster, EcosystemPreset, Roster};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ── Sample roster (custom JSON ecosystem) ──────────────────────────────
const REEF_ROSTER_JSON: &str = include_str!("../../../data/reef_roster.json");

#[derive(Parser, Debug)]
#[command(name = "foodweb-simtest")]
#[command(about = "Headless food-web population simulator", long_about = None)]
struct Cli {
    /// Print passing checks and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the built-in model checks (default)
    Check,
    /// Simulate one ecosystem and print final populations
    Run(RunArgs),
    /// Print the static food web of an ecosystem
    Web(WebArgs),
}

#[derive(Args, Debug)]
struct RosterArgs {
    /// Built-in ecosystem: ocean or native
    #[arg(short, long, default_value = "ocean")]
    ecosystem: EcosystemPreset,

    /// Load the roster from a JSON file instead of a built-in ecosystem
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Replace starting populations with trophic-level defaults
    #[arg(long)]
    proportional: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    source: RosterArgs,

    /// Species active from the start (comma separated roster keys)
    #[arg(short, long, value_delimiter = ',')]
    species: Vec<String>,

    /// Number of steps to run
    #[arg(short = 'n', long, default_value_t = run_limits::DEFAULT_STEPS)]
    steps: u32,

    /// Roster key of an invading species
    #[arg(short, long)]
    invader: Option<String>,

    /// Invader population on arrival
    #[arg(long, default_value_t = invader::DEFAULT_START_POPULATION)]
    invader_pop: f64,

    /// Invader appetite: low, medium, high or extreme
    #[arg(long, default_value = "medium")]
    voracity: Voracity,

    /// Fraction of the run after which the invader enters
    #[arg(long, default_value_t = invader::DEFAULT_ENTRY_FRACTION)]
    entry: f64,

    /// Write the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct WebArgs {
    #[command(flatten)]
    source: RosterArgs,

    /// Print Graphviz source instead of descriptions
    #[arg(long)]
    dot: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => {
            if !run_checks(cli.verbose) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Run(args) => run_simulation(args),
        Command::Web(args) => print_web(args),
    }
}

// ── Roster loading ─────────────────────────────────────────────────────

fn load_roster(source: &RosterArgs) -> Result<(Roster, Option<EcosystemPreset>)> {
    let (roster, preset) = match &source.roster {
        Some(path) => (read_roster(path)?, None),
        None => (source.ecosystem.roster(), Some(source.ecosystem)),
    };

    let errors = validate_roster(&roster);
    if !errors.is_empty() {
        bail!("invalid roster `{}`:\n  {}", roster.title, join_errors(&errors));
    }

    let roster = if source.proportional {
        roster.with_proportional_populations()
    } else {
        roster
    };
    debug!("loaded roster `{}` with {} species", roster.title, roster.len());
    Ok((roster, preset))
}

fn read_roster(path: &Path) -> Result<Roster> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse roster {}", path.display()))
}

fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n  ")
}

// ── run ────────────────────────────────────────────────────────────────

fn run_simulation(args: RunArgs) -> Result<()> {
    let (roster, preset) = load_roster(&args.source)?;

    let selected = if !args.species.is_empty() {
        args.species.iter().map(|s| s.trim().to_string()).collect()
    } else if let Some(preset) = preset {
        preset.default_selection().iter().map(|s| s.to_string()).collect()
    } else {
        roster.keys().map(str::to_string).collect()
    };

    let config = SimulationConfig {
        selected,
        steps: args.steps,
        invader: args.invader.map(|species| InvaderConfig {
            species,
            entry_fraction: args.entry,
            start_population: args.invader_pop,
            voracity: args.voracity,
        }),
    };

    let errors = validate_config(&roster, &config);
    if !errors.is_empty() {
        bail!("invalid configuration:\n  {}", join_errors(&errors));
    }

    info!("running `{}` for {} steps", roster.title, config.steps);
    let report = report::run(&roster, &config);
    print_report(&report);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote report to {}", path.display());
    }
    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!("=== {}: {} steps ===\n", report.title, report.steps);
    println!("  {:<28} {:>10}", "Species", "Final");
    for (series, (name, population)) in report.series.iter().zip(report.final_populations()) {
        let marker = if series.invader { " (invader)" } else { "" };
        println!("  {:<28} {:>10.1}{}", name, population, marker);
    }

    if let (Some(key), Some(entry)) = (&report.invader, report.invader_entry_step) {
        if report.get(key).is_some() {
            println!("\n  {} entered at step {}", key, entry);
        } else {
            println!("\n  {} was due at step {} and never entered", key, entry);
        }
    }
}

// ── web ────────────────────────────────────────────────────────────────

fn print_web(args: WebArgs) -> Result<()> {
    let (roster, _) = load_roster(&args.source)?;

    if args.dot {
        print!("{}", food_web::to_dot(&roster));
        return Ok(());
    }

    println!("=== {} food web ===\n", roster.title);
    for line in food_web::describe(&roster) {
        println!("  {line}");
    }
    println!("\n--- Trophic pyramid ---");
    for (level, names) in food_web::pyramid(&roster).iter().enumerate().rev() {
        println!("  {}: {}", level, names.join(", "));
    }
    Ok(())
}

// ── Check harness ──────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn run_checks(verbose: bool) -> bool {
    println!("=== FoodWeb Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Built-in ecosystems
    results.extend(validate_presets(verbose));

    // 2. Custom JSON roster
    results.extend(validate_sample_roster(verbose));

    // 3. Grow / eat / die transitions
    results.extend(validate_transitions(verbose));

    // 4. Invader scheduling
    results.extend(validate_invader(verbose));

    // 5. Long-run stability
    results.extend(validate_stability(verbose));

    // 6. Food-web outputs
    results.extend(validate_food_web(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    failed == 0
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── 1. Presets ─────────────────────────────────────────────────────────

fn validate_presets(_verbose: bool) -> Vec<TestResult> {
    println!("--- Presets ---");
    let mut results = Vec::new();

    for preset in EcosystemPreset::all() {
        let roster = preset.roster();
        let errors = validate_roster(&roster);
        results.push(TestResult {
            name: format!("preset_valid[{preset}]"),
            passed: errors.is_empty(),
            detail: if errors.is_empty() {
                format!("{} species, no definition errors", roster.len())
            } else {
                join_errors(&errors)
            },
        });

        let missing: Vec<&str> = preset
            .default_selection()
            .iter()
            .copied()
            .chain(std::iter::once(preset.default_invader()))
            .filter(|key| roster.get(key).is_none())
            .collect();
        results.push(TestResult {
            name: format!("preset_defaults[{preset}]"),
            passed: missing.is_empty(),
            detail: if missing.is_empty() {
                "default selection and invader are in the roster".into()
            } else {
                format!("missing: {}", missing.join(", "))
            },
        });

        let config = SimulationConfig::for_preset(preset);
        let errors = validate_config(&roster, &config);
        results.push(TestResult {
            name: format!("preset_config[{preset}]"),
            passed: errors.is_empty(),
            detail: format!("{} config errors", errors.len()),
        });

        let levels = food_web::trophic_levels(&roster);
        let layered = roster.species.iter().all(|s| {
            let level = levels.get(&s.key).copied().unwrap_or(0);
            s.is_producer() == (level == 0)
        });
        results.push(TestResult {
            name: format!("preset_levels[{preset}]"),
            passed: layered,
            detail: "producers and only producers sit at level 0".into(),
        });
    }

    results
}

// ── 2. Sample roster ───────────────────────────────────────────────────

fn validate_sample_roster(verbose: bool) -> Vec<TestResult> {
    println!("--- Sample Roster ---");
    let mut results = Vec::new();

    let roster: Roster = match serde_json::from_str(REEF_ROSTER_JSON) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "roster_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "roster_parse".into(),
        passed: !roster.is_empty(),
        detail: format!("`{}` with {} species", roster.title, roster.len()),
    });

    let errors = validate_roster(&roster);
    results.push(TestResult {
        name: "roster_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            "no definition errors".into()
        } else {
            join_errors(&errors)
        },
    });

    let pyramid = food_web::pyramid(&roster);
    if verbose {
        for (level, names) in pyramid.iter().enumerate() {
            println!("  level {}: {}", level, names.join(", "));
        }
    }
    results.push(TestResult {
        name: "roster_pyramid".into(),
        passed: pyramid.len() == 4 && pyramid[0].len() == 2,
        detail: format!("{} trophic levels", pyramid.len()),
    });

    let config = SimulationConfig {
        selected: roster.keys().map(str::to_string).collect(),
        steps: 200,
        invader: None,
    };
    let report = report::run(&roster, &config);
    let finite = report.series.iter().all(|s| {
        s.history
            .iter()
            .all(|p| p.population.is_finite() && p.population >= 0.0)
    });
    results.push(TestResult {
        name: "roster_run".into(),
        passed: finite && report.series.len() == roster.len(),
        detail: format!("{} series over {} steps", report.series.len(), report.steps),
    });

    results
}

// ── 3. Transitions ─────────────────────────────────────────────────────

fn validate_transitions(_verbose: bool) -> Vec<TestResult> {
    println!("--- Transitions ---");
    let mut results = Vec::new();

    let g = grown_population(50.0);
    results.push(TestResult {
        name: "grow_below_threshold".into(),
        passed: close(g, 65.0),
        detail: format!("50 → {:.4} (expected 65)", g),
    });

    let flat = [100.0, 105.0, 250.0]
        .iter()
        .all(|&p| grown_population(p) == p);
    results.push(TestResult {
        name: "grow_noop_at_threshold".into(),
        passed: flat,
        detail: "no growth at or above 100".into(),
    });

    let mut eco = Ecosystem::default();
    let p = eco.insert(Organism::producer("plankton", "Plankton", 100.0));
    eco.activate(p);
    eco.simulate(3);
    let h: Vec<f64> = eco.organism(p).history().iter().map(|s| s.population).collect();
    results.push(TestResult {
        name: "producer_regrowth".into(),
        passed: h.len() == 3
            && close(h[0], 95.0)
            && close(h[1], 97.01875)
            && close(h[2], 98.15007958007811),
        detail: format!("{:?}", h),
    });

    let mut eco = Ecosystem::default();
    let p = eco.insert(Organism::producer("plankton", "Plankton", 100.0));
    let c = eco.insert(Organism::consumer("krill", "Krill", vec![p], 3.0, 50.0));
    eco.activate(p);
    eco.activate(c);
    eco.eat(c);
    let (cp, pp) = (eco.organism(c).population, eco.organism(p).population);
    results.push(TestResult {
        name: "eat_with_starvation".into(),
        passed: close(cp, 52.0) && close(pp, 85.0),
        detail: format!("consumer {:.3}, producer {:.3} (expected 52, 85)", cp, pp),
    });

    let mut eco = Ecosystem::default();
    let p = eco.insert(Organism::producer("plankton", "Plankton", 0.0));
    let c = eco.insert(Organism::consumer("krill", "Krill", vec![p], 3.0, 50.0));
    eco.activate(p);
    eco.activate(c);
    eco.eat(c);
    results.push(TestResult {
        name: "eat_without_prey_biomass".into(),
        passed: eco.organism(c).population == 50.0,
        detail: "no transfer and no starvation when prey total is zero".into(),
    });

    results
}

// ── 4. Invader ─────────────────────────────────────────────────────────

fn invaded_ocean(steps: u32, voracity: Voracity, entry_fraction: f64) -> SimulationReport {
    let config = SimulationConfig::for_preset(EcosystemPreset::Ocean)
        .with_steps(steps)
        .with_invader(InvaderConfig {
            voracity,
            entry_fraction,
            ..InvaderConfig::new("octopus")
        });
    report::run(&EcosystemPreset::Ocean.roster(), &config)
}

fn validate_invader(verbose: bool) -> Vec<TestResult> {
    println!("--- Invader ---");
    let mut results = Vec::new();

    let mut bad = Vec::new();
    for steps in [1u32, 2, 9, 50, 101] {
        let report = invaded_ocean(steps, Voracity::Medium, 0.5);
        let expected = steps - steps / 2;
        let got = report.get("octopus").map_or(0, |s| s.history.len() as u32);
        if verbose {
            println!("  steps={:<4} invader samples={}", steps, got);
        }
        if got != expected {
            bad.push(format!("steps={steps}: {got} samples, expected {expected}"));
        }
    }
    results.push(TestResult {
        name: "invader_entry_step".into(),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            "invader history starts at floor(0.5 × steps)".into()
        } else {
            bad.join("; ")
        },
    });

    let late = invaded_ocean(20, Voracity::Medium, 1.0);
    results.push(TestResult {
        name: "invader_full_fraction".into(),
        passed: late.get("octopus").is_none() && late.series.len() == 3,
        detail: "entry at the last step boundary never happens".into(),
    });

    let fish: Vec<f64> = Voracity::all()
        .iter()
        .map(|&v| {
            invaded_ocean(40, v, 0.5)
                .get("fish")
                .map_or(f64::NAN, |s| s.final_population)
        })
        .collect();
    let ordered = fish.windows(2).all(|w| w[0] > w[1]);
    results.push(TestResult {
        name: "invader_voracity_order".into(),
        passed: ordered,
        detail: format!("final fish by voracity: {:.2?}", fish),
    });

    results
}

// ── 5. Stability ───────────────────────────────────────────────────────

fn validate_stability(_verbose: bool) -> Vec<TestResult> {
    println!("--- Stability ---");
    let mut results = Vec::new();

    for preset in EcosystemPreset::all() {
        let roster = preset.roster();
        let config = SimulationConfig {
            selected: roster.keys().map(str::to_string).collect(),
            steps: run_limits::MAX_STEPS,
            invader: None,
        };
        let report = report::run(&roster, &config);
        let (min, max) = report
            .series
            .iter()
            .flat_map(|s| s.history.iter().map(|p| p.population))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            });
        results.push(TestResult {
            name: format!("stability[{preset}]"),
            passed: min >= 0.0 && max.is_finite(),
            detail: format!(
                "{} species × {} steps, populations in {:.3}..={:.3}",
                report.series.len(),
                report.steps,
                min,
                max
            ),
        });
    }

    results
}

// ── 6. Food web ────────────────────────────────────────────────────────

fn validate_food_web(_verbose: bool) -> Vec<TestResult> {
    println!("--- Food Web ---");
    let mut results = Vec::new();

    let ocean = EcosystemPreset::Ocean.roster();
    let levels = food_web::trophic_levels(&ocean);
    let dolphin = levels.get("dolphin").copied();
    results.push(TestResult {
        name: "web_ocean_top".into(),
        passed: dolphin == Some(5),
        detail: format!("dolphin at level {:?}", dolphin),
    });

    for preset in EcosystemPreset::all() {
        let roster = preset.roster();
        let lines = food_web::describe(&roster);
        let arrows = food_web::to_dot(&roster).matches("->").count();
        let links: usize = roster.species.iter().map(|s| s.prey_keys().len()).sum();
        results.push(TestResult {
            name: format!("web_outputs[{preset}]"),
            passed: lines.len() == roster.len() && arrows == links,
            detail: format!("{} descriptions, {} edges", lines.len(), arrows),
        });
    }

    results
}
