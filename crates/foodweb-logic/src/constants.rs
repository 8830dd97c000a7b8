//! Model coefficients for growth, feeding and mortality.
//!
//! Plain `f64` constants with no runtime dependency. Every transition in
//! [`crate::organism`] reads its numbers from here.

pub mod growth {
    /// Producers stop growing once their population reaches this value.
    pub const THRESHOLD: f64 = 100.0;
    /// Saturation point of the growth curve.
    pub const CAP: f64 = 110.0;
    /// Fraction of the remaining headroom gained per step.
    pub const RATE: f64 = 0.5;
}

pub mod feeding {
    /// `appetite = volume / APPETITE_DIVISOR * population`.
    pub const APPETITE_DIVISOR: f64 = 10.0;
    /// A single prey loses at most `population / PREY_LOSS_CAP_DIVISOR` per feeding.
    pub const PREY_LOSS_CAP_DIVISOR: f64 = 5.0;
    /// Multiplier applied to a consumer whose prey supply is insufficient.
    pub const STARVATION_PENALTY: f64 = 0.8;
}

pub mod mortality {
    /// Background survival fraction applied to every organism each step.
    pub const NATURAL_DEATH_MULTIPLIER: f64 = 0.95;
}

pub mod invader {
    /// Fraction of the run after which the invader enters.
    pub const DEFAULT_ENTRY_FRACTION: f64 = 0.5;
    /// Default invader starting population.
    pub const DEFAULT_START_POPULATION: f64 = 5.0;
    /// Upper bound of the invader starting population a user may choose.
    pub const MAX_START_POPULATION: f64 = 100.0;
}

pub mod run {
    /// Default number of steps in a run.
    pub const DEFAULT_STEPS: u32 = 50;
    /// Longest run a user may configure.
    pub const MAX_STEPS: u32 = 1000;
}
