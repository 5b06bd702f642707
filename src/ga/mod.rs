//! Genetic refinement (GA) of annealing seeds.
//!
//! The refinement phase: a population built from the SA seeds evolves
//! through tournament selection, uniform crossover and perturbation
//! mutation. Replacement is elitist by scalar fitness, or NSGA-III survivor
//! selection in many-objective mode (see [`pareto`](crate::pareto)).
//!
//! # Key Types
//!
//! - [`GaConfig`]: population, operator rates, presets
//! - [`GeneticRefiner`]: executes the generation loop
//! - [`GaOutcome`]: final population, best layout, per-generation statistics
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Deb & Jain (2014), *An Evolutionary Many-Objective Optimization Algorithm
//!   Using Reference-Point-Based Nondominated Sorting Approach*

mod config;
mod runner;
mod selection;
mod types;

pub use config::{GaConfig, InitRatio};
pub use runner::GeneticRefiner;
pub use selection::{select_parents, tournament, Criterion};
pub use types::{GaOutcome, GenerationStats};
