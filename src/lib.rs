//! Hybrid multi-objective building layout optimizer.
//!
//! Decides where buildings go on a bounded site, in two phases:
//!
//! - **Simulated Annealing (SA)**: independent chains explore the continuous
//!   layout space from random starts and hand their best and final layouts
//!   over as seeds.
//! - **Genetic refinement (GA)**: a population built from those seeds
//!   evolves by tournament selection, uniform crossover and perturbation
//!   mutation, with elitist replacement.
//! - **Many-objective mode**: from four objectives up (or on request),
//!   replacement switches to NSGA-III style survivor selection and a
//!   bounded Pareto archive is kept.
//!
//! Every candidate is scored through one [`ParallelEvaluator`](evaluation::ParallelEvaluator):
//! footprints are materialized from the genotype, checked against the site
//! ([`constraints`]) and scored ([`objectives`]). Infeasible layouts are
//! penalized, never rejected; failing evaluations receive sentinel scores.
//!
//! # Architecture
//!
//! - [`layout`]: building arena, genotype, solution, site, footprints
//! - [`spatial`]: R*-tree for conflict queries
//! - [`constraints`] / [`objectives`]: pure scoring over footprints
//! - [`evaluation`]: shared context, worker pool, budget, scalarization
//! - [`operators`]: perturbations and crossover shared by both phases
//! - [`sa`], [`ga`], [`pareto`]: the search itself
//! - [`optimizer`]: [`run`](optimizer::run) and the [`Optimizer`](optimizer::Optimizer) builder
//!
//! All randomness flows through explicit seeded generators ([`random`]):
//! the same seed and configuration give the same annealing trajectories.

pub mod constraints;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod layout;
pub mod objectives;
pub mod operators;
pub mod optimizer;
pub mod pareto;
pub mod random;
pub mod sa;
pub mod spatial;

pub use error::{ConfigError, EvaluationError, LayoutError, SiteError};
pub use optimizer::{run, LayoutConfig, LayoutResult, Optimizer};
