//! Variation operators over layout genotypes.
//!
//! # Perturbations
//!
//! - [`Perturbation::Gaussian`]: jitter one building's centre
//! - [`Perturbation::Swap`]: exchange two buildings' positions
//! - [`Perturbation::Reset`]: redraw one building entirely
//!
//! A [`Perturbation`] is picked by weighted choice through
//! [`OperatorWeights`]. SA scales the Gaussian step with temperature; GA
//! mutation uses a fixed step.
//!
//! # Crossover
//!
//! - [`uniform_crossover`]: per-building coin flip between parents
//!
//! # References
//!
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"

mod crossover;
mod perturbation;

pub use crossover::uniform_crossover;
pub use perturbation::{OperatorWeights, Perturbation};
