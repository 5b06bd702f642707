//! Multi-chain Simulated Annealing (SA).
//!
//! The exploration phase: independent chains start from random layouts and
//! wander with temperature-scaled perturbations, accepting worsening moves
//! with probability `exp(-Δ/T)`. Each chain's best and final layouts seed
//! the genetic phase.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"

mod config;
mod runner;
mod types;

pub use config::SaConfig;
pub use runner::{ChainRun, SaExplorer};
pub use types::{ChainReport, ChainState, SaOutcome, StopReason};
