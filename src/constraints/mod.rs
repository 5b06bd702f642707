//! Constraint evaluation.
//!
//! Infeasibility is data: every category produces a non-negative magnitude
//! and the weighted sum is used as a penalty. A total of zero is feasible.
//!
//! # Categories
//!
//! - boundary exit distance
//! - pairwise overlap area (pairs found through [`SpatialIndex`](crate::spatial::SpatialIndex))
//! - setback shortfall against boundary and roads
//! - fire-separation shortfall
//! - external compliance checks ([`ComplianceCheck`])
//! - malformed geometry ([`MALFORMED_PENALTY`] per footprint)

mod config;
mod evaluator;

pub use config::{ConstraintSettings, ConstraintWeights, MALFORMED_PENALTY};
pub use evaluator::{ComplianceCheck, ConstraintBreakdown, ConstraintEvaluator};
