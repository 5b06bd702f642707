//! Layout data model: building arena, genotype, solution, site, footprints.
//!
//! # Key Types
//!
//! - [`BuildingArena`]: immutable building specs addressed by [`BuildingId`]
//! - [`Genotype`]: one [`Gene`] per building (position, rotation, scales)
//! - [`Solution`]: a genotype plus its (optional) [`Evaluation`]
//! - [`Site`]: validated boundary polygon and road geometry
//! - [`Footprint`]: a gene materialized into a rotated rectangle

mod building;
mod footprint;
mod genotype;
mod site;
mod solution;

pub use building::{BuildingArena, BuildingId, BuildingSpec, ScaleRange};
pub use footprint::{materialize, rotated_rectangle, Footprint};
pub use genotype::{Gene, Genotype};
pub use site::{Site, SiteSource};
pub use solution::{Evaluation, Ranking, Solution, SENTINEL_OBJECTIVE, SENTINEL_PENALTY};
