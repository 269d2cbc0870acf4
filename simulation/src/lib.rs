//! Habitat Simulation Engine
//!
//! Discrete-time predator/prey simulation on a bounded grid. Actors are
//! ECS entities; the field indexes them by cell. Each step advances the
//! environment, lets every live actor act once in order, then compacts
//! the live list and admits the newborns.

pub mod components;
pub mod config;
pub mod environment;
pub mod error;
pub mod field;
pub mod species;
pub mod stats;
pub mod systems;
pub mod world;

pub use components::*;
pub use config::SimulationConfig;
pub use environment::{Environment, TimeOfDay, Weather};
pub use error::ConfigError;
pub use field::{Field, Location};
pub use species::{ActivityPolicy, SpeciesId, SpeciesKind, SpeciesParams, SpeciesRegistry};
pub use stats::{AlwaysViable, FieldStats, PopulationSnapshot, ViabilityReporter};
pub use world::{RunSummary, SimulationWorld, TickResult};
