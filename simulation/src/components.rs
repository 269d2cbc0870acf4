//! ECS Components for Habitat actors
//!
//! Every actor carries `Species`, `Age`, `Health` and either the animal
//! pair (`Gender`, `FoodLevel`) or the plant `WaterLevel`. Living actors
//! additionally carry `Alive` and `Position`; death swaps those for `Dead`.

use serde::{Deserialize, Serialize};

use crate::field::Location;
use crate::species::SpeciesId;

// ============================================================================
// Identity Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species(pub SpeciesId);

/// Where the actor sits in the field. Removed on death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub Location);

// ============================================================================
// Lifecycle Components
// ============================================================================

/// Age in steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Age {
    pub steps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Healthy,
    /// `steps` counts how long the actor has been sick, starting at 0.
    Diseased { steps: u32 },
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Health::Healthy)
    }

    pub fn disease_steps(&self) -> u32 {
        match self {
            Health::Healthy => 0,
            Health::Diseased { steps } => *steps,
        }
    }
}

/// Marker: entity is alive
#[derive(Debug, Clone, Copy, Default)]
pub struct Alive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Dehydration,
    Disease,
    Overcrowding,
    Eaten,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dead {
    pub step: u64,
    pub cause: DeathCause,
}

// ============================================================================
// Animal Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Steps an animal can go before starving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodLevel(pub i32);

// ============================================================================
// Plant Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterLevel(pub i32);

impl WaterLevel {
    /// Rain fills the plant up to `max`.
    pub fn absorb(&mut self, max: i32) {
        self.0 = (self.0 + 1).min(max);
    }
}
