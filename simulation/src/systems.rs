//! Per-actor systems run once per step
//!
//! Every system takes a `StepContext`: the mutable world state plus the
//! read-only environment and species table for the current step. Actors
//! are evaluated strictly one at a time, so nothing here needs locking.

pub mod animal;
pub mod birth;
pub mod lifecycle;
pub mod plant;

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use crate::components::Species;
use crate::environment::Environment;
use crate::field::Field;
use crate::species::{SpeciesId, SpeciesKind, SpeciesRegistry};

pub use birth::{spawn_actor, Origin};
pub use lifecycle::{is_alive, kill, DiseaseModel};

/// Everything an actor may read or mutate while it acts.
pub struct StepContext<'a> {
    pub world: &'a mut World,
    pub field: &'a mut Field,
    pub environment: &'a Environment,
    pub registry: &'a SpeciesRegistry,
    pub disease: &'a DiseaseModel,
    pub rng: &'a mut ChaCha8Rng,
    pub step: u64,
    /// Actors born this step. They occupy cells immediately but are only
    /// evaluated from the next step on.
    pub newborns: &'a mut Vec<Entity>,
}

/// Run one actor's behaviour for the current step.
pub fn act(ctx: &mut StepContext<'_>, actor: Entity) {
    if !is_alive(ctx.world, actor) {
        return;
    }
    let Some(species) = species_of(ctx.world, actor) else {
        return;
    };
    match ctx.registry.params(species).kind {
        SpeciesKind::Animal(_) => animal::act(ctx, actor, species),
        SpeciesKind::Plant(_) => plant::act(ctx, actor, species),
    }
}

pub fn species_of(world: &World, actor: Entity) -> Option<SpeciesId> {
    world.get::<&Species>(actor).ok().map(|s| s.0)
}
