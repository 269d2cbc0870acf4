//! Lifecycle System
//!
//! Aging, disease and death shared by animals and plants.

use hecs::{Entity, World};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use tracing::trace;

use super::StepContext;
use crate::components::{Age, Alive, Dead, DeathCause, Health, Position};
use crate::config::DiseaseConfig;
use crate::error::ConfigError;
use crate::field::Location;
use crate::species::SpeciesParams;

/// Disease constants, shared by every species.
#[derive(Debug, Clone)]
pub struct DiseaseModel {
    steps_till_death: u32,
    seeded: Bernoulli,
    spread: Bernoulli,
    mutation: Bernoulli,
}

impl DiseaseModel {
    pub fn new(config: &DiseaseConfig) -> Result<Self, ConfigError> {
        let draw = |field: &'static str, p: f64| {
            Bernoulli::new(p).map_err(|_| ConfigError::ProbabilityOutOfRange {
                owner: "disease".into(),
                field,
                value: p,
            })
        };
        Ok(Self {
            steps_till_death: config.steps_till_death,
            seeded: draw("seeded_probability", config.seeded_probability)?,
            spread: draw("spread_probability", config.spread_probability)?,
            mutation: draw("mutation_probability", config.mutation_probability)?,
        })
    }

    pub fn steps_till_death(&self) -> u32 {
        self.steps_till_death
    }

    /// Initial health of a seeded actor.
    pub fn seeded_health<R: Rng + ?Sized>(&self, rng: &mut R) -> Health {
        Self::roll(&self.seeded, rng)
    }

    /// Initial health of a newborn.
    pub fn newborn_health<R: Rng + ?Sized>(&self, rng: &mut R) -> Health {
        Self::roll(&self.mutation, rng)
    }

    fn roll<R: Rng + ?Sized>(dist: &Bernoulli, rng: &mut R) -> Health {
        if dist.sample(rng) {
            Health::Diseased { steps: 0 }
        } else {
            Health::Healthy
        }
    }
}

pub fn is_alive(world: &World, actor: Entity) -> bool {
    world.get::<&Alive>(actor).is_ok()
}

pub fn position(world: &World, actor: Entity) -> Option<Location> {
    world.get::<&Position>(actor).ok().map(|p| p.0)
}

pub fn health(world: &World, actor: Entity) -> Health {
    world
        .get::<&Health>(actor)
        .map(|h| *h)
        .unwrap_or(Health::Healthy)
}

pub fn age(world: &World, actor: Entity) -> u32 {
    world.get::<&Age>(actor).map(|a| a.steps).unwrap_or(0)
}

/// Mark `actor` dead and take it off the field. The first recorded cause
/// wins; killing a dead actor does nothing.
pub fn kill(ctx: &mut StepContext<'_>, actor: Entity, cause: DeathCause) {
    if ctx.world.remove_one::<Alive>(actor).is_err() {
        return;
    }
    if let Ok(Position(location)) = ctx.world.remove_one::<Position>(actor) {
        ctx.field.clear(location);
    }
    let _ = ctx.world.insert_one(actor, Dead { step: ctx.step, cause });
    trace!(?actor, ?cause, step = ctx.step, "actor died");
}

/// Move a living actor from `from` to `to`.
pub fn relocate(ctx: &mut StepContext<'_>, actor: Entity, from: Location, to: Location) {
    if from == to {
        return;
    }
    ctx.field.clear(from);
    ctx.field.place(actor, to);
    if let Ok(pos) = ctx.world.query_one_mut::<&mut Position>(actor) {
        pos.0 = to;
    }
}

/// Age by one step; dies once past the species' max age.
pub fn increment_age(ctx: &mut StepContext<'_>, actor: Entity, params: &SpeciesParams) {
    let expired = match ctx.world.query_one_mut::<&mut Age>(actor) {
        Ok(age) => {
            age.steps += 1;
            age.steps > params.max_age
        }
        Err(_) => false,
    };
    if expired {
        kill(ctx, actor, DeathCause::OldAge);
    }
}

/// One more step of sickness. No-op for healthy actors.
pub fn advance_disease(ctx: &mut StepContext<'_>, actor: Entity) {
    if let Ok(Health::Diseased { steps }) = ctx.world.query_one_mut::<&mut Health>(actor) {
        *steps += 1;
    }
}

/// Dies of disease once sick for the configured number of steps.
/// Returns true if the actor died here.
pub fn check_disease_death(ctx: &mut StepContext<'_>, actor: Entity) -> bool {
    if health(ctx.world, actor).disease_steps() >= ctx.disease.steps_till_death {
        kill(ctx, actor, DeathCause::Disease);
        return true;
    }
    false
}

/// Offer every neighbour of `location` an independent chance of catching
/// the disease. One draw per occupant; dead or already sick occupants are
/// unaffected.
pub fn infect_neighbours(ctx: &mut StepContext<'_>, location: Location) {
    for loc in ctx.field.adjacent_locations(location) {
        let Some(neighbour) = ctx.field.occupant_at(loc) else {
            continue;
        };
        let caught = ctx.disease.spread.sample(ctx.rng);
        if !caught || !is_alive(ctx.world, neighbour) {
            continue;
        }
        if let Ok(health) = ctx.world.query_one_mut::<&mut Health>(neighbour) {
            if health.is_healthy() {
                *health = Health::Diseased { steps: 0 };
                trace!(?neighbour, "infected");
            }
        }
    }
}

/// Spontaneous disease for a healthy living actor.
pub fn maybe_mutate(ctx: &mut StepContext<'_>, actor: Entity) {
    if !is_alive(ctx.world, actor) || !health(ctx.world, actor).is_healthy() {
        return;
    }
    if ctx.disease.mutation.sample(ctx.rng) {
        if let Ok(health) = ctx.world.query_one_mut::<&mut Health>(actor) {
            *health = Health::Diseased { steps: 0 };
        }
    }
}

/// Litter size for this step: zero unless eligible and the species'
/// breeding draw succeeds, otherwise uniform in `1..=max_offspring`.
pub fn reproduction_count(ctx: &mut StepContext<'_>, params: &SpeciesParams, eligible: bool) -> u32 {
    if eligible && ctx.rng.gen_bool(params.reproduction_probability) {
        ctx.rng.gen_range(1..=params.max_offspring)
    } else {
        0
    }
}
