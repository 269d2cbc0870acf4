//! Animal System
//!
//! Per-step behaviour of animals: age, hunger, breeding, predation,
//! movement, disease. The species' `ActivityPolicy` decides when foraging
//! and breeding are allowed.

use hecs::Entity;

use super::birth::give_birth;
use super::lifecycle::{self, kill, relocate};
use super::StepContext;
use crate::components::{DeathCause, FoodLevel, Gender, Species};
use crate::environment::TimeOfDay;
use crate::field::Location;
use crate::species::{ActivityPolicy, AnimalTraits, SpeciesEntry, SpeciesId};

pub fn act(ctx: &mut StepContext<'_>, actor: Entity, species: SpeciesId) {
    let registry = ctx.registry;
    let entry = registry.get(species);
    let Some(traits) = entry.params.animal() else {
        return;
    };

    // Aging and hunger apply even when the first one already killed.
    lifecycle::increment_age(ctx, actor, &entry.params);
    increment_hunger(ctx, actor, traits);
    if !lifecycle::is_alive(ctx.world, actor) {
        return;
    }
    let Some(here) = lifecycle::position(ctx.world, actor) else {
        return;
    };

    match &traits.activity {
        ActivityPolicy::TimeGated { active_time } => act_time_gated(ctx, actor, entry, traits, here, *active_time),
        ActivityPolicy::Unconstrained | ActivityPolicy::WeatherGated { .. } => {
            act_unconstrained(ctx, actor, entry, traits, here)
        }
    }

    lifecycle::maybe_mutate(ctx, actor);
}

/// Breed and forage when healthy, spread disease when sick, then move.
/// An animal with nowhere to go dies of overcrowding.
fn act_unconstrained(
    ctx: &mut StepContext<'_>,
    actor: Entity,
    entry: &SpeciesEntry,
    traits: &AnimalTraits,
    here: Location,
) {
    let mut destination = None;
    if lifecycle::health(ctx.world, actor).is_healthy() {
        let eligible = can_reproduce(ctx, actor, entry, traits, here);
        give_birth(ctx, entry.id, here, eligible);
        destination = find_food(ctx, actor, entry, traits, here);
    } else {
        lifecycle::advance_disease(ctx, actor);
        lifecycle::infect_neighbours(ctx, here);
    }
    if destination.is_none() {
        destination = ctx.field.free_adjacent_location(here);
    }
    finish_move(ctx, actor, here, destination);
}

/// Outside its active time the animal stays put. During it, a healthy
/// animal breeds, eats, then moves to the first free neighbouring cell;
/// the prey's cell is not targeted specifically. A sick animal has nowhere
/// to go in its active time and dies there. Disease progresses and spreads
/// regardless of the time of day.
fn act_time_gated(
    ctx: &mut StepContext<'_>,
    actor: Entity,
    entry: &SpeciesEntry,
    traits: &AnimalTraits,
    here: Location,
    active_time: TimeOfDay,
) {
    let healthy = lifecycle::health(ctx.world, actor).is_healthy();
    let active = ctx.environment.time_of_day() == active_time;
    let destination = if !active {
        Some(here)
    } else if healthy {
        let eligible = can_reproduce(ctx, actor, entry, traits, here);
        give_birth(ctx, entry.id, here, eligible);
        let _ = find_food(ctx, actor, entry, traits, here);
        ctx.field.free_adjacent_location(here)
    } else {
        None
    };

    if !healthy {
        lifecycle::advance_disease(ctx, actor);
        lifecycle::infect_neighbours(ctx, here);
        if active {
            kill(ctx, actor, DeathCause::Disease);
            return;
        }
    }
    finish_move(ctx, actor, here, destination);
}

fn finish_move(ctx: &mut StepContext<'_>, actor: Entity, here: Location, destination: Option<Location>) {
    match destination {
        Some(to) => relocate(ctx, actor, here, to),
        None => {
            kill(ctx, actor, DeathCause::Overcrowding);
            return;
        }
    }
    lifecycle::check_disease_death(ctx, actor);
}

/// Lose one unit of food unless the species ignores hunger. Starves at 0.
pub fn increment_hunger(ctx: &mut StepContext<'_>, actor: Entity, traits: &AnimalTraits) {
    if traits.hunger_disabled {
        return;
    }
    let starved = match ctx.world.query_one_mut::<&mut FoodLevel>(actor) {
        Ok(food) => {
            food.0 -= 1;
            food.0 <= 0
        }
        Err(_) => false,
    };
    if starved {
        kill(ctx, actor, DeathCause::Starvation);
    }
}

/// Within the breeding age window, in an active weather for weather-gated
/// species, and next to a mate of the opposite gender when breeding is
/// gendered.
pub fn can_reproduce(
    ctx: &StepContext<'_>,
    actor: Entity,
    entry: &SpeciesEntry,
    traits: &AnimalTraits,
    here: Location,
) -> bool {
    if let ActivityPolicy::WeatherGated { active_weather } = &traits.activity {
        if !active_weather.contains(&ctx.environment.weather()) {
            return false;
        }
    }
    if !entry.params.within_breeding_age(lifecycle::age(ctx.world, actor)) {
        return false;
    }
    if !traits.gendered_reproduction {
        return true;
    }
    let Ok(gender) = ctx.world.get::<&Gender>(actor).map(|g| *g) else {
        return false;
    };
    ctx.field.adjacent_locations(here).into_iter().any(|loc| {
        ctx.field.occupant_at(loc).map_or(false, |other| {
            let same_species = ctx
                .world
                .get::<&Species>(other)
                .map_or(false, |s| s.0 == entry.id);
            let opposite = ctx.world.get::<&Gender>(other).map_or(false, |g| *g != gender);
            same_species && opposite && lifecycle::is_alive(ctx.world, other)
        })
    })
}

/// Eat the first living prey found in adjacency order. The prey dies on
/// the spot, so no other predator can eat it this step. The predator's
/// food level becomes the prey's caloric value, capped at its own
/// capacity. Returns the prey's cell.
pub fn find_food(
    ctx: &mut StepContext<'_>,
    actor: Entity,
    entry: &SpeciesEntry,
    traits: &AnimalTraits,
    here: Location,
) -> Option<Location> {
    let registry = ctx.registry;
    for loc in ctx.field.adjacent_locations(here) {
        let Some(prey) = ctx.field.occupant_at(loc) else {
            continue;
        };
        let Ok(prey_species) = ctx.world.get::<&Species>(prey).map(|s| s.0) else {
            continue;
        };
        if !entry.eats(prey_species) || !lifecycle::is_alive(ctx.world, prey) {
            continue;
        }

        kill(ctx, prey, DeathCause::Eaten);
        let calories = registry.params(prey_species).calories.min(traits.max_food_value);
        if let Ok(food) = ctx.world.query_one_mut::<&mut FoodLevel>(actor) {
            food.0 = calories;
        }
        return Some(loc);
    }
    None
}
