//! Birth System
//!
//! Actor construction and newborn placement. Both animals and plants give
//! birth into free cells adjacent to the parent, first-fit in adjacency
//! order.

use hecs::Entity;
use rand::Rng;
use tracing::trace;

use super::lifecycle::reproduction_count;
use super::StepContext;
use crate::components::{Age, Alive, FoodLevel, Gender, Position, Species, WaterLevel};
use crate::field::Location;
use crate::species::{SpeciesId, SpeciesKind};

/// How an actor's starting stats are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Initial population: random age, resources of at least one, seeded
    /// disease chance.
    Seeded,
    /// Born during the run: age zero, full resources, mutation disease chance.
    Newborn,
}

/// Create an actor of `species` at `location` and place it on the field.
/// The cell must be free.
pub fn spawn_actor(
    ctx: &mut StepContext<'_>,
    species: SpeciesId,
    location: Location,
    origin: Origin,
) -> Entity {
    let registry = ctx.registry;
    let params = registry.params(species);

    let age = match origin {
        Origin::Seeded => ctx.rng.gen_range(0..params.max_age),
        Origin::Newborn => 0,
    };
    let health = match origin {
        Origin::Seeded => ctx.disease.seeded_health(ctx.rng),
        Origin::Newborn => ctx.disease.newborn_health(ctx.rng),
    };
    let entity = match &params.kind {
        SpeciesKind::Animal(traits) => {
            let gender = if ctx.rng.gen::<bool>() { Gender::Female } else { Gender::Male };
            let food = match origin {
                Origin::Seeded => ctx.rng.gen_range(1..=traits.max_food_value),
                Origin::Newborn => traits.max_food_value,
            };
            ctx.world.spawn((
                Species(species),
                Age { steps: age },
                health,
                Alive,
                Position(location),
                gender,
                FoodLevel(food),
            ))
        }
        SpeciesKind::Plant(traits) => {
            let water = match origin {
                Origin::Seeded => ctx.rng.gen_range(1..=traits.max_water_level),
                Origin::Newborn => traits.max_water_level,
            };
            ctx.world.spawn((
                Species(species),
                Age { steps: age },
                health,
                Alive,
                Position(location),
                WaterLevel(water),
            ))
        }
    };

    ctx.field.place(entity, location);
    entity
}

/// Draw a litter for the actor at `here` and place the young into free
/// neighbouring cells. Litters larger than the free space are truncated.
/// Returns the number of young actually placed.
pub fn give_birth(ctx: &mut StepContext<'_>, species: SpeciesId, here: Location, eligible: bool) -> u32 {
    let registry = ctx.registry;
    let free = ctx.field.free_adjacent_locations(here);
    let births = reproduction_count(ctx, registry.params(species), eligible);

    let mut placed = 0;
    for location in free.into_iter().take(births as usize) {
        let young = spawn_actor(ctx, species, location, Origin::Newborn);
        ctx.newborns.push(young);
        placed += 1;
    }
    if placed > 0 {
        trace!(species = %registry.params(species).name, ?here, placed, "birth");
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Dead, Health};
    use crate::config::{DiseaseConfig, SimulationConfig};
    use crate::environment::Environment;
    use crate::field::Field;
    use crate::species::SpeciesRegistry;
    use crate::systems::DiseaseModel;
    use hecs::World;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        world: World,
        field: Field,
        environment: Environment,
        registry: SpeciesRegistry,
        disease: DiseaseModel,
        rng: ChaCha8Rng,
        newborns: Vec<Entity>,
    }

    impl Fixture {
        fn new(config: SimulationConfig) -> Self {
            Self {
                world: World::new(),
                field: Field::new(20, 20),
                environment: Environment::new(&config.environment),
                registry: SpeciesRegistry::new(&config.species).unwrap(),
                disease: DiseaseModel::new(&config.disease).unwrap(),
                rng: ChaCha8Rng::seed_from_u64(33),
                newborns: Vec::new(),
            }
        }

        fn ctx(&mut self) -> StepContext<'_> {
            StepContext {
                world: &mut self.world,
                field: &mut self.field,
                environment: &self.environment,
                registry: &self.registry,
                disease: &self.disease,
                rng: &mut self.rng,
                step: 1,
                newborns: &mut self.newborns,
            }
        }

        /// Fill the whole field with seeded actors of `name`.
        fn seed_all(&mut self, name: &str) -> Vec<Entity> {
            let id = self.registry.by_name(name).unwrap().id;
            let (depth, width) = (self.field.depth(), self.field.width());
            let mut ctx = self.ctx();
            let mut spawned = Vec::new();
            for row in 0..depth {
                for col in 0..width {
                    spawned.push(spawn_actor(&mut ctx, id, Location::new(row, col), Origin::Seeded));
                }
            }
            spawned
        }
    }

    fn disease(seeded_probability: f64) -> DiseaseConfig {
        DiseaseConfig {
            steps_till_death: 10,
            seeded_probability,
            spread_probability: 0.0,
            mutation_probability: 0.0,
        }
    }

    #[test]
    fn test_seeded_animal_stats_in_range() {
        let mut config = SimulationConfig::default();
        config.disease = disease(0.0);
        let mut fx = Fixture::new(config);
        let params = fx.registry.by_name("dodo").unwrap().params.clone();
        let max_food = params.animal().unwrap().max_food_value;

        let mut saw_young = false;
        let mut saw_old = false;
        for dodo in fx.seed_all("dodo") {
            let age = fx.world.get::<&Age>(dodo).unwrap().steps;
            let food = fx.world.get::<&FoodLevel>(dodo).unwrap().0;
            assert!(age < params.max_age);
            assert!((1..=max_food).contains(&food), "food {}", food);
            assert_eq!(*fx.world.get::<&Health>(dodo).unwrap(), Health::Healthy);
            saw_young |= age < params.max_age / 2;
            saw_old |= age >= params.max_age / 2;
        }
        assert!(saw_young && saw_old);
    }

    #[test]
    fn test_seeded_plant_water_is_positive() {
        let mut config = SimulationConfig::default();
        config.disease = disease(0.0);
        if let SpeciesKind::Plant(traits) = &mut config.species[0].kind {
            traits.max_water_level = 1;
        }
        let mut fx = Fixture::new(config);
        for plant in fx.seed_all("plant") {
            assert_eq!(fx.world.get::<&WaterLevel>(plant).unwrap().0, 1);
        }
    }

    #[test]
    fn test_seeded_disease_follows_seeding_rate() {
        let mut config = SimulationConfig::default();
        config.disease = disease(1.0);
        let mut fx = Fixture::new(config);
        for plant in fx.seed_all("plant") {
            assert_eq!(*fx.world.get::<&Health>(plant).unwrap(), Health::Diseased { steps: 0 });
        }
    }

    #[test]
    fn test_newborn_starts_full_and_young() {
        let mut config = SimulationConfig::default();
        config.disease = disease(1.0);
        let mut fx = Fixture::new(config);
        let id = fx.registry.by_name("dodo").unwrap().id;
        let max_food = fx.registry.params(id).animal().unwrap().max_food_value;
        let mut ctx = fx.ctx();
        let dodo = spawn_actor(&mut ctx, id, Location::new(3, 3), Origin::Newborn);

        assert_eq!(fx.world.get::<&Age>(dodo).unwrap().steps, 0);
        assert_eq!(fx.world.get::<&FoodLevel>(dodo).unwrap().0, max_food);
        // Seeding rate does not apply to newborns.
        assert_eq!(*fx.world.get::<&Health>(dodo).unwrap(), Health::Healthy);
        assert!(fx.world.get::<&Dead>(dodo).is_err());
        assert_eq!(fx.field.occupant_at(Location::new(3, 3)), Some(dodo));
    }
}
