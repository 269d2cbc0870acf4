//! Plant System
//!
//! Plants never move. Dry weather costs water and lets them spread; rain
//! refills them and they rest that step. They can fall sick but never pass
//! the disease on.

use hecs::Entity;

use super::birth::give_birth;
use super::lifecycle::{self, kill};
use super::StepContext;
use crate::components::{DeathCause, WaterLevel};
use crate::environment::Weather;
use crate::species::SpeciesId;

pub fn act(ctx: &mut StepContext<'_>, actor: Entity, species: SpeciesId) {
    let registry = ctx.registry;
    let params = registry.params(species);
    let Some(traits) = params.plant() else {
        return;
    };

    lifecycle::increment_age(ctx, actor, params);
    if !lifecycle::is_alive(ctx.world, actor) {
        return;
    }

    if ctx.environment.weather() == Weather::Rainy {
        if let Ok(water) = ctx.world.query_one_mut::<&mut WaterLevel>(actor) {
            water.absorb(traits.max_water_level);
        }
    } else {
        let dried_out = match ctx.world.query_one_mut::<&mut WaterLevel>(actor) {
            Ok(water) => {
                water.0 -= 1;
                water.0 <= 0
            }
            Err(_) => false,
        };
        if dried_out {
            kill(ctx, actor, DeathCause::Dehydration);
            return;
        }
        if let Some(here) = lifecycle::position(ctx.world, actor) {
            let eligible = params.within_breeding_age(lifecycle::age(ctx.world, actor));
            give_birth(ctx, species, here, eligible);
        }
    }

    if !lifecycle::health(ctx.world, actor).is_healthy() {
        lifecycle::advance_disease(ctx, actor);
        if lifecycle::check_disease_death(ctx, actor) {
            return;
        }
    }
    lifecycle::maybe_mutate(ctx, actor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Dead, Health};
    use crate::config::{DiseaseConfig, SimulationConfig};
    use crate::environment::{Environment, TimeOfDay};
    use crate::field::{Field, Location};
    use crate::species::SpeciesRegistry;
    use crate::systems::{spawn_actor, DiseaseModel, Origin};
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
        plant: SpeciesId,
    }

    impl Fixture {
        fn new(reproduction_probability: f64, weather: Weather) -> Self {
            let mut config = SimulationConfig::default();
            config.disease = DiseaseConfig {
                steps_till_death: 10,
                seeded_probability: 0.0,
                spread_probability: 0.0,
                mutation_probability: 0.0,
            };
            config.species[0].reproduction_probability = reproduction_probability;
            config.species[0].reproduction_age = 0;
            config.species[0].max_offspring = 4;
            let registry = SpeciesRegistry::new(&config.species).unwrap();
            let mut environment = Environment::new(&config.environment);
            environment.force(TimeOfDay::Day, weather, 10);
            Self {
                world: World::new(),
                field: Field::new(5, 5),
                environment,
                plant: registry.by_name("plant").unwrap().id,
                registry,
                disease: DiseaseModel::new(&config.disease).unwrap(),
                rng: ChaCha8Rng::seed_from_u64(21),
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

        fn spawn(&mut self, loc: Location) -> Entity {
            let plant = self.plant;
            let mut ctx = self.ctx();
            spawn_actor(&mut ctx, plant, loc, Origin::Newborn)
        }
    }

    #[test]
    fn test_dry_weather_costs_water_and_spreads() {
        let mut fx = Fixture::new(1.0, Weather::Clear);
        let plant = fx.spawn(Location::new(2, 2));
        let plant_id = fx.plant;
        let mut ctx = fx.ctx();
        act(&mut ctx, plant, plant_id);

        let max = fx.registry.params(plant_id).plant().unwrap().max_water_level;
        assert_eq!(fx.world.get::<&WaterLevel>(plant).unwrap().0, max - 1);
        assert!((1..=4).contains(&fx.newborns.len()));
        for young in &fx.newborns {
            assert_eq!(fx.world.get::<&crate::components::Age>(*young).unwrap().steps, 0);
        }
    }

    #[test]
    fn test_rain_refills_and_prevents_spreading() {
        let mut fx = Fixture::new(1.0, Weather::Rainy);
        let plant = fx.spawn(Location::new(2, 2));
        fx.world.query_one_mut::<&mut WaterLevel>(plant).unwrap().0 = 3;
        let plant_id = fx.plant;
        let mut ctx = fx.ctx();
        act(&mut ctx, plant, plant_id);

        assert_eq!(fx.world.get::<&WaterLevel>(plant).unwrap().0, 4);
        assert!(fx.newborns.is_empty());
    }

    #[test]
    fn test_no_free_cell_means_no_seedlings() {
        let mut fx = Fixture::new(1.0, Weather::Sunny);
        let plant = fx.spawn(Location::new(0, 0));
        for loc in [Location::new(0, 1), Location::new(1, 0), Location::new(1, 1)] {
            fx.spawn(loc);
        }
        let plant_id = fx.plant;
        let mut ctx = fx.ctx();
        act(&mut ctx, plant, plant_id);

        assert!(fx.newborns.is_empty());
        assert!(lifecycle::is_alive(&fx.world, plant));
    }

    #[test]
    fn test_dehydration() {
        let mut fx = Fixture::new(0.0, Weather::Sunny);
        let plant = fx.spawn(Location::new(2, 2));
        fx.world.query_one_mut::<&mut WaterLevel>(plant).unwrap().0 = 1;
        let plant_id = fx.plant;
        let mut ctx = fx.ctx();
        act(&mut ctx, plant, plant_id);

        assert_eq!(fx.world.get::<&Dead>(plant).unwrap().cause, DeathCause::Dehydration);
        assert_eq!(fx.field.occupant_at(Location::new(2, 2)), None);
    }

    #[test]
    fn test_sick_plant_dies_at_threshold() {
        let mut fx = Fixture::new(0.0, Weather::Rainy);
        let plant = fx.spawn(Location::new(2, 2));
        *fx.world.query_one_mut::<&mut Health>(plant).unwrap() = Health::Diseased { steps: 8 };
        let plant_id = fx.plant;

        let mut ctx = fx.ctx();
        act(&mut ctx, plant, plant_id);
        assert!(lifecycle::is_alive(ctx.world, plant));
        act(&mut ctx, plant, plant_id);
        assert_eq!(fx.world.get::<&Dead>(plant).unwrap().cause, DeathCause::Disease);
    }
}
