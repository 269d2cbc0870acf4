//! Simulation World - main orchestrator

use hecs::{Entity, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::components::{Dead, Position, Species};
use crate::config::SimulationConfig;
use crate::environment::{Environment, TimeOfDay, Weather};
use crate::error::Result;
use crate::field::{Field, Location};
use crate::species::{SpeciesId, SpeciesRegistry};
use crate::stats::{DeathTally, PopulationSnapshot, ViabilityReporter};
use crate::systems::{self, is_alive, DiseaseModel, Origin, StepContext};

/// Outcome of a single step.
#[derive(Debug, Clone)]
pub struct TickResult {
    pub step: u64,
    pub births: u32,
    pub deaths: DeathTally,
    pub population: usize,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
}

/// Outcome of `SimulationWorld::run`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub steps_run: u64,
    pub stopped_early: bool,
    pub final_snapshot: PopulationSnapshot,
}

pub struct SimulationWorld {
    pub world: World,
    pub field: Field,
    pub environment: Environment,
    pub registry: SpeciesRegistry,
    config: SimulationConfig,
    disease: DiseaseModel,
    rng: ChaCha8Rng,
    step: u64,
    /// Live actors in evaluation order.
    actors: Vec<Entity>,
}

impl SimulationWorld {
    /// Build an empty world. Call `seed_population` or `spawn_actor` to
    /// add actors.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let registry = SpeciesRegistry::new(&config.species)?;
        let disease = DiseaseModel::new(&config.disease)?;
        Ok(Self {
            world: World::new(),
            field: Field::new(config.field.depth, config.field.width),
            environment: Environment::new(&config.environment),
            registry,
            disease,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            step: 0,
            actors: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Live actors in the order they will act next step.
    pub fn actors(&self) -> &[Entity] {
        &self.actors
    }

    pub fn population(&self) -> usize {
        self.actors.len()
    }

    /// Fill the field with a randomized initial population. Each cell is
    /// offered to the species in registry order; the first successful
    /// creation draw takes the cell. Returns the number of actors created.
    pub fn seed_population(&mut self) -> usize {
        let registry = &self.registry;
        let mut newborns = Vec::new();
        let mut ctx = StepContext {
            world: &mut self.world,
            field: &mut self.field,
            environment: &self.environment,
            registry,
            disease: &self.disease,
            rng: &mut self.rng,
            step: self.step,
            newborns: &mut newborns,
        };

        let mut created = Vec::new();
        for row in 0..ctx.field.depth() {
            for col in 0..ctx.field.width() {
                let location = Location::new(row, col);
                if !ctx.field.is_free(location) {
                    continue;
                }
                let chosen = registry
                    .iter()
                    .find(|entry| ctx.rng.gen_bool(entry.params.creation_probability))
                    .map(|entry| entry.id);
                if let Some(species) = chosen {
                    created.push(systems::spawn_actor(&mut ctx, species, location, Origin::Seeded));
                }
            }
        }

        let count = created.len();
        self.actors.extend(created);
        info!("Seeded {} actors on a {}x{} field", count, self.field.depth(), self.field.width());
        count
    }

    /// Place a single actor. Returns `None` if the cell is taken.
    pub fn spawn_actor(&mut self, species: SpeciesId, location: Location, randomized: bool) -> Option<Entity> {
        if !self.field.is_free(location) {
            return None;
        }
        let origin = if randomized { Origin::Seeded } else { Origin::Newborn };
        let mut newborns = Vec::new();
        let mut ctx = StepContext {
            world: &mut self.world,
            field: &mut self.field,
            environment: &self.environment,
            registry: &self.registry,
            disease: &self.disease,
            rng: &mut self.rng,
            step: self.step,
            newborns: &mut newborns,
        };
        let entity = systems::spawn_actor(&mut ctx, species, location, origin);
        self.actors.push(entity);
        Some(entity)
    }

    /// Clear everything and seed a fresh population. The random stream
    /// continues, so a reset run differs from the first one.
    pub fn reset(&mut self) -> usize {
        self.world.clear();
        self.field.clear_all();
        self.actors.clear();
        self.step = 0;
        self.environment = Environment::new(&self.config.environment);
        self.seed_population()
    }

    /// Run one simulation step.
    pub fn tick(&mut self) -> TickResult {
        self.step += 1;
        self.environment.update(self.step, &mut self.rng);

        let mut newborns = Vec::new();
        {
            let mut ctx = StepContext {
                world: &mut self.world,
                field: &mut self.field,
                environment: &self.environment,
                registry: &self.registry,
                disease: &self.disease,
                rng: &mut self.rng,
                step: self.step,
                newborns: &mut newborns,
            };
            for &actor in &self.actors {
                systems::act(&mut ctx, actor);
            }
        }

        let mut deaths = DeathTally::default();
        let mut departed = Vec::new();
        let world = &self.world;
        self.actors.retain(|&actor| {
            let alive = is_alive(world, actor);
            if !alive {
                departed.push(actor);
            }
            alive
        });
        let births = newborns.len() as u32;
        for young in newborns {
            if is_alive(&self.world, young) {
                self.actors.push(young);
            } else {
                departed.push(young);
            }
        }
        for actor in departed {
            if let Ok(dead) = self.world.get::<&Dead>(actor) {
                deaths.record(dead.cause);
            }
            let _ = self.world.despawn(actor);
        }

        let result = TickResult {
            step: self.step,
            births,
            deaths,
            population: self.actors.len(),
            time_of_day: self.environment.time_of_day(),
            weather: self.environment.weather(),
        };
        debug!(
            step = result.step,
            births = result.births,
            deaths = result.deaths.total(),
            population = result.population,
            time = %result.time_of_day,
            weather = %result.weather,
            "tick"
        );
        result
    }

    /// Step up to `num_steps` times, stopping early once `reporter` finds
    /// the population non-viable. Viability is checked before each step.
    pub fn run<V: ViabilityReporter + ?Sized>(&mut self, num_steps: u64, reporter: &mut V) -> RunSummary {
        info!("Running up to {} steps from step {}", num_steps, self.step);
        let mut steps_run = 0;
        let mut stopped_early = false;
        while steps_run < num_steps {
            if !reporter.is_viable(&self.snapshot()) {
                stopped_early = true;
                break;
            }
            self.tick();
            steps_run += 1;
        }
        let final_snapshot = self.snapshot();
        info!(
            "Run finished after {} steps (stopped early: {}), population {}",
            steps_run,
            stopped_early,
            final_snapshot.total()
        );
        RunSummary {
            steps_run,
            stopped_early,
            final_snapshot,
        }
    }

    /// Live counts per species and the current environment.
    pub fn snapshot(&self) -> PopulationSnapshot {
        let mut counts: BTreeMap<String, usize> = self
            .registry
            .iter()
            .map(|entry| (entry.params.name.clone(), 0))
            .collect();
        for &actor in &self.actors {
            if let Ok(species) = self.world.get::<&Species>(actor) {
                if let Some(n) = counts.get_mut(&self.registry.params(species.0).name) {
                    *n += 1;
                }
            }
        }
        PopulationSnapshot {
            step: self.step,
            counts,
            time_of_day: self.environment.time_of_day(),
            weather: self.environment.weather(),
        }
    }

    /// Check that the field and the live actors agree: every live actor
    /// sits on exactly the cell that references it, and no cell references
    /// anything else.
    pub fn occupancy_consistent(&self) -> bool {
        if self.field.occupied_count() != self.actors.len() {
            return false;
        }
        let cells_agree = self.field.occupied().all(|(location, actor)| {
            is_alive(&self.world, actor)
                && self
                    .world
                    .get::<&Position>(actor)
                    .map_or(false, |pos| pos.0 == location)
        });
        cells_agree
            && self.actors.iter().all(|&actor| {
                self.world
                    .get::<&Position>(actor)
                    .map_or(false, |pos| self.field.occupant_at(pos.0) == Some(actor))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{AlwaysViable, FieldStats};

    fn small_config(seed: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.seed = seed;
        config.field.depth = 30;
        config.field.width = 30;
        config
    }

    #[test]
    fn test_seeding_respects_occupancy() {
        let mut world = SimulationWorld::new(small_config(1)).unwrap();
        let n = world.seed_population();
        assert!(n > 0);
        assert_eq!(world.population(), n);
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn test_ticks_keep_field_consistent() {
        let mut world = SimulationWorld::new(small_config(2)).unwrap();
        world.seed_population();
        for _ in 0..60 {
            let result = world.tick();
            assert_eq!(result.population, world.population());
            assert!(world.occupancy_consistent(), "inconsistent at step {}", result.step);
        }
        assert_eq!(world.step(), 60);
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = SimulationWorld::new(small_config(77)).unwrap();
        let mut b = SimulationWorld::new(small_config(77)).unwrap();
        a.seed_population();
        b.seed_population();
        a.run(40, &mut AlwaysViable);
        b.run(40, &mut AlwaysViable);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_run_stops_when_not_viable() {
        let mut world = SimulationWorld::new(small_config(3)).unwrap();
        let summary = world.run(10, &mut FieldStats);
        assert!(summary.stopped_early);
        assert_eq!(summary.steps_run, 0);
        assert_eq!(world.step(), 0);
    }

    #[test]
    fn test_spawn_refuses_occupied_cell() {
        let mut world = SimulationWorld::new(small_config(4)).unwrap();
        let plant = world.registry.by_name("plant").unwrap().id;
        assert!(world.spawn_actor(plant, Location::new(1, 1), false).is_some());
        assert!(world.spawn_actor(plant, Location::new(1, 1), false).is_none());
        assert_eq!(world.population(), 1);
    }

    #[test]
    fn test_reset_restarts_step_counter() {
        let mut world = SimulationWorld::new(small_config(5)).unwrap();
        world.seed_population();
        world.run(5, &mut AlwaysViable);
        let n = world.reset();
        assert_eq!(world.step(), 0);
        assert_eq!(world.population(), n);
        assert!(world.occupancy_consistent());
    }
}
