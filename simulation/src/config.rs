//! Simulation configuration
//!
//! Every knob the engine reads lives here. Defaults describe the stock
//! dinosaur ecosystem; a JSON file with the same shape can override any
//! subset of it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::environment::{TimeOfDay, Weather};
use crate::error::{ConfigError, Result};
use crate::species::{ActivityPolicy, AnimalTraits, PlantTraits, SpeciesKind, SpeciesParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub depth: usize,
    pub width: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self { depth: 80, width: 120 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Steps in one full day/night cycle; the first half is day.
    pub day_cycle_length: u64,
    /// Shortest a weather spell lasts after a change.
    pub weather_min_duration: u32,
    /// Extra spell length is drawn uniformly from `[0, spread)`.
    pub weather_duration_spread: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            day_cycle_length: 20,
            weather_min_duration: 5,
            weather_duration_spread: 50,
        }
    }
}

/// Disease constants shared by every species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseConfig {
    /// A diseased actor dies once it has been sick this many steps.
    pub steps_till_death: u32,
    /// Chance that a seeded (randomized) actor starts out diseased.
    pub seeded_probability: f64,
    /// Chance that a diseased actor infects each neighbour per step.
    pub spread_probability: f64,
    /// Chance of spontaneous disease, drawn for newborns and once per step
    /// for every healthy actor.
    pub mutation_probability: f64,
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        Self {
            steps_till_death: 10,
            seeded_probability: 0.02,
            spread_probability: 0.1,
            mutation_probability: 0.0005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub field: FieldConfig,
    pub environment: EnvironmentConfig,
    pub disease: DiseaseConfig,
    pub species: Vec<SpeciesParams>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            field: FieldConfig::default(),
            environment: EnvironmentConfig::default(),
            disease: DiseaseConfig::default(),
            species: default_species(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the engine-wide settings. Per-species checks run when the
    /// registry is built.
    pub fn validate(&self) -> Result<()> {
        if self.field.depth == 0 || self.field.width == 0 {
            return Err(ConfigError::InvalidDimensions {
                depth: self.field.depth,
                width: self.field.width,
            });
        }
        if self.environment.day_cycle_length < 2 {
            return Err(ConfigError::InvalidCycleLength(self.environment.day_cycle_length));
        }
        if self.disease.steps_till_death == 0 {
            return Err(ConfigError::InvalidDiseaseDuration);
        }
        for (field, value) in [
            ("seeded_probability", self.disease.seeded_probability),
            ("spread_probability", self.disease.spread_probability),
            ("mutation_probability", self.disease.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange {
                    owner: "disease".into(),
                    field,
                    value,
                });
            }
        }
        if self.species.is_empty() {
            return Err(ConfigError::NoSpecies);
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn animal(
    name: &str,
    max_age: u32,
    breeding: (u32, u32),
    reproduction_probability: f64,
    max_offspring: u32,
    calories: i32,
    creation_probability: f64,
    max_food_value: i32,
    gendered_reproduction: bool,
    diet: &[&str],
    activity: ActivityPolicy,
) -> SpeciesParams {
    SpeciesParams {
        name: name.into(),
        max_age,
        reproduction_age: breeding.0,
        max_reproduction_age: breeding.1,
        reproduction_probability,
        max_offspring,
        calories,
        creation_probability,
        kind: SpeciesKind::Animal(AnimalTraits {
            max_food_value,
            gendered_reproduction,
            diet: diet.iter().map(|s| s.to_string()).collect(),
            hunger_disabled: false,
            activity,
        }),
    }
}

fn default_species() -> Vec<SpeciesParams> {
    vec![
        SpeciesParams {
            name: "plant".into(),
            max_age: 100,
            reproduction_age: 3,
            max_reproduction_age: 100,
            reproduction_probability: 0.12,
            max_offspring: 3,
            calories: 8,
            creation_probability: 0.12,
            kind: SpeciesKind::Plant(PlantTraits { max_water_level: 25 }),
        },
        animal("dodo", 60, (6, 50), 0.25, 3, 12, 0.05, 18, true, &["plant"], ActivityPolicy::Unconstrained),
        animal(
            "stegosaurus",
            90,
            (10, 80),
            0.18,
            2,
            20,
            0.04,
            25,
            true,
            &["plant"],
            ActivityPolicy::WeatherGated {
                active_weather: vec![Weather::Rainy, Weather::Clear],
            },
        ),
        animal(
            "mei",
            70,
            (8, 60),
            0.2,
            2,
            14,
            0.03,
            20,
            false,
            &["plant"],
            ActivityPolicy::TimeGated { active_time: TimeOfDay::Day },
        ),
        animal(
            "velociraptor",
            80,
            (12, 70),
            0.12,
            3,
            15,
            0.02,
            22,
            true,
            &["dodo", "mei"],
            ActivityPolicy::TimeGated { active_time: TimeOfDay::Night },
        ),
        animal(
            "tyrannosaurus",
            120,
            (20, 100),
            0.08,
            2,
            30,
            0.01,
            35,
            true,
            &["stegosaurus", "velociraptor", "dodo"],
            ActivityPolicy::TimeGated { active_time: TimeOfDay::Day },
        ),
    ]
}
