//! Species parameters and registry
//!
//! Each species is a read-only parameter record plus an activity policy.
//! The registry resolves diet names to ids once at startup so the hot path
//! only compares small integers.

use serde::{Deserialize, Serialize};

use crate::environment::{TimeOfDay, Weather};
use crate::error::ConfigError;

/// Index into the `SpeciesRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

/// When an animal species is allowed to forage and breed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ActivityPolicy {
    /// Acts the same way every step.
    Unconstrained,
    /// Forages and breeds only during `active_time`; stays put otherwise.
    TimeGated { active_time: TimeOfDay },
    /// Breeds only while the weather is one of `active_weather`.
    WeatherGated { active_weather: Vec<Weather> },
}

impl Default for ActivityPolicy {
    fn default() -> Self {
        Self::Unconstrained
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalTraits {
    /// Food capacity; newborns start full.
    pub max_food_value: i32,
    /// Breeding needs an adjacent mate of the opposite gender.
    pub gendered_reproduction: bool,
    /// Names of species this one eats.
    #[serde(default)]
    pub diet: Vec<String>,
    /// Food level never decreases.
    #[serde(default)]
    pub hunger_disabled: bool,
    #[serde(default)]
    pub activity: ActivityPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantTraits {
    pub max_water_level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeciesKind {
    Animal(AnimalTraits),
    Plant(PlantTraits),
}

/// Per-species constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    pub name: String,
    pub max_age: u32,
    pub reproduction_age: u32,
    pub max_reproduction_age: u32,
    pub reproduction_probability: f64,
    pub max_offspring: u32,
    /// Food granted to a predator that eats this species.
    pub calories: i32,
    /// Per-cell chance of seeding this species into the initial population.
    #[serde(default)]
    pub creation_probability: f64,
    #[serde(flatten)]
    pub kind: SpeciesKind,
}

impl SpeciesParams {
    pub fn animal(&self) -> Option<&AnimalTraits> {
        match &self.kind {
            SpeciesKind::Animal(traits) => Some(traits),
            SpeciesKind::Plant(_) => None,
        }
    }

    pub fn plant(&self) -> Option<&PlantTraits> {
        match &self.kind {
            SpeciesKind::Plant(traits) => Some(traits),
            SpeciesKind::Animal(_) => None,
        }
    }

    pub fn within_breeding_age(&self, age: u32) -> bool {
        age >= self.reproduction_age && age <= self.max_reproduction_age
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let probability = |field: &'static str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::ProbabilityOutOfRange {
                    owner: self.name.clone(),
                    field,
                    value,
                })
            }
        };
        probability("reproduction_probability", self.reproduction_probability)?;
        probability("creation_probability", self.creation_probability)?;

        if self.max_age == 0 {
            return Err(self.invalid("max_age must be positive"));
        }
        if self.max_offspring == 0 {
            return Err(self.invalid("max_offspring must be at least 1"));
        }
        if self.reproduction_age > self.max_reproduction_age {
            return Err(self.invalid("reproduction_age exceeds max_reproduction_age"));
        }
        if self.calories <= 0 {
            return Err(self.invalid("calories must be positive"));
        }
        match &self.kind {
            SpeciesKind::Animal(traits) => {
                if traits.max_food_value <= 0 {
                    return Err(self.invalid("max_food_value must be positive"));
                }
                if let ActivityPolicy::WeatherGated { active_weather } = &traits.activity {
                    if active_weather.is_empty() {
                        return Err(self.invalid("weather-gated species needs at least one active weather"));
                    }
                }
            }
            SpeciesKind::Plant(traits) => {
                if traits.max_water_level <= 0 {
                    return Err(self.invalid("max_water_level must be positive"));
                }
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: &'static str) -> ConfigError {
        ConfigError::InvalidSpecies {
            species: self.name.clone(),
            reason,
        }
    }
}

/// A registered species: its parameters and resolved diet.
#[derive(Debug, Clone)]
pub struct SpeciesEntry {
    pub id: SpeciesId,
    pub params: SpeciesParams,
    pub diet: Vec<SpeciesId>,
}

impl SpeciesEntry {
    pub fn eats(&self, prey: SpeciesId) -> bool {
        self.diet.contains(&prey)
    }
}

/// Species table, fully resolved before the first step.
#[derive(Debug, Clone, Default)]
pub struct SpeciesRegistry {
    entries: Vec<SpeciesEntry>,
}

impl SpeciesRegistry {
    /// Validate every record and resolve diet names to ids.
    pub fn new(params: &[SpeciesParams]) -> Result<Self, ConfigError> {
        let mut entries: Vec<SpeciesEntry> = Vec::with_capacity(params.len());
        for (idx, p) in params.iter().enumerate() {
            p.validate()?;
            if entries.iter().any(|e| e.params.name == p.name) {
                return Err(ConfigError::DuplicateSpecies(p.name.clone()));
            }
            entries.push(SpeciesEntry {
                id: SpeciesId(idx as u16),
                params: p.clone(),
                diet: Vec::new(),
            });
        }

        for idx in 0..entries.len() {
            let names = match &entries[idx].params.kind {
                SpeciesKind::Animal(traits) => traits.diet.clone(),
                SpeciesKind::Plant(_) => continue,
            };
            let mut diet = Vec::with_capacity(names.len());
            for prey in names {
                let id = entries
                    .iter()
                    .find(|e| e.params.name == prey)
                    .map(|e| e.id)
                    .ok_or_else(|| ConfigError::UnknownPrey {
                        species: entries[idx].params.name.clone(),
                        prey: prey.clone(),
                    })?;
                diet.push(id);
            }
            entries[idx].diet = diet;
        }

        Ok(Self { entries })
    }

    pub fn get(&self, id: SpeciesId) -> &SpeciesEntry {
        &self.entries[id.0 as usize]
    }

    pub fn params(&self, id: SpeciesId) -> &SpeciesParams {
        &self.get(id).params
    }

    pub fn by_name(&self, name: &str) -> Option<&SpeciesEntry> {
        self.entries.iter().find(|e| e.params.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
