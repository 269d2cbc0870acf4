//! Environment - day/night cycle and weather
//!
//! Time of day is a pure function of the step counter. Weather is a small
//! stochastic state machine that carries a countdown between steps.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EnvironmentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Rainy,
    Clear,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::Sunny, Weather::Rainy, Weather::Clear];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Rainy => "Rainy",
            Self::Clear => "Clear",
        }
    }

    /// Sunny weather cannot occur at night.
    pub fn compatible_with(&self, time: TimeOfDay) -> bool {
        !(time == TimeOfDay::Night && *self == Weather::Sunny)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current time of day and weather.
#[derive(Debug, Clone)]
pub struct Environment {
    day_cycle_length: u64,
    weather_min_duration: u32,
    weather_duration_spread: u32,
    time_of_day: TimeOfDay,
    weather: Weather,
    /// Steps left before the weather may change.
    weather_remaining: u32,
}

impl Environment {
    /// Starts at day, sunny, with the weather due for a re-roll.
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            day_cycle_length: config.day_cycle_length,
            weather_min_duration: config.weather_min_duration,
            weather_duration_spread: config.weather_duration_spread,
            time_of_day: TimeOfDay::Day,
            weather: Weather::Sunny,
            weather_remaining: 0,
        }
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn weather_remaining(&self) -> u32 {
        self.weather_remaining
    }

    /// Time of day for an absolute step: the first half of each cycle is day.
    pub fn time_of_day_at(&self, step: u64) -> TimeOfDay {
        if step % self.day_cycle_length < self.day_cycle_length / 2 {
            TimeOfDay::Day
        } else {
            TimeOfDay::Night
        }
    }

    /// Advance to `step`. Called once per tick before any actor acts.
    pub fn update<R: Rng + ?Sized>(&mut self, step: u64, rng: &mut R) {
        self.time_of_day = self.time_of_day_at(step);
        self.update_weather(rng);
    }

    fn update_weather<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.weather.compatible_with(self.time_of_day) {
            self.weather_remaining = 0;
        }
        if self.weather_remaining > 0 {
            self.weather_remaining -= 1;
            return;
        }

        let mut candidates: Vec<Weather> = Weather::ALL
            .iter()
            .copied()
            .filter(|w| *w != self.weather)
            .collect();
        self.weather_remaining =
            self.weather_min_duration + rng.gen_range(0..self.weather_duration_spread.max(1));

        let mut next = candidates[rng.gen_range(0..candidates.len())];
        if !next.compatible_with(self.time_of_day) {
            candidates.retain(|w| *w != next);
            next = candidates[rng.gen_range(0..candidates.len())];
        }
        self.weather = next;
    }

    #[cfg(test)]
    pub(crate) fn force(&mut self, time_of_day: TimeOfDay, weather: Weather, remaining: u32) {
        self.time_of_day = time_of_day;
        self.weather = weather;
        self.weather_remaining = remaining;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn env(cycle: u64) -> Environment {
        Environment::new(&EnvironmentConfig {
            day_cycle_length: cycle,
            ..EnvironmentConfig::default()
        })
    }

    #[test]
    fn test_time_of_day_from_step() {
        let env = env(10);
        assert_eq!(env.time_of_day_at(13), TimeOfDay::Day);
        assert_eq!(env.time_of_day_at(17), TimeOfDay::Night);
        assert_eq!(env.time_of_day_at(0), TimeOfDay::Day);
        assert_eq!(env.time_of_day_at(5), TimeOfDay::Night);
        assert_eq!(env.time_of_day_at(9), TimeOfDay::Night);
    }

    #[test]
    fn test_never_sunny_at_night() {
        let mut env = env(10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for step in 1..5_000 {
            env.update(step, &mut rng);
            if env.time_of_day() == TimeOfDay::Night {
                assert_ne!(env.weather(), Weather::Sunny, "sunny night at step {}", step);
            }
        }
    }

    #[test]
    fn test_night_forces_reroll_of_sunny() {
        let mut env = env(10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        env.force(TimeOfDay::Day, Weather::Sunny, 40);
        env.update(6, &mut rng);
        assert_eq!(env.time_of_day(), TimeOfDay::Night);
        assert_ne!(env.weather(), Weather::Sunny);
        assert!(env.weather_remaining() >= 5);
    }

    #[test]
    fn test_weather_holds_while_countdown_runs() {
        let mut env = env(10);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        env.force(TimeOfDay::Day, Weather::Rainy, 3);
        env.update(1, &mut rng);
        assert_eq!(env.weather(), Weather::Rainy);
        assert_eq!(env.weather_remaining(), 2);
    }

    #[test]
    fn test_reroll_changes_weather() {
        let mut env = env(10);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        env.force(TimeOfDay::Day, Weather::Clear, 0);
        env.update(2, &mut rng);
        assert_ne!(env.weather(), Weather::Clear);
        let remaining = env.weather_remaining();
        assert!((5..55).contains(&remaining), "duration {} out of range", remaining);
    }
}
