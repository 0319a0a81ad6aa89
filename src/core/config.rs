//! Rules configuration.
//!
//! `EngineConfig` holds the tunable constants of a game. It is created once
//! at setup and shared by every snapshot behind an `Arc`, so `apply` never
//! needs a third argument.
//!
//! Overrides can be loaded from JSON; any field left out keeps its default:
//!
//! ```
//! use oenology::core::{EngineConfig, SetupMode};
//!
//! let config = EngineConfig::from_json(r#"{ "setup": "papa", "startingCoins": 2 }"#).unwrap();
//! assert_eq!(config.setup, SetupMode::Papa);
//! assert_eq!(config.starting_coins, 2);
//! assert_eq!(config.max_workers, 6);
//! ```

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::cards::StructureId;

/// How a new game begins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetupMode {
    /// Each player picks a starting bonus, then the wake-up order is chosen.
    Papa,
    /// Wake-up slots are assigned in table order and summer starts at once.
    #[default]
    Quick,
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub setup: SetupMode,

    /// Values of each player's three fields.
    pub field_values: [u8; 3],

    pub starting_coins: u32,

    /// Normal workers each player starts with, besides the grande worker.
    pub starting_workers: u8,

    /// Trained workers a player may own, grande included.
    pub max_workers: u8,

    pub train_worker_cost: u32,

    pub max_residuals: u8,

    /// Papa option: take this many coins...
    pub papa_coins: u32,

    /// ...or this structure for free.
    pub papa_structure: StructureId,

    /// Victory points that end the game at year end.
    pub victory_threshold: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            setup: SetupMode::Quick,
            field_values: [5, 6, 7],
            starting_coins: 0,
            starting_workers: 2,
            max_workers: 6,
            train_worker_cost: 4,
            max_residuals: 5,
            papa_coins: 4,
            papa_structure: StructureId::Trellis,
            victory_threshold: 20,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON override.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values make a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let minimum = 1 + u32::from(self.starting_workers);
        if u32::from(self.max_workers) < minimum {
            return Err(ConfigError::Invalid(format!(
                "maxWorkers {} is below the {} starting workers",
                self.max_workers, minimum
            )));
        }
        if self.field_values.iter().any(|&v| v == 0) {
            return Err(ConfigError::Invalid("field values must be positive".into()));
        }
        Ok(())
    }

    /// Create a new config with a setup mode.
    #[must_use]
    pub fn with_setup(mut self, setup: SetupMode) -> Self {
        self.setup = setup;
        self
    }

    /// Create a new config with custom starting coins.
    #[must_use]
    pub fn with_starting_coins(mut self, coins: u32) -> Self {
        self.starting_coins = coins;
        self
    }

    /// Create a new config with a custom number of starting normal workers.
    #[must_use]
    pub fn with_starting_workers(mut self, workers: u8) -> Self {
        self.starting_workers = workers;
        self
    }

    /// Create a new config with a custom end-of-game threshold.
    #[must_use]
    pub fn with_victory_threshold(mut self, points: i32) -> Self {
        self.victory_threshold = points;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.field_values, [5, 6, 7]);
        assert_eq!(config.train_worker_cost, 4);
        assert_eq!(config.max_residuals, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_setup(SetupMode::Papa)
            .with_starting_coins(3)
            .with_victory_threshold(25);

        assert_eq!(config.setup, SetupMode::Papa);
        assert_eq!(config.starting_coins, 3);
        assert_eq!(config.victory_threshold, 25);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "maxWorkers": 1 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig::default().with_starting_coins(7);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
