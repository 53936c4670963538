//! # Simulation Configuration
//!
//! All tuning constants live here so balance changes never touch engine code.
//!
//! ```rust
//! use cm_core::config::SimConfig;
//!
//! let config = SimConfig::default();
//! let goals = SimConfig::high_scoring();
//! assert!(goals.match_engine.goal_scale > config.match_engine.goal_scale);
//! ```

mod finance_config;
mod league_config;
mod match_config;
mod training_config;
mod transfer_config;

pub use finance_config::FinanceConfig;
pub use league_config::LeagueConfig;
pub use match_config::MatchConfig;
pub use training_config::{TrainingConfig, TrainingProgram};
pub use transfer_config::{AcceptancePolicy, TransferConfig};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SimConfig {
    #[serde(default)]
    pub match_engine: MatchConfig,
    #[serde(default)]
    pub league: LeagueConfig,
    #[serde(default)]
    pub finance: FinanceConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl SimConfig {
    /// Default balance.
    pub fn realistic() -> Self {
        Self::default()
    }

    /// More open games.
    pub fn high_scoring() -> Self {
        let mut cfg = Self::default();
        cfg.match_engine.goal_scale = 0.06;
        cfg.match_engine.defense_weight = 0.5;
        cfg.match_engine.max_goal_mean = 6.0;
        cfg
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ValidationError> {
        let cfg: SimConfig =
            serde_yaml::from_str(yaml).map_err(|e| ValidationError::Config(e.to_string()))?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn to_yaml_string(&self) -> Result<String, ValidationError> {
        serde_yaml::to_string(self).map_err(|e| ValidationError::Config(e.to_string()))
    }

    pub fn check(&self) -> Result<(), ValidationError> {
        self.match_engine
            .check()
            .and_then(|_| self.league.check())
            .and_then(|_| self.finance.check())
            .and_then(|_| self.transfer.check())
            .and_then(|_| self.training.check())
            .map_err(ValidationError::Config)
    }
}
