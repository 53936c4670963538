use serde::{Deserialize, Serialize};
use validator::Validate;

/// Price and effect of one kind of session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrainingProgram {
    pub cost: i64,
    pub fitness_loss: u8,
    pub base_chance: f32,
    pub min_gain: u8,
    pub max_gain: u8,
}

impl TrainingProgram {
    const fn new(cost: i64, fitness_loss: u8, base_chance: f32, min_gain: u8, max_gain: u8) -> Self {
        Self { cost, fitness_loss, base_chance, min_gain, max_gain }
    }

    fn check(&self, name: &str) -> Result<(), String> {
        if self.cost < 0 {
            return Err(format!("{}: cost must not be negative, got {}", name, self.cost));
        }
        if !(0.0..=1.0).contains(&self.base_chance) {
            return Err(format!("{}: base_chance {} is outside 0..=1", name, self.base_chance));
        }
        if self.min_gain > self.max_gain {
            return Err(format!("{}: min_gain {} exceeds max_gain {}", name, self.min_gain, self.max_gain));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Raises attack (default: 120_000, -3 fitness, 45%, +1..=2)
    pub shooting: TrainingProgram,
    /// Raises defense (default: 100_000, -4 fitness, 45%, +1..=2)
    pub defending: TrainingProgram,
    /// Raises stamina (default: 100_000, -4 fitness, 50%, +1..=2)
    pub conditioning: TrainingProgram,
    /// Raises a goalkeeper's defense (default: 80_000, -3 fitness, 50%, +1..=2)
    pub goalkeeping: TrainingProgram,
    /// Restores fitness instead of raising an attribute (default: 50_000, 80%, +5..=10)
    pub fitness: TrainingProgram,
    /// Whole-squad morale session, always succeeds (default: 200_000, -3 fitness, +2..=5)
    pub team_bonding: TrainingProgram,
    /// Below this fitness only fitness sessions are allowed (default: 20)
    #[validate(range(max = 100))]
    pub min_fitness: u8,
    /// Training never drops fitness below this (default: 10)
    #[validate(range(max = 100))]
    pub fitness_floor: u8,
    /// Success chance after age and level adjustments is clamped to this range (default: 0.10..=0.95)
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_chance: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_chance: f32,
    /// Attributes at or above this cannot be trained (default: 99)
    #[validate(range(min = 1, max = 100))]
    pub attribute_cap: u8,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            shooting: TrainingProgram::new(120_000, 3, 0.45, 1, 2),
            defending: TrainingProgram::new(100_000, 4, 0.45, 1, 2),
            conditioning: TrainingProgram::new(100_000, 4, 0.50, 1, 2),
            goalkeeping: TrainingProgram::new(80_000, 3, 0.50, 1, 2),
            fitness: TrainingProgram::new(50_000, 0, 0.80, 5, 10),
            team_bonding: TrainingProgram::new(200_000, 3, 1.0, 2, 5),
            min_fitness: 20,
            fitness_floor: 10,
            min_chance: 0.10,
            max_chance: 0.95,
            attribute_cap: 99,
        }
    }
}

impl TrainingConfig {
    pub(crate) fn check(&self) -> Result<(), String> {
        Validate::validate(self).map_err(|e| e.to_string())?;
        if self.min_chance > self.max_chance {
            return Err(format!(
                "min_chance {} exceeds max_chance {}",
                self.min_chance, self.max_chance
            ));
        }
        self.shooting.check("shooting")?;
        self.defending.check("defending")?;
        self.conditioning.check("conditioning")?;
        self.goalkeeping.check("goalkeeping")?;
        self.fitness.check("fitness")?;
        self.team_bonding.check("team_bonding")
    }
}
