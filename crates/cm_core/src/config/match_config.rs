//! Match engine tuning constants.
//!
//! The expected-goal model is
//! `λ = goal_scale · (attack − defense_weight · opponent_defense)`,
//! clamped to `[min_goal_mean, max_goal_mean]`. Attack and defense are on the
//! 0..=100 attribute scale after formation and condition modifiers.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Goals per attack point over the weighted defense (default: 0.045)
    #[validate(range(min = 0.0, max = 1.0))]
    pub goal_scale: f32,
    /// Share of the opponent's defense subtracted from attack (default: 0.6)
    #[validate(range(min = 0.0, max = 2.0))]
    pub defense_weight: f32,
    /// Lower clamp of the Poisson mean; must stay positive (default: 0.15)
    #[validate(range(min = 0.01, max = 5.0))]
    pub min_goal_mean: f32,
    /// Upper clamp of the Poisson mean (default: 4.5)
    #[validate(range(min = 0.1, max = 15.0))]
    pub max_goal_mean: f32,
    /// Attack points added to the home side (default: 5.0)
    #[validate(range(min = 0.0, max = 50.0))]
    pub home_advantage: f32,
    /// Goalkeeper share of team defense (default: 0.3)
    #[validate(range(min = 0.0, max = 1.0))]
    pub goalkeeper_share: f32,
    /// Attack/defense modifier per forward/defender beyond a 4-4-2 (default: 0.03)
    #[validate(range(min = 0.0, max = 0.5))]
    pub formation_line_weight: f32,
    /// Attack and defense modifier per midfielder beyond a 4-4-2 (default: 0.01)
    #[validate(range(min = 0.0, max = 0.5))]
    pub formation_midfield_weight: f32,
    /// Strength multiplier at zero fitness and form (default: 0.8)
    #[validate(range(min = 0.0, max = 1.0))]
    pub condition_floor: f32,
    /// Hard cap on goals per side (default: 12)
    #[validate(range(min = 1, max = 30))]
    pub max_goals: u8,
    /// Yellow cards per match are drawn from this range (default: 2..=6)
    #[validate(range(max = 20))]
    pub min_yellow_cards: u8,
    #[validate(range(max = 20))]
    pub max_yellow_cards: u8,
    /// Chance of one red card in a match (default: 0.05)
    #[validate(range(min = 0.0, max = 1.0))]
    pub red_card_chance: f32,
    /// Injury chance per starting player (default: 0.03)
    #[validate(range(min = 0.0, max = 1.0))]
    pub injury_chance: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            goal_scale: 0.045,
            defense_weight: 0.6,
            min_goal_mean: 0.15,
            max_goal_mean: 4.5,
            home_advantage: 5.0,
            goalkeeper_share: 0.3,
            formation_line_weight: 0.03,
            formation_midfield_weight: 0.01,
            condition_floor: 0.8,
            max_goals: 12,
            min_yellow_cards: 2,
            max_yellow_cards: 6,
            red_card_chance: 0.05,
            injury_chance: 0.03,
        }
    }
}

impl MatchConfig {
    pub(crate) fn check(&self) -> Result<(), String> {
        Validate::validate(self).map_err(|e| e.to_string())?;
        if self.min_goal_mean > self.max_goal_mean {
            return Err(format!(
                "min_goal_mean {} exceeds max_goal_mean {}",
                self.min_goal_mean, self.max_goal_mean
            ));
        }
        if self.min_yellow_cards > self.max_yellow_cards {
            return Err(format!(
                "min_yellow_cards {} exceeds max_yellow_cards {}",
                self.min_yellow_cards, self.max_yellow_cards
            ));
        }
        Ok(())
    }
}
