//! Strength and expected-goal calculations for match simulation
//!
//! All functions are pure - they take a team sheet and config and return numbers.
//! This allows easy unit testing without needing a full MatchEngine.

use crate::config::MatchConfig;
use crate::models::{Formation, Player, PositionCategory};

use super::match_engine::TeamSheet;

// ============================================================================
// Data Structures
// ============================================================================

/// Effective attack/defense of one side, on the 0..=100 attribute scale
/// (home attack may exceed 100 by the home advantage).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideStrength {
    pub attack: f32,
    pub defense: f32,
}

// ============================================================================
// Weights
// ============================================================================

fn attack_weight(category: PositionCategory) -> f32 {
    match category {
        PositionCategory::Forward => 1.0,
        PositionCategory::Midfielder => 0.7,
        PositionCategory::Defender => 0.3,
        PositionCategory::Goalkeeper => 0.0,
    }
}

fn defense_weight(category: PositionCategory) -> f32 {
    match category {
        PositionCategory::Defender => 1.0,
        PositionCategory::Midfielder => 0.6,
        PositionCategory::Forward => 0.2,
        PositionCategory::Goalkeeper => 0.0,
    }
}

/// Weighted mean that returns 0.0 instead of dividing by a zero weight sum.
pub fn weighted_mean(values: impl Iterator<Item = (f32, f32)>) -> f32 {
    let (sum, weights) = values.fold((0.0f32, 0.0f32), |(s, w), (v, wt)| (s + v * wt, w + wt));
    if weights <= f32::EPSILON {
        0.0
    } else {
        sum / weights
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// (attack, defense) multipliers relative to a flat 4-4-2.
pub fn formation_modifiers(formation: Formation, cfg: &MatchConfig) -> (f32, f32) {
    let (def, mid, fwd) = formation.get_positions();
    let mid_delta = mid as f32 - 4.0;
    let attack = 1.0
        + cfg.formation_line_weight * (fwd as f32 - 2.0)
        + cfg.formation_midfield_weight * mid_delta;
    let defense = 1.0
        + cfg.formation_line_weight * (def as f32 - 4.0)
        + cfg.formation_midfield_weight * mid_delta;
    (attack.max(0.0), defense.max(0.0))
}

/// Fitness, form and morale multiplier in `[condition_floor, 1.0]`.
pub fn condition_factor(players: &[Player], cfg: &MatchConfig) -> f32 {
    if players.is_empty() {
        return cfg.condition_floor;
    }
    let avg = players
        .iter()
        .map(|p| {
            (p.fitness.min(100) as f32 + p.attributes.form as f32 + p.morale.min(100) as f32) / 300.0
        })
        .sum::<f32>()
        / players.len() as f32;
    cfg.condition_floor + (1.0 - cfg.condition_floor) * avg.clamp(0.0, 1.0)
}

// ============================================================================
// Strength
// ============================================================================

/// Attack from outfield attack ratings, defense from outfield defense ratings
/// plus the first goalkeeper on the sheet. A sheet without a goalkeeper gets
/// no goalkeeper share.
pub fn side_strength(sheet: &TeamSheet, cfg: &MatchConfig, is_home: bool) -> SideStrength {
    let keeper = sheet.players.iter().find(|p| p.position.is_goalkeeper());
    let outfield = sheet.players.iter().filter(|p| !p.position.is_goalkeeper());

    let outfield_attack = weighted_mean(outfield.clone().map(|p| {
        (p.attributes.attack as f32, attack_weight(p.position.category()))
    }));
    let outfield_defense = weighted_mean(outfield.map(|p| {
        (p.attributes.defense as f32, defense_weight(p.position.category()))
    }));
    let keeper_defense = keeper.map(|k| k.attributes.defense as f32).unwrap_or(0.0);

    let (attack_mod, defense_mod) = formation_modifiers(sheet.formation, cfg);
    let condition = condition_factor(&sheet.players, cfg);

    let mut attack = outfield_attack * attack_mod * condition;
    if is_home {
        attack += cfg.home_advantage;
    }
    let defense = ((1.0 - cfg.goalkeeper_share) * outfield_defense
        + cfg.goalkeeper_share * keeper_defense)
        * defense_mod
        * condition;

    SideStrength { attack: attack.max(0.0), defense: defense.max(0.0) }
}

/// Poisson mean for goals scored by `attack` against `opponent_defense`.
#[inline]
pub fn expected_goals(attack: f32, opponent_defense: f32, cfg: &MatchConfig) -> f32 {
    let raw = cfg.goal_scale * (attack - cfg.defense_weight * opponent_defense);
    // Not f32::clamp: a misordered config must not panic mid-season.
    raw.max(cfg.min_goal_mean).min(cfg.max_goal_mean.max(cfg.min_goal_mean))
}
