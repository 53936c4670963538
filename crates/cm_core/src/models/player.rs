use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::{PlayerId, TeamId};
use crate::error::ValidationError;

/// Fitness at or below which a player is left out of the team sheet.
pub const MIN_SELECTABLE_FITNESS: u8 = 30;

/// Player data owned by the season state.
///
/// Ownership is exclusive: `team` is `Some` for exactly one club roster that
/// also lists this player, or `None` for the free-agent pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub age: u8,
    pub position: Position,
    pub attributes: PlayerAttributes,

    /// Match fitness, 0..=100. Drops after playing, recovers on the bench.
    #[serde(default = "default_fitness")]
    pub fitness: u8,

    /// Morale, 30..=99 once the season runs.
    #[serde(default = "default_morale")]
    pub morale: u8,

    pub contract: Contract,

    /// Base market value before age/contract/performance adjustments.
    pub market_value: i64,

    /// Owning club, `None` for free agents.
    pub team: Option<TeamId>,

    /// Remaining matchdays out injured.
    #[serde(default)]
    pub injury_matchdays: u8,

    #[serde(default)]
    pub season: PlayerSeasonStats,
}

fn default_fitness() -> u8 {
    100
}

fn default_morale() -> u8 {
    70
}

/// Core attribute set, every value within 0..=100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct PlayerAttributes {
    #[validate(range(max = 100))]
    pub attack: u8,
    #[validate(range(max = 100))]
    pub defense: u8,
    #[validate(range(max = 100))]
    pub stamina: u8,
    #[validate(range(max = 100))]
    pub form: u8,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self { attack: 50, defense: 50, stamina: 50, form: 50 }
    }
}

impl PlayerAttributes {
    pub fn new(attack: u8, defense: u8, stamina: u8, form: u8) -> Self {
        Self { attack, defense, stamina, form }
    }
}

/// Employment terms. `wage` is paid once per pay period (matchday).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contract {
    pub wage: i64,
    /// Last season (calendar year the season starts in) covered by the contract.
    pub expires_season: u16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlayerSeasonStats {
    pub appearances: u16,
    pub goals: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    GK,
    LB,
    CB,
    RB,
    CDM,
    CM,
    CAM,
    LM,
    RM,
    LW,
    RW,
    ST,
}

/// Coarse line a position belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PositionCategory {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn category(&self) -> PositionCategory {
        match self {
            Position::GK => PositionCategory::Goalkeeper,
            Position::LB | Position::CB | Position::RB => PositionCategory::Defender,
            Position::CDM | Position::CM | Position::CAM | Position::LM | Position::RM => {
                PositionCategory::Midfielder
            }
            Position::LW | Position::RW | Position::ST => PositionCategory::Forward,
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::GK)
    }

    pub fn is_defender(&self) -> bool {
        self.category() == PositionCategory::Defender
    }

    pub fn is_midfielder(&self) -> bool {
        self.category() == PositionCategory::Midfielder
    }

    pub fn is_forward(&self) -> bool {
        self.category() == PositionCategory::Forward
    }

    /// Positions a goal is most likely to come from.
    pub fn is_scoring_position(&self) -> bool {
        matches!(
            self,
            Position::ST
                | Position::LW
                | Position::RW
                | Position::CAM
                | Position::CM
                | Position::LM
                | Position::RM
        )
    }
}

impl Player {
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        age: u8,
        position: Position,
        attributes: PlayerAttributes,
        contract: Contract,
        market_value: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            position,
            attributes,
            fitness: default_fitness(),
            morale: default_morale(),
            contract,
            market_value,
            team: None,
            injury_matchdays: 0,
            season: PlayerSeasonStats::default(),
        }
    }

    pub fn with_team(mut self, team: TeamId) -> Self {
        self.team = Some(team);
        self
    }

    /// Position-weighted rating, 0..=100.
    pub fn overall(&self) -> u8 {
        let a = self.attributes.attack as f32;
        let d = self.attributes.defense as f32;
        let rating = match self.position.category() {
            PositionCategory::Goalkeeper => d,
            PositionCategory::Defender => a * 0.2 + d * 0.8,
            PositionCategory::Midfielder => a * 0.5 + d * 0.5,
            PositionCategory::Forward => a * 0.8 + d * 0.2,
        };
        rating.round().clamp(0.0, 100.0) as u8
    }

    pub fn is_injured(&self) -> bool {
        self.injury_matchdays > 0
    }

    pub fn is_free_agent(&self) -> bool {
        self.team.is_none()
    }

    /// Fit and uninjured enough to start.
    pub fn is_available(&self) -> bool {
        !self.is_injured() && self.fitness > MIN_SELECTABLE_FITNESS
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.attributes.validate().is_err() {
            let attrs = &self.attributes;
            let (attribute, value) = [
                ("attack", attrs.attack),
                ("defense", attrs.defense),
                ("stamina", attrs.stamina),
                ("form", attrs.form),
            ]
            .into_iter()
            .find(|(_, v)| *v > 100)
            .unwrap_or(("attributes", 0));
            return Err(ValidationError::AttributeOutOfRange {
                player: self.id,
                attribute,
                value,
            });
        }
        if self.fitness > 100 {
            return Err(ValidationError::AttributeOutOfRange {
                player: self.id,
                attribute: "fitness",
                value: self.fitness,
            });
        }
        if self.contract.wage < 0 {
            return Err(ValidationError::NonPositivePrice(self.contract.wage));
        }
        Ok(())
    }
}
