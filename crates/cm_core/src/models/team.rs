use serde::{Deserialize, Serialize};

use super::ids::{PlayerId, TeamId};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

/// Number of recent results kept for form.
pub const FORM_WINDOW: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: String,
    pub formation: Formation,
    /// Ordered roster. The season state keeps this in sync with `Player::team`.
    pub roster: Vec<PlayerId>,
    pub stadium: Stadium,
    #[serde(default)]
    pub stats: SeasonStats,
    /// Most recent results, oldest first, at most `FORM_WINDOW` long.
    #[serde(default)]
    pub form: Vec<FormResult>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stadium {
    pub capacity: u32,
    pub ticket_price: i64,
    /// Covered stands draw a slightly bigger crowd.
    #[serde(default)]
    pub roof: bool,
    /// Fan shop sales per spectator on home matchdays.
    #[serde(default)]
    pub fan_shop: bool,
    #[serde(default)]
    pub vip_boxes: u32,
}

impl Stadium {
    /// A plain ground without facilities.
    pub fn new(capacity: u32, ticket_price: i64) -> Self {
        Self { capacity, ticket_price, roof: false, fan_shop: false, vip_boxes: 0 }
    }
}

/// Season record. Written only by the league manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SeasonStats {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl SeasonStats {
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    /// Folds one match into the record and returns its outcome.
    pub fn record(&mut self, scored: u8, conceded: u8) -> FormResult {
        self.played += 1;
        self.goals_for += scored as u32;
        self.goals_against += conceded as u32;
        let outcome = FormResult::from_score(scored, conceded);
        match outcome {
            FormResult::Win => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            FormResult::Draw => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            FormResult::Loss => self.lost += 1,
        }
        outcome
    }

    pub fn points_consistent(&self) -> bool {
        self.points == POINTS_FOR_WIN * self.won + POINTS_FOR_DRAW * self.drawn
            && self.played == self.won + self.drawn + self.lost
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl FormResult {
    pub fn from_score(scored: u8, conceded: u8) -> Self {
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => FormResult::Win,
            std::cmp::Ordering::Equal => FormResult::Draw,
            std::cmp::Ordering::Less => FormResult::Loss,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Formation {
    #[default]
    #[serde(rename = "4-4-2")]
    F442,
    #[serde(rename = "4-3-3")]
    F433,
    #[serde(rename = "4-5-1")]
    F451,
    #[serde(rename = "3-5-2")]
    F352,
    #[serde(rename = "5-3-2")]
    F532,
    #[serde(rename = "4-2-3-1")]
    F4231,
    #[serde(rename = "3-4-3")]
    F343,
    #[serde(rename = "5-4-1")]
    F541,
}

impl Formation {
    pub const ALL: [Formation; 8] = [
        Formation::F442,
        Formation::F433,
        Formation::F451,
        Formation::F352,
        Formation::F532,
        Formation::F4231,
        Formation::F343,
        Formation::F541,
    ];

    /// Returns (defenders, midfielders, forwards).
    pub fn get_positions(&self) -> (u8, u8, u8) {
        match self {
            Formation::F442 => (4, 4, 2),
            Formation::F433 => (4, 3, 3),
            Formation::F451 => (4, 5, 1),
            Formation::F352 => (3, 5, 2),
            Formation::F532 => (5, 3, 2),
            Formation::F4231 => (4, 5, 1), // 2 DM + 3 AM = 5 midfielders
            Formation::F343 => (3, 4, 3),
            Formation::F541 => (5, 4, 1),
        }
    }

    /// Canonical formation code string (e.g., "4-3-3").
    pub fn code(&self) -> &'static str {
        match self {
            Formation::F442 => "4-4-2",
            Formation::F433 => "4-3-3",
            Formation::F451 => "4-5-1",
            Formation::F352 => "3-5-2",
            Formation::F532 => "5-3-2",
            Formation::F4231 => "4-2-3-1",
            Formation::F343 => "3-4-3",
            Formation::F541 => "5-4-1",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }
}

impl Team {
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        short_name: impl Into<String>,
        formation: Formation,
        stadium: Stadium,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            short_name: short_name.into(),
            formation,
            roster: Vec::new(),
            stadium,
            stats: SeasonStats::default(),
            form: Vec::new(),
        }
    }

    pub fn push_form(&mut self, result: FormResult) {
        self.form.push(result);
        if self.form.len() > FORM_WINDOW {
            let excess = self.form.len() - FORM_WINDOW;
            self.form.drain(..excess);
        }
    }

    pub fn recent_wins(&self) -> usize {
        self.form.iter().filter(|r| **r == FormResult::Win).count()
    }

    pub fn squad_size(&self) -> usize {
        self.roster.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_points_invariant() {
        let mut stats = SeasonStats::default();
        assert_eq!(stats.record(2, 0), FormResult::Win);
        assert_eq!(stats.record(1, 1), FormResult::Draw);
        assert_eq!(stats.record(0, 3), FormResult::Loss);
        assert_eq!(stats.points, 4);
        assert_eq!(stats.goal_difference(), -1);
        assert!(stats.points_consistent());
    }

    #[test]
    fn test_form_window() {
        let mut team = Team::new(
            TeamId(1),
            "Test FC",
            "TFC",
            Formation::F442,
            Stadium::new(20_000, 35),
        );
        for _ in 0..4 {
            team.push_form(FormResult::Loss);
        }
        team.push_form(FormResult::Win);
        team.push_form(FormResult::Win);
        assert_eq!(team.form.len(), FORM_WINDOW);
        assert_eq!(team.recent_wins(), 2);
        assert_eq!(team.form[0], FormResult::Loss);
    }

    #[test]
    fn test_formation_codes_roundtrip() {
        for formation in Formation::ALL {
            assert_eq!(Formation::from_code(formation.code()), Some(formation));
            let (d, m, f) = formation.get_positions();
            assert_eq!(d + m + f, 10);
        }
    }
}
