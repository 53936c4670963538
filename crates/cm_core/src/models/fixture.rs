use serde::{Deserialize, Serialize};

use super::ids::{FixtureId, TeamId};
use crate::error::InvariantViolation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FixtureStatus {
    Scheduled,
    Played,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}

impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn as_pair(&self) -> (u8, u8) {
        (self.home, self.away)
    }
}

/// A scheduled match. Only `status`, `result` and `seed` ever change, and only
/// once, through [`Fixture::record_result`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fixture {
    pub id: FixtureId,
    /// 1-based matchday number.
    pub matchday: u16,
    pub home: TeamId,
    pub away: TeamId,
    status: FixtureStatus,
    result: Option<Score>,
    /// Seed the match engine used, kept for replay and audit.
    seed: Option<u64>,
}

impl Fixture {
    pub fn new(id: FixtureId, matchday: u16, home: TeamId, away: TeamId) -> Self {
        Self { id, matchday, home, away, status: FixtureStatus::Scheduled, result: None, seed: None }
    }

    pub fn status(&self) -> FixtureStatus {
        self.status
    }

    pub fn result(&self) -> Option<Score> {
        self.result
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn is_played(&self) -> bool {
        self.status == FixtureStatus::Played
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }

    /// Goals (scored, conceded) from `team`'s point of view.
    pub fn goals_for(&self, team: TeamId) -> Option<(u8, u8)> {
        let score = self.result?;
        if team == self.home {
            Some((score.home, score.away))
        } else if team == self.away {
            Some((score.away, score.home))
        } else {
            None
        }
    }

    pub(crate) fn record_result(
        &mut self,
        score: Score,
        seed: u64,
    ) -> Result<(), InvariantViolation> {
        if self.is_played() {
            return Err(InvariantViolation::FixtureAlreadyPlayed(self.id));
        }
        self.status = FixtureStatus::Played;
        self.result = Some(score);
        self.seed = Some(seed);
        Ok(())
    }
}
