//! The single owned season aggregate.
//!
//! Every engine receives `&mut SeasonState` and writes only its own fields:
//! the league manager owns fixtures, standings, phase and match condition;
//! the finance engine owns accounts and stadium facilities; the transfer
//! market owns the market book and roster ownership; the training engine owns
//! the training log and player development. Outside the crate the state is
//! read-only.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::engine::{Calendar, MatchResult, TeamSheet};
use crate::error::{InvariantViolation, ValidationError};
use crate::finance::{Accounts, ClubAccount, FinanceEngine, IncomeProfile};
use crate::league::{standings, SeasonPhase, SeasonSummary};
use crate::models::{FixtureId, Player, PlayerId, Team, TeamId};
use crate::training::TrainingRecord;
use crate::transfer::MarketBook;

/// One club as registered before the season: the team, its squad in roster
/// order and its opening finances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubSetup {
    pub team: Team,
    pub players: Vec<Player>,
    pub opening_balance: i64,
    #[serde(default)]
    pub income: IncomeProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSetup {
    /// Registration order is also the final standings tie-break.
    pub clubs: Vec<ClubSetup>,
    #[serde(default)]
    pub free_agents: Vec<Player>,
    pub seed: u64,
}

/// Everything needed to replay a played fixture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayedMatch {
    pub fixture: FixtureId,
    pub matchday: u16,
    pub home_sheet: TeamSheet,
    pub away_sheet: TeamSheet,
    pub result: MatchResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonState {
    pub(crate) teams: Vec<Team>,
    pub(crate) players: BTreeMap<PlayerId, Player>,
    pub(crate) calendar: Calendar,
    pub(crate) accounts: Accounts,
    pub(crate) market: MarketBook,
    pub(crate) phase: SeasonPhase,
    /// Last completed matchday, 0 before the first.
    pub(crate) current_matchday: u16,
    pub(crate) season_seed: u64,
    pub(crate) matches: BTreeMap<FixtureId, PlayedMatch>,
    pub(crate) summary: Option<SeasonSummary>,
    #[serde(default)]
    pub(crate) training_log: Vec<TrainingRecord>,
}

impl SeasonState {
    /// Builds the pre-season state. Accounts are opened separately by the
    /// finance engine.
    pub fn from_setup(setup: &SeasonSetup) -> Result<Self, ValidationError> {
        if setup.clubs.len() < 2 {
            return Err(ValidationError::TooFewTeams { found: setup.clubs.len() });
        }

        let mut teams = Vec::with_capacity(setup.clubs.len());
        let mut players = BTreeMap::new();
        let mut team_ids = HashSet::new();

        for club in &setup.clubs {
            let mut team = club.team.clone();
            if !team_ids.insert(team.id) {
                return Err(ValidationError::DuplicateTeam(team.id));
            }
            if club.players.is_empty() {
                return Err(ValidationError::EmptyRoster(team.id));
            }
            if team.stadium.ticket_price < 0 {
                return Err(ValidationError::NonPositivePrice(team.stadium.ticket_price));
            }
            team.roster.clear();
            for player in &club.players {
                player.validate()?;
                if let Some(owner) = player.team {
                    if owner != team.id {
                        return Err(ValidationError::OwnershipMismatch {
                            player: player.id,
                            claimed: team.id,
                            owner: Some(owner),
                        });
                    }
                }
                let id = player.id;
                let mut player = player.clone();
                player.team = Some(team.id);
                if players.insert(id, player).is_some() {
                    return Err(ValidationError::DuplicatePlayer(id));
                }
                team.roster.push(id);
            }
            teams.push(team);
        }

        for agent in &setup.free_agents {
            agent.validate()?;
            if let Some(owner) = agent.team {
                return Err(ValidationError::OwnershipMismatch {
                    player: agent.id,
                    claimed: owner,
                    owner: None,
                });
            }
            if players.insert(agent.id, agent.clone()).is_some() {
                return Err(ValidationError::DuplicatePlayer(agent.id));
            }
        }

        Ok(Self {
            teams,
            players,
            calendar: Calendar::default(),
            accounts: Accounts::new(),
            market: MarketBook::default(),
            phase: SeasonPhase::NotStarted,
            current_matchday: 0,
            season_seed: setup.seed,
            matches: BTreeMap::new(),
            summary: None,
            training_log: Vec::new(),
        })
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| t.id).collect()
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, ValidationError> {
        self.teams.iter().find(|t| t.id == id).ok_or(ValidationError::UnknownTeam(id))
    }

    pub(crate) fn team_mut(&mut self, id: TeamId) -> Result<&mut Team, ValidationError> {
        self.teams.iter_mut().find(|t| t.id == id).ok_or(ValidationError::UnknownTeam(id))
    }

    pub fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, ValidationError> {
        self.players.get(&id).ok_or(ValidationError::UnknownPlayer(id))
    }

    pub fn squad(&self, team: TeamId) -> Result<Vec<&Player>, ValidationError> {
        let team = self.team(team)?;
        team.roster.iter().map(|id| self.player(*id)).collect()
    }

    pub fn free_agents(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values().filter(|p| p.is_free_agent())
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn account(&self, team: TeamId) -> Result<&ClubAccount, ValidationError> {
        self.accounts.get(&team).ok_or(ValidationError::UnknownTeam(team))
    }

    pub fn market(&self) -> &MarketBook {
        &self.market
    }

    pub fn phase(&self) -> SeasonPhase {
        self.phase
    }

    pub fn current_matchday(&self) -> u16 {
        self.current_matchday
    }

    pub fn season_seed(&self) -> u64 {
        self.season_seed
    }

    pub fn played_match(&self, fixture: FixtureId) -> Option<&PlayedMatch> {
        self.matches.get(&fixture)
    }

    pub fn played_matches(&self) -> impl Iterator<Item = &PlayedMatch> + '_ {
        self.matches.values()
    }

    pub fn summary(&self) -> Option<&SeasonSummary> {
        self.summary.as_ref()
    }

    pub fn training_log(&self) -> &[TrainingRecord] {
        &self.training_log
    }

    /// Checks every cross-field invariant. Run before committing a staged
    /// mutation and after loading a save.
    pub fn audit(&self) -> Result<(), InvariantViolation> {
        standings::verify(&self.teams, &self.calendar)?;

        for team in &self.teams {
            if !self.accounts.contains_key(&team.id) {
                return Err(InvariantViolation::MissingAccount(team.id));
            }
        }
        FinanceEngine::verify_ledger(&self.accounts)?;

        self.audit_ownership()?;

        for fixture in self.calendar.played() {
            let record = self
                .matches
                .get(&fixture.id)
                .ok_or(InvariantViolation::MissingMatchRecord(fixture.id))?;
            if Some(record.result.score) != fixture.result() || Some(record.result.seed) != fixture.seed() {
                let replayed = record.result.score.as_pair();
                return Err(InvariantViolation::ReplayMismatch {
                    fixture: fixture.id,
                    stored: fixture.result().map(|s| s.as_pair()).unwrap_or_default(),
                    replayed,
                });
            }
        }
        Ok(())
    }

    /// A player is on exactly one roster and points back at it, or on none
    /// and is a free agent.
    fn audit_ownership(&self) -> Result<(), InvariantViolation> {
        let mut listed: BTreeMap<PlayerId, TeamId> = BTreeMap::new();
        for team in &self.teams {
            for id in &team.roster {
                if listed.insert(*id, team.id).is_some() {
                    return Err(InvariantViolation::OwnershipBroken { player: *id });
                }
                match self.players.get(id) {
                    Some(p) if p.team == Some(team.id) => {}
                    _ => return Err(InvariantViolation::OwnershipBroken { player: *id }),
                }
            }
        }
        for (id, player) in &self.players {
            if player.team.is_some() && !listed.contains_key(id) {
                return Err(InvariantViolation::OwnershipBroken { player: *id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared builders for season tests.

    use super::*;
    use crate::models::{Contract, Formation, PlayerAttributes, Position, Stadium};

    pub const SQUAD: [Position; 16] = [
        Position::GK,
        Position::GK,
        Position::LB,
        Position::CB,
        Position::CB,
        Position::RB,
        Position::CB,
        Position::LM,
        Position::CM,
        Position::CM,
        Position::RM,
        Position::CDM,
        Position::ST,
        Position::ST,
        Position::LW,
        Position::RW,
    ];

    /// Club `id` with a 16-man squad rated around `rating`.
    pub fn club(id: u32, rating: u8, balance: i64) -> ClubSetup {
        let team = Team::new(
            TeamId(id),
            format!("Club {}", id),
            format!("C{}", id),
            Formation::F442,
            Stadium::new(25_000, 35),
        );
        let players = SQUAD
            .iter()
            .enumerate()
            .map(|(i, pos)| {
                let r = rating.saturating_sub((i % 5) as u8);
                Player::new(
                    PlayerId(id * 100 + i as u32),
                    format!("Player {}-{}", id, i),
                    20 + (i % 12) as u8,
                    *pos,
                    PlayerAttributes::new(r, r, 60 + (i % 20) as u8, 60),
                    Contract { wage: 20_000, expires_season: 2026 + (i % 3) as u16 },
                    2_000_000,
                )
            })
            .collect();
        ClubSetup {
            team,
            players,
            opening_balance: balance,
            income: IncomeProfile { tv_rights_per_season: 20_000_000, sponsorship_per_season: 5_000_000 },
        }
    }

    pub fn free_agent(id: u32) -> Player {
        Player::new(
            PlayerId(id),
            format!("Free {}", id),
            29,
            Position::CM,
            PlayerAttributes::new(65, 65, 70, 60),
            Contract { wage: 8_000, expires_season: 2025 },
            500_000,
        )
    }

    pub fn setup(teams: u32, seed: u64) -> SeasonSetup {
        SeasonSetup {
            clubs: (1..=teams).map(|i| club(i, 50 + (i * 7 % 40) as u8, 50_000_000)).collect(),
            free_agents: vec![free_agent(9_001), free_agent(9_002)],
            seed,
        }
    }
}
