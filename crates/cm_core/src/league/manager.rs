//! Season state machine: NotStarted -> InProgress -> Finished.
//!
//! The league manager is the only writer of fixtures, team season stats,
//! form and player match condition. It never touches rosters or money.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::standings::{self, StandingRow};
use crate::config::LeagueConfig;
use crate::engine::{Calendar, MatchEngine, MatchResult, TeamSheet};
use crate::error::{BusinessRuleViolation, InvariantViolation, Result, ValidationError};
use crate::models::{EventKind, FixtureId, FormResult, PlayerId, SeasonStats, TeamId};
use crate::season::{PlayedMatch, SeasonState};

/// Starters never drop below this fitness after a match.
pub const FITNESS_FLOOR: u8 = 40;
pub const BENCH_RECOVERY: u8 = 5;
pub const MORALE_SWING: i16 = 3;
pub const MORALE_RANGE: (i16, i16) = (30, 99);
/// Fitness a player is brought back to when an injury heals.
pub const RECOVERED_FITNESS: u8 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SeasonPhase {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixtureOutcome {
    pub fixture: FixtureId,
    pub result: MatchResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchdayReport {
    pub matchday: u16,
    /// In fixture order.
    pub outcomes: Vec<FixtureOutcome>,
    pub season_finished: bool,
}

/// Terminal snapshot handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeasonSummary {
    pub champion: TeamId,
    pub table: Vec<StandingRow>,
    pub promoted: Vec<TeamId>,
    pub relegated: Vec<TeamId>,
    pub matchdays: u16,
    pub total_goals: u32,
}

/// Seed for one fixture, stable across runs and platforms.
pub fn fixture_seed(season_seed: u64, fixture: FixtureId) -> u64 {
    fxhash::hash64(&(season_seed, fixture.value()))
}

#[derive(Debug, Clone, Default)]
pub struct LeagueManager {
    config: LeagueConfig,
}

impl LeagueManager {
    pub fn new(config: LeagueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    pub fn phase(state: &SeasonState) -> SeasonPhase {
        state.phase
    }

    /// Generates the calendar and opens the season.
    pub fn start_season(&self, state: &mut SeasonState) -> Result<()> {
        if state.phase != SeasonPhase::NotStarted {
            return Err(BusinessRuleViolation::SeasonAlreadyStarted.into());
        }
        self.config.check_team_count(state.teams.len()).map_err(ValidationError::Config)?;

        state.calendar = Calendar::generate(&state.team_ids())?;
        for team in &mut state.teams {
            team.stats = SeasonStats::default();
            team.form.clear();
        }
        state.current_matchday = 0;
        state.phase = SeasonPhase::InProgress;

        log::info!(
            "Season {} started: {} teams, {} matchdays, {} fixtures",
            self.config.season_year,
            state.teams.len(),
            state.calendar.matchday_count(),
            state.calendar.fixtures().len()
        );
        Ok(())
    }

    /// Simulates every fixture of the next matchday and applies the results.
    ///
    /// Fixtures are independent, so they are simulated in parallel; results
    /// are applied in fixture order, which makes the final state identical to
    /// a sequential run.
    pub fn play_matchday(&self, state: &mut SeasonState, engine: &MatchEngine) -> Result<MatchdayReport> {
        match state.phase {
            SeasonPhase::NotStarted => return Err(BusinessRuleViolation::SeasonNotStarted.into()),
            SeasonPhase::Finished => return Err(BusinessRuleViolation::SeasonFinished.into()),
            SeasonPhase::InProgress => {}
        }
        let matchday = state
            .calendar
            .next_unplayed_matchday()
            .ok_or(BusinessRuleViolation::SeasonFinished)?;

        let mut jobs = Vec::new();
        for fixture in state.calendar.matchday(matchday).iter().filter(|f| !f.is_played()) {
            let home = TeamSheet::select(state.team(fixture.home)?, &state.players)?;
            let away = TeamSheet::select(state.team(fixture.away)?, &state.players)?;
            jobs.push((fixture.id, home, away, fixture_seed(state.season_seed, fixture.id)));
        }

        let results: Vec<MatchResult> = jobs
            .par_iter()
            .map(|(_, home, away, seed)| engine.simulate(home, away, *seed))
            .collect::<std::result::Result<Vec<_>, ValidationError>>()?;

        let starters: HashSet<PlayerId> =
            jobs.iter().flat_map(|(_, h, a, _)| h.player_ids().chain(a.player_ids())).collect();
        heal_injuries(state);
        rest_bench(state, &starters);

        let mut outcomes = Vec::with_capacity(results.len());
        for ((fixture, home, away, seed), result) in jobs.into_iter().zip(results) {
            state.calendar.record_result(fixture, result.score, seed)?;
            apply_standings(state, &result)?;
            update_players(state, &home, &away, &result, seed);
            state.matches.insert(
                fixture,
                PlayedMatch { fixture, matchday, home_sheet: home, away_sheet: away, result: result.clone() },
            );
            outcomes.push(FixtureOutcome { fixture, result });
        }

        state.current_matchday = matchday;
        let season_finished = state.calendar.is_complete();
        if season_finished {
            state.phase = SeasonPhase::Finished;
        }

        log::debug!(
            "Matchday {} complete: {} fixtures, {} goals",
            matchday,
            outcomes.len(),
            outcomes.iter().map(|o| o.result.score.home as u32 + o.result.score.away as u32).sum::<u32>()
        );
        Ok(MatchdayReport { matchday, outcomes, season_finished })
    }

    pub fn standings(state: &SeasonState) -> Vec<StandingRow> {
        standings::table(&state.teams)
    }

    pub fn recompute_standings(state: &SeasonState) -> Vec<StandingRow> {
        standings::recomputed_table(&state.teams, &state.calendar)
    }

    pub fn verify_standings(state: &SeasonState) -> std::result::Result<(), InvariantViolation> {
        standings::verify(&state.teams, &state.calendar)
    }

    /// Computes the final table with promotion and relegation cutoffs. Calling
    /// it again returns the stored summary.
    pub fn finalize(&self, state: &mut SeasonState) -> Result<SeasonSummary> {
        match state.phase {
            SeasonPhase::NotStarted => return Err(BusinessRuleViolation::SeasonNotStarted.into()),
            SeasonPhase::InProgress => {
                let remaining = state.calendar.fixtures().iter().filter(|f| !f.is_played()).count();
                return Err(BusinessRuleViolation::SeasonNotFinished { remaining }.into());
            }
            SeasonPhase::Finished => {}
        }
        if let Some(summary) = &state.summary {
            return Ok(summary.clone());
        }

        Self::verify_standings(state)?;
        let table = Self::standings(state);
        let champion = table.first().map(|r| r.team).ok_or(ValidationError::TooFewTeams { found: 0 })?;
        let promoted: Vec<TeamId> =
            table.iter().take(self.config.promotion_spots as usize).map(|r| r.team).collect();
        let relegated: Vec<TeamId> = table
            .iter()
            .rev()
            .take(self.config.relegation_spots as usize)
            .map(|r| r.team)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let total_goals = table.iter().map(|r| r.stats.goals_for).sum();

        let summary = SeasonSummary {
            champion,
            table,
            promoted,
            relegated,
            matchdays: state.calendar.matchday_count(),
            total_goals,
        };
        log::info!(
            "Season {} finished: champion {}, promoted {:?}, relegated {:?}",
            self.config.season_year,
            summary.champion,
            summary.promoted,
            summary.relegated
        );
        state.summary = Some(summary.clone());
        Ok(summary)
    }
}

fn apply_standings(state: &mut SeasonState, result: &MatchResult) -> Result<()> {
    let (h, a) = result.score.as_pair();
    let home = state.team_mut(result.home)?;
    let outcome = home.stats.record(h, a);
    home.push_form(outcome);
    let away = state.team_mut(result.away)?;
    let outcome = away.stats.record(a, h);
    away.push_form(outcome);
    Ok(())
}

/// Every running injury heals by one matchday.
fn heal_injuries(state: &mut SeasonState) {
    for player in state.players.values_mut().filter(|p| p.is_injured()) {
        player.injury_matchdays -= 1;
        if player.injury_matchdays == 0 {
            player.fitness = player.fitness.max(RECOVERED_FITNESS);
        }
    }
}

/// Squad players who did not start recover fitness.
fn rest_bench(state: &mut SeasonState, starters: &HashSet<PlayerId>) {
    for player in state.players.values_mut() {
        if player.team.is_some() && !starters.contains(&player.id) {
            player.fitness = player.fitness.saturating_add(BENCH_RECOVERY).min(100);
        }
    }
}

/// Fitness, appearances, goals, cards, injuries and morale after one match.
/// Draws come from a separate stream of the fixture seed so they never
/// affect the simulated result. Morale moves for the starters only.
fn update_players(
    state: &mut SeasonState,
    home: &TeamSheet,
    away: &TeamSheet,
    result: &MatchResult,
    seed: u64,
) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(1);

    for sheet in [home, away] {
        for starter in &sheet.players {
            let Some(player) = state.players.get_mut(&starter.id) else { continue };
            player.season.appearances += 1;
            let mut drop: u8 = rng.gen_range(3..=7);
            if player.attributes.stamina >= 70 {
                drop -= 1;
            }
            player.fitness = player.fitness.saturating_sub(drop).max(FITNESS_FLOOR.min(player.fitness));
        }
    }

    for event in &result.events {
        let Some(id) = event.player else { continue };
        let Some(player) = state.players.get_mut(&id) else { continue };
        match event.kind {
            EventKind::Goal => {
                player.season.goals += 1;
                player.morale = (player.morale as i16 + MORALE_SWING).min(MORALE_RANGE.1) as u8;
            }
            EventKind::YellowCard => player.season.yellow_cards += 1,
            EventKind::RedCard => player.season.red_cards += 1,
            EventKind::Injury => player.injury_matchdays = rng.gen_range(1..=4),
        }
    }

    let (h, a) = result.score.as_pair();
    for (sheet, outcome) in [(home, FormResult::from_score(h, a)), (away, FormResult::from_score(a, h))] {
        let swing = morale_swing(outcome);
        if swing == 0 {
            continue;
        }
        for id in sheet.player_ids() {
            let Some(player) = state.players.get_mut(&id) else { continue };
            player.morale = (player.morale as i16 + swing).clamp(MORALE_RANGE.0, MORALE_RANGE.1) as u8;
        }
    }
}

fn morale_swing(outcome: FormResult) -> i16 {
    match outcome {
        FormResult::Win => MORALE_SWING,
        FormResult::Draw => 0,
        FormResult::Loss => -MORALE_SWING,
    }
}
