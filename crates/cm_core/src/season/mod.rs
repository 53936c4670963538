//! # Season Orchestration
//!
//! [`Season`] owns the [`SeasonState`] aggregate and one instance of each
//! engine, built once from [`SimConfig`]. Every command runs against a staged
//! copy of the state; the copy replaces the live state only after the
//! invariant audit passes, so a failed command never leaves partial changes.
//!
//! ```rust
//! use cm_core::config::SimConfig;
//! use cm_core::season::Season;
//! # use cm_core::season::SeasonSetup;
//! # fn demo(setup: SeasonSetup) -> cm_core::error::Result<()> {
//! let mut season = Season::new(SimConfig::default(), setup)?;
//! season.start()?;
//! let summary = season.play_to_end()?;
//! println!("Champion: {}", summary.champion);
//! # Ok(())
//! # }
//! ```

pub mod generate;
pub mod state;

pub use generate::generate_setup;
pub use state::{ClubSetup, PlayedMatch, SeasonSetup, SeasonState};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::engine::{MatchEngine, MatchResult};
use crate::error::{BusinessRuleViolation, InvariantViolation, Result, ValidationError};
use crate::finance::{attendance_rate, Attendance, FinanceEngine, LedgerDelta, StadiumUpgrade, UpgradeQuote};
use crate::league::{LeagueManager, MatchdayReport, SeasonPhase, SeasonSummary, StandingRow};
use crate::models::{BidId, FixtureId, ListingId, PlayerId, TeamId};
use crate::save::{self, SaveError};
use crate::training::{TrainingEngine, TrainingKind, TrainingOutcome};
use crate::transfer::{CompletedTransfer, TransferMarket, WindowClosure, WindowKind};

/// Everything that happened on one matchday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchdayOutcome {
    pub report: MatchdayReport,
    pub attendances: Vec<Attendance>,
    pub ledger: Vec<LedgerDelta>,
    /// Clubs flagged insolvent after this matchday.
    pub insolvent: Vec<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_closed: Option<WindowClosure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_opened: Option<WindowKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SeasonSummary>,
}

#[derive(Debug, Clone)]
pub struct Season {
    config: SimConfig,
    match_engine: MatchEngine,
    league: LeagueManager,
    finance: FinanceEngine,
    market: TransferMarket,
    training: TrainingEngine,
    state: SeasonState,
}

impl Season {
    /// Validates the configuration and the clubs, and opens every account.
    pub fn new(config: SimConfig, setup: SeasonSetup) -> Result<Self> {
        config.check()?;
        config.league.check_team_count(setup.clubs.len()).map_err(ValidationError::Config)?;

        let mut season = Self::with_engines(config, SeasonState::from_setup(&setup)?);
        for club in &setup.clubs {
            season.finance.open_account(
                &mut season.state.accounts,
                club.team.id,
                club.opening_balance,
                club.income,
            )?;
        }
        season.state.audit()?;
        Ok(season)
    }

    /// Rebuilds a season around previously saved state.
    pub fn from_state(config: SimConfig, state: SeasonState) -> Result<Self> {
        config.check()?;
        state.audit()?;
        Ok(Self::with_engines(config, state))
    }

    fn with_engines(config: SimConfig, state: SeasonState) -> Self {
        Self {
            match_engine: MatchEngine::new(config.match_engine.clone()),
            league: LeagueManager::new(config.league.clone()),
            finance: FinanceEngine::new(config.finance.clone()),
            market: TransferMarket::new(config.transfer.clone(), config.league.season_year),
            training: TrainingEngine::new(config.training.clone()),
            config,
            state,
        }
    }

    pub fn state(&self) -> &SeasonState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> SeasonPhase {
        self.state.phase
    }

    pub fn standings(&self) -> Vec<StandingRow> {
        LeagueManager::standings(&self.state)
    }

    /// Money `team` may commit to transfers right now.
    pub fn available_funds(&self, team: TeamId) -> Result<i64> {
        self.finance.available_funds(&self.state.accounts, team)
    }

    pub fn audit(&self) -> std::result::Result<(), InvariantViolation> {
        self.state.audit()
    }

    /// Runs `op` on a copy of the state and commits it if the audit passes.
    fn transact<T>(&mut self, op: impl FnOnce(&Self, &mut SeasonState) -> Result<T>) -> Result<T> {
        let mut staged = self.state.clone();
        let out = op(self, &mut staged)?;
        if let Err(violation) = staged.audit() {
            log::error!("Invariant violation, mutation aborted: {}", violation);
            return Err(violation.into());
        }
        self.state = staged;
        Ok(out)
    }

    // ========================================================================
    // Progression
    // ========================================================================

    /// Generates the calendar and opens the summer transfer window.
    pub fn start(&mut self) -> Result<()> {
        self.transact(|season, state| {
            season.league.start_season(state)?;
            let length = season.config.transfer.summer_window_matchdays;
            if length > 0 {
                season.market.open_window(state, WindowKind::Summer, length);
            }
            Ok(())
        })
    }

    /// Plays the next matchday, books its money and advances the transfer
    /// window cadence. The last matchday also settles the season.
    pub fn advance_matchday(&mut self) -> Result<MatchdayOutcome> {
        self.transact(|season, state| season.run_matchday(state))
    }

    fn run_matchday(&self, state: &mut SeasonState) -> Result<MatchdayOutcome> {
        let matchday = match state.phase {
            SeasonPhase::NotStarted => return Err(BusinessRuleViolation::SeasonNotStarted.into()),
            SeasonPhase::Finished => return Err(BusinessRuleViolation::SeasonFinished.into()),
            SeasonPhase::InProgress => state
                .calendar
                .next_unplayed_matchday()
                .ok_or(BusinessRuleViolation::SeasonFinished)?,
        };

        // Crowds come for the form a team had before kick-off.
        let mut attendances = Vec::new();
        for fixture in state.calendar.matchday(matchday) {
            let home = state.team(fixture.home)?;
            attendances.push(Attendance {
                fixture: fixture.id,
                home: home.id,
                rate: attendance_rate(home, &self.config.finance),
            });
        }

        let report = self.league.play_matchday(state, &self.match_engine)?;

        let count = state.calendar.matchday_count();
        let mut ledger =
            self.finance.apply_matchday(&mut state.accounts, &state.teams, matchday, count, &attendances)?;
        ledger.extend(self.finance.apply_periodic_wages(
            &mut state.accounts,
            &state.teams,
            &state.players,
            matchday,
        )?);

        let (window_closed, window_opened) = self.advance_windows(state, matchday, count);

        let summary = if report.season_finished {
            let summary = self.league.finalize(state)?;
            ledger.extend(self.finance.settle_season(&mut state.accounts, &summary.table, matchday)?);
            Some(summary)
        } else {
            None
        };

        let insolvent =
            state.accounts.values().filter(|a| a.is_insolvent()).map(|a| a.team()).collect();

        log::info!("Matchday {}/{} played", matchday, count);
        Ok(MatchdayOutcome { report, attendances, ledger, insolvent, window_closed, window_opened, summary })
    }

    /// Closes a window whose last matchday has passed and opens the winter
    /// window at the halfway point.
    fn advance_windows(
        &self,
        state: &mut SeasonState,
        matchday: u16,
        matchday_count: u16,
    ) -> (Option<WindowClosure>, Option<WindowKind>) {
        let mut closed = None;
        if let Some(window) = state.market.window() {
            if matchday >= window.closes_after || matchday >= matchday_count {
                closed = Some(self.market.close_window(state));
            }
        }

        let mut opened = None;
        let winter = self.config.transfer.winter_window_matchdays;
        if winter > 0
            && matchday == matchday_count / 2
            && matchday < matchday_count
            && !state.market.is_window_open()
        {
            self.market.open_window(state, WindowKind::Winter, winter);
            opened = Some(WindowKind::Winter);
        }
        (closed, opened)
    }

    /// Plays every remaining matchday and returns the final summary.
    pub fn play_to_end(&mut self) -> Result<SeasonSummary> {
        while self.state.phase == SeasonPhase::InProgress {
            self.advance_matchday()?;
        }
        match &self.state.summary {
            Some(summary) => Ok(summary.clone()),
            None => Err(BusinessRuleViolation::SeasonNotStarted.into()),
        }
    }

    /// Re-simulates a played fixture from its stored seed and team sheets and
    /// checks that it reproduces the recorded result.
    pub fn replay_fixture(&self, fixture: FixtureId) -> Result<MatchResult> {
        let stored = self
            .state
            .calendar
            .fixture(fixture)
            .ok_or(ValidationError::UnknownFixture(fixture))?;
        let score = stored.result().ok_or(ValidationError::FixtureNotPlayed(fixture))?;
        let record = self
            .state
            .played_match(fixture)
            .ok_or(InvariantViolation::MissingMatchRecord(fixture))?;

        let replayed =
            self.match_engine.simulate(&record.home_sheet, &record.away_sheet, record.result.seed)?;
        if replayed.score != score || replayed != record.result {
            return Err(InvariantViolation::ReplayMismatch {
                fixture,
                stored: score.as_pair(),
                replayed: replayed.score.as_pair(),
            }
            .into());
        }
        Ok(replayed)
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    pub fn create_listing(&mut self, seller: TeamId, player: PlayerId, asking_price: i64) -> Result<ListingId> {
        self.transact(|season, state| season.market.create_listing(state, seller, player, asking_price))
    }

    pub fn withdraw_listing(&mut self, seller: TeamId, listing: ListingId) -> Result<()> {
        self.transact(|season, state| season.market.withdraw_listing(state, seller, listing))
    }

    pub fn place_bid(&mut self, buyer: TeamId, listing: ListingId, amount: i64) -> Result<BidId> {
        self.transact(|season, state| season.market.place_bid(state, &season.finance, buyer, listing, amount))
    }

    pub fn counter_bid(&mut self, acting: TeamId, bid: BidId, amount: i64) -> Result<BidId> {
        self.transact(|season, state| season.market.counter_bid(state, &season.finance, acting, bid, amount))
    }

    pub fn reject_bid(&mut self, acting: TeamId, bid: BidId) -> Result<()> {
        self.transact(|season, state| season.market.reject_bid(state, acting, bid))
    }

    pub fn accept_bid(&mut self, acting: TeamId, bid: BidId) -> Result<CompletedTransfer> {
        self.transact(|season, state| season.market.accept_bid(state, &season.finance, acting, bid))
    }

    pub fn resolve_listing(&mut self, seller: TeamId, listing: ListingId) -> Result<CompletedTransfer> {
        self.transact(|season, state| season.market.resolve_listing(state, &season.finance, seller, listing))
    }

    pub fn sign_free_agent(&mut self, team: TeamId, player: PlayerId, fee: i64) -> Result<CompletedTransfer> {
        self.transact(|season, state| season.market.sign_free_agent(state, &season.finance, team, player, fee))
    }

    // ========================================================================
    // Club management
    // ========================================================================

    pub fn train_player(&mut self, team: TeamId, player: PlayerId, kind: TrainingKind) -> Result<TrainingOutcome> {
        self.transact(|season, state| season.training.train_player(state, &season.finance, team, player, kind))
    }

    pub fn train_squad(&mut self, team: TeamId) -> Result<TrainingOutcome> {
        self.transact(|season, state| season.training.train_squad(state, &season.finance, team))
    }

    /// Buys a stadium upgrade. Allowed at any point before the season ends.
    pub fn upgrade_stadium(&mut self, team: TeamId, upgrade: StadiumUpgrade) -> Result<LedgerDelta> {
        self.transact(|season, state| {
            if state.phase == SeasonPhase::Finished {
                return Err(BusinessRuleViolation::SeasonFinished.into());
            }
            let matchday = state.current_matchday;
            let club = state.teams.iter_mut().find(|t| t.id == team).ok_or(ValidationError::UnknownTeam(team))?;
            season.finance.upgrade_stadium(&mut state.accounts, club, upgrade, matchday)
        })
    }

    pub fn upgrade_quotes(&self, team: TeamId) -> Result<Vec<UpgradeQuote>> {
        let club = self.state.team(team)?;
        Ok(self.finance.upgrade_quotes(&club.stadium))
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> std::result::Result<(), SaveError> {
        save::save_to_path(path, &self.config, &self.state)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> std::result::Result<Self, SaveError> {
        let saved = save::load_from_path(path)?;
        Self::from_state(saved.config, saved.state).map_err(SaveError::from)
    }
}
