//! Club economics.
//!
//! The finance engine is the only writer of [`ClubAccount`] balances. Every
//! operation validates its whole input before posting anything, so a rejected
//! call leaves all accounts untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::account::{ClubAccount, IncomeProfile, LedgerCategory, LedgerDelta};
use crate::config::FinanceConfig;
use crate::error::{BusinessRuleViolation, InvariantViolation, Result, ValidationError};
use crate::league::StandingRow;
use crate::models::{FixtureId, Player, PlayerId, Team, TeamId, FORM_WINDOW};

pub type Accounts = BTreeMap<TeamId, ClubAccount>;

/// Share of the home stadium filled for one fixture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Attendance {
    pub fixture: FixtureId,
    pub home: TeamId,
    pub rate: f32,
}

/// Expected fill rate for a home match: base rate plus bonuses for recent
/// wins and a roof, capped at a full house, then scaled by how far the
/// ticket price sits above the reference price.
pub fn attendance_rate(team: &Team, cfg: &FinanceConfig) -> f32 {
    let form_bonus = team.recent_wins() as f32 / FORM_WINDOW as f32 * cfg.form_attendance_bonus;
    let roof_bonus = if team.stadium.roof { cfg.roof_attendance_bonus } else { 0.0 };
    let demand = (cfg.base_attendance + form_bonus + roof_bonus).min(1.0);
    let over_reference = (team.stadium.ticket_price - cfg.reference_ticket_price) as f32;
    let price_effect = (1.0 - over_reference * cfg.price_sensitivity).max(cfg.min_price_effect);
    (demand * price_effect).clamp(0.0, 1.0)
}

/// Equal share of a season total for one matchday. The last matchday also
/// receives the rounding remainder so the season adds up exactly.
fn installment(season_total: i64, matchdays: u16, matchday: u16) -> i64 {
    if matchdays == 0 {
        return 0;
    }
    let share = season_total / matchdays as i64;
    if matchday == matchdays {
        season_total - share * (matchdays as i64 - 1)
    } else {
        share
    }
}

#[derive(Debug, Clone, Default)]
pub struct FinanceEngine {
    config: FinanceConfig,
}

impl FinanceEngine {
    pub fn new(config: FinanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FinanceConfig {
        &self.config
    }

    pub fn open_account(
        &self,
        accounts: &mut Accounts,
        team: TeamId,
        opening_balance: i64,
        income: IncomeProfile,
    ) -> std::result::Result<(), ValidationError> {
        if accounts.contains_key(&team) {
            return Err(ValidationError::DuplicateTeam(team));
        }
        let mut account = ClubAccount::open(team, opening_balance, income);
        account.refresh_solvency(self.config.overdraft_limit);
        accounts.insert(team, account);
        Ok(())
    }

    /// Money a club may spend at its own discretion: the positive balance,
    /// or nothing while insolvent. The overdraft only absorbs fixed costs.
    pub fn available_funds(&self, accounts: &Accounts, team: TeamId) -> Result<i64> {
        let account = accounts.get(&team).ok_or(ValidationError::UnknownTeam(team))?;
        if account.is_insolvent() {
            return Ok(0);
        }
        Ok(account.balance().max(0))
    }

    /// Fails with a business-rule violation when `team` cannot spend `amount`.
    pub fn ensure_can_spend(&self, accounts: &Accounts, team: TeamId, amount: i64) -> Result<()> {
        let account = accounts.get(&team).ok_or(ValidationError::UnknownTeam(team))?;
        if account.is_insolvent() {
            return Err(BusinessRuleViolation::ClubInsolvent(team).into());
        }
        let available = self.available_funds(accounts, team)?;
        if amount > available {
            return Err(BusinessRuleViolation::InsufficientFunds {
                team,
                required: amount,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Ticket, fan shop and VIP income for each home side plus the
    /// per-matchday share of TV rights and sponsorship, minus stadium upkeep,
    /// for every club.
    pub fn apply_matchday(
        &self,
        accounts: &mut Accounts,
        teams: &[Team],
        matchday: u16,
        matchday_count: u16,
        attendances: &[Attendance],
    ) -> Result<Vec<LedgerDelta>> {
        let mut postings: Vec<(TeamId, LedgerCategory, i64)> = Vec::new();

        for attendance in attendances {
            if !(0.0..=1.0).contains(&attendance.rate) {
                return Err(ValidationError::AttendanceOutOfRange(attendance.rate).into());
            }
            let team = teams
                .iter()
                .find(|t| t.id == attendance.home)
                .ok_or(ValidationError::UnknownTeam(attendance.home))?;
            let spectators = (team.stadium.capacity as f64 * attendance.rate as f64).floor() as i64;
            let income = spectators
                .checked_mul(team.stadium.ticket_price)
                .ok_or(InvariantViolation::BalanceOverflow(team.id))?;
            postings.push((team.id, LedgerCategory::Tickets, income));

            if team.stadium.fan_shop {
                let takings =
                    (spectators as f64 * self.config.fan_shop_spend_per_spectator as f64).floor();
                postings.push((team.id, LedgerCategory::FanShop, takings as i64));
            }
            let vip = (team.stadium.vip_boxes as i64)
                .checked_mul(self.config.vip_box_income)
                .ok_or(InvariantViolation::BalanceOverflow(team.id))?;
            postings.push((team.id, LedgerCategory::VipBoxes, vip));
        }

        for team in teams {
            let account = accounts.get(&team.id).ok_or(InvariantViolation::MissingAccount(team.id))?;
            let income = account.income();
            postings.push((
                team.id,
                LedgerCategory::TvRights,
                installment(income.tv_rights_per_season, matchday_count, matchday),
            ));
            postings.push((
                team.id,
                LedgerCategory::Sponsorship,
                installment(income.sponsorship_per_season, matchday_count, matchday),
            ));
            let upkeep = (team.stadium.capacity as f64 * self.config.upkeep_per_seat as f64).round();
            postings.push((team.id, LedgerCategory::StadiumUpkeep, -(upkeep as i64)));
        }

        self.post_all(accounts, matchday, postings)
    }

    /// Pays every club's wage bill when `matchday` closes a pay period.
    pub fn apply_periodic_wages(
        &self,
        accounts: &mut Accounts,
        teams: &[Team],
        players: &BTreeMap<PlayerId, Player>,
        matchday: u16,
    ) -> Result<Vec<LedgerDelta>> {
        let period = self.config.pay_period_matchdays.max(1);
        if matchday == 0 || matchday % period != 0 {
            return Ok(Vec::new());
        }

        let mut postings = Vec::with_capacity(teams.len());
        for team in teams {
            let mut bill: i64 = 0;
            for id in &team.roster {
                let player = players.get(id).ok_or(ValidationError::UnknownPlayer(*id))?;
                bill = bill
                    .checked_add(player.contract.wage)
                    .ok_or(InvariantViolation::BalanceOverflow(team.id))?;
            }
            postings.push((team.id, LedgerCategory::Wages, -bill));
        }
        self.post_all(accounts, matchday, postings)
    }

    /// Prize money by final table position.
    pub fn settle_season(
        &self,
        accounts: &mut Accounts,
        table: &[StandingRow],
        matchday: u16,
    ) -> Result<Vec<LedgerDelta>> {
        let postings = table
            .iter()
            .map(|row| {
                (row.team, LedgerCategory::PrizeMoney, self.config.prize_for_position(row.position))
            })
            .collect();
        let deltas = self.post_all(accounts, matchday, postings)?;
        log::info!("Season settled: {} prize payments", deltas.len());
        Ok(deltas)
    }

    /// Moves `amount` from `payer` to `payee` as one unit. A `None` payee is a
    /// signing fee that leaves the league. Nothing is posted unless both
    /// sides can be posted.
    pub fn transfer_funds(
        &self,
        accounts: &mut Accounts,
        payer: TeamId,
        payee: Option<TeamId>,
        amount: i64,
        matchday: u16,
    ) -> Result<Vec<LedgerDelta>> {
        if amount <= 0 {
            return Err(ValidationError::NonPositivePrice(amount).into());
        }
        if let Some(payee) = payee {
            if !accounts.contains_key(&payee) {
                return Err(ValidationError::UnknownTeam(payee).into());
            }
        }
        self.ensure_can_spend(accounts, payer, amount)?;

        let mut postings = Vec::with_capacity(2);
        match payee {
            Some(payee) => {
                postings.push((payer, LedgerCategory::TransferFeePaid, -amount));
                postings.push((payee, LedgerCategory::TransferFeeReceived, amount));
            }
            None => postings.push((payer, LedgerCategory::SigningFee, -amount)),
        }
        self.post_all(accounts, matchday, postings)
    }

    /// Discretionary spend that leaves the league, such as a stadium upgrade
    /// or a training session. Refused unless the club can afford it.
    pub fn charge(
        &self,
        accounts: &mut Accounts,
        team: TeamId,
        category: LedgerCategory,
        amount: i64,
        matchday: u16,
    ) -> Result<LedgerDelta> {
        if amount <= 0 {
            return Err(ValidationError::NonPositivePrice(amount).into());
        }
        self.ensure_can_spend(accounts, team, amount)?;
        let mut deltas = self.post_all(accounts, matchday, vec![(team, category, -amount)])?;
        deltas.pop().ok_or_else(|| InvariantViolation::MissingAccount(team).into())
    }

    /// Every account's balance equals the sum of its ledger.
    pub fn verify_ledger(accounts: &Accounts) -> std::result::Result<(), InvariantViolation> {
        for (team, account) in accounts {
            if account.team() != *team {
                return Err(InvariantViolation::MissingAccount(*team));
            }
            account.verify()?;
        }
        Ok(())
    }

    /// Posts a batch after checking that every posting fits. Zero amounts are
    /// skipped.
    fn post_all(
        &self,
        accounts: &mut Accounts,
        matchday: u16,
        postings: Vec<(TeamId, LedgerCategory, i64)>,
    ) -> Result<Vec<LedgerDelta>> {
        let mut projected: BTreeMap<TeamId, i64> = BTreeMap::new();
        for (team, _, amount) in &postings {
            let account = accounts.get(team).ok_or(InvariantViolation::MissingAccount(*team))?;
            let current = projected.get(team).copied().unwrap_or(account.balance());
            let next = current.checked_add(*amount).ok_or(InvariantViolation::BalanceOverflow(*team))?;
            projected.insert(*team, next);
        }

        let mut deltas = Vec::with_capacity(postings.len());
        for (team, category, amount) in postings {
            if amount == 0 {
                continue;
            }
            let account = accounts.get_mut(&team).ok_or(InvariantViolation::MissingAccount(team))?;
            deltas.push(account.post(matchday, category, amount)?);
        }

        for team in projected.keys() {
            let Some(account) = accounts.get_mut(team) else { continue };
            match account.refresh_solvency(self.config.overdraft_limit) {
                Some(true) => log::warn!(
                    "Club {} is insolvent (balance {}, overdraft limit {})",
                    team,
                    account.balance(),
                    self.config.overdraft_limit
                ),
                Some(false) => log::info!("Club {} is solvent again", team),
                None => {}
            }
        }
        Ok(deltas)
    }
}
