use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::models::TeamId;

/// What a ledger entry was for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCategory {
    OpeningBalance,
    Tickets,
    TvRights,
    Sponsorship,
    PrizeMoney,
    Wages,
    StadiumUpkeep,
    TransferFeeReceived,
    TransferFeePaid,
    SigningFee,
    FanShop,
    VipBoxes,
    StadiumUpgrade,
    Training,
}

impl LedgerCategory {
    /// Outgoings a club chooses to make, refused while insolvent.
    pub fn is_discretionary(&self) -> bool {
        matches!(
            self,
            LedgerCategory::TransferFeePaid
                | LedgerCategory::SigningFee
                | LedgerCategory::StadiumUpgrade
                | LedgerCategory::Training
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub matchday: u16,
    pub category: LedgerCategory,
    /// Signed: income positive, expenses negative.
    pub amount: i64,
    pub balance_after: i64,
}

/// A single posted entry together with the club it was posted to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerDelta {
    pub team: TeamId,
    pub entry: LedgerEntry,
}

/// Recurring income agreed before the season, paid out evenly per matchday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IncomeProfile {
    pub tv_rights_per_season: i64,
    pub sponsorship_per_season: i64,
}

/// A club's money. The balance only ever moves through [`ClubAccount::post`],
/// which appends the matching ledger entry, so `balance` is always the sum
/// of the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClubAccount {
    team: TeamId,
    balance: i64,
    ledger: Vec<LedgerEntry>,
    insolvent: bool,
    income: IncomeProfile,
}

impl ClubAccount {
    pub fn open(team: TeamId, opening_balance: i64, income: IncomeProfile) -> Self {
        Self {
            team,
            balance: opening_balance,
            ledger: vec![LedgerEntry {
                matchday: 0,
                category: LedgerCategory::OpeningBalance,
                amount: opening_balance,
                balance_after: opening_balance,
            }],
            insolvent: false,
            income,
        }
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    pub fn is_insolvent(&self) -> bool {
        self.insolvent
    }

    pub fn income(&self) -> IncomeProfile {
        self.income
    }

    /// Sum of every ledger entry, computed wide so it cannot overflow.
    pub fn ledger_sum(&self) -> i128 {
        self.ledger.iter().map(|e| e.amount as i128).sum()
    }

    pub fn total(&self, category: LedgerCategory) -> i64 {
        self.ledger.iter().filter(|e| e.category == category).map(|e| e.amount).sum()
    }

    pub fn entries_for(&self, matchday: u16) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.ledger.iter().filter(move |e| e.matchday == matchday)
    }

    /// Balance after applying `amount`, without applying it.
    pub(crate) fn preview(&self, amount: i64) -> Result<i64, InvariantViolation> {
        self.balance.checked_add(amount).ok_or(InvariantViolation::BalanceOverflow(self.team))
    }

    pub(crate) fn post(
        &mut self,
        matchday: u16,
        category: LedgerCategory,
        amount: i64,
    ) -> Result<LedgerDelta, InvariantViolation> {
        let balance_after = self.preview(amount)?;
        let entry = LedgerEntry { matchday, category, amount, balance_after };
        self.balance = balance_after;
        self.ledger.push(entry);
        Ok(LedgerDelta { team: self.team, entry })
    }

    /// Re-evaluates the insolvency flag. Returns the new flag when it changed.
    pub(crate) fn refresh_solvency(&mut self, overdraft_limit: i64) -> Option<bool> {
        let insolvent = self.balance < -overdraft_limit;
        if insolvent == self.insolvent {
            return None;
        }
        self.insolvent = insolvent;
        Some(insolvent)
    }

    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let sum = self.ledger_sum();
        if sum != self.balance as i128 {
            return Err(InvariantViolation::LedgerMismatch {
                team: self.team,
                balance: self.balance,
                ledger_sum: i64::try_from(sum).unwrap_or(i64::MAX),
            });
        }
        Ok(())
    }
}
