//! Club accounts, matchday revenue, wages, stadium upgrades and season
//! settlement.

pub mod account;
pub mod engine;
pub mod stadium;

pub use account::{ClubAccount, IncomeProfile, LedgerCategory, LedgerDelta, LedgerEntry};
pub use engine::{attendance_rate, Accounts, Attendance, FinanceEngine};
pub use stadium::{StadiumUpgrade, UpgradeQuote};
