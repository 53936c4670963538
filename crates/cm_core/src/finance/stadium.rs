//! Stadium improvements bought out of a club's account.

use serde::{Deserialize, Serialize};

use super::account::{LedgerCategory, LedgerDelta};
use super::engine::{Accounts, FinanceEngine};
use crate::error::{BusinessRuleViolation, Result};
use crate::models::{Stadium, Team};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StadiumUpgrade {
    /// More seats. Repeatable.
    Capacity,
    /// Lifts attendance. Once only.
    Roof,
    /// Matchday takings per spectator. Once only.
    FanShop,
    /// Flat income per VIP box. Repeatable.
    VipBoxes,
}

impl StadiumUpgrade {
    pub const ALL: [StadiumUpgrade; 4] = [
        StadiumUpgrade::Capacity,
        StadiumUpgrade::Roof,
        StadiumUpgrade::FanShop,
        StadiumUpgrade::VipBoxes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StadiumUpgrade::Capacity => "capacity",
            StadiumUpgrade::Roof => "roof",
            StadiumUpgrade::FanShop => "fan_shop",
            StadiumUpgrade::VipBoxes => "vip_boxes",
        }
    }

    /// Whether `stadium` can still take this upgrade.
    pub fn is_available(&self, stadium: &Stadium) -> bool {
        match self {
            StadiumUpgrade::Roof => !stadium.roof,
            StadiumUpgrade::FanShop => !stadium.fan_shop,
            StadiumUpgrade::Capacity | StadiumUpgrade::VipBoxes => true,
        }
    }
}

/// Price list entry shown to the manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpgradeQuote {
    pub upgrade: StadiumUpgrade,
    pub cost: i64,
    pub available: bool,
}

impl FinanceEngine {
    /// Price of `upgrade` for `stadium` as it stands. A roof is priced per seat.
    pub fn upgrade_cost(&self, stadium: &Stadium, upgrade: StadiumUpgrade) -> i64 {
        let cfg = self.config();
        match upgrade {
            StadiumUpgrade::Capacity => cfg.capacity_upgrade_cost,
            StadiumUpgrade::Roof => (stadium.capacity as i64).saturating_mul(cfg.roof_cost_per_seat),
            StadiumUpgrade::FanShop => cfg.fan_shop_cost,
            StadiumUpgrade::VipBoxes => cfg.vip_upgrade_cost,
        }
    }

    pub fn upgrade_quotes(&self, stadium: &Stadium) -> Vec<UpgradeQuote> {
        StadiumUpgrade::ALL
            .iter()
            .map(|upgrade| UpgradeQuote {
                upgrade: *upgrade,
                cost: self.upgrade_cost(stadium, *upgrade),
                available: upgrade.is_available(stadium),
            })
            .collect()
    }

    /// Pays for `upgrade` and applies it to the team's stadium. Nothing
    /// changes unless the club can afford it.
    pub fn upgrade_stadium(
        &self,
        accounts: &mut Accounts,
        team: &mut Team,
        upgrade: StadiumUpgrade,
        matchday: u16,
    ) -> Result<LedgerDelta> {
        if !upgrade.is_available(&team.stadium) {
            return Err(BusinessRuleViolation::UpgradeUnavailable {
                team: team.id,
                upgrade: upgrade.name(),
            }
            .into());
        }
        let cost = self.upgrade_cost(&team.stadium, upgrade);
        let delta = self.charge(accounts, team.id, LedgerCategory::StadiumUpgrade, cost, matchday)?;

        let cfg = self.config();
        let stadium = &mut team.stadium;
        match upgrade {
            StadiumUpgrade::Capacity => {
                stadium.capacity = stadium.capacity.saturating_add(cfg.capacity_upgrade_seats)
            }
            StadiumUpgrade::Roof => stadium.roof = true,
            StadiumUpgrade::FanShop => stadium.fan_shop = true,
            StadiumUpgrade::VipBoxes => {
                stadium.vip_boxes = stadium.vip_boxes.saturating_add(cfg.vip_upgrade_boxes)
            }
        }
        log::info!("{} bought stadium upgrade {} for {}", team.name, upgrade.name(), cost);
        Ok(delta)
    }
}
