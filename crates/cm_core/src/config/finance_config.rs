use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct FinanceConfig {
    /// How far below zero a balance may go before the club is insolvent (default: 5_000_000)
    pub overdraft_limit: i64,
    /// Wages are paid every N matchdays (default: 1)
    #[validate(range(min = 1, max = 52))]
    pub pay_period_matchdays: u16,
    /// Stadium upkeep per seat per matchday (default: 0.5)
    #[validate(range(min = 0.0, max = 100.0))]
    pub upkeep_per_seat: f32,
    /// Fill rate before form and price effects (default: 0.75)
    #[validate(range(min = 0.0, max = 1.0))]
    pub base_attendance: f32,
    /// Extra fill rate for five wins in the last five (default: 0.15)
    #[validate(range(min = 0.0, max = 1.0))]
    pub form_attendance_bonus: f32,
    /// Ticket price with a neutral price effect (default: 30)
    pub reference_ticket_price: i64,
    /// Fill-rate change per currency unit above the reference price (default: 0.01)
    #[validate(range(min = 0.0, max = 1.0))]
    pub price_sensitivity: f32,
    /// Lowest price effect multiplier (default: 0.5)
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_price_effect: f32,
    /// Prize money by final position, index 0 = champion. Missing positions get nothing.
    pub prize_money: Vec<i64>,

    /// Extra fill rate for a covered stadium (default: 0.05)
    #[validate(range(min = 0.0, max = 1.0))]
    pub roof_attendance_bonus: f32,
    /// Fan shop takings per spectator on a home matchday (default: 2.5)
    #[validate(range(min = 0.0, max = 1000.0))]
    pub fan_shop_spend_per_spectator: f32,
    /// Income per VIP box per home matchday (default: 500)
    pub vip_box_income: i64,
    /// Price of one capacity expansion (default: 5_000_000)
    pub capacity_upgrade_cost: i64,
    /// Seats added by one capacity expansion (default: 1_000)
    #[validate(range(min = 1))]
    pub capacity_upgrade_seats: u32,
    /// Roof price per seat of current capacity (default: 200)
    pub roof_cost_per_seat: i64,
    /// Price of building the fan shop (default: 2_000_000)
    pub fan_shop_cost: i64,
    /// Price of one VIP expansion (default: 1_000_000)
    pub vip_upgrade_cost: i64,
    /// Boxes added by one VIP expansion (default: 10)
    #[validate(range(min = 1))]
    pub vip_upgrade_boxes: u32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            overdraft_limit: 5_000_000,
            pay_period_matchdays: 1,
            upkeep_per_seat: 0.5,
            base_attendance: 0.75,
            form_attendance_bonus: 0.15,
            reference_ticket_price: 30,
            price_sensitivity: 0.01,
            min_price_effect: 0.5,
            prize_money: vec![
                30_000_000, 25_000_000, 21_000_000, 18_000_000, 15_000_000, 12_000_000,
                10_000_000, 8_000_000, 6_000_000, 5_000_000, 4_000_000, 3_000_000,
            ],
            roof_attendance_bonus: 0.05,
            fan_shop_spend_per_spectator: 2.5,
            vip_box_income: 500,
            capacity_upgrade_cost: 5_000_000,
            capacity_upgrade_seats: 1_000,
            roof_cost_per_seat: 200,
            fan_shop_cost: 2_000_000,
            vip_upgrade_cost: 1_000_000,
            vip_upgrade_boxes: 10,
        }
    }
}

impl FinanceConfig {
    pub(crate) fn check(&self) -> Result<(), String> {
        Validate::validate(self).map_err(|e| e.to_string())?;
        if self.overdraft_limit < 0 {
            return Err(format!("overdraft_limit must not be negative, got {}", self.overdraft_limit));
        }
        if self.reference_ticket_price < 0 {
            return Err("reference_ticket_price must not be negative".to_string());
        }
        if let Some(bad) = self.prize_money.iter().find(|p| **p < 0) {
            return Err(format!("prize money must not be negative, got {}", bad));
        }
        let prices = [
            ("vip_box_income", self.vip_box_income),
            ("capacity_upgrade_cost", self.capacity_upgrade_cost),
            ("roof_cost_per_seat", self.roof_cost_per_seat),
            ("fan_shop_cost", self.fan_shop_cost),
            ("vip_upgrade_cost", self.vip_upgrade_cost),
        ];
        if let Some((name, value)) = prices.iter().find(|(_, v)| *v < 0) {
            return Err(format!("{} must not be negative, got {}", name, value));
        }
        Ok(())
    }

    pub fn prize_for_position(&self, position: usize) -> i64 {
        position
            .checked_sub(1)
            .and_then(|idx| self.prize_money.get(idx))
            .copied()
            .unwrap_or(0)
    }
}
