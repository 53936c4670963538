use serde::{Deserialize, Serialize};
use validator::Validate;

/// Whether a selling club may accept a bid below its asking price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcceptancePolicy {
    /// Only bids at or above the asking price can be accepted.
    #[default]
    AskingPriceOnly,
    /// The seller may explicitly accept any bid (manager override).
    ManagerDiscretion,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct TransferConfig {
    pub acceptance_policy: AcceptancePolicy,
    /// Summer window stays open until this many matchdays are complete (default: 4)
    #[validate(range(max = 100))]
    pub summer_window_matchdays: u16,
    /// Winter window length in matchdays, opening at mid-season (default: 4)
    #[validate(range(max = 100))]
    pub winter_window_matchdays: u16,
    /// Buyer squads may not grow beyond this (default: 25)
    pub max_squad_size: usize,
    /// Seller squads may not shrink below this (default: 11)
    pub min_squad_size: usize,
    /// Seasons added to a transferred player's contract (default: 3)
    #[validate(range(max = 10))]
    pub contract_extension_seasons: u16,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            acceptance_policy: AcceptancePolicy::AskingPriceOnly,
            summer_window_matchdays: 4,
            winter_window_matchdays: 4,
            max_squad_size: 25,
            min_squad_size: 11,
            contract_extension_seasons: 3,
        }
    }
}

impl TransferConfig {
    pub(crate) fn check(&self) -> Result<(), String> {
        Validate::validate(self).map_err(|e| e.to_string())?;
        if self.min_squad_size > self.max_squad_size {
            return Err(format!(
                "min_squad_size {} exceeds max_squad_size {}",
                self.min_squad_size, self.max_squad_size
            ));
        }
        Ok(())
    }
}
