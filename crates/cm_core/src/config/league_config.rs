use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct LeagueConfig {
    /// First calendar year of the season, used for contract expiry (default: 2025)
    #[validate(range(min = 1900, max = 3000))]
    pub season_year: u16,
    /// Top-K teams reported as promoted (default: 2)
    pub promotion_spots: u8,
    /// Bottom-K teams reported as relegated (default: 2)
    pub relegation_spots: u8,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self { season_year: 2025, promotion_spots: 2, relegation_spots: 2 }
    }
}

impl LeagueConfig {
    pub(crate) fn check(&self) -> Result<(), String> {
        Validate::validate(self).map_err(|e| e.to_string())
    }

    /// Cutoffs must leave the promoted and relegated groups disjoint.
    pub fn check_team_count(&self, teams: usize) -> Result<(), String> {
        let spots = self.promotion_spots as usize + self.relegation_spots as usize;
        if spots > teams {
            return Err(format!(
                "{} promotion + {} relegation spots exceed {} teams",
                self.promotion_spots, self.relegation_spots, teams
            ));
        }
        Ok(())
    }
}
