//! Standings and season progression.

pub mod manager;
pub mod standings;

pub use manager::{
    fixture_seed, FixtureOutcome, LeagueManager, MatchdayReport, SeasonPhase, SeasonSummary,
};
pub use standings::StandingRow;
