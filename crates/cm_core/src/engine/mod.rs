//! Scheduling and match simulation.

pub mod calendar;
pub mod match_engine;
pub mod strength;

pub use calendar::Calendar;
pub use match_engine::{MatchEngine, MatchResult, TeamSheet, STARTING_ELEVEN};
pub use strength::{expected_goals, side_strength, SideStrength};
