//! # cm_core - Deterministic Football Club Season Simulation
//!
//! Simulates a league season for a set of clubs: fixture calendar, match
//! results, standings, club finances, training and a transfer market, all
//! driven from a single season seed.
//!
//! ## Features
//! - Same setup + same seed = same season, bit for bit
//! - Every command is all-or-nothing; invariants are audited before commit
//! - Every played fixture can be replayed from its stored seed
//! - Compressed, checksummed save files
//! - JSON API for a presentation layer
//!
//! ```rust
//! use cm_core::{generate_setup, Season, SimConfig};
//!
//! let mut season = Season::new(SimConfig::default(), generate_setup(6, 42)).unwrap();
//! season.start().unwrap();
//! let summary = season.play_to_end().unwrap();
//! assert_eq!(summary.table.len(), 6);
//! ```

// Doc formatting lints - purely cosmetic, fix incrementally
#![allow(clippy::doc_lazy_continuation)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]
// Engine entry points take the state plus several ids and amounts
#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod finance;
pub mod league;
pub mod models;
pub mod save;
pub mod season;
pub mod training;
pub mod transfer;

pub use config::SimConfig;
pub use engine::{Calendar, MatchEngine, MatchResult, TeamSheet};
pub use error::{BusinessRuleViolation, InvariantViolation, Result, SimError, ValidationError};
pub use finance::FinanceEngine;
pub use league::{LeagueManager, SeasonPhase, SeasonSummary, StandingRow};
pub use save::{SaveError, SeasonSave};
pub use season::{generate_setup, ClubSetup, MatchdayOutcome, Season, SeasonSetup, SeasonState};
pub use training::{TrainingEngine, TrainingKind};
pub use transfer::TransferMarket;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
