//! JSON surface for the presentation layer.
//!
//! Snapshots are read-only views of a season; commands go through
//! [`execute_command_json`]. Every payload carries `schema_version`.

pub mod command;
pub mod snapshot;

pub use command::{execute_command_json, CommandRequest, CommandResponse, CommandResponseType, SeasonCommand};
pub use snapshot::{
    fixtures_json, ledger_json, market_json, setup_from_json, standings_json, summary_json,
    FixtureSnapshot, LedgerSnapshot, MarketSnapshot, StandingsSnapshot,
};

pub const SCHEMA_VERSION: u8 = 1;
