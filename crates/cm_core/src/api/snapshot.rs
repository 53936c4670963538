use serde::Serialize;

use super::SCHEMA_VERSION;
use crate::finance::LedgerEntry;
use crate::league::{SeasonPhase, StandingRow};
use crate::models::{FixtureId, Score, TeamId};
use crate::season::{Season, SeasonSetup};
use crate::transfer::{Bid, CompletedTransfer, TransferListing, TransferWindow};

#[derive(Debug, Serialize)]
pub struct StandingsSnapshot<'a> {
    pub schema_version: u8,
    pub phase: SeasonPhase,
    pub matchday: u16,
    pub matchday_count: u16,
    pub rows: Vec<StandingRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub champion: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct FixtureSnapshot {
    pub id: FixtureId,
    pub matchday: u16,
    pub home: TeamId,
    pub away: TeamId,
    pub home_name: String,
    pub away_name: String,
    pub result: Option<Score>,
}

#[derive(Debug, Serialize)]
struct FixtureList {
    schema_version: u8,
    fixtures: Vec<FixtureSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct LedgerSnapshot<'a> {
    pub schema_version: u8,
    pub team: TeamId,
    pub balance: i64,
    pub insolvent: bool,
    pub available_funds: i64,
    pub entries: &'a [LedgerEntry],
}

#[derive(Debug, Serialize)]
pub struct MarketSnapshot<'a> {
    pub schema_version: u8,
    pub window: Option<TransferWindow>,
    pub listings: Vec<&'a TransferListing>,
    pub bids: Vec<&'a Bid>,
    pub completed: &'a [CompletedTransfer],
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to serialize result: {}", e))
}

/// Current table. Once the season is finished it also names the champion.
pub fn standings_json(season: &Season) -> Result<String, String> {
    let state = season.state();
    let rows = season.standings();
    let champion = state
        .summary()
        .and_then(|s| state.team(s.champion).ok())
        .map(|t| t.name.as_str());
    to_json(&StandingsSnapshot {
        schema_version: SCHEMA_VERSION,
        phase: state.phase(),
        matchday: state.current_matchday(),
        matchday_count: state.calendar().matchday_count(),
        rows,
        champion,
    })
}

/// Fixtures of one matchday, or the whole calendar.
pub fn fixtures_json(season: &Season, matchday: Option<u16>) -> Result<String, String> {
    let state = season.state();
    let calendar = state.calendar();
    let fixtures = match matchday {
        Some(md) => calendar.matchday(md),
        None => calendar.fixtures(),
    };
    let name = |id: TeamId| state.team(id).map(|t| t.name.clone()).map_err(|e| e.to_string());

    let mut list = Vec::with_capacity(fixtures.len());
    for fixture in fixtures {
        list.push(FixtureSnapshot {
            id: fixture.id,
            matchday: fixture.matchday,
            home: fixture.home,
            away: fixture.away,
            home_name: name(fixture.home)?,
            away_name: name(fixture.away)?,
            result: fixture.result(),
        });
    }
    to_json(&FixtureList { schema_version: SCHEMA_VERSION, fixtures: list })
}

pub fn ledger_json(season: &Season, team: TeamId) -> Result<String, String> {
    let state = season.state();
    let account = state.account(team).map_err(|e| e.to_string())?;
    let available_funds = season.available_funds(team).map_err(|e| e.to_string())?;
    to_json(&LedgerSnapshot {
        schema_version: SCHEMA_VERSION,
        team,
        balance: account.balance(),
        insolvent: account.is_insolvent(),
        available_funds,
        entries: account.ledger(),
    })
}

/// Open window, its listings and bids, and the season's completed deals.
pub fn market_json(season: &Season) -> Result<String, String> {
    let market = season.state().market();
    to_json(&MarketSnapshot {
        schema_version: SCHEMA_VERSION,
        window: market.window(),
        listings: market.listings().collect(),
        bids: market.bids().collect(),
        completed: market.completed(),
    })
}

pub fn summary_json(season: &Season) -> Result<String, String> {
    let summary = season.state().summary().ok_or_else(|| "Season is not finished".to_string())?;
    to_json(summary)
}

/// Parses a league description (clubs, squads, free agents, seed).
pub fn setup_from_json(json: &str) -> Result<SeasonSetup, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid JSON request: {}", e))
}
