use serde::{Deserialize, Serialize};

use super::SCHEMA_VERSION;
use crate::error::SimError;
use crate::finance::{LedgerDelta, StadiumUpgrade};
use crate::league::SeasonSummary;
use crate::models::{BidId, FixtureId, ListingId, PlayerId, Score, TeamId};
use crate::season::{MatchdayOutcome, Season};
use crate::training::{TrainingKind, TrainingOutcome};
use crate::transfer::CompletedTransfer;

/// A command from the presentation layer.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub schema_version: u8,
    pub command: SeasonCommand,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum SeasonCommand {
    Start,
    AdvanceMatchday,
    PlayToEnd,
    CreateListing { seller: TeamId, player: PlayerId, asking_price: i64 },
    WithdrawListing { seller: TeamId, listing: ListingId },
    PlaceBid { buyer: TeamId, listing: ListingId, amount: i64 },
    CounterBid { acting: TeamId, bid: BidId, amount: i64 },
    AcceptBid { acting: TeamId, bid: BidId },
    RejectBid { acting: TeamId, bid: BidId },
    ResolveListing { seller: TeamId, listing: ListingId },
    SignFreeAgent { team: TeamId, player: PlayerId, fee: i64 },
    ReplayFixture { fixture: FixtureId },
    TrainPlayer { team: TeamId, player: PlayerId, kind: TrainingKind },
    TrainSquad { team: TeamId },
    UpgradeStadium { team: TeamId, upgrade: StadiumUpgrade },
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub schema_version: u8,
    pub success: bool,
    pub response_type: CommandResponseType,
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum CommandResponseType {
    Started { matchday_count: u16 },
    Matchday { outcome: Box<MatchdayOutcome> },
    SeasonComplete { summary: SeasonSummary },
    ListingCreated { listing: ListingId },
    BidPlaced { bid: BidId },
    TransferCompleted { transfer: CompletedTransfer },
    Acknowledged,
    Replayed { fixture: FixtureId, score: Score },
    Trained { outcome: TrainingOutcome },
    StadiumUpgraded { delta: LedgerDelta },
    /// The command was refused; the season is unchanged.
    Rejected { category: String, recoverable: bool },
}

/// Parses a [`CommandRequest`], runs it and returns a [`CommandResponse`].
///
/// Malformed requests are an `Err`; a refused command is an `Ok` response
/// with `success: false`.
pub fn execute_command_json(season: &mut Season, request_json: &str) -> Result<String, String> {
    let request: CommandRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    if request.schema_version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", request.schema_version));
    }

    let response = match execute(season, request.command) {
        Ok(response_type) => CommandResponse {
            schema_version: SCHEMA_VERSION,
            success: true,
            response_type,
            error_message: None,
        },
        Err(err) => {
            log::debug!("Command rejected: {}", err);
            CommandResponse {
                schema_version: SCHEMA_VERSION,
                success: false,
                response_type: CommandResponseType::Rejected {
                    category: category(&err).to_string(),
                    recoverable: err.is_recoverable(),
                },
                error_message: Some(err.to_string()),
            }
        }
    };

    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize result: {}", e))
}

fn execute(season: &mut Season, command: SeasonCommand) -> crate::error::Result<CommandResponseType> {
    use CommandResponseType as R;

    Ok(match command {
        SeasonCommand::Start => {
            season.start()?;
            R::Started { matchday_count: season.state().calendar().matchday_count() }
        }
        SeasonCommand::AdvanceMatchday => R::Matchday { outcome: Box::new(season.advance_matchday()?) },
        SeasonCommand::PlayToEnd => R::SeasonComplete { summary: season.play_to_end()? },
        SeasonCommand::CreateListing { seller, player, asking_price } => {
            R::ListingCreated { listing: season.create_listing(seller, player, asking_price)? }
        }
        SeasonCommand::WithdrawListing { seller, listing } => {
            season.withdraw_listing(seller, listing)?;
            R::Acknowledged
        }
        SeasonCommand::PlaceBid { buyer, listing, amount } => {
            R::BidPlaced { bid: season.place_bid(buyer, listing, amount)? }
        }
        SeasonCommand::CounterBid { acting, bid, amount } => {
            R::BidPlaced { bid: season.counter_bid(acting, bid, amount)? }
        }
        SeasonCommand::AcceptBid { acting, bid } => {
            R::TransferCompleted { transfer: season.accept_bid(acting, bid)? }
        }
        SeasonCommand::RejectBid { acting, bid } => {
            season.reject_bid(acting, bid)?;
            R::Acknowledged
        }
        SeasonCommand::ResolveListing { seller, listing } => {
            R::TransferCompleted { transfer: season.resolve_listing(seller, listing)? }
        }
        SeasonCommand::SignFreeAgent { team, player, fee } => {
            R::TransferCompleted { transfer: season.sign_free_agent(team, player, fee)? }
        }
        SeasonCommand::ReplayFixture { fixture } => {
            let replayed = season.replay_fixture(fixture)?;
            R::Replayed { fixture, score: replayed.score }
        }
        SeasonCommand::TrainPlayer { team, player, kind } => {
            R::Trained { outcome: season.train_player(team, player, kind)? }
        }
        SeasonCommand::TrainSquad { team } => R::Trained { outcome: season.train_squad(team)? },
        SeasonCommand::UpgradeStadium { team, upgrade } => {
            R::StadiumUpgraded { delta: season.upgrade_stadium(team, upgrade)? }
        }
    })
}

fn category(err: &SimError) -> &'static str {
    match err {
        SimError::Validation(_) => "validation",
        SimError::BusinessRule(_) => "business_rule",
        SimError::Invariant(_) => "invariant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::season::state::test_support::setup;
    use serde_json::Value;

    fn run(season: &mut Season, command: &str) -> Value {
        let request = format!(r#"{{"schema_version": 1, "command": {}}}"#, command);
        serde_json::from_str(&execute_command_json(season, &request).unwrap()).unwrap()
    }

    #[test]
    fn test_season_through_commands() {
        let mut season = Season::new(SimConfig::default(), setup(4, 31)).unwrap();

        let started = run(&mut season, r#"{"type": "Start"}"#);
        assert_eq!(started["success"], true);
        assert_eq!(started["response_type"]["type"], "Started");
        assert_eq!(started["response_type"]["matchday_count"], 6);

        let player = season.state().team(TeamId(4)).unwrap().roster[15];
        let listed = run(
            &mut season,
            &format!(r#"{{"type": "CreateListing", "seller": 4, "player": {}, "asking_price": 900000}}"#, player.value()),
        );
        let listing = listed["response_type"]["listing"].as_u64().unwrap();
        run(&mut season, &format!(r#"{{"type": "PlaceBid", "buyer": 1, "listing": {}, "amount": 950000}}"#, listing));
        let done = run(&mut season, &format!(r#"{{"type": "ResolveListing", "seller": 4, "listing": {}}}"#, listing));
        assert_eq!(done["response_type"]["type"], "TransferCompleted");
        assert_eq!(done["response_type"]["transfer"]["to"], 1);

        let matchday = run(&mut season, r#"{"type": "AdvanceMatchday"}"#);
        assert_eq!(matchday["response_type"]["outcome"]["report"]["matchday"], 1);

        let replay = run(&mut season, r#"{"type": "ReplayFixture", "fixture": 0}"#);
        assert_eq!(replay["response_type"]["type"], "Replayed");

        let end = run(&mut season, r#"{"type": "PlayToEnd"}"#);
        assert_eq!(end["response_type"]["summary"]["matchdays"], 6);
    }

    #[test]
    fn test_refused_command_reports_category() {
        let mut season = Season::new(SimConfig::default(), setup(4, 31)).unwrap();
        let value = run(&mut season, r#"{"type": "AdvanceMatchday"}"#);
        assert_eq!(value["success"], false);
        assert_eq!(value["response_type"]["type"], "Rejected");
        assert_eq!(value["response_type"]["category"], "business_rule");
        assert_eq!(value["response_type"]["recoverable"], true);
        assert_eq!(value["error_message"], "Business rule violation: Season has not started");
    }

    #[test]
    fn test_club_management_commands() {
        let mut season = Season::new(SimConfig::default(), setup(4, 31)).unwrap();
        let keeper = season.state().team(TeamId(3)).unwrap().roster[0];

        let trained = run(
            &mut season,
            &format!(r#"{{"type": "TrainPlayer", "team": 3, "player": {}, "kind": "goalkeeping"}}"#, keeper.value()),
        );
        assert_eq!(trained["success"], true);
        assert_eq!(trained["response_type"]["type"], "Trained");
        assert_eq!(trained["response_type"]["outcome"]["record"]["session"]["kind"], "goalkeeping");
        assert_eq!(trained["response_type"]["outcome"]["ledger"]["entry"]["amount"], -80_000);

        let bonded = run(&mut season, r#"{"type": "TrainSquad", "team": 3}"#);
        assert_eq!(bonded["response_type"]["outcome"]["record"]["session"]["type"], "squad");

        let upgraded = run(&mut season, r#"{"type": "UpgradeStadium", "team": 3, "upgrade": "roof"}"#);
        assert_eq!(upgraded["response_type"]["type"], "StadiumUpgraded");
        assert_eq!(upgraded["response_type"]["delta"]["entry"]["category"], "stadium_upgrade");
        assert!(season.state().team(TeamId(3)).unwrap().stadium.roof);

        let again = run(&mut season, r#"{"type": "UpgradeStadium", "team": 3, "upgrade": "roof"}"#);
        assert_eq!(again["success"], false);
        assert_eq!(again["error_message"], "Business rule violation: Team T3 cannot add roof to its stadium");
    }

    #[test]
    fn test_malformed_requests() {
        let mut season = Season::new(SimConfig::default(), setup(4, 31)).unwrap();
        let err = execute_command_json(&mut season, "not json").unwrap_err();
        assert!(err.starts_with("Invalid JSON request"));

        let err =
            execute_command_json(&mut season, r#"{"schema_version": 2, "command": {"type": "Start"}}"#).unwrap_err();
        assert_eq!(err, "Unsupported schema version: 2");
    }
}
