use thiserror::Error;

use crate::models::ids::{BidId, FixtureId, ListingId, PlayerId, TeamId};

/// Malformed input. The operation is rejected and has no effect.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("A season needs at least 2 teams, found {found}")]
    TooFewTeams { found: usize },

    #[error("Team {0} appears more than once")]
    DuplicateTeam(TeamId),

    #[error("Team {0} has an empty roster")]
    EmptyRoster(TeamId),

    #[error("Unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} appears more than once")]
    DuplicatePlayer(PlayerId),

    #[error("Unknown fixture {0}")]
    UnknownFixture(FixtureId),

    #[error("Fixture {0} has not been played")]
    FixtureNotPlayed(FixtureId),

    #[error("Unknown listing {0}")]
    UnknownListing(ListingId),

    #[error("Unknown bid {0}")]
    UnknownBid(BidId),

    #[error("Price must be positive, got {0}")]
    NonPositivePrice(i64),

    #[error("Attendance rate must be within 0.0..=1.0, got {0}")]
    AttendanceOutOfRange(f32),

    #[error("Player {player}: {attribute} = {value} is outside 0..=100")]
    AttributeOutOfRange { player: PlayerId, attribute: &'static str, value: u8 },

    #[error("Player {player} is listed by {claimed} but owned by {owner:?}")]
    OwnershipMismatch { player: PlayerId, claimed: TeamId, owner: Option<TeamId> },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A business rule refused the action. Non-fatal; state is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BusinessRuleViolation {
    #[error("Team {team} cannot cover {required} (available {available})")]
    InsufficientFunds { team: TeamId, required: i64, available: i64 },

    #[error("Team {0} is insolvent; discretionary spending is suspended")]
    ClubInsolvent(TeamId),

    #[error("Listing {listing} is closed ({status})")]
    ListingClosed { listing: ListingId, status: String },

    #[error("Bid {bid} is no longer pending ({status})")]
    BidNotPending { bid: BidId, status: String },

    #[error("Transfer window is closed")]
    WindowClosed,

    #[error("Team {0} cannot bid on its own listing")]
    SelfBid(TeamId),

    #[error("Team {team} is not the seller on listing {listing}")]
    NotSeller { listing: ListingId, team: TeamId },

    #[error("Team {team} is not the counterparty of bid {bid}")]
    NotCounterparty { bid: BidId, team: TeamId },

    #[error("Bid of {offered} is below the asking price of {asking}")]
    BelowAskingPrice { offered: i64, asking: i64 },

    #[error("Player {0} is already listed")]
    AlreadyListed(PlayerId),

    #[error("Player {player} is not a free agent")]
    NotFreeAgent { player: PlayerId },

    #[error("Squad of team {team} is full ({size} players)")]
    SquadFull { team: TeamId, size: usize },

    #[error("Squad of team {team} would drop below {min} players")]
    SquadTooSmall { team: TeamId, min: usize },

    #[error("No pending bid on listing {0} meets the asking price")]
    NoQualifyingBid(ListingId),

    #[error("Season has not started")]
    SeasonNotStarted,

    #[error("Season has already started")]
    SeasonAlreadyStarted,

    #[error("Season is finished")]
    SeasonFinished,

    #[error("Season still has {remaining} fixtures to play")]
    SeasonNotFinished { remaining: usize },

    #[error("Player {0} is injured")]
    PlayerInjured(PlayerId),

    #[error("Player {player} is too tired to train (fitness {fitness})")]
    PlayerExhausted { player: PlayerId, fitness: u8 },

    #[error("Player {0} has already trained this matchday")]
    AlreadyTrained(PlayerId),

    #[error("Squad of team {0} has already trained this matchday")]
    SquadAlreadyTrained(TeamId),

    #[error("Player {player} cannot take {training} training")]
    PositionRestricted { player: PlayerId, training: &'static str },

    #[error("Player {player} has maxed {attribute}")]
    AttributeMaxed { player: PlayerId, attribute: &'static str },

    #[error("Team {team} cannot add {upgrade} to its stadium")]
    UpgradeUnavailable { team: TeamId, upgrade: &'static str },
}

/// Internal consistency failure. The triggering mutation is aborted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("Standing for team {team} diverges from recomputation")]
    StandingDiverged { team: TeamId },

    #[error("Team {team}: points {points} != 3*{won} + {drawn}")]
    PointsMismatch { team: TeamId, points: u32, won: u32, drawn: u32 },

    #[error("Team {team}: balance {balance} != ledger sum {ledger_sum}")]
    LedgerMismatch { team: TeamId, balance: i64, ledger_sum: i64 },

    #[error("Balance overflow for team {0}")]
    BalanceOverflow(TeamId),

    #[error("Fixture {0} was already played")]
    FixtureAlreadyPlayed(FixtureId),

    #[error("Player {player} ownership is inconsistent")]
    OwnershipBroken { player: PlayerId },

    #[error("Replay of fixture {fixture} produced {replayed:?}, stored {stored:?}")]
    ReplayMismatch { fixture: FixtureId, stored: (u8, u8), replayed: (u8, u8) },

    #[error("No account for team {0}")]
    MissingAccount(TeamId),

    #[error("Fixture {0} is played but has no match record")]
    MissingMatchRecord(FixtureId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Business rule violation: {0}")]
    BusinessRule(#[from] BusinessRuleViolation),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl SimError {
    /// Whether the caller can carry on with the same state.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimError::Validation(_) => true,
            SimError::BusinessRule(_) => true,
            SimError::Invariant(_) => false,
        }
    }

    pub fn is_business_rule(&self) -> bool {
        matches!(self, SimError::BusinessRule(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err: SimError = BusinessRuleViolation::WindowClosed.into();
        assert!(err.is_recoverable());
        assert!(err.is_business_rule());

        let err: SimError = InvariantViolation::BalanceOverflow(TeamId(1)).into();
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "Invariant violation: Balance overflow for team T1");
    }
}
