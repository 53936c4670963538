pub mod events;
pub mod fixture;
pub mod ids;
pub mod player;
pub mod team;

pub use events::{EventKind, EventLog, MatchEvent, Side};
pub use fixture::{Fixture, FixtureStatus, Score};
pub use ids::{BidId, FixtureId, ListingId, PlayerId, TeamId};
pub use player::{
    Contract, Player, PlayerAttributes, PlayerSeasonStats, Position, PositionCategory,
    MIN_SELECTABLE_FITNESS,
};
pub use team::{
    FormResult, Formation, SeasonStats, Stadium, Team, FORM_WINDOW, POINTS_FOR_DRAW, POINTS_FOR_WIN,
};
