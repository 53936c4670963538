use serde::{Deserialize, Serialize};

use super::ids::{PlayerId, TeamId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Goal,
    YellowCard,
    RedCard,
    Injury,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEvent {
    /// Match minute, 1..=90.
    pub minute: u8,
    /// Stoppage minutes on top of `minute` (only at 45 and 90).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub added: u8,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub side: Side,
    pub team: TeamId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerId>,
    /// Running score after a goal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_after: Option<(u8, u8)>,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

impl MatchEvent {
    /// Sort key: (minute, added).
    pub fn clock(&self) -> (u8, u8) {
        (self.minute, self.added)
    }

    pub fn is_goal(&self) -> bool {
        self.kind == EventKind::Goal
    }
}

/// Finite, time-ordered match log.
///
/// Every call to [`EventLog::iter`] starts from kick-off again, so a
/// presentation layer can replay the log as many times as it needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<MatchEvent>,
}

impl EventLog {
    /// Builds a log, ordering events by match clock. Equal clocks keep their
    /// insertion order.
    pub fn from_unordered(mut events: Vec<MatchEvent>) -> Self {
        events.sort_by_key(MatchEvent::clock);
        Self { events }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn goals(&self) -> impl Iterator<Item = &MatchEvent> + '_ {
        self.events.iter().filter(|e| e.is_goal())
    }

    /// Events up to and including `minute`, for live tickers.
    pub fn until(&self, minute: u8) -> impl Iterator<Item = &MatchEvent> + '_ {
        self.events.iter().take_while(move |e| e.minute <= minute)
    }

    pub fn count(&self, kind: EventKind, side: Side) -> usize {
        self.events.iter().filter(|e| e.kind == kind && e.side == side).count()
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a MatchEvent;
    type IntoIter = std::slice::Iter<'a, MatchEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
