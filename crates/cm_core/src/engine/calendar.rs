//! Double round-robin fixture generation (circle method).
//!
//! One team is fixed and the rest rotate around it. A full rotation is the
//! first half of the season, and the mirrored rotation (home/away swapped)
//! is the second half. An odd team count gets a bye slot whose pairings are
//! dropped.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::models::{Fixture, FixtureId, Score, TeamId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Calendar {
    /// Sorted by matchday, then by pairing order within the matchday.
    fixtures: Vec<Fixture>,
    matchdays: u16,
}

impl Calendar {
    /// Builds the full season schedule. The same team order always yields the
    /// same fixture list.
    pub fn generate(teams: &[TeamId]) -> std::result::Result<Self, ValidationError> {
        if teams.len() < 2 {
            return Err(ValidationError::TooFewTeams { found: teams.len() });
        }
        let mut seen = HashSet::with_capacity(teams.len());
        for team in teams {
            if !seen.insert(*team) {
                return Err(ValidationError::DuplicateTeam(*team));
            }
        }

        let mut slots: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
        if slots.len() % 2 == 1 {
            slots.push(None); // bye
        }
        let n = slots.len();
        let fixed = slots[0];
        let mut rotating: Vec<Option<TeamId>> = slots[1..].to_vec();

        let mut first_leg: Vec<Vec<(TeamId, TeamId)>> = Vec::with_capacity(n - 1);
        for round in 0..n - 1 {
            let mut pairs = Vec::with_capacity(n / 2);
            let lead = if round % 2 == 0 { (fixed, rotating[0]) } else { (rotating[0], fixed) };
            pairs.push(lead);

            for i in 1..=(n - 2) / 2 {
                let a = rotating[i];
                let b = rotating[n - 1 - i];
                if i % 2 == round % 2 {
                    pairs.push((a, b));
                } else {
                    pairs.push((b, a));
                }
            }

            first_leg.push(
                pairs
                    .into_iter()
                    .filter_map(|(home, away)| Some((home?, away?)))
                    .collect(),
            );

            rotating.rotate_right(1);
        }

        let rounds = (n - 1) as u16;
        let mut fixtures = Vec::with_capacity(teams.len() * (teams.len() - 1));
        let mut next_id = 0u32;
        for (leg, swap) in [(0u16, false), (1u16, true)] {
            for (idx, pairs) in first_leg.iter().enumerate() {
                let matchday = leg * rounds + idx as u16 + 1;
                for &(home, away) in pairs {
                    let (home, away) = if swap { (away, home) } else { (home, away) };
                    fixtures.push(Fixture::new(FixtureId(next_id), matchday, home, away));
                    next_id += 1;
                }
            }
        }

        log::debug!(
            "Generated {} fixtures over {} matchdays for {} teams",
            fixtures.len(),
            rounds * 2,
            teams.len()
        );

        Ok(Self { fixtures, matchdays: rounds * 2 })
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn matchday_count(&self) -> u16 {
        self.matchdays
    }

    /// Fixtures of a 1-based matchday; empty when out of range.
    pub fn matchday(&self, matchday: u16) -> &[Fixture] {
        let start = self.fixtures.partition_point(|f| f.matchday < matchday);
        let end = self.fixtures.partition_point(|f| f.matchday <= matchday);
        &self.fixtures[start..end]
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        // Ids are assigned sequentially, so the index is the id.
        self.fixtures.get(id.0 as usize).filter(|f| f.id == id)
    }

    /// Marks a fixture as played. A fixture can only be played once.
    pub(crate) fn record_result(&mut self, id: FixtureId, score: Score, seed: u64) -> Result<()> {
        let fixture = self
            .fixtures
            .get_mut(id.0 as usize)
            .filter(|f| f.id == id)
            .ok_or(ValidationError::UnknownFixture(id))?;
        fixture.record_result(score, seed)?;
        Ok(())
    }

    pub fn team_fixtures(&self, team: TeamId) -> impl Iterator<Item = &Fixture> + '_ {
        self.fixtures.iter().filter(move |f| f.involves(team))
    }

    pub fn played(&self) -> impl Iterator<Item = &Fixture> + '_ {
        self.fixtures.iter().filter(|f| f.is_played())
    }

    /// First matchday that still has a scheduled fixture.
    pub fn next_unplayed_matchday(&self) -> Option<u16> {
        self.fixtures.iter().find(|f| !f.is_played()).map(|f| f.matchday)
    }

    pub fn next_fixture_for(&self, team: TeamId) -> Option<&Fixture> {
        self.team_fixtures(team).find(|f| !f.is_played())
    }

    pub fn is_complete(&self) -> bool {
        self.fixtures.iter().all(Fixture::is_played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvariantViolation;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn ids(n: u32) -> Vec<TeamId> {
        (1..=n).map(TeamId).collect()
    }

    #[test]
    fn test_rejects_too_few_teams() {
        assert_eq!(Calendar::generate(&[]), Err(ValidationError::TooFewTeams { found: 0 }));
        assert_eq!(
            Calendar::generate(&[TeamId(1)]),
            Err(ValidationError::TooFewTeams { found: 1 })
        );
    }

    #[test]
    fn test_rejects_duplicates() {
        assert_eq!(
            Calendar::generate(&[TeamId(1), TeamId(2), TeamId(1)]),
            Err(ValidationError::DuplicateTeam(TeamId(1)))
        );
    }

    #[test]
    fn test_two_teams() {
        let cal = Calendar::generate(&ids(2)).unwrap();
        assert_eq!(cal.matchday_count(), 2);
        assert_eq!(cal.matchday(1)[0].home, TeamId(1));
        assert_eq!(cal.matchday(2)[0].home, TeamId(2));
    }

    #[test]
    fn test_eighteen_teams_like_a_top_flight() {
        let cal = Calendar::generate(&ids(18)).unwrap();
        assert_eq!(cal.matchday_count(), 34);
        assert_eq!(cal.fixtures().len(), 18 * 17);
        assert!(cal.matchday(35).is_empty());
        assert!(cal.matchday(0).is_empty());
    }

    #[test]
    fn test_home_away_balance() {
        let cal = Calendar::generate(&ids(18)).unwrap();
        for team in ids(18) {
            let home = cal.fixtures().iter().filter(|f| f.home == team).count();
            assert_eq!(home, 17, "every team hosts every other team once");
        }
    }

    #[test]
    fn test_deterministic() {
        let a = Calendar::generate(&ids(10)).unwrap();
        let b = Calendar::generate(&ids(10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_odd_count_uses_byes() {
        let cal = Calendar::generate(&ids(5)).unwrap();
        assert_eq!(cal.matchday_count(), 10);
        assert_eq!(cal.fixtures().len(), 20);
        for md in 1..=10 {
            assert_eq!(cal.matchday(md).len(), 2);
        }
    }

    #[test]
    fn test_next_fixture_tracking() {
        let mut cal = Calendar::generate(&ids(4)).unwrap();
        assert_eq!(cal.next_unplayed_matchday(), Some(1));
        let first: Vec<FixtureId> = cal.matchday(1).iter().map(|f| f.id).collect();
        for id in first {
            cal.record_result(id, Score::new(1, 0), 7).unwrap();
        }
        assert_eq!(cal.next_unplayed_matchday(), Some(2));
        assert_eq!(cal.next_fixture_for(TeamId(1)).unwrap().matchday, 2);
        assert!(!cal.is_complete());
    }

    #[test]
    fn test_fixture_played_once() {
        let mut cal = Calendar::generate(&ids(2)).unwrap();
        cal.record_result(FixtureId(0), Score::new(2, 2), 1).unwrap();
        assert_eq!(
            cal.record_result(FixtureId(0), Score::new(0, 0), 1),
            Err(InvariantViolation::FixtureAlreadyPlayed(FixtureId(0)).into())
        );
        assert_eq!(cal.fixture(FixtureId(0)).unwrap().result(), Some(Score::new(2, 2)));
        assert_eq!(
            cal.record_result(FixtureId(99), Score::new(0, 0), 1),
            Err(ValidationError::UnknownFixture(FixtureId(99)).into())
        );
    }

    proptest! {
        #[test]
        fn prop_double_round_robin_shape(n in 1u32..=12) {
            let n = n * 2;
            let cal = Calendar::generate(&ids(n)).unwrap();
            prop_assert_eq!(cal.matchday_count() as u32, 2 * (n - 1));

            for md in 1..=cal.matchday_count() {
                let day = cal.matchday(md);
                prop_assert_eq!(day.len() as u32, n / 2);
                let mut seen = HashSet::new();
                for f in day {
                    prop_assert!(seen.insert(f.home));
                    prop_assert!(seen.insert(f.away));
                }
            }

            let mut pairs: HashMap<(TeamId, TeamId), u32> = HashMap::new();
            for f in cal.fixtures() {
                prop_assert_ne!(f.home, f.away);
                *pairs.entry((f.home, f.away)).or_default() += 1;
            }
            prop_assert_eq!(pairs.len() as u32, n * (n - 1));
            prop_assert!(pairs.values().all(|c| *c == 1));
        }

        #[test]
        fn prop_odd_counts_play_everyone_twice(n in 1u32..=8) {
            let n = n * 2 + 1;
            let cal = Calendar::generate(&ids(n)).unwrap();
            prop_assert_eq!(cal.matchday_count() as u32, 2 * n);
            for team in ids(n) {
                prop_assert_eq!(cal.team_fixtures(team).count() as u32, 2 * (n - 1));
            }
        }
    }
}
