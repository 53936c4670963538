//! League table.
//!
//! The table is never stored on its own. Each `Team::stats` is the
//! materialized row, and [`recompute`] rebuilds the same rows from the played
//! fixtures so the two can be compared after every matchday.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::Calendar;
use crate::error::InvariantViolation;
use crate::models::{FormResult, SeasonStats, Team, TeamId, FORM_WINDOW};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandingRow {
    /// 1-based table position.
    pub position: usize,
    pub team: TeamId,
    pub name: String,
    pub stats: SeasonStats,
    pub goal_difference: i64,
    pub form: Vec<FormResult>,
}

/// Points, then goal difference, then goals scored, all descending.
pub fn compare(a: &SeasonStats, b: &SeasonStats) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// Ranks `teams` by their materialized stats. Teams level on every key keep
/// their registration order, which `sort_by` guarantees by being stable.
pub fn table(teams: &[Team]) -> Vec<StandingRow> {
    let mut order: Vec<&Team> = teams.iter().collect();
    order.sort_by(|a, b| compare(&a.stats, &b.stats));
    order
        .into_iter()
        .enumerate()
        .map(|(i, team)| StandingRow {
            position: i + 1,
            team: team.id,
            name: team.name.clone(),
            stats: team.stats,
            goal_difference: team.stats.goal_difference(),
            form: team.form.clone(),
        })
        .collect()
}

/// Rebuilds every team's record from the played fixtures alone.
pub fn recompute(teams: &[Team], calendar: &Calendar) -> BTreeMap<TeamId, SeasonStats> {
    let mut stats: BTreeMap<TeamId, SeasonStats> =
        teams.iter().map(|t| (t.id, SeasonStats::default())).collect();
    for fixture in calendar.played() {
        let Some(score) = fixture.result() else { continue };
        if let Some(home) = stats.get_mut(&fixture.home) {
            home.record(score.home, score.away);
        }
        if let Some(away) = stats.get_mut(&fixture.away) {
            away.record(score.away, score.home);
        }
    }
    stats
}

/// Last `FORM_WINDOW` results of `team`, oldest first.
pub fn recompute_form(team: TeamId, calendar: &Calendar) -> Vec<FormResult> {
    let results: Vec<FormResult> = calendar
        .team_fixtures(team)
        .filter_map(|f| f.goals_for(team))
        .map(|(scored, conceded)| FormResult::from_score(scored, conceded))
        .collect();
    let skip = results.len().saturating_sub(FORM_WINDOW);
    results[skip..].to_vec()
}

/// Table built from recomputed stats instead of the materialized ones.
pub fn recomputed_table(teams: &[Team], calendar: &Calendar) -> Vec<StandingRow> {
    let stats = recompute(teams, calendar);
    let rebuilt: Vec<Team> = teams
        .iter()
        .map(|t| {
            let mut team = t.clone();
            team.stats = stats.get(&t.id).copied().unwrap_or_default();
            team.form = recompute_form(t.id, calendar);
            team
        })
        .collect();
    table(&rebuilt)
}

/// Checks the points rule for every team and that each materialized row
/// matches the recomputation.
pub fn verify(teams: &[Team], calendar: &Calendar) -> Result<(), InvariantViolation> {
    let recomputed = recompute(teams, calendar);
    for team in teams {
        if !team.stats.points_consistent() {
            return Err(InvariantViolation::PointsMismatch {
                team: team.id,
                points: team.stats.points,
                won: team.stats.won,
                drawn: team.stats.drawn,
            });
        }
        if recomputed.get(&team.id) != Some(&team.stats) {
            return Err(InvariantViolation::StandingDiverged { team: team.id });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Formation, Score, Stadium};

    fn teams(n: u32) -> Vec<Team> {
        (1..=n)
            .map(|i| {
                Team::new(
                    TeamId(i),
                    format!("Team {}", i),
                    format!("T{}", i),
                    Formation::F442,
                    Stadium::new(20_000, 30),
                )
            })
            .collect()
    }

    /// Plays the next matchday with fixed scores, keeping stats in step.
    fn play(teams: &mut [Team], calendar: &mut Calendar, score: impl Fn(usize) -> Score) {
        let md = calendar.next_unplayed_matchday().unwrap();
        let day: Vec<_> = calendar.matchday(md).to_vec();
        for (i, f) in day.iter().enumerate() {
            let s = score(i);
            calendar.record_result(f.id, s, 0).unwrap();
            for team in teams.iter_mut() {
                if team.id == f.home {
                    let r = team.stats.record(s.home, s.away);
                    team.push_form(r);
                } else if team.id == f.away {
                    let r = team.stats.record(s.away, s.home);
                    team.push_form(r);
                }
            }
        }
    }

    #[test]
    fn test_tie_break_order() {
        let mut ts = teams(4);
        // Same points, T2 better goal difference, T3/T4 identical.
        ts[0].stats = SeasonStats { played: 2, won: 1, drawn: 0, lost: 1, goals_for: 3, goals_against: 3, points: 3 };
        ts[1].stats = SeasonStats { played: 2, won: 1, drawn: 0, lost: 1, goals_for: 3, goals_against: 1, points: 3 };
        ts[2].stats = SeasonStats { played: 2, won: 1, drawn: 0, lost: 1, goals_for: 5, goals_against: 5, points: 3 };
        ts[3].stats = ts[2].stats;

        let rows = table(&ts);
        let order: Vec<TeamId> = rows.iter().map(|r| r.team).collect();
        assert_eq!(order, vec![TeamId(2), TeamId(3), TeamId(4), TeamId(1)]);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[3].position, 4);

        // Registration order is the fallback in either direction.
        ts.swap(2, 3);
        let order: Vec<TeamId> = table(&ts).iter().map(|r| r.team).collect();
        assert_eq!(order, vec![TeamId(2), TeamId(4), TeamId(3), TeamId(1)]);
    }

    #[test]
    fn test_materialized_matches_recomputed() {
        let mut ts = teams(4);
        let ids: Vec<TeamId> = ts.iter().map(|t| t.id).collect();
        let mut cal = Calendar::generate(&ids).unwrap();
        for md in 0..6u8 {
            play(&mut ts, &mut cal, |i| Score::new(md % 3 + i as u8, 1));
            verify(&ts, &cal).unwrap();
            assert_eq!(table(&ts), recomputed_table(&ts, &cal));
        }
        for team in &ts {
            assert_eq!(team.stats.played, 6);
            assert_eq!(team.stats.won + team.stats.drawn + team.stats.lost, 6);
        }
    }

    #[test]
    fn test_divergence_detected() {
        let mut ts = teams(2);
        let ids: Vec<TeamId> = ts.iter().map(|t| t.id).collect();
        let mut cal = Calendar::generate(&ids).unwrap();
        play(&mut ts, &mut cal, |_| Score::new(2, 0));

        let mut broken = ts.clone();
        broken[0].stats.goals_for += 1;
        assert_eq!(
            verify(&broken, &cal),
            Err(InvariantViolation::StandingDiverged { team: TeamId(1) })
        );

        let mut broken = ts.clone();
        broken[0].stats.points += 1;
        assert!(matches!(verify(&broken, &cal), Err(InvariantViolation::PointsMismatch { .. })));
    }

    #[test]
    fn test_form_window() {
        let mut ts = teams(2);
        let ids: Vec<TeamId> = ts.iter().map(|t| t.id).collect();
        let mut cal = Calendar::generate(&ids).unwrap();
        play(&mut ts, &mut cal, |_| Score::new(1, 0));
        play(&mut ts, &mut cal, |_| Score::new(1, 1));
        assert_eq!(recompute_form(TeamId(1), &cal), vec![FormResult::Win, FormResult::Draw]);
        assert_eq!(recompute_form(TeamId(2), &cal), vec![FormResult::Loss, FormResult::Draw]);
        assert_eq!(ts[0].form, recompute_form(TeamId(1), &cal));
    }
}
