//! Single-fixture simulation.
//!
//! Given two team sheets and a seed the engine always produces the same score
//! and event log. Goals per side are Poisson draws around the expected-goal
//! mean from [`strength`](super::strength); scorers, cards and injuries are
//! drawn afterwards from the same generator.

use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Poisson;
use serde::{Deserialize, Serialize};

use super::strength::{expected_goals, side_strength, SideStrength};
use crate::config::MatchConfig;
use crate::error::ValidationError;
use crate::models::{
    EventKind, EventLog, Formation, MatchEvent, Player, PlayerId, Score, Side, Team, TeamId,
};

pub const STARTING_ELEVEN: usize = 11;

/// The players a club sends out for one match, frozen at kick-off.
///
/// Sheets are stored with every played fixture so the match can be replayed
/// later with exactly the same inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamSheet {
    pub team: TeamId,
    pub name: String,
    pub formation: Formation,
    pub players: Vec<Player>,
}

impl TeamSheet {
    pub fn new(
        team: TeamId,
        name: impl Into<String>,
        formation: Formation,
        players: Vec<Player>,
    ) -> Result<Self, ValidationError> {
        if players.is_empty() {
            return Err(ValidationError::EmptyRoster(team));
        }
        Ok(Self { team, name: name.into(), formation, players })
    }

    /// Picks the starting eleven: best available goalkeeper, then the
    /// formation's defenders, midfielders and forwards by overall rating,
    /// then the best of the rest. Injured or exhausted players are skipped
    /// unless nobody else is left.
    pub fn select(
        team: &Team,
        players: &BTreeMap<PlayerId, Player>,
    ) -> Result<Self, ValidationError> {
        if team.roster.is_empty() {
            return Err(ValidationError::EmptyRoster(team.id));
        }
        let mut squad = Vec::with_capacity(team.roster.len());
        for id in &team.roster {
            squad.push(players.get(id).ok_or(ValidationError::UnknownPlayer(*id))?);
        }

        let mut pool: Vec<&Player> = squad.iter().copied().filter(|p| p.is_available()).collect();
        if pool.is_empty() {
            pool = squad;
        }
        // Deterministic: best overall first, roster id breaks ties.
        pool.sort_by(|a, b| b.overall().cmp(&a.overall()).then(a.id.cmp(&b.id)));

        let lineup: Vec<Player> = if pool.len() <= STARTING_ELEVEN {
            pool.into_iter().cloned().collect()
        } else {
            let (def, mid, fwd) = team.formation.get_positions();
            let mut picked: Vec<&Player> = Vec::with_capacity(STARTING_ELEVEN);
            take_best(&pool, &mut picked, 1, |p| p.position.is_goalkeeper());
            take_best(&pool, &mut picked, def as usize, |p| p.position.is_defender());
            take_best(&pool, &mut picked, mid as usize, |p| p.position.is_midfielder());
            take_best(&pool, &mut picked, fwd as usize, |p| p.position.is_forward());
            let remaining = STARTING_ELEVEN.saturating_sub(picked.len());
            take_best(&pool, &mut picked, remaining, |_| true);
            picked.into_iter().cloned().collect()
        };

        Self::new(team.id, team.name.clone(), team.formation, lineup)
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub home: TeamId,
    pub away: TeamId,
    pub score: Score,
    pub seed: u64,
    pub home_strength: (f32, f32),
    pub away_strength: (f32, f32),
    /// Poisson means used for (home, away).
    pub expected_goals: (f32, f32),
    pub events: EventLog,
}

impl MatchResult {
    pub fn winner(&self) -> Option<Side> {
        match self.score.home.cmp(&self.score.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn simulate(
        &self,
        home: &TeamSheet,
        away: &TeamSheet,
        seed: u64,
    ) -> Result<MatchResult, ValidationError> {
        if home.players.is_empty() {
            return Err(ValidationError::EmptyRoster(home.team));
        }
        if away.players.is_empty() {
            return Err(ValidationError::EmptyRoster(away.team));
        }

        let cfg = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let home_strength = side_strength(home, cfg, true);
        let away_strength = side_strength(away, cfg, false);
        let home_mean = expected_goals(home_strength.attack, away_strength.defense, cfg);
        let away_mean = expected_goals(away_strength.attack, home_strength.defense, cfg);

        let home_goals = draw_goals(&mut rng, home_mean, cfg.max_goals);
        let away_goals = draw_goals(&mut rng, away_mean, cfg.max_goals);

        let events = self.generate_events(&mut rng, home, away, home_goals, away_goals);

        Ok(MatchResult {
            home: home.team,
            away: away.team,
            score: Score::new(home_goals, away_goals),
            seed,
            home_strength: pair(home_strength),
            away_strength: pair(away_strength),
            expected_goals: (home_mean, away_mean),
            events,
        })
    }

    fn generate_events(
        &self,
        rng: &mut ChaCha8Rng,
        home: &TeamSheet,
        away: &TeamSheet,
        home_goals: u8,
        away_goals: u8,
    ) -> EventLog {
        let cfg = &self.config;
        let sides = [(Side::Home, home, home_goals), (Side::Away, away, away_goals)];

        let mut goals = Vec::with_capacity((home_goals + away_goals) as usize);
        for (side, sheet, count) in sides {
            for _ in 0..count {
                let (minute, added) = random_minute(rng);
                goals.push(MatchEvent {
                    minute,
                    added,
                    kind: EventKind::Goal,
                    side,
                    team: sheet.team,
                    player: pick_scorer(rng, sheet),
                    score_after: None,
                });
            }
        }
        goals.sort_by_key(MatchEvent::clock);
        let (mut h, mut a) = (0u8, 0u8);
        for goal in &mut goals {
            match goal.side {
                Side::Home => h += 1,
                Side::Away => a += 1,
            }
            goal.score_after = Some((h, a));
        }

        let mut events = goals;

        let yellows = if cfg.max_yellow_cards > cfg.min_yellow_cards {
            rng.gen_range(cfg.min_yellow_cards..=cfg.max_yellow_cards)
        } else {
            cfg.min_yellow_cards
        };
        for _ in 0..yellows {
            events.push(random_side_event(rng, home, away, EventKind::YellowCard));
        }
        if rng.gen::<f32>() < cfg.red_card_chance {
            events.push(random_side_event(rng, home, away, EventKind::RedCard));
        }

        for (side, sheet, _) in sides {
            for player in &sheet.players {
                if rng.gen::<f32>() < cfg.injury_chance {
                    let (minute, added) = random_minute(rng);
                    events.push(MatchEvent {
                        minute,
                        added,
                        kind: EventKind::Injury,
                        side,
                        team: sheet.team,
                        player: Some(player.id),
                        score_after: None,
                    });
                }
            }
        }

        EventLog::from_unordered(events)
    }
}

/// Appends up to `count` players from the sorted pool that pass `accept` and
/// are not already picked.
fn take_best<'a>(
    pool: &[&'a Player],
    picked: &mut Vec<&'a Player>,
    count: usize,
    accept: impl Fn(&Player) -> bool,
) {
    let chosen: Vec<&'a Player> = pool
        .iter()
        .copied()
        .filter(|p| accept(*p) && !picked.iter().any(|q| q.id == p.id))
        .take(count)
        .collect();
    picked.extend(chosen);
}

fn pair(s: SideStrength) -> (f32, f32) {
    (s.attack, s.defense)
}

fn draw_goals(rng: &mut ChaCha8Rng, mean: f32, cap: u8) -> u8 {
    match Poisson::new(mean as f64) {
        Ok(poisson) => {
            let goals: f64 = poisson.sample(rng);
            (goals.max(0.0) as u32).min(cap as u32) as u8
        }
        // Only reachable with a non-positive mean: no goals.
        Err(_) => 0,
    }
}

/// 1..=90, with 0..=3 added minutes when the draw lands on 45 or 90.
fn random_minute(rng: &mut ChaCha8Rng) -> (u8, u8) {
    let half = if rng.gen_bool(0.5) { 0 } else { 45 };
    let minute = half + 1 + rng.gen_range(0..45u8);
    let added = if minute == 45 || minute == 90 { rng.gen_range(0..4u8) } else { 0 };
    (minute, added)
}

/// Scorers come from attacking positions, weighted by attack rating.
fn pick_scorer(rng: &mut ChaCha8Rng, sheet: &TeamSheet) -> Option<PlayerId> {
    let mut candidates: Vec<&Player> =
        sheet.players.iter().filter(|p| p.position.is_scoring_position()).collect();
    if candidates.is_empty() {
        candidates = sheet.players.iter().filter(|p| !p.position.is_goalkeeper()).collect();
    }
    if candidates.is_empty() {
        candidates = sheet.players.iter().collect();
    }
    // +1 keeps zero-rated squads drawable.
    let weights = candidates.iter().map(|p| p.attributes.attack as u32 + 1);
    let index = WeightedIndex::new(weights).ok()?;
    Some(candidates[index.sample(rng)].id)
}

fn random_side_event(
    rng: &mut ChaCha8Rng,
    home: &TeamSheet,
    away: &TeamSheet,
    kind: EventKind,
) -> MatchEvent {
    let (side, sheet) = if rng.gen_bool(0.5) { (Side::Home, home) } else { (Side::Away, away) };
    let player = if sheet.players.is_empty() {
        None
    } else {
        Some(sheet.players[rng.gen_range(0..sheet.players.len())].id)
    };
    let (minute, added) = random_minute(rng);
    MatchEvent { minute, added, kind, side, team: sheet.team, player, score_after: None }
}
