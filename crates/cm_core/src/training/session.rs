// Matchday training sessions
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{TrainingConfig, TrainingProgram};
use crate::error::{BusinessRuleViolation, Result, ValidationError};
use crate::finance::{FinanceEngine, LedgerCategory, LedgerDelta};
use crate::league::manager::MORALE_RANGE;
use crate::league::SeasonPhase;
use crate::models::{Player, PlayerId, TeamId};
use crate::season::SeasonState;

/// Individual session types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrainingKind {
    Shooting,
    Defending,
    Conditioning,
    /// Goalkeepers only.
    Goalkeeping,
    /// Restores fitness. Allowed for tired players.
    Fitness,
}

impl TrainingKind {
    pub const ALL: [TrainingKind; 5] = [
        TrainingKind::Shooting,
        TrainingKind::Defending,
        TrainingKind::Conditioning,
        TrainingKind::Goalkeeping,
        TrainingKind::Fitness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrainingKind::Shooting => "shooting",
            TrainingKind::Defending => "defending",
            TrainingKind::Conditioning => "conditioning",
            TrainingKind::Goalkeeping => "goalkeeping",
            TrainingKind::Fitness => "fitness",
        }
    }

    /// What a successful session raises.
    pub fn target(&self) -> &'static str {
        match self {
            TrainingKind::Shooting => "attack",
            TrainingKind::Defending | TrainingKind::Goalkeeping => "defense",
            TrainingKind::Conditioning => "stamina",
            TrainingKind::Fitness => "fitness",
        }
    }

    pub fn program<'a>(&self, cfg: &'a TrainingConfig) -> &'a TrainingProgram {
        match self {
            TrainingKind::Shooting => &cfg.shooting,
            TrainingKind::Defending => &cfg.defending,
            TrainingKind::Conditioning => &cfg.conditioning,
            TrainingKind::Goalkeeping => &cfg.goalkeeping,
            TrainingKind::Fitness => &cfg.fitness,
        }
    }

    fn level(&self, player: &Player) -> u8 {
        match self {
            TrainingKind::Shooting => player.attributes.attack,
            TrainingKind::Defending | TrainingKind::Goalkeeping => player.attributes.defense,
            TrainingKind::Conditioning => player.attributes.stamina,
            TrainingKind::Fitness => player.fitness,
        }
    }

    fn cap(&self, cfg: &TrainingConfig) -> u8 {
        match self {
            TrainingKind::Fitness => 100,
            _ => cfg.attribute_cap,
        }
    }

    fn raise(&self, player: &mut Player, gain: u8, cap: u8) {
        let slot = match self {
            TrainingKind::Shooting => &mut player.attributes.attack,
            TrainingKind::Defending | TrainingKind::Goalkeeping => &mut player.attributes.defense,
            TrainingKind::Conditioning => &mut player.attributes.stamina,
            TrainingKind::Fitness => &mut player.fitness,
        };
        *slot = slot.saturating_add(gain).min(cap);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Session {
    Player { player: PlayerId, kind: TrainingKind },
    /// Team bonding for the whole fit squad.
    Squad,
}

/// One session in the training log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingRecord {
    pub matchday: u16,
    pub team: TeamId,
    pub session: Session,
    pub success: bool,
    /// Points added to the target (morale for squad sessions), 0 on failure.
    pub gain: u8,
    pub cost: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingOutcome {
    pub record: TrainingRecord,
    /// The fee, absent for free sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<LedgerDelta>,
}

fn age_modifier(age: u8) -> f32 {
    match age {
        0..=20 => 0.15,
        21..=23 => 0.10,
        24..=27 => 0.0,
        28..=30 => -0.05,
        _ => -0.15,
    }
}

/// High attributes are harder to improve.
fn level_modifier(level: u8) -> f32 {
    match level {
        90..=u8::MAX => -0.2,
        80..=89 => -0.1,
        70..=79 => -0.05,
        _ => 0.0,
    }
}

/// Probability that `player` improves from a `kind` session.
pub fn success_chance(player: &Player, kind: TrainingKind, cfg: &TrainingConfig) -> f32 {
    let mut chance = kind.program(cfg).base_chance + age_modifier(player.age);
    if kind != TrainingKind::Fitness {
        chance += level_modifier(kind.level(player));
    }
    chance.max(cfg.min_chance).min(cfg.max_chance)
}

/// Seed for one session, stable across runs and platforms.
pub fn session_seed(season_seed: u64, matchday: u16, team: TeamId, session: &Session) -> u64 {
    let (player, kind) = match session {
        Session::Player { player, kind } => (player.value(), *kind as u8 + 1),
        Session::Squad => (0, 0),
    };
    fxhash::hash64(&(season_seed, matchday, team.value(), player, kind))
}

/// Training drains fitness, but never below `floor` unless already there.
fn drain(fitness: u8, loss: u8, floor: u8) -> u8 {
    fitness.saturating_sub(loss).max(floor.min(fitness))
}

fn ensure_in_season(state: &SeasonState) -> Result<()> {
    if state.phase == SeasonPhase::Finished {
        return Err(BusinessRuleViolation::SeasonFinished.into());
    }
    Ok(())
}

/// Runs training sessions against the season state. Each player trains at
/// most once per matchday, each squad bonds at most once per matchday.
#[derive(Debug, Clone, Default)]
pub struct TrainingEngine {
    config: TrainingConfig,
}

impl TrainingEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// One individual session for a player of `team`. The fee is charged
    /// before the roll, so a failed session still costs money and fitness.
    pub fn train_player(
        &self,
        state: &mut SeasonState,
        finance: &FinanceEngine,
        team: TeamId,
        player: PlayerId,
        kind: TrainingKind,
    ) -> Result<TrainingOutcome> {
        ensure_in_season(state)?;
        state.team(team)?;
        let cfg = &self.config;
        let matchday = state.current_matchday;
        let program = *kind.program(cfg);

        let trainee = state.player(player)?;
        if trainee.team != Some(team) {
            return Err(ValidationError::OwnershipMismatch { player, claimed: team, owner: trainee.team }.into());
        }
        if trainee.is_injured() {
            return Err(BusinessRuleViolation::PlayerInjured(player).into());
        }
        if kind != TrainingKind::Fitness && trainee.fitness < cfg.min_fitness {
            return Err(BusinessRuleViolation::PlayerExhausted { player, fitness: trainee.fitness }.into());
        }
        if self.has_trained(state, player, matchday) {
            return Err(BusinessRuleViolation::AlreadyTrained(player).into());
        }
        if kind == TrainingKind::Goalkeeping && !trainee.position.is_goalkeeper() {
            return Err(BusinessRuleViolation::PositionRestricted { player, training: kind.name() }.into());
        }
        if kind.level(trainee) >= kind.cap(cfg) {
            return Err(BusinessRuleViolation::AttributeMaxed { player, attribute: kind.target() }.into());
        }
        let chance = success_chance(trainee, kind, cfg);

        let ledger = match program.cost {
            0 => None,
            cost => Some(finance.charge(&mut state.accounts, team, LedgerCategory::Training, cost, matchday)?),
        };

        let session = Session::Player { player, kind };
        let mut rng = ChaCha8Rng::seed_from_u64(session_seed(state.season_seed, matchday, team, &session));
        let success = rng.gen::<f32>() < chance;
        let gain = if success { rng.gen_range(program.min_gain..=program.max_gain) } else { 0 };

        let trainee = state.players.get_mut(&player).ok_or(ValidationError::UnknownPlayer(player))?;
        trainee.fitness = drain(trainee.fitness, program.fitness_loss, cfg.fitness_floor);
        if gain > 0 {
            kind.raise(trainee, gain, kind.cap(cfg));
        }

        let record = TrainingRecord { matchday, team, session, success, gain, cost: program.cost };
        log::debug!(
            "{} {} training for {}: {} (+{})",
            team,
            kind.name(),
            player,
            if success { "improved" } else { "no change" },
            gain
        );
        state.training_log.push(record);
        Ok(TrainingOutcome { record, ledger })
    }

    /// Team bonding: every uninjured squad member loses some fitness and, on
    /// success, gains morale.
    pub fn train_squad(
        &self,
        state: &mut SeasonState,
        finance: &FinanceEngine,
        team: TeamId,
    ) -> Result<TrainingOutcome> {
        ensure_in_season(state)?;
        let roster = state.team(team)?.roster.clone();
        let matchday = state.current_matchday;
        if state
            .training_log
            .iter()
            .any(|r| r.matchday == matchday && r.team == team && r.session == Session::Squad)
        {
            return Err(BusinessRuleViolation::SquadAlreadyTrained(team).into());
        }
        let program = self.config.team_bonding;

        let ledger = match program.cost {
            0 => None,
            cost => Some(finance.charge(&mut state.accounts, team, LedgerCategory::Training, cost, matchday)?),
        };

        let session = Session::Squad;
        let mut rng = ChaCha8Rng::seed_from_u64(session_seed(state.season_seed, matchday, team, &session));
        let success = rng.gen::<f32>() < program.base_chance;
        let gain = if success { rng.gen_range(program.min_gain..=program.max_gain) } else { 0 };

        for id in &roster {
            let Some(player) = state.players.get_mut(id) else { continue };
            if player.is_injured() {
                continue;
            }
            player.fitness = drain(player.fitness, program.fitness_loss, self.config.fitness_floor);
            player.morale = (player.morale as i16 + gain as i16).min(MORALE_RANGE.1) as u8;
        }

        let record = TrainingRecord { matchday, team, session, success, gain, cost: program.cost };
        log::debug!("{} squad bonding: +{} morale", team, gain);
        state.training_log.push(record);
        Ok(TrainingOutcome { record, ledger })
    }

    fn has_trained(&self, state: &SeasonState, player: PlayerId, matchday: u16) -> bool {
        state.training_log.iter().any(|r| {
            r.matchday == matchday && matches!(r.session, Session::Player { player: p, .. } if p == player)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::error::SimError;
    use crate::models::{Contract, PlayerAttributes, Position};
    use crate::season::state::test_support::setup;
    use crate::season::Season;

    fn state() -> SeasonState {
        Season::new(SimConfig::default(), setup(4, 11)).unwrap().state().clone()
    }

    fn engines() -> (TrainingEngine, FinanceEngine) {
        (TrainingEngine::default(), FinanceEngine::default())
    }

    fn player(age: u8, attack: u8) -> Player {
        Player::new(
            PlayerId(1),
            "Trainee",
            age,
            Position::ST,
            PlayerAttributes::new(attack, 50, 60, 60),
            Contract { wage: 1_000, expires_season: 2027 },
            1_000_000,
        )
    }

    #[test]
    fn test_success_chance_by_age_and_level() {
        let cfg = TrainingConfig::default();
        let young = success_chance(&player(19, 60), TrainingKind::Shooting, &cfg);
        let prime = success_chance(&player(26, 60), TrainingKind::Shooting, &cfg);
        let veteran = success_chance(&player(33, 60), TrainingKind::Shooting, &cfg);
        assert!((young - 0.60).abs() < 1e-6);
        assert!((prime - 0.45).abs() < 1e-6);
        assert!((veteran - 0.30).abs() < 1e-6);

        let elite = success_chance(&player(26, 92), TrainingKind::Shooting, &cfg);
        assert!((elite - 0.25).abs() < 1e-6);

        // Fitness work ignores attribute level and is clamped at the top.
        let rest = success_chance(&player(19, 92), TrainingKind::Fitness, &cfg);
        assert!((rest - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_drain_respects_floor() {
        assert_eq!(drain(50, 4, 10), 46);
        assert_eq!(drain(12, 4, 10), 10);
        assert_eq!(drain(5, 4, 10), 5);
    }

    #[test]
    fn test_session_charges_and_drains() {
        let (training, finance) = engines();
        let mut state = state();
        let before = state.account(TeamId(1)).unwrap().balance();
        let attack_before = state.player(PlayerId(112)).unwrap().attributes.attack;

        let outcome =
            training.train_player(&mut state, &finance, TeamId(1), PlayerId(112), TrainingKind::Shooting).unwrap();

        let account = state.account(TeamId(1)).unwrap();
        assert_eq!(account.balance(), before - 120_000);
        assert_eq!(account.total(LedgerCategory::Training), -120_000);
        assert_eq!(outcome.ledger.map(|d| d.entry.amount), Some(-120_000));

        let trained = state.player(PlayerId(112)).unwrap();
        assert_eq!(trained.fitness, 97);
        assert_eq!(trained.attributes.attack, attack_before + outcome.record.gain);
        assert_eq!(outcome.record.success, outcome.record.gain > 0);
        assert!(outcome.record.gain <= 2);
        assert_eq!(state.training_log, vec![outcome.record]);
        state.audit().unwrap();
    }

    #[test]
    fn test_sessions_are_seeded() {
        let (training, finance) = engines();
        let mut a = state();
        let mut b = state();
        for id in 101..116 {
            let kind = if id == 101 { TrainingKind::Goalkeeping } else { TrainingKind::Defending };
            let left = training.train_player(&mut a, &finance, TeamId(1), PlayerId(id), kind).unwrap();
            let right = training.train_player(&mut b, &finance, TeamId(1), PlayerId(id), kind).unwrap();
            assert_eq!(left, right);
        }
        assert_eq!(a.players, b.players);
    }

    #[test]
    fn test_refusals_leave_state_unchanged() {
        let (training, finance) = engines();
        let mut state = state();
        state.players.get_mut(&PlayerId(103)).unwrap().injury_matchdays = 2;
        state.players.get_mut(&PlayerId(104)).unwrap().fitness = 15;
        state.players.get_mut(&PlayerId(105)).unwrap().attributes.attack = 99;
        training.train_player(&mut state, &finance, TeamId(1), PlayerId(106), TrainingKind::Conditioning).unwrap();
        let before = state.clone();

        let cases = [
            (TeamId(1), PlayerId(103), TrainingKind::Shooting, SimError::from(BusinessRuleViolation::PlayerInjured(PlayerId(103)))),
            (
                TeamId(1),
                PlayerId(104),
                TrainingKind::Shooting,
                BusinessRuleViolation::PlayerExhausted { player: PlayerId(104), fitness: 15 }.into(),
            ),
            (TeamId(1), PlayerId(106), TrainingKind::Shooting, BusinessRuleViolation::AlreadyTrained(PlayerId(106)).into()),
            (
                TeamId(1),
                PlayerId(112),
                TrainingKind::Goalkeeping,
                BusinessRuleViolation::PositionRestricted { player: PlayerId(112), training: "goalkeeping" }.into(),
            ),
            (
                TeamId(1),
                PlayerId(105),
                TrainingKind::Shooting,
                BusinessRuleViolation::AttributeMaxed { player: PlayerId(105), attribute: "attack" }.into(),
            ),
            (
                TeamId(2),
                PlayerId(112),
                TrainingKind::Shooting,
                ValidationError::OwnershipMismatch { player: PlayerId(112), claimed: TeamId(2), owner: Some(TeamId(1)) }
                    .into(),
            ),
        ];
        for (team, player, kind, expected) in cases {
            assert_eq!(training.train_player(&mut state, &finance, team, player, kind), Err(expected));
        }
        assert_eq!(state, before);

        // A tired player may still do fitness work.
        training.train_player(&mut state, &finance, TeamId(1), PlayerId(104), TrainingKind::Fitness).unwrap();
        assert!(state.player(PlayerId(104)).unwrap().fitness >= 15);
    }

    #[test]
    fn test_unaffordable_session_refused() {
        let (training, finance) = engines();
        let mut state = state();
        let balance = state.account(TeamId(1)).unwrap().balance();
        finance
            .charge(&mut state.accounts, TeamId(1), LedgerCategory::StadiumUpgrade, balance - 1_000, 0)
            .unwrap();
        let before = state.clone();
        let err = training
            .train_player(&mut state, &finance, TeamId(1), PlayerId(112), TrainingKind::Shooting)
            .unwrap_err();
        assert!(matches!(err, SimError::BusinessRule(BusinessRuleViolation::InsufficientFunds { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_squad_bonding_once_per_matchday() {
        let (training, finance) = engines();
        let mut state = state();
        state.players.get_mut(&PlayerId(103)).unwrap().injury_matchdays = 2;

        let outcome = training.train_squad(&mut state, &finance, TeamId(1)).unwrap();
        assert!(outcome.record.success);
        assert!((2..=5).contains(&outcome.record.gain));
        for id in &state.team(TeamId(1)).unwrap().roster {
            let p = state.player(*id).unwrap();
            if *id == PlayerId(103) {
                assert_eq!((p.morale, p.fitness), (70, 100));
            } else {
                assert_eq!(p.morale, 70 + outcome.record.gain);
                assert_eq!(p.fitness, 97);
            }
        }
        assert_eq!(state.account(TeamId(1)).unwrap().total(LedgerCategory::Training), -200_000);
        assert_eq!(
            training.train_squad(&mut state, &finance, TeamId(1)),
            Err(BusinessRuleViolation::SquadAlreadyTrained(TeamId(1)).into())
        );
    }
}
