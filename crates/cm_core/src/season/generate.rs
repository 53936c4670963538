//! Seeded generation of a playable league, for the CLI and benchmarks.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::state::{ClubSetup, SeasonSetup};
use crate::finance::IncomeProfile;
use crate::models::{Contract, Formation, Player, PlayerAttributes, PlayerId, Position, Stadium, Team, TeamId};

/// Squad template: two keepers and cover in every line.
const SQUAD_TEMPLATE: [Position; 18] = [
    Position::GK,
    Position::GK,
    Position::LB,
    Position::CB,
    Position::CB,
    Position::CB,
    Position::RB,
    Position::CDM,
    Position::CM,
    Position::CM,
    Position::CAM,
    Position::LM,
    Position::RM,
    Position::LW,
    Position::RW,
    Position::ST,
    Position::ST,
    Position::CB,
];

const CITY_NAMES: [&str; 20] = [
    "Ashford", "Brookvale", "Carrow", "Dunmore", "Eastleigh", "Fairhaven", "Glenford", "Harrow",
    "Ivybridge", "Kingsport", "Longmere", "Marlow", "Northam", "Oakridge", "Portwell", "Queensbury",
    "Redcliff", "Stanmore", "Thornbury", "Westfield",
];

const FREE_AGENTS: u32 = 10;

/// A league of `teams` clubs whose strength, finances and stadiums vary with
/// `seed`. The same arguments always build the same league.
pub fn generate_setup(teams: u32, seed: u64) -> SeasonSetup {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let clubs = (1..=teams).map(|id| generate_club(TeamId(id), &mut rng)).collect();
    let free_agents = (0..FREE_AGENTS)
        .map(|i| {
            let position = SQUAD_TEMPLATE[(i as usize * 5) % SQUAD_TEMPLATE.len()];
            generate_player(PlayerId(90_000 + i), format!("Free Agent {}", i + 1), position, (40, 65), rng.next_u64())
        })
        .collect();
    SeasonSetup { clubs, free_agents, seed }
}

fn generate_club(id: TeamId, rng: &mut ChaCha8Rng) -> ClubSetup {
    let city = CITY_NAMES[(id.value() as usize - 1) % CITY_NAMES.len()];
    let name = if id.value() as usize > CITY_NAMES.len() {
        format!("{} {}", city, id.value())
    } else {
        city.to_string()
    };
    let short_name: String = name.chars().filter(|c| c.is_alphanumeric()).take(3).collect::<String>().to_uppercase();

    let formation = Formation::ALL[rng.gen_range(0..Formation::ALL.len())];
    let stadium = Stadium::new(rng.gen_range(15_000..=60_000), rng.gen_range(20..=60));
    let mut team = Team::new(id, format!("{} FC", name), short_name, formation, stadium);

    // Richer clubs field better squads and better grounds.
    let tier: u8 = rng.gen_range(0..=3);
    team.stadium.fan_shop = tier >= 1;
    team.stadium.roof = tier >= 2;
    team.stadium.vip_boxes = tier as u32 * 10;
    let rating = (50 + tier * 8, 62 + tier * 8);
    let players: Vec<Player> = SQUAD_TEMPLATE
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let player_id = PlayerId(id.value() * 100 + i as u32);
            generate_player(player_id, format!("{} Player {}", name, i + 1), *position, rating, rng.next_u64())
                .with_team(id)
        })
        .collect();
    team.roster = players.iter().map(|p| p.id).collect();

    let scale = 1 + tier as i64;
    ClubSetup {
        team,
        players,
        opening_balance: 10_000_000 * scale,
        income: IncomeProfile {
            tv_rights_per_season: 15_000_000 + 5_000_000 * scale,
            sponsorship_per_season: 2_000_000 * scale,
        },
    }
}

fn generate_player(id: PlayerId, name: String, position: Position, rating: (u8, u8), seed: u64) -> Player {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let base = rng.gen_range(rating.0..=rating.1);
    let spread = |rng: &mut ChaCha8Rng, bias: i16| -> u8 {
        (base as i16 + bias + rng.gen_range(-6i16..=6)).clamp(1, 99) as u8
    };
    let (attack_bias, defense_bias) = match position {
        Position::GK => (-30, 8),
        Position::LB | Position::CB | Position::RB => (-12, 6),
        Position::CDM | Position::CM | Position::LM | Position::RM => (0, 0),
        Position::CAM | Position::LW | Position::RW | Position::ST => (6, -12),
    };
    let attributes = PlayerAttributes::new(
        spread(&mut rng, attack_bias),
        spread(&mut rng, defense_bias),
        rng.gen_range(50..=90),
        rng.gen_range(40..=80),
    );
    let age = rng.gen_range(18..=34);
    let wage = 5_000 + base as i64 * 300 + rng.gen_range(0i64..=5_000);
    let contract = Contract { wage, expires_season: 2025 + rng.gen_range(1u16..=4) };
    let market_value = base as i64 * base as i64 * 1_000;
    Player::new(id, name, age, position, attributes, contract, market_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::SeasonState;

    #[test]
    fn test_generated_league_is_valid() {
        let setup = generate_setup(18, 2025);
        assert_eq!(setup.clubs.len(), 18);
        assert_eq!(setup.free_agents.len(), FREE_AGENTS as usize);
        let state = SeasonState::from_setup(&setup).unwrap();
        assert_eq!(state.players().len(), 18 * SQUAD_TEMPLATE.len() + FREE_AGENTS as usize);
        assert!(state.free_agents().all(|p| p.team.is_none()));
        for club in &setup.clubs {
            let stadium = club.team.stadium;
            assert!(!stadium.roof || stadium.fan_shop);
            assert_eq!(stadium.vip_boxes % 10, 0);
        }
    }

    #[test]
    fn test_generation_is_seeded() {
        let a = generate_setup(6, 1);
        let b = generate_setup(6, 1);
        let c = generate_setup(6, 2);
        assert_eq!(a.clubs[3].players, b.clubs[3].players);
        assert_ne!(a.clubs[3].players, c.clubs[3].players);
    }

    #[test]
    fn test_names_beyond_city_list() {
        let setup = generate_setup(22, 9);
        assert_eq!(setup.clubs[20].team.name, "Ashford 21 FC");
        assert_eq!(setup.clubs[0].team.short_name, "ASH");
    }
}
