//! Season CLI
//!
//! Runs, saves, resumes and audits cm_core seasons.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cm_core::models::{FixtureId, FormResult};
use cm_core::{api, generate_setup, Season, SeasonPhase, SimConfig, StandingRow};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cm")]
#[command(about = "Simulate football league seasons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new season and play it
    Run {
        /// Number of generated clubs (ignored with --setup)
        #[arg(long, default_value_t = 18)]
        teams: u32,

        /// Season seed (ignored with --setup)
        #[arg(long, default_value_t = 2025)]
        seed: u64,

        /// League description JSON: clubs, squads, free agents and seed
        #[arg(long)]
        setup: Option<PathBuf>,

        /// YAML configuration overrides
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop after this many matchdays
        #[arg(long)]
        matchdays: Option<u16>,

        /// Save the season to this file afterwards
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print standings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Continue a saved season
    Resume {
        /// Save file to load
        #[arg(long)]
        save: PathBuf,

        /// Stop after this many matchdays
        #[arg(long)]
        matchdays: Option<u16>,

        /// Write the result here instead of back to --save
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print standings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-simulate played fixtures of a save and compare them with the record
    Replay {
        /// Save file to load
        #[arg(long)]
        save: PathBuf,

        /// Only this fixture id
        #[arg(long)]
        fixture: Option<u32>,
    },

    /// Print the default configuration as YAML
    Config,
}

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cm_cli=info,cm_core=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).init();

    let cli = Cli::parse();
    execute(cli.command)
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Run { teams, seed, setup, config, matchdays, save, json } => {
            let config = load_config(config.as_deref())?;
            let setup = match setup {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read setup {}", path.display()))?;
                    api::setup_from_json(&text).map_err(anyhow::Error::msg)?
                }
                None => generate_setup(teams, seed),
            };
            info!(clubs = setup.clubs.len(), seed = setup.seed, "Creating season");

            let mut season = Season::new(config, setup).context("Season setup rejected")?;
            play(&mut season, matchdays)?;
            print_table(&season, json)?;

            if let Some(path) = save {
                season.save_to_path(&path).with_context(|| format!("Failed to save {}", path.display()))?;
                info!(path = %path.display(), "Season saved");
            }
        }

        Commands::Resume { save, matchdays, out, json } => {
            let mut season = load(&save)?;
            play(&mut season, matchdays)?;
            print_table(&season, json)?;

            let target = out.unwrap_or(save);
            season.save_to_path(&target).with_context(|| format!("Failed to save {}", target.display()))?;
            info!(path = %target.display(), "Season saved");
        }

        Commands::Replay { save, fixture } => {
            let season = load(&save)?;
            let fixtures: Vec<FixtureId> = match fixture {
                Some(id) => vec![FixtureId(id)],
                None => season.state().calendar().played().map(|f| f.id).collect(),
            };
            if fixtures.is_empty() {
                bail!("No played fixtures in {}", save.display());
            }
            for id in &fixtures {
                let result = season.replay_fixture(*id).with_context(|| format!("Replay of fixture {} failed", id))?;
                println!("{:>6}  {} - {}  ok", id.to_string(), result.score.home, result.score.away);
            }
            println!("\n✅ {} fixtures replayed identically", fixtures.len());
        }

        Commands::Config => {
            print!("{}", SimConfig::default().to_yaml_string()?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let yaml = std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
    SimConfig::from_yaml_str(&yaml).with_context(|| format!("Invalid config {}", path.display()))
}

fn load(path: &Path) -> Result<Season> {
    let season = Season::load_from_path(path).with_context(|| format!("Failed to load {}", path.display()))?;
    info!(
        path = %path.display(),
        matchday = season.state().current_matchday(),
        "Season loaded"
    );
    Ok(season)
}

/// Starts the season if needed and plays up to `limit` matchdays.
fn play(season: &mut Season, limit: Option<u16>) -> Result<()> {
    if season.phase() == SeasonPhase::NotStarted {
        season.start()?;
    }

    let mut played = 0u16;
    while season.phase() == SeasonPhase::InProgress && limit.map_or(true, |l| played < l) {
        let outcome = season.advance_matchday()?;
        played += 1;

        let goals: u32 = outcome
            .report
            .outcomes
            .iter()
            .map(|o| o.result.score.home as u32 + o.result.score.away as u32)
            .sum();
        info!(matchday = outcome.report.matchday, fixtures = outcome.report.outcomes.len(), goals, "Matchday played");

        for team in &outcome.insolvent {
            warn!(team = %team, "Club is insolvent");
        }
        if let Some(summary) = &outcome.summary {
            let champion = season.state().team(summary.champion)?;
            info!(champion = %champion.name, goals = summary.total_goals, "Season finished");
        }
    }
    Ok(())
}

fn print_table(season: &Season, json: bool) -> Result<()> {
    if json {
        println!("{}", api::standings_json(season).map_err(anyhow::Error::msg)?);
        return Ok(());
    }

    let state = season.state();
    println!(
        "\nMatchday {}/{} ({:?})",
        state.current_matchday(),
        state.calendar().matchday_count(),
        state.phase()
    );
    println!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}  Form",
        "Pos", "Club", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for row in season.standings() {
        println!("{}", format_row(&row));
    }
    Ok(())
}

fn format_row(row: &StandingRow) -> String {
    let form: String = row
        .form
        .iter()
        .map(|r| match r {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        })
        .collect();
    let s = &row.stats;
    format!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}  {}",
        row.position,
        row.name,
        s.played,
        s.won,
        s.drawn,
        s.lost,
        s.goals_for,
        s.goals_against,
        row.goal_difference,
        s.points,
        form
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_resume_replay() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("league.sav");

        execute(Commands::Run {
            teams: 6,
            seed: 11,
            setup: None,
            config: None,
            matchdays: Some(3),
            save: Some(path.clone()),
            json: false,
        })
        .unwrap();
        assert_eq!(load(&path).unwrap().state().current_matchday(), 3);

        execute(Commands::Resume { save: path.clone(), matchdays: None, out: None, json: true }).unwrap();
        let season = load(&path).unwrap();
        assert_eq!(season.phase(), SeasonPhase::Finished);

        execute(Commands::Replay { save: path.clone(), fixture: None }).unwrap();
        assert!(execute(Commands::Replay { save: path, fixture: Some(10_000) }).is_err());
    }

    #[test]
    fn test_config_file_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sim.yaml");
        std::fs::write(&path, "finance:\n  pay_period_matchdays: 2\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.finance.pay_period_matchdays, 2);

        std::fs::write(&path, "finance:\n  pay_period_matchdays: 0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(Some(&dir.path().join("missing.yaml"))).is_err());
    }

    #[test]
    fn test_setup_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.json");
        std::fs::write(&path, serde_json::to_string(&generate_setup(4, 5)).unwrap()).unwrap();
        execute(Commands::Run {
            teams: 0,
            seed: 0,
            setup: Some(path),
            config: None,
            matchdays: Some(1),
            save: None,
            json: true,
        })
        .unwrap();
    }

    #[test]
    fn test_row_format() {
        let season = {
            let mut s = Season::new(SimConfig::default(), generate_setup(4, 1)).unwrap();
            s.start().unwrap();
            s.advance_matchday().unwrap();
            s
        };
        let row = &season.standings()[0];
        let line = format_row(row);
        assert!(line.starts_with("  1  "));
        assert!(line.contains(&row.name));
        assert!(line.ends_with(|c: char| matches!(c, 'W' | 'D' | 'L')));
    }
}
