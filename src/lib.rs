pub mod battle;
pub mod battle_log;
pub mod error;
pub mod matrix;
pub mod model;
pub mod monster;
pub mod selection;
pub mod stats;
pub mod team;
pub mod tower;
pub mod types;

use crate::battle::{Battle, BattleOptions};
use crate::model::{Roster, RosterFile};
use crate::tower::BattleTower;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub use crate::error::{BattleError, Result};

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub roster_path: PathBuf,
    pub output_path: PathBuf,
    pub seed: u64,
    pub verbosity: u8,
    /// Run a tower of this many random enemy teams instead of the round-robin matrix.
    pub tower_rounds: Option<usize>,
}

pub fn load_roster(path: &Path) -> anyhow::Result<Roster> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file at {}", path.display()))?;
    let parsed: RosterFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    let roster = Roster::from_file(parsed)
        .with_context(|| format!("Invalid roster in {}", path.display()))?;
    Ok(roster)
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    let roster = load_roster(&opts.roster_path)?;
    if roster.teams.is_empty() {
        anyhow::bail!("{} defines no teams", opts.roster_path.display());
    }
    let battle_options = BattleOptions {
        verbosity: opts.verbosity,
        ..BattleOptions::default()
    };
    match opts.tower_rounds {
        Some(rounds) => run_tower(&roster, battle_options, rounds, opts.seed),
        None => {
            let matrix = matrix::compute_matrix(&roster, &battle_options)?;
            let names: Vec<String> = roster.teams.iter().map(|t| t.name.clone()).collect();
            matrix::write_csv(&matrix, &names, &opts.output_path)?;
            println!(
                "Wrote {}x{} matrix to {}",
                matrix.len(),
                matrix.first().map(|r| r.len()).unwrap_or(0),
                opts.output_path.display()
            );
            Ok(())
        }
    }
}

fn run_tower(roster: &Roster, options: BattleOptions, rounds: usize, seed: u64) -> anyhow::Result<()> {
    let my_team = roster
        .build_team(0)
        .context("Failed to assemble the player team")?;
    let mut tower = BattleTower::new(Battle::new(options), seed);
    tower.set_my_team(my_team);
    tower.generate_teams(rounds, &roster.catalog)?;
    println!(
        "{} ({} lives) enters the tower against {} teams",
        roster.teams[0].name,
        tower.my_team().map(|t| t.lives).unwrap_or(0),
        rounds
    );
    while let Some(round) = tower.next_battle()? {
        let log = tower.battle().log();
        if log.verbosity() > 0 {
            for line in log.log_lines() {
                println!("{line}");
            }
        }
        println!(
            "Round {}: {:?} (lives: you {}, enemy {})",
            round.enemy_index + 1,
            round.result,
            round.my_lives,
            round.enemy_lives
        );
        let meta = tower.out_of_meta();
        if !meta.is_empty() {
            let names: Vec<&str> = meta.iter().map(|e| e.name()).collect();
            println!("Out of meta: {}", names.join(", "));
        }
    }
    Ok(())
}
