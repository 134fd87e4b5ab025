//! Team assembly policies beyond a provided list: seeded random picks and the
//! interactive manual prompt.

use crate::error::{BattleError, Result};
use crate::model::SpeciesCatalog;
use crate::monster::Monster;
use crate::team::{MonsterTeam, SelectionMode, SortKey, TeamMode, TEAM_LIMIT};
use rand::Rng;
use std::io::{BufRead, Write};

impl MonsterTeam {
    /// Team size is uniform in `1..=TEAM_LIMIT`; each slot is uniform over the
    /// catalog's spawnable species.
    pub fn random<R: Rng>(
        team_mode: TeamMode,
        sort_key: SortKey,
        catalog: &SpeciesCatalog,
        rng: &mut R,
    ) -> Result<Self> {
        let spawnable = catalog.spawnable();
        if spawnable.is_empty() {
            return Err(BattleError::NoSpawnableSpecies);
        }
        let team_size = rng.gen_range(1..=TEAM_LIMIT);
        let mut team = MonsterTeam::empty(team_mode, SelectionMode::Random, sort_key);
        for _ in 0..team_size {
            let species = spawnable[rng.gen_range(0..spawnable.len())];
            team.add_to_team(Monster::new(species.clone())?)?;
        }
        tracing::debug!(size = team_size, team = %team, "generated random team");
        Ok(team.seal())
    }

    /// Prompts on `output` and reads answers from `input` until a valid team is
    /// chosen. Invalid answers are re-asked; running out of input is an error.
    pub fn manual<R: BufRead, W: Write>(
        team_mode: TeamMode,
        sort_key: SortKey,
        catalog: &SpeciesCatalog,
        mut input: R,
        mut output: W,
    ) -> Result<Self> {
        let team_size = loop {
            let answer = prompt(&mut input, &mut output, "How many monsters are there? ")?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=TEAM_LIMIT).contains(&n) => break n,
                _ => writeln!(output, "Please provide a number between 1 and {TEAM_LIMIT}.")?,
            }
        };

        let mut team = MonsterTeam::empty(team_mode, SelectionMode::Manual, sort_key);
        for _ in 0..team_size {
            list_species(catalog, &mut output)?;
            loop {
                let answer = prompt(&mut input, &mut output, "Which monster are you spawning? ")?;
                let chosen = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|idx| catalog.iter().nth(idx));
                match chosen {
                    Some(species) if species.can_be_spawned() => {
                        team.add_to_team(Monster::new(species.clone())?)?;
                        break;
                    }
                    Some(_) => writeln!(output, "This monster cannot be spawned.")?,
                    None => writeln!(
                        output,
                        "Please provide a number between 1 and {}.",
                        catalog.len()
                    )?,
                }
            }
        }
        Ok(team.seal())
    }
}

fn list_species<W: Write>(catalog: &SpeciesCatalog, output: &mut W) -> Result<()> {
    writeln!(output, "MONSTERS are:")?;
    for (idx, species) in catalog.iter().enumerate() {
        let mark = if species.can_be_spawned() { "✔️" } else { "❌" };
        writeln!(output, "{}: {} [{mark}]", idx + 1, species.name)?;
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(BattleError::InputExhausted);
    }
    Ok(line.trim().to_string())
}
