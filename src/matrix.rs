use crate::battle::{Battle, BattleOptions, BattleResult};
use crate::error::Result;
use crate::model::Roster;
use rayon::prelude::*;

struct CellResult {
    row: usize,
    col: usize,
    score: f64,
}

fn score(result: BattleResult) -> f64 {
    match result {
        BattleResult::Team1 => 1.0,
        BattleResult::Draw => 0.5,
        BattleResult::Team2 => 0.0,
    }
}

/// Plays every roster team against every other (including itself) with freshly
/// assembled teams. Cell `[row][col]` scores the row team: 1 win, 0.5 draw, 0 loss.
pub fn compute_matrix(roster: &Roster, options: &BattleOptions) -> Result<Vec<Vec<f64>>> {
    let n = roster.teams.len();
    let tasks: Vec<(usize, usize)> = (0..n)
        .flat_map(|row| (0..n).map(move |col| (row, col)))
        .collect();
    let cells: Vec<CellResult> = tasks
        .par_iter()
        .map(|&(row, col)| -> Result<CellResult> {
            let mut team1 = roster.build_team(row)?;
            let mut team2 = roster.build_team(col)?;
            let mut battle = Battle::new(options.clone());
            let result = battle.battle(&mut team1, &mut team2)?;
            Ok(CellResult {
                row,
                col,
                score: score(result),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut matrix = vec![vec![0.0; n]; n];
    for cell in cells {
        matrix[cell.row][cell.col] = cell.score;
    }
    Ok(matrix)
}

pub fn to_csv(matrix: &[Vec<f64>], names: &[String]) -> String {
    let mut out = String::from("team");
    for name in names {
        out.push(',');
        out.push_str(name);
    }
    for (row_idx, row) in matrix.iter().enumerate() {
        out.push('\n');
        out.push_str(names.get(row_idx).map(String::as_str).unwrap_or(""));
        for value in row {
            out.push_str(&format!(",{value:.1}"));
        }
    }
    out
}

pub fn write_csv(matrix: &[Vec<f64>], names: &[String], path: &std::path::Path) -> anyhow::Result<()> {
    std::fs::write(path, to_csv(matrix, names))?;
    Ok(())
}
