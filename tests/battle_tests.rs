mod common;

use common::{fixed_stats, formula_stats, make_team, names, plain, roster_path};
use monster_tower::battle::{
    Action, Battle, BattleOptions, BattleResult, RandomChooser, ScriptedChooser,
};
use monster_tower::error::BattleError;
use monster_tower::load_roster;
use monster_tower::matrix::{compute_matrix, to_csv};
use monster_tower::model::Species;
use monster_tower::monster::Monster;
use monster_tower::stats::FormulaError;
use monster_tower::team::TeamMode;
use monster_tower::types::Element;
use std::sync::Arc;

fn verbose_battle() -> Battle {
    Battle::with_verbosity(3)
}

fn lines_with(battle: &Battle, prefix: &str) -> Vec<String> {
    battle
        .log()
        .log_lines()
        .iter()
        .filter(|line| line.starts_with(prefix))
        .cloned()
        .collect()
}

fn always_attack() -> ScriptedChooser {
    ScriptedChooser::new(Vec::new())
}

#[test]
fn faster_monster_knocks_out_before_the_reply() {
    let mut team1 = make_team(TeamMode::Back, &[plain("Striker", 20, 1, 9, 5)]);
    let mut team2 = make_team(TeamMode::Back, &[plain("Target", 20, 1, 1, 5)]);
    let mut battle = verbose_battle();
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut always_attack(), &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Team1);
    assert_eq!(battle.turn_number(), 1);
    let attacks = lines_with(&battle, "|attack|");
    assert_eq!(attacks, ["|attack|Striker|Target|19|-14/5"]);
    assert!(lines_with(&battle, "|chip|").is_empty());
}

#[test]
fn equal_speed_trades_blows_and_chips() {
    // 1 damage per hit, plus 1 chip while both survive: 3 -> 1 -> dead on turn 2.
    let mut team1 = make_team(TeamMode::Back, &[plain("Left", 4, 8, 5, 3)]);
    let mut team2 = make_team(TeamMode::Back, &[plain("Right", 4, 8, 5, 3)]);
    let mut battle = verbose_battle();
    let result = battle.battle(&mut team1, &mut team2).unwrap();
    assert_eq!(result, BattleResult::Draw);
    assert_eq!(battle.turn_number(), 2);
    assert_eq!(lines_with(&battle, "|chip|").len(), 1);
}

#[test]
fn ordered_turn_also_chips_when_both_survive() {
    // Without chip damage Fast would win on turn 3; with it both drop to 0 on turn 2.
    let mut team1 = make_team(TeamMode::Back, &[plain("Fast", 4, 8, 6, 4)]);
    let mut team2 = make_team(TeamMode::Back, &[plain("Slow", 4, 8, 5, 4)]);
    let mut battle = verbose_battle();
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut always_attack(), &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Draw);
    assert_eq!(battle.turn_number(), 2);
}

#[test]
fn double_faint_goes_to_the_side_with_reserves() {
    let mut team1 = make_team(TeamMode::Back, &[plain("Left", 4, 8, 5, 3)]);
    let mut team2 = make_team(
        TeamMode::Back,
        &[plain("Right", 4, 8, 5, 3), plain("Reserve", 4, 8, 5, 3)],
    );
    let mut battle = verbose_battle();
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut always_attack(), &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Team2);
    assert_eq!(battle.turn_number(), 2);
}

#[test]
fn double_faint_with_reserves_on_both_sides_continues() {
    let mut team1 = make_team(
        TeamMode::Back,
        &[plain("Left", 4, 8, 5, 3), plain("Left2", 4, 8, 5, 3)],
    );
    let mut team2 = make_team(
        TeamMode::Back,
        &[plain("Right", 4, 8, 5, 3), plain("Right2", 4, 8, 5, 3)],
    );
    let mut battle = verbose_battle();
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut always_attack(), &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Draw);
    assert_eq!(battle.turn_number(), 4);
    assert_eq!(lines_with(&battle, "|faint|").len(), 4);
    assert_eq!(lines_with(&battle, "|switch|team1|"), ["|switch|team1|LV.1 Left2, 3/3 HP"]);
}

#[test]
fn winner_levels_up_and_evolves() {
    let evolved = Arc::new(
        Species::new("Blaze", Element::Normal, fixed_stats(20, 5, 9, 30)).with_spawnable(false),
    );
    let base = Arc::new(
        Species::new("Spark", Element::Normal, fixed_stats(20, 5, 9, 10))
            .with_evolution(evolved),
    );
    let mut team1 = make_team(TeamMode::Back, &[base]);
    let mut team2 = make_team(
        TeamMode::Back,
        &[plain("Weak", 1, 1, 1, 5), plain("Weaker", 1, 1, 1, 5)],
    );
    let mut battle = Battle::with_verbosity(1);
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut always_attack(), &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Team1);
    assert_eq!(
        battle.log().log_lines(),
        [
            "|matchup|[LV.1 Spark, 10/10 HP]|[LV.1 Weak, 5/5 HP, LV.1 Weaker, 5/5 HP]",
            "|faint|team2|Weak",
            "|levelup|team1|LV.2 Spark, 10/10 HP",
            "|evolve|team1|Spark|Blaze",
            "|faint|team2|Weaker",
            "|levelup|team1|LV.3 Blaze, 30/30 HP",
            "|result|Team1",
        ]
    );
    let exported = battle.log().to_json();
    assert_eq!(exported["verbosity"], 1);
    assert_eq!(exported["log"].as_array().map(Vec::len), Some(7));
}

#[test]
fn swap_brings_out_the_next_monster_before_combat() {
    let mut team1 = make_team(
        TeamMode::Back,
        &[plain("Lead", 1, 1, 1, 5), plain("Ace", 20, 1, 9, 5)],
    );
    let mut team2 = make_team(TeamMode::Back, &[plain("Foe", 1, 20, 5, 3)]);
    let mut battle = Battle::with_verbosity(2);
    let mut script = ScriptedChooser::new(vec![Action::Swap, Action::Attack]);
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut script, &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Team1);
    assert_eq!(battle.turn_number(), 2);
    assert_eq!(lines_with(&battle, "|switch|"), ["|switch|team1|LV.1 Ace, 5/5 HP"]);
    assert_eq!(
        lines_with(&battle, "|attack|"),
        ["|attack|Foe|Ace|1|4/5", "|attack|Ace|Foe|5|-2/3"]
    );
}

#[test]
fn side_that_swaps_takes_no_chip_damage() {
    let mut team1 = make_team(TeamMode::Back, &[plain("Idle", 4, 8, 5, 10)]);
    let mut team2 = make_team(TeamMode::Back, &[plain("Hitter", 4, 8, 5, 10)]);
    let mut seen = Vec::new();
    let mut idle = |active: &Monster, opponent: &Monster| {
        seen.push((active.hp(), opponent.hp()));
        Action::Swap
    };
    let mut battle = Battle::new(BattleOptions {
        verbosity: 3,
        max_turns: 2,
    });
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut idle, &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Draw);
    // Idle loses only the hit each turn; Hitter is never touched.
    assert_eq!(seen, [(10, 10), (9, 10)]);
    assert_eq!(
        lines_with(&battle, "|attack|"),
        ["|attack|Hitter|Idle|1|9/10", "|attack|Hitter|Idle|1|8/10"]
    );
    assert!(lines_with(&battle, "|chip|").is_empty());
}

#[test]
fn special_reorders_the_team_then_sends_out_the_front() {
    let species = [
        plain("A", 5, 5, 5, 50),
        plain("B", 5, 5, 5, 50),
        plain("C", 5, 5, 5, 50),
    ];
    // Front mode stacks these as [C, B, A].
    let mut team1 = make_team(TeamMode::Front, &species);
    let mut team2 = make_team(TeamMode::Back, &[plain("Foe", 5, 5, 5, 50)]);
    let mut battle = Battle::new(BattleOptions {
        verbosity: 2,
        max_turns: 1,
    });
    let mut script = ScriptedChooser::new(vec![Action::Special]);
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut script, &mut always_attack())
        .unwrap();
    assert_eq!(result, BattleResult::Draw);
    assert_eq!(battle.turn_number(), 1);
    assert_eq!(lines_with(&battle, "|switch|"), ["|switch|team1|LV.1 A, 50/50 HP"]);
    assert_eq!(names(&team1), ["B", "C"]);
}

#[test]
fn nobody_attacking_ends_the_turn_quietly() {
    let mut team1 = make_team(TeamMode::Back, &[plain("A", 5, 5, 5, 5)]);
    let mut team2 = make_team(TeamMode::Back, &[plain("B", 5, 5, 5, 5)]);
    let mut battle = Battle::new(BattleOptions {
        verbosity: 3,
        max_turns: 3,
    });
    let mut swap1 = ScriptedChooser::new(vec![Action::Swap]);
    let mut swap2 = ScriptedChooser::new(vec![Action::Swap]);
    let result = battle
        .battle_with(&mut team1, &mut team2, &mut swap1, &mut swap2)
        .unwrap();
    assert_eq!(result, BattleResult::Draw);
    assert_eq!(battle.turn_number(), 3);
    assert!(lines_with(&battle, "|attack|").is_empty());
    assert!(lines_with(&battle, "|chip|").is_empty());
}

#[test]
fn choosers_see_the_live_matchup() {
    let mut team1 = make_team(TeamMode::Back, &[plain("Left", 4, 8, 5, 3)]);
    let mut team2 = make_team(TeamMode::Back, &[plain("Right", 4, 8, 5, 3)]);
    let mut seen = Vec::new();
    let mut record = |active: &Monster, _opponent: &Monster| {
        seen.push(active.hp());
        Action::Attack
    };
    let mut battle = Battle::with_verbosity(0);
    battle
        .battle_with(&mut team1, &mut team2, &mut record, &mut always_attack())
        .unwrap();
    assert_eq!(seen, [3, 1]);
    assert!(battle.log().log_lines().is_empty());
}

#[test]
fn battle_needs_two_assembled_teams() {
    let mut team1 = make_team(TeamMode::Back, &[plain("A", 5, 5, 5, 5)]);
    let mut team2 = make_team(TeamMode::Back, &[plain("B", 5, 5, 5, 5)]);
    team2.retrieve_from_team().unwrap();
    let err = Battle::with_verbosity(0)
        .battle(&mut team1, &mut team2)
        .unwrap_err();
    assert!(matches!(err, BattleError::EmptyTeam));
}

#[test]
fn formula_failure_on_level_up_aborts_the_battle() {
    // Attack is 8 / (2 - level): fine at level 1, divides by zero at level 2.
    let fragile = Arc::new(Species::new(
        "Fragile",
        Element::Normal,
        formula_stats(&["8", "2", "level", "-", "/"], &["1"], &["9"], &["10"]),
    ));
    let mut team1 = make_team(TeamMode::Back, &[fragile]);
    let mut team2 = make_team(TeamMode::Back, &[plain("Victim", 1, 1, 1, 5)]);
    let err = Battle::with_verbosity(0)
        .battle_with(&mut team1, &mut team2, &mut always_attack(), &mut always_attack())
        .unwrap_err();
    assert!(matches!(
        err,
        BattleError::Formula(FormulaError::DivisionByZero(4))
    ));
}

#[test]
fn roster_battles_terminate_and_regenerate() {
    let roster = load_roster(&roster_path()).unwrap();
    let mut battle = Battle::with_verbosity(0);
    for i in 0..roster.teams.len() {
        for j in 0..roster.teams.len() {
            let mut team1 = roster.build_team(i).unwrap();
            let mut team2 = roster.build_team(j).unwrap();
            let size = team1.len();
            let mut chooser1 = RandomChooser::new((i * 10 + j) as u64);
            let mut chooser2 = RandomChooser::new((j * 10 + i) as u64);
            battle
                .battle_with(&mut team1, &mut team2, &mut chooser1, &mut chooser2)
                .unwrap();
            assert!(battle.turn_number() <= battle.options().max_turns);
            team1.regenerate_team().unwrap();
            assert_eq!(team1.len(), size);
            assert!(team1.monsters().iter().all(|m| m.hp() == m.max_hp()));
        }
    }
}

#[test]
fn matrix_scores_every_pairing() {
    let roster = load_roster(&roster_path()).unwrap();
    let matrix = compute_matrix(&roster, &BattleOptions::default()).unwrap();
    let n = roster.teams.len();
    assert_eq!(matrix.len(), n);
    assert!(matrix.iter().all(|row| row.len() == n));
    assert!(matrix
        .iter()
        .flatten()
        .all(|score| [0.0, 0.5, 1.0].contains(score)));
    for i in 0..n {
        assert_eq!(matrix[i][i], 0.5);
        for j in 0..n {
            assert_eq!(matrix[i][j] + matrix[j][i], 1.0);
        }
    }
}

#[test]
fn matrix_csv_has_a_header_row() {
    let names = vec!["Red".to_string(), "Blue".to_string()];
    let csv = to_csv(&[vec![0.5, 1.0], vec![0.0, 0.5]], &names);
    assert_eq!(csv, "team,Red,Blue\nRed,0.5,1.0\nBlue,0.0,0.5");
}
