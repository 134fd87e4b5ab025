use crate::battle::{Action, BattleResult, Side};
use crate::monster::Monster;
use crate::team::MonsterTeam;
use serde_json::json;

/// Human-readable battle transcript. Higher verbosity records more detail:
/// 1 = matchup, faints, level-ups and the result; 2 = every turn and action;
/// 3 = chip damage as well.
#[derive(Clone, Debug, Default)]
pub struct BattleLog {
    verbosity: u8,
    log: Vec<String>,
}

impl BattleLog {
    pub fn new(verbosity: u8) -> Self {
        Self {
            verbosity,
            log: Vec::new(),
        }
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    fn push(&mut self, level: u8, line: String) {
        if self.verbosity >= level {
            self.log.push(line);
        }
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn log_matchup(&mut self, team1: &MonsterTeam, team2: &MonsterTeam) {
        self.push(1, format!("|matchup|{team1}|{team2}"));
    }

    pub fn log_turn(&mut self, turn: usize, active1: &Monster, active2: &Monster) {
        self.push(2, format!("|turn|{turn}|{active1}|{active2}"));
    }

    pub fn log_action(&mut self, side: Side, action: Action, monster: &Monster) {
        self.push(2, format!("|{}|{:?}|{}", side.label(), action, monster.name()));
    }

    pub fn log_attack(&mut self, attacker: &Monster, defender: &Monster, damage: i64) {
        self.push(
            2,
            format!(
                "|attack|{}|{}|{damage}|{}/{}",
                attacker.name(),
                defender.name(),
                defender.hp(),
                defender.max_hp()
            ),
        );
    }

    pub fn log_chip(&mut self, active1: &Monster, active2: &Monster) {
        self.push(3, format!("|chip|{active1}|{active2}"));
    }

    pub fn log_faint(&mut self, side: Side, monster: &Monster) {
        self.push(1, format!("|faint|{}|{}", side.label(), monster.name()));
    }

    pub fn log_level_up(&mut self, side: Side, monster: &Monster) {
        self.push(1, format!("|levelup|{}|{monster}", side.label()));
    }

    pub fn log_evolve(&mut self, side: Side, from: &Monster, to: &Monster) {
        self.push(
            1,
            format!("|evolve|{}|{}|{}", side.label(), from.name(), to.name()),
        );
    }

    pub fn log_send_out(&mut self, side: Side, monster: &Monster) {
        self.push(2, format!("|switch|{}|{monster}", side.label()));
    }

    pub fn log_result(&mut self, result: BattleResult) {
        self.push(1, format!("|result|{result:?}"));
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "verbosity": self.verbosity,
            "log": self.log,
        })
    }
}
