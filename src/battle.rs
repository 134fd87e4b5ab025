use crate::battle_log::BattleLog;
use crate::error::Result;
use crate::monster::Monster;
use crate::team::MonsterTeam;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    Attack,
    Swap,
    Special,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BattleResult {
    Team1,
    Team2,
    Draw,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::One => "team1",
            Side::Two => "team2",
        }
    }

    fn victory(self) -> BattleResult {
        match self {
            Side::One => BattleResult::Team1,
            Side::Two => BattleResult::Team2,
        }
    }
}

/// Per-side hook asked once per turn for what the active monster does.
pub trait ActionChooser {
    fn choose_action(&mut self, active: &Monster, opponent: &Monster) -> Action;
}

impl<F> ActionChooser for F
where
    F: FnMut(&Monster, &Monster) -> Action,
{
    fn choose_action(&mut self, active: &Monster, opponent: &Monster) -> Action {
        self(active, opponent)
    }
}

/// Attacks when at least as fast or at least as healthy as the opponent, otherwise swaps.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultChooser;

impl ActionChooser for DefaultChooser {
    fn choose_action(&mut self, active: &Monster, opponent: &Monster) -> Action {
        if active.speed_stat() >= opponent.speed_stat() || active.hp() >= opponent.hp() {
            Action::Attack
        } else {
            Action::Swap
        }
    }
}

pub struct RandomChooser {
    rng: SmallRng,
}

impl RandomChooser {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl ActionChooser for RandomChooser {
    fn choose_action(&mut self, _active: &Monster, _opponent: &Monster) -> Action {
        match self.rng.gen_range(0..3) {
            0 => Action::Attack,
            1 => Action::Swap,
            _ => Action::Special,
        }
    }
}

/// Replays a fixed list of actions, cycling when it runs out. An empty list always attacks.
#[derive(Clone, Debug)]
pub struct ScriptedChooser {
    actions: Vec<Action>,
    next: usize,
}

impl ScriptedChooser {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, next: 0 }
    }
}

impl ActionChooser for ScriptedChooser {
    fn choose_action(&mut self, _active: &Monster, _opponent: &Monster) -> Action {
        if self.actions.is_empty() {
            return Action::Attack;
        }
        let action = self.actions[self.next % self.actions.len()];
        self.next += 1;
        action
    }
}

#[derive(Clone, Debug)]
pub struct BattleOptions {
    pub verbosity: u8,
    /// A battle still running after this many turns is scored as a draw.
    pub max_turns: usize,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            verbosity: 0,
            max_turns: 10_000,
        }
    }
}

pub struct Battle {
    options: BattleOptions,
    turn_number: usize,
    log: BattleLog,
}

impl Battle {
    pub fn new(options: BattleOptions) -> Self {
        let log = BattleLog::new(options.verbosity);
        Battle {
            options,
            turn_number: 0,
            log,
        }
    }

    pub fn with_verbosity(verbosity: u8) -> Self {
        Self::new(BattleOptions {
            verbosity,
            ..BattleOptions::default()
        })
    }

    pub fn turn_number(&self) -> usize {
        self.turn_number
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn options(&self) -> &BattleOptions {
        &self.options
    }

    /// Runs a battle with the placeholder action rule on both sides.
    pub fn battle(&mut self, team1: &mut MonsterTeam, team2: &mut MonsterTeam) -> Result<BattleResult> {
        self.battle_with(team1, team2, &mut DefaultChooser, &mut DefaultChooser)
    }

    /// Runs a battle to completion. Both teams must be assembled and non-empty.
    /// Monsters still out when the battle ends are not returned to their teams;
    /// `MonsterTeam::regenerate_team` restores the roster afterwards.
    pub fn battle_with(
        &mut self,
        team1: &mut MonsterTeam,
        team2: &mut MonsterTeam,
        chooser1: &mut dyn ActionChooser,
        chooser2: &mut dyn ActionChooser,
    ) -> Result<BattleResult> {
        self.turn_number = 0;
        self.log.clear();
        self.log.log_matchup(team1, team2);
        debug!(%team1, %team2, "battle start");

        let active1 = team1.retrieve_from_team()?;
        let active2 = team2.retrieve_from_team()?;
        let mut arena = Arena {
            teams: [team1, team2],
            active: [active1, active2],
            log: &mut self.log,
        };

        let result = loop {
            if self.turn_number >= self.options.max_turns {
                warn!(turns = self.turn_number, "turn limit reached, scoring as draw");
                break BattleResult::Draw;
            }
            self.turn_number += 1;
            arena
                .log
                .log_turn(self.turn_number, &arena.active[0], &arena.active[1]);
            if let Some(result) = arena.process_turn(chooser1, chooser2)? {
                break result;
            }
        };

        self.log.log_result(result);
        info!(?result, turns = self.turn_number, "battle finished");
        Ok(result)
    }
}

/// State of one battle in progress: both teams and their active monsters.
struct Arena<'a> {
    teams: [&'a mut MonsterTeam; 2],
    active: [Monster; 2],
    log: &'a mut BattleLog,
}

impl Arena<'_> {
    fn process_turn(
        &mut self,
        chooser1: &mut dyn ActionChooser,
        chooser2: &mut dyn ActionChooser,
    ) -> Result<Option<BattleResult>> {
        let action1 = chooser1.choose_action(&self.active[0], &self.active[1]);
        let action2 = chooser2.choose_action(&self.active[1], &self.active[0]);
        let attacks = [
            self.resolve_non_combat(Side::One, action1)?,
            self.resolve_non_combat(Side::Two, action2)?,
        ];
        if !attacks[0] && !attacks[1] {
            return Ok(None);
        }

        let speed1 = self.active[0].speed_stat();
        let speed2 = self.active[1].speed_stat();
        match speed1.partial_cmp(&speed2) {
            Some(Ordering::Greater) => self.resolve_ordered(Side::One, attacks),
            Some(Ordering::Less) => self.resolve_ordered(Side::Two, attacks),
            _ => self.resolve_simultaneous(attacks),
        }
    }

    /// Applies swap/special immediately; returns whether the side still has an attack pending.
    fn resolve_non_combat(&mut self, side: Side, action: Action) -> Result<bool> {
        self.log.log_action(side, action, &self.active[side.index()]);
        debug!(side = side.label(), ?action, monster = self.active[side.index()].name(), "action");
        let idx = side.index();
        if action == Action::Attack {
            return Ok(true);
        }
        let team = &mut self.teams[idx];
        team.add_to_team(self.active[idx].clone())?;
        if action == Action::Special {
            team.special();
        }
        self.active[idx] = team.retrieve_from_team()?;
        self.log.log_send_out(side, &self.active[idx]);
        Ok(false)
    }

    fn send_out(&mut self, side: Side) -> Result<()> {
        let idx = side.index();
        self.active[idx] = self.teams[idx].retrieve_from_team()?;
        self.log.log_send_out(side, &self.active[idx]);
        Ok(())
    }

    fn strike(&mut self, attacker: Side) {
        let [one, two] = &mut self.active;
        let (attacking, defending) = match attacker {
            Side::One => (one, two),
            Side::Two => (two, one),
        };
        let damage = attacking.attack(defending);
        self.log.log_attack(attacking, defending, damage);
        debug!(
            attacker = attacking.name(),
            defender = defending.name(),
            damage,
            remaining = defending.hp(),
            "attack"
        );
    }

    /// Chip damage only lands when both sides attacked and both are still standing.
    fn chip_if_traded(&mut self, attacks: [bool; 2]) {
        if attacks[0] && attacks[1] && self.alive(Side::One) && self.alive(Side::Two) {
            self.chip();
        }
    }

    fn chip(&mut self) {
        for monster in &mut self.active {
            monster.set_hp(monster.hp() - 1);
        }
        self.log.log_chip(&self.active[0], &self.active[1]);
    }

    fn alive(&self, side: Side) -> bool {
        self.active[side.index()].is_alive()
    }

    fn resolve_simultaneous(&mut self, attacks: [bool; 2]) -> Result<Option<BattleResult>> {
        if attacks[0] {
            self.strike(Side::One);
        }
        if attacks[1] {
            self.strike(Side::Two);
        }
        self.chip_if_traded(attacks);
        self.resolve_faints()
    }

    /// The faster side acts first; knocking the opponent out ends the turn before it can act.
    fn resolve_ordered(&mut self, first: Side, attacks: [bool; 2]) -> Result<Option<BattleResult>> {
        let second = first.opponent();
        if attacks[first.index()] {
            self.strike(first);
            if !self.alive(second) {
                return self.knock_out(first);
            }
        }
        if attacks[second.index()] {
            self.strike(second);
            if !self.alive(first) {
                return self.knock_out(second);
            }
        }
        self.chip_if_traded(attacks);
        self.resolve_faints()
    }

    fn knock_out(&mut self, winner: Side) -> Result<Option<BattleResult>> {
        let loser = winner.opponent();
        self.log.log_faint(loser, &self.active[loser.index()]);
        self.reward(winner)?;
        self.replace_or_lose(loser)
    }

    /// Alive state is read after chip damage has been applied.
    fn resolve_faints(&mut self) -> Result<Option<BattleResult>> {
        match (self.alive(Side::One), self.alive(Side::Two)) {
            (true, true) => Ok(None),
            (false, true) => self.knock_out(Side::Two),
            (true, false) => self.knock_out(Side::One),
            (false, false) => {
                self.log.log_faint(Side::One, &self.active[0]);
                self.log.log_faint(Side::Two, &self.active[1]);
                match (self.teams[0].is_empty(), self.teams[1].is_empty()) {
                    (true, true) => Ok(Some(BattleResult::Draw)),
                    (true, false) => Ok(Some(BattleResult::Team2)),
                    (false, true) => Ok(Some(BattleResult::Team1)),
                    (false, false) => {
                        self.send_out(Side::One)?;
                        self.send_out(Side::Two)?;
                        Ok(None)
                    }
                }
            }
        }
    }

    fn reward(&mut self, side: Side) -> Result<()> {
        let idx = side.index();
        self.active[idx].level_up()?;
        self.log.log_level_up(side, &self.active[idx]);
        if self.active[idx].ready_to_evolve() {
            let evolved = self.active[idx].evolve()?;
            self.log.log_evolve(side, &self.active[idx], &evolved);
            debug!(from = self.active[idx].name(), to = evolved.name(), "evolved");
            self.active[idx] = evolved;
        }
        Ok(())
    }

    fn replace_or_lose(&mut self, side: Side) -> Result<Option<BattleResult>> {
        if self.teams[side.index()].is_empty() {
            return Ok(Some(side.opponent().victory()));
        }
        self.send_out(side)?;
        Ok(None)
    }
}
