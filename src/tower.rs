//! The battle tower: one player team fighting a queue of enemy teams, each side
//! spending a life per lost (or drawn) battle.

use crate::battle::{Battle, BattleResult};
use crate::error::Result;
use crate::model::SpeciesCatalog;
use crate::team::{MonsterTeam, SortKey, TeamMode};
use crate::types::Element;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

pub const MIN_LIVES: u32 = 2;
pub const MAX_LIVES: u32 = 10;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TowerRound {
    pub result: BattleResult,
    pub enemy_index: usize,
    pub my_lives: u32,
    pub enemy_lives: u32,
}

pub struct BattleTower {
    battle: Battle,
    rng: SmallRng,
    my_team: Option<MonsterTeam>,
    enemy_teams: Vec<MonsterTeam>,
    current_enemy_index: usize,
}

impl BattleTower {
    pub fn new(battle: Battle, seed: u64) -> Self {
        BattleTower {
            battle,
            rng: SmallRng::seed_from_u64(seed),
            my_team: None,
            enemy_teams: Vec::new(),
            current_enemy_index: 0,
        }
    }

    pub fn set_my_team(&mut self, mut team: MonsterTeam) {
        team.lives = self.rng.gen_range(MIN_LIVES..=MAX_LIVES);
        self.my_team = Some(team);
    }

    pub fn generate_teams(&mut self, n: usize, catalog: &SpeciesCatalog) -> Result<()> {
        let mut teams = Vec::with_capacity(n);
        for _ in 0..n {
            let mut enemy = MonsterTeam::random(TeamMode::Back, SortKey::Hp, catalog, &mut self.rng)?;
            enemy.lives = self.rng.gen_range(MIN_LIVES..=MAX_LIVES);
            teams.push(enemy);
        }
        self.enemy_teams = teams;
        self.current_enemy_index = 0;
        Ok(())
    }

    /// Queues already assembled enemy teams, keeping their current lives.
    pub fn set_enemy_teams(&mut self, teams: Vec<MonsterTeam>) {
        self.enemy_teams = teams;
        self.current_enemy_index = 0;
    }

    pub fn battles_remaining(&self) -> bool {
        let Some(my_team) = &self.my_team else {
            return false;
        };
        my_team.lives > 0
            && self.enemy_teams.iter().any(|enemy| enemy.lives > 0)
            && self.current_enemy_index < self.enemy_teams.len()
    }

    /// Fights the next enemy in the queue. Returns `None` once no battles remain.
    pub fn next_battle(&mut self) -> Result<Option<TowerRound>> {
        if !self.battles_remaining() {
            return Ok(None);
        }
        let enemy_index = self.current_enemy_index;
        let (Some(my_team), Some(enemy)) = (
            self.my_team.as_mut(),
            self.enemy_teams.get_mut(enemy_index),
        ) else {
            return Ok(None);
        };

        let result = self.battle.battle(my_team, enemy)?;
        self.current_enemy_index += 1;

        match result {
            BattleResult::Team1 => enemy.lives = enemy.lives.saturating_sub(1),
            BattleResult::Team2 => my_team.lives = my_team.lives.saturating_sub(1),
            BattleResult::Draw => {
                my_team.lives = my_team.lives.saturating_sub(1);
                enemy.lives = enemy.lives.saturating_sub(1);
            }
        }
        my_team.regenerate_team()?;
        enemy.regenerate_team()?;

        tracing::info!(
            ?result,
            enemy = enemy_index,
            my_lives = my_team.lives,
            enemy_lives = enemy.lives,
            "tower round"
        );
        Ok(Some(TowerRound {
            result,
            enemy_index,
            my_lives: my_team.lives,
            enemy_lives: enemy.lives,
        }))
    }

    /// Elements the previous enemy fielded that neither the player's team nor the
    /// upcoming enemy brings, in element order.
    pub fn out_of_meta(&self) -> Vec<Element> {
        if !self.battles_remaining() || self.current_enemy_index == 0 {
            return Vec::new();
        }
        let (Some(my_team), Some(previous), Some(upcoming)) = (
            self.my_team.as_ref(),
            self.enemy_teams.get(self.current_enemy_index - 1),
            self.enemy_teams.get(self.current_enemy_index),
        ) else {
            return Vec::new();
        };
        let present: BTreeSet<Element> = my_team
            .monsters()
            .iter()
            .chain(upcoming.monsters())
            .map(|m| m.element())
            .collect();
        previous
            .monsters()
            .iter()
            .map(|m| m.element())
            .filter(|element| !present.contains(element))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    pub fn my_team(&self) -> Option<&MonsterTeam> {
        self.my_team.as_ref()
    }

    pub fn enemy_teams(&self) -> &[MonsterTeam] {
        &self.enemy_teams
    }

    pub fn current_enemy_index(&self) -> usize {
        self.current_enemy_index
    }
}
