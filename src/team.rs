use crate::error::{BattleError, Result};
use crate::model::Species;
use crate::monster::Monster;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

pub const TEAM_LIMIT: usize = 6;
pub const DEFAULT_LIVES: u32 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamMode {
    Front,
    Back,
    #[serde(alias = "optimize")]
    Optimise,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SelectionMode {
    Random,
    Manual,
    Provided,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Hp,
    Attack,
    Defense,
    Speed,
    Level,
}

impl SortKey {
    pub fn value(self, monster: &Monster) -> f64 {
        match self {
            SortKey::Hp => monster.hp() as f64,
            SortKey::Attack => monster.attack_stat(),
            SortKey::Defense => monster.defense_stat(),
            SortKey::Speed => monster.speed_stat(),
            SortKey::Level => monster.level() as f64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonsterTeam {
    group: Vec<Monster>,
    original: Vec<Monster>,
    team_mode: TeamMode,
    selection_mode: SelectionMode,
    sort_key: SortKey,
    reversed: bool,
    pub lives: u32,
}

impl MonsterTeam {
    pub(crate) fn empty(team_mode: TeamMode, selection_mode: SelectionMode, sort_key: SortKey) -> Self {
        MonsterTeam {
            group: Vec::new(),
            original: Vec::new(),
            team_mode,
            selection_mode,
            sort_key,
            reversed: false,
            lives: DEFAULT_LIVES,
        }
    }

    /// Freezes the assembled roster as the snapshot used by `regenerate_team`.
    pub(crate) fn seal(mut self) -> Self {
        if self.team_mode == TeamMode::Optimise {
            self.sort_group();
        }
        self.original = self.group.clone();
        self
    }

    /// Builds a team from species in the given order. Fails if the count is outside
    /// `1..=TEAM_LIMIT` or any species cannot be spawned.
    pub fn from_provided(
        team_mode: TeamMode,
        sort_key: SortKey,
        provided: &[Arc<Species>],
    ) -> Result<Self> {
        if provided.is_empty() || provided.len() > TEAM_LIMIT {
            return Err(BattleError::InvalidTeamSize(provided.len()));
        }
        let mut team = MonsterTeam::empty(team_mode, SelectionMode::Provided, sort_key);
        for species in provided {
            if !species.can_be_spawned() {
                return Err(BattleError::NotSpawnable(species.name.clone()));
            }
            team.add_to_team(Monster::new(species.clone())?)?;
        }
        Ok(team.seal())
    }

    pub fn add_to_team(&mut self, monster: Monster) -> Result<()> {
        if self.group.len() >= TEAM_LIMIT {
            return Err(BattleError::TeamFull);
        }
        match self.team_mode {
            TeamMode::Front => self.group.insert(0, monster),
            TeamMode::Back => self.group.push(monster),
            TeamMode::Optimise => {
                self.group.push(monster);
                self.sort_group();
            }
        }
        Ok(())
    }

    pub fn retrieve_from_team(&mut self) -> Result<Monster> {
        if self.group.is_empty() {
            return Err(BattleError::EmptyTeam);
        }
        Ok(self.group.remove(0))
    }

    /// Stable insertion sort on the sort key; ascending unless reversed.
    pub fn sort_group(&mut self) {
        let key = self.sort_key;
        let reversed = self.reversed;
        let out_of_order = |before: &Monster, after: &Monster| {
            let (b, a) = (key.value(before), key.value(after));
            if reversed {
                b < a
            } else {
                b > a
            }
        };
        for i in 1..self.group.len() {
            let mut j = i;
            while j > 0 && out_of_order(&self.group[j - 1], &self.group[j]) {
                self.group.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    pub fn special(&mut self) {
        match self.team_mode {
            TeamMode::Front => {
                let n = self.group.len().min(3);
                self.group[..n].reverse();
            }
            TeamMode::Back => {
                let len = self.group.len();
                let front_len = len / 2;
                let back_start = len - front_len;
                let mut front = std::mem::take(&mut self.group);
                let mut rotated: Vec<Monster> = front.drain(back_start..).rev().collect();
                // Odd counts leave the true middle element between the two halves.
                rotated.extend(front.drain(front_len..));
                rotated.extend(front);
                self.group = rotated;
            }
            TeamMode::Optimise => {
                self.reversed = !self.reversed;
                self.sort_group();
            }
        }
    }

    /// Restores the assembled roster, each monster back at its creation level with full HP.
    pub fn regenerate_team(&mut self) -> Result<()> {
        let mut group = self.original.clone();
        for monster in &mut group {
            monster.reset()?;
        }
        self.group = group;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.group
    }

    pub fn original(&self) -> &[Monster] {
        &self.original
    }

    pub fn team_mode(&self) -> TeamMode {
        self.team_mode
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }
}

impl fmt::Display for MonsterTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, monster) in self.group.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{monster}")?;
        }
        f.write_str("]")
    }
}
