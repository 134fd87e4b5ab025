use crate::error::{BattleError, Result};
use crate::model::Species;
use crate::stats::StatLine;
use crate::types::{effectiveness, Element};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_MONSTER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a spawned monster. Clones share it; evolving produces a new one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MonsterId(u64);

impl MonsterId {
    fn next() -> Self {
        MonsterId(NEXT_MONSTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct Monster {
    id: MonsterId,
    species: Arc<Species>,
    level: u32,
    original_level: u32,
    hp: i64,
    // max HP minus current HP; carried across level-ups and evolution instead of raw HP.
    hp_deficit: i64,
    stats: StatLine,
}

impl Monster {
    pub fn new(species: Arc<Species>) -> Result<Self> {
        Self::at_level(species, 1)
    }

    /// Spawns a monster at `level` (levels start at 1) with full HP.
    pub fn at_level(species: Arc<Species>, level: u32) -> Result<Self> {
        let level = level.max(1);
        let stats = species.stats.at_level(level)?;
        Ok(Monster {
            id: MonsterId::next(),
            species,
            level,
            original_level: level,
            hp: stats.max_hp,
            hp_deficit: 0,
            stats,
        })
    }

    pub fn id(&self) -> MonsterId {
        self.id
    }

    pub fn species(&self) -> &Arc<Species> {
        &self.species
    }

    pub fn name(&self) -> &str {
        &self.species.name
    }

    pub fn element(&self) -> Element {
        self.species.element
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn original_level(&self) -> u32 {
        self.original_level
    }

    pub fn hp(&self) -> i64 {
        self.hp
    }

    pub fn hp_deficit(&self) -> i64 {
        self.hp_deficit
    }

    pub fn set_hp(&mut self, value: i64) {
        self.hp = value;
        self.hp_deficit = self.stats.max_hp - value;
    }

    pub fn attack_stat(&self) -> f64 {
        self.stats.attack
    }

    pub fn defense_stat(&self) -> f64 {
        self.stats.defense
    }

    pub fn speed_stat(&self) -> f64 {
        self.stats.speed
    }

    pub fn max_hp(&self) -> i64 {
        self.stats.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn level_up(&mut self) -> Result<()> {
        let level = self.level + 1;
        self.stats = self.species.stats.at_level(level)?;
        self.level = level;
        self.hp = self.stats.max_hp - self.hp_deficit;
        Ok(())
    }

    pub fn ready_to_evolve(&self) -> bool {
        self.species.evolution.is_some() && self.level != self.original_level
    }

    /// Builds the evolved form at the current level, keeping the same HP deficit.
    pub fn evolve(&self) -> Result<Monster> {
        let target = match &self.species.evolution {
            Some(target) if self.ready_to_evolve() => target.clone(),
            _ => return Err(BattleError::NotReadyToEvolve(self.name().to_string())),
        };
        let mut evolved = Monster::at_level(target, self.level)?;
        evolved.set_hp(evolved.max_hp() - self.hp_deficit);
        Ok(evolved)
    }

    /// Hits `other` and returns the damage dealt.
    pub fn attack(&self, other: &mut Monster) -> i64 {
        let damage = raw_damage(self.attack_stat(), other.defense_stat());
        let multiplier = effectiveness(self.element(), other.element());
        let dealt = (damage * multiplier).ceil() as i64;
        other.set_hp(other.hp - dealt);
        dealt
    }

    /// Back to the creation level at full HP.
    pub fn reset(&mut self) -> Result<()> {
        self.stats = self.species.stats.at_level(self.original_level)?;
        self.level = self.original_level;
        self.set_hp(self.stats.max_hp);
        Ok(())
    }
}

/// Damage before elemental effectiveness for attack `attack` against defense `defense`.
pub fn raw_damage(attack: f64, defense: f64) -> f64 {
    if defense < attack / 2.0 {
        attack - defense
    } else if defense < attack {
        attack * 5.0 / 8.0 - defense / 4.0
    } else {
        attack / 4.0
    }
}

impl fmt::Display for Monster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LV.{} {}, {}/{} HP",
            self.level,
            self.name(),
            self.hp,
            self.max_hp()
        )
    }
}
