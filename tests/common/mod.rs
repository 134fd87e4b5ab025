#![allow(dead_code)]

use monster_tower::model::Species;
use monster_tower::stats::{FixedStats, FormulaStats, StatFormula, StatsProvider};
use monster_tower::team::{MonsterTeam, SortKey, TeamMode};
use monster_tower::types::Element;
use std::sync::Arc;

pub fn fixed_stats(attack: u32, defense: u32, speed: u32, max_hp: u32) -> StatsProvider {
    StatsProvider::Fixed(FixedStats {
        attack,
        defense,
        speed,
        max_hp,
    })
}

pub fn formula_stats(attack: &[&str], defense: &[&str], speed: &[&str], max_hp: &[&str]) -> StatsProvider {
    StatsProvider::Formula(FormulaStats {
        attack: StatFormula::parse(attack).unwrap(),
        defense: StatFormula::parse(defense).unwrap(),
        speed: StatFormula::parse(speed).unwrap(),
        max_hp: StatFormula::parse(max_hp).unwrap(),
    })
}

pub fn make_species(
    name: &str,
    element: Element,
    attack: u32,
    defense: u32,
    speed: u32,
    max_hp: u32,
) -> Arc<Species> {
    Arc::new(Species::new(
        name,
        element,
        fixed_stats(attack, defense, speed, max_hp),
    ))
}

/// A neutral-element species; handy when only the numbers matter.
pub fn plain(name: &str, attack: u32, defense: u32, speed: u32, max_hp: u32) -> Arc<Species> {
    make_species(name, Element::Normal, attack, defense, speed, max_hp)
}

pub fn make_team(mode: TeamMode, species: &[Arc<Species>]) -> MonsterTeam {
    MonsterTeam::from_provided(mode, SortKey::Hp, species).unwrap()
}

pub fn names(team: &MonsterTeam) -> Vec<String> {
    team.monsters().iter().map(|m| m.name().to_string()).collect()
}

pub fn roster_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/roster.json")
}
