use crate::error::{BattleError, Result};
use crate::stats::StatsProvider;
use crate::team::{MonsterTeam, SortKey, TeamMode};
use crate::types::Element;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

fn default_true() -> bool {
    true
}

/// Immutable per-species data shared by every monster of that species.
#[derive(Debug, Clone)]
pub struct Species {
    pub name: String,
    pub description: String,
    pub element: Element,
    pub evolution: Option<Arc<Species>>,
    pub spawnable: bool,
    pub stats: StatsProvider,
}

impl Species {
    pub fn new(name: impl Into<String>, element: Element, stats: StatsProvider) -> Self {
        Species {
            name: name.into(),
            description: String::new(),
            element,
            evolution: None,
            spawnable: true,
            stats,
        }
    }

    pub fn with_evolution(mut self, evolution: Arc<Species>) -> Self {
        self.evolution = Some(evolution);
        self
    }

    pub fn with_spawnable(mut self, spawnable: bool) -> Self {
        self.spawnable = spawnable;
        self
    }

    pub fn can_be_spawned(&self) -> bool {
        self.spawnable
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub element: Element,
    #[serde(default)]
    pub evolution: Option<String>,
    #[serde(default = "default_true")]
    pub spawnable: bool,
    pub stats: StatsProvider,
}

/// All known species in declaration order, with evolution targets linked.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    species: Vec<Arc<Species>>,
    by_name: HashMap<String, usize>,
}

impl SpeciesCatalog {
    pub fn from_entries(entries: &[SpeciesEntry]) -> Result<Self> {
        let mut by_name = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if by_name.insert(entry.name.to_ascii_lowercase(), idx).is_some() {
                return Err(BattleError::DuplicateSpecies(entry.name.clone()));
            }
        }
        let mut built: Vec<Option<Arc<Species>>> = vec![None; entries.len()];
        let mut visiting = vec![false; entries.len()];
        for idx in 0..entries.len() {
            link(idx, entries, &by_name, &mut built, &mut visiting)?;
        }
        let species = built.into_iter().flatten().collect();
        Ok(SpeciesCatalog { species, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Species>> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&idx| &self.species[idx])
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Species>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| BattleError::UnknownSpecies(name.to_string()))
    }

    pub fn can_be_spawned(&self, name: &str) -> bool {
        self.get(name).map(|s| s.spawnable).unwrap_or(false)
    }

    pub fn spawnable(&self) -> Vec<&Arc<Species>> {
        self.species.iter().filter(|s| s.spawnable).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Species>> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

fn link(
    idx: usize,
    entries: &[SpeciesEntry],
    by_name: &HashMap<String, usize>,
    built: &mut Vec<Option<Arc<Species>>>,
    visiting: &mut Vec<bool>,
) -> Result<Arc<Species>> {
    if let Some(done) = &built[idx] {
        return Ok(done.clone());
    }
    let entry = &entries[idx];
    if visiting[idx] {
        return Err(BattleError::EvolutionCycle(entry.name.clone()));
    }
    visiting[idx] = true;
    let evolution = match &entry.evolution {
        Some(target) => {
            let target_idx = *by_name
                .get(&target.to_ascii_lowercase())
                .ok_or_else(|| BattleError::UnknownSpecies(target.clone()))?;
            Some(link(target_idx, entries, by_name, built, visiting)?)
        }
        None => None,
    };
    let species = Arc::new(Species {
        name: entry.name.clone(),
        description: entry.description.clone(),
        element: entry.element,
        evolution,
        spawnable: entry.spawnable,
        stats: entry.stats.clone(),
    });
    built[idx] = Some(species.clone());
    Ok(species)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub name: String,
    pub mode: TeamMode,
    #[serde(default)]
    pub sort_key: SortKey,
    pub monsters: Vec<String>,
}

impl TeamEntry {
    pub fn build(&self, catalog: &SpeciesCatalog) -> Result<MonsterTeam> {
        let species = self
            .monsters
            .iter()
            .map(|name| catalog.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        MonsterTeam::from_provided(self.mode, self.sort_key, &species)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterFile {
    pub species: Vec<SpeciesEntry>,
    #[serde(default)]
    pub teams: Vec<TeamEntry>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

/// A loaded roster: the linked species catalog plus the named team line-ups.
#[derive(Debug, Clone)]
pub struct Roster {
    pub catalog: SpeciesCatalog,
    pub teams: Vec<TeamEntry>,
}

impl Roster {
    pub fn from_file(file: RosterFile) -> Result<Self> {
        for key in file.extras.keys() {
            tracing::warn!(field = %key, "ignoring unrecognised roster field");
        }
        let catalog = SpeciesCatalog::from_entries(&file.species)?;
        Ok(Roster {
            catalog,
            teams: file.teams,
        })
    }

    pub fn build_team(&self, idx: usize) -> Result<MonsterTeam> {
        let entry = self
            .teams
            .get(idx)
            .ok_or(BattleError::UnknownTeam(idx))?;
        entry.build(&self.catalog)
    }
}
