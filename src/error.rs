use crate::stats::FormulaError;
use crate::team::TEAM_LIMIT;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("team size {0} is outside 1..={max}", max = TEAM_LIMIT)]
    InvalidTeamSize(usize),

    #[error("{0} cannot be spawned onto a team")]
    NotSpawnable(String),

    #[error("unknown species {0:?}")]
    UnknownSpecies(String),

    #[error("roster has no team #{0}")]
    UnknownTeam(usize),

    #[error("species {0:?} is defined more than once")]
    DuplicateSpecies(String),

    #[error("evolution chain starting at {0:?} loops back on itself")]
    EvolutionCycle(String),

    #[error("the catalog has no spawnable species")]
    NoSpawnableSpecies,

    #[error("team already holds {max} monsters", max = TEAM_LIMIT)]
    TeamFull,

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error("cannot retrieve a monster from an empty team")]
    EmptyTeam,

    #[error("{0} is not ready to evolve")]
    NotReadyToEvolve(String),

    #[error("reading team selection input failed: {0}")]
    Input(#[from] std::io::Error),

    #[error("team selection input ended before the team was complete")]
    InputExhausted,
}

impl BattleError {
    /// Errors raised while assembling teams or loading species, never mid-battle.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BattleError::InvalidTeamSize(_)
                | BattleError::NotSpawnable(_)
                | BattleError::UnknownSpecies(_)
                | BattleError::UnknownTeam(_)
                | BattleError::DuplicateSpecies(_)
                | BattleError::EvolutionCycle(_)
                | BattleError::NoSpawnableSpecies
                | BattleError::TeamFull
        )
    }
}

pub type Result<T, E = BattleError> = std::result::Result<T, E>;
