use crate::knowledge::KnowledgeError;
use crate::model::catalog::CatalogError;
use thiserror::Error;

/// Broken invariants detected while building a game. Construction aborts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("a game needs at least two players, found {0}")]
    RosterTooSmall(usize),
    #[error("player name {0:?} is blank or used more than once")]
    InvalidName(String),
    #[error("catalog leaves {cards} cards to deal among {players} players")]
    CatalogTooSmall { cards: usize, players: usize },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error("expected {expected} hands, found {found}")]
    HandCount { expected: usize, found: usize },
    #[error("solution {0} does not hold one catalog card per category")]
    MalformedSolution(String),
    #[error("card {0} is not part of the catalog")]
    UnknownCard(String),
    #[error("card {0} is dealt more than once")]
    DuplicateCard(String),
    #[error("card {0} is neither dealt nor in the solution")]
    MissingCard(String),
}

/// Out-of-protocol actions. Logged and answered with a neutral result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("Game is over. No further actions.")]
    GameOver,
    #[error("It is not {actor}'s turn.")]
    OutOfTurn { actor: String },
    #[error("{actor} already made a suggestion this turn.")]
    AlreadySuggested { actor: String },
    #[error("{actor} named cards that do not form one card per category.")]
    Malformed { actor: String },
}
