//! Error types.
//!
//! `ActionError` explains why `try_apply` rejected an action. `apply` turns
//! every rejection into a no-op, so these never escape a game; they exist
//! for callers and tests that want to know why.

use thiserror::Error;

use super::field::FieldId;
use super::player::{PlayerColor, PlayerId, WorkerKind};
use super::tokens::{GrapeSpec, WineSpec};
use crate::cards::{CardId, StructureId};
use crate::prompts::ChoiceId;
use crate::rules::placement::Placement;

/// Why an action was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no prompt is waiting on {0}")]
    NoPromptForPlayer(PlayerId),

    #[error("{player} was asked for {expected}, not {received}")]
    WrongPromptKind {
        player: PlayerId,
        expected: &'static str,
        received: &'static str,
    },

    #[error("choice {0:?} was not offered")]
    ChoiceNotOffered(ChoiceId),

    #[error("choice {choice:?} is disabled: {reason}")]
    ChoiceDisabled { choice: ChoiceId, reason: String },

    #[error("selected {count}, expected between {min} and {max}")]
    SelectionSize { count: usize, min: usize, max: usize },

    #[error("the same option was selected twice")]
    DuplicateSelection,

    #[error("{0} was not one of the options")]
    NotOffered(String),

    #[error("{player} cannot afford {needed} coins (has {available})")]
    InsufficientCoins {
        player: PlayerId,
        needed: u32,
        available: u32,
    },

    #[error("{player} does not hold {card}")]
    CardNotInHand { player: PlayerId, card: CardId },

    #[error("{field} cannot be used: {reason}")]
    FieldNotEligible { field: FieldId, reason: String },

    #[error("{0:?} is not on the crush pad")]
    MissingGrape(GrapeSpec),

    #[error("{0:?} is not in the cellar")]
    MissingWine(WineSpec),

    #[error("invalid wine: {0}")]
    InvalidRecipe(String),

    #[error("{0:?} is already built")]
    AlreadyBuilt(StructureId),

    #[error("{0:?} cannot be built: {1}")]
    CannotBuild(StructureId, String),

    #[error("{0:?} is unavailable: {1}")]
    PlacementUnavailable(Placement, String),

    #[error("{player} has no available {kind:?} worker")]
    NoWorker { player: PlayerId, kind: WorkerKind },

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Why a game could not be created.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("a game needs between 1 and 6 players, got {0}")]
    PlayerCount(usize),

    #[error("player `{0}` is listed twice")]
    DuplicatePlayer(PlayerId),

    #[error("color {0:?} is used by two players")]
    DuplicateColor(PlayerColor),

    #[error("card {0} appears twice in the deck")]
    DuplicateCard(CardId),

    #[error("card {0} is in the wrong pile")]
    MisplacedCard(CardId),

    #[error("card {0} is not in the deck")]
    CardNotInDeck(CardId),

    #[error("starting hand for unknown player `{0}`")]
    UnknownPlayer(PlayerId),
}

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid engine config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ActionError::InsufficientCoins {
            player: PlayerId::from("viny"),
            needed: 4,
            available: 1,
        };
        assert_eq!(err.to_string(), "viny cannot afford 4 coins (has 1)");

        let err: ActionError = SetupError::PlayerCount(0).into();
        assert_eq!(err.to_string(), "a game needs between 1 and 6 players, got 0");
    }
}
