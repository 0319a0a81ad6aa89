//! Player actions.
//!
//! Every action except `StartGame` answers a prompt. The variant must match
//! the kind of the first prompt queued for the acting player, and its
//! selection must be one the prompt allows.
//!
//! Actions serialize with a `type` tag:
//!
//! ```
//! use oenology::core::{Action, PlayerId};
//! use oenology::rules::Placement;
//! use oenology::core::WorkerKind;
//!
//! let action = Action::PlaceWorker {
//!     player_id: PlayerId::from("viny"),
//!     placement: Placement::GainCoin,
//!     worker: WorkerKind::Normal,
//! };
//! let json = serde_json::to_string(&action).unwrap();
//! assert!(json.starts_with(r#"{"type":"PLACE_WORKER""#));
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::field::FieldId;
use super::player::{PlayerColor, PlayerId, WorkerKind};
use super::tokens::{GrapeSpec, WineColor, WineSpec};
use crate::cards::{CardId, Deck, StructureId, VineId};
use crate::prompts::ChoiceId;
use crate::rules::placement::Placement;

/// One wine to make and the grapes that go into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WineIngredients {
    pub wine: WineColor,
    /// At most three grapes for any recipe.
    pub grapes: SmallVec<[GrapeSpec; 3]>,
}

impl WineIngredients {
    #[must_use]
    pub fn new(wine: WineColor, grapes: &[GrapeSpec]) -> Self {
        Self {
            wine,
            grapes: SmallVec::from_slice(grapes),
        }
    }
}

/// A player action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StartGame {
        players: Vec<(PlayerId, PlayerColor)>,
        shuffled_cards: Deck,
    },
    ChooseAction {
        player_id: PlayerId,
        choice: ChoiceId,
    },
    ChooseActionMulti {
        player_id: PlayerId,
        choices: Vec<ChoiceId>,
    },
    /// `None` or an empty list declines an optional prompt.
    ChooseCards {
        player_id: PlayerId,
        cards: Option<Vec<CardId>>,
    },
    ChooseField {
        player_id: PlayerId,
        fields: Vec<FieldId>,
    },
    ChooseWine {
        player_id: PlayerId,
        wines: Vec<WineSpec>,
    },
    ChooseVine {
        player_id: PlayerId,
        vine: Option<VineId>,
    },
    MakeWine {
        player_id: PlayerId,
        ingredients: Vec<WineIngredients>,
    },
    BuildStructure {
        player_id: PlayerId,
        structure_id: Option<StructureId>,
    },
    PlaceWorker {
        player_id: PlayerId,
        placement: Placement,
        worker: WorkerKind,
    },
    Pass {
        player_id: PlayerId,
    },
}

impl Action {
    /// The acting player, for every action but `StartGame`.
    #[must_use]
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Action::StartGame { .. } => None,
            Action::ChooseAction { player_id, .. }
            | Action::ChooseActionMulti { player_id, .. }
            | Action::ChooseCards { player_id, .. }
            | Action::ChooseField { player_id, .. }
            | Action::ChooseWine { player_id, .. }
            | Action::ChooseVine { player_id, .. }
            | Action::MakeWine { player_id, .. }
            | Action::BuildStructure { player_id, .. }
            | Action::PlaceWorker { player_id, .. }
            | Action::Pass { player_id } => Some(player_id),
        }
    }

    /// Wire name of the variant.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::StartGame { .. } => "START_GAME",
            Action::ChooseAction { .. } => "CHOOSE_ACTION",
            Action::ChooseActionMulti { .. } => "CHOOSE_ACTION_MULTI",
            Action::ChooseCards { .. } => "CHOOSE_CARDS",
            Action::ChooseField { .. } => "CHOOSE_FIELD",
            Action::ChooseWine { .. } => "CHOOSE_WINE",
            Action::ChooseVine { .. } => "CHOOSE_VINE",
            Action::MakeWine { .. } => "MAKE_WINE",
            Action::BuildStructure { .. } => "BUILD_STRUCTURE",
            Action::PlaceWorker { .. } => "PLACE_WORKER",
            Action::Pass { .. } => "PASS",
        }
    }

    /// Selected cards, treating `None` as an empty selection.
    #[must_use]
    pub fn selected_cards(&self) -> &[CardId] {
        match self {
            Action::ChooseCards {
                cards: Some(cards), ..
            } => cards,
            _ => &[],
        }
    }
}
