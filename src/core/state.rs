//! Game state: the authoritative snapshot.
//!
//! ## GameState
//!
//! Complete state of one game:
//! - Turn pointer (`current_turn`) and year
//! - Players, seating order and grape token position
//! - Wake-up chart
//! - Draw and discard piles
//! - Board occupancy
//! - Prompt queue and activity log
//!
//! Uses `im` persistent data structures so a clone is O(1) and every
//! snapshot stays valid after `apply` produces the next one.
//!
//! ## Determinism
//!
//! `players` is a hash map and is never iterated directly. Anything that
//! visits every player walks `table_order`.

use std::sync::Arc;

use im::{HashMap as ImHashMap, OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::log::LogEntry;
use super::player::{PlayerId, PlayerState};
use crate::cards::{Deck, OrderId, VineId};
use crate::prompts::Prompt;
use crate::rules::placement::Placement;
use crate::visitors::PlayVisitor;

/// Number of rows on the wake-up chart.
pub const WAKE_UP_SLOTS: usize = 7;

/// Worker placement season.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Season {
    Summer,
    Winter,
}

/// A player's row on the wake-up chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeUpPosition {
    pub player_id: PlayerId,
    pub passed: bool,
}

/// Which part of a buy/sell placement is being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuySellMode {
    SellGrapes,
    BuyField,
    SellField,
}

/// Multi-step work started by a worker placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PendingAction {
    PlayVisitor(PlayVisitor),
    BuySell {
        bonus: bool,
        mode: Option<BuySellMode>,
    },
    /// `vine` is the card taken from hand and not yet planted.
    Plant {
        vine: Option<VineId>,
        plants_left: u8,
    },
    Build {
        discount: u8,
    },
    Harvest,
    MakeWine,
    FillOrder {
        order: Option<OrderId>,
        bonus: bool,
    },
    Yoke,
}

/// A worker placement turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPlacementTurn {
    pub player_id: PlayerId,
    pub season: Season,
    pub pending_action: Option<PendingAction>,
}

/// Whose turn it is and what kind of turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CurrentTurn {
    PapaSetUp { player_id: PlayerId },
    WakeUpOrder { player_id: PlayerId },
    WorkerPlacement(WorkerPlacementTurn),
    FallVisitor { player_id: PlayerId },
}

impl CurrentTurn {
    #[must_use]
    pub fn player_id(&self) -> &PlayerId {
        match self {
            CurrentTurn::PapaSetUp { player_id }
            | CurrentTurn::WakeUpOrder { player_id }
            | CurrentTurn::FallVisitor { player_id } => player_id,
            CurrentTurn::WorkerPlacement(turn) => &turn.player_id,
        }
    }

    /// Short name for logs and panics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CurrentTurn::PapaSetUp { .. } => "papaSetUp",
            CurrentTurn::WakeUpOrder { .. } => "wakeUpOrder",
            CurrentTurn::WorkerPlacement(_) => "workerPlacement",
            CurrentTurn::FallVisitor { .. } => "fallVisitor",
        }
    }
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // === Configuration ===
    pub config: Arc<EngineConfig>,

    // === Progression ===
    /// Starts at 1.
    pub year: u32,
    pub current_turn: CurrentTurn,

    // === Players ===
    pub players: ImHashMap<PlayerId, PlayerState>,
    /// Seating order. The player on your right is the previous entry.
    pub table_order: Vector<PlayerId>,
    /// Index into `table_order` of the player holding the grape token.
    pub grape_index: usize,
    pub wake_up_order: [Option<WakeUpPosition>; WAKE_UP_SLOTS],

    // === Cards ===
    pub draw_piles: Deck,
    pub discard_piles: Deck,

    // === Board ===
    /// Players with a worker on each space, in placement order.
    pub worker_placements: OrdMap<Placement, Vector<PlayerId>>,

    // === Interaction ===
    pub prompts: Vector<Prompt>,
    pub activity_log: Vector<LogEntry>,
}

impl GameState {
    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.table_order.len()
    }

    /// Get a player's state.
    ///
    /// # Panics
    ///
    /// Panics if the player is not in the game. Player ids reaching the
    /// rules have already been matched against a prompt.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> &PlayerState {
        match self.players.get(id) {
            Some(player) => player,
            None => panic!("Unknown player {id}"),
        }
    }

    /// Players in seating order.
    pub fn players_in_order(&self) -> impl Iterator<Item = &PlayerState> {
        self.table_order.iter().map(move |id| self.player(id))
    }

    /// Seat of a player in `table_order`.
    #[must_use]
    pub fn seat_of(&self, id: &PlayerId) -> Option<usize> {
        self.table_order.iter().position(|p| p == id)
    }

    /// Everyone, in seating order starting with `id`.
    #[must_use]
    pub fn players_from(&self, id: &PlayerId) -> Vec<PlayerId> {
        let n = self.player_count();
        let start = self.seat_of(id).unwrap_or(0);
        (0..n)
            .map(|k| self.table_order[(start + k) % n].clone())
            .collect()
    }

    /// Everyone but `id`, in seating order after them.
    #[must_use]
    pub fn opponents_of(&self, id: &PlayerId) -> Vec<PlayerId> {
        self.players_from(id).into_iter().skip(1).collect()
    }

    // === Turn ===

    /// Whose turn it is.
    #[must_use]
    pub fn current_player_id(&self) -> &PlayerId {
        self.current_turn.player_id()
    }

    /// The worker placement turn, if that is the current phase.
    #[must_use]
    pub fn worker_placement_turn(&self) -> Option<&WorkerPlacementTurn> {
        match &self.current_turn {
            CurrentTurn::WorkerPlacement(turn) => Some(turn),
            _ => None,
        }
    }

    #[must_use]
    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.worker_placement_turn()
            .and_then(|turn| turn.pending_action.as_ref())
    }

    /// The visitor being played, if any.
    #[must_use]
    pub fn playing_visitor(&self) -> Option<&PlayVisitor> {
        match self.pending_action() {
            Some(PendingAction::PlayVisitor(play)) => Some(play),
            _ => None,
        }
    }

    // === Wake-up chart ===

    /// Occupied wake-up rows in chart order, paired with their slot.
    pub fn wake_up_entries(&self) -> impl Iterator<Item = (usize, &WakeUpPosition)> {
        self.wake_up_order
            .iter()
            .enumerate()
            .filter_map(|(slot, pos)| pos.as_ref().map(|p| (slot, p)))
    }

    /// Row a player sits on.
    #[must_use]
    pub fn wake_up_slot_of(&self, id: &PlayerId) -> Option<usize> {
        self.wake_up_entries()
            .find(|(_, pos)| &pos.player_id == id)
            .map(|(slot, _)| slot)
    }

    // === Board ===

    /// Number of workers on a board space.
    #[must_use]
    pub fn occupancy(&self, placement: Placement) -> usize {
        self.worker_placements
            .get(&placement)
            .map_or(0, Vector::len)
    }

    // === Prompts ===

    /// First prompt addressed to a player.
    #[must_use]
    pub fn prompt_for(&self, id: &PlayerId) -> Option<&Prompt> {
        self.prompts.iter().find(|p| &p.player_id == id)
    }
}
