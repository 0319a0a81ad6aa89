//! Activity log: the gameplay history of a game.
//!
//! Every accepted action that changes something appends one `LogEntry`
//! holding the events it produced, in order. The log is append-only and
//! shared between snapshots like the rest of the state.

use serde::{Deserialize, Serialize};

use super::field::FieldId;
use super::player::PlayerId;
use super::tokens::{GrapeSpec, WineSpec};
use crate::cards::{CardType, OrderId, StructureId, VineId, VineYields, VisitorId};
use crate::rules::placement::Placement;

/// Season names as they appear in the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeasonName {
    Spring,
    Summer,
    Fall,
    Winter,
}

/// Something that happened while resolving an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActivityEvent {
    Build { player_id: PlayerId, structure_id: StructureId, paid: u32 },
    BuySellField { player_id: PlayerId, field_id: FieldId, bought: bool },
    Coins { player_id: PlayerId, delta: i64 },
    Discard { player_id: PlayerId, cards: Vec<CardType> },
    Draw { player_id: PlayerId, cards: Vec<CardType> },
    Fill { player_id: PlayerId, order_id: OrderId, wines: Vec<WineSpec> },
    Harvest { player_id: PlayerId, field_id: FieldId, yields: VineYields },
    MakeWine { player_id: PlayerId, wines: Vec<Option<WineSpec>> },
    Pass { player_id: PlayerId },
    PlaceWorker { player_id: PlayerId, placement: Placement },
    Plant { player_id: PlayerId, vine: VineId, field_id: FieldId },
    Residuals { player_id: PlayerId, delta: i32 },
    Season { season: SeasonName, year: u32 },
    SellGrapes { player_id: PlayerId, grapes: Vec<GrapeSpec> },
    TrainWorker { player_id: PlayerId },
    Uproot { player_id: PlayerId, vine: VineId },
    Visitor { player_id: PlayerId, visitor: VisitorId },
    VictoryPoints { player_id: PlayerId, delta: i32 },
    WakeUp { player_id: PlayerId, slot: usize },
}

/// One accepted action's worth of events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the log, starting at 0.
    pub sequence: usize,

    pub year: u32,

    /// Who acted. `None` for entries written by setup.
    pub player_id: Option<PlayerId>,

    pub events: Vec<ActivityEvent>,
}
