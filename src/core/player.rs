//! Player identification and per-player state.
//!
//! ## PlayerId
//!
//! Players are identified by the stable string handle the surrounding
//! system assigns them (`"viny"`, `"stfy"`, ...). Seating order is not
//! part of the id; it lives in `GameState::table_order`.
//!
//! ## PlayerState
//!
//! Everything one player owns: coins, residual income, victory points,
//! workers, hand, fields, crush pad, cellar and structures. Collections are
//! `im` persistent structures so snapshots share unchanged branches.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::field::{Field, FieldId};
use super::tokens::{Cellar, CrushPad};
use crate::cards::{CardId, StructureId, StructureState};

/// Player identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw handle.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Player color. Each player in a game has a distinct one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerColor {
    Blue,
    Green,
    Orange,
    Yellow,
    Purple,
    Red,
}

/// Worker token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkerKind {
    /// May be placed on a space even when it is full.
    Grande,
    Normal,
}

/// A trained worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub kind: WorkerKind,

    /// Can still be placed this year.
    pub available: bool,

    /// Granted by the wake-up chart for the current year only.
    pub temp: bool,
}

impl Worker {
    #[must_use]
    pub const fn new(kind: WorkerKind) -> Self {
        Self {
            kind,
            available: true,
            temp: false,
        }
    }
}

/// Complete state of one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub color: PlayerColor,
    pub coins: u32,
    pub residuals: u8,
    pub victory_points: i32,
    pub workers: Vector<Worker>,
    pub hand: Vector<CardId>,
    pub fields: Vector<Field>,
    pub crush_pad: CrushPad,
    pub cellar: Cellar,
    pub structures: OrdMap<StructureId, StructureState>,
}

impl PlayerState {
    /// Create a fresh player: one grande worker plus the configured normal
    /// workers, three unplanted fields, empty ladders and no structures.
    #[must_use]
    pub fn new(id: PlayerId, color: PlayerColor, config: &EngineConfig) -> Self {
        let mut workers = Vector::new();
        workers.push_back(Worker::new(WorkerKind::Grande));
        for _ in 0..config.starting_workers {
            workers.push_back(Worker::new(WorkerKind::Normal));
        }

        let fields = config
            .field_values
            .iter()
            .enumerate()
            .map(|(i, &value)| Field::new(FieldId::new(i as u8), value))
            .collect();

        Self {
            id,
            color,
            coins: config.starting_coins,
            residuals: 0,
            victory_points: 0,
            workers,
            hand: Vector::new(),
            fields,
            crush_pad: CrushPad::default(),
            cellar: Cellar::default(),
            structures: StructureId::ALL
                .iter()
                .map(|&s| (s, StructureState::Unbuilt))
                .collect(),
        }
    }

    // === Workers ===

    /// Number of workers that can still be placed this year.
    #[must_use]
    pub fn available_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.available).count()
    }

    /// Check for an available worker of a kind.
    #[must_use]
    pub fn has_available(&self, kind: WorkerKind) -> bool {
        self.workers.iter().any(|w| w.available && w.kind == kind)
    }

    /// Workers that stay with the player across years.
    #[must_use]
    pub fn trained_workers(&self) -> usize {
        self.workers.iter().filter(|w| !w.temp).count()
    }

    // === Structures ===

    /// Get a structure's state.
    #[must_use]
    pub fn structure_state(&self, id: StructureId) -> StructureState {
        self.structures.get(&id).copied().unwrap_or_default()
    }

    /// Built, whether or not it was used this year.
    #[must_use]
    pub fn has_structure(&self, id: StructureId) -> bool {
        self.structure_state(id) != StructureState::Unbuilt
    }

    /// Built and not yet used this year.
    #[must_use]
    pub fn structure_ready(&self, id: StructureId) -> bool {
        self.structure_state(id) == StructureState::Built
    }

    /// Highest wine value the cellar can hold.
    #[must_use]
    pub fn wine_cap(&self) -> u8 {
        if self.has_structure(StructureId::LargeCellar) {
            9
        } else if self.has_structure(StructureId::MediumCellar) {
            6
        } else {
            3
        }
    }

    // === Fields ===

    /// Get a field by ID.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Find the field a vine is planted on.
    #[must_use]
    pub fn field_of_vine(&self, vine: crate::cards::VineId) -> Option<&Field> {
        self.fields.iter().find(|f| f.vines.contains(&vine))
    }

    // === Hand ===

    /// Check whether a card is in hand.
    #[must_use]
    pub fn holds(&self, card: CardId) -> bool {
        self.hand.contains(&card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let id = PlayerId::from("viny");
        assert_eq!(id.as_str(), "viny");
        assert_eq!(format!("{}", id), "viny");
    }

    #[test]
    fn test_new_player_defaults() {
        let config = EngineConfig::default();
        let player = PlayerState::new(PlayerId::from("viny"), PlayerColor::Orange, &config);

        assert_eq!(player.coins, 0);
        assert_eq!(player.workers.len(), 3);
        assert_eq!(player.available_workers(), 3);
        assert!(player.has_available(WorkerKind::Grande));
        assert_eq!(player.fields.len(), 3);
        assert_eq!(player.fields[0].value, 5);
        assert_eq!(player.fields[2].value, 7);
        assert!(!player.has_structure(StructureId::Trellis));
        assert_eq!(player.wine_cap(), 3);
    }

    #[test]
    fn test_wine_cap_follows_cellars() {
        let config = EngineConfig::default();
        let mut player = PlayerState::new(PlayerId::from("a"), PlayerColor::Blue, &config);

        player.structures.insert(StructureId::MediumCellar, StructureState::Built);
        assert_eq!(player.wine_cap(), 6);

        player.structures.insert(StructureId::LargeCellar, StructureState::Used);
        assert_eq!(player.wine_cap(), 9);
    }

    #[test]
    fn test_player_id_serialization() {
        let id = PlayerId::from("stfy");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"stfy\"");
        let deserialized: PlayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
