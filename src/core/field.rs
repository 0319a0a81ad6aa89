//! Vineyard fields.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::{VineId, VineYields};

/// Stable field identifier (0, 1, 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u8);

impl FieldId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field({})", self.0)
    }
}

/// A field and the vines planted on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,

    /// Sale price and planting capacity.
    pub value: u8,

    pub vines: Vector<VineId>,

    /// Sold fields cannot be planted or harvested until bought back.
    pub sold: bool,
}

impl Field {
    #[must_use]
    pub fn new(id: FieldId, value: u8) -> Self {
        Self {
            id,
            value,
            vines: Vector::new(),
            sold: false,
        }
    }

    /// Combined yield of everything planted here.
    #[must_use]
    pub fn yields(&self) -> VineYields {
        self.vines.iter().fold(VineYields::default(), |acc, vine| {
            acc + vine.card().yields
        })
    }

    /// Capacity already used by planted vines.
    #[must_use]
    pub fn planted_value(&self) -> u8 {
        self.yields().total()
    }

    /// Whether `vine` fits on this field by capacity alone.
    #[must_use]
    pub fn has_room_for(&self, vine: VineId) -> bool {
        self.planted_value() + vine.card().yields.total() <= self.value
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vines.is_empty()
    }
}
