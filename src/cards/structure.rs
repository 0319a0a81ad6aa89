//! Structures a player can build on their vineyard.

use serde::{Deserialize, Serialize};

/// Structure identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureId {
    Trellis,
    Irrigation,
    Yoke,
    Windmill,
    Cottage,
    TastingRoom,
    MediumCellar,
    LargeCellar,
}

impl StructureId {
    pub const ALL: [StructureId; 8] = [
        StructureId::Trellis,
        StructureId::Irrigation,
        StructureId::Yoke,
        StructureId::Windmill,
        StructureId::Cottage,
        StructureId::TastingRoom,
        StructureId::MediumCellar,
        StructureId::LargeCellar,
    ];

    #[must_use]
    pub fn cost(self) -> u8 {
        structure(self).cost
    }
}

/// Static structure data.
#[derive(Debug)]
pub struct Structure {
    pub id: StructureId,
    pub name: &'static str,
    pub cost: u8,
    /// Must already be built.
    pub requires: Option<StructureId>,
}

// Indexed by `StructureId as usize`.
static STRUCTURES: [Structure; 8] = [
    Structure { id: StructureId::Trellis, name: "Trellis", cost: 2, requires: None },
    Structure { id: StructureId::Irrigation, name: "Irrigation", cost: 3, requires: None },
    Structure { id: StructureId::Yoke, name: "Yoke", cost: 2, requires: None },
    Structure { id: StructureId::Windmill, name: "Windmill", cost: 5, requires: None },
    Structure { id: StructureId::Cottage, name: "Cottage", cost: 4, requires: None },
    Structure { id: StructureId::TastingRoom, name: "Tasting Room", cost: 6, requires: None },
    Structure { id: StructureId::MediumCellar, name: "Medium Cellar", cost: 4, requires: None },
    Structure {
        id: StructureId::LargeCellar,
        name: "Large Cellar",
        cost: 6,
        requires: Some(StructureId::MediumCellar),
    },
];

/// Highest structure cost. A voucher for this much builds anything.
pub const MAX_STRUCTURE_COST: u8 = 6;

/// Look up a structure.
#[must_use]
pub fn structure(id: StructureId) -> &'static Structure {
    &STRUCTURES[id as usize]
}

/// Build state of a structure for one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureState {
    #[default]
    Unbuilt,
    Built,
    /// Built and its once-per-year ability was used.
    Used,
}

/// Price reduction applied when building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Coupon {
    /// Subtract from the cost.
    Discount { amount: u8 },
    /// Free if the cost is at most `up_to`; otherwise not usable.
    Voucher { up_to: u8 },
}

impl Coupon {
    /// Price to pay for a structure of `cost`, or `None` if this coupon
    /// cannot be applied to it.
    #[must_use]
    pub fn price(coupon: Option<Coupon>, cost: u8) -> Option<u8> {
        match coupon {
            None => Some(cost),
            Some(Coupon::Discount { amount }) => Some(cost.saturating_sub(amount)),
            Some(Coupon::Voucher { up_to }) => (cost <= up_to).then_some(0),
        }
    }
}
