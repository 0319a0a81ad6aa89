//! Vine cards.

use serde::{Deserialize, Serialize};

use super::structure::StructureId;

/// Grape variety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VineKind {
    Sangiovese,
    Malvasia,
    Pinot,
    Syrah,
    Trebbiano,
    Merlot,
    SauvignonBlanc,
    CabernetSauvignon,
    Chardonnay,
}

impl VineKind {
    pub const ALL: [VineKind; 9] = [
        VineKind::Sangiovese,
        VineKind::Malvasia,
        VineKind::Pinot,
        VineKind::Syrah,
        VineKind::Trebbiano,
        VineKind::Merlot,
        VineKind::SauvignonBlanc,
        VineKind::CabernetSauvignon,
        VineKind::Chardonnay,
    ];
}

/// Red and white yield of a vine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VineYields {
    pub red: u8,
    pub white: u8,
}

impl VineYields {
    #[must_use]
    pub const fn total(self) -> u8 {
        self.red + self.white
    }
}

impl std::ops::Add for VineYields {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            red: self.red + rhs.red,
            white: self.white + rhs.white,
        }
    }
}

/// Static vine card data.
#[derive(Debug)]
pub struct VineCard {
    pub kind: VineKind,
    pub name: &'static str,
    pub yields: VineYields,
    /// Structures the owner must have built to plant it.
    pub requires: &'static [StructureId],
    pub copies: u8,
}

const fn yields(red: u8, white: u8) -> VineYields {
    VineYields { red, white }
}

// Indexed by `VineKind as usize`.
static VINE_CARDS: [VineCard; 9] = [
    VineCard {
        kind: VineKind::Sangiovese,
        name: "Sangiovese",
        yields: yields(1, 0),
        requires: &[],
        copies: 6,
    },
    VineCard {
        kind: VineKind::Malvasia,
        name: "Malvasia",
        yields: yields(0, 1),
        requires: &[],
        copies: 6,
    },
    VineCard {
        kind: VineKind::Pinot,
        name: "Pinot",
        yields: yields(1, 1),
        requires: &[StructureId::Trellis],
        copies: 6,
    },
    VineCard {
        kind: VineKind::Syrah,
        name: "Syrah",
        yields: yields(2, 0),
        requires: &[StructureId::Trellis],
        copies: 5,
    },
    VineCard {
        kind: VineKind::Trebbiano,
        name: "Trebbiano",
        yields: yields(0, 2),
        requires: &[],
        copies: 5,
    },
    VineCard {
        kind: VineKind::Merlot,
        name: "Merlot",
        yields: yields(3, 0),
        requires: &[StructureId::Irrigation],
        copies: 5,
    },
    VineCard {
        kind: VineKind::SauvignonBlanc,
        name: "Sauvignon Blanc",
        yields: yields(0, 3),
        requires: &[StructureId::Trellis],
        copies: 5,
    },
    VineCard {
        kind: VineKind::CabernetSauvignon,
        name: "Cabernet Sauvignon",
        yields: yields(4, 0),
        requires: &[StructureId::Trellis, StructureId::Irrigation],
        copies: 4,
    },
    VineCard {
        kind: VineKind::Chardonnay,
        name: "Chardonnay",
        yields: yields(0, 4),
        requires: &[StructureId::Irrigation],
        copies: 4,
    },
];

/// A specific vine card: kind plus copy number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VineId {
    pub kind: VineKind,
    pub copy: u8,
}

impl VineId {
    #[must_use]
    pub const fn new(kind: VineKind, copy: u8) -> Self {
        Self { kind, copy }
    }

    #[must_use]
    pub fn card(self) -> &'static VineCard {
        vine_card(self)
    }
}

impl std::fmt::Display for VineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.card().name, self.copy)
    }
}

/// Look up a vine card.
#[must_use]
pub fn vine_card(id: VineId) -> &'static VineCard {
    &VINE_CARDS[id.kind as usize]
}

/// Every vine card in the game, in catalog order.
pub fn all_vines() -> impl Iterator<Item = VineId> {
    VINE_CARDS
        .iter()
        .flat_map(|card| (0..card.copies).map(move |copy| VineId::new(card.kind, copy)))
}
