//! Board spaces for worker placement.
//!
//! ## Capacity
//!
//! Each shared space holds ⌈players/2⌉ workers. A grande worker may be
//! placed on a full space. `GainCoin` is unlimited and `Yoke` is private to
//! its owner.
//!
//! ## Bonus
//!
//! With more than two players, the first worker on a space gets its bonus.

use serde::{Deserialize, Serialize};

use crate::core::Season;

/// A board space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    // Summer
    DrawVine,
    GiveTour,
    BuildStructure,
    PlaySummerVisitor,
    BuySell,
    PlantVine,
    // Winter
    DrawOrder,
    HarvestField,
    TrainWorker,
    PlayWinterVisitor,
    MakeWine,
    FillOrder,
    // Either
    GainCoin,
    Yoke,
}

impl Placement {
    pub const ALL: [Placement; 14] = [
        Placement::DrawVine,
        Placement::GiveTour,
        Placement::BuildStructure,
        Placement::PlaySummerVisitor,
        Placement::BuySell,
        Placement::PlantVine,
        Placement::DrawOrder,
        Placement::HarvestField,
        Placement::TrainWorker,
        Placement::PlayWinterVisitor,
        Placement::MakeWine,
        Placement::FillOrder,
        Placement::GainCoin,
        Placement::Yoke,
    ];

    /// Season the space belongs to. `None` for spaces usable in both.
    #[must_use]
    pub const fn season(self) -> Option<Season> {
        match self {
            Placement::DrawVine
            | Placement::GiveTour
            | Placement::BuildStructure
            | Placement::PlaySummerVisitor
            | Placement::BuySell
            | Placement::PlantVine => Some(Season::Summer),
            Placement::DrawOrder
            | Placement::HarvestField
            | Placement::TrainWorker
            | Placement::PlayWinterVisitor
            | Placement::MakeWine
            | Placement::FillOrder => Some(Season::Winter),
            Placement::GainCoin | Placement::Yoke => None,
        }
    }

    #[must_use]
    pub fn usable_in(self, season: Season) -> bool {
        self.season().map_or(true, |s| s == season)
    }

    /// Spaces available in a season, in board order.
    pub fn for_season(season: Season) -> impl Iterator<Item = Placement> {
        Self::ALL.into_iter().filter(move |p| p.usable_in(season))
    }

    /// Worker capacity. `None` means unlimited.
    #[must_use]
    pub fn capacity(self, player_count: usize) -> Option<usize> {
        match self {
            Placement::GainCoin | Placement::Yoke => None,
            _ => Some(player_count.div_ceil(2)),
        }
    }

    /// Whether the next worker here gets the bonus.
    #[must_use]
    pub fn grants_bonus(self, player_count: usize, occupancy: usize) -> bool {
        self.capacity(player_count).is_some() && player_count > 2 && occupancy == 0
    }

    /// Text of the bonus, for display.
    #[must_use]
    pub fn bonus_label(self) -> Option<&'static str> {
        Some(match self {
            Placement::DrawVine => "Draw 2 vines",
            Placement::GiveTour => "Gain 1 extra coin",
            Placement::BuildStructure => "1 coin discount",
            Placement::PlaySummerVisitor | Placement::PlayWinterVisitor => "Play up to 2 visitors",
            Placement::BuySell | Placement::FillOrder => "Gain 1 VP",
            Placement::PlantVine => "Plant up to 2 vines",
            Placement::DrawOrder => "Draw 2 orders",
            Placement::HarvestField => "Harvest up to 2 fields",
            Placement::TrainWorker => "1 coin discount",
            Placement::MakeWine => "Make up to 3 wines",
            Placement::GainCoin | Placement::Yoke => return None,
        })
    }
}
