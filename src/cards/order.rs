//! Wine order cards.
//!
//! An order lists the wines it needs. Each requirement is met by a distinct
//! wine of the same color with at least the required value. Filling it
//! scores victory points immediately and raises residual income.

use serde::{Deserialize, Serialize};

use crate::core::tokens::{WineColor, WineSpec};

/// One wine an order (or a visitor) asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WineRequirement {
    /// `None` accepts any color.
    pub color: Option<WineColor>,
    pub min_value: u8,
}

impl WineRequirement {
    #[must_use]
    pub const fn new(color: WineColor, min_value: u8) -> Self {
        Self {
            color: Some(color),
            min_value,
        }
    }

    #[must_use]
    pub const fn any(min_value: u8) -> Self {
        Self {
            color: None,
            min_value,
        }
    }

    #[must_use]
    pub fn accepts(&self, wine: WineSpec) -> bool {
        self.color.map_or(true, |c| c == wine.color) && wine.value >= self.min_value
    }
}

/// Check whether `wines` can cover every requirement with a distinct wine.
///
/// Requirements are matched most demanding first against the strongest
/// remaining wine that fits, colored requirements before any-color ones.
#[must_use]
pub fn requirements_met(requirements: &[WineRequirement], wines: &[WineSpec]) -> bool {
    let mut sorted: Vec<WineRequirement> = requirements.to_vec();
    sorted.sort_by(|a, b| {
        a.color
            .is_none()
            .cmp(&b.color.is_none())
            .then(b.min_value.cmp(&a.min_value))
    });

    let mut remaining: Vec<WineSpec> = wines.to_vec();
    for requirement in &sorted {
        // Weakest acceptable wine, so stronger ones stay free for later.
        let pick = remaining
            .iter()
            .enumerate()
            .filter(|(_, w)| requirement.accepts(**w))
            .min_by_key(|(_, w)| w.value)
            .map(|(i, _)| i);
        match pick {
            Some(i) => {
                remaining.swap_remove(i);
            }
            None => return false,
        }
    }
    true
}

/// Static order card data.
#[derive(Debug)]
pub struct OrderCard {
    pub name: &'static str,
    pub wines: &'static [WineRequirement],
    pub victory_points: u8,
    pub residual: u8,
}

/// Order card identifier (index into the catalog).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u8);

impl OrderId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn card(self) -> &'static OrderCard {
        order_card(self)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.card().name)
    }
}

const fn red(v: u8) -> WineRequirement {
    WineRequirement::new(WineColor::Red, v)
}

const fn white(v: u8) -> WineRequirement {
    WineRequirement::new(WineColor::White, v)
}

const fn blush(v: u8) -> WineRequirement {
    WineRequirement::new(WineColor::Blush, v)
}

const fn sparkling(v: u8) -> WineRequirement {
    WineRequirement::new(WineColor::Sparkling, v)
}

static ORDER_CARDS: [OrderCard; 16] = [
    OrderCard { name: "Trattoria", wines: &[red(3)], victory_points: 2, residual: 1 },
    OrderCard { name: "Harbor Inn", wines: &[white(3)], victory_points: 2, residual: 1 },
    OrderCard { name: "Country Fair", wines: &[red(2), white(2)], victory_points: 3, residual: 1 },
    OrderCard { name: "Garden Party", wines: &[blush(4)], victory_points: 3, residual: 1 },
    OrderCard { name: "Steakhouse", wines: &[red(5)], victory_points: 3, residual: 1 },
    OrderCard { name: "Oyster Bar", wines: &[white(5)], victory_points: 3, residual: 1 },
    OrderCard { name: "Wedding Feast", wines: &[red(4), white(4)], victory_points: 4, residual: 2 },
    OrderCard { name: "Summer Terrace", wines: &[blush(5), red(2)], victory_points: 4, residual: 2 },
    OrderCard { name: "New Year's Gala", wines: &[sparkling(7)], victory_points: 5, residual: 2 },
    OrderCard { name: "Hunting Lodge", wines: &[red(6), white(3)], victory_points: 5, residual: 1 },
    OrderCard { name: "Seaside Villa", wines: &[white(6), red(3)], victory_points: 5, residual: 1 },
    OrderCard { name: "Rose Festival", wines: &[blush(6), white(4)], victory_points: 5, residual: 2 },
    OrderCard { name: "Grand Banquet", wines: &[red(7), white(7)], victory_points: 6, residual: 2 },
    OrderCard { name: "Royal Wedding", wines: &[sparkling(8), blush(5)], victory_points: 7, residual: 1 },
    OrderCard { name: "Tasting Tour", wines: &[red(1), white(1), blush(4)], victory_points: 4, residual: 1 },
    OrderCard { name: "Harvest Supper", wines: &[red(3), red(3), white(3)], victory_points: 5, residual: 2 },
];

/// Look up an order card.
///
/// # Panics
///
/// Panics if the id is outside the catalog. Ids only come from the deck,
/// which setup validates.
#[must_use]
pub fn order_card(id: OrderId) -> &'static OrderCard {
    &ORDER_CARDS[id.0 as usize]
}

/// Every order card, in catalog order.
pub fn all_orders() -> impl Iterator<Item = OrderId> {
    (0..ORDER_CARDS.len() as u8).map(OrderId::new)
}

#[must_use]
pub fn is_known_order(id: OrderId) -> bool {
    (id.0 as usize) < ORDER_CARDS.len()
}
