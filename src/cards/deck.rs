//! Card identifiers and the four-pile deck.
//!
//! ## Piles
//!
//! Cards are split by type into four piles: vine, summer visitor, order and
//! winter visitor. The front of each pile is its top. A `Deck` is used for
//! both the draw piles and the discard piles of a game.
//!
//! ## Shuffling
//!
//! `Deck::shuffled(seed)` is the only source of randomness in a game. It is
//! called once by whoever sets the game up; `apply` never shuffles.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::order::{all_orders, OrderId};
use super::vine::{all_vines, VineId};
use super::visitor::VisitorId;
use crate::core::rng::GameRng;
use crate::core::state::Season;

/// Which pile a card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardType {
    Vine,
    SummerVisitor,
    Order,
    WinterVisitor,
}

impl CardType {
    pub const ALL: [CardType; 4] = [
        CardType::Vine,
        CardType::SummerVisitor,
        CardType::Order,
        CardType::WinterVisitor,
    ];

    #[must_use]
    pub const fn visitor(season: Season) -> Self {
        match season {
            Season::Summer => CardType::SummerVisitor,
            Season::Winter => CardType::WinterVisitor,
        }
    }

    const fn context(self) -> &'static str {
        match self {
            CardType::Vine => "vine",
            CardType::SummerVisitor => "summerVisitor",
            CardType::Order => "order",
            CardType::WinterVisitor => "winterVisitor",
        }
    }
}

/// Any card in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "camelCase")]
pub enum CardId {
    Vine(VineId),
    Order(OrderId),
    Visitor(VisitorId),
}

impl CardId {
    #[must_use]
    pub fn card_type(self) -> CardType {
        match self {
            CardId::Vine(_) => CardType::Vine,
            CardId::Order(_) => CardType::Order,
            CardId::Visitor(v) => CardType::visitor(v.season()),
        }
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardId::Vine(v) => write!(f, "{v}"),
            CardId::Order(o) => write!(f, "{o}"),
            CardId::Visitor(v) => write!(f, "{v}"),
        }
    }
}

/// Four piles of cards, top first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub vine: Vector<CardId>,
    pub summer_visitor: Vector<CardId>,
    pub order: Vector<CardId>,
    pub winter_visitor: Vector<CardId>,
}

impl Deck {
    /// Empty piles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every card in the game, in catalog order.
    #[must_use]
    pub fn full() -> Self {
        let mut deck = Self::new();
        for vine in all_vines() {
            deck.push_bottom(CardId::Vine(vine));
        }
        for order in all_orders() {
            deck.push_bottom(CardId::Order(order));
        }
        for visitor in VisitorId::all() {
            deck.push_bottom(CardId::Visitor(visitor));
        }
        deck
    }

    /// Every card in the game, each pile shuffled from its own seeded stream.
    #[must_use]
    pub fn shuffled(seed: u64) -> Self {
        let rng = GameRng::new(seed);
        let mut deck = Self::full();
        for card_type in CardType::ALL {
            let mut cards: Vec<CardId> = deck.pile(card_type).iter().copied().collect();
            rng.for_context(card_type.context()).shuffle(&mut cards);
            *deck.pile_mut(card_type) = cards.into_iter().collect();
        }
        deck
    }

    #[must_use]
    pub fn pile(&self, card_type: CardType) -> &Vector<CardId> {
        match card_type {
            CardType::Vine => &self.vine,
            CardType::SummerVisitor => &self.summer_visitor,
            CardType::Order => &self.order,
            CardType::WinterVisitor => &self.winter_visitor,
        }
    }

    pub fn pile_mut(&mut self, card_type: CardType) -> &mut Vector<CardId> {
        match card_type {
            CardType::Vine => &mut self.vine,
            CardType::SummerVisitor => &mut self.summer_visitor,
            CardType::Order => &mut self.order,
            CardType::WinterVisitor => &mut self.winter_visitor,
        }
    }

    /// Take the top card of a pile.
    pub fn pop_top(&mut self, card_type: CardType) -> Option<CardId> {
        self.pile_mut(card_type).pop_front()
    }

    /// Put a card on top of its pile.
    pub fn push_top(&mut self, card: CardId) {
        self.pile_mut(card.card_type()).push_front(card);
    }

    /// Put a card at the bottom of its pile.
    pub fn push_bottom(&mut self, card: CardId) {
        self.pile_mut(card.card_type()).push_back(card);
    }

    /// Remove a specific card. Returns false if it is not here.
    pub fn remove(&mut self, card: CardId) -> bool {
        let pile = self.pile_mut(card.card_type());
        match pile.iter().position(|&c| c == card) {
            Some(index) => {
                pile.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, card: CardId) -> bool {
        self.pile(card.card_type()).contains(&card)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        CardType::ALL.iter().map(|&t| self.pile(t).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every card, pile by pile.
    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        CardType::ALL
            .iter()
            .flat_map(move |&t| self.pile(t).iter().copied())
    }
}
