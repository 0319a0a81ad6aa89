//! Visitor cards.
//!
//! The catalog is closed: every card is a `VisitorId` variant and its
//! behavior lives in `crate::visitors`.

use serde::{Deserialize, Serialize};

use crate::core::state::Season;

/// Visitor card identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisitorId {
    // Summer
    TourGuide,
    Banker,
    Buyer,
    Landscaper,
    Organizer,
    Patron,
    Sponsor,
    UncertifiedArchitect,
    UncertifiedBroker,
    Contractor,
    Planter,
    Handyman,
    VolunteerCrew,
    Surveyor,
    Agriculturist,
    Negotiator,
    // Winter
    Judge,
    Politician,
    Professor,
    Taster,
    Teacher,
    Crusher,
    Noble,
    GuestSpeaker,
    Assessor,
    Queen,
    Supervisor,
}

/// Static visitor card data.
#[derive(Debug)]
pub struct VisitorCard {
    pub id: VisitorId,
    pub name: &'static str,
    pub season: Season,
    pub description: &'static str,
}

macro_rules! visitor {
    ($id:ident, $name:expr, $season:ident, $text:expr) => {
        VisitorCard {
            id: VisitorId::$id,
            name: $name,
            season: Season::$season,
            description: $text,
        }
    };
}

// Indexed by `VisitorId as usize`.
static VISITOR_CARDS: [VisitorCard; 27] = [
    visitor!(TourGuide, "Tour Guide", Summer, "Gain 4 coins OR harvest 1 field."),
    visitor!(Banker, "Banker", Summer, "Gain 5 coins. Each opponent may lose 1 VP to gain 3 coins."),
    visitor!(Buyer, "Buyer", Summer, "Pay 2 to place a value-1 grape OR discard 1 grape to gain 2 coins and 1 VP."),
    visitor!(Landscaper, "Landscaper", Summer, "Draw 1 vine and plant up to 1 vine OR switch 2 vines on your fields."),
    visitor!(Organizer, "Organizer", Summer, "Move your rooster to an empty row on the wake-up chart, take that bonus, then pass."),
    visitor!(Patron, "Patron", Summer, "Gain 4 coins OR draw 1 order card and 1 winter visitor card."),
    visitor!(Sponsor, "Sponsor", Summer, "Draw 2 vines OR gain 3 coins. You may lose 1 VP to do both."),
    visitor!(UncertifiedArchitect, "Uncertified Architect", Summer, "Lose 1 VP to build a structure costing up to 3 OR lose 2 VP to build any structure."),
    visitor!(UncertifiedBroker, "Uncertified Broker", Summer, "Lose 3 VP to gain 9 coins OR pay 6 to gain 2 VP."),
    visitor!(Contractor, "Contractor", Summer, "Choose 2: gain 1 VP, build 1 structure, plant 1 vine."),
    visitor!(Planter, "Planter", Summer, "Plant up to 2 vines and gain 1 coin OR uproot and discard 1 vine to gain 2 VP."),
    visitor!(Handyman, "Handyman", Summer, "All players may build 1 structure at a 2 coin discount. Gain 1 VP for each opponent who does."),
    visitor!(VolunteerCrew, "Volunteer Crew", Summer, "All players may plant 1 vine. Gain 2 coins for each opponent who does."),
    visitor!(Surveyor, "Surveyor", Summer, "Gain 2 coins for each empty field you own OR gain 1 VP for each planted field you own."),
    visitor!(Agriculturist, "Agriculturist", Summer, "Plant 1 vine. Then, if you have at least 6 different vines planted, gain 2 VP."),
    visitor!(Negotiator, "Negotiator", Summer, "Discard 1 grape to gain 1 residual payment OR discard 1 wine to gain 2 residual payments."),
    visitor!(Judge, "Judge", Winter, "Draw 2 summer visitor cards OR discard 1 wine of value 4 or more to gain 3 VP."),
    visitor!(Politician, "Politician", Winter, "If you have less than 0 VP, gain 6 coins. Otherwise draw 1 vine, 1 summer visitor and 1 order card."),
    visitor!(Professor, "Professor", Winter, "Pay 2 to train 1 worker OR gain 2 VP if you have a total of 6 workers."),
    visitor!(Taster, "Taster", Winter, "Discard 1 wine to gain 4 coins. If it is the most valuable wine in any cellar (no ties), gain 2 VP."),
    visitor!(Teacher, "Teacher", Winter, "Make up to 2 wine tokens OR pay 2 to train 1 worker."),
    visitor!(Crusher, "Crusher", Winter, "Gain 3 coins and draw 1 summer visitor OR draw 1 order card and make up to 1 wine token."),
    visitor!(Noble, "Noble", Winter, "Pay 1 to gain 1 residual payment OR lose 2 residual payments to gain 2 VP."),
    visitor!(GuestSpeaker, "Guest Speaker", Winter, "All players may pay 1 to train 1 worker. Gain 1 VP for each opponent who does."),
    visitor!(Assessor, "Assessor", Winter, "Gain 1 coin for each card in your hand OR discard your hand to gain 2 VP."),
    visitor!(Queen, "Queen", Winter, "The player on your right chooses: lose 1 VP, give you 2 cards, or pay you 3 coins."),
    visitor!(Supervisor, "Supervisor", Winter, "Make up to 2 wine tokens. Gain 1 VP for each sparkling wine token you make."),
];

impl VisitorId {
    #[must_use]
    pub fn card(self) -> &'static VisitorCard {
        visitor_card(self)
    }

    #[must_use]
    pub fn season(self) -> Season {
        self.card().season
    }

    /// Every visitor, in catalog order.
    pub fn all() -> impl Iterator<Item = VisitorId> {
        VISITOR_CARDS.iter().map(|card| card.id)
    }
}

impl std::fmt::Display for VisitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.card().name)
    }
}

/// Look up a visitor card.
#[must_use]
pub fn visitor_card(id: VisitorId) -> &'static VisitorCard {
    &VISITOR_CARDS[id as usize]
}
