//! Game creation.
//!
//! `GameSetup` collects players, configuration and optional fixed starting
//! hands, validates them against the shuffled deck and produces the first
//! snapshot. Cards dealt into hands are taken out of the deck so every card
//! exists exactly once.
//!
//! ## Example
//!
//! ```
//! use oenology::cards::Deck;
//! use oenology::core::PlayerColor;
//! use oenology::rules::GameSetup;
//!
//! let state = GameSetup::new()
//!     .player("viny", PlayerColor::Orange)
//!     .player("stfy", PlayerColor::Blue)
//!     .build(Deck::shuffled(7))
//!     .unwrap();
//! assert_eq!(state.player_count(), 2);
//! ```

use std::sync::Arc;

use im::{HashMap as ImHashMap, OrdMap, Vector};
use rustc_hash::FxHashSet;
use tracing::info;

use super::mutators::Transaction;
use super::turn;
use crate::cards::{CardId, CardType, Deck};
use crate::core::{
    CurrentTurn, EngineConfig, GameState, PlayerColor, PlayerId, PlayerState, Season, SetupError,
    SetupMode, WakeUpPosition, WAKE_UP_SLOTS,
};

/// Most players a game supports.
pub const MAX_PLAYERS: usize = 6;

/// Builder for the initial game state.
#[derive(Clone, Debug, Default)]
pub struct GameSetup {
    config: EngineConfig,
    players: Vec<(PlayerId, PlayerColor)>,
    hands: Vec<(PlayerId, Vec<CardId>)>,
}

impl GameSetup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seat a player. Seats follow the order of calls.
    #[must_use]
    pub fn player(mut self, id: impl Into<PlayerId>, color: PlayerColor) -> Self {
        self.players.push((id.into(), color));
        self
    }

    /// Deal fixed cards to a player. The cards are removed from the deck.
    #[must_use]
    pub fn starting_hand(mut self, id: impl Into<PlayerId>, cards: impl IntoIterator<Item = CardId>) -> Self {
        self.hands.push((id.into(), cards.into_iter().collect()));
        self
    }

    /// Validate and create the first snapshot.
    pub fn build(self, deck: Deck) -> Result<GameState, SetupError> {
        let count = self.players.len();
        if count == 0 || count > MAX_PLAYERS {
            return Err(SetupError::PlayerCount(count));
        }

        let mut ids = FxHashSet::default();
        let mut colors = FxHashSet::default();
        for (id, color) in &self.players {
            if !ids.insert(id.clone()) {
                return Err(SetupError::DuplicatePlayer(id.clone()));
            }
            if !colors.insert(*color) {
                return Err(SetupError::DuplicateColor(*color));
            }
        }
        validate_deck(&deck)?;

        let mut draw_piles = deck;
        let mut players = ImHashMap::new();
        for (id, color) in &self.players {
            players.insert(id.clone(), PlayerState::new(id.clone(), *color, &self.config));
        }
        for (id, cards) in self.hands {
            let Some(player) = players.get_mut(&id) else {
                return Err(SetupError::UnknownPlayer(id));
            };
            for card in cards {
                if !draw_piles.remove(card) {
                    return Err(SetupError::CardNotInDeck(card));
                }
                player.hand.push_back(card);
            }
        }

        let table_order: Vector<PlayerId> = self.players.iter().map(|(id, _)| id.clone()).collect();
        let first = table_order[0].clone();
        let setup = self.config.setup;
        info!(players = count, ?setup, "game created");

        let state = GameState {
            config: Arc::new(self.config),
            year: 1,
            current_turn: CurrentTurn::PapaSetUp {
                player_id: first.clone(),
            },
            players,
            table_order,
            grape_index: 0,
            wake_up_order: Default::default(),
            draw_piles,
            discard_piles: Deck::new(),
            worker_placements: OrdMap::new(),
            prompts: Vector::new(),
            activity_log: Vector::new(),
        };

        let mut tx = Transaction::new(&state);
        match setup {
            SetupMode::Papa => turn::prompt_papa(&mut tx, &first),
            SetupMode::Quick => {
                let seats = tx.table_order.clone();
                for (slot, player_id) in seats.into_iter().enumerate().take(WAKE_UP_SLOTS) {
                    tx.wake_up_order[slot] = Some(WakeUpPosition {
                        player_id,
                        passed: false,
                    });
                }
                turn::start_worker_placement_turn(&mut tx, Season::Summer, first);
            }
        }
        Ok(tx.commit(None))
    }
}

/// Create a game with the default configuration.
pub fn init_game(players: &[(PlayerId, PlayerColor)], deck: Deck) -> Result<GameState, SetupError> {
    players
        .iter()
        .fold(GameSetup::new(), |setup, (id, color)| setup.player(id.clone(), *color))
        .build(deck)
}

fn validate_deck(deck: &Deck) -> Result<(), SetupError> {
    let mut seen = FxHashSet::default();
    for card_type in CardType::ALL {
        for &card in deck.pile(card_type) {
            if card.card_type() != card_type {
                return Err(SetupError::MisplacedCard(card));
            }
            if !seen.insert(card) {
                return Err(SetupError::DuplicateCard(card));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{OrderId, VineId, VineKind};
    use crate::core::{PendingAction, SetupMode};
    use crate::prompts::PromptKind;

    fn two_players() -> GameSetup {
        GameSetup::new()
            .player("viny", PlayerColor::Orange)
            .player("stfy", PlayerColor::Blue)
    }

    #[test]
    fn test_quick_setup_starts_summer() {
        let state = two_players().build(Deck::full()).unwrap();

        assert_eq!(state.year, 1);
        assert_eq!(state.current_player_id().as_str(), "viny");
        let turn = state.worker_placement_turn().unwrap();
        assert_eq!(turn.season, Season::Summer);
        assert_eq!(turn.pending_action, None::<PendingAction>);
        assert_eq!(state.wake_up_slot_of(&PlayerId::from("viny")), Some(0));
        assert_eq!(state.wake_up_slot_of(&PlayerId::from("stfy")), Some(1));
        assert!(matches!(
            state.prompts[0].kind,
            PromptKind::PlaceWorker { season: Season::Summer }
        ));
    }

    #[test]
    fn test_papa_setup_prompts_first_seat() {
        let config = EngineConfig::default().with_setup(SetupMode::Papa);
        let state = two_players().with_config(config).build(Deck::full()).unwrap();

        assert!(matches!(state.current_turn, CurrentTurn::PapaSetUp { .. }));
        assert_eq!(state.prompts.len(), 1);
        assert_eq!(state.prompts[0].player_id.as_str(), "viny");
    }

    #[test]
    fn test_player_count_limits() {
        assert_eq!(
            GameSetup::new().build(Deck::full()).unwrap_err(),
            SetupError::PlayerCount(0)
        );

        let colors = [
            PlayerColor::Blue,
            PlayerColor::Green,
            PlayerColor::Orange,
            PlayerColor::Yellow,
            PlayerColor::Purple,
            PlayerColor::Red,
            PlayerColor::Blue,
        ];
        let seven = colors
            .iter()
            .enumerate()
            .fold(GameSetup::new(), |s, (i, c)| s.player(format!("p{i}").as_str(), *c));
        assert_eq!(seven.build(Deck::full()).unwrap_err(), SetupError::PlayerCount(7));
    }

    #[test]
    fn test_duplicate_player_and_color() {
        let dup_id = GameSetup::new()
            .player("viny", PlayerColor::Orange)
            .player("viny", PlayerColor::Blue);
        assert_eq!(
            dup_id.build(Deck::full()).unwrap_err(),
            SetupError::DuplicatePlayer(PlayerId::from("viny"))
        );

        let dup_color = GameSetup::new()
            .player("viny", PlayerColor::Orange)
            .player("stfy", PlayerColor::Orange);
        assert_eq!(
            dup_color.build(Deck::full()).unwrap_err(),
            SetupError::DuplicateColor(PlayerColor::Orange)
        );
    }

    #[test]
    fn test_starting_hand_leaves_deck() {
        let vine = CardId::Vine(VineId::new(VineKind::Pinot, 0));
        let order = CardId::Order(OrderId::new(0));
        let state = two_players()
            .starting_hand("viny", [vine, order])
            .build(Deck::full())
            .unwrap();

        assert!(state.player(&PlayerId::from("viny")).holds(vine));
        assert!(!state.draw_piles.contains(vine));
        assert!(!state.draw_piles.contains(order));
        assert_eq!(state.draw_piles.len() + 2, Deck::full().len());
    }

    #[test]
    fn test_bad_decks_rejected() {
        let vine = CardId::Vine(VineId::new(VineKind::Pinot, 0));

        let mut duplicated = Deck::full();
        duplicated.push_bottom(vine);
        assert_eq!(
            two_players().build(duplicated).unwrap_err(),
            SetupError::DuplicateCard(vine)
        );

        let mut misplaced = Deck::new();
        misplaced.order.push_back(vine);
        assert_eq!(
            two_players().build(misplaced).unwrap_err(),
            SetupError::MisplacedCard(vine)
        );

        let err = two_players()
            .starting_hand("viny", [vine])
            .build(Deck::new())
            .unwrap_err();
        assert_eq!(err, SetupError::CardNotInDeck(vine));

        let err = two_players()
            .starting_hand("mara", [vine])
            .build(Deck::full())
            .unwrap_err();
        assert_eq!(err, SetupError::UnknownPlayer(PlayerId::from("mara")));
    }

    #[test]
    fn test_init_game_matches_builder() {
        let players = [
            (PlayerId::from("viny"), PlayerColor::Orange),
            (PlayerId::from("stfy"), PlayerColor::Blue),
        ];
        let a = init_game(&players, Deck::shuffled(3)).unwrap();
        let b = two_players().build(Deck::shuffled(3)).unwrap();
        assert_eq!(a, b);
    }
}
