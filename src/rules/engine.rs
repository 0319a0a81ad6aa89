//! Action dispatch and game end.
//!
//! `apply` is the single entry point for changing a game: it takes a
//! snapshot and an action and returns the next snapshot. Validation runs
//! against the first prompt addressed to the acting player; anything that
//! does not answer it is a no-op.
//!
//! ## Dispatch
//!
//! - `START_GAME` builds a fresh game with the snapshot's configuration
//! - While a visitor card is being played, answers go to its resolver
//! - Everything else goes to the board reducer
//!
//! Handlers work on a `Transaction`. A handler that fails drops it, so a
//! rejected action never leaves partial changes behind.

use tracing::debug;

use super::board;
use super::mutators::Transaction;
use super::setup::GameSetup;
use crate::core::{Action, ActionError, CurrentTurn, EngineConfig, GameState, PlayerId};
use crate::visitors;

/// Apply an action. Rejected actions return the snapshot unchanged.
#[must_use]
pub fn apply(state: &GameState, action: &Action) -> GameState {
    match try_apply(state, action) {
        Ok(next) => next,
        Err(error) => {
            debug!(action = action.kind_name(), %error, "action rejected");
            state.clone()
        }
    }
}

/// Apply an action, reporting why it was rejected.
pub fn try_apply(state: &GameState, action: &Action) -> Result<GameState, ActionError> {
    if let Action::StartGame {
        players,
        shuffled_cards,
    } = action
    {
        let setup = players
            .iter()
            .fold(GameSetup::new().with_config((*state.config).clone()), |setup, (id, color)| {
                setup.player(id.clone(), *color)
            });
        return Ok(setup.build(shuffled_cards.clone())?);
    }

    let Some(actor) = action.player_id() else {
        return Err(ActionError::Rejected(format!("{} has no acting player", action.kind_name())));
    };
    let index = state
        .prompts
        .iter()
        .position(|prompt| &prompt.player_id == actor)
        .ok_or_else(|| ActionError::NoPromptForPlayer(actor.clone()))?;
    state.prompts[index].check(action)?;

    let mut tx = Transaction::new(state);
    tx.prompts.remove(index);
    if tx.playing_visitor().is_some() {
        visitors::resolve(&mut tx, action)?;
    } else {
        board::resolve(&mut tx, action)?;
    }
    Ok(tx.commit(Some(actor.clone())))
}

// === Game end ===

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Tied for first on every tiebreak.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: &PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => p == player,
            GameResult::Winners(ps) => ps.contains(player),
        }
    }
}

/// Decides when a game is over.
pub trait EndCondition {
    /// `Some(result)` once the game has ended.
    fn check(&self, state: &GameState) -> Option<GameResult>;
}

/// The game ends at the end of a year in which someone reached the
/// threshold. Most victory points wins, then most coins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VictoryPointThreshold {
    pub threshold: i32,
}

impl VictoryPointThreshold {
    #[must_use]
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.victory_threshold)
    }
}

impl EndCondition for VictoryPointThreshold {
    fn check(&self, state: &GameState) -> Option<GameResult> {
        let year_ended = state.year > 1 && matches!(state.current_turn, CurrentTurn::WakeUpOrder { .. });
        if !year_ended {
            return None;
        }
        let players: Vec<_> = state.players_in_order().collect();
        if players.iter().all(|p| p.victory_points < self.threshold) {
            return None;
        }

        let best = players.iter().map(|p| (p.victory_points, p.coins)).max()?;
        let mut winners: Vec<PlayerId> = players
            .iter()
            .filter(|p| (p.victory_points, p.coins) == best)
            .map(|p| p.id.clone())
            .collect();
        if winners.len() == 1 {
            winners.pop().map(GameResult::Winner)
        } else {
            Some(GameResult::Winners(winners))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Deck;
    use crate::core::{PlayerColor, WorkerKind};
    use crate::rules::placement::Placement;
    use crate::rules::setup::GameSetup;

    fn two_players() -> GameState {
        GameSetup::new()
            .player("viny", PlayerColor::Orange)
            .player("stfy", PlayerColor::Blue)
            .build(Deck::full())
            .unwrap()
    }

    fn gain_coin(player: &str) -> Action {
        Action::PlaceWorker {
            player_id: PlayerId::from(player),
            placement: Placement::GainCoin,
            worker: WorkerKind::Normal,
        }
    }

    #[test]
    fn test_gain_coin_passes_turn() {
        let state = two_players();
        let next = apply(&state, &gain_coin("viny"));

        assert_eq!(next.player(&PlayerId::from("viny")).coins, 1);
        assert_eq!(next.current_player_id().as_str(), "stfy");
        assert_eq!(next.activity_log.len(), state.activity_log.len() + 1);
    }

    #[test]
    fn test_wrong_player_is_noop() {
        let state = two_players();
        let err = try_apply(&state, &gain_coin("stfy")).unwrap_err();
        assert_eq!(err, ActionError::NoPromptForPlayer(PlayerId::from("stfy")));
        assert_eq!(apply(&state, &gain_coin("stfy")), state);
    }

    #[test]
    fn test_wrong_answer_kind_is_noop() {
        let state = two_players();
        let action = Action::ChooseField {
            player_id: PlayerId::from("viny"),
            fields: vec![],
        };
        assert!(matches!(
            try_apply(&state, &action),
            Err(ActionError::WrongPromptKind { .. })
        ));
        assert_eq!(apply(&state, &action), state);
    }

    #[test]
    fn test_rejected_placement_leaves_state() {
        let state = two_players();
        let action = Action::PlaceWorker {
            player_id: PlayerId::from("viny"),
            placement: Placement::MakeWine,
            worker: WorkerKind::Normal,
        };
        assert!(matches!(
            try_apply(&state, &action),
            Err(ActionError::PlacementUnavailable(Placement::MakeWine, _))
        ));
    }

    #[test]
    fn test_start_game_restarts() {
        let state = apply(&two_players(), &gain_coin("viny"));
        let action = Action::StartGame {
            players: vec![
                (PlayerId::from("viny"), PlayerColor::Orange),
                (PlayerId::from("stfy"), PlayerColor::Blue),
            ],
            shuffled_cards: Deck::full(),
        };
        assert_eq!(apply(&state, &action), two_players());
    }

    #[test]
    fn test_threshold_waits_for_year_end() {
        let mut state = two_players();
        state.players.get_mut(&PlayerId::from("stfy")).unwrap().victory_points = 21;
        let end = VictoryPointThreshold::from_config(&state.config);
        assert_eq!(end.check(&state), None);

        state.year = 2;
        state.current_turn = CurrentTurn::WakeUpOrder {
            player_id: PlayerId::from("viny"),
        };
        assert_eq!(end.check(&state), Some(GameResult::Winner(PlayerId::from("stfy"))));
    }

    #[test]
    fn test_threshold_ties_break_on_coins() {
        let mut state = two_players();
        state.year = 3;
        state.current_turn = CurrentTurn::WakeUpOrder {
            player_id: PlayerId::from("viny"),
        };
        for id in ["viny", "stfy"] {
            state.players.get_mut(&PlayerId::from(id)).unwrap().victory_points = 20;
        }
        let end = VictoryPointThreshold::new(20);
        let result = end.check(&state).unwrap();
        assert!(result.is_winner(&PlayerId::from("viny")));
        assert!(result.is_winner(&PlayerId::from("stfy")));

        state.players.get_mut(&PlayerId::from("viny")).unwrap().coins = 2;
        assert_eq!(end.check(&state), Some(GameResult::Winner(PlayerId::from("viny"))));
    }
}
