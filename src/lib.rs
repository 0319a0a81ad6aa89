//! # oenology
//!
//! Rules engine for a worker-placement game about running a vineyard.
//!
//! ## Design Principles
//!
//! 1. **Snapshots In, Snapshots Out**: `apply(&state, &action)` returns the
//!    next `GameState` and never mutates its input. Invalid actions return
//!    the input unchanged.
//!
//! 2. **Deterministic**: The only randomness is the deck shuffle, done once
//!    by the caller with a seed. Replaying the same actions on the same
//!    deck always yields the same game.
//!
//! 3. **Prompts Drive Play**: The state carries a queue of prompts. Every
//!    action answers the first prompt addressed to its player.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) snapshot cloning via `im-rs`.
//!
//! - **Transactions**: Rules mutate a working copy through
//!   `rules::Transaction`. A rejected action drops the copy, so partial
//!   changes never leak.
//!
//! - **Closed Card Catalog**: Cards are enum identifiers backed by static
//!   tables. Visitor effects are resolved by one `VisitorEffect` per card.
//!
//! ## Modules
//!
//! - `core`: Players, fields, token ladders, state, actions, configuration
//! - `cards`: Vines, orders, visitors, structures and the deck
//! - `prompts`: The interactions the engine asks players to answer
//! - `rules`: Dispatch, setup, turn sequencing, the board and mutators
//! - `visitors`: Visitor card resolvers

pub mod cards;
pub mod core;
pub mod prompts;
pub mod rules;
pub mod visitors;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionError, ActivityEvent, ConfigError, CurrentTurn, EngineConfig, GameRng,
    GameState, LogEntry, PendingAction, PlayerColor, PlayerId, PlayerState, Season, SetupError,
    SetupMode, WineIngredients, WorkerKind,
};

pub use crate::cards::{
    order_card, structure, vine_card, visitor_card, CardId, CardType, Deck, OrderId, StructureId,
    VineId, VisitorId,
};

pub use crate::prompts::{Choice, ChoiceId, Prompt, PromptKind};

pub use crate::rules::{
    apply, init_game, try_apply, EndCondition, GameResult, GameSetup, Placement,
    VictoryPointThreshold,
};

pub use crate::visitors::{visitor_effect, VisitorChoice, VisitorEffect};
