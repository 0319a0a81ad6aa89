//! Core engine types: players, fields, tokens, state, actions, configuration.
//!
//! This module holds the data model. It has no rules of its own; the
//! `rules` and `visitors` modules turn actions into new snapshots.

pub mod action;
pub mod config;
pub mod error;
pub mod field;
pub mod log;
pub mod player;
pub mod rng;
pub mod state;
pub mod tokens;

pub use action::{Action, WineIngredients};
pub use config::{EngineConfig, SetupMode};
pub use error::{ActionError, ConfigError, SetupError};
pub use field::{Field, FieldId};
pub use log::{ActivityEvent, LogEntry, SeasonName};
pub use player::{PlayerColor, PlayerId, PlayerState, Worker, WorkerKind};
pub use rng::GameRng;
pub use state::{
    BuySellMode, CurrentTurn, GameState, PendingAction, Season, WakeUpPosition,
    WorkerPlacementTurn, WAKE_UP_SLOTS,
};
pub use tokens::{Cellar, CrushPad, GrapeColor, GrapeSpec, TokenLadder, WineColor, WineSpec};
