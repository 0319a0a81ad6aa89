//! Game rules.
//!
//! - `engine`: `apply`/`try_apply` and end-of-game detection
//! - `setup`: creating the first snapshot
//! - `turn`: the season and year state machine
//! - `board`: worker placement and the actions it starts
//! - `mutators`: the `Transaction` every change goes through
//! - `selectors`: read-only queries and disabled reasons
//!
//! Visitor cards live in `crate::visitors` and use the same building blocks.

pub mod board;
pub mod engine;
pub mod mutators;
pub mod placement;
pub mod selectors;
pub mod setup;
pub mod turn;

pub use engine::{apply, try_apply, EndCondition, GameResult, VictoryPointThreshold};
pub use mutators::Transaction;
pub use placement::Placement;
pub use setup::{init_game, GameSetup, MAX_PLAYERS};
pub use turn::wake_up_label;
