//! Static card catalog.
//!
//! ## Key Types
//!
//! - `VineId` / `VineCard`: plantable vines with yields and structure needs
//! - `OrderId` / `OrderCard`: wine orders scored for VP and residual income
//! - `VisitorId` / `VisitorCard`: the closed set of visitor cards
//! - `StructureId` / `Structure`: buildable structures and their costs
//! - `CardId` / `Deck`: any card, and the four-pile deck
//!
//! Catalog data is immutable and lives in statics; game state only stores
//! identifiers.

pub mod deck;
pub mod order;
pub mod structure;
pub mod vine;
pub mod visitor;

pub use deck::{CardId, CardType, Deck};
pub use order::{order_card, requirements_met, OrderCard, OrderId, WineRequirement};
pub use structure::{structure, Coupon, Structure, StructureId, StructureState, MAX_STRUCTURE_COST};
pub use vine::{vine_card, VineCard, VineId, VineKind, VineYields};
pub use visitor::{visitor_card, VisitorCard, VisitorId};
