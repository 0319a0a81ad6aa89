//! Resource mutators.
//!
//! A `Transaction` is a working copy of the state for one action. Rules
//! mutate it through the methods here, which re-check preconditions, keep
//! the state consistent and record `ActivityEvent`s. If the handler fails,
//! the copy is dropped and the original snapshot is untouched; if it
//! succeeds, `commit` appends one log entry and returns the new snapshot.

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashSet;
use tracing::trace;

use super::selectors;
use crate::cards::{CardId, CardType, Coupon, StructureId, StructureState, VineId, VineYields};
use crate::core::{
    ActionError, ActivityEvent, Field, FieldId, GameState, GrapeSpec, LogEntry, PendingAction,
    PlayerId, PlayerState, WineIngredients, WineSpec, Worker, WorkerKind,
};
use crate::prompts::Prompt;

/// Working copy of a snapshot plus the events recorded so far.
pub struct Transaction {
    state: GameState,
    events: Vec<ActivityEvent>,
    /// Year the action started in; a year end moves the state on.
    started_in: u32,
}

impl Deref for Transaction {
    type Target = GameState;

    fn deref(&self) -> &GameState {
        &self.state
    }
}

impl DerefMut for Transaction {
    fn deref_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

impl Transaction {
    /// Start working on a copy of `state`.
    #[must_use]
    pub fn new(state: &GameState) -> Self {
        Self {
            started_in: state.year,
            state: state.clone(),
            events: Vec::new(),
        }
    }

    /// Finish, writing one log entry if anything happened.
    #[must_use]
    pub fn commit(mut self, player_id: Option<PlayerId>) -> GameState {
        if !self.events.is_empty() {
            let entry = LogEntry {
                sequence: self.state.activity_log.len(),
                year: self.started_in,
                player_id,
                events: self.events,
            };
            self.state.activity_log.push_back(entry);
        }
        self.state
    }

    /// Record an event.
    pub fn log(&mut self, event: ActivityEvent) {
        trace!(?event, "activity");
        self.events.push(event);
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    fn player_mut(&mut self, id: &PlayerId) -> &mut PlayerState {
        match self.state.players.get_mut(id) {
            Some(player) => player,
            None => panic!("Unknown player {id}"),
        }
    }

    fn field_mut(&mut self, id: &PlayerId, field_id: FieldId) -> Result<&mut Field, ActionError> {
        self.player_mut(id)
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| ActionError::FieldNotEligible {
                field: field_id,
                reason: "No such field".into(),
            })
    }

    // === Prompts and pending actions ===

    pub fn push_prompt(&mut self, prompt: Prompt) {
        self.state.prompts.push_back(prompt);
    }

    /// Replace the pending action of the current worker placement turn.
    ///
    /// # Panics
    ///
    /// Panics outside worker placement.
    pub fn set_pending(&mut self, pending: Option<PendingAction>) {
        match &mut self.state.current_turn {
            crate::core::CurrentTurn::WorkerPlacement(turn) => turn.pending_action = pending,
            other => panic!("No pending action during {}", other.name()),
        }
    }

    // === Coins, victory points, residuals ===

    pub fn gain_coins(&mut self, id: &PlayerId, amount: u32) {
        if amount == 0 {
            return;
        }
        self.player_mut(id).coins += amount;
        self.log(ActivityEvent::Coins {
            player_id: id.clone(),
            delta: i64::from(amount),
        });
    }

    pub fn pay_coins(&mut self, id: &PlayerId, amount: u32) -> Result<(), ActionError> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.player(id).coins;
        if available < amount {
            return Err(ActionError::InsufficientCoins {
                player: id.clone(),
                needed: amount,
                available,
            });
        }
        self.player_mut(id).coins -= amount;
        self.log(ActivityEvent::Coins {
            player_id: id.clone(),
            delta: -i64::from(amount),
        });
        Ok(())
    }

    /// Move coins between players.
    pub fn transfer_coins(&mut self, from: &PlayerId, to: &PlayerId, amount: u32) -> Result<(), ActionError> {
        self.pay_coins(from, amount)?;
        self.gain_coins(to, amount);
        Ok(())
    }

    /// Add (or with a negative delta, remove) victory points. VP can go
    /// below zero.
    pub fn gain_victory_points(&mut self, id: &PlayerId, delta: i32) {
        if delta == 0 {
            return;
        }
        self.player_mut(id).victory_points += delta;
        self.log(ActivityEvent::VictoryPoints {
            player_id: id.clone(),
            delta,
        });
    }

    /// Raise residual income, stopping at the cap.
    pub fn gain_residuals(&mut self, id: &PlayerId, amount: u8) {
        let cap = self.config.max_residuals;
        let player = self.player_mut(id);
        let before = player.residuals;
        player.residuals = before.saturating_add(amount).min(cap);
        let delta = i32::from(player.residuals) - i32::from(before);
        if delta != 0 {
            self.log(ActivityEvent::Residuals {
                player_id: id.clone(),
                delta,
            });
        }
    }

    pub fn lose_residuals(&mut self, id: &PlayerId, amount: u8) -> Result<(), ActionError> {
        let player = self.player_mut(id);
        if player.residuals < amount {
            return Err(ActionError::Rejected(format!(
                "{id} has only {} residual payments",
                player.residuals
            )));
        }
        player.residuals -= amount;
        self.log(ActivityEvent::Residuals {
            player_id: id.clone(),
            delta: -i32::from(amount),
        });
        Ok(())
    }

    // === Cards ===

    /// Draw up to `count` cards of a type into a hand. An empty draw pile is
    /// refilled by turning over its discard pile. Returns what was drawn.
    pub fn draw_cards(&mut self, id: &PlayerId, card_type: CardType, count: usize) -> Vec<CardId> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            if self.state.draw_piles.pile(card_type).is_empty() {
                self.turn_over_discards(card_type);
            }
            match self.state.draw_piles.pop_top(card_type) {
                Some(card) => drawn.push(card),
                None => break,
            }
        }
        if !drawn.is_empty() {
            let player = self.player_mut(id);
            for &card in &drawn {
                player.hand.push_back(card);
            }
            self.log(ActivityEvent::Draw {
                player_id: id.clone(),
                cards: vec![card_type; drawn.len()],
            });
        }
        drawn
    }

    fn turn_over_discards(&mut self, card_type: CardType) {
        let discards = std::mem::take(self.state.discard_piles.pile_mut(card_type));
        // Oldest discard ends up on top.
        *self.state.draw_piles.pile_mut(card_type) = discards.iter().rev().copied().collect();
    }

    /// Take a card out of a hand without putting it anywhere.
    pub fn take_from_hand(&mut self, id: &PlayerId, card: CardId) -> Result<(), ActionError> {
        let hand = &mut self.player_mut(id).hand;
        match hand.iter().position(|&c| c == card) {
            Some(index) => {
                hand.remove(index);
                Ok(())
            }
            None => Err(ActionError::CardNotInHand {
                player: id.clone(),
                card,
            }),
        }
    }

    pub fn add_to_hand(&mut self, id: &PlayerId, card: CardId) {
        self.player_mut(id).hand.push_back(card);
    }

    /// Put a card on top of its discard pile.
    pub fn discard(&mut self, card: CardId) {
        self.state.discard_piles.push_top(card);
    }

    /// Discard cards from a hand.
    pub fn discard_from_hand(&mut self, id: &PlayerId, cards: &[CardId]) -> Result<(), ActionError> {
        for &card in cards {
            self.take_from_hand(id, card)?;
            self.discard(card);
        }
        if !cards.is_empty() {
            self.log(ActivityEvent::Discard {
                player_id: id.clone(),
                cards: cards.iter().map(|c| c.card_type()).collect(),
            });
        }
        Ok(())
    }

    // === Grapes ===

    /// Put a grape on the crush pad. Returns the value it landed on, or
    /// `None` if it was lost.
    pub fn place_grape(&mut self, id: &PlayerId, grape: GrapeSpec) -> Option<u8> {
        self.player_mut(id)
            .crush_pad
            .ladder_mut(grape.color)
            .place(grape.value, 1)
    }

    pub fn remove_grape(&mut self, id: &PlayerId, grape: GrapeSpec) -> Result<(), ActionError> {
        if self.player_mut(id).crush_pad.ladder_mut(grape.color).remove(grape.value) {
            Ok(())
        } else {
            Err(ActionError::MissingGrape(grape))
        }
    }

    /// Harvest a field onto the crush pad.
    pub fn harvest_field(&mut self, id: &PlayerId, field_id: FieldId) -> Result<VineYields, ActionError> {
        let field = self.field_mut(id, field_id)?;
        let reason = if field.sold {
            Some("Field was sold")
        } else if field.is_empty() {
            Some("Nothing is planted")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ActionError::FieldNotEligible {
                field: field_id,
                reason: reason.into(),
            });
        }

        let yields = field.yields();
        if yields.red > 0 {
            self.place_grape(id, GrapeSpec::red(yields.red));
        }
        if yields.white > 0 {
            self.place_grape(id, GrapeSpec::white(yields.white));
        }
        self.log(ActivityEvent::Harvest {
            player_id: id.clone(),
            field_id,
            yields,
        });
        Ok(yields)
    }

    /// Sell grapes for coins.
    pub fn sell_grapes(&mut self, id: &PlayerId, grapes: &[GrapeSpec]) -> Result<(), ActionError> {
        let mut seen = FxHashSet::default();
        for &grape in grapes {
            if !seen.insert(grape) {
                return Err(ActionError::DuplicateSelection);
            }
            self.remove_grape(id, grape)?;
        }
        let total = grapes.iter().map(|g| selectors::grape_price(g.value)).sum();
        self.log(ActivityEvent::SellGrapes {
            player_id: id.clone(),
            grapes: grapes.to_vec(),
        });
        self.gain_coins(id, total);
        Ok(())
    }

    // === Wine ===

    /// Turn grapes into wine. Every recipe is checked before any grape is
    /// removed. Returns each wine as placed, `None` where it was lost.
    pub fn make_wines(
        &mut self,
        id: &PlayerId,
        ingredients: &[WineIngredients],
    ) -> Result<Vec<Option<WineSpec>>, ActionError> {
        let player = self.player(id);
        let mut used = FxHashSet::default();
        for grape in ingredients.iter().flat_map(|i| i.grapes.iter()) {
            if !used.insert(*grape) {
                return Err(ActionError::DuplicateSelection);
            }
            if !player.crush_pad.contains(*grape) {
                return Err(ActionError::MissingGrape(*grape));
            }
        }
        let planned = ingredients
            .iter()
            .map(|i| selectors::recipe_value(player, i))
            .collect::<Result<Vec<_>, _>>()?;

        let mut made = Vec::with_capacity(planned.len());
        for (recipe, wine) in ingredients.iter().zip(planned) {
            for &grape in &recipe.grapes {
                self.remove_grape(id, grape)?;
            }
            let landed = self
                .player_mut(id)
                .cellar
                .ladder_mut(wine.color)
                .place(wine.value, wine.color.floor());
            made.push(landed.map(|value| WineSpec::new(wine.color, value)));
        }
        if !made.is_empty() {
            self.log(ActivityEvent::MakeWine {
                player_id: id.clone(),
                wines: made.clone(),
            });
        }
        Ok(made)
    }

    pub fn remove_wine(&mut self, id: &PlayerId, wine: WineSpec) -> Result<(), ActionError> {
        if self.player_mut(id).cellar.ladder_mut(wine.color).remove(wine.value) {
            Ok(())
        } else {
            Err(ActionError::MissingWine(wine))
        }
    }

    // === Vines and fields ===

    /// Plant a vine that is already out of the hand. A built, unused
    /// windmill scores 1 VP.
    pub fn plant_vine(&mut self, id: &PlayerId, vine: VineId, field_id: FieldId) -> Result<(), ActionError> {
        if let Some(reason) = selectors::field_plant_reason(self.player(id), vine, field_id) {
            return Err(ActionError::FieldNotEligible {
                field: field_id,
                reason,
            });
        }
        self.field_mut(id, field_id)?.vines.push_back(vine);
        self.log(ActivityEvent::Plant {
            player_id: id.clone(),
            vine,
            field_id,
        });

        if self.player(id).structure_ready(StructureId::Windmill) {
            self.use_structure(id, StructureId::Windmill);
            self.gain_victory_points(id, 1);
        }
        Ok(())
    }

    /// Take a vine off its field. The card goes nowhere; callers decide.
    pub fn uproot_vine(&mut self, id: &PlayerId, vine: VineId) -> Result<FieldId, ActionError> {
        let field_id = self
            .player(id)
            .field_of_vine(vine)
            .map(|f| f.id)
            .ok_or_else(|| ActionError::NotOffered(vine.to_string()))?;
        let field = self.field_mut(id, field_id)?;
        field.vines = field.vines.iter().copied().filter(|&v| v != vine).collect();
        self.log(ActivityEvent::Uproot {
            player_id: id.clone(),
            vine,
        });
        Ok(field_id)
    }

    /// Swap two vines on different fields.
    pub fn swap_vines(&mut self, id: &PlayerId, a: VineId, b: VineId) -> Result<(), ActionError> {
        if !selectors::swap_partners(self.player(id), a).contains(&b) {
            return Err(ActionError::Rejected(format!("{a} and {b} cannot be switched")));
        }
        let player = self.player_mut(id);
        for field in player.fields.iter_mut() {
            for vine in field.vines.iter_mut() {
                if *vine == a {
                    *vine = b;
                } else if *vine == b {
                    *vine = a;
                }
            }
        }
        Ok(())
    }

    pub fn sell_field(&mut self, id: &PlayerId, field_id: FieldId) -> Result<(), ActionError> {
        let field = self.field_mut(id, field_id)?;
        if field.sold || !field.is_empty() {
            return Err(ActionError::FieldNotEligible {
                field: field_id,
                reason: "Only owned, empty fields can be sold".into(),
            });
        }
        field.sold = true;
        let value = u32::from(field.value);
        self.log(ActivityEvent::BuySellField {
            player_id: id.clone(),
            field_id,
            bought: false,
        });
        self.gain_coins(id, value);
        Ok(())
    }

    pub fn buy_field(&mut self, id: &PlayerId, field_id: FieldId) -> Result<(), ActionError> {
        let field = self.field_mut(id, field_id)?;
        if !field.sold {
            return Err(ActionError::FieldNotEligible {
                field: field_id,
                reason: "Field is already owned".into(),
            });
        }
        let value = u32::from(field.value);
        self.pay_coins(id, value)?;
        self.field_mut(id, field_id)?.sold = false;
        self.log(ActivityEvent::BuySellField {
            player_id: id.clone(),
            field_id,
            bought: true,
        });
        Ok(())
    }

    // === Structures ===

    /// Build a structure, paying its cost less the coupon.
    pub fn build_structure(
        &mut self,
        id: &PlayerId,
        structure_id: StructureId,
        coupon: Option<Coupon>,
    ) -> Result<(), ActionError> {
        let player = self.player(id);
        if player.has_structure(structure_id) {
            return Err(ActionError::AlreadyBuilt(structure_id));
        }
        if let Some(required) = crate::cards::structure(structure_id).requires {
            if !player.has_structure(required) {
                return Err(ActionError::CannotBuild(
                    structure_id,
                    format!("requires {required:?}"),
                ));
            }
        }
        let price = Coupon::price(coupon, structure_id.cost()).ok_or_else(|| {
            ActionError::CannotBuild(structure_id, "the coupon does not cover it".into())
        })?;

        self.pay_coins(id, u32::from(price))?;
        self.player_mut(id)
            .structures
            .insert(structure_id, StructureState::Built);
        self.log(ActivityEvent::Build {
            player_id: id.clone(),
            structure_id,
            paid: u32::from(price),
        });
        Ok(())
    }

    /// Mark a structure's yearly ability as used.
    pub fn use_structure(&mut self, id: &PlayerId, structure_id: StructureId) {
        self.player_mut(id)
            .structures
            .insert(structure_id, StructureState::Used);
    }

    // === Workers ===

    /// Mark one available worker of a kind as placed.
    pub fn use_worker(&mut self, id: &PlayerId, kind: WorkerKind) -> Result<(), ActionError> {
        let player = self.player_mut(id);
        match player.workers.iter_mut().find(|w| w.available && w.kind == kind) {
            Some(worker) => {
                worker.available = false;
                Ok(())
            }
            None => Err(ActionError::NoWorker {
                player: id.clone(),
                kind,
            }),
        }
    }

    /// Pay for and add a new normal worker.
    pub fn train_worker(&mut self, id: &PlayerId, cost: u32, available_now: bool) -> Result<(), ActionError> {
        if let Some(reason) = selectors::train_reason(self.player(id), &self.config, cost) {
            return Err(ActionError::Rejected(reason));
        }
        self.pay_coins(id, cost)?;
        self.player_mut(id).workers.push_back(Worker {
            kind: WorkerKind::Normal,
            available: available_now,
            temp: false,
        });
        self.log(ActivityEvent::TrainWorker { player_id: id.clone() });
        Ok(())
    }

    /// Add a worker that leaves at year end.
    pub fn add_temp_worker(&mut self, id: &PlayerId) {
        self.player_mut(id).workers.push_back(Worker {
            kind: WorkerKind::Normal,
            available: true,
            temp: true,
        });
    }

    // === Year end ===

    /// Age ladders, pay residuals and restore workers and structures.
    pub fn end_year_for(&mut self, id: &PlayerId) {
        let player = self.player_mut(id);
        player.crush_pad = player.crush_pad.aged();
        player.cellar = player.cellar.aged();
        player.workers = player
            .workers
            .iter()
            .filter(|w| !w.temp)
            .map(|w| Worker { available: true, ..*w })
            .collect();
        player.structures = player
            .structures
            .iter()
            .map(|(&id, &state)| match state {
                StructureState::Used => (id, StructureState::Built),
                other => (id, other),
            })
            .collect();
        let income = u32::from(player.residuals);
        self.gain_coins(id, income);
    }
}
