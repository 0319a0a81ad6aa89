//! Board reducer: worker placement and the actions it starts.
//!
//! Placing a worker either resolves at once (draw, tour, coin, training)
//! or records a `PendingAction` and queues the prompt that continues it.
//! The answers to those prompts arrive here too, routed by the pending
//! action, until the action calls `end_turn`.

use super::mutators::Transaction;
use super::placement::Placement;
use super::selectors;
use super::turn;
use crate::cards::{CardId, CardType, Coupon, OrderId, StructureId, VineId};
use crate::core::{
    Action, ActionError, ActivityEvent, BuySellMode, CurrentTurn, FieldId, GrapeSpec,
    PendingAction, PlayerId, Season, WineIngredients, WineSpec, WorkerKind,
};
use crate::prompts::{Choice, ChoiceId, Prompt};
use crate::visitors::{PlayVisitor, VisitorProgress};

/// Resolve an action that is not part of a visitor card.
pub(crate) fn resolve(tx: &mut Transaction, action: &Action) -> Result<(), ActionError> {
    let unexpected = || ActionError::Rejected(format!("{} is not expected now", action.kind_name()));

    match action {
        Action::ChooseAction { player_id, choice } => match tx.current_turn.clone() {
            CurrentTurn::PapaSetUp { .. } => turn::choose_papa(tx, player_id, *choice),
            CurrentTurn::WakeUpOrder { .. } => match *choice {
                ChoiceId::WakeUp(slot) => turn::choose_wake_up_index(tx, player_id, usize::from(slot)),
                other => turn::wake_up_draw(tx, player_id, other),
            },
            CurrentTurn::FallVisitor { .. } => turn::fall_draw(tx, player_id, *choice),
            CurrentTurn::WorkerPlacement(_) => match tx.pending_action().cloned() {
                Some(PendingAction::BuySell { bonus, mode: None }) => choose_buy_sell(tx, player_id, *choice, bonus),
                Some(PendingAction::Yoke) => choose_yoke(tx, player_id, *choice),
                _ => Err(unexpected()),
            },
        },
        Action::ChooseActionMulti { player_id, choices } => match tx.pending_action().cloned() {
            Some(PendingAction::BuySell {
                bonus,
                mode: Some(BuySellMode::SellGrapes),
            }) => sell_grapes(tx, player_id, choices, bonus),
            _ => Err(unexpected()),
        },
        Action::ChooseField { player_id, fields } => match tx.pending_action().cloned() {
            Some(PendingAction::BuySell {
                bonus,
                mode: Some(mode @ (BuySellMode::BuyField | BuySellMode::SellField)),
            }) => buy_sell_field(tx, player_id, single(fields)?, mode, bonus),
            Some(PendingAction::Plant {
                vine: Some(vine),
                plants_left,
            }) => plant_chosen_vine(tx, player_id, vine, single(fields)?, plants_left),
            Some(PendingAction::Harvest) => harvest_fields(tx, player_id, fields),
            Some(PendingAction::Yoke) => harvest_fields(tx, player_id, fields),
            _ => Err(unexpected()),
        },
        Action::ChooseVine { player_id, vine } => match tx.pending_action().cloned() {
            Some(PendingAction::Plant {
                vine: None,
                plants_left,
            }) => choose_vine_to_plant(tx, player_id, *vine, plants_left),
            Some(PendingAction::Yoke) => {
                let vine = vine.ok_or(ActionError::SelectionSize { count: 0, min: 1, max: 1 })?;
                uproot_to_hand(tx, player_id, vine)?;
                turn::end_turn(tx);
                Ok(())
            }
            _ => Err(unexpected()),
        },
        Action::ChooseCards { player_id, .. } => match tx.pending_action().cloned() {
            Some(PendingAction::FillOrder { order: None, bonus }) => match action.selected_cards() {
                [CardId::Order(order)] => choose_order(tx, player_id, *order, bonus),
                _ => Err(ActionError::NotOffered("an order card".into())),
            },
            _ => Err(unexpected()),
        },
        Action::ChooseWine { player_id, wines } => match tx.pending_action().cloned() {
            Some(PendingAction::FillOrder {
                order: Some(order),
                bonus,
            }) => fill_order(tx, player_id, order, wines, bonus),
            _ => Err(unexpected()),
        },
        Action::MakeWine {
            player_id,
            ingredients,
        } => match tx.pending_action() {
            Some(PendingAction::MakeWine) => {
                tx.make_wines(player_id, ingredients)?;
                turn::end_turn(tx);
                Ok(())
            }
            _ => Err(unexpected()),
        },
        Action::BuildStructure {
            player_id,
            structure_id,
        } => match tx.pending_action().cloned() {
            Some(PendingAction::Build { discount }) => {
                if let Some(structure_id) = structure_id {
                    let coupon = (discount > 0).then_some(Coupon::Discount { amount: discount });
                    tx.build_structure(player_id, *structure_id, coupon)?;
                }
                turn::end_turn(tx);
                Ok(())
            }
            _ => Err(unexpected()),
        },
        Action::PlaceWorker {
            player_id,
            placement,
            worker,
        } => place_worker(tx, player_id, *placement, *worker),
        Action::Pass { player_id } => {
            turn::pass(tx, player_id);
            Ok(())
        }
        Action::StartGame { .. } => Err(unexpected()),
    }
}

fn single<T: Copy>(items: &[T]) -> Result<T, ActionError> {
    match items {
        [item] => Ok(*item),
        _ => Err(ActionError::SelectionSize {
            count: items.len(),
            min: 1,
            max: 1,
        }),
    }
}

// === Placing workers ===

/// Put a worker on a board space and start what it does.
pub(crate) fn place_worker(
    tx: &mut Transaction,
    player: &PlayerId,
    placement: Placement,
    worker: WorkerKind,
) -> Result<(), ActionError> {
    let Some(season) = tx.worker_placement_turn().map(|t| t.season) else {
        panic!("Worker placed during {}", tx.current_turn.name());
    };
    if !placement.usable_in(season) {
        return Err(ActionError::PlacementUnavailable(placement, format!("not a {season:?} space")));
    }

    let occupancy = if placement == Placement::Yoke {
        tx.worker_placements
            .get(&placement)
            .map_or(0, |workers| workers.iter().filter(|p| *p == player).count())
    } else {
        tx.occupancy(placement)
    };
    if let Some(capacity) = placement.capacity(tx.player_count()) {
        if occupancy >= capacity && worker != WorkerKind::Grande {
            return Err(ActionError::PlacementUnavailable(placement, "space is full".into()));
        }
    }
    let bonus = placement.grants_bonus(tx.player_count(), occupancy);
    if let Some(reason) = selectors::placement_reason(tx, player, placement, bonus) {
        return Err(ActionError::PlacementUnavailable(placement, reason));
    }

    tx.use_worker(player, worker)?;
    let mut workers = tx.worker_placements.get(&placement).cloned().unwrap_or_default();
    workers.push_back(player.clone());
    tx.worker_placements.insert(placement, workers);
    tx.log(ActivityEvent::PlaceWorker {
        player_id: player.clone(),
        placement,
    });

    let draws = if bonus { 2 } else { 1 };
    match placement {
        Placement::DrawVine => {
            tx.draw_cards(player, CardType::Vine, draws);
            turn::end_turn(tx);
        }
        Placement::DrawOrder => {
            tx.draw_cards(player, CardType::Order, draws);
            turn::end_turn(tx);
        }
        Placement::GainCoin => {
            tx.gain_coins(player, 1);
            turn::end_turn(tx);
        }
        Placement::GiveTour => {
            tx.gain_coins(player, if bonus { 3 } else { 2 });
            let p = tx.player(player);
            if p.structure_ready(StructureId::TastingRoom) && !p.cellar.is_empty() {
                tx.use_structure(player, StructureId::TastingRoom);
                tx.gain_victory_points(player, 1);
            }
            turn::end_turn(tx);
        }
        Placement::TrainWorker => {
            let cost = tx.config.train_worker_cost.saturating_sub(u32::from(bonus));
            tx.train_worker(player, cost, false)?;
            turn::end_turn(tx);
        }
        Placement::BuildStructure => {
            let discount = u8::from(bonus);
            tx.set_pending(Some(PendingAction::Build { discount }));
            let coupon = (discount > 0).then_some(Coupon::Discount { amount: discount });
            tx.push_prompt(Prompt::build_structure(player.clone(), coupon, true));
        }
        Placement::BuySell => {
            tx.set_pending(Some(PendingAction::BuySell { bonus, mode: None }));
            let p = tx.player(player);
            let choices = vec![
                Choice::new(ChoiceId::SellGrapes, "Sell grapes")
                    .disabled_if(selectors::buy_sell_reason(p, BuySellMode::SellGrapes)),
                Choice::new(ChoiceId::BuyField, "Buy a field")
                    .disabled_if(selectors::buy_sell_reason(p, BuySellMode::BuyField)),
                Choice::new(ChoiceId::SellField, "Sell a field")
                    .disabled_if(selectors::buy_sell_reason(p, BuySellMode::SellField)),
            ];
            tx.push_prompt(Prompt::choose_action(player.clone(), "Buy or sell", choices, None));
        }
        Placement::PlantVine => {
            let plants_left = if bonus { 2 } else { 1 };
            tx.set_pending(Some(PendingAction::Plant { vine: None, plants_left }));
            prompt_vine_to_plant(tx, player, false);
        }
        Placement::HarvestField => {
            tx.set_pending(Some(PendingAction::Harvest));
            let fields = selectors::harvestable_fields(tx.player(player));
            let max = if bonus { 2 } else { 1 };
            tx.push_prompt(Prompt::choose_field(player.clone(), "Harvest", fields, (1, max)));
        }
        Placement::MakeWine => {
            tx.set_pending(Some(PendingAction::MakeWine));
            tx.push_prompt(Prompt::make_wine(player.clone(), if bonus { 3 } else { 2 }));
        }
        Placement::FillOrder => {
            tx.set_pending(Some(PendingAction::FillOrder { order: None, bonus }));
            let orders = selectors::fillable_orders(tx.player(player))
                .into_iter()
                .map(CardId::Order)
                .collect();
            tx.push_prompt(Prompt::choose_cards(player.clone(), "Fill an order", orders, (1, 1)));
        }
        Placement::PlaySummerVisitor | Placement::PlayWinterVisitor => {
            let visitor_season = if placement == Placement::PlaySummerVisitor {
                Season::Summer
            } else {
                Season::Winter
            };
            tx.set_pending(Some(PendingAction::PlayVisitor(PlayVisitor {
                season: visitor_season,
                visitor: None,
                progress: VisitorProgress::Idle,
                plays_left: u8::from(bonus),
            })));
            crate::visitors::prompt_visitor_choice(tx, player, visitor_season, false);
        }
        Placement::Yoke => {
            tx.use_structure(player, StructureId::Yoke);
            tx.set_pending(Some(PendingAction::Yoke));
            let p = tx.player(player);
            let choices = vec![
                Choice::new(ChoiceId::YokeHarvest, "Harvest 1 field").disabled_if(selectors::harvest_reason(p)),
                Choice::new(ChoiceId::YokeUproot, "Uproot 1 vine").disabled_if(selectors::uproot_reason(p)),
            ];
            tx.push_prompt(Prompt::choose_action(player.clone(), "Use the yoke", choices, None));
        }
    }
    Ok(())
}

// === Buy / sell ===

fn choose_buy_sell(tx: &mut Transaction, player: &PlayerId, choice: ChoiceId, bonus: bool) -> Result<(), ActionError> {
    let p = tx.player(player);
    let prompt = match choice {
        ChoiceId::SellGrapes => {
            let choices = p
                .crush_pad
                .grapes()
                .into_iter()
                .map(|g| Choice::new(ChoiceId::Grape(g), grape_label(g)))
                .collect::<Vec<_>>();
            let max = choices.len();
            Prompt::choose_multi(player.clone(), "Sell grapes", choices, (1, max), None)
        }
        ChoiceId::BuyField => {
            let fields = p
                .fields
                .iter()
                .filter(|f| f.sold && p.coins >= u32::from(f.value))
                .map(|f| f.id)
                .collect();
            Prompt::choose_field(player.clone(), "Buy a field", fields, (1, 1))
        }
        ChoiceId::SellField => {
            let fields = p
                .fields
                .iter()
                .filter(|f| !f.sold && f.is_empty())
                .map(|f| f.id)
                .collect();
            Prompt::choose_field(player.clone(), "Sell a field", fields, (1, 1))
        }
        other => return Err(ActionError::ChoiceNotOffered(other)),
    };
    let mode = match choice {
        ChoiceId::SellGrapes => BuySellMode::SellGrapes,
        ChoiceId::BuyField => BuySellMode::BuyField,
        _ => BuySellMode::SellField,
    };
    tx.set_pending(Some(PendingAction::BuySell { bonus, mode: Some(mode) }));
    tx.push_prompt(prompt);
    Ok(())
}

pub(crate) fn grape_label(grape: GrapeSpec) -> String {
    format!("{:?} grape ({})", grape.color, grape.value)
}

fn sell_grapes(tx: &mut Transaction, player: &PlayerId, choices: &[ChoiceId], bonus: bool) -> Result<(), ActionError> {
    let grapes = grapes_from_choices(choices)?;
    tx.sell_grapes(player, &grapes)?;
    finish_buy_sell(tx, player, bonus);
    Ok(())
}

/// Grapes named by `Grape` choices.
pub(crate) fn grapes_from_choices(choices: &[ChoiceId]) -> Result<Vec<GrapeSpec>, ActionError> {
    choices
        .iter()
        .map(|c| match c {
            ChoiceId::Grape(g) => Ok(*g),
            other => Err(ActionError::ChoiceNotOffered(*other)),
        })
        .collect()
}

fn buy_sell_field(
    tx: &mut Transaction,
    player: &PlayerId,
    field: FieldId,
    mode: BuySellMode,
    bonus: bool,
) -> Result<(), ActionError> {
    match mode {
        BuySellMode::BuyField => tx.buy_field(player, field)?,
        _ => tx.sell_field(player, field)?,
    }
    finish_buy_sell(tx, player, bonus);
    Ok(())
}

fn finish_buy_sell(tx: &mut Transaction, player: &PlayerId, bonus: bool) {
    if bonus {
        tx.gain_victory_points(player, 1);
    }
    turn::end_turn(tx);
}

// === Planting ===

/// Ask for a vine from hand to plant.
pub(crate) fn prompt_vine_to_plant(tx: &mut Transaction, player: &PlayerId, optional: bool) {
    let vines = selectors::plantable_vines(tx.player(player));
    tx.push_prompt(Prompt::choose_vine(player.clone(), "Plant a vine", vines, optional));
}

/// Ask where a vine goes.
pub(crate) fn prompt_field_for_vine(tx: &mut Transaction, player: &PlayerId, vine: VineId) {
    let fields = selectors::plantable_fields(tx.player(player), vine);
    tx.push_prompt(Prompt::choose_field(player.clone(), format!("Plant {vine}"), fields, (1, 1)));
}

fn choose_vine_to_plant(
    tx: &mut Transaction,
    player: &PlayerId,
    vine: Option<VineId>,
    plants_left: u8,
) -> Result<(), ActionError> {
    let Some(vine) = vine else {
        turn::end_turn(tx);
        return Ok(());
    };
    if selectors::plantable_fields(tx.player(player), vine).is_empty() {
        return Err(ActionError::NotOffered(vine.to_string()));
    }
    tx.take_from_hand(player, CardId::Vine(vine))?;
    tx.set_pending(Some(PendingAction::Plant {
        vine: Some(vine),
        plants_left,
    }));
    prompt_field_for_vine(tx, player, vine);
    Ok(())
}

fn plant_chosen_vine(
    tx: &mut Transaction,
    player: &PlayerId,
    vine: VineId,
    field: FieldId,
    plants_left: u8,
) -> Result<(), ActionError> {
    tx.plant_vine(player, vine, field)?;
    let plants_left = plants_left.saturating_sub(1);
    tx.set_pending(Some(PendingAction::Plant { vine: None, plants_left }));
    if plants_left > 0 && selectors::plant_reason(tx.player(player)).is_none() {
        prompt_vine_to_plant(tx, player, true);
    } else {
        turn::end_turn(tx);
    }
    Ok(())
}

/// Uproot a vine back into its owner's hand.
pub(crate) fn uproot_to_hand(tx: &mut Transaction, player: &PlayerId, vine: VineId) -> Result<(), ActionError> {
    tx.uproot_vine(player, vine)?;
    tx.add_to_hand(player, CardId::Vine(vine));
    Ok(())
}

// === Harvest and yoke ===

fn harvest_fields(tx: &mut Transaction, player: &PlayerId, fields: &[FieldId]) -> Result<(), ActionError> {
    for &field in fields {
        tx.harvest_field(player, field)?;
    }
    turn::end_turn(tx);
    Ok(())
}

fn choose_yoke(tx: &mut Transaction, player: &PlayerId, choice: ChoiceId) -> Result<(), ActionError> {
    let p = tx.player(player);
    let prompt = match choice {
        ChoiceId::YokeHarvest => {
            Prompt::choose_field(player.clone(), "Harvest", selectors::harvestable_fields(p), (1, 1))
        }
        ChoiceId::YokeUproot => Prompt::choose_vine(player.clone(), "Uproot a vine", selectors::planted_vines(p), false),
        other => return Err(ActionError::ChoiceNotOffered(other)),
    };
    tx.push_prompt(prompt);
    Ok(())
}

// === Orders ===

fn choose_order(tx: &mut Transaction, player: &PlayerId, order: OrderId, bonus: bool) -> Result<(), ActionError> {
    if !selectors::fillable_orders(tx.player(player)).contains(&order) {
        return Err(ActionError::NotOffered(order.to_string()));
    }
    tx.set_pending(Some(PendingAction::FillOrder {
        order: Some(order),
        bonus,
    }));
    tx.push_prompt(Prompt::choose_wine(
        player.clone(),
        format!("Fill {order}"),
        order.card().wines.to_vec(),
    ));
    Ok(())
}

fn fill_order(
    tx: &mut Transaction,
    player: &PlayerId,
    order: OrderId,
    wines: &[WineSpec],
    bonus: bool,
) -> Result<(), ActionError> {
    for &wine in wines {
        tx.remove_wine(player, wine)?;
    }
    tx.take_from_hand(player, CardId::Order(order))?;
    tx.discard(CardId::Order(order));
    tx.log(ActivityEvent::Fill {
        player_id: player.clone(),
        order_id: order,
        wines: wines.to_vec(),
    });

    let card = order.card();
    tx.gain_victory_points(player, i32::from(card.victory_points) + i32::from(bonus));
    tx.gain_residuals(player, card.residual);
    turn::end_turn(tx);
    Ok(())
}

/// Make wine from a visitor or board prompt.
pub(crate) fn make_wines(
    tx: &mut Transaction,
    player: &PlayerId,
    ingredients: &[WineIngredients],
) -> Result<Vec<Option<WineSpec>>, ActionError> {
    tx.make_wines(player, ingredients)
}
