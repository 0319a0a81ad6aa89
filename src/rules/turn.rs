//! Turn sequencing.
//!
//! ## Phases
//!
//! ```text
//! PapaSetUp -> WakeUpOrder -> WorkerPlacement(summer) -> FallVisitor
//!           -> WorkerPlacement(winter) -> year end -> WakeUpOrder ...
//! ```
//!
//! Setup and the wake-up phase go around the table once, starting at the
//! grape token. Worker placement follows the wake-up chart: players take
//! turns in chart order, skipping anyone who passed, until everyone has.
//! Fall goes down the chart once. Year end rotates the grape token one seat
//! back.

use tracing::info;

use super::mutators::Transaction;
use super::selectors;
use crate::cards::{structure, CardId, CardType, Coupon, StructureId, MAX_STRUCTURE_COST};
use crate::core::{
    ActionError, ActivityEvent, CurrentTurn, PendingAction, PlayerId, Season, SeasonName,
    WakeUpPosition, WorkerPlacementTurn, WAKE_UP_SLOTS,
};
use crate::prompts::{Choice, ChoiceId, Prompt};

// === Papa set-up ===

pub(crate) fn prompt_papa(tx: &mut Transaction, player: &PlayerId) {
    let coins = tx.config.papa_coins;
    let papa_structure = tx.config.papa_structure;
    tx.push_prompt(Prompt::choose_action(
        player.clone(),
        "Choose your starting bonus",
        vec![
            Choice::new(ChoiceId::PapaCoins, format!("Gain {coins} coins")),
            Choice::new(ChoiceId::PapaStructure, format!("Build a free {}", structure(papa_structure).name)),
        ],
        None,
    ));
}

pub(crate) fn choose_papa(tx: &mut Transaction, player: &PlayerId, choice: ChoiceId) -> Result<(), ActionError> {
    match choice {
        ChoiceId::PapaCoins => {
            let coins = tx.config.papa_coins;
            tx.gain_coins(player, coins);
        }
        ChoiceId::PapaStructure => {
            let papa_structure = tx.config.papa_structure;
            tx.build_structure(player, papa_structure, Some(Coupon::Voucher { up_to: MAX_STRUCTURE_COST }))?;
        }
        other => return Err(ActionError::ChoiceNotOffered(other)),
    }

    let next = next_seat(tx, player);
    if next == tx.grape_index {
        let first = tx.table_order[tx.grape_index].clone();
        begin_wake_up(tx, first);
    } else {
        let next_player = tx.table_order[next].clone();
        tx.current_turn = CurrentTurn::PapaSetUp {
            player_id: next_player.clone(),
        };
        prompt_papa(tx, &next_player);
    }
    Ok(())
}

fn next_seat(tx: &Transaction, player: &PlayerId) -> usize {
    let seat = match tx.seat_of(player) {
        Some(seat) => seat,
        None => panic!("{player} has no seat"),
    };
    (seat + 1) % tx.player_count()
}

// === Wake-up order ===

fn begin_wake_up(tx: &mut Transaction, player: PlayerId) {
    let year = tx.year;
    tx.log(ActivityEvent::Season {
        season: SeasonName::Spring,
        year,
    });
    tx.current_turn = CurrentTurn::WakeUpOrder {
        player_id: player.clone(),
    };
    prompt_wake_up(tx, &player);
}

/// Label of a wake-up row's bonus.
#[must_use]
pub fn wake_up_label(slot: usize) -> &'static str {
    match slot {
        0 => "No bonus",
        1 => "Draw 1 vine",
        2 => "Draw 1 order",
        3 => "Gain 1 coin",
        4 => "Draw 1 visitor",
        5 => "Gain 1 VP",
        _ => "Gain a temporary worker",
    }
}

/// Choices for every wake-up row. Rows taken by someone else are disabled.
pub(crate) fn wake_up_choices(tx: &Transaction, player: &PlayerId) -> Vec<Choice> {
    (0..WAKE_UP_SLOTS)
        .map(|slot| {
            let reason = match &tx.wake_up_order[slot] {
                Some(pos) if &pos.player_id == player => Some("Your current position".to_string()),
                Some(pos) => Some(format!("Taken by {}", pos.player_id)),
                None => None,
            };
            Choice::new(ChoiceId::WakeUp(slot as u8), wake_up_label(slot)).disabled_if(reason)
        })
        .collect()
}

pub(crate) fn prompt_wake_up(tx: &mut Transaction, player: &PlayerId) {
    let choices = wake_up_choices(tx, player);
    tx.push_prompt(Prompt::choose_action(player.clone(), "Choose a wake-up position", choices, None));
}

/// Take the bonus of a wake-up row. Returns true when the bonus needs a
/// follow-up choice (the visitor draw), which has been prompted.
pub(crate) fn grant_wake_up_bonus(tx: &mut Transaction, player: &PlayerId, slot: usize) -> bool {
    match slot {
        1 => {
            tx.draw_cards(player, CardType::Vine, 1);
        }
        2 => {
            tx.draw_cards(player, CardType::Order, 1);
        }
        3 => tx.gain_coins(player, 1),
        4 => {
            let choices = visitor_draw_choices(tx, ChoiceId::WakeUpDrawSummer, ChoiceId::WakeUpDrawWinter);
            if choices.iter().any(Choice::is_enabled) {
                tx.push_prompt(Prompt::choose_action(player.clone(), "Draw a visitor", choices, None));
                return true;
            }
        }
        5 => tx.gain_victory_points(player, 1),
        6 => tx.add_temp_worker(player),
        _ => {}
    }
    false
}

fn visitor_draw_choices(tx: &Transaction, summer: ChoiceId, winter: ChoiceId) -> Vec<Choice> {
    vec![
        Choice::new(summer, "Summer visitor").disabled_if(selectors::draw_reason(tx, CardType::SummerVisitor)),
        Choice::new(winter, "Winter visitor").disabled_if(selectors::draw_reason(tx, CardType::WinterVisitor)),
    ]
}

/// Visitor pile named by a draw choice.
pub(crate) fn visitor_draw_type(choice: ChoiceId) -> Option<CardType> {
    match choice {
        ChoiceId::WakeUpDrawSummer | ChoiceId::FallDrawSummer => Some(CardType::SummerVisitor),
        ChoiceId::WakeUpDrawWinter | ChoiceId::FallDrawWinter => Some(CardType::WinterVisitor),
        _ => None,
    }
}

/// Claim a wake-up row during the wake-up phase.
pub(crate) fn choose_wake_up_index(tx: &mut Transaction, player: &PlayerId, slot: usize) -> Result<(), ActionError> {
    if slot >= WAKE_UP_SLOTS || tx.wake_up_order[slot].is_some() || tx.wake_up_slot_of(player).is_some() {
        return Err(ActionError::ChoiceNotOffered(ChoiceId::WakeUp(slot as u8)));
    }
    tx.wake_up_order[slot] = Some(WakeUpPosition {
        player_id: player.clone(),
        passed: false,
    });
    tx.log(ActivityEvent::WakeUp {
        player_id: player.clone(),
        slot,
    });

    if !grant_wake_up_bonus(tx, player, slot) {
        advance_wake_up(tx, player);
    }
    Ok(())
}

/// Resolve the visitor draw of wake-up row 4.
pub(crate) fn wake_up_draw(tx: &mut Transaction, player: &PlayerId, choice: ChoiceId) -> Result<(), ActionError> {
    let card_type = visitor_draw_type(choice).ok_or(ActionError::ChoiceNotOffered(choice))?;
    tx.draw_cards(player, card_type, 1);
    advance_wake_up(tx, player);
    Ok(())
}

fn advance_wake_up(tx: &mut Transaction, player: &PlayerId) {
    let next = next_seat(tx, player);
    if next == tx.grape_index {
        let first = tx
            .wake_up_entries()
            .next()
            .map(|(_, pos)| pos.player_id.clone());
        match first {
            Some(first) => {
                let year = tx.year;
                tx.log(ActivityEvent::Season {
                    season: SeasonName::Summer,
                    year,
                });
                start_worker_placement_turn(tx, Season::Summer, first);
            }
            None => panic!("Wake-up order is empty after every player chose"),
        }
    } else {
        let next_player = tx.table_order[next].clone();
        tx.current_turn = CurrentTurn::WakeUpOrder {
            player_id: next_player.clone(),
        };
        prompt_wake_up(tx, &next_player);
    }
}

// === Worker placement ===

/// Give `player` a worker placement turn. A player without available
/// workers passes at once.
pub(crate) fn start_worker_placement_turn(tx: &mut Transaction, season: Season, player: PlayerId) {
    tx.current_turn = CurrentTurn::WorkerPlacement(WorkerPlacementTurn {
        player_id: player.clone(),
        season,
        pending_action: None,
    });
    if tx.player(&player).available_workers() == 0 {
        mark_passed(tx, &player);
        end_worker_placement_turn(tx);
        return;
    }
    tx.push_prompt(Prompt::place_worker(player, season));
}

fn mark_passed(tx: &mut Transaction, player: &PlayerId) {
    let slot = match tx.wake_up_slot_of(player) {
        Some(slot) => slot,
        None => panic!("{player} is not on the wake-up chart"),
    };
    if let Some(pos) = tx.wake_up_order[slot].as_mut() {
        pos.passed = true;
    }
    tx.log(ActivityEvent::Pass {
        player_id: player.clone(),
    });
}

/// Pass for the rest of the season.
///
/// # Panics
///
/// Panics outside worker placement.
pub(crate) fn pass(tx: &mut Transaction, player: &PlayerId) {
    if tx.worker_placement_turn().is_none() {
        panic!("Pass during {}", tx.current_turn.name());
    }
    mark_passed(tx, player);
    end_turn(tx);
}

/// Finish the current turn: return any card in limbo to its discard pile,
/// drop outstanding prompts and hand the turn on.
///
/// # Panics
///
/// Panics during setup phases, which never end through here.
pub(crate) fn end_turn(tx: &mut Transaction) {
    match &tx.current_turn {
        CurrentTurn::WorkerPlacement(turn) => {
            let limbo = limbo_cards(turn.pending_action.as_ref());
            for card in limbo {
                tx.discard(card);
            }
            tx.prompts.clear();
            end_worker_placement_turn(tx);
        }
        CurrentTurn::FallVisitor { player_id } => {
            let player = player_id.clone();
            tx.prompts.clear();
            end_fall_visitor_turn(tx, &player);
        }
        other => panic!("end_turn called during {}", other.name()),
    }
}

/// Cards taken out of a hand by a pending action and not yet placed.
fn limbo_cards(pending: Option<&PendingAction>) -> Vec<CardId> {
    match pending {
        Some(PendingAction::PlayVisitor(play)) => play
            .visitor
            .map(CardId::Visitor)
            .into_iter()
            .chain(play.progress.limbo_vines().into_iter().map(CardId::Vine))
            .collect(),
        Some(PendingAction::Plant { vine: Some(vine), .. }) => vec![CardId::Vine(*vine)],
        _ => Vec::new(),
    }
}

fn end_worker_placement_turn(tx: &mut Transaction) {
    let Some(turn) = tx.worker_placement_turn() else {
        panic!("Not in worker placement");
    };
    let season = turn.season;
    let current = turn.player_id.clone();

    let entries: Vec<WakeUpPosition> = tx.wake_up_entries().map(|(_, pos)| pos.clone()).collect();
    if entries.iter().all(|pos| pos.passed) {
        match season {
            Season::Summer => begin_fall(tx),
            Season::Winter => end_year(tx),
        }
        return;
    }

    let start = entries
        .iter()
        .position(|pos| pos.player_id == current)
        .map_or(0, |i| i + 1);
    let next = (0..entries.len())
        .map(|k| &entries[(start + k) % entries.len()])
        .find(|pos| !pos.passed)
        .map(|pos| pos.player_id.clone());
    match next {
        Some(next) => start_worker_placement_turn(tx, season, next),
        None => panic!("No active player although not everyone passed"),
    }
}

// === Fall ===

fn begin_fall(tx: &mut Transaction) {
    for pos in tx.wake_up_order.iter_mut().flatten() {
        pos.passed = false;
    }
    let year = tx.year;
    tx.log(ActivityEvent::Season {
        season: SeasonName::Fall,
        year,
    });
    info!(year, "fall");

    let Some(first) = tx.wake_up_entries().next().map(|(_, pos)| pos.player_id.clone()) else {
        panic!("Wake-up order is empty at fall");
    };
    start_fall_visitor_turn(tx, first);
}

fn start_fall_visitor_turn(tx: &mut Transaction, player: PlayerId) {
    tx.current_turn = CurrentTurn::FallVisitor {
        player_id: player.clone(),
    };
    prompt_fall_visitor(tx, &player);
}

fn prompt_fall_visitor(tx: &mut Transaction, player: &PlayerId) {
    let choices = visitor_draw_choices(tx, ChoiceId::FallDrawSummer, ChoiceId::FallDrawWinter);
    if choices.iter().any(Choice::is_enabled) {
        tx.push_prompt(Prompt::choose_action(player.clone(), "Draw a visitor", choices, None));
    } else {
        end_turn(tx);
    }
}

/// Draw the fall visitor. A built, unused cottage allows a second draw.
pub(crate) fn fall_draw(tx: &mut Transaction, player: &PlayerId, choice: ChoiceId) -> Result<(), ActionError> {
    let card_type = visitor_draw_type(choice).ok_or(ActionError::ChoiceNotOffered(choice))?;
    tx.draw_cards(player, card_type, 1);

    if tx.player(player).structure_ready(StructureId::Cottage) {
        tx.use_structure(player, StructureId::Cottage);
        prompt_fall_visitor(tx, player);
    } else {
        end_turn(tx);
    }
    Ok(())
}

fn end_fall_visitor_turn(tx: &mut Transaction, player: &PlayerId) {
    let order: Vec<PlayerId> = tx.wake_up_entries().map(|(_, pos)| pos.player_id.clone()).collect();
    let index = order.iter().position(|p| p == player);
    match index.and_then(|i| order.get(i + 1)) {
        Some(next) => start_fall_visitor_turn(tx, next.clone()),
        None => {
            let year = tx.year;
            tx.log(ActivityEvent::Season {
                season: SeasonName::Winter,
                year,
            });
            start_worker_placement_turn(tx, Season::Winter, order[0].clone());
        }
    }
}

// === Year end ===

fn end_year(tx: &mut Transaction) {
    let n = tx.player_count();
    tx.grape_index = (tx.grape_index + n - 1) % n;
    tx.wake_up_order = Default::default();
    tx.worker_placements = im::OrdMap::new();

    let order: Vec<PlayerId> = tx.table_order.iter().cloned().collect();
    for player in &order {
        tx.end_year_for(player);
    }

    tx.year += 1;
    info!(year = tx.year, "new year");
    let first = tx.table_order[tx.grape_index].clone();
    begin_wake_up(tx, first);
}
