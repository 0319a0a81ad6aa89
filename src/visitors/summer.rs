//! Summer visitors.

use rustc_hash::FxHashSet;

use super::{
    actor, end_visitor, offer, option, owner, picked, plant_into, planting_step, prompt_grape,
    prompt_plant, roster_answer, set_progress, take_vine, unexpected, VisitorChoice, VisitorEffect,
    VisitorProgress,
};
use crate::cards::{CardId, CardType, Coupon, VisitorId, WineRequirement, MAX_STRUCTURE_COST};
use crate::core::{Action, ActionError, ActivityEvent, GameState, GrapeSpec, PlayerId, WakeUpPosition, WAKE_UP_SLOTS};
use crate::prompts::{Choice, ChoiceId, Prompt};
use crate::rules::mutators::Transaction;
use crate::rules::{board, selectors, turn};

/// Gain 4 coins or harvest 1 field.
pub struct TourGuide;

impl VisitorEffect for TourGuide {
    fn id(&self) -> VisitorId {
        VisitorId::TourGuide
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(VisitorChoice::TourGain4, "Gain 4 coins", None),
            option(VisitorChoice::TourHarvest, "Harvest 1 field", selectors::harvest_reason(p)),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (picked(action), action) {
            (Some(VisitorChoice::TourGain4), _) => tx.gain_coins(&player, 4),
            (Some(VisitorChoice::TourHarvest), _) => {
                let fields = selectors::harvestable_fields(tx.player(&player));
                tx.push_prompt(Prompt::choose_field(player, "Harvest", fields, (1, 1)));
                return Ok(());
            }
            (None, Action::ChooseField { fields, .. }) => {
                for &field in fields {
                    tx.harvest_field(&player, field)?;
                }
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Gain 5 coins. Each opponent may lose 1 VP to gain 3 coins.
pub struct Banker;

impl VisitorEffect for Banker {
    fn id(&self) -> VisitorId {
        VisitorId::Banker
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        tx.gain_coins(player, 5);
        let waiting = tx.opponents_of(player);
        if waiting.is_empty() {
            end_visitor(tx);
            return Ok(());
        }
        for opponent in &waiting {
            let choices = vec![
                option(VisitorChoice::BankerGain, "Lose 1 VP to gain 3 coins", None),
                option(VisitorChoice::BankerPass, "Pass", None),
            ];
            offer(tx, opponent, self.id(), choices);
        }
        set_progress(tx, VisitorProgress::Roster { waiting, accepted: 0 });
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let VisitorProgress::Roster { waiting, accepted } = progress else {
            return Err(unexpected(action));
        };
        let took_it = match picked(action) {
            Some(VisitorChoice::BankerGain) => true,
            Some(VisitorChoice::BankerPass) => false,
            _ => return Err(unexpected(action)),
        };
        if took_it {
            tx.gain_victory_points(&player, -1);
            tx.gain_coins(&player, 3);
        }
        if roster_answer(tx, &player, waiting, accepted, took_it)?.is_some() {
            end_visitor(tx);
        }
        Ok(())
    }
}

/// Pay 2 to place a value-1 grape, or discard a grape for 2 coins and 1 VP.
pub struct Buyer;

impl Buyer {
    fn place_reason(state: &GameState, player: &PlayerId, grape: GrapeSpec) -> Option<String> {
        let p = state.player(player);
        selectors::coins_reason(p, 2).or_else(|| {
            p.crush_pad
                .contains(grape)
                .then(|| format!("Already holds a {:?} grape of value 1", grape.color))
        })
    }
}

impl VisitorEffect for Buyer {
    fn id(&self) -> VisitorId {
        VisitorId::Buyer
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        vec![
            option(
                VisitorChoice::BuyerPlaceRed,
                "Pay 2 to place a red grape of value 1",
                Self::place_reason(state, player, GrapeSpec::red(1)),
            ),
            option(
                VisitorChoice::BuyerPlaceWhite,
                "Pay 2 to place a white grape of value 1",
                Self::place_reason(state, player, GrapeSpec::white(1)),
            ),
            option(
                VisitorChoice::BuyerDiscard,
                "Discard 1 grape to gain 2 coins and 1 VP",
                selectors::grapes_reason(state.player(player)),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (picked(action), action) {
            (Some(choice @ (VisitorChoice::BuyerPlaceRed | VisitorChoice::BuyerPlaceWhite)), _) => {
                let grape = if choice == VisitorChoice::BuyerPlaceRed {
                    GrapeSpec::red(1)
                } else {
                    GrapeSpec::white(1)
                };
                tx.pay_coins(&player, 2)?;
                tx.place_grape(&player, grape);
            }
            (Some(VisitorChoice::BuyerDiscard), _) => {
                prompt_grape(tx, &player, self.id(), "Discard a grape");
                return Ok(());
            }
            (None, Action::ChooseActionMulti { choices, .. }) => {
                for grape in board::grapes_from_choices(choices)? {
                    tx.remove_grape(&player, grape)?;
                }
                tx.gain_coins(&player, 2);
                tx.gain_victory_points(&player, 1);
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Draw 1 vine and plant up to 1 vine, or switch 2 vines between fields.
pub struct Landscaper;

impl VisitorEffect for Landscaper {
    fn id(&self) -> VisitorId {
        VisitorId::Landscaper
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        let draw_plant = selectors::plant_reason(p).and(selectors::draw_reason(state, CardType::Vine));
        let switch = selectors::swappable_pairs(p)
            .is_empty()
            .then(|| "No two vines can trade places".to_string());
        vec![
            option(VisitorChoice::LandscaperDrawPlant, "Draw 1 vine and plant up to 1 vine", draw_plant),
            option(VisitorChoice::LandscaperSwitch, "Switch 2 vines on your fields", switch),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match progress {
            VisitorProgress::Idle => match picked(action) {
                Some(VisitorChoice::LandscaperDrawPlant) => {
                    tx.draw_cards(&player, CardType::Vine, 1);
                    if selectors::plant_reason(tx.player(&player)).is_some() {
                        end_visitor(tx);
                    } else {
                        set_progress(tx, VisitorProgress::Planting { vine: None, left: 1 });
                        prompt_plant(tx, &player, true);
                    }
                }
                Some(VisitorChoice::LandscaperSwitch) => {
                    let mut vines = Vec::new();
                    for (a, b) in selectors::swappable_pairs(tx.player(&player)) {
                        for vine in [a, b] {
                            if !vines.contains(&vine) {
                                vines.push(vine);
                            }
                        }
                    }
                    set_progress(tx, VisitorProgress::Switching { first: None });
                    tx.push_prompt(Prompt::choose_vine(player, "Switch a vine", vines, false));
                }
                _ => return Err(unexpected(action)),
            },
            VisitorProgress::Planting { vine, left } => {
                if planting_step(tx, &player, action, vine, left)? {
                    end_visitor(tx);
                }
            }
            VisitorProgress::Switching { first: None } => {
                let Action::ChooseVine { vine: Some(first), .. } = action else {
                    return Err(unexpected(action));
                };
                let partners = selectors::swap_partners(tx.player(&player), *first);
                if partners.is_empty() {
                    return Err(ActionError::NotOffered(first.to_string()));
                }
                set_progress(tx, VisitorProgress::Switching { first: Some(*first) });
                tx.push_prompt(Prompt::choose_vine(player, format!("Switch {first} with"), partners, false));
            }
            VisitorProgress::Switching { first: Some(first) } => {
                let Action::ChooseVine { vine: Some(second), .. } = action else {
                    return Err(unexpected(action));
                };
                tx.swap_vines(&player, first, *second)?;
                end_visitor(tx);
            }
            _ => return Err(unexpected(action)),
        }
        Ok(())
    }
}

/// Move to an empty wake-up row, take its bonus, then pass.
pub struct Organizer;

impl VisitorEffect for Organizer {
    fn id(&self) -> VisitorId {
        VisitorId::Organizer
    }

    fn unplayable_reason(&self, state: &GameState, _player: &PlayerId) -> Option<String> {
        state
            .wake_up_order
            .iter()
            .all(Option::is_some)
            .then(|| "No empty row on the wake-up chart".to_string())
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        let choices = (0..WAKE_UP_SLOTS)
            .filter(|&slot| tx.wake_up_order[slot].is_none())
            .map(|slot| Choice::new(ChoiceId::WakeUp(slot as u8), turn::wake_up_label(slot)))
            .collect();
        offer(tx, player, self.id(), choices);
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let Action::ChooseAction { choice, .. } = action else {
            return Err(unexpected(action));
        };
        match *choice {
            ChoiceId::WakeUp(slot) => {
                let slot = usize::from(slot);
                if slot >= WAKE_UP_SLOTS || tx.wake_up_order[slot].is_some() {
                    return Err(ActionError::ChoiceNotOffered(*choice));
                }
                if let Some(old) = tx.wake_up_slot_of(&player) {
                    tx.wake_up_order[old] = None;
                }
                tx.wake_up_order[slot] = Some(WakeUpPosition {
                    player_id: player.clone(),
                    passed: false,
                });
                tx.log(ActivityEvent::WakeUp {
                    player_id: player.clone(),
                    slot,
                });
                if turn::grant_wake_up_bonus(tx, &player, slot) {
                    return Ok(());
                }
            }
            other => {
                let card_type = turn::visitor_draw_type(other).ok_or(ActionError::ChoiceNotOffered(other))?;
                tx.draw_cards(&player, card_type, 1);
            }
        }
        turn::pass(tx, &player);
        Ok(())
    }
}

/// Gain 4 coins or draw 1 order and 1 winter visitor.
pub struct Patron;

impl VisitorEffect for Patron {
    fn id(&self) -> VisitorId {
        VisitorId::Patron
    }

    fn choices(&self, state: &GameState, _player: &PlayerId) -> Vec<Choice> {
        let draw = selectors::draw_reason(state, CardType::Order)
            .and(selectors::draw_reason(state, CardType::WinterVisitor));
        vec![
            option(VisitorChoice::PatronGain, "Gain 4 coins", None),
            option(VisitorChoice::PatronDraw, "Draw 1 order card and 1 winter visitor card", draw),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match picked(action) {
            Some(VisitorChoice::PatronGain) => tx.gain_coins(&player, 4),
            Some(VisitorChoice::PatronDraw) => {
                tx.draw_cards(&player, CardType::Order, 1);
                tx.draw_cards(&player, CardType::WinterVisitor, 1);
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Draw 2 vines or gain 3 coins; lose 1 VP to do both.
pub struct Sponsor;

impl VisitorEffect for Sponsor {
    fn id(&self) -> VisitorId {
        VisitorId::Sponsor
    }

    fn choices(&self, state: &GameState, _player: &PlayerId) -> Vec<Choice> {
        vec![
            option(
                VisitorChoice::SponsorDraw,
                "Draw 2 vine cards",
                selectors::draw_reason(state, CardType::Vine),
            ),
            option(VisitorChoice::SponsorGain, "Gain 3 coins", None),
            option(VisitorChoice::SponsorBoth, "Lose 1 VP to draw 2 vines and gain 3 coins", None),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let (draw, gain) = match picked(action) {
            Some(VisitorChoice::SponsorDraw) => (true, false),
            Some(VisitorChoice::SponsorGain) => (false, true),
            Some(VisitorChoice::SponsorBoth) => {
                tx.gain_victory_points(&player, -1);
                (true, true)
            }
            _ => return Err(unexpected(action)),
        };
        if draw {
            tx.draw_cards(&player, CardType::Vine, 2);
        }
        if gain {
            tx.gain_coins(&player, 3);
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Lose 1 VP to build a structure costing up to 3, or 2 VP to build any.
pub struct UncertifiedArchitect;

const ARCHITECT_CHEAP: Coupon = Coupon::Voucher { up_to: 3 };
const ARCHITECT_ANY: Coupon = Coupon::Voucher {
    up_to: MAX_STRUCTURE_COST,
};

impl VisitorEffect for UncertifiedArchitect {
    fn id(&self) -> VisitorId {
        VisitorId::UncertifiedArchitect
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(
                VisitorChoice::ArchitectLoseOne,
                "Lose 1 VP to build a structure costing up to 3",
                selectors::build_reason(p, Some(ARCHITECT_CHEAP)),
            ),
            option(
                VisitorChoice::ArchitectLoseTwo,
                "Lose 2 VP to build any structure",
                selectors::build_reason(p, Some(ARCHITECT_ANY)),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (progress, action) {
            (VisitorProgress::Idle, _) => {
                let (loss, coupon) = match picked(action) {
                    Some(VisitorChoice::ArchitectLoseOne) => (1, ARCHITECT_CHEAP),
                    Some(VisitorChoice::ArchitectLoseTwo) => (2, ARCHITECT_ANY),
                    _ => return Err(unexpected(action)),
                };
                tx.gain_victory_points(&player, -loss);
                set_progress(tx, VisitorProgress::Building { coupon: Some(coupon) });
                tx.push_prompt(Prompt::build_structure(player, Some(coupon), false));
            }
            (
                VisitorProgress::Building { coupon },
                Action::BuildStructure {
                    structure_id: Some(structure_id),
                    ..
                },
            ) => {
                tx.build_structure(&player, *structure_id, coupon)?;
                end_visitor(tx);
            }
            _ => return Err(unexpected(action)),
        }
        Ok(())
    }
}

/// Lose 3 VP to gain 9 coins, or pay 6 to gain 2 VP.
pub struct UncertifiedBroker;

impl VisitorEffect for UncertifiedBroker {
    fn id(&self) -> VisitorId {
        VisitorId::UncertifiedBroker
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        vec![
            option(VisitorChoice::BrokerLoseVp, "Lose 3 VP to gain 9 coins", None),
            option(
                VisitorChoice::BrokerGainVp,
                "Pay 6 coins to gain 2 VP",
                selectors::coins_reason(state.player(player), 6),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match picked(action) {
            Some(VisitorChoice::BrokerLoseVp) => {
                tx.gain_victory_points(&player, -3);
                tx.gain_coins(&player, 9);
            }
            Some(VisitorChoice::BrokerGainVp) => {
                tx.pay_coins(&player, 6)?;
                tx.gain_victory_points(&player, 2);
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Choose 2 of: gain 1 VP, build a structure, plant a vine. Resolved in
/// that order.
pub struct Contractor;

const CONTRACTOR_ORDER: [VisitorChoice; 3] = [
    VisitorChoice::ContractorVp,
    VisitorChoice::ContractorBuild,
    VisitorChoice::ContractorPlant,
];

impl Contractor {
    fn next_step(tx: &mut Transaction, player: &PlayerId, mut steps: Vec<VisitorChoice>) {
        while !steps.is_empty() {
            let step = steps.remove(0);
            match step {
                VisitorChoice::ContractorVp => tx.gain_victory_points(player, 1),
                VisitorChoice::ContractorBuild => {
                    set_progress(tx, VisitorProgress::Contractor { steps, vine: None });
                    tx.push_prompt(Prompt::build_structure(player.clone(), None, false));
                    return;
                }
                _ => {
                    set_progress(tx, VisitorProgress::Contractor { steps, vine: None });
                    prompt_plant(tx, player, false);
                    return;
                }
            }
        }
        set_progress(tx, VisitorProgress::Idle);
        end_visitor(tx);
    }
}

impl VisitorEffect for Contractor {
    fn id(&self) -> VisitorId {
        VisitorId::Contractor
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(VisitorChoice::ContractorVp, "Gain 1 VP", None),
            option(VisitorChoice::ContractorBuild, "Build 1 structure", selectors::build_reason(p, None)),
            option(VisitorChoice::ContractorPlant, "Plant 1 vine", selectors::plant_reason(p)),
        ]
    }

    fn unplayable_reason(&self, state: &GameState, player: &PlayerId) -> Option<String> {
        let enabled = self.choices(state, player).iter().filter(|c| c.is_enabled()).count();
        (enabled < 2).then(|| "Fewer than 2 options are available".to_string())
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        let choices = self.choices(tx, player);
        tx.push_prompt(Prompt::choose_multi(
            player.clone(),
            "Contractor: choose 2",
            choices,
            (2, 2),
            Some(self.id()),
        ));
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (progress, action) {
            (VisitorProgress::Idle, Action::ChooseActionMulti { choices, .. }) => {
                let steps = CONTRACTOR_ORDER
                    .into_iter()
                    .filter(|step| choices.contains(&ChoiceId::Visitor(*step)))
                    .collect::<Vec<_>>();
                if steps.len() != 2 {
                    return Err(ActionError::SelectionSize {
                        count: steps.len(),
                        min: 2,
                        max: 2,
                    });
                }
                Self::next_step(tx, &player, steps);
            }
            (
                VisitorProgress::Contractor { steps, .. },
                Action::BuildStructure {
                    structure_id: Some(structure_id),
                    ..
                },
            ) => {
                tx.build_structure(&player, *structure_id, None)?;
                Self::next_step(tx, &player, steps);
            }
            (VisitorProgress::Contractor { steps, vine: None }, Action::ChooseVine { vine: Some(vine), .. }) => {
                take_vine(tx, &player, *vine)?;
                set_progress(
                    tx,
                    VisitorProgress::Contractor {
                        steps,
                        vine: Some(*vine),
                    },
                );
            }
            (VisitorProgress::Contractor { steps, vine: Some(vine) }, Action::ChooseField { .. }) => {
                plant_into(tx, &player, vine, action)?;
                Self::next_step(tx, &player, steps);
            }
            _ => return Err(unexpected(action)),
        }
        Ok(())
    }
}

/// Plant up to 2 vines and gain 1 coin, or uproot and discard a vine for
/// 2 VP.
pub struct Planter;

impl VisitorEffect for Planter {
    fn id(&self) -> VisitorId {
        VisitorId::Planter
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(
                VisitorChoice::PlanterPlant,
                "Plant up to 2 vines and gain 1 coin",
                selectors::plant_reason(p),
            ),
            option(
                VisitorChoice::PlanterUproot,
                "Uproot and discard 1 vine to gain 2 VP",
                selectors::uproot_reason(p),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (progress, action) {
            (VisitorProgress::Planting { vine, left }, _) => {
                if planting_step(tx, &player, action, vine, left)? {
                    end_visitor(tx);
                }
            }
            (VisitorProgress::Idle, Action::ChooseVine { vine: Some(vine), .. }) => {
                tx.uproot_vine(&player, *vine)?;
                tx.discard(CardId::Vine(*vine));
                tx.gain_victory_points(&player, 2);
                end_visitor(tx);
            }
            (VisitorProgress::Idle, _) => match picked(action) {
                Some(VisitorChoice::PlanterPlant) => {
                    tx.gain_coins(&player, 1);
                    set_progress(tx, VisitorProgress::Planting { vine: None, left: 2 });
                    prompt_plant(tx, &player, false);
                }
                Some(VisitorChoice::PlanterUproot) => {
                    let vines = selectors::planted_vines(tx.player(&player));
                    tx.push_prompt(Prompt::choose_vine(player, "Uproot a vine", vines, false));
                }
                _ => return Err(unexpected(action)),
            },
            _ => return Err(unexpected(action)),
        }
        Ok(())
    }
}

/// Everyone may build a structure at a 2 coin discount. The owner gains
/// 1 VP per opponent who does.
pub struct Handyman;

const HANDYMAN_COUPON: Coupon = Coupon::Discount { amount: 2 };

impl VisitorEffect for Handyman {
    fn id(&self) -> VisitorId {
        VisitorId::Handyman
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        let waiting: Vec<PlayerId> = tx
            .players_from(player)
            .into_iter()
            .filter(|p| selectors::build_reason(tx.player(p), Some(HANDYMAN_COUPON)).is_none())
            .collect();
        if waiting.is_empty() {
            end_visitor(tx);
            return Ok(());
        }
        for p in &waiting {
            tx.push_prompt(Prompt::build_structure(p.clone(), Some(HANDYMAN_COUPON), true));
        }
        set_progress(tx, VisitorProgress::Roster { waiting, accepted: 0 });
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let (VisitorProgress::Roster { waiting, accepted }, Action::BuildStructure { structure_id, .. }) =
            (progress, action)
        else {
            return Err(unexpected(action));
        };
        if let Some(structure_id) = structure_id {
            tx.build_structure(&player, *structure_id, Some(HANDYMAN_COUPON))?;
        }
        if let Some(accepted) = roster_answer(tx, &player, waiting, accepted, structure_id.is_some())? {
            let owner = owner(tx);
            tx.gain_victory_points(&owner, i32::from(accepted));
            end_visitor(tx);
        }
        Ok(())
    }
}

/// Everyone may plant a vine. The owner gains 2 coins per opponent who
/// does.
pub struct VolunteerCrew;

impl VolunteerCrew {
    fn answered(
        tx: &mut Transaction,
        player: &PlayerId,
        mut waiting: Vec<PlayerId>,
        mut accepted: u8,
        chosen: Vec<(PlayerId, crate::cards::VineId)>,
        planted: bool,
    ) {
        waiting.retain(|p| p != player);
        if planted && *player != owner(tx) {
            accepted += 1;
        }
        if waiting.is_empty() {
            let owner = owner(tx);
            tx.gain_coins(&owner, 2 * u32::from(accepted));
            end_visitor(tx);
        } else {
            set_progress(
                tx,
                VisitorProgress::VolunteerCrew {
                    waiting,
                    accepted,
                    chosen,
                },
            );
        }
    }
}

impl VisitorEffect for VolunteerCrew {
    fn id(&self) -> VisitorId {
        VisitorId::VolunteerCrew
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        let waiting: Vec<PlayerId> = tx
            .players_from(player)
            .into_iter()
            .filter(|p| selectors::plant_reason(tx.player(p)).is_none())
            .collect();
        if waiting.is_empty() {
            end_visitor(tx);
            return Ok(());
        }
        for p in &waiting {
            prompt_plant(tx, p, true);
        }
        set_progress(
            tx,
            VisitorProgress::VolunteerCrew {
                waiting,
                accepted: 0,
                chosen: Vec::new(),
            },
        );
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let VisitorProgress::VolunteerCrew {
            waiting,
            accepted,
            mut chosen,
        } = progress
        else {
            return Err(unexpected(action));
        };
        if !waiting.contains(&player) {
            return Err(ActionError::Rejected(format!("{player} already answered")));
        }
        match action {
            Action::ChooseVine { vine: None, .. } => {
                Self::answered(tx, &player, waiting, accepted, chosen, false);
            }
            Action::ChooseVine { vine: Some(vine), .. } => {
                if !tx.player(&player).holds(CardId::Vine(*vine))
                    || selectors::plantable_fields(tx.player(&player), *vine).is_empty()
                {
                    return Err(ActionError::NotOffered(vine.to_string()));
                }
                chosen.push((player.clone(), *vine));
                board::prompt_field_for_vine(tx, &player, *vine);
                set_progress(
                    tx,
                    VisitorProgress::VolunteerCrew {
                        waiting,
                        accepted,
                        chosen,
                    },
                );
            }
            Action::ChooseField { .. } => {
                let index = chosen
                    .iter()
                    .position(|(p, _)| *p == player)
                    .ok_or_else(|| unexpected(action))?;
                let (_, vine) = chosen.remove(index);
                tx.take_from_hand(&player, CardId::Vine(vine))?;
                plant_into(tx, &player, vine, action)?;
                Self::answered(tx, &player, waiting, accepted, chosen, true);
            }
            _ => return Err(unexpected(action)),
        }
        Ok(())
    }
}

/// Gain 2 coins per empty owned field, or 1 VP per planted owned field.
pub struct Surveyor;

impl Surveyor {
    fn counts(state: &GameState, player: &PlayerId) -> (u8, u8) {
        let owned = state.player(player).fields.iter().filter(|f| !f.sold);
        owned.fold((0, 0), |(empty, planted), f| {
            if f.is_empty() {
                (empty + 1, planted)
            } else {
                (empty, planted + 1)
            }
        })
    }
}

impl VisitorEffect for Surveyor {
    fn id(&self) -> VisitorId {
        VisitorId::Surveyor
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let (empty, planted) = Self::counts(state, player);
        vec![
            option(
                VisitorChoice::SurveyorEmpty,
                format!("Gain {} coins", 2 * empty),
                (empty == 0).then(|| "You own no empty field".to_string()),
            ),
            option(
                VisitorChoice::SurveyorPlanted,
                format!("Gain {planted} VP"),
                (planted == 0).then(|| "You own no planted field".to_string()),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let (empty, planted) = Self::counts(tx, &player);
        match picked(action) {
            Some(VisitorChoice::SurveyorEmpty) => tx.gain_coins(&player, 2 * u32::from(empty)),
            Some(VisitorChoice::SurveyorPlanted) => tx.gain_victory_points(&player, i32::from(planted)),
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Plant a vine, then gain 2 VP with at least 6 different vines planted.
pub struct Agriculturist;

/// Distinct vine kinds needed for the Agriculturist bonus.
const AGRICULTURIST_KINDS: usize = 6;

impl VisitorEffect for Agriculturist {
    fn id(&self) -> VisitorId {
        VisitorId::Agriculturist
    }

    fn unplayable_reason(&self, state: &GameState, player: &PlayerId) -> Option<String> {
        selectors::plant_reason(state.player(player))
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        set_progress(tx, VisitorProgress::Planting { vine: None, left: 1 });
        prompt_plant(tx, player, false);
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let VisitorProgress::Planting { vine, left } = progress else {
            return Err(unexpected(action));
        };
        if planting_step(tx, &player, action, vine, left)? {
            let kinds: FxHashSet<_> = selectors::planted_vines(tx.player(&player))
                .into_iter()
                .map(|v| v.kind)
                .collect();
            if kinds.len() >= AGRICULTURIST_KINDS {
                tx.gain_victory_points(&player, 2);
            }
            end_visitor(tx);
        }
        Ok(())
    }
}

/// Discard a grape for 1 residual payment, or a wine for 2.
pub struct Negotiator;

impl VisitorEffect for Negotiator {
    fn id(&self) -> VisitorId {
        VisitorId::Negotiator
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(
                VisitorChoice::NegotiatorGrape,
                "Discard 1 grape to gain 1 residual payment",
                selectors::grapes_reason(p),
            ),
            option(
                VisitorChoice::NegotiatorWine,
                "Discard 1 wine to gain 2 residual payments",
                selectors::wine_reason(p, 1),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (picked(action), action) {
            (Some(VisitorChoice::NegotiatorGrape), _) => {
                prompt_grape(tx, &player, self.id(), "Discard a grape");
                return Ok(());
            }
            (Some(VisitorChoice::NegotiatorWine), _) => {
                tx.push_prompt(Prompt::choose_wine(player, "Discard a wine", vec![WineRequirement::any(1)]));
                return Ok(());
            }
            (None, Action::ChooseActionMulti { choices, .. }) => {
                for grape in board::grapes_from_choices(choices)? {
                    tx.remove_grape(&player, grape)?;
                }
                tx.gain_residuals(&player, 1);
            }
            (None, Action::ChooseWine { wines, .. }) => {
                for &wine in wines {
                    tx.remove_wine(&player, wine)?;
                }
                tx.gain_residuals(&player, 2);
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}
