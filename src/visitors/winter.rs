//! Winter visitors.

use super::{
    actor, end_visitor, offer, option, owner, picked, roster_answer, set_progress, unexpected, VisitorChoice,
    VisitorEffect, VisitorProgress,
};
use crate::cards::{CardId, CardType, VisitorId, WineRequirement};
use crate::core::{Action, ActionError, GameState, PlayerId, WineColor};
use crate::prompts::{Choice, Prompt};
use crate::rules::mutators::Transaction;
use crate::rules::selectors;

/// Worker count the Professor rewards.
const PROFESSOR_WORKERS: usize = 6;

fn hand_of(state: &GameState, player: &PlayerId) -> Vec<CardId> {
    state.player(player).hand.iter().copied().collect()
}

/// Draw 2 summer visitors, or discard a wine of value 4+ for 3 VP.
pub struct Judge;

impl VisitorEffect for Judge {
    fn id(&self) -> VisitorId {
        VisitorId::Judge
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        vec![
            option(
                VisitorChoice::JudgeDraw,
                "Draw 2 summer visitor cards",
                selectors::draw_reason(state, CardType::SummerVisitor),
            ),
            option(
                VisitorChoice::JudgeDiscard,
                "Discard 1 wine of value 4 or more to gain 3 VP",
                selectors::wine_reason(state.player(player), 4),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (picked(action), action) {
            (Some(VisitorChoice::JudgeDraw), _) => {
                tx.draw_cards(&player, CardType::SummerVisitor, 2);
            }
            (Some(VisitorChoice::JudgeDiscard), _) => {
                tx.push_prompt(Prompt::choose_wine(player, "Discard a wine", vec![WineRequirement::any(4)]));
                return Ok(());
            }
            (None, Action::ChooseWine { wines, .. }) => {
                for &wine in wines {
                    tx.remove_wine(&player, wine)?;
                }
                tx.gain_victory_points(&player, 3);
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Below 0 VP gain 6 coins; otherwise draw a vine, a summer visitor and an
/// order.
pub struct Politician;

impl VisitorEffect for Politician {
    fn id(&self) -> VisitorId {
        VisitorId::Politician
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        if tx.player(player).victory_points < 0 {
            tx.gain_coins(player, 6);
        } else {
            for card_type in [CardType::Vine, CardType::SummerVisitor, CardType::Order] {
                tx.draw_cards(player, card_type, 1);
            }
        }
        end_visitor(tx);
        Ok(())
    }

    fn respond(&self, _tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        Err(unexpected(action))
    }
}

/// Pay 2 to train a worker, or gain 2 VP with 6 workers.
pub struct Professor;

impl VisitorEffect for Professor {
    fn id(&self) -> VisitorId {
        VisitorId::Professor
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(
                VisitorChoice::ProfessorTrain,
                "Pay 2 to train 1 worker",
                selectors::train_reason(p, &state.config, 2),
            ),
            option(
                VisitorChoice::ProfessorGain,
                "Gain 2 VP",
                (p.trained_workers() < PROFESSOR_WORKERS)
                    .then(|| format!("Requires a total of {PROFESSOR_WORKERS} workers")),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match picked(action) {
            Some(VisitorChoice::ProfessorTrain) => tx.train_worker(&player, 2, false)?,
            Some(VisitorChoice::ProfessorGain) => tx.gain_victory_points(&player, 2),
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Discard a wine for 4 coins, plus 2 VP if no cellar holds one as valuable.
pub struct Taster;

impl VisitorEffect for Taster {
    fn id(&self) -> VisitorId {
        VisitorId::Taster
    }

    fn unplayable_reason(&self, state: &GameState, player: &PlayerId) -> Option<String> {
        selectors::wine_reason(state.player(player), 1)
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        tx.push_prompt(Prompt::choose_wine(
            player.clone(),
            "Discard a wine",
            vec![WineRequirement::any(1)],
        ));
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let Action::ChooseWine { wines, .. } = action else {
            return Err(unexpected(action));
        };
        for &wine in wines {
            tx.remove_wine(&player, wine)?;
            tx.gain_coins(&player, 4);
            // Compared against what is left, so ties do not count.
            if selectors::most_valuable_wine(tx).map_or(true, |best| wine.value > best) {
                tx.gain_victory_points(&player, 2);
            }
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Make up to 2 wines, or pay 2 to train a worker.
pub struct Teacher;

impl VisitorEffect for Teacher {
    fn id(&self) -> VisitorId {
        VisitorId::Teacher
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(VisitorChoice::TeacherMake, "Make up to 2 wine tokens", selectors::grapes_reason(p)),
            option(
                VisitorChoice::TeacherTrain,
                "Pay 2 to train 1 worker",
                selectors::train_reason(p, &state.config, 2),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (picked(action), action) {
            (Some(VisitorChoice::TeacherMake), _) => {
                tx.push_prompt(Prompt::make_wine(player, 2));
                return Ok(());
            }
            (Some(VisitorChoice::TeacherTrain), _) => tx.train_worker(&player, 2, false)?,
            (None, Action::MakeWine { ingredients, .. }) => {
                tx.make_wines(&player, ingredients)?;
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Gain 3 coins and draw a summer visitor, or draw an order and make up to
/// 1 wine.
pub struct Crusher;

impl VisitorEffect for Crusher {
    fn id(&self) -> VisitorId {
        VisitorId::Crusher
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let draw = selectors::draw_reason(state, CardType::Order).and(selectors::grapes_reason(state.player(player)));
        vec![
            option(VisitorChoice::CrusherGain, "Gain 3 coins and draw 1 summer visitor card", None),
            option(
                VisitorChoice::CrusherDraw,
                "Draw 1 order card and make up to 1 wine token",
                draw,
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match (picked(action), action) {
            (Some(VisitorChoice::CrusherGain), _) => {
                tx.gain_coins(&player, 3);
                tx.draw_cards(&player, CardType::SummerVisitor, 1);
            }
            (Some(VisitorChoice::CrusherDraw), _) => {
                tx.draw_cards(&player, CardType::Order, 1);
                if selectors::grapes_reason(tx.player(&player)).is_none() {
                    tx.push_prompt(Prompt::make_wine(player, 1));
                    return Ok(());
                }
            }
            (None, Action::MakeWine { ingredients, .. }) => {
                tx.make_wines(&player, ingredients)?;
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Pay 1 for a residual payment, or lose 2 residual payments for 2 VP.
pub struct Noble;

impl VisitorEffect for Noble {
    fn id(&self) -> VisitorId {
        VisitorId::Noble
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let p = state.player(player);
        vec![
            option(
                VisitorChoice::NobleResidual,
                "Pay 1 to gain 1 residual payment",
                selectors::coins_reason(p, 1),
            ),
            option(
                VisitorChoice::NobleVp,
                "Lose 2 residual payments to gain 2 VP",
                (p.residuals < 2).then(|| "Requires 2 residual payments".to_string()),
            ),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        match picked(action) {
            Some(VisitorChoice::NobleResidual) => {
                tx.pay_coins(&player, 1)?;
                tx.gain_residuals(&player, 1);
            }
            Some(VisitorChoice::NobleVp) => {
                tx.lose_residuals(&player, 2)?;
                tx.gain_victory_points(&player, 2);
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Everyone may pay 1 to train a worker. The owner gains 1 VP per opponent
/// who does.
pub struct GuestSpeaker;

impl VisitorEffect for GuestSpeaker {
    fn id(&self) -> VisitorId {
        VisitorId::GuestSpeaker
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        let waiting = tx.players_from(player);
        for p in &waiting {
            let reason = selectors::train_reason(tx.player(p), &tx.config, 1);
            let choices = vec![
                option(VisitorChoice::GuestTrain, "Pay 1 to train 1 worker", reason),
                option(VisitorChoice::GuestPass, "Pass", None),
            ];
            offer(tx, p, self.id(), choices);
        }
        set_progress(tx, VisitorProgress::Roster { waiting, accepted: 0 });
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let VisitorProgress::Roster { waiting, accepted } = progress else {
            return Err(unexpected(action));
        };
        let trained = match picked(action) {
            Some(VisitorChoice::GuestTrain) => {
                tx.train_worker(&player, 1, false)?;
                true
            }
            Some(VisitorChoice::GuestPass) => false,
            _ => return Err(unexpected(action)),
        };
        if let Some(accepted) = roster_answer(tx, &player, waiting, accepted, trained)? {
            let owner = owner(tx);
            tx.gain_victory_points(&owner, i32::from(accepted));
            end_visitor(tx);
        }
        Ok(())
    }
}

/// Gain 1 coin per card in hand, or discard the hand for 2 VP.
pub struct Assessor;

impl VisitorEffect for Assessor {
    fn id(&self) -> VisitorId {
        VisitorId::Assessor
    }

    fn choices(&self, state: &GameState, player: &PlayerId) -> Vec<Choice> {
        let cards = state.player(player).hand.len();
        let empty = (cards == 0).then(|| "Your hand is empty".to_string());
        vec![
            option(VisitorChoice::AssessorGain, format!("Gain {cards} coins"), empty.clone()),
            option(VisitorChoice::AssessorDiscard, "Discard your hand to gain 2 VP", empty),
        ]
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let hand = hand_of(tx, &player);
        match picked(action) {
            Some(VisitorChoice::AssessorGain) => tx.gain_coins(&player, hand.len() as u32),
            Some(VisitorChoice::AssessorDiscard) => {
                tx.discard_from_hand(&player, &hand)?;
                tx.gain_victory_points(&player, 2);
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// The player on the right loses 1 VP, gives 2 cards or pays 3 coins.
pub struct Queen;

impl Queen {
    /// The player on the owner's right: the previous seat.
    fn target(state: &GameState, player: &PlayerId) -> Option<PlayerId> {
        let count = state.player_count();
        if count < 2 {
            return None;
        }
        let seat = state.seat_of(player)?;
        state.table_order.get((seat + count - 1) % count).cloned()
    }
}

impl VisitorEffect for Queen {
    fn id(&self) -> VisitorId {
        VisitorId::Queen
    }

    fn unplayable_reason(&self, state: &GameState, player: &PlayerId) -> Option<String> {
        Self::target(state, player)
            .is_none()
            .then(|| "Needs an opponent".to_string())
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        let target = Self::target(tx, player).ok_or_else(|| ActionError::Rejected("Needs an opponent".into()))?;
        let t = tx.player(&target);
        let choices = vec![
            option(VisitorChoice::QueenLoseVp, "Lose 1 VP", None),
            option(
                VisitorChoice::QueenGiveCards,
                format!("Give {player} 2 cards"),
                (t.hand.len() < 2).then(|| "Requires 2 cards in hand".to_string()),
            ),
            option(
                VisitorChoice::QueenPay,
                format!("Pay {player} 3 coins"),
                selectors::coins_reason(t, 3),
            ),
        ];
        offer(tx, &target, self.id(), choices);
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let target = actor(action)?;
        let owner = owner(tx);
        match (picked(action), action) {
            (Some(VisitorChoice::QueenLoseVp), _) => tx.gain_victory_points(&target, -1),
            (Some(VisitorChoice::QueenPay), _) => tx.transfer_coins(&target, &owner, 3)?,
            (Some(VisitorChoice::QueenGiveCards), _) => {
                let hand = hand_of(tx, &target);
                tx.push_prompt(Prompt::choose_cards(target, format!("Give {owner} 2 cards"), hand, (2, 2)));
                return Ok(());
            }
            (None, Action::ChooseCards { .. }) => {
                for &card in action.selected_cards() {
                    tx.take_from_hand(&target, card)?;
                    tx.add_to_hand(&owner, card);
                }
            }
            _ => return Err(unexpected(action)),
        }
        end_visitor(tx);
        Ok(())
    }
}

/// Make up to 2 wines and gain 1 VP per sparkling wine made.
pub struct Supervisor;

impl VisitorEffect for Supervisor {
    fn id(&self) -> VisitorId {
        VisitorId::Supervisor
    }

    fn unplayable_reason(&self, state: &GameState, player: &PlayerId) -> Option<String> {
        selectors::grapes_reason(state.player(player))
    }

    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        tx.push_prompt(Prompt::make_wine(player.clone(), 2));
        Ok(())
    }

    fn respond(&self, tx: &mut Transaction, action: &Action, _progress: VisitorProgress) -> Result<(), ActionError> {
        let player = actor(action)?;
        let Action::MakeWine { ingredients, .. } = action else {
            return Err(unexpected(action));
        };
        let made = tx.make_wines(&player, ingredients)?;
        let sparkling = made
            .iter()
            .flatten()
            .filter(|wine| wine.color == WineColor::Sparkling)
            .count();
        tx.gain_victory_points(&player, sparkling as i32);
        end_visitor(tx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{StructureId, StructureState};
    use crate::core::{GrapeSpec, TokenLadder, WineIngredients, WineSpec, Worker, WorkerKind};
    use crate::prompts::ChoiceId;
    use crate::visitors::test_support::*;

    fn ladder(values: &[u8]) -> TokenLadder {
        let mut slots = [false; 9];
        for &v in values {
            slots[usize::from(v) - 1] = true;
        }
        TokenLadder::from_slots(slots)
    }

    #[test]
    fn test_queen_target_pays_owner() {
        let mut state = game_with(VisitorId::Queen);
        edit(&mut state, &stfy(), |p| p.coins = 3);
        let state = play(&state, VisitorId::Queen);
        assert_eq!(state.prompts[0].player_id, stfy());

        let give = Action::ChooseAction {
            player_id: stfy(),
            choice: ChoiceId::Visitor(VisitorChoice::QueenGiveCards),
        };
        assert!(noop(&state, &give));

        let done = choose(&state, stfy(), VisitorChoice::QueenPay);
        assert_eq!(done.player(&stfy()).coins, 0);
        assert_eq!(done.player(&viny()).coins, 3);
        assert!(turn_ended(&done));
    }

    #[test]
    fn test_queen_gives_cards() {
        let cards = [
            CardId::Order(crate::cards::OrderId::new(0)),
            CardId::Order(crate::cards::OrderId::new(1)),
        ];
        let mut state = game_with(VisitorId::Queen);
        for card in cards {
            state.draw_piles.remove(card);
        }
        edit(&mut state, &stfy(), |p| {
            for card in cards {
                p.hand.push_back(card);
            }
        });
        let state = play(&state, VisitorId::Queen);
        let state = choose(&state, stfy(), VisitorChoice::QueenGiveCards);
        let done = answer(
            &state,
            Action::ChooseCards {
                player_id: stfy(),
                cards: Some(cards.to_vec()),
            },
        );

        assert!(done.player(&stfy()).hand.is_empty());
        assert!(cards.iter().all(|&c| done.player(&viny()).holds(c)));
    }

    #[test]
    fn test_taster_tie_gets_no_points() {
        let mut state = game_with(VisitorId::Taster);
        edit(&mut state, &viny(), |p| p.cellar.red = ladder(&[3]));
        edit(&mut state, &stfy(), |p| p.cellar.white = ladder(&[3]));
        let state = play(&state, VisitorId::Taster);
        let done = answer(
            &state,
            Action::ChooseWine {
                player_id: viny(),
                wines: vec![WineSpec::new(WineColor::Red, 3)],
            },
        );
        let v = done.player(&viny());
        assert_eq!((v.coins, v.victory_points), (4, 0));
    }

    #[test]
    fn test_taster_most_valuable_scores() {
        let mut state = game_with(VisitorId::Taster);
        edit(&mut state, &viny(), |p| p.cellar.red = ladder(&[3]));
        edit(&mut state, &stfy(), |p| p.cellar.white = ladder(&[2]));
        let state = play(&state, VisitorId::Taster);
        let done = answer(
            &state,
            Action::ChooseWine {
                player_id: viny(),
                wines: vec![WineSpec::new(WineColor::Red, 3)],
            },
        );
        assert_eq!(done.player(&viny()).victory_points, 2);
    }

    #[test]
    fn test_supervisor_scores_sparkling() {
        let mut state = game_with(VisitorId::Supervisor);
        edit(&mut state, &viny(), |p| {
            p.structures.insert(StructureId::MediumCellar, StructureState::Built);
            p.structures.insert(StructureId::LargeCellar, StructureState::Built);
            p.crush_pad.red = ladder(&[2, 3]);
            p.crush_pad.white = ladder(&[4]);
        });
        let state = play(&state, VisitorId::Supervisor);
        let done = answer(
            &state,
            Action::MakeWine {
                player_id: viny(),
                ingredients: vec![WineIngredients::new(
                    WineColor::Sparkling,
                    &[GrapeSpec::red(2), GrapeSpec::red(3), GrapeSpec::white(4)],
                )],
            },
        );
        let v = done.player(&viny());
        assert_eq!(v.cellar.sparkling, ladder(&[9]));
        assert_eq!(v.victory_points, 1);
        assert!(turn_ended(&done));
    }

    #[test]
    fn test_professor_needs_six_workers_for_points() {
        let mut state = game_with(VisitorId::Professor);
        edit(&mut state, &viny(), |p| p.coins = 2);
        let state = play(&state, VisitorId::Professor);
        let gain = Action::ChooseAction {
            player_id: viny(),
            choice: ChoiceId::Visitor(VisitorChoice::ProfessorGain),
        };
        assert!(noop(&state, &gain));

        let done = choose(&state, viny(), VisitorChoice::ProfessorTrain);
        let v = done.player(&viny());
        assert_eq!(v.coins, 0);
        assert_eq!(v.trained_workers(), 4);
    }

    #[test]
    fn test_professor_scores_with_more_than_six_workers() {
        let mut state = game_with(VisitorId::Professor);
        edit(&mut state, &viny(), |p| {
            for _ in 0..4 {
                p.workers.push_back(Worker {
                    kind: WorkerKind::Normal,
                    available: true,
                    temp: false,
                });
            }
        });
        assert_eq!(state.player(&viny()).trained_workers(), 7);

        let state = play(&state, VisitorId::Professor);
        let done = choose(&state, viny(), VisitorChoice::ProfessorGain);
        assert_eq!(done.player(&viny()).victory_points, 2);
    }

    #[test]
    fn test_guest_speaker_counts_opponents_only() {
        let mut state = game_with(VisitorId::GuestSpeaker);
        edit(&mut state, &viny(), |p| p.coins = 1);
        edit(&mut state, &stfy(), |p| p.coins = 1);
        let state = play(&state, VisitorId::GuestSpeaker);
        assert_eq!(state.prompts.len(), 2);

        let state = choose(&state, viny(), VisitorChoice::GuestTrain);
        assert!(state.playing_visitor().is_some());
        let done = choose(&state, stfy(), VisitorChoice::GuestTrain);

        assert_eq!(done.player(&viny()).victory_points, 1);
        assert_eq!(done.player(&viny()).trained_workers(), 4);
        assert_eq!(done.player(&stfy()).trained_workers(), 4);
        assert!(turn_ended(&done));
    }

    #[test]
    fn test_assessor_discards_hand() {
        let extra = CardId::Order(crate::cards::OrderId::new(3));
        let mut state = game_with(VisitorId::Assessor);
        state.draw_piles.remove(extra);
        edit(&mut state, &viny(), |p| p.hand.push_back(extra));
        let state = play(&state, VisitorId::Assessor);
        let done = choose(&state, viny(), VisitorChoice::AssessorDiscard);

        assert!(done.player(&viny()).hand.is_empty());
        assert_eq!(done.player(&viny()).victory_points, 2);
        assert!(done.discard_piles.contains(extra));
    }

    #[test]
    fn test_politician_depends_on_points() {
        let done = play(&game_with(VisitorId::Politician), VisitorId::Politician);
        assert_eq!(done.player(&viny()).hand.len(), 3);
        assert!(turn_ended(&done));

        let mut state = game_with(VisitorId::Politician);
        edit(&mut state, &viny(), |p| p.victory_points = -1);
        let done = play(&state, VisitorId::Politician);
        assert_eq!(done.player(&viny()).coins, 6);
        assert!(done.player(&viny()).hand.is_empty());
    }

    #[test]
    fn test_noble_buys_residual() {
        let mut state = game_with(VisitorId::Noble);
        edit(&mut state, &viny(), |p| p.coins = 1);
        let state = play(&state, VisitorId::Noble);
        let done = choose(&state, viny(), VisitorChoice::NobleResidual);
        let v = done.player(&viny());
        assert_eq!((v.coins, v.residuals), (0, 1));
    }
}
