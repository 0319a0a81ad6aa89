//! Property tests: random legal play keeps the game consistent.

mod common;

use proptest::prelude::*;

use oenology::cards::{CardType, Deck, StructureId, StructureState};
use oenology::core::{
    Action, ActivityEvent, CurrentTurn, GameState, GrapeColor, GrapeSpec, PendingAction,
    PlayerColor, PlayerId, TokenLadder, WineColor, WineIngredients, WorkerKind,
};
use oenology::prompts::{ChoiceId, Prompt, PromptKind};
use oenology::rules::{try_apply, GameSetup, Placement};

fn new_game(seed: u64, players: usize) -> GameState {
    common::init_tracing();
    let seats = [
        ("viny", PlayerColor::Orange),
        ("stfy", PlayerColor::Blue),
        ("pomo", PlayerColor::Green),
        ("lulu", PlayerColor::Yellow),
    ];
    seats
        .iter()
        .take(players)
        .fold(GameSetup::new(), |setup, &(id, color)| setup.player(id, color))
        .build(Deck::shuffled(seed))
        .unwrap()
}

/// Give every player grapes, wines, both cellars, coins and an order so
/// random play reaches winemaking and order filling early.
fn stock(mut state: GameState) -> GameState {
    let ids: Vec<PlayerId> = state.players_in_order().map(|p| p.id.clone()).collect();
    for id in ids {
        let order = state.draw_piles.pop_top(CardType::Order);
        let Some(player) = state.players.get_mut(&id) else {
            continue;
        };
        for value in [2, 3, 5] {
            player.crush_pad.ladder_mut(GrapeColor::Red).place(value, 1);
        }
        for value in [2, 4] {
            player.crush_pad.ladder_mut(GrapeColor::White).place(value, 1);
        }
        player.cellar.ladder_mut(WineColor::Red).place(3, 1);
        player.cellar.ladder_mut(WineColor::White).place(2, 1);
        player.structures.insert(StructureId::MediumCellar, StructureState::Built);
        player.structures.insert(StructureId::LargeCellar, StructureState::Built);
        player.coins += 10;
        player.hand.extend(order);
    }
    state
}

fn start(seed: u64, players: usize, stocked: bool) -> GameState {
    let state = new_game(seed, players);
    if stocked {
        stock(state)
    } else {
        state
    }
}

/// Single-wine recipes from the grapes on a crush pad, plus one two-wine
/// batch and the empty answer.
fn recipes(grapes: &[GrapeSpec], up_to: usize) -> Vec<Vec<WineIngredients>> {
    let reds: Vec<GrapeSpec> = grapes.iter().copied().filter(|g| g.color == GrapeColor::Red).collect();
    let whites: Vec<GrapeSpec> = grapes.iter().copied().filter(|g| g.color == GrapeColor::White).collect();

    let mut single = Vec::new();
    for &r in &reds {
        single.push(WineIngredients::new(WineColor::Red, &[r]));
    }
    for &w in &whites {
        single.push(WineIngredients::new(WineColor::White, &[w]));
    }
    for &r in &reds {
        for &w in &whites {
            single.push(WineIngredients::new(WineColor::Blush, &[r, w]));
        }
    }
    for (i, &r1) in reds.iter().enumerate() {
        for &r2 in &reds[i + 1..] {
            for &w in &whites {
                single.push(WineIngredients::new(WineColor::Sparkling, &[r1, r2, w]));
            }
        }
    }

    let mut batches: Vec<Vec<WineIngredients>> = vec![Vec::new()];
    batches.extend(single.iter().map(|recipe| vec![recipe.clone()]));
    if up_to >= 2 {
        if let (Some(&r), Some(&w)) = (reds.first(), whites.first()) {
            batches.push(vec![
                WineIngredients::new(WineColor::Red, &[r]),
                WineIngredients::new(WineColor::White, &[w]),
            ]);
        }
    }
    batches
}

/// Answers a prompt might take. Not all of them are legal.
fn candidates(state: &GameState, prompt: &Prompt) -> Vec<Action> {
    let player_id = prompt.player_id.clone();
    let player = state.player(&player_id);
    match &prompt.kind {
        PromptKind::PlaceWorker { .. } => {
            let mut actions = vec![Action::Pass {
                player_id: player_id.clone(),
            }];
            for placement in Placement::ALL {
                for worker in [WorkerKind::Normal, WorkerKind::Grande] {
                    actions.push(Action::PlaceWorker {
                        player_id: player_id.clone(),
                        placement,
                        worker,
                    });
                }
            }
            actions
        }
        PromptKind::ChooseAction { choices, .. } => choices
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| Action::ChooseAction {
                player_id: player_id.clone(),
                choice: c.id,
            })
            .collect(),
        PromptKind::ChooseActionMulti { choices, min, .. } => {
            let enabled: Vec<_> = choices.iter().filter(|c| c.is_enabled()).map(|c| c.id).collect();
            let take = (*min).max(1);
            (0..enabled.len())
                .map(|start| Action::ChooseActionMulti {
                    player_id: player_id.clone(),
                    choices: enabled.iter().cycle().skip(start).take(take).copied().collect(),
                })
                .collect()
        }
        PromptKind::ChooseCards { cards, min, max, .. } => {
            let mut actions: Vec<Action> = if *min <= 1 && *max >= 1 {
                cards
                    .iter()
                    .map(|&c| Action::ChooseCards {
                        player_id: player_id.clone(),
                        cards: Some(vec![c]),
                    })
                    .collect()
            } else {
                vec![Action::ChooseCards {
                    player_id: player_id.clone(),
                    cards: Some(cards.iter().take(*min).copied().collect()),
                }]
            };
            if *min == 0 {
                actions.push(Action::ChooseCards {
                    player_id: player_id.clone(),
                    cards: None,
                });
            }
            actions
        }
        PromptKind::ChooseField { fields, .. } => fields
            .iter()
            .map(|&f| Action::ChooseField {
                player_id: player_id.clone(),
                fields: vec![f],
            })
            .collect(),
        PromptKind::ChooseVine { vines, optional, .. } => {
            let mut actions: Vec<Action> = vines
                .iter()
                .map(|&v| Action::ChooseVine {
                    player_id: player_id.clone(),
                    vine: Some(v),
                })
                .collect();
            if *optional {
                actions.push(Action::ChooseVine {
                    player_id: player_id.clone(),
                    vine: None,
                });
            }
            actions
        }
        PromptKind::ChooseWine { requirements, .. } => {
            let mut cellar = player.cellar.wines();
            let mut wines = Vec::new();
            for requirement in requirements {
                if let Some(index) = cellar.iter().position(|&w| requirement.accepts(w)) {
                    wines.push(cellar.remove(index));
                }
            }
            vec![Action::ChooseWine { player_id, wines }]
        }
        PromptKind::MakeWine { up_to } => recipes(&player.crush_pad.grapes(), *up_to)
            .into_iter()
            .map(|ingredients| Action::MakeWine {
                player_id: player_id.clone(),
                ingredients,
            })
            .collect(),
        PromptKind::BuildStructure { optional, .. } => {
            let mut actions: Vec<Action> = StructureId::ALL
                .iter()
                .map(|&s| Action::BuildStructure {
                    player_id: player_id.clone(),
                    structure_id: Some(s),
                })
                .collect();
            if *optional {
                actions.push(Action::BuildStructure {
                    player_id: player_id.clone(),
                    structure_id: None,
                });
            }
            actions
        }
    }
}

/// Play `picks.len()` legal actions, each picked by index among the legal
/// answers to the first prompt.
fn play_out(mut state: GameState, picks: &[usize]) -> GameState {
    for &pick in picks {
        let Some(prompt) = state.prompts.front().cloned() else {
            break;
        };
        let legal: Vec<GameState> = candidates(&state, &prompt)
            .iter()
            .filter_map(|action| try_apply(&state, action).ok())
            .collect();
        if legal.is_empty() {
            break;
        }
        state = legal[pick % legal.len()].clone();
    }
    state
}

fn cards_in_limbo(state: &GameState) -> usize {
    match state.pending_action() {
        Some(PendingAction::PlayVisitor(play)) => {
            usize::from(play.visitor.is_some()) + play.progress.limbo_vines().len()
        }
        Some(PendingAction::Plant { vine: Some(_), .. }) => 1,
        _ => 0,
    }
}

fn cards_accounted(state: &GameState) -> usize {
    let held: usize = state
        .players_in_order()
        .map(|p| p.hand.len() + p.fields.iter().map(|f| f.vines.len()).sum::<usize>())
        .sum();
    state.draw_piles.len() + state.discard_piles.len() + held + cards_in_limbo(state)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_replay_is_deterministic(
        seed in any::<u64>(),
        players in 2usize..=4,
        stocked in any::<bool>(),
        picks in prop::collection::vec(any::<usize>(), 0..80),
    ) {
        let a = play_out(start(seed, players, stocked), &picks);
        let b = play_out(start(seed, players, stocked), &picks);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_cards_are_conserved(
        seed in any::<u64>(),
        players in 2usize..=4,
        stocked in any::<bool>(),
        picks in prop::collection::vec(any::<usize>(), 0..120),
    ) {
        let total = Deck::full().len();
        let mut state = start(seed, players, stocked);
        prop_assert_eq!(cards_accounted(&state), total);
        for pick in picks {
            state = play_out(state, &[pick]);
            prop_assert_eq!(cards_accounted(&state), total);
        }
    }

    #[test]
    fn prop_players_stay_consistent(
        seed in any::<u64>(),
        picks in prop::collection::vec(any::<usize>(), 0..120),
    ) {
        let state = play_out(start(seed, 3, true), &picks);
        for player in state.players_in_order() {
            prop_assert!(player.available_workers() <= player.workers.len());
            prop_assert!(player.trained_workers() <= usize::from(state.config.max_workers));
            prop_assert!(player.residuals <= state.config.max_residuals);
            for wine in player.cellar.wines() {
                prop_assert!(wine.value >= wine.color.floor());
                prop_assert!(wine.value <= player.wine_cap());
            }
        }
        let ids: Vec<&PlayerId> = state.wake_up_entries().map(|(_, pos)| &pos.player_id).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn prop_ladder_placement_never_inflates(
        slots in prop::array::uniform9(any::<bool>()),
        value in 1u8..=9,
        floor in 1u8..=9,
    ) {
        let mut ladder = TokenLadder::from_slots(slots);
        let before = ladder.count();
        match ladder.place(value, floor) {
            Some(landed) => {
                prop_assert!(landed <= value);
                prop_assert!(landed >= floor);
                prop_assert!(!TokenLadder::from_slots(slots).is_occupied(landed));
                prop_assert_eq!(ladder.count(), before + 1);
            }
            None => prop_assert_eq!(ladder.count(), before),
        }
    }

    #[test]
    fn prop_aging_keeps_token_count(slots in prop::array::uniform9(any::<bool>())) {
        let ladder = TokenLadder::from_slots(slots);
        let aged = ladder.aged();
        prop_assert_eq!(aged.count(), ladder.count());
        prop_assert!(aged.values().sum::<u8>() >= ladder.values().sum::<u8>());
    }
}

#[test]
fn test_card_total_matches_catalog() {
    let state = new_game(3, 2);
    assert_eq!(cards_accounted(&state), Deck::full().len());
    assert!(state.discard_piles.is_empty());
}

#[test]
fn test_random_answers_include_every_wine_color() {
    let state = stock(new_game(5, 2));
    let viny = PlayerId::from("viny");
    let stfy = PlayerId::from("stfy");
    let state = try_apply(&state, &Action::Pass { player_id: viny.clone() }).unwrap();
    let state = try_apply(&state, &Action::Pass { player_id: stfy }).unwrap();
    let state = play_to_make_wine(state, &viny);

    let prompt = state.prompts.front().cloned().unwrap();
    assert!(matches!(prompt.kind, PromptKind::MakeWine { .. }));
    let legal: Vec<(Action, GameState)> = candidates(&state, &prompt)
        .into_iter()
        .filter_map(|action| try_apply(&state, &action).ok().map(|next| (action, next)))
        .collect();
    for color in [WineColor::Red, WineColor::White, WineColor::Blush, WineColor::Sparkling] {
        assert!(
            legal.iter().any(|(action, _)| matches!(
                action,
                Action::MakeWine { ingredients, .. } if ingredients.iter().any(|i| i.wine == color)
            )),
            "no legal {color:?} recipe offered"
        );
    }

    let (_, next) = legal
        .iter()
        .find(|(action, _)| matches!(
            action,
            Action::MakeWine { ingredients, .. }
                if ingredients.len() == 1 && ingredients[0].wine == WineColor::Sparkling
        ))
        .unwrap();
    assert_eq!(next.player(&viny).cellar.ladder(WineColor::Sparkling).count(), 1);
    assert!(next
        .activity_log
        .last()
        .unwrap()
        .events
        .iter()
        .any(|e| matches!(e, ActivityEvent::MakeWine { .. })));
    assert_eq!(cards_accounted(next), Deck::full().len());
}

/// From the end of summer: both fall draws, then viny takes the make wine
/// space.
fn play_to_make_wine(state: GameState, viny: &PlayerId) -> GameState {
    let mut state = state;
    while let CurrentTurn::FallVisitor { player_id } = state.current_turn.clone() {
        state = try_apply(
            &state,
            &Action::ChooseAction {
                player_id,
                choice: ChoiceId::FallDrawSummer,
            },
        )
        .unwrap();
    }
    try_apply(
        &state,
        &Action::PlaceWorker {
            player_id: viny.clone(),
            placement: Placement::MakeWine,
            worker: WorkerKind::Normal,
        },
    )
    .unwrap()
}
