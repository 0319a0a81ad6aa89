use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use oenology::{
    apply, Action, ChoiceId, CurrentTurn, Deck, GameSetup, GameState, Placement, PlayerColor,
    PlayerId, WorkerKind,
};

const SEATS: [(&str, PlayerColor); 6] = [
    ("viny", PlayerColor::Orange),
    ("stfy", PlayerColor::Blue),
    ("pomo", PlayerColor::Green),
    ("lulu", PlayerColor::Yellow),
    ("tank", PlayerColor::Purple),
    ("brix", PlayerColor::Red),
];

fn new_game(players: usize) -> GameState {
    SEATS
        .iter()
        .take(players)
        .fold(GameSetup::new(), |setup, &(id, color)| setup.player(id, color))
        .build(Deck::shuffled(42))
        .unwrap()
}

/// Everyone takes a coin until out of workers, then the year plays out
/// with fall draws and passes.
fn play_year(mut state: GameState) -> GameState {
    for _ in 0..200 {
        let Some(prompt) = state.prompts.front() else {
            break;
        };
        let player_id: PlayerId = prompt.player_id.clone();
        let action = match state.current_turn {
            CurrentTurn::WorkerPlacement(_) => Action::PlaceWorker {
                player_id: player_id.clone(),
                placement: Placement::GainCoin,
                worker: WorkerKind::Normal,
            },
            CurrentTurn::FallVisitor { .. } => Action::ChooseAction {
                player_id: player_id.clone(),
                choice: ChoiceId::FallDrawSummer,
            },
            _ => break,
        };
        let next = apply(&state, &action);
        state = if next == state {
            apply(&state, &Action::Pass { player_id })
        } else {
            next
        };
    }
    state
}

fn bench_snapshot(c: &mut Criterion) {
    let state = new_game(4);
    c.bench_function("snapshot_clone", |b| b.iter(|| state.clone()));
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");

    for players in [2usize, 4, 6] {
        let state = new_game(players);
        let action = Action::PlaceWorker {
            player_id: PlayerId::from("viny"),
            placement: Placement::GainCoin,
            worker: WorkerKind::Normal,
        };
        group.bench_with_input(BenchmarkId::new("gain_coin", players), &state, |b, state| {
            b.iter(|| apply(state, &action))
        });
        group.bench_with_input(BenchmarkId::new("year", players), &state, |b, state| {
            b.iter_batched(|| state.clone(), play_year, BatchSize::SmallInput)
        });
    }

    group.finish();
}

criterion_group!(apply_benches, bench_snapshot, bench_apply);
criterion_main!(apply_benches);
