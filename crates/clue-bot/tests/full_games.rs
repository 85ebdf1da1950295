use clue_bot::{BotParams, heuristic_factory};
use clue_core::game::engine::{GameEngine, TurnAction};
use clue_core::game::setup::GameSetup;
use clue_core::model::seat::Seat;

const TURN_LIMIT: u32 = 2_000;

struct Finished {
    winner: Option<Seat>,
    turns: u32,
    solved: bool,
    log: Vec<String>,
}

fn play(players: usize, seed: u64) -> Finished {
    let mut engine = GameEngine::new(
        GameSetup::all_automated(players).with_seed(seed),
        heuristic_factory(BotParams::default()),
    )
    .expect("valid setup");

    while !engine.is_over() && engine.turn_state().turns_taken < TURN_LIMIT {
        if let TurnAction::Idle = engine.take_automated_turn() {
            panic!("automated seat {} had nothing to do", engine.current_player());
        }
        engine.next_turn();
    }

    Finished {
        winner: engine.winner(),
        turns: engine.turn_state().turns_taken,
        solved: engine.revealed_solution().is_some(),
        log: engine.logs().iter().map(|entry| entry.text.clone()).collect(),
    }
}

#[test]
fn seeded_games_reach_a_winner() {
    for players in 2..=6 {
        for seed in [1u64, 17, 2024] {
            let finished = play(players, seed);
            assert!(
                finished.winner.is_some(),
                "players={players} seed={seed} stalled after {} turns",
                finished.turns
            );
            assert!(finished.turns < TURN_LIMIT);
        }
    }
}

#[test]
fn same_seed_replays_identically() {
    let first = play(4, 99);
    let second = play(4, 99);
    assert_eq!(first.winner, second.winner);
    assert_eq!(first.turns, second.turns);
    assert_eq!(first.log, second.log);
}

#[test]
fn most_games_end_with_a_correct_accusation() {
    let solved = (0..20u64).filter(|seed| play(3, *seed).solved).count();
    assert!(solved >= 5, "only {solved} of 20 games were solved");
}
