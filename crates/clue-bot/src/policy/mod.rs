mod heuristic;

pub use heuristic::HeuristicStrategy;

use crate::bot::BotParams;
use clue_core::game::agent::Strategy;
use clue_core::model::seat::Seat;

/// Strategy factory for `GameEngine::new`: one heuristic agent per automated seat.
pub fn heuristic_factory(params: BotParams) -> impl FnMut(Seat, &str) -> Box<dyn Strategy> {
    move |seat: Seat, _name: &str| -> Box<dyn Strategy> { Box::new(HeuristicStrategy::new(seat, params)) }
}
