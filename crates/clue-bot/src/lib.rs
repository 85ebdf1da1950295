pub mod bot;
pub mod policy;

pub use bot::{AccusationGate, BotParams, GateDecision, GateTier, RevealPlanner, RevealReason, SuggestionPlanner};
pub use policy::{HeuristicStrategy, heuristic_factory};
