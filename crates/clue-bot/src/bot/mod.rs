mod gate;
mod params;
mod reveal;
mod suggest;

pub use gate::{AccusationGate, CategoryLead, GateDecision, GateTier};
pub use params::BotParams;
pub use reveal::{RevealPlanner, RevealReason};
pub use suggest::{SuggestionPlanner, SuggestionReason};
