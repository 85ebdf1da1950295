use clue_core::knowledge::KnowledgeBase;
use clue_core::model::card::Card;
use clue_core::model::seat::Seat;
use rand::RngCore;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealReason {
    AlreadyShown,
    AlreadyRefuted,
    Random,
}

impl RevealReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            RevealReason::AlreadyShown => "already_shown",
            RevealReason::AlreadyRefuted => "already_refuted",
            RevealReason::Random => "random",
        }
    }
}

/// Picks which intersecting card to show while leaking as little as possible.
pub struct RevealPlanner;

impl RevealPlanner {
    pub fn choose(
        knowledge: &KnowledgeBase,
        requester: Seat,
        candidates: &[Card],
        rng: &mut dyn RngCore,
    ) -> Option<(Card, RevealReason)> {
        let shown: Vec<&Card> = candidates
            .iter()
            .filter(|card| knowledge.was_shown_to(requester, card))
            .collect();
        if let Some(card) = shown.choose(&mut *rng) {
            return Some(((*card).clone(), RevealReason::AlreadyShown));
        }

        let spent: Vec<&Card> = candidates
            .iter()
            .filter(|card| knowledge.has_been_refuted_before(card))
            .collect();
        if let Some(card) = spent.choose(&mut *rng) {
            return Some(((*card).clone(), RevealReason::AlreadyRefuted));
        }

        candidates
            .choose(&mut *rng)
            .map(|card| (card.clone(), RevealReason::Random))
    }
}
