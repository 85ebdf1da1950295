use crate::bot::{
    AccusationGate, BotParams, GateDecision, RevealPlanner, RevealReason, SuggestionPlanner,
    SuggestionReason,
};
use clue_core::game::agent::Strategy;
use clue_core::knowledge::KnowledgeBase;
use clue_core::model::card::Card;
use clue_core::model::seat::Seat;
use clue_core::model::solution::Solution;
use rand::RngCore;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Probe {
    suggester: Seat,
    triple: Solution,
}

/// Rule-based automated player: minimal-leak reveals, probe/confirm/explore
/// suggestions and a tiered accusation gate.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy {
    seat: Seat,
    params: BotParams,
    probe: Option<Probe>,
}

impl HeuristicStrategy {
    pub fn new(seat: Seat, params: BotParams) -> Self {
        Self {
            seat,
            params,
            probe: None,
        }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn pending_probe(&self) -> Option<(Seat, &Solution)> {
        self.probe
            .as_ref()
            .map(|probe| (probe.suggester, &probe.triple))
    }

    fn take_probe(&mut self, knowledge: &KnowledgeBase) -> Option<Solution> {
        let probe = self.probe.take()?;
        let open = probe
            .triple
            .cards()
            .into_iter()
            .any(|card| knowledge.is_known_to_player(probe.suggester, card).is_unknown());
        open.then_some(probe.triple)
    }
}

impl Strategy for HeuristicStrategy {
    fn card_to_show(
        &mut self,
        knowledge: &KnowledgeBase,
        requester: Seat,
        candidates: &[Card],
        rng: &mut dyn RngCore,
    ) -> Option<Card> {
        let (card, reason) = RevealPlanner::choose(knowledge, requester, candidates, rng)?;
        log_reveal_decision(self.seat, requester, candidates, &card, reason);
        Some(card)
    }

    fn choose_suggestion(&mut self, knowledge: &KnowledgeBase, rng: &mut dyn RngCore) -> Solution {
        if let Some(triple) = self.take_probe(knowledge) {
            log_suggestion_decision(self.seat, knowledge, &triple, SuggestionReason::Probe);
            return triple;
        }
        if let Some(guess) = knowledge.current_solution_guess() {
            log_suggestion_decision(self.seat, knowledge, &guess, SuggestionReason::Confirm);
            return guess;
        }
        let triple = SuggestionPlanner::explore(knowledge, &self.params, rng);
        log_suggestion_decision(self.seat, knowledge, &triple, SuggestionReason::Explore);
        triple
    }

    fn choose_accusation(&mut self, knowledge: &KnowledgeBase) -> Option<Solution> {
        let decision = AccusationGate::evaluate(knowledge, &self.params)?;
        log_accusation_decision(self.seat, &decision);
        Some(decision.accusation)
    }

    fn observe_unrefuted(&mut self, suggester: Seat, suggestion: &Solution) {
        if !self.params.probe_enabled || suggester == self.seat {
            return;
        }
        self.probe = Some(Probe {
            suggester,
            triple: suggestion.clone(),
        });
    }

    fn label(&self) -> &str {
        "heuristic"
    }
}

fn log_reveal_decision(
    seat: Seat,
    requester: Seat,
    candidates: &[Card],
    chosen: &Card,
    reason: RevealReason,
) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    event!(
        target: "clue_bot::policy",
        Level::INFO,
        seat = %seat,
        requester = %requester,
        candidates = candidates.len(),
        card = %chosen.key(),
        reason = reason.as_str(),
        "reveal"
    );
}

fn log_suggestion_decision(
    seat: Seat,
    knowledge: &KnowledgeBase,
    triple: &Solution,
    reason: SuggestionReason,
) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    event!(
        target: "clue_bot::policy",
        Level::INFO,
        seat = %seat,
        suggestion = %triple,
        refuted = knowledge.refuted_count(),
        progress = knowledge.elimination_progress(),
        reason = reason.as_str(),
        "suggestion"
    );
}

fn log_accusation_decision(seat: Seat, decision: &GateDecision) {
    event!(
        target: "clue_bot::policy",
        Level::INFO,
        seat = %seat,
        accusation = %decision.accusation,
        tier = decision.tier.as_str(),
        progress = decision.progress,
        "accusation gate open"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clue_core::model::catalog::Catalog;
    use clue_core::model::hand::Hand;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn kb() -> KnowledgeBase {
        let hand = Hand::with_cards(vec![
            Card::suspect("Miss Scarlet"),
            Card::weapon("Dagger"),
            Card::room("Kitchen"),
        ]);
        let roster = vec!["P0".to_string(), "P1".to_string(), "P2".to_string()];
        KnowledgeBase::initialize(Seat(0), &roster, &Catalog::classic(), &hand).expect("kb")
    }

    fn probe_triple() -> Solution {
        Solution::new(
            Card::suspect("Mr. Green"),
            Card::weapon("Rope"),
            Card::room("Hall"),
        )
    }

    #[test]
    fn probe_is_reused_once() {
        let kb = kb();
        let mut strategy = HeuristicStrategy::new(Seat(0), BotParams::default());
        let mut rng = StdRng::seed_from_u64(2);

        strategy.observe_unrefuted(Seat(1), &probe_triple());
        assert_eq!(strategy.pending_probe().map(|(seat, _)| seat), Some(Seat(1)));
        assert_eq!(strategy.choose_suggestion(&kb, &mut rng), probe_triple());
        assert!(strategy.pending_probe().is_none());
    }

    #[test]
    fn stale_probe_is_dropped() {
        let mut kb = kb();
        kb.note_cannot_have_any(Seat(1), &probe_triple().cards().map(Clone::clone))
            .expect("note");
        let mut strategy = HeuristicStrategy::new(Seat(0), BotParams::default());
        let mut rng = StdRng::seed_from_u64(2);

        strategy.observe_unrefuted(Seat(1), &probe_triple());
        let suggestion = strategy.choose_suggestion(&kb, &mut rng);
        assert!(strategy.pending_probe().is_none());
        assert!(suggestion.is_well_formed(kb.catalog()));
    }

    #[test]
    fn own_unrefuted_suggestion_is_not_probed() {
        let mut strategy = HeuristicStrategy::new(Seat(0), BotParams::default());
        strategy.observe_unrefuted(Seat(0), &probe_triple());
        assert!(strategy.pending_probe().is_none());

        let params = BotParams {
            probe_enabled: false,
            ..BotParams::default()
        };
        let mut strategy = HeuristicStrategy::new(Seat(0), params);
        strategy.observe_unrefuted(Seat(1), &probe_triple());
        assert!(strategy.pending_probe().is_none());
    }

    #[test]
    fn confirms_unique_candidates() {
        let mut kb = kb();
        for card in [
            Card::suspect("Professor Plum"),
            Card::weapon("Rope"),
            Card::room("Study"),
        ] {
            kb.note_cannot_have_any(Seat(1), &[card.clone()]).expect("note");
            kb.note_cannot_have_any(Seat(2), &[card]).expect("note");
        }
        let expected = kb.confirmed_solution().expect("confirmed");
        let mut strategy = HeuristicStrategy::new(Seat(0), BotParams::default());
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(strategy.choose_suggestion(&kb, &mut rng), expected);
        assert_eq!(strategy.choose_accusation(&kb), Some(expected));
    }

    #[test]
    fn reveals_only_candidates() {
        let kb = kb();
        let mut strategy = HeuristicStrategy::new(Seat(0), BotParams::default());
        let mut rng = StdRng::seed_from_u64(4);
        let candidates = vec![Card::weapon("Dagger"), Card::room("Kitchen")];
        let shown = strategy
            .card_to_show(&kb, Seat(2), &candidates, &mut rng)
            .expect("card");
        assert!(candidates.contains(&shown));
        assert_eq!(strategy.label(), "heuristic");
    }
}
