use super::params::BotParams;
use clue_core::knowledge::KnowledgeBase;
use clue_core::model::card::Card;
use clue_core::model::category::Category;
use clue_core::model::solution::Solution;
use rand::RngCore;
use rand::seq::SliceRandom;

const SCORE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionReason {
    Probe,
    Confirm,
    Explore,
}

impl SuggestionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            SuggestionReason::Probe => "probe",
            SuggestionReason::Confirm => "confirm",
            SuggestionReason::Explore => "explore",
        }
    }
}

/// Exploration/exploitation scoring over envelope candidates.
pub struct SuggestionPlanner;

impl SuggestionPlanner {
    /// Weight of the information term; decays as cards become publicly spent.
    pub fn info_weight(knowledge: &KnowledgeBase, params: &BotParams) -> f64 {
        (params.info_weight * (1.0 - knowledge.refuted_fraction())).max(0.0)
    }

    /// Candidate scores for one category, in catalog order.
    pub fn scores(
        knowledge: &KnowledgeBase,
        category: Category,
        params: &BotParams,
    ) -> Vec<(Card, f64)> {
        let weight = Self::info_weight(knowledge, params);
        let players = knowledge.player_count().max(1) as f64;
        let distribution = knowledge.category_distribution(category);
        knowledge
            .possible_in_envelope(category)
            .into_iter()
            .map(|card| {
                let probability = distribution
                    .iter()
                    .find(|(candidate, _)| *candidate == card)
                    .map(|(_, p)| *p)
                    .unwrap_or(0.0);
                let open = knowledge.unknown_holders(&card) as f64 / players;
                (card, probability + weight * open)
            })
            .collect()
    }

    /// Best-scoring candidate per category, ties broken by `rng`.
    pub fn explore(knowledge: &KnowledgeBase, params: &BotParams, rng: &mut dyn RngCore) -> Solution {
        let mut pick = |category| Self::pick(knowledge, category, params, &mut *rng);
        let suspect = pick(Category::Suspect);
        let weapon = pick(Category::Weapon);
        let room = pick(Category::Room);
        Solution::new(suspect, weapon, room)
    }

    fn pick(
        knowledge: &KnowledgeBase,
        category: Category,
        params: &BotParams,
        rng: &mut dyn RngCore,
    ) -> Card {
        let scored = Self::scores(knowledge, category, params);
        let best = scored
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        let leaders: Vec<&Card> = scored
            .iter()
            .filter(|(_, score)| (best - score).abs() <= SCORE_EPSILON)
            .map(|(card, _)| card)
            .collect();
        if let Some(card) = leaders.choose(&mut *rng) {
            return (*card).clone();
        }

        // Contradictory knowledge leaves no candidate; fall back to any unresolved card.
        let cards = knowledge.catalog().category_cards(category);
        let unresolved: Vec<&Card> = cards
            .iter()
            .filter(|card| knowledge.holder_of(card).is_none())
            .collect();
        unresolved
            .choose(&mut *rng)
            .map(|card| (*card).clone())
            .or_else(|| cards.choose(&mut *rng).cloned())
            .unwrap_or_else(|| Card::new(category, String::new()))
    }
}
