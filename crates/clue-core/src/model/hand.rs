use crate::model::card::Card;
use crate::model::solution::Solution;

/// Cards dealt to one agent. Fixed after the deal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Cards of the suggestion this hand could show, in suggestion order.
    pub fn matching(&self, suggestion: &Solution) -> Vec<Card> {
        suggestion
            .cards()
            .into_iter()
            .filter(|card| self.contains(card))
            .cloned()
            .collect()
    }

    pub fn has_any(&self, suggestion: &Solution) -> bool {
        suggestion.cards().into_iter().any(|card| self.contains(card))
    }

    fn sort(&mut self) {
        self.cards.sort();
    }
}
