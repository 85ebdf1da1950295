use crate::model::card::Card;
use crate::model::catalog::Catalog;
use crate::model::hand::Hand;
use crate::model::solution::Solution;
use rand::Rng;
use rand::seq::SliceRandom;

/// Every card except the solution. Drained by the deal.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn without_solution(catalog: &Catalog, solution: &Solution) -> Self {
        let cards = catalog
            .cards()
            .into_iter()
            .filter(|card| !solution.contains(card))
            .collect();
        Self { cards }
    }

    pub fn shuffled<R: Rng + ?Sized>(catalog: &Catalog, solution: &Solution, rng: &mut R) -> Self {
        let mut deck = Self::without_solution(catalog, solution);
        deck.cards.shuffle(rng);
        deck
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deals round-robin, one card per seat per pass, until the deck is empty.
    pub fn deal(&mut self, seats: usize) -> Vec<Hand> {
        let mut hands: Vec<Hand> = (0..seats).map(|_| Hand::new()).collect();
        if seats == 0 {
            return hands;
        }
        for (index, card) in self.cards.drain(..).enumerate() {
            hands[index % seats].add(card);
        }
        hands
    }
}
