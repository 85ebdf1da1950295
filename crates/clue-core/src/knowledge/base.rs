//! Belief matrix over card ownership with fixpoint constraint propagation.

use super::tristate::TriState;
use crate::model::card::Card;
use crate::model::catalog::{Catalog, CatalogError};
use crate::model::category::Category;
use crate::model::hand::Hand;
use crate::model::seat::{Holder, Seat};
use crate::model::solution::Solution;
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeError {
    #[error("card {0} is not part of the catalog")]
    UnknownCard(String),
    #[error("seat {seat} is outside a roster of {players} players")]
    UnknownSeat { seat: Seat, players: usize },
    #[error("roster must name at least two players")]
    RosterTooSmall,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One agent's private deductions about who holds which card.
///
/// Every mutating observation re-runs propagation to a fixpoint and then
/// recomputes the probability tables from the matrix.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    owner: Seat,
    players: Vec<String>,
    catalog: Catalog,
    cards: Vec<Card>,
    index: HashMap<Card, usize>,
    /// `matrix[card][column]`: one column per seat, the envelope last.
    matrix: Vec<Vec<TriState>>,
    /// `prob_matrix[seat][card]`.
    prob_matrix: Vec<Vec<f64>>,
    /// Soft evidence accumulated per `[seat][card]`, layered over the uniform baseline.
    nudges: Vec<Vec<f64>>,
    envelope_probs: Vec<f64>,
    refuted: BTreeSet<usize>,
    shown_to: HashSet<(Seat, usize)>,
    contradictions: BTreeSet<usize>,
    conflicted: BTreeSet<Category>,
}

impl KnowledgeBase {
    /// Builds the matrix for `owner` holding `hand` and propagates once.
    pub fn initialize(
        owner: Seat,
        players: &[String],
        catalog: &Catalog,
        hand: &Hand,
    ) -> Result<Self, KnowledgeError> {
        catalog.validate()?;
        if players.len() < 2 {
            return Err(KnowledgeError::RosterTooSmall);
        }
        if owner.index() >= players.len() {
            return Err(KnowledgeError::UnknownSeat {
                seat: owner,
                players: players.len(),
            });
        }

        let cards = catalog.cards();
        let index = cards
            .iter()
            .cloned()
            .enumerate()
            .map(|(row, card)| (card, row))
            .collect();
        let columns = players.len() + 1;
        let envelope_probs = cards
            .iter()
            .map(|card| 1.0 / catalog.category_len(card.category) as f64)
            .collect();

        let mut kb = Self {
            owner,
            players: players.to_vec(),
            catalog: catalog.clone(),
            matrix: vec![vec![TriState::Unknown; columns]; cards.len()],
            prob_matrix: vec![vec![0.0; cards.len()]; players.len()],
            nudges: vec![vec![0.0; cards.len()]; players.len()],
            envelope_probs,
            cards,
            index,
            refuted: BTreeSet::new(),
            shown_to: HashSet::new(),
            contradictions: BTreeSet::new(),
            conflicted: BTreeSet::new(),
        };

        let own_rows = hand
            .iter()
            .map(|card| kb.row_index(card))
            .collect::<Result<HashSet<_>, _>>()?;

        for row in 0..kb.cards.len() {
            if own_rows.contains(&row) {
                for (column, cell) in kb.matrix[row].iter_mut().enumerate() {
                    *cell = TriState::from(column == owner.index());
                }
            } else {
                kb.matrix[row][owner.index()] = TriState::No;
            }
        }

        kb.propagate();
        Ok(kb)
    }

    pub fn owner(&self) -> Seat {
        self.owner
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// `seat` definitively holds `card`.
    pub fn note_has_card(&mut self, seat: Seat, card: &Card) -> Result<(), KnowledgeError> {
        let row = self.row_index(card)?;
        let column = self.seat_column(seat)?;
        for (index, cell) in self.matrix[row].iter_mut().enumerate() {
            *cell = TriState::from(index == column);
        }
        self.refuted.insert(row);
        event!(
            target: "clue_core::knowledge",
            Level::TRACE,
            owner = %self.owner,
            holder = %seat,
            card = %card.key(),
            "has card"
        );
        self.propagate();
        Ok(())
    }

    /// `seat` holds none of `cards`. Proven cells are never downgraded.
    pub fn note_cannot_have_any(&mut self, seat: Seat, cards: &[Card]) -> Result<(), KnowledgeError> {
        let column = self.seat_column(seat)?;
        let rows = self.row_indices(cards)?;
        for row in rows {
            let cell = &mut self.matrix[row][column];
            if !cell.is_yes() {
                *cell = TriState::No;
            }
        }
        event!(
            target: "clue_core::knowledge",
            Level::TRACE,
            owner = %self.owner,
            holder = %seat,
            cards = cards.len(),
            "cannot have any"
        );
        self.propagate();
        Ok(())
    }

    /// `seat` showed one of `cards` to someone else. Only nudges probabilities.
    pub fn note_has_one_of(&mut self, seat: Seat, cards: &[Card]) -> Result<(), KnowledgeError> {
        let column = self.seat_column(seat)?;
        let unknown: Vec<usize> = self
            .row_indices(cards)?
            .into_iter()
            .filter(|row| self.matrix[*row][column].is_unknown())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }

        let bump = 1.0 / unknown.len() as f64;
        for row in unknown {
            self.nudges[seat.index()][row] += bump;
        }
        self.propagate();
        Ok(())
    }

    /// Records that the owner revealed `card` from its own hand to `viewer`.
    pub fn note_shown_to(&mut self, viewer: Seat, card: &Card) -> Result<(), KnowledgeError> {
        let row = self.row_index(card)?;
        self.seat_column(viewer)?;
        self.shown_to.insert((viewer, row));
        self.refuted.insert(row);
        Ok(())
    }

    /// Runs exclusivity and category closure until nothing changes, then
    /// recomputes the probability tables. Returns whether any cell changed.
    pub fn propagate(&mut self) -> bool {
        let mut changed = false;
        loop {
            let mut pass = false;
            pass |= self.enforce_exclusivity();
            pass |= self.enforce_category_closure();
            if !pass {
                break;
            }
            changed = true;
        }
        self.refresh_contradictions();
        self.recompute_probabilities();
        changed
    }

    pub fn cell(&self, holder: Holder, card: &Card) -> TriState {
        let Some(row) = self.index.get(card) else {
            return TriState::Unknown;
        };
        let column = match holder {
            Holder::Player(seat) if seat.index() < self.players.len() => seat.index(),
            Holder::Player(_) => return TriState::Unknown,
            Holder::Envelope => self.envelope_column(),
        };
        self.matrix[*row][column]
    }

    pub fn holder_of(&self, card: &Card) -> Option<Holder> {
        let row = *self.index.get(card)?;
        let column = self.matrix[row].iter().position(|cell| cell.is_yes())?;
        Some(self.holder_at(column))
    }

    pub fn is_known_to_player(&self, seat: Seat, card: &Card) -> TriState {
        self.cell(Holder::Player(seat), card)
    }

    pub fn has_been_refuted_before(&self, card: &Card) -> bool {
        self.index
            .get(card)
            .is_some_and(|row| self.refuted.contains(row))
    }

    pub fn was_shown_to(&self, viewer: Seat, card: &Card) -> bool {
        self.index
            .get(card)
            .is_some_and(|row| self.shown_to.contains(&(viewer, *row)))
    }

    /// Cards whose envelope cell is open and that no player is proven to hold.
    pub fn possible_in_envelope(&self, category: Category) -> Vec<Card> {
        self.catalog
            .category_cards(category)
            .into_iter()
            .filter(|card| {
                !self.cell(Holder::Envelope, card).is_no()
                    && !matches!(self.holder_of(card), Some(Holder::Player(_)))
            })
            .collect()
    }

    /// The solution, when every category has exactly one card proven in the envelope.
    pub fn confirmed_solution(&self) -> Option<Solution> {
        let proven = |category: Category| {
            let mut cards: Vec<Card> = self
                .catalog
                .category_cards(category)
                .into_iter()
                .filter(|card| self.cell(Holder::Envelope, card).is_yes())
                .collect();
            (cards.len() == 1).then(|| cards.remove(0))
        };
        Some(Solution::new(
            proven(Category::Suspect)?,
            proven(Category::Weapon)?,
            proven(Category::Room)?,
        ))
    }

    /// The solution, when every category has a single surviving candidate.
    pub fn current_solution_guess(&self) -> Option<Solution> {
        let single = |category: Category| {
            let mut cards = self.possible_in_envelope(category);
            (cards.len() == 1).then(|| cards.remove(0))
        };
        Some(Solution::new(
            single(Category::Suspect)?,
            single(Category::Weapon)?,
            single(Category::Room)?,
        ))
    }

    pub fn probability(&self, seat: Seat, card: &Card) -> f64 {
        match (self.prob_matrix.get(seat.index()), self.index.get(card)) {
            (Some(row), Some(card_index)) => row[*card_index],
            _ => 0.0,
        }
    }

    pub fn envelope_probability(&self, card: &Card) -> f64 {
        self.index
            .get(card)
            .map(|row| self.envelope_probs[*row])
            .unwrap_or(0.0)
    }

    /// Total probability mass assigned to `card` across every holder.
    pub fn row_mass(&self, card: &Card) -> f64 {
        let players: f64 = (0..self.players.len())
            .map(|seat| self.probability(Seat(seat), card))
            .sum();
        players + self.envelope_probability(card)
    }

    /// Envelope probabilities normalized within `category`, in catalog order.
    pub fn category_distribution(&self, category: Category) -> Vec<(Card, f64)> {
        let cards = self.catalog.category_cards(category);
        let total: f64 = cards.iter().map(|card| self.envelope_probability(card)).sum();
        cards
            .into_iter()
            .map(|card| {
                let mass = self.envelope_probability(&card);
                let share = if total > 0.0 { mass / total } else { 0.0 };
                (card, share)
            })
            .collect()
    }

    /// Number of players whose cell for `card` is still unknown.
    pub fn unknown_holders(&self, card: &Card) -> usize {
        let Some(row) = self.index.get(card) else {
            return 0;
        };
        self.matrix[*row][..self.players.len()]
            .iter()
            .filter(|cell| cell.is_unknown())
            .count()
    }

    pub fn refuted_count(&self) -> usize {
        self.refuted.len()
    }

    /// Share of non-solution cards that have been shown at least once.
    pub fn refuted_fraction(&self) -> f64 {
        let pool = self.cards.len().saturating_sub(Category::ALL.len()).max(1);
        (self.refuted.len() as f64 / pool as f64).min(1.0)
    }

    /// Share of non-solution envelope slots already ruled out.
    pub fn elimination_progress(&self) -> f64 {
        let envelope = self.envelope_column();
        let ruled_out = self
            .matrix
            .iter()
            .filter(|row| row[envelope].is_no())
            .count();
        let pool = self.cards.len().saturating_sub(Category::ALL.len()).max(1);
        (ruled_out as f64 / pool as f64).min(1.0)
    }

    /// Cards for which the observations admit no consistent holder, plus the
    /// cards of any category that cannot place exactly one card in the envelope.
    pub fn contradictions(&self) -> Vec<Card> {
        self.contradictions
            .iter()
            .map(|row| self.cards[*row].clone())
            .collect()
    }

    pub fn is_consistent(&self) -> bool {
        self.contradictions.is_empty()
    }

    fn enforce_exclusivity(&mut self) -> bool {
        let mut changed = false;
        for row in self.matrix.iter_mut() {
            let proven = row.iter().filter(|cell| cell.is_yes()).count();
            if proven == 1 {
                for cell in row.iter_mut().filter(|cell| cell.is_unknown()) {
                    *cell = TriState::No;
                    changed = true;
                }
                continue;
            }
            if proven > 1 {
                continue;
            }

            let open: Vec<usize> = row
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_no())
                .map(|(column, _)| column)
                .collect();
            if let [only] = open.as_slice() {
                row[*only] = TriState::Yes;
                changed = true;
            }
        }
        changed
    }

    fn enforce_category_closure(&mut self) -> bool {
        let envelope = self.envelope_column();
        let mut changed = false;
        for category in Category::ALL {
            let rows = self.category_rows(category);
            let proven: Vec<usize> = rows
                .iter()
                .copied()
                .filter(|row| self.matrix[*row][envelope].is_yes())
                .collect();

            match proven.as_slice() {
                [winner] => {
                    for row in rows.iter().copied().filter(|row| row != winner) {
                        if self.matrix[row][envelope].is_unknown() {
                            self.matrix[row][envelope] = TriState::No;
                            changed = true;
                        }
                    }
                }
                [] => {
                    let open: Vec<usize> = rows
                        .iter()
                        .copied()
                        .filter(|row| !self.matrix[*row][envelope].is_no())
                        .collect();
                    if let [only] = open.as_slice() {
                        self.matrix[*only][envelope] = TriState::Yes;
                        changed = true;
                    }
                }
                _ => {}
            }
        }
        changed
    }

    fn refresh_contradictions(&mut self) {
        let envelope = self.envelope_column();
        let mut found = BTreeSet::new();
        for (row, cells) in self.matrix.iter().enumerate() {
            let proven = cells.iter().filter(|cell| cell.is_yes()).count();
            if proven > 1 || cells.iter().all(|cell| cell.is_no()) {
                found.insert(row);
            }
        }
        for row in found.difference(&self.contradictions) {
            event!(
                target: "clue_core::knowledge",
                Level::WARN,
                owner = %self.owner,
                card = %self.cards[*row].key(),
                "observations leave no consistent holder"
            );
        }

        // The envelope holds exactly one card per category.
        let mut conflicted = BTreeSet::new();
        for category in Category::ALL {
            let rows = self.category_rows(category);
            let proven: Vec<usize> = rows
                .iter()
                .copied()
                .filter(|row| self.matrix[*row][envelope].is_yes())
                .collect();
            let offending = if proven.len() > 1 {
                proven
            } else if rows.iter().all(|row| self.matrix[*row][envelope].is_no()) {
                rows
            } else {
                continue;
            };
            if !self.conflicted.contains(&category) {
                event!(
                    target: "clue_core::knowledge",
                    Level::WARN,
                    owner = %self.owner,
                    category = %category,
                    envelope_cards = offending.len(),
                    "observations leave no consistent envelope card"
                );
            }
            found.extend(offending);
            conflicted.insert(category);
        }

        self.contradictions = found;
        self.conflicted = conflicted;
    }

    fn recompute_probabilities(&mut self) {
        let envelope = self.envelope_column();
        let players = self.players.len();
        for row in 0..self.cards.len() {
            let cells = &self.matrix[row];

            if let Some(holder) = (0..players).find(|seat| cells[*seat].is_yes()) {
                for seat in 0..players {
                    self.prob_matrix[seat][row] = if seat == holder { 1.0 } else { 0.0 };
                    self.nudges[seat][row] = 0.0;
                }
                self.envelope_probs[row] = 0.0;
                continue;
            }

            if cells[envelope].is_yes() || cells[..players].iter().all(|cell| cell.is_no()) {
                for seat in 0..players {
                    self.prob_matrix[seat][row] = 0.0;
                    self.nudges[seat][row] = 0.0;
                }
                self.envelope_probs[row] = if cells[envelope].is_no() { 0.0 } else { 1.0 };
                continue;
            }

            let slots = cells.iter().filter(|cell| cell.is_unknown()).count().max(1);
            let share = 1.0 / slots as f64;
            for seat in 0..players {
                if cells[seat].is_unknown() {
                    self.prob_matrix[seat][row] =
                        (share + self.nudges[seat][row]).clamp(0.0, 1.0);
                } else {
                    self.prob_matrix[seat][row] = 0.0;
                    self.nudges[seat][row] = 0.0;
                }
            }
            self.envelope_probs[row] = if cells[envelope].is_unknown() {
                share
            } else {
                0.0
            };
        }
    }

    fn category_rows(&self, category: Category) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.category == category)
            .map(|(row, _)| row)
            .collect()
    }

    fn envelope_column(&self) -> usize {
        self.players.len()
    }

    fn holder_at(&self, column: usize) -> Holder {
        if column == self.envelope_column() {
            Holder::Envelope
        } else {
            Holder::Player(Seat(column))
        }
    }

    fn row_index(&self, card: &Card) -> Result<usize, KnowledgeError> {
        self.index
            .get(card)
            .copied()
            .ok_or_else(|| KnowledgeError::UnknownCard(card.key()))
    }

    fn row_indices(&self, cards: &[Card]) -> Result<Vec<usize>, KnowledgeError> {
        cards.iter().map(|card| self.row_index(card)).collect()
    }

    fn seat_column(&self, seat: Seat) -> Result<usize, KnowledgeError> {
        if seat.index() < self.players.len() {
            Ok(seat.index())
        } else {
            Err(KnowledgeError::UnknownSeat {
                seat,
                players: self.players.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn roster() -> Vec<String> {
        vec!["P0".into(), "P1".into(), "P2".into()]
    }

    fn owner_hand() -> Hand {
        Hand::with_cards(vec![
            Card::suspect("Miss Scarlet"),
            Card::weapon("Dagger"),
            Card::room("Kitchen"),
        ])
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::initialize(Seat(0), &roster(), &Catalog::classic(), &owner_hand())
            .expect("valid knowledge base")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn initialize_marks_own_hand_and_column() {
        let kb = kb();
        let scarlet = Card::suspect("Miss Scarlet");
        assert_eq!(kb.holder_of(&scarlet), Some(Holder::Player(Seat(0))));
        assert!(kb.cell(Holder::Envelope, &scarlet).is_no());
        assert!(kb.cell(Holder::Player(Seat(1)), &scarlet).is_no());
        assert_close(kb.probability(Seat(0), &scarlet), 1.0);
        assert_close(kb.envelope_probability(&scarlet), 0.0);

        let plum = Card::suspect("Professor Plum");
        assert!(kb.cell(Holder::Player(Seat(0)), &plum).is_no());
        assert!(kb.cell(Holder::Player(Seat(1)), &plum).is_unknown());
        assert_close(kb.probability(Seat(1), &plum), 1.0 / 3.0);
        assert_close(kb.envelope_probability(&plum), 1.0 / 3.0);
        assert!(kb.is_consistent());
    }

    #[test]
    fn initialize_rejects_card_outside_catalog() {
        let hand = Hand::with_cards(vec![Card::room("Garage")]);
        let err = KnowledgeBase::initialize(Seat(0), &roster(), &Catalog::classic(), &hand)
            .expect_err("unknown card");
        assert_eq!(err, KnowledgeError::UnknownCard("Room:Garage".into()));
    }

    #[test]
    fn initialize_rejects_owner_outside_roster() {
        let err = KnowledgeBase::initialize(Seat(3), &roster(), &Catalog::classic(), &owner_hand())
            .expect_err("bad owner");
        assert!(matches!(err, KnowledgeError::UnknownSeat { .. }));
    }

    #[test]
    fn has_card_is_exclusive_and_concentrates_mass() {
        let mut kb = kb();
        let rope = Card::weapon("Rope");
        kb.note_has_card(Seat(2), &rope).expect("note");

        assert_eq!(kb.holder_of(&rope), Some(Holder::Player(Seat(2))));
        assert!(kb.cell(Holder::Player(Seat(1)), &rope).is_no());
        assert!(kb.cell(Holder::Envelope, &rope).is_no());
        assert_close(kb.probability(Seat(2), &rope), 1.0);
        assert_close(kb.probability(Seat(1), &rope), 0.0);
        assert_close(kb.envelope_probability(&rope), 0.0);
        assert!(kb.has_been_refuted_before(&rope));
    }

    #[test]
    fn cannot_have_any_never_downgrades_proven_cell() {
        let mut kb = kb();
        let hall = Card::room("Hall");
        kb.note_has_card(Seat(1), &hall).expect("note");
        kb.note_cannot_have_any(Seat(1), &[hall.clone(), Card::room("Study")])
            .expect("note");

        assert_eq!(kb.holder_of(&hall), Some(Holder::Player(Seat(1))));
        assert!(kb.cell(Holder::Player(Seat(1)), &Card::room("Study")).is_no());
    }

    #[test]
    fn every_player_ruled_out_forces_envelope_and_closes_category() {
        let mut kb = kb();
        let rope = Card::weapon("Rope");
        kb.note_cannot_have_any(Seat(1), &[rope.clone()]).expect("note");
        kb.note_cannot_have_any(Seat(2), &[rope.clone()]).expect("note");

        assert_eq!(kb.holder_of(&rope), Some(Holder::Envelope));
        assert_close(kb.envelope_probability(&rope), 1.0);
        for sibling in kb.catalog().category_cards(Category::Weapon) {
            if sibling != rope {
                assert!(kb.cell(Holder::Envelope, &sibling).is_no(), "{sibling}");
            }
        }

        let wrench = Card::weapon("Wrench");
        assert_close(kb.envelope_probability(&wrench), 0.0);
        assert_close(kb.probability(Seat(1), &wrench), 0.5);
        assert_eq!(kb.possible_in_envelope(Category::Weapon), vec![rope]);
    }

    #[test]
    fn last_envelope_candidate_is_forced_true() {
        let mut kb = kb();
        let shown = [
            (Seat(1), "Colonel Mustard"),
            (Seat(2), "Mrs. White"),
            (Seat(1), "Mr. Green"),
            (Seat(2), "Mrs. Peacock"),
        ];
        for (seat, name) in shown {
            kb.note_has_card(seat, &Card::suspect(name)).expect("note");
        }

        let plum = Card::suspect("Professor Plum");
        assert!(kb.cell(Holder::Envelope, &plum).is_yes());
        assert!(kb.cell(Holder::Player(Seat(1)), &plum).is_no());
        assert!(kb.cell(Holder::Player(Seat(2)), &plum).is_no());
        assert_eq!(kb.holder_of(&plum), Some(Holder::Envelope));
        assert_eq!(kb.possible_in_envelope(Category::Suspect), vec![plum]);
    }

    #[test]
    fn soft_nudge_is_additive_and_clamped_without_renormalizing() {
        let mut kb = kb();
        let suggestion = [
            Card::suspect("Professor Plum"),
            Card::weapon("Rope"),
            Card::room("Study"),
        ];
        let plum = &suggestion[0];

        kb.note_has_one_of(Seat(1), &suggestion).expect("note");
        assert_close(kb.probability(Seat(1), plum), 2.0 / 3.0);
        assert_close(kb.probability(Seat(2), plum), 1.0 / 3.0);
        assert_close(kb.envelope_probability(plum), 1.0 / 3.0);
        assert_close(kb.row_mass(plum), 4.0 / 3.0);
        assert!(kb.cell(Holder::Player(Seat(1)), plum).is_unknown());

        kb.note_has_one_of(Seat(1), &suggestion).expect("note");
        kb.note_has_one_of(Seat(1), &suggestion).expect("note");
        assert_close(kb.probability(Seat(1), plum), 1.0);
    }

    #[test]
    fn soft_nudge_only_counts_unknown_cells() {
        let mut kb = kb();
        let study = Card::room("Study");
        kb.note_cannot_have_any(Seat(1), &[study.clone()]).expect("note");
        let suggestion = [Card::suspect("Mr. Green"), Card::weapon("Wrench"), study.clone()];
        kb.note_has_one_of(Seat(1), &suggestion).expect("note");

        assert_close(kb.probability(Seat(1), &suggestion[0]), 1.0 / 3.0 + 0.5);
        assert_close(kb.probability(Seat(1), &study), 0.0);
    }

    #[test]
    fn hard_resolution_discards_soft_nudge() {
        let mut kb = kb();
        let plum = Card::suspect("Professor Plum");
        kb.note_has_one_of(Seat(1), &[plum.clone()]).expect("note");
        assert_close(kb.probability(Seat(1), &plum), 1.0);

        kb.note_has_card(Seat(2), &plum).expect("note");
        assert_close(kb.probability(Seat(1), &plum), 0.0);
        assert_close(kb.probability(Seat(2), &plum), 1.0);
        assert_close(kb.row_mass(&plum), 1.0);
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut kb = kb();
        kb.note_has_card(Seat(1), &Card::weapon("Rope")).expect("note");
        kb.note_cannot_have_any(Seat(2), &[Card::room("Hall"), Card::suspect("Mr. Green")])
            .expect("note");
        kb.note_has_one_of(Seat(2), &[Card::room("Study"), Card::weapon("Wrench")])
            .expect("note");

        let before = kb.clone();
        assert!(!kb.propagate());
        assert_eq!(before.matrix, kb.matrix);
        assert_eq!(before.prob_matrix, kb.prob_matrix);
        assert_eq!(before.envelope_probs, kb.envelope_probs);
    }

    #[test]
    fn confirmed_solution_requires_every_category() {
        let mut kb = kb();
        for card in [
            Card::suspect("Professor Plum"),
            Card::weapon("Rope"),
            Card::room("Study"),
        ] {
            assert!(kb.confirmed_solution().is_none());
            kb.note_cannot_have_any(Seat(1), &[card.clone()]).expect("note");
            kb.note_cannot_have_any(Seat(2), &[card]).expect("note");
        }
        let solution = kb.confirmed_solution().expect("confirmed");
        assert_eq!(solution.room, Card::room("Study"));
        assert_eq!(kb.current_solution_guess(), Some(solution));
    }

    #[test]
    fn category_distribution_sums_to_one() {
        let mut kb = kb();
        kb.note_has_card(Seat(1), &Card::room("Hall")).expect("note");
        let distribution = kb.category_distribution(Category::Room);
        let total: f64 = distribution.iter().map(|(_, p)| p).sum();
        assert_close(total, 1.0);
        let hall = distribution
            .iter()
            .find(|(card, _)| card.name == "Hall")
            .expect("hall");
        assert_close(hall.1, 0.0);
    }

    #[test]
    fn shown_to_ledger_tracks_viewer() {
        let mut kb = kb();
        let dagger = Card::weapon("Dagger");
        assert!(!kb.was_shown_to(Seat(1), &dagger));
        kb.note_shown_to(Seat(1), &dagger).expect("note");
        assert!(kb.was_shown_to(Seat(1), &dagger));
        assert!(!kb.was_shown_to(Seat(2), &dagger));
        assert!(kb.has_been_refuted_before(&dagger));
    }

    #[test]
    fn unknown_seat_is_rejected() {
        let mut kb = kb();
        let err = kb
            .note_has_card(Seat(9), &Card::weapon("Rope"))
            .expect_err("bad seat");
        assert!(matches!(err, KnowledgeError::UnknownSeat { .. }));
    }

    #[test]
    fn two_forced_envelope_cards_in_one_category_are_flagged() {
        let mut kb = kb();
        let plum = Card::suspect("Professor Plum");
        let green = Card::suspect("Mr. Green");
        kb.note_cannot_have_any(Seat(2), &[plum.clone(), green.clone()])
            .expect("note");
        assert!(kb.is_consistent());

        kb.note_cannot_have_any(Seat(1), &[plum.clone(), green.clone()])
            .expect("note");
        assert!(kb.cell(Holder::Envelope, &plum).is_yes());
        assert!(kb.cell(Holder::Envelope, &green).is_yes());
        assert!(!kb.is_consistent());
        assert_eq!(kb.contradictions(), vec![green, plum]);
        assert_eq!(kb.confirmed_solution(), None);
    }

    #[test]
    fn category_with_every_envelope_cell_ruled_out_is_flagged() {
        let mut kb = kb();
        let green = Card::suspect("Mr. Green");
        kb.note_cannot_have_any(Seat(1), std::slice::from_ref(&green))
            .expect("note");
        kb.note_cannot_have_any(Seat(2), std::slice::from_ref(&green))
            .expect("note");
        assert!(kb.cell(Holder::Envelope, &green).is_yes());
        assert!(kb.is_consistent());

        kb.note_has_card(Seat(1), &green).expect("note");
        let flagged = kb.contradictions();
        assert_eq!(flagged.len(), 6);
        assert!(flagged.iter().all(|card| card.category == Category::Suspect));
    }

    #[test]
    fn row_without_any_holder_is_flagged() {
        let mut kb = kb();
        let plum = Card::suspect("Professor Plum");
        let row = kb.index[&plum];
        kb.matrix[row].fill(TriState::No);
        kb.propagate();
        assert!(kb.contradictions().contains(&plum));
        assert!(!kb.is_consistent());
    }
}
