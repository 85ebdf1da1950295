use crate::model::card::Card;
use crate::model::catalog::Catalog;
use crate::model::category::Category;
use core::fmt;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One card per category. Used for the hidden solution, suggestions and accusations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solution {
    pub suspect: Card,
    pub weapon: Card,
    pub room: Card,
}

impl Solution {
    pub fn new(suspect: Card, weapon: Card, room: Card) -> Self {
        Self {
            suspect,
            weapon,
            room,
        }
    }

    /// Draws one card uniformly at random per category.
    pub fn draw<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<Self> {
        let mut pick = |category: Category| {
            catalog
                .category_cards(category)
                .choose(&mut *rng)
                .cloned()
        };
        Some(Self::new(
            pick(Category::Suspect)?,
            pick(Category::Weapon)?,
            pick(Category::Room)?,
        ))
    }

    pub fn cards(&self) -> [&Card; 3] {
        [&self.suspect, &self.weapon, &self.room]
    }

    pub fn card(&self, category: Category) -> &Card {
        match category {
            Category::Suspect => &self.suspect,
            Category::Weapon => &self.weapon,
            Category::Room => &self.room,
        }
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.card(card.category) == card
    }

    /// True when every slot holds a catalog card of the matching category.
    pub fn is_well_formed(&self, catalog: &Catalog) -> bool {
        Category::ALL.iter().all(|category| {
            let card = self.card(*category);
            card.category == *category && catalog.contains(card)
        })
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with the {} in the {}",
            self.suspect, self.weapon, self.room
        )
    }
}
