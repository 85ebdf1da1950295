use crate::model::card::Card;
use crate::model::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

const CLASSIC_SUSPECTS: [&str; 6] = [
    "Miss Scarlet",
    "Colonel Mustard",
    "Mrs. White",
    "Mr. Green",
    "Mrs. Peacock",
    "Professor Plum",
];

const CLASSIC_WEAPONS: [&str; 6] = [
    "Candlestick",
    "Dagger",
    "Lead Pipe",
    "Revolver",
    "Rope",
    "Wrench",
];

const CLASSIC_ROOMS: [&str; 9] = [
    "Kitchen",
    "Ballroom",
    "Conservatory",
    "Dining Room",
    "Billiard Room",
    "Library",
    "Lounge",
    "Hall",
    "Study",
];

/// Immutable reference table of every card, grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    suspects: Vec<String>,
    weapons: Vec<String>,
    rooms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("category {0} has no cards")]
    EmptyCategory(Category),
    #[error("card {0} is listed more than once")]
    DuplicateCard(String),
    #[error("card name in category {0} is blank")]
    BlankName(Category),
}

impl Catalog {
    pub fn classic() -> Self {
        Self {
            suspects: CLASSIC_SUSPECTS.iter().map(|s| s.to_string()).collect(),
            weapons: CLASSIC_WEAPONS.iter().map(|s| s.to_string()).collect(),
            rooms: CLASSIC_ROOMS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn new(
        suspects: Vec<String>,
        weapons: Vec<String>,
        rooms: Vec<String>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            suspects,
            weapons,
            rooms,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for category in Category::ALL {
            let names = self.names(category);
            if names.is_empty() {
                return Err(CatalogError::EmptyCategory(category));
            }
            for name in names {
                if name.trim().is_empty() {
                    return Err(CatalogError::BlankName(category));
                }
                let card = Card::new(category, name.clone());
                if !seen.insert(card.key()) {
                    return Err(CatalogError::DuplicateCard(card.key()));
                }
            }
        }
        Ok(())
    }

    pub fn names(&self, category: Category) -> &[String] {
        match category {
            Category::Suspect => &self.suspects,
            Category::Weapon => &self.weapons,
            Category::Room => &self.rooms,
        }
    }

    pub fn category_cards(&self, category: Category) -> Vec<Card> {
        self.names(category)
            .iter()
            .map(|name| Card::new(category, name.clone()))
            .collect()
    }

    /// Every card in category order (suspects, weapons, rooms).
    pub fn cards(&self) -> Vec<Card> {
        Category::ALL
            .iter()
            .flat_map(|category| self.category_cards(*category))
            .collect()
    }

    pub fn category_len(&self, category: Category) -> usize {
        self.names(category).len()
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.category_len(*c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.names(card.category).iter().any(|name| *name == card.name)
    }

    /// Looks up a card by its `category:name` key.
    pub fn card_by_key(&self, key: &str) -> Option<Card> {
        let (category, name) = key.split_once(':')?;
        let card = Card::new(Category::from_str(category)?, name);
        self.contains(&card).then_some(card)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::classic()
    }
}
