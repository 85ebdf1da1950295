use crate::model::category::Category;
use core::fmt;
use serde::{Deserialize, Serialize};

/// An immutable card. Identity is the `(category, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub category: Category,
    pub name: String,
}

impl Card {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    pub fn suspect(name: impl Into<String>) -> Self {
        Self::new(Category::Suspect, name)
    }

    pub fn weapon(name: impl Into<String>) -> Self {
        Self::new(Category::Weapon, name)
    }

    pub fn room(name: impl Into<String>) -> Self {
        Self::new(Category::Room, name)
    }

    /// Stable `category:name` key.
    pub fn key(&self) -> String {
        format!("{}:{}", self.category, self.name)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
