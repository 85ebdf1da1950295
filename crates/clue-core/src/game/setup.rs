use super::error::SetupError;
use crate::model::catalog::Catalog;
use crate::model::category::Category;
use std::collections::HashSet;

/// Roster, catalog and seed for a new game. The human, if any, sits first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub human: Option<String>,
    pub automated: Vec<String>,
    pub seed: Option<u64>,
    pub catalog: Catalog,
}

impl GameSetup {
    /// One human named `human` and `ai_count` automated players named `AI 1`, `AI 2`, ...
    pub fn classic(human: impl Into<String>, ai_count: usize) -> Self {
        Self {
            human: Some(human.into()),
            automated: automated_names(ai_count),
            seed: None,
            catalog: Catalog::classic(),
        }
    }

    pub fn all_automated(count: usize) -> Self {
        Self {
            human: None,
            automated: automated_names(count),
            seed: None,
            catalog: Catalog::classic(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Seating order.
    pub fn roster(&self) -> Vec<String> {
        self.human
            .iter()
            .cloned()
            .chain(self.automated.iter().cloned())
            .collect()
    }

    pub fn player_count(&self) -> usize {
        self.roster().len()
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        self.catalog.validate()?;
        let roster = self.roster();
        if roster.len() < 2 {
            return Err(SetupError::RosterTooSmall(roster.len()));
        }
        let mut seen = HashSet::new();
        for name in &roster {
            if name.trim().is_empty() || !seen.insert(name.as_str()) {
                return Err(SetupError::InvalidName(name.clone()));
            }
        }
        let dealt = self.catalog.len().saturating_sub(Category::ALL.len());
        if dealt < roster.len() {
            return Err(SetupError::CatalogTooSmall {
                cards: dealt,
                players: roster.len(),
            });
        }
        Ok(())
    }
}

impl Default for GameSetup {
    fn default() -> Self {
        Self::classic("You", 2)
    }
}

fn automated_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("AI {i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_roster_seats_human_first() {
        let setup = GameSetup::classic("You", 3);
        assert_eq!(setup.roster(), vec!["You", "AI 1", "AI 2", "AI 3"]);
        assert!(setup.validate().is_ok());
    }

    #[test]
    fn rejects_single_player() {
        let setup = GameSetup::classic("You", 0);
        assert_eq!(setup.validate(), Err(SetupError::RosterTooSmall(1)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut setup = GameSetup::all_automated(2);
        setup.human = Some("AI 2".into());
        assert_eq!(setup.validate(), Err(SetupError::InvalidName("AI 2".into())));
    }

    #[test]
    fn rejects_catalog_that_leaves_a_player_empty_handed() {
        let tiny = Catalog::new(
            vec!["Ann".into()],
            vec!["Rope".into(), "Dagger".into()],
            vec!["Hall".into(), "Study".into()],
        )
        .expect("catalog");
        let setup = GameSetup::all_automated(2).with_catalog(tiny.clone());
        assert!(setup.validate().is_ok());

        let setup = GameSetup::all_automated(3).with_catalog(tiny);
        assert_eq!(
            setup.validate(),
            Err(SetupError::CatalogTooSmall {
                cards: 2,
                players: 3
            })
        );
    }
}
