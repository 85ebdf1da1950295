use super::KnowledgeBase;
use crate::model::category::Category;
use crate::model::seat::Seat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProbability {
    pub card: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub category: Category,
    pub candidates: Vec<CandidateProbability>,
}

/// Top envelope candidates per category as seen by one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilitySnapshot {
    pub owner: Seat,
    pub refuted: usize,
    pub elimination_progress: f64,
    pub categories: Vec<CategorySnapshot>,
}

impl ProbabilitySnapshot {
    pub fn capture(kb: &KnowledgeBase, top_n: usize) -> Self {
        let categories = Category::ALL
            .iter()
            .map(|category| {
                let mut ranked = kb.category_distribution(*category);
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                ranked.truncate(top_n);
                CategorySnapshot {
                    category: *category,
                    candidates: ranked
                        .into_iter()
                        .map(|(card, probability)| CandidateProbability {
                            card: card.name,
                            probability,
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            owner: kb.owner(),
            refuted: kb.refuted_count(),
            elimination_progress: kb.elimination_progress(),
            categories,
        }
    }

    pub fn leader(&self, category: Category) -> Option<&CandidateProbability> {
        self.categories
            .iter()
            .find(|snapshot| snapshot.category == category)
            .and_then(|snapshot| snapshot.candidates.first())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::catalog::Catalog;
    use crate::model::hand::Hand;

    fn kb() -> KnowledgeBase {
        let players = vec!["You".to_string(), "AI 1".to_string()];
        let hand = Hand::with_cards(vec![Card::suspect("Mrs. White")]);
        KnowledgeBase::initialize(Seat(1), &players, &Catalog::classic(), &hand).expect("kb")
    }

    #[test]
    fn capture_truncates_and_ranks() {
        let mut kb = kb();
        kb.note_cannot_have_any(Seat(0), &[Card::weapon("Rope")])
            .expect("note");
        let snapshot = ProbabilitySnapshot::capture(&kb, 3);

        assert_eq!(snapshot.owner, Seat(1));
        assert!(snapshot.categories.iter().all(|c| c.candidates.len() <= 3));
        let leader = snapshot.leader(Category::Weapon).expect("weapon leader");
        assert_eq!(leader.card, "Rope");
        assert!((leader.probability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = ProbabilitySnapshot::capture(&kb(), 2);
        let json = snapshot.to_json().expect("json");
        assert!(json.contains("\"categories\""));
        let restored = ProbabilitySnapshot::from_json(&json).expect("restore");
        assert_eq!(restored.owner, snapshot.owner);
        assert_eq!(restored.categories.len(), 3);
        assert_eq!(
            restored.leader(Category::Room).map(|c| c.card.clone()),
            snapshot.leader(Category::Room).map(|c| c.card.clone())
        );
    }
}
