use super::params::BotParams;
use clue_core::knowledge::KnowledgeBase;
use clue_core::model::card::Card;
use clue_core::model::category::Category;
use clue_core::model::solution::Solution;

/// Which tier of the gate opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTier {
    Confirmed,
    UniqueCandidates,
    Bold,
    Confident,
}

impl GateTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            GateTier::Confirmed => "confirmed",
            GateTier::UniqueCandidates => "unique_candidates",
            GateTier::Bold => "bold",
            GateTier::Confident => "confident",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub accusation: Solution,
    pub tier: GateTier,
    pub progress: f64,
}

/// Top candidate of one category with its margin over the runner-up.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLead {
    pub card: Card,
    pub top: f64,
    pub lead: f64,
}

impl CategoryLead {
    /// Highest probability first; earlier catalog order wins ties.
    pub fn from_distribution(distribution: &[(Card, f64)]) -> Option<Self> {
        let mut best: Option<(&Card, f64)> = None;
        let mut runner_up = 0.0_f64;
        for (card, probability) in distribution {
            match best {
                Some((_, top)) if *probability <= top => {
                    runner_up = runner_up.max(*probability);
                }
                Some((_, top)) => {
                    runner_up = top;
                    best = Some((card, *probability));
                }
                None => best = Some((card, *probability)),
            }
        }
        let (card, top) = best?;
        (top > 0.0).then(|| CategoryLead {
            card: card.clone(),
            top,
            lead: top - runner_up,
        })
    }
}

/// Tiered accusation decision.
pub struct AccusationGate;

impl AccusationGate {
    pub fn evaluate(knowledge: &KnowledgeBase, params: &BotParams) -> Option<GateDecision> {
        let progress = knowledge.elimination_progress();

        if let Some(accusation) = knowledge.confirmed_solution() {
            return Some(GateDecision {
                accusation,
                tier: GateTier::Confirmed,
                progress,
            });
        }
        if let Some(accusation) = knowledge.current_solution_guess() {
            return Some(GateDecision {
                accusation,
                tier: GateTier::UniqueCandidates,
                progress,
            });
        }

        let leads = Self::leads(knowledge)?;
        let tier = if params.bold_enabled && Self::passes_bold(&leads, params) {
            GateTier::Bold
        } else if Self::passes_standard(&leads, progress, params) {
            GateTier::Confident
        } else {
            return None;
        };

        let [suspect, weapon, room] = leads;
        Some(GateDecision {
            accusation: Solution::new(suspect.card, weapon.card, room.card),
            tier,
            progress,
        })
    }

    /// Leaders per category in suspect, weapon, room order.
    pub fn leads(knowledge: &KnowledgeBase) -> Option<[CategoryLead; 3]> {
        let lead = |category| CategoryLead::from_distribution(&knowledge.category_distribution(category));
        Some([
            lead(Category::Suspect)?,
            lead(Category::Weapon)?,
            lead(Category::Room)?,
        ])
    }

    pub fn passes_bold(leads: &[CategoryLead], params: &BotParams) -> bool {
        let all_high = leads.iter().all(|lead| lead.top >= params.bold_top);
        let all_clear = leads
            .iter()
            .all(|lead| lead.top >= params.bold_strong_top && lead.lead >= params.bold_strong_lead);
        all_high || all_clear
    }

    pub fn passes_standard(leads: &[CategoryLead], progress: f64, params: &BotParams) -> bool {
        let min_top = params.min_top(progress);
        let min_lead = params.min_lead(progress);
        let joint: f64 = leads.iter().map(|lead| lead.top).product();
        leads
            .iter()
            .all(|lead| lead.top >= min_top && lead.lead >= min_lead)
            && joint >= params.min_joint(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clue_core::model::catalog::Catalog;
    use clue_core::model::hand::Hand;
    use clue_core::model::seat::Seat;

    fn lead(top: f64, lead: f64) -> CategoryLead {
        CategoryLead {
            card: Card::room("Hall"),
            top,
            lead,
        }
    }

    fn kb() -> KnowledgeBase {
        let hand = Hand::with_cards(vec![
            Card::suspect("Miss Scarlet"),
            Card::weapon("Dagger"),
            Card::room("Kitchen"),
        ]);
        let roster = vec!["P0".to_string(), "P1".to_string(), "P2".to_string()];
        KnowledgeBase::initialize(Seat(0), &roster, &Catalog::classic(), &hand).expect("kb")
    }

    #[test]
    fn lead_tracks_runner_up() {
        let distribution = vec![
            (Card::weapon("Rope"), 0.2),
            (Card::weapon("Wrench"), 0.5),
            (Card::weapon("Revolver"), 0.3),
        ];
        let lead = CategoryLead::from_distribution(&distribution).expect("lead");
        assert_eq!(lead.card, Card::weapon("Wrench"));
        assert!((lead.lead - 0.2).abs() < 1e-12);

        let tied = vec![(Card::weapon("Rope"), 0.5), (Card::weapon("Wrench"), 0.5)];
        let lead = CategoryLead::from_distribution(&tied).expect("lead");
        assert_eq!(lead.card, Card::weapon("Rope"));
        assert!(lead.lead.abs() < 1e-12);

        assert!(CategoryLead::from_distribution(&[(Card::weapon("Rope"), 0.0)]).is_none());
    }

    #[test]
    fn bold_accepts_either_shortcut() {
        let params = BotParams::default();
        assert!(AccusationGate::passes_bold(&[lead(0.9, 0.0), lead(0.86, 0.0), lead(0.85, 0.0)], &params));
        assert!(AccusationGate::passes_bold(&[lead(0.8, 0.45), lead(0.76, 0.4), lead(0.75, 0.5)], &params));
        assert!(!AccusationGate::passes_bold(&[lead(0.8, 0.45), lead(0.76, 0.3), lead(0.9, 0.5)], &params));
    }

    #[test]
    fn standard_gate_tightens_with_progress() {
        let params = BotParams::default();
        let leads = [lead(0.65, 0.15), lead(0.65, 0.15), lead(0.65, 0.15)];
        assert!(AccusationGate::passes_standard(&leads, 0.0, &params));
        assert!(!AccusationGate::passes_standard(&leads, 1.0, &params));

        let weak_joint = [lead(0.55, 0.1), lead(0.55, 0.1), lead(0.55, 0.1)];
        assert!(!AccusationGate::passes_standard(&weak_joint, 0.0, &params));
    }

    #[test]
    fn fresh_knowledge_stays_closed() {
        assert!(AccusationGate::evaluate(&kb(), &BotParams::default()).is_none());
    }

    #[test]
    fn confirmed_solution_opens_first_tier() {
        let mut kb = kb();
        for card in [
            Card::suspect("Professor Plum"),
            Card::weapon("Rope"),
            Card::room("Study"),
        ] {
            kb.note_cannot_have_any(Seat(1), &[card.clone()]).expect("note");
            kb.note_cannot_have_any(Seat(2), &[card]).expect("note");
        }
        let decision = AccusationGate::evaluate(&kb, &BotParams::default()).expect("open");
        assert_eq!(decision.tier, GateTier::Confirmed);
        assert_eq!(decision.accusation.weapon, Card::weapon("Rope"));
    }
}
