use crate::knowledge::KnowledgeBase;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::seat::Seat;
use crate::model::solution::Solution;
use core::fmt;
use rand::RngCore;

/// Decision-making interface for automated agents.
pub trait Strategy: Send {
    /// Pick which of `candidates` (all in our hand) to reveal to `requester`.
    fn card_to_show(
        &mut self,
        knowledge: &KnowledgeBase,
        requester: Seat,
        candidates: &[Card],
        rng: &mut dyn RngCore,
    ) -> Option<Card>;

    /// Pick this turn's suggestion.
    fn choose_suggestion(&mut self, knowledge: &KnowledgeBase, rng: &mut dyn RngCore) -> Solution;

    /// Accuse now, or decline with `None`.
    fn choose_accusation(&mut self, knowledge: &KnowledgeBase) -> Option<Solution>;

    /// Called on every automated agent when nobody could refute `suggestion`.
    fn observe_unrefuted(&mut self, _suggester: Seat, _suggestion: &Solution) {}

    fn label(&self) -> &str {
        "strategy"
    }
}

/// Request sent to the human-facing collaborator when a human must refute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealRequest {
    pub revealer: Seat,
    pub suggester: Seat,
    pub suggester_name: String,
    pub candidates: Vec<Card>,
}

/// Blocking "choose one of these cards" boundary. `None` means declined.
pub trait RevealPrompt {
    fn choose_reveal(&mut self, request: &RevealRequest) -> Option<Card>;
}

impl<F> RevealPrompt for F
where
    F: FnMut(&RevealRequest) -> Option<Card>,
{
    fn choose_reveal(&mut self, request: &RevealRequest) -> Option<Card> {
        self(request)
    }
}

pub enum AgentKind {
    Human,
    Automated {
        knowledge: KnowledgeBase,
        strategy: Box<dyn Strategy>,
    },
}

impl fmt::Debug for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Human => f.write_str("Human"),
            AgentKind::Automated { strategy, .. } => f
                .debug_struct("Automated")
                .field("strategy", &strategy.label())
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug)]
pub struct Agent {
    pub(crate) name: String,
    pub(crate) hand: Hand,
    pub(crate) active: bool,
    pub(crate) kind: AgentKind,
}

impl Agent {
    pub fn human(name: impl Into<String>, hand: Hand) -> Self {
        Self {
            name: name.into(),
            hand,
            active: true,
            kind: AgentKind::Human,
        }
    }

    pub fn automated(
        name: impl Into<String>,
        hand: Hand,
        knowledge: KnowledgeBase,
        strategy: Box<dyn Strategy>,
    ) -> Self {
        Self {
            name: name.into(),
            hand,
            active: true,
            kind: AgentKind::Automated {
                knowledge,
                strategy,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, AgentKind::Human)
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn knowledge(&self) -> Option<&KnowledgeBase> {
        match &self.kind {
            AgentKind::Automated { knowledge, .. } => Some(knowledge),
            AgentKind::Human => None,
        }
    }
}
