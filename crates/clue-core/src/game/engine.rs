use super::agent::{Agent, AgentKind, RevealPrompt, RevealRequest, Strategy};
use super::error::{ProtocolViolation, SetupError};
use super::log::GameLog;
use super::setup::GameSetup;
use crate::knowledge::{KnowledgeBase, KnowledgeError, ProbabilitySnapshot};
use crate::model::card::Card;
use crate::model::catalog::Catalog;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::seat::Seat;
use crate::model::solution::Solution;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{Level, event};

/// Turn pointer and game status. Mutated only by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnState {
    pub turn_index: usize,
    pub suggested_this_turn: bool,
    pub game_over: bool,
    pub winner: Option<Seat>,
    pub turns_taken: u32,
}

/// Result of a suggestion. `card` is only filled in for a human suggester.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionOutcome {
    pub shower: Option<Seat>,
    pub card: Option<Card>,
    pub passed: Vec<Seat>,
    pub declined: Vec<Seat>,
}

impl SuggestionOutcome {
    pub fn was_refuted(&self) -> bool {
        self.shower.is_some()
    }
}

/// What an automated agent did with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAction {
    Accused {
        accusation: Solution,
        correct: bool,
    },
    Suggested {
        suggestion: Solution,
        outcome: SuggestionOutcome,
    },
    Idle,
}

/// Owns the hidden solution, the roster and the turn state, and is the only
/// writer of observations into each automated agent's knowledge base.
pub struct GameEngine {
    catalog: Catalog,
    agents: Vec<Agent>,
    solution: Solution,
    turn: TurnState,
    log: GameLog,
    rng: StdRng,
    seed: u64,
    prompt: Option<Box<dyn RevealPrompt>>,
    solution_revealed: bool,
}

impl GameEngine {
    /// Draws the solution, shuffles and deals, then initializes every knowledge base.
    pub fn new<F>(setup: GameSetup, strategies: F) -> Result<Self, SetupError>
    where
        F: FnMut(Seat, &str) -> Box<dyn Strategy>,
    {
        setup.validate()?;
        let seed = setup.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let solution = Solution::draw(&setup.catalog, &mut rng)
            .ok_or_else(|| SetupError::MalformedSolution("<empty catalog>".into()))?;
        let mut deck = Deck::shuffled(&setup.catalog, &solution, &mut rng);
        let hands = deck.deal(setup.player_count());
        Self::assemble(setup, seed, rng, solution, hands, strategies)
    }

    /// Builds a game from a fixed solution and hands, one per seat.
    pub fn from_deal<F>(
        setup: GameSetup,
        solution: Solution,
        hands: Vec<Hand>,
        strategies: F,
    ) -> Result<Self, SetupError>
    where
        F: FnMut(Seat, &str) -> Box<dyn Strategy>,
    {
        setup.validate()?;
        if hands.len() != setup.player_count() {
            return Err(SetupError::HandCount {
                expected: setup.player_count(),
                found: hands.len(),
            });
        }
        validate_deal(&setup.catalog, &solution, &hands)?;
        let seed = setup.seed.unwrap_or(0);
        let rng = StdRng::seed_from_u64(seed);
        Self::assemble(setup, seed, rng, solution, hands, strategies)
    }

    fn assemble<F>(
        setup: GameSetup,
        seed: u64,
        rng: StdRng,
        solution: Solution,
        hands: Vec<Hand>,
        mut strategies: F,
    ) -> Result<Self, SetupError>
    where
        F: FnMut(Seat, &str) -> Box<dyn Strategy>,
    {
        let roster = setup.roster();
        let human_seats = usize::from(setup.human.is_some());
        let mut agents = Vec::with_capacity(roster.len());

        for (index, (name, hand)) in roster.iter().zip(hands).enumerate() {
            let seat = Seat(index);
            if index < human_seats {
                agents.push(Agent::human(name.clone(), hand));
                continue;
            }
            let knowledge = KnowledgeBase::initialize(seat, &roster, &setup.catalog, &hand)?;
            let strategy = strategies(seat, name.as_str());
            agents.push(Agent::automated(name.clone(), hand, knowledge, strategy));
        }

        let mut engine = Self {
            catalog: setup.catalog,
            agents,
            solution,
            turn: TurnState {
                turn_index: 0,
                suggested_this_turn: false,
                game_over: false,
                winner: None,
                turns_taken: 0,
            },
            log: GameLog::new(),
            rng,
            seed,
            prompt: None,
            solution_revealed: false,
        };

        event!(
            target: "clue_core::engine",
            Level::INFO,
            seed,
            players = roster.len(),
            "game dealt"
        );
        engine.log(format!("Game started with players: {}.", roster.join(", ")));
        Ok(engine)
    }

    /// Attaches the collaborator asked to pick a card when a human must refute.
    pub fn set_prompt(&mut self, prompt: Box<dyn RevealPrompt>) {
        self.prompt = Some(prompt);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, seat: Seat) -> Option<&Agent> {
        self.agents.get(seat.index())
    }

    pub fn seat_of(&self, name: &str) -> Option<Seat> {
        self.agents
            .iter()
            .position(|agent| agent.name == name)
            .map(Seat)
    }

    pub fn player_names(&self) -> Vec<String> {
        self.agents.iter().map(|agent| agent.name.clone()).collect()
    }

    pub fn turn_state(&self) -> TurnState {
        self.turn
    }

    pub fn logs(&self) -> &GameLog {
        &self.log
    }

    pub fn is_over(&self) -> bool {
        self.turn.game_over
    }

    pub fn winner(&self) -> Option<Seat> {
        self.turn.winner
    }

    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.active).count()
    }

    /// The solution, once a correct accusation has exposed it.
    pub fn revealed_solution(&self) -> Option<&Solution> {
        self.solution_revealed.then_some(&self.solution)
    }

    /// The active agent holding the turn.
    pub fn current_player(&self) -> Seat {
        let seats = self.agents.len();
        (0..seats)
            .map(|offset| (self.turn.turn_index + offset) % seats)
            .find(|index| self.agents[*index].active)
            .map(Seat)
            .unwrap_or(Seat(self.turn.turn_index))
    }

    /// Rotates to the next active agent and unlocks the suggestion for the new turn.
    pub fn next_turn(&mut self) {
        if self.turn.game_over {
            return;
        }
        let seats = self.agents.len();
        let mut index = self.turn.turn_index;
        for _ in 0..seats {
            index = (index + 1) % seats;
            if self.agents[index].active {
                break;
            }
        }
        self.turn.turn_index = index;
        self.turn.suggested_this_turn = false;
        self.turn.turns_taken += 1;
        self.end_if_single_remaining();
    }

    /// Logs protocol violations and answers them with an empty outcome.
    pub fn handle_suggestion(&mut self, suggester: Seat, suggestion: &Solution) -> SuggestionOutcome {
        match self.try_suggest(suggester, suggestion) {
            Ok(outcome) => outcome,
            Err(violation) => {
                self.reject(suggester, &violation);
                SuggestionOutcome::default()
            }
        }
    }

    /// Resolves a suggestion: scans the other agents in seating order starting
    /// after the suggester, stops at the first one able to refute, and
    /// broadcasts the resulting observations.
    pub fn try_suggest(
        &mut self,
        suggester: Seat,
        suggestion: &Solution,
    ) -> Result<SuggestionOutcome, ProtocolViolation> {
        self.check_turn(suggester)?;
        if self.turn.suggested_this_turn {
            return Err(ProtocolViolation::AlreadySuggested {
                actor: self.name_of(suggester),
            });
        }
        if !suggestion.is_well_formed(&self.catalog) {
            return Err(ProtocolViolation::Malformed {
                actor: self.name_of(suggester),
            });
        }

        self.log(format!(
            "{} suggests: {}.",
            self.name_of(suggester),
            suggestion
        ));
        self.turn.suggested_this_turn = true;

        let cards: Vec<Card> = suggestion.cards().into_iter().cloned().collect();
        let mut outcome = SuggestionOutcome::default();

        for responder in suggester.others_after(self.agents.len()) {
            let candidates = self.agents[responder.index()].hand.matching(suggestion);
            if candidates.is_empty() {
                outcome.passed.push(responder);
                continue;
            }

            let Some(shown) = self.choose_reveal(responder, suggester, &candidates) else {
                self.log(format!(
                    "{} declined to show a card.",
                    self.name_of(responder)
                ));
                outcome.declined.push(responder);
                continue;
            };

            self.broadcast_refutation(suggester, responder, &shown, &outcome.passed, &cards);
            self.log(format!(
                "{} shows a card to {}.",
                self.name_of(responder),
                self.name_of(suggester)
            ));
            outcome.shower = Some(responder);
            if self.agents[suggester.index()].is_human() {
                outcome.card = Some(shown);
            }
            return Ok(outcome);
        }

        self.log("No one could refute the suggestion.");
        self.broadcast_unrefuted(suggester, suggestion, &outcome.passed, &cards);
        Ok(outcome)
    }

    /// Logs protocol violations and answers them with `false`.
    pub fn check_accusation(&mut self, accuser: Seat, accusation: &Solution) -> bool {
        match self.try_accuse(accuser, accusation) {
            Ok(correct) => correct,
            Err(violation) => {
                self.reject(accuser, &violation);
                false
            }
        }
    }

    /// Compares `accusation` with the hidden solution. A miss eliminates the accuser.
    pub fn try_accuse(
        &mut self,
        accuser: Seat,
        accusation: &Solution,
    ) -> Result<bool, ProtocolViolation> {
        self.check_turn(accuser)?;
        if !accusation.is_well_formed(&self.catalog) {
            return Err(ProtocolViolation::Malformed {
                actor: self.name_of(accuser),
            });
        }

        let name = self.name_of(accuser);
        if *accusation == self.solution {
            self.log(format!("{name} accuses correctly! {accusation}."));
            self.turn.game_over = true;
            self.turn.winner = Some(accuser);
            self.solution_revealed = true;
            event!(
                target: "clue_core::engine",
                Level::INFO,
                winner = %name,
                turns = self.turn.turns_taken,
                "correct accusation"
            );
            return Ok(true);
        }

        self.log(format!(
            "{name} accuses incorrectly ({accusation}) and is out of the game."
        ));
        self.agents[accuser.index()].active = false;
        self.end_if_single_remaining();
        Ok(false)
    }

    /// Plays the current automated agent's turn: accuse if its gate opens,
    /// otherwise suggest. The turn is not advanced.
    pub fn take_automated_turn(&mut self) -> TurnAction {
        if self.turn.game_over {
            return TurnAction::Idle;
        }
        let seat = self.current_player();
        let agent = &mut self.agents[seat.index()];
        let AgentKind::Automated {
            knowledge,
            strategy,
        } = &mut agent.kind
        else {
            return TurnAction::Idle;
        };

        if tracing::enabled!(Level::DEBUG) {
            let snapshot = ProbabilitySnapshot::capture(knowledge, 3);
            if let Ok(json) = snapshot.to_json() {
                event!(
                    target: "clue_core::engine",
                    Level::DEBUG,
                    seat = %seat,
                    snapshot = %json,
                    "probability snapshot"
                );
            }
        }

        if let Some(accusation) = strategy.choose_accusation(knowledge) {
            let name = agent.name.clone();
            self.log(format!("{name} decides to accuse: {accusation}."));
            let correct = self.check_accusation(seat, &accusation);
            return TurnAction::Accused {
                accusation,
                correct,
            };
        }

        if self.turn.suggested_this_turn {
            return TurnAction::Idle;
        }
        let suggestion = strategy.choose_suggestion(knowledge, &mut self.rng);
        let outcome = self.handle_suggestion(seat, &suggestion);
        TurnAction::Suggested {
            suggestion,
            outcome,
        }
    }

    fn choose_reveal(&mut self, responder: Seat, suggester: Seat, candidates: &[Card]) -> Option<Card> {
        let suggester_name = self.name_of(suggester);
        let agent = &mut self.agents[responder.index()];
        match &mut agent.kind {
            AgentKind::Automated {
                knowledge,
                strategy,
            } => {
                let picked = strategy
                    .card_to_show(knowledge, suggester, candidates, &mut self.rng)
                    .filter(|card| candidates.contains(card));
                if picked.is_some() {
                    return picked;
                }
                event!(
                    target: "clue_core::engine",
                    Level::WARN,
                    seat = %responder,
                    "strategy picked no valid card to show; choosing at random"
                );
                candidates.choose(&mut self.rng).cloned()
            }
            AgentKind::Human => {
                let request = RevealRequest {
                    revealer: responder,
                    suggester,
                    suggester_name,
                    candidates: candidates.to_vec(),
                };
                self.prompt
                    .as_mut()
                    .and_then(|prompt| prompt.choose_reveal(&request))
                    .filter(|card| candidates.contains(card))
            }
        }
    }

    fn broadcast_refutation(
        &mut self,
        suggester: Seat,
        refuter: Seat,
        shown: &Card,
        passed: &[Seat],
        cards: &[Card],
    ) {
        for (index, agent) in self.agents.iter_mut().enumerate() {
            let AgentKind::Automated { knowledge, .. } = &mut agent.kind else {
                continue;
            };
            let seat = Seat(index);
            for passer in passed {
                observe(seat, knowledge.note_cannot_have_any(*passer, cards));
            }
            let result = if seat == suggester {
                knowledge.note_has_card(refuter, shown)
            } else if seat == refuter {
                knowledge.note_shown_to(suggester, shown)
            } else {
                knowledge.note_has_one_of(refuter, cards)
            };
            observe(seat, result);
        }
    }

    fn broadcast_unrefuted(
        &mut self,
        suggester: Seat,
        suggestion: &Solution,
        passed: &[Seat],
        cards: &[Card],
    ) {
        for (index, agent) in self.agents.iter_mut().enumerate() {
            let AgentKind::Automated {
                knowledge,
                strategy,
            } = &mut agent.kind
            else {
                continue;
            };
            for passer in passed {
                observe(Seat(index), knowledge.note_cannot_have_any(*passer, cards));
            }
            strategy.observe_unrefuted(suggester, suggestion);
        }
    }

    fn check_turn(&self, actor: Seat) -> Result<(), ProtocolViolation> {
        if self.turn.game_over {
            return Err(ProtocolViolation::GameOver);
        }
        if actor.index() >= self.agents.len() || actor != self.current_player() {
            return Err(ProtocolViolation::OutOfTurn {
                actor: self.name_of(actor),
            });
        }
        Ok(())
    }

    fn end_if_single_remaining(&mut self) {
        if self.turn.game_over {
            return;
        }
        let mut active = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.active);
        if let (Some((index, agent)), None) = (active.next(), active.next()) {
            let name = agent.name.clone();
            self.turn.game_over = true;
            self.turn.winner = Some(Seat(index));
            self.log(format!("{name} wins by being the last active player."));
        }
    }

    fn reject(&mut self, actor: Seat, violation: &ProtocolViolation) {
        event!(
            target: "clue_core::engine",
            Level::WARN,
            actor = %actor,
            violation = %violation,
            "protocol violation"
        );
        self.log(violation.to_string());
    }

    fn name_of(&self, seat: Seat) -> String {
        self.agents
            .get(seat.index())
            .map(|agent| agent.name.clone())
            .unwrap_or_else(|| seat.to_string())
    }

    fn log(&mut self, text: impl Into<String>) {
        self.log.push(text);
    }
}

fn observe(seat: Seat, result: Result<(), KnowledgeError>) {
    if let Err(err) = result {
        event!(
            target: "clue_core::engine",
            Level::WARN,
            seat = %seat,
            error = %err,
            "observation rejected by knowledge base"
        );
    }
}

fn validate_deal(catalog: &Catalog, solution: &Solution, hands: &[Hand]) -> Result<(), SetupError> {
    if !solution.is_well_formed(catalog) {
        return Err(SetupError::MalformedSolution(solution.to_string()));
    }
    let mut seen = HashSet::new();
    for card in solution
        .cards()
        .into_iter()
        .chain(hands.iter().flat_map(|hand| hand.iter()))
    {
        if !catalog.contains(card) {
            return Err(SetupError::UnknownCard(card.key()));
        }
        if !seen.insert(card.key()) {
            return Err(SetupError::DuplicateCard(card.key()));
        }
    }
    if let Some(missing) = catalog.cards().into_iter().find(|card| !seen.contains(&card.key())) {
        return Err(SetupError::MissingCard(missing.key()));
    }
    Ok(())
}
