//! One game, from the first question to a terminal state.
//!
//! ```text
//! AwaitingQuestion -> AwaitingAnswer -> AwaitingQuestion | ReadyToGuess
//! ReadyToGuess -> Guessing -> Won | AwaitingQuestion | AwaitingLearning
//! AwaitingLearning -> Missed | AwaitingRegistration | Abandoned
//! AwaitingRegistration -> Learned | Abandoned
//! ```
//!
//! The session never touches storage. Callers drive it with [`GameSession::next_step`]
//! and the answer methods, then persist [`GameSession::record`] once it is final.

use std::collections::BTreeSet;

use serde::Serialize;
use tq_core::entities::{Entity, GameRecord, QuestionTrace};

use crate::answer::Answer;
use crate::engine::{AskedQuestion, AttributeQuestion, InformationEngine};
use crate::error::EngineError;

/// Guess as soon as confidence reaches this.
pub const CONFIDENCE_THRESHOLD: f64 = 0.70;

/// Wrong guesses allowed before asking the player who they were thinking of.
pub const MAX_GUESS_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    AwaitingQuestion,
    AwaitingAnswer,
    ReadyToGuess,
    Guessing,
    AwaitingLearning,
    AwaitingRegistration,
    Won,
    Learned,
    Missed,
    Abandoned,
}

impl SessionStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Learned | Self::Missed | Self::Abandoned)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingQuestion => "awaiting_question",
            Self::AwaitingAnswer => "awaiting_answer",
            Self::ReadyToGuess => "ready_to_guess",
            Self::Guessing => "guessing",
            Self::AwaitingLearning => "awaiting_learning",
            Self::AwaitingRegistration => "awaiting_registration",
            Self::Won => "won",
            Self::Learned => "learned",
            Self::Missed => "missed",
            Self::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// What the player has to respond to next.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// Answer yes/no via [`GameSession::answer`].
    Question(AttributeQuestion),
    /// Confirm or reject via [`GameSession::confirm_guess`].
    Guess {
        entity: Entity,
        confidence: f64,
        attempt: u32,
    },
    /// Name the entity via [`GameSession::identify_target`].
    IdentifyTarget,
    /// Describe the new entity and finish with [`GameSession::complete_learning`]
    /// or [`GameSession::decline_registration`].
    RegisterTarget { name: String },
    Finished(SessionStatus),
}

/// Result of feeding a raw reply to [`GameSession::answer`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// Not a yes/no token. Nothing changed; ask again.
    Rejected { input: String },
    Accepted {
        answer: Answer,
        remaining: usize,
        confidence: f64,
    },
}

/// Per-session progress figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub status: SessionStatus,
    pub questions_asked: usize,
    pub candidates_remaining: usize,
    pub attempts: u32,
    pub confidence: f64,
}

#[derive(Debug)]
pub struct GameSession {
    pool: Vec<Entity>,
    subset: Vec<Entity>,
    history: Vec<AskedQuestion>,
    rejected: BTreeSet<i64>,
    attempts: u32,
    status: SessionStatus,
    pending_question: Option<AttributeQuestion>,
    current_guess: Option<Entity>,
    pending_name: Option<String>,
    record: Option<GameRecord>,
}

impl GameSession {
    /// Start a game over the engine's current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyDataset` if the engine has no candidates.
    pub fn start(engine: &InformationEngine) -> Result<Self, EngineError> {
        if engine.is_empty() {
            return Err(EngineError::EmptyDataset);
        }
        let pool = engine.candidates().to_vec();
        tracing::debug!(candidates = pool.len(), "session started");
        Ok(Self {
            subset: pool.clone(),
            pool,
            history: Vec::new(),
            rejected: BTreeSet::new(),
            attempts: 0,
            status: SessionStatus::AwaitingQuestion,
            pending_question: None,
            current_guess: None,
            pending_name: None,
            record: None,
        })
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Candidates still consistent with the answers so far.
    #[must_use]
    pub fn subset(&self) -> &[Entity] {
        &self.subset
    }

    #[must_use]
    pub fn history(&self) -> &[AskedQuestion] {
        &self.history
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        InformationEngine::confidence(&self.subset)
    }

    /// Resolve the states that need no input and return the pending prompt.
    pub fn next_step(&mut self) -> Prompt {
        loop {
            match self.status {
                SessionStatus::AwaitingQuestion => {
                    if self.subset.len() <= 1 || self.confidence() >= CONFIDENCE_THRESHOLD {
                        self.status = SessionStatus::ReadyToGuess;
                        continue;
                    }
                    match InformationEngine::select_question(&self.subset, &self.history) {
                        Some(question) => {
                            self.pending_question = Some(question.clone());
                            self.status = SessionStatus::AwaitingAnswer;
                            return Prompt::Question(question);
                        }
                        None => self.status = SessionStatus::ReadyToGuess,
                    }
                }
                SessionStatus::AwaitingAnswer => {
                    if let Some(question) = &self.pending_question {
                        return Prompt::Question(question.clone());
                    }
                    self.status = SessionStatus::AwaitingQuestion;
                }
                SessionStatus::ReadyToGuess => {
                    if self.subset.is_empty() {
                        self.status = if self.reseed() {
                            SessionStatus::AwaitingQuestion
                        } else {
                            SessionStatus::AwaitingLearning
                        };
                        continue;
                    }
                    if let Some(guess) = self.subset.first().cloned() {
                        self.current_guess = Some(guess);
                        self.status = SessionStatus::Guessing;
                    }
                }
                SessionStatus::Guessing => {
                    if let Some(entity) = &self.current_guess {
                        return Prompt::Guess {
                            entity: entity.clone(),
                            confidence: self.confidence(),
                            attempt: self.attempts + 1,
                        };
                    }
                    self.status = SessionStatus::ReadyToGuess;
                }
                SessionStatus::AwaitingLearning => return Prompt::IdentifyTarget,
                SessionStatus::AwaitingRegistration => {
                    return Prompt::RegisterTarget {
                        name: self.pending_name.clone().unwrap_or_default(),
                    };
                }
                terminal => return Prompt::Finished(terminal),
            }
        }
    }

    /// Feed a raw reply to the pending question.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` if no question is pending.
    pub fn answer(&mut self, raw: &str) -> Result<AnswerOutcome, EngineError> {
        let question = match (&self.status, &self.pending_question) {
            (SessionStatus::AwaitingAnswer, Some(question)) => question.clone(),
            _ => return Err(self.invalid("answer a question")),
        };
        let Some(answer) = Answer::parse(raw) else {
            return Ok(AnswerOutcome::Rejected {
                input: raw.to_string(),
            });
        };

        self.subset = InformationEngine::filter(&self.subset, &question, answer);
        self.history.push(AskedQuestion { question, answer });
        self.pending_question = None;

        let confidence = self.confidence();
        self.status = if self.subset.len() <= 1 || confidence >= CONFIDENCE_THRESHOLD {
            SessionStatus::ReadyToGuess
        } else {
            SessionStatus::AwaitingQuestion
        };
        tracing::debug!(%answer, remaining = self.subset.len(), confidence, "answer recorded");

        Ok(AnswerOutcome::Accepted {
            answer,
            remaining: self.subset.len(),
            confidence,
        })
    }

    /// Resolve the pending guess.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` if no guess is pending.
    pub fn confirm_guess(&mut self, correct: bool) -> Result<SessionStatus, EngineError> {
        let guess = match (&self.status, &self.current_guess) {
            (SessionStatus::Guessing, Some(guess)) => guess.clone(),
            _ => return Err(self.invalid("confirm a guess")),
        };
        self.attempts += 1;
        self.current_guess = None;

        if correct {
            self.finish(SessionStatus::Won, Some(guess.id), true);
            return Ok(self.status);
        }

        self.rejected.insert(guess.id);
        self.subset.retain(|e| e.id != guess.id);
        tracing::debug!(id = guess.id, attempts = self.attempts, "guess rejected");

        self.status = if self.attempts >= MAX_GUESS_ATTEMPTS {
            SessionStatus::AwaitingLearning
        } else {
            SessionStatus::AwaitingQuestion
        };
        Ok(self.status)
    }

    /// Tell the session who the player was thinking of.
    ///
    /// `existing` is the stored entity with that name, if any. A known
    /// entity ends the game as `Missed`; an unknown name moves on to
    /// registration.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside `AwaitingLearning`, `InvalidInput` for a
    /// blank name.
    pub fn identify_target(
        &mut self,
        name: &str,
        existing: Option<&Entity>,
    ) -> Result<SessionStatus, EngineError> {
        if self.status != SessionStatus::AwaitingLearning {
            return Err(self.invalid("identify the target"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("target name must not be empty".into()));
        }

        match existing {
            Some(entity) => self.finish(SessionStatus::Missed, Some(entity.id), false),
            None => {
                self.pending_name = Some(name.to_string());
                self.status = SessionStatus::AwaitingRegistration;
            }
        }
        Ok(self.status)
    }

    /// Name awaiting registration, if any.
    #[must_use]
    pub fn pending_name(&self) -> Option<&str> {
        self.pending_name.as_deref()
    }

    /// Finish after the caller stored the new entity.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` outside `AwaitingRegistration`.
    pub fn complete_learning(&mut self, entity: &Entity) -> Result<SessionStatus, EngineError> {
        if self.status != SessionStatus::AwaitingRegistration {
            return Err(self.invalid("complete learning"));
        }
        self.finish(SessionStatus::Learned, Some(entity.id), false);
        Ok(self.status)
    }

    /// The player would not name or register the target.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless the session is waiting
    /// for the target's identity or registration.
    pub fn decline_registration(&mut self) -> Result<SessionStatus, EngineError> {
        if !matches!(
            self.status,
            SessionStatus::AwaitingLearning | SessionStatus::AwaitingRegistration
        ) {
            return Err(self.invalid("decline registration"));
        }
        self.finish(SessionStatus::Abandoned, None, false);
        Ok(self.status)
    }

    /// Stop without producing a record. No-op on a finished session.
    pub fn abort(&mut self) {
        if !self.status.is_terminal() {
            tracing::debug!(state = %self.status, "session aborted");
            self.status = SessionStatus::Abandoned;
            self.record = None;
        }
    }

    /// The game record, once the session finished normally.
    #[must_use]
    pub const fn record(&self) -> Option<&GameRecord> {
        self.record.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            status: self.status,
            questions_asked: self.history.len(),
            candidates_remaining: self.subset.len(),
            attempts: self.attempts,
            confidence: self.confidence(),
        }
    }

    /// Refill an exhausted subset from never-rejected candidates that
    /// contradict the fewest answers. Returns whether anything was added.
    fn reseed(&mut self) -> bool {
        let contradictions = |entity: &Entity| {
            self.history
                .iter()
                .filter(|asked| asked.contradicted_by(entity))
                .count()
        };
        let remaining: Vec<(usize, &Entity)> = self
            .pool
            .iter()
            .filter(|e| !self.rejected.contains(&e.id))
            .map(|e| (contradictions(e), e))
            .collect();
        let Some(fewest) = remaining.iter().map(|(n, _)| *n).min() else {
            return false;
        };
        let subset: Vec<Entity> = remaining
            .into_iter()
            .filter(|(n, _)| *n == fewest)
            .map(|(_, e)| e.clone())
            .collect();
        tracing::debug!(candidates = subset.len(), contradictions = fewest, "subset reseeded");
        self.subset = subset;
        true
    }

    fn finish(&mut self, status: SessionStatus, target: Option<i64>, success: bool) {
        self.status = status;
        self.record = Some(GameRecord {
            target_entity_id: target,
            success,
            attempts: self.attempts,
            trace: self
                .history
                .iter()
                .map(|asked| QuestionTrace {
                    attribute: asked.question.attribute.clone(),
                    expected_value: asked.question.value.clone(),
                    user_value: asked.answer.as_str().to_string(),
                })
                .collect(),
        });
        tracing::debug!(state = %status, attempts = self.attempts, "session finished");
    }

    fn invalid(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            operation,
            state: self.status.to_string(),
        }
    }
}
