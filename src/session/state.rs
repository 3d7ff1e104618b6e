//! Session state machine
//!
//! Tracks one quiz room from creation through questions to the final
//! standings. All transitions are pure state methods returning outcome
//! values; sending those outcomes to clients is the dispatcher's job, so
//! everything here is directly unit-testable.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::protocol::{ParticipantSummary, Question, Quiz};
use crate::registry::config::AnswerPolicy;
use crate::registry::error::RegistryError;

use super::participant::Participant;

/// Where a session is in the quiz lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Created, participants may join, no question live yet
    Lobby,
    /// Question at this index is live
    Question(usize),
    /// All questions exhausted, final standings announced
    Ended,
}

/// Result of moving the quiz forward
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// A question went live
    Question {
        question: Question,
        /// 1-based position
        question_number: usize,
        total_questions: usize,
    },
    /// The quiz ended
    Finished {
        /// Sorted by score descending; ties keep join order
        final_scores: Vec<ParticipantSummary>,
        quiz: Quiz,
    },
}

/// Snapshot returned to a successfully joined participant
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSnapshot {
    pub title: String,
    pub description: String,
    /// -1 in the lobby, question count once ended
    pub current_question: i64,
    pub total_questions: usize,
    pub participants: Vec<ParticipantSummary>,
}

/// Result of scoring a submitted answer
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// Whether the submission actually changed the score
    pub scored: bool,
    pub correct_answer: String,
    pub participants: Vec<ParticipantSummary>,
}

/// Result of removing a disconnected participant
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub username: String,
    pub participants: Vec<ParticipantSummary>,
}

/// Mutable state of one quiz room
///
/// Owned by the registry behind a per-room lock; every transition runs to
/// completion under that lock, so no partial state is ever observable.
#[derive(Debug)]
pub struct QuizSession {
    /// Quiz content, read-only after creation
    pub quiz: Quiz,

    /// Joined participants, in join order
    pub participants: Vec<Participant>,

    /// Lifecycle phase
    pub phase: QuizPhase,

    /// True from creation until the quiz ends
    pub is_active: bool,

    /// When the host started the quiz
    pub started_at: Option<Instant>,

    /// Last transition time, drives idle sweeping
    pub last_activity: Instant,

    /// Connections that already answered the live question (lock-first policy)
    answered: HashSet<u64>,
}

impl QuizSession {
    /// Create a session in the lobby phase
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            participants: Vec::new(),
            phase: QuizPhase::Lobby,
            is_active: true,
            started_at: None,
            last_activity: Instant::now(),
            answered: HashSet::new(),
        }
    }

    /// Start the quiz at the first question
    ///
    /// A quiz with no questions ends immediately.
    pub fn start(&mut self) -> Advance {
        self.started_at = Some(Instant::now());
        self.step_to(0)
    }

    /// Move to the next question, or end the quiz past the last one
    ///
    /// Returns `None` once the quiz has ended; repeated calls past the end
    /// are no-ops.
    pub fn advance(&mut self) -> Option<Advance> {
        let next = match self.phase {
            QuizPhase::Lobby => 0,
            QuizPhase::Question(index) => index + 1,
            QuizPhase::Ended => return None,
        };
        Some(self.step_to(next))
    }

    fn step_to(&mut self, index: usize) -> Advance {
        self.touch();
        self.answered.clear();

        match self.quiz.questions.get(index) {
            Some(question) => {
                self.phase = QuizPhase::Question(index);
                Advance::Question {
                    question: question.clone(),
                    question_number: index + 1,
                    total_questions: self.quiz.questions.len(),
                }
            }
            None => {
                self.phase = QuizPhase::Ended;
                self.is_active = false;
                Advance::Finished {
                    final_scores: self.final_scores(),
                    quiz: self.quiz.clone(),
                }
            }
        }
    }

    /// Add a participant under a room-unique username
    pub fn join(
        &mut self,
        connection_id: u64,
        username: String,
    ) -> Result<JoinSnapshot, RegistryError> {
        if self.participants.iter().any(|p| p.username == username) {
            return Err(RegistryError::UsernameTaken);
        }

        self.touch();
        self.participants
            .push(Participant::new(connection_id, username));

        Ok(JoinSnapshot {
            title: self.quiz.title.clone(),
            description: self.quiz.description.clone(),
            current_question: self.current_question_index(),
            total_questions: self.quiz.questions.len(),
            participants: self.participant_summaries(),
        })
    }

    /// Score an answer to the live question
    ///
    /// Returns `None` when the submission must be silently dropped: no
    /// question is live, or the connection has no participant here.
    pub fn submit_answer(
        &mut self,
        connection_id: u64,
        answer: &str,
        policy: AnswerPolicy,
        award: u32,
    ) -> Option<AnswerOutcome> {
        let QuizPhase::Question(index) = self.phase else {
            return None;
        };
        let correct_answer = self.quiz.questions.get(index)?.correct_answer.clone();
        let position = self
            .participants
            .iter()
            .position(|p| p.connection_id == connection_id)?;

        self.touch();
        let first_attempt = self.answered.insert(connection_id);
        let is_correct = answer == correct_answer;
        let scored = is_correct
            && (policy == AnswerPolicy::ScoreEverySubmission || first_attempt);

        if scored {
            self.participants[position].score += award;
        }

        Some(AnswerOutcome {
            is_correct,
            scored,
            correct_answer,
            participants: self.participant_summaries(),
        })
    }

    /// Remove the participant bound to a connection, if any
    pub fn remove_connection(&mut self, connection_id: u64) -> Option<Departure> {
        let position = self
            .participants
            .iter()
            .position(|p| p.connection_id == connection_id)?;

        self.touch();
        let removed = self.participants.remove(position);
        self.answered.remove(&connection_id);

        Some(Departure {
            username: removed.username,
            participants: self.participant_summaries(),
        })
    }

    /// Current participants as client-facing summaries, in join order
    pub fn participant_summaries(&self) -> Vec<ParticipantSummary> {
        self.participants.iter().map(Participant::summary).collect()
    }

    /// Final standings, sorted by score descending with stable ties
    pub fn final_scores(&self) -> Vec<ParticipantSummary> {
        let mut scores = self.participant_summaries();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    /// Wire projection of the phase: -1 in the lobby, question count once ended
    pub fn current_question_index(&self) -> i64 {
        match self.phase {
            QuizPhase::Lobby => -1,
            QuizPhase::Question(index) => index as i64,
            QuizPhase::Ended => self.quiz.questions.len() as i64,
        }
    }

    /// Time since the last transition
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.duration_since(self.last_activity)
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
