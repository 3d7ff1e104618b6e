//! Named events exchanged between clients and the server
//!
//! Every frame on the wire is a JSON object of the form
//! `{"event": <name>, "data": {...}}`. Client events carry a room code that
//! the dispatcher resolves against the session registry; server events are
//! either replies to a single connection or broadcasts to a room.

use serde::{Deserialize, Serialize};

use super::quiz::{ParticipantSummary, Question, Quiz};

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Host creates (or replaces) the room for a quiz
    #[serde(rename_all = "camelCase")]
    InitializeQuiz { quiz: Quiz },

    /// Host starts the quiz, pushing the first question to the room
    #[serde(rename_all = "camelCase")]
    StartQuiz { room_code: String },

    /// Participant joins a room under a display name
    #[serde(rename_all = "camelCase")]
    JoinQuiz { room_code: String, username: String },

    /// Participant submits an answer to the current question
    #[serde(rename_all = "camelCase")]
    SubmitAnswer { room_code: String, answer: String },

    /// Host advances to the next question (or ends the quiz)
    #[serde(rename_all = "camelCase")]
    NextQuestion { room_code: String },
}

/// Events sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A question is now live; broadcast to the room
    #[serde(rename_all = "camelCase")]
    QuestionStart {
        question: Question,
        /// 1-based position of the question
        question_number: usize,
        total_questions: usize,
    },

    /// Reply to a successful join, describing the room's current state
    #[serde(rename_all = "camelCase")]
    QuizJoined {
        title: String,
        description: String,
        /// Current question index: -1 before start, question count once ended
        current_question: i64,
        total_questions: usize,
        participants: Vec<ParticipantSummary>,
    },

    /// Someone joined; sent to the other room members
    #[serde(rename_all = "camelCase")]
    ParticipantJoined {
        participants: Vec<ParticipantSummary>,
        message: String,
    },

    /// Someone left; broadcast to the affected room
    #[serde(rename_all = "camelCase")]
    ParticipantLeft {
        participants: Vec<ParticipantSummary>,
        message: String,
    },

    /// Standings changed after an answer; broadcast to the room
    #[serde(rename_all = "camelCase")]
    ScoreUpdate { participants: Vec<ParticipantSummary> },

    /// Reply to the answering participant only
    #[serde(rename_all = "camelCase")]
    AnswerFeedback {
        is_correct: bool,
        correct_answer: String,
    },

    /// The quiz is over; broadcast with the final standings
    #[serde(rename_all = "camelCase")]
    QuizEnd {
        /// Sorted by score descending; ties keep join order
        final_scores: Vec<ParticipantSummary>,
        quiz: Quiz,
    },

    /// Reply to the requester when an operation fails
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}
