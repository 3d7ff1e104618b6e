//! Quiz data model
//!
//! Wire types for quiz content and participant standings. A quiz is supplied
//! by the host at room creation and is immutable for the session's duration.

use serde::{Deserialize, Serialize};

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question identifier (assigned by the authoring flow)
    pub id: String,

    /// The question prompt shown to participants
    pub question_text: String,

    /// Answer options, in display order
    pub options: Vec<String>,

    /// The correct option string
    ///
    /// Must equal one of `options`; the authoring flow enforces this, the
    /// session core does not.
    pub correct_answer: String,
}

/// A complete quiz as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Quiz title
    pub title: String,

    /// Quiz description
    pub description: String,

    /// Ordered question sequence
    #[serde(default)]
    pub questions: Vec<Question>,

    /// Room code participants use to join (short numeric string)
    pub room_code: String,
}

/// Projection of a participant for client-facing payloads
///
/// Connection identifiers never appear on the wire; clients only ever see
/// username and score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    /// Display name, unique within a room
    pub username: String,

    /// Accumulated score
    pub score: u32,
}
