//! Per-room session state
//!
//! A session is the mutable aggregate behind one room code: the quiz, the
//! participant list, and the lifecycle phase. Sessions are owned exclusively
//! by the registry; all mutation happens through the transition methods on
//! [`QuizSession`].

pub mod participant;
pub mod state;

pub use participant::Participant;
pub use state::{Advance, AnswerOutcome, Departure, JoinSnapshot, QuizPhase, QuizSession};
