//! Session registry
//!
//! The registry owns every live quiz room and is the only shared mutable
//! resource in the server.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<SessionRegistry>
//!                   ┌──────────────────────────┐
//!                   │ sessions: HashMap<       │
//!                   │   RoomCode,              │
//!                   │   Arc<RwLock<            │
//!                   │     QuizSession          │
//!                   │   >>                     │
//!                   │ >                        │
//!                   └────────────┬─────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!   [Host conn]            [Participant]           [Participant]
//!   initializeQuiz         joinQuiz                submitAnswer
//!        │                       │                       │
//!        └──► dispatcher ──► session lock ──► gateway broadcast
//! ```
//!
//! Each transition takes exactly one room's write lock, captures the
//! outbound snapshot, and releases the lock before anything is sent, so
//! locks are never held across network I/O.

pub mod config;
pub mod error;
pub mod store;

pub use config::{AnswerPolicy, RegistryConfig};
pub use error::RegistryError;
pub use store::SessionRegistry;

use rand::Rng;

/// Generate an 8-digit numeric room code
///
/// Uniqueness against already-persisted quizzes is the authoring flow's
/// responsibility; the registry itself resolves collisions by last write
/// wins.
pub fn generate_room_code() -> String {
    rand::thread_rng().gen_range(10_000_000u32..=99_999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_codes_are_eight_digits() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
