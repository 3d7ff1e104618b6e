//! Registry error types
//!
//! Errors that are reported back to the requesting connection. The `Display`
//! output is the exact message carried by the wire `error` event, so changing
//! these strings changes the client-visible protocol.

/// Error type for room lookup and join operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No session exists for the requested room code
    RoomNotFound,
    /// The requested username is already in use in this room
    UsernameTaken,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::RoomNotFound => write!(f, "Quiz room not found"),
            RegistryError::UsernameTaken => write!(f, "Username already taken"),
        }
    }
}

impl std::error::Error for RegistryError {}
