//! Real-time quiz session server
//!
//! `quizsync` coordinates live multiple-choice quiz rooms: a host initializes
//! a quiz under a short room code, participants join over WebSockets, and
//! questions, score updates, and final standings fan out to every connection
//! in the room in lockstep.
//!
//! # Architecture
//!
//! ```text
//!   client frame ──► Connection ──► EventDispatcher ──► SessionRegistry
//!                    (gateway           │                 (room locks)
//!                     channels)         │
//!                        ▲              ▼
//!                        └──── ConnectionGateway broadcast
//! ```
//!
//! Each connection feeds events to the dispatcher one at a time, and every
//! transition runs to completion under its room's lock, so all mutation of a
//! room is serialized and no partial state is ever broadcast.
//!
//! # Example
//! ```no_run
//! use quizsync::{QuizServer, ServerConfig};
//!
//! # async fn example() -> quizsync::error::Result<()> {
//! let server = QuizServer::new(ServerConfig::default());
//! server.run().await
//! # }
//! ```

pub mod client;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use client::QuizClient;
pub use dispatch::EventDispatcher;
pub use error::{Error, Result};
pub use gateway::ConnectionGateway;
pub use protocol::{ClientEvent, ParticipantSummary, Question, Quiz, ServerEvent};
pub use registry::{AnswerPolicy, RegistryConfig, RegistryError, SessionRegistry};
pub use server::{QuizServer, ServerConfig};
pub use session::{QuizPhase, QuizSession};
pub use stats::ServerStats;
