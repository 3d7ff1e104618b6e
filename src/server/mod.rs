//! WebSocket server
//!
//! The listener accepts TCP connections, upgrades them to WebSockets, and
//! hands each one to a connection task that feeds the event dispatcher.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use listener::QuizServer;
