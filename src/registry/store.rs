//! Session registry implementation
//!
//! The central registry that owns all active quiz sessions, keyed by room
//! code. Creation, lookup, and sweeping all go through here; nothing else
//! holds a session across calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::protocol::Quiz;
use crate::session::QuizSession;

use super::config::RegistryConfig;

/// Central registry for all active quiz sessions
///
/// Thread-safe via `RwLock`. The outer lock guards the room map; each
/// session sits behind its own lock so transitions on different rooms never
/// contend.
pub struct SessionRegistry {
    /// Map of room code to session
    sessions: RwLock<HashMap<String, Arc<RwLock<QuizSession>>>>,

    /// Configuration
    config: RegistryConfig,
}

impl SessionRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a session for a quiz, replacing any existing session at the
    /// same room code (last write wins, no error on collision)
    pub async fn create(&self, room_code: &str, quiz: Quiz) -> Arc<RwLock<QuizSession>> {
        let session = Arc::new(RwLock::new(QuizSession::new(quiz)));

        let mut sessions = self.sessions.write().await;
        let replaced = sessions.insert(room_code.to_string(), Arc::clone(&session));

        if replaced.is_some() {
            tracing::info!(room = %room_code, "Quiz room replaced");
        } else {
            tracing::info!(room = %room_code, "Quiz room created");
        }

        session
    }

    /// Look up the session for a room code
    pub async fn get(&self, room_code: &str) -> Option<Arc<RwLock<QuizSession>>> {
        self.sessions.read().await.get(room_code).cloned()
    }

    /// Get the number of active sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Snapshot of all sessions, for the dispatcher's disconnect scan
    ///
    /// Disconnect events carry only a connection identifier, so the
    /// dispatcher must visit every room to find the bound participant.
    pub async fn sessions(&self) -> Vec<(String, Arc<RwLock<QuizSession>>)> {
        self.sessions
            .read()
            .await
            .iter()
            .map(|(code, session)| (code.clone(), Arc::clone(session)))
            .collect()
    }

    /// Run one sweep pass, removing sessions idle longer than
    /// `idle_session_timeout`
    ///
    /// Returns the number of sessions removed.
    pub async fn sweep_expired(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;

        let expired: Vec<String> = sessions
            .iter()
            .filter_map(|(code, session_arc)| {
                // Skip rooms mid-transition; the next pass will see them
                let Ok(session) = session_arc.try_read() else {
                    return None;
                };

                if session.idle_for(now) > self.config.idle_session_timeout {
                    Some(code.clone())
                } else {
                    None
                }
            })
            .collect();

        for code in &expired {
            sessions.remove(code);
            tracing::info!(room = %code, "Idle quiz room removed by sweep");
        }

        expired.len()
    }

    /// Spawn the background sweep task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_sweep_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.sweep_expired(Instant::now()).await;
            }
        })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
