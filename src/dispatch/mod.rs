//! Event dispatcher
//!
//! Binds each inbound client event to the corresponding session transition
//! and routes the resulting replies and broadcasts through the gateway.
//! Connections feed events here one at a time in arrival order; each
//! transition runs to completion under its room's write lock before anything
//! is sent.
//!
//! Operations against a missing room or an invalid phase are silently
//! dropped (logged at debug), with one exception: `joinQuiz` always answers
//! the requester, with either the room snapshot or an `error` event.

use std::sync::Arc;

use crate::gateway::ConnectionGateway;
use crate::protocol::{ClientEvent, Quiz, ServerEvent};
use crate::registry::{RegistryError, SessionRegistry};
use crate::session::Advance;

/// Routes client events to session transitions and fans out the results
pub struct EventDispatcher {
    registry: Arc<SessionRegistry>,
    gateway: Arc<ConnectionGateway>,
}

impl EventDispatcher {
    /// Create a dispatcher over a registry and gateway
    pub fn new(registry: Arc<SessionRegistry>, gateway: Arc<ConnectionGateway>) -> Self {
        Self { registry, gateway }
    }

    /// Handle one client event from a connection
    pub async fn handle_event(&self, connection_id: u64, event: ClientEvent) {
        match event {
            ClientEvent::InitializeQuiz { quiz } => {
                self.initialize_quiz(connection_id, quiz).await;
            }
            ClientEvent::StartQuiz { room_code } => {
                self.start_quiz(&room_code).await;
            }
            ClientEvent::JoinQuiz {
                room_code,
                username,
            } => {
                self.join_quiz(connection_id, &room_code, username).await;
            }
            ClientEvent::SubmitAnswer { room_code, answer } => {
                self.submit_answer(connection_id, &room_code, &answer).await;
            }
            ClientEvent::NextQuestion { room_code } => {
                self.next_question(&room_code).await;
            }
        }
    }

    /// Handle a connection teardown
    ///
    /// The teardown carries only a connection identifier, so every session
    /// is scanned for a bound participant. Idempotent: a second teardown for
    /// the same connection finds nothing.
    pub async fn handle_disconnect(&self, connection_id: u64) {
        self.gateway.unregister(connection_id).await;

        for (room_code, session) in self.registry.sessions().await {
            let departure = {
                let mut session = session.write().await;
                session.remove_connection(connection_id)
            };

            if let Some(departure) = departure {
                tracing::info!(
                    room = %room_code,
                    connection_id,
                    username = %departure.username,
                    "Participant left"
                );
                let message = format!("{} has left the quiz", departure.username);
                self.gateway
                    .broadcast_to_room(
                        &room_code,
                        ServerEvent::ParticipantLeft {
                            participants: departure.participants,
                            message,
                        },
                    )
                    .await;
            }
        }
    }

    async fn initialize_quiz(&self, connection_id: u64, quiz: Quiz) {
        let room_code = quiz.room_code.clone();
        let title = quiz.title.clone();

        self.registry.create(&room_code, quiz).await;
        // The host joins its own room so question and score broadcasts
        // reach it
        self.gateway.join_room(connection_id, &room_code).await;

        tracing::info!(room = %room_code, title = %title, connection_id, "Quiz initialized");
    }

    async fn start_quiz(&self, room_code: &str) {
        let Some(session) = self.registry.get(room_code).await else {
            tracing::debug!(room = %room_code, "startQuiz for unknown room dropped");
            return;
        };

        let outcome = {
            let mut session = session.write().await;
            session.start()
        };

        tracing::info!(room = %room_code, "Quiz started");
        self.deliver_advance(room_code, outcome).await;
    }

    async fn join_quiz(&self, connection_id: u64, room_code: &str, username: String) {
        let Some(session) = self.registry.get(room_code).await else {
            tracing::debug!(room = %room_code, username = %username, "Join to unknown room");
            self.reply_error(connection_id, RegistryError::RoomNotFound)
                .await;
            return;
        };

        let result = {
            let mut session = session.write().await;
            session.join(connection_id, username.clone())
        };

        match result {
            Err(error) => {
                tracing::debug!(room = %room_code, username = %username, "Join rejected");
                self.reply_error(connection_id, error).await;
            }
            Ok(snapshot) => {
                tracing::info!(room = %room_code, connection_id, username = %username, "Participant joined");

                self.gateway.join_room(connection_id, room_code).await;
                self.gateway
                    .send_to(
                        connection_id,
                        ServerEvent::QuizJoined {
                            title: snapshot.title,
                            description: snapshot.description,
                            current_question: snapshot.current_question,
                            total_questions: snapshot.total_questions,
                            participants: snapshot.participants.clone(),
                        },
                    )
                    .await;
                self.gateway
                    .broadcast_to_room_except(
                        room_code,
                        connection_id,
                        ServerEvent::ParticipantJoined {
                            participants: snapshot.participants,
                            message: format!("{} joined the quiz", username),
                        },
                    )
                    .await;
            }
        }
    }

    async fn submit_answer(&self, connection_id: u64, room_code: &str, answer: &str) {
        let Some(session) = self.registry.get(room_code).await else {
            tracing::debug!(room = %room_code, "Answer for unknown room dropped");
            return;
        };

        let config = self.registry.config();
        let outcome = {
            let mut session = session.write().await;
            session.submit_answer(connection_id, answer, config.answer_policy, config.answer_award)
        };

        let Some(outcome) = outcome else {
            tracing::debug!(room = %room_code, connection_id, "Answer dropped: no live question or unbound connection");
            return;
        };

        tracing::debug!(
            room = %room_code,
            connection_id,
            is_correct = outcome.is_correct,
            scored = outcome.scored,
            "Answer submitted"
        );

        self.gateway
            .send_to(
                connection_id,
                ServerEvent::AnswerFeedback {
                    is_correct: outcome.is_correct,
                    correct_answer: outcome.correct_answer,
                },
            )
            .await;
        self.gateway
            .broadcast_to_room(
                room_code,
                ServerEvent::ScoreUpdate {
                    participants: outcome.participants,
                },
            )
            .await;
    }

    async fn next_question(&self, room_code: &str) {
        let Some(session) = self.registry.get(room_code).await else {
            tracing::debug!(room = %room_code, "nextQuestion for unknown room dropped");
            return;
        };

        let outcome = {
            let mut session = session.write().await;
            session.advance()
        };

        match outcome {
            Some(advance) => self.deliver_advance(room_code, advance).await,
            None => {
                tracing::debug!(room = %room_code, "nextQuestion after quiz end dropped");
            }
        }
    }

    async fn deliver_advance(&self, room_code: &str, advance: Advance) {
        match advance {
            Advance::Question {
                question,
                question_number,
                total_questions,
            } => {
                tracing::debug!(room = %room_code, question_number, total_questions, "Question broadcast");
                self.gateway
                    .broadcast_to_room(
                        room_code,
                        ServerEvent::QuestionStart {
                            question,
                            question_number,
                            total_questions,
                        },
                    )
                    .await;
            }
            Advance::Finished { final_scores, quiz } => {
                tracing::info!(room = %room_code, participants = final_scores.len(), "Quiz ended");
                self.gateway
                    .broadcast_to_room(
                        room_code,
                        ServerEvent::QuizEnd { final_scores, quiz },
                    )
                    .await;
            }
        }
    }

    async fn reply_error(&self, connection_id: u64, error: RegistryError) {
        self.gateway
            .send_to(
                connection_id,
                ServerEvent::Error {
                    message: error.to_string(),
                },
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::protocol::{ParticipantSummary, Question};
    use crate::registry::{AnswerPolicy, RegistryConfig};

    fn sample_quiz(room_code: &str) -> Quiz {
        Quiz {
            title: "Capitals".into(),
            description: "European capitals".into(),
            questions: vec![
                Question {
                    id: "q1".into(),
                    question_text: "Capital of France?".into(),
                    options: vec!["Paris".into(), "Lyon".into()],
                    correct_answer: "Paris".into(),
                },
                Question {
                    id: "q2".into(),
                    question_text: "Capital of Spain?".into(),
                    options: vec!["Madrid".into(), "Seville".into()],
                    correct_answer: "Madrid".into(),
                },
            ],
            room_code: room_code.into(),
        }
    }

    struct Harness {
        dispatcher: EventDispatcher,
        gateway: Arc<ConnectionGateway>,
        registry: Arc<SessionRegistry>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(RegistryConfig::default())
        }

        fn with_config(config: RegistryConfig) -> Self {
            let registry = Arc::new(SessionRegistry::with_config(config));
            let gateway = Arc::new(ConnectionGateway::new());
            let dispatcher =
                EventDispatcher::new(Arc::clone(&registry), Arc::clone(&gateway));
            Self {
                dispatcher,
                gateway,
                registry,
            }
        }

        async fn attach(&self, id: u64) -> mpsc::UnboundedReceiver<ServerEvent> {
            let (tx, rx) = mpsc::unbounded_channel();
            self.gateway.register(id, tx).await;
            rx
        }
    }

    fn next(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> ServerEvent {
        rx.try_recv().expect("expected a queued event")
    }

    fn assert_empty(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) {
        assert!(rx.try_recv().is_err(), "expected no queued events");
    }

    #[tokio::test]
    async fn test_join_unknown_room_reports_error() {
        let harness = Harness::new();
        let mut rx = harness.attach(1).await;

        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::JoinQuiz {
                    room_code: "99999999".into(),
                    username: "alice".into(),
                },
            )
            .await;

        assert_eq!(
            next(&mut rx),
            ServerEvent::Error {
                message: "Quiz room not found".into()
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let harness = Harness::new();
        let mut host_rx = harness.attach(1).await;
        let mut first_rx = harness.attach(2).await;
        let mut second_rx = harness.attach(3).await;

        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("12345678"),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::JoinQuiz {
                    room_code: "12345678".into(),
                    username: "alice".into(),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                3,
                ClientEvent::JoinQuiz {
                    room_code: "12345678".into(),
                    username: "alice".into(),
                },
            )
            .await;

        assert!(matches!(next(&mut first_rx), ServerEvent::QuizJoined { .. }));
        assert_eq!(
            next(&mut second_rx),
            ServerEvent::Error {
                message: "Username already taken".into()
            }
        );

        // Join notice went to the host once; the rejected join produced none
        assert!(matches!(
            next(&mut host_rx),
            ServerEvent::ParticipantJoined { .. }
        ));
        assert_empty(&mut host_rx);

        let session = harness.registry.get("12345678").await.unwrap();
        assert_eq!(session.read().await.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_start_for_unknown_room_is_silent() {
        let harness = Harness::new();
        let mut rx = harness.attach(1).await;

        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::StartQuiz {
                    room_code: "99999999".into(),
                },
            )
            .await;

        assert_empty(&mut rx);
    }

    #[tokio::test]
    async fn test_join_notice_skips_the_joiner() {
        let harness = Harness::new();
        let mut host_rx = harness.attach(1).await;
        let mut alice_rx = harness.attach(2).await;

        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("12345678"),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::JoinQuiz {
                    room_code: "12345678".into(),
                    username: "alice".into(),
                },
            )
            .await;

        let ServerEvent::QuizJoined {
            current_question,
            total_questions,
            participants,
            ..
        } = next(&mut alice_rx)
        else {
            panic!("expected quizJoined");
        };
        assert_eq!(current_question, -1);
        assert_eq!(total_questions, 2);
        assert_eq!(participants.len(), 1);
        // The joiner gets the snapshot but not its own join notice
        assert_empty(&mut alice_rx);

        let ServerEvent::ParticipantJoined { message, .. } = next(&mut host_rx) else {
            panic!("expected participantJoined");
        };
        assert_eq!(message, "alice joined the quiz");
    }

    #[tokio::test]
    async fn test_full_quiz_flow() {
        let harness = Harness::new();
        let mut host_rx = harness.attach(1).await;
        let mut alice_rx = harness.attach(2).await;

        // Host initializes and starts the room
        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("12345678"),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::StartQuiz {
                    room_code: "12345678".into(),
                },
            )
            .await;

        let ServerEvent::QuestionStart {
            question_number,
            total_questions,
            question,
        } = next(&mut host_rx)
        else {
            panic!("expected questionStart");
        };
        assert_eq!(question_number, 1);
        assert_eq!(total_questions, 2);
        assert_eq!(question.id, "q1");

        // Alice joins mid-question and answers correctly
        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::JoinQuiz {
                    room_code: "12345678".into(),
                    username: "alice".into(),
                },
            )
            .await;
        let ServerEvent::QuizJoined { current_question, .. } = next(&mut alice_rx) else {
            panic!("expected quizJoined");
        };
        assert_eq!(current_question, 0);
        assert!(matches!(next(&mut host_rx), ServerEvent::ParticipantJoined { .. }));

        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::SubmitAnswer {
                    room_code: "12345678".into(),
                    answer: "Paris".into(),
                },
            )
            .await;

        assert_eq!(
            next(&mut alice_rx),
            ServerEvent::AnswerFeedback {
                is_correct: true,
                correct_answer: "Paris".into(),
            }
        );
        let ServerEvent::ScoreUpdate { participants } = next(&mut alice_rx) else {
            panic!("expected scoreUpdate");
        };
        assert_eq!(participants[0].score, 10);
        assert!(matches!(next(&mut host_rx), ServerEvent::ScoreUpdate { .. }));

        // Second question; alice answers wrong
        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::NextQuestion {
                    room_code: "12345678".into(),
                },
            )
            .await;
        let ServerEvent::QuestionStart { question_number, .. } = next(&mut alice_rx) else {
            panic!("expected questionStart");
        };
        assert_eq!(question_number, 2);
        assert!(matches!(next(&mut host_rx), ServerEvent::QuestionStart { .. }));

        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::SubmitAnswer {
                    room_code: "12345678".into(),
                    answer: "Seville".into(),
                },
            )
            .await;
        assert_eq!(
            next(&mut alice_rx),
            ServerEvent::AnswerFeedback {
                is_correct: false,
                correct_answer: "Madrid".into(),
            }
        );
        let ServerEvent::ScoreUpdate { participants } = next(&mut alice_rx) else {
            panic!("expected scoreUpdate");
        };
        assert_eq!(participants[0].score, 10);
        assert!(matches!(next(&mut host_rx), ServerEvent::ScoreUpdate { .. }));

        // Past the last question the quiz ends
        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::NextQuestion {
                    room_code: "12345678".into(),
                },
            )
            .await;

        let ServerEvent::QuizEnd { final_scores, .. } = next(&mut alice_rx) else {
            panic!("expected quizEnd");
        };
        assert_eq!(
            final_scores,
            vec![ParticipantSummary {
                username: "alice".into(),
                score: 10,
            }]
        );
        assert!(matches!(next(&mut host_rx), ServerEvent::QuizEnd { .. }));

        let session = harness.registry.get("12345678").await.unwrap();
        assert!(!session.read().await.is_active);

        // One more nextQuestion is a no-op
        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::NextQuestion {
                    room_code: "12345678".into(),
                },
            )
            .await;
        assert_empty(&mut host_rx);
        assert_empty(&mut alice_rx);
    }

    #[tokio::test]
    async fn test_lock_first_policy_over_the_wire() {
        let config =
            RegistryConfig::default().answer_policy(AnswerPolicy::LockFirstAnswer);
        let harness = Harness::with_config(config);
        let _host_rx = harness.attach(1).await;
        let _alice_rx = harness.attach(2).await;

        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("12345678"),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::JoinQuiz {
                    room_code: "12345678".into(),
                    username: "alice".into(),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::StartQuiz {
                    room_code: "12345678".into(),
                },
            )
            .await;

        for _ in 0..2 {
            harness
                .dispatcher
                .handle_event(
                    2,
                    ClientEvent::SubmitAnswer {
                        room_code: "12345678".into(),
                        answer: "Paris".into(),
                    },
                )
                .await;
        }

        let session = harness.registry.get("12345678").await.unwrap();
        assert_eq!(session.read().await.participants[0].score, 10);
    }

    #[tokio::test]
    async fn test_disconnect_removes_participant_from_its_room_only() {
        let harness = Harness::new();
        let mut host_a_rx = harness.attach(1).await;
        let mut host_b_rx = harness.attach(2).await;
        let mut alice_rx = harness.attach(3).await;
        let mut bob_rx = harness.attach(4).await;

        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("11111111"),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("22222222"),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                3,
                ClientEvent::JoinQuiz {
                    room_code: "11111111".into(),
                    username: "alice".into(),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                4,
                ClientEvent::JoinQuiz {
                    room_code: "22222222".into(),
                    username: "bob".into(),
                },
            )
            .await;
        let _ = next(&mut host_a_rx);
        let _ = next(&mut host_b_rx);
        let _ = next(&mut alice_rx);
        let _ = next(&mut bob_rx);

        harness.dispatcher.handle_disconnect(3).await;

        let ServerEvent::ParticipantLeft { participants, message } = next(&mut host_a_rx)
        else {
            panic!("expected participantLeft");
        };
        assert!(participants.is_empty());
        assert_eq!(message, "alice has left the quiz");
        assert_empty(&mut host_b_rx);
        assert_empty(&mut bob_rx);

        let room_a = harness.registry.get("11111111").await.unwrap();
        let room_b = harness.registry.get("22222222").await.unwrap();
        assert!(room_a.read().await.participants.is_empty());
        assert_eq!(room_b.read().await.participants.len(), 1);

        // Tearing down the same connection again finds nothing
        harness.dispatcher.handle_disconnect(3).await;
        assert_empty(&mut host_a_rx);
    }

    #[tokio::test]
    async fn test_initialize_replaces_room_at_same_code() {
        let harness = Harness::new();
        let _host_rx = harness.attach(1).await;
        let mut alice_rx = harness.attach(2).await;

        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("12345678"),
                },
            )
            .await;
        harness
            .dispatcher
            .handle_event(
                2,
                ClientEvent::JoinQuiz {
                    room_code: "12345678".into(),
                    username: "alice".into(),
                },
            )
            .await;
        let _ = next(&mut alice_rx);

        // Re-initializing wipes the participant list (last write wins)
        harness
            .dispatcher
            .handle_event(
                1,
                ClientEvent::InitializeQuiz {
                    quiz: sample_quiz("12345678"),
                },
            )
            .await;

        let session = harness.registry.get("12345678").await.unwrap();
        assert!(session.read().await.participants.is_empty());
    }
}
