//! Scripted quiz session example
//!
//! Run with: cargo run --example scripted_session
//!
//! Spins up an in-process server on an ephemeral port, then plays one full
//! quiz with a host bot and two participant bots: initialize, start, answer,
//! advance, final standings.

use std::sync::Arc;

use quizsync::client::QuizClient;
use quizsync::{Question, Quiz, QuizServer, ServerConfig, ServerEvent};

fn demo_quiz() -> Quiz {
    Quiz {
        title: "Capitals".into(),
        description: "A quick tour of European capitals".into(),
        questions: vec![
            Question {
                id: "q1".into(),
                question_text: "What is the capital of France?".into(),
                options: vec!["Paris".into(), "Lyon".into(), "Marseille".into()],
                correct_answer: "Paris".into(),
            },
            Question {
                id: "q2".into(),
                question_text: "What is the capital of Spain?".into(),
                options: vec!["Seville".into(), "Madrid".into(), "Valencia".into()],
                correct_answer: "Madrid".into(),
            },
        ],
        room_code: "12345678".into(),
    }
}

/// Read events until the next one matching `want`, printing everything seen.
async fn wait_for(
    client: &mut QuizClient,
    who: &str,
    want: impl Fn(&ServerEvent) -> bool,
) -> Result<ServerEvent, Box<dyn std::error::Error>> {
    loop {
        let Some(event) = client.next_event().await? else {
            return Err("connection closed early".into());
        };
        println!("[{}] {:?}", who, event);
        if want(&event) {
            return Ok(event);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizsync=info".parse()?),
        )
        .init();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = Arc::new(QuizServer::new(ServerConfig::default()));
    let server_task = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            let _ = server.run_on(listener).await;
        })
    };

    let url = format!("ws://{}", addr);
    let quiz = demo_quiz();
    let room = quiz.room_code.clone();

    let mut host = QuizClient::connect(&url).await?;
    host.initialize_quiz(quiz).await?;

    let mut alice = QuizClient::connect(&url).await?;
    alice.join_quiz(&room, "alice").await?;
    wait_for(&mut alice, "alice", |e| matches!(e, ServerEvent::QuizJoined { .. })).await?;

    let mut bob = QuizClient::connect(&url).await?;
    bob.join_quiz(&room, "bob").await?;
    wait_for(&mut bob, "bob", |e| matches!(e, ServerEvent::QuizJoined { .. })).await?;

    host.start_quiz(&room).await?;
    wait_for(&mut host, "host", |e| matches!(e, ServerEvent::QuestionStart { .. })).await?;

    // Round 1: alice is right, bob is wrong
    alice.submit_answer(&room, "Paris").await?;
    wait_for(&mut alice, "alice", |e| matches!(e, ServerEvent::AnswerFeedback { .. })).await?;
    bob.submit_answer(&room, "Lyon").await?;
    wait_for(&mut bob, "bob", |e| matches!(e, ServerEvent::AnswerFeedback { .. })).await?;

    // Round 2: both are right
    host.next_question(&room).await?;
    wait_for(&mut alice, "alice", |e| matches!(e, ServerEvent::QuestionStart { .. })).await?;
    alice.submit_answer(&room, "Madrid").await?;
    wait_for(&mut alice, "alice", |e| matches!(e, ServerEvent::AnswerFeedback { .. })).await?;
    bob.submit_answer(&room, "Madrid").await?;
    wait_for(&mut bob, "bob", |e| matches!(e, ServerEvent::AnswerFeedback { .. })).await?;

    host.next_question(&room).await?;
    let end = wait_for(&mut host, "host", |e| matches!(e, ServerEvent::QuizEnd { .. })).await?;

    if let ServerEvent::QuizEnd { final_scores, .. } = end {
        println!();
        println!("Final standings:");
        for (rank, entry) in final_scores.iter().enumerate() {
            println!("  {}. {} — {} points", rank + 1, entry.username, entry.score);
        }
    }

    let stats = server.stats().await;
    println!();
    println!(
        "Server stats: {} connections total, {} active, {} sessions",
        stats.total_connections, stats.active_connections, stats.active_sessions
    );

    host.close().await?;
    alice.close().await?;
    bob.close().await?;
    server_task.abort();

    Ok(())
}
