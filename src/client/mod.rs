//! Quiz session client
//!
//! High-level API for driving a quiz server: hosts initialize and advance
//! quizzes, participants join and answer. Used by the example bots and the
//! end-to-end tests; a browser client speaks the same protocol.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::Result;
use crate::protocol::codec;
use crate::protocol::{ClientEvent, Quiz, ServerEvent};

/// Client connection to a quiz server
///
/// # Example
/// ```no_run
/// use quizsync::client::QuizClient;
///
/// # async fn example() -> quizsync::error::Result<()> {
/// let mut client = QuizClient::connect("ws://localhost:3001").await?;
/// client.join_quiz("12345678", "alice").await?;
///
/// while let Some(event) = client.next_event().await? {
///     println!("Event: {:?}", event);
/// }
/// # Ok(())
/// # }
/// ```
pub struct QuizClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl QuizClient {
    /// Connect to a quiz server
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _response) = connect_async(url).await?;
        Ok(Self { ws })
    }

    /// Send a raw client event
    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let message = codec::encode(event)?;
        self.ws.send(message).await?;
        Ok(())
    }

    /// Create (or replace) the room for a quiz, as host
    pub async fn initialize_quiz(&mut self, quiz: Quiz) -> Result<()> {
        self.send(&ClientEvent::InitializeQuiz { quiz }).await
    }

    /// Start the quiz, as host
    pub async fn start_quiz(&mut self, room_code: &str) -> Result<()> {
        self.send(&ClientEvent::StartQuiz {
            room_code: room_code.to_string(),
        })
        .await
    }

    /// Join a room under a display name
    pub async fn join_quiz(&mut self, room_code: &str, username: &str) -> Result<()> {
        self.send(&ClientEvent::JoinQuiz {
            room_code: room_code.to_string(),
            username: username.to_string(),
        })
        .await
    }

    /// Submit an answer to the current question
    pub async fn submit_answer(&mut self, room_code: &str, answer: &str) -> Result<()> {
        self.send(&ClientEvent::SubmitAnswer {
            room_code: room_code.to_string(),
            answer: answer.to_string(),
        })
        .await
    }

    /// Advance to the next question (or end the quiz), as host
    pub async fn next_question(&mut self, room_code: &str) -> Result<()> {
        self.send(&ClientEvent::NextQuestion {
            room_code: room_code.to_string(),
        })
        .await
    }

    /// Wait for the next server event
    ///
    /// Returns `None` once the connection is closed. Non-text frames are
    /// skipped.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        while let Some(frame) = self.ws.next().await {
            match frame? {
                Message::Text(text) => return Ok(Some(codec::decode(&text)?)),
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Close the connection
    pub async fn close(&mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
