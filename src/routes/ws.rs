//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "ecolearn_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "ecolearn_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "ecolearn_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => {
            debug!(target = "ecolearn_backend", raw = %trunc_for_log(&txt, 256), "WS message rejected");
            ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }
          }
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "ecolearn_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "ecolearn_backend", "WebSocket disconnected");
}

fn resolve_user(state: &AppState, user_id: Option<String>) -> String {
  user_id.unwrap_or_else(|| state.demo_user_id.clone())
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Profile { user_id } => {
      let user_id = resolve_user(state, user_id);
      match profile_snapshot(state, &user_id).await {
        Some(profile) => ServerWsMessage::Profile { profile },
        None => ServerWsMessage::Error { message: format!("Unknown userId: {}", user_id) },
      }
    }

    ClientWsMessage::Lessons { user_id } => {
      let user_id = resolve_user(state, user_id);
      ServerWsMessage::Lessons { lessons: lessons_snapshot(state, &user_id).await }
    }

    ClientWsMessage::Challenges { user_id } => {
      let user_id = resolve_user(state, user_id);
      ServerWsMessage::Challenges { challenges: challenges_snapshot(state, &user_id).await }
    }

    ClientWsMessage::Badges { user_id } => {
      let user_id = resolve_user(state, user_id);
      ServerWsMessage::Badges { badges: badges_snapshot(state, &user_id).await }
    }

    ClientWsMessage::SubmitQuiz { user_id, lesson_id, answers } => {
      let user_id = resolve_user(state, user_id);
      match submit_quiz(state, &user_id, &lesson_id, &answers).await {
        Some(result) => {
          tracing::info!(
            target: "progression",
            id = %lesson_id, passed = result.passed,
            score = %format!("{:.1}", result.score),
            "WS quiz evaluated"
          );
          ServerWsMessage::QuizResult { result }
        }
        None => ServerWsMessage::Error { message: format!("Unknown lessonId: {}", lesson_id) },
      }
    }

    ClientWsMessage::JoinChallenge { user_id, challenge_id } => {
      let user_id = resolve_user(state, user_id);
      match join_challenge_flow(state, &user_id, &challenge_id).await {
        JoinReply::Joined(challenge) => {
          tracing::info!(target: "progression", id = %challenge_id, "WS challenge joined");
          ServerWsMessage::ChallengeJoined { challenge, already_joined: false }
        }
        JoinReply::AlreadyJoined(challenge) => {
          ServerWsMessage::ChallengeJoined { challenge, already_joined: true }
        }
        JoinReply::Unknown =>
          ServerWsMessage::Error { message: format!("Unknown challengeId: {}", challenge_id) },
      }
    }
  }
}
