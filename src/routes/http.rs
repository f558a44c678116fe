//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs include parameters and basic result info.
//!
//! Progression endpoints default to the demo learner when no `userId` is
//! supplied. Failures (unknown id, duplicate registration, bad credentials)
//! come back as friendly `success:false` JSON, never as a crash.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::header::SET_COOKIE,
  response::{AppendHeaders, IntoResponse},
  Json,
};
use tracing::{info, instrument};

use crate::auth::{issue_token, AuthError, Role, TOKEN_TTL_DAYS};
use crate::logic::*;
use crate::progression::Outcome;
use crate::protocol::*;
use crate::state::AppState;

fn resolve_user(state: &AppState, user_id: Option<String>) -> String {
  user_id.unwrap_or_else(|| state.demo_user_id.clone())
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(user_id = ?q.user_id))]
pub async fn http_get_profile(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, q.user_id);
  match profile_snapshot(&state, &user_id).await {
    Some(profile) => Json(profile).into_response(),
    None => Json(MessageOut { success: false, message: format!("Unknown userId: {}", user_id) })
      .into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(user_id = ?q.user_id))]
pub async fn http_get_lessons(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, q.user_id);
  Json(lessons_snapshot(&state, &user_id).await)
}

#[instrument(level = "info", skip(state), fields(%lesson_id, user_id = ?q.user_id))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Path(lesson_id): Path<String>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, q.user_id);
  match lesson_detail(&state, &user_id, &lesson_id).await {
    Some(detail) => Json(detail).into_response(),
    None => Json(MessageOut { success: false, message: format!("Unknown lessonId: {}", lesson_id) })
      .into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(user_id = ?q.user_id))]
pub async fn http_get_challenges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, q.user_id);
  Json(challenges_snapshot(&state, &user_id).await)
}

#[instrument(level = "info", skip(state), fields(user_id = ?q.user_id))]
pub async fn http_get_badges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, q.user_id);
  Json(badges_snapshot(&state, &user_id).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(leaderboard_snapshot(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.lesson_id, answers = body.answers.len()))]
pub async fn http_post_quiz(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuizIn>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, body.user_id.clone());
  match submit_quiz(&state, &user_id, &body.lesson_id, &body.answers).await {
    Some(result) => {
      info!(
        target: "progression",
        id = %body.lesson_id, passed = result.passed,
        score = %format!("{:.1}", result.score),
        "HTTP quiz evaluated"
      );
      Json(result).into_response()
    }
    None => Json(MessageOut {
      success: false,
      message: format!("Unknown lessonId: {}", body.lesson_id),
    })
    .into_response(),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.challenge_id))]
pub async fn http_post_join_challenge(
  State(state): State<Arc<AppState>>,
  Json(body): Json<JoinIn>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, body.user_id.clone());
  match join_challenge_flow(&state, &user_id, &body.challenge_id).await {
    JoinReply::Joined(challenge) => {
      info!(target: "progression", id = %body.challenge_id, "HTTP challenge joined");
      Json(JoinOut { challenge, already_joined: false }).into_response()
    }
    JoinReply::AlreadyJoined(challenge) => {
      Json(JoinOut { challenge, already_joined: true }).into_response()
    }
    JoinReply::Unknown => Json(MessageOut {
      success: false,
      message: format!("Unknown challengeId: {}", body.challenge_id),
    })
    .into_response(),
  }
}

#[instrument(level = "info", skip(state, body), fields(delta = body.delta))]
pub async fn http_post_points(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PointsIn>,
) -> impl IntoResponse {
  let user_id = resolve_user(&state, body.user_id.clone());
  match state.update_points(&user_id, body.delta).await {
    Outcome::Applied((points, level)) => Json(PointsOut { points, level }).into_response(),
    _ => Json(MessageOut { success: false, message: format!("Unknown userId: {}", user_id) })
      .into_response(),
  }
}

// -------- Account boundary --------

fn session_cookie(token: &str) -> String {
  format!("token={}; Path=/; HttpOnly; Max-Age={}", token, TOKEN_TTL_DAYS * 24 * 60 * 60)
}

fn clear_session_cookie() -> String {
  "token=; Path=/; HttpOnly; Max-Age=0".to_string()
}

fn auth_failure(role: Role, err: AuthError) -> AuthOut {
  let message = match err {
    AuthError::Duplicate => format!("{} already exists", role.label()),
    AuthError::UnknownAccount => format!("{} does not exist", role.label()),
    AuthError::InvalidCredentials => "Invalid credentials".to_string(),
    AuthError::Internal(message) => message,
  };
  AuthOut { success: false, message, user: None }
}

async fn register_flow(state: &AppState, role: Role, body: RegisterIn) -> axum::response::Response {
  match state
    .accounts
    .register(role, &body.first_name, &body.last_name, &body.email, &body.password)
    .await
  {
    Ok(account) => {
      // A student account gets a zero-progress learner profile so the
      // per-user ledgers have somewhere to live.
      if role == Role::Student {
        let name = format!("{} {}", account.first_name, account.last_name);
        state.create_profile(&account.id, name.trim(), &account.email).await;
      }
      match issue_token(&account.id) {
        Ok(token) => (
          AppendHeaders([(SET_COOKIE, session_cookie(&token))]),
          Json(AuthOut {
            success: true,
            message: format!("{} registered successfully", role.label()),
            user: Some(to_account_out(&account)),
          }),
        )
          .into_response(),
        Err(e) => Json(auth_failure(role, e)).into_response(),
      }
    }
    Err(e) => Json(auth_failure(role, e)).into_response(),
  }
}

async fn login_flow(state: &AppState, role: Role, body: LoginIn) -> axum::response::Response {
  match state.accounts.login(role, &body.email, &body.password).await {
    Ok(account) => match issue_token(&account.id) {
      Ok(token) => (
        AppendHeaders([(SET_COOKIE, session_cookie(&token))]),
        Json(AuthOut {
          success: true,
          message: format!("{} logged in successfully", role.label()),
          user: Some(to_account_out(&account)),
        }),
      )
        .into_response(),
      Err(e) => Json(auth_failure(role, e)).into_response(),
    },
    Err(e) => Json(auth_failure(role, e)).into_response(),
  }
}

fn logout_flow(role: Role) -> axum::response::Response {
  (
    AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
    Json(AuthOut {
      success: true,
      message: format!("{} logged out successfully", role.label()),
      user: None,
    }),
  )
    .into_response()
}

#[instrument(level = "info", skip(state, body), fields(email = %body.email))]
pub async fn http_user_register(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RegisterIn>,
) -> impl IntoResponse {
  register_flow(&state, Role::Student, body).await
}

#[instrument(level = "info", skip(state, body), fields(email = %body.email))]
pub async fn http_user_login(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LoginIn>,
) -> impl IntoResponse {
  login_flow(&state, Role::Student, body).await
}

#[instrument(level = "info")]
pub async fn http_user_logout() -> impl IntoResponse {
  logout_flow(Role::Student)
}

#[instrument(level = "info", skip(state, body), fields(email = %body.email))]
pub async fn http_teacher_register(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RegisterIn>,
) -> impl IntoResponse {
  register_flow(&state, Role::Teacher, body).await
}

#[instrument(level = "info", skip(state, body), fields(email = %body.email))]
pub async fn http_teacher_login(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LoginIn>,
) -> impl IntoResponse {
  login_flow(&state, Role::Teacher, body).await
}

#[instrument(level = "info")]
pub async fn http_teacher_logout() -> impl IntoResponse {
  logout_flow(Role::Teacher)
}
