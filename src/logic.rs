//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Assembling per-user snapshots (profile, lessons, challenges, badges)
//!   - The quiz gate: score an attempt, and on a pass run the completion
//!     flow (complete lesson, award its points, fifth-lesson badge)
//!   - The challenge join flow
//!   - The leaderboard view

use std::collections::HashMap;

use tracing::{info, instrument, warn};

use crate::progression::{
  passes_quiz, quiz_score, Outcome, CLIMATE_CHAMPION_BADGE_ID, CLIMATE_CHAMPION_LESSON_COUNT,
};
use crate::protocol::{
  to_badge_out, to_challenge_out, to_earned_badge_out, to_lesson_out, to_profile_out,
  to_quiz_question_out, BadgeOut, ChallengeOut, LeaderboardEntryOut, LessonDetailOut, LessonOut,
  ProfileOut, QuizResultOut,
};
use crate::state::AppState;

/// Outcome of a join request, ready for either transport.
pub enum JoinReply {
  Joined(ChallengeOut),
  AlreadyJoined(ChallengeOut),
  Unknown,
}

pub async fn profile_snapshot(state: &AppState, user_id: &str) -> Option<ProfileOut> {
  state.profile(user_id).await.map(|p| to_profile_out(&p))
}

/// Lesson catalog with this user's `completed` flags derived from the ledger.
pub async fn lessons_snapshot(state: &AppState, user_id: &str) -> Vec<LessonOut> {
  let ledger = state.ledger(user_id).await.unwrap_or_default();
  state
    .lessons_sorted()
    .await
    .iter()
    .map(|l| to_lesson_out(l, ledger.lesson_completed(&l.id)))
    .collect()
}

/// One lesson plus its reading sections and quiz (answer key stripped).
pub async fn lesson_detail(state: &AppState, user_id: &str, lesson_id: &str) -> Option<LessonDetailOut> {
  let lesson = state.lesson(lesson_id).await?;
  let content = state.lesson_content(lesson_id).await.unwrap_or_default();
  let completed = state
    .ledger(user_id)
    .await
    .map(|l| l.lesson_completed(lesson_id))
    .unwrap_or(false);
  Some(LessonDetailOut {
    lesson: to_lesson_out(&lesson, completed),
    sections: content.sections,
    quiz: content.quiz.iter().map(to_quiz_question_out).collect(),
  })
}

pub async fn challenges_snapshot(state: &AppState, user_id: &str) -> Vec<ChallengeOut> {
  let ledger = state.ledger(user_id).await.unwrap_or_default();
  state
    .challenges_sorted()
    .await
    .iter()
    .map(|c| to_challenge_out(c, ledger.challenge_joined(&c.id)))
    .collect()
}

/// Badge catalog with this user's earn state and timestamps.
pub async fn badges_snapshot(state: &AppState, user_id: &str) -> Vec<BadgeOut> {
  let earned_at: HashMap<String, _> = state
    .profile(user_id)
    .await
    .map(|p| p.badges.iter().map(|e| (e.badge.id.clone(), e.earned_at)).collect())
    .unwrap_or_default();
  state
    .badges_sorted()
    .await
    .iter()
    .map(|b| to_badge_out(b, earned_at.get(&b.id).copied()))
    .collect()
}

/// Profiles ranked by points descending, with 1-based ranks.
pub async fn leaderboard_snapshot(state: &AppState) -> Vec<LeaderboardEntryOut> {
  state
    .leaderboard()
    .await
    .iter()
    .enumerate()
    .map(|(i, p)| LeaderboardEntryOut {
      rank: i as u32 + 1,
      id: p.id.clone(),
      name: p.name.clone(),
      school: p.school.clone(),
      points: p.points,
      level: p.level(),
    })
    .collect()
}

/// Score a quiz attempt and, on a pass, run the completion flow.
///
/// A failing attempt mutates nothing and may be retried indefinitely. A
/// passing attempt completes the lesson and awards its points exactly once;
/// if the lesson was already completed the score is re-reported with
/// `already_completed` set and nothing awarded. The fifth distinct completed
/// lesson additionally earns the Climate Champion badge (at most once).
///
/// Returns `None` when the lesson or user id is unknown.
#[instrument(level = "info", skip(state, answers), fields(%user_id, %lesson_id))]
pub async fn submit_quiz(
  state: &AppState,
  user_id: &str,
  lesson_id: &str,
  answers: &HashMap<usize, String>,
) -> Option<QuizResultOut> {
  if state.lesson(lesson_id).await.is_none() {
    warn!(target: "progression", %lesson_id, "Quiz submission for unknown lesson");
    return None;
  }
  // A lesson without content has an empty quiz: score 0, automatic fail.
  let content = state.lesson_content(lesson_id).await.unwrap_or_default();
  let score = quiz_score(&content.quiz, answers);

  if !passes_quiz(score) {
    let profile = state.profile(user_id).await?;
    info!(target: "progression", %user_id, %lesson_id, score, "Quiz failed, no mutation");
    return Some(QuizResultOut {
      score,
      passed: false,
      points_awarded: 0,
      already_completed: false,
      badge: None,
      points: profile.points,
      level: profile.level(),
    });
  }

  match state.complete_lesson(user_id, lesson_id).await {
    Outcome::NotFound => None,
    Outcome::AlreadyDone => {
      let profile = state.profile(user_id).await?;
      info!(target: "progression", %user_id, %lesson_id, score, "Quiz passed, lesson already completed");
      Some(QuizResultOut {
        score,
        passed: true,
        points_awarded: 0,
        already_completed: true,
        badge: None,
        points: profile.points,
        level: profile.level(),
      })
    }
    Outcome::Applied(awarded) => {
      let (points, level) = match state.update_points(user_id, awarded as i64).await {
        Outcome::Applied(pl) => pl,
        _ => return None,
      };

      let completed = state
        .ledger(user_id)
        .await
        .map(|l| l.completed_lesson_count())
        .unwrap_or(0);
      let badge = if completed >= CLIMATE_CHAMPION_LESSON_COUNT {
        match state.earn_badge(user_id, CLIMATE_CHAMPION_BADGE_ID).await {
          Outcome::Applied(earned) => Some(to_earned_badge_out(&earned)),
          _ => None,
        }
      } else {
        None
      };

      info!(
        target: "progression",
        %user_id, %lesson_id, score, awarded, points, level,
        badge = badge.is_some(),
        "Quiz passed, lesson completed"
      );
      Some(QuizResultOut {
        score,
        passed: true,
        points_awarded: awarded,
        already_completed: false,
        badge,
        points,
        level,
      })
    }
  }
}

/// Join a challenge for this user. A repeat join reports the unchanged
/// challenge instead of double-counting.
#[instrument(level = "info", skip(state), fields(%user_id, %challenge_id))]
pub async fn join_challenge_flow(state: &AppState, user_id: &str, challenge_id: &str) -> JoinReply {
  match state.join_challenge(user_id, challenge_id).await {
    Outcome::Applied(challenge) => JoinReply::Joined(to_challenge_out(&challenge, true)),
    Outcome::AlreadyDone => match state.challenge(challenge_id).await {
      Some(challenge) => JoinReply::AlreadyJoined(to_challenge_out(&challenge, true)),
      None => JoinReply::Unknown,
    },
    Outcome::NotFound => JoinReply::Unknown,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Lesson, LessonContent, LessonDifficulty, QuizQuestion};
  use crate::state::AppState;

  /// Answer map choosing the correct option for every question.
  fn all_correct(content: &LessonContent) -> HashMap<usize, String> {
    content
      .quiz
      .iter()
      .enumerate()
      .map(|(i, q)| (i, q.correct.clone()))
      .collect()
  }

  async fn fresh_learner(state: &AppState, id: &str) {
    state.create_profile(id, "Meera Iyer", "meera@student.edu").await;
  }

  /// Add a one-question lesson so tests can reach the fifth completion.
  async fn add_quiz_lesson(state: &AppState, id: &str, points: u32) {
    state.lessons.write().await.insert(
      id.to_string(),
      Lesson {
        id: id.to_string(),
        title: format!("Extra Lesson {id}"),
        description: "Extra seed for progression tests".into(),
        category: "Climate".into(),
        duration: "10 min".into(),
        difficulty: LessonDifficulty::Beginner,
        points,
        sdg_goals: vec![13],
      },
    );
    state.lesson_content.write().await.insert(
      id.to_string(),
      LessonContent {
        sections: vec![],
        quiz: vec![QuizQuestion {
          question: "Ready?".into(),
          options: vec!["Yes".into(), "No".into()],
          correct: "Yes".into(),
        }],
      },
    );
  }

  async fn pass_quiz(state: &AppState, user_id: &str, lesson_id: &str) -> QuizResultOut {
    let content = state.lesson_content(lesson_id).await.unwrap();
    submit_quiz(state, user_id, lesson_id, &all_correct(&content))
      .await
      .expect("known lesson")
  }

  #[tokio::test]
  async fn failing_quiz_mutates_nothing_and_allows_retry() {
    let state = AppState::new();
    fresh_learner(&state, "u1").await;

    // Lesson 1 has a 2-question quiz: one correct answer scores 50.
    let content = state.lesson_content("1").await.unwrap();
    let mut answers = all_correct(&content);
    answers.insert(1, "Natural variations".into());

    let result = submit_quiz(&state, "u1", "1", &answers).await.unwrap();
    assert_eq!(result.score, 50.0);
    assert!(!result.passed);
    assert_eq!(result.points_awarded, 0);
    assert_eq!(result.points, 0);

    let ledger = state.ledger("u1").await.unwrap();
    assert!(!ledger.lesson_completed("1"));

    // Retry with a full-marks attempt succeeds.
    let retry = pass_quiz(&state, "u1", "1").await;
    assert!(retry.passed);
    assert_eq!(retry.points_awarded, 100);
  }

  #[tokio::test]
  async fn passing_quiz_awards_lesson_points_exactly_once() {
    let state = AppState::new();
    fresh_learner(&state, "u1").await;

    let first = pass_quiz(&state, "u1", "2").await;
    assert!(first.passed);
    assert!(!first.already_completed);
    assert_eq!(first.points_awarded, 120);
    assert_eq!(first.points, 120);
    assert_eq!(first.level, 1);

    // Re-submitting the same passing quiz re-reports the score but does not
    // re-award.
    let second = pass_quiz(&state, "u1", "2").await;
    assert!(second.passed);
    assert!(second.already_completed);
    assert_eq!(second.points_awarded, 0);
    assert_eq!(second.points, 120);
  }

  #[tokio::test]
  async fn points_crossing_a_level_boundary_report_the_new_level() {
    let state = AppState::new();
    fresh_learner(&state, "u1").await;
    add_quiz_lesson(&state, "90", 450).await;
    add_quiz_lesson(&state, "91", 100).await;

    let first = pass_quiz(&state, "u1", "90").await;
    assert_eq!((first.points, first.level), (450, 1));

    // 450 + 100 crosses 500: the reported level must come from the new total.
    let second = pass_quiz(&state, "u1", "91").await;
    assert_eq!((second.points, second.level), (550, 2));
  }

  #[tokio::test]
  async fn fifth_lesson_earns_climate_champion_exactly_once() {
    let state = AppState::new();
    fresh_learner(&state, "u1").await;
    add_quiz_lesson(&state, "5", 80).await;
    add_quiz_lesson(&state, "6", 80).await;

    for lesson_id in ["1", "2", "3", "4"] {
      let result = pass_quiz(&state, "u1", lesson_id).await;
      assert!(result.passed);
      assert!(result.badge.is_none(), "no badge before the fifth lesson");
    }

    let fifth = pass_quiz(&state, "u1", "5").await;
    let badge = fifth.badge.expect("fifth lesson earns the badge");
    assert_eq!(badge.name, "Climate Champion");

    let sixth = pass_quiz(&state, "u1", "6").await;
    assert!(sixth.badge.is_none(), "sixth lesson must not re-earn");

    let profile = state.profile("u1").await.unwrap();
    let champions = profile
      .badges
      .iter()
      .filter(|b| b.badge.id == CLIMATE_CHAMPION_BADGE_ID)
      .count();
    assert_eq!(champions, 1);
  }

  #[tokio::test]
  async fn unknown_lesson_returns_none_and_touches_nothing() {
    let state = AppState::new();
    let before = serde_json::to_string(&lessons_snapshot(&state, "1").await).unwrap();
    let result = submit_quiz(&state, "1", "does-not-exist", &HashMap::new()).await;
    assert!(result.is_none());
    let after = serde_json::to_string(&lessons_snapshot(&state, "1").await).unwrap();
    assert_eq!(before, after);
  }

  #[tokio::test]
  async fn lesson_detail_strips_the_answer_key() {
    let state = AppState::new();
    let detail = lesson_detail(&state, "1", "1").await.unwrap();
    assert!(!detail.quiz.is_empty());
    let serialized = serde_json::to_string(&detail).unwrap();
    assert!(!serialized.contains("\"correct\""));
  }

  #[tokio::test]
  async fn snapshots_show_per_user_completion_views() {
    let state = AppState::new();
    fresh_learner(&state, "u1").await;

    // The demo learner has lesson 1 behind them; a fresh learner does not.
    let demo_lessons = lessons_snapshot(&state, "1").await;
    assert!(demo_lessons.iter().find(|l| l.id == "1").unwrap().completed);
    let fresh_lessons = lessons_snapshot(&state, "u1").await;
    assert!(!fresh_lessons.iter().find(|l| l.id == "1").unwrap().completed);
  }

  #[tokio::test]
  async fn join_flow_reports_repeat_joins_without_double_count() {
    let state = AppState::new();
    let baseline = state.challenge("1").await.unwrap().participants;

    match join_challenge_flow(&state, "1", "1").await {
      JoinReply::Joined(c) => assert_eq!(c.participants, baseline + 1),
      _ => panic!("expected Joined"),
    }
    match join_challenge_flow(&state, "1", "1").await {
      JoinReply::AlreadyJoined(c) => assert_eq!(c.participants, baseline + 1),
      _ => panic!("expected AlreadyJoined"),
    }
    assert!(matches!(
      join_challenge_flow(&state, "1", "nope").await,
      JoinReply::Unknown
    ));
  }

  #[tokio::test]
  async fn leaderboard_ranks_are_one_based_and_ordered() {
    let state = AppState::new();
    fresh_learner(&state, "u1").await;
    let board = leaderboard_snapshot(&state).await;
    assert_eq!(board[0].rank, 1);
    assert_eq!(board[0].id, "1");
    assert_eq!(board[1].rank, 2);
    assert!(board[0].points >= board[1].points);
  }
}
