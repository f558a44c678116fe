//! Domain models used by the backend: learner profile, the lesson, challenge
//! and badge catalogs, and the quiz shapes that gate lesson completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points required to advance one level.
pub const POINTS_PER_LEVEL: u32 = 500;

/// Level is derived, never stored: recompute it from the points total every
/// time the total changes.
pub fn level_for_points(points: u32) -> u32 {
  points / POINTS_PER_LEVEL + 1
}

/// How demanding a lesson is for the learner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LessonDifficulty {
  Beginner,
  Intermediate,
  Advanced,
}
impl Default for LessonDifficulty {
  fn default() -> Self { LessonDifficulty::Beginner }
}

/// How demanding a challenge campaign is.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeDifficulty {
  Easy,
  Medium,
  Hard,
}
impl Default for ChallengeDifficulty {
  fn default() -> Self { ChallengeDifficulty::Medium }
}

/// Lifecycle of a challenge campaign.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
  Active,
  Upcoming,
  Completed,
}
impl Default for ChallengeStatus {
  fn default() -> Self { ChallengeStatus::Upcoming }
}

/// Badge rarity tiers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
  Common,
  Rare,
  Epic,
  Legendary,
}

/// A learning unit in the catalog. Completion is per-user state held in the
/// progress ledger, not a flag on this shared record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
  pub id: String,
  pub title: String,
  pub description: String,
  pub category: String,
  pub duration: String,
  pub difficulty: LessonDifficulty,
  pub points: u32,
  #[serde(default)] pub sdg_goals: Vec<u8>,
}

/// One reading section of a lesson.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
  pub title: String,
  pub body: String,
}

/// A quiz question with a single correct option.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub correct: String,
}

/// Sections plus the end-of-lesson quiz that gates completion.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LessonContent {
  #[serde(default)] pub sections: Vec<Section>,
  #[serde(default)] pub quiz: Vec<QuizQuestion>,
}

/// A multi-participant action campaign. `participants` is the seed baseline
/// plus one per distinct user join record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
  pub id: String,
  pub title: String,
  pub description: String,
  pub category: String,
  pub difficulty: ChallengeDifficulty,
  pub points: u32,
  pub duration: String,
  pub participants: u32,
  pub status: ChallengeStatus,
  #[serde(default)] pub progress: Option<u8>,
}

/// Catalog badge definition. Earning copies it onto the profile with a
/// timestamp; the catalog entry itself never changes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Badge {
  pub id: String,
  pub name: String,
  pub description: String,
  pub icon: String,
  pub rarity: BadgeRarity,
}

/// A catalog badge awarded to a user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EarnedBadge {
  pub badge: Badge,
  pub earned_at: DateTime<Utc>,
}

/// The learner's gamification record. `level` is intentionally absent: it is
/// a pure function of `points` (see [`level_for_points`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
  pub id: String,
  pub name: String,
  pub email: String,
  pub school: String,
  pub grade: String,
  #[serde(default)] pub avatar: String,
  pub points: u32,
  pub streak: u32,
  #[serde(default)] pub badges: Vec<EarnedBadge>,
}

impl UserProfile {
  pub fn level(&self) -> u32 {
    level_for_points(self.points)
  }

  pub fn has_badge(&self, badge_id: &str) -> bool {
    self.badges.iter().any(|b| b.badge.id == badge_id)
  }
}
