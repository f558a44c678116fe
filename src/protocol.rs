//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Field names are camelCase on the wire where the frontend used them;
//! internal records stay snake_case and are converted here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Account, Role};
use crate::domain::{
    Badge, BadgeRarity, Challenge, ChallengeDifficulty, ChallengeStatus, EarnedBadge, Lesson,
    LessonDifficulty, QuizQuestion, Section, UserProfile,
};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Profile {
        #[serde(rename = "userId")]
        user_id: Option<String>,
    },
    Lessons {
        #[serde(rename = "userId")]
        user_id: Option<String>,
    },
    Challenges {
        #[serde(rename = "userId")]
        user_id: Option<String>,
    },
    Badges {
        #[serde(rename = "userId")]
        user_id: Option<String>,
    },
    SubmitQuiz {
        #[serde(rename = "userId")]
        user_id: Option<String>,
        #[serde(rename = "lessonId")]
        lesson_id: String,
        answers: HashMap<usize, String>,
    },
    JoinChallenge {
        #[serde(rename = "userId")]
        user_id: Option<String>,
        #[serde(rename = "challengeId")]
        challenge_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Profile {
        profile: ProfileOut,
    },
    Lessons {
        lessons: Vec<LessonOut>,
    },
    Challenges {
        challenges: Vec<ChallengeOut>,
    },
    Badges {
        badges: Vec<BadgeOut>,
    },
    QuizResult {
        result: QuizResultOut,
    },
    ChallengeJoined {
        challenge: ChallengeOut,
        #[serde(rename = "alreadyJoined")]
        already_joined: bool,
    },
    Error {
        message: String,
    },
}

/// Profile snapshot with the derived level baked in for the renderer.
#[derive(Debug, Serialize)]
pub struct ProfileOut {
    pub id: String,
    pub name: String,
    pub email: String,
    pub school: String,
    pub grade: String,
    pub avatar: String,
    pub points: u32,
    pub level: u32,
    pub streak: u32,
    pub badges: Vec<EarnedBadgeOut>,
}

#[derive(Debug, Serialize)]
pub struct EarnedBadgeOut {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: BadgeRarity,
    #[serde(rename = "earnedAt")]
    pub earned_at: DateTime<Utc>,
}

/// Catalog lesson plus this user's completion view.
#[derive(Debug, Serialize)]
pub struct LessonOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub difficulty: LessonDifficulty,
    pub points: u32,
    #[serde(rename = "sdgGoals")]
    pub sdg_goals: Vec<u8>,
    pub completed: bool,
}

/// Quiz question as delivered to the client: options only, no answer key.
#[derive(Debug, Serialize)]
pub struct QuizQuestionOut {
    pub question: String,
    pub options: Vec<String>,
}

/// Lesson detail: catalog record plus reading sections and the quiz.
#[derive(Debug, Serialize)]
pub struct LessonDetailOut {
    pub lesson: LessonOut,
    pub sections: Vec<Section>,
    pub quiz: Vec<QuizQuestionOut>,
}

/// Catalog challenge plus this user's participation view.
#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: ChallengeDifficulty,
    pub points: u32,
    pub duration: String,
    pub participants: u32,
    pub status: ChallengeStatus,
    pub progress: Option<u8>,
    pub joined: bool,
}

/// Catalog badge plus this user's earn view.
#[derive(Debug, Serialize)]
pub struct BadgeOut {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: BadgeRarity,
    pub earned: bool,
    #[serde(rename = "earnedAt")]
    pub earned_at: Option<DateTime<Utc>>,
}

/// Outcome of a quiz submission, covering both pass and fail paths.
#[derive(Debug, Serialize)]
pub struct QuizResultOut {
    pub score: f32,
    pub passed: bool,
    #[serde(rename = "pointsAwarded")]
    pub points_awarded: u32,
    #[serde(rename = "alreadyCompleted")]
    pub already_completed: bool,
    pub badge: Option<EarnedBadgeOut>,
    pub points: u32,
    pub level: u32,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntryOut {
    pub rank: u32,
    pub id: String,
    pub name: String,
    pub school: String,
    pub points: u32,
    pub level: u32,
}

// -------- Converters (internal record -> public DTO) --------

pub fn to_profile_out(p: &UserProfile) -> ProfileOut {
    ProfileOut {
        id: p.id.clone(),
        name: p.name.clone(),
        email: p.email.clone(),
        school: p.school.clone(),
        grade: p.grade.clone(),
        avatar: p.avatar.clone(),
        points: p.points,
        level: p.level(),
        streak: p.streak,
        badges: p.badges.iter().map(to_earned_badge_out).collect(),
    }
}

pub fn to_earned_badge_out(e: &EarnedBadge) -> EarnedBadgeOut {
    EarnedBadgeOut {
        id: e.badge.id.clone(),
        name: e.badge.name.clone(),
        description: e.badge.description.clone(),
        icon: e.badge.icon.clone(),
        rarity: e.badge.rarity,
        earned_at: e.earned_at,
    }
}

pub fn to_lesson_out(l: &Lesson, completed: bool) -> LessonOut {
    LessonOut {
        id: l.id.clone(),
        title: l.title.clone(),
        description: l.description.clone(),
        category: l.category.clone(),
        duration: l.duration.clone(),
        difficulty: l.difficulty,
        points: l.points,
        sdg_goals: l.sdg_goals.clone(),
        completed,
    }
}

pub fn to_quiz_question_out(q: &QuizQuestion) -> QuizQuestionOut {
    QuizQuestionOut { question: q.question.clone(), options: q.options.clone() }
}

pub fn to_challenge_out(c: &Challenge, joined: bool) -> ChallengeOut {
    ChallengeOut {
        id: c.id.clone(),
        title: c.title.clone(),
        description: c.description.clone(),
        category: c.category.clone(),
        difficulty: c.difficulty,
        points: c.points,
        duration: c.duration.clone(),
        participants: c.participants,
        status: c.status,
        progress: c.progress,
        joined,
    }
}

pub fn to_badge_out(b: &Badge, earned_at: Option<DateTime<Utc>>) -> BadgeOut {
    BadgeOut {
        id: b.id.clone(),
        name: b.name.clone(),
        description: b.description.clone(),
        icon: b.icon.clone(),
        rarity: b.rarity,
        earned: earned_at.is_some(),
        earned_at,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizIn {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
    pub answers: HashMap<usize, String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinIn {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PointsIn {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct PointsOut {
    pub points: u32,
    pub level: u32,
}

#[derive(Debug, Serialize)]
pub struct JoinOut {
    pub challenge: ChallengeOut,
    #[serde(rename = "alreadyJoined")]
    pub already_joined: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Friendly non-throwing failure envelope (unknown id, bad input).
#[derive(Debug, Serialize)]
pub struct MessageOut {
    pub success: bool,
    pub message: String,
}

//
// Account boundary DTOs
//

#[derive(Debug, Deserialize)]
pub struct RegisterIn {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginIn {
    pub email: String,
    pub password: String,
}

/// Hash-free account view returned by register/login.
#[derive(Debug, Serialize)]
pub struct AccountOut {
    pub id: String,
    pub role: Role,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

pub fn to_account_out(a: &Account) -> AccountOut {
    AccountOut {
        id: a.id.clone(),
        role: a.role,
        first_name: a.first_name.clone(),
        last_name: a.last_name.clone(),
        email: a.email.clone(),
        created_at: a.created_at,
    }
}

/// Response envelope of the register/login/logout endpoints. Failures are
/// non-throwing: `success:false` plus a message, never an error status.
#[derive(Debug, Serialize)]
pub struct AuthOut {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountOut>,
}
