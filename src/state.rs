//! Application state: in-memory catalogs, learner profiles, per-user progress
//! ledgers, and the progression mutations consumed by HTTP/WS handlers.
//!
//! This module owns:
//!   - the lesson/challenge/badge catalogs (config bank layered over seeds)
//!   - lesson content (sections + quizzes) by lesson id
//!   - learner profiles and their progress ledgers
//!   - the account registry for the credential boundary
//!
//! Every mutation takes its write guards once and applies the whole
//! read-compute-write step under them, which is what keeps the award-once
//! and count-once invariants intact across concurrent handlers.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::AccountRegistry;
use crate::config::load_content_config_from_env;
use crate::domain::{
    Badge, Challenge, EarnedBadge, Lesson, LessonContent, UserProfile,
};
use crate::progression::{apply_points_delta, Outcome, ProgressLedger};
use crate::seeds::{
    demo_completed_lessons, demo_profile, seed_badges, seed_challenges, seed_lesson_content,
    seed_lessons,
};

#[derive(Clone)]
pub struct AppState {
    pub lessons: Arc<RwLock<HashMap<String, Lesson>>>,
    pub lesson_content: Arc<RwLock<HashMap<String, LessonContent>>>,
    pub challenges: Arc<RwLock<HashMap<String, Challenge>>>,
    pub badge_catalog: Arc<RwLock<HashMap<String, Badge>>>,
    pub profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
    pub ledgers: Arc<RwLock<HashMap<String, ProgressLedger>>>,
    pub accounts: AccountRegistry,
    pub demo_user_id: String,
}

impl AppState {
    /// Build state from env: load the content config, layer it over the
    /// built-in seeds, and seed the demo learner.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_content_config_from_env();

        let mut lesson_map = HashMap::<String, Lesson>::new();
        let mut content_map = seed_lesson_content();
        let mut challenge_map = HashMap::<String, Challenge>::new();
        let mut badge_map = HashMap::<String, Badge>::new();

        // Insert config-bank entries first (if any); seeds never overwrite them.
        if let Some(cfg) = &cfg_opt {
            for lc in &cfg.lessons {
                if lc.title.trim().is_empty() {
                    error!(target: "ecolearn_backend", "Skipping bank lesson: empty title.");
                    continue;
                }
                let id = lc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                if let Some(content) = &lc.content {
                    content_map.insert(id.clone(), content.clone());
                }
                lesson_map.insert(
                    id.clone(),
                    Lesson {
                        id,
                        title: lc.title.clone(),
                        description: lc.description.clone(),
                        category: lc.category.clone(),
                        duration: lc.duration.clone(),
                        difficulty: lc.difficulty,
                        points: lc.points,
                        sdg_goals: lc.sdg_goals.clone(),
                    },
                );
            }
            for cc in &cfg.challenges {
                if cc.title.trim().is_empty() {
                    error!(target: "ecolearn_backend", "Skipping bank challenge: empty title.");
                    continue;
                }
                let id = cc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                challenge_map.insert(
                    id.clone(),
                    Challenge {
                        id,
                        title: cc.title.clone(),
                        description: cc.description.clone(),
                        category: cc.category.clone(),
                        difficulty: cc.difficulty,
                        points: cc.points,
                        duration: cc.duration.clone(),
                        participants: cc.participants,
                        status: cc.status,
                        progress: cc.progress,
                    },
                );
            }
            for bc in &cfg.badges {
                if bc.name.trim().is_empty() {
                    error!(target: "ecolearn_backend", "Skipping bank badge: empty name.");
                    continue;
                }
                let id = bc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                badge_map.insert(
                    id.clone(),
                    Badge {
                        id,
                        name: bc.name.clone(),
                        description: bc.description.clone(),
                        icon: bc.icon.clone(),
                        rarity: bc.rarity,
                    },
                );
            }
        }

        // Always insert built-in seeds, but don't overwrite existing ids.
        for l in seed_lessons() {
            lesson_map.entry(l.id.clone()).or_insert(l);
        }
        for c in seed_challenges() {
            challenge_map.entry(c.id.clone()).or_insert(c);
        }
        for b in seed_badges() {
            badge_map.entry(b.id.clone()).or_insert(b);
        }

        // Inventory summary.
        let mut lessons_by_category: HashMap<String, usize> = HashMap::new();
        for l in lesson_map.values() {
            *lessons_by_category.entry(l.category.clone()).or_insert(0) += 1;
        }
        for (category, count) in lessons_by_category {
            info!(target: "progression", %category, count, "Startup lesson inventory");
        }
        info!(
            target: "progression",
            challenges = challenge_map.len(),
            badges = badge_map.len(),
            "Startup catalog inventory"
        );

        // Seed the demo learner and their prior completions.
        let demo = demo_profile();
        let demo_user_id = demo.id.clone();
        let mut ledger = ProgressLedger::default();
        let now = Utc::now();
        for lesson_id in demo_completed_lessons() {
            ledger.record_completion(&lesson_id, now);
        }
        let mut profile_map = HashMap::new();
        let mut ledger_map = HashMap::new();
        ledger_map.insert(demo_user_id.clone(), ledger);
        profile_map.insert(demo_user_id.clone(), demo);

        Self {
            lessons: Arc::new(RwLock::new(lesson_map)),
            lesson_content: Arc::new(RwLock::new(content_map)),
            challenges: Arc::new(RwLock::new(challenge_map)),
            badge_catalog: Arc::new(RwLock::new(badge_map)),
            profiles: Arc::new(RwLock::new(profile_map)),
            ledgers: Arc::new(RwLock::new(ledger_map)),
            accounts: AccountRegistry::new(),
            demo_user_id,
        }
    }

    /// Replace a learner profile wholesale and make sure a ledger exists for
    /// it. No validation; level is derived on read so a stale level cannot
    /// be smuggled in.
    #[instrument(level = "info", skip(self, profile), fields(user_id = %profile.id))]
    pub async fn set_user(&self, profile: UserProfile) {
        let mut profiles = self.profiles.write().await;
        let mut ledgers = self.ledgers.write().await;
        ledgers.entry(profile.id.clone()).or_default();
        profiles.insert(profile.id.clone(), profile);
    }

    /// Create a fresh zero-progress profile for a newly registered account.
    #[instrument(level = "info", skip(self), fields(%user_id, %name))]
    pub async fn create_profile(&self, user_id: &str, name: &str, email: &str) -> UserProfile {
        let profile = UserProfile {
            id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            school: String::new(),
            grade: String::new(),
            avatar: String::new(),
            points: 0,
            streak: 0,
            badges: vec![],
        };
        self.set_user(profile.clone()).await;
        profile
    }

    /// Add `delta` to the user's points. The new total is computed once and
    /// the derived level always reflects it; see `apply_points_delta`.
    #[instrument(level = "info", skip(self), fields(%user_id, delta))]
    pub async fn update_points(&self, user_id: &str, delta: i64) -> Outcome<(u32, u32)> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(user_id) {
            Some(profile) => {
                let (points, level) = apply_points_delta(profile.points, delta);
                profile.points = points;
                info!(target: "progression", %user_id, delta, points, level, "Points updated");
                Outcome::Applied((points, level))
            }
            None => {
                warn!(target: "progression", %user_id, "Points update for unknown user");
                Outcome::NotFound
            }
        }
    }

    /// Record a lesson completion for this user. First completion returns
    /// the lesson's point value so the caller can award it exactly once;
    /// a repeat is `AlreadyDone` and must award nothing.
    #[instrument(level = "info", skip(self), fields(%user_id, %lesson_id))]
    pub async fn complete_lesson(&self, user_id: &str, lesson_id: &str) -> Outcome<u32> {
        let points = {
            let lessons = self.lessons.read().await;
            match lessons.get(lesson_id) {
                Some(lesson) => lesson.points,
                None => {
                    warn!(target: "progression", %lesson_id, "Completion for unknown lesson");
                    return Outcome::NotFound;
                }
            }
        };

        let mut ledgers = self.ledgers.write().await;
        let Some(ledger) = ledgers.get_mut(user_id) else {
            warn!(target: "progression", %user_id, "Completion for unknown user");
            return Outcome::NotFound;
        };
        if !ledger.record_completion(lesson_id, Utc::now()) {
            return Outcome::AlreadyDone;
        }
        info!(target: "progression", %user_id, %lesson_id, points, "Lesson completed");
        Outcome::Applied(points)
    }

    /// Record a challenge join. The participant total rises by exactly one
    /// per distinct user; a repeat join leaves it unchanged.
    #[instrument(level = "info", skip(self), fields(%user_id, %challenge_id))]
    pub async fn join_challenge(&self, user_id: &str, challenge_id: &str) -> Outcome<Challenge> {
        let mut challenges = self.challenges.write().await;
        let mut ledgers = self.ledgers.write().await;

        let Some(challenge) = challenges.get_mut(challenge_id) else {
            warn!(target: "progression", %challenge_id, "Join for unknown challenge");
            return Outcome::NotFound;
        };
        let Some(ledger) = ledgers.get_mut(user_id) else {
            warn!(target: "progression", %user_id, "Join for unknown user");
            return Outcome::NotFound;
        };
        if !ledger.record_join(challenge_id, Utc::now()) {
            return Outcome::AlreadyDone;
        }
        challenge.participants += 1;
        info!(
            target: "progression",
            %user_id, %challenge_id, participants = challenge.participants,
            "Challenge joined"
        );
        Outcome::Applied(challenge.clone())
    }

    /// Copy a catalog badge onto the user's profile with an award timestamp.
    /// A badge id appears at most once in the earned list.
    #[instrument(level = "info", skip(self), fields(%user_id, %badge_id))]
    pub async fn earn_badge(&self, user_id: &str, badge_id: &str) -> Outcome<EarnedBadge> {
        let badge = {
            let catalog = self.badge_catalog.read().await;
            match catalog.get(badge_id) {
                Some(badge) => badge.clone(),
                None => {
                    warn!(target: "progression", %badge_id, "Earn for unknown badge");
                    return Outcome::NotFound;
                }
            }
        };

        let mut profiles = self.profiles.write().await;
        let Some(profile) = profiles.get_mut(user_id) else {
            warn!(target: "progression", %user_id, "Earn for unknown user");
            return Outcome::NotFound;
        };
        if profile.has_badge(badge_id) {
            return Outcome::AlreadyDone;
        }
        let earned = EarnedBadge { badge, earned_at: Utc::now() };
        profile.badges.push(earned.clone());
        info!(target: "progression", %user_id, %badge_id, "Badge earned");
        Outcome::Applied(earned)
    }

    // -------- Read-only views --------

    pub async fn profile(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.read().await.get(user_id).cloned()
    }

    pub async fn ledger(&self, user_id: &str) -> Option<ProgressLedger> {
        self.ledgers.read().await.get(user_id).cloned()
    }

    pub async fn lesson(&self, lesson_id: &str) -> Option<Lesson> {
        self.lessons.read().await.get(lesson_id).cloned()
    }

    pub async fn lesson_content(&self, lesson_id: &str) -> Option<LessonContent> {
        self.lesson_content.read().await.get(lesson_id).cloned()
    }

    pub async fn challenge(&self, challenge_id: &str) -> Option<Challenge> {
        self.challenges.read().await.get(challenge_id).cloned()
    }

    /// Lesson catalog in stable id order.
    pub async fn lessons_sorted(&self) -> Vec<Lesson> {
        let mut out: Vec<Lesson> = self.lessons.read().await.values().cloned().collect();
        out.sort_by_key(|l| (l.id.parse::<u64>().ok(), l.id.clone()));
        out
    }

    pub async fn challenges_sorted(&self) -> Vec<Challenge> {
        let mut out: Vec<Challenge> = self.challenges.read().await.values().cloned().collect();
        out.sort_by_key(|c| (c.id.parse::<u64>().ok(), c.id.clone()));
        out
    }

    pub async fn badges_sorted(&self) -> Vec<Badge> {
        let mut out: Vec<Badge> = self.badge_catalog.read().await.values().cloned().collect();
        out.sort_by_key(|b| (b.id.parse::<u64>().ok(), b.id.clone()));
        out
    }

    /// Profiles ranked by points descending; name breaks ties.
    pub async fn leaderboard(&self) -> Vec<UserProfile> {
        let mut out: Vec<UserProfile> = self.profiles.read().await.values().cloned().collect();
        out.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::CLIMATE_CHAMPION_BADGE_ID;

    fn state() -> AppState {
        AppState::new()
    }

    #[tokio::test]
    async fn demo_profile_is_seeded_with_derived_level() {
        let state = state();
        let profile = state.profile("1").await.expect("demo profile");
        assert_eq!(profile.points, 2450);
        assert_eq!(profile.level(), 5);
        assert_eq!(profile.streak, 12);
    }

    #[tokio::test]
    async fn update_points_is_monotonic_and_level_consistent() {
        let state = state();
        let before = state.profile("1").await.unwrap();
        let outcome = state.update_points("1", 200).await;
        assert_eq!(outcome, Outcome::Applied((before.points + 200, 6)));
        let after = state.profile("1").await.unwrap();
        assert_eq!(after.points, before.points + 200);
        assert_eq!(after.level(), 6);
    }

    #[tokio::test]
    async fn update_points_zero_delta_is_identity() {
        let state = state();
        let before = state.profile("1").await.unwrap();
        let outcome = state.update_points("1", 0).await;
        assert_eq!(outcome, Outcome::Applied((before.points, before.level())));
    }

    #[tokio::test]
    async fn update_points_unknown_user_is_not_found() {
        let state = state();
        assert_eq!(state.update_points("ghost", 100).await, Outcome::NotFound);
    }

    #[tokio::test]
    async fn complete_lesson_awards_value_once_then_already_done() {
        let state = state();
        assert_eq!(state.complete_lesson("1", "2").await, Outcome::Applied(120));
        assert_eq!(state.complete_lesson("1", "2").await, Outcome::AlreadyDone);
        let ledger = state.ledger("1").await.unwrap();
        assert!(ledger.lesson_completed("2"));
    }

    #[tokio::test]
    async fn complete_lesson_unknown_id_leaves_catalog_unchanged() {
        let state = state();
        let before = serde_json::to_string(&state.lessons_sorted().await).unwrap();
        assert_eq!(
            state.complete_lesson("1", "does-not-exist").await,
            Outcome::NotFound
        );
        let after = serde_json::to_string(&state.lessons_sorted().await).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn join_challenge_counts_each_user_once() {
        let state = state();
        let baseline = state.challenges_sorted().await[0].participants;

        let outcome = state.join_challenge("1", "1").await;
        match outcome {
            Outcome::Applied(challenge) => assert_eq!(challenge.participants, baseline + 1),
            other => panic!("expected Applied, got {other:?}"),
        }

        // Same user again: no double count.
        assert_eq!(state.join_challenge("1", "1").await, Outcome::AlreadyDone);
        assert_eq!(state.challenges_sorted().await[0].participants, baseline + 1);

        // A second user still counts.
        state.create_profile("u2", "Meera Iyer", "meera@student.edu").await;
        assert!(state.join_challenge("u2", "1").await.is_applied());
        assert_eq!(state.challenges_sorted().await[0].participants, baseline + 2);
    }

    #[tokio::test]
    async fn join_challenge_unknown_id_is_not_found() {
        let state = state();
        let before = serde_json::to_string(&state.challenges_sorted().await).unwrap();
        assert_eq!(
            state.join_challenge("1", "does-not-exist").await,
            Outcome::NotFound
        );
        let after = serde_json::to_string(&state.challenges_sorted().await).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn earn_badge_copies_catalog_entry_with_timestamp() {
        let state = state();
        let outcome = state.earn_badge("1", CLIMATE_CHAMPION_BADGE_ID).await;
        match outcome {
            Outcome::Applied(earned) => {
                assert_eq!(earned.badge.name, "Climate Champion");
            }
            other => panic!("expected Applied, got {other:?}"),
        }
        let profile = state.profile("1").await.unwrap();
        assert_eq!(profile.badges.len(), 1);
    }

    #[tokio::test]
    async fn earn_badge_rejects_duplicates_and_unknown_ids() {
        let state = state();
        assert!(state.earn_badge("1", "2").await.is_applied());
        assert_eq!(state.earn_badge("1", "2").await, Outcome::AlreadyDone);
        assert_eq!(state.earn_badge("1", "no-such-badge").await, Outcome::NotFound);
        assert_eq!(state.earn_badge("ghost", "2").await, Outcome::NotFound);
        let profile = state.profile("1").await.unwrap();
        assert_eq!(profile.badges.len(), 1);
    }

    #[tokio::test]
    async fn set_user_replaces_profile_wholesale() {
        let state = state();
        let mut profile = state.profile("1").await.unwrap();
        profile.name = "Arjun S.".into();
        profile.points = 600;
        state.set_user(profile).await;
        let replaced = state.profile("1").await.unwrap();
        assert_eq!(replaced.name, "Arjun S.");
        assert_eq!(replaced.points, 600);
        assert_eq!(replaced.level(), 2);
    }

    #[tokio::test]
    async fn leaderboard_ranks_by_points_desc() {
        let state = state();
        state.create_profile("u2", "Meera Iyer", "meera@student.edu").await;
        state.update_points("u2", 9000).await;
        let board = state.leaderboard().await;
        assert_eq!(board[0].id, "u2");
        assert_eq!(board[1].id, "1");
    }
}
