//! Loading the optional content bank (extra lessons/challenges/badges) from
//! TOML.
//!
//! Config entries layer over the built-in seeds without overwriting existing
//! ids; a missing or malformed file is logged and ignored so the server
//! always starts with usable catalogs.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{
  BadgeRarity, ChallengeDifficulty, ChallengeStatus, LessonContent, LessonDifficulty,
};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ContentConfig {
  #[serde(default)]
  pub lessons: Vec<LessonCfg>,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
  #[serde(default)]
  pub badges: Vec<BadgeCfg>,
}

/// Lesson entry accepted in TOML configuration. `content` (sections + quiz)
/// is optional; a lesson without a quiz can never be completed through the
/// quiz gate, which is fine for read-only material.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub category: String,
  #[serde(default)] pub duration: String,
  #[serde(default)] pub difficulty: LessonDifficulty,
  pub points: u32,
  #[serde(default)] pub sdg_goals: Vec<u8>,
  #[serde(default)] pub content: Option<LessonContent>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub category: String,
  #[serde(default)] pub difficulty: ChallengeDifficulty,
  pub points: u32,
  #[serde(default)] pub duration: String,
  #[serde(default)] pub participants: u32,
  #[serde(default)] pub status: ChallengeStatus,
  #[serde(default)] pub progress: Option<u8>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BadgeCfg {
  #[serde(default)] pub id: Option<String>,
  pub name: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub icon: String,
  pub rarity: BadgeRarity,
}

/// Attempt to load `ContentConfig` from CONTENT_CONFIG_PATH. On any
/// parsing/IO error, returns None.
pub fn load_content_config_from_env() -> Option<ContentConfig> {
  let path = std::env::var("CONTENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ContentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "ecolearn_backend", %path, "Loaded content config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "ecolearn_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "ecolearn_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_lesson_bank_parses() {
    let toml_src = r#"
      [[lessons]]
      title = "Soil Health Basics"
      points = 90
      difficulty = "beginner"

      [[lessons.content.quiz]]
      question = "What improves soil health?"
      options = ["Composting", "Littering"]
      correct = "Composting"

      [[badges]]
      name = "Soil Steward"
      rarity = "rare"
    "#;
    let cfg: ContentConfig = toml::from_str(toml_src).expect("config parses");
    assert_eq!(cfg.lessons.len(), 1);
    assert_eq!(cfg.lessons[0].points, 90);
    let content = cfg.lessons[0].content.as_ref().expect("content");
    assert_eq!(content.quiz.len(), 1);
    assert_eq!(cfg.badges[0].rarity, BadgeRarity::Rare);
    assert!(cfg.challenges.is_empty());
  }

  #[test]
  fn unknown_difficulty_is_rejected() {
    let toml_src = r#"
      [[lessons]]
      title = "Bad entry"
      points = 10
      difficulty = "expert"
    "#;
    assert!(toml::from_str::<ContentConfig>(toml_src).is_err());
  }
}
