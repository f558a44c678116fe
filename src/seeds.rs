//! Seed data and small utilities related to default content.
//!
//! The built-in catalogs guarantee the app is useful even without a content
//! config file: four lessons, three challenges, the badge catalog, and the
//! demo learner profile.

use std::collections::HashMap;

use crate::domain::{
  Badge, BadgeRarity, Challenge, ChallengeDifficulty, ChallengeStatus, Lesson, LessonContent,
  LessonDifficulty, QuizQuestion, Section, UserProfile,
};

/// Built-in lesson catalog.
pub fn seed_lessons() -> Vec<Lesson> {
  vec![
    Lesson {
      id: "1".into(),
      title: "Climate Change Basics".into(),
      description: "Understanding the science behind climate change and its impact on India".into(),
      category: "Climate".into(),
      duration: "15 min".into(),
      difficulty: LessonDifficulty::Beginner,
      points: 100,
      sdg_goals: vec![13, 14, 15],
    },
    Lesson {
      id: "2".into(),
      title: "Water Conservation Techniques".into(),
      description: "Learn practical water saving methods for homes and schools".into(),
      category: "Water".into(),
      duration: "20 min".into(),
      difficulty: LessonDifficulty::Beginner,
      points: 120,
      sdg_goals: vec![6, 14],
    },
    Lesson {
      id: "3".into(),
      title: "Renewable Energy in India".into(),
      description: "Explore solar, wind, and other renewable energy sources".into(),
      category: "Energy".into(),
      duration: "25 min".into(),
      difficulty: LessonDifficulty::Intermediate,
      points: 150,
      sdg_goals: vec![7, 13],
    },
    Lesson {
      id: "4".into(),
      title: "Biodiversity Conservation".into(),
      description: "Protecting India's rich flora and fauna".into(),
      category: "Wildlife".into(),
      duration: "18 min".into(),
      difficulty: LessonDifficulty::Intermediate,
      points: 130,
      sdg_goals: vec![14, 15],
    },
  ]
}

/// Sections + quizzes for the built-in lessons, keyed by lesson id.
pub fn seed_lesson_content() -> HashMap<String, LessonContent> {
  let mut map = HashMap::new();

  map.insert(
    "1".to_string(),
    LessonContent {
      sections: vec![
        Section {
          title: "What is Climate Change?".into(),
          body: "Climate change refers to long-term shifts in global temperatures and weather patterns. While climate variations are natural, human activities since the 1800s have been the main driver of climate change.".into(),
        },
        Section {
          title: "Impact on India".into(),
          body: "India faces severe climate impacts including rising temperatures, erratic monsoons, melting glaciers, and extreme weather events. These changes affect agriculture, water resources, and millions of livelihoods.".into(),
        },
        Section {
          title: "What Can We Do?".into(),
          body: "Individual actions like using renewable energy, reducing waste, choosing sustainable transport, and supporting climate-friendly policies can make a significant difference.".into(),
        },
      ],
      quiz: vec![
        QuizQuestion {
          question: "What is the main driver of climate change since the 1800s?".into(),
          options: vec![
            "Natural variations".into(),
            "Human activities".into(),
            "Solar radiation".into(),
            "Ocean currents".into(),
          ],
          correct: "Human activities".into(),
        },
        QuizQuestion {
          question: "Which of these is NOT mentioned as a climate impact on India?".into(),
          options: vec![
            "Rising temperatures".into(),
            "Erratic monsoons".into(),
            "Volcanic eruptions".into(),
            "Melting glaciers".into(),
          ],
          correct: "Volcanic eruptions".into(),
        },
      ],
    },
  );

  map.insert(
    "2".to_string(),
    LessonContent {
      sections: vec![
        Section {
          title: "Why Water Conservation Matters".into(),
          body: "Water is essential for all life on Earth. With growing population and climate change, water scarcity is becoming a critical issue. India faces severe water stress in many regions.".into(),
        },
        Section {
          title: "Simple Conservation Techniques".into(),
          body: "Turn off taps while brushing, fix leaks promptly, use water-efficient appliances, collect rainwater, and reuse greywater for plants.".into(),
        },
      ],
      quiz: vec![QuizQuestion {
        question: "What percentage of Earth's water is freshwater?".into(),
        options: vec!["2.5%".into(), "10%".into(), "25%".into(), "50%".into()],
        correct: "2.5%".into(),
      }],
    },
  );

  map.insert(
    "3".to_string(),
    LessonContent {
      sections: vec![
        Section {
          title: "India's Renewable Landscape".into(),
          body: "India is among the world's largest producers of renewable energy, with major investments in solar parks, wind farms, and small hydro projects across the country.".into(),
        },
        Section {
          title: "Solar Power at Scale".into(),
          body: "Falling panel costs have made solar the fastest-growing energy source in India. Rooftop installations let schools and homes generate their own clean electricity.".into(),
        },
      ],
      quiz: vec![
        QuizQuestion {
          question: "Which renewable source has grown fastest in India?".into(),
          options: vec!["Solar".into(), "Coal".into(), "Nuclear".into(), "Diesel".into()],
          correct: "Solar".into(),
        },
        QuizQuestion {
          question: "What has driven the growth of solar power?".into(),
          options: vec![
            "Rising panel costs".into(),
            "Falling panel costs".into(),
            "Less sunlight".into(),
            "Fewer solar parks".into(),
          ],
          correct: "Falling panel costs".into(),
        },
      ],
    },
  );

  map.insert(
    "4".to_string(),
    LessonContent {
      sections: vec![
        Section {
          title: "A Megadiverse Country".into(),
          body: "India hosts nearly 8% of the world's recorded species across forests, wetlands, grasslands, and coasts, including iconic animals like the Bengal tiger and Asian elephant.".into(),
        },
        Section {
          title: "Threats and Protection".into(),
          body: "Habitat loss, pollution, and climate change threaten this diversity. Protected areas, community reserves, and restoration projects help species recover.".into(),
        },
      ],
      quiz: vec![
        QuizQuestion {
          question: "Roughly what share of the world's recorded species lives in India?".into(),
          options: vec!["1%".into(), "8%".into(), "25%".into(), "50%".into()],
          correct: "8%".into(),
        },
        QuizQuestion {
          question: "Which of these helps threatened species recover?".into(),
          options: vec![
            "Habitat loss".into(),
            "Pollution".into(),
            "Protected areas".into(),
            "Deforestation".into(),
          ],
          correct: "Protected areas".into(),
        },
      ],
    },
  );

  map
}

/// Built-in challenge catalog.
pub fn seed_challenges() -> Vec<Challenge> {
  vec![
    Challenge {
      id: "1".into(),
      title: "Plant 100 Trees Challenge".into(),
      description: "Organize a tree plantation drive in your community".into(),
      category: "Action".into(),
      difficulty: ChallengeDifficulty::Medium,
      points: 500,
      duration: "30 days".into(),
      participants: 1247,
      status: ChallengeStatus::Active,
      progress: Some(65),
    },
    Challenge {
      id: "2".into(),
      title: "Zero Waste Week".into(),
      description: "Reduce your household waste to zero for one week".into(),
      category: "Lifestyle".into(),
      difficulty: ChallengeDifficulty::Hard,
      points: 300,
      duration: "7 days".into(),
      participants: 892,
      status: ChallengeStatus::Active,
      progress: Some(23),
    },
    Challenge {
      id: "3".into(),
      title: "Clean Water Initiative".into(),
      description: "Organize a water body cleaning drive".into(),
      category: "Community".into(),
      difficulty: ChallengeDifficulty::Medium,
      points: 400,
      duration: "14 days".into(),
      participants: 567,
      status: ChallengeStatus::Upcoming,
      progress: None,
    },
  ]
}

/// Built-in badge catalog. Earning copies an entry onto the profile; see
/// `AppState::earn_badge`.
pub fn seed_badges() -> Vec<Badge> {
  vec![
    Badge {
      id: "1".into(),
      name: "Climate Champion".into(),
      description: "Completed 5 climate-related lessons".into(),
      icon: "🌍".into(),
      rarity: BadgeRarity::Common,
    },
    Badge {
      id: "2".into(),
      name: "Water Warrior".into(),
      description: "Saved 1000 liters of water".into(),
      icon: "💧".into(),
      rarity: BadgeRarity::Rare,
    },
    Badge {
      id: "3".into(),
      name: "Tree Hugger".into(),
      description: "Planted 50 trees".into(),
      icon: "🌳".into(),
      rarity: BadgeRarity::Epic,
    },
    Badge {
      id: "4".into(),
      name: "Eco Legend".into(),
      description: "Reached level 10".into(),
      icon: "👑".into(),
      rarity: BadgeRarity::Legendary,
    },
  ]
}

/// Demo learner seeded at startup so every screen has data before anyone
/// registers. The profile reports level 5: level is derived from points.
pub fn demo_profile() -> UserProfile {
  UserProfile {
    id: "1".into(),
    name: "Arjun Sharma".into(),
    email: "arjun.sharma@student.edu".into(),
    school: "Delhi Public School, Mumbai".into(),
    grade: "10th".into(),
    avatar: "arjun".into(),
    points: 2450,
    streak: 12,
    badges: vec![],
  }
}

/// Lesson ids the demo learner has already completed.
pub fn demo_completed_lessons() -> Vec<String> {
  vec!["1".into()]
}
