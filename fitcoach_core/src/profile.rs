//! Questionnaire vocabulary.
//!
//! Profiles store the labels the user picked in the questionnaire. These
//! tables map them to canonical catalog values; anything unmapped falls back
//! to beginner / weightloss / bodyweight-only.

use crate::{Equipment, FitnessGoal, FitnessLevel, UserProfile};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Level labels offered by the questionnaire, in display order
pub const FITNESS_LEVELS: [&str; 3] = ["Начинающий", "Средний", "Продвинутый"];

/// Goal labels offered by the questionnaire, in display order
pub const FITNESS_GOALS: [&str; 3] = [
    "Похудение",
    "Набор мышечной массы",
    "Общая физическая подготовка",
];

/// Equipment labels offered by the questionnaire, in display order
pub const EQUIPMENT_OPTIONS: [&str; 2] = ["Только вес тела", "Доступ в спортзал"];

pub const DEFAULT_LEVEL: FitnessLevel = FitnessLevel::Beginner;
pub const DEFAULT_GOAL: FitnessGoal = FitnessGoal::WeightLoss;

static LEVEL_MAP: Lazy<HashMap<&'static str, FitnessLevel>> = Lazy::new(|| {
    HashMap::from([
        ("Начинающий", FitnessLevel::Beginner),
        ("Средний", FitnessLevel::Intermediate),
        ("Продвинутый", FitnessLevel::Advanced),
        ("beginner", FitnessLevel::Beginner),
        ("intermediate", FitnessLevel::Intermediate),
        ("advanced", FitnessLevel::Advanced),
    ])
});

static GOAL_MAP: Lazy<HashMap<&'static str, FitnessGoal>> = Lazy::new(|| {
    HashMap::from([
        ("Похудение", FitnessGoal::WeightLoss),
        ("Набор мышечной массы", FitnessGoal::MuscleGain),
        ("Общая физическая подготовка", FitnessGoal::Strength),
        ("weightloss", FitnessGoal::WeightLoss),
        ("musclegain", FitnessGoal::MuscleGain),
        ("strength", FitnessGoal::Strength),
    ])
});

static EQUIPMENT_MAP: Lazy<HashMap<&'static str, Equipment>> = Lazy::new(|| {
    HashMap::from([
        ("Только вес тела", Equipment::Bodyweight),
        ("Доступ в спортзал", Equipment::Gym),
        ("none", Equipment::Bodyweight),
        ("bodyweight", Equipment::Bodyweight),
        ("gym", Equipment::Gym),
    ])
});

/// Map a level label to its tier, falling back to beginner
pub fn map_level(label: &str) -> FitnessLevel {
    LEVEL_MAP.get(label.trim()).copied().unwrap_or(DEFAULT_LEVEL)
}

/// Map a goal label to its goal, falling back to weightloss
pub fn map_goal(label: &str) -> FitnessGoal {
    GOAL_MAP.get(label.trim()).copied().unwrap_or(DEFAULT_GOAL)
}

/// Map an equipment label, falling back to bodyweight-only
pub fn map_equipment(label: &str) -> Equipment {
    EQUIPMENT_MAP
        .get(label.trim())
        .cloned()
        .unwrap_or(Equipment::Bodyweight)
}

/// Canonical selection criteria derived from a stored profile
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Criteria {
    pub level: FitnessLevel,
    pub goal: FitnessGoal,
    pub equipment: Equipment,
}

impl UserProfile {
    /// Resolve the questionnaire labels to catalog values
    pub fn criteria(&self) -> Criteria {
        Criteria {
            level: map_level(&self.fitness_level),
            goal: map_goal(&self.goals),
            equipment: map_equipment(&self.equipment),
        }
    }
}
