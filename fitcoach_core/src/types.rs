//! Core domain types for FitCoach.
//!
//! This module defines the fundamental types used throughout the system:
//! - Fitness tiers, goals and equipment tags
//! - Catalog rows and normalized exercise records
//! - Workout plans and completion records
//! - User profiles and feedback history

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Canonical Enums
// ============================================================================

/// Difficulty tier of a user or catalog row
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    /// One tier up, or `None` at the top tier
    pub fn promoted(self) -> Option<Self> {
        match self {
            FitnessLevel::Beginner => Some(FitnessLevel::Intermediate),
            FitnessLevel::Intermediate => Some(FitnessLevel::Advanced),
            FitnessLevel::Advanced => None,
        }
    }

    /// One tier down, or `None` at the bottom tier
    pub fn demoted(self) -> Option<Self> {
        match self {
            FitnessLevel::Beginner => None,
            FitnessLevel::Intermediate => Some(FitnessLevel::Beginner),
            FitnessLevel::Advanced => Some(FitnessLevel::Intermediate),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        }
    }

    /// Parse the catalog spelling of a tier
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(FitnessLevel::Beginner),
            "intermediate" => Some(FitnessLevel::Intermediate),
            "advanced" => Some(FitnessLevel::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for FitnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training goal of a user or catalog row
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    #[serde(rename = "weightloss")]
    WeightLoss,
    #[serde(rename = "musclegain")]
    MuscleGain,
    Strength,
}

impl FitnessGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "weightloss",
            FitnessGoal::MuscleGain => "musclegain",
            FitnessGoal::Strength => "strength",
        }
    }

    /// Parse the catalog spelling of a goal
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weightloss" => Some(FitnessGoal::WeightLoss),
            "musclegain" => Some(FitnessGoal::MuscleGain),
            "strength" => Some(FitnessGoal::Strength),
            _ => None,
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equipment tag of a catalog row, or the equipment a user has access to
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    /// Full gym access
    Gym,
    /// Bodyweight only
    #[serde(rename = "none")]
    Bodyweight,
    /// Any other tag found in the catalog (e.g. "dumbbells")
    Other(String),
}

impl Equipment {
    /// Parse a catalog equipment tag.
    ///
    /// The catalog spells bodyweight rows as `none` or `Нет`.
    pub fn parse(s: &str) -> Self {
        let tag = s.trim();
        match tag.to_lowercase().as_str() {
            "gym" => Equipment::Gym,
            "none" | "нет" => Equipment::Bodyweight,
            _ => Equipment::Other(tag.to_string()),
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equipment::Gym => f.write_str("gym"),
            Equipment::Bodyweight => f.write_str("none"),
            Equipment::Other(tag) => f.write_str(tag),
        }
    }
}

// ============================================================================
// Catalog Row and Exercise Record
// ============================================================================

/// A sanitized catalog row.
///
/// Every optional field has already been validated at load time; `None`
/// means the source cell was blank, a "nan" marker, or invalid.
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseRow {
    pub name: String,
    pub fitness_level: FitnessLevel,
    pub fitness_goal: FitnessGoal,
    pub equipment: Equipment,
    pub target_muscle: Option<String>,
    pub difficulty: Option<String>,
    pub media_url: Option<String>,
    pub time: Option<f64>,
    pub reps: Option<f64>,
    pub circuits: Option<f64>,
    pub circuits_rest: Option<f64>,
    pub exercises_rest: Option<f64>,
    pub weight: Option<String>,
}

/// A normalized exercise as handed to the presentation layer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_muscle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gif_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuits_rest: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises_rest: Option<u32>,
}

// ============================================================================
// Workout Plan
// ============================================================================

/// A generated workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub exercises: Vec<ExerciseRecord>,
    pub total_exercises: usize,
    pub level: FitnessLevel,
    pub goal: FitnessGoal,
    pub equipment: Equipment,
    pub progression_factor: f64,
    /// True when no catalog row matched and the built-in fallback was used
    pub is_default: bool,
}

/// Recorded outcome of a workout session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutCompletion {
    pub workout_id: Uuid,
    /// Calendar date (YYYY-MM-DD)
    pub date: chrono::NaiveDate,
    pub exercises_completed: usize,
    pub total_exercises: usize,
    pub workout_completed: bool,
}

impl WorkoutCompletion {
    /// Completion rate in percent
    pub fn completion_rate(&self) -> f64 {
        if self.total_exercises == 0 {
            return 0.0;
        }
        self.exercises_completed as f64 / self.total_exercises as f64 * 100.0
    }
}

// ============================================================================
// Profile and Feedback
// ============================================================================

/// Questionnaire answers as stored for a user.
///
/// The three selection fields hold the localized labels the user picked;
/// see [`crate::profile`] for the mapping to canonical enums.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub fitness_level: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDateTime>,
}

/// How a user rated a finished workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLabel {
    TooHard,
    Good,
    TooEasy,
}

impl FeedbackLabel {
    /// Signed adjustment score: too_easy=+1, good=0, too_hard=-1
    pub fn score(self) -> i32 {
        match self {
            FeedbackLabel::TooHard => -1,
            FeedbackLabel::Good => 0,
            FeedbackLabel::TooEasy => 1,
        }
    }

    /// Whether the workout counts as successfully completed
    pub fn is_success(self) -> bool {
        matches!(self, FeedbackLabel::Good | FeedbackLabel::TooEasy)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "too_hard" => Some(FeedbackLabel::TooHard),
            "good" => Some(FeedbackLabel::Good),
            "too_easy" => Some(FeedbackLabel::TooEasy),
            _ => None,
        }
    }
}

/// One feedback answer for a finished workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEntry {
    pub workout_id: Uuid,
    pub feedback: FeedbackLabel,
    pub timestamp: NaiveDateTime,
}

impl FeedbackEntry {
    pub fn new(workout_id: Uuid, feedback: FeedbackLabel) -> Self {
        Self {
            workout_id,
            feedback,
            timestamp: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_steps_are_bounded() {
        assert_eq!(FitnessLevel::Beginner.promoted(), Some(FitnessLevel::Intermediate));
        assert_eq!(FitnessLevel::Advanced.promoted(), None);
        assert_eq!(FitnessLevel::Beginner.demoted(), None);
        assert_eq!(FitnessLevel::Advanced.demoted(), Some(FitnessLevel::Intermediate));
    }

    #[test]
    fn test_equipment_parse() {
        assert_eq!(Equipment::parse("gym"), Equipment::Gym);
        assert_eq!(Equipment::parse(" Нет "), Equipment::Bodyweight);
        assert_eq!(Equipment::parse("none"), Equipment::Bodyweight);
        assert_eq!(
            Equipment::parse("dumbbells"),
            Equipment::Other("dumbbells".into())
        );
    }

    #[test]
    fn test_exercise_record_omits_absent_fields() {
        let record = ExerciseRecord {
            name: "Plank".into(),
            target_muscle: None,
            difficulty: None,
            gif_url: None,
            time: Some(45),
            reps: None,
            weight: None,
            circuits: None,
            circuits_rest: None,
            exercises_rest: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["time"], 45);
        assert!(!obj.contains_key("reps"));
    }

    #[test]
    fn test_feedback_label_serde() {
        let label: FeedbackLabel = serde_json::from_str("\"too_easy\"").unwrap();
        assert_eq!(label, FeedbackLabel::TooEasy);
        assert_eq!(label.score(), 1);
        assert!(label.is_success());
        assert!(!FeedbackLabel::TooHard.is_success());
    }

    #[test]
    fn test_completion_rate() {
        let completion = WorkoutCompletion {
            workout_id: Uuid::new_v4(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            exercises_completed: 3,
            total_exercises: 4,
            workout_completed: false,
        };
        assert!((completion.completion_rate() - 75.0).abs() < f64::EPSILON);
    }
}
