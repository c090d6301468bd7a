//! Feedback-driven difficulty adjustment.
//!
//! Recent feedback moves the effective tier at most one step and decides
//! whether progressive overload applies:
//! - Tier: mean score over the window > threshold promotes, < -threshold demotes
//! - Overload: enough good/too_easy answers in the window scale time and reps

use crate::config::ProgressionConfig;
use crate::{FeedbackEntry, FitnessLevel};

/// Outcome of a difficulty adjustment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adjustment {
    pub level: FitnessLevel,
    pub progression_factor: f64,
}

/// The most recent `window` entries of a chronological history
fn recent_window(history: &[FeedbackEntry], window: usize) -> &[FeedbackEntry] {
    &history[history.len().saturating_sub(window)..]
}

/// Mean adjustment score of the entries, or `None` when empty
pub fn mean_score(entries: &[FeedbackEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let total: i32 = entries.iter().map(|e| e.feedback.score()).sum();
    Some(total as f64 / entries.len() as f64)
}

/// Move the tier one step if the mean score is strictly past the threshold
pub fn adjust_level(level: FitnessLevel, mean: f64, threshold: f64) -> FitnessLevel {
    if mean > threshold {
        if let Some(up) = level.promoted() {
            tracing::debug!("Workouts feel too easy (mean {:.2}), promoting to {}", mean, up);
            return up;
        }
    } else if mean < -threshold {
        if let Some(down) = level.demoted() {
            tracing::debug!("Workouts feel too hard (mean {:.2}), demoting to {}", mean, down);
            return down;
        }
    }
    level
}

/// Progressive overload factor for the considered entries
pub fn progression_factor(entries: &[FeedbackEntry], config: &ProgressionConfig) -> f64 {
    let successes = entries.iter().filter(|e| e.feedback.is_success()).count();
    if successes >= config.success_threshold {
        tracing::info!(
            "{} successful workouts recently, applying progressive overload x{}",
            successes,
            config.boost_factor
        );
        config.boost_factor
    } else {
        1.0
    }
}

/// Adjust a user's tier and progression factor from chronological feedback
///
/// This is the main entry point for difficulty adjustment.
pub fn adjust(
    level: FitnessLevel,
    history: &[FeedbackEntry],
    config: &ProgressionConfig,
) -> Adjustment {
    let considered = recent_window(history, config.feedback_window);

    let Some(mean) = mean_score(considered) else {
        return Adjustment {
            level,
            progression_factor: 1.0,
        };
    };

    let adjusted = Adjustment {
        level: adjust_level(level, mean, config.promote_threshold),
        progression_factor: progression_factor(considered, config),
    };

    tracing::info!(
        "Adjusted difficulty from {} feedback entries: {} -> {}, factor {}",
        considered.len(),
        level,
        adjusted.level,
        adjusted.progression_factor
    );

    adjusted
}
