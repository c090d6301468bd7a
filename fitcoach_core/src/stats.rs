//! Progress statistics over completed workouts.

use crate::WorkoutCompletion;
use chrono::{Days, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Consecutive training days
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Aggregated workload for one calendar day
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyIntensity {
    pub date: NaiveDate,
    pub completion_rate: f64,
    pub total_exercises: usize,
}

/// Totals across all recorded workouts
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total_workouts: usize,
    pub completed_workouts: usize,
    pub average_completion: f64,
}

/// Current and longest streak of consecutive workout days.
///
/// The current streak only counts if the last workout was today or
/// yesterday.
pub fn workout_streak(progress: &[WorkoutCompletion], today: NaiveDate) -> Streak {
    let mut dates: Vec<NaiveDate> = progress.iter().map(|w| w.date).collect();
    dates.sort_unstable();
    dates.dedup();

    let Some(&last) = dates.last() else {
        return Streak::default();
    };

    let current_streak = if last < today - Duration::days(1) {
        0
    } else {
        1 + dates
            .windows(2)
            .rev()
            .take_while(|pair| pair[1] - pair[0] == Duration::days(1))
            .count() as u32
    };

    let mut longest_streak = 1;
    let mut run = 1;
    for pair in dates.windows(2) {
        if pair[1] - pair[0] == Duration::days(1) {
            run += 1;
        } else {
            longest_streak = longest_streak.max(run);
            run = 1;
        }
    }
    longest_streak = longest_streak.max(run).max(current_streak);

    Streak {
        current_streak,
        longest_streak,
    }
}

/// Per-day completion rates for the last `days` days (inclusive), oldest first.
///
/// A window reaching past the earliest representable date covers everything.
pub fn intensity_stats(
    progress: &[WorkoutCompletion],
    today: NaiveDate,
    days: u32,
) -> Vec<DailyIntensity> {
    let start = today
        .checked_sub_days(Days::new(days.into()))
        .unwrap_or(NaiveDate::MIN);

    // date -> (total, completed)
    let mut daily: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for workout in progress
        .iter()
        .filter(|w| w.date >= start && w.date <= today)
    {
        let entry = daily.entry(workout.date).or_default();
        entry.0 += workout.total_exercises;
        entry.1 += workout.exercises_completed;
    }

    daily
        .into_iter()
        .map(|(date, (total, completed))| DailyIntensity {
            date,
            completion_rate: if total > 0 {
                completed as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            total_exercises: total,
        })
        .collect()
}

/// Overall totals, or `None` when nothing has been recorded
pub fn summary(progress: &[WorkoutCompletion]) -> Option<ProgressSummary> {
    if progress.is_empty() {
        return None;
    }

    let completed_workouts = progress.iter().filter(|w| w.workout_completed).count();
    let average_completion = progress
        .iter()
        .map(WorkoutCompletion::completion_rate)
        .sum::<f64>()
        / progress.len() as f64;

    Some(ProgressSummary {
        total_workouts: progress.len(),
        completed_workouts,
        average_completion,
    })
}
