//! Workout generation.
//!
//! Pipeline: profile + feedback history → adjusted tier → catalog selection
//! → normalized exercise records → [`WorkoutPlan`].

use crate::catalog::{default_workout_exercises, CandidateSet};
use crate::config::ProgressionConfig;
use crate::normalize::normalize;
use crate::progression::adjust;
use crate::store::{UserId, UserStore};
use crate::{Catalog, FeedbackEntry, Result, UserProfile, WorkoutPlan};

/// Generate a workout for a profile and its chronological feedback history
///
/// ## Rules
///
/// 1. Questionnaire labels map to canonical level/goal/equipment
///    (unknown labels fall back to beginner/weightloss/bodyweight).
/// 2. Recent feedback may move the level one tier and enable progressive
///    overload on time and reps.
/// 3. Matching catalog rows are returned in catalog order; when nothing
///    matches the fixed default workout is returned unscaled.
pub fn generate_workout(
    catalog: &Catalog,
    profile: &UserProfile,
    history: &[FeedbackEntry],
    config: &ProgressionConfig,
) -> WorkoutPlan {
    let criteria = profile.criteria();
    let adjustment = adjust(criteria.level, history, config);

    tracing::info!(
        "Generating workout for level {}, goal {}, equipment {}",
        adjustment.level,
        criteria.goal,
        criteria.equipment
    );

    let selection = catalog.select(adjustment.level, criteria.goal, &criteria.equipment);

    let (exercises, progression_factor, is_default) = match selection {
        CandidateSet::Rows(rows) => {
            let exercises: Vec<_> = rows
                .into_iter()
                .map(|row| normalize(row, adjustment.progression_factor))
                .collect();
            (exercises, adjustment.progression_factor, false)
        }
        CandidateSet::Default => (default_workout_exercises(), 1.0, true),
    };

    tracing::info!("Generated workout with {} exercises", exercises.len());

    WorkoutPlan {
        total_exercises: exercises.len(),
        exercises,
        level: adjustment.level,
        goal: criteria.goal,
        equipment: criteria.equipment,
        progression_factor,
        is_default,
    }
}

/// Generate a workout for a stored user, or `None` if they have no profile
pub fn plan_for_user<S: UserStore + ?Sized>(
    store: &S,
    catalog: &Catalog,
    user: UserId,
    config: &ProgressionConfig,
) -> Result<Option<WorkoutPlan>> {
    let Some(profile) = store.profile(user)? else {
        tracing::info!("User {} has no profile yet", user);
        return Ok(None);
    };
    let history = store.feedback_history(user)?;
    Ok(Some(generate_workout(catalog, &profile, &history, config)))
}
