//! Catalog row sanitization and exercise record normalization.
//!
//! Raw CSV cells are cleaned exactly once, when the catalog is loaded:
//! blank cells and "nan" markers become `None`, media links are validated
//! and numeric cells are parsed. [`normalize`] then turns a clean row into
//! the record shown to the user, applying the progression factor.

use crate::{
    Equipment, Error, ExerciseRecord, ExerciseRow, FitnessGoal, FitnessLevel, Result,
};
use serde::Deserialize;

/// Media extensions the chat client can play inline
const MEDIA_EXTENSIONS: [&str; 2] = [".gif", ".mp4"];

/// Cell values that mean "no value"
const NULL_MARKERS: [&str; 2] = ["nan", "null"];

/// One catalog CSV row before validation
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawExerciseRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fitness_level: Option<String>,
    #[serde(default)]
    pub fitness_goals: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub target_muscle: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub gif: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub reps: Option<String>,
    #[serde(default)]
    pub circuits: Option<String>,
    #[serde(default)]
    pub circuits_rest: Option<String>,
    #[serde(default)]
    pub exercises_rest: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
}

/// Trimmed text, or `None` for blank cells and null markers
pub fn clean_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if NULL_MARKERS.contains(&lower.as_str()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// A media link with an http(s) scheme and a playable extension
pub fn clean_media_url(value: Option<&str>) -> Option<String> {
    let url = clean_text(value)?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return None;
    }
    let lower = url.to_lowercase();
    if !MEDIA_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return None;
    }
    Some(url)
}

/// A finite, strictly positive number
pub fn clean_number(value: Option<&str>) -> Option<f64> {
    let parsed: f64 = value?.trim().parse().ok()?;
    (parsed.is_finite() && parsed > 0.0).then_some(parsed)
}

/// Validate a raw row.
///
/// Returns `Ok(None)` for rows whose level or goal is not a known catalog
/// value, since they can never be selected. A missing name is a
/// data-integrity violation.
pub fn sanitize_row(raw: &RawExerciseRow, line: usize) -> Result<Option<ExerciseRow>> {
    let name = clean_text(raw.name.as_deref()).ok_or_else(|| {
        Error::CatalogIntegrity(format!("row {} has no exercise name", line))
    })?;

    let level = raw.fitness_level.as_deref().and_then(FitnessLevel::parse);
    let goal = raw.fitness_goals.as_deref().and_then(FitnessGoal::parse);
    let (fitness_level, fitness_goal) = match (level, goal) {
        (Some(level), Some(goal)) => (level, goal),
        _ => {
            tracing::warn!(
                "Skipping '{}' (row {}): unknown level {:?} or goal {:?}",
                name,
                line,
                raw.fitness_level,
                raw.fitness_goals
            );
            return Ok(None);
        }
    };

    let media_url = clean_media_url(raw.gif.as_deref());
    if media_url.is_none() {
        if let Some(gif) = clean_text(raw.gif.as_deref()) {
            tracing::warn!("Invalid media link for '{}': {}", name, gif);
        }
    }

    Ok(Some(ExerciseRow {
        fitness_level,
        fitness_goal,
        equipment: Equipment::parse(raw.equipment.as_deref().unwrap_or_default()),
        target_muscle: clean_text(raw.target_muscle.as_deref()),
        difficulty: clean_text(raw.difficulty.as_deref()),
        media_url,
        time: clean_number(raw.time.as_deref()),
        reps: clean_number(raw.reps.as_deref()),
        circuits: clean_number(raw.circuits.as_deref()),
        circuits_rest: clean_number(raw.circuits_rest.as_deref()),
        exercises_rest: clean_number(raw.exercises_rest.as_deref()),
        weight: clean_text(raw.weight.as_deref()),
        name,
    }))
}

fn truncate(value: f64) -> u32 {
    value.trunc() as u32
}

/// Build the output record for a row.
///
/// `progression_factor` scales only `time` and `reps`; every numeric field
/// is truncated toward zero.
pub fn normalize(row: &ExerciseRow, progression_factor: f64) -> ExerciseRecord {
    let scaled = |v: f64| truncate(v * progression_factor);

    ExerciseRecord {
        name: row.name.clone(),
        target_muscle: row.target_muscle.clone(),
        difficulty: row.difficulty.clone(),
        gif_url: row.media_url.clone(),
        time: row.time.map(scaled),
        reps: row.reps.map(scaled),
        weight: row.weight.clone(),
        circuits: row.circuits.map(truncate),
        circuits_rest: row.circuits_rest.map(truncate),
        exercises_rest: row.exercises_rest.map(truncate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> RawExerciseRow {
        RawExerciseRow {
            name: Some(name.into()),
            fitness_level: Some("beginner".into()),
            fitness_goals: Some("musclegain".into()),
            equipment: Some("gym".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_text_rejects_markers() {
        assert_eq!(clean_text(Some("  chest ")), Some("chest".into()));
        assert_eq!(clean_text(Some("NaN")), None);
        assert_eq!(clean_text(Some("null")), None);
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn test_media_url_validation() {
        assert_eq!(
            clean_media_url(Some("https://cdn.example.com/squat.GIF")),
            Some("https://cdn.example.com/squat.GIF".into())
        );
        assert_eq!(
            clean_media_url(Some("http://cdn.example.com/run.mp4")),
            Some("http://cdn.example.com/run.mp4".into())
        );
        assert_eq!(clean_media_url(Some("notes.txt")), None);
        assert_eq!(clean_media_url(Some("ftp://cdn.example.com/a.gif")), None);
        assert_eq!(clean_media_url(Some("https://cdn.example.com/a.png")), None);
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number(Some(" 30 ")), Some(30.0));
        assert_eq!(clean_number(Some("12.5")), Some(12.5));
        assert_eq!(clean_number(Some("0")), None);
        assert_eq!(clean_number(Some("-5")), None);
        assert_eq!(clean_number(Some("nan")), None);
        assert_eq!(clean_number(Some("inf")), None);
        assert_eq!(clean_number(Some("ten")), None);
    }

    #[test]
    fn test_missing_name_is_integrity_error() {
        let mut row = raw("x");
        row.name = Some("  ".into());
        let err = sanitize_row(&row, 7).unwrap_err();
        assert!(matches!(err, Error::CatalogIntegrity(_)));
        assert!(err.to_string().contains("row 7"));
    }

    #[test]
    fn test_unknown_level_row_is_skipped() {
        let mut row = raw("Sprint");
        row.fitness_level = Some("elite".into());
        assert!(sanitize_row(&row, 1).unwrap().is_none());
    }

    #[test]
    fn test_invalid_media_is_omitted_from_record() {
        let mut row = raw("Bench Press");
        row.gif = Some("notes.txt".into());
        row.reps = Some("10".into());

        let clean = sanitize_row(&row, 1).unwrap().unwrap();
        let record = normalize(&clean, 1.0);

        assert_eq!(record.gif_url, None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(!json.as_object().unwrap().contains_key("gif_url"));
        assert_eq!(record.reps, Some(10));
    }

    #[test]
    fn test_malformed_numbers_drop_only_that_field() {
        let mut row = raw("Plank");
        row.time = Some("forty".into());
        row.circuits = Some("3".into());
        row.target_muscle = Some("core".into());

        let clean = sanitize_row(&row, 1).unwrap().unwrap();
        let record = normalize(&clean, 1.0);

        assert_eq!(record.time, None);
        assert_eq!(record.circuits, Some(3));
        assert_eq!(record.target_muscle.as_deref(), Some("core"));
    }

    #[test]
    fn test_progression_scales_time_and_reps_only() {
        let mut row = raw("Burpees");
        row.time = Some("30".into());
        row.reps = Some("12".into());
        row.circuits = Some("3".into());
        row.circuits_rest = Some("120".into());
        row.exercises_rest = Some("45.9".into());
        row.weight = Some("10-15".into());

        let clean = sanitize_row(&row, 1).unwrap().unwrap();
        let record = normalize(&clean, 1.1);

        assert_eq!(record.time, Some(33));
        assert_eq!(record.reps, Some(13));
        assert_eq!(record.circuits, Some(3));
        assert_eq!(record.circuits_rest, Some(120));
        assert_eq!(record.exercises_rest, Some(45));
        assert_eq!(record.weight.as_deref(), Some("10-15"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut row = raw("Lunges");
        row.reps = Some("15".into());
        row.gif = Some("https://cdn.example.com/lunge.gif".into());
        let clean = sanitize_row(&row, 1).unwrap().unwrap();

        assert_eq!(normalize(&clean, 1.1), normalize(&clean, 1.1));
    }
}
