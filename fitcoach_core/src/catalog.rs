//! The exercise catalog.
//!
//! The catalog is loaded once from CSV, validated, and then only read. It
//! keeps rows in file order so selections come out in the order the catalog
//! author wrote them.

use crate::normalize::{sanitize_row, RawExerciseRow};
use crate::{Equipment, ExerciseRecord, ExerciseRow, FitnessGoal, FitnessLevel, Result};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Sample catalog bundled with the crate
const BUILTIN_CSV: &str = include_str!("../data/exercises.csv");

/// The immutable, ordered set of exercise rows
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    rows: Vec<ExerciseRow>,
}

/// Result of narrowing the catalog for a user
#[derive(Clone, Debug, PartialEq)]
pub enum CandidateSet<'a> {
    /// Matching rows in catalog order
    Rows(Vec<&'a ExerciseRow>),
    /// Nothing matched; use [`default_workout_exercises`]
    Default,
}

impl CandidateSet<'_> {
    pub fn is_default(&self) -> bool {
        matches!(self, CandidateSet::Default)
    }
}

/// The single-exercise workout used when nothing in the catalog matches
pub fn default_workout_exercises() -> Vec<ExerciseRecord> {
    vec![ExerciseRecord {
        name: "Squats".into(),
        target_muscle: Some("legs".into()),
        difficulty: None,
        gif_url: None,
        time: None,
        reps: Some(15),
        weight: None,
        circuits: Some(2),
        circuits_rest: Some(300),
        exercises_rest: Some(30),
    }]
}

impl Catalog {
    pub fn new(rows: Vec<ExerciseRow>) -> Self {
        Self { rows }
    }

    /// Parse the catalog bundled with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_reader(BUILTIN_CSV.as_bytes())
    }

    /// Load a catalog CSV from disk
    pub fn load_from(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        tracing::info!("Loaded {} exercises from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse catalog CSV from any reader.
    ///
    /// A row without a name fails the whole load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (index, result) in reader.deserialize::<RawExerciseRow>().enumerate() {
            let raw = result?;
            // Header is line 1
            if let Some(row) = sanitize_row(&raw, index + 2)? {
                rows.push(row);
            }
        }

        tracing::debug!("Parsed {} catalog rows", rows.len());
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ExerciseRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Narrow the catalog to rows for this level, goal and equipment.
    ///
    /// A gym request keeps only gym rows; any other request keeps only
    /// bodyweight rows. Rows tagged with other equipment never match.
    pub fn select(
        &self,
        level: FitnessLevel,
        goal: FitnessGoal,
        equipment: &Equipment,
    ) -> CandidateSet<'_> {
        let required = match equipment {
            Equipment::Gym => Equipment::Gym,
            _ => Equipment::Bodyweight,
        };

        let by_profile: Vec<&ExerciseRow> = self
            .rows
            .iter()
            .filter(|row| row.fitness_level == level && row.fitness_goal == goal)
            .collect();

        tracing::debug!(
            "{} exercises match level {} and goal {}",
            by_profile.len(),
            level,
            goal
        );

        let matched: Vec<&ExerciseRow> = by_profile
            .into_iter()
            .filter(|row| row.equipment == required)
            .collect();

        tracing::debug!("{} exercises left for equipment '{}'", matched.len(), required);

        if matched.is_empty() {
            tracing::warn!(
                "No exercises for {}/{}/{}, falling back to default workout",
                level,
                goal,
                required
            );
            CandidateSet::Default
        } else {
            CandidateSet::Rows(matched)
        }
    }

    /// Check the catalog for problems that do not block loading
    ///
    /// Returns a list of warnings, or empty Vec if the catalog looks complete.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.rows.is_empty() {
            warnings.push("Catalog has no exercises".to_string());
            return warnings;
        }

        let mut seen = HashSet::new();
        for row in &self.rows {
            let key = (
                row.name.to_lowercase(),
                row.fitness_level,
                row.fitness_goal,
                row.equipment.clone(),
            );
            if !seen.insert(key) {
                warnings.push(format!(
                    "Duplicate exercise '{}' for {}/{}/{}",
                    row.name, row.fitness_level, row.fitness_goal, row.equipment
                ));
            }

            if let Equipment::Other(tag) = &row.equipment {
                warnings.push(format!(
                    "Exercise '{}' uses equipment '{}' which is never selected",
                    row.name, tag
                ));
            }

            if row.time.is_none() && row.reps.is_none() {
                warnings.push(format!("Exercise '{}' has neither time nor reps", row.name));
            }
        }

        warnings
    }
}
