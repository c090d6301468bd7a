//! Step-through workout session.
//!
//! Tracks which exercise and circuit the user is on while they work through
//! a plan one exercise at a time. Every exercise runs for the circuit count
//! of the first exercise.

use crate::{Error, ExerciseRecord, Result, WorkoutCompletion, WorkoutPlan};
use chrono::NaiveDate;
use uuid::Uuid;

/// What happened after marking the current exercise done
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStep {
    /// Moved to the next exercise in the same circuit
    NextExercise,
    /// Finished a circuit and started the given one
    NextCircuit(u32),
    /// All circuits are done
    Finished,
}

/// An in-progress workout
#[derive(Clone, Debug)]
pub struct WorkoutSession {
    workout_id: Uuid,
    exercises: Vec<ExerciseRecord>,
    current_exercise: usize,
    current_circuit: u32,
    total_circuits: u32,
}

impl WorkoutSession {
    /// Begin a session at the first exercise of the first circuit
    pub fn start(plan: WorkoutPlan) -> Result<Self> {
        let Some(first) = plan.exercises.first() else {
            return Err(Error::Session("cannot start an empty workout".into()));
        };
        let total_circuits = first.circuits.unwrap_or(1).max(1);

        tracing::info!(
            "Starting workout: {} exercises, {} circuits",
            plan.exercises.len(),
            total_circuits
        );

        Ok(Self {
            workout_id: Uuid::new_v4(),
            exercises: plan.exercises,
            current_exercise: 0,
            current_circuit: 1,
            total_circuits,
        })
    }

    pub fn workout_id(&self) -> Uuid {
        self.workout_id
    }

    pub fn current(&self) -> &ExerciseRecord {
        &self.exercises[self.current_exercise]
    }

    /// Zero-based index of the current exercise
    pub fn position(&self) -> usize {
        self.current_exercise
    }

    pub fn total_exercises(&self) -> usize {
        self.exercises.len()
    }

    pub fn circuit(&self) -> u32 {
        self.current_circuit
    }

    pub fn total_circuits(&self) -> u32 {
        self.total_circuits
    }

    fn is_last_exercise(&self) -> bool {
        self.current_exercise + 1 == self.exercises.len()
    }

    /// Mark the current exercise done and advance
    pub fn exercise_done(&mut self) -> SessionStep {
        if !self.is_last_exercise() {
            self.current_exercise += 1;
            return SessionStep::NextExercise;
        }

        if self.current_circuit < self.total_circuits {
            self.current_circuit += 1;
            self.current_exercise = 0;
            tracing::debug!("Starting circuit {}", self.current_circuit);
            return SessionStep::NextCircuit(self.current_circuit);
        }

        tracing::debug!("All circuits completed");
        SessionStep::Finished
    }

    /// Skip ahead without marking done; false at the last exercise
    pub fn next(&mut self) -> bool {
        if self.is_last_exercise() {
            return false;
        }
        self.current_exercise += 1;
        true
    }

    /// Step back one exercise; false at the first exercise
    pub fn previous(&mut self) -> bool {
        if self.current_exercise == 0 {
            return false;
        }
        self.current_exercise -= 1;
        true
    }

    /// End the session and produce its completion record.
    ///
    /// The workout counts as completed when it ends on the last exercise.
    pub fn finish(self, date: NaiveDate) -> WorkoutCompletion {
        let completion = WorkoutCompletion {
            workout_id: self.workout_id,
            date,
            exercises_completed: self.current_exercise + 1,
            total_exercises: self.exercises.len(),
            workout_completed: self.is_last_exercise(),
        };
        tracing::info!(
            "Finished workout {}: {}/{} exercises",
            completion.workout_id,
            completion.exercises_completed,
            completion.total_exercises
        );
        completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Equipment, FitnessGoal, FitnessLevel};

    fn exercise(name: &str, circuits: Option<u32>) -> ExerciseRecord {
        ExerciseRecord {
            name: name.into(),
            target_muscle: None,
            difficulty: None,
            gif_url: None,
            time: None,
            reps: Some(10),
            weight: None,
            circuits,
            circuits_rest: None,
            exercises_rest: None,
        }
    }

    fn plan(exercises: Vec<ExerciseRecord>) -> WorkoutPlan {
        WorkoutPlan {
            total_exercises: exercises.len(),
            exercises,
            level: FitnessLevel::Beginner,
            goal: FitnessGoal::Strength,
            equipment: Equipment::Gym,
            progression_factor: 1.0,
            is_default: false,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_plan_rejected() {
        assert!(matches!(
            WorkoutSession::start(plan(vec![])),
            Err(Error::Session(_))
        ));
    }

    #[test]
    fn test_circuits_come_from_first_exercise() {
        let session = WorkoutSession::start(plan(vec![
            exercise("A", Some(3)),
            exercise("B", Some(5)),
        ]))
        .unwrap();
        assert_eq!(session.total_circuits(), 3);

        let single = WorkoutSession::start(plan(vec![exercise("A", None)])).unwrap();
        assert_eq!(single.total_circuits(), 1);
    }

    #[test]
    fn test_full_walkthrough() {
        let mut session = WorkoutSession::start(plan(vec![
            exercise("A", Some(2)),
            exercise("B", None),
        ]))
        .unwrap();

        assert_eq!(session.current().name, "A");
        assert_eq!(session.exercise_done(), SessionStep::NextExercise);
        assert_eq!(session.current().name, "B");
        assert_eq!(session.exercise_done(), SessionStep::NextCircuit(2));
        assert_eq!(session.current().name, "A");
        assert_eq!(session.circuit(), 2);
        assert_eq!(session.exercise_done(), SessionStep::NextExercise);
        assert_eq!(session.exercise_done(), SessionStep::Finished);

        let completion = session.finish(today());
        assert_eq!(completion.exercises_completed, 2);
        assert_eq!(completion.total_exercises, 2);
        assert!(completion.workout_completed);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut session = WorkoutSession::start(plan(vec![
            exercise("A", None),
            exercise("B", None),
        ]))
        .unwrap();

        assert!(!session.previous());
        assert!(session.next());
        assert!(!session.next());
        assert!(session.previous());
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn test_early_finish_is_incomplete() {
        let session = WorkoutSession::start(plan(vec![
            exercise("A", None),
            exercise("B", None),
            exercise("C", None),
        ]))
        .unwrap();
        let id = session.workout_id();

        let completion = session.finish(today());
        assert_eq!(completion.workout_id, id);
        assert_eq!(completion.exercises_completed, 1);
        assert!(!completion.workout_completed);
    }
}
