#![forbid(unsafe_code)]

//! Core domain model and business logic for FitCoach.
//!
//! This crate provides:
//! - Domain types (tiers, goals, exercises, plans, feedback)
//! - Exercise catalog loading and selection
//! - Feedback-driven difficulty adjustment
//! - Workout generation and step-through sessions
//! - Per-user JSON persistence and progress statistics

pub mod types;
pub mod error;
pub mod profile;
pub mod normalize;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod progression;
pub mod engine;
pub mod session;
pub mod store;
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{CandidateSet, Catalog};
pub use config::Config;
pub use progression::{adjust, Adjustment};
pub use engine::{generate_workout, plan_for_user};
pub use session::{SessionStep, WorkoutSession};
pub use store::{JsonStore, UserId, UserStore};
