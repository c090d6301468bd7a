use clap::{Parser, Subcommand};
use fitcoach_core::profile::{EQUIPMENT_OPTIONS, FITNESS_GOALS, FITNESS_LEVELS};
use fitcoach_core::stats::{intensity_stats, summary, workout_streak};
use fitcoach_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fitcoach")]
#[command(about = "Personal workout coach with feedback-driven progression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Exercise catalog CSV (defaults to the bundled catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// User id
    #[arg(long, global = true, default_value_t = 0)]
    user: UserId,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, update or show the fitness profile
    Profile {
        /// Fitness level (e.g. "Начинающий" or "beginner")
        #[arg(long)]
        level: Option<String>,

        /// Goal (e.g. "Похудение" or "weightloss")
        #[arg(long)]
        goal: Option<String>,

        /// Equipment (e.g. "Доступ в спортзал" or "gym")
        #[arg(long)]
        equipment: Option<String>,

        #[arg(long)]
        age: Option<u32>,

        /// Height in cm
        #[arg(long)]
        height: Option<u32>,

        /// Body weight in kg
        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        sex: Option<String>,

        /// Telegram handle
        #[arg(long)]
        handle: Option<String>,
    },

    /// Show today's workout
    Workout {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Work through today's workout one exercise at a time
    Start {
        /// Auto-complete (for testing) - mark every exercise done
        #[arg(long)]
        auto_complete: bool,

        /// Feedback to record when the workout ends (too_hard, good, too_easy)
        #[arg(long, value_parser = parse_feedback)]
        feedback: Option<FeedbackLabel>,
    },

    /// Record a workout done without `start`
    Complete {
        /// Exercises completed
        exercises_completed: usize,

        /// Exercises in the workout
        total_exercises: usize,

        /// Workout id to rate later (generated when omitted)
        #[arg(long)]
        workout_id: Option<uuid::Uuid>,
    },

    /// Rate a finished workout
    Feedback {
        /// Workout id printed when the workout finished
        workout_id: uuid::Uuid,

        /// too_hard, good or too_easy
        #[arg(value_parser = parse_feedback)]
        label: FeedbackLabel,
    },

    /// Show streaks and workout history
    Progress {
        /// Window for daily intensity stats
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=36500))]
        days: u32,
    },

    /// Show or set the daily reminder time
    Reminder {
        /// Time as HH:MM
        #[arg(long, value_parser = parse_time)]
        time: Option<chrono::NaiveTime>,
    },

    /// Check the exercise catalog
    Catalog,
}

fn parse_feedback(s: &str) -> std::result::Result<FeedbackLabel, String> {
    FeedbackLabel::parse(s).ok_or_else(|| format!("expected too_hard, good or too_easy, got '{}'", s))
}

fn parse_time(s: &str) -> std::result::Result<chrono::NaiveTime, String> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

fn main() -> Result<()> {
    // Initialize logging
    fitcoach_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = JsonStore::new(data_dir);
    let user = cli.user;

    match cli.command {
        Commands::Profile {
            level,
            goal,
            equipment,
            age,
            height,
            weight,
            sex,
            handle,
        } => {
            let update = ProfileUpdate {
                level,
                goal,
                equipment,
                age,
                height,
                weight,
                sex,
                handle,
            };
            cmd_profile(&store, user, update)
        }
        Commands::Workout { json } => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            cmd_workout(&store, &catalog, user, json, &config)
        }
        Commands::Start {
            auto_complete,
            feedback,
        } => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            cmd_start(&store, &catalog, user, auto_complete, feedback, &config)
        }
        Commands::Complete {
            exercises_completed,
            total_exercises,
            workout_id,
        } => cmd_complete(&store, user, exercises_completed, total_exercises, workout_id),
        Commands::Feedback { workout_id, label } => cmd_feedback(&store, user, workout_id, label),
        Commands::Progress { days } => cmd_progress(&store, user, days),
        Commands::Reminder { time } => cmd_reminder(&store, user, time),
        Commands::Catalog => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            cmd_catalog(&catalog)
        }
    }
}

/// CLI path first, then config, then the bundled catalog
fn load_catalog(cli_path: Option<&Path>, config: &Config) -> Result<Catalog> {
    match cli_path.or(config.catalog.path.as_deref()) {
        Some(path) => Catalog::load_from(path),
        None => Catalog::builtin(),
    }
}

struct ProfileUpdate {
    level: Option<String>,
    goal: Option<String>,
    equipment: Option<String>,
    age: Option<u32>,
    height: Option<u32>,
    weight: Option<f64>,
    sex: Option<String>,
    handle: Option<String>,
}

impl ProfileUpdate {
    fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.goal.is_none()
            && self.equipment.is_none()
            && self.age.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.sex.is_none()
            && self.handle.is_none()
    }

    fn apply(self, profile: &mut UserProfile) {
        if let Some(level) = self.level {
            profile.fitness_level = level;
        }
        if let Some(goal) = self.goal {
            profile.goals = goal;
        }
        if let Some(equipment) = self.equipment {
            profile.equipment = equipment;
        }
        profile.age = self.age.or(profile.age);
        profile.height = self.height.or(profile.height);
        profile.weight = self.weight.or(profile.weight);
        profile.sex = self.sex.or(profile.sex.take());
        profile.telegram_handle = self.handle.or(profile.telegram_handle.take());
    }
}

fn cmd_profile(store: &JsonStore, user: UserId, update: ProfileUpdate) -> Result<()> {
    let existing = store.profile(user)?;

    if update.is_empty() {
        match existing {
            Some(profile) => display_profile(&profile),
            None => {
                println!("No profile yet. Create one with:");
                println!("  fitcoach profile --level <LEVEL> --goal <GOAL> --equipment <EQUIPMENT>");
                println!();
                println!("  Levels:    {}", FITNESS_LEVELS.join(" | "));
                println!("  Goals:     {}", FITNESS_GOALS.join(" | "));
                println!("  Equipment: {}", EQUIPMENT_OPTIONS.join(" | "));
            }
        }
        return Ok(());
    }

    let mut profile = existing.unwrap_or_default();
    update.apply(&mut profile);
    store.save_profile(user, profile.clone())?;

    println!("✓ Profile saved!");
    display_profile(&profile);
    Ok(())
}

fn display_profile(profile: &UserProfile) {
    let criteria = profile.criteria();
    println!();
    println!("  Level:     {} ({})", profile.fitness_level, criteria.level);
    println!("  Goal:      {} ({})", profile.goals, criteria.goal);
    println!("  Equipment: {} ({})", profile.equipment, criteria.equipment);
    if let Some(age) = profile.age {
        println!("  Age:       {}", age);
    }
    if let Some(height) = profile.height {
        println!("  Height:    {} cm", height);
    }
    if let Some(weight) = profile.weight {
        println!("  Weight:    {} kg", weight);
    }
    if let Some(ref sex) = profile.sex {
        println!("  Sex:       {}", sex);
    }
    println!();
}

fn require_plan(
    store: &JsonStore,
    catalog: &Catalog,
    user: UserId,
    config: &Config,
) -> Result<Option<WorkoutPlan>> {
    let plan = plan_for_user(store, catalog, user, &config.progression)?;
    if plan.is_none() {
        println!("Create a profile first: fitcoach profile --help");
    }
    Ok(plan)
}

fn cmd_workout(
    store: &JsonStore,
    catalog: &Catalog,
    user: UserId,
    json: bool,
    config: &Config,
) -> Result<()> {
    let Some(plan) = require_plan(store, catalog, user, config)? else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TODAY'S WORKOUT");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Level: {}  Goal: {}  Equipment: {}", plan.level, plan.goal, plan.equipment);
    if plan.progression_factor > 1.0 {
        println!("  Progressive overload: x{}", plan.progression_factor);
    }
    println!("  Exercises: {}", plan.total_exercises);
    println!();

    for (i, exercise) in plan.exercises.iter().enumerate() {
        println!("  {}. {}", i + 1, exercise.name);
        display_exercise_details(exercise);
        if let Some(circuits) = exercise.circuits.filter(|&c| c > 1) {
            println!("     → Circuits: {}", circuits);
        }
        println!();
    }

    println!("  Run `fitcoach start` to begin.");
    println!();
    Ok(())
}

fn format_duration(seconds: u32) -> String {
    if seconds < 60 {
        return format!("{} s", seconds);
    }
    let (minutes, rest) = (seconds / 60, seconds % 60);
    if rest > 0 {
        format!("{} min {} s", minutes, rest)
    } else {
        format!("{} min", minutes)
    }
}

fn display_exercise_details(exercise: &ExerciseRecord) {
    if let Some(ref muscle) = exercise.target_muscle {
        println!("     → Target: {}", muscle);
    }
    if let Some(ref difficulty) = exercise.difficulty {
        println!("     → Difficulty: {}", difficulty);
    }
    if let Some(time) = exercise.time {
        println!("     → Time: {}", format_duration(time));
    }
    if let Some(reps) = exercise.reps {
        println!("     → Reps: {}", reps);
    }
    if let Some(ref weight) = exercise.weight {
        println!("     → Weight: {} kg", weight);
    }
    if let Some(ref url) = exercise.gif_url {
        println!("     ℹ Demo: {}", url);
    }
}

fn display_session_exercise(session: &WorkoutSession) {
    let exercise = session.current();
    println!("\n─────────────────────────────────────────");
    println!(
        "  Circuit {}/{}  Exercise {}/{}",
        session.circuit(),
        session.total_circuits(),
        session.position() + 1,
        session.total_exercises()
    );
    println!();
    println!("  {}", exercise.name);
    display_exercise_details(exercise);
    if let Some(rest) = exercise.exercises_rest {
        println!("     → Rest after: {}", format_duration(rest));
    }
}

enum SessionAction {
    Done,
    Next,
    Previous,
    Finish,
}

fn prompt_session_action() -> Result<SessionAction> {
    println!("─────────────────────────────────────────");
    println!("Press Enter when done");
    println!("  'n' + Enter for next, 'p' + Enter for previous");
    println!("  'f' + Enter to finish the workout");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let action = match input.trim().to_lowercase().as_str() {
        "n" => SessionAction::Next,
        "p" => SessionAction::Previous,
        "f" => SessionAction::Finish,
        _ => SessionAction::Done,
    };
    Ok(action)
}

fn prompt_feedback() -> Result<Option<FeedbackLabel>> {
    println!("How was the difficulty?");
    println!("  1) too hard   2) good   3) too easy   (Enter to skip)");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let label = match input.trim() {
        "1" => Some(FeedbackLabel::TooHard),
        "2" => Some(FeedbackLabel::Good),
        "3" => Some(FeedbackLabel::TooEasy),
        other => FeedbackLabel::parse(other),
    };
    Ok(label)
}

fn cmd_start(
    store: &JsonStore,
    catalog: &Catalog,
    user: UserId,
    auto_complete: bool,
    feedback: Option<FeedbackLabel>,
    config: &Config,
) -> Result<()> {
    let Some(plan) = require_plan(store, catalog, user, config)? else {
        return Ok(());
    };

    let mut session = WorkoutSession::start(plan)?;

    loop {
        display_session_exercise(&session);

        let action = if auto_complete {
            SessionAction::Done
        } else {
            prompt_session_action()?
        };

        match action {
            SessionAction::Done => match session.exercise_done() {
                SessionStep::NextExercise => {}
                SessionStep::NextCircuit(circuit) => {
                    println!("\n✓ Circuit {} complete!", circuit - 1);
                }
                SessionStep::Finished => break,
            },
            SessionAction::Next => {
                if !session.next() {
                    println!("\nAlready at the last exercise.");
                }
            }
            SessionAction::Previous => {
                if !session.previous() {
                    println!("\nAlready at the first exercise.");
                }
            }
            SessionAction::Finish => break,
        }
    }

    let completion = session.finish(chrono::Local::now().date_naive());
    let workout_id = completion.workout_id;
    println!("\n🎉 Workout finished!");
    println!(
        "  ✓ Exercises completed: {}/{}",
        completion.exercises_completed, completion.total_exercises
    );
    println!("  Workout id: {}", workout_id);
    store.record_completion(user, completion)?;

    let feedback = match feedback {
        Some(label) => Some(label),
        None if auto_complete => None,
        None => prompt_feedback()?,
    };

    if let Some(label) = feedback {
        cmd_feedback(store, user, workout_id, label)?;
    } else {
        println!("\nRate it later with: fitcoach feedback {} <too_hard|good|too_easy>", workout_id);
    }

    Ok(())
}

fn cmd_feedback(
    store: &JsonStore,
    user: UserId,
    workout_id: uuid::Uuid,
    label: FeedbackLabel,
) -> Result<()> {
    store.save_feedback(user, FeedbackEntry::new(workout_id, label))?;

    let message = match label {
        FeedbackLabel::TooHard => "The next workout will be easier. Keep going!",
        FeedbackLabel::Good => "Great! Keep it up!",
        FeedbackLabel::TooEasy => "The next workout will be more intense.",
    };
    println!("\n✓ Feedback saved. {}", message);
    Ok(())
}

fn cmd_complete(
    store: &JsonStore,
    user: UserId,
    exercises_completed: usize,
    total_exercises: usize,
    workout_id: Option<uuid::Uuid>,
) -> Result<()> {
    if exercises_completed > total_exercises {
        return Err(Error::Store(format!(
            "completed {} of only {} exercises",
            exercises_completed, total_exercises
        )));
    }

    let completion = WorkoutCompletion {
        workout_id: workout_id.unwrap_or_else(uuid::Uuid::new_v4),
        date: chrono::Local::now().date_naive(),
        exercises_completed,
        total_exercises,
        workout_completed: exercises_completed == total_exercises,
    };
    let workout_id = completion.workout_id;
    store.record_completion(user, completion)?;

    println!(
        "✓ Workout recorded: {}/{} exercises",
        exercises_completed, total_exercises
    );
    println!("  Workout id: {}", workout_id);
    Ok(())
}

fn cmd_progress(store: &JsonStore, user: UserId, days: u32) -> Result<()> {
    let progress = store.progress(user)?;
    let Some(totals) = summary(&progress) else {
        println!("No completed workouts yet.");
        return Ok(());
    };

    let today = chrono::Local::now().date_naive();
    let streak = workout_streak(&progress, today);

    println!("\n📊 Progress");
    println!();
    println!("  Current streak: {} days", streak.current_streak);
    println!("  Longest streak: {} days", streak.longest_streak);
    println!();

    println!("  Recent workouts:");
    let recent_start = progress.len().saturating_sub(5);
    for workout in &progress[recent_start..] {
        println!(
            "  • {}  {}/{} exercises ({:.1}%){}",
            workout.date,
            workout.exercises_completed,
            workout.total_exercises,
            workout.completion_rate(),
            if workout.workout_completed { "  ✓" } else { "" }
        );
    }
    println!();

    let daily = intensity_stats(&progress, today, days);
    if !daily.is_empty() {
        println!("  Last {} days:", days);
        for day in &daily {
            println!(
                "  • {}  {} exercises, {:.1}% done",
                day.date, day.total_exercises, day.completion_rate
            );
        }
        println!();
    }

    println!("  Total workouts:     {}", totals.total_workouts);
    println!("  Fully completed:    {}", totals.completed_workouts);
    println!("  Average completion: {:.1}%", totals.average_completion);
    println!();
    Ok(())
}

fn cmd_reminder(store: &JsonStore, user: UserId, time: Option<chrono::NaiveTime>) -> Result<()> {
    match time {
        Some(time) => {
            store.set_reminder(user, time)?;
            println!("✓ Reminder set for {}", time.format("%H:%M"));
        }
        None => match store.reminder(user)? {
            Some(time) => println!("Reminder: {}", time.format("%H:%M")),
            None => println!("No reminder set."),
        },
    }
    Ok(())
}

fn cmd_catalog(catalog: &Catalog) -> Result<()> {
    println!("Catalog: {} exercises", catalog.len());

    let warnings = catalog.validate();
    if warnings.is_empty() {
        println!("✓ No problems found");
    } else {
        println!("Warnings:");
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }
    tracing::debug!("Catalog check produced {} warnings", warnings.len());
    Ok(())
}
