//! Per-user JSON persistence with file locking.
//!
//! Each concern lives in its own JSON object keyed by user id under the data
//! directory: `users.json`, `progress.json`, `feedback.json` and
//! `reminders.json`. Writers hold an exclusive lock on a sidecar `.lock` file
//! for the whole load-modify-save cycle and replace the data file atomically.
//! Readers take a shared lock on the same sidecar. A data file that cannot be
//! parsed is copied to `<file>.corrupt` before the next write replaces it.

use crate::{Error, FeedbackEntry, Result, UserProfile, WorkoutCompletion};
use chrono::{NaiveTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Telegram-style numeric user id
pub type UserId = i64;

const USERS_FILE: &str = "users.json";
const PROGRESS_FILE: &str = "progress.json";
const FEEDBACK_FILE: &str = "feedback.json";
const REMINDERS_FILE: &str = "reminders.json";

/// Persistence provider for everything keyed by user
pub trait UserStore {
    fn profile(&self, user: UserId) -> Result<Option<UserProfile>>;
    fn save_profile(&self, user: UserId, profile: UserProfile) -> Result<()>;

    /// Feedback in the order it was given, oldest first
    fn feedback_history(&self, user: UserId) -> Result<Vec<FeedbackEntry>>;
    fn save_feedback(&self, user: UserId, entry: FeedbackEntry) -> Result<()>;

    /// Completed workouts, oldest first
    fn progress(&self, user: UserId) -> Result<Vec<WorkoutCompletion>>;
    fn record_completion(&self, user: UserId, completion: WorkoutCompletion) -> Result<()>;

    fn reminder(&self, user: UserId) -> Result<Option<NaiveTime>>;
    fn set_reminder(&self, user: UserId, time: NaiveTime) -> Result<()>;
}

/// Flat JSON file store rooted at a data directory
#[derive(Clone, Debug)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn user_entry<T: DeserializeOwned>(&self, file: &str, user: UserId) -> Result<Option<T>> {
        let mut map: BTreeMap<String, T> = load_map(&self.path(file))?;
        Ok(map.remove(&user.to_string()))
    }
}

impl UserStore for JsonStore {
    fn profile(&self, user: UserId) -> Result<Option<UserProfile>> {
        self.user_entry(USERS_FILE, user)
    }

    fn save_profile(&self, user: UserId, mut profile: UserProfile) -> Result<()> {
        profile.last_updated = Some(Utc::now().naive_utc());
        update_map(&self.path(USERS_FILE), |users: &mut BTreeMap<String, UserProfile>| {
            users.insert(user.to_string(), profile);
        })?;
        tracing::info!("Saved profile for user {}", user);
        Ok(())
    }

    fn feedback_history(&self, user: UserId) -> Result<Vec<FeedbackEntry>> {
        Ok(self.user_entry(FEEDBACK_FILE, user)?.unwrap_or_default())
    }

    fn save_feedback(&self, user: UserId, entry: FeedbackEntry) -> Result<()> {
        update_map(
            &self.path(FEEDBACK_FILE),
            |feedback: &mut BTreeMap<String, Vec<FeedbackEntry>>| {
                let history = feedback.entry(user.to_string()).or_default();
                // A second answer for the same workout replaces the first in place
                match history.iter_mut().find(|e| e.workout_id == entry.workout_id) {
                    Some(existing) => *existing = entry,
                    None => history.push(entry),
                }
            },
        )?;
        tracing::info!("Saved feedback for user {}", user);
        Ok(())
    }

    fn progress(&self, user: UserId) -> Result<Vec<WorkoutCompletion>> {
        Ok(self.user_entry(PROGRESS_FILE, user)?.unwrap_or_default())
    }

    fn record_completion(&self, user: UserId, completion: WorkoutCompletion) -> Result<()> {
        if completion.total_exercises == 0 {
            return Err(Error::Store(
                "completion record must have at least one exercise".into(),
            ));
        }
        update_map(
            &self.path(PROGRESS_FILE),
            |progress: &mut BTreeMap<String, Vec<WorkoutCompletion>>| {
                progress.entry(user.to_string()).or_default().push(completion);
            },
        )?;
        tracing::info!("Recorded workout completion for user {}", user);
        Ok(())
    }

    fn reminder(&self, user: UserId) -> Result<Option<NaiveTime>> {
        let stored: Option<String> = self.user_entry(REMINDERS_FILE, user)?;
        Ok(stored.and_then(|s| match NaiveTime::parse_from_str(&s, "%H:%M") {
            Ok(time) => Some(time),
            Err(e) => {
                tracing::warn!("Ignoring malformed reminder '{}' for user {}: {}", s, user, e);
                None
            }
        }))
    }

    fn set_reminder(&self, user: UserId, time: NaiveTime) -> Result<()> {
        update_map(
            &self.path(REMINDERS_FILE),
            |reminders: &mut BTreeMap<String, String>| {
                reminders.insert(user.to_string(), time.format("%H:%M").to_string());
            },
        )?;
        tracing::info!("Set reminder for user {} at {}", user, time.format("%H:%M"));
        Ok(())
    }
}

/// Open the sidecar lock file guarding `path`
fn open_lock(path: &Path) -> Result<File> {
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path.with_extension("json.lock"))?;
    Ok(lock)
}

/// Load a user-keyed JSON object under a shared lock.
///
/// Missing files read as empty. A corrupted file logs a warning and also
/// reads as empty.
fn load_map<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let lock = open_lock(path)?;
    lock.lock_shared()?;
    let read = read_map(path);
    lock.unlock()?;

    Ok(read?.unwrap_or_default())
}

/// Read a JSON object without locking; `None` if the file is unreadable or corrupt
fn read_map<T: DeserializeOwned>(path: &Path) -> Result<Option<BTreeMap<String, T>>> {
    if !path.exists() {
        return Ok(Some(BTreeMap::new()));
    }

    let mut contents = String::new();
    let read = File::open(path)
        .and_then(|file| std::io::BufReader::new(file).read_to_string(&mut contents));
    if let Err(e) = read {
        tracing::warn!("Failed to read {:?}: {}. Treating as empty.", path, e);
        return Ok(None);
    }

    if contents.trim().is_empty() {
        return Ok(Some(BTreeMap::new()));
    }

    match serde_json::from_str(&contents) {
        Ok(map) => Ok(Some(map)),
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Treating as empty.", path, e);
            Ok(None)
        }
    }
}

/// Copy an unreadable data file to `<file>.corrupt` before it is overwritten
fn quarantine(path: &Path) -> Result<()> {
    let backup = path.with_extension("json.corrupt");
    std::fs::copy(path, &backup)?;
    tracing::warn!("Copied unreadable {:?} to {:?} before overwriting", path, backup);
    Ok(())
}

/// Atomically replace a JSON file: temp file, sync, rename
fn save_map<T: Serialize>(path: &Path, map: &BTreeMap<String, T>) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("{:?} has no parent directory", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, map)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved {:?}", path);
    Ok(())
}

/// Load, modify and save a JSON file under an exclusive lock
fn update_map<T, F>(path: &Path, f: F) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut BTreeMap<String, T>),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let lock = open_lock(path)?;
    lock.lock_exclusive()?;

    let result = read_map(path).and_then(|loaded| {
        let mut map = match loaded {
            Some(map) => map,
            None => {
                quarantine(path)?;
                BTreeMap::new()
            }
        };
        f(&mut map);
        save_map(path, &map)
    });

    lock.unlock()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeedbackLabel;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn completion(day: u32, done: usize, total: usize) -> WorkoutCompletion {
        WorkoutCompletion {
            workout_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            exercises_completed: done,
            total_exercises: total,
            workout_completed: done == total,
        }
    }

    #[test]
    fn test_profile_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        assert!(store.profile(42).unwrap().is_none());

        let profile = UserProfile {
            age: Some(30),
            fitness_level: "Средний".into(),
            goals: "Похудение".into(),
            equipment: "Доступ в спортзал".into(),
            telegram_handle: Some("@runner".into()),
            ..Default::default()
        };
        store.save_profile(42, profile).unwrap();

        let loaded = store.profile(42).unwrap().unwrap();
        assert_eq!(loaded.age, Some(30));
        assert_eq!(loaded.fitness_level, "Средний");
        assert!(loaded.last_updated.is_some());
        assert!(store.profile(7).unwrap().is_none());
    }

    #[test]
    fn test_feedback_history_is_chronological() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        let first = FeedbackEntry::new(Uuid::new_v4(), FeedbackLabel::TooHard);
        let second = FeedbackEntry::new(Uuid::new_v4(), FeedbackLabel::Good);
        store.save_feedback(1, first.clone()).unwrap();
        store.save_feedback(1, second.clone()).unwrap();

        let history = store.feedback_history(1).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].workout_id, first.workout_id);
        assert_eq!(history[1].workout_id, second.workout_id);
        assert!(store.feedback_history(2).unwrap().is_empty());
    }

    #[test]
    fn test_feedback_for_same_workout_replaces() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        let workout = Uuid::new_v4();
        let other = Uuid::new_v4();
        store
            .save_feedback(1, FeedbackEntry::new(workout, FeedbackLabel::TooHard))
            .unwrap();
        store
            .save_feedback(1, FeedbackEntry::new(other, FeedbackLabel::Good))
            .unwrap();
        store
            .save_feedback(1, FeedbackEntry::new(workout, FeedbackLabel::TooEasy))
            .unwrap();

        let history = store.feedback_history(1).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].workout_id, workout);
        assert_eq!(history[0].feedback, FeedbackLabel::TooEasy);
    }

    #[test]
    fn test_progress_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        store.record_completion(5, completion(1, 3, 3)).unwrap();
        store.record_completion(5, completion(2, 1, 4)).unwrap();

        let progress = store.progress(5).unwrap();
        assert_eq!(progress.len(), 2);
        assert!(progress[0].workout_completed);
        assert!(!progress[1].workout_completed);
    }

    #[test]
    fn test_empty_completion_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        let result = store.record_completion(5, completion(1, 0, 0));
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn test_reminder_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        let time = NaiveTime::from_hms_opt(7, 30, 0).unwrap();
        store.set_reminder(9, time).unwrap();
        assert_eq!(store.reminder(9).unwrap(), Some(time));

        let raw = std::fs::read_to_string(temp_dir.path().join(REMINDERS_FILE)).unwrap();
        assert!(raw.contains("\"07:30\""));
    }

    #[test]
    fn test_corrupted_file_reads_as_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(USERS_FILE), "{ invalid json }").unwrap();

        let store = JsonStore::new(temp_dir.path());
        assert!(store.profile(1).unwrap().is_none());

        // Saving over a corrupted file starts fresh
        store.save_profile(1, UserProfile::default()).unwrap();
        assert!(store.profile(1).unwrap().is_some());
    }

    #[test]
    fn test_corrupted_file_is_kept_aside_before_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let feedback_path = temp_dir.path().join(FEEDBACK_FILE);
        let damaged = r#"{"1": [{"workout_id": "truncat"#;
        std::fs::write(&feedback_path, damaged).unwrap();

        let store = JsonStore::new(temp_dir.path());
        store
            .save_feedback(2, FeedbackEntry::new(Uuid::new_v4(), FeedbackLabel::Good))
            .unwrap();

        let backup = temp_dir.path().join("feedback.json.corrupt");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), damaged);
        assert_eq!(store.feedback_history(2).unwrap().len(), 1);
    }

    #[test]
    fn test_healthy_file_is_not_backed_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());
        store.save_profile(1, UserProfile::default()).unwrap();
        store.save_profile(2, UserProfile::default()).unwrap();

        assert!(!temp_dir.path().join("users.json.corrupt").exists());
        assert!(store.profile(1).unwrap().is_some());
    }

    #[test]
    fn test_reader_waits_for_writer_lock() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());
        store.save_profile(1, UserProfile::default()).unwrap();

        let users_path = temp_dir.path().join(USERS_FILE);
        let writer = open_lock(&users_path).unwrap();
        writer.lock_exclusive().unwrap();

        let reader_store = store.clone();
        let (tx, rx) = std::sync::mpsc::channel();
        let reader = std::thread::spawn(move || {
            let profile = reader_store.profile(1).unwrap();
            tx.send(profile.is_some()).unwrap();
        });

        assert!(rx
            .recv_timeout(std::time::Duration::from_millis(200))
            .is_err());
        writer.unlock().unwrap();
        assert!(rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap());
        reader.join().unwrap();
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());
        store.save_profile(1, UserProfile::default()).unwrap();

        let mut names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["users.json", "users.json.lock"]);
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_updates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().to_path_buf();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = JsonStore::new(dir.clone());
                std::thread::spawn(move || {
                    store
                        .save_feedback(
                            1,
                            FeedbackEntry::new(Uuid::new_v4(), FeedbackLabel::Good),
                        )
                        .unwrap();
                    i
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = JsonStore::new(dir);
        assert_eq!(store.feedback_history(1).unwrap().len(), 8);
    }
}
