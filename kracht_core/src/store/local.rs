//! File-backed store in the data directory.
//!
//! Layout:
//! - `workouts.json`, `templates.json`, `profile.json`: whole documents,
//!   replaced atomically (temp file, fsync, rename)
//! - `snacks.jsonl`: append-only JSON Lines log
//! - `store.lock`: held exclusively around every read-modify-write
//!
//! Readers take shared locks; a document that fails to parse is reported as
//! `StorageUnavailable` so it is never silently overwritten.

use super::Store;
use crate::templates::{default_templates, upsert_templates};
use crate::{Error, Result, User, Workout, WorkoutSnack, WorkoutTemplate};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const WORKOUTS_FILE: &str = "workouts.json";
const TEMPLATES_FILE: &str = "templates.json";
const PROFILE_FILE: &str = "profile.json";
const SNACKS_FILE: &str = "snacks.jsonl";
const LOCK_FILE: &str = "store.lock";

/// Local JSON store rooted at a data directory
#[derive(Clone, Debug)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Create a store for the given directory (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Ensure the data directory exists
    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Run a read-modify-write under the store-wide exclusive lock
    fn locked<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.ensure_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path(LOCK_FILE))?;
        lock.lock_exclusive()?;
        let result = f();
        lock.unlock()?;
        result
    }

    fn stored_templates(&self) -> Result<Vec<WorkoutTemplate>> {
        let stored: Vec<WorkoutTemplate> =
            read_document(&self.path(TEMPLATES_FILE))?.unwrap_or_default();
        if stored.is_empty() {
            Ok(default_templates())
        } else {
            Ok(stored)
        }
    }
}

/// Read and parse a JSON document under a shared lock
///
/// Returns `None` if the file doesn't exist.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents).map(Some).map_err(|e| {
        tracing::warn!("Failed to parse {:?}: {}", path, e);
        Error::StorageUnavailable(format!("{} is corrupted: {}", path.display(), e))
    })
}

/// Atomically replace a JSON document
fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "document path missing parent")
    })?;
    std::fs::create_dir_all(parent)?;

    // Unique temp file in the same directory for atomic rename
    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

impl Store for LocalStore {
    fn load_workouts(&self) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> =
            read_document(&self.path(WORKOUTS_FILE))?.unwrap_or_default();
        crate::history::sort_newest_first(&mut workouts);
        tracing::debug!("Loaded {} workouts", workouts.len());
        Ok(workouts)
    }

    fn save_workout(&self, workout: &Workout) -> Result<()> {
        self.locked(|| {
            let path = self.path(WORKOUTS_FILE);
            let mut workouts: Vec<Workout> = read_document(&path)?.unwrap_or_default();

            match workouts.iter_mut().find(|w| w.id == workout.id) {
                Some(slot) => *slot = workout.clone(),
                None => workouts.insert(0, workout.clone()),
            }

            write_document(&path, &workouts)?;
            tracing::debug!("Saved workout {}", workout.id);
            Ok(())
        })
    }

    fn delete_workout(&self, id: &str) -> Result<()> {
        self.locked(|| {
            let path = self.path(WORKOUTS_FILE);
            let mut workouts: Vec<Workout> = read_document(&path)?.unwrap_or_default();
            let before = workouts.len();
            workouts.retain(|w| w.id != id);

            if workouts.len() == before {
                tracing::debug!("No workout {} to delete", id);
                return Ok(());
            }

            write_document(&path, &workouts)?;
            tracing::debug!("Deleted workout {}", id);
            Ok(())
        })
    }

    fn load_templates(&self) -> Result<Vec<WorkoutTemplate>> {
        self.stored_templates()
    }

    fn save_templates(&self, templates: &[WorkoutTemplate]) -> Result<()> {
        self.locked(|| {
            let mut stored = self.stored_templates()?;
            upsert_templates(&mut stored, templates);
            write_document(&self.path(TEMPLATES_FILE), &stored)?;
            tracing::debug!("Saved {} templates", templates.len());
            Ok(())
        })
    }

    fn delete_template(&self, id: &str) -> Result<()> {
        self.locked(|| {
            let mut stored = self.stored_templates()?;
            stored.retain(|t| t.id != id);
            write_document(&self.path(TEMPLATES_FILE), &stored)?;
            tracing::debug!("Deleted template {}", id);
            Ok(())
        })
    }

    fn load_profile(&self) -> Result<Option<User>> {
        read_document(&self.path(PROFILE_FILE))
    }

    fn save_profile(&self, user: &User) -> Result<()> {
        self.locked(|| write_document(&self.path(PROFILE_FILE), user))
    }

    fn save_snack(&self, snack: &WorkoutSnack) -> Result<()> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(SNACKS_FILE))?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(snack)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended snack {}", snack.id);
        Ok(())
    }

    fn load_snacks(&self) -> Result<Vec<WorkoutSnack>> {
        let path = self.path(SNACKS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut snacks = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<WorkoutSnack>(&line) {
                Ok(snack) => snacks.push(snack),
                Err(e) => {
                    // Skip the damaged line, keep the rest of the log
                    tracing::warn!("Failed to parse snack at line {}: {}", line_num + 1, e);
                }
            }
        }

        file.unlock()?;
        snacks.sort_by(|a, b| b.date.cmp(&a.date));
        tracing::debug!("Read {} snacks", snacks.len());
        Ok(snacks)
    }
}
