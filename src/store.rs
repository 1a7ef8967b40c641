//! File-backed task store.
//!
//! `TaskStore` is the only thing that touches `tasks.csv`. Every mutation is
//! a full read-modify-write: load all records, compute the new set, write it
//! to a sibling temp file and rename that over the original. Mutations made
//! through one `TaskStore` hold a lock for the whole sequence, so they never
//! overwrite each other.

use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, error, info};

use crate::codec::{decode, encode};
use crate::error::{StoreError, StoreResult};
use crate::fields::SortOrder;
use crate::task::Task;

/// Default file name inside the data directory.
pub const DEFAULT_FILE_NAME: &str = "tasks.csv";

/// What `update` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Updated,
    /// No task had the id, so it was added.
    Created,
}

#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TaskStore {
    /// Open the store at `path`, creating parent directories and an empty
    /// file if needed.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = TaskStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        };
        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| store.fail(parent, e))?;
        }
        store.ensure_file()?;
        debug!(path = %store.path.display(), "task store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks, newest `date`/`time` first by plain string comparison.
    pub fn read_all(&self) -> StoreResult<Vec<Task>> {
        self.read_all_sorted(SortOrder::Lexical)
    }

    /// All tasks in the requested order.
    pub fn read_all_sorted(&self, order: SortOrder) -> StoreResult<Vec<Task>> {
        let mut tasks = self.load()?;
        sort_tasks(&mut tasks, order);
        Ok(tasks)
    }

    /// Get a task by ID.
    pub fn get(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(self.load()?.into_iter().find(|t| t.id == id))
    }

    /// Add a new task. Fails if its id is already stored.
    pub fn create(&self, task: &Task) -> StoreResult<()> {
        let _guard = self.lock();
        let mut tasks = self.load()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::DuplicateId(task.id.clone()));
        }
        tasks.push(task.clone());
        self.save(&tasks)?;
        info!(id = %task.id, "task created");
        Ok(())
    }

    /// Replace the first task with the same id, or add it if none matches.
    pub fn update(&self, task: &Task) -> StoreResult<WriteOutcome> {
        let _guard = self.lock();
        let mut tasks = self.load()?;
        let outcome = match tasks.iter().position(|t| t.id == task.id) {
            Some(idx) => {
                tasks[idx] = task.clone();
                WriteOutcome::Updated
            }
            None => {
                tasks.push(task.clone());
                WriteOutcome::Created
            }
        };
        self.save(&tasks)?;
        info!(id = %task.id, ?outcome, "task updated");
        Ok(outcome)
    }

    /// Remove every task with `id`. Returns how many were removed.
    pub fn delete(&self, id: &str) -> StoreResult<usize> {
        let _guard = self.lock();
        let mut tasks = self.load()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        let removed = before - tasks.len();
        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save(&tasks)?;
        info!(id, removed, "task deleted");
        Ok(removed)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_file(&self) -> StoreResult<()> {
        if !self.path.exists() {
            File::create(&self.path).map_err(|e| self.fail(&self.path, e))?;
            info!(path = %self.path.display(), "created empty task file");
        }
        Ok(())
    }

    /// Records in file order, skipping undecodable lines.
    fn load(&self) -> StoreResult<Vec<Task>> {
        self.ensure_file()?;
        let content = fs::read_to_string(&self.path).map_err(|e| self.fail(&self.path, e))?;
        let mut skipped = 0usize;
        let tasks: Vec<Task> = content
            .lines()
            .filter_map(|line| {
                let task = decode(line);
                if task.is_none() && !line.trim().is_empty() {
                    skipped += 1;
                }
                task
            })
            .collect();
        if skipped > 0 {
            debug!(skipped, path = %self.path.display(), "skipped undecodable lines");
        }
        Ok(tasks)
    }

    /// Write the full set via temp file + rename.
    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let tmp = self.path.with_extension("csv.tmp");
        let result = write_lines(&tmp, tasks).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(self.fail(&self.path, e));
        }
        debug!(count = tasks.len(), path = %self.path.display(), "task file rewritten");
        Ok(())
    }

    fn fail(&self, path: &Path, e: std::io::Error) -> StoreError {
        error!(path = %path.display(), error = %e, "task file I/O failed");
        StoreError::io(path, e)
    }
}

fn write_lines(path: &Path, tasks: &[Task]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    for task in tasks {
        writeln!(w, "{}", encode(task))?;
    }
    let file = w.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Sort tasks in place, newest first.
pub fn sort_tasks(tasks: &mut [Task], order: SortOrder) {
    match order {
        SortOrder::Lexical => tasks.sort_by(lexical_desc),
        SortOrder::Chronological => tasks.sort_by(|a, b| match (when(a), when(b)) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => lexical_desc(a, b),
        }),
    }
}

fn lexical_desc(a: &Task, b: &Task) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.time.cmp(&a.time))
}

/// Calendar timestamp of a task; a bad time counts as midnight.
fn when(task: &Task) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(task.date.trim(), "%d/%m/%Y").ok()?;
    let time = NaiveTime::parse_from_str(task.time.trim(), "%H:%M").unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

/// Resolve a task identifier (either ID or name) to a task.
/// Returns an error if the name has multiple matches and suggests using ID instead.
pub fn resolve_task_identifier<'a>(identifier: &str, tasks: &'a [Task]) -> Result<&'a Task, String> {
    if let Some(task) = tasks.iter().find(|t| t.id == identifier) {
        return Ok(task);
    }

    // Search by name (case-insensitive)
    let wanted = identifier.to_lowercase();
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.name.to_lowercase() == wanted)
        .collect();

    match matches.len() {
        0 => Err(format!("No task found with id or name '{}'", identifier)),
        1 => Ok(matches[0]),
        _ => {
            let mut error_msg = format!("Multiple tasks found with name '{}':\n", identifier);
            for task in matches {
                error_msg.push_str(&format!(
                    "  {}: {} ({} {}) [{}]\n",
                    task.id, task.name, task.date, task.time, task.status
                ));
            }
            error_msg.push_str("Please use the specific ID instead.");
            Err(error_msg)
        }
    }
}
