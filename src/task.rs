//! Task data structure and related functionality.
//!
//! This module defines the `Task` record persisted one-per-line in
//! `tasks.csv`, the `TaskDraft` the service builds tasks from, and the
//! read-side pending view.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::Status;

/// One to-do item with its scheduling metadata.
///
/// Tasks are only ever replaced whole; there is no partial field update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: Status,
    /// `DD/MM/YYYY`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    pub category: String,
    pub requires_alarm: bool,
}

/// User-entered fields of a task, without an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub date: String,
    pub time: String,
    pub category: String,
    pub requires_alarm: bool,
}

impl Task {
    /// Build a task from a draft under the given id.
    pub fn from_draft(id: String, draft: TaskDraft) -> Self {
        Task {
            id,
            name: draft.name,
            description: draft.description,
            status: draft.status,
            date: draft.date,
            time: draft.time,
            category: draft.category,
            requires_alarm: draft.requires_alarm,
        }
    }

    /// Copy of this task with a different status.
    pub fn with_status(&self, status: Status) -> Self {
        Task {
            status,
            ..self.clone()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pendiente
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        TaskDraft {
            name: task.name.clone(),
            description: task.description.clone(),
            status: task.status,
            date: task.date.clone(),
            time: task.time.clone(),
            category: task.category.clone(),
            requires_alarm: task.requires_alarm,
        }
    }
}

impl TaskDraft {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("date", &self.date),
            ("time", &self.time),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Fresh random task id.
pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}

/// Tasks still waiting to be done, in their original order.
pub fn pending(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_pending()).collect()
}
