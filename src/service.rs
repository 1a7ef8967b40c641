//! Service layer between callers and the [`TaskStore`].
//!
//! Validates input, runs store calls on tokio's blocking pool, and publishes
//! the loading flag, the refreshed task list and a status message to the
//! [`StateHub`] after every operation. Failures are published as status
//! messages and returned; nothing here panics on a store error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::error::{ServiceError, ServiceResult, StoreError, StoreResult};
use crate::fields::Status;
use crate::state::{Snapshot, StateHub, Subscription};
use crate::store::{TaskStore, WriteOutcome};
use crate::task::{new_task_id, Task, TaskDraft};

pub const MSG_LOADING: &str = "Cargando datos...";
pub const MSG_LOADED: &str = "Datos actualizados correctamente.";
pub const MSG_LOAD_FAILED: &str = "Error al cargar las tareas";
pub const MSG_MISSING_FIELDS: &str = "ERROR: Falta completar campos obligatorios.";
pub const MSG_SAVED: &str = "Tarea guardada correctamente";
pub const MSG_UPDATED: &str = "Tarea actualizada correctamente";
pub const MSG_SAVE_FAILED: &str = "Error al guardar la tarea";
pub const MSG_COMPLETED: &str = "Tarea marcada como 'Completada'";
pub const MSG_COMPLETE_FAILED: &str = "Error al intentar cambiar el estado";
pub const MSG_DELETE_FAILED: &str = "Error al eliminar la tarea";

pub fn deleted_message(name: &str) -> String {
    format!("Tarea '{}' eliminada.", name)
}

#[derive(Debug, Clone)]
pub struct TaskService {
    store: Arc<TaskStore>,
    hub: StateHub,
    refresh_delay: Duration,
}

impl TaskService {
    pub fn new(store: TaskStore) -> Self {
        TaskService {
            store: Arc::new(store),
            hub: StateHub::new(),
            refresh_delay: Duration::ZERO,
        }
    }

    /// Pause inside `refresh` between the loading notice and the read.
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.hub.snapshot()
    }

    /// Pending tasks from the last published list.
    pub fn pending_tasks(&self) -> Vec<Task> {
        self.snapshot().pending().into_iter().cloned().collect()
    }

    /// Take the status message so it is shown only once.
    pub fn consume_status_message(&self) -> Option<String> {
        self.hub.take_status_message()
    }

    /// Re-read every task and publish the list.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ServiceResult<Arc<Vec<Task>>> {
        self.reload(true).await
    }

    /// Shared body of `refresh`. With `announce` off the current status
    /// message is left alone, so the outcome of a write stays visible.
    async fn reload(&self, announce: bool) -> ServiceResult<Arc<Vec<Task>>> {
        self.hub.publish(|s| {
            s.loading = true;
            if announce {
                s.status_message = Some(MSG_LOADING.to_string());
            }
        });

        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }

        match self.run(|store| store.read_all()).await {
            Ok(tasks) => {
                let tasks = Arc::new(tasks);
                let count = tasks.len();
                self.hub.publish(|s| {
                    s.tasks = Arc::clone(&tasks);
                    s.loading = false;
                    if announce {
                        s.status_message = Some(MSG_LOADED.to_string());
                    }
                });
                info!(count, "tasks refreshed");
                Ok(tasks)
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous list");
                self.hub.publish(|s| {
                    s.loading = false;
                    s.status_message = Some(MSG_LOAD_FAILED.to_string());
                });
                Err(e.into())
            }
        }
    }

    /// Create a task (`id` is `None`) or replace the one with `id`.
    ///
    /// Returns the stored task.
    #[instrument(skip(self, draft), fields(editing = id.is_some()))]
    pub async fn save_or_update(&self, id: Option<String>, draft: TaskDraft) -> ServiceResult<Task> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            warn!(?missing, "rejecting task with blank required fields");
            self.set_status(MSG_MISSING_FIELDS);
            return Err(ServiceError::Validation(missing));
        }

        let editing = id.is_some();
        let task = Task::from_draft(id.unwrap_or_else(new_task_id), draft);

        let stored = task.clone();
        let result = if editing {
            self.run(move |store| store.update(&stored)).await.map(|_| ())
        } else {
            self.run(move |store| store.create(&stored)).await
        };

        match result {
            Ok(()) => {
                self.set_status(if editing { MSG_UPDATED } else { MSG_SAVED });
                self.refresh_after_write().await;
                Ok(task)
            }
            Err(e) => {
                self.set_status(MSG_SAVE_FAILED);
                Err(e.into())
            }
        }
    }

    /// Mark a task `Completada`.
    #[instrument(skip(self, task), fields(id = %task.id))]
    pub async fn complete(&self, task: &Task) -> ServiceResult<Task> {
        let completed = task.with_status(Status::Completada);
        let stored = completed.clone();
        match self.run(move |store| store.update(&stored)).await {
            Ok(outcome) => {
                if outcome == WriteOutcome::Created {
                    warn!("completed task was not stored yet, added it");
                }
                self.set_status(MSG_COMPLETED);
                self.refresh_after_write().await;
                Ok(completed)
            }
            Err(e) => {
                self.set_status(MSG_COMPLETE_FAILED);
                Err(e.into())
            }
        }
    }

    /// Delete a task by its id.
    #[instrument(skip(self, task), fields(id = %task.id))]
    pub async fn remove(&self, task: &Task) -> ServiceResult<()> {
        let id = task.id.clone();
        match self.run(move |store| store.delete(&id)).await {
            Ok(_) => {
                self.set_status(&deleted_message(&task.name));
                self.refresh_after_write().await;
                Ok(())
            }
            Err(e) => {
                self.set_status(MSG_DELETE_FAILED);
                Err(e.into())
            }
        }
    }

    /// Run a store call on the blocking pool.
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&TaskStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))?
    }

    fn set_status(&self, message: &str) {
        self.hub.publish(|s| s.status_message = Some(message.to_string()));
    }

    /// The write already succeeded; a failed re-read is published by
    /// `reload` and not reported as a failure of the write.
    async fn refresh_after_write(&self) {
        let _ = self.reload(false).await;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn draft(name: &str) -> TaskDraft {
        TaskDraft {
            name: name.into(),
            description: "2L".into(),
            status: Status::Pendiente,
            date: "01/01/2025".into(),
            time: "09:00".into(),
            category: "Compras".into(),
            requires_alarm: false,
        }
    }

    fn service() -> (tempfile::TempDir, TaskService) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TaskStore::open(dir.path().join("tasks.csv")).expect("open");
        (dir, TaskService::new(store))
    }

    #[tokio::test]
    async fn refresh_publishes_list_and_clears_loading() {
        let (_dir, svc) = service();
        svc.store()
            .create(&Task::from_draft("1".into(), draft("Buy milk")))
            .unwrap();

        let tasks = svc.refresh().await.unwrap();
        assert_eq!(tasks.len(), 1);

        let snap = svc.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.tasks.len(), 1);
        assert_eq!(snap.status_message.as_deref(), Some(MSG_LOADED));
    }

    #[tokio::test(start_paused = true)]
    async fn subscriber_sees_loading_then_loaded() {
        let (_dir, svc) = service();
        let svc = svc.with_refresh_delay(Duration::from_millis(500));
        let mut sub = svc.subscribe();
        let refresh = svc.refresh();
        tokio::pin!(refresh);

        // the loading notice is published before the delay starts
        let first = tokio::select! {
            biased;
            snap = sub.changed() => snap.unwrap(),
            _ = &mut refresh => panic!("refresh finished before the loading notice was observed"),
        };
        assert!(first.loading);
        assert_eq!(first.status_message.as_deref(), Some(MSG_LOADING));

        refresh.await.unwrap();
        let last = sub.latest();
        assert!(!last.loading);
        assert_eq!(last.status_message.as_deref(), Some(MSG_LOADED));
    }

    #[tokio::test]
    async fn save_creates_with_fresh_id_and_refreshes() {
        let (_dir, svc) = service();
        let task = svc.save_or_update(None, draft("Buy milk")).await.unwrap();
        assert_eq!(task.id.len(), 36);

        let snap = svc.snapshot();
        assert_eq!(snap.tasks.as_slice(), &[task]);
        assert!(!snap.loading);
        assert_eq!(snap.status_message.as_deref(), Some(MSG_SAVED));
    }

    #[tokio::test]
    async fn save_with_id_updates_existing() {
        let (_dir, svc) = service();
        let task = svc.save_or_update(None, draft("Buy milk")).await.unwrap();

        let edited = svc
            .save_or_update(Some(task.id.clone()), draft("Buy oat milk"))
            .await
            .unwrap();
        assert_eq!(edited.id, task.id);

        let all = svc.store().read_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Buy oat milk");
        assert_eq!(svc.consume_status_message().as_deref(), Some(MSG_UPDATED));
    }

    #[tokio::test]
    async fn blank_name_never_reaches_the_store() {
        let (_dir, svc) = service();
        let before = fs::read_to_string(svc.store().path()).unwrap();
        let mut sub = svc.subscribe();

        let err = svc.save_or_update(None, draft("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref f) if f == &vec!["name"]));

        let snap = sub.changed().await.unwrap();
        assert_eq!(snap.status_message.as_deref(), Some(MSG_MISSING_FIELDS));
        assert!(!snap.loading);
        assert_eq!(fs::read_to_string(svc.store().path()).unwrap(), before);
        assert!(svc.store().read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_and_remove() {
        let (_dir, svc) = service();
        let task = svc.save_or_update(None, draft("Buy milk")).await.unwrap();

        let done = svc.complete(&task).await.unwrap();
        assert_eq!(done.status, Status::Completada);
        assert_eq!(svc.snapshot().tasks[0].status, Status::Completada);
        assert!(svc.pending_tasks().is_empty());
        assert_eq!(svc.consume_status_message().as_deref(), Some(MSG_COMPLETED));

        svc.remove(&done).await.unwrap();
        assert!(svc.snapshot().tasks.is_empty());
        assert_eq!(
            svc.consume_status_message(),
            Some("Tarea 'Buy milk' eliminada.".to_string())
        );
    }

    #[tokio::test]
    async fn removing_unknown_task_publishes_error() {
        let (_dir, svc) = service();
        let ghost = Task::from_draft("ghost".into(), draft("Ghost"));

        let err = svc.remove(&ghost).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
        assert_eq!(svc.consume_status_message().as_deref(), Some(MSG_DELETE_FAILED));
    }

    #[tokio::test]
    async fn status_message_is_consumed_once() {
        let (_dir, svc) = service();
        svc.refresh().await.unwrap();
        assert_eq!(svc.consume_status_message().as_deref(), Some(MSG_LOADED));
        assert_eq!(svc.consume_status_message(), None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let (_dir, svc) = service();
        svc.save_or_update(None, draft("Buy milk")).await.unwrap();

        let path = svc.store().path().to_path_buf();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(svc.refresh().await.is_err());
        let snap = svc.snapshot();
        assert_eq!(snap.tasks.len(), 1);
        assert!(!snap.loading);
        assert_eq!(snap.status_message.as_deref(), Some(MSG_LOAD_FAILED));

        let err = svc.save_or_update(None, draft("Eggs")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Io { .. })));
        assert_eq!(svc.consume_status_message().as_deref(), Some(MSG_SAVE_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_waits_for_configured_delay() {
        let (_dir, svc) = service();
        let svc = svc.with_refresh_delay(Duration::from_secs(2));
        let started = tokio::time::Instant::now();
        svc.refresh().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
