//! # tareas
//!
//! A small task manager whose tasks live in a single comma-separated file.
//!
//! - [`codec`] turns a [`Task`] into one CSV line and back.
//! - [`store::TaskStore`] owns the file: read-all, create, update, delete,
//!   each a whole-file rewrite through a temp file and rename.
//! - [`service::TaskService`] validates input, runs store calls off the async
//!   executor and publishes a versioned [`state::Snapshot`] (loading flag, task
//!   list, one-shot status message) to subscribers.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use tareas::{Status, TaskDraft, TaskService, TaskStore};
//!
//! let service = TaskService::new(TaskStore::open("tasks.csv")?);
//! let mut updates = service.subscribe();
//!
//! let task = service
//!     .save_or_update(
//!         None,
//!         TaskDraft {
//!             name: "Buy milk".into(),
//!             description: "2L".into(),
//!             status: Status::Pendiente,
//!             date: "01/01/2025".into(),
//!             time: "09:00".into(),
//!             category: "Compras".into(),
//!             requires_alarm: false,
//!         },
//!     )
//!     .await?;
//! service.complete(&task).await?;
//!
//! let latest = updates.latest();
//! assert!(latest.pending().is_empty());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod cmd;
pub mod codec;
pub mod config;
pub mod error;
pub mod fields;
pub mod logging;
pub mod service;
pub mod state;
pub mod store;
pub mod task;

pub use error::{ServiceError, StoreError};
pub use fields::{SortOrder, Status};
pub use service::TaskService;
pub use store::TaskStore;
pub use task::{Task, TaskDraft};
