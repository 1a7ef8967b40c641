//! Command implementations for the CLI interface.
//!
//! Every command goes through [`TaskService`], the same path a graphical
//! front end would take, and prints the status message the service
//! published for it.

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::error::ServiceResult;
use crate::fields::{SortOrder, Status};
use crate::service::TaskService;
use crate::store::{resolve_task_identifier, sort_tasks};
use crate::task::{Task, TaskDraft};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks, newest first.
    List {
        /// Only tasks still pending.
        #[arg(long)]
        pending: bool,
        /// Ordering: lexical (stored order of date/time strings) | chronological.
        #[arg(long, value_enum, default_value_t = SortOrder::Lexical)]
        sort: SortOrder,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by ID or name.
    View {
        /// Task ID or name to view
        id: String,
    },

    /// Add a new task.
    Add {
        /// Short name for the task.
        name: String,
        /// Description (required).
        #[arg(long, default_value = "")]
        desc: String,
        /// Status: pendiente | completada | cancelada.
        #[arg(long, value_enum, default_value_t = Status::Pendiente)]
        status: Status,
        /// Date as DD/MM/YYYY. Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Time as HH:MM. Defaults to now.
        #[arg(long)]
        time: Option<String>,
        /// Free-form category.
        #[arg(long, default_value = "")]
        category: String,
        /// Flag the task as needing an alarm.
        #[arg(long)]
        alarm: bool,
    },

    /// Replace fields on a task. Unspecified fields keep their value.
    Edit {
        /// Task ID or name to edit
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// true | false
        #[arg(long)]
        alarm: Option<bool>,
    },

    /// Mark a task as completed.
    Complete {
        /// Task ID or name to complete
        id: String,
    },

    /// Delete a task by ID or name.
    Delete {
        /// Task ID or name to delete
        id: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell: bash | zsh | fish | powershell | elvish.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Run one command against the service.
pub async fn execute(service: &TaskService, command: Commands) -> Result<()> {
    match command {
        Commands::List {
            pending,
            sort,
            json,
            limit,
        } => cmd_list(service, pending, sort, json, limit).await,
        Commands::View { id } => cmd_view(service, &id).await,
        Commands::Add {
            name,
            desc,
            status,
            date,
            time,
            category,
            alarm,
        } => {
            let now = Local::now();
            let draft = TaskDraft {
                name,
                description: desc,
                status,
                date: date.unwrap_or_else(|| now.format("%d/%m/%Y").to_string()),
                time: time.unwrap_or_else(|| now.format("%H:%M").to_string()),
                category,
                requires_alarm: alarm,
            };
            cmd_add(service, draft).await
        }
        Commands::Edit {
            id,
            name,
            desc,
            status,
            date,
            time,
            category,
            alarm,
        } => {
            let patch = EditPatch {
                name,
                description: desc,
                status,
                date,
                time,
                category,
                requires_alarm: alarm,
            };
            cmd_edit(service, &id, patch).await
        }
        Commands::Complete { id } => cmd_complete(service, &id).await,
        Commands::Delete { id } => cmd_delete(service, &id).await,
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Fields given to `edit`; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct EditPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub category: Option<String>,
    pub requires_alarm: Option<bool>,
}

impl EditPatch {
    /// Full replacement draft built from `current`.
    pub fn apply(self, current: &Task) -> TaskDraft {
        let mut draft = TaskDraft::from(current);
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
        if let Some(v) = self.status {
            draft.status = v;
        }
        if let Some(v) = self.date {
            draft.date = v;
        }
        if let Some(v) = self.time {
            draft.time = v;
        }
        if let Some(v) = self.category {
            draft.category = v;
        }
        if let Some(v) = self.requires_alarm {
            draft.requires_alarm = v;
        }
        draft
    }
}

/// List tasks with optional pending filter and ordering.
pub async fn cmd_list(
    service: &TaskService,
    pending: bool,
    sort: SortOrder,
    json: bool,
    limit: Option<usize>,
) -> Result<()> {
    let tasks = load(service).await?;
    let mut tasks: Vec<Task> = if pending {
        tasks.iter().filter(|t| t.is_pending()).cloned().collect()
    } else {
        tasks.to_vec()
    };
    sort_tasks(&mut tasks, sort);
    if let Some(n) = limit {
        tasks.truncate(n);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if tasks.is_empty() {
        println!("No tasks.");
    } else {
        print_table(&tasks);
    }
    Ok(())
}

/// Show every field of one task.
pub async fn cmd_view(service: &TaskService, id: &str) -> Result<()> {
    let tasks = load(service).await?;
    let task = resolve_task_identifier(id, &tasks).map_err(|e| anyhow!(e))?;
    println!("ID:           {}", task.id);
    println!("Name:         {}", task.name);
    println!("Status:       {}", task.status);
    println!("Date:         {}", task.date);
    println!("Time:         {}", task.time);
    println!("Category:     {}", if task.category.is_empty() { "-" } else { task.category.as_str() });
    println!("Alarm:        {}", if task.requires_alarm { "on" } else { "off" });
    println!("Description:\n{}", task.description);
    Ok(())
}

pub async fn cmd_add(service: &TaskService, draft: TaskDraft) -> Result<()> {
    let task = finish(service, service.save_or_update(None, draft).await)?;
    println!("Added task {}", task.id);
    Ok(())
}

pub async fn cmd_edit(service: &TaskService, id: &str, patch: EditPatch) -> Result<()> {
    let tasks = load(service).await?;
    let current = resolve_task_identifier(id, &tasks).map_err(|e| anyhow!(e))?;
    let draft = patch.apply(current);
    finish(service, service.save_or_update(Some(current.id.clone()), draft).await)?;
    Ok(())
}

pub async fn cmd_complete(service: &TaskService, id: &str) -> Result<()> {
    let tasks = load(service).await?;
    let task = resolve_task_identifier(id, &tasks).map_err(|e| anyhow!(e))?;
    finish(service, service.complete(task).await)?;
    Ok(())
}

pub async fn cmd_delete(service: &TaskService, id: &str) -> Result<()> {
    let tasks = load(service).await?;
    let task = resolve_task_identifier(id, &tasks).map_err(|e| anyhow!(e))?;
    finish(service, service.remove(task).await)?;
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Refresh and return the list; the routine load notice is not printed.
async fn load(service: &TaskService) -> Result<std::sync::Arc<Vec<Task>>> {
    let result = service.refresh().await;
    let message = service.consume_status_message();
    result.map_err(|e| anyhow!("{}: {e}", message.unwrap_or_default()))
}

/// Print the status message of an operation: stdout on success, stderr on failure.
fn finish<T>(service: &TaskService, result: ServiceResult<T>) -> Result<T> {
    let message = service.consume_status_message();
    match result {
        Ok(value) => {
            if let Some(m) = message {
                println!("{m}");
            }
            Ok(value)
        }
        Err(e) => {
            if let Some(m) = message {
                eprintln!("{m}");
            }
            Err(e.into())
        }
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!(
        "{:<36} {:<10} {:<10} {:<5} {:<5} {:<12} {}",
        "ID", "Status", "Date", "Time", "Alarm", "Category", "Name"
    );
    for t in tasks {
        println!(
            "{:<36} {:<10} {:<10} {:<5} {:<5} {:<12} {}",
            t.id,
            t.status.as_str(),
            truncate(&t.date, 10),
            truncate(&t.time, 5),
            if t.requires_alarm { "on" } else { "-" },
            truncate(if t.category.is_empty() { "-" } else { t.category.as_str() }, 12),
            t.name
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
