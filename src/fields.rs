//! Enumerations and field types for tasks.
//!
//! This module defines the task status values as they are spelled on disk,
//! plus the ordering options offered when listing tasks.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Task completion status.
///
/// The variant names double as the on-disk spelling in `tasks.csv`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    #[value(name = "pendiente")]
    Pendiente,
    #[value(name = "completada")]
    Completada,
    #[value(name = "cancelada")]
    Cancelada,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pendiente, Status::Completada, Status::Cancelada];

    /// Display name, identical to the stored value.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pendiente => "Pendiente",
            Status::Completada => "Completada",
            Status::Cancelada => "Cancelada",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a status string from a CSV field.
///
/// Exact display names match first, then a case-insensitive comparison.
/// Anything else is a legacy value and falls back to [`Status::Pendiente`].
pub fn parse_status(s: &str) -> Status {
    let s = s.trim();
    if let Some(status) = Status::ALL.iter().find(|st| st.as_str() == s) {
        return *status;
    }
    match s.to_lowercase().as_str() {
        "pendiente" => Status::Pendiente,
        "completada" => Status::Completada,
        "cancelada" => Status::Cancelada,
        other => {
            debug!(value = other, "unknown status value, defaulting to Pendiente");
            Status::default()
        }
    }
}

/// Ordering applied by `read_all`.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum SortOrder {
    /// `date` then `time`, descending, compared as plain strings.
    ///
    /// `DD/MM/YYYY` does not sort chronologically this way; this is the
    /// historical ordering of the file and stays the default.
    #[default]
    Lexical,
    /// Newest first by calendar date and time. Unparseable dates go last.
    Chronological,
}
