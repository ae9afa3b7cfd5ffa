//! Implementation plan model and the operations over it.
//!
//! The planning document is a Markdown file with two views of every task:
//! a one-line checklist entry under a milestone heading, and an optional
//! detailed block further down the file.
//!
//! ```text
//! # Implementation Plan
//!
//! ## Milestone 1 — Foundations
//! - [x] TASK-001 · Simple · Create workspace
//! - [ ] TASK-002 · Medium · Parse plans
//!
//! ## TASK-002: Parse plans
//! **Status:** pending
//! **Complexity:** Medium
//! **Depends on:** TASK-001
//! ```
//!
//! - [`parse_plan`] - text to [`Plan`]
//! - [`select_task`] - pick the next eligible task
//! - [`update_task_status`] - rewrite a task's status in place
//! - [`PlanStore`] - load and atomically persist the plan file
//!
//! A [`Plan`] is immutable once parsed. Status changes go through
//! [`update_task_status`], which produces new text that must be parsed
//! again before selection sees the change.

mod parsing;
mod selection;
pub mod store;
mod update;

pub use parsing::{parse_plan, PlanParseError, DEFAULT_PLAN_TITLE};
pub use selection::{select_task, SelectionError};
pub use store::PlanStore;
pub use update::{mentions_task, update_task_status};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Task Identifier
// ============================================================================

/// Identifier of a task, e.g. `TASK-007`.
///
/// Equality and ordering are by exact string value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a task id from any string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Task Status
// ============================================================================

/// Lifecycle status of a task as recorded in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,
    /// Currently being worked on
    InProgress,
    /// Finished
    Done,
    /// Cannot proceed
    Blocked,
}

/// Substring table for free-form `**Status:**` values, checked in order.
///
/// "pending" is tested before "done" so that e.g. "pending (was done)" stays
/// pending; anything that matches no row falls back to [`TaskStatus::Pending`].
const STATUS_TEXT_TABLE: &[(&str, TaskStatus)] = &[
    ("pending", TaskStatus::Pending),
    ("done", TaskStatus::Done),
    ("completed", TaskStatus::Done),
    ("in-progress", TaskStatus::InProgress),
    ("in progress", TaskStatus::InProgress),
    ("blocked", TaskStatus::Blocked),
];

impl TaskStatus {
    /// The lowercase form written back into the plan.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        }
    }

    /// Interpret the free text of a `**Status:**` field.
    ///
    /// Matching is a case-insensitive substring search over a fixed table.
    /// Unrecognized text maps to `Pending`.
    ///
    /// # Example
    ///
    /// ```
    /// use devloop::plan::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::from_status_text("Completed ✅"), TaskStatus::Done);
    /// assert_eq!(TaskStatus::from_status_text("In Progress"), TaskStatus::InProgress);
    /// assert_eq!(TaskStatus::from_status_text("???"), TaskStatus::Pending);
    /// ```
    #[must_use]
    pub fn from_status_text(text: &str) -> Self {
        let lowered = text.trim().to_lowercase();
        STATUS_TEXT_TABLE
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map_or(TaskStatus::Pending, |(_, status)| *status)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" | "in progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "done" | "completed" => Ok(TaskStatus::Done),
            "blocked" => Ok(TaskStatus::Blocked),
            other => Err(format!(
                "unknown status '{other}' (expected pending, in-progress, done or blocked)"
            )),
        }
    }
}

// ============================================================================
// Complexity
// ============================================================================

/// Relative size of a task. Informational only.
///
/// The default is the first variant, `Trivial`; callers that want a neutral
/// fallback use `Medium` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Complexity {
    #[default]
    Trivial,
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Trivial => "Trivial",
            Complexity::Simple => "Simple",
            Complexity::Medium => "Medium",
            Complexity::Complex => "Complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = String;

    /// Exact variant name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trivial" => Ok(Complexity::Trivial),
            "simple" => Ok(Complexity::Simple),
            "medium" => Ok(Complexity::Medium),
            "complex" => Ok(Complexity::Complex),
            other => Err(format!("unknown complexity '{other}'")),
        }
    }
}

// ============================================================================
// File References
// ============================================================================

/// How a task intends to touch a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileReferenceKind {
    Create,
    Modify,
    ReadOnlyReference,
}

impl FileReferenceKind {
    /// Classify the parenthesized kind text of a "Files in scope" entry.
    #[must_use]
    pub fn from_kind_text(text: &str) -> Self {
        let lowered = text.trim().to_lowercase();
        if lowered.contains("create") {
            FileReferenceKind::Create
        } else if lowered.contains("modify") {
            FileReferenceKind::Modify
        } else {
            FileReferenceKind::ReadOnlyReference
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FileReferenceKind::Create => "create",
            FileReferenceKind::Modify => "modify",
            FileReferenceKind::ReadOnlyReference => "read-only",
        }
    }
}

/// A file listed in a task's scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Path relative to the project root
    pub path: String,
    pub kind: FileReferenceKind,
}

impl FileReference {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: FileReferenceKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

// ============================================================================
// Task Definition
// ============================================================================

/// A task as described by the plan.
///
/// Tasks that only appear in a milestone checklist carry empty description,
/// steps, acceptance criteria and files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub complexity: Complexity,
    pub depends_on: Vec<TaskId>,
    pub description: String,
    pub steps: Vec<String>,
    pub acceptance_criteria: Vec<String>,
    pub files_in_scope: Vec<FileReference>,
}

impl TaskDefinition {
    /// A task known only from its checklist line.
    #[must_use]
    pub fn placeholder(
        id: TaskId,
        name: impl Into<String>,
        status: TaskStatus,
        complexity: Complexity,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            complexity,
            depends_on: Vec::new(),
            description: String::new(),
            steps: Vec::new(),
            acceptance_criteria: Vec::new(),
            files_in_scope: Vec::new(),
        }
    }
}

// ============================================================================
// Milestone & Plan
// ============================================================================

/// A numbered group of tasks, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u32,
    pub name: String,
    pub tasks: Vec<TaskDefinition>,
}

/// The parsed planning document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,
    pub milestones: Vec<Milestone>,
}

impl Plan {
    /// All tasks across milestones, in document order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.milestones.iter().flat_map(|m| m.tasks.iter())
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks().count()
    }

    /// Id to task lookup. Later occurrences of a duplicate id win.
    #[must_use]
    pub fn task_index(&self) -> HashMap<&TaskId, &TaskDefinition> {
        let mut index = HashMap::new();
        for task in self.tasks() {
            if index.insert(&task.id, task).is_some() {
                tracing::warn!(task = %task.id, "Duplicate task id in plan, keeping last occurrence");
            }
        }
        index
    }

    /// Find a task by exact id, last occurrence winning.
    #[must_use]
    pub fn find_task(&self, id: &TaskId) -> Option<&TaskDefinition> {
        self.tasks().filter(|t| &t.id == id).last()
    }
}

// ============================================================================
// Tests
// ============================================================================
