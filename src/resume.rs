//! Resume-point detection for interrupted runs.
//!
//! A run leaves artifacts in the context directory as it advances:
//!
//! ```text
//! step 2 ──> current-task.md
//! step 3 ──> implementation-notes.md
//! step 5 ──> review.md
//! ```
//!
//! Each artifact proves the step that writes it has finished, so a resumed run
//! continues right after the most advanced artifact present. File presence is
//! authoritative; the status recorded in the plan is only context.

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::Result;
use crate::plan::{TaskId, TaskStatus};

/// Written when a task is picked.
pub const CURRENT_TASK_FILE: &str = "current-task.md";

/// Written when implementation finishes.
pub const IMPLEMENTATION_NOTES_FILE: &str = "implementation-notes.md";

/// Written when review finishes.
pub const REVIEW_FILE: &str = "review.md";

/// Step that implements the selected task.
pub const IMPLEMENTATION_STEP: u32 = 3;

/// Step that reviews the implementation.
pub const REVIEW_STEP: u32 = 4;

/// Step that commits the reviewed work.
pub const COMMIT_STEP: u32 = 6;

/// Why a run cannot be resumed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResumeError {
    /// There is no current-task artifact
    #[error("No task in progress")]
    NoTaskInProgress,

    /// The current-task artifact has no `## TASK-NNN:` heading
    #[error("Could not find a TASK-NNN header in {CURRENT_TASK_FILE}")]
    TaskHeaderNotFound,
}

/// Where to pick up an interrupted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeState {
    /// One-based step to continue from
    pub next_step: u32,
    pub task_id: TaskId,
}

/// Which resume artifacts exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextArtifacts {
    pub current_task: bool,
    pub implementation_notes: bool,
    pub review: bool,
}

impl ContextArtifacts {
    /// Check the context directory for the three artifact files.
    #[must_use]
    pub fn probe(context_dir: &Path) -> Self {
        let artifacts = Self {
            current_task: context_dir.join(CURRENT_TASK_FILE).is_file(),
            implementation_notes: context_dir.join(IMPLEMENTATION_NOTES_FILE).is_file(),
            review: context_dir.join(REVIEW_FILE).is_file(),
        };
        debug!(dir = %context_dir.display(), ?artifacts, "Probed context artifacts");
        artifacts
    }

    #[must_use]
    pub fn current_task_path(context_dir: &Path) -> PathBuf {
        context_dir.join(CURRENT_TASK_FILE)
    }
}

/// Decide which step an interrupted run resumes at.
///
/// Evaluated in priority order:
///
/// 1. no current task: [`ResumeError::NoTaskInProgress`]
/// 2. review present: step 6, whether or not notes exist
/// 3. implementation notes present: step 4
/// 4. otherwise: step 3
///
/// `status_in_plan` never changes the outcome. A pending status next to an
/// existing current task just means the plan was not updated yet.
///
/// # Example
///
/// ```
/// use devloop::plan::{TaskId, TaskStatus};
/// use devloop::resume::determine_resume_point;
///
/// let state = determine_resume_point(true, true, false, TaskStatus::InProgress, TaskId::new("TASK-004"))
///     .unwrap();
/// assert_eq!(state.next_step, 4);
/// ```
pub fn determine_resume_point(
    current_task_exists: bool,
    implementation_notes_exists: bool,
    review_exists: bool,
    status_in_plan: TaskStatus,
    task_id: TaskId,
) -> std::result::Result<ResumeState, ResumeError> {
    if !current_task_exists {
        return Err(ResumeError::NoTaskInProgress);
    }

    let next_step = if review_exists {
        COMMIT_STEP
    } else if implementation_notes_exists {
        REVIEW_STEP
    } else {
        IMPLEMENTATION_STEP
    };

    debug!(
        task = %task_id,
        status = %status_in_plan,
        next_step,
        "Determined resume point"
    );

    Ok(ResumeState { next_step, task_id })
}

fn task_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^## (TASK-\d+):").expect("task header regex is valid"))
}

/// Pull the task id out of a current-task document.
///
/// Looks for the first line starting with `## TASK-NNN:`.
///
/// # Example
///
/// ```
/// use devloop::resume::extract_task_id;
///
/// let id = extract_task_id("# Current\n\n## TASK-012: Wire the CLI\n").unwrap();
/// assert_eq!(id.as_str(), "TASK-012");
/// assert!(extract_task_id("see ## TASK-012: inline").is_err());
/// ```
pub fn extract_task_id(content: &str) -> std::result::Result<TaskId, ResumeError> {
    task_header_re()
        .captures(content)
        .map(|caps| TaskId::new(&caps[1]))
        .ok_or(ResumeError::TaskHeaderNotFound)
}

/// Resume from the artifacts in `context_dir`.
///
/// Combines [`ContextArtifacts::probe`], [`extract_task_id`] on the
/// current-task file and [`determine_resume_point`].
///
/// # Errors
///
/// Resume errors are wrapped in [`crate::DevLoopError::Resume`]; reading the
/// current-task file can also fail with an I/O error.
pub fn resume_from_dir(context_dir: &Path, status_in_plan: Option<TaskStatus>) -> Result<ResumeState> {
    let artifacts = ContextArtifacts::probe(context_dir);
    if !artifacts.current_task {
        return Err(ResumeError::NoTaskInProgress.into());
    }

    let content = std::fs::read_to_string(ContextArtifacts::current_task_path(context_dir))?;
    let task_id = extract_task_id(&content)?;

    let state = determine_resume_point(
        artifacts.current_task,
        artifacts.implementation_notes,
        artifacts.review,
        status_in_plan.unwrap_or_default(),
        task_id,
    )?;

    info!(task = %state.task_id, step = state.next_step, "Resuming interrupted run");
    Ok(state)
}

// ============================================================================
// Tests
// ============================================================================
