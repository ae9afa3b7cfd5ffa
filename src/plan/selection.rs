//! Next-task selection over the plan's dependency graph.
//!
//! A dependency is satisfied only when its id resolves to a task in the plan
//! whose status is exactly [`TaskStatus::Done`]. Missing, blocked and
//! in-progress dependencies all count as unsatisfied.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Plan, TaskDefinition, TaskId, TaskStatus};

/// Why no task could be selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The requested id is not in the plan
    #[error("Task {0} not found in the plan")]
    TaskNotFound(TaskId),

    /// The requested task has dependencies that are missing or not done
    #[error("Task {id} has unmet dependencies: {}", join_ids(.unsatisfied))]
    DependenciesNotMet {
        id: TaskId,
        /// In the order they appear in the task's `Depends on` list
        unsatisfied: Vec<TaskId>,
    },

    /// The requested task is not pending
    #[error("Task {id} is not pending (status: {status})")]
    TaskNotPending { id: TaskId, status: TaskStatus },

    /// Auto-selection found nothing eligible
    #[error("No pending tasks with satisfied dependencies")]
    NoPendingTasks,
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

type TaskIndex<'a> = HashMap<&'a TaskId, &'a TaskDefinition>;

/// Select a task to work on.
///
/// With no id, milestones are walked in document order and, within each
/// milestone, tasks in ordinal id order; the first pending task whose
/// dependencies are all done wins. With an id, that task is validated and
/// returned.
///
/// # Errors
///
/// See [`SelectionError`].
///
/// # Example
///
/// ```
/// use devloop::plan::{parse_plan, select_task, SelectionError, TaskId};
///
/// let doc = "## Milestone 1 — M\n\
///            - [ ] TASK-002 · Simple · B\n\
///            - [ ] TASK-001 · Simple · A\n\
///            ### TASK-001: A\n**Depends on:** —\n\
///            ### TASK-002: B\n**Depends on:** TASK-001\n";
/// let plan = parse_plan(doc).unwrap();
///
/// assert_eq!(select_task(&plan, None).unwrap().id.as_str(), "TASK-001");
/// assert!(matches!(
///     select_task(&plan, Some(&TaskId::new("TASK-002"))),
///     Err(SelectionError::DependenciesNotMet { .. })
/// ));
/// ```
pub fn select_task(
    plan: &Plan,
    task_id: Option<&TaskId>,
) -> Result<TaskDefinition, SelectionError> {
    let index = plan.task_index();
    warn_dangling_dependencies(plan, &index);

    match task_id {
        None => auto_select(plan, &index),
        Some(id) => explicit_select(id, &index),
    }
}

fn auto_select(plan: &Plan, index: &TaskIndex<'_>) -> Result<TaskDefinition, SelectionError> {
    for milestone in &plan.milestones {
        let mut ordered: Vec<&TaskDefinition> = milestone.tasks.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some(task) = ordered
            .into_iter()
            .find(|task| task.status == TaskStatus::Pending && all_dependencies_done(task, index))
        {
            debug!(task = %task.id, milestone = milestone.number, "Auto-selected task");
            return Ok(task.clone());
        }
    }

    debug!("No eligible pending task in any milestone");
    Err(SelectionError::NoPendingTasks)
}

fn explicit_select(id: &TaskId, index: &TaskIndex<'_>) -> Result<TaskDefinition, SelectionError> {
    let task = index
        .get(id)
        .copied()
        .ok_or_else(|| SelectionError::TaskNotFound(id.clone()))?;

    if task.status != TaskStatus::Pending {
        return Err(SelectionError::TaskNotPending {
            id: task.id.clone(),
            status: task.status,
        });
    }

    let unsatisfied = unsatisfied_dependencies(task, index);
    if !unsatisfied.is_empty() {
        debug!(task = %task.id, unmet = unsatisfied.len(), "Explicit selection blocked by dependencies");
        return Err(SelectionError::DependenciesNotMet {
            id: task.id.clone(),
            unsatisfied,
        });
    }

    Ok(task.clone())
}

fn warn_dangling_dependencies(plan: &Plan, index: &TaskIndex<'_>) {
    for task in plan.tasks() {
        for dep in task.depends_on.iter().filter(|dep| !index.contains_key(dep)) {
            warn!(task = %task.id, dependency = %dep, "Dependency is not a task in the plan");
        }
    }
}

fn is_done(id: &TaskId, index: &TaskIndex<'_>) -> bool {
    index
        .get(id)
        .is_some_and(|dependency| dependency.status == TaskStatus::Done)
}

fn all_dependencies_done(task: &TaskDefinition, index: &TaskIndex<'_>) -> bool {
    task.depends_on.iter().all(|dep| is_done(dep, index))
}

fn unsatisfied_dependencies(task: &TaskDefinition, index: &TaskIndex<'_>) -> Vec<TaskId> {
    task.depends_on
        .iter()
        .filter(|dep| !is_done(dep, index))
        .cloned()
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
