//! In-place status edits on the raw plan text.
//!
//! Only two kinds of line are ever rewritten for a task:
//!
//! - its checklist line (`- [ ] TASK-001 ...` / `- [x] TASK-001 ...`), where
//!   only the leading five-character checkbox token changes
//! - the first `**Status:**` line inside its `## TASK-001:` block
//!
//! Every other byte is left alone.

use tracing::debug;

use super::{TaskId, TaskStatus};

const CHECKED: &str = "- [x]";
const UNCHECKED: &str = "- [ ]";
const STATUS_LABEL: &str = "**Status:**";

/// Return `content` with the checklist checkbox and block status of `task_id`
/// set to `new_status`.
///
/// The checkbox becomes `- [x]` for [`TaskStatus::Done`] and `- [ ]` for
/// anything else. If the text contains any CRLF pair, rewritten documents use
/// CRLF for every line break; otherwise LF. When nothing matches the id the
/// input is returned unchanged.
///
/// # Example
///
/// ```
/// use devloop::plan::{update_task_status, TaskId, TaskStatus};
///
/// let doc = "- [ ] TASK-001 · Simple · A\n\n## TASK-001: A\n**Status:** pending\n";
/// let updated = update_task_status(doc, &TaskId::new("TASK-001"), TaskStatus::Done);
/// assert_eq!(updated, "- [x] TASK-001 · Simple · A\n\n## TASK-001: A\n**Status:** done\n");
/// ```
#[must_use]
pub fn update_task_status(content: &str, task_id: &TaskId, new_status: TaskStatus) -> String {
    let separator = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let heading_prefix = format!("## {}:", task_id);
    let checkbox = if new_status == TaskStatus::Done {
        CHECKED
    } else {
        UNCHECKED
    };
    let status_line = format!("{STATUS_LABEL} {}", new_status.as_str());

    let mut lines: Vec<String> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();

    let mut touched = false;
    let mut in_task_block = false;
    let mut status_updated = false;

    for line in &mut lines {
        if is_checkbox_line(line, task_id) {
            *line = format!("{checkbox}{}", &line[CHECKED.len()..]);
            touched = true;
        } else if line.starts_with("## ") {
            in_task_block = line.starts_with(&heading_prefix);
            status_updated = false;
            touched |= in_task_block;
        } else if in_task_block && !status_updated && line.starts_with(STATUS_LABEL) {
            *line = status_line.clone();
            status_updated = true;
        }
    }

    if !touched {
        debug!(task = %task_id, "Task not present in plan, leaving text unchanged");
        return content.to_string();
    }

    debug!(task = %task_id, status = %new_status, "Updated task status in plan text");
    lines.join(separator)
}

/// Whether `content` has a checklist line or a `## <id>:` block for `task_id`,
/// i.e. whether [`update_task_status`] has anything to rewrite.
#[must_use]
pub fn mentions_task(content: &str, task_id: &TaskId) -> bool {
    let heading_prefix = format!("## {}:", task_id);
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .any(|line| is_checkbox_line(line, task_id) || line.starts_with(&heading_prefix))
}

/// `- [ ] <id>` or `- [x] <id>` followed by a space or end of line.
fn is_checkbox_line(line: &str, task_id: &TaskId) -> bool {
    [UNCHECKED, CHECKED].iter().any(|mark| {
        line.strip_prefix(mark)
            .and_then(|rest| rest.strip_prefix(' '))
            .and_then(|rest| rest.strip_prefix(task_id.as_str()))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
    })
}

// ============================================================================
// Tests
// ============================================================================
