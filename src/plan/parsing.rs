//! Plan parsing.
//!
//! Two independent passes run over the document:
//!
//! 1. Milestone checklists (`## Milestone N — Name` followed by
//!    `- [ ] TASK-001 · Simple · Title` lines) produce placeholder tasks.
//! 2. Detailed blocks (`## TASK-001: Title`) produce full task definitions.
//!
//! Placeholders are then replaced by the detailed block with the same id
//! (case-insensitive). Anything that does not match the expected shapes is
//! skipped rather than reported.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    Complexity, FileReference, FileReferenceKind, Milestone, Plan, TaskDefinition, TaskId,
    TaskStatus,
};

/// Title used when the document has no `# ` heading.
pub const DEFAULT_PLAN_TITLE: &str = "Implementation Plan";

/// Why a document could not be turned into a [`Plan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanParseError {
    /// The document is empty or whitespace only
    #[error("Plan content is empty")]
    EmptyInput,

    /// No `## TASK-NNN: Title` block exists anywhere in the document
    #[error("No task definitions found in the plan")]
    NoTaskDefinitions,
}

// ============================================================================
// Patterns
// ============================================================================

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("plan patterns are valid regexes"))
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?m)^#[ \t]+(.+)$")
}

fn milestone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?m)^##[ \t]+Milestone[ \t]+(\d+)[ \t]+—[ \t]*(.+)$")
}

fn level_two_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?m)^##[ \t]")
}

fn level_three_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?m)^###[ \t]")
}

fn checklist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?mi)^[ \t]*-[ \t]*\[( |x)\][ \t]*(TASK-\d+)[ \t]*·[ \t]*([^·\n]+?)[ \t]*·[ \t]*(.+)$",
    )
}

fn task_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?mi)^##[ \t]*(TASK-\d+):[ \t]*(.+)$")
}

fn status_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?mi)\*\*Status:\*\*[ \t]*(.+)$")
}

fn complexity_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?mi)\*\*Complexity:\*\*[ \t]*(.+)$")
}

fn depends_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?mi)\*\*Depends on:\*\*[ \t]*(.+)$")
}

fn step_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?m)^[ \t]*\d+\.[ \t]*(.+)$")
}

fn file_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"`?(?P<path>[^()`]+)`?\s*\((?P<kind>[^)]+)\)")
}

fn checkbox_bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"^\s*-\s*\[.\]\s*(.+)$")
}

fn plain_bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"^\s*-\s*(.+)$")
}

/// The three named sub-sections of a detailed block.
#[derive(Debug, Clone, Copy)]
enum Subsection {
    WhatToBuild,
    FilesInScope,
    ValidationCriteria,
}

impl Subsection {
    fn heading_re(self) -> &'static Regex {
        static WHAT: OnceLock<Regex> = OnceLock::new();
        static FILES: OnceLock<Regex> = OnceLock::new();
        static VALIDATION: OnceLock<Regex> = OnceLock::new();
        match self {
            Subsection::WhatToBuild => compiled(&WHAT, r"(?i)###[ \t]+What to build[ \t]*\n"),
            Subsection::FilesInScope => compiled(&FILES, r"(?i)###[ \t]+Files in scope[ \t]*\n"),
            Subsection::ValidationCriteria => {
                compiled(&VALIDATION, r"(?i)###[ \t]+Validation criteria[ \t]*\n")
            }
        }
    }

    /// Text between this sub-section's heading and the next `### ` heading.
    fn extract(self, block: &str) -> &str {
        let Some(heading) = self.heading_re().find(block) else {
            return "";
        };
        let after = &block[heading.end()..];
        let end = level_three_heading_re()
            .find(after)
            .map_or(after.len(), |next| next.start());
        after[..end].trim()
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a planning document into a [`Plan`].
///
/// # Errors
///
/// - [`PlanParseError::EmptyInput`] for empty or whitespace-only text
/// - [`PlanParseError::NoTaskDefinitions`] when no detailed task block exists,
///   even if milestone checklists list tasks
///
/// # Example
///
/// ```
/// use devloop::plan::{parse_plan, TaskStatus};
///
/// let doc = "# Demo\n\n## Milestone 1 — Setup\n\n- [ ] TASK-001 · Simple · Init\n\n\
///            ### TASK-001: Init\n\n**Status:** pending\n";
/// let plan = parse_plan(doc).unwrap();
/// assert_eq!(plan.title, "Demo");
/// assert_eq!(plan.milestones[0].tasks[0].status, TaskStatus::Pending);
/// ```
pub fn parse_plan(content: &str) -> Result<Plan, PlanParseError> {
    if content.trim().is_empty() {
        return Err(PlanParseError::EmptyInput);
    }

    let normalized = content.replace("\r\n", "\n");

    let title = extract_title(&normalized);
    let milestones = extract_milestones(&normalized);
    let detailed = extract_task_blocks(&normalized);

    if detailed.is_empty() {
        debug!(
            milestones = milestones.len(),
            "Plan has checklists but no detailed task blocks"
        );
        return Err(PlanParseError::NoTaskDefinitions);
    }

    let milestones = reconcile(milestones, &detailed);

    debug!(
        title = %title,
        milestones = milestones.len(),
        detailed_blocks = detailed.len(),
        "Parsed plan"
    );

    Ok(Plan { title, milestones })
}

fn extract_title(content: &str) -> String {
    title_re()
        .captures(content)
        .map_or_else(|| DEFAULT_PLAN_TITLE.to_string(), |caps| caps[1].trim().to_string())
}

// ============================================================================
// Milestone Checklists
// ============================================================================

fn extract_milestones(content: &str) -> Vec<Milestone> {
    milestone_re()
        .captures_iter(content)
        .filter_map(|caps| {
            let heading = caps.get(0)?;
            let number = match caps[1].parse::<u32>() {
                Ok(number) => number,
                Err(e) => {
                    warn!("Skipping milestone with unusable number '{}': {}", &caps[1], e);
                    return None;
                }
            };

            let remainder = &content[heading.end()..];
            let section_end = level_two_heading_re()
                .find(remainder)
                .map_or(remainder.len(), |next| next.start());
            let section = &remainder[..section_end];

            let tasks: Vec<TaskDefinition> = checklist_re()
                .captures_iter(section)
                .map(|item| checklist_task(&item))
                .collect();

            debug!(milestone = number, tasks = tasks.len(), "Found milestone checklist");

            Some(Milestone {
                number,
                name: caps[2].trim().to_string(),
                tasks,
            })
        })
        .collect()
}

/// Build a placeholder from a checklist line.
///
/// An unrecognized complexity word falls back to `Complexity::default()`,
/// not to `Medium` as detailed blocks do.
fn checklist_task(caps: &Captures<'_>) -> TaskDefinition {
    let status = if caps[1].eq_ignore_ascii_case("x") {
        TaskStatus::Done
    } else {
        TaskStatus::Pending
    };

    let word = caps[3].trim();
    let complexity = word.parse::<Complexity>().unwrap_or_else(|_| {
        warn!(
            task = &caps[2],
            complexity = word,
            "Unknown checklist complexity, using default"
        );
        Complexity::default()
    });

    TaskDefinition::placeholder(TaskId::new(caps[2].trim()), caps[4].trim(), status, complexity)
}

// ============================================================================
// Detailed Task Blocks
// ============================================================================

/// Detailed blocks keyed by lowercased id. A repeated id keeps the later block.
fn extract_task_blocks(content: &str) -> HashMap<String, TaskDefinition> {
    let headings: Vec<Captures<'_>> = task_block_re().captures_iter(content).collect();
    let mut detailed = HashMap::new();

    for (i, caps) in headings.iter().enumerate() {
        let Some(heading) = caps.get(0) else {
            continue;
        };
        let block_end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(content.len(), |next| next.start());
        let body = content[heading.end()..block_end].trim();

        let id = TaskId::new(caps[1].trim());
        let task = parse_task_block(id, caps[2].trim(), body);

        if let Some(previous) = detailed.insert(task.id.as_str().to_lowercase(), task) {
            warn!(task = %previous.id, "Task block defined more than once, keeping the last");
        }
    }

    detailed
}

fn field_value<'a>(re: &Regex, body: &'a str) -> Option<&'a str> {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

fn parse_task_block(id: TaskId, name: &str, body: &str) -> TaskDefinition {
    let status = field_value(status_field_re(), body)
        .map_or(TaskStatus::Pending, TaskStatus::from_status_text);

    let complexity = match field_value(complexity_field_re(), body) {
        Some(value) => value.parse::<Complexity>().unwrap_or_else(|_| {
            warn!(task = %id, complexity = value, "Unknown block complexity, using Medium");
            Complexity::Medium
        }),
        None => Complexity::Medium,
    };

    let depends_on = field_value(depends_field_re(), body)
        .map(parse_dependencies)
        .unwrap_or_default();

    let what_to_build = Subsection::WhatToBuild.extract(body);
    let (description, steps) = parse_what_to_build(what_to_build);
    let files_in_scope = parse_files_in_scope(Subsection::FilesInScope.extract(body));
    let acceptance_criteria =
        parse_validation_criteria(Subsection::ValidationCriteria.extract(body));

    TaskDefinition {
        id,
        name: name.to_string(),
        status,
        complexity,
        depends_on,
        description,
        steps,
        acceptance_criteria,
        files_in_scope,
    }
}

/// Comma-separated ids; a bare em-dash or hyphen means none.
fn parse_dependencies(value: &str) -> Vec<TaskId> {
    let value = value.trim();
    if value.is_empty() || value == "—" || value == "-" {
        return Vec::new();
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(TaskId::new)
        .collect()
}

fn parse_what_to_build(section: &str) -> (String, Vec<String>) {
    if section.is_empty() {
        return (String::new(), Vec::new());
    }
    let description = section.replace('\n', " ").trim().to_string();
    let steps = step_re()
        .captures_iter(section)
        .map(|caps| caps[1].trim().to_string())
        .collect();
    (description, steps)
}

fn parse_files_in_scope(section: &str) -> Vec<FileReference> {
    section
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| file_reference_re().captures(line))
        .map(|caps| {
            FileReference::new(
                caps["path"].trim(),
                FileReferenceKind::from_kind_text(&caps["kind"]),
            )
        })
        .collect()
}

fn parse_validation_criteria(section: &str) -> Vec<String> {
    section
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            checkbox_bullet_re()
                .captures(line)
                .or_else(|| plain_bullet_re().captures(line))
        })
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

// ============================================================================
// Reconciliation
// ============================================================================

fn reconcile(
    milestones: Vec<Milestone>,
    detailed: &HashMap<String, TaskDefinition>,
) -> Vec<Milestone> {
    milestones
        .into_iter()
        .map(|milestone| {
            let tasks = milestone
                .tasks
                .into_iter()
                .map(|placeholder| {
                    match detailed.get(&placeholder.id.as_str().to_lowercase()) {
                        Some(task) => task.clone(),
                        None => {
                            debug!(task = %placeholder.id, "No detailed block, keeping checklist entry");
                            placeholder
                        }
                    }
                })
                .collect();
            Milestone { tasks, ..milestone }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PLAN: &str = r#"# Implementation Plan

## Milestone 3 — Plan Parsing & Task Management

- [ ] TASK-007 · Medium · Implement the plan parser
- [ ] TASK-008 · Simple · Implement the task selector

## TASK-007: Implement the plan parser

**Milestone:** 3 — Plan Parsing & Task Management
**Status:** pending
**Complexity:** Medium
**Depends on:** TASK-002

### What to build
A pure function that parses an implementation plan.
Extract milestones and task blocks.

### Files in scope
- `src/plan/parsing.rs` (create)
- `tests/plan_parsing.rs` (create)

### Validation criteria
- [ ] Parses a well-formed plan with multiple milestones and tasks
- [ ] Extracts task ID, title, status, complexity, dependencies correctly
"#;

    fn single_task_plan(fields: &str, sections: &str) -> String {
        format!(
            "# Plan\n\n## Milestone 1 — Test\n\n- [ ] TASK-001 · Simple · Test task\n\n\
             ## TASK-001: Test task\n\n{fields}\n\n### What to build\nTest description.\n\n{sections}"
        )
    }

    fn only_task(plan: &Plan) -> &TaskDefinition {
        &plan.milestones[0].tasks[0]
    }

    // ========================================================================
    // Failure Modes
    // ========================================================================

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_plan(""), Err(PlanParseError::EmptyInput));
    }

    #[test]
    fn test_parse_whitespace_only_input() {
        assert_eq!(parse_plan("  \n\t\r\n  "), Err(PlanParseError::EmptyInput));
    }

    #[test]
    fn test_parse_checklist_without_blocks_is_rejected() {
        let doc = "# Title\n\n## Milestone 1 — X\n\n- [ ] TASK-999 · Simple · Placeholder";
        assert_eq!(parse_plan(doc), Err(PlanParseError::NoTaskDefinitions));
    }

    #[test]
    fn test_parse_prose_only_is_rejected() {
        let doc = "# Notes\n\nNothing to do here.\n\n### TASK-001: not a level two heading\n";
        assert_eq!(parse_plan(doc), Err(PlanParseError::NoTaskDefinitions));
    }

    // ========================================================================
    // Well-formed Plans
    // ========================================================================

    #[test]
    fn test_parse_sample_plan() {
        let plan = parse_plan(SAMPLE_PLAN).unwrap();

        assert_eq!(plan.title, "Implementation Plan");
        assert_eq!(plan.milestones.len(), 1);

        let milestone = &plan.milestones[0];
        assert_eq!(milestone.number, 3);
        assert_eq!(milestone.name, "Plan Parsing & Task Management");
        assert_eq!(milestone.tasks.len(), 2);

        let task = &milestone.tasks[0];
        assert_eq!(task.id.as_str(), "TASK-007");
        assert_eq!(task.name, "Implement the plan parser");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.complexity, Complexity::Medium);
        assert_eq!(task.depends_on, vec![TaskId::new("TASK-002")]);
        assert_eq!(
            task.files_in_scope,
            vec![
                FileReference::new("src/plan/parsing.rs", FileReferenceKind::Create),
                FileReference::new("tests/plan_parsing.rs", FileReferenceKind::Create),
            ]
        );
        assert_eq!(task.acceptance_criteria.len(), 2);
    }

    #[test]
    fn test_parse_checklist_task_without_block_keeps_placeholder() {
        let plan = parse_plan(SAMPLE_PLAN).unwrap();

        let defined = &plan.milestones[0].tasks[0];
        assert!(!defined.description.is_empty());

        let undefined = &plan.milestones[0].tasks[1];
        assert_eq!(undefined.id.as_str(), "TASK-008");
        assert_eq!(undefined.name, "Implement the task selector");
        assert_eq!(undefined.complexity, Complexity::Simple);
        assert!(undefined.description.is_empty());
        assert!(undefined.steps.is_empty());
        assert!(undefined.acceptance_criteria.is_empty());
        assert!(undefined.files_in_scope.is_empty());
    }

    #[test]
    fn test_parse_default_title() {
        let doc = "## TASK-001: Lonely task\n\n**Status:** done\n";
        let plan = parse_plan(doc).unwrap();
        assert_eq!(plan.title, DEFAULT_PLAN_TITLE);
        assert!(plan.milestones.is_empty());
    }

    #[test]
    fn test_parse_title_is_first_top_level_heading() {
        let doc = "Preamble\n\n## Milestone 1 — A\n\n# Real Title\n\n# Second\n\n## TASK-001: T\n";
        let plan = parse_plan(doc).unwrap();
        assert_eq!(plan.title, "Real Title");
    }

    #[test]
    fn test_parse_crlf_document() {
        let plan = parse_plan(&SAMPLE_PLAN.replace('\n', "\r\n")).unwrap();
        let task = &plan.milestones[0].tasks[0];
        assert_eq!(task.name, "Implement the plan parser");
        assert_eq!(task.files_in_scope.len(), 2);
        assert!(!task.description.contains('\r'));
    }

    // ========================================================================
    // Milestones
    // ========================================================================

    #[test]
    fn test_milestone_section_stops_at_next_heading() {
        let doc = r#"# Plan

## Milestone 1 — First

- [x] TASK-001 · Simple · One

## Notes

- [ ] TASK-002 · Simple · Not in a milestone

## Milestone 2 — Second

- [ ] TASK-003 · Complex · Three

## TASK-001: One
**Status:** done
"#;
        let plan = parse_plan(doc).unwrap();
        assert_eq!(plan.milestones.len(), 2);
        assert_eq!(plan.milestones[0].tasks.len(), 1);
        assert_eq!(plan.milestones[0].tasks[0].status, TaskStatus::Done);
        assert_eq!(plan.milestones[1].number, 2);
        assert_eq!(plan.milestones[1].tasks.len(), 1);
        assert_eq!(plan.milestones[1].tasks[0].id.as_str(), "TASK-003");
        assert_eq!(plan.milestones[1].tasks[0].complexity, Complexity::Complex);
    }

    #[test]
    fn test_milestone_requires_em_dash() {
        let doc = "## Milestone 1 - Hyphen\n\n- [ ] TASK-001 · Simple · One\n\n## TASK-001: One\n";
        let plan = parse_plan(doc).unwrap();
        assert!(plan.milestones.is_empty());
    }

    #[test]
    fn test_checklist_unknown_complexity_falls_back_to_zero_value() {
        let doc = "## Milestone 1 — A\n\n- [ ] TASK-002 · Huge · Two\n\n## TASK-001: One\n";
        let plan = parse_plan(doc).unwrap();
        assert_eq!(plan.milestones[0].tasks[0].complexity, Complexity::Trivial);
    }

    #[test]
    fn test_checklist_uppercase_checkbox_is_done() {
        let doc = "## Milestone 1 — A\n\n- [X] TASK-002 · Simple · Two\n\n## TASK-001: One\n";
        let plan = parse_plan(doc).unwrap();
        assert_eq!(plan.milestones[0].tasks[0].status, TaskStatus::Done);
    }

    #[test]
    fn test_checklist_requires_middle_dot_separators() {
        let doc = "## Milestone 1 — A\n\n- [ ] TASK-002 | Simple | Two\n\n## TASK-001: One\n";
        let plan = parse_plan(doc).unwrap();
        assert!(plan.milestones[0].tasks.is_empty());
    }

    #[test]
    fn test_reconciliation_is_case_insensitive() {
        let doc = r#"## Milestone 1 — A

- [ ] task-001 · Simple · Lowercase in checklist

## TASK-001: Uppercase block
**Status:** in progress

### What to build
Details.
"#;
        let plan = parse_plan(doc).unwrap();
        let task = only_task(&plan);
        assert_eq!(task.id.as_str(), "TASK-001");
        assert_eq!(task.name, "Uppercase block");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.description, "Details.");
    }

    #[test]
    fn test_block_status_overrides_checklist_checkbox() {
        let doc = r#"## Milestone 1 — A

- [x] TASK-001 · Simple · One

## TASK-001: One
**Status:** blocked
"#;
        let plan = parse_plan(doc).unwrap();
        assert_eq!(only_task(&plan).status, TaskStatus::Blocked);
    }

    // ========================================================================
    // Detailed Block Fields
    // ========================================================================

    #[test]
    fn test_block_status_variants() {
        for (text, expected) in [
            ("pending", TaskStatus::Pending),
            ("Done", TaskStatus::Done),
            ("completed", TaskStatus::Done),
            ("in-progress", TaskStatus::InProgress),
            ("In Progress", TaskStatus::InProgress),
            ("blocked", TaskStatus::Blocked),
            ("unknown words", TaskStatus::Pending),
        ] {
            let doc = single_task_plan(&format!("**Status:** {text}"), "");
            let plan = parse_plan(&doc).unwrap();
            assert_eq!(only_task(&plan).status, expected, "status text: {text}");
        }
    }

    #[test]
    fn test_block_missing_status_defaults_to_pending() {
        let doc = single_task_plan("**Complexity:** Simple", "");
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(only_task(&plan).status, TaskStatus::Pending);
    }

    #[test]
    fn test_block_complexity_defaults_to_medium() {
        let doc = single_task_plan("**Complexity:** Enormous", "");
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(only_task(&plan).complexity, Complexity::Medium);

        let doc = single_task_plan("**Status:** pending", "");
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(only_task(&plan).complexity, Complexity::Medium);
    }

    #[test]
    fn test_unknown_complexity_words_warn() {
        let doc = "## Milestone 1 — A\n\n- [ ] TASK-001 · Huge · One\n\n\
                   ## TASK-001: One\n**Complexity:** Enormous\n";
        let logs = crate::testing::capture_warnings(|| {
            parse_plan(doc).unwrap();
        });
        assert!(logs.contains("Unknown checklist complexity"), "{logs}");
        assert!(logs.contains("Huge"), "{logs}");
        assert!(logs.contains("Unknown block complexity"), "{logs}");
        assert!(logs.contains("Enormous"), "{logs}");

        let quiet = crate::testing::capture_warnings(|| {
            parse_plan(&single_task_plan("**Complexity:** Simple", "")).unwrap();
        });
        assert!(quiet.is_empty(), "{quiet}");
    }

    #[test]
    fn test_status_value_must_be_on_the_label_line() {
        let doc = single_task_plan("**Status:**\ndone", "");
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(only_task(&plan).status, TaskStatus::Pending);

        let doc = single_task_plan("**Complexity:**\nComplex", "");
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(only_task(&plan).complexity, Complexity::Medium);
    }

    #[test]
    fn test_block_complexity_case_insensitive() {
        let doc = single_task_plan("**Complexity:** complex", "");
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(only_task(&plan).complexity, Complexity::Complex);
    }

    #[test]
    fn test_block_multiple_dependencies() {
        let doc = single_task_plan("**Depends on:** TASK-002, TASK-003,TASK-004", "");
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(
            only_task(&plan).depends_on,
            vec![
                TaskId::new("TASK-002"),
                TaskId::new("TASK-003"),
                TaskId::new("TASK-004")
            ]
        );
    }

    #[test]
    fn test_block_no_dependencies_with_em_dash_or_hyphen() {
        for marker in ["—", "-"] {
            let doc = single_task_plan(&format!("**Depends on:** {marker}"), "");
            let plan = parse_plan(&doc).unwrap();
            assert!(only_task(&plan).depends_on.is_empty(), "marker {marker}");
        }
    }

    #[test]
    fn test_block_description_and_steps() {
        let doc = r#"## Milestone 1 — A

- [ ] TASK-001 · Simple · One

## TASK-001: One

### What to build
Build the thing:
1. First step
2. Second step

### Files in scope
- `src/lib.rs` (modify)
"#;
        let plan = parse_plan(doc).unwrap();
        let task = only_task(&plan);
        assert_eq!(
            task.description,
            "Build the thing: 1. First step 2. Second step"
        );
        assert_eq!(task.steps, vec!["First step", "Second step"]);
    }

    #[test]
    fn test_block_file_reference_kinds() {
        let doc = single_task_plan(
            "**Status:** pending",
            "### Files in scope\n- `src/new.rs` (create)\n- `src/old.rs` (modify)\n- `docs/README.md` (read-only reference)\nno match here\n",
        );
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(
            only_task(&plan).files_in_scope,
            vec![
                FileReference::new("src/new.rs", FileReferenceKind::Create),
                FileReference::new("src/old.rs", FileReferenceKind::Modify),
                FileReference::new("docs/README.md", FileReferenceKind::ReadOnlyReference),
            ]
        );
    }

    #[test]
    fn test_block_validation_criteria_checkbox_bullets() {
        let doc = single_task_plan(
            "**Status:** pending",
            "### Validation criteria\n- [x] First criterion\n- [ ] Second criterion\n",
        );
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(
            only_task(&plan).acceptance_criteria,
            vec!["First criterion", "Second criterion"]
        );
    }

    #[test]
    fn test_block_validation_criteria_plain_bullets() {
        let doc = single_task_plan(
            "**Status:** pending",
            "### Validation criteria\n- First criterion\n\n- Second criterion\nprose line\n",
        );
        let plan = parse_plan(&doc).unwrap();
        assert_eq!(
            only_task(&plan).acceptance_criteria,
            vec!["First criterion", "Second criterion"]
        );
    }

    #[test]
    fn test_block_runs_until_next_task_heading() {
        let doc = r#"## Milestone 1 — A

- [ ] TASK-001 · Simple · One
- [ ] TASK-002 · Simple · Two

## TASK-001: One

### What to build
Only one.

## TASK-002: Two
**Status:** done
"#;
        let plan = parse_plan(doc).unwrap();
        let tasks = &plan.milestones[0].tasks;
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[0].description, "Only one.");
        assert_eq!(tasks[1].status, TaskStatus::Done);
        assert!(tasks[1].description.is_empty());
    }

    #[test]
    fn test_duplicate_blocks_keep_last() {
        let doc = r#"## Milestone 1 — A

- [ ] TASK-001 · Simple · One

## TASK-001: First copy
**Status:** pending

## TASK-001: Second copy
**Status:** done
"#;
        let plan = parse_plan(doc).unwrap();
        let task = only_task(&plan);
        assert_eq!(task.name, "Second copy");
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn test_parse_dependencies_helper() {
        assert!(parse_dependencies("").is_empty());
        assert!(parse_dependencies(" — ").is_empty());
        assert_eq!(
            parse_dependencies("TASK-1, ,TASK-2"),
            vec![TaskId::new("TASK-1"), TaskId::new("TASK-2")]
        );
    }
}
