//! devloop - plan-driven development loop core
//!
//! Reads a Markdown implementation plan, picks the next task whose
//! dependencies are done, works out where an interrupted run should resume,
//! and writes status changes back into the plan without disturbing the rest
//! of the document.
//!
//! # Architecture
//!
//! - [`plan`] - plan model, parser, task selector, status updater and file store
//! - [`resume`] - resume-point detection from context artifacts
//! - [`review`] - review document classification
//! - [`config`] - configuration loading and validation
//! - [`error`] - error types and exit codes
//! - [`testing`] - test fixtures (test builds only)
//!
//! # Example
//!
//! ```
//! use devloop::plan::{parse_plan, select_task, update_task_status, TaskStatus};
//!
//! let doc = "# Plan\n\n## Milestone 1 — Core\n\n- [ ] TASK-001 · Simple · Start\n\n\
//!            ### TASK-001: Start\n\n**Status:** pending\n";
//!
//! let plan = parse_plan(doc)?;
//! let task = select_task(&plan, None)?;
//! assert_eq!(task.id.as_str(), "TASK-001");
//!
//! let updated = update_task_status(doc, &task.id, TaskStatus::Done);
//! assert!(updated.contains("- [x] TASK-001"));
//! # Ok::<(), devloop::DevLoopError>(())
//! ```

pub mod config;
pub mod error;
pub mod plan;
pub mod resume;
pub mod review;
pub mod testing;

// Re-export commonly used types
pub use error::{DevLoopError, IntoConfigError, Result};

pub use config::{
    ConfigOverrides, ConfigValidator, PathsConfig, ProjectConfig, ValidationConfig,
    ValidationReport,
};

pub use plan::{
    parse_plan, select_task, update_task_status, Complexity, FileReference, FileReferenceKind,
    Milestone, Plan, PlanParseError, PlanStore, SelectionError, TaskDefinition, TaskId,
    TaskStatus,
};

pub use resume::{
    determine_resume_point, extract_task_id, resume_from_dir, ContextArtifacts, ResumeError,
    ResumeState,
};

pub use review::{analyze_review, IssueClassification, ReviewIssue, ReviewResult};
