//! Test fixtures for creating reproducible project directories.
//!
//! Provides pre-built plans and context artifacts for consistent testing.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::resume::{CURRENT_TASK_FILE, IMPLEMENTATION_NOTES_FILE, REVIEW_FILE};

/// Project-relative plan location under the default config.
pub const PLAN_RELATIVE_PATH: &str = "docs/implementation-plan.md";

/// Project-relative context directory under the default config.
pub const CONTEXT_RELATIVE_DIR: &str = "context";

/// Three tasks over two milestones. TASK-001 is done, so TASK-002 is next.
pub const SAMPLE_PLAN: &str = r#"# Sample Plan

## Milestone 1 — Foundations

- [x] TASK-001 · Simple · Set up the workspace
- [ ] TASK-002 · Medium · Parse the plan

## Milestone 2 — Loop

- [ ] TASK-003 · Complex · Drive the loop

## TASK-001: Set up the workspace

**Status:** done
**Complexity:** Simple
**Depends on:** —

### What to build
Create the crate skeleton.

### Files in scope
- `Cargo.toml` (create)

### Validation criteria
- [x] The workspace builds

## TASK-002: Parse the plan

**Status:** pending
**Complexity:** Medium
**Depends on:** TASK-001

### What to build
Turn the markdown plan into typed milestones and tasks.

### Files in scope
- `src/plan/parsing.rs` (create)
- `src/plan/mod.rs` (modify)

### Validation criteria
- [ ] Parses every task block

## TASK-003: Drive the loop

**Status:** pending
**Complexity:** Complex
**Depends on:** TASK-001, TASK-002

### What to build
Run the select, implement, review and commit steps.

### Files in scope
- `src/main.rs` (modify)
- `docs/architecture.md` (read-only)

### Validation criteria
- [ ] Resumes after an interruption
"#;

/// A test fixture representing a temporary project directory.
///
/// Automatically cleans up when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::with_sample_plan();
/// assert!(fixture.has_plan());
/// // Directory is cleaned up when fixture goes out of scope
/// ```
pub struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    /// Create an empty project directory.
    ///
    /// # Panics
    ///
    /// Panics if temporary directory creation fails.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project whose plan file holds `content`.
    ///
    /// # Panics
    ///
    /// Panics if the plan cannot be written.
    #[must_use]
    pub fn with_plan(content: &str) -> Self {
        let fixture = Self::empty();
        fixture
            .write_file(PLAN_RELATIVE_PATH, content)
            .expect("Failed to write plan");
        fixture
    }

    /// Create a project with [`SAMPLE_PLAN`] at the default plan path.
    #[must_use]
    pub fn with_sample_plan() -> Self {
        Self::with_plan(SAMPLE_PLAN)
    }

    /// Create a sample project interrupted while working on `task_id`.
    ///
    /// `current-task.md` is always written; the notes and review artifacts
    /// only when asked for.
    ///
    /// # Panics
    ///
    /// Panics if file creation fails.
    #[must_use]
    pub fn with_context_artifacts(task_id: &str, notes: bool, review: bool) -> Self {
        let fixture = Self::with_sample_plan();

        fixture
            .write_context_file(
                CURRENT_TASK_FILE,
                &format!("# Current Task\n\n## {task_id}: Work in progress\n\nDetails.\n"),
            )
            .expect("Failed to write current task");

        if notes {
            fixture
                .write_context_file(IMPLEMENTATION_NOTES_FILE, "# Notes\n\nImplemented.\n")
                .expect("Failed to write implementation notes");
        }

        if review {
            fixture
                .write_context_file(REVIEW_FILE, "APPROVED\n")
                .expect("Failed to write review");
        }

        fixture
    }

    /// Get the path to the fixture directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path as a PathBuf (owned).
    #[must_use]
    pub fn path_buf(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Default plan file location.
    #[must_use]
    pub fn plan_path(&self) -> PathBuf {
        self.temp_dir.path().join(PLAN_RELATIVE_PATH)
    }

    /// Default context directory.
    #[must_use]
    pub fn context_dir(&self) -> PathBuf {
        self.temp_dir.path().join(CONTEXT_RELATIVE_DIR)
    }

    #[must_use]
    pub fn has_plan(&self) -> bool {
        self.plan_path().exists()
    }

    /// Write a file to the fixture directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_file(&self, relative_path: &str, content: &str) -> std::io::Result<()> {
        let path = self.temp_dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    /// Write a file into the context directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_context_file(&self, name: &str, content: &str) -> std::io::Result<()> {
        self.write_file(&format!("{CONTEXT_RELATIVE_DIR}/{name}"), content)
    }

    /// Read a file from the fixture directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, relative_path: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.temp_dir.path().join(relative_path))
    }

    /// Current plan text.
    ///
    /// # Panics
    ///
    /// Panics if the plan cannot be read.
    #[must_use]
    pub fn read_plan(&self) -> String {
        self.read_file(PLAN_RELATIVE_PATH).expect("Failed to read plan")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_plan() {
        let fixture = TestFixture::empty();
        assert!(fixture.path().exists());
        assert!(!fixture.has_plan());
    }

    #[test]
    fn test_with_sample_plan_writes_plan() {
        let fixture = TestFixture::with_sample_plan();
        assert!(fixture.has_plan());
        assert_eq!(fixture.read_plan(), SAMPLE_PLAN);
    }

    #[test]
    fn test_with_context_artifacts() {
        let fixture = TestFixture::with_context_artifacts("TASK-002", false, true);
        let context = fixture.context_dir();
        assert!(context.join(CURRENT_TASK_FILE).exists());
        assert!(!context.join(IMPLEMENTATION_NOTES_FILE).exists());
        assert!(context.join(REVIEW_FILE).exists());
        assert!(fixture
            .read_file("context/current-task.md")
            .unwrap()
            .contains("## TASK-002:"));
    }

    #[test]
    fn test_write_file_creates_directories() {
        let fixture = TestFixture::empty();
        fixture.write_file("a/b/c.md", "nested").unwrap();
        assert_eq!(fixture.read_file("a/b/c.md").unwrap(), "nested");
    }

    #[test]
    fn test_path_methods() {
        let fixture = TestFixture::empty();
        assert_eq!(fixture.path(), fixture.path_buf().as_path());
        assert_eq!(fixture.plan_path(), fixture.path().join(PLAN_RELATIVE_PATH));
    }
}

// ============================================================================
// Log Capture
// ============================================================================

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return the `WARN`-and-above
/// lines it emitted.
pub fn capture_warnings(f: impl FnOnce()) -> String {
    let buffer = SharedBuffer::default();
    let sink = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().map(|b| b.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
