//! Plan file persistence with atomic writes.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use super::{
    mentions_task, parse_plan, update_task_status, Plan, SelectionError, TaskId, TaskStatus,
};
use crate::error::{DevLoopError, Result};

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Lock file suffix for concurrent access prevention.
const LOCK_SUFFIX: &str = ".lock";

/// Reads and writes the planning document on disk.
///
/// Writes go to a sibling temporary file that is synced and renamed over the
/// target while an exclusive lock is held on a sibling `.lock` file.
#[derive(Debug, Clone)]
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the plan file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    #[must_use]
    pub fn tmp_file_path(&self) -> PathBuf {
        self.sibling(TMP_SUFFIX)
    }

    #[must_use]
    pub fn lock_file_path(&self) -> PathBuf {
        self.sibling(LOCK_SUFFIX)
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the raw plan text.
    ///
    /// # Errors
    ///
    /// [`DevLoopError::MissingFile`] when the file does not exist, or an I/O error.
    pub fn load(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DevLoopError::MissingFile {
                path: self.path.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and parse the plan.
    pub fn load_plan(&self) -> Result<Plan> {
        let content = self.load()?;
        Ok(parse_plan(&content)?)
    }

    /// Replace the plan text atomically.
    pub fn save(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let lock_path = self.lock_file_path();
        let lock_file = File::create(&lock_path)?;
        FileExt::lock_exclusive(&lock_file).map_err(|e| DevLoopError::Lock {
            path: lock_path.clone(),
            message: e.to_string(),
        })?;

        let tmp_path = self.tmp_file_path();
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;

        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), bytes = content.len(), "Saved plan");

        Ok(())
    }

    /// Set a task's status in the plan file.
    ///
    /// Returns `true` when the file changed, `false` when the task already had
    /// that status. A task with only a `## <id>:` block and no checklist line
    /// is still updated.
    ///
    /// # Errors
    ///
    /// [`SelectionError::TaskNotFound`] when the text has neither a checklist
    /// line nor a block for `task_id`, plus the errors of [`PlanStore::load`]
    /// and [`PlanStore::save`].
    pub fn update_status(&self, task_id: &TaskId, status: TaskStatus) -> Result<bool> {
        let content = self.load()?;
        if !mentions_task(&content, task_id) {
            return Err(SelectionError::TaskNotFound(task_id.clone()).into());
        }
        let updated = update_task_status(&content, task_id, status);
        if updated == content {
            debug!(task = %task_id, "Plan unchanged by status update");
            return Ok(false);
        }
        self.save(&updated)?;
        Ok(true)
    }
}

// ============================================================================
// Tests
// ============================================================================
