//! Review document analysis.
//!
//! A review is free-form markdown. It either opens with an approval line or
//! lists issues tagged `BLOCKING`, `NON-BLOCKING` or `NITPICK` anywhere on a
//! line. Only blocking issues send the task back to implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const APPROVED_MARKER: &str = "approved";
const NON_BLOCKING_MARKER: &str = "non-blocking";
const BLOCKING_MARKER: &str = "blocking";
const NITPICK_MARKER: &str = "nitpick";

const LEADING_MARKDOWN: &[char] = &['#', '-', '*', '>'];
const KEYWORD_SEPARATORS: &[char] = &[':', '-', '*', ' ', '\t'];

/// Severity of a review finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueClassification {
    /// Must be fixed before the task can be committed
    Blocking,
    /// Worth fixing, but does not hold up the commit
    NonBlocking,
    /// Cosmetic
    Nitpick,
}

impl IssueClassification {
    /// Marker ordering matters: `non-blocking` contains `blocking`.
    const MARKERS: [(&'static str, IssueClassification); 3] = [
        (NON_BLOCKING_MARKER, IssueClassification::NonBlocking),
        (BLOCKING_MARKER, IssueClassification::Blocking),
        (NITPICK_MARKER, IssueClassification::Nitpick),
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::NonBlocking => "non-blocking",
            Self::Nitpick => "nitpick",
        }
    }
}

impl fmt::Display for IssueClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding from a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIssue {
    pub description: String,
    pub classification: IssueClassification,
}

/// Outcome of one review iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub issues: Vec<ReviewIssue>,
    pub has_blocking_issues: bool,
    /// One-based index within the task's review loop
    pub iteration: u32,
}

impl ReviewResult {
    fn clean(iteration: u32) -> Self {
        Self {
            issues: Vec::new(),
            has_blocking_issues: false,
            iteration,
        }
    }

    /// Number of issues with the given classification.
    #[must_use]
    pub fn count(&self, classification: IssueClassification) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.classification == classification)
            .count()
    }
}

/// Classify the issues in a review document.
///
/// An empty document, or one whose first non-empty line starts with
/// "approved" once markdown decoration is removed, has no issues.
///
/// # Example
///
/// ```
/// use devloop::review::{analyze_review, IssueClassification};
///
/// let review = "# Review\n- **BLOCKING**: missing error handling\n- NITPICK: rename x\n";
/// let result = analyze_review(review, 1);
/// assert!(result.has_blocking_issues);
/// assert_eq!(result.issues[0].classification, IssueClassification::Blocking);
/// assert_eq!(result.issues[0].description, "missing error handling");
/// ```
#[must_use]
pub fn analyze_review(document: &str, iteration: u32) -> ReviewResult {
    if document.trim().is_empty() {
        return ReviewResult::clean(iteration);
    }

    let lines = document.split('\n').map(str::trim).filter(|l| !l.is_empty());

    if let Some(first) = lines.clone().next() {
        if starts_with_ignore_case(&normalize(first), APPROVED_MARKER) {
            debug!(iteration, "Review approved");
            return ReviewResult::clean(iteration);
        }
    }

    let issues: Vec<ReviewIssue> = lines
        .filter_map(|line| {
            let lower = line.to_ascii_lowercase();
            IssueClassification::MARKERS
                .iter()
                .find(|(marker, _)| lower.contains(marker))
                .map(|(marker, classification)| ReviewIssue {
                    description: extract_description(line, marker),
                    classification: *classification,
                })
        })
        .collect();

    let has_blocking_issues = issues
        .iter()
        .any(|i| i.classification == IssueClassification::Blocking);

    debug!(
        iteration,
        issues = issues.len(),
        blocking = has_blocking_issues,
        "Analyzed review"
    );

    ReviewResult {
        issues,
        has_blocking_issues,
        iteration,
    }
}

/// Drop leading markdown decoration and every `**`.
fn normalize(line: &str) -> String {
    line.trim_start_matches(LEADING_MARKDOWN).trim().replace("**", "")
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn extract_description(line: &str, marker: &str) -> String {
    let stripped = normalize(line);
    // ASCII lowercasing keeps byte offsets aligned with `stripped`
    match stripped.to_ascii_lowercase().find(marker) {
        Some(idx) => stripped[idx + marker.len()..]
            .trim_start_matches(KEYWORD_SEPARATORS)
            .trim()
            .to_string(),
        None => stripped.trim().to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
