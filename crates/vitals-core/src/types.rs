use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Identity of a commit author.
///
/// # Examples
///
/// ```
/// use vitals_core::Author;
///
/// let author = Author::new("alice", "alice@example.com");
/// assert_eq!(author.name, "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

impl Author {
    /// Create an author identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Line counts for one file within a commit.
///
/// # Examples
///
/// ```
/// use vitals_core::FileChange;
///
/// let change = FileChange::new("src/main.rs", 10, 3);
/// assert_eq!(change.lines_changed(), 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub filename: String,
    /// Lines added.
    #[serde(default)]
    pub additions: u64,
    /// Lines deleted.
    #[serde(default)]
    pub deletions: u64,
}

impl FileChange {
    /// Create a file change.
    pub fn new(filename: impl Into<String>, additions: u64, deletions: u64) -> Self {
        Self {
            filename: filename.into(),
            additions,
            deletions,
        }
    }

    /// `additions + deletions`.
    pub fn lines_changed(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// Aggregate line statistics reported for a whole commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    /// Lines added across all files.
    #[serde(default)]
    pub additions: u64,
    /// Lines deleted across all files.
    #[serde(default)]
    pub deletions: u64,
    /// Total changed lines, normally `additions + deletions`.
    #[serde(default)]
    pub total: u64,
}

impl CommitStats {
    /// Build stats whose total is the sum of its parts.
    pub fn new(additions: u64, deletions: u64) -> Self {
        Self {
            additions,
            deletions,
            total: additions + deletions,
        }
    }
}

/// One commit as delivered by a history source.
///
/// Records are never mutated once ingested. A commit without `stats`
/// contributes zero lines to every line-based aggregate.
///
/// # Examples
///
/// ```
/// use vitals_core::{Author, CommitRecord, CommitStats, FileChange};
///
/// let commit = CommitRecord {
///     sha: "abc123".into(),
///     message: "fix: auth bug".into(),
///     author: Author::new("alice", "alice@example.com"),
///     timestamp: "2024-03-04T10:15:00+01:00".parse().unwrap(),
///     files: vec![FileChange::new("src/auth.rs", 4, 1)],
///     stats: Some(CommitStats::new(4, 1)),
/// };
/// assert_eq!(commit.line_stats().total, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    /// Commit hash, empty when the source does not provide one.
    #[serde(default)]
    pub sha: String,
    /// First line of the commit message.
    #[serde(default)]
    pub message: String,
    /// Who authored the commit.
    pub author: Author,
    /// Author timestamp, keeping the author's UTC offset.
    pub timestamp: DateTime<FixedOffset>,
    /// Files touched by the commit, in source order.
    #[serde(default)]
    pub files: Vec<FileChange>,
    /// Aggregate line statistics, if the source reported them.
    #[serde(default)]
    pub stats: Option<CommitStats>,
}

impl CommitRecord {
    /// Line statistics, zero-valued when the source omitted them.
    pub fn line_stats(&self) -> CommitStats {
        self.stats.unwrap_or_default()
    }
}

/// A branch and its protection status.
///
/// # Examples
///
/// ```
/// use vitals_core::Branch;
///
/// let b: Branch = serde_json::from_str(r#"{"name":"main","protected":true}"#).unwrap();
/// assert!(b.protected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// Whether the branch is protected against direct pushes.
    #[serde(default)]
    pub protected: bool,
}

fn default_current_branch() -> String {
    "main".into()
}

/// Everything a history source hands to the analysis pipeline.
///
/// `HistorySnapshot::default()` is the degenerate input: no commits, no
/// branches, current branch `main`.
///
/// # Examples
///
/// ```
/// use vitals_core::HistorySnapshot;
///
/// let empty = HistorySnapshot::default();
/// assert!(empty.commits.is_empty());
/// assert_eq!(empty.current_branch, "main");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    /// Commits in any order.
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    /// Known branches.
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Name of the checked-out branch.
    #[serde(default = "default_current_branch")]
    pub current_branch: String,
}

impl Default for HistorySnapshot {
    fn default() -> Self {
        Self {
            commits: Vec::new(),
            branches: Vec::new(),
            current_branch: default_current_branch(),
        }
    }
}

/// Urgency of a suggestion.
///
/// Ordered `Critical > High > Medium > Low`.
///
/// # Examples
///
/// ```
/// use vitals_core::Priority;
///
/// let p: Priority = "critical".parse().unwrap();
/// assert!(p.outranks(Priority::High));
/// assert_eq!(p.to_string(), "critical");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must be addressed immediately.
    Critical,
    /// Should be addressed soon.
    High,
    /// Worth scheduling.
    Medium,
    /// Nice to have.
    Low,
}

impl Priority {
    /// Returns `true` if `self` is strictly more urgent than `other`.
    pub fn outranks(self, other: Priority) -> bool {
        self.rank() < other.rank()
    }

    /// Position in the urgency order, `0` being the most urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Critical => write!(f, "critical"),
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Area a suggestion belongs to.
///
/// Every category except [`Category::Testing`] and [`Category::Documentation`]
/// has an on/off switch in [`crate::CategoryToggles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Vulnerabilities, access control, branch protection.
    Security,
    /// Hot paths and risky, heavily rewritten files.
    Performance,
    /// Churn, complexity, refactoring.
    Maintainability,
    /// Knowledge distribution and team habits.
    Collaboration,
    /// Third-party packages and licensing.
    Dependencies,
    /// Commit cadence and workflow.
    Process,
    /// Test coverage and automation.
    Testing,
    /// Project documentation.
    Documentation,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Maintainability => "maintainability",
            Category::Collaboration => "collaboration",
            Category::Dependencies => "dependencies",
            Category::Process => "process",
            Category::Testing => "testing",
            Category::Documentation => "documentation",
        };
        f.write_str(name)
    }
}

/// Report rendering format.
///
/// # Examples
///
/// ```
/// use vitals_core::OutputFormat;
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain terminal summary.
    #[default]
    Text,
    /// camelCase JSON.
    Json,
    /// Markdown sections and tables.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_record_parses_camel_case_json() {
        let json = r#"{
            "author": {"name": "alice", "email": "alice@example.com"},
            "timestamp": "2024-01-15T09:30:00Z",
            "files": [{"filename": "src/lib.rs", "additions": 3, "deletions": 1}],
            "stats": {"additions": 3, "deletions": 1, "total": 4}
        }"#;
        let commit: CommitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(commit.author.name, "alice");
        assert!(commit.sha.is_empty());
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.line_stats().total, 4);
    }

    #[test]
    fn missing_stats_are_zero_valued() {
        let json = r#"{
            "author": {"name": "bob"},
            "timestamp": "2024-01-15T09:30:00+02:00",
            "files": [{"filename": "a.rs", "additions": 30, "deletions": 10}]
        }"#;
        let commit: CommitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(commit.line_stats(), CommitStats::default());
        assert_eq!(commit.author.email, "");
    }

    #[test]
    fn snapshot_defaults_to_main_branch() {
        let snapshot: HistorySnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.current_branch, "main");
        assert!(snapshot.branches.is_empty());
    }

    #[test]
    fn priority_order() {
        assert!(Priority::Critical.outranks(Priority::High));
        assert!(Priority::High.outranks(Priority::Medium));
        assert!(Priority::Medium.outranks(Priority::Low));
        assert!(!Priority::Low.outranks(Priority::Low));
    }

    #[test]
    fn priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Maintainability).unwrap();
        assert_eq!(json, "\"maintainability\"");
        assert_eq!(Category::Dependencies.to_string(), "dependencies");
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
