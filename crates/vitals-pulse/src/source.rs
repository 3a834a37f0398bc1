//! History sources.
//!
//! The caller picks a [`DataSource`]: [`crate::mining::LiveSource`] reads a
//! local repository, [`FixtureSource`] serves a prepared snapshot.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vitals_core::{
    Author, Branch, CommitRecord, CommitStats, FileChange, HistorySnapshot, VitalsError,
};

/// Which kind of source produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A repository read at run time.
    Live,
    /// Prepared data.
    Fixture,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Live => write!(f, "live"),
            SourceKind::Fixture => write!(f, "fixture"),
        }
    }
}

/// Supplies a complete, already-fetched history or fails outright.
pub trait DataSource {
    /// Kind reported in analysis metadata.
    fn kind(&self) -> SourceKind;

    /// Fetch commits, branches, and the current branch.
    ///
    /// # Errors
    ///
    /// Implementations return [`VitalsError`] when the history is unavailable.
    fn fetch(&self) -> Result<HistorySnapshot, VitalsError>;
}

/// A prepared snapshot, for tests and offline use.
///
/// # Examples
///
/// ```
/// use vitals_pulse::source::{DataSource, FixtureSource};
///
/// let source = FixtureSource::sample();
/// let snapshot = source.fetch().unwrap();
/// assert!(!snapshot.commits.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct FixtureSource {
    snapshot: HistorySnapshot,
}

impl FixtureSource {
    /// Serve `snapshot` as-is.
    pub fn new(snapshot: HistorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Serialization`] if the JSON does not match.
    pub fn from_json(content: &str) -> Result<Self, VitalsError> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Io`] if the file cannot be read, or
    /// [`VitalsError::Fixture`] if it does not hold a snapshot.
    pub fn from_file(path: &Path) -> Result<Self, VitalsError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&content).map_err(|e| VitalsError::Fixture {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(snapshot))
    }

    /// A small deterministic history: three authors over three weeks.
    pub fn sample() -> Self {
        Self::new(sample_snapshot())
    }
}

impl DataSource for FixtureSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Fixture
    }

    fn fetch(&self) -> Result<HistorySnapshot, VitalsError> {
        Ok(self.snapshot.clone())
    }
}

const SAMPLE_AUTHORS: [(&str, &str); 3] = [
    ("Ada Lovelace", "ada@example.com"),
    ("Grace Hopper", "grace@example.com"),
    ("Linus Torvalds", "linus@example.com"),
];

const SAMPLE_FILES: [&str; 6] = [
    "src/main.rs",
    "src/lib.rs",
    "src/parser.rs",
    "tests/parser.rs",
    "README.md",
    "Cargo.toml",
];

fn sample_snapshot() -> HistorySnapshot {
    // 2024-05-06T09:00:00Z
    let start = (DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_714_986_000)).fixed_offset();

    let commits = (0..42u32)
        .map(|i| {
            let (name, email) = SAMPLE_AUTHORS[(i % 5 % 3) as usize];
            let timestamp = start
                + Duration::days(i64::from(i / 2))
                + Duration::hours(i64::from(i * 7 % 10));
            let primary = SAMPLE_FILES[(i % 4) as usize];
            let secondary = SAMPLE_FILES[(i % 6) as usize];
            let mut files = vec![FileChange::new(primary, u64::from(i % 9 * 4 + 2), u64::from(i % 5))];
            if secondary != primary {
                files.push(FileChange::new(secondary, u64::from(i % 3 + 1), 0));
            }
            let additions = files.iter().map(|f| f.additions).sum();
            let deletions = files.iter().map(|f| f.deletions).sum();
            CommitRecord {
                sha: format!("{:07x}", 0x5a1e_000 + i),
                message: format!("sample change {i}"),
                author: Author::new(name, email),
                timestamp,
                files,
                stats: Some(CommitStats::new(additions, deletions)),
            }
        })
        .collect();

    HistorySnapshot {
        commits,
        branches: vec![
            Branch {
                name: "main".into(),
                protected: true,
            },
            Branch {
                name: "feature/parser".into(),
                protected: false,
            },
        ],
        current_branch: "main".into(),
    }
}
