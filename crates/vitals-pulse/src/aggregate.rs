//! Single-pass commit aggregation.
//!
//! Rolls raw commit records up into per-file and per-author statistics,
//! hour-of-day and day-of-week histograms, a commit-size distribution, and
//! the set of active calendar days. The [`Aggregator`] owns all mutable state
//! during the pass; [`Aggregation`] is the read-only result.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use vitals_core::CommitRecord;

/// Accumulated history of one file.
///
/// # Examples
///
/// ```
/// use vitals_core::{Author, CommitRecord, CommitStats, FileChange};
/// use vitals_pulse::aggregate::aggregate_commits;
///
/// let commit = CommitRecord {
///     sha: String::new(),
///     message: String::new(),
///     author: Author::new("alice", "alice@example.com"),
///     timestamp: "2024-03-04T10:00:00Z".parse().unwrap(),
///     files: vec![FileChange::new("src/lib.rs", 5, 2)],
///     stats: Some(CommitStats::new(5, 2)),
/// };
/// let agg = aggregate_commits(&[commit]);
/// let stat = agg.file("src/lib.rs").unwrap();
/// assert_eq!(stat.changes, 1);
/// assert!(stat.authors.contains("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    /// Normalized path.
    pub filename: String,
    /// Number of commits touching the file.
    pub changes: u32,
    /// Cumulative lines added.
    pub additions: u64,
    /// Cumulative lines deleted.
    pub deletions: u64,
    /// Timestamp of the most recent commit touching the file.
    pub last_modified: DateTime<FixedOffset>,
    /// Distinct author names that touched the file.
    pub authors: BTreeSet<String>,
}

impl FileStat {
    /// `additions + deletions`.
    pub fn churn(&self) -> u64 {
        self.additions + self.deletions
    }

    /// Text after the last `.` of the base name, or `no_extension`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_pulse::aggregate::extension_of;
    ///
    /// assert_eq!(extension_of("src/main.rs"), "rs");
    /// assert_eq!(extension_of("v1.2/Makefile"), "no_extension");
    /// assert_eq!(extension_of(".gitignore"), "gitignore");
    /// ```
    pub fn extension(&self) -> &str {
        extension_of(&self.filename)
    }
}

/// Sentinel extension for files without a `.` in their base name.
pub const NO_EXTENSION: &str = "no_extension";

/// Extension of a path, see [`FileStat::extension`].
pub fn extension_of(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => &base[idx + 1..],
        _ => NO_EXTENSION,
    }
}

/// Accumulated activity of one author.
///
/// Average commit size and productivity score are derived from the running
/// totals on every update and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStat {
    name: String,
    email: String,
    commits: u32,
    additions: u64,
    deletions: u64,
    files_touched: u64,
    active_days: u32,
    average_commit_size: f64,
    productivity_score: u32,
}

impl AuthorStat {
    fn new(name: String, email: String) -> Self {
        Self {
            name,
            email,
            commits: 0,
            additions: 0,
            deletions: 0,
            files_touched: 0,
            active_days: 0,
            average_commit_size: 0.0,
            productivity_score: 0,
        }
    }

    fn record(&mut self, additions: u64, deletions: u64, files: usize, active_days: u32) {
        self.commits += 1;
        self.additions += additions;
        self.deletions += deletions;
        self.files_touched += files as u64;
        self.active_days = active_days;
        self.average_commit_size = (self.additions + self.deletions) as f64 / self.commits as f64;
        self.productivity_score =
            productivity_score(self.commits, self.average_commit_size, self.active_days);
    }

    /// Author name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Email from the author's first commit.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Commits authored.
    pub fn commits(&self) -> u32 {
        self.commits
    }

    /// Cumulative lines added.
    pub fn additions(&self) -> u64 {
        self.additions
    }

    /// Cumulative lines deleted.
    pub fn deletions(&self) -> u64 {
        self.deletions
    }

    /// Sum of file changes across the author's commits.
    pub fn files_touched(&self) -> u64 {
        self.files_touched
    }

    /// Distinct active days of the whole history at the author's latest commit.
    pub fn active_days(&self) -> u32 {
        self.active_days
    }

    /// `(additions + deletions) / commits`.
    pub fn average_commit_size(&self) -> f64 {
        self.average_commit_size
    }

    /// Bounded 0–100 productivity heuristic, see [`productivity_score`].
    pub fn productivity_score(&self) -> u32 {
        self.productivity_score
    }
}

/// `min(commits×2, 50) + min(avg×0.5, 30) + min(active_days, 20)`, rounded.
///
/// # Examples
///
/// ```
/// use vitals_pulse::aggregate::productivity_score;
///
/// assert_eq!(productivity_score(10, 20.0, 5), 35);
/// assert_eq!(productivity_score(1000, 1000.0, 1000), 100);
/// ```
pub fn productivity_score(commits: u32, average_commit_size: f64, active_days: u32) -> u32 {
    let cadence = (f64::from(commits) * 2.0).min(50.0);
    let size = (average_commit_size * 0.5).min(30.0);
    let presence = f64::from(active_days).min(20.0);
    (cadence + size + presence).round() as u32
}

/// Commits bucketed by total changed lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDistribution {
    /// At most 10 lines.
    pub small: u32,
    /// 11–50 lines.
    pub medium: u32,
    /// 51–200 lines.
    pub large: u32,
    /// More than 200 lines.
    pub huge: u32,
}

impl SizeDistribution {
    fn record(&mut self, total: u64) {
        match total {
            0..=10 => self.small += 1,
            11..=50 => self.medium += 1,
            51..=200 => self.large += 1,
            _ => self.huge += 1,
        }
    }

    /// Number of commits counted.
    pub fn total(&self) -> u32 {
        self.small + self.medium + self.large + self.huge
    }
}

/// Read-only result of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    total_commits: usize,
    files: HashMap<String, FileStat>,
    authors: HashMap<String, AuthorStat>,
    hourly: [u32; 24],
    weekday: [u32; 7],
    sizes: SizeDistribution,
    total_additions: u64,
    total_deletions: u64,
    commits_per_day: BTreeMap<NaiveDate, u32>,
}

impl Aggregation {
    /// Number of commits ingested.
    pub fn total_commits(&self) -> usize {
        self.total_commits
    }

    /// Per-file statistics keyed by normalized path.
    pub fn files(&self) -> &HashMap<String, FileStat> {
        &self.files
    }

    /// Statistics for one file.
    pub fn file(&self, filename: &str) -> Option<&FileStat> {
        self.files.get(&normalize_path(filename))
    }

    /// Per-author statistics keyed by trimmed name.
    pub fn authors(&self) -> &HashMap<String, AuthorStat> {
        &self.authors
    }

    /// Statistics for one author.
    pub fn author(&self, name: &str) -> Option<&AuthorStat> {
        self.authors.get(&normalize_author(name))
    }

    /// Commits per hour of day in the author's own offset.
    pub fn hourly(&self) -> &[u32; 24] {
        &self.hourly
    }

    /// Commits per weekday, Sunday first.
    pub fn weekday(&self) -> &[u32; 7] {
        &self.weekday
    }

    /// Commit-size buckets.
    pub fn sizes(&self) -> SizeDistribution {
        self.sizes
    }

    /// Lines added across all commits.
    pub fn total_additions(&self) -> u64 {
        self.total_additions
    }

    /// Lines deleted across all commits.
    pub fn total_deletions(&self) -> u64 {
        self.total_deletions
    }

    /// Commits per calendar day, keyed by date.
    pub fn commits_per_day(&self) -> &BTreeMap<NaiveDate, u32> {
        &self.commits_per_day
    }

    /// Number of distinct calendar days with at least one commit.
    pub fn active_days(&self) -> usize {
        self.commits_per_day.len()
    }
}

/// Mutable state of an aggregation pass.
#[derive(Debug, Default)]
pub struct Aggregator {
    total_commits: usize,
    files: HashMap<String, FileStat>,
    authors: HashMap<String, AuthorStat>,
    hourly: [u32; 24],
    weekday: [u32; 7],
    sizes: SizeDistribution,
    total_additions: u64,
    total_deletions: u64,
    commits_per_day: BTreeMap<NaiveDate, u32>,
}

impl Aggregator {
    /// Start an empty pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one commit into the running statistics.
    pub fn push(&mut self, commit: &CommitRecord) {
        let stats = commit.line_stats();
        let ts = commit.timestamp;

        self.total_commits += 1;
        self.hourly[ts.hour() as usize] += 1;
        self.weekday[ts.weekday().num_days_from_sunday() as usize] += 1;
        self.sizes.record(stats.total);
        self.total_additions += stats.additions;
        self.total_deletions += stats.deletions;
        *self.commits_per_day.entry(ts.date_naive()).or_default() += 1;

        let author = normalize_author(&commit.author.name);

        for change in &commit.files {
            let path = normalize_path(&change.filename);
            if path.is_empty() {
                log::warn!("skipping file change with empty path in commit {}", commit.sha);
                continue;
            }
            let stat = self.files.entry(path.clone()).or_insert_with(|| FileStat {
                filename: path,
                changes: 0,
                additions: 0,
                deletions: 0,
                last_modified: ts,
                authors: BTreeSet::new(),
            });
            stat.changes += 1;
            stat.additions += change.additions;
            stat.deletions += change.deletions;
            if ts > stat.last_modified {
                stat.last_modified = ts;
            }
            stat.authors.insert(author.clone());
        }

        let active_days = self.commits_per_day.len() as u32;
        self.authors
            .entry(author.clone())
            .or_insert_with(|| AuthorStat::new(author, commit.author.email.clone()))
            .record(
                stats.additions,
                stats.deletions,
                commit.files.len(),
                active_days,
            );
    }

    /// End the pass and hand out the read-only result.
    pub fn finish(self) -> Aggregation {
        log::debug!(
            "aggregated {} commits over {} files, {} authors, {} active days",
            self.total_commits,
            self.files.len(),
            self.authors.len(),
            self.commits_per_day.len()
        );
        Aggregation {
            total_commits: self.total_commits,
            files: self.files,
            authors: self.authors,
            hourly: self.hourly,
            weekday: self.weekday,
            sizes: self.sizes,
            total_additions: self.total_additions,
            total_deletions: self.total_deletions,
            commits_per_day: self.commits_per_day,
        }
    }
}

/// Aggregate a batch of commits in one pass. Input order does not matter.
pub fn aggregate_commits(commits: &[CommitRecord]) -> Aggregation {
    let mut aggregator = Aggregator::new();
    for commit in commits {
        aggregator.push(commit);
    }
    aggregator.finish()
}

fn normalize_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}

fn normalize_author(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        "unknown".into()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use vitals_core::{Author, CommitStats, FileChange};

    pub(crate) fn make_commit(
        author: &str,
        timestamp: &str,
        files: Vec<(&str, u64, u64)>,
    ) -> CommitRecord {
        let files: Vec<FileChange> = files
            .into_iter()
            .map(|(path, added, deleted)| FileChange::new(path, added, deleted))
            .collect();
        let additions = files.iter().map(|f| f.additions).sum();
        let deletions = files.iter().map(|f| f.deletions).sum();
        CommitRecord {
            sha: format!("sha_{timestamp}"),
            message: "test commit".into(),
            author: Author::new(author, format!("{author}@example.com")),
            timestamp: timestamp.parse().unwrap(),
            files,
            stats: Some(CommitStats::new(additions, deletions)),
        }
    }

    #[test]
    fn empty_history_aggregates_to_zero() {
        let agg = aggregate_commits(&[]);
        assert_eq!(agg.total_commits(), 0);
        assert!(agg.files().is_empty());
        assert!(agg.authors().is_empty());
        assert_eq!(agg.sizes().total(), 0);
        assert_eq!(agg.active_days(), 0);
    }

    #[test]
    fn histograms_use_commit_offset() {
        // 23:30 at +02:00 is 21:30 UTC; the author's wall clock wins.
        let commits = vec![
            make_commit("alice", "2024-03-03T23:30:00+02:00", vec![("a.rs", 1, 0)]),
            make_commit("alice", "2024-03-04T09:00:00Z", vec![("a.rs", 1, 0)]),
        ];
        let agg = aggregate_commits(&commits);
        assert_eq!(agg.hourly()[23], 1);
        assert_eq!(agg.hourly()[9], 1);
        // 2024-03-03 is a Sunday, 2024-03-04 a Monday.
        assert_eq!(agg.weekday()[0], 1);
        assert_eq!(agg.weekday()[1], 1);
        assert_eq!(agg.active_days(), 2);
    }

    #[test]
    fn size_buckets_respect_boundaries() {
        let commits = vec![
            make_commit("a", "2024-01-01T10:00:00Z", vec![("f.rs", 10, 0)]),
            make_commit("a", "2024-01-01T11:00:00Z", vec![("f.rs", 11, 0)]),
            make_commit("a", "2024-01-01T12:00:00Z", vec![("f.rs", 50, 0)]),
            make_commit("a", "2024-01-01T13:00:00Z", vec![("f.rs", 200, 0)]),
            make_commit("a", "2024-01-01T14:00:00Z", vec![("f.rs", 201, 0)]),
        ];
        let sizes = aggregate_commits(&commits).sizes();
        assert_eq!(sizes.small, 1);
        assert_eq!(sizes.medium, 2);
        assert_eq!(sizes.large, 1);
        assert_eq!(sizes.huge, 1);
    }

    #[test]
    fn file_stats_accumulate_and_track_latest_change() {
        let commits = vec![
            make_commit("bob", "2024-02-10T10:00:00Z", vec![("src/lib.rs", 5, 1)]),
            make_commit("alice", "2024-02-01T10:00:00Z", vec![("./src/lib.rs", 3, 2)]),
        ];
        let agg = aggregate_commits(&commits);
        let stat = agg.file("src/lib.rs").unwrap();
        assert_eq!(stat.changes, 2);
        assert_eq!(stat.additions, 8);
        assert_eq!(stat.deletions, 3);
        assert_eq!(stat.churn(), 11);
        assert_eq!(stat.last_modified.to_rfc3339(), "2024-02-10T10:00:00+00:00");
        assert_eq!(stat.authors.len(), 2);
    }

    #[test]
    fn every_touched_file_has_an_author() {
        let commits = vec![
            make_commit("  ", "2024-02-10T10:00:00Z", vec![("a.rs", 1, 1), ("b.rs", 2, 0)]),
            make_commit("carol", "2024-02-11T10:00:00Z", vec![("c.rs", 1, 1)]),
        ];
        let agg = aggregate_commits(&commits);
        for stat in agg.files().values() {
            assert!(!stat.authors.is_empty(), "{} has no authors", stat.filename);
        }
        assert!(agg.author("unknown").is_some());
    }

    #[test]
    fn author_derived_fields_follow_running_totals() {
        let commits = vec![
            make_commit("alice", "2024-01-01T10:00:00Z", vec![("a.rs", 10, 0), ("b.rs", 0, 10)]),
            make_commit("alice", "2024-01-02T10:00:00Z", vec![("a.rs", 40, 0)]),
        ];
        let agg = aggregate_commits(&commits);
        let alice = agg.author("alice").unwrap();
        assert_eq!(alice.commits(), 2);
        assert_eq!(alice.files_touched(), 3);
        assert!((alice.average_commit_size() - 30.0).abs() < f64::EPSILON);
        assert_eq!(alice.active_days(), 2);
        // 2*2 + 30*0.5 + 2 = 21
        assert_eq!(alice.productivity_score(), 21);
    }

    #[test]
    fn productivity_score_is_capped() {
        assert_eq!(productivity_score(0, 0.0, 0), 0);
        assert_eq!(productivity_score(25, 60.0, 20), 100);
        assert_eq!(productivity_score(u32::MAX, f64::MAX, u32::MAX), 100);
    }

    #[test]
    fn extension_uses_base_name() {
        assert_eq!(extension_of("src/app.test.ts"), "ts");
        assert_eq!(extension_of("Makefile"), NO_EXTENSION);
        assert_eq!(extension_of("dir.d/README"), NO_EXTENSION);
        assert_eq!(extension_of("trailing."), NO_EXTENSION);
    }
}
