//! Named, bounded metrics derived from an [`Aggregation`].
//!
//! Hot files, the code-churn risk table, development velocity, commit
//! patterns, and per-author velocity. Every function here is a pure view over
//! the aggregation plus run-global constants.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregation, AuthorStat, FileStat, SizeDistribution};

/// Change-pressure classification of a hot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Rarely changed.
    Low,
    /// Regularly changed.
    Medium,
    /// Frequently changed.
    High,
    /// Changed constantly; refactor candidate.
    Critical,
}

impl Impact {
    /// Classify a file from its change count and weekly change frequency.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_pulse::metrics::Impact;
    ///
    /// assert_eq!(Impact::classify(51, 5.1), Impact::Critical);
    /// assert_eq!(Impact::classify(50, 5.0), Impact::High);
    /// assert_eq!(Impact::classify(3, 0.5), Impact::Low);
    /// ```
    pub fn classify(changes: u32, change_frequency: f64) -> Self {
        if changes > 50 && change_frequency > 5.0 {
            Impact::Critical
        } else if changes > 25 && change_frequency > 3.0 {
            Impact::High
        } else if changes > 10 && change_frequency > 1.0 {
            Impact::Medium
        } else {
            Impact::Low
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Impact::Low => write!(f, "low"),
            Impact::Medium => write!(f, "medium"),
            Impact::High => write!(f, "high"),
            Impact::Critical => write!(f, "critical"),
        }
    }
}

/// A frequently changed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotFile {
    /// Normalized path.
    pub filename: String,
    /// Commits touching the file.
    pub changes: u32,
    /// Cumulative lines added.
    pub additions: u64,
    /// Cumulative lines deleted.
    pub deletions: u64,
    /// Distinct authors.
    pub authors: usize,
    /// Most recent change.
    pub last_modified: DateTime<FixedOffset>,
    /// Changes per notional week of history.
    pub change_frequency: f64,
    /// Classification from changes and frequency.
    pub impact: Impact,
}

/// `changes / (total_commits / 7)`, with `total_commits` floored at 1.
///
/// # Examples
///
/// ```
/// use vitals_pulse::metrics::change_frequency;
///
/// assert_eq!(change_frequency(10, 70), 1.0);
/// ```
pub fn change_frequency(changes: u32, total_commits: usize) -> f64 {
    f64::from(changes) / (total_commits.max(1) as f64 / 7.0)
}

impl HotFile {
    /// Build the hot-file view of a file.
    pub fn from_stat(stat: &FileStat, total_commits: usize) -> Self {
        let frequency = change_frequency(stat.changes, total_commits);
        Self {
            filename: stat.filename.clone(),
            changes: stat.changes,
            additions: stat.additions,
            deletions: stat.deletions,
            authors: stat.authors.len(),
            last_modified: stat.last_modified,
            change_frequency: frequency,
            impact: Impact::classify(stat.changes, frequency),
        }
    }
}

/// Rank files by change count and keep the top `limit`.
///
/// Ties are broken by filename so the order is reproducible.
pub fn hot_files(agg: &Aggregation, limit: usize) -> Vec<HotFile> {
    let mut files: Vec<HotFile> = agg
        .files()
        .values()
        .map(|stat| HotFile::from_stat(stat, agg.total_commits()))
        .collect();
    files.sort_by(|a, b| {
        b.changes
            .cmp(&a.changes)
            .then_with(|| a.filename.cmp(&b.filename))
    });
    files.truncate(limit);
    files
}

/// Churn risk of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    /// Weighted score up to 40.
    Low,
    /// Weighted score above 40.
    Medium,
    /// Weighted score above 70.
    High,
}

impl Risk {
    /// Classify from change count, age in days, and complexity.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_pulse::metrics::Risk;
    ///
    /// // 0 + 365*0.1 + 0 = 36.5
    /// assert_eq!(Risk::classify(0, 0, 0), Risk::Low);
    /// // 100*0.3 + 36.5 + 100*0.6 = 126.5
    /// assert_eq!(Risk::classify(100, 0, 100), Risk::High);
    /// ```
    pub fn classify(changes: u32, age_days: u32, complexity: u32) -> Self {
        let freshness = 365.0_f64 - f64::from(age_days);
        let score = f64::from(changes) * 0.3
            + freshness.max(0.0) * 0.1
            + f64::from(complexity) * 0.6;
        if score > 70.0 {
            Risk::High
        } else if score > 40.0 {
            Risk::Medium
        } else {
            Risk::Low
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Risk::Low => write!(f, "low"),
            Risk::Medium => write!(f, "medium"),
            Risk::High => write!(f, "high"),
        }
    }
}

/// `min(round(changes × (1 + deletions/additions)), 100)`.
///
/// The ratio term is 0 when nothing was added.
///
/// # Examples
///
/// ```
/// use vitals_pulse::metrics::complexity;
///
/// assert_eq!(complexity(10, 100, 50), 15);
/// assert_eq!(complexity(10, 0, 50), 10);
/// assert_eq!(complexity(90, 10, 10), 100);
/// ```
pub fn complexity(changes: u32, additions: u64, deletions: u64) -> u32 {
    let churn_ratio = if additions == 0 {
        0.0
    } else {
        deletions as f64 / additions as f64
    };
    let raw = (f64::from(changes) * (1.0 + churn_ratio)).round();
    raw.min(100.0) as u32
}

/// Whole days from `last_modified` to `now`, never negative.
pub fn age_in_days(last_modified: DateTime<FixedOffset>, now: DateTime<Utc>) -> u32 {
    let days = now.signed_duration_since(last_modified).num_days();
    days.clamp(0, i64::from(u32::MAX)) as u32
}

/// A row of the code-churn table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnEntry {
    /// Normalized path.
    pub filename: String,
    /// Commits touching the file.
    pub changes: u32,
    /// Cumulative lines added.
    pub additions: u64,
    /// Cumulative lines deleted.
    pub deletions: u64,
    /// `additions + deletions`.
    pub churn: u64,
    /// Days since the last change.
    pub age: u32,
    /// Bounded 0–100 heuristic, see [`complexity`].
    pub complexity: u32,
    /// Weighted risk class.
    pub risk: Risk,
}

impl ChurnEntry {
    /// Build the churn view of a file relative to `now`.
    pub fn from_stat(stat: &FileStat, now: DateTime<Utc>) -> Self {
        let age = age_in_days(stat.last_modified, now);
        let complexity = complexity(stat.changes, stat.additions, stat.deletions);
        Self {
            filename: stat.filename.clone(),
            changes: stat.changes,
            additions: stat.additions,
            deletions: stat.deletions,
            churn: stat.churn(),
            age,
            complexity,
            risk: Risk::classify(stat.changes, age, complexity),
        }
    }
}

/// The full churn table, highest churn first. Not truncated.
pub fn code_churn(agg: &Aggregation, now: DateTime<Utc>) -> Vec<ChurnEntry> {
    let mut entries: Vec<ChurnEntry> = agg
        .files()
        .values()
        .map(|stat| ChurnEntry::from_stat(stat, now))
        .collect();
    entries.sort_by(|a, b| {
        b.churn
            .cmp(&a.churn)
            .then_with(|| a.filename.cmp(&b.filename))
    });
    entries
}

/// Cadence classification of the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Occasional activity.
    Low,
    /// Steady activity.
    Medium,
    /// Busy.
    High,
    /// Relentless; quality gates matter.
    VeryHigh,
}

impl Intensity {
    /// Classify from commits per active day and commits per contributor.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_pulse::metrics::Intensity;
    ///
    /// assert_eq!(Intensity::classify(21.0, 1.0), Intensity::VeryHigh);
    /// assert_eq!(Intensity::classify(1.0, 6.0), Intensity::High);
    /// assert_eq!(Intensity::classify(1.0, 2.0), Intensity::Low);
    /// ```
    pub fn classify(commits_per_day: f64, commits_per_contributor: f64) -> Self {
        if commits_per_day > 20.0 || commits_per_contributor > 10.0 {
            Intensity::VeryHigh
        } else if commits_per_day > 10.0 || commits_per_contributor > 5.0 {
            Intensity::High
        } else if commits_per_day > 5.0 || commits_per_contributor > 2.0 {
            Intensity::Medium
        } else {
            Intensity::Low
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intensity::Low => write!(f, "low"),
            Intensity::Medium => write!(f, "medium"),
            Intensity::High => write!(f, "high"),
            Intensity::VeryHigh => write!(f, "very_high"),
        }
    }
}

/// A day with many commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakDay {
    /// Calendar date in the authors' own offsets.
    pub date: NaiveDate,
    /// Commits on that date.
    pub commits: u32,
}

/// Cadence summary of the whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentVelocity {
    /// Commits per active day.
    pub avg_commits_per_day: f64,
    /// Changed lines per active day.
    pub avg_lines_per_day: f64,
    /// Commits per distinct author.
    pub avg_commits_per_contributor: f64,
    /// Distinct active days.
    pub active_days: usize,
    /// Distinct authors.
    pub contributors: usize,
    /// Cadence class.
    pub development_intensity: Intensity,
    /// Busiest dates, most commits first.
    pub peak_days: Vec<PeakDay>,
}

/// Compute velocity; `peak_limit` bounds the peak-day list.
pub fn development_velocity(agg: &Aggregation, peak_limit: usize) -> DevelopmentVelocity {
    let total = agg.total_commits() as f64;
    let days = agg.active_days().max(1) as f64;
    let contributors = agg.authors().len();
    let lines = (agg.total_additions() + agg.total_deletions()) as f64;

    let avg_commits_per_day = total / days;
    let avg_commits_per_contributor = total / contributors.max(1) as f64;

    // commits_per_day iterates by ascending date, so a stable sort keeps
    // earlier dates first among ties.
    let mut peak_days: Vec<PeakDay> = agg
        .commits_per_day()
        .iter()
        .map(|(date, commits)| PeakDay {
            date: *date,
            commits: *commits,
        })
        .collect();
    peak_days.sort_by(|a, b| b.commits.cmp(&a.commits));
    peak_days.truncate(peak_limit);

    DevelopmentVelocity {
        avg_commits_per_day,
        avg_lines_per_day: lines / days,
        avg_commits_per_contributor,
        active_days: agg.active_days(),
        contributors,
        development_intensity: Intensity::classify(
            avg_commits_per_day,
            avg_commits_per_contributor,
        ),
        peak_days,
    }
}

/// Temporal and structural commit habits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPatterns {
    /// Commits per hour of day.
    pub hourly: [u32; 24],
    /// Commits per weekday, Sunday first.
    pub weekday: [u32; 7],
    /// Commit-size buckets.
    pub commit_sizes: SizeDistribution,
    /// Commits per author.
    pub by_author: BTreeMap<String, u32>,
    /// File touches per extension.
    pub by_extension: BTreeMap<String, u32>,
}

impl CommitPatterns {
    /// Up to `n` busiest hours with at least one commit, busiest first,
    /// earlier hour first on ties.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_pulse::aggregate::aggregate_commits;
    /// use vitals_pulse::metrics::commit_patterns;
    ///
    /// let patterns = commit_patterns(&aggregate_commits(&[]));
    /// assert!(patterns.busiest_hours(3).is_empty());
    /// ```
    pub fn busiest_hours(&self, n: usize) -> Vec<u32> {
        let mut hours: Vec<(u32, u32)> = self
            .hourly
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(hour, count)| (hour as u32, *count))
            .collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hours.into_iter().take(n).map(|(hour, _)| hour).collect()
    }

    /// The author with the most commits and their count.
    ///
    /// Ties go to the alphabetically first name.
    pub fn top_author(&self) -> Option<(&str, u32)> {
        self.by_author
            .iter()
            .fold(None, |best: Option<(&str, u32)>, (name, count)| match best {
                Some((_, top)) if top >= *count => best,
                _ => Some((name.as_str(), *count)),
            })
    }
}

/// Summarize histograms, size buckets, author counts, and extension counts.
pub fn commit_patterns(agg: &Aggregation) -> CommitPatterns {
    let by_author = agg
        .authors()
        .values()
        .map(|a| (a.name().to_string(), a.commits()))
        .collect();

    let mut by_extension: BTreeMap<String, u32> = BTreeMap::new();
    for stat in agg.files().values() {
        *by_extension.entry(stat.extension().to_string()).or_default() += stat.changes;
    }

    CommitPatterns {
        hourly: *agg.hourly(),
        weekday: *agg.weekday(),
        commit_sizes: agg.sizes(),
        by_author,
        by_extension,
    }
}

/// Authors ordered by commits, then name.
pub fn author_velocity(agg: &Aggregation) -> Vec<AuthorStat> {
    let mut authors: Vec<AuthorStat> = agg.authors().values().cloned().collect();
    authors.sort_by(|a, b| {
        b.commits()
            .cmp(&a.commits())
            .then_with(|| a.name().cmp(b.name()))
    });
    authors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_commits;
    use crate::aggregate::tests::make_commit;

    fn now() -> DateTime<Utc> {
        "2024-06-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn impact_boundaries_are_exclusive() {
        assert_eq!(Impact::classify(50, 5.0), Impact::High);
        assert_eq!(Impact::classify(51, 5.0), Impact::High);
        assert_eq!(Impact::classify(50, 5.1), Impact::High);
        assert_eq!(Impact::classify(51, 5.01), Impact::Critical);
        assert_eq!(Impact::classify(25, 3.5), Impact::Medium);
        assert_eq!(Impact::classify(26, 3.01), Impact::High);
        assert_eq!(Impact::classify(10, 2.0), Impact::Low);
        assert_eq!(Impact::classify(11, 1.0), Impact::Low);
        assert_eq!(Impact::classify(11, 1.01), Impact::Medium);
    }

    #[test]
    fn frequency_is_changes_per_notional_week() {
        assert_eq!(change_frequency(0, 0), 0.0);
        assert_eq!(change_frequency(7, 7), 7.0);
        assert!((change_frequency(51, 70) - 5.1).abs() < 1e-9);
    }

    #[test]
    fn hot_file_view_is_reproducible() {
        let commits: Vec<_> = (0..60)
            .map(|i| {
                make_commit(
                    "alice",
                    &format!("2024-01-{:02}T10:{:02}:00Z", i % 28 + 1, i % 60),
                    vec![("src/core.rs", 3, 1)],
                )
            })
            .collect();
        let agg = aggregate_commits(&commits);
        let stat = agg.file("src/core.rs").unwrap();
        let first = HotFile::from_stat(stat, agg.total_commits());
        let second = HotFile::from_stat(stat, agg.total_commits());
        assert_eq!(first.change_frequency.to_bits(), second.change_frequency.to_bits());
        // 60 changes over 60 commits: 7 per week, 60 > 50.
        assert_eq!(first.impact, Impact::Critical);
    }

    #[test]
    fn hot_files_sorted_and_truncated() {
        let mut commits = Vec::new();
        for i in 0..25 {
            let name = format!("f{i:02}.rs");
            for j in 0..=i {
                commits.push(make_commit(
                    "alice",
                    &format!("2024-02-{:02}T10:00:00Z", j % 28 + 1),
                    vec![(name.as_str(), 1, 0)],
                ));
            }
        }
        let agg = aggregate_commits(&commits);
        let hot = hot_files(&agg, 20);
        assert_eq!(hot.len(), 20);
        assert_eq!(hot[0].filename, "f24.rs");
        assert!(hot.windows(2).all(|w| w[0].changes >= w[1].changes));
    }

    #[test]
    fn complexity_handles_zero_additions_and_caps() {
        assert_eq!(complexity(0, 0, 0), 0);
        assert_eq!(complexity(5, 0, 1000), 5);
        assert_eq!(complexity(3, 2, 1), 5); // 3 * 1.5 = 4.5 rounds away from zero
        assert_eq!(complexity(1000, 1, 1), 100);
    }

    #[test]
    fn risk_thresholds() {
        // age 365: freshness term is 0
        assert_eq!(Risk::classify(0, 365, 66), Risk::Low); // 39.6
        assert_eq!(Risk::classify(0, 365, 67), Risk::Medium); // 40.2
        assert_eq!(Risk::classify(0, 365, 116), Risk::Medium);
        assert_eq!(Risk::classify(10, 365, 112), Risk::High); // 3 + 67.2
        assert_eq!(Risk::classify(0, 10_000, 0), Risk::Low);
    }

    #[test]
    fn churn_table_sorted_by_churn() {
        let commits = vec![
            make_commit("a", "2024-05-01T10:00:00Z", vec![("small.rs", 1, 1)]),
            make_commit("a", "2024-05-02T10:00:00Z", vec![("big.rs", 300, 100)]),
            make_commit("a", "2024-05-03T10:00:00Z", vec![("mid.rs", 20, 5)]),
        ];
        let agg = aggregate_commits(&commits);
        let churn = code_churn(&agg, now());
        let names: Vec<_> = churn.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["big.rs", "mid.rs", "small.rs"]);
        assert_eq!(churn[0].churn, 400);
        assert_eq!(churn[0].age, 29);
    }

    #[test]
    fn future_timestamps_have_zero_age() {
        let ts: DateTime<FixedOffset> = "2030-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(age_in_days(ts, now()), 0);
    }

    #[test]
    fn ten_small_commits_are_low_intensity() {
        let commits: Vec<_> = (0..10)
            .map(|i| {
                make_commit(
                    &format!("dev{i}"),
                    &format!("2024-03-{:02}T12:00:00Z", i + 1),
                    vec![("notes.md", 2, 1)],
                )
            })
            .collect();
        let agg = aggregate_commits(&commits);
        assert_eq!(agg.sizes().small, 10);
        assert_eq!(agg.sizes().medium + agg.sizes().large + agg.sizes().huge, 0);
        let velocity = development_velocity(&agg, 5);
        assert_eq!(velocity.development_intensity, Intensity::Low);
        assert_eq!(velocity.contributors, 10);
        assert_eq!(velocity.active_days, 10);
    }

    #[test]
    fn empty_history_velocity_is_zero() {
        let velocity = development_velocity(&aggregate_commits(&[]), 5);
        assert_eq!(velocity.avg_commits_per_day, 0.0);
        assert_eq!(velocity.avg_commits_per_contributor, 0.0);
        assert_eq!(velocity.development_intensity, Intensity::Low);
        assert!(velocity.peak_days.is_empty());
    }

    #[test]
    fn peak_days_break_ties_by_date() {
        let commits = vec![
            make_commit("a", "2024-03-05T10:00:00Z", vec![]),
            make_commit("a", "2024-03-01T10:00:00Z", vec![]),
            make_commit("a", "2024-03-03T10:00:00Z", vec![]),
            make_commit("a", "2024-03-03T11:00:00Z", vec![]),
        ];
        let velocity = development_velocity(&aggregate_commits(&commits), 2);
        assert_eq!(velocity.peak_days.len(), 2);
        assert_eq!(velocity.peak_days[0].date.to_string(), "2024-03-03");
        assert_eq!(velocity.peak_days[0].commits, 2);
        assert_eq!(velocity.peak_days[1].date.to_string(), "2024-03-01");
    }

    #[test]
    fn patterns_count_extensions_and_authors() {
        let commits = vec![
            make_commit("alice", "2024-03-01T08:00:00Z", vec![("a.rs", 1, 0), ("Makefile", 1, 0)]),
            make_commit("bob", "2024-03-01T08:30:00Z", vec![("b.rs", 1, 0)]),
            make_commit("alice", "2024-03-02T14:00:00Z", vec![("a.rs", 1, 0)]),
        ];
        let patterns = commit_patterns(&aggregate_commits(&commits));
        assert_eq!(patterns.by_extension["rs"], 3);
        assert_eq!(patterns.by_extension["no_extension"], 1);
        assert_eq!(patterns.by_author["alice"], 2);
        assert_eq!(patterns.top_author(), Some(("alice", 2)));
        assert_eq!(patterns.busiest_hours(3), vec![8, 14]);
    }

    #[test]
    fn author_velocity_orders_by_commits() {
        let commits = vec![
            make_commit("zed", "2024-03-01T08:00:00Z", vec![("a.rs", 1, 0)]),
            make_commit("amy", "2024-03-01T09:00:00Z", vec![("a.rs", 1, 0)]),
            make_commit("zed", "2024-03-02T08:00:00Z", vec![("a.rs", 1, 0)]),
        ];
        let authors = author_velocity(&aggregate_commits(&commits));
        let names: Vec<_> = authors.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["zed", "amy"]);
    }
}
