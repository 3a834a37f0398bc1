//! End-to-end git analysis: source → aggregation → metrics → health.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitals_core::{AnalysisConfig, HistorySnapshot};

use crate::aggregate::{aggregate_commits, AuthorStat};
use crate::health::{score_health, BranchSummary, HealthScores};
use crate::metrics::{
    author_velocity, code_churn, commit_patterns, development_velocity, hot_files, ChurnEntry,
    CommitPatterns, DevelopmentVelocity, HotFile,
};
use crate::recommend::recommendations;
use crate::source::{DataSource, SourceKind};

/// Headline totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    /// Commits analysed.
    pub total_commits: usize,
    /// Lines added.
    pub total_additions: u64,
    /// Lines deleted.
    pub total_deletions: u64,
    /// Distinct authors.
    pub contributors: usize,
    /// Distinct files touched.
    pub files_touched: usize,
}

/// Everything derived from one history snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Headline totals.
    pub summary: RepoSummary,
    /// Most frequently changed files.
    pub hot_files: Vec<HotFile>,
    /// Per-file churn and risk, highest churn first.
    pub code_churn: Vec<ChurnEntry>,
    /// Authors, most commits first.
    pub authors: Vec<AuthorStat>,
    /// Cadence summary.
    pub velocity: DevelopmentVelocity,
    /// Temporal and size habits.
    pub patterns: CommitPatterns,
    /// Branch protection coverage.
    pub branches: BranchSummary,
    /// Health sub-scores and rating.
    pub health: HealthScores,
    /// Free-text advisories.
    pub recommendations: Vec<String>,
}

/// Analyse a snapshot relative to `now`.
///
/// Pure and deterministic: the same snapshot, configuration, and `now`
/// always yield the same report.
///
/// # Examples
///
/// ```
/// use vitals_core::{AnalysisConfig, HistorySnapshot};
/// use vitals_pulse::analysis::analyze_history;
/// use vitals_pulse::health::OverallHealth;
///
/// let report = analyze_history(
///     &HistorySnapshot::default(),
///     &AnalysisConfig::default(),
///     chrono::Utc::now(),
/// );
/// assert_eq!(report.summary.total_commits, 0);
/// assert_eq!(report.health.branch_management, 50.0);
/// assert_eq!(report.health.overall, OverallHealth::Poor);
/// ```
pub fn analyze_history(
    snapshot: &HistorySnapshot,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> AnalysisReport {
    let agg = aggregate_commits(&snapshot.commits);

    let hot_files = hot_files(&agg, config.hot_file_limit);
    let code_churn = code_churn(&agg, now);
    let velocity = development_velocity(&agg, config.peak_day_limit);
    let patterns = commit_patterns(&agg);
    let authors = author_velocity(&agg);
    let branches = BranchSummary::new(&snapshot.branches, &snapshot.current_branch);
    let health = score_health(&velocity, &code_churn, &branches);
    let recommendations = recommendations(&health, &hot_files, &velocity);

    AnalysisReport {
        summary: RepoSummary {
            total_commits: agg.total_commits(),
            total_additions: agg.total_additions(),
            total_deletions: agg.total_deletions(),
            contributors: agg.authors().len(),
            files_touched: agg.files().len(),
        },
        hot_files,
        code_churn,
        authors,
        velocity,
        patterns,
        branches,
        health,
        recommendations,
    }
}

/// Facts about an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Reference time of the run.
    pub analyzed_at: DateTime<Utc>,
    /// Where the history came from.
    pub source: SourceKind,
    /// Commits read from the source, 0 on failure.
    pub commits_analyzed: usize,
    /// Checked-out branch, when the source could be read.
    pub current_branch: Option<String>,
}

/// Result envelope of [`analyze`]. Never an `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    /// `false` when the source failed.
    pub success: bool,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Run facts.
    pub metadata: AnalysisMetadata,
    /// The report, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
}

/// Fetch from `source` and analyse.
///
/// A failing source is logged and turned into an unsuccessful outcome
/// instead of an error.
///
/// # Examples
///
/// ```
/// use vitals_core::AnalysisConfig;
/// use vitals_pulse::analysis::analyze;
/// use vitals_pulse::source::FixtureSource;
///
/// let outcome = analyze(&FixtureSource::sample(), &AnalysisConfig::default(), chrono::Utc::now());
/// assert!(outcome.success);
/// assert_eq!(outcome.metadata.commits_analyzed, 42);
/// ```
pub fn analyze(
    source: &dyn DataSource,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> AnalysisOutcome {
    match source.fetch() {
        Ok(snapshot) => {
            let report = analyze_history(&snapshot, config, now);
            AnalysisOutcome {
                success: true,
                error: None,
                metadata: AnalysisMetadata {
                    analyzed_at: now,
                    source: source.kind(),
                    commits_analyzed: snapshot.commits.len(),
                    current_branch: Some(snapshot.current_branch),
                },
                report: Some(report),
            }
        }
        Err(e) => {
            log::error!("{} history source failed: {e}", source.kind());
            AnalysisOutcome {
                success: false,
                error: Some(e.to_string()),
                metadata: AnalysisMetadata {
                    analyzed_at: now,
                    source: source.kind(),
                    commits_analyzed: 0,
                    current_branch: None,
                },
                report: None,
            }
        }
    }
}
