//! Four bounded health sub-scores and an overall rating.

use std::fmt;

use serde::{Deserialize, Serialize};
use vitals_core::Branch;

use crate::metrics::{ChurnEntry, DevelopmentVelocity};

/// Overall repository health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    /// Mean below 40.
    Poor,
    /// Mean of at least 40.
    Fair,
    /// Mean of at least 60.
    Good,
    /// Mean of at least 80.
    Excellent,
}

impl OverallHealth {
    /// Classify a mean sub-score.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_pulse::health::OverallHealth;
    ///
    /// assert_eq!(OverallHealth::from_mean(80.0), OverallHealth::Excellent);
    /// assert_eq!(OverallHealth::from_mean(79.9), OverallHealth::Good);
    /// assert_eq!(OverallHealth::from_mean(39.9), OverallHealth::Poor);
    /// ```
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 80.0 {
            OverallHealth::Excellent
        } else if mean >= 60.0 {
            OverallHealth::Good
        } else if mean >= 40.0 {
            OverallHealth::Fair
        } else {
            OverallHealth::Poor
        }
    }
}

impl fmt::Display for OverallHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallHealth::Poor => write!(f, "poor"),
            OverallHealth::Fair => write!(f, "fair"),
            OverallHealth::Good => write!(f, "good"),
            OverallHealth::Excellent => write!(f, "excellent"),
        }
    }
}

/// Branch counts and protection coverage.
///
/// # Examples
///
/// ```
/// use vitals_core::Branch;
/// use vitals_pulse::health::BranchSummary;
///
/// let branches = vec![
///     Branch { name: "main".into(), protected: true },
///     Branch { name: "feature".into(), protected: false },
/// ];
/// let summary = BranchSummary::new(&branches, "main");
/// assert_eq!(summary.protection_ratio(), Some(0.5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSummary {
    /// Known branches.
    pub total: usize,
    /// Protected branches.
    pub protected: usize,
    /// Checked-out branch.
    pub current: String,
}

impl BranchSummary {
    /// Summarize a branch list.
    pub fn new(branches: &[Branch], current: &str) -> Self {
        Self {
            total: branches.len(),
            protected: branches.iter().filter(|b| b.protected).count(),
            current: current.to_string(),
        }
    }

    /// `protected / total`, or `None` when no branches are known.
    pub fn protection_ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.protected as f64 / self.total as f64)
        }
    }
}

/// Sub-scores, each clamped to `0..=100`, plus the derived rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScores {
    /// Cadence of commits per active day.
    pub commit_frequency: f64,
    /// Breadth of the contributor base.
    pub contributor_diversity: f64,
    /// Inverse of mean per-file churn.
    pub code_churn: f64,
    /// Protected share of branches.
    pub branch_management: f64,
    /// Step function of the mean sub-score.
    pub overall: OverallHealth,
}

impl HealthScores {
    /// Clamp the four sub-scores and derive the rating.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_pulse::health::{HealthScores, OverallHealth};
    ///
    /// let scores = HealthScores::from_parts(120.0, 85.0, -5.0, 100.0);
    /// assert_eq!(scores.commit_frequency, 100.0);
    /// assert_eq!(scores.code_churn, 0.0);
    /// assert_eq!(scores.overall, OverallHealth::Good);
    /// ```
    pub fn from_parts(
        commit_frequency: f64,
        contributor_diversity: f64,
        code_churn: f64,
        branch_management: f64,
    ) -> Self {
        let commit_frequency = clamp_score(commit_frequency);
        let contributor_diversity = clamp_score(contributor_diversity);
        let code_churn = clamp_score(code_churn);
        let branch_management = clamp_score(branch_management);
        let mean = (commit_frequency + contributor_diversity + code_churn + branch_management) / 4.0;
        Self {
            commit_frequency,
            contributor_diversity,
            code_churn,
            branch_management,
            overall: OverallHealth::from_mean(mean),
        }
    }

    /// Mean of the four sub-scores.
    pub fn mean(&self) -> f64 {
        (self.commit_frequency + self.contributor_diversity + self.code_churn + self.branch_management)
            / 4.0
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Piecewise-linear score of commits per active day.
///
/// # Examples
///
/// ```
/// use vitals_pulse::health::commit_frequency_score;
///
/// assert_eq!(commit_frequency_score(0.5), 25.0);
/// assert_eq!(commit_frequency_score(3.0), 70.0);
/// assert_eq!(commit_frequency_score(8.0), 93.0);
/// assert_eq!(commit_frequency_score(500.0), 100.0);
/// ```
pub fn commit_frequency_score(commits_per_day: f64) -> f64 {
    let score = if commits_per_day < 1.0 {
        commits_per_day * 50.0
    } else if commits_per_day <= 5.0 {
        50.0 + (commits_per_day - 1.0) * 10.0
    } else {
        90.0 + (commits_per_day - 5.0).min(10.0)
    };
    clamp_score(score)
}

/// `min(100, authors × 20)`.
pub fn contributor_diversity_score(contributors: usize) -> f64 {
    (contributors as f64 * 20.0).min(100.0)
}

/// `max(0, 100 − mean_churn / 10)`, mean 0 for an empty table.
pub fn code_churn_score(churn: &[ChurnEntry]) -> f64 {
    let mean = if churn.is_empty() {
        0.0
    } else {
        churn.iter().map(|c| c.churn as f64).sum::<f64>() / churn.len() as f64
    };
    clamp_score(100.0 - mean / 10.0)
}

/// Protected share of branches × 100, or a neutral 50 with no branches.
pub fn branch_management_score(branches: &BranchSummary) -> f64 {
    branches
        .protection_ratio()
        .map_or(50.0, |ratio| clamp_score(ratio * 100.0))
}

/// Score a repository from its synthesized metrics.
pub fn score_health(
    velocity: &DevelopmentVelocity,
    churn: &[ChurnEntry],
    branches: &BranchSummary,
) -> HealthScores {
    HealthScores::from_parts(
        commit_frequency_score(velocity.avg_commits_per_day),
        contributor_diversity_score(velocity.contributors),
        code_churn_score(churn),
        branch_management_score(branches),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Risk;

    fn churn_entry(churn: u64) -> ChurnEntry {
        ChurnEntry {
            filename: "f.rs".into(),
            changes: 1,
            additions: churn,
            deletions: 0,
            churn,
            age: 0,
            complexity: 1,
            risk: Risk::Low,
        }
    }

    #[test]
    fn commit_frequency_segments_meet() {
        assert_eq!(commit_frequency_score(0.0), 0.0);
        assert_eq!(commit_frequency_score(1.0), 50.0);
        assert_eq!(commit_frequency_score(5.0), 90.0);
        assert_eq!(commit_frequency_score(15.0), 100.0);
        assert_eq!(commit_frequency_score(f64::INFINITY), 100.0);
    }

    #[test]
    fn diversity_caps_at_one_hundred() {
        assert_eq!(contributor_diversity_score(0), 0.0);
        assert_eq!(contributor_diversity_score(3), 60.0);
        assert_eq!(contributor_diversity_score(1000), 100.0);
    }

    #[test]
    fn churn_score_floors_at_zero() {
        assert_eq!(code_churn_score(&[]), 100.0);
        assert_eq!(code_churn_score(&[churn_entry(100), churn_entry(300)]), 80.0);
        assert_eq!(code_churn_score(&[churn_entry(10_000)]), 0.0);
    }

    #[test]
    fn branch_score_is_neutral_without_branches() {
        let none = BranchSummary::new(&[], "main");
        assert_eq!(branch_management_score(&none), 50.0);
        let all = BranchSummary::new(
            &[Branch {
                name: "main".into(),
                protected: true,
            }],
            "main",
        );
        assert_eq!(branch_management_score(&all), 100.0);
    }

    #[test]
    fn extreme_inputs_stay_in_bounds() {
        let cases = [
            (0.0, 0.0, 0.0, 0.0),
            (1e12, 1e12, 1e12, 1e12),
            (-1e12, -1e12, -1e12, -1e12),
            (f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 50.0),
        ];
        for (a, b, c, d) in cases {
            let s = HealthScores::from_parts(a, b, c, d);
            for score in [s.commit_frequency, s.contributor_diversity, s.code_churn, s.branch_management] {
                assert!((0.0..=100.0).contains(&score), "{score} out of bounds");
            }
        }
    }

    #[test]
    fn all_scores_above_eighty_are_excellent() {
        for base in [80.0, 85.0, 99.0, 100.0] {
            let s = HealthScores::from_parts(base, base + 1.0, base, base + 5.0);
            assert_eq!(s.overall, OverallHealth::Excellent);
        }
    }

    #[test]
    fn overall_is_monotonic_in_mean() {
        let ranks = |h: OverallHealth| match h {
            OverallHealth::Poor => 0,
            OverallHealth::Fair => 1,
            OverallHealth::Good => 2,
            OverallHealth::Excellent => 3,
        };
        let mut previous = 0;
        for step in 0..=100 {
            let rank = ranks(OverallHealth::from_mean(f64::from(step)));
            assert!(rank >= previous);
            previous = rank;
        }
    }
}
