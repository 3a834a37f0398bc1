//! Short advisory strings triggered by health and metric thresholds.
//!
//! Each rule fires independently; output order follows rule order.

use crate::health::HealthScores;
use crate::metrics::{DevelopmentVelocity, HotFile, Impact, Intensity};

/// Produce the free-text recommendations for one analysis.
///
/// # Examples
///
/// ```
/// use vitals_pulse::health::HealthScores;
/// use vitals_pulse::recommend::recommendations;
/// use vitals_pulse::metrics::{DevelopmentVelocity, Intensity};
///
/// let health = HealthScores::from_parts(100.0, 100.0, 100.0, 100.0);
/// let velocity = DevelopmentVelocity {
///     avg_commits_per_day: 6.0,
///     avg_lines_per_day: 120.0,
///     avg_commits_per_contributor: 3.0,
///     active_days: 10,
///     contributors: 5,
///     development_intensity: Intensity::Medium,
///     peak_days: vec![],
/// };
/// assert!(recommendations(&health, &[], &velocity).is_empty());
/// ```
pub fn recommendations(
    health: &HealthScores,
    hot_files: &[HotFile],
    velocity: &DevelopmentVelocity,
) -> Vec<String> {
    let mut out = Vec::new();

    if health.commit_frequency < 50.0 {
        out.push(
            "Commit more frequently: smaller, regular commits keep changes reviewable and history bisectable."
                .to_string(),
        );
    }

    if health.contributor_diversity < 60.0 {
        out.push(
            "Broaden the contributor base: pair on changes and rotate ownership to reduce knowledge silos."
                .to_string(),
        );
    }

    if health.code_churn < 50.0 {
        out.push(
            "High code churn detected: refactor files that are repeatedly rewritten and clarify their responsibilities."
                .to_string(),
        );
    }

    let critical: Vec<&str> = hot_files
        .iter()
        .filter(|f| f.impact == Impact::Critical)
        .take(3)
        .map(|f| f.filename.as_str())
        .collect();
    if !critical.is_empty() {
        out.push(format!(
            "Refactor critical hot files to reduce change pressure: {}.",
            critical.join(", ")
        ));
    }

    if velocity.development_intensity == Intensity::VeryHigh {
        out.push(
            "Development intensity is very high: strengthen automated testing and code review to keep quality up."
                .to_string(),
        );
    }

    if health.branch_management < 70.0 {
        out.push(
            "Protect primary branches: require reviews and passing checks before merging.".to_string(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn velocity(intensity: Intensity) -> DevelopmentVelocity {
        DevelopmentVelocity {
            avg_commits_per_day: 1.0,
            avg_lines_per_day: 10.0,
            avg_commits_per_contributor: 1.0,
            active_days: 1,
            contributors: 1,
            development_intensity: intensity,
            peak_days: Vec::new(),
        }
    }

    fn hot(name: &str, impact: Impact) -> HotFile {
        HotFile {
            filename: name.into(),
            changes: 60,
            additions: 10,
            deletions: 10,
            authors: 1,
            last_modified: "2024-01-01T00:00:00Z".parse().unwrap(),
            change_frequency: 6.0,
            impact,
        }
    }

    #[test]
    fn every_rule_fires_in_order() {
        let health = HealthScores::from_parts(10.0, 20.0, 30.0, 40.0);
        let files = vec![
            hot("a.rs", Impact::Critical),
            hot("b.rs", Impact::High),
            hot("c.rs", Impact::Critical),
            hot("d.rs", Impact::Critical),
            hot("e.rs", Impact::Critical),
        ];
        let recs = recommendations(&health, &files, &velocity(Intensity::VeryHigh));
        assert_eq!(recs.len(), 6);
        assert!(recs[0].starts_with("Commit more frequently"));
        assert!(recs[1].starts_with("Broaden the contributor base"));
        assert!(recs[2].starts_with("High code churn"));
        assert!(recs[3].contains("a.rs, c.rs, d.rs"));
        assert!(!recs[3].contains("e.rs"));
        assert!(recs[4].contains("very high"));
        assert!(recs[5].starts_with("Protect primary branches"));
    }

    #[test]
    fn thresholds_are_strict() {
        let health = HealthScores::from_parts(50.0, 60.0, 50.0, 70.0);
        let recs = recommendations(&health, &[hot("a.rs", Impact::High)], &velocity(Intensity::High));
        assert!(recs.is_empty(), "unexpected: {recs:?}");
    }
}
