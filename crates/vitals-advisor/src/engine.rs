//! Run every rule group, rank the results, and apply configured filters.

use std::cmp::Ordering;

use vitals_core::{DependencyReport, SuggestionConfig, VitalsError};
use vitals_pulse::analysis::AnalysisReport;

use crate::rules::RULE_GROUPS;
use crate::suggestion::{Suggestion, SuggestionContext};

/// Suggestion generator bound to one configuration.
///
/// # Examples
///
/// ```
/// use vitals_advisor::engine::SuggestionEngine;
/// use vitals_core::{AnalysisConfig, SuggestionConfig};
/// use vitals_pulse::analysis::analyze_history;
/// use vitals_pulse::source::{DataSource, FixtureSource};
///
/// let snapshot = FixtureSource::sample().fetch().unwrap();
/// let report = analyze_history(&snapshot, &AnalysisConfig::default(), chrono::Utc::now());
/// let engine = SuggestionEngine::new(SuggestionConfig::default());
/// let suggestions = engine.generate_suggestions(&report, None, None);
/// assert!(suggestions.len() <= 20);
/// ```
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    config: SuggestionConfig,
}

impl SuggestionEngine {
    /// Build an engine. The configuration cannot change afterwards.
    pub fn new(config: SuggestionConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Run all rule groups, rank, and truncate to `max_suggestions`.
    ///
    /// # Errors
    ///
    /// Returns the first rule group failure, typically
    /// [`VitalsError::InvalidMetric`].
    pub fn try_generate(
        &self,
        report: &AnalysisReport,
        deps: Option<&DependencyReport>,
        context: Option<&SuggestionContext>,
    ) -> Result<Vec<Suggestion>, VitalsError> {
        let mut suggestions = Vec::new();
        for (name, group) in RULE_GROUPS {
            let found = group(report, deps, context)?;
            log::debug!("{name} rules produced {} suggestion(s)", found.len());
            suggestions.extend(found);
        }

        rank(&mut suggestions);
        suggestions.truncate(self.config.max_suggestions);
        Ok(suggestions)
    }

    /// Like [`Self::try_generate`], but a failure is logged and yields an
    /// empty list.
    pub fn generate_suggestions(
        &self,
        report: &AnalysisReport,
        deps: Option<&DependencyReport>,
        context: Option<&SuggestionContext>,
    ) -> Vec<Suggestion> {
        match self.try_generate(report, deps, context) {
            Ok(suggestions) => suggestions,
            Err(e) => {
                log::error!("suggestion generation failed: {e}");
                Vec::new()
            }
        }
    }

    /// Drop suggestions below the confidence floor, then those in disabled
    /// categories. Order is preserved, so applying it twice changes nothing.
    pub fn filter_suggestions(&self, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        let before = suggestions.len();
        let kept: Vec<Suggestion> = suggestions
            .into_iter()
            .filter(|s| s.confidence >= self.config.min_confidence)
            .filter(|s| self.config.categories.allows(s.category))
            .collect();
        log::debug!("filtered {} of {before} suggestion(s)", before - kept.len());
        kept
    }
}

/// Stable sort: most urgent priority first, then highest confidence.
pub fn rank(suggestions: &mut [Suggestion]) {
    suggestions.sort_by(compare);
}

fn compare(a: &Suggestion, b: &Suggestion) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| b.confidence.total_cmp(&a.confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use vitals_core::{
        AnalysisConfig, Author, Category, CategoryToggles, CommitRecord, CommitStats, FileChange,
        HistorySnapshot, Priority,
    };
    use vitals_pulse::analysis::analyze_history;
    use vitals_pulse::source::{DataSource, FixtureSource};

    fn now() -> DateTime<Utc> {
        "2024-06-01T00:00:00Z".parse().unwrap()
    }

    fn sample_report() -> AnalysisReport {
        let snapshot = FixtureSource::sample().fetch().unwrap();
        analyze_history(&snapshot, &AnalysisConfig::default(), now())
    }

    fn s(id: &str, category: Category, priority: Priority, confidence: f64) -> Suggestion {
        Suggestion::new(id, category, priority, confidence)
    }

    #[test]
    fn rank_orders_by_priority_then_confidence() {
        let mut list = vec![
            s("a", Category::Process, Priority::Low, 0.9),
            s("b", Category::Process, Priority::Critical, 0.6),
            s("c", Category::Process, Priority::High, 0.7),
            s("d", Category::Process, Priority::High, 0.9),
            s("e", Category::Process, Priority::High, 0.7),
        ];
        rank(&mut list);
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "c", "e", "a"]);
    }

    #[test]
    fn generation_is_deterministic() {
        let engine = SuggestionEngine::new(SuggestionConfig::default());
        let report = sample_report();
        let a = engine.generate_suggestions(&report, None, None);
        let b = engine.generate_suggestions(&report, None, None);
        assert_eq!(a, b);
        for pair in a.windows(2) {
            assert_ne!(compare(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn truncates_to_max_suggestions() {
        let engine = SuggestionEngine::new(SuggestionConfig {
            max_suggestions: 1,
            ..SuggestionConfig::default()
        });
        let out = engine.generate_suggestions(&sample_report(), None, None);
        assert!(out.len() <= 1);
    }

    #[test]
    fn filter_applies_floor_and_toggles() {
        let engine = SuggestionEngine::new(SuggestionConfig {
            min_confidence: 0.7,
            categories: CategoryToggles {
                collaboration: false,
                ..CategoryToggles::default()
            },
            ..SuggestionConfig::default()
        });
        let list = vec![
            s("keep", Category::Security, Priority::High, 0.7),
            s("low", Category::Security, Priority::High, 0.69),
            s("off", Category::Collaboration, Priority::High, 0.9),
            s("docs", Category::Documentation, Priority::Low, 0.8),
        ];
        let once = engine.filter_suggestions(list);
        let ids: Vec<&str> = once.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["keep", "docs"]);

        let twice = engine.filter_suggestions(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn invalid_metric_yields_empty_list() {
        let commits = vec![CommitRecord {
            sha: String::new(),
            message: String::new(),
            author: Author::new("a", ""),
            timestamp: "2024-05-01T10:00:00Z".parse().unwrap(),
            files: vec![FileChange::new("a.rs", 1, 0)],
            stats: Some(CommitStats::new(1, 0)),
        }];
        let snapshot = HistorySnapshot {
            commits,
            ..HistorySnapshot::default()
        };
        let mut report = analyze_history(&snapshot, &AnalysisConfig::default(), now());
        report.health.commit_frequency = 10.0;
        report.velocity.avg_commits_per_day = f64::NAN;
        report.velocity.development_intensity = vitals_pulse::metrics::Intensity::VeryHigh;

        let engine = SuggestionEngine::new(SuggestionConfig::default());
        assert!(matches!(
            engine.try_generate(&report, None, None),
            Err(VitalsError::InvalidMetric { .. })
        ));
        assert!(engine.generate_suggestions(&report, None, None).is_empty());
    }
}
