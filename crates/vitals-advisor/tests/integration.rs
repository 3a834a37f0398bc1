//! Integration test: history + dependency report → ranked suggestions.

use chrono::{DateTime, Duration, Utc};
use vitals_advisor::engine::SuggestionEngine;
use vitals_advisor::suggestion::SuggestionContext;
use vitals_core::{
    AnalysisConfig, Author, Category, CommitRecord, CommitStats, DependencyReport, FileChange,
    HistorySnapshot, Priority, SuggestionConfig,
};
use vitals_pulse::analysis::analyze_history;

fn now() -> DateTime<Utc> {
    "2024-06-01T00:00:00Z".parse().unwrap()
}

fn history(authors: &[(&str, usize)]) -> HistorySnapshot {
    let start: DateTime<Utc> = "2024-05-01T10:00:00Z".parse().unwrap();
    let mut commits = Vec::new();
    let mut n = 0i64;
    for (name, count) in authors {
        for _ in 0..*count {
            commits.push(CommitRecord {
                sha: format!("{n:08x}"),
                message: String::new(),
                author: Author::new(*name, format!("{name}@example.com")),
                timestamp: (start + Duration::minutes(n)).fixed_offset(),
                files: vec![FileChange::new(format!("src/file{}.rs", n % 7), 3, 1)],
                stats: Some(CommitStats::new(3, 1)),
            });
            n += 1;
        }
    }
    HistorySnapshot {
        commits,
        ..HistorySnapshot::default()
    }
}

#[test]
fn critical_vulnerability_surfaces_in_two_groups() {
    let report = analyze_history(&history(&[("a", 3)]), &AnalysisConfig::default(), now());
    let deps = DependencyReport::from_json(
        r#"{"vulnerabilities": [{"package": "openssl", "severity": "critical", "title": "RCE"}]}"#,
    )
    .unwrap();

    let engine = SuggestionEngine::new(SuggestionConfig::default());
    let out = engine.generate_suggestions(&report, Some(&deps), None);

    assert_eq!(out[0].id, "deps-critical-vulnerabilities");
    assert_eq!(out[0].category, Category::Security);
    assert_eq!(out[0].priority, Priority::Critical);
    assert!(out.iter().any(|s| s.id == "security-dependency-scanning"));
}

#[test]
fn dominant_author_gets_balance_suggestion() {
    let snapshot = history(&[("lead", 80), ("b", 10), ("c", 10)]);
    let report = analyze_history(&snapshot, &AnalysisConfig::default(), now());

    let engine = SuggestionEngine::new(SuggestionConfig::default());
    let context = SuggestionContext::for_repository("acme/api");
    let out = engine.generate_suggestions(&report, None, Some(&context));

    let balance = out
        .iter()
        .find(|s| s.title == "Balance contribution load")
        .expect("balance suggestion");
    assert!((balance.metrics.current - 80.0).abs() < 1e-9);
    assert_eq!(balance.metrics.target, 50.0);
    assert!(balance.description.contains("acme/api"));
}

#[test]
fn filtering_after_generation_is_stable() {
    let snapshot = history(&[("lead", 30), ("b", 2)]);
    let report = analyze_history(&snapshot, &AnalysisConfig::default(), now());
    let engine = SuggestionEngine::new(SuggestionConfig {
        min_confidence: 0.75,
        ..SuggestionConfig::default()
    });

    let generated = engine.generate_suggestions(&report, None, None);
    let filtered = engine.filter_suggestions(generated);
    assert!(filtered.iter().all(|s| s.confidence >= 0.75));
    assert_eq!(engine.filter_suggestions(filtered.clone()), filtered);

    let json = serde_json::to_value(&filtered).unwrap();
    assert!(json.as_array().is_some());
}
