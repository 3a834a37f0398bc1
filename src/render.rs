//! Text and Markdown rendering for the CLI.

use std::fmt::Write;

use vitals_advisor::suggestion::Suggestion;
use vitals_pulse::analysis::{AnalysisOutcome, AnalysisReport};

const TOP: usize = 10;

pub fn outcome_text(outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();
    let Some(report) = &outcome.report else {
        return out;
    };
    let meta = &outcome.metadata;
    let s = &report.summary;
    let h = &report.health;

    let _ = writeln!(
        out,
        "Repository health: {} (source: {}, branch: {})",
        h.overall,
        meta.source,
        meta.current_branch.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "{:-<72}", "");
    let _ = writeln!(out, "  Commit frequency:      {:>5.1}", h.commit_frequency);
    let _ = writeln!(out, "  Contributor diversity: {:>5.1}", h.contributor_diversity);
    let _ = writeln!(out, "  Code churn:            {:>5.1}", h.code_churn);
    let _ = writeln!(out, "  Branch management:     {:>5.1}", h.branch_management);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Commits: {}  Contributors: {}  Files: {}  +{} -{}",
        s.total_commits, s.contributors, s.files_touched, s.total_additions, s.total_deletions
    );
    let v = &report.velocity;
    let _ = writeln!(
        out,
        "Velocity: {:.1} commits/day, {:.1} lines/day over {} active days ({})",
        v.avg_commits_per_day, v.avg_lines_per_day, v.active_days, v.development_intensity
    );
    let _ = writeln!(out);

    if !report.hot_files.is_empty() {
        let _ = writeln!(out, "Hot files (top {TOP}):");
        let _ = writeln!(out, "{:-<72}", "");
        for (i, f) in report.hot_files.iter().take(TOP).enumerate() {
            let _ = writeln!(
                out,
                "{:>2}. {:<40} changes={}  freq={:.2}  authors={}  impact={}",
                i + 1,
                f.filename,
                f.changes,
                f.change_frequency,
                f.authors,
                f.impact,
            );
        }
        let _ = writeln!(out);
    }

    if !report.authors.is_empty() {
        let _ = writeln!(out, "Authors:");
        let _ = writeln!(out, "{:-<72}", "");
        for a in report.authors.iter().take(TOP) {
            let _ = writeln!(
                out,
                "  {:<30} commits={}  +{} -{}  productivity={}",
                a.name(),
                a.commits(),
                a.additions(),
                a.deletions(),
                a.productivity_score(),
            );
        }
        let _ = writeln!(out);
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "Recommendations:");
        for r in &report.recommendations {
            let _ = writeln!(out, "  - {r}");
        }
    }
    out
}

pub fn outcome_markdown(outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();
    let Some(report) = &outcome.report else {
        return out;
    };
    let _ = writeln!(out, "# Repository Health\n");
    let _ = writeln!(
        out,
        "**Overall:** {} | **Commits analyzed:** {} | **Source:** {}\n",
        report.health.overall, outcome.metadata.commits_analyzed, outcome.metadata.source
    );
    health_table(&mut out, report);

    let _ = writeln!(out, "## Hot Files\n");
    if report.hot_files.is_empty() {
        let _ = writeln!(out, "No files changed.\n");
    } else {
        let _ = writeln!(out, "| Rank | File | Changes | Frequency | Authors | Impact |");
        let _ = writeln!(out, "|------|------|---------|-----------|---------|--------|");
        for (i, f) in report.hot_files.iter().take(TOP).enumerate() {
            let _ = writeln!(
                out,
                "| {} | `{}` | {} | {:.2} | {} | {} |",
                i + 1,
                f.filename,
                f.changes,
                f.change_frequency,
                f.authors,
                f.impact,
            );
        }
        let _ = writeln!(out);
    }

    let risky: Vec<_> = report.code_churn.iter().take(TOP).collect();
    if !risky.is_empty() {
        let _ = writeln!(out, "## Code Churn\n");
        let _ = writeln!(out, "| File | Churn | Age (days) | Complexity | Risk |");
        let _ = writeln!(out, "|------|-------|------------|------------|------|");
        for c in risky {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} | {} | {} |",
                c.filename, c.churn, c.age, c.complexity, c.risk
            );
        }
        let _ = writeln!(out);
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "## Recommendations\n");
        for r in &report.recommendations {
            let _ = writeln!(out, "- {r}");
        }
    }
    out
}

fn health_table(out: &mut String, report: &AnalysisReport) {
    let h = &report.health;
    let _ = writeln!(out, "| Metric | Score |");
    let _ = writeln!(out, "|--------|-------|");
    let _ = writeln!(out, "| Commit frequency | {:.1} |", h.commit_frequency);
    let _ = writeln!(out, "| Contributor diversity | {:.1} |", h.contributor_diversity);
    let _ = writeln!(out, "| Code churn | {:.1} |", h.code_churn);
    let _ = writeln!(out, "| Branch management | {:.1} |", h.branch_management);
    let _ = writeln!(out);
}

pub fn suggestions_text(suggestions: &[Suggestion]) -> String {
    let mut out = String::new();
    if suggestions.is_empty() {
        let _ = writeln!(out, "No suggestions.");
        return out;
    }
    for (i, s) in suggestions.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {s}", i + 1);
        let _ = writeln!(out, "    {}", s.description);
        let _ = writeln!(
            out,
            "    current={:.1} target={:.1}  effort={}",
            s.metrics.current, s.metrics.target, s.effort
        );
        for step in &s.implementation {
            let _ = writeln!(out, "      - {step}");
        }
    }
    out
}

pub fn suggestions_markdown(suggestions: &[Suggestion]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Suggestions\n");
    if suggestions.is_empty() {
        let _ = writeln!(out, "No suggestions.");
        return out;
    }
    for s in suggestions {
        let _ = writeln!(out, "## {} `{}`\n", s.title, s.priority);
        let _ = writeln!(
            out,
            "**Category:** {} | **Confidence:** {:.0}% | **Effort:** {}\n",
            s.category,
            s.confidence * 100.0,
            s.effort
        );
        let _ = writeln!(out, "{}\n", s.description);
        let _ = writeln!(out, "**Impact:** {}\n", s.impact);
        for (i, step) in s.implementation.iter().enumerate() {
            let _ = writeln!(out, "{}. {step}", i + 1);
        }
        let _ = writeln!(
            out,
            "\n_Current {:.1}, target {:.1}: {}_\n",
            s.metrics.current, s.metrics.target, s.metrics.improvement
        );
    }
    out
}
