//! The six rule groups.
//!
//! Every group inspects one slice of the analysis (plus the dependency
//! report where relevant) and returns zero or more suggestions. Ids,
//! categories, priorities, and confidences are fixed per rule; only the
//! metrics triple and the wording depend on the data.

use vitals_core::{Category, DependencyReport, Priority, VitalsError, VulnerabilitySeverity};
use vitals_pulse::analysis::AnalysisReport;
use vitals_pulse::metrics::{Impact, Intensity, Risk};

use crate::suggestion::{Suggestion, SuggestionContext};

/// Dependency count above which the footprint rule fires.
pub const MAX_DEPENDENCIES: usize = 50;

/// Complexity above which the complexity rule fires.
pub const COMPLEXITY_THRESHOLD: u32 = 80;

/// Signature shared by all rule groups.
pub type RuleGroup = fn(
    &AnalysisReport,
    Option<&DependencyReport>,
    Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, VitalsError>;

/// All groups in evaluation order.
pub const RULE_GROUPS: [(&str, RuleGroup); 6] = [
    ("git-health", git_health),
    ("dependency", dependency),
    ("collaboration", collaboration),
    ("performance", performance),
    ("security", security),
    ("quality", quality),
];

fn checked(suggestions: Vec<Suggestion>) -> Result<Vec<Suggestion>, VitalsError> {
    for s in &suggestions {
        s.validate()?;
    }
    Ok(suggestions)
}

/// Cadence, contributor breadth, hot files, and pace.
pub fn git_health(
    report: &AnalysisReport,
    _deps: Option<&DependencyReport>,
    context: Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, VitalsError> {
    let subject = SuggestionContext::subject(context);
    let health = &report.health;
    let mut out = Vec::new();

    if health.commit_frequency < 60.0 {
        out.push(
            Suggestion::new("git-commit-frequency", Category::Process, Priority::Medium, 0.8)
                .title("Increase commit frequency")
                .description(format!(
                    "Commits to {subject} land at {:.1} per active day; larger, rarer commits are harder to review and revert.",
                    report.velocity.avg_commits_per_day
                ))
                .impact("Smaller review units and easier bisecting", "low")
                .steps(&[
                    "Split work into self-contained commits",
                    "Commit at each passing test rather than at the end of a task",
                    "Use feature flags to merge incomplete work safely",
                ])
                .measure(health.commit_frequency, 80.0, "Frequency score from current to 80"),
        );
    }

    if health.contributor_diversity < 70.0 {
        out.push(
            Suggestion::new(
                "git-contributor-diversity",
                Category::Collaboration,
                Priority::Medium,
                0.75,
            )
            .title("Broaden the contributor base")
            .description(format!(
                "Only {} people contributed to {subject} in the analysed window.",
                report.summary.contributors
            ))
            .impact("Lower bus factor and fresher review perspectives", "medium")
            .steps(&[
                "Pair new contributors with experienced maintainers",
                "Label approachable issues for first-time contributors",
                "Rotate ownership of recurring tasks",
            ])
            .measure(health.contributor_diversity, 80.0, "Diversity score to 80"),
        );
    }

    let critical: Vec<&str> = report
        .hot_files
        .iter()
        .filter(|f| f.impact == Impact::Critical)
        .map(|f| f.filename.as_str())
        .collect();
    if !critical.is_empty() {
        let listed: Vec<&str> = critical.iter().take(3).copied().collect();
        out.push(
            Suggestion::new(
                "git-refactor-hot-files",
                Category::Maintainability,
                Priority::High,
                0.85,
            )
            .title("Refactor critical hot files")
            .description(format!(
                "{} file(s) change far more often than the rest: {}.",
                critical.len(),
                listed.join(", ")
            ))
            .impact("Fewer merge conflicts and less regression risk", "high")
            .steps(&[
                "Identify the responsibilities mixed in each hot file",
                "Extract stable parts into separate modules",
                "Add tests around the extracted seams",
            ])
            .measure(critical.len() as f64, 0.0, "No files at critical impact"),
        );
    }

    if report.velocity.development_intensity == Intensity::VeryHigh {
        out.push(
            Suggestion::new("git-sustainable-pace", Category::Process, Priority::Medium, 0.7)
                .title("Sustain a manageable pace")
                .description(format!(
                    "Development intensity is very high at {:.1} commits per active day.",
                    report.velocity.avg_commits_per_day
                ))
                .impact("Steadier quality and less reviewer fatigue", "medium")
                .steps(&[
                    "Strengthen automated tests in CI",
                    "Require review on every merge",
                    "Watch for burnout signals in the team",
                ])
                .measure(report.velocity.avg_commits_per_day, 10.0, "Commits per day to 10"),
        );
    }

    checked(out)
}

/// Vulnerabilities, licenses, and dependency count. Silent without a report.
pub fn dependency(
    _report: &AnalysisReport,
    deps: Option<&DependencyReport>,
    _context: Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, VitalsError> {
    let Some(deps) = deps else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();

    let critical = deps.count_severity(VulnerabilitySeverity::Critical);
    if critical > 0 {
        out.push(
            Suggestion::new(
                "deps-critical-vulnerabilities",
                Category::Security,
                Priority::Critical,
                0.95,
            )
            .title("Patch critical vulnerabilities")
            .description(format!(
                "{critical} dependency vulnerability(ies) rated critical."
            ))
            .impact("Closes actively exploitable holes", "medium")
            .steps(&[
                "Upgrade affected packages to patched versions",
                "Replace packages without a fix",
                "Redeploy and verify",
            ])
            .measure(critical as f64, 0.0, "Zero critical vulnerabilities"),
        );
    }

    let high = deps.count_severity(VulnerabilitySeverity::High);
    if high > 0 {
        out.push(
            Suggestion::new(
                "deps-high-vulnerabilities",
                Category::Security,
                Priority::High,
                0.9,
            )
            .title("Fix high-severity vulnerabilities")
            .description(format!("{high} dependency vulnerability(ies) rated high."))
            .impact("Reduces attack surface", "medium")
            .steps(&[
                "Review advisories for each affected package",
                "Schedule upgrades within the current iteration",
            ])
            .measure(high as f64, 0.0, "Zero high vulnerabilities"),
        );
    }

    let flagged: Vec<&str> = deps
        .flagged_licenses()
        .map(|l| l.package.as_str())
        .collect();
    if !flagged.is_empty() {
        out.push(
            Suggestion::new(
                "deps-license-compliance",
                Category::Dependencies,
                Priority::Medium,
                0.8,
            )
            .title("Resolve license compliance issues")
            .description(format!(
                "{} package(s) carry licenses flagged for review: {}.",
                flagged.len(),
                flagged.join(", ")
            ))
            .impact("Avoids legal exposure on distribution", "low")
            .steps(&[
                "Confirm each flagged license with legal guidance",
                "Swap packages whose license is incompatible",
            ])
            .measure(flagged.len() as f64, 0.0, "No flagged licenses"),
        );
    }

    let count = deps.dependencies.len();
    if count > MAX_DEPENDENCIES {
        out.push(
            Suggestion::new(
                "deps-reduce-footprint",
                Category::Dependencies,
                Priority::Low,
                0.6,
            )
            .title("Reduce dependency footprint")
            .description(format!("The project declares {count} dependencies."))
            .impact("Smaller supply chain and faster builds", "medium")
            .steps(&[
                "Remove unused dependencies",
                "Consolidate packages with overlapping features",
            ])
            .measure(count as f64, MAX_DEPENDENCIES as f64, "Dependencies to 50 or fewer"),
        );
    }

    checked(out)
}

/// Contribution concentration and working hours.
pub fn collaboration(
    report: &AnalysisReport,
    _deps: Option<&DependencyReport>,
    context: Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, VitalsError> {
    let mut out = Vec::new();
    let total = report.summary.total_commits;

    if let Some((author, commits)) = report.patterns.top_author() {
        let share = if total == 0 {
            0.0
        } else {
            f64::from(commits) / total as f64 * 100.0
        };
        if share > 50.0 {
            out.push(
                Suggestion::new(
                    "collab-balance-contributions",
                    Category::Collaboration,
                    Priority::High,
                    0.8,
                )
                .title("Balance contribution load")
                .description(format!(
                    "{author} authored {share:.0}% of the commits to {}.",
                    SuggestionContext::subject(context)
                ))
                .impact("Knowledge spreads and the bus factor rises", "medium")
                .steps(&[
                    "Pair the top contributor with others on core areas",
                    "Document the areas only one person knows",
                    "Distribute review duties",
                ])
                .measure(share, 50.0, "No single author above half of commits"),
            );
        }
    }

    let busiest = report.patterns.busiest_hours(3);
    let off_hours: Vec<u32> = busiest
        .iter()
        .copied()
        .filter(|h| *h < 9 || *h > 17)
        .collect();
    if !off_hours.is_empty() {
        let hours: Vec<String> = off_hours.iter().map(|h| format!("{h:02}:00")).collect();
        out.push(
            Suggestion::new(
                "collab-working-hours",
                Category::Collaboration,
                Priority::Low,
                0.6,
            )
            .title("Review working-hour patterns")
            .description(format!(
                "Peak commit hours fall outside 09:00 to 18:00: {}.",
                hours.join(", ")
            ))
            .impact("Sustainable schedules and better overlap for reviews", "low")
            .steps(&[
                "Check whether off-hours work is voluntary",
                "Agree on core collaboration hours",
            ])
            .measure(off_hours.len() as f64, 0.0, "Busiest hours within the working day"),
        );
    }

    checked(out)
}

/// High-risk and overly complex files.
pub fn performance(
    report: &AnalysisReport,
    _deps: Option<&DependencyReport>,
    _context: Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, VitalsError> {
    let mut out = Vec::new();

    let risky: Vec<&str> = report
        .code_churn
        .iter()
        .filter(|c| c.risk == Risk::High)
        .map(|c| c.filename.as_str())
        .collect();
    if !risky.is_empty() {
        let listed: Vec<&str> = risky.iter().take(3).copied().collect();
        out.push(
            Suggestion::new(
                "perf-high-risk-files",
                Category::Performance,
                Priority::High,
                0.75,
            )
            .title("Stabilize high-risk files")
            .description(format!(
                "{} file(s) combine frequent, recent, and heavy rewrites: {}.",
                risky.len(),
                listed.join(", ")
            ))
            .impact("Fewer regressions in the most active code", "high")
            .steps(&[
                "Profile and benchmark the riskiest files",
                "Add regression tests before further changes",
                "Split large files along clear boundaries",
            ])
            .measure(risky.len() as f64, 0.0, "No files at high risk"),
        );
    }

    let max_complexity = report
        .code_churn
        .iter()
        .map(|c| c.complexity)
        .max()
        .unwrap_or(0);
    if max_complexity > COMPLEXITY_THRESHOLD {
        out.push(
            Suggestion::new(
                "perf-reduce-complexity",
                Category::Performance,
                Priority::Medium,
                0.7,
            )
            .title("Reduce change complexity")
            .description(format!(
                "The most rewritten file reaches a complexity of {max_complexity}."
            ))
            .impact("Simpler changes and cheaper reviews", "medium")
            .steps(&[
                "Break long functions into smaller units",
                "Stop rewriting code that could be extended instead",
            ])
            .measure(f64::from(max_complexity), 60.0, "Peak complexity to 60"),
        );
    }

    checked(out)
}

/// Vulnerability scanning and branch protection.
pub fn security(
    report: &AnalysisReport,
    deps: Option<&DependencyReport>,
    _context: Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, VitalsError> {
    let mut out = Vec::new();

    if let Some(deps) = deps.filter(|d| !d.vulnerabilities.is_empty()) {
        out.push(
            Suggestion::new(
                "security-dependency-scanning",
                Category::Security,
                Priority::High,
                0.85,
            )
            .title("Automate dependency scanning")
            .description(format!(
                "{} known vulnerability(ies) reached the dependency tree.",
                deps.vulnerabilities.len()
            ))
            .impact("New advisories are caught before release", "low")
            .steps(&[
                "Run a vulnerability audit in CI on every pull request",
                "Enable automated dependency update pull requests",
                "Fail builds on critical findings",
            ])
            .measure(
                deps.vulnerabilities.len() as f64,
                0.0,
                "Zero known vulnerabilities",
            ),
        );
    }

    if let Some(ratio) = report.branches.protection_ratio() {
        if ratio < 0.5 {
            out.push(
                Suggestion::new(
                    "security-branch-protection",
                    Category::Security,
                    Priority::High,
                    0.8,
                )
                .title("Protect important branches")
                .description(format!(
                    "{} of {} branches are protected.",
                    report.branches.protected, report.branches.total
                ))
                .impact("No unreviewed changes reach release branches", "low")
                .steps(&[
                    "Require pull request reviews on primary branches",
                    "Require passing status checks before merge",
                    "Disallow force pushes",
                ])
                .measure(ratio * 100.0, 100.0, "All primary branches protected"),
            );
        }
    }

    checked(out)
}

/// Churn and commit-size habits.
pub fn quality(
    report: &AnalysisReport,
    _deps: Option<&DependencyReport>,
    _context: Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, VitalsError> {
    let mut out = Vec::new();

    if report.health.code_churn < 60.0 {
        out.push(
            Suggestion::new(
                "quality-reduce-churn",
                Category::Maintainability,
                Priority::Medium,
                0.7,
            )
            .title("Reduce code churn")
            .description("Files are rewritten heavily between commits.")
            .impact("More stable code and clearer history", "medium")
            .steps(&[
                "Agree on designs before implementation",
                "Review the files with the highest churn for unclear ownership",
            ])
            .measure(report.health.code_churn, 75.0, "Churn score to 75"),
        );
    }

    let sizes = report.patterns.commit_sizes;
    let big = sizes.large + sizes.huge;
    if f64::from(big) > f64::from(sizes.small) * 0.5 {
        let total = sizes.total();
        let share = if total == 0 {
            0.0
        } else {
            f64::from(big) / f64::from(total) * 100.0
        };
        out.push(
            Suggestion::new(
                "quality-smaller-commits",
                Category::Process,
                Priority::Medium,
                0.75,
            )
            .title("Make smaller commits")
            .description(format!(
                "{big} of {total} commits change more than 50 lines."
            ))
            .impact("Faster, more thorough reviews", "low")
            .steps(&[
                "Commit one logical change at a time",
                "Separate refactors from behavior changes",
            ])
            .measure(share, 33.0, "Large commits to a third or less"),
        );
    }

    checked(out)
}
