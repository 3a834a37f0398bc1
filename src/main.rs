mod render;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use vitals_advisor::engine::SuggestionEngine;
use vitals_advisor::suggestion::SuggestionContext;
use vitals_core::{DependencyReport, OutputFormat, VitalsConfig};
use vitals_pulse::analysis::{analyze, AnalysisOutcome};
use vitals_pulse::mining::{LiveSource, MiningOptions};
use vitals_pulse::source::{DataSource, FixtureSource};

#[derive(Parser)]
#[command(
    name = "vitals",
    version,
    about = "Repository health analytics",
    long_about = "Vitals reads a repository's commit history and reports hot files, churn,\n\
                   velocity, and commit habits, scores repository health, and ranks concrete\n\
                   improvement suggestions.\n\n\
                   Examples:\n  \
                     vitals analyze                      Analyze the repository in the current directory\n  \
                     vitals analyze --since 90           Only the last 90 days\n  \
                     vitals analyze --sample             Analyze built-in sample data\n  \
                     vitals suggest --deps audit.json    Include a dependency audit report\n  \
                     vitals init                         Create a .vitals.toml config file"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .vitals.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable summary (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct SourceArgs {
    /// Repository path (default: current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Read history from a JSON snapshot instead of a repository
    #[arg(long, conflicts_with = "sample")]
    fixture: Option<PathBuf>,

    /// Use the built-in sample history
    #[arg(long)]
    sample: bool,

    /// Time range in days (default: from config, 180)
    #[arg(long)]
    since: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze commit history and score repository health
    #[command(long_about = "Analyze commit history and score repository health.\n\n\
        Reports hot files, code churn and risk, development velocity, commit patterns,\n\
        per-author statistics, branch protection, four health sub-scores, and short\n\
        recommendations.\n\n\
        Examples:\n  vitals analyze --path .\n  vitals analyze --fixture history.json --format json")]
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Generate prioritized improvement suggestions
    #[command(long_about = "Generate prioritized improvement suggestions.\n\n\
        Runs the analysis, then six rule groups (git health, dependencies, collaboration,\n\
        performance, security, quality). Suggestions are ranked by priority and confidence,\n\
        then filtered by the confidence floor and category toggles from .vitals.toml.\n\n\
        Examples:\n  vitals suggest\n  vitals suggest --deps audit.json --min-confidence 0.8")]
    Suggest {
        #[command(flatten)]
        source: SourceArgs,

        /// Dependency audit report (JSON)
        #[arg(long)]
        deps: Option<PathBuf>,

        /// Override the minimum confidence (0.0 to 1.0)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Override the maximum number of suggestions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a default .vitals.toml configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# Vitals Configuration

[analysis]
# since_days = 180
# max_files_per_commit = 50
# hot_file_limit = 20
# peak_day_limit = 5
# protected_branches = ["main", "master"]

[suggestions]
# min_confidence = 0.5
# max_suggestions = 20

[suggestions.categories]
# security = true
# performance = true
# maintainability = true
# collaboration = true
# dependencies = true
# process = true
"#;

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<VitalsConfig> {
    let config = match path {
        Some(path) => VitalsConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".vitals.toml");
            if default_path.exists() {
                VitalsConfig::from_file(default_path)?
            } else {
                VitalsConfig::default()
            }
        }
    };
    Ok(config)
}

fn build_source(
    args: &SourceArgs,
    config: &VitalsConfig,
    now: DateTime<Utc>,
) -> Result<Box<dyn DataSource>> {
    if args.sample {
        return Ok(Box::new(FixtureSource::sample()));
    }
    if let Some(path) = &args.fixture {
        return Ok(Box::new(FixtureSource::from_file(path)?));
    }
    let mut options = MiningOptions::from_config(&config.analysis, now);
    if let Some(since) = args.since {
        options.since_days = since;
    }
    Ok(Box::new(LiveSource::new(&args.path, options)))
}

fn run_analysis(args: &SourceArgs, config: &VitalsConfig) -> Result<AnalysisOutcome> {
    let now = Utc::now();
    let source = build_source(args, config, now)?;

    let spinner = if std::io::stderr().is_terminal() {
        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
            pb.set_style(style);
        }
        pb.set_message(format!("Analyzing {} history...", source.kind()));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let outcome = analyze(source.as_ref(), &config.analysis, now);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if !outcome.success {
        let reason = outcome.error.unwrap_or_else(|| "unknown error".into());
        miette::bail!(miette::miette!(
            help = "Run vitals from inside a git repository, specify --path to one, or use --sample",
            "Analysis failed: {reason}"
        ));
    }
    log::info!("analyzed {} commits", outcome.metadata.commits_analyzed);
    Ok(outcome)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Analyze { ref source } => {
            let config = load_config(cli.config.as_deref())?;
            let outcome = run_analysis(source, &config)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&outcome).into_diagnostic()?);
                }
                OutputFormat::Markdown => print!("{}", render::outcome_markdown(&outcome)),
                OutputFormat::Text => print!("{}", render::outcome_text(&outcome)),
            }
        }
        Command::Suggest {
            ref source,
            ref deps,
            min_confidence,
            limit,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(floor) = min_confidence {
                config.suggestions.min_confidence = floor;
            }
            if let Some(limit) = limit {
                config.suggestions.max_suggestions = limit;
            }
            config.suggestions.validate()?;

            let deps = deps
                .as_deref()
                .map(DependencyReport::from_file)
                .transpose()?;

            let outcome = run_analysis(source, &config)?;
            let Some(report) = outcome.report.as_ref() else {
                miette::bail!("analysis produced no report");
            };

            let context = if source.sample || source.fixture.is_some() {
                None
            } else {
                Some(SuggestionContext::for_repository(
                    source.path.display().to_string(),
                ))
            };

            let engine = SuggestionEngine::new(config.suggestions.clone());
            let generated = engine.generate_suggestions(report, deps.as_ref(), context.as_ref());
            let suggestions = engine.filter_suggestions(generated);

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&suggestions).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => print!("{}", render::suggestions_markdown(&suggestions)),
                OutputFormat::Text => print!("{}", render::suggestions_text(&suggestions)),
            }
        }
        Command::Init => {
            let path = Path::new(".vitals.toml");
            if path.exists() {
                miette::bail!(".vitals.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .vitals.toml with default configuration");
        }
    }

    Ok(())
}
