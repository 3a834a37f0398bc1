//! Local repository history via git2.
//!
//! Walks commits from HEAD (or a named branch), extracting per-file line
//! counts, author identity, and the author's timestamp with its UTC offset.
//! Local branches are reported with protection taken from configuration,
//! since plain git has no notion of protected branches.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use git2::{BranchType, DiffOptions, Repository, Sort};
use vitals_core::{
    AnalysisConfig, Author, Branch, CommitRecord, CommitStats, FileChange, HistorySnapshot,
    VitalsError,
};

use crate::source::{DataSource, SourceKind};

/// Options for history mining.
///
/// # Examples
///
/// ```
/// use vitals_pulse::mining::MiningOptions;
///
/// let opts = MiningOptions::default();
/// assert_eq!(opts.since_days, 180);
/// assert_eq!(opts.max_files_per_commit, 50);
/// ```
#[derive(Debug, Clone)]
pub struct MiningOptions {
    /// Only include commits from the last N days (default: 180).
    pub since_days: u64,
    /// Skip commits touching more files than this (default: 50).
    pub max_files_per_commit: usize,
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
    /// Branch names reported as protected.
    pub protected_branches: Vec<String>,
    /// Reference time the window is measured back from.
    pub now: DateTime<Utc>,
}

impl Default for MiningOptions {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default(), Utc::now())
    }
}

impl MiningOptions {
    /// Take window, commit-size cap, and protected names from configuration,
    /// measuring the window back from `now`.
    pub fn from_config(config: &AnalysisConfig, now: DateTime<Utc>) -> Self {
        Self {
            since_days: config.since_days,
            max_files_per_commit: config.max_files_per_commit,
            branch: None,
            protected_branches: config.protected_branches.clone(),
            now,
        }
    }
}

/// Reads history from a repository on disk.
///
/// # Examples
///
/// ```no_run
/// use vitals_pulse::mining::{LiveSource, MiningOptions};
/// use vitals_pulse::source::DataSource;
///
/// let source = LiveSource::new(".", MiningOptions::default());
/// let snapshot = source.fetch().unwrap();
/// println!("{} commits on {}", snapshot.commits.len(), snapshot.current_branch);
/// ```
#[derive(Debug, Clone)]
pub struct LiveSource {
    repo_path: PathBuf,
    options: MiningOptions,
}

impl LiveSource {
    /// Read the repository at `repo_path` with `options`.
    pub fn new(repo_path: impl Into<PathBuf>, options: MiningOptions) -> Self {
        Self {
            repo_path: repo_path.into(),
            options,
        }
    }
}

impl DataSource for LiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn fetch(&self) -> Result<HistorySnapshot, VitalsError> {
        let repo = Repository::discover(&self.repo_path)
            .map_err(|e| VitalsError::Git(format!("failed to open repository: {e}")))?;

        let commits = mine_history(&repo, &self.options)?;
        let branches = list_branches(&repo, &self.options.protected_branches)?;
        let current_branch = current_branch(&repo);

        log::debug!(
            "read {} commits and {} branches from {}",
            commits.len(),
            branches.len(),
            self.repo_path.display()
        );

        Ok(HistorySnapshot {
            commits,
            branches,
            current_branch,
        })
    }
}

/// Mine commit history, newest first.
///
/// The walk is ordered by commit time and ends at the first commit committed
/// more than `since_days` before `now`. Commits touching more than
/// `max_files_per_commit` files are skipped.
///
/// # Errors
///
/// Returns [`VitalsError::Git`] if the repository cannot be walked.
pub fn mine_history(
    repo: &Repository,
    options: &MiningOptions,
) -> Result<Vec<CommitRecord>, VitalsError> {
    let mut revwalk = repo
        .revwalk()
        .map_err(|e| VitalsError::Git(format!("failed to create revwalk: {e}")))?;

    revwalk.set_sorting(Sort::TIME).ok();

    if let Some(ref branch) = options.branch {
        let reference = repo
            .resolve_reference_from_short_name(branch)
            .map_err(|e| VitalsError::Git(format!("failed to resolve branch '{branch}': {e}")))?;
        let oid = reference
            .target()
            .ok_or_else(|| VitalsError::Git("branch has no target".into()))?;
        revwalk
            .push(oid)
            .map_err(|e| VitalsError::Git(format!("failed to push oid: {e}")))?;
    } else if revwalk.push_head().is_err() {
        // Unborn HEAD: a fresh repository has no history yet.
        log::warn!("repository has no commits on HEAD");
        return Ok(Vec::new());
    }

    let cutoff = compute_cutoff(options.now, options.since_days);
    let mut commits = Vec::new();

    for oid_result in revwalk {
        let oid = oid_result.map_err(|e| VitalsError::Git(format!("revwalk error: {e}")))?;

        let commit = repo
            .find_commit(oid)
            .map_err(|e| VitalsError::Git(format!("failed to find commit: {e}")))?;

        if commit.time().seconds() < cutoff {
            break;
        }

        let author = commit.author();
        let when = author.when();

        let files = extract_file_changes(repo, &commit)?;
        if files.len() > options.max_files_per_commit {
            log::debug!("skipping {oid}: {} files changed", files.len());
            continue;
        }

        let additions = files.iter().map(|f| f.additions).sum();
        let deletions = files.iter().map(|f| f.deletions).sum();
        let hash = oid.to_string();

        commits.push(CommitRecord {
            sha: hash[..hash.len().min(8)].to_string(),
            message: commit
                .summary()
                .unwrap_or("")
                .to_string(),
            author: Author::new(
                author.name().unwrap_or("unknown"),
                author.email().unwrap_or("unknown"),
            ),
            timestamp: to_datetime(when.seconds(), when.offset_minutes())?,
            files,
            stats: Some(CommitStats::new(additions, deletions)),
        });
    }

    Ok(commits)
}

fn compute_cutoff(now: DateTime<Utc>, since_days: u64) -> i64 {
    now.timestamp() - (since_days as i64 * 86400)
}

fn to_datetime(seconds: i64, offset_minutes: i32) -> Result<DateTime<FixedOffset>, VitalsError> {
    let offset = FixedOffset::east_opt(offset_minutes * 60)
        .ok_or_else(|| VitalsError::Git(format!("invalid UTC offset: {offset_minutes} minutes")))?;
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| VitalsError::Git(format!("invalid commit time: {seconds}")))?;
    Ok(utc.with_timezone(&offset))
}

fn extract_file_changes(
    repo: &Repository,
    commit: &git2::Commit,
) -> Result<Vec<FileChange>, VitalsError> {
    let commit_tree = commit
        .tree()
        .map_err(|e| VitalsError::Git(format!("failed to get commit tree: {e}")))?;

    let parent_tree = if commit.parent_count() > 0 {
        let parent = commit
            .parent(0)
            .map_err(|e| VitalsError::Git(format!("failed to get parent: {e}")))?;
        Some(
            parent
                .tree()
                .map_err(|e| VitalsError::Git(format!("failed to get parent tree: {e}")))?,
        )
    } else {
        None
    };

    let mut diff_opts = DiffOptions::new();
    let diff = repo
        .diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&commit_tree),
            Some(&mut diff_opts),
        )
        .map_err(|e| VitalsError::Git(format!("failed to compute diff: {e}")))?;

    // Paths in delta order, deleted files under their old path.
    let mut order: Vec<String> = Vec::new();
    let mut line_counts: HashMap<String, (u64, u64)> = HashMap::new();

    for delta in diff.deltas() {
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .unwrap_or(Path::new(""))
            .to_string_lossy()
            .to_string();
        if path.is_empty() || line_counts.contains_key(&path) {
            continue;
        }
        line_counts.insert(path.clone(), (0, 0));
        order.push(path);
    }

    diff.foreach(
        &mut |_delta, _progress| true,
        None,
        None,
        Some(&mut |delta, _hunk, line| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .unwrap_or(Path::new(""))
                .to_string_lossy()
                .to_string();

            let entry = line_counts.entry(path).or_insert((0, 0));
            match line.origin() {
                '+' => entry.0 += 1,
                '-' => entry.1 += 1,
                _ => {}
            }
            true
        }),
    )
    .map_err(|e| VitalsError::Git(format!("failed to iterate diff lines: {e}")))?;

    Ok(order
        .into_iter()
        .map(|path| {
            let (added, deleted) = line_counts.get(&path).copied().unwrap_or((0, 0));
            FileChange::new(path, added, deleted)
        })
        .collect())
}

/// Local branches, protected when their name is in `protected`.
///
/// # Errors
///
/// Returns [`VitalsError::Git`] if branches cannot be listed.
pub fn list_branches(repo: &Repository, protected: &[String]) -> Result<Vec<Branch>, VitalsError> {
    let iter = repo
        .branches(Some(BranchType::Local))
        .map_err(|e| VitalsError::Git(format!("failed to list branches: {e}")))?;

    let mut branches = Vec::new();
    for item in iter {
        let (branch, _) = item.map_err(|e| VitalsError::Git(format!("branch error: {e}")))?;
        let Some(name) = branch
            .name()
            .map_err(|e| VitalsError::Git(format!("branch name error: {e}")))?
        else {
            log::warn!("skipping branch with a non UTF-8 name");
            continue;
        };
        branches.push(Branch {
            name: name.to_string(),
            protected: protected.iter().any(|p| p == name),
        });
    }
    branches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(branches)
}

/// Short name of HEAD, or `main` when HEAD is detached or unborn.
pub fn current_branch(repo: &Repository) -> String {
    repo.head()
        .ok()
        .filter(|head| head.is_branch())
        .and_then(|head| head.shorthand().map(str::to_string))
        .unwrap_or_else(|| "main".into())
}
