//! Core types, configuration, and error handling for Vitals.
//!
//! This crate provides the shared foundation used by the other Vitals crates:
//! - [`VitalsError`]: unified error type using `thiserror` and `miette`
//! - [`VitalsConfig`]: configuration loaded from `.vitals.toml`
//! - History input: [`CommitRecord`], [`FileChange`], [`Branch`], [`HistorySnapshot`]
//! - Dependency audit input: [`DependencyReport`]
//! - Suggestion vocabulary: [`Priority`], [`Category`]

mod audit;
mod config;
mod error;
mod types;

pub use audit::{
    Compliance, Dependency, DependencyKind, DependencyReport, License, Vulnerability,
    VulnerabilitySeverity,
};
pub use config::{AnalysisConfig, CategoryToggles, SuggestionConfig, VitalsConfig};
pub use error::VitalsError;
pub use types::{
    Author, Branch, Category, CommitRecord, CommitStats, FileChange, HistorySnapshot, OutputFormat,
    Priority,
};

/// A convenience `Result` type for Vitals operations.
pub type Result<T> = std::result::Result<T, VitalsError>;
