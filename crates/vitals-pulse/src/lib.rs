//! Git history analysis: hot files, churn, velocity, and repository health.
//!
//! Reads commit history from a local repository (via git2) or a prepared
//! fixture, aggregates it in a single pass, and derives per-file risk,
//! cadence, commit habits, bounded health scores, and short advisories.

pub mod aggregate;
pub mod analysis;
pub mod health;
pub mod metrics;
pub mod mining;
pub mod recommend;
pub mod source;
