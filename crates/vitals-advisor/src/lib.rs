//! Prioritized improvement suggestions from repository analysis.
//!
//! Six rule groups (git health, dependencies, collaboration, performance,
//! security, quality) turn an [`vitals_pulse::analysis::AnalysisReport`] and
//! an optional [`vitals_core::DependencyReport`] into ranked
//! [`suggestion::Suggestion`] records.

pub mod engine;
pub mod rules;
pub mod suggestion;
