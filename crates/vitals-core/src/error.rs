use std::path::PathBuf;

/// Errors that can occur across the Vitals workspace.
///
/// Library crates return this type directly; the binary converts it to a
/// `miette` report at the boundary.
///
/// # Examples
///
/// ```
/// use vitals_core::VitalsError;
///
/// let err = VitalsError::Config("min_confidence must be within 0..=1".into());
/// assert!(err.to_string().contains("min_confidence"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum VitalsError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(vitals::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(vitals::config), help("check the values in .vitals.toml"))]
    Config(String),

    /// Git operation failure while reading a local repository.
    #[error("git error: {0}")]
    #[diagnostic(code(vitals::git))]
    Git(String),

    /// A fixture file could not be used as a history snapshot.
    #[error("fixture error: {}: {reason}", .path.display())]
    #[diagnostic(code(vitals::fixture))]
    Fixture {
        /// Path of the offending fixture.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A metric fed to the rule engine was not a finite number.
    #[error("invalid metric `{name}`: {value}")]
    #[diagnostic(code(vitals::metric))]
    InvalidMetric {
        /// Metric name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(vitals::json))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(vitals::toml))]
    Toml(#[from] toml::de::Error),
}
