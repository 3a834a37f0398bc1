use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VitalsError;
use crate::types::Category;

/// Top-level configuration loaded from `.vitals.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use vitals_core::VitalsConfig;
///
/// let config = VitalsConfig::default();
/// assert_eq!(config.analysis.hot_file_limit, 20);
/// assert_eq!(config.suggestions.max_suggestions, 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsConfig {
    /// History and metric settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Suggestion engine settings.
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

impl VitalsConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Io`] if the file cannot be read,
    /// [`VitalsError::Toml`] if the content is not valid TOML, or
    /// [`VitalsError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vitals_core::VitalsConfig;
    /// use std::path::Path;
    ///
    /// let config = VitalsConfig::from_file(Path::new(".vitals.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, VitalsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Toml`] if parsing fails, or
    /// [`VitalsError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitals_core::VitalsConfig;
    ///
    /// let toml = r#"
    /// [suggestions]
    /// max_suggestions = 5
    /// "#;
    /// let config = VitalsConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.suggestions.max_suggestions, 5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, VitalsError> {
        let config: Self = toml::from_str(content)?;
        config.suggestions.validate()?;
        Ok(config)
    }
}

/// History mining and metric synthesis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Only read commits from the last N days (default: 180).
    #[serde(default = "default_since_days")]
    pub since_days: u64,
    /// Skip commits touching more files than this (default: 50).
    #[serde(default = "default_max_files_per_commit")]
    pub max_files_per_commit: usize,
    /// Hot files kept after ranking (default: 20).
    #[serde(default = "default_hot_file_limit")]
    pub hot_file_limit: usize,
    /// Peak development days reported (default: 5).
    #[serde(default = "default_peak_day_limit")]
    pub peak_day_limit: usize,
    /// Local branch names treated as protected.
    #[serde(default = "default_protected_branches")]
    pub protected_branches: Vec<String>,
}

fn default_since_days() -> u64 {
    180
}

fn default_max_files_per_commit() -> usize {
    50
}

fn default_hot_file_limit() -> usize {
    20
}

fn default_peak_day_limit() -> usize {
    5
}

fn default_protected_branches() -> Vec<String> {
    vec!["main".into(), "master".into()]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            since_days: default_since_days(),
            max_files_per_commit: default_max_files_per_commit(),
            hot_file_limit: default_hot_file_limit(),
            peak_day_limit: default_peak_day_limit(),
            protected_branches: default_protected_branches(),
        }
    }
}

/// Suggestion engine settings. Immutable once handed to an engine.
///
/// # Examples
///
/// ```
/// use vitals_core::SuggestionConfig;
///
/// let config = SuggestionConfig::default();
/// assert_eq!(config.min_confidence, 0.5);
/// assert!(config.categories.security);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Drop suggestions with a lower confidence (default: 0.5).
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Keep at most this many ranked suggestions (default: 20).
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Per-category switches.
    #[serde(default)]
    pub categories: CategoryToggles,
}

fn default_min_confidence() -> f64 {
    0.5
}

fn default_max_suggestions() -> usize {
    20
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_suggestions: default_max_suggestions(),
            categories: CategoryToggles::default(),
        }
    }
}

impl SuggestionConfig {
    /// Check that the confidence floor lies within `0..=1`.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Config`] for an out-of-range or NaN floor.
    pub fn validate(&self) -> Result<(), VitalsError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(VitalsError::Config(format!(
                "suggestions.min_confidence must be within 0..=1, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// On/off switch for each toggleable [`Category`].
///
/// # Examples
///
/// ```
/// use vitals_core::{Category, CategoryToggles};
///
/// let toggles = CategoryToggles { security: false, ..CategoryToggles::default() };
/// assert!(!toggles.allows(Category::Security));
/// assert!(toggles.allows(Category::Testing));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryToggles {
    /// Security suggestions.
    #[serde(default = "enabled")]
    pub security: bool,
    /// Performance suggestions.
    #[serde(default = "enabled")]
    pub performance: bool,
    /// Maintainability suggestions.
    #[serde(default = "enabled")]
    pub maintainability: bool,
    /// Collaboration suggestions.
    #[serde(default = "enabled")]
    pub collaboration: bool,
    /// Dependency suggestions.
    #[serde(default = "enabled")]
    pub dependencies: bool,
    /// Workflow and cadence suggestions.
    #[serde(default = "enabled")]
    pub process: bool,
}

fn enabled() -> bool {
    true
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            security: true,
            performance: true,
            maintainability: true,
            collaboration: true,
            dependencies: true,
            process: true,
        }
    }
}

impl CategoryToggles {
    /// Whether suggestions of `category` may be shown.
    ///
    /// Categories without a switch always pass.
    pub fn allows(&self, category: Category) -> bool {
        match category {
            Category::Security => self.security,
            Category::Performance => self.performance,
            Category::Maintainability => self.maintainability,
            Category::Collaboration => self.collaboration,
            Category::Dependencies => self.dependencies,
            Category::Process => self.process,
            Category::Testing | Category::Documentation => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = VitalsConfig::default();
        assert_eq!(config.analysis.since_days, 180);
        assert_eq!(config.analysis.max_files_per_commit, 50);
        assert_eq!(config.analysis.hot_file_limit, 20);
        assert_eq!(config.analysis.peak_day_limit, 5);
        assert_eq!(config.analysis.protected_branches, vec!["main", "master"]);
        assert_eq!(config.suggestions.min_confidence, 0.5);
        assert_eq!(config.suggestions.max_suggestions, 20);
        assert_eq!(config.suggestions.categories, CategoryToggles::default());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[analysis]
since_days = 90
protected_branches = ["trunk"]

[suggestions]
min_confidence = 0.75
max_suggestions = 3

[suggestions.categories]
collaboration = false
"#;
        let config = VitalsConfig::from_toml(toml).unwrap();
        assert_eq!(config.analysis.since_days, 90);
        assert_eq!(config.analysis.hot_file_limit, 20);
        assert_eq!(config.analysis.protected_branches, vec!["trunk"]);
        assert_eq!(config.suggestions.min_confidence, 0.75);
        assert_eq!(config.suggestions.max_suggestions, 3);
        assert!(!config.suggestions.categories.collaboration);
        assert!(config.suggestions.categories.security);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = VitalsConfig::from_toml("").unwrap();
        assert_eq!(config.suggestions.max_suggestions, 20);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(VitalsConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let result = VitalsConfig::from_toml("[suggestions]\nmin_confidence = 1.5\n");
        assert!(matches!(result, Err(VitalsError::Config(_))));
    }

    #[test]
    fn untoggled_categories_always_pass() {
        let all_off = CategoryToggles {
            security: false,
            performance: false,
            maintainability: false,
            collaboration: false,
            dependencies: false,
            process: false,
        };
        assert!(all_off.allows(Category::Testing));
        assert!(all_off.allows(Category::Documentation));
        assert!(!all_off.allows(Category::Process));
    }
}
