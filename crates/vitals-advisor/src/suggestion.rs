//! Structured suggestion records.

use std::fmt;

use serde::{Deserialize, Serialize};
use vitals_core::{Category, Priority, VitalsError};

/// Where a metric stands and where it should be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionMetrics {
    /// Observed value.
    pub current: f64,
    /// Value to aim for.
    pub target: f64,
    /// Expected gain, in words.
    pub improvement: String,
}

/// One actionable improvement.
///
/// # Examples
///
/// ```
/// use vitals_advisor::suggestion::Suggestion;
/// use vitals_core::{Category, Priority};
///
/// let s = Suggestion::new("demo", Category::Process, Priority::Low, 0.6)
///     .title("Demo")
///     .measure(1.0, 2.0, "double it");
/// assert_eq!(s.metrics.target, 2.0);
/// assert!(s.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Stable identifier of the rule that produced it.
    pub id: String,
    /// Area it belongs to.
    pub category: Category,
    /// Urgency.
    pub priority: Priority,
    /// Certainty within `0..=1`.
    pub confidence: f64,
    /// Short headline.
    pub title: String,
    /// What was observed.
    pub description: String,
    /// What fixing it changes.
    pub impact: String,
    /// Rough cost of the fix.
    pub effort: String,
    /// Ordered steps.
    pub implementation: Vec<String>,
    /// Before/after figures.
    pub metrics: SuggestionMetrics,
}

impl Suggestion {
    /// Start a suggestion with empty text and zeroed metrics.
    pub fn new(id: &str, category: Category, priority: Priority, confidence: f64) -> Self {
        Self {
            id: id.to_string(),
            category,
            priority,
            confidence,
            title: String::new(),
            description: String::new(),
            impact: String::new(),
            effort: String::new(),
            implementation: Vec::new(),
            metrics: SuggestionMetrics {
                current: 0.0,
                target: 0.0,
                improvement: String::new(),
            },
        }
    }

    /// Set the headline.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the observation.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set impact and effort.
    pub fn impact(mut self, impact: impl Into<String>, effort: impl Into<String>) -> Self {
        self.impact = impact.into();
        self.effort = effort.into();
        self
    }

    /// Set the implementation steps.
    pub fn steps(mut self, steps: &[&str]) -> Self {
        self.implementation = steps.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the metrics triple.
    pub fn measure(mut self, current: f64, target: f64, improvement: impl Into<String>) -> Self {
        self.metrics = SuggestionMetrics {
            current,
            target,
            improvement: improvement.into(),
        };
        self
    }

    /// Reject non-finite metrics and out-of-range confidence.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::InvalidMetric`] naming the offending field.
    pub fn validate(&self) -> Result<(), VitalsError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(VitalsError::InvalidMetric {
                name: "confidence",
                value: self.confidence,
            });
        }
        if !self.metrics.current.is_finite() {
            return Err(VitalsError::InvalidMetric {
                name: "metrics.current",
                value: self.metrics.current,
            });
        }
        if !self.metrics.target.is_finite() {
            return Err(VitalsError::InvalidMetric {
                name: "metrics.target",
                value: self.metrics.target,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}, confidence {:.0}%)",
            self.priority,
            self.title,
            self.category,
            self.confidence * 100.0
        )
    }
}

/// Optional facts about the repository being advised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionContext {
    /// Repository name or path, echoed into descriptions.
    #[serde(default)]
    pub repository: Option<String>,
}

impl SuggestionContext {
    /// Context naming `repository`.
    pub fn for_repository(repository: impl Into<String>) -> Self {
        Self {
            repository: Some(repository.into()),
        }
    }

    pub(crate) fn subject(context: Option<&Self>) -> String {
        context
            .and_then(|c| c.repository.as_deref())
            .map_or_else(|| "this repository".to_string(), |r| format!("`{r}`"))
    }
}
