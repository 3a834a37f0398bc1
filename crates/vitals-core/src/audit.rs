//! Dependency audit report consumed by the suggestion engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VitalsError;

/// How a dependency is used by the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Needed at runtime.
    Runtime,
    /// Only needed to build or test.
    Development,
    /// Expected to be provided by the consumer.
    Peer,
}

/// A declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name.
    pub name: String,
    /// Declared version requirement.
    #[serde(default)]
    pub version: String,
    /// Dependency kind.
    #[serde(rename = "type")]
    pub kind: DependencyKind,
}

/// Severity of a known vulnerability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VulnerabilitySeverity {
    /// Exploitable with severe impact.
    Critical,
    /// Serious, fix soon.
    High,
    /// Limited impact.
    Medium,
    /// Minor.
    Low,
}

/// A vulnerability affecting one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Affected package.
    #[serde(default)]
    pub package: String,
    /// Advisory severity.
    pub severity: VulnerabilitySeverity,
    /// Advisory title.
    #[serde(default)]
    pub title: String,
}

/// License compliance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compliance {
    /// Allowed.
    Ok,
    /// Allowed with caveats.
    Warning,
    /// Not allowed.
    Error,
}

/// License information for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Package name.
    #[serde(default)]
    pub package: String,
    /// SPDX identifier or free-form license name.
    #[serde(default)]
    pub license: String,
    /// Compliance verdict.
    pub compliance: Compliance,
}

impl License {
    /// `true` for `warning` and `error` verdicts.
    pub fn is_flagged(&self) -> bool {
        matches!(self.compliance, Compliance::Warning | Compliance::Error)
    }
}

/// Output of an external dependency audit.
///
/// # Examples
///
/// ```
/// use vitals_core::{DependencyReport, VulnerabilitySeverity};
///
/// let json = r#"{
///     "dependencies": [{"name": "left-pad", "version": "1.0.0", "type": "runtime"}],
///     "vulnerabilities": [{"package": "left-pad", "severity": "critical", "title": "RCE"}],
///     "licenses": [{"package": "left-pad", "license": "WTFPL", "compliance": "warning"}]
/// }"#;
/// let report = DependencyReport::from_json(json).unwrap();
/// assert_eq!(report.count_severity(VulnerabilitySeverity::Critical), 1);
/// assert_eq!(report.flagged_licenses().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Declared dependencies.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Known vulnerabilities.
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    /// License verdicts.
    #[serde(default)]
    pub licenses: Vec<License>,
}

impl DependencyReport {
    /// Parse a report from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Serialization`] if the JSON does not match.
    pub fn from_json(content: &str) -> Result<Self, VitalsError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a report from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Io`] if the file cannot be read, or
    /// [`VitalsError::Serialization`] if its content does not match.
    pub fn from_file(path: &Path) -> Result<Self, VitalsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Number of vulnerabilities with the given severity.
    pub fn count_severity(&self, severity: VulnerabilitySeverity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Licenses with a `warning` or `error` verdict.
    pub fn flagged_licenses(&self) -> impl Iterator<Item = &License> {
        self.licenses.iter().filter(|l| l.is_flagged())
    }
}
