//! Full-tree validation of zone content against a [`ZoneConfig`].
//!
//! [`validate`] walks every zone, then every global block-type rule, and
//! reports violations as data. `constraint` and `structure` issues are
//! errors and make the result invalid; `best-practice` and `performance`
//! issues are warnings and never do.
//!
//! [`ZoneConfig`]: crate::constraints::ZoneConfig

mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use validator::{validate, validate_with};

/// Zone id used for issues that are not attributable to one zone
pub const GLOBAL_ZONE_ID: &str = "global";

/// Block count above which a zone gets a performance warning
pub const DEFAULT_LARGE_ZONE_THRESHOLD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// Cardinality or type membership
    Constraint,
    /// Nesting
    Structure,
    BestPractice,
    Performance,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Constraint => "constraint",
            IssueKind::Structure => "structure",
            IssueKind::BestPractice => "best-practice",
            IssueKind::Performance => "performance",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneValidationError {
    pub zone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    pub kind: IssueKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneValidationWarning {
    pub zone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    pub kind: IssueKind,
    pub message: String,
}

/// Knobs for [`validate_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    pub large_zone_threshold: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            large_zone_threshold: DEFAULT_LARGE_ZONE_THRESHOLD,
        }
    }
}

/// Verdict of a full validation pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ZoneValidationError>,
    pub warnings: Vec<ZoneValidationWarning>,
}

impl ValidationResult {
    pub fn new(errors: Vec<ZoneValidationError>, warnings: Vec<ZoneValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn errors_for_zone<'a>(
        &'a self,
        zone_id: &'a str,
    ) -> impl Iterator<Item = &'a ZoneValidationError> {
        self.errors.iter().filter(move |e| e.zone_id == zone_id)
    }

    pub fn warnings_for_zone<'a>(
        &'a self,
        zone_id: &'a str,
    ) -> impl Iterator<Item = &'a ZoneValidationWarning> {
        self.warnings.iter().filter(move |w| w.zone_id == zone_id)
    }

    /// Plain-text listing, one issue per line, errors before warnings
    pub fn report(&self) -> String {
        let mut lines = vec![format!("valid: {}", self.valid)];
        for error in &self.errors {
            lines.push(issue_line(
                "error",
                error.kind,
                &error.zone_id,
                error.block_id.as_deref(),
                &error.message,
            ));
        }
        for warning in &self.warnings {
            lines.push(issue_line(
                "warning",
                warning.kind,
                &warning.zone_id,
                warning.block_id.as_deref(),
                &warning.message,
            ));
        }
        lines.join("\n")
    }
}

fn issue_line(
    severity: &str,
    kind: IssueKind,
    zone_id: &str,
    block_id: Option<&str>,
    message: &str,
) -> String {
    match block_id {
        Some(block_id) => format!("{severity} [{kind}] {zone_id}/{block_id}: {message}"),
        None => format!("{severity} [{kind}] {zone_id}: {message}"),
    }
}
