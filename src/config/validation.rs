//! Range checks for configuration values.
//!
//! All problems are collected before reporting, so a user fixing a config
//! file sees every bad field in one run.

use super::ClusteringConfig;
use crate::errors::{ClusterError, Result};

/// A single out-of-range field
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn check_unit_interval(field: &'static str, value: f64, issues: &mut Vec<ConfigIssue>) {
    if !(0.0..=1.0).contains(&value) {
        issues.push(ConfigIssue::new(
            field,
            format!("must be within 0.0..=1.0, got {}", value),
        ));
    }
}

/// Every issue in `config`, in field order
pub fn collect_issues(config: &ClusteringConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if let Some(threshold) = config.clustering.threshold {
        if !threshold.is_finite() {
            issues.push(ConfigIssue::new("clustering.threshold", "must be finite"));
        }
    }

    let markov = &config.markov;
    if markov.max_steps == 0 {
        issues.push(ConfigIssue::new("markov.max_steps", "must be at least 1"));
    }
    if markov.expansion == 0 {
        issues.push(ConfigIssue::new("markov.expansion", "must be at least 1"));
    }
    if !(markov.inflation > 0.0) || !markov.inflation.is_finite() {
        issues.push(ConfigIssue::new(
            "markov.inflation",
            format!("must be a positive number, got {}", markov.inflation),
        ));
    }
    if !(markov.tolerance >= 0.0) {
        issues.push(ConfigIssue::new(
            "markov.tolerance",
            format!("must not be negative, got {}", markov.tolerance),
        ));
    }

    if let Some(link_threshold) = config.link.link_threshold {
        check_unit_interval("link.link_threshold", link_threshold, &mut issues);
    }

    let search = &config.threshold_search;
    if !(search.step > 0.0) {
        issues.push(ConfigIssue::new(
            "threshold_search.step",
            format!("must be positive, got {}", search.step),
        ));
    }
    if !(search.lo < search.hi) {
        issues.push(ConfigIssue::new(
            "threshold_search.lo",
            format!("must be below hi ({} >= {})", search.lo, search.hi),
        ));
    }
    if search.thresholds.is_empty() {
        issues.push(ConfigIssue::new("threshold_search.thresholds", "must not be empty"));
    }
    if !search.fallback.is_finite() {
        issues.push(ConfigIssue::new("threshold_search.fallback", "must be finite"));
    }

    issues
}

/// Fail with `InvalidParameter` naming the first bad field and listing all
pub fn validate_config(config: &ClusteringConfig) -> Result<()> {
    let issues = collect_issues(config);
    let Some(first) = issues.first() else {
        return Ok(());
    };

    let message = issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(ClusterError::invalid_parameter(first.field, message))
}
