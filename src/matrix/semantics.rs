//! Matrix semantics and score-to-weight transforms.

use crate::errors::ClusterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the scores of a matrix are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixSemantics {
    /// Lower is closer; a pair is linked when its score is below the threshold
    #[default]
    Distances,
    /// Higher is closer; a pair is linked when its score is above the threshold
    Similarities,
    /// Distances that always carry a transformed edge weight
    Weights,
}

impl MatrixSemantics {
    /// Edge predicate for a raw score under this semantics
    pub fn includes(&self, score: f64, threshold: f64) -> bool {
        match self {
            Self::Distances | Self::Weights => score < threshold,
            Self::Similarities => score > threshold,
        }
    }

    /// Default log transform: `-log2((1-w)^2)` for distance-like scores,
    /// `-ln(w^2)` for similarities.
    pub fn default_weight(&self, score: f64) -> f64 {
        match self {
            Self::Distances | Self::Weights => -((1.0 - score).powi(2)).log2(),
            Self::Similarities => -(score.powi(2)).ln(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distances => "distances",
            Self::Similarities => "similarities",
            Self::Weights => "weights",
        }
    }
}

impl fmt::Display for MatrixSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatrixSemantics {
    type Err = ClusterError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "distances" => Ok(Self::Distances),
            "similarities" => Ok(Self::Similarities),
            "weights" => Ok(Self::Weights),
            _ => Err(ClusterError::InvalidSemantics(tag.to_string())),
        }
    }
}

/// Transform applied to a surviving score to obtain an edge weight
#[derive(Clone, Default)]
pub enum WeightTransform {
    /// The semantics' default log transform
    #[default]
    SemanticDefault,
    /// Keep the raw score
    Identity,
    /// Caller-supplied transform
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl WeightTransform {
    pub fn custom(transform: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(transform))
    }

    /// Map `logs = true/false` onto a transform
    pub fn from_flag(logs: bool) -> Self {
        if logs {
            Self::SemanticDefault
        } else {
            Self::Identity
        }
    }

    pub fn apply(&self, semantics: MatrixSemantics, score: f64) -> f64 {
        match self {
            Self::SemanticDefault => semantics.default_weight(score),
            Self::Identity => score,
            Self::Custom(transform) => transform(score),
        }
    }
}

impl fmt::Debug for WeightTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SemanticDefault => f.write_str("SemanticDefault"),
            Self::Identity => f.write_str("Identity"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
