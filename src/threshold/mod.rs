//! Automatic cut-threshold search.
//!
//! Two independent strategies score thresholds on the same matrix:
//!
//! - **Density ratio** ([`best_threshold`]): evaluates the partition density
//!   of the cut graph over an arithmetic range and picks the threshold with
//!   the best density per merged component.
//! - **Plateau** ([`find_threshold`]): sweeps a descending sequence of
//!   thresholds, tracks the weighted average degree of the cut graph and
//!   returns the mean of the longest run where the degree does not drop.
//!
//! The plateau search may find nothing; that is reported as `None`, never as
//! an error.

mod density;
mod plateau;

pub use density::{best_threshold, partition_density, PartitionDensity, ThresholdRange};
pub use plateau::{default_thresholds, find_threshold, weighted_average_degree, PlateauOptions};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ClusterError;

/// Which search supplies a threshold when the caller has none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdStrategy {
    #[default]
    Density,
    Plateau,
}

impl fmt::Display for ThresholdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Density => f.write_str("density"),
            Self::Plateau => f.write_str("plateau"),
        }
    }
}

impl FromStr for ThresholdStrategy {
    type Err = ClusterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "density" => Ok(Self::Density),
            "plateau" => Ok(Self::Plateau),
            other => Err(ClusterError::invalid_parameter(
                "strategy",
                format!("unknown threshold strategy '{}'", other),
            )),
        }
    }
}
