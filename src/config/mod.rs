//! Clustering configuration.
//!
//! Configuration lives in `.taxoclust.toml`, discovered in the working
//! directory or one of its ancestors, or passed explicitly. Every field has a
//! default so an empty file (or no file) is a valid configuration.
//!
//! ```toml
//! [clustering]
//! method = "link"
//! threshold = 0.5
//! semantics = "distances"
//!
//! [link]
//! fuzzy = false
//!
//! [threshold_search]
//! strategy = "plateau"
//! fallback = 0.55
//! ```

mod loader;
mod sections;
pub mod validation;

pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from_path, parse_config,
    CONFIG_FILE_NAME,
};
pub use sections::{
    ClusteringSection, ConsensusSection, LinkSection, MarkovSection, ThresholdSearchSection,
};

use crate::consensus::ConsensusOptions;
use crate::errors::Result;
use crate::link::LinkOptions;
use crate::markov::{MclOptions, SelfLoops};
use crate::matrix::WeightTransform;
use crate::threshold::PlateauOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub clustering: ClusteringSection,

    #[serde(default)]
    pub markov: MarkovSection,

    #[serde(default)]
    pub link: LinkSection,

    #[serde(default)]
    pub consensus: ConsensusSection,

    #[serde(default)]
    pub threshold_search: ThresholdSearchSection,
}

impl ClusteringConfig {
    /// Reject out-of-range values, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    pub fn mcl_options(&self, threshold: f64) -> MclOptions {
        MclOptions {
            threshold: Some(threshold),
            max_steps: self.markov.max_steps,
            inflation: self.markov.inflation,
            expansion: self.markov.expansion,
            self_loops: if self.markov.self_loops {
                SelfLoops::Unit
            } else {
                SelfLoops::Keep
            },
            logs: WeightTransform::from_flag(self.markov.logs),
            semantics: self.clustering.semantics,
            tolerance: self.markov.tolerance,
        }
    }

    pub fn link_options(&self, threshold: f64) -> LinkOptions {
        LinkOptions {
            threshold,
            link_threshold: self.link.link_threshold,
            semantics: self.clustering.semantics,
            fuzzy: self.link.fuzzy,
        }
    }

    pub fn consensus_options(&self, threshold: f64) -> ConsensusOptions {
        ConsensusOptions {
            threshold,
            method: self.consensus.method,
        }
    }

    pub fn plateau_options(&self) -> PlateauOptions {
        PlateauOptions {
            thresholds: self.threshold_search.thresholds.clone(),
            log_weights: self.threshold_search.log_weights,
        }
    }
}
