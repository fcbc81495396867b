use serde::{Deserialize, Serialize};

use crate::consensus::ConsensusMethod;
use crate::engine::ClusterMethod;
use crate::groups::DEFAULT_GROUP_PREFIX;
use crate::matrix::MatrixSemantics;
use crate::threshold::{default_thresholds, ThresholdRange, ThresholdStrategy};

/// `[clustering]`: which method runs and how the matrix is read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringSection {
    #[serde(default)]
    pub method: ClusterMethod,

    /// Explicit cut; when absent the threshold search supplies one
    #[serde(default)]
    pub threshold: Option<f64>,

    #[serde(default)]
    pub semantics: MatrixSemantics,

    #[serde(default = "default_group_prefix")]
    pub group_prefix: String,
}

impl Default for ClusteringSection {
    fn default() -> Self {
        Self {
            method: ClusterMethod::default(),
            threshold: None,
            semantics: MatrixSemantics::default(),
            group_prefix: default_group_prefix(),
        }
    }
}

fn default_group_prefix() -> String {
    DEFAULT_GROUP_PREFIX.to_string()
}

/// `[markov]`: MCL parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkovSection {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    #[serde(default = "default_inflation")]
    pub inflation: f64,

    #[serde(default = "default_expansion")]
    pub expansion: u32,

    /// Unit self loops; `false` keeps the diagonal
    #[serde(default = "default_true")]
    pub self_loops: bool,

    /// Log-transform surviving scores; `false` keeps raw scores
    #[serde(default = "default_true")]
    pub logs: bool,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for MarkovSection {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            inflation: default_inflation(),
            expansion: default_expansion(),
            self_loops: default_true(),
            logs: default_true(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_max_steps() -> usize {
    1000
}
fn default_inflation() -> f64 {
    2.0
}
fn default_expansion() -> u32 {
    2
}
fn default_tolerance() -> f64 {
    1e-9
}
fn default_true() -> bool {
    true
}

/// `[link]`: link clustering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSection {
    #[serde(default)]
    pub link_threshold: Option<f64>,

    #[serde(default = "default_true")]
    pub fuzzy: bool,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            link_threshold: None,
            fuzzy: default_true(),
        }
    }
}

/// `[consensus]`: flat clustering behind the fuzzy consensus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusSection {
    #[serde(default)]
    pub method: ConsensusMethod,
}

/// `[threshold_search]`: automatic threshold selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSearchSection {
    #[serde(default)]
    pub strategy: ThresholdStrategy,

    #[serde(default = "default_lo")]
    pub lo: f64,

    #[serde(default = "default_hi")]
    pub hi: f64,

    #[serde(default = "default_step")]
    pub step: f64,

    /// Descending thresholds swept by the plateau strategy
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,

    #[serde(default = "default_true")]
    pub log_weights: bool,

    /// Used when the plateau strategy finds no threshold
    #[serde(default = "default_fallback")]
    pub fallback: f64,
}

impl Default for ThresholdSearchSection {
    fn default() -> Self {
        Self {
            strategy: ThresholdStrategy::default(),
            lo: default_lo(),
            hi: default_hi(),
            step: default_step(),
            thresholds: default_thresholds(),
            log_weights: default_true(),
            fallback: default_fallback(),
        }
    }
}

impl ThresholdSearchSection {
    pub fn range(&self) -> ThresholdRange {
        ThresholdRange {
            lo: self.lo,
            hi: self.hi,
            step: self.step,
        }
    }
}

fn default_lo() -> f64 {
    ThresholdRange::default().lo
}
fn default_hi() -> f64 {
    ThresholdRange::default().hi
}
fn default_step() -> f64 {
    ThresholdRange::default().step
}
fn default_fallback() -> f64 {
    0.5
}
