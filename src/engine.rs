//! Configured entry point tying the strategies together.
//!
//! The engine resolves a threshold (explicit, or searched with the configured
//! strategy), runs the configured method and optionally maps the result to
//! group labels.

use crate::assignment::ClusterAssignment;
use crate::config::ClusteringConfig;
use crate::consensus::ConsensusClusterer;
use crate::errors::{ClusterError, Result};
use crate::groups::to_group_labels;
use crate::link::LinkClusterer;
use crate::linkage::{AgglomerativeLinkage, HierarchicalLinkage, LinkageMethod, TreeMethod};
use crate::markov::mcl;
use crate::matrix::{DistanceMatrix, TaxonSet};
use crate::threshold::{best_threshold, find_threshold, ThresholdStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    Mcl,
    Link,
    /// Leave-one-out fuzzy consensus
    Fuzzy,
    #[default]
    Upgma,
    Single,
    Complete,
}

impl ClusterMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcl => "mcl",
            Self::Link => "link",
            Self::Fuzzy => "fuzzy",
            Self::Upgma => "upgma",
            Self::Single => "single",
            Self::Complete => "complete",
        }
    }

    fn linkage(&self) -> Option<LinkageMethod> {
        match self {
            Self::Upgma => Some(LinkageMethod::Upgma),
            Self::Single => Some(LinkageMethod::Single),
            Self::Complete => Some(LinkageMethod::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterMethod {
    type Err = ClusterError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mcl" | "markov" => Ok(Self::Mcl),
            "link" | "link_clustering" => Ok(Self::Link),
            "fuzzy" => Ok(Self::Fuzzy),
            "upgma" => Ok(Self::Upgma),
            "single" => Ok(Self::Single),
            "complete" => Ok(Self::Complete),
            other => Err(ClusterError::invalid_parameter(
                "method",
                format!("unknown clustering method '{}'", other),
            )),
        }
    }
}

/// Where the threshold of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdSource {
    Explicit,
    Density,
    Plateau,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedThreshold {
    pub value: f64,
    pub source: ThresholdSource,
}

/// Result of a configured clustering run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringOutcome {
    pub method: ClusterMethod,
    pub threshold: ResolvedThreshold,
    pub assignment: ClusterAssignment,
}

pub struct ClusteringEngine {
    config: ClusteringConfig,
    linkage: AgglomerativeLinkage,
    link: LinkClusterer,
    consensus: ConsensusClusterer,
}

impl ClusteringEngine {
    pub fn from_config(config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            linkage: AgglomerativeLinkage,
            link: LinkClusterer::new(),
            consensus: ConsensusClusterer::new(),
        })
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Run the configured search strategy. Only the plateau strategy can
    /// come back empty.
    pub fn search_threshold(&self, matrix: &DistanceMatrix) -> Result<Option<f64>> {
        let search = &self.config.threshold_search;
        match search.strategy {
            ThresholdStrategy::Density => best_threshold(matrix, search.range()).map(Some),
            ThresholdStrategy::Plateau => Ok(find_threshold(matrix, &self.config.plateau_options())),
        }
    }

    pub fn resolve_threshold(&self, matrix: &DistanceMatrix) -> Result<ResolvedThreshold> {
        if let Some(value) = self.config.clustering.threshold {
            return Ok(ResolvedThreshold {
                value,
                source: ThresholdSource::Explicit,
            });
        }

        let strategy = self.config.threshold_search.strategy;
        let resolved = match (strategy, self.search_threshold(matrix)?) {
            (ThresholdStrategy::Density, Some(value)) => ResolvedThreshold {
                value,
                source: ThresholdSource::Density,
            },
            (ThresholdStrategy::Plateau, Some(value)) => ResolvedThreshold {
                value,
                source: ThresholdSource::Plateau,
            },
            (_, None) => {
                let value = self.config.threshold_search.fallback;
                warn!(%strategy, fallback = value, "no threshold found, using fallback");
                ResolvedThreshold {
                    value,
                    source: ThresholdSource::Fallback,
                }
            }
        };
        Ok(resolved)
    }

    /// Cluster with the configured method at a given threshold
    pub fn cluster_at(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
        threshold: f64,
    ) -> Result<ClusterAssignment> {
        let method = self.config.clustering.method;
        if let Some(linkage) = method.linkage() {
            return self.linkage.flat_cluster(linkage, threshold, matrix, taxa);
        }

        match method {
            ClusterMethod::Mcl => {
                mcl(matrix, taxa, &self.config.mcl_options(threshold)).map(|r| r.assignment)
            }
            ClusterMethod::Link => {
                self.link
                    .cluster(matrix, taxa, &self.config.link_options(threshold))
            }
            _ => self
                .consensus
                .cluster(matrix, taxa, &self.config.consensus_options(threshold))
                .map(|r| r.assignment),
        }
    }

    pub fn cluster(&self, matrix: &DistanceMatrix, taxa: &TaxonSet) -> Result<ClusteringOutcome> {
        matrix.check_taxa(taxa)?;
        let threshold = self.resolve_threshold(matrix)?;
        let assignment = self.cluster_at(matrix, taxa, threshold.value)?;
        let method = self.config.clustering.method;

        info!(
            %method,
            threshold = threshold.value,
            clusters = assignment.len(),
            "clustering finished"
        );

        Ok(ClusteringOutcome {
            method,
            threshold,
            assignment,
        })
    }

    /// Group label per taxon. Link clustering runs in exclusive mode here.
    pub fn groups(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
    ) -> Result<BTreeMap<String, String>> {
        matrix.check_taxa(taxa)?;
        let threshold = self.resolve_threshold(matrix)?;
        let assignment = match self.config.clustering.method {
            ClusterMethod::Link => self.link.cluster(
                matrix,
                taxa,
                &self.config.link_options(threshold.value).exclusive(),
            )?,
            _ => self.cluster_at(matrix, taxa, threshold.value)?,
        };
        to_group_labels(&assignment, taxa, &self.config.clustering.group_prefix)
    }

    pub fn tree(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
        method: TreeMethod,
        include_distances: bool,
    ) -> Result<String> {
        self.linkage.tree(matrix, taxa, method, include_distances)
    }
}
