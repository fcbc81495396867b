//! Clustering of taxa from pairwise distance matrices.
//!
//! Several strategies share one input model ([`DistanceMatrix`] plus
//! [`TaxonSet`]) and one output model ([`ClusterAssignment`]):
//!
//! - Markov clustering ([`markov::mcl`])
//! - link communities, fuzzy or exclusive ([`link::LinkClusterer`])
//! - leave-one-out fuzzy consensus ([`consensus::ConsensusClusterer`])
//! - flat hierarchical cuts and Newick trees ([`linkage::AgglomerativeLinkage`])
//!
//! Thresholds can be searched by partition density or by degree plateaus
//! ([`threshold`]). [`engine::ClusteringEngine`] ties everything to a
//! [`config::ClusteringConfig`].
//!
//! ```
//! use taxoclust::{link_cluster, DistanceMatrix, LinkOptions, TaxonSet};
//!
//! let matrix = DistanceMatrix::from_condensed(&[0.1, 0.9, 0.9]).unwrap();
//! let taxa = TaxonSet::new(["a", "b", "c"]).unwrap();
//! let assignment = link_cluster(&matrix, &taxa, &LinkOptions::new(0.5)).unwrap();
//! assert_eq!(assignment.get(1).unwrap(), ["a", "b"]);
//! ```

// Export modules for library usage
pub mod assignment;
pub mod cli;
pub mod components;
pub mod config;
pub mod consensus;
pub mod engine;
pub mod errors;
pub mod groups;
pub mod io;
pub mod link;
pub mod linkage;
pub mod markov;
pub mod matrix;
pub mod observability;
pub mod threshold;

// Re-export commonly used types
pub use crate::assignment::{AssignmentShape, ClusterAssignment, ClusterId};
pub use crate::config::{load_config, ClusteringConfig};
pub use crate::consensus::{ConsensusClusterer, ConsensusMethod, ConsensusOptions};
pub use crate::engine::{ClusterMethod, ClusteringEngine, ClusteringOutcome};
pub use crate::errors::{ClusterError, Result};
pub use crate::groups::to_group_labels;
pub use crate::link::{link_cluster, LinkClusterer, LinkOptions};
pub use crate::linkage::{AgglomerativeLinkage, HierarchicalLinkage, LinkageMethod, TreeMethod};
pub use crate::markov::{mcl, MclOptions};
pub use crate::matrix::{DistanceMatrix, MatrixSemantics, TaxonSet};
pub use crate::threshold::{best_threshold, find_threshold, ThresholdStrategy};
