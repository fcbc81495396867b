use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::ClusterMethod;
use crate::linkage::TreeMethod;
use crate::matrix::MatrixSemantics;
use crate::threshold::ThresholdStrategy;

#[derive(Parser, Debug)]
#[command(name = "taxoclust")]
#[command(about = "Flat, fuzzy and tree clustering of taxa from distance matrices", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cluster the taxa of a matrix file and print the assignment as JSON
    Cluster {
        /// JSON matrix file
        matrix: PathBuf,

        /// Clustering method (overrides the config file)
        #[arg(short, long, value_enum)]
        method: Option<MethodArg>,

        /// Cut threshold; searched automatically when omitted
        #[arg(short, long)]
        threshold: Option<f64>,

        /// How matrix scores are read
        #[arg(short, long, value_enum)]
        semantics: Option<SemanticsArg>,

        /// Configuration file (defaults to a discovered .taxoclust.toml)
        #[arg(short, long, env = "TAXOCLUST_CONFIG")]
        config: Option<PathBuf>,

        /// Print group labels instead of clusters
        #[arg(long)]
        groups: bool,
    },

    /// Search a cut threshold and print it (null when none is found)
    Threshold {
        /// JSON matrix file
        matrix: PathBuf,

        /// Search strategy (overrides the config file)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Configuration file (defaults to a discovered .taxoclust.toml)
        #[arg(short, long, env = "TAXOCLUST_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Build a tree and print it in Newick format
    Tree {
        /// JSON matrix file
        matrix: PathBuf,

        /// Tree construction method
        #[arg(short, long, value_enum, default_value = "upgma")]
        method: TreeArg,

        /// Print the topology only
        #[arg(long = "no-distances")]
        no_distances: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Mcl,
    Link,
    Fuzzy,
    Upgma,
    Single,
    Complete,
}

impl From<MethodArg> for ClusterMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Mcl => Self::Mcl,
            MethodArg::Link => Self::Link,
            MethodArg::Fuzzy => Self::Fuzzy,
            MethodArg::Upgma => Self::Upgma,
            MethodArg::Single => Self::Single,
            MethodArg::Complete => Self::Complete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SemanticsArg {
    Distances,
    Similarities,
    Weights,
}

impl From<SemanticsArg> for MatrixSemantics {
    fn from(arg: SemanticsArg) -> Self {
        match arg {
            SemanticsArg::Distances => Self::Distances,
            SemanticsArg::Similarities => Self::Similarities,
            SemanticsArg::Weights => Self::Weights,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Density,
    Plateau,
}

impl From<StrategyArg> for ThresholdStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Density => Self::Density,
            StrategyArg::Plateau => Self::Plateau,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeArg {
    Upgma,
    Neighbor,
}

impl From<TreeArg> for TreeMethod {
    fn from(arg: TreeArg) -> Self {
        match arg {
            TreeArg::Upgma => Self::Upgma,
            TreeArg::Neighbor => Self::Neighbor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cluster_command() {
        let cli = Cli::parse_from([
            "taxoclust", "-vv", "cluster", "m.json", "--method", "link", "--threshold", "0.5",
            "--groups",
        ]);
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Commands::Cluster {
                method,
                threshold,
                groups,
                ..
            } => {
                assert_eq!(method, Some(MethodArg::Link));
                assert_eq!(threshold, Some(0.5));
                assert!(groups);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_tree_defaults_to_upgma() {
        let cli = Cli::parse_from(["taxoclust", "tree", "m.json"]);
        assert!(matches!(
            cli.command,
            Commands::Tree { method: TreeArg::Upgma, no_distances: false, .. }
        ));
    }
}
