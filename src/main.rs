use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use taxoclust::cli::{Cli, Commands};
use taxoclust::config::{load_config, ClusteringConfig};
use taxoclust::engine::ClusteringEngine;
use taxoclust::io::read_matrix;
use taxoclust::linkage::{AgglomerativeLinkage, HierarchicalLinkage};
use taxoclust::matrix::{DistanceMatrix, TaxonSet};
use taxoclust::observability::init_tracing;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match cli.command {
        Commands::Cluster {
            matrix,
            method,
            threshold,
            semantics,
            config,
            groups,
        } => {
            let mut config = load(config.as_deref())?;
            if let Some(method) = method {
                config.clustering.method = method.into();
            }
            if let Some(threshold) = threshold {
                config.clustering.threshold = Some(threshold);
            }
            if let Some(semantics) = semantics {
                config.clustering.semantics = semantics.into();
            }
            handle_cluster(&matrix, config, groups)
        }
        Commands::Threshold {
            matrix,
            strategy,
            config,
        } => {
            let mut config = load(config.as_deref())?;
            if let Some(strategy) = strategy {
                config.threshold_search.strategy = strategy.into();
            }
            let (matrix, _) = read_input(&matrix)?;
            let engine = ClusteringEngine::from_config(config)?;
            let threshold = engine.search_threshold(&matrix)?;
            println!("{}", serde_json::to_string(&threshold)?);
            Ok(())
        }
        Commands::Tree {
            matrix,
            method,
            no_distances,
        } => {
            let (matrix, taxa) = read_input(&matrix)?;
            let newick = AgglomerativeLinkage.tree(&matrix, &taxa, method.into(), !no_distances)?;
            println!("{}", newick);
            Ok(())
        }
    }
}

fn load(path: Option<&Path>) -> Result<ClusteringConfig> {
    load_config(path).context("Failed to load configuration")
}

fn read_input(path: &Path) -> Result<(DistanceMatrix, TaxonSet)> {
    read_matrix(path).with_context(|| format!("Failed to read matrix from {}", path.display()))
}

fn handle_cluster(path: &Path, config: ClusteringConfig, groups: bool) -> Result<()> {
    let (matrix, taxa) = read_input(path)?;
    let engine = ClusteringEngine::from_config(config).context("Invalid configuration")?;

    let output = if groups {
        serde_json::to_string_pretty(&engine.groups(&matrix, &taxa)?)?
    } else {
        serde_json::to_string_pretty(&engine.cluster(&matrix, &taxa)?)?
    };
    println!("{}", output);
    Ok(())
}
