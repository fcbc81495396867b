//! End-to-end clustering of the Germanic language sample through the public API.

use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use taxoclust::consensus::{ConsensusClusterer, ConsensusOptions};
use taxoclust::engine::ThresholdSource;
use taxoclust::io::parse_matrix;
use taxoclust::{
    link_cluster, mcl, to_group_labels, AgglomerativeLinkage, ClusterError, ClusterMethod,
    ClusteringConfig, ClusteringEngine, DistanceMatrix, HierarchicalLinkage, LinkOptions,
    MclOptions, TaxonSet, ThresholdStrategy, TreeMethod,
};

const GERMANIC: &str = r#"{
    "taxa": ["German", "Swedish", "Icelandic", "English", "Dutch"],
    "condensed": [0.5, 0.67, 0.8, 0.2, 0.4, 0.7, 0.6, 0.8, 0.8, 0.3]
}"#;

fn germanic() -> (DistanceMatrix, TaxonSet) {
    parse_matrix(GERMANIC).unwrap()
}

fn sorted_clusters(assignment: &taxoclust::ClusterAssignment) -> Vec<Vec<String>> {
    let mut clusters: Vec<Vec<String>> = assignment.iter().map(|(_, m)| m.to_vec()).collect();
    clusters.sort();
    clusters
}

#[test]
fn link_clustering_finds_two_branches() {
    let (matrix, taxa) = germanic();
    let assignment = link_cluster(&matrix, &taxa, &LinkOptions::new(0.5)).unwrap();

    assert_eq!(assignment.get(1).unwrap(), ["German", "English", "Dutch"]);
    assert_eq!(assignment.get(2).unwrap(), ["Swedish", "Icelandic"]);
}

#[test]
fn link_threshold_puts_dutch_in_two_clusters() {
    let (matrix, taxa) = germanic();
    let options = LinkOptions {
        link_threshold: Some(0.5),
        ..LinkOptions::new(0.7)
    };
    let assignment = link_cluster(&matrix, &taxa, &options).unwrap();

    assert!(assignment.is_fuzzy());
    assert_eq!(assignment.membership(&taxa)["Dutch"].len(), 2);
    assert_eq!(assignment.labels(&taxa), None);
}

#[test]
fn markov_clustering_converges() {
    let (matrix, taxa) = germanic();
    let result = mcl(&matrix, &taxa, &MclOptions::with_threshold(0.5)).unwrap();

    assert!(result.converged);
    assert_eq!(result.steps, 6);
    assert_eq!(result.assignment.get(1).unwrap(), ["Swedish", "Icelandic"]);
    assert_eq!(result.assignment.get(2).unwrap(), ["German", "English", "Dutch"]);
    assert_eq!(result.labels, vec![2, 1, 1, 2, 2]);
}

#[test]
fn fuzzy_consensus_overlaps_on_dutch() {
    let (matrix, taxa) = germanic();
    let result = ConsensusClusterer::new()
        .cluster(&matrix, &taxa, &ConsensusOptions::new(0.5))
        .unwrap();

    assert_eq!(
        sorted_clusters(&result.assignment),
        vec![
            vec!["English".to_string(), "Dutch".to_string()],
            vec!["German".to_string(), "Dutch".to_string()],
            vec!["Swedish".to_string(), "Icelandic".to_string()],
        ]
    );

    let err = to_group_labels(&result.assignment, &taxa, "G_").unwrap_err();
    assert!(matches!(err, ClusterError::AmbiguousMembership { ref taxon, count: 2 } if taxon == "Dutch"));
}

#[test]
fn upgma_groups_by_first_occurrence() {
    let (matrix, taxa) = germanic();
    let assignment = AgglomerativeLinkage
        .flat_cluster(taxoclust::LinkageMethod::Upgma, 0.6, &matrix, &taxa)
        .unwrap();
    let groups = to_group_labels(&assignment, &taxa, "cog_").unwrap();

    let expected: BTreeMap<String, String> = [
        ("German", "cog_1"),
        ("Swedish", "cog_2"),
        ("Icelandic", "cog_2"),
        ("English", "cog_1"),
        ("Dutch", "cog_1"),
    ]
    .into_iter()
    .map(|(t, g)| (t.to_string(), g.to_string()))
    .collect();
    assert_eq!(groups, expected);
}

#[test]
fn trees_contain_every_taxon_once() {
    let (matrix, taxa) = germanic();
    for method in [TreeMethod::Upgma, TreeMethod::Neighbor] {
        let newick = AgglomerativeLinkage.tree(&matrix, &taxa, method, false).unwrap();
        assert!(newick.ends_with(';'));
        for taxon in taxa.iter() {
            assert_eq!(newick.matches(taxon).count(), 1, "{taxon} in {newick}");
        }
    }
}

#[test]
fn engine_plateau_search_drives_link_clustering() {
    let (matrix, taxa) = germanic();
    let mut config = ClusteringConfig::default();
    config.clustering.method = ClusterMethod::Link;
    config.threshold_search.strategy = ThresholdStrategy::Plateau;
    let engine = ClusteringEngine::from_config(config).unwrap();

    let outcome = engine.cluster(&matrix, &taxa).unwrap();
    assert_eq!(outcome.threshold.source, ThresholdSource::Plateau);
    assert!((outcome.threshold.value - 0.75).abs() < 1e-9);
    assert_eq!(outcome.assignment.len(), 1);
}

#[test]
fn outcome_serializes_to_json() {
    let (matrix, taxa) = germanic();
    let mut config = ClusteringConfig::default();
    config.clustering.threshold = Some(0.6);
    let outcome = ClusteringEngine::from_config(config)
        .unwrap()
        .cluster(&matrix, &taxa)
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["method"], "upgma");
    assert_eq!(json["threshold"]["source"], "explicit");
    assert_eq!(json["assignment"]["shape"], "exclusive");
    assert_eq!(
        json["assignment"]["clusters"]["2"],
        serde_json::json!(["Swedish", "Icelandic"])
    );
}

#[test]
fn mismatched_taxa_are_rejected() {
    let (matrix, _) = germanic();
    let taxa = TaxonSet::new(["a", "b"]).unwrap();
    let err = link_cluster(&matrix, &taxa, &LinkOptions::new(0.5)).unwrap_err();
    assert!(matches!(err, ClusterError::ShapeMismatch { .. }));
}
