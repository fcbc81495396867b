use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::ClusteringConfig;
use crate::errors::{ClusterError, Result};

pub const CONFIG_FILE_NAME: &str = ".taxoclust.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

fn read_config_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<ClusteringConfig> {
    let config = toml::from_str::<ClusteringConfig>(contents)
        .map_err(|e| ClusterError::config(format!("failed to parse configuration: {}", e), None))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit path. A missing file is an error here.
pub fn load_config_from_path(path: &Path) -> Result<ClusteringConfig> {
    let contents = read_config_file(path).map_err(|e| {
        ClusterError::config(
            format!("failed to read {}: {}", path.display(), e),
            Some(path.to_path_buf()),
        )
    })?;

    parse_at(&contents, path)
}

fn parse_at(contents: &str, path: &Path) -> Result<ClusteringConfig> {
    parse_config(contents).map_err(|e| match e {
        ClusterError::Config { message, .. } => {
            ClusterError::config(message, Some(path.to_path_buf()))
        }
        other => other,
    })
}

/// Directories from `start` upwards, at most `max_depth` of them
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        parent.pop().then_some(parent)
    })
    .take(max_depth)
}

/// First `.taxoclust.toml` found from `start` upwards.
///
/// Unreadable candidates are skipped with a warning; a file that exists but
/// does not parse is an error.
pub fn discover_config(start: PathBuf) -> Result<Option<(PathBuf, ClusteringConfig)>> {
    for path in directory_ancestors(start, MAX_TRAVERSAL_DEPTH).map(|dir| dir.join(CONFIG_FILE_NAME)) {
        match read_config_file(&path) {
            Ok(contents) => {
                let config = parse_at(&contents, &path)?;
                debug!(path = %path.display(), "loaded configuration");
                return Ok(Some((path, config)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => warn!(path = %path.display(), error = %e, "failed to read config file"),
        }
    }
    Ok(None)
}

/// Explicit path if given, otherwise discovery from the working directory,
/// otherwise defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ClusteringConfig> {
    if let Some(path) = explicit {
        return load_config_from_path(path);
    }

    let current = std::env::current_dir()?;
    match discover_config(current)? {
        Some((_, config)) => Ok(config),
        None => {
            debug!(
                depth = MAX_TRAVERSAL_DEPTH,
                "no configuration found, using defaults"
            );
            Ok(ClusteringConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::ConsensusMethod;
    use crate::engine::ClusterMethod;
    use crate::matrix::MatrixSemantics;
    use crate::threshold::ThresholdStrategy;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), ClusteringConfig::default());
    }

    #[test]
    fn test_parse_all_sections() {
        let config = parse_config(indoc! {r#"
            [clustering]
            method = "mcl"
            threshold = 0.45
            semantics = "similarities"
            group_prefix = "cog_"

            [markov]
            max_steps = 50
            inflation = 1.5
            self_loops = false

            [link]
            link_threshold = 0.3
            fuzzy = false

            [consensus]
            method = "link"

            [threshold_search]
            strategy = "plateau"
            thresholds = [0.9, 0.6, 0.3]
            fallback = 0.4
        "#})
        .unwrap();

        assert_eq!(config.clustering.method, ClusterMethod::Mcl);
        assert_eq!(config.clustering.threshold, Some(0.45));
        assert_eq!(config.clustering.semantics, MatrixSemantics::Similarities);
        assert_eq!(config.clustering.group_prefix, "cog_");
        assert_eq!(config.markov.max_steps, 50);
        assert_eq!(config.markov.expansion, 2);
        assert!(!config.markov.self_loops);
        assert_eq!(config.link.link_threshold, Some(0.3));
        assert_eq!(config.consensus.method, ConsensusMethod::Link);
        assert_eq!(config.threshold_search.strategy, ThresholdStrategy::Plateau);
        assert_eq!(config.threshold_search.thresholds, vec![0.9, 0.6, 0.3]);
        assert_eq!(config.threshold_search.lo, 0.3);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = parse_config("[clustering\nmethod = ").unwrap_err();
        assert!(matches!(err, ClusterError::Config { .. }));
    }

    #[test]
    fn test_unknown_method_is_config_error() {
        let err = parse_config("[clustering]\nmethod = \"kmeans\"\n").unwrap_err();
        assert!(matches!(err, ClusterError::Config { .. }));
    }

    #[test]
    fn test_out_of_range_is_invalid_parameter() {
        let err = parse_config("[markov]\ninflation = 0.0\n").unwrap_err();
        assert!(matches!(err, ClusterError::InvalidParameter { .. }));
    }

    #[test]
    fn test_directory_ancestors_stops_at_depth() {
        let dirs: Vec<PathBuf> = directory_ancestors(PathBuf::from("/a/b/c/d"), 3).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/a/b/c/d"),
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
            ]
        );
    }

    #[test]
    fn test_discovers_config_in_ancestor() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("data").join("run");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[clustering]\nmethod = \"upgma\"\n",
        )
        .unwrap();

        let (path, config) = discover_config(nested).unwrap().unwrap();
        assert_eq!(path, root.path().join(CONFIG_FILE_NAME));
        assert_eq!(config.clustering.method, ClusterMethod::Upgma);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, ClusterError::Config { path: Some(_), .. }));
    }
}
