//! JSON matrix files.
//!
//! A file names its taxa and carries either the full square matrix or its
//! condensed upper triangle:
//!
//! ```json
//! {"taxa": ["a", "b", "c"], "condensed": [0.1, 0.7, 0.6]}
//! ```

use crate::errors::{ClusterError, Result};
use crate::matrix::{DistanceMatrix, TaxonSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixInput {
    pub taxa: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condensed: Option<Vec<f64>>,
}

impl MatrixInput {
    /// Validate into an aligned matrix and taxon set
    pub fn into_parts(self) -> Result<(DistanceMatrix, TaxonSet)> {
        let matrix = match (self.matrix, self.condensed) {
            (Some(rows), None) => DistanceMatrix::from_rows(rows)?,
            (None, Some(condensed)) => DistanceMatrix::from_condensed(&condensed)?,
            (Some(_), Some(_)) => {
                return Err(ClusterError::invalid_parameter(
                    "input",
                    "give either `matrix` or `condensed`, not both",
                ))
            }
            (None, None) => {
                return Err(ClusterError::invalid_parameter(
                    "input",
                    "missing `matrix` or `condensed`",
                ))
            }
        };

        let taxa = TaxonSet::new(self.taxa)?;
        matrix.check_taxa(&taxa)?;
        Ok((matrix, taxa))
    }
}

pub fn parse_matrix(json: &str) -> Result<(DistanceMatrix, TaxonSet)> {
    serde_json::from_str::<MatrixInput>(json)?.into_parts()
}

pub fn read_matrix(path: &Path) -> Result<(DistanceMatrix, TaxonSet)> {
    let contents = fs::read_to_string(path)?;
    parse_matrix(&contents)
}
