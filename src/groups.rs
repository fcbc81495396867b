//! Map an exclusive assignment to readable group labels.

use crate::assignment::{ClusterAssignment, ClusterId};
use crate::errors::{ClusterError, Result};
use crate::matrix::TaxonSet;
use std::collections::BTreeMap;

pub const DEFAULT_GROUP_PREFIX: &str = "G_";

/// Label every taxon with `"{prefix}{n}"`, groups numbered `1..` by first
/// occurrence in taxon order.
///
/// Fails with `AmbiguousMembership` if a taxon belongs to several clusters
/// and with `InvalidParameter` if it belongs to none.
pub fn to_group_labels(
    assignment: &ClusterAssignment,
    taxa: &TaxonSet,
    prefix: &str,
) -> Result<BTreeMap<String, String>> {
    let membership = assignment.membership(taxa);
    let mut numbering: BTreeMap<ClusterId, usize> = BTreeMap::new();
    let mut labels = BTreeMap::new();

    for taxon in taxa.iter() {
        let ids = membership.get(taxon).map(Vec::as_slice).unwrap_or_default();
        let id = match ids {
            [id] => *id,
            [] => {
                return Err(ClusterError::invalid_parameter(
                    "assignment",
                    format!("taxon '{}' is not assigned to any cluster", taxon),
                ))
            }
            _ => {
                return Err(ClusterError::AmbiguousMembership {
                    taxon: taxon.to_string(),
                    count: ids.len(),
                })
            }
        };

        let next = numbering.len() + 1;
        let group = *numbering.entry(id).or_insert(next);
        labels.insert(taxon.to_string(), format!("{}{}", prefix, group));
    }

    Ok(labels)
}
