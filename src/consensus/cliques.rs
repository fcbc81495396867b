//! Maximal clique enumeration over the co-membership graph.

use super::CoMembershipGraph;
use petgraph::algo::maximal_cliques;

/// Enumerates the maximal cliques of a co-membership graph.
///
/// Each clique is a list of taxon indices. The returned iterator is consumed
/// once per call.
pub trait CliqueEnumerator {
    fn maximal_cliques(&self, graph: &CoMembershipGraph) -> Box<dyn Iterator<Item = Vec<usize>>>;
}

/// Bron-Kerbosch enumeration from petgraph, ordered for reproducible ids
#[derive(Debug, Clone, Copy, Default)]
pub struct PetgraphCliques;

impl CliqueEnumerator for PetgraphCliques {
    fn maximal_cliques(&self, graph: &CoMembershipGraph) -> Box<dyn Iterator<Item = Vec<usize>>> {
        let inner = graph.graph();
        let mut cliques: Vec<Vec<usize>> = maximal_cliques(inner)
            .into_iter()
            .filter(|clique| !clique.is_empty())
            .map(|clique| {
                let mut members: Vec<usize> = clique.into_iter().map(|node| inner[node]).collect();
                members.sort_unstable();
                members
            })
            .collect();
        cliques.sort();
        Box::new(cliques.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_with_tail() {
        let mut graph = CoMembershipGraph::new(5);
        for (a, b) in [(0, 1), (0, 2), (1, 2), (2, 3)] {
            graph.increment(a, b);
        }
        let cliques: Vec<Vec<usize>> = PetgraphCliques.maximal_cliques(&graph).collect();

        assert_eq!(cliques, vec![vec![0, 1, 2], vec![2, 3], vec![4]]);
    }

    #[test]
    fn test_empty_graph_yields_singletons() {
        let graph = CoMembershipGraph::new(3);
        let cliques: Vec<Vec<usize>> = PetgraphCliques.maximal_cliques(&graph).collect();
        assert_eq!(cliques, vec![vec![0], vec![1], vec![2]]);
    }
}
