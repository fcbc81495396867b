use super::LinkageMethod;
use crate::matrix::DistanceMatrix;

fn linkage_distance(matrix: &DistanceMatrix, method: LinkageMethod, a: &[usize], b: &[usize]) -> f64 {
    let pairs = a.iter().flat_map(|&x| b.iter().map(move |&y| matrix.get(x, y)));
    match method {
        LinkageMethod::Upgma => {
            let (sum, count) = pairs.fold((0.0, 0usize), |(sum, count), d| (sum + d, count + 1));
            sum / count as f64
        }
        LinkageMethod::Single => pairs.fold(f64::INFINITY, f64::min),
        LinkageMethod::Complete => pairs.fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Merge the closest pair of clusters while its linkage distance is below
/// `threshold`. The merged cluster keeps the slot of the lower index; the
/// first pair in `(i, j)` order wins ties.
pub(super) fn merge_below(
    matrix: &DistanceMatrix,
    method: LinkageMethod,
    threshold: f64,
) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = (0..matrix.size()).map(|i| vec![i]).collect();
    let mut distances: Vec<Vec<f64>> = clusters
        .iter()
        .map(|a| {
            clusters
                .iter()
                .map(|b| linkage_distance(matrix, method, a, b))
                .collect()
        })
        .collect();

    while clusters.len() > 1 {
        let mut closest: Option<(f64, usize, usize)> = None;
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                let d = distances[i][j];
                if closest.is_none_or(|(best, _, _)| d < best) {
                    closest = Some((d, i, j));
                }
            }
        }

        let Some((d, i, j)) = closest else { break };
        if d >= threshold {
            break;
        }

        let absorbed = clusters.remove(j);
        clusters[i].extend(absorbed);
        distances.remove(j);
        for row in &mut distances {
            row.remove(j);
        }
        for k in 0..clusters.len() {
            let d = linkage_distance(matrix, method, &clusters[i], &clusters[k]);
            distances[i][k] = d;
            distances[k][i] = d;
        }
    }

    clusters
}
