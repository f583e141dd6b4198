//! Density clustering of scalar positions.

/// One-dimensional DBSCAN.
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within `eps` of it, inclusive. Clusters grow from core points
/// in input order, so cluster ids follow the order of the first core point of
/// each cluster. Border points join the first cluster that reaches them.
///
/// Returns one label per input value, `None` for noise.
///
/// # Example
/// ```
/// use ferrfuse_core::analysis::cluster::dbscan_1d;
/// let labels = dbscan_1d(&[10.0, 12.0, 500.0, 505.0, 250.0], 20.0, 2);
/// assert_eq!(labels, vec![Some(0), Some(0), Some(1), Some(1), None]);
/// ```
pub fn dbscan_1d(values: &[f32], eps: f32, min_samples: usize) -> Vec<Option<usize>> {
    let n = values.len();
    let mut labels: Vec<Option<usize>> = vec![None; n];
    if n == 0 || min_samples > n {
        return labels;
    }

    let neighbours = |i: usize| -> Vec<usize> {
        (0..n)
            .filter(|&j| (values[i] - values[j]).abs() <= eps)
            .collect()
    };

    let mut visited = vec![false; n];
    let mut next_id = 0usize;

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let seeds = neighbours(i);
        if seeds.len() < min_samples {
            continue;
        }

        let id = next_id;
        next_id += 1;
        labels[i] = Some(id);

        let mut queue = seeds;
        let mut cursor = 0;
        while cursor < queue.len() {
            let q = queue[cursor];
            cursor += 1;

            if labels[q].is_none() {
                labels[q] = Some(id);
            }
            if visited[q] {
                continue;
            }
            visited[q] = true;

            let reach = neighbours(q);
            if reach.len() >= min_samples {
                queue.extend(reach);
            }
        }
    }

    labels
}

/// Groups member indices by cluster id, in cluster id order. Noise is skipped.
pub fn group_by_cluster(labels: &[Option<usize>]) -> Vec<Vec<usize>> {
    let count = labels.iter().flatten().max().map_or(0, |max| max + 1);
    let mut groups = vec![Vec::new(); count];
    for (idx, label) in labels.iter().enumerate() {
        if let Some(id) = label {
            groups[*id].push(idx);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dbscan_inclusive_eps() {
        // Exactly eps apart still counts as a neighbour
        let labels = dbscan_1d(&[100.0, 120.0], 20.0, 2);
        assert_eq!(labels, vec![Some(0), Some(0)]);

        let labels = dbscan_1d(&[100.0, 120.5], 20.0, 2);
        assert_eq!(labels, vec![None, None]);
    }

    #[test]
    fn test_dbscan_chains_through_core_points() {
        // 0-15-30-45 are each within 20 of the next
        let labels = dbscan_1d(&[0.0, 15.0, 30.0, 45.0, 900.0], 20.0, 2);
        assert_eq!(labels, vec![Some(0), Some(0), Some(0), Some(0), None]);
    }

    #[test]
    fn test_dbscan_ids_follow_first_core_point() {
        let labels = dbscan_1d(&[700.0, 40.0, 705.0, 45.0], 20.0, 2);
        assert_eq!(labels, vec![Some(0), Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn test_dbscan_border_point() {
        // With min_samples 3 only 10.0 is core; 0.0 and 20.0 are borders
        let labels = dbscan_1d(&[0.0, 10.0, 20.0, 35.0], 10.0, 3);
        assert_eq!(labels, vec![Some(0), Some(0), Some(0), None]);
    }

    #[test]
    fn test_dbscan_degenerate() {
        assert!(dbscan_1d(&[], 20.0, 2).is_empty());
        // Fewer points than min_samples
        assert_eq!(dbscan_1d(&[5.0], 20.0, 2), vec![None]);
        // min_samples 1 makes every point its own core
        assert_eq!(dbscan_1d(&[5.0, 500.0], 20.0, 1), vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_group_by_cluster() {
        let groups = group_by_cluster(&[Some(1), None, Some(0), Some(1)]);
        assert_eq!(groups, vec![vec![2], vec![0, 3]]);
        assert!(group_by_cluster(&[None, None]).is_empty());
    }
}
