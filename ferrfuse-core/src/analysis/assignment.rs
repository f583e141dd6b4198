//! Minimum-cost one-to-one assignment on rectangular cost matrices.

/// Solves the rectangular assignment problem with the Hungarian method using
/// row/column potentials.
///
/// Returns `min(rows, cols)` `(row, col)` pairs of minimal total cost, sorted by
/// row. Every cell must be finite; callers encode forbidden pairs with a large
/// penalty (see [`assign_feasible`]).
///
/// # Example
/// ```
/// use ferrfuse_core::analysis::assignment::solve;
/// let costs = vec![vec![4.0, 1.0], vec![2.0, 3.0]];
/// assert_eq!(solve(&costs), vec![(0, 1), (1, 0)]);
/// ```
pub fn solve(costs: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = costs.len();
    let cols = costs.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    if rows > cols {
        let transposed: Vec<Vec<f64>> = (0..cols)
            .map(|c| (0..rows).map(|r| costs[r][c]).collect())
            .collect();
        let mut pairs: Vec<(usize, usize)> = solve_wide(&transposed)
            .into_iter()
            .map(|(c, r)| (r, c))
            .collect();
        pairs.sort_unstable();
        return pairs;
    }

    solve_wide(costs)
}

/// Hungarian method for `n <= m`. Indices are 1-based internally, with row and
/// column 0 acting as the virtual start of each augmenting path.
fn solve_wide(a: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let n = a.len();
    let m = a[0].len();

    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    // p[j]: row matched to column j (0 = free)
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = a[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=m)
        .filter(|&j| p[j] != 0)
        .map(|j| (p[j] - 1, j - 1))
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Assignment over a matrix where `None` marks a forbidden pair.
///
/// Forbidden cells get a penalty larger than the sum of every feasible cost,
/// so the solver first maximizes the number of feasible pairs and then
/// minimizes their total cost. Forbidden pairs are dropped from the result.
/// Returns `(row, col, cost)` sorted by row.
pub fn assign_feasible(costs: &[Vec<Option<f64>>]) -> Vec<(usize, usize, f64)> {
    let feasible_sum: f64 = costs.iter().flatten().flatten().map(|c| c.abs()).sum();
    if !costs.iter().flatten().any(Option::is_some) {
        return Vec::new();
    }
    let penalty = feasible_sum + 1.0;

    let dense: Vec<Vec<f64>> = costs
        .iter()
        .map(|row| row.iter().map(|cell| cell.unwrap_or(penalty)).collect())
        .collect();

    solve(&dense)
        .into_iter()
        .filter_map(|(r, c)| costs[r][c].map(|cost| (r, c, cost)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(costs: &[Vec<f64>], pairs: &[(usize, usize)]) -> f64 {
        pairs.iter().map(|&(r, c)| costs[r][c]).sum()
    }

    #[test]
    fn test_solve_square() {
        // Optimum is 1 + 2 + 2 = 5; every other permutation costs at least 6
        let costs = vec![
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ];
        let pairs = solve(&costs);
        assert_eq!(pairs, vec![(0, 1), (1, 0), (2, 2)]);
        assert_eq!(total(&costs, &pairs), 5.0);
    }

    #[test]
    fn test_solve_greedy_is_not_optimal() {
        // Greedy takes (0,0)=1 and is then forced into (1,1)=10
        let costs = vec![vec![1.0, 2.0], vec![2.0, 10.0]];
        let pairs = solve(&costs);
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
        assert_eq!(total(&costs, &pairs), 4.0);
    }

    #[test]
    fn test_solve_rectangular() {
        // More columns than rows
        let wide = vec![vec![9.0, 2.0, 7.0, 8.0], vec![6.0, 4.0, 3.0, 7.0]];
        assert_eq!(solve(&wide), vec![(0, 1), (1, 2)]);

        // More rows than columns
        let tall = vec![vec![5.0], vec![1.0], vec![3.0]];
        assert_eq!(solve(&tall), vec![(1, 0)]);
    }

    #[test]
    fn test_solve_empty() {
        assert!(solve(&[]).is_empty());
        assert!(solve(&[vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_assign_feasible_prefers_more_pairs() {
        // Pairing (0,0) alone costs 1 but blocks row 1, whose only option is column 0.
        // Two feasible pairs beat one cheap pair.
        let costs = vec![vec![Some(1.0), Some(50.0)], vec![Some(2.0), None]];
        let pairs = assign_feasible(&costs);
        assert_eq!(pairs, vec![(0, 1, 50.0), (1, 0, 2.0)]);
    }

    #[test]
    fn test_assign_feasible_drops_forbidden() {
        let costs = vec![vec![None, None], vec![Some(3.0), None]];
        assert_eq!(assign_feasible(&costs), vec![(1, 0, 3.0)]);

        let nothing: Vec<Vec<Option<f64>>> = vec![vec![None; 3]; 2];
        assert!(assign_feasible(&nothing).is_empty());
    }
}
