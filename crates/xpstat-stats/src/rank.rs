//! Ranking with tie handling.

/// Assigns 1-based ranks to `values`, giving tied values the average of the
/// ranks they span.
///
/// ```
/// use xpstat_stats::rank::average_ranks;
///
/// let ranks = average_ranks(&[10.0, 30.0, 20.0, 30.0]);
/// assert_eq!(ranks, vec![1.0, 3.5, 2.0, 3.5]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j share ranks i+1..=j+1
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(average_ranks(&[]).is_empty());
    }

    #[test]
    fn test_all_tied() {
        assert_eq!(average_ranks(&[4.0, 4.0, 4.0]), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_descending() {
        assert_eq!(average_ranks(&[3.0, 2.0, 1.0]), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_rank_sum() {
        let ranks = average_ranks(&[5.0, 1.0, 5.0, 2.0, 9.0, 1.0]);
        let sum: f64 = ranks.iter().sum();
        assert!((sum - 21.0).abs() < 1e-12);
    }
}
