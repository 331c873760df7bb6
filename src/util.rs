pub fn sum_vector(vec: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in vec { sum += i }
    sum
}

pub fn mean(vec: &[f64]) -> f64 {
    if vec.is_empty() { return 0.0; }
    sum_vector(vec) / vec.len() as f64
}

// Half-away-from-zero rounding to a fixed number of decimals
pub fn round_to(val: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (val * scale).round() / scale
}

// Dense ranking over values in descending order: equal values share a rank, and ranks have no gaps.
pub fn dense_rank(values: &[f64]) -> Vec<u32> {
    let mut distinct = values.to_vec();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();

    values
        .iter()
        .map(|v| distinct.iter().take_while(|d| *d > v).count() as u32 + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_to(400.0 / 3.0, 1), 133.3);
        assert_eq!(round_to(260.0 / 3.0, 1), 86.7);
        assert_eq!(round_to(-0.25, 1), -0.3);
    }

    #[test]
    fn dense_rank_shares_ties_without_gaps() {
        let ranks = dense_rank(&[100.0, 120.0, 100.0, 80.0, 120.0]);
        assert_eq!(ranks, vec![2, 1, 2, 3, 1]);
    }

    #[test]
    fn dense_rank_of_empty_is_empty() {
        assert!(dense_rank(&[]).is_empty());
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    }
}
