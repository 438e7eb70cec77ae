//! Linear rescaling of score vectors into [0, 1]

/// Score every competitor gets when nobody dominates
pub const TIE_SCORE: f64 = 0.5;

/// Rescale `scores` to [0, 1] via `(x - min) / (max - min)`.
///
/// When all values are equal (including the empty and single-competitor
/// cases) every competitor maps to the midpoint 0.5.
pub fn normalize(scores: &[f64]) -> Vec<f64> {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if scores.is_empty() || max == min {
        return vec![TIE_SCORE; scores.len()];
    }

    let span = max - min;
    scores.iter().map(|score| (score - min) / span).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_range() {
        let normalized = normalize(&[2.0, 4.0, 3.0]);
        assert_eq!(normalized, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_normalize_ties() {
        assert_eq!(normalize(&[0.0, 0.0, 0.0]), vec![0.5, 0.5, 0.5]);
        assert_eq!(normalize(&[1500.0, 1500.0]), vec![0.5, 0.5]);
        assert_eq!(normalize(&[0.3]), vec![0.5]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_negative_values() {
        let normalized = normalize(&[-10.0, 0.0, 10.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }
}
