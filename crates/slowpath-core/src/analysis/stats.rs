//! Small numeric helpers used to derive report rows.

/// Decimal places kept for derived report figures.
pub const PRECISION: i32 = 5;

/// Round half away from zero to `PRECISION` decimal places.
pub fn round(value: f64) -> f64 {
    let factor = 10f64.powi(PRECISION);
    (value * factor).round() / factor
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value of the sorted sequence, or the mean of the two middle values
/// when the length is even.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// `part / whole` as a rounded percentage; zero when `whole` is zero.
pub fn share_pct(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round(part / whole * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round() {
        assert_eq!(round(66.666666666), 66.66667);
        assert_eq!(round(0.30000000000000004), 0.3);
        assert_eq!(round(1.0), 1.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[0.7]), Some(0.7));
        assert_eq!(median(&[1.0, 1.0, 5.0, 5.0]), Some(3.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_mean_and_max() {
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(max(&[0.1, 0.9, 0.4]), Some(0.9));
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn test_share_pct() {
        assert_eq!(share_pct(1.0, 3.0), 33.33333);
        assert_eq!(share_pct(2.0, 3.0), 66.66667);
        assert_eq!(share_pct(5.0, 0.0), 0.0);
    }
}
