use argminmax::ArgMinMax;

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

pub fn get_min_max(vec: &[f64]) -> (f64, f64) {
    (get_min(vec), get_max(vec))
}

/// True when every value in the slice is identical (an empty slice counts as flat).
/// Checked on the raw values so that rounding in a computed variance can't mask it.
pub fn is_flat(vec: &[f64]) -> bool {
    if vec.is_empty() {
        return true;
    }
    let (min, max) = get_min_max(vec);
    min == max
}

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(vec: &[f64]) -> f64 {
    if vec.is_empty() {
        return f64::NAN;
    }
    vec.iter().sum::<f64>() / vec.len() as f64
}

/// Sample standard deviation (ddof = 1), two-pass.
/// NaN when fewer than two values are supplied.
pub fn sample_std(vec: &[f64]) -> f64 {
    let n = vec.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(vec);
    let sum_sq: f64 = vec.iter().map(|x| (x - m) * (x - m)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Largest absolute deviation from the mean. Used to spot numerically constant series.
pub fn max_abs_deviation(vec: &[f64]) -> f64 {
    if vec.is_empty() {
        return 0.0;
    }
    let m = mean(vec);
    vec.iter().map(|x| (x - m).abs()).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_std_matches_hand_computation() {
        // mean = 5, squared deviations sum to 32, ddof = 1 => var = 32 / 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values), 5.0);
        let expected = (32.0_f64 / 7.0).sqrt();
        assert_relative_eq!(sample_std(&values), expected, epsilon = 1e-12);
    }

    #[test]
    fn sample_std_needs_two_values() {
        assert!(sample_std(&[1.0]).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn flat_detection_uses_raw_values() {
        assert!(is_flat(&[0.1, 0.1, 0.1]));
        assert!(!is_flat(&[0.1, 0.1, 0.1000001]));
        assert_eq!(get_min_max(&[3.0, -1.0, 2.0]), (-1.0, 3.0));
    }
}
