//! Numeric helpers shared by the renderer: affine mapping, range extraction, tick generation.
//!
//! Everything here is pure and total over finite input.

/// Number of tick intervals on the value axis.
pub const DEFAULT_TICKS: usize = 4;

/// Map `value` from `[domain_lo, domain_hi]` onto `[range_lo, range_hi]`.
///
/// A degenerate domain (`domain_lo == domain_hi`) maps everything to `range_lo`.
pub fn linear_map(value: f64, domain_lo: f64, domain_hi: f64, range_lo: f64, range_hi: f64) -> f64 {
    if domain_lo == domain_hi {
        return range_lo;
    }
    range_lo + (value - domain_lo) * (range_hi - range_lo) / (domain_hi - domain_lo)
}

/// Smallest and largest finite value of `series`.
///
/// - empty or all non-finite → `(0.0, 1.0)`
/// - constant series → expanded by ±1 so a plotted line is not degenerate
pub fn min_max(series: &[f64]) -> (f64, f64) {
    let (lo, hi) = series
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    (lo, hi)
}

/// `count + 1` evenly spaced values from `min` to `max`, both inclusive.
pub fn tick_values(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return vec![min];
    }
    (0..=count)
        .map(|i| {
            if i == count {
                max
            } else {
                min + (max - min) * (i as f64 / count as f64)
            }
        })
        .collect()
}

/// Largest finite value, or `0.0` when there is none.
pub fn peak(series: &[f64]) -> f64 {
    series
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_map_interpolates_and_inverts() {
        assert_eq!(linear_map(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
        // y axes run bottom-up
        assert_eq!(linear_map(0.0, 0.0, 10.0, 200.0, 100.0), 200.0);
        assert_eq!(linear_map(10.0, 0.0, 10.0, 200.0, 100.0), 100.0);
    }

    #[test]
    fn min_max_ignores_non_finite() {
        assert_eq!(min_max(&[f64::NAN, 3.0, f64::INFINITY, -2.0]), (-2.0, 3.0));
        assert_eq!(min_max(&[f64::NAN]), (0.0, 1.0));
    }

    #[test]
    fn peak_defaults_to_zero() {
        assert_eq!(peak(&[]), 0.0);
        assert_eq!(peak(&[-3.0, f64::NAN, -1.0]), -1.0);
    }
}
